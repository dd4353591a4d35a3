//! Alias and person tables plus the resolver that walks them.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{RankError, Result};
use crate::types::{AliasEntry, PersonEntry, PersonId};

/// Resolver options. Defaults give the plain lower-case/strip-domain rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Remove every ',' after domain stripping, before alias lookup.
    /// Helps with "Last, First" display names in some exports.
    pub strip_commas: bool,
}

/// In-memory alias and person tables.
///
/// Built once from loader output; read-only afterwards. Duplicate alias keys
/// or person ids keep the last entry seen.
#[derive(Debug, Clone, Default)]
pub struct IdentityTables {
    aliases: HashMap<String, PersonId>,
    persons: HashMap<PersonId, Arc<str>>,
}

impl IdentityTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<A, P>(aliases: A, persons: P) -> Self
    where
        A: IntoIterator<Item = AliasEntry>,
        P: IntoIterator<Item = PersonEntry>,
    {
        let mut tables = Self::new();
        for entry in aliases {
            tables.add_alias(entry.alias, entry.person_id);
        }
        for entry in persons {
            tables.add_person(entry.person_id, entry.name);
        }
        tables
    }

    pub fn add_alias(&mut self, alias: impl Into<String>, person_id: PersonId) {
        self.aliases.insert(alias.into(), person_id);
    }

    pub fn add_person(&mut self, person_id: PersonId, name: impl Into<Arc<str>>) {
        self.persons.insert(person_id, name.into());
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }

    pub fn person_count(&self) -> usize {
        self.persons.len()
    }

    pub fn aliases(&self) -> &HashMap<String, PersonId> {
        &self.aliases
    }

    pub fn persons(&self) -> &HashMap<PersonId, Arc<str>> {
        &self.persons
    }

    /// Aliases whose person id has no person record, sorted by alias.
    pub fn dangling_aliases(&self) -> Vec<(&str, PersonId)> {
        let mut dangling: Vec<_> = self
            .aliases
            .iter()
            .filter(|(_, id)| !self.persons.contains_key(*id))
            .map(|(alias, &id)| (alias.as_str(), id))
            .collect();
        dangling.sort();
        dangling
    }

    /// Check every alias up front instead of waiting for one to be hit.
    ///
    /// Reports the first dangling alias in alias order.
    pub fn validate(&self) -> Result<()> {
        match self.dangling_aliases().first() {
            Some(&(alias, person_id)) => Err(RankError::DanglingAliasReference {
                raw: alias.to_string(),
                alias: alias.to_string(),
                person_id,
            }),
            None => Ok(()),
        }
    }
}

/// Lower-case, cut at the first '@', optionally drop commas.
pub fn normalize(raw: &str, strip_commas: bool) -> String {
    let mut name = raw.to_lowercase();
    if let Some(pos) = name.find('@') {
        name.truncate(pos);
    }
    if strip_commas {
        name.retain(|c| c != ',');
    }
    name
}

/// Resolve one raw identity against bare alias/person maps.
///
/// An alias hit yields the person's name exactly as stored; a miss yields the
/// normalized string. A hit whose person is missing is an error.
pub fn resolve(
    raw: &str,
    aliases: &HashMap<String, PersonId>,
    persons: &HashMap<PersonId, Arc<str>>,
) -> Result<Arc<str>> {
    resolve_normalized(raw, normalize(raw, false), aliases, persons)
}

fn resolve_normalized(
    raw: &str,
    normalized: String,
    aliases: &HashMap<String, PersonId>,
    persons: &HashMap<PersonId, Arc<str>>,
) -> Result<Arc<str>> {
    let Some(&person_id) = aliases.get(&normalized) else {
        return Ok(Arc::from(normalized));
    };
    match persons.get(&person_id) {
        Some(name) => Ok(Arc::clone(name)),
        None => Err(RankError::DanglingAliasReference {
            raw: raw.to_string(),
            alias: normalized,
            person_id,
        }),
    }
}

/// Resolves raw identities through a borrowed set of tables.
///
/// Cheap to construct and `Sync`, so one resolver can be shared across
/// rayon workers.
#[derive(Debug, Clone)]
pub struct IdentityResolver<'a> {
    tables: &'a IdentityTables,
    config: ResolverConfig,
}

impl<'a> IdentityResolver<'a> {
    pub fn new(tables: &'a IdentityTables) -> Self {
        Self {
            tables,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn resolve(&self, raw: &str) -> Result<Arc<str>> {
        let normalized = normalize(raw, self.config.strip_commas);
        resolve_normalized(raw, normalized, &self.tables.aliases, &self.tables.persons)
    }

    /// Resolve both ends of a message. Sender is resolved first, so a
    /// message with two bad ends reports the sender.
    pub fn resolve_pair(&self, sender: &str, receiver: &str) -> Result<(Arc<str>, Arc<str>)> {
        Ok((self.resolve(sender)?, self.resolve(receiver)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alice_tables() -> IdentityTables {
        IdentityTables::from_entries(
            vec![AliasEntry::new("alice", 7), AliasEntry::new("asmith", 7)],
            vec![PersonEntry::new(7, "Alice Smith")],
        )
    }

    #[test]
    fn test_domain_stripping_without_alias() {
        let tables = IdentityTables::new();
        let resolver = IdentityResolver::new(&tables);
        assert_eq!(resolver.resolve("alice@example.com").unwrap().as_ref(), "alice");
        assert_eq!(resolver.resolve("alice@other.org").unwrap().as_ref(), "alice");
    }

    #[test]
    fn test_truncates_at_first_at_sign() {
        assert_eq!(normalize("a@b@c", false), "a");
        assert_eq!(normalize("@nobody", false), "");
    }

    #[test]
    fn test_alias_keeps_person_casing() {
        let tables = alice_tables();
        let resolver = IdentityResolver::new(&tables);
        assert_eq!(resolver.resolve("Alice@X.com").unwrap().as_ref(), "Alice Smith");
        assert_eq!(resolver.resolve("ASMITH").unwrap().as_ref(), "Alice Smith");
    }

    #[test]
    fn test_free_function_matches_resolver() {
        let tables = alice_tables();
        let resolver = IdentityResolver::new(&tables);
        for raw in ["Alice@X.com", "bob@state.gov", "", "Carol"] {
            assert_eq!(
                resolve(raw, tables.aliases(), tables.persons()).unwrap(),
                resolver.resolve(raw).unwrap()
            );
        }
    }

    #[test]
    fn test_empty_string_is_valid_identity() {
        let tables = IdentityTables::new();
        let resolver = IdentityResolver::new(&tables);
        assert_eq!(resolver.resolve("").unwrap().as_ref(), "");
    }

    #[test]
    fn test_dangling_alias_is_error_not_default() {
        let tables = IdentityTables::from_entries(
            vec![AliasEntry::new("ghost", 99)],
            Vec::<PersonEntry>::new(),
        );
        let resolver = IdentityResolver::new(&tables);

        let err = resolver.resolve("Ghost@nowhere.net").unwrap_err();
        assert_eq!(
            err,
            RankError::DanglingAliasReference {
                raw: "Ghost@nowhere.net".to_string(),
                alias: "ghost".to_string(),
                person_id: 99,
            }
        );

        // Identities that never touch the dangling alias still resolve
        assert_eq!(resolver.resolve("bob").unwrap().as_ref(), "bob");
    }

    #[test]
    fn test_validate_reports_first_dangling_alias() {
        let tables = IdentityTables::from_entries(
            vec![
                AliasEntry::new("zeta", 3),
                AliasEntry::new("beta", 2),
                AliasEntry::new("ok", 1),
            ],
            vec![PersonEntry::new(1, "Okay")],
        );
        assert_eq!(tables.dangling_aliases(), vec![("beta", 2), ("zeta", 3)]);
        assert!(matches!(
            tables.validate(),
            Err(RankError::DanglingAliasReference { ref alias, person_id: 2, .. }) if alias == "beta"
        ));
        assert!(alice_tables().validate().is_ok());
    }

    #[test]
    fn test_duplicate_entries_last_wins() {
        let tables = IdentityTables::from_entries(
            vec![AliasEntry::new("al", 1), AliasEntry::new("al", 2)],
            vec![PersonEntry::new(1, "One"), PersonEntry::new(2, "Two")],
        );
        let resolver = IdentityResolver::new(&tables);
        assert_eq!(resolver.resolve("al").unwrap().as_ref(), "Two");
    }

    #[test]
    fn test_strip_commas_is_opt_in() {
        let tables = IdentityTables::from_entries(
            vec![AliasEntry::new("smith john", 4)],
            vec![PersonEntry::new(4, "John Smith")],
        );

        let plain = IdentityResolver::new(&tables);
        assert_eq!(plain.resolve("Smith, John").unwrap().as_ref(), "smith, john");

        let stripping = IdentityResolver::new(&tables).with_config(ResolverConfig {
            strip_commas: true,
        });
        assert_eq!(stripping.resolve("Smith, John").unwrap().as_ref(), "John Smith");
    }

    #[test]
    fn test_resolve_pair_reports_sender_first() {
        let tables = IdentityTables::from_entries(
            vec![AliasEntry::new("s", 1), AliasEntry::new("r", 2)],
            Vec::<PersonEntry>::new(),
        );
        let resolver = IdentityResolver::new(&tables);
        match resolver.resolve_pair("s", "r") {
            Err(RankError::DanglingAliasReference { raw, .. }) => assert_eq!(raw, "s"),
            other => panic!("expected dangling alias error, got {:?}", other),
        }
    }

    proptest! {
        #[test]
        fn prop_resolution_is_case_insensitive(s in "[a-zA-Z0-9._@ -]{0,24}") {
            let tables = alice_tables();
            let resolver = IdentityResolver::new(&tables);
            let upper = resolver.resolve(&s.to_uppercase()).unwrap();
            let lower = resolver.resolve(&s.to_lowercase()).unwrap();
            let mixed = resolver.resolve(&s).unwrap();
            prop_assert_eq!(&upper, &lower);
            prop_assert_eq!(&mixed, &lower);
        }
    }
}
