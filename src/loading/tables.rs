//! CSV readers for the message, alias and person tables.
//!
//! Column names follow the common email-dump layout:
//! - messages: `MetadataFrom`, `MetadataTo` (every other column is dropped)
//! - aliases: `Alias`, `PersonId`
//! - persons: `Id`, `Name`

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::identity::IdentityTables;
use crate::types::{AliasEntry, MessagePair, PersonEntry, PersonId};

#[derive(Debug, Deserialize)]
struct MessageRow {
    #[serde(rename = "MetadataFrom", default)]
    from: Option<String>,
    #[serde(rename = "MetadataTo", default)]
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AliasRow {
    #[serde(rename = "Alias")]
    alias: String,
    #[serde(rename = "PersonId")]
    person_id: PersonId,
}

#[derive(Debug, Deserialize)]
struct PersonRow {
    #[serde(rename = "Id")]
    id: PersonId,
    #[serde(rename = "Name")]
    name: String,
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader)
}

/// Read message pairs. Missing or empty cells become empty identities.
pub fn read_messages<R: Read>(reader: R) -> Result<Vec<MessagePair>> {
    let mut rdr = csv_reader(reader);
    let mut messages = Vec::new();
    for (i, row) in rdr.deserialize::<MessageRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed message record {}", i + 1))?;
        messages.push(MessagePair::new(
            row.from.unwrap_or_default(),
            row.to.unwrap_or_default(),
        ));
    }
    Ok(messages)
}

pub fn read_aliases<R: Read>(reader: R) -> Result<Vec<AliasEntry>> {
    let mut rdr = csv_reader(reader);
    let mut aliases = Vec::new();
    for (i, row) in rdr.deserialize::<AliasRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed alias record {}", i + 1))?;
        aliases.push(AliasEntry::new(row.alias, row.person_id));
    }
    Ok(aliases)
}

pub fn read_persons<R: Read>(reader: R) -> Result<Vec<PersonEntry>> {
    let mut rdr = csv_reader(reader);
    let mut persons = Vec::new();
    for (i, row) in rdr.deserialize::<PersonRow>().enumerate() {
        let row = row.with_context(|| format!("Malformed person record {}", i + 1))?;
        persons.push(PersonEntry::new(row.id, row.name));
    }
    Ok(persons)
}

/// Locations of the three tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub emails: PathBuf,
    pub aliases: PathBuf,
    pub persons: PathBuf,
}

/// Loaded tables, ready for the pipeline.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub messages: Vec<MessagePair>,
    pub aliases: Vec<AliasEntry>,
    pub persons: Vec<PersonEntry>,
}

impl Dataset {
    /// Build the resolver tables. Consumes the alias and person lists.
    pub fn into_parts(self) -> (Vec<MessagePair>, IdentityTables) {
        let tables = IdentityTables::from_entries(self.aliases, self.persons);
        (self.messages, tables)
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open {}", path.display()))
}

pub fn load_dataset(paths: &DatasetPaths) -> Result<Dataset> {
    let messages = read_messages(open(&paths.emails)?)
        .with_context(|| format!("Failed to read {}", paths.emails.display()))?;
    let aliases = read_aliases(open(&paths.aliases)?)
        .with_context(|| format!("Failed to read {}", paths.aliases.display()))?;
    let persons = read_persons(open(&paths.persons)?)
        .with_context(|| format!("Failed to read {}", paths.persons.display()))?;

    tracing::debug!(
        messages = messages.len(),
        aliases = aliases.len(),
        persons = persons.len(),
        "loaded dataset"
    );

    Ok(Dataset {
        messages,
        aliases,
        persons,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_drop_extra_columns() {
        let data = "\
Id,MetadataSubject,MetadataTo,MetadataFrom,RawText
1,Re: hi,H,Jake.Sullivan@state.gov,\"long, quoted body\"
2,,,cheryl.mills,
";
        let messages = read_messages(data.as_bytes()).unwrap();
        assert_eq!(
            messages,
            vec![
                MessagePair::new("Jake.Sullivan@state.gov", "H"),
                MessagePair::new("cheryl.mills", ""),
            ]
        );
    }

    #[test]
    fn test_aliases_and_persons() {
        let aliases = read_aliases("Id,Alias,PersonId\n1,h,80\n2,hrod17,80\n".as_bytes()).unwrap();
        assert_eq!(aliases, vec![AliasEntry::new("h", 80), AliasEntry::new("hrod17", 80)]);

        let persons = read_persons("Id,Name\n80,Hillary Clinton\n".as_bytes()).unwrap();
        assert_eq!(persons, vec![PersonEntry::new(80, "Hillary Clinton")]);
    }

    #[test]
    fn test_bad_person_id_is_reported() {
        let err = read_aliases("Alias,PersonId\nh,eighty\n".as_bytes()).unwrap_err();
        assert!(format!("{:#}", err).contains("Malformed alias record 1"));
    }

    #[test]
    fn test_missing_file_names_path() {
        let paths = DatasetPaths {
            emails: PathBuf::from("/definitely/not/here/Emails.csv"),
            aliases: PathBuf::from("Aliases.csv"),
            persons: PathBuf::from("Persons.csv"),
        };
        let err = load_dataset(&paths).unwrap_err();
        assert!(format!("{:#}", err).contains("/definitely/not/here/Emails.csv"));
    }
}
