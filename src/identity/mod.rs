//! Identity resolution - from free-form sender/receiver strings to one
//! canonical identity per person.
//!
//! ```text
//! "Alice.Smith@State.gov" → lower-case → strip "@…" → alias lookup → person name
//!                            "alice.smith@state.gov"  "alice.smith"   "Alice Smith"
//! ```
//!
//! Resolution is pure: same raw string and same tables always give the same
//! identity, so it can run on any number of threads without coordination.

mod resolver;

pub use resolver::{normalize, resolve, IdentityResolver, IdentityTables, ResolverConfig};
