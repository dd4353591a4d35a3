//! Table loading - CSV exports into the plain records the core consumes.
//!
//! Loading is the only place that touches files. Everything downstream works
//! on owned in-memory tables.

mod tables;

pub use tables::{
    load_dataset, read_aliases, read_messages, read_persons, Dataset, DatasetPaths,
};
