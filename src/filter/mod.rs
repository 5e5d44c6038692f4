//! Record filtering.
//!
//! - [`predicate`] - per-field tests
//! - [`spec`] - the sparse filter specification
//! - [`engine`] - AND-combination over a record collection, plus display sorting

pub mod engine;
pub mod predicate;
pub mod spec;

pub use engine::{apply, apply_owned, matches, sort_records, SortKey, SortOrder};
pub use spec::{set_of, DateRange, FilterKey, FilterSpec, FilterUpdate};
