//! Data models for Opsboard.
//!
//! - Task (task board)
//! - Experiment (R&D log)
//! - Role and Permission (role editor)
//!
//! All three implement [`Record`], the accessor table the filter engine and
//! the aggregator work through.

pub mod experiment;
pub mod priority;
pub mod record;
pub mod role;
pub mod task;
pub mod time;

pub use experiment::{Experiment, ExperimentCategory, ExperimentStatus};
pub use priority::Priority;
pub use record::{DateField, Effort, EntityKind, Enumeration, Record, TextField, Unranked};
pub use role::{group_by_resource, Permission, PermissionGroup, PermissionGroups, Role, RoleStatus};
pub use task::{Task, TaskCategory, TaskStatus};
