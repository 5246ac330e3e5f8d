//! Per-entity HTTP handlers: authenticate, resolve scope, query, project.
//!
//! Every handler takes an [`Actor`](crate::auth::Actor); extracting it is the
//! authentication gate, even where the identity is otherwise unused.

pub mod applications;
pub mod companies;
pub mod interviews;
pub mod jobs;
pub mod profiles;
pub mod uploads;
