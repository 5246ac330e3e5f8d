//! Visibility rules: which rows an authenticated actor may read or act on.
//!
//! The resolver only ever narrows. Request filters (status, search, ...)
//! are combined with the resolved [`Scope`] by the repository queries and
//! have no way to replace it. Companies carry no owner column and are
//! readable by every authenticated actor, so they never pass through here.

use uuid::Uuid;

use crate::auth::Actor;

/// Restriction applied to a query before any request filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Unrestricted,
    /// Only rows whose actor-derived owner column equals this user
    /// (`posted_by`, `applicant`, `interviewer` or the profile's `user`).
    OwnedBy(Uuid),
}

impl Scope {
    pub fn admits(&self, owner_id: Uuid) -> bool {
        match self {
            Scope::Unrestricted => true,
            Scope::OwnedBy(user_id) => *user_id == owner_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Job,
    Application,
    Interview,
    UserProfile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Any authenticated actor sees every row.
    Global,
    /// Staff see every row, everyone else only their own.
    OwnUnlessStaff,
}

impl Resource {
    pub const fn visibility(self) -> Visibility {
        match self {
            Resource::Job => Visibility::Global,
            // No actor-based narrowing for interviews.
            Resource::Interview => Visibility::Global,
            Resource::Application | Resource::UserProfile => Visibility::OwnUnlessStaff,
        }
    }
}

pub fn resolve(actor: &Actor, resource: Resource) -> Scope {
    match resource.visibility() {
        Visibility::Global => Scope::Unrestricted,
        Visibility::OwnUnlessStaff if actor.is_staff => Scope::Unrestricted,
        Visibility::OwnUnlessStaff => Scope::OwnedBy(actor.user_id),
    }
}
