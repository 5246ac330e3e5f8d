//! Storage contract consumed by the handlers.
//!
//! Implementations must enforce the (job, applicant) uniqueness, the
//! one-profile-per-user rule and cascading deletes atomically; nothing
//! above this layer re-checks them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    Application, ApplicationFields, ApplicationStatus, Company, CompanyFields, Credentials,
    EmploymentType, Interview, InterviewFields, Job, JobFields, JobStatus, NewUser,
    ProfileFields, User, UserProfile, UserType,
};
use crate::scope::Scope;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness rule rejected the write; `field` names the input at fault.
    #[error("{message}")]
    Conflict {
        field: &'static str,
        message: &'static str,
    },

    #[error("{field} references missing row {id}")]
    InvalidReference { field: &'static str, id: Uuid },

    #[error("stored row could not be decoded: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Backend(#[from] sqlx::Error),

    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// Job listing query. The scope is fixed at construction; the public
/// fields are request filters AND-ed on top of it.
#[derive(Debug, Clone)]
pub struct JobQuery {
    scope: Scope,
    pub status: Option<JobStatus>,
    pub employment_type: Option<EmploymentType>,
    /// Case-insensitive substring over title, description and company name.
    pub search: Option<String>,
}

impl JobQuery {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            status: None,
            employment_type: None,
            search: None,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

#[derive(Debug, Clone)]
pub struct ApplicationQuery {
    scope: Scope,
    pub job_id: Option<Uuid>,
    pub status: Option<ApplicationStatus>,
}

impl ApplicationQuery {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            job_id: None,
            status: None,
        }
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }
}

/// Orderings: companies by name, jobs newest first, applications most
/// recently applied first, interviews by schedule, profiles by creation.
#[async_trait]
pub trait Repository: Send + Sync {
    // Users and profiles

    /// Creates the identity and its profile in one transaction.
    async fn create_user(
        &self,
        user: NewUser,
        user_type: UserType,
    ) -> RepoResult<(User, UserProfile)>;
    async fn find_credentials(&self, username: &str) -> RepoResult<Option<Credentials>>;
    async fn get_user(&self, id: Uuid) -> RepoResult<User>;
    /// Removes the user with their profile, posted jobs, applications and
    /// conducted interviews.
    async fn delete_user(&self, id: Uuid) -> RepoResult<()>;

    async fn list_profiles(&self, scope: Scope) -> RepoResult<Vec<UserProfile>>;
    async fn get_profile(&self, id: Uuid, scope: Scope) -> RepoResult<UserProfile>;
    async fn profile_for_user(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>>;
    async fn create_profile(&self, user_id: Uuid, fields: ProfileFields)
        -> RepoResult<UserProfile>;
    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> RepoResult<UserProfile>;
    async fn delete_profile(&self, id: Uuid) -> RepoResult<()>;

    // Companies

    async fn list_companies(&self) -> RepoResult<Vec<Company>>;
    async fn get_company(&self, id: Uuid) -> RepoResult<Company>;
    async fn create_company(&self, fields: CompanyFields) -> RepoResult<Company>;
    async fn update_company(&self, id: Uuid, fields: CompanyFields) -> RepoResult<Company>;
    /// Cascades to the company's jobs, their applications and interviews.
    async fn delete_company(&self, id: Uuid) -> RepoResult<()>;

    // Jobs

    async fn list_jobs(&self, query: &JobQuery) -> RepoResult<Vec<Job>>;
    async fn get_job(&self, id: Uuid) -> RepoResult<Job>;
    async fn create_job(&self, posted_by: Uuid, fields: JobFields) -> RepoResult<Job>;
    async fn update_job(&self, id: Uuid, fields: JobFields) -> RepoResult<Job>;
    async fn delete_job(&self, id: Uuid) -> RepoResult<()>;
    /// Live count of applications referencing the job.
    async fn count_applications(&self, job_id: Uuid) -> RepoResult<u64>;

    // Applications

    async fn list_applications(&self, query: &ApplicationQuery) -> RepoResult<Vec<Application>>;
    async fn get_application(&self, id: Uuid, scope: Scope) -> RepoResult<Application>;
    /// Fails with [`RepositoryError::Conflict`] if the applicant already
    /// applied to the job.
    async fn create_application(
        &self,
        applicant_id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application>;
    async fn update_application(
        &self,
        id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application>;
    async fn delete_application(&self, id: Uuid) -> RepoResult<()>;

    // Interviews

    async fn list_interviews(&self, scope: Scope) -> RepoResult<Vec<Interview>>;
    async fn get_interview(&self, id: Uuid, scope: Scope) -> RepoResult<Interview>;
    async fn create_interview(
        &self,
        interviewer_id: Uuid,
        fields: InterviewFields,
    ) -> RepoResult<Interview>;
    async fn update_interview(&self, id: Uuid, fields: InterviewFields) -> RepoResult<Interview>;
    async fn delete_interview(&self, id: Uuid) -> RepoResult<()>;
}

impl RepositoryError {
    pub(crate) fn duplicate_application() -> Self {
        RepositoryError::Conflict {
            field: crate::errors::NON_FIELD_ERRORS,
            message: "The fields job, applicant must make a unique set.",
        }
    }

    pub(crate) fn duplicate_profile() -> Self {
        RepositoryError::Conflict {
            field: crate::errors::NON_FIELD_ERRORS,
            message: "A profile already exists for this user.",
        }
    }

    pub(crate) fn duplicate_username() -> Self {
        RepositoryError::Conflict {
            field: "username",
            message: "A user with that username already exists.",
        }
    }
}
