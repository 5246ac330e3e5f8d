use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::choices::ApplicationStatus;

/// A candidate's application to a job. At most one per (job, applicant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub job_id: Uuid,
    pub applicant_id: Uuid,
    pub cover_letter: String,
    /// Blob reference under `resumes/`.
    pub resume: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Internal notes for recruiters.
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationFields {
    pub job_id: Uuid,
    pub cover_letter: String,
    pub resume: String,
    pub status: ApplicationStatus,
    pub notes: String,
}
