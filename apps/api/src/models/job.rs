use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::choices::{EmploymentType, ExperienceLevel, JobStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company_id: Uuid,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub remote_allowed: bool,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub status: JobStatus,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Writable job fields. `posted_by` is never part of this set; it is
/// supplied by the repository call from the authenticated actor.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFields {
    pub title: String,
    pub company_id: Uuid,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub remote_allowed: bool,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub status: JobStatus,
    pub deadline: Option<DateTime<Utc>>,
}
