//! PostgreSQL repository. Uniqueness and cascading deletes are enforced by
//! the schema in `migrations/`; this module maps rows and constraint names.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{ApplicationQuery, JobQuery, RepoResult, Repository, RepositoryError};
use crate::models::choices::InvalidChoice;
use crate::models::{
    Application, ApplicationFields, Company, CompanyFields, Credentials, Interview,
    InterviewFields, Job, JobFields, NewUser, ProfileFields, User, UserProfile, UserType,
};
use crate::scope::Scope;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, is_staff, date_joined, password_hash";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    is_staff: bool,
    date_joined: DateTime<Utc>,
    password_hash: String,
}

impl From<UserRow> for Credentials {
    fn from(row: UserRow) -> Self {
        Credentials {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                is_staff: row.is_staff,
                date_joined: row.date_joined,
            },
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: Uuid,
    user_id: Uuid,
    user_type: String,
    phone: String,
    bio: String,
    location: String,
    profile_picture: Option<String>,
    resume: Option<String>,
    linkedin_url: String,
    github_url: String,
    portfolio_url: String,
    skills: String,
    experience_years: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for UserProfile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> RepoResult<Self> {
        Ok(UserProfile {
            id: row.id,
            user_id: row.user_id,
            user_type: choice("user_type", &row.user_type)?,
            phone: row.phone,
            bio: row.bio,
            location: row.location,
            profile_picture: row.profile_picture,
            resume: row.resume,
            linkedin_url: row.linkedin_url,
            github_url: row.github_url,
            portfolio_url: row.portfolio_url,
            skills: row.skills,
            experience_years: unsigned("experience_years", row.experience_years)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    description: String,
    website: String,
    logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Company {
            id: row.id,
            name: row.name,
            description: row.description,
            website: row.website,
            logo: row.logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct JobRow {
    id: Uuid,
    title: String,
    company_id: Uuid,
    description: String,
    requirements: String,
    location: String,
    remote_allowed: bool,
    employment_type: String,
    experience_level: String,
    salary_min: Option<Decimal>,
    salary_max: Option<Decimal>,
    status: String,
    posted_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deadline: Option<DateTime<Utc>>,
}

impl TryFrom<JobRow> for Job {
    type Error = RepositoryError;

    fn try_from(row: JobRow) -> RepoResult<Self> {
        Ok(Job {
            id: row.id,
            title: row.title,
            company_id: row.company_id,
            description: row.description,
            requirements: row.requirements,
            location: row.location,
            remote_allowed: row.remote_allowed,
            employment_type: choice("employment_type", &row.employment_type)?,
            experience_level: choice("experience_level", &row.experience_level)?,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            status: choice("status", &row.status)?,
            posted_by: row.posted_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deadline: row.deadline,
        })
    }
}

#[derive(Debug, FromRow)]
struct ApplicationRow {
    id: Uuid,
    job_id: Uuid,
    applicant_id: Uuid,
    cover_letter: String,
    resume: String,
    status: String,
    applied_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    notes: String,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = RepositoryError;

    fn try_from(row: ApplicationRow) -> RepoResult<Self> {
        Ok(Application {
            id: row.id,
            job_id: row.job_id,
            applicant_id: row.applicant_id,
            cover_letter: row.cover_letter,
            resume: row.resume,
            status: choice("status", &row.status)?,
            applied_at: row.applied_at,
            updated_at: row.updated_at,
            notes: row.notes,
        })
    }
}

#[derive(Debug, FromRow)]
struct InterviewRow {
    id: Uuid,
    application_id: Uuid,
    interview_type: String,
    scheduled_at: DateTime<Utc>,
    duration_minutes: i32,
    interviewer_id: Uuid,
    status: String,
    notes: String,
    feedback: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<InterviewRow> for Interview {
    type Error = RepositoryError;

    fn try_from(row: InterviewRow) -> RepoResult<Self> {
        Ok(Interview {
            id: row.id,
            application_id: row.application_id,
            interview_type: choice("interview_type", &row.interview_type)?,
            scheduled_at: row.scheduled_at,
            duration_minutes: unsigned("duration_minutes", row.duration_minutes)?,
            interviewer_id: row.interviewer_id,
            status: choice("status", &row.status)?,
            notes: row.notes,
            feedback: row.feedback,
            created_at: row.created_at,
        })
    }
}

fn choice<T: FromStr<Err = InvalidChoice>>(column: &str, value: &str) -> RepoResult<T> {
    value
        .parse()
        .map_err(|err: InvalidChoice| RepositoryError::Corrupt(format!("{column}: {err}")))
}

fn unsigned(column: &str, value: i32) -> RepoResult<u32> {
    u32::try_from(value)
        .map_err(|_| RepositoryError::Corrupt(format!("{column}: negative value {value}")))
}

fn signed(column: &'static str, value: u32) -> RepoResult<i32> {
    i32::try_from(value).map_err(|_| RepositoryError::Conflict {
        field: column,
        message: "Ensure this value is less than or equal to 2147483647.",
    })
}

fn collect<R, T>(rows: Vec<R>) -> RepoResult<Vec<T>>
where
    T: TryFrom<R, Error = RepositoryError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn owner(scope: Scope) -> Option<Uuid> {
    match scope {
        Scope::Unrestricted => None,
        Scope::OwnedBy(user_id) => Some(user_id),
    }
}

/// Escapes LIKE metacharacters and wraps the term for a substring match.
fn contains_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Foreign keys a write may trip, as (constraint, payload field, id).
type References<'a> = &'a [(&'a str, &'static str, Uuid)];

/// Translates constraint violations into domain errors.
fn write_error(err: sqlx::Error, references: References<'_>) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err {
        match db.constraint() {
            Some("applications_job_applicant_key") => {
                return RepositoryError::duplicate_application()
            }
            Some("users_username_key") => return RepositoryError::duplicate_username(),
            Some("user_profiles_user_key") => return RepositoryError::duplicate_profile(),
            Some(name) => {
                if let Some((_, field, id)) = references.iter().find(|(c, _, _)| *c == name) {
                    return RepositoryError::InvalidReference {
                        field: *field,
                        id: *id,
                    };
                }
            }
            None => {}
        }
    }
    RepositoryError::Backend(err)
}

fn expect_deleted(rows_affected: u64, what: &'static str) -> RepoResult<()> {
    if rows_affected == 0 {
        Err(RepositoryError::NotFound(what))
    } else {
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(
        &self,
        user: NewUser,
        user_type: UserType,
    ) -> RepoResult<(User, UserProfile)> {
        let mut tx = self.pool.begin().await?;

        let row: UserRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, is_staff)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_staff)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &[]))?;

        let profile: ProfileRow = sqlx::query_as(
            "INSERT INTO user_profiles (id, user_id, user_type) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(row.id)
        .bind(user_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, &[]))?;

        tx.commit().await?;

        let credentials = Credentials::from(row);
        debug!("Created user {} with profile", credentials.user.id);
        Ok((credentials.user, profile.try_into()?))
    }

    async fn find_credentials(&self, username: &str) -> RepoResult<Option<Credentials>> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Credentials::from))
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<User> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| Credentials::from(r).user)
            .ok_or(RepositoryError::NotFound("User"))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "User")
    }

    async fn list_profiles(&self, scope: Scope) -> RepoResult<Vec<UserProfile>> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r#"
            SELECT * FROM user_profiles
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at
            "#,
        )
        .bind(owner(scope))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_profile(&self, id: Uuid, scope: Scope) -> RepoResult<UserProfile> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT * FROM user_profiles WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
        )
        .bind(id)
        .bind(owner(scope))
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound("Profile"))?.try_into()
    }

    async fn profile_for_user(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>> {
        let row: Option<ProfileRow> =
            sqlx::query_as("SELECT * FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(UserProfile::try_from).transpose()
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> RepoResult<UserProfile> {
        let experience_years = signed("experience_years", fields.experience_years)?;
        let row: ProfileRow = sqlx::query_as(
            r#"
            INSERT INTO user_profiles
                (id, user_id, user_type, phone, bio, location, profile_picture, resume,
                 linkedin_url, github_url, portfolio_url, skills, experience_years)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(fields.user_type.as_str())
        .bind(&fields.phone)
        .bind(&fields.bio)
        .bind(&fields.location)
        .bind(&fields.profile_picture)
        .bind(&fields.resume)
        .bind(&fields.linkedin_url)
        .bind(&fields.github_url)
        .bind(&fields.portfolio_url)
        .bind(&fields.skills)
        .bind(experience_years)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, &[("user_profiles_user_fkey", "user", user_id)]))?;
        row.try_into()
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> RepoResult<UserProfile> {
        let experience_years = signed("experience_years", fields.experience_years)?;
        let row: Option<ProfileRow> = sqlx::query_as(
            r#"
            UPDATE user_profiles SET
                user_type = $2, phone = $3, bio = $4, location = $5, profile_picture = $6,
                resume = $7, linkedin_url = $8, github_url = $9, portfolio_url = $10,
                skills = $11, experience_years = $12, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.user_type.as_str())
        .bind(&fields.phone)
        .bind(&fields.bio)
        .bind(&fields.location)
        .bind(&fields.profile_picture)
        .bind(&fields.resume)
        .bind(&fields.linkedin_url)
        .bind(&fields.github_url)
        .bind(&fields.portfolio_url)
        .bind(&fields.skills)
        .bind(experience_years)
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound("Profile"))?.try_into()
    }

    async fn delete_profile(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Profile")
    }

    async fn list_companies(&self) -> RepoResult<Vec<Company>> {
        let rows: Vec<CompanyRow> = sqlx::query_as("SELECT * FROM companies ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn get_company(&self, id: Uuid) -> RepoResult<Company> {
        let row: Option<CompanyRow> = sqlx::query_as("SELECT * FROM companies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Company::from)
            .ok_or(RepositoryError::NotFound("Company"))
    }

    async fn create_company(&self, fields: CompanyFields) -> RepoResult<Company> {
        let row: CompanyRow = sqlx::query_as(
            r#"
            INSERT INTO companies (id, name, description, website, logo)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.website)
        .bind(&fields.logo)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_company(&self, id: Uuid, fields: CompanyFields) -> RepoResult<Company> {
        let row: Option<CompanyRow> = sqlx::query_as(
            r#"
            UPDATE companies
            SET name = $2, description = $3, website = $4, logo = $5, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(&fields.website)
        .bind(&fields.logo)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Company::from)
            .ok_or(RepositoryError::NotFound("Company"))
    }

    async fn delete_company(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Company")
    }

    async fn list_jobs(&self, query: &JobQuery) -> RepoResult<Vec<Job>> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            SELECT j.* FROM jobs j
            JOIN companies c ON c.id = j.company_id
            WHERE ($1::uuid IS NULL OR j.posted_by = $1)
              AND ($2::text IS NULL OR j.status = $2)
              AND ($3::text IS NULL OR j.employment_type = $3)
              AND ($4::text IS NULL
                   OR j.title ILIKE $4 ESCAPE '\'
                   OR j.description ILIKE $4 ESCAPE '\'
                   OR c.name ILIKE $4 ESCAPE '\')
            ORDER BY j.created_at DESC
            "#,
        )
        .bind(owner(query.scope()))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.employment_type.map(|t| t.as_str()))
        .bind(query.search.as_deref().map(contains_pattern))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_job(&self, id: Uuid) -> RepoResult<Job> {
        let row: Option<JobRow> = sqlx::query_as("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.ok_or(RepositoryError::NotFound("Job"))?.try_into()
    }

    async fn create_job(&self, posted_by: Uuid, fields: JobFields) -> RepoResult<Job> {
        let row: JobRow = sqlx::query_as(
            r#"
            INSERT INTO jobs
                (id, title, company_id, description, requirements, location, remote_allowed,
                 employment_type, experience_level, salary_min, salary_max, status,
                 posted_by, deadline)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&fields.title)
        .bind(fields.company_id)
        .bind(&fields.description)
        .bind(&fields.requirements)
        .bind(&fields.location)
        .bind(fields.remote_allowed)
        .bind(fields.employment_type.as_str())
        .bind(fields.experience_level.as_str())
        .bind(fields.salary_min)
        .bind(fields.salary_max)
        .bind(fields.status.as_str())
        .bind(posted_by)
        .bind(fields.deadline)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                &[
                    ("jobs_company_fkey", "company", fields.company_id),
                    ("jobs_posted_by_fkey", "posted_by", posted_by),
                ],
            )
        })?;
        row.try_into()
    }

    async fn update_job(&self, id: Uuid, fields: JobFields) -> RepoResult<Job> {
        let row: Option<JobRow> = sqlx::query_as(
            r#"
            UPDATE jobs SET
                title = $2, company_id = $3, description = $4, requirements = $5,
                location = $6, remote_allowed = $7, employment_type = $8,
                experience_level = $9, salary_min = $10, salary_max = $11, status = $12,
                deadline = $13, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&fields.title)
        .bind(fields.company_id)
        .bind(&fields.description)
        .bind(&fields.requirements)
        .bind(&fields.location)
        .bind(fields.remote_allowed)
        .bind(fields.employment_type.as_str())
        .bind(fields.experience_level.as_str())
        .bind(fields.salary_min)
        .bind(fields.salary_max)
        .bind(fields.status.as_str())
        .bind(fields.deadline)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, &[("jobs_company_fkey", "company", fields.company_id)]))?;
        row.ok_or(RepositoryError::NotFound("Job"))?.try_into()
    }

    async fn delete_job(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Job")
    }

    async fn count_applications(&self, job_id: Uuid) -> RepoResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = $1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn list_applications(&self, query: &ApplicationQuery) -> RepoResult<Vec<Application>> {
        let rows: Vec<ApplicationRow> = sqlx::query_as(
            r#"
            SELECT * FROM applications
            WHERE ($1::uuid IS NULL OR applicant_id = $1)
              AND ($2::uuid IS NULL OR job_id = $2)
              AND ($3::text IS NULL OR status = $3)
            ORDER BY applied_at DESC
            "#,
        )
        .bind(owner(query.scope()))
        .bind(query.job_id)
        .bind(query.status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_application(&self, id: Uuid, scope: Scope) -> RepoResult<Application> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            "SELECT * FROM applications WHERE id = $1 AND ($2::uuid IS NULL OR applicant_id = $2)",
        )
        .bind(id)
        .bind(owner(scope))
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound("Application"))?
            .try_into()
    }

    async fn create_application(
        &self,
        applicant_id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application> {
        let row: ApplicationRow = sqlx::query_as(
            r#"
            INSERT INTO applications (id, job_id, applicant_id, cover_letter, resume, status, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.job_id)
        .bind(applicant_id)
        .bind(&fields.cover_letter)
        .bind(&fields.resume)
        .bind(fields.status.as_str())
        .bind(&fields.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                &[
                    ("applications_job_fkey", "job", fields.job_id),
                    ("applications_applicant_fkey", "applicant", applicant_id),
                ],
            )
        })?;
        row.try_into()
    }

    async fn update_application(
        &self,
        id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application> {
        let row: Option<ApplicationRow> = sqlx::query_as(
            r#"
            UPDATE applications SET
                job_id = $2, cover_letter = $3, resume = $4, status = $5, notes = $6,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.job_id)
        .bind(&fields.cover_letter)
        .bind(&fields.resume)
        .bind(fields.status.as_str())
        .bind(&fields.notes)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, &[("applications_job_fkey", "job", fields.job_id)]))?;
        row.ok_or(RepositoryError::NotFound("Application"))?
            .try_into()
    }

    async fn delete_application(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Application")
    }

    async fn list_interviews(&self, scope: Scope) -> RepoResult<Vec<Interview>> {
        let rows: Vec<InterviewRow> = sqlx::query_as(
            r#"
            SELECT * FROM interviews
            WHERE ($1::uuid IS NULL OR interviewer_id = $1)
            ORDER BY scheduled_at, created_at
            "#,
        )
        .bind(owner(scope))
        .fetch_all(&self.pool)
        .await?;
        collect(rows)
    }

    async fn get_interview(&self, id: Uuid, scope: Scope) -> RepoResult<Interview> {
        let row: Option<InterviewRow> = sqlx::query_as(
            "SELECT * FROM interviews WHERE id = $1 AND ($2::uuid IS NULL OR interviewer_id = $2)",
        )
        .bind(id)
        .bind(owner(scope))
        .fetch_optional(&self.pool)
        .await?;
        row.ok_or(RepositoryError::NotFound("Interview"))?
            .try_into()
    }

    async fn create_interview(
        &self,
        interviewer_id: Uuid,
        fields: InterviewFields,
    ) -> RepoResult<Interview> {
        let duration = signed("duration_minutes", fields.duration_minutes)?;
        let row: InterviewRow = sqlx::query_as(
            r#"
            INSERT INTO interviews
                (id, application_id, interview_type, scheduled_at, duration_minutes,
                 interviewer_id, status, notes, feedback)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(fields.application_id)
        .bind(fields.interview_type.as_str())
        .bind(fields.scheduled_at)
        .bind(duration)
        .bind(interviewer_id)
        .bind(fields.status.as_str())
        .bind(&fields.notes)
        .bind(&fields.feedback)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                &[
                    ("interviews_application_fkey", "application", fields.application_id),
                    ("interviews_interviewer_fkey", "interviewer", interviewer_id),
                ],
            )
        })?;
        row.try_into()
    }

    async fn update_interview(&self, id: Uuid, fields: InterviewFields) -> RepoResult<Interview> {
        let duration = signed("duration_minutes", fields.duration_minutes)?;
        let row: Option<InterviewRow> = sqlx::query_as(
            r#"
            UPDATE interviews SET
                application_id = $2, interview_type = $3, scheduled_at = $4,
                duration_minutes = $5, status = $6, notes = $7, feedback = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.application_id)
        .bind(fields.interview_type.as_str())
        .bind(fields.scheduled_at)
        .bind(duration)
        .bind(fields.status.as_str())
        .bind(&fields.notes)
        .bind(&fields.feedback)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            write_error(
                e,
                &[("interviews_application_fkey", "application", fields.application_id)],
            )
        })?;
        row.ok_or(RepositoryError::NotFound("Interview"))?
            .try_into()
    }

    async fn delete_interview(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM interviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_deleted(result.rows_affected(), "Interview")
    }
}
