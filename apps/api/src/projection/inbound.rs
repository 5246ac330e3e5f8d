//! Request payloads and their validation into writable field sets.
//!
//! Payload structs only carry the writable columns; the actor-derived owner
//! (`posted_by`, `applicant`, `interviewer`, a profile's `user`) has no field
//! here and unknown keys are ignored, so it can never be supplied by a client.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::errors::{AppError, FieldErrors};
use crate::models::choices::InvalidChoice;
use crate::models::{
    Application, ApplicationFields, ApplicationStatus, Company, CompanyFields, EmploymentType,
    ExperienceLevel, Interview, InterviewFields, InterviewStatus, InterviewType, Job, JobFields,
    JobStatus, ProfileFields, UserProfile, UserType,
};
use crate::models::interview::DEFAULT_DURATION_MINUTES;
use crate::storage::{has_allowed_extension, IMAGE_EXTENSIONS, RESUME_EXTENSIONS};

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const URL_MAX_LENGTH: usize = 200;
const SALARY_WHOLE_DIGITS: usize = 8;
const SALARY_DECIMAL_PLACES: u32 = 2;

/// What a validated payload is written over.
pub enum Write<'a, T> {
    Create,
    /// Full replacement: required fields must be supplied, omitted optional
    /// fields keep their stored value.
    Update(&'a T),
    /// Only the supplied fields change.
    PartialUpdate(&'a T),
}

impl<T> Clone for Write<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Write<'_, T> {}

impl<'a, T> Write<'a, T> {
    fn keep<V>(self, get: impl FnOnce(&T) -> V) -> Option<V> {
        match self {
            Write::Create => None,
            Write::Update(current) | Write::PartialUpdate(current) => Some(get(current)),
        }
    }

    fn keep_required<V>(self, get: impl FnOnce(&T) -> V) -> Option<V> {
        match self {
            Write::PartialUpdate(current) => Some(get(current)),
            _ => None,
        }
    }
}

/// Distinguishes an explicit `null` (`Some(None)`) from an absent key (`None`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn merge_nullable<V>(supplied: Option<Option<V>>, kept: Option<Option<V>>) -> Option<V> {
    supplied.or(kept).flatten()
}

fn require<T: Default>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> T {
    value.unwrap_or_else(|| {
        errors.add(field, REQUIRED);
        T::default()
    })
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str, max: Option<usize>) {
    if let Some(max) = max {
        if value.chars().count() > max {
            errors.add(
                field,
                format!("Ensure this field has no more than {max} characters."),
            );
        }
    }
}

fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> String {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return String::new();
    };
    let value = value.trim().to_string();
    if value.is_empty() {
        errors.add(field, BLANK);
    }
    check_length(errors, field, &value, max);
    value
}

fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    max: Option<usize>,
) -> String {
    let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
    check_length(errors, field, &value, max);
    value
}

/// Blank, or an absolute http(s) URL.
fn url_field(errors: &mut FieldErrors, field: &str, value: Option<String>) -> String {
    let value = optional_text(errors, field, value, Some(URL_MAX_LENGTH));
    if !value.is_empty() && !is_web_url(&value) {
        errors.add(field, "Enter a valid URL.");
    }
    value
}

fn is_web_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host().is_some())
        .unwrap_or(false)
}

fn file_reference(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
    allowed: &[&str],
) -> Option<String> {
    let value = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())?;
    if !has_allowed_extension(&value, allowed) {
        errors.add(
            field,
            format!(
                "File extension is not allowed. Allowed extensions are: {}.",
                allowed.join(", ")
            ),
        );
    }
    Some(value)
}

/// `Some(default)` after recording an error for an unknown value, so that a
/// later `require` does not report the field twice.
fn parse_choice<T>(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<T>
where
    T: FromStr<Err = InvalidChoice> + Default,
{
    let value = value?;
    match value.parse() {
        Ok(choice) => Some(choice),
        Err(err) => {
            errors.add(field, err.to_string());
            Some(T::default())
        }
    }
}

fn non_negative(errors: &mut FieldErrors, field: &str, value: Option<i64>) -> Option<u32> {
    let value = value?;
    if value < 0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
        return Some(0);
    }
    match u32::try_from(value) {
        Ok(v) if v <= i32::MAX as u32 => Some(v),
        _ => {
            errors.add(field, "Ensure this value is less than or equal to 2147483647.");
            Some(0)
        }
    }
}

fn salary(errors: &mut FieldErrors, field: &str, value: Option<Decimal>) -> Option<Decimal> {
    let value = value?;
    if value.scale() > SALARY_DECIMAL_PLACES {
        errors.add(
            field,
            format!("Ensure that there are no more than {SALARY_DECIMAL_PLACES} decimal places."),
        );
    }
    let whole = value.abs().trunc().to_string();
    let whole_digits = whole
        .split('.')
        .next()
        .map_or(0, |digits| digits.trim_start_matches('0').len());
    if whole_digits > SALARY_WHOLE_DIGITS {
        errors.add(
            field,
            format!(
                "Ensure that there are no more than {SALARY_WHOLE_DIGITS} digits before the decimal point."
            ),
        );
    }
    Some(value)
}

/// Parses an optional query-string choice. Empty values are ignored.
pub fn query_choice<T>(field: &str, value: Option<String>) -> Result<Option<T>, AppError>
where
    T: FromStr<Err = InvalidChoice>,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|err: InvalidChoice| AppError::validation(field, err.to_string())),
    }
}

pub fn query_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Companies

#[derive(Debug, Default, Deserialize)]
pub struct CompanyPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub website: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub logo: Option<Option<String>>,
}

impl From<&Company> for CompanyFields {
    fn from(company: &Company) -> Self {
        CompanyFields {
            name: company.name.clone(),
            description: company.description.clone(),
            website: company.website.clone(),
            logo: company.logo.clone(),
        }
    }
}

impl CompanyPayload {
    pub fn validate(self, write: Write<'_, CompanyFields>) -> Result<CompanyFields, AppError> {
        let mut errors = FieldErrors::new();

        let name = required_text(
            &mut errors,
            "name",
            self.name.or_else(|| write.keep_required(|c| c.name.clone())),
            Some(200),
        );
        let description = optional_text(
            &mut errors,
            "description",
            self.description
                .or_else(|| write.keep(|c| c.description.clone())),
            None,
        );
        let website = url_field(
            &mut errors,
            "website",
            self.website.or_else(|| write.keep(|c| c.website.clone())),
        );
        let logo = file_reference(
            &mut errors,
            "logo",
            merge_nullable(self.logo, write.keep(|c| c.logo.clone())),
            IMAGE_EXTENSIONS,
        );

        errors.finish(|| CompanyFields {
            name,
            description,
            website,
            logo,
        })
    }
}

// Jobs

/// Writable job fields. There is no `posted_by`.
#[derive(Debug, Default, Deserialize)]
pub struct JobPayload {
    pub title: Option<String>,
    pub company: Option<Uuid>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub location: Option<String>,
    pub remote_allowed: Option<bool>,
    pub employment_type: Option<String>,
    pub experience_level: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary_min: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub salary_max: Option<Option<Decimal>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl From<&Job> for JobFields {
    fn from(job: &Job) -> Self {
        JobFields {
            title: job.title.clone(),
            company_id: job.company_id,
            description: job.description.clone(),
            requirements: job.requirements.clone(),
            location: job.location.clone(),
            remote_allowed: job.remote_allowed,
            employment_type: job.employment_type,
            experience_level: job.experience_level,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            status: job.status,
            deadline: job.deadline,
        }
    }
}

impl JobPayload {
    pub fn validate(self, write: Write<'_, JobFields>) -> Result<JobFields, AppError> {
        let mut errors = FieldErrors::new();

        let title = required_text(
            &mut errors,
            "title",
            self.title.or_else(|| write.keep_required(|j| j.title.clone())),
            Some(200),
        );
        let company_id = require(
            &mut errors,
            "company",
            self.company.or_else(|| write.keep_required(|j| j.company_id)),
        );
        let description = required_text(
            &mut errors,
            "description",
            self.description
                .or_else(|| write.keep_required(|j| j.description.clone())),
            None,
        );
        let requirements = required_text(
            &mut errors,
            "requirements",
            self.requirements
                .or_else(|| write.keep_required(|j| j.requirements.clone())),
            None,
        );
        let location = required_text(
            &mut errors,
            "location",
            self.location
                .or_else(|| write.keep_required(|j| j.location.clone())),
            Some(200),
        );
        let remote_allowed = self
            .remote_allowed
            .or_else(|| write.keep(|j| j.remote_allowed))
            .unwrap_or(false);
        let employment_type: EmploymentType = {
            let parsed = parse_choice(&mut errors, "employment_type", self.employment_type);
            require(
                &mut errors,
                "employment_type",
                parsed.or_else(|| write.keep_required(|j| j.employment_type)),
            )
        };
        let experience_level: ExperienceLevel = {
            let parsed = parse_choice(&mut errors, "experience_level", self.experience_level);
            require(
                &mut errors,
                "experience_level",
                parsed.or_else(|| write.keep_required(|j| j.experience_level)),
            )
        };
        let salary_min = salary(
            &mut errors,
            "salary_min",
            merge_nullable(self.salary_min, write.keep(|j| j.salary_min)),
        );
        let salary_max = salary(
            &mut errors,
            "salary_max",
            merge_nullable(self.salary_max, write.keep(|j| j.salary_max)),
        );
        let status: JobStatus = parse_choice(&mut errors, "status", self.status)
            .or_else(|| write.keep(|j| j.status))
            .unwrap_or_default();
        let deadline = merge_nullable(self.deadline, write.keep(|j| j.deadline));

        errors.finish(|| JobFields {
            title,
            company_id,
            description,
            requirements,
            location,
            remote_allowed,
            employment_type,
            experience_level,
            salary_min,
            salary_max,
            status,
            deadline,
        })
    }
}

// Applications

/// Writable application fields. There is no `applicant`.
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationPayload {
    pub job: Option<Uuid>,
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl From<&Application> for ApplicationFields {
    fn from(application: &Application) -> Self {
        ApplicationFields {
            job_id: application.job_id,
            cover_letter: application.cover_letter.clone(),
            resume: application.resume.clone(),
            status: application.status,
            notes: application.notes.clone(),
        }
    }
}

impl ApplicationPayload {
    pub fn validate(
        self,
        write: Write<'_, ApplicationFields>,
    ) -> Result<ApplicationFields, AppError> {
        let mut errors = FieldErrors::new();

        let job_id = require(
            &mut errors,
            "job",
            self.job.or_else(|| write.keep_required(|a| a.job_id)),
        );
        let cover_letter = optional_text(
            &mut errors,
            "cover_letter",
            self.cover_letter
                .or_else(|| write.keep(|a| a.cover_letter.clone())),
            None,
        );
        let resume = file_reference(
            &mut errors,
            "resume",
            self.resume.or_else(|| write.keep_required(|a| a.resume.clone())),
            RESUME_EXTENSIONS,
        );
        if resume.is_none() {
            errors.add("resume", "No file was submitted.");
        }
        let status: ApplicationStatus = parse_choice(&mut errors, "status", self.status)
            .or_else(|| write.keep(|a| a.status))
            .unwrap_or_default();
        let notes = optional_text(
            &mut errors,
            "notes",
            self.notes.or_else(|| write.keep(|a| a.notes.clone())),
            None,
        );

        errors.finish(|| ApplicationFields {
            job_id,
            cover_letter,
            resume: resume.unwrap_or_default(),
            status,
            notes,
        })
    }
}

// Interviews

/// Writable interview fields. There is no `interviewer`.
#[derive(Debug, Default, Deserialize)]
pub struct InterviewPayload {
    pub application: Option<Uuid>,
    pub interview_type: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i64>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub feedback: Option<String>,
}

impl From<&Interview> for InterviewFields {
    fn from(interview: &Interview) -> Self {
        InterviewFields {
            application_id: interview.application_id,
            interview_type: interview.interview_type,
            scheduled_at: interview.scheduled_at,
            duration_minutes: interview.duration_minutes,
            status: interview.status,
            notes: interview.notes.clone(),
            feedback: interview.feedback.clone(),
        }
    }
}

impl InterviewPayload {
    pub fn validate(self, write: Write<'_, InterviewFields>) -> Result<InterviewFields, AppError> {
        let mut errors = FieldErrors::new();

        let application_id = require(
            &mut errors,
            "application",
            self.application
                .or_else(|| write.keep_required(|i| i.application_id)),
        );
        let interview_type: InterviewType = {
            let parsed = parse_choice(&mut errors, "interview_type", self.interview_type);
            require(
                &mut errors,
                "interview_type",
                parsed.or_else(|| write.keep_required(|i| i.interview_type)),
            )
        };
        let scheduled_at = require(
            &mut errors,
            "scheduled_at",
            self.scheduled_at
                .or_else(|| write.keep_required(|i| i.scheduled_at)),
        );
        let duration_minutes = non_negative(&mut errors, "duration_minutes", self.duration_minutes)
            .or_else(|| write.keep(|i| i.duration_minutes))
            .unwrap_or(DEFAULT_DURATION_MINUTES);
        let status: InterviewStatus = parse_choice(&mut errors, "status", self.status)
            .or_else(|| write.keep(|i| i.status))
            .unwrap_or_default();
        let notes = optional_text(
            &mut errors,
            "notes",
            self.notes.or_else(|| write.keep(|i| i.notes.clone())),
            None,
        );
        let feedback = optional_text(
            &mut errors,
            "feedback",
            self.feedback.or_else(|| write.keep(|i| i.feedback.clone())),
            None,
        );

        errors.finish(|| InterviewFields {
            application_id,
            interview_type,
            scheduled_at,
            duration_minutes,
            status,
            notes,
            feedback,
        })
    }
}

// Profiles

/// Writable profile fields. There is no `user`.
#[derive(Debug, Default, Deserialize)]
pub struct ProfilePayload {
    pub user_type: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub profile_picture: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub resume: Option<Option<String>>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub skills: Option<String>,
    pub experience_years: Option<i64>,
}

impl From<&UserProfile> for ProfileFields {
    fn from(profile: &UserProfile) -> Self {
        ProfileFields {
            user_type: profile.user_type,
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            location: profile.location.clone(),
            profile_picture: profile.profile_picture.clone(),
            resume: profile.resume.clone(),
            linkedin_url: profile.linkedin_url.clone(),
            github_url: profile.github_url.clone(),
            portfolio_url: profile.portfolio_url.clone(),
            skills: profile.skills.clone(),
            experience_years: profile.experience_years,
        }
    }
}

impl ProfilePayload {
    pub fn validate(self, write: Write<'_, ProfileFields>) -> Result<ProfileFields, AppError> {
        let mut errors = FieldErrors::new();

        let user_type: UserType = parse_choice(&mut errors, "user_type", self.user_type)
            .or_else(|| write.keep(|p| p.user_type))
            .unwrap_or_default();
        let phone = optional_text(
            &mut errors,
            "phone",
            self.phone.or_else(|| write.keep(|p| p.phone.clone())),
            Some(20),
        );
        let bio = optional_text(
            &mut errors,
            "bio",
            self.bio.or_else(|| write.keep(|p| p.bio.clone())),
            None,
        );
        let location = optional_text(
            &mut errors,
            "location",
            self.location.or_else(|| write.keep(|p| p.location.clone())),
            Some(200),
        );
        let profile_picture = file_reference(
            &mut errors,
            "profile_picture",
            merge_nullable(
                self.profile_picture,
                write.keep(|p| p.profile_picture.clone()),
            ),
            IMAGE_EXTENSIONS,
        );
        let resume = file_reference(
            &mut errors,
            "resume",
            merge_nullable(self.resume, write.keep(|p| p.resume.clone())),
            RESUME_EXTENSIONS,
        );
        let linkedin_url = url_field(
            &mut errors,
            "linkedin_url",
            self.linkedin_url
                .or_else(|| write.keep(|p| p.linkedin_url.clone())),
        );
        let github_url = url_field(
            &mut errors,
            "github_url",
            self.github_url.or_else(|| write.keep(|p| p.github_url.clone())),
        );
        let portfolio_url = url_field(
            &mut errors,
            "portfolio_url",
            self.portfolio_url
                .or_else(|| write.keep(|p| p.portfolio_url.clone())),
        );
        let skills = optional_text(
            &mut errors,
            "skills",
            self.skills.or_else(|| write.keep(|p| p.skills.clone())),
            None,
        );
        let experience_years = non_negative(&mut errors, "experience_years", self.experience_years)
            .or_else(|| write.keep(|p| p.experience_years))
            .unwrap_or(0);

        errors.finish(|| ProfileFields {
            user_type,
            phone,
            bio,
            location,
            profile_picture,
            resume,
            linkedin_url,
            github_url,
            portfolio_url,
            skills,
            experience_years,
        })
    }
}

// Registration and login

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub password_confirm: Option<String>,
    pub user_type: Option<String>,
}

/// A validated registration; the password is still in clear text.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub user_type: UserType,
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

fn valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

impl RegistrationPayload {
    pub fn validate(self) -> Result<Registration, AppError> {
        let mut errors = FieldErrors::new();

        let username = required_text(&mut errors, "username", self.username, Some(150));
        if !username.is_empty() && !valid_username(&username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }
        let email = optional_text(&mut errors, "email", self.email, Some(254));
        if !email.is_empty() && email.parse::<lettre::Address>().is_err() {
            errors.add("email", "Enter a valid email address.");
        }
        let first_name = optional_text(&mut errors, "first_name", self.first_name, Some(150));
        let last_name = optional_text(&mut errors, "last_name", self.last_name, Some(150));

        let password = match self.password {
            None => {
                errors.add("password", REQUIRED);
                String::new()
            }
            Some(p) if p.is_empty() => {
                errors.add("password", BLANK);
                p
            }
            Some(p) => {
                if p.chars().count() < MIN_PASSWORD_LENGTH {
                    errors.add(
                        "password",
                        format!(
                            "Ensure this field has at least {MIN_PASSWORD_LENGTH} characters."
                        ),
                    );
                }
                p
            }
        };
        match self.password_confirm {
            None => errors.add("password_confirm", REQUIRED),
            Some(confirm) if !password.is_empty() && confirm != password => {
                errors.add("password_confirm", "Passwords don't match")
            }
            Some(_) => {}
        }
        let user_type: UserType =
            parse_choice(&mut errors, "user_type", self.user_type).unwrap_or_default();

        errors.finish(|| Registration {
            username,
            email,
            first_name,
            last_name,
            password,
            user_type,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPayload {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshPayload {
    pub refresh: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields_of(err: AppError) -> FieldErrors {
        match err {
            AppError::Validation(errors) => errors,
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    fn registration(body: serde_json::Value) -> Result<Registration, AppError> {
        serde_json::from_value::<RegistrationPayload>(body)
            .unwrap()
            .validate()
    }

    #[test]
    fn test_registration_password_mismatch_names_confirm_field() {
        let err = registration(json!({
            "username": "alice",
            "password": "longenough",
            "password_confirm": "different!",
        }))
        .unwrap_err();
        assert_eq!(
            fields_of(err).get("password_confirm"),
            Some(&["Passwords don't match".to_string()][..])
        );
    }

    #[test]
    fn test_registration_defaults_to_candidate() {
        let reg = registration(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "longenough",
            "password_confirm": "longenough",
        }))
        .unwrap();
        assert_eq!(reg.user_type, UserType::Candidate);
        assert_eq!(reg.email, "alice@example.com");
    }

    #[test]
    fn test_registration_rejects_short_password_and_bad_username() {
        let errors = fields_of(
            registration(json!({
                "username": "bad name!",
                "email": "nope",
                "password": "short",
                "password_confirm": "short",
                "user_type": "overlord",
            }))
            .unwrap_err(),
        );
        assert!(errors.contains("username"));
        assert!(errors.contains("email"));
        assert!(errors.contains("password"));
        assert!(errors.contains("user_type"));
        assert!(!errors.contains("password_confirm"));
    }

    #[test]
    fn test_registration_rejects_malformed_email() {
        for email in ["a@b@c.com", "<x>@y.z", "a@b..c", "a@-.x", "user@", "@example.com"] {
            let errors = fields_of(
                registration(json!({
                    "username": "valid_name",
                    "email": email,
                    "password": "long enough",
                    "password_confirm": "long enough",
                }))
                .unwrap_err(),
            );
            assert!(errors.contains("email"), "{email} was accepted");
            assert!(!errors.contains("username"));
        }

        let accepted = registration(json!({
            "username": "valid_name",
            "email": "first.last+jobs@example.co.uk",
            "password": "long enough",
            "password_confirm": "long enough",
        }))
        .unwrap();
        assert_eq!(accepted.email, "first.last+jobs@example.co.uk");
    }

    #[test]
    fn test_job_payload_cannot_carry_posted_by() {
        let company = Uuid::new_v4();
        let payload: JobPayload = serde_json::from_value(json!({
            "title": "Engineer",
            "company": company,
            "description": "Build things",
            "requirements": "Rust",
            "location": "Berlin",
            "employment_type": "full_time",
            "experience_level": "senior",
            "posted_by": Uuid::new_v4(),
        }))
        .unwrap();

        let fields = payload.validate(Write::Create).unwrap();
        assert_eq!(fields.company_id, company);
        assert_eq!(fields.status, JobStatus::Draft);
        assert!(!fields.remote_allowed);
    }

    #[test]
    fn test_job_payload_reports_every_missing_field() {
        let errors = fields_of(JobPayload::default().validate(Write::Create).unwrap_err());
        for field in [
            "title",
            "company",
            "description",
            "requirements",
            "location",
            "employment_type",
            "experience_level",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("status"));
    }

    #[test]
    fn test_job_invalid_choice_reported_once() {
        let payload = JobPayload {
            employment_type: Some("gig".into()),
            ..JobPayload::default()
        };
        let errors = fields_of(payload.validate(Write::Create).unwrap_err());
        assert_eq!(
            errors.get("employment_type"),
            Some(&["\"gig\" is not a valid choice.".to_string()][..])
        );
    }

    #[test]
    fn test_salary_precision() {
        let mut errors = FieldErrors::new();
        salary(&mut errors, "salary_min", Some(Decimal::new(5_000_000, 2)));
        assert!(errors.is_empty());

        salary(&mut errors, "salary_min", Some(Decimal::new(12345, 3)));
        salary(&mut errors, "salary_max", Some(Decimal::new(123_456_789, 0)));
        assert!(errors.contains("salary_min"));
        assert!(errors.contains("salary_max"));
    }

    #[test]
    fn test_partial_update_keeps_unsupplied_fields() {
        let current = JobFields {
            title: "Engineer".into(),
            company_id: Uuid::new_v4(),
            description: "d".into(),
            requirements: "r".into(),
            location: "Paris".into(),
            remote_allowed: true,
            employment_type: EmploymentType::Contract,
            experience_level: ExperienceLevel::Lead,
            salary_min: Some(Decimal::new(100, 0)),
            salary_max: None,
            status: JobStatus::Active,
            deadline: None,
        };
        let payload: JobPayload =
            serde_json::from_value(json!({ "status": "closed", "salary_min": null })).unwrap();

        let merged = payload.validate(Write::PartialUpdate(&current)).unwrap();
        assert_eq!(merged.status, JobStatus::Closed);
        assert_eq!(merged.salary_min, None);
        assert_eq!(merged.title, "Engineer");
        assert!(merged.remote_allowed);
    }

    #[test]
    fn test_full_update_requires_required_fields() {
        let current = CompanyFields {
            name: "Acme".into(),
            description: "Widgets".into(),
            website: String::new(),
            logo: None,
        };
        let errors = fields_of(
            CompanyPayload::default()
                .validate(Write::Update(&current))
                .unwrap_err(),
        );
        assert!(errors.contains("name"));

        let kept = CompanyPayload {
            name: Some("Acme Corp".into()),
            ..CompanyPayload::default()
        }
        .validate(Write::Update(&current))
        .unwrap();
        assert_eq!(kept.description, "Widgets");
    }

    #[test]
    fn test_application_resume_extension_allow_list() {
        let job = Uuid::new_v4();
        let ok = ApplicationPayload {
            job: Some(job),
            resume: Some("resumes/cv.DOCX".into()),
            ..ApplicationPayload::default()
        }
        .validate(Write::Create)
        .unwrap();
        assert_eq!(ok.status, ApplicationStatus::Pending);

        let errors = fields_of(
            ApplicationPayload {
                job: Some(job),
                resume: Some("resumes/cv.exe".into()),
                ..ApplicationPayload::default()
            }
            .validate(Write::Create)
            .unwrap_err(),
        );
        assert!(errors.contains("resume"));

        let errors = fields_of(
            ApplicationPayload {
                job: Some(job),
                ..ApplicationPayload::default()
            }
            .validate(Write::Create)
            .unwrap_err(),
        );
        assert!(errors.contains("resume"));
    }

    #[test]
    fn test_interview_defaults() {
        let fields = InterviewPayload {
            application: Some(Uuid::new_v4()),
            interview_type: Some("technical".into()),
            scheduled_at: Some(Utc::now()),
            ..InterviewPayload::default()
        }
        .validate(Write::Create)
        .unwrap();
        assert_eq!(fields.duration_minutes, DEFAULT_DURATION_MINUTES);
        assert_eq!(fields.status, InterviewStatus::Scheduled);
    }

    #[test]
    fn test_profile_field_rules() {
        let errors = fields_of(
            ProfilePayload {
                phone: Some("0".repeat(21)),
                linkedin_url: Some("ftp://example.com".into()),
                github_url: Some("not a url".into()),
                profile_picture: Some(Some("profile_pics/me.pdf".into())),
                experience_years: Some(-1),
                ..ProfilePayload::default()
            }
            .validate(Write::Create)
            .unwrap_err(),
        );
        for field in [
            "phone",
            "linkedin_url",
            "github_url",
            "profile_picture",
            "experience_years",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }

        let ok = ProfilePayload {
            portfolio_url: Some("https://me.dev".into()),
            resume: Some(Some("resumes/cv.pdf".into())),
            ..ProfilePayload::default()
        }
        .validate(Write::Create)
        .unwrap();
        assert_eq!(ok.user_type, UserType::Candidate);
    }

    #[test]
    fn test_query_choice_ignores_empty_values() {
        assert_eq!(query_choice::<JobStatus>("status", Some(String::new())).unwrap(), None);
        assert_eq!(query_choice::<JobStatus>("status", None).unwrap(), None);
        assert_eq!(
            query_choice::<JobStatus>("status", Some("active".into())).unwrap(),
            Some(JobStatus::Active)
        );
        let err = query_choice::<JobStatus>("status", Some("archived".into())).unwrap_err();
        assert!(fields_of(err).contains("status"));
    }
}
