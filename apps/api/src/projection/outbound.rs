use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{
    Application, ApplicationStatus, Company, EmploymentType, ExperienceLevel, Interview,
    InterviewStatus, InterviewType, Job, JobStatus, User, UserProfile, UserType,
};
use crate::repository::{RepoResult, Repository};

/// Public identity fields. Staff flag and password hash stay internal.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        UserView {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobView {
    pub id: Uuid,
    pub title: String,
    pub company: Company,
    pub description: String,
    pub requirements: String,
    pub location: String,
    pub remote_allowed: bool,
    pub employment_type: EmploymentType,
    pub experience_level: ExperienceLevel,
    pub salary_min: Option<Decimal>,
    pub salary_max: Option<Decimal>,
    pub status: JobStatus,
    pub posted_by: UserView,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deadline: Option<DateTime<Utc>>,
    pub applications_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: Uuid,
    pub job: JobView,
    pub applicant: UserView,
    pub cover_letter: String,
    pub resume: String,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub notes: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InterviewView {
    pub id: Uuid,
    pub application: ApplicationView,
    pub interview_type: InterviewType,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub interviewer: UserView,
    pub status: InterviewStatus,
    pub notes: String,
    pub feedback: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: Uuid,
    pub user: UserView,
    pub user_type: UserType,
    pub phone: String,
    pub bio: String,
    pub location: String,
    pub profile_picture: Option<String>,
    pub resume: Option<String>,
    pub linkedin_url: String,
    pub github_url: String,
    pub portfolio_url: String,
    pub skills: String,
    pub skills_list: Vec<String>,
    pub experience_years: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Expands stored rows into nested views, reading related rows through the
/// repository on every call.
pub struct Projector<'a> {
    repo: &'a dyn Repository,
}

impl<'a> Projector<'a> {
    pub fn new(repo: &'a dyn Repository) -> Self {
        Self { repo }
    }

    pub async fn user(&self, id: Uuid) -> RepoResult<UserView> {
        Ok(self.repo.get_user(id).await?.into())
    }

    pub async fn job(&self, job: Job) -> RepoResult<JobView> {
        let company = self.repo.get_company(job.company_id).await?;
        let posted_by = self.user(job.posted_by).await?;
        let applications_count = self.repo.count_applications(job.id).await?;

        Ok(JobView {
            id: job.id,
            title: job.title,
            company,
            description: job.description,
            requirements: job.requirements,
            location: job.location,
            remote_allowed: job.remote_allowed,
            employment_type: job.employment_type,
            experience_level: job.experience_level,
            salary_min: job.salary_min,
            salary_max: job.salary_max,
            status: job.status,
            posted_by,
            created_at: job.created_at,
            updated_at: job.updated_at,
            deadline: job.deadline,
            applications_count,
        })
    }

    pub async fn jobs(&self, jobs: Vec<Job>) -> RepoResult<Vec<JobView>> {
        let mut views = Vec::with_capacity(jobs.len());
        for job in jobs {
            views.push(self.job(job).await?);
        }
        Ok(views)
    }

    pub async fn application(&self, application: Application) -> RepoResult<ApplicationView> {
        let job = self.repo.get_job(application.job_id).await?;
        let job = self.job(job).await?;
        let applicant = self.user(application.applicant_id).await?;

        Ok(ApplicationView {
            id: application.id,
            job,
            applicant,
            cover_letter: application.cover_letter,
            resume: application.resume,
            status: application.status,
            applied_at: application.applied_at,
            updated_at: application.updated_at,
            notes: application.notes,
        })
    }

    pub async fn applications(
        &self,
        applications: Vec<Application>,
    ) -> RepoResult<Vec<ApplicationView>> {
        let mut views = Vec::with_capacity(applications.len());
        for application in applications {
            views.push(self.application(application).await?);
        }
        Ok(views)
    }

    /// The interview's application is loaded unscoped: interview visibility
    /// already admitted the caller.
    pub async fn interview(&self, interview: Interview) -> RepoResult<InterviewView> {
        let application = self
            .repo
            .get_application(interview.application_id, crate::scope::Scope::Unrestricted)
            .await?;
        let application = self.application(application).await?;
        let interviewer = self.user(interview.interviewer_id).await?;

        Ok(InterviewView {
            id: interview.id,
            application,
            interview_type: interview.interview_type,
            scheduled_at: interview.scheduled_at,
            duration_minutes: interview.duration_minutes,
            interviewer,
            status: interview.status,
            notes: interview.notes,
            feedback: interview.feedback,
            created_at: interview.created_at,
        })
    }

    pub async fn interviews(&self, interviews: Vec<Interview>) -> RepoResult<Vec<InterviewView>> {
        let mut views = Vec::with_capacity(interviews.len());
        for interview in interviews {
            views.push(self.interview(interview).await?);
        }
        Ok(views)
    }

    pub async fn profile(&self, profile: UserProfile) -> RepoResult<ProfileView> {
        let user = self.user(profile.user_id).await?;
        let skills_list = profile.skills_list();

        Ok(ProfileView {
            id: profile.id,
            user,
            user_type: profile.user_type,
            phone: profile.phone,
            bio: profile.bio,
            location: profile.location,
            profile_picture: profile.profile_picture,
            resume: profile.resume,
            linkedin_url: profile.linkedin_url,
            github_url: profile.github_url,
            portfolio_url: profile.portfolio_url,
            skills: profile.skills,
            skills_list,
            experience_years: profile.experience_years,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        })
    }

    pub async fn profiles(&self, profiles: Vec<UserProfile>) -> RepoResult<Vec<ProfileView>> {
        let mut views = Vec::with_capacity(profiles.len());
        for profile in profiles {
            views.push(self.profile(profile).await?);
        }
        Ok(views)
    }
}
