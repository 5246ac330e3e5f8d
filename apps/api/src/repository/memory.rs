//! In-process repository used for `STORAGE_BACKEND=memory` and tests.
//!
//! Every operation takes the single table lock for its whole duration, which
//! gives the same all-or-nothing behaviour the Postgres transactions provide.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::{ApplicationQuery, JobQuery, RepoResult, Repository, RepositoryError};
use crate::models::{
    Application, ApplicationFields, Company, CompanyFields, Credentials, Interview,
    InterviewFields, Job, JobFields, NewUser, ProfileFields, User, UserProfile, UserType,
};
use crate::scope::Scope;

#[derive(Default)]
struct Tables {
    users: Vec<Credentials>,
    profiles: Vec<UserProfile>,
    companies: Vec<Company>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    interviews: Vec<Interview>,
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|c| c.user.id == id)
    }

    fn company_name(&self, id: Uuid) -> Option<&str> {
        self.companies
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }

    fn drop_applications(&mut self, doomed: &HashSet<Uuid>) {
        self.applications.retain(|a| !doomed.contains(&a.id));
        self.interviews
            .retain(|i| !doomed.contains(&i.application_id));
    }

    fn drop_jobs(&mut self, doomed: &HashSet<Uuid>) {
        let applications: HashSet<Uuid> = self
            .applications
            .iter()
            .filter(|a| doomed.contains(&a.job_id))
            .map(|a| a.id)
            .collect();
        self.jobs.retain(|j| !doomed.contains(&j.id));
        self.drop_applications(&applications);
    }

    fn ensure_unique_application(
        &self,
        job_id: Uuid,
        applicant_id: Uuid,
        except: Option<Uuid>,
    ) -> RepoResult<()> {
        let taken = self.applications.iter().any(|a| {
            a.job_id == job_id && a.applicant_id == applicant_id && Some(a.id) != except
        });
        if taken {
            Err(RepositoryError::duplicate_application())
        } else {
            Ok(())
        }
    }
}

/// Rows are stored in insertion order; newest-first listings walk them
/// backwards so that equal timestamps still put the latest insert first.
fn newest_first<T: Clone>(rows: &[T], key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut out: Vec<T> = rows.iter().rev().cloned().collect();
    out.sort_by(|a, b| key(b).cmp(&key(a)));
    out
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> RepoResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("table lock poisoned".into()))
    }
}

fn new_profile(user_id: Uuid, fields: ProfileFields) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: Uuid::new_v4(),
        user_id,
        user_type: fields.user_type,
        phone: fields.phone,
        bio: fields.bio,
        location: fields.location,
        profile_picture: fields.profile_picture,
        resume: fields.resume,
        linkedin_url: fields.linkedin_url,
        github_url: fields.github_url,
        portfolio_url: fields.portfolio_url,
        skills: fields.skills,
        experience_years: fields.experience_years,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn create_user(
        &self,
        user: NewUser,
        user_type: UserType,
    ) -> RepoResult<(User, UserProfile)> {
        let mut tables = self.tables()?;
        if tables.users.iter().any(|c| c.user.username == user.username) {
            return Err(RepositoryError::duplicate_username());
        }

        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_staff: user.is_staff,
            date_joined: Utc::now(),
        };
        let profile = new_profile(created.id, ProfileFields::for_new_user(user_type));

        tables.users.push(Credentials {
            user: created.clone(),
            password_hash: user.password_hash,
        });
        tables.profiles.push(profile.clone());
        Ok((created, profile))
    }

    async fn find_credentials(&self, username: &str) -> RepoResult<Option<Credentials>> {
        let tables = self.tables()?;
        Ok(tables
            .users
            .iter()
            .find(|c| c.user.username == username)
            .cloned())
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<User> {
        let tables = self.tables()?;
        tables
            .users
            .iter()
            .find(|c| c.user.id == id)
            .map(|c| c.user.clone())
            .ok_or(RepositoryError::NotFound("User"))
    }

    async fn delete_user(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if !tables.user_exists(id) {
            return Err(RepositoryError::NotFound("User"));
        }

        let jobs: HashSet<Uuid> = tables
            .jobs
            .iter()
            .filter(|j| j.posted_by == id)
            .map(|j| j.id)
            .collect();
        tables.drop_jobs(&jobs);

        let applications: HashSet<Uuid> = tables
            .applications
            .iter()
            .filter(|a| a.applicant_id == id)
            .map(|a| a.id)
            .collect();
        tables.drop_applications(&applications);

        tables.interviews.retain(|i| i.interviewer_id != id);
        tables.profiles.retain(|p| p.user_id != id);
        tables.users.retain(|c| c.user.id != id);
        Ok(())
    }

    async fn list_profiles(&self, scope: Scope) -> RepoResult<Vec<UserProfile>> {
        let tables = self.tables()?;
        let mut profiles: Vec<UserProfile> = tables
            .profiles
            .iter()
            .filter(|p| scope.admits(p.user_id))
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.created_at);
        Ok(profiles)
    }

    async fn get_profile(&self, id: Uuid, scope: Scope) -> RepoResult<UserProfile> {
        let tables = self.tables()?;
        tables
            .profiles
            .iter()
            .find(|p| p.id == id && scope.admits(p.user_id))
            .cloned()
            .ok_or(RepositoryError::NotFound("Profile"))
    }

    async fn profile_for_user(&self, user_id: Uuid) -> RepoResult<Option<UserProfile>> {
        let tables = self.tables()?;
        Ok(tables
            .profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned())
    }

    async fn create_profile(
        &self,
        user_id: Uuid,
        fields: ProfileFields,
    ) -> RepoResult<UserProfile> {
        let mut tables = self.tables()?;
        if !tables.user_exists(user_id) {
            return Err(RepositoryError::InvalidReference {
                field: "user",
                id: user_id,
            });
        }
        if tables.profiles.iter().any(|p| p.user_id == user_id) {
            return Err(RepositoryError::duplicate_profile());
        }
        let profile = new_profile(user_id, fields);
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> RepoResult<UserProfile> {
        let mut tables = self.tables()?;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound("Profile"))?;

        profile.user_type = fields.user_type;
        profile.phone = fields.phone;
        profile.bio = fields.bio;
        profile.location = fields.location;
        profile.profile_picture = fields.profile_picture;
        profile.resume = fields.resume;
        profile.linkedin_url = fields.linkedin_url;
        profile.github_url = fields.github_url;
        profile.portfolio_url = fields.portfolio_url;
        profile.skills = fields.skills;
        profile.experience_years = fields.experience_years;
        profile.updated_at = Utc::now();
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(RepositoryError::NotFound("Profile"));
        }
        Ok(())
    }

    async fn list_companies(&self) -> RepoResult<Vec<Company>> {
        let tables = self.tables()?;
        let mut companies = tables.companies.clone();
        companies.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(companies)
    }

    async fn get_company(&self, id: Uuid) -> RepoResult<Company> {
        let tables = self.tables()?;
        tables
            .companies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound("Company"))
    }

    async fn create_company(&self, fields: CompanyFields) -> RepoResult<Company> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4(),
            name: fields.name,
            description: fields.description,
            website: fields.website,
            logo: fields.logo,
            created_at: now,
            updated_at: now,
        };
        tables.companies.push(company.clone());
        Ok(company)
    }

    async fn update_company(&self, id: Uuid, fields: CompanyFields) -> RepoResult<Company> {
        let mut tables = self.tables()?;
        let company = tables
            .companies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(RepositoryError::NotFound("Company"))?;
        company.name = fields.name;
        company.description = fields.description;
        company.website = fields.website;
        company.logo = fields.logo;
        company.updated_at = Utc::now();
        Ok(company.clone())
    }

    async fn delete_company(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if tables.company_name(id).is_none() {
            return Err(RepositoryError::NotFound("Company"));
        }
        let jobs: HashSet<Uuid> = tables
            .jobs
            .iter()
            .filter(|j| j.company_id == id)
            .map(|j| j.id)
            .collect();
        tables.drop_jobs(&jobs);
        tables.companies.retain(|c| c.id != id);
        Ok(())
    }

    async fn list_jobs(&self, query: &JobQuery) -> RepoResult<Vec<Job>> {
        let tables = self.tables()?;
        let needle = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<Job> = tables
            .jobs
            .iter()
            .filter(|j| query.scope().admits(j.posted_by))
            .filter(|j| query.status.map_or(true, |status| j.status == status))
            .filter(|j| {
                query
                    .employment_type
                    .map_or(true, |kind| j.employment_type == kind)
            })
            .filter(|j| match &needle {
                None => true,
                Some(needle) => {
                    j.title.to_lowercase().contains(needle)
                        || j.description.to_lowercase().contains(needle)
                        || tables
                            .company_name(j.company_id)
                            .is_some_and(|name| name.to_lowercase().contains(needle))
                }
            })
            .cloned()
            .collect();
        Ok(newest_first(&matching, |j| j.created_at))
    }

    async fn get_job(&self, id: Uuid) -> RepoResult<Job> {
        let tables = self.tables()?;
        tables
            .jobs
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or(RepositoryError::NotFound("Job"))
    }

    async fn create_job(&self, posted_by: Uuid, fields: JobFields) -> RepoResult<Job> {
        let mut tables = self.tables()?;
        if tables.company_name(fields.company_id).is_none() {
            return Err(RepositoryError::InvalidReference {
                field: "company",
                id: fields.company_id,
            });
        }
        if !tables.user_exists(posted_by) {
            return Err(RepositoryError::InvalidReference {
                field: "posted_by",
                id: posted_by,
            });
        }

        let now = Utc::now();
        let job = Job {
            id: Uuid::new_v4(),
            title: fields.title,
            company_id: fields.company_id,
            description: fields.description,
            requirements: fields.requirements,
            location: fields.location,
            remote_allowed: fields.remote_allowed,
            employment_type: fields.employment_type,
            experience_level: fields.experience_level,
            salary_min: fields.salary_min,
            salary_max: fields.salary_max,
            status: fields.status,
            posted_by,
            created_at: now,
            updated_at: now,
            deadline: fields.deadline,
        };
        tables.jobs.push(job.clone());
        Ok(job)
    }

    async fn update_job(&self, id: Uuid, fields: JobFields) -> RepoResult<Job> {
        let mut tables = self.tables()?;
        if tables.company_name(fields.company_id).is_none() {
            return Err(RepositoryError::InvalidReference {
                field: "company",
                id: fields.company_id,
            });
        }
        let job = tables
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(RepositoryError::NotFound("Job"))?;

        job.title = fields.title;
        job.company_id = fields.company_id;
        job.description = fields.description;
        job.requirements = fields.requirements;
        job.location = fields.location;
        job.remote_allowed = fields.remote_allowed;
        job.employment_type = fields.employment_type;
        job.experience_level = fields.experience_level;
        job.salary_min = fields.salary_min;
        job.salary_max = fields.salary_max;
        job.status = fields.status;
        job.deadline = fields.deadline;
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn delete_job(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if !tables.jobs.iter().any(|j| j.id == id) {
            return Err(RepositoryError::NotFound("Job"));
        }
        tables.drop_jobs(&HashSet::from([id]));
        Ok(())
    }

    async fn count_applications(&self, job_id: Uuid) -> RepoResult<u64> {
        let tables = self.tables()?;
        Ok(tables
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .count() as u64)
    }

    async fn list_applications(&self, query: &ApplicationQuery) -> RepoResult<Vec<Application>> {
        let tables = self.tables()?;
        let matching: Vec<Application> = tables
            .applications
            .iter()
            .filter(|a| query.scope().admits(a.applicant_id))
            .filter(|a| query.job_id.map_or(true, |job_id| a.job_id == job_id))
            .filter(|a| query.status.map_or(true, |status| a.status == status))
            .cloned()
            .collect();
        Ok(newest_first(&matching, |a| a.applied_at))
    }

    async fn get_application(&self, id: Uuid, scope: Scope) -> RepoResult<Application> {
        let tables = self.tables()?;
        tables
            .applications
            .iter()
            .find(|a| a.id == id && scope.admits(a.applicant_id))
            .cloned()
            .ok_or(RepositoryError::NotFound("Application"))
    }

    async fn create_application(
        &self,
        applicant_id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application> {
        let mut tables = self.tables()?;
        if !tables.jobs.iter().any(|j| j.id == fields.job_id) {
            return Err(RepositoryError::InvalidReference {
                field: "job",
                id: fields.job_id,
            });
        }
        if !tables.user_exists(applicant_id) {
            return Err(RepositoryError::InvalidReference {
                field: "applicant",
                id: applicant_id,
            });
        }
        tables.ensure_unique_application(fields.job_id, applicant_id, None)?;

        let now = Utc::now();
        let application = Application {
            id: Uuid::new_v4(),
            job_id: fields.job_id,
            applicant_id,
            cover_letter: fields.cover_letter,
            resume: fields.resume,
            status: fields.status,
            applied_at: now,
            updated_at: now,
            notes: fields.notes,
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    async fn update_application(
        &self,
        id: Uuid,
        fields: ApplicationFields,
    ) -> RepoResult<Application> {
        let mut tables = self.tables()?;
        if !tables.jobs.iter().any(|j| j.id == fields.job_id) {
            return Err(RepositoryError::InvalidReference {
                field: "job",
                id: fields.job_id,
            });
        }
        let applicant_id = tables
            .applications
            .iter()
            .find(|a| a.id == id)
            .map(|a| a.applicant_id)
            .ok_or(RepositoryError::NotFound("Application"))?;
        tables.ensure_unique_application(fields.job_id, applicant_id, Some(id))?;

        let application = tables
            .applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(RepositoryError::NotFound("Application"))?;
        application.job_id = fields.job_id;
        application.cover_letter = fields.cover_letter;
        application.resume = fields.resume;
        application.status = fields.status;
        application.notes = fields.notes;
        application.updated_at = Utc::now();
        Ok(application.clone())
    }

    async fn delete_application(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        if !tables.applications.iter().any(|a| a.id == id) {
            return Err(RepositoryError::NotFound("Application"));
        }
        tables.drop_applications(&HashSet::from([id]));
        Ok(())
    }

    async fn list_interviews(&self, scope: Scope) -> RepoResult<Vec<Interview>> {
        let tables = self.tables()?;
        let mut interviews: Vec<Interview> = tables
            .interviews
            .iter()
            .filter(|i| scope.admits(i.interviewer_id))
            .cloned()
            .collect();
        interviews.sort_by_key(|i| i.scheduled_at);
        Ok(interviews)
    }

    async fn get_interview(&self, id: Uuid, scope: Scope) -> RepoResult<Interview> {
        let tables = self.tables()?;
        tables
            .interviews
            .iter()
            .find(|i| i.id == id && scope.admits(i.interviewer_id))
            .cloned()
            .ok_or(RepositoryError::NotFound("Interview"))
    }

    async fn create_interview(
        &self,
        interviewer_id: Uuid,
        fields: InterviewFields,
    ) -> RepoResult<Interview> {
        let mut tables = self.tables()?;
        if !tables
            .applications
            .iter()
            .any(|a| a.id == fields.application_id)
        {
            return Err(RepositoryError::InvalidReference {
                field: "application",
                id: fields.application_id,
            });
        }
        if !tables.user_exists(interviewer_id) {
            return Err(RepositoryError::InvalidReference {
                field: "interviewer",
                id: interviewer_id,
            });
        }

        let interview = Interview {
            id: Uuid::new_v4(),
            application_id: fields.application_id,
            interview_type: fields.interview_type,
            scheduled_at: fields.scheduled_at,
            duration_minutes: fields.duration_minutes,
            interviewer_id,
            status: fields.status,
            notes: fields.notes,
            feedback: fields.feedback,
            created_at: Utc::now(),
        };
        tables.interviews.push(interview.clone());
        Ok(interview)
    }

    async fn update_interview(&self, id: Uuid, fields: InterviewFields) -> RepoResult<Interview> {
        let mut tables = self.tables()?;
        if !tables
            .applications
            .iter()
            .any(|a| a.id == fields.application_id)
        {
            return Err(RepositoryError::InvalidReference {
                field: "application",
                id: fields.application_id,
            });
        }
        let interview = tables
            .interviews
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(RepositoryError::NotFound("Interview"))?;
        interview.application_id = fields.application_id;
        interview.interview_type = fields.interview_type;
        interview.scheduled_at = fields.scheduled_at;
        interview.duration_minutes = fields.duration_minutes;
        interview.status = fields.status;
        interview.notes = fields.notes;
        interview.feedback = fields.feedback;
        Ok(interview.clone())
    }

    async fn delete_interview(&self, id: Uuid) -> RepoResult<()> {
        let mut tables = self.tables()?;
        let before = tables.interviews.len();
        tables.interviews.retain(|i| i.id != id);
        if tables.interviews.len() == before {
            return Err(RepositoryError::NotFound("Interview"));
        }
        Ok(())
    }
}
