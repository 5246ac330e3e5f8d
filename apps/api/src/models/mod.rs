pub mod application;
pub mod choices;
pub mod company;
pub mod interview;
pub mod job;
pub mod user;

pub use application::{Application, ApplicationFields};
pub use choices::{
    ApplicationStatus, EmploymentType, ExperienceLevel, InterviewStatus, InterviewType,
    JobStatus, UserType,
};
pub use company::{Company, CompanyFields};
pub use interview::{Interview, InterviewFields};
pub use job::{Job, JobFields};
pub use user::{Credentials, NewUser, ProfileFields, User, UserProfile};
