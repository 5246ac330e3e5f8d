use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A value outside an enumeration's allowed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("\"{value}\" is not a valid choice.")]
pub struct InvalidChoice {
    pub value: String,
}

/// Declares a closed set of string-valued choices stored as text columns.
/// The first variant listed is the default.
macro_rules! choices {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $first:ident => $first_str:literal,
            $($variant:ident => $str:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            #[default]
            #[serde(rename = $first_str)]
            $first,
            $(
                #[serde(rename = $str)]
                $variant,
            )*
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $name::$first => $first_str,
                    $($name::$variant => $str,)*
                }
            }
        }

        impl FromStr for $name {
            type Err = InvalidChoice;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $first_str => Ok($name::$first),
                    $($str => Ok($name::$variant),)*
                    other => Err(InvalidChoice {
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choices! {
    pub enum EmploymentType {
        FullTime => "full_time",
        PartTime => "part_time",
        Contract => "contract",
        Internship => "internship",
        Freelance => "freelance",
    }
}

choices! {
    pub enum ExperienceLevel {
        Entry => "entry",
        Mid => "mid",
        Senior => "senior",
        Lead => "lead",
        Executive => "executive",
    }
}

choices! {
    /// Lifecycle of a posting; new jobs start as drafts.
    pub enum JobStatus {
        Draft => "draft",
        Active => "active",
        Paused => "paused",
        Closed => "closed",
    }
}

choices! {
    pub enum ApplicationStatus {
        Pending => "pending",
        Reviewing => "reviewing",
        Interview => "interview",
        Rejected => "rejected",
        Hired => "hired",
        Withdrawn => "withdrawn",
    }
}

choices! {
    pub enum InterviewType {
        Phone => "phone",
        Video => "video",
        InPerson => "in_person",
        Technical => "technical",
    }
}

choices! {
    pub enum InterviewStatus {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        Rescheduled => "rescheduled",
    }
}

choices! {
    pub enum UserType {
        Candidate => "candidate",
        Employer => "employer",
        Admin => "admin",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_first_choice() {
        assert_eq!(JobStatus::default(), JobStatus::Draft);
        assert_eq!(ApplicationStatus::default(), ApplicationStatus::Pending);
        assert_eq!(InterviewStatus::default(), InterviewStatus::Scheduled);
        assert_eq!(UserType::default(), UserType::Candidate);
    }

    #[test]
    fn test_parse_matches_wire_names() {
        for kind in [
            EmploymentType::FullTime,
            EmploymentType::PartTime,
            EmploymentType::Contract,
            EmploymentType::Internship,
            EmploymentType::Freelance,
        ] {
            assert_eq!(kind.as_str().parse::<EmploymentType>(), Ok(kind));
        }
        assert_eq!(
            "in_person".parse::<InterviewType>(),
            Ok(InterviewType::InPerson)
        );
    }

    #[test]
    fn test_parse_rejects_unknown_and_case_variants() {
        let err = "Full_Time".parse::<EmploymentType>().unwrap_err();
        assert_eq!(err.to_string(), "\"Full_Time\" is not a valid choice.");
        assert!("".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_names() {
        let json = serde_json::to_string(&ExperienceLevel::Executive).unwrap();
        assert_eq!(json, "\"executive\"");
        let parsed: ApplicationStatus = serde_json::from_str("\"withdrawn\"").unwrap();
        assert_eq!(parsed, ApplicationStatus::Withdrawn);
    }
}
