//! Activity directory use-case service.
//!
//! # Responsibility
//! - List activities as an ordered name-keyed mapping.
//! - Sign students up for and withdraw them from activities.
//!
//! # Invariants
//! - Preconditions are reported in order: activity exists, then membership,
//!   then capacity.
//! - The service holds no mutable state; every call is one store transaction.
//! - Domain rejections never collapse into infrastructure errors.

use crate::model::activity::{Activity, ActivityDetails, Confirmation};
use crate::repo::activity_repo::{ActivityRepository, AppendOutcome, RemoveOutcome, RepoError};
use log::{info, warn};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Activity listing keyed by activity name.
pub type ActivityListing = BTreeMap<String, ActivityDetails>;

/// Errors from activity directory operations.
#[derive(Debug)]
pub enum ActivityServiceError {
    /// Signup email is empty or whitespace only.
    InvalidEmail,
    /// No activity with this name exists.
    ActivityNotFound { activity: String },
    /// Student is already on the roster.
    DuplicateParticipant { activity: String, email: String },
    /// Roster already holds `max_participants` students.
    ActivityFull {
        activity: String,
        max_participants: u32,
    },
    /// Student is not on the roster.
    ParticipantNotFound { activity: String, email: String },
    /// Storage-level failure.
    Repo(RepoError),
}

impl ActivityServiceError {
    /// Whether this is an expected, user-facing rejection.
    pub fn is_domain(&self) -> bool {
        !matches!(self, Self::Repo(_))
    }

    /// Stable machine-readable code used in logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidEmail => "invalid_email",
            Self::ActivityNotFound { .. } => "activity_not_found",
            Self::DuplicateParticipant { .. } => "duplicate_participant",
            Self::ActivityFull { .. } => "activity_full",
            Self::ParticipantNotFound { .. } => "participant_not_found",
            Self::Repo(RepoError::Timeout(_)) => "storage_timeout",
            Self::Repo(RepoError::InvalidData(_)) => "storage_invalid_data",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for ActivityServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "Email must not be empty"),
            Self::ActivityNotFound { .. } => write!(f, "Activity not found"),
            Self::DuplicateParticipant { .. } => write!(f, "Student already signed up"),
            Self::ActivityFull { .. } => write!(f, "Activity is full"),
            Self::ParticipantNotFound { .. } => {
                write!(f, "Participant not found in this activity")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ActivityServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ActivityServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Activity directory facade over an injected store.
pub struct ActivityService<R: ActivityRepository> {
    repo: R,
}

impl<R: ActivityRepository> ActivityService<R> {
    /// Creates a service using the provided store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns every activity keyed by name with its roster in signup order.
    pub fn list_activities(&self) -> Result<ActivityListing, ActivityServiceError> {
        let activities = self.repo.list_activities()?;
        Ok(activities.into_iter().map(Activity::into_entry).collect())
    }

    /// Fetches one activity document by name.
    pub fn get_activity(
        &self,
        activity_name: &str,
    ) -> Result<Option<Activity>, ActivityServiceError> {
        Ok(self.repo.get_activity(activity_name)?)
    }

    /// Adds `email` to the activity roster.
    ///
    /// The email is stored exactly as given.
    ///
    /// # Errors
    /// - `InvalidEmail` when the email is blank. This is an input check and
    ///   runs before any store access.
    /// - `ActivityNotFound`, `DuplicateParticipant`, `ActivityFull` in that
    ///   precedence.
    pub fn signup(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<Confirmation, ActivityServiceError> {
        if email.trim().is_empty() {
            let result = Err(ActivityServiceError::InvalidEmail);
            log_outcome("activity_signup", activity_name, &result);
            return result;
        }
        let result = match self.repo.append_participant(activity_name, email)? {
            AppendOutcome::Appended => Ok(Confirmation::signed_up(activity_name, email)),
            AppendOutcome::ActivityMissing => Err(ActivityServiceError::ActivityNotFound {
                activity: activity_name.to_string(),
            }),
            AppendOutcome::AlreadyPresent => Err(ActivityServiceError::DuplicateParticipant {
                activity: activity_name.to_string(),
                email: email.to_string(),
            }),
            AppendOutcome::AtCapacity { max_participants } => {
                Err(ActivityServiceError::ActivityFull {
                    activity: activity_name.to_string(),
                    max_participants,
                })
            }
        };
        log_outcome("activity_signup", activity_name, &result);
        result
    }

    /// Removes `email` from the activity roster.
    ///
    /// Only an exact match is removed; a blank email is simply never on a
    /// roster.
    ///
    /// # Errors
    /// - `ActivityNotFound`, then `ParticipantNotFound`.
    pub fn withdraw(
        &self,
        activity_name: &str,
        email: &str,
    ) -> Result<Confirmation, ActivityServiceError> {
        let result = match self.repo.remove_participant(activity_name, email)? {
            RemoveOutcome::Removed => Ok(Confirmation::removed(activity_name, email)),
            RemoveOutcome::ActivityMissing => Err(ActivityServiceError::ActivityNotFound {
                activity: activity_name.to_string(),
            }),
            RemoveOutcome::NotPresent => Err(ActivityServiceError::ParticipantNotFound {
                activity: activity_name.to_string(),
                email: email.to_string(),
            }),
        };
        log_outcome("activity_withdraw", activity_name, &result);
        result
    }
}

fn log_outcome(
    event: &str,
    activity_name: &str,
    result: &Result<Confirmation, ActivityServiceError>,
) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok activity={activity_name:?}"),
        Err(err) if err.is_domain() => info!(
            "event={event} module=service status=rejected activity={activity_name:?} error_code={}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=error activity={activity_name:?} error_code={} error={err}",
            err.code()
        ),
    }
}
