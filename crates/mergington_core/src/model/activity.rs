//! Activity domain model.
//!
//! # Responsibility
//! - Define the activity document shared by the service and stores.
//! - Provide roster helpers and invariant validation.
//!
//! # Invariants
//! - `name` is non-blank and never changes after provisioning.
//! - `max_participants` is positive.
//! - `participants.len() <= max_participants`.
//! - `participants` holds no duplicate email; order is signup order.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// A named extracurricular offering with a fixed participant capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    /// Natural key, unique across the catalogue.
    pub name: String,
    pub description: String,
    /// Display-only text, never parsed.
    pub schedule: String,
    pub max_participants: u32,
    /// Student emails in signup order.
    pub participants: Vec<String>,
}

/// Invariant violations detected by `Activity::validate()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityValidationError {
    /// Name is empty after trim.
    BlankName,
    /// Capacity must be at least one.
    ZeroCapacity { name: String },
    /// Same email listed more than once.
    DuplicateParticipant { name: String, email: String },
    /// Roster is larger than capacity.
    OverCapacity {
        name: String,
        participants: usize,
        max_participants: u32,
    },
}

impl Display for ActivityValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "activity name must not be blank"),
            Self::ZeroCapacity { name } => {
                write!(f, "activity `{name}` must allow at least one participant")
            }
            Self::DuplicateParticipant { name, email } => {
                write!(f, "activity `{name}` lists participant `{email}` twice")
            }
            Self::OverCapacity {
                name,
                participants,
                max_participants,
            } => write!(
                f,
                "activity `{name}` has {participants} participants but allows {max_participants}"
            ),
        }
    }
}

impl Error for ActivityValidationError {}

impl Activity {
    /// Creates an activity with an empty roster.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        schedule: impl Into<String>,
        max_participants: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schedule: schedule.into(),
            max_participants,
            participants: Vec::new(),
        }
    }

    /// Builder-style helper to attach an initial roster (seed data, tests).
    pub fn with_participants<I, S>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.participants = participants.into_iter().map(Into::into).collect();
        self
    }

    pub fn has_participant(&self, email: &str) -> bool {
        self.participants.iter().any(|existing| existing == email)
    }

    pub fn is_full(&self) -> bool {
        self.participants.len() >= self.max_participants as usize
    }

    /// Checks all document invariants.
    pub fn validate(&self) -> Result<(), ActivityValidationError> {
        if self.name.trim().is_empty() {
            return Err(ActivityValidationError::BlankName);
        }
        if self.max_participants == 0 {
            return Err(ActivityValidationError::ZeroCapacity {
                name: self.name.clone(),
            });
        }
        for (index, email) in self.participants.iter().enumerate() {
            if self.participants[..index].contains(email) {
                return Err(ActivityValidationError::DuplicateParticipant {
                    name: self.name.clone(),
                    email: email.clone(),
                });
            }
        }
        if self.participants.len() > self.max_participants as usize {
            return Err(ActivityValidationError::OverCapacity {
                name: self.name.clone(),
                participants: self.participants.len(),
                max_participants: self.max_participants,
            });
        }
        Ok(())
    }

    /// Splits the document into its key and listing projection.
    pub fn into_entry(self) -> (String, ActivityDetails) {
        (
            self.name,
            ActivityDetails {
                description: self.description,
                schedule: self.schedule,
                max_participants: self.max_participants,
                participants: self.participants,
            },
        )
    }

    /// Rebuilds a document from a listing entry (seed files use this shape).
    pub fn from_entry(name: impl Into<String>, details: ActivityDetails) -> Self {
        Self {
            name: name.into(),
            description: details.description,
            schedule: details.schedule,
            max_participants: details.max_participants,
            participants: details.participants,
        }
    }
}

/// Non-key attributes exposed by the activity listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDetails {
    pub description: String,
    pub schedule: String,
    pub max_participants: u32,
    pub participants: Vec<String>,
}

/// What a successful roster change did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationKind {
    SignedUp,
    Removed,
}

/// Confirmation returned by signup and withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub kind: ConfirmationKind,
    pub activity: String,
    pub email: String,
}

impl Confirmation {
    pub fn signed_up(activity: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            kind: ConfirmationKind::SignedUp,
            activity: activity.into(),
            email: email.into(),
        }
    }

    pub fn removed(activity: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            kind: ConfirmationKind::Removed,
            activity: activity.into(),
            email: email.into(),
        }
    }

    /// Human-readable message returned to API callers.
    pub fn message(&self) -> String {
        match self.kind {
            ConfirmationKind::SignedUp => {
                format!("Signed up {} for {}", self.email, self.activity)
            }
            ConfirmationKind::Removed => format!("Removed {} from {}", self.email, self.activity),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chess_club() -> Activity {
        Activity::new("Chess Club", "Strategy", "Fridays", 2)
    }

    #[test]
    fn new_activity_starts_empty_and_valid() {
        let activity = chess_club();
        assert!(activity.participants.is_empty());
        assert!(!activity.is_full());
        activity.validate().unwrap();
    }

    #[test]
    fn validate_rejects_blank_name_and_zero_capacity() {
        let blank = Activity::new("  ", "d", "s", 3);
        assert_eq!(blank.validate(), Err(ActivityValidationError::BlankName));

        let zero = Activity::new("Empty", "d", "s", 0);
        assert!(matches!(
            zero.validate(),
            Err(ActivityValidationError::ZeroCapacity { .. })
        ));
    }

    #[test]
    fn validate_rejects_duplicate_and_overfull_rosters() {
        let duplicate = chess_club().with_participants(["a@x.edu", "a@x.edu"]);
        assert_eq!(
            duplicate.validate(),
            Err(ActivityValidationError::DuplicateParticipant {
                name: "Chess Club".to_string(),
                email: "a@x.edu".to_string(),
            })
        );

        let overfull = chess_club().with_participants(["a@x.edu", "b@x.edu", "c@x.edu"]);
        assert!(matches!(
            overfull.validate(),
            Err(ActivityValidationError::OverCapacity {
                participants: 3,
                max_participants: 2,
                ..
            })
        ));
    }

    #[test]
    fn full_activity_reports_membership() {
        let activity = chess_club().with_participants(["a@x.edu", "b@x.edu"]);
        assert!(activity.is_full());
        assert!(activity.has_participant("b@x.edu"));
        assert!(!activity.has_participant("c@x.edu"));
    }

    #[test]
    fn entry_conversion_keeps_roster_order() {
        let activity = chess_club().with_participants(["b@x.edu", "a@x.edu"]);
        let (name, details) = activity.clone().into_entry();
        assert_eq!(name, "Chess Club");
        assert_eq!(details.participants, vec!["b@x.edu", "a@x.edu"]);
        assert_eq!(Activity::from_entry(name, details), activity);
    }

    #[test]
    fn confirmation_messages_match_api_wording() {
        assert_eq!(
            Confirmation::signed_up("Chess Club", "bob@x.edu").message(),
            "Signed up bob@x.edu for Chess Club"
        );
        assert_eq!(
            Confirmation::removed("Chess Club", "bob@x.edu").message(),
            "Removed bob@x.edu from Chess Club"
        );
    }
}
