//! Activity repository contract, SQLite store, and in-memory store.
//!
//! # Responsibility
//! - Provide fetch-by-name, full scan, and atomic conditional roster updates.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `append_participant` checks existence, duplicates and capacity in the
//!   same atomic unit as the insert.
//! - `remove_participant` removes at most one roster entry.
//! - Lock waits beyond the busy timeout surface as `RepoError::Timeout`.

use crate::db::DbError;
use crate::model::activity::{Activity, ActivityValidationError};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type RepoResult<T> = Result<T, RepoError>;

/// Infrastructure-level failure of the activity store.
#[derive(Debug)]
pub enum RepoError {
    /// Provisioning input breaks an activity invariant.
    Validation(ActivityValidationError),
    /// Storage transport or SQL failure.
    Db(DbError),
    /// Storage lock was not acquired within the configured timeout.
    Timeout(rusqlite::Error),
    /// A stored document is malformed.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Timeout(err) => write!(f, "storage timed out waiting for lock: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted activity data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Timeout(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ActivityValidationError> for RepoError {
    fn from(value: ActivityValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => Self::from(err),
            other => Self::Db(other),
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if is_lock_contention(&value) {
            Self::Timeout(value)
        } else {
            Self::Db(DbError::Sqlite(value))
        }
    }
}

fn is_lock_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(inner, _)
            if matches!(inner.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

/// Result of an atomic conditional append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    ActivityMissing,
    AlreadyPresent,
    AtCapacity { max_participants: u32 },
}

/// Result of an atomic roster removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    ActivityMissing,
    NotPresent,
}

/// Storage contract for activity documents keyed by name.
///
/// Implementations must make `append_participant` and `remove_participant`
/// indivisible from the point of view of concurrent callers.
pub trait ActivityRepository {
    /// Full collection scan, ordered by activity name.
    fn list_activities(&self) -> RepoResult<Vec<Activity>>;
    fn get_activity(&self, name: &str) -> RepoResult<Option<Activity>>;
    /// Appends `email` only if the activity exists, lacks it, and has room.
    fn append_participant(&self, name: &str, email: &str) -> RepoResult<AppendOutcome>;
    fn remove_participant(&self, name: &str, email: &str) -> RepoResult<RemoveOutcome>;
    /// Inserts a validated activity unless the name is taken.
    ///
    /// Returns `true` when the activity was inserted.
    fn provision_activity(&self, activity: &Activity) -> RepoResult<bool>;
}

impl<R: ActivityRepository + ?Sized> ActivityRepository for Arc<R> {
    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        (**self).list_activities()
    }

    fn get_activity(&self, name: &str) -> RepoResult<Option<Activity>> {
        (**self).get_activity(name)
    }

    fn append_participant(&self, name: &str, email: &str) -> RepoResult<AppendOutcome> {
        (**self).append_participant(name, email)
    }

    fn remove_participant(&self, name: &str, email: &str) -> RepoResult<RemoveOutcome> {
        (**self).remove_participant(name, email)
    }

    fn provision_activity(&self, activity: &Activity) -> RepoResult<bool> {
        (**self).provision_activity(activity)
    }
}

/// SQLite-backed activity repository.
///
/// Writes run in `BEGIN IMMEDIATE` transactions, so conditional updates stay
/// atomic across every connection sharing the database file.
pub struct SqliteActivityRepository {
    conn: Mutex<Connection>,
}

impl SqliteActivityRepository {
    /// Wraps a connection returned by `db::open_db*` (schema applied).
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        // Transactions roll back on drop, so a poisoned guard still holds a
        // consistent connection.
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

const ACTIVITY_SELECT_SQL: &str = "SELECT
    name,
    description,
    schedule,
    max_participants
FROM activities";

impl ActivityRepository for SqliteActivityRepository {
    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let mut activities = Vec::new();
        {
            let mut stmt = tx.prepare(&format!("{ACTIVITY_SELECT_SQL} ORDER BY name ASC;"))?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                activities.push(parse_activity_row(row)?);
            }
        }

        let index: HashMap<String, usize> = activities
            .iter()
            .enumerate()
            .map(|(position, activity)| (activity.name.clone(), position))
            .collect();

        {
            let mut stmt = tx.prepare(
                "SELECT activity_name, email
                 FROM activity_participants
                 ORDER BY activity_name ASC, position ASC;",
            )?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                let activity_name: String = row.get("activity_name")?;
                let email: String = row.get("email")?;
                let slot = index.get(&activity_name).ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "participant row references unknown activity `{activity_name}`"
                    ))
                })?;
                activities[*slot].participants.push(email);
            }
        }
        tx.commit()?;

        for activity in &activities {
            validate_persisted(activity)?;
        }
        Ok(activities)
    }

    fn get_activity(&self, name: &str) -> RepoResult<Option<Activity>> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let activity = {
            let mut stmt = tx.prepare(&format!("{ACTIVITY_SELECT_SQL} WHERE name = ?1;"))?;
            let mut rows = stmt.query([name])?;
            let activity = match rows.next()? {
                Some(row) => parse_activity_row(row)?,
                None => return Ok(None),
            };
            activity
        };

        let participants = load_participants(&tx, name)?;
        tx.commit()?;

        let activity = Activity {
            participants,
            ..activity
        };
        validate_persisted(&activity)?;
        Ok(Some(activity))
    }

    fn append_participant(&self, name: &str, email: &str) -> RepoResult<AppendOutcome> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(max_participants) = load_capacity(&tx, name)? else {
            return Ok(AppendOutcome::ActivityMissing);
        };

        let already_present: bool = tx.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM activity_participants
                WHERE activity_name = ?1 AND email = ?2
            );",
            params![name, email],
            |row| row.get(0),
        )?;
        if already_present {
            return Ok(AppendOutcome::AlreadyPresent);
        }

        let (taken, next_position): (i64, i64) = tx.query_row(
            "SELECT COUNT(*), COALESCE(MAX(position), 0) + 1
             FROM activity_participants
             WHERE activity_name = ?1;",
            [name],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if taken >= i64::from(max_participants) {
            return Ok(AppendOutcome::AtCapacity { max_participants });
        }

        tx.execute(
            "INSERT INTO activity_participants (activity_name, email, position)
             VALUES (?1, ?2, ?3);",
            params![name, email, next_position],
        )?;
        tx.commit()?;
        Ok(AppendOutcome::Appended)
    }

    fn remove_participant(&self, name: &str, email: &str) -> RepoResult<RemoveOutcome> {
        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if load_capacity(&tx, name)?.is_none() {
            return Ok(RemoveOutcome::ActivityMissing);
        }

        let removed = tx.execute(
            "DELETE FROM activity_participants
             WHERE activity_name = ?1 AND email = ?2;",
            params![name, email],
        )?;
        if removed == 0 {
            return Ok(RemoveOutcome::NotPresent);
        }

        tx.commit()?;
        Ok(RemoveOutcome::Removed)
    }

    fn provision_activity(&self, activity: &Activity) -> RepoResult<bool> {
        activity.validate()?;

        let mut conn = self.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO activities (name, description, schedule, max_participants)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                activity.name.as_str(),
                activity.description.as_str(),
                activity.schedule.as_str(),
                i64::from(activity.max_participants),
            ],
        )?;
        if inserted == 0 {
            return Ok(false);
        }

        {
            let mut stmt = tx.prepare(
                "INSERT INTO activity_participants (activity_name, email, position)
                 VALUES (?1, ?2, ?3);",
            )?;
            for (offset, email) in activity.participants.iter().enumerate() {
                stmt.execute(params![activity.name.as_str(), email.as_str(), offset as i64 + 1])?;
            }
        }
        tx.commit()?;
        Ok(true)
    }
}

fn parse_activity_row(row: &rusqlite::Row<'_>) -> RepoResult<Activity> {
    let name: String = row.get("name")?;
    let max_participants = parse_capacity(&name, row.get("max_participants")?)?;
    Ok(Activity {
        description: row.get("description")?,
        schedule: row.get("schedule")?,
        max_participants,
        participants: Vec::new(),
        name,
    })
}

fn load_participants(conn: &Connection, name: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT email
         FROM activity_participants
         WHERE activity_name = ?1
         ORDER BY position ASC;",
    )?;
    let emails = stmt
        .query_map([name], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(emails)
}

fn load_capacity(conn: &Connection, name: &str) -> RepoResult<Option<u32>> {
    let raw: Option<i64> = conn
        .query_row(
            "SELECT max_participants FROM activities WHERE name = ?1;",
            [name],
            |row| row.get(0),
        )
        .optional()?;
    raw.map(|value| parse_capacity(name, value)).transpose()
}

fn parse_capacity(name: &str, value: i64) -> RepoResult<u32> {
    match u32::try_from(value) {
        Ok(capacity) if capacity > 0 => Ok(capacity),
        _ => Err(RepoError::InvalidData(format!(
            "invalid max_participants `{value}` for activity `{name}`"
        ))),
    }
}

fn validate_persisted(activity: &Activity) -> RepoResult<()> {
    activity
        .validate()
        .map_err(|err| RepoError::InvalidData(err.to_string()))
}

/// In-memory activity repository.
///
/// A single mutex guards the whole catalogue, making every conditional
/// update atomic. Used as a test fake and for ephemeral runs.
#[derive(Debug, Default)]
pub struct InMemoryActivityRepository {
    activities: Mutex<BTreeMap<String, Activity>>,
}

impl InMemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with validated activities.
    pub fn with_activities(activities: impl IntoIterator<Item = Activity>) -> RepoResult<Self> {
        let repo = Self::new();
        for activity in activities {
            repo.provision_activity(&activity)?;
        }
        Ok(repo)
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Activity>> {
        self.activities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ActivityRepository for InMemoryActivityRepository {
    fn list_activities(&self) -> RepoResult<Vec<Activity>> {
        Ok(self.lock().values().cloned().collect())
    }

    fn get_activity(&self, name: &str) -> RepoResult<Option<Activity>> {
        Ok(self.lock().get(name).cloned())
    }

    fn append_participant(&self, name: &str, email: &str) -> RepoResult<AppendOutcome> {
        let mut activities = self.lock();
        let Some(activity) = activities.get_mut(name) else {
            return Ok(AppendOutcome::ActivityMissing);
        };
        if activity.has_participant(email) {
            return Ok(AppendOutcome::AlreadyPresent);
        }
        if activity.is_full() {
            return Ok(AppendOutcome::AtCapacity {
                max_participants: activity.max_participants,
            });
        }
        activity.participants.push(email.to_string());
        Ok(AppendOutcome::Appended)
    }

    fn remove_participant(&self, name: &str, email: &str) -> RepoResult<RemoveOutcome> {
        let mut activities = self.lock();
        let Some(activity) = activities.get_mut(name) else {
            return Ok(RemoveOutcome::ActivityMissing);
        };
        match activity
            .participants
            .iter()
            .position(|existing| existing == email)
        {
            Some(index) => {
                activity.participants.remove(index);
                Ok(RemoveOutcome::Removed)
            }
            None => Ok(RemoveOutcome::NotPresent),
        }
    }

    fn provision_activity(&self, activity: &Activity) -> RepoResult<bool> {
        activity.validate()?;
        let mut activities = self.lock();
        if activities.contains_key(&activity.name) {
            return Ok(false);
        }
        activities.insert(activity.name.clone(), activity.clone());
        Ok(true)
    }
}
