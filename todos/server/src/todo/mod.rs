use chrono::{Local, NaiveDateTime, Timelike};
use std::fmt;
use std::str::FromStr;

pub mod api;
pub mod store;

pub use store::{SeaOrmTodoStore, StoreError, TodoStore};

/// Status assigned to every newly created todo.
pub const STATUS_TODO: &str = "todo";
/// Intermediate status used by the web client. Stored as-is.
pub const STATUS_IN_PROGRESS: &str = "inProgress";
/// The only status that stamps `completed_time`.
pub const STATUS_COMPLETED: &str = "completed";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Local wall-clock time truncated to the minute.
///
/// Rendered as `YYYY-MM-DDTHH:MM` both in the database and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    /// Returns the current local time, truncated to the minute.
    pub fn now() -> Self {
        Self::from_datetime(Local::now().naive_local())
    }

    /// Truncates `datetime` to minute precision.
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        let truncated = datetime
            .with_second(0)
            .and_then(|d| d.with_nanosecond(0))
            .unwrap_or(datetime);
        Self(truncated)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map(Self)
    }
}

/// A todo that has not been persisted yet and therefore has no ID.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct NewTodo {
    text: String,
    create_time: Timestamp,
}

impl NewTodo {
    /// Creates a pending todo. The status is always `todo`, whatever the client asked for.
    pub fn new(text: String, create_time: Timestamp) -> Self {
        Self { text, create_time }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &str {
        STATUS_TODO
    }

    pub fn create_time(&self) -> Timestamp {
        self.create_time
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Todo {
    id: i32,
    text: String,
    status: String,
    create_time: Timestamp,
    completed_time: Option<Timestamp>,
}

impl Todo {
    pub fn new(
        id: i32,
        text: String,
        status: String,
        create_time: Timestamp,
        completed_time: Option<Timestamp>,
    ) -> Self {
        Self {
            id,
            text,
            status,
            create_time,
            completed_time,
        }
    }

    /// Returns the store-assigned ID of the todo.
    pub fn id(&self) -> i32 {
        self.id
    }

    /// Returns the text of the todo.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the current status of the todo.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Returns when the todo was created.
    pub fn create_time(&self) -> Timestamp {
        self.create_time
    }

    /// Returns when the todo was completed, if its status is `completed`.
    pub fn completed_time(&self) -> Option<Timestamp> {
        self.completed_time
    }

    /// Replaces the status of the todo.
    ///
    /// Any value is accepted. Setting `completed` stamps `completed_time` with `now`,
    /// every other value clears it.
    pub fn set_status(&mut self, status: String, now: Timestamp) {
        self.completed_time = if status == STATUS_COMPLETED {
            Some(now)
        } else {
            None
        };
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_milli_opt(hour, min, sec, 250)
            .unwrap()
    }

    fn sample_todo() -> Todo {
        Todo::new(
            1,
            "buy milk".to_string(),
            STATUS_TODO.to_string(),
            Timestamp::from_datetime(at(9, 0, 0)),
            None,
        )
    }

    #[test]
    fn timestamp_drops_seconds_and_fractions() {
        let timestamp = Timestamp::from_datetime(at(15, 9, 26));

        assert_eq!(timestamp.to_string(), "2025-03-14T15:09");
        assert_eq!(timestamp.0.second(), 0);
        assert_eq!(timestamp.0.nanosecond(), 0);
    }

    #[test]
    fn timestamp_parses_its_own_format() {
        let parsed: Timestamp = "2025-03-14T15:09".parse().unwrap();

        assert_eq!(parsed, Timestamp::from_datetime(at(15, 9, 0)));
    }

    #[test]
    fn timestamp_rejects_other_formats() {
        assert!("14/03/2025 15:09".parse::<Timestamp>().is_err());
        assert!("".parse::<Timestamp>().is_err());
    }

    #[test]
    fn new_todo_is_always_pending() {
        let new_todo = NewTodo::new("write docs".to_string(), Timestamp::now());

        assert_eq!(new_todo.status(), STATUS_TODO);
        assert_eq!(new_todo.text(), "write docs");
    }

    #[test]
    fn completing_a_todo_stamps_completed_time() {
        let mut todo = sample_todo();
        let now = Timestamp::from_datetime(at(10, 30, 0));

        todo.set_status(STATUS_COMPLETED.to_string(), now);

        assert_eq!(todo.status(), STATUS_COMPLETED);
        assert_eq!(todo.completed_time(), Some(now));
    }

    #[test]
    fn reopening_a_todo_clears_completed_time() {
        let mut todo = sample_todo();
        todo.set_status(
            STATUS_COMPLETED.to_string(),
            Timestamp::from_datetime(at(10, 30, 0)),
        );

        todo.set_status(STATUS_TODO.to_string(), Timestamp::now());

        assert_eq!(todo.status(), STATUS_TODO);
        assert_eq!(todo.completed_time(), None);
    }

    #[test]
    fn unknown_status_is_kept_and_clears_completed_time() {
        let mut todo = sample_todo();
        todo.set_status(STATUS_COMPLETED.to_string(), Timestamp::now());

        todo.set_status("someday".to_string(), Timestamp::now());

        assert_eq!(todo.status(), "someday");
        assert_eq!(todo.completed_time(), None);
    }

    #[test]
    fn status_change_leaves_create_time_alone() {
        let mut todo = sample_todo();
        let created = todo.create_time();

        todo.set_status(STATUS_IN_PROGRESS.to_string(), Timestamp::now());
        todo.set_status(STATUS_COMPLETED.to_string(), Timestamp::now());

        assert_eq!(todo.create_time(), created);
        assert_eq!(todo.id(), 1);
    }
}
