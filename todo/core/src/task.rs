use chrono::{DateTime, Utc};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Longest description a task may carry, counted in characters after trimming.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// How urgent a task is.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                TaskError::InvalidArgument("Priority must be one of High, Medium, Low".to_string())
            })
    }
}

impl TryFrom<&str> for Priority {
    type Error = TaskError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A value that is out of the allowed range for a task.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ValidationError {
    #[error("Task ID must be a positive integer")]
    NonPositiveId,
    #[error("Description cannot be empty")]
    EmptyDescription,
    #[error("Description cannot exceed 500 characters")]
    DescriptionTooLong { length: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TaskError {
    /// The input has the wrong shape, e.g. a priority outside the enumeration.
    #[error("{0}")]
    InvalidArgument(String),
    /// The input has the right shape but an unacceptable value.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("No task IDs left to assign")]
    IdsExhausted,
}

impl TaskError {
    /// Whether the user can fix this by re-entering the value.
    pub fn is_validation(&self) -> bool {
        matches!(self, TaskError::Validation(_))
    }
}

impl From<Infallible> for TaskError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Trims `description` and checks it against the task description rules.
///
/// Returns the trimmed text on success.
pub fn validate_description(description: &str) -> Result<&str, ValidationError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    let length = trimmed.chars().count();
    if length > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::DescriptionTooLong { length });
    }
    Ok(trimmed)
}

/// One to-do item.
///
/// A `Task` is never edited in place. Every change goes through one of the
/// `with_*` methods, which build and re-validate a fresh value that keeps the
/// same `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "TaskFields")
)]
pub struct Task {
    id: u32,
    description: String,
    priority: Priority,
    completed: bool,
    created_at: DateTime<Utc>,
}

/// Serialized shape of a [`Task`], only turned into one through [`Task::from_parts`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct TaskFields {
    id: u32,
    description: String,
    priority: Priority,
    completed: bool,
    created_at: DateTime<Utc>,
}

#[cfg(feature = "serde")]
impl TryFrom<TaskFields> for Task {
    type Error = TaskError;

    fn try_from(fields: TaskFields) -> Result<Self, Self::Error> {
        Task::from_parts(
            fields.id,
            &fields.description,
            fields.priority,
            fields.completed,
            Some(fields.created_at),
        )
    }
}

impl Task {
    /// Creates an incomplete, medium priority task stamped with the current time.
    pub fn new(id: u32, description: &str) -> Result<Self, TaskError> {
        Self::from_parts(id, description, Priority::default(), false, None)
    }

    /// Builds a task from every field, validating all of them.
    ///
    /// A `created_at` of `None` captures the current time.
    pub fn from_parts(
        id: u32,
        description: &str,
        priority: Priority,
        completed: bool,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<Self, TaskError> {
        if id == 0 {
            return Err(ValidationError::NonPositiveId.into());
        }
        let description = validate_description(description)?;

        Ok(Task {
            id,
            description: description.to_string(),
            priority,
            completed,
            created_at: created_at.unwrap_or_else(Utc::now),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn with_description(&self, description: &str) -> Result<Self, TaskError> {
        Self::from_parts(
            self.id,
            description,
            self.priority,
            self.completed,
            Some(self.created_at),
        )
    }

    pub fn with_priority(&self, priority: Priority) -> Result<Self, TaskError> {
        Self::from_parts(
            self.id,
            &self.description,
            priority,
            self.completed,
            Some(self.created_at),
        )
    }

    pub fn with_completed(&self, completed: bool) -> Result<Self, TaskError> {
        Self::from_parts(
            self.id,
            &self.description,
            self.priority,
            completed,
            Some(self.created_at),
        )
    }

    /// Returns a copy with the completion flag flipped.
    pub fn toggled(&self) -> Result<Self, TaskError> {
        self.with_completed(!self.completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    mod priority_tests {
        use super::*;

        #[test]
        fn displays_exact_tokens() {
            assert_eq!(Priority::High.to_string(), "High");
            assert_eq!(Priority::Medium.to_string(), "Medium");
            assert_eq!(Priority::Low.to_string(), "Low");
        }

        #[test]
        fn defaults_to_medium() {
            assert_eq!(Priority::default(), Priority::Medium);
        }

        #[test]
        fn has_exactly_three_members() {
            assert_eq!(Priority::ALL.len(), 3);
            assert_eq!(
                Priority::ALL,
                [Priority::High, Priority::Medium, Priority::Low]
            );
        }

        #[test]
        fn parses_display_tokens_ignoring_case() {
            assert_eq!("High".parse::<Priority>(), Ok(Priority::High));
            assert_eq!("medium".parse::<Priority>(), Ok(Priority::Medium));
            assert_eq!("  LOW ".parse::<Priority>(), Ok(Priority::Low));
        }

        #[test]
        fn rejects_unknown_priority_as_invalid_argument() {
            let result = Priority::try_from("Urgent");

            assert!(matches!(result, Err(TaskError::InvalidArgument(_))));
            assert!(!result.unwrap_err().is_validation());
        }
    }

    #[test]
    fn can_create_task_with_all_fields() {
        // Arrange
        let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        // Act
        let task =
            Task::from_parts(7, "Write report", Priority::High, true, Some(created_at)).unwrap();

        // Assert
        assert_eq!(task.id(), 7);
        assert_eq!(task.description(), "Write report");
        assert_eq!(task.priority(), Priority::High);
        assert!(task.is_completed());
        assert_eq!(task.created_at(), created_at);
    }

    #[test]
    fn new_task_uses_defaults() {
        let before = Utc::now();

        let task = Task::new(1, "Buy milk").unwrap();

        assert_eq!(task.priority(), Priority::Medium);
        assert!(!task.is_completed());
        assert!(task.created_at() >= before);
        assert!(task.created_at() <= Utc::now());
    }

    #[test]
    fn stores_trimmed_description() {
        let task = Task::new(1, "   Buy milk \n").unwrap();

        assert_eq!(task.description(), "Buy milk");
    }

    #[test]
    fn rejects_zero_id() {
        let result = Task::new(0, "Buy milk");

        assert_eq!(result, Err(ValidationError::NonPositiveId.into()));
    }

    #[test]
    fn rejects_empty_description() {
        let result = Task::new(1, "");

        assert_eq!(result, Err(ValidationError::EmptyDescription.into()));
    }

    #[test]
    fn rejects_whitespace_only_description() {
        let err = Task::new(1, " \t\n ").unwrap_err();

        assert!(err.is_validation());
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn accepts_description_of_exactly_max_length() {
        let description = "a".repeat(MAX_DESCRIPTION_LEN);

        let task = Task::new(1, &description).unwrap();

        assert_eq!(task.description().chars().count(), 500);
    }

    #[test]
    fn rejects_description_over_max_length() {
        let description = "a".repeat(MAX_DESCRIPTION_LEN + 1);

        let err = Task::new(1, &description).unwrap_err();

        assert_eq!(
            err,
            TaskError::Validation(ValidationError::DescriptionTooLong { length: 501 })
        );
        assert!(err.to_string().contains("500 characters"));
    }

    #[test]
    fn measures_length_in_characters_not_bytes() {
        // Each 'é' is two bytes in UTF-8.
        let description = "é".repeat(MAX_DESCRIPTION_LEN);

        assert!(Task::new(1, &description).is_ok());
    }

    #[test]
    fn length_is_checked_after_trimming() {
        let description = format!("  {}  ", "a".repeat(MAX_DESCRIPTION_LEN));

        assert!(Task::new(1, &description).is_ok());
    }

    #[test]
    fn id_is_checked_before_description() {
        let result = Task::new(0, "");

        assert_eq!(result, Err(ValidationError::NonPositiveId.into()));
    }

    mod reconstruction_tests {
        use super::*;

        fn sample() -> Task {
            let created_at = Utc.with_ymd_and_hms(2023, 6, 1, 8, 30, 0).unwrap();
            Task::from_parts(3, "Original", Priority::Low, false, Some(created_at)).unwrap()
        }

        #[test]
        fn with_description_keeps_other_fields() {
            let task = sample();

            let updated = task.with_description("Changed").unwrap();

            assert_eq!(updated.id(), task.id());
            assert_eq!(updated.created_at(), task.created_at());
            assert_eq!(updated.priority(), task.priority());
            assert_eq!(updated.is_completed(), task.is_completed());
            assert_eq!(updated.description(), "Changed");
            assert_eq!(task.description(), "Original");
        }

        #[test]
        fn with_description_revalidates() {
            let task = sample();

            let result = task.with_description("   ");

            assert_eq!(result, Err(ValidationError::EmptyDescription.into()));
        }

        #[test]
        fn with_priority_keeps_other_fields() {
            let task = sample();

            let updated = task.with_priority(Priority::High).unwrap();

            assert_eq!(updated.id(), task.id());
            assert_eq!(updated.created_at(), task.created_at());
            assert_eq!(updated.description(), task.description());
            assert_eq!(updated.is_completed(), task.is_completed());
            assert_eq!(updated.priority(), Priority::High);
        }

        #[test]
        fn toggled_twice_restores_flag() {
            let task = sample();

            let once = task.toggled().unwrap();
            let twice = once.toggled().unwrap();

            assert!(once.is_completed());
            assert_eq!(twice, task);
        }
    }

    #[cfg(feature = "serde")]
    mod serde_tests {
        use super::*;

        #[test]
        fn deserializes_valid_task() {
            let json = r#"{
                "id": 4,
                "description": "  Water plants ",
                "priority": "High",
                "completed": true,
                "created_at": "2023-01-01T00:00:00Z"
            }"#;

            let task: Task = serde_json::from_str(json).unwrap();

            assert_eq!(task.id(), 4);
            assert_eq!(task.description(), "Water plants");
            assert_eq!(task.priority(), Priority::High);
            assert!(task.is_completed());
            assert_eq!(
                task.created_at(),
                Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
            );
        }

        #[test]
        fn rejects_zero_id() {
            let json = r#"{
                "id": 0,
                "description": "Water plants",
                "priority": "High",
                "completed": false,
                "created_at": "2023-01-01T00:00:00Z"
            }"#;

            let err = serde_json::from_str::<Task>(json).unwrap_err();

            assert!(err.to_string().contains("Task ID must be a positive integer"));
        }

        #[test]
        fn rejects_blank_description() {
            let json = r#"{
                "id": 1,
                "description": "   ",
                "priority": "Low",
                "completed": false,
                "created_at": "2023-01-01T00:00:00Z"
            }"#;

            let err = serde_json::from_str::<Task>(json).unwrap_err();

            assert!(err.to_string().contains("Description cannot be empty"));
        }

        #[test]
        fn serialized_task_reads_back_equal() {
            let task = Task::new(9, "Call mum").unwrap();

            let json = serde_json::to_string(&task).unwrap();
            let read_back: Task = serde_json::from_str(&json).unwrap();

            assert_eq!(read_back, task);
        }
    }

    #[test]
    fn validate_description_returns_trimmed_text() {
        assert_eq!(validate_description("  hello  "), Ok("hello"));
    }
}
