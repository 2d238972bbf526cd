use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    #[default]
    None,
    Low,
    Medium,
    High,
    Critical,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started. `to-do` is accepted on input.
    #[default]
    #[serde(alias = "to-do")]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: i32,
    /// Identifier of the user who owns the task. Fixed at creation.
    pub owner_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    /// Refreshed on every successful update.
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// Must be between 1 and 100 characters.
    #[validate(length(min = 1, max = 100))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub deadline: Option<DateTime<Utc>>,

    /// Defaults to `todo` when omitted.
    #[serde(default)]
    pub status: Option<TaskStatus>,

    /// Defaults to `none` when omitted.
    #[serde(default)]
    pub priority: Option<TaskPriority>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            deadline: None,
            status: None,
            priority: None,
        }
    }
}

/// A partial update. Absent fields are left untouched.
///
/// `description` and `deadline` distinguish "absent" (`None`) from an explicit JSON `null`
/// (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "deserialize_present")]
    #[validate(length(max = 1000))]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "deserialize_present")]
    pub deadline: Option<Option<DateTime<Utc>>>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,
}

impl TaskUpdate {
    /// Applies the supplied fields to `task` and stamps `updated_at`.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(deadline) = self.deadline {
            task.deadline = deadline;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        task.updated_at = now;
    }
}

// A present field, even `null`, deserializes to `Some(..)`; a missing one falls back to `None`
// through `#[serde(default)]`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Column a task listing is ordered by.
///
/// Parsing never fails: anything other than `deadline` orders by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SortKey {
    #[default]
    CreatedAt,
    Deadline,
}

impl From<String> for SortKey {
    fn from(value: String) -> Self {
        SortKey::from(value.as_str())
    }
}

impl From<&str> for SortKey {
    fn from(value: &str) -> Self {
        match value {
            "deadline" => SortKey::Deadline,
            _ => SortKey::CreatedAt,
        }
    }
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Deadline => "deadline",
        }
    }
}

/// Ordering direction. Only the exact string `desc` selects descending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<String> for SortDirection {
    fn from(value: String) -> Self {
        SortDirection::from(value.as_str())
    }
}

impl From<&str> for SortDirection {
    fn from(value: &str) -> Self {
        match value {
            "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

impl SortDirection {
    pub fn keyword(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

fn default_limit() -> u32 {
    100
}

fn default_show_completed() -> bool {
    true
}

/// Represents query parameters for filtering, ordering and paginating a task listing.
///
/// All filters are AND-combined. `show_completed = false` removes `done` tasks even when
/// `status=done` is requested explicitly, which yields an empty result.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Keep tasks whose deadline is at or before this instant.
    pub deadline_before: Option<DateTime<Utc>>,
    /// Keep tasks whose deadline is at or after this instant.
    pub deadline_after: Option<DateTime<Utc>>,
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub order_by: SortKey,
    #[serde(default)]
    pub order_dir: SortDirection,
    #[serde(default = "default_show_completed")]
    pub show_completed: bool,
}

impl Default for TaskListQuery {
    fn default() -> Self {
        Self {
            status: None,
            priority: None,
            deadline_before: None,
            deadline_after: None,
            limit: default_limit(),
            offset: 0,
            order_by: SortKey::default(),
            order_dir: SortDirection::default(),
            show_completed: default_show_completed(),
        }
    }
}

/// Substring search over a user's tasks. Empty terms are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskSearch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl TaskSearch {
    pub fn title_term(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn description_term(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_task() -> Task {
        let created = Utc::now();
        Task {
            id: 1,
            owner_id: 7,
            title: "Original".into(),
            description: Some("keep me".into()),
            deadline: Some(created),
            status: TaskStatus::Todo,
            priority: TaskPriority::None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_enum_wire_format() {
        assert_eq!(json!(TaskStatus::InProgress), json!("in_progress"));
        assert_eq!(json!(TaskStatus::Todo), json!("todo"));
        assert_eq!(json!(TaskPriority::Critical), json!("critical"));
        assert_eq!(TaskStatus::default(), TaskStatus::Todo);
        assert_eq!(TaskPriority::default(), TaskPriority::None);

        assert_eq!(
            serde_json::from_value::<TaskStatus>(json!("to-do")).unwrap(),
            TaskStatus::Todo
        );
        assert!(serde_json::from_value::<TaskStatus>(json!("archived")).is_err());
        assert!(serde_json::from_value::<TaskPriority>(json!("urgent")).is_err());
    }

    #[test]
    fn test_new_task_validation() {
        assert!(NewTask::titled("Valid Task").validate().is_ok());
        assert!(NewTask::titled("").validate().is_err());
        assert!(NewTask::titled("a".repeat(100)).validate().is_ok());
        assert!(NewTask::titled("a".repeat(101)).validate().is_err());

        let mut long_description = NewTask::titled("Valid");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let update: TaskUpdate = serde_json::from_value(json!({ "title": "new" })).unwrap();
        assert_eq!(update.title.as_deref(), Some("new"));
        assert!(update.description.is_none());
        assert!(update.deadline.is_none());

        let update: TaskUpdate =
            serde_json::from_value(json!({ "description": null, "deadline": null })).unwrap();
        assert_eq!(update.description, Some(None));
        assert_eq!(update.deadline, Some(None));
    }

    #[test]
    fn test_update_validation() {
        let update: TaskUpdate =
            serde_json::from_value(json!({ "description": "c".repeat(1001) })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate = serde_json::from_value(json!({ "title": "" })).unwrap();
        assert!(update.validate().is_err());

        let update: TaskUpdate = serde_json::from_value(json!({ "description": null })).unwrap();
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_apply_only_touches_supplied_fields() {
        let mut task = sample_task();
        let before = task.clone();
        let later = before.updated_at + chrono::Duration::seconds(5);

        let update: TaskUpdate = serde_json::from_value(json!({ "title": "new" })).unwrap();
        update.apply_to(&mut task, later);

        assert_eq!(task.title, "new");
        assert_eq!(task.description, before.description);
        assert_eq!(task.deadline, before.deadline);
        assert_eq!(task.created_at, before.created_at);
        assert_eq!(task.updated_at, later);

        let clear: TaskUpdate =
            serde_json::from_value(json!({ "description": null, "status": "done" })).unwrap();
        clear.apply_to(&mut task, later);
        assert_eq!(task.description, None);
        assert_eq!(task.status, TaskStatus::Done);
    }

    #[test]
    fn test_sort_parameters_fall_back() {
        assert_eq!(SortKey::from("deadline"), SortKey::Deadline);
        assert_eq!(SortKey::from("created_at"), SortKey::CreatedAt);
        assert_eq!(SortKey::from("title"), SortKey::CreatedAt);
        assert_eq!(SortDirection::from("desc"), SortDirection::Desc);
        assert_eq!(SortDirection::from("DESC"), SortDirection::Asc);
        assert_eq!(SortDirection::from("sideways"), SortDirection::Asc);
    }

    #[test]
    fn test_list_query_defaults() {
        let query: TaskListQuery = serde_json::from_value(json!({})).unwrap();
        assert_eq!(query.limit, 100);
        assert_eq!(query.offset, 0);
        assert_eq!(query.order_by, SortKey::CreatedAt);
        assert_eq!(query.order_dir, SortDirection::Asc);
        assert!(query.show_completed);

        let query: TaskListQuery =
            serde_json::from_value(json!({ "order_by": "title", "order_dir": "desc" })).unwrap();
        assert_eq!(query.order_by, SortKey::CreatedAt);
        assert_eq!(query.order_dir, SortDirection::Desc);
    }

    #[test]
    fn test_search_ignores_empty_terms() {
        let search = TaskSearch {
            title: Some(String::new()),
            description: Some("milk".into()),
        };
        assert_eq!(search.title_term(), None);
        assert_eq!(search.description_term(), Some("milk"));
    }
}
