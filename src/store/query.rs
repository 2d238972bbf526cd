//! Task listing and search rules.
//!
//! Both storage backends follow the same contract: [`apply_list_query`] runs it in process and
//! [`list_tasks_sql`] / [`search_tasks_sql`] express it as a parameterized Postgres query.

use std::cmp::Ordering;

use sqlx::{Postgres, QueryBuilder};

use crate::models::task::{SortDirection, SortKey, Task, TaskListQuery, TaskSearch, TaskStatus};

pub const TASK_COLUMNS: &str =
    "id, owner_id, title, description, deadline, status, priority, created_at, updated_at";

impl SortDirection {
    fn orient(&self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl TaskListQuery {
    /// Whether `task` passes every filter. Ownership is checked by the caller.
    pub fn matches(&self, task: &Task) -> bool {
        if !self.show_completed && task.status == TaskStatus::Done {
            return false;
        }
        if self.status.is_some_and(|status| task.status != status) {
            return false;
        }
        if self.priority.is_some_and(|priority| task.priority != priority) {
            return false;
        }
        if let Some(before) = self.deadline_before {
            if !task.deadline.is_some_and(|deadline| deadline <= before) {
                return false;
            }
        }
        if let Some(after) = self.deadline_after {
            if !task.deadline.is_some_and(|deadline| deadline >= after) {
                return false;
            }
        }
        true
    }

    /// Listing order: the sort key in the requested direction, tasks without a deadline last,
    /// ties broken by id in the same direction.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let dir = self.order_dir;
        let by_key = match self.order_by {
            SortKey::CreatedAt => dir.orient(a.created_at.cmp(&b.created_at)),
            SortKey::Deadline => match (a.deadline, b.deadline) {
                (Some(x), Some(y)) => dir.orient(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        by_key.then_with(|| dir.orient(a.id.cmp(&b.id)))
    }
}

impl TaskSearch {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(term) = self.title_term() {
            if !contains_ignore_case(&task.title, term) {
                return false;
            }
        }
        if let Some(term) = self.description_term() {
            match &task.description {
                Some(description) if contains_ignore_case(description, term) => {}
                _ => return false,
            }
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Filters, sorts and paginates an owner's tasks in memory.
pub fn apply_list_query<I>(tasks: I, query: &TaskListQuery) -> Vec<Task>
where
    I: IntoIterator<Item = Task>,
{
    let mut selected: Vec<Task> = tasks.into_iter().filter(|t| query.matches(t)).collect();
    selected.sort_by(|a, b| query.compare(a, b));
    selected
        .into_iter()
        .skip(query.offset as usize)
        .take(query.limit as usize)
        .collect()
}

/// Builds the listing query for `owner_id`. Every value is a bound parameter; only the
/// whitelisted column name and direction keyword are spliced into the SQL text.
pub fn list_tasks_sql(owner_id: i32, query: &TaskListQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM tasks WHERE owner_id = ",
        TASK_COLUMNS
    ));
    builder.push_bind(owner_id);

    if !query.show_completed {
        builder.push(" AND status <> ").push_bind(TaskStatus::Done);
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = query.priority {
        builder.push(" AND priority = ").push_bind(priority);
    }
    if let Some(before) = query.deadline_before {
        builder.push(" AND deadline <= ").push_bind(before);
    }
    if let Some(after) = query.deadline_after {
        builder.push(" AND deadline >= ").push_bind(after);
    }

    let direction = query.order_dir.keyword();
    builder
        .push(" ORDER BY ")
        .push(query.order_by.column())
        .push(" ")
        .push(direction);
    if query.order_by == SortKey::Deadline {
        builder.push(" NULLS LAST");
    }
    builder.push(", id ").push(direction);

    builder
        .push(" LIMIT ")
        .push_bind(i64::from(query.limit))
        .push(" OFFSET ")
        .push_bind(i64::from(query.offset));

    builder
}

/// Builds the case-insensitive substring search for `owner_id`.
pub fn search_tasks_sql(owner_id: i32, search: &TaskSearch) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {} FROM tasks WHERE owner_id = ",
        TASK_COLUMNS
    ));
    builder.push_bind(owner_id);

    if let Some(term) = search.title_term() {
        builder.push(" AND title ILIKE ").push_bind(like_pattern(term));
    }
    if let Some(term) = search.description_term() {
        builder
            .push(" AND description ILIKE ")
            .push_bind(like_pattern(term));
    }
    builder.push(" ORDER BY id ASC");

    builder
}

/// Wraps `term` for `ILIKE`, escaping the pattern metacharacters so they match literally.
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
