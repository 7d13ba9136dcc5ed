use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Todo,
    Doing,
    Done,
}

impl Column {
    pub const ALL: [Column; 3] = [Column::Todo, Column::Doing, Column::Done];

    pub fn index(self) -> usize {
        match self {
            Column::Todo => 0,
            Column::Doing => 1,
            Column::Done => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::Todo => "To Do",
            Column::Doing => "In Progress",
            Column::Done => "Done",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub time_range: String, // display only, e.g. "9h - 10h" or "14:05 - ?"
    pub column: Column,
    pub created_at: DateTime<Utc>,
}

pub struct DefaultTask {
    pub id: &'static str,
    pub title: &'static str,
    pub time_range: &'static str,
}

pub const DEFAULT_TASKS: [DefaultTask; 3] = [
    DefaultTask {
        id: "task-1",
        title: "Collect e-mails from LinkedIn connections via Apollo",
        time_range: "9h - 10h",
    },
    DefaultTask {
        id: "task-2",
        title: "Look up company domains on Hunter.io and e-mail their staff",
        time_range: "10h - 11h30",
    },
    DefaultTask {
        id: "task-3",
        title: "Apply to 20 Easy Apply openings on LinkedIn",
        time_range: "11h30 - 12h",
    },
];

pub fn is_default_task(id: &str) -> bool {
    DEFAULT_TASKS.iter().any(|t| t.id == id)
}

impl DefaultTask {
    pub fn instantiate(&self, created_at: DateTime<Utc>) -> Task {
        Task {
            id: self.id.to_string(),
            title: self.title.to_string(),
            time_range: self.time_range.to_string(),
            column: Column::Todo,
            created_at,
        }
    }
}

pub fn default_tasks(created_at: DateTime<Utc>) -> Vec<Task> {
    DEFAULT_TASKS
        .iter()
        .map(|t| t.instantiate(created_at))
        .collect()
}

pub fn new_task_id() -> String {
    format!("task-{}", Uuid::new_v4())
}

pub fn open_time_range(start: DateTime<Local>) -> String {
    format!("{} - ?", start.format("%H:%M"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn column_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Column::Doing).unwrap(), "\"doing\"");
        let c: Column = serde_json::from_str("\"done\"").unwrap();
        assert_eq!(c, Column::Done);
    }

    #[test]
    fn task_uses_camel_case_fields() {
        let task = DEFAULT_TASKS[0].instantiate(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["timeRange"], "9h - 10h");
        assert_eq!(value["column"], "todo");
        assert_eq!(value["createdAt"], "2024-05-01T08:00:00Z");
    }

    #[test]
    fn reserved_ids_are_recognized() {
        assert!(is_default_task("task-1"));
        assert!(is_default_task("task-3"));
        assert!(!is_default_task("task-4"));
        assert!(!is_default_task(&new_task_id()));
    }

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(new_task_id(), new_task_id());
    }

    #[test]
    fn open_range_formats_hours_and_minutes() {
        let start = Local.with_ymd_and_hms(2024, 5, 1, 7, 5, 0).unwrap();
        assert_eq!(open_time_range(start), "07:05 - ?");
    }

    #[test]
    fn column_index_round_trips() {
        for column in Column::ALL {
            assert_eq!(Column::from_index(column.index()), Some(column));
        }
        assert_eq!(Column::from_index(3), None);
    }
}
