use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, FieldError, Messages, SAVE_FAILED, display_optional, optional_text, parse_date,
    parse_reference, parse_wire, wire_value,
};
use crate::filter::Lookup;
use crate::routes::Section;
use crate::views::Reference;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Assignee {
    Vlada,
    Peta,
}

impl Assignee {
    pub const ALL: [Assignee; 2] = [Assignee::Vlada, Assignee::Peta];

    /// Value of the `assignee` field and query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Assignee::Vlada => "vlada",
            Assignee::Peta => "peta",
        }
    }

    /// Path segment of this assignee's task screens.
    pub fn route_segment(&self) -> &'static str {
        match self {
            Assignee::Vlada => "vlada",
            Assignee::Peta => "petr",
        }
    }

    pub fn from_route_segment(segment: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.route_segment() == segment)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Assignee::Vlada => "Vláďa",
            Assignee::Peta => "Petr",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Planned",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }

    fn from_done(done: bool) -> Self {
        if done { TaskStatus::Done } else { TaskStatus::Todo }
    }
}

/// 1 = high, 2 = medium, 3 = low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Priority {
    High = 1,
    #[default]
    Medium = 2,
    Low = 3,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::High),
            2 => Ok(Priority::Medium),
            3 => Ok(Priority::Low),
            other => Err(format!("priority must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> u8 {
        priority as u8
    }
}

/// `status` is authoritative. The legacy `done` flag is read when `status` is
/// missing and always written as `status == done`; the value the store last
/// held is kept in `stored_done` for the `PATCH ?done=` toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TaskWire", into = "TaskWire")]
pub struct Task {
    pub id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    pub assignee: Assignee,
    pub status: TaskStatus,
    pub customer_id: Option<i64>,
    /// Raw `done` as read from the store. Never sent back.
    pub stored_done: bool,
}

impl Task {
    pub fn done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

#[derive(Serialize, Deserialize)]
struct TaskWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<i64>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Priority,
    #[serde(default)]
    due_date: Option<NaiveDate>,
    assignee: Assignee,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    status: Option<TaskStatus>,
    #[serde(default)]
    customer_id: Option<i64>,
}

impl From<TaskWire> for Task {
    fn from(wire: TaskWire) -> Self {
        Task {
            id: wire.id,
            title: wire.title,
            description: wire.description,
            priority: wire.priority,
            due_date: wire.due_date,
            assignee: wire.assignee,
            status: wire.status.unwrap_or_else(|| TaskStatus::from_done(wire.done)),
            customer_id: wire.customer_id,
            stored_done: wire.done,
        }
    }
}

impl From<Task> for TaskWire {
    fn from(task: Task) -> Self {
        TaskWire {
            done: task.done(),
            id: task.id,
            title: task.title,
            description: task.description,
            priority: task.priority,
            due_date: task.due_date,
            assignee: task.assignee,
            status: Some(task.status),
            customer_id: task.customer_id,
        }
    }
}

impl Entity for Task {
    type Scope = Assignee;

    const RESOURCE: &'static str = "tasks";
    const MESSAGES: Messages = Messages {
        load_list_failed: "Could not load tasks.",
        load_failed: "Could not load the task.",
        invalid_id: "Invalid task id.",
        create_failed: "Could not create the task.",
        save_failed: SAVE_FAILED,
        delete_failed: "Could not delete the task.",
        confirm_delete: "Really delete this task?",
        confirm_delete_permanently: "Really delete this task permanently?",
        empty_list: "No tasks yet.",
    };
    const REFERENCES: &'static [Reference] = &[Reference::Customers];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn draft(assignee: &Assignee) -> Self {
        Task {
            id: None,
            title: String::new(),
            description: None,
            priority: Priority::default(),
            due_date: None,
            assignee: *assignee,
            status: TaskStatus::default(),
            customer_id: None,
            stored_done: false,
        }
    }

    fn section(assignee: &Assignee) -> Section {
        Section::Tasks(*assignee)
    }

    fn list_query(assignee: &Assignee) -> Vec<(&'static str, String)> {
        vec![("assignee", assignee.as_str().to_string())]
    }

    fn search_fields(&self, _lookup: &Lookup) -> Vec<String> {
        let mut fields = vec![self.title.clone()];
        fields.extend(self.description.clone());
        fields
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("Task title is required.");
        }
        Ok(())
    }

    /// A task always belongs to the screen it was saved from.
    fn prepare(&mut self, assignee: &Assignee) {
        self.assignee = *assignee;
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "title" => self.title = value.to_string(),
            "description" => self.description = optional_text(value),
            "priority" => self.priority = parse_wire("priority", value)?,
            "due_date" => self.due_date = parse_date("due_date", value)?,
            "status" => self.status = parse_wire("status", value)?,
            "customer_id" => self.customer_id = parse_reference("customer_id", value)?,
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn fields(&self, _lookup: &Lookup) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("description", display_optional(&self.description)),
            ("priority", wire_value(&self.priority)),
            ("due_date", display_optional(&self.due_date)),
            ("status", wire_value(&self.status)),
            ("customer_id", display_optional(&self.customer_id)),
        ]
    }

    fn label(&self) -> String {
        let mark = if self.done() { "x" } else { " " };
        match self.due_date {
            Some(due) => format!(
                "[{}] {} ({}, due {}) [{}]",
                mark,
                self.title,
                self.priority.label(),
                due,
                self.status.label()
            ),
            None => format!(
                "[{}] {} ({}) [{}]",
                mark,
                self.title,
                self.priority.label(),
                self.status.label()
            ),
        }
    }
}
