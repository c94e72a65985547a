use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, FieldError, Messages, SAVE_FAILED, display_optional, optional_text, parse_date, parse_id,
    parse_reference, parse_wire, wire_value,
};
use crate::filter::Lookup;
use crate::routes::Section;
use crate::views::Reference;

pub const NO_CUSTOMER: &str = "No customer";
pub const UNKNOWN_USER: &str = "Unknown user";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeetingStatus {
    #[default]
    Planned,
    Done,
    Cancelled,
}

impl MeetingStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MeetingStatus::Planned => "Planned",
            MeetingStatus::Done => "Done",
            MeetingStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    /// Required by the API; only a draft may hold `None`.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Free-form `HH:MM`.
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub customer_id: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: MeetingStatus,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub user_ids: BTreeSet<i64>,
}

impl Meeting {
    /// Customer name for display; unresolved ids read as unknown.
    pub fn customer_display(&self, lookup: &Lookup) -> String {
        match self.customer_id {
            None => NO_CUSTOMER.to_string(),
            Some(id) => lookup.customer_name(id).unwrap_or(NO_CUSTOMER).to_string(),
        }
    }

    pub fn user_display(&self, lookup: &Lookup) -> Vec<String> {
        self.user_ids
            .iter()
            .map(|id| lookup.user_name(*id).unwrap_or(UNKNOWN_USER).to_string())
            .collect()
    }

    /// Adds the user when absent, removes them otherwise.
    pub fn toggle_user(&mut self, user_id: i64) {
        if !self.user_ids.remove(&user_id) {
            self.user_ids.insert(user_id);
        }
    }
}

impl Entity for Meeting {
    type Scope = ();

    const RESOURCE: &'static str = "meetings";
    const MESSAGES: Messages = Messages {
        load_list_failed: "Could not load meetings.",
        load_failed: "Could not load the meeting.",
        invalid_id: "Invalid meeting id.",
        create_failed: "Could not create the meeting.",
        save_failed: SAVE_FAILED,
        delete_failed: "Could not delete the meeting.",
        confirm_delete: "Really delete this meeting?",
        confirm_delete_permanently: "Really delete this meeting permanently?",
        empty_list: "No meetings yet.",
    };
    const REFERENCES: &'static [Reference] = &[Reference::Customers, Reference::Users];

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn draft(_scope: &()) -> Self {
        Meeting {
            id: None,
            title: String::new(),
            date: None,
            time: None,
            customer_id: None,
            note: None,
            status: MeetingStatus::default(),
            user_ids: BTreeSet::new(),
        }
    }

    fn section(_scope: &()) -> Section {
        Section::Meetings
    }

    fn search_fields(&self, lookup: &Lookup) -> Vec<String> {
        let mut fields = vec![self.title.clone(), self.status.label().to_string()];
        fields.extend(self.note.clone());
        fields.extend(
            self.customer_id
                .and_then(|id| lookup.customer_name(id))
                .map(str::to_string),
        );
        let users: Vec<&str> = self
            .user_ids
            .iter()
            .filter_map(|id| lookup.user_name(*id))
            .collect();
        if !users.is_empty() {
            fields.push(users.join(" "));
        }
        fields
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("Meeting title is required.");
        }
        if self.date.is_none() {
            return Err("Meeting date is required.");
        }
        Ok(())
    }

    fn prepare(&mut self, _scope: &()) {
        self.title = self.title.trim().to_string();
        self.time = self.time.take().filter(|time| !time.trim().is_empty());
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "title" => self.title = value.to_string(),
            "date" => self.date = parse_date("date", value)?,
            "time" => self.time = optional_text(value.trim()),
            "customer_id" => self.customer_id = parse_reference("customer_id", value)?,
            "note" => self.note = optional_text(value),
            "status" => self.status = parse_wire("status", value)?,
            "user_ids" => {
                self.user_ids = value
                    .split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(|id| {
                        parse_id(id).ok_or_else(|| FieldError::Invalid {
                            field: "user_ids",
                            value: value.to_string(),
                            reason: format!("{} is not a user id", id),
                        })
                    })
                    .collect::<Result<_, _>>()?;
            }
            "user" => {
                if let Some(id) = parse_reference("user", value)? {
                    self.toggle_user(id);
                }
            }
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn fields(&self, _lookup: &Lookup) -> Vec<(&'static str, String)> {
        vec![
            ("title", self.title.clone()),
            ("date", display_optional(&self.date)),
            ("time", display_optional(&self.time)),
            ("customer_id", display_optional(&self.customer_id)),
            ("note", display_optional(&self.note)),
            ("status", wire_value(&self.status)),
            (
                "user_ids",
                self.user_ids
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        ]
    }

    fn label(&self) -> String {
        let when = match (&self.date, &self.time) {
            (Some(date), Some(time)) => format!("{} {}", date, time),
            (Some(date), None) => date.to_string(),
            _ => "no date".to_string(),
        };
        format!("{} ({}) [{}]", self.title, when, self.status.label())
    }

    fn row(&self, lookup: &Lookup) -> String {
        let users = self.user_display(lookup);
        let users = if users.is_empty() { "-".to_string() } else { users.join(", ") };
        format!("{} | {} | {}", self.label(), self.customer_display(lookup), users)
    }
}
