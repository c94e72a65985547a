use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, FieldError, Messages, SAVE_FAILED, display_optional, optional_text, parse_wire, wire_value,
};
use crate::filter::Lookup;
use crate::routes::Section;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    InProgress,
    Won,
    Lost,
}

impl LeadStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::New => "New",
            LeadStatus::Contacted => "Contacted",
            LeadStatus::InProgress => "In negotiation",
            LeadStatus::Won => "Converted",
            LeadStatus::Lost => "Lost",
        }
    }
}

/// A contact that has not signed anything yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Where the lead came from, e.g. web form or referral.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: LeadStatus,
}

impl Entity for Lead {
    type Scope = ();

    const RESOURCE: &'static str = "leads";
    const MESSAGES: Messages = Messages {
        load_list_failed: "Could not load leads.",
        load_failed: "Could not load the lead.",
        invalid_id: "Invalid lead id.",
        create_failed: "Could not create the lead.",
        save_failed: SAVE_FAILED,
        delete_failed: "Could not delete the lead.",
        confirm_delete: "Really delete this lead?",
        confirm_delete_permanently: "Really delete this lead permanently?",
        empty_list: "No leads yet.",
    };

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn draft(_scope: &()) -> Self {
        Lead {
            id: None,
            name: String::new(),
            email: None,
            phone: None,
            source: None,
            note: None,
            status: LeadStatus::default(),
        }
    }

    fn section(_scope: &()) -> Section {
        Section::Leads
    }

    fn search_fields(&self, _lookup: &Lookup) -> Vec<String> {
        let mut fields = vec![self.name.clone()];
        fields.extend([&self.email, &self.phone, &self.source].into_iter().flatten().cloned());
        fields
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("Name is required.");
        }
        Ok(())
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "name" => self.name = value.to_string(),
            "email" => self.email = optional_text(value),
            "phone" => self.phone = optional_text(value),
            "source" => self.source = optional_text(value),
            "note" => self.note = optional_text(value),
            "status" => self.status = parse_wire("status", value)?,
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn fields(&self, _lookup: &Lookup) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("email", display_optional(&self.email)),
            ("phone", display_optional(&self.phone)),
            ("source", display_optional(&self.source)),
            ("note", display_optional(&self.note)),
            ("status", wire_value(&self.status)),
        ]
    }

    fn label(&self) -> String {
        format!("{} [{}]", self.name, self.status.label())
    }
}
