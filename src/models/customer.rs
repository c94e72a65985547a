use serde::{Deserialize, Serialize};

use crate::entity::{
    Entity, FieldError, Messages, SAVE_FAILED, display_optional, optional_text, parse_wire, wire_value,
};
use crate::filter::Lookup;
use crate::routes::Section;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerStatus {
    #[default]
    Active,
    Inactive,
    Negotiation,
}

impl CustomerStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CustomerStatus::Active => "Active",
            CustomerStatus::Inactive => "Inactive",
            CustomerStatus::Negotiation => "In negotiation",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub status: CustomerStatus,
}

impl Entity for Customer {
    type Scope = ();

    const RESOURCE: &'static str = "customers";
    const MESSAGES: Messages = Messages {
        load_list_failed: "Could not load customers.",
        load_failed: "Could not load the customer.",
        invalid_id: "Invalid customer id.",
        create_failed: "Could not create the customer.",
        save_failed: SAVE_FAILED,
        delete_failed: "Could not delete the customer.",
        confirm_delete: "Really delete this customer?",
        confirm_delete_permanently: "Really delete this customer permanently?",
        empty_list: "No customers yet.",
    };

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn draft(_scope: &()) -> Self {
        Customer {
            id: None,
            name: String::new(),
            email: None,
            phone: None,
            note: None,
            status: CustomerStatus::default(),
        }
    }

    fn section(_scope: &()) -> Section {
        Section::Customers
    }

    fn search_fields(&self, _lookup: &Lookup) -> Vec<String> {
        let mut fields = vec![self.name.clone()];
        fields.extend(self.email.clone());
        fields.extend(self.phone.clone());
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
            ("note", display_optional(&self.note)),
            ("status", wire_value(&self.status)),
        ]
    }

    fn label(&self) -> String {
        format!("{} [{}]", self.name, self.status.label())
    }
}
