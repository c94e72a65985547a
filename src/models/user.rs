use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::{
    Entity, FieldError, Messages, SAVE_FAILED, display_optional, optional_text, parse_bool, parse_wire,
};
use crate::filter::Lookup;
use crate::routes::Section;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Manager,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub role: UserRole,
    // the store itself calls this column `is_active`
    #[serde(default = "active_default", alias = "is_active", deserialize_with = "active_or_default")]
    pub active: bool,
    #[serde(default)]
    pub note: Option<String>,
}

fn active_default() -> bool {
    true
}

fn active_or_default<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(true))
}

impl Entity for User {
    type Scope = ();

    const RESOURCE: &'static str = "users";
    const MESSAGES: Messages = Messages {
        load_list_failed: "Could not load users.",
        load_failed: "Could not load the user.",
        invalid_id: "Invalid user id.",
        create_failed: "Could not create the user.",
        save_failed: SAVE_FAILED,
        delete_failed: "Could not delete the user.",
        confirm_delete: "Really delete this user?",
        confirm_delete_permanently: "Really delete this user permanently?",
        empty_list: "No users yet.",
    };

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn draft(_scope: &()) -> Self {
        User {
            id: None,
            name: String::new(),
            email: String::new(),
            role: UserRole::default(),
            active: true,
            note: None,
        }
    }

    fn section(_scope: &()) -> Section {
        Section::Users
    }

    fn search_fields(&self, _lookup: &Lookup) -> Vec<String> {
        vec![self.name.clone(), self.email.clone(), self.role.as_str().to_string()]
    }

    fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("User name is required.");
        }
        if self.email.trim().is_empty() {
            return Err("E-mail is required.");
        }
        Ok(())
    }

    fn set_field(&mut self, key: &str, value: &str) -> Result<(), FieldError> {
        match key {
            "name" => self.name = value.to_string(),
            "email" => self.email = value.to_string(),
            "role" => self.role = parse_wire("role", value)?,
            "active" => self.active = parse_bool("active", value)?,
            "note" => self.note = optional_text(value),
            other => return Err(FieldError::Unknown(other.to_string())),
        }
        Ok(())
    }

    fn fields(&self, _lookup: &Lookup) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("email", self.email.clone()),
            ("role", self.role.as_str().to_string()),
            ("active", if self.active { "yes" } else { "no" }.to_string()),
            ("note", display_optional(&self.note)),
        ]
    }

    fn label(&self) -> String {
        let state = if self.active { "" } else { ", inactive" };
        format!("{} <{}> ({}{})", self.name, self.email, self.role.as_str(), state)
    }
}
