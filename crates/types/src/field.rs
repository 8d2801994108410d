//! Incident field definitions (`/orgs/{org_id}/types/incident/fields`).

use crate::MethodName;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    Boolean,
    DatePicker,
    DateTimePicker,
    MultiSelect,
    Select,
    Text,
    TextArea,
    Number,
    #[serde(rename = "multiselect_incident")]
    MultiSelectIncident,
    #[serde(rename = "multiselect_task")]
    MultiSelectTask,
    #[serde(rename = "select_owner")]
    SelectOwner,
    #[serde(rename = "multiselect_members")]
    MultiSelectMembers,
    #[serde(rename = "select_user")]
    SelectUser,
    None,
    #[serde(other)]
    Unknown,
}

impl InputType {
    /// Whether the field offers a fixed list of values.
    pub fn is_select(self) -> bool {
        matches!(self, InputType::Select | InputType::MultiSelect)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldRequired {
    Always,
    Close,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldDefValueDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    pub label: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

impl FieldDefValueDto {
    /// New value to be assigned an id by the server.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            enabled: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldDefDto {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub input_type: InputType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<FieldRequired>,
    #[serde(default)]
    pub hide_notification: bool,
    #[serde(default)]
    pub chosen: bool,
    #[serde(default)]
    pub blank_option: bool,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<MethodName>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<FieldDefValueDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_true: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_false: Option<String>,
}

impl FieldDefDto {
    /// Append labels not yet present (compared case-insensitively, after
    /// trimming). Blank labels are skipped. Returns how many were added.
    pub fn add_values<I, S>(&mut self, labels: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let before = self.values.len();
        for label in labels {
            let label = label.as_ref().trim();
            if label.is_empty() || self.find_value(label).is_some() {
                continue;
            }
            self.values.push(FieldDefValueDto::new(label));
        }
        self.values.len() - before
    }

    /// Value whose label matches `label`, ignoring case.
    pub fn find_value(&self, label: &str) -> Option<&FieldDefValueDto> {
        let wanted = label.to_lowercase();
        self.values
            .iter()
            .find(|value| value.label.to_lowercase() == wanted)
    }
}

impl fmt::Display for FieldDefDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{text} ({})", self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn default_true() -> bool {
    true
}
