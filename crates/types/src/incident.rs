//! Incident, incident type and comment payloads.
//!
//! Every handle-typed member follows the session [`HandleFormat`](crate::HandleFormat);
//! unset members are omitted when writing.

use crate::Handle;
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Rich text as returned under `text_content_output_format=objects_convert`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TextContentDto {
    pub format: String,
    pub content: String,
}

impl TextContentDto {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            format: "text".into(),
            content: content.into(),
        }
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self {
            format: "html".into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct IncidentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<TextContentDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub discovered_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_code: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crimestatus_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_dept_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_vendor_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_type_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Handle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub incident_type_ids: Vec<Handle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<Handle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nist_attack_vectors: Vec<Handle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reporter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_individual_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_summary: Option<TextContentDto>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_involved: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negative_pr_likely: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_compromised: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_scenario: Option<bool>,

    /// Custom field values keyed by field name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
}

impl IncidentDto {
    /// Minimal payload for `POST /orgs/{org_id}/incidents`.
    pub fn new(name: impl Into<String>, discovered_date: DateTime<Utc>) -> Self {
        Self {
            name: Some(name.into()),
            discovered_date: Some(discovered_date),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: TextContentDto) -> Self {
        self.description = Some(description);
        self
    }

    pub fn with_incident_types(mut self, types: impl IntoIterator<Item = Handle>) -> Self {
        self.incident_type_ids.extend(types);
        self
    }

    pub fn with_property(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(field.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentTypeDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Handle>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub update_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_key: Option<String>,
}

impl IncidentTypeDto {
    /// Handle usable in [`IncidentDto::incident_type_ids`].
    pub fn handle(&self) -> Handle {
        Handle {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CommentDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Handle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_lname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContentDto>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub create_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "ts_milliseconds_option")]
    pub modify_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CommentDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mentioned_users: Vec<Handle>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl CommentDto {
    pub fn new(text: TextContentDto) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }
}

/// Incident as returned with `want_full_data=true`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FullIncidentDataDto {
    #[serde(flatten)]
    pub incident: IncidentDto,
    /// Data type flags keyed by type handle; a key may be an id or a name.
    #[serde(default, with = "crate::handle_map")]
    pub dtm: BTreeMap<Handle, bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<CommentDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tasks: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cm: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulators: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hipaa: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Value>,
}

impl FullIncidentDataDto {
    pub fn id(&self) -> Option<i64> {
        self.incident.id
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HandleFormat, JsonCodec};
    use serde_json::json;

    #[test]
    fn full_data_reads_incident_and_dtm() {
        let codec = JsonCodec::new(HandleFormat::Names);
        let full: FullIncidentDataDto = codec
            .from_value(json!({
                "id": 2095,
                "name": "Phish",
                "owner_id": "jdoe",
                "dtm": {"12": true, "Phishing": false},
                "comments": [{"id": 3, "user_id": "asmith"}]
            }))
            .unwrap();
        assert_eq!(full.id(), Some(2095));
        assert_eq!(full.incident.owner_id, Some(Handle::from_name("jdoe")));
        assert_eq!(full.dtm.get(&Handle::from_id(12)), Some(&true));
        assert_eq!(full.dtm.get(&Handle::from_name("Phishing")), Some(&false));
        assert_eq!(full.comments[0].user_id, Some(Handle::from_name("asmith")));
    }

    #[test]
    fn full_data_writes_dtm_keys_by_name() {
        let mut full = FullIncidentDataDto {
            incident: IncidentDto {
                id: Some(7),
                ..IncidentDto::default()
            },
            ..FullIncidentDataDto::default()
        };
        full.dtm.insert(Handle::new(12, "Phishing"), true);
        let json = JsonCodec::new(HandleFormat::Ids).to_value(&full).unwrap();
        assert_eq!(json, json!({"id": 7, "dtm": {"Phishing": true}}));
    }
}
