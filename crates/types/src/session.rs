use crate::incident::IncidentTypeDto;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials posted to `/session`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticationDto {
    pub email: String,
    pub password: String,
}

impl AuthenticationDto {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for AuthenticationDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticationDto")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Session returned by a successful authentication.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserSessionDto {
    #[serde(default)]
    pub orgs: Vec<SessionOrgInfoDto>,
    #[serde(default)]
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_lname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default)]
    pub is_saml: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saml_alias: Option<String>,
    /// Sent back in the `X-sess-id` header on every request.
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ip: Option<String>,
    #[serde(default, rename = "is_ldap")]
    pub ldap: bool,
}

impl UserSessionDto {
    pub fn org(&self, org_id: i64) -> Option<&SessionOrgInfoDto> {
        self.orgs.iter().find(|org| org.id == org_id)
    }
}

/// Organization summary embedded in the session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionOrgInfoDto {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl fmt::Display for SessionOrgInfoDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Organization details from `/orgs/{org_id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FullOrgDto {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub incident_types: Vec<IncidentTypeDto>,
    #[serde(default)]
    pub attachments_enabled: bool,
    #[serde(default)]
    pub breach_enabled: bool,
}

fn default_true() -> bool {
    true
}
