//! Async client for the Co3 incident response REST API.
//!
//! Every request carries the session's [`HandleFormat`] in the
//! `handle_format` header, and request/response bodies are encoded with a
//! [`JsonCodec`] bound to that same format.

mod config;
mod error;

pub use crate::config::{ClientConfig, ProxyConfig, ENV_PREFIX};
pub use crate::error::SdkError;
pub use co3_types;

use co3_types::{
    AuthenticationDto, CommentDto, FieldDefDto, FullIncidentDataDto, FullOrgDto, HandleFormat,
    IncidentDto, IncidentTypeDto, JsonCodec, UserSessionDto, HANDLE_FORMAT_HEADER,
};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Proxy, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Header carrying the CSRF token of the authenticated session.
pub const CSRF_TOKEN_HEADER: &str = "X-sess-id";
/// Header selecting how rich text members are returned.
pub const TEXT_CONTENT_OUTPUT_FORMAT_HEADER: &str = "text_content_output_format";

const TEXT_CONTENT_OUTPUT_FORMAT: &str = "objects_convert";
const SESSION_PATH: &str = "session";

/// Client bound to one API endpoint and one handle format.
///
/// Session state changes (`authenticate`, `logout`) take `&mut self`; share a
/// client between tasks behind a lock if needed.
pub struct Co3Client {
    base_url: Url,
    http: Client,
    codec: JsonCodec,
    session: Option<UserSessionDto>,
}

impl Co3Client {
    /// Build a client from configuration (timeout, proxy, handle format).
    pub fn new(config: &ClientConfig) -> Result<Self, SdkError> {
        config.validate()?;

        let mut builder = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true);
        if let Some(proxy) = &config.proxy {
            let mut http_proxy = Proxy::all(&proxy.url)?;
            if let Some(user) = &proxy.user {
                http_proxy = http_proxy.basic_auth(user, proxy.password.as_deref().unwrap_or(""));
            }
            builder = builder.proxy(http_proxy);
        }

        Self::with_http_client(&config.api_url, config.handle_format, builder.build()?)
    }

    /// Use an existing reqwest client (custom TLS, middleware). Enable its
    /// cookie store so the server session cookie is kept between calls.
    pub fn with_http_client(
        base_url: impl AsRef<str>,
        handle_format: HandleFormat,
        http: Client,
    ) -> Result<Self, SdkError> {
        let mut url = Url::parse(base_url.as_ref())
            .map_err(|_| SdkError::InvalidBaseUrl(base_url.as_ref().to_string()))?;
        if !url.path().ends_with('/') {
            let mut path = url.path().trim_end_matches('/').to_owned();
            path.push('/');
            url.set_path(&path);
        }
        Ok(Self {
            base_url: url,
            http,
            codec: JsonCodec::new(handle_format),
            session: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn handle_format(&self) -> HandleFormat {
        self.codec.format()
    }

    /// JSON codec used for request and response bodies.
    pub fn codec(&self) -> JsonCodec {
        self.codec
    }

    /// The authenticated session, if any.
    pub fn session(&self) -> Option<&UserSessionDto> {
        self.session.as_ref()
    }

    /// Open a session (`POST /session`).
    pub async fn authenticate(
        &mut self,
        credentials: &AuthenticationDto,
    ) -> Result<&UserSessionDto, SdkError> {
        let request = self.request(Method::POST, SESSION_PATH, &[], Some(credentials))?;
        let session: UserSessionDto = self.send(request).await?;
        debug!(user_id = session.user_id, orgs = session.orgs.len(), "authenticated");
        Ok(self.session.insert(session))
    }

    /// Close the session (`DELETE /session`).
    pub async fn logout(&mut self) -> Result<(), SdkError> {
        self.require_session()?;
        let request = self.request::<()>(Method::DELETE, SESSION_PATH, &[], None)?;
        let _: serde_json::Value = self.send(request).await?;
        self.session = None;
        Ok(())
    }

    pub async fn get_org(&self, org_id: i64) -> Result<FullOrgDto, SdkError> {
        self.get_json(&format!("orgs/{org_id}")).await
    }

    /// Incident field definitions of an organization.
    pub async fn get_field_types(&self, org_id: i64) -> Result<Vec<FieldDefDto>, SdkError> {
        self.get_json(&format!("orgs/{org_id}/types/incident/fields"))
            .await
    }

    /// Save a field definition (including new select values).
    pub async fn save_field(
        &self,
        org_id: i64,
        field: &FieldDefDto,
    ) -> Result<FieldDefDto, SdkError> {
        let path = format!("orgs/{org_id}/types/incident/fields/{}", field.id);
        self.put_json(&path, field).await
    }

    pub async fn get_incident_types(&self, org_id: i64) -> Result<Vec<IncidentTypeDto>, SdkError> {
        self.get_json(&format!("orgs/{org_id}/incident_types")).await
    }

    pub async fn get_incident(
        &self,
        org_id: i64,
        incident_id: i64,
    ) -> Result<FullIncidentDataDto, SdkError> {
        self.get_json(&format!("orgs/{org_id}/incidents/{incident_id}"))
            .await
    }

    /// Create an incident (`POST /orgs/{org_id}/incidents`).
    pub async fn create_incident(
        &self,
        org_id: i64,
        incident: &IncidentDto,
        want_full_data: bool,
        want_tasks: bool,
    ) -> Result<FullIncidentDataDto, SdkError> {
        self.require_session()?;
        let query = [
            ("want_full_data", want_full_data.to_string()),
            ("want_tasks", want_tasks.to_string()),
        ];
        let request = self.request(
            Method::POST,
            &format!("orgs/{org_id}/incidents"),
            &query,
            Some(incident),
        )?;
        self.send(request).await
    }

    pub async fn update_incident(
        &self,
        org_id: i64,
        incident_id: i64,
        incident: &IncidentDto,
    ) -> Result<IncidentDto, SdkError> {
        self.put_json(&format!("orgs/{org_id}/incidents/{incident_id}"), incident)
            .await
    }

    pub async fn delete_incident(&self, org_id: i64, incident_id: i64) -> Result<(), SdkError> {
        self.require_session()?;
        let path = format!("orgs/{org_id}/incidents/{incident_id}");
        let request = self.request::<()>(Method::DELETE, &path, &[], None)?;
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    pub async fn get_comments(
        &self,
        org_id: i64,
        incident_id: i64,
    ) -> Result<Vec<CommentDto>, SdkError> {
        self.get_json(&format!("orgs/{org_id}/incidents/{incident_id}/comments"))
            .await
    }

    pub async fn add_comment(
        &self,
        org_id: i64,
        incident_id: i64,
        comment: &CommentDto,
    ) -> Result<CommentDto, SdkError> {
        self.require_session()?;
        let path = format!("orgs/{org_id}/incidents/{incident_id}/comments");
        let request = self.request(Method::POST, &path, &[], Some(comment))?;
        self.send(request).await
    }

    fn require_session(&self) -> Result<&UserSessionDto, SdkError> {
        self.session.as_ref().ok_or(SdkError::NotAuthenticated)
    }

    async fn get_json<T>(&self, path: &str) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        self.require_session()?;
        let request = self.request::<()>(Method::GET, path, &[], None)?;
        self.send(request).await
    }

    async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, SdkError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.require_session()?;
        let request = self.request(Method::PUT, path, &[], Some(body))?;
        self.send(request).await
    }

    fn request<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<RequestBuilder, SdkError>
    where
        B: Serialize + ?Sized,
    {
        let mut url = self.base_url.join(path)?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(key, value)| (*key, value.as_str())));
        }
        debug!(%method, %url, handle_format = %self.codec.format(), "sending request");

        let mut builder = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(HANDLE_FORMAT_HEADER, self.codec.format().as_str());

        if let Some(session) = &self.session {
            builder = builder
                .header(CSRF_TOKEN_HEADER, session.csrf_token.as_str())
                .header(TEXT_CONTENT_OUTPUT_FORMAT_HEADER, TEXT_CONTENT_OUTPUT_FORMAT);
        }

        if let Some(body) = body {
            builder = builder.body(self.codec.to_vec(body)?);
        }
        Ok(builder)
    }

    async fn send<T>(&self, request: RequestBuilder) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await?;
        self.map_response(response).await
    }

    async fn map_response<T>(&self, response: Response) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "request failed");
            return Err(map_api_error(status.as_u16(), &bytes));
        }
        self.decode_body(&bytes)
    }

    /// Decode a response body with the session codec. Failures are reported
    /// as [`SdkError::Deserialization`]; the cause is only logged.
    fn decode_body<T>(&self, bytes: &[u8]) -> Result<T, SdkError>
    where
        T: DeserializeOwned,
    {
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            bytes
        };
        self.codec.from_slice(bytes).map_err(|err| {
            debug!(error = %err, "response body could not be decoded");
            SdkError::Deserialization
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

fn map_api_error(status: u16, bytes: &[u8]) -> SdkError {
    if let Ok(ApiErrorResponse {
        message: Some(message),
    }) = serde_json::from_slice::<ApiErrorResponse>(bytes)
    {
        return SdkError::server_error(status, message);
    }
    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if text.is_empty() {
        SdkError::server_error(status, "request failed")
    } else {
        SdkError::server_error(status, text)
    }
}
