//! Connectivity to the platform backend. Every outgoing request funnels
//! through [`ApiClient::authorized`], which reads the identity snapshot at
//! send time and attaches the bearer credential when one is present; the
//! rest of this module is endpoint plumbing over that.

use std::path::Path;

use reqwest::multipart;
use reqwest::{Method, Url};
use tracing::debug;
use uuid::Uuid;

use crate::client::schemas::{
    AnalysisReport, ApiDetail, AuthResponse, CreateSession, CredentialsReq, JoinSession,
    ProjectSummary, ReadSession,
};
use crate::error::{AppError, AppResult};
use crate::identity::{Identity, Role, SessionAccessor};

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    session: SessionAccessor,
}

impl ApiClient {
    pub fn new(base: &str, session: SessionAccessor) -> AppResult<ApiClient> {
        let base = Url::parse(base)
            .map_err(|e| AppError::user("bad_server_url".into(), format!("{}: {}", base, e)))?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| AppError::internal("http_client".into(), e.to_string()))?;
        Ok(ApiClient { base, http, session })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &SessionAccessor {
        &self.session
    }

    /// Build a request for `path` with identity attached. The snapshot is
    /// read here, at send time, never captured at construction, so the
    /// header always reflects the latest login or logout. Without a token
    /// the request goes out unauthenticated and the server decides.
    fn authorized(&self, method: Method, path: &str) -> AppResult<reqwest::RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| AppError::internal("bad_path".into(), format!("{}: {}", path, e)))?;
        let request_id = Uuid::new_v4();
        let mut rb = self
            .http
            .request(method, url)
            .header("x-request-id", request_id.to_string());
        if let Some(token) = self.session.token() {
            rb = rb.bearer_auth(token);
        }
        debug!(%request_id, path, "request prepared");
        Ok(rb)
    }

    /// Send and surface non-success statuses as typed errors, pulling the
    /// backend's `detail` field out of the body when it carries one.
    async fn send(&self, rb: reqwest::RequestBuilder) -> AppResult<reqwest::Response> {
        let resp = rb.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let detail = match resp.json::<ApiDetail>().await {
            Ok(body) => body.detail,
            Err(_) => status.to_string(),
        };
        Err(AppError::from_status(status.as_u16(), detail))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let resp = self.send(self.authorized(Method::GET, path)?).await?;
        resp.json::<T>()
            .await
            .map_err(|e| AppError::contract("bad_body".into(), e.to_string()))
    }

    // --- auth -----------------------------------------------------------

    /// Sign in against the backend. On success the store is updated through
    /// the attempt fence, so a response that lost a race against a newer
    /// sign-in or a logout is dropped without touching the identity.
    pub async fn sign_in(&self, username: &str, password: &str) -> AppResult<Identity> {
        self.authenticate("api/auth/login", username, password).await
    }

    /// Register a new account; a successful registration signs the user in.
    pub async fn sign_up(&self, username: &str, password: &str) -> AppResult<Identity> {
        self.authenticate("api/auth/register", username, password).await
    }

    async fn authenticate(&self, path: &str, username: &str, password: &str) -> AppResult<Identity> {
        let attempt = self.session.begin_login();
        let rb = self.authorized(Method::POST, path)?.json(&CredentialsReq {
            username: username.to_string(),
            password: password.to_string(),
        });
        let resp = self.send(rb).await?;
        let auth: AuthResponse = resp
            .json()
            .await
            .map_err(|e| AppError::contract("bad_auth_body".into(), e.to_string()))?;

        if auth.access_token.is_empty() {
            return Err(AppError::contract(
                "empty_token",
                "backend returned an empty access_token",
            ));
        }
        // Fail closed on a role outside the closed enumeration: no identity
        // is recorded at all rather than a credential with no usable role.
        let role = Role::from_wire(&auth.role)
            .map_err(|e| AppError::contract("bad_role".into(), e.to_string()))?;

        if !self.session.complete_login(attempt, auth.access_token, role) {
            debug!("sign-in resolved after being superseded; result dropped");
        }
        Ok(self.session.snapshot())
    }

    /// End the session. Purely local: the backend issues stateless tokens.
    pub fn sign_out(&self) {
        self.session.logout();
    }

    // --- sessions -------------------------------------------------------

    pub async fn list_sessions(&self) -> AppResult<Vec<ReadSession>> {
        self.get_json("api/sessions/").await
    }

    pub async fn create_session(&self, req: &CreateSession) -> AppResult<ReadSession> {
        let rb = self.authorized(Method::POST, "api/sessions/")?.json(req);
        let resp = self.send(rb).await?;
        resp.json()
            .await
            .map_err(|e| AppError::contract("bad_body".into(), e.to_string()))
    }

    pub async fn join_session(&self, code: &str) -> AppResult<ReadSession> {
        let rb = self
            .authorized(Method::POST, "api/sessions/join")?
            .json(&JoinSession { code: code.to_string() });
        let resp = self.send(rb).await?;
        resp.json()
            .await
            .map_err(|e| AppError::contract("bad_body".into(), e.to_string()))
    }

    pub async fn close_session(&self, session_id: i64) -> AppResult<()> {
        let path = format!("api/sessions/{}", session_id);
        let rb = self.authorized(Method::PATCH, &path)?;
        self.send(rb).await?;
        Ok(())
    }

    // --- projects -------------------------------------------------------

    pub async fn my_projects(&self) -> AppResult<Vec<ProjectSummary>> {
        self.get_json("api/projects/mine").await
    }

    /// Upload a Snap! project file for analysis within a session. The
    /// extension precheck mirrors the backend's own rejection of non-XML
    /// uploads, saving the round trip.
    pub async fn analyze_project(&self, file: &Path, session_id: i64) -> AppResult<AnalysisReport> {
        let filename = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::user("bad_filename", "file has no usable name"))?
            .to_string();
        if !filename.to_ascii_lowercase().ends_with(".xml") {
            return Err(AppError::user(
                "not_xml".into(),
                format!("'{}' is not an .xml project export", filename),
            ));
        }

        let bytes = tokio::fs::read(file)
            .await
            .map_err(|e| AppError::io("read_failed".into(), format!("{}: {}", file.display(), e)))?;
        let part = multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/xml")
            .map_err(|e| AppError::internal("mime".into(), e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("sessionId", session_id.to_string());

        let rb = self
            .authorized(Method::POST, "api/projects/analyze")?
            .multipart(form);
        let resp = self.send(rb).await?;
        resp.json()
            .await
            .map_err(|e| AppError::contract("bad_body".into(), e.to_string()))
    }

    // --- misc -----------------------------------------------------------

    pub async fn health(&self) -> AppResult<()> {
        let rb = self.authorized(Method::GET, "health")?;
        self.send(rb).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::SessionStore;

    fn client() -> ApiClient {
        let store = SessionStore::new();
        ApiClient::new("http://127.0.0.1:8000/", SessionAccessor::new(store)).unwrap()
    }

    fn auth_header(c: &ApiClient) -> Option<String> {
        let req = c.authorized(Method::GET, "api/sessions/").unwrap().build().unwrap();
        req.headers()
            .get(reqwest::header::AUTHORIZATION)
            .map(|v| v.to_str().unwrap().to_string())
    }

    #[test]
    fn no_token_means_no_authorization_header() {
        let c = client();
        assert_eq!(auth_header(&c), None);
        // Every request still carries a correlation id
        let req = c.authorized(Method::GET, "health").unwrap().build().unwrap();
        assert!(req.headers().get("x-request-id").is_some());
    }

    #[test]
    fn header_tracks_login_and_logout_on_the_same_client() {
        let c = client();
        c.session().login("t1", Role::Admin);
        assert_eq!(auth_header(&c).as_deref(), Some("Bearer t1"));

        c.session().login("t2", Role::User);
        assert_eq!(auth_header(&c).as_deref(), Some("Bearer t2"));

        c.session().logout();
        assert_eq!(auth_header(&c), None);
    }

    #[tokio::test]
    async fn analyze_rejects_non_xml_before_any_io() {
        let c = client();
        let err = c
            .analyze_project(Path::new("notes/project.txt"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserInput { .. }));
        assert_eq!(err.code_str(), "not_xml");
    }

    #[tokio::test]
    async fn analyze_surfaces_missing_files_as_io_errors() {
        let c = client();
        let err = c
            .analyze_project(Path::new("does-not-exist.xml"), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }

    #[tokio::test]
    async fn analyze_reads_the_file_and_surfaces_transport_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project.xml");
        std::fs::write(&path, "<project name=\"demo\"/>").unwrap();

        // Discard port: nothing listens there, so the request dies in
        // transit after the precheck and the file read both succeeded
        let store = SessionStore::new();
        let c = ApiClient::new("http://127.0.0.1:9/", SessionAccessor::new(store)).unwrap();
        let err = c.analyze_project(&path, 1).await.unwrap_err();
        assert!(matches!(err, AppError::Transport { .. }));
    }
}
