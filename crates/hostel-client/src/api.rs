use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use hostel_types::api::{
    AdminLoginRequest, AdminLoginResponse, CreateComplaintRequest, MessageResponse, REVISION_HEADER,
    RevisionResponse, UpdateComplaintRequest,
};
use hostel_types::models::Complaint;

use crate::error::ClientError;

/// A full listing and the store revision it was read at.
#[derive(Debug, Clone)]
pub struct Listing {
    pub revision: Option<u64>,
    pub complaints: Vec<Complaint>,
}

/// Thin HTTP client over the complaint API. No timeouts or retries: a failed
/// call is reported once and the caller decides whether to repeat it.
#[derive(Clone)]
pub struct ComplaintClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl ComplaintClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
            token: None,
        }
    }

    /// Attach an admin bearer token to mutating calls.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/api/complaints/{id}` with the id percent-encoded as one segment.
    fn complaint_url(&self, id: &str) -> Result<Url, ClientError> {
        let invalid = || ClientError::Invalid(format!("Invalid server URL '{}'", self.base_url));

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "complaints", id]);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub async fn create(&self, req: &CreateComplaintRequest) -> Result<Complaint, ClientError> {
        let resp = self.http.post(self.url("/api/complaints")).json(req).send().await?;
        json(resp).await
    }

    pub async fn list(&self) -> Result<Listing, ClientError> {
        let resp = check(self.http.get(self.url("/api/complaints")).send().await?).await?;
        let revision = resp
            .headers()
            .get(REVISION_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());
        let complaints = resp.json().await?;
        Ok(Listing { revision, complaints })
    }

    pub async fn revision(&self) -> Result<u64, ClientError> {
        let resp = self.http.get(self.url("/api/complaints/revision")).send().await?;
        let body: RevisionResponse = json(resp).await?;
        Ok(body.revision)
    }

    pub async fn get(&self, id: &str) -> Result<Complaint, ClientError> {
        let resp = self.http.get(self.complaint_url(id)?).send().await?;
        json(resp).await
    }

    pub async fn update_status(
        &self,
        id: &str,
        req: &UpdateComplaintRequest,
    ) -> Result<Complaint, ClientError> {
        let builder = self.http.put(self.complaint_url(id)?).json(req);
        let resp = self.authorized(builder).send().await?;
        json(resp).await
    }

    /// Returns the server's confirmation message.
    pub async fn delete(&self, id: &str) -> Result<String, ClientError> {
        let builder = self.http.delete(self.complaint_url(id)?);
        let resp = self.authorized(builder).send().await?;
        let body: MessageResponse = json(resp).await?;
        Ok(body.message)
    }

    pub async fn admin_login(
        &self,
        admin_id: &str,
        password: &str,
    ) -> Result<AdminLoginResponse, ClientError> {
        let req = AdminLoginRequest {
            admin_id: admin_id.to_string(),
            password: password.to_string(),
        };
        let resp = self.http.post(self.url("/api/admin/login")).json(&req).send().await?;
        json(resp).await
    }
}

async fn check(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<MessageResponse>(&text)
        .map(|m| m.message)
        .unwrap_or(text);
    Err(ClientError::Status { status, message })
}

async fn json<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    Ok(check(resp).await?.json().await?)
}
