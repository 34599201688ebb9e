use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use team_core::{ApprovalField, ApprovalStatus, NewTeam, Team, TeamPatch};

use crate::error::{ClientError, ClientResult};

/// Body returned by every mutating endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleted {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub deleted_count: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A response carrying a `success` flag. A 2xx whose flag is false still
/// counts as a failed call.
pub trait Acknowledged: Sized {
    fn succeeded(&self) -> bool;
    fn reason(&self) -> Option<&str>;

    fn confirm(self) -> ClientResult<Self> {
        if self.succeeded() {
            Ok(self)
        } else {
            let reason = self.reason().unwrap_or("request was not successful").to_string();
            Err(ClientError::Rejected(reason))
        }
    }
}

impl Acknowledged for Ack {
    fn succeeded(&self) -> bool {
        self.success
    }
    fn reason(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Acknowledged for Created {
    fn succeeded(&self) -> bool {
        self.success
    }
    fn reason(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl Acknowledged for BulkDeleted {
    fn succeeded(&self) -> bool {
        self.success
    }
    fn reason(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// The team endpoints as the board sees them. Implementations map every
/// kind of failure (transport, non-2xx, `success: false`) to an `Err`.
#[async_trait]
pub trait TeamsApi: Send + Sync {
    async fn list(&self, search: Option<&str>) -> ClientResult<Vec<Team>>;
    async fn get(&self, id: &str) -> ClientResult<Team>;
    async fn create(&self, team: &NewTeam) -> ClientResult<Created>;
    async fn update(&self, id: &str, patch: &TeamPatch) -> ClientResult<Ack>;
    async fn delete(&self, id: &str) -> ClientResult<Ack>;
    async fn bulk_delete(&self, ids: &[String]) -> ClientResult<BulkDeleted>;
    async fn update_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> ClientResult<Ack>;
    async fn delete_member(&self, team_id: &str, member_id: &str) -> ClientResult<Ack>;
    async fn update_member(&self, team_id: &str, member_id: &str, name: &str) -> ClientResult<Ack>;
    async fn reorder(&self, teams: &[Team]) -> ClientResult<Ack>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// `TeamsApi` over HTTP, rooted at the service's base URL
/// (e.g. `http://localhost:3000`).
#[derive(Debug, Clone)]
pub struct HttpTeamsApi {
    client: Client,
    base_url: String,
}

impl HttpTeamsApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/teams{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error)
                .unwrap_or(fallback);
            tracing::debug!(status = status.as_u16(), %message, "Teams API call failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send<T: DeserializeOwned + Acknowledged>(&self, request: RequestBuilder) -> ClientResult<T> {
        self.fetch::<T>(request).await?.confirm()
    }
}

#[async_trait]
impl TeamsApi for HttpTeamsApi {
    async fn list(&self, search: Option<&str>) -> ClientResult<Vec<Team>> {
        let mut request = self.client.get(self.url(""));
        if let Some(search) = search {
            request = request.query(&[("search", search)]);
        }
        self.fetch(request).await
    }

    async fn get(&self, id: &str) -> ClientResult<Team> {
        self.fetch(self.client.get(self.url(&format!("/{id}")))).await
    }

    async fn create(&self, team: &NewTeam) -> ClientResult<Created> {
        self.send(self.client.post(self.url("")).json(team)).await
    }

    async fn update(&self, id: &str, patch: &TeamPatch) -> ClientResult<Ack> {
        self.send(self.client.put(self.url(&format!("/{id}"))).json(patch))
            .await
    }

    async fn delete(&self, id: &str) -> ClientResult<Ack> {
        self.send(self.client.delete(self.url(&format!("/{id}")))).await
    }

    async fn bulk_delete(&self, ids: &[String]) -> ClientResult<BulkDeleted> {
        self.send(
            self.client
                .post(self.url("/bulk-delete"))
                .json(&json!({ "ids": ids })),
        )
        .await
    }

    async fn update_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> ClientResult<Ack> {
        self.send(
            self.client
                .patch(self.url(&format!("/{id}/status")))
                .json(&json!({ "field": field, "status": status })),
        )
        .await
    }

    async fn delete_member(&self, team_id: &str, member_id: &str) -> ClientResult<Ack> {
        self.send(
            self.client
                .delete(self.url(&format!("/{team_id}/members/{member_id}"))),
        )
        .await
    }

    async fn update_member(&self, team_id: &str, member_id: &str, name: &str) -> ClientResult<Ack> {
        self.send(
            self.client
                .patch(self.url(&format!("/{team_id}/members/{member_id}")))
                .json(&json!({ "name": name })),
        )
        .await
    }

    async fn reorder(&self, teams: &[Team]) -> ClientResult<Ack> {
        self.send(
            self.client
                .post(self.url("/reorder"))
                .json(&json!({ "teams": teams })),
        )
        .await
    }
}
