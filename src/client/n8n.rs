//! n8n client module
//!
//! Provides `N8nClient`, a typed wrapper over the n8n public REST API
//! (`/api/v1/workflows`). Every call is a single awaited request/response;
//! there is no caching and no retry.

use super::ApiKey;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::workflow::{WorkflowDefinition, document};
use owo_colors::OwoColorize;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

const API_PREFIX: &[&str] = &["api", "v1"];

/// Page size requested when listing workflows.
pub const PAGE_SIZE: u32 = 100;

/// Server-side filters for [`N8nClient::list_workflows_with`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    /// Only active (`true`) or inactive (`false`) workflows
    pub active: Option<bool>,
    /// Exact workflow name
    pub name: Option<String>,
    /// Tag names; n8n returns workflows carrying all of them
    pub tags: Vec<String>,
    /// Page size, defaults to [`PAGE_SIZE`]
    pub limit: Option<u32>,
}

impl ListQuery {
    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    fn params(&self, cursor: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![("limit", self.limit.unwrap_or(PAGE_SIZE).to_string())];
        if let Some(active) = self.active {
            params.push(("active", active.to_string()));
        }
        if let Some(name) = &self.name {
            params.push(("name", name.clone()));
        }
        if !self.tags.is_empty() {
            params.push(("tags", self.tags.join(",")));
        }
        if let Some(cursor) = cursor {
            params.push(("cursor", cursor.to_string()));
        }
        params
    }
}

/// n8n client for making workflow API requests.
///
/// # Example
/// ```no_run
/// use n8n_workflow_manager::client::N8nClient;
/// use n8n_workflow_manager::config::ClientConfig;
///
/// # async fn example() -> n8n_workflow_manager::Result<()> {
/// let config = ClientConfig::from_env()?;
/// let client = N8nClient::try_new(&config)?;
///
/// for workflow in client.list_workflows().await? {
///     println!("{} active={}", workflow.name, workflow.active);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct N8nClient {
    client: Client,
    url: Url,
    tunnel_url: Option<Url>,
}

impl N8nClient {
    /// Create a new client from resolved configuration.
    ///
    /// # Errors
    /// Returns [`Error::Configuration`] if the API key is missing or unusable, or if
    /// the HTTP client cannot be built. No request is sent in either case.
    pub fn try_new(config: &ClientConfig) -> Result<Self> {
        let api_key = ApiKey::new(config.require_api_key()?)?;
        if config.base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "N8N_URL cannot be used as a base URL: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .default_headers(api_key.headers()?)
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        log::debug!("Using API key {} for {}", api_key, config.base_url);

        Ok(Self {
            client,
            url: config.base_url.clone(),
            tunnel_url: config.tunnel_url.clone(),
        })
    }

    /// Get the base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the public tunnel URL, if one is configured.
    pub fn tunnel_url(&self) -> Option<&Url> {
        self.tunnel_url.as_ref()
    }

    /// Link to a workflow in the n8n editor UI.
    pub fn editor_url(&self, id: &str) -> Result<Url> {
        self.url_with(&[], &["workflow", id])
    }

    /// Verify connectivity and the API key with a one-item listing.
    pub async fn test_connection(&self) -> Result<()> {
        let query = ListQuery {
            limit: Some(1),
            ..ListQuery::default()
        };
        self.list_page(&query, None).await.map(|_| ())
    }

    /// Fetch every workflow on the instance, following pagination.
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowDefinition>> {
        self.list_workflows_with(&ListQuery::default()).await
    }

    /// Fetch every workflow matching `query`, following pagination.
    pub async fn list_workflows_with(&self, query: &ListQuery) -> Result<Vec<WorkflowDefinition>> {
        let mut workflows = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let (page, next) = self.list_page(query, cursor.as_deref()).await?;
            workflows.extend(page);

            match next {
                Some(next) if cursor.as_deref() == Some(next.as_str()) => {
                    log::warn!("n8n returned the same page cursor twice, stopping pagination");
                    break;
                }
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        log::debug!("Listed {} workflow(s)", workflows.len());
        Ok(workflows)
    }

    /// Fetch a single workflow by id.
    pub async fn get_workflow(&self, id: &str) -> Result<WorkflowDefinition> {
        let url = self.endpoint(&["workflows", id])?;
        let response = self.send(self.request(Method::GET, url), Some(id)).await?;
        let workflow = document::parse(&read_json(response).await?)?;
        log::debug!("Fetched workflow: {}", workflow.label().cyan());
        Ok(workflow)
    }

    /// Find the first workflow whose name matches exactly.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<WorkflowDefinition>> {
        let workflows = self.list_workflows_with(&ListQuery::named(name)).await?;
        // The server-side name filter is not exact on every n8n release.
        Ok(workflows.into_iter().find(|w| w.name == name))
    }

    /// Create a new workflow. Any `id` on `workflow` is ignored.
    ///
    /// The definition is validated locally first; an invalid one fails with
    /// [`Error::InvalidTemplate`] without contacting the server.
    pub async fn create_workflow(&self, workflow: &WorkflowDefinition) -> Result<WorkflowDefinition> {
        workflow.validate()?;
        if let Some(id) = &workflow.id {
            log::debug!("Ignoring id '{}' on workflow being created", id);
        }

        let url = self.endpoint(&["workflows"])?;
        let body = document::to_request_body(workflow);
        let response = self
            .send(self.request(Method::POST, url).json(&body), None)
            .await?;
        let created = document::parse(&read_json(response).await?)?;

        let id = created.id.as_deref().unwrap_or_default();
        if id.is_empty() {
            return Err(Error::MalformedDocument(format!(
                "n8n did not assign an id to workflow '{}'",
                created.name
            )));
        }

        log::info!(
            "Created workflow: {} (id: {})",
            created.name.cyan(),
            id.cyan()
        );
        Ok(created)
    }

    /// Replace an existing workflow definition.
    pub async fn update_workflow(
        &self,
        id: &str,
        workflow: &WorkflowDefinition,
    ) -> Result<WorkflowDefinition> {
        workflow.validate()?;

        let url = self.endpoint(&["workflows", id])?;
        let body = document::to_request_body(workflow);
        let response = self
            .send(self.request(Method::PUT, url).json(&body), Some(id))
            .await?;
        let updated = document::parse(&read_json(response).await?)?;

        log::info!(
            "Updated workflow: {} (id: {})",
            updated.name.cyan(),
            id.cyan()
        );
        Ok(updated)
    }

    /// Delete a workflow. A missing id is reported as [`Error::NotFound`].
    pub async fn delete_workflow(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&["workflows", id])?;
        self.send(self.request(Method::DELETE, url), Some(id))
            .await?;
        log::info!("Deleted workflow: {}", id.cyan());
        Ok(())
    }

    /// Activate or deactivate a workflow via the dedicated endpoints.
    pub async fn set_active(&self, id: &str, active: bool) -> Result<WorkflowDefinition> {
        let action = if active { "activate" } else { "deactivate" };
        let url = self.endpoint(&["workflows", id, action])?;
        let response = self.send(self.request(Method::POST, url), Some(id)).await?;
        let workflow = document::parse(&read_json(response).await?)?;

        log::info!(
            "{} workflow: {}",
            if workflow.active { "Activated" } else { "Deactivated" },
            workflow.label().cyan()
        );
        Ok(workflow)
    }

    /// Fetch one page of workflows and the cursor of the next page.
    async fn list_page(
        &self,
        query: &ListQuery,
        cursor: Option<&str>,
    ) -> Result<(Vec<WorkflowDefinition>, Option<String>)> {
        let url = self.endpoint(&["workflows"])?;
        let request = self.request(Method::GET, url).query(&query.params(cursor));
        let response = self.send(request, None).await?;
        parse_page(read_json(response).await?)
    }

    /// Build an API URL: `{base}/api/v1/{segments...}`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        self.url_with(API_PREFIX, segments)
    }

    fn url_with(&self, prefix: &[&str], segments: &[&str]) -> Result<Url> {
        let mut url = self.url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::Configuration(format!("N8N_URL cannot be used as a base URL: {}", self.url))
            })?
            .pop_if_empty()
            .extend(prefix.iter().chain(segments));
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::debug!("{} {}", method.as_str().green(), url.path());
        self.client.request(method, url)
    }

    /// Send a request and map non-success statuses onto [`Error`].
    ///
    /// `id` names the workflow a 404 refers to; without one a 404 means the
    /// endpoint itself is missing and is reported as an unexpected response.
    async fn send(&self, request: RequestBuilder, id: Option<&str>) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body);
        log::debug!("{} {}", status.as_u16().to_string().red(), message);

        Err(match (status.as_u16(), id) {
            (401 | 403, _) => Error::Authentication {
                status: status.as_u16(),
                message,
            },
            (404, Some(id)) => Error::NotFound { id: id.to_string() },
            _ if status.is_server_error() => {
                Error::ServiceUnavailable(format!("{}: {}", status, message))
            }
            (code, _) => Error::UnexpectedResponse {
                status: code,
                body: message,
            },
        })
    }
}

impl std::fmt::Display for N8nClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.tunnel_url {
            Some(tunnel) => write!(f, "{} (tunnel: {})", self.url, tunnel),
            None => write!(f, "{}", self.url),
        }
    }
}

async fn read_json(response: Response) -> Result<Value> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| Error::MalformedDocument(format!("response is not valid JSON: {}", e)))
}

/// Accepts both the paginated `{"data": [...], "nextCursor": ...}` shape and a bare array.
fn parse_page(body: Value) -> Result<(Vec<WorkflowDefinition>, Option<String>)> {
    let (items, next) = match body {
        Value::Array(items) => (items, None),
        Value::Object(mut page) => {
            let items = match page.remove("data") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(Error::MalformedDocument(
                        "workflow list response has no 'data' array".to_string(),
                    ));
                }
            };
            let next = page
                .remove("nextCursor")
                .and_then(|c| c.as_str().map(str::to_string))
                .filter(|c| !c.is_empty());
            (items, next)
        }
        other => {
            return Err(Error::MalformedDocument(format!(
                "unexpected workflow list response: {}",
                other
            )));
        }
    };

    let workflows = items
        .iter()
        .map(document::parse)
        .collect::<Result<Vec<_>>>()?;
    Ok((workflows, next))
}

/// Pull the `message` out of an n8n error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
