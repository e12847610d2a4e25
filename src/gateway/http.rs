//! reqwest-backed gateway for the todo REST API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::TodoGateway;
use crate::error::{Result, TodoError};
use crate::filter::FilterCriteria;
use crate::task::{StatsSummary, Todo, TodoDraft, TodoPatch};

/// Default timeout for API requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct ListResponse {
    todos: Vec<Todo>,
}

#[derive(Debug, Deserialize)]
struct TodoResponse {
    todo: Todo,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: StatsSummary,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Talks to `GET/POST /api/todos`, `PUT/DELETE /api/todos/{id}` and
/// `GET /api/todos/stats/summary` under a base URL.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// # Errors
    /// Returns `Gateway` if `base_url` is empty or the client cannot be built.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(TodoError::Gateway("API base URL is required".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TodoError::Gateway(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn todos_url(&self) -> String {
        format!("{}/api/todos", self.base_url)
    }

    /// The id is pushed as a single escaped path segment.
    fn todo_url(&self, id: &str) -> Result<Url> {
        let mut url = Url::parse(&self.todos_url())
            .map_err(|e| TodoError::Gateway(format!("Invalid API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TodoError::Gateway(format!("Invalid API base URL: {}", self.base_url)))?
            .push(id);
        Ok(url)
    }
}

/// Turn a non-success response into the matching error.
/// `subject` names what was asked for and ends up in `NotFound`.
async fn check(response: Response, subject: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty());

    warn!("API request for {} failed with {}: {}", subject, status, body);

    Err(match status {
        StatusCode::NOT_FOUND => TodoError::NotFound(subject.to_string()),
        s if s.is_client_error() => {
            TodoError::Validation(message.unwrap_or_else(|| format!("HTTP {}", s.as_u16())))
        }
        s => TodoError::Gateway(match message {
            Some(msg) => format!("HTTP {}: {}", s.as_u16(), msg),
            None => format!("HTTP {}", s.as_u16()),
        }),
    })
}

#[async_trait]
impl TodoGateway for HttpGateway {
    async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Todo>> {
        let url = self.todos_url();
        debug!("Listing todos ({})", criteria);

        let response = self
            .client
            .get(&url)
            .query(&criteria.query_pairs())
            .send()
            .await?;
        let body: ListResponse = check(response, "todo list").await?.json().await?;

        debug!("Fetched {} todos", body.todos.len());
        Ok(body.todos)
    }

    async fn create(&self, draft: &TodoDraft) -> Result<Todo> {
        if draft.title.trim().is_empty() {
            return Err(TodoError::Validation("Title is required".to_string()));
        }

        debug!("Creating todo: {}", draft.title);
        let response = self.client.post(self.todos_url()).json(draft).send().await?;
        let body: TodoResponse = check(response, "new todo").await?.json().await?;
        Ok(body.todo)
    }

    async fn update(&self, id: &str, patch: &TodoPatch) -> Result<Todo> {
        debug!("Updating todo {}", id);
        let response = self.client.put(self.todo_url(id)?).json(patch).send().await?;
        let body: TodoResponse = check(response, id).await?.json().await?;
        Ok(body.todo)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        debug!("Deleting todo {}", id);
        let response = self.client.delete(self.todo_url(id)?).send().await?;
        check(response, id).await?;
        Ok(())
    }

    async fn stats_summary(&self) -> Result<StatsSummary> {
        let url = format!("{}/stats/summary", self.todos_url());
        let response = self.client.get(&url).send().await?;
        let body: SummaryResponse = check(response, "stats summary").await?.json().await?;
        Ok(body.summary)
    }
}
