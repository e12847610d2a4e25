//! Boundary over the remote todo API

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::{HttpGateway, DEFAULT_TIMEOUT_SECS};

use async_trait::async_trait;

use crate::error::Result;
use crate::filter::FilterCriteria;
use crate::task::{StatsSummary, Todo, TodoDraft, TodoPatch};

/// Persistence operations the board relies on.
///
/// A failed call never yields partial results.
#[async_trait]
pub trait TodoGateway: Send + Sync {
    async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Todo>>;

    /// Persist a new todo. The server assigns `id` and `createdAt`.
    async fn create(&self, draft: &TodoDraft) -> Result<Todo>;

    async fn update(&self, id: &str, patch: &TodoPatch) -> Result<Todo>;

    /// Remove a todo permanently. Signals `NotFound` if it is already gone.
    async fn delete(&self, id: &str) -> Result<()>;

    async fn stats_summary(&self) -> Result<StatsSummary>;
}
