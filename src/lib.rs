//! Terminal client for a remote todo API.

pub mod board;
pub mod config;
pub mod error;
pub mod filter;
pub mod form;
pub mod gateway;
pub mod logging;
pub mod notifier;
pub mod presenter;
pub mod task;
pub mod ui;

pub use board::{BoardEvent, LoadState, TodoBoard};
pub use error::TodoError;
pub use gateway::{HttpGateway, TodoGateway};
pub use task::{StatsSummary, Todo, TodoDraft, TodoPatch, TodoStatus};
