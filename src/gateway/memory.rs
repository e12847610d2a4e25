//! In-memory gateway used by unit tests

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use super::TodoGateway;
use crate::error::{Result, TodoError};
use crate::filter::{CategoryFilter, FilterCriteria, StatusFilter};
use crate::task::{StatsSummary, Todo, TodoDraft, TodoPatch, TodoStatus};

#[derive(Debug, Default)]
pub(crate) struct MemoryGateway {
    todos: Mutex<Vec<Todo>>,
    next_id: AtomicU64,
    fail_list: Mutex<Option<TodoError>>,
    fail_stats: Mutex<Option<TodoError>>,
    fail_mutations: Mutex<Option<TodoError>>,
}

impl MemoryGateway {
    pub(crate) fn with_todos(todos: Vec<Todo>) -> Self {
        let gateway = Self::default();
        gateway.next_id.store(todos.len() as u64, Ordering::SeqCst);
        *gateway.todos.lock().unwrap() = todos;
        gateway
    }

    pub(crate) fn fail_list(&self, err: Option<TodoError>) {
        *self.fail_list.lock().unwrap() = err;
    }

    pub(crate) fn fail_stats(&self, err: Option<TodoError>) {
        *self.fail_stats.lock().unwrap() = err;
    }

    pub(crate) fn fail_mutations(&self, err: Option<TodoError>) {
        *self.fail_mutations.lock().unwrap() = err;
    }

    /// Drop a record behind the board's back, as another client would.
    pub(crate) fn remove_remotely(&self, id: &str) {
        self.todos.lock().unwrap().retain(|t| t.id != id);
    }

    fn mutation_guard(&self) -> Result<()> {
        match self.fail_mutations.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TodoGateway for MemoryGateway {
    async fn list(&self, criteria: &FilterCriteria) -> Result<Vec<Todo>> {
        if let Some(err) = self.fail_list.lock().unwrap().clone() {
            return Err(err);
        }
        let needle = criteria.search.to_lowercase();
        let todos = self.todos.lock().unwrap();
        Ok(todos
            .iter()
            .filter(|t| match criteria.status {
                StatusFilter::All => true,
                StatusFilter::Only(s) => t.status == s,
            })
            .filter(|t| match &criteria.category {
                CategoryFilter::All => true,
                CategoryFilter::Only(c) => t.category.as_deref() == Some(c.as_str()),
            })
            .filter(|t| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn create(&self, draft: &TodoDraft) -> Result<Todo> {
        self.mutation_guard()?;
        if draft.title.trim().is_empty() {
            return Err(TodoError::Validation("Title is required".into()));
        }
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let todo = Todo {
            id: format!("todo-{n}"),
            title: draft.title.clone(),
            description: draft.description.clone(),
            status: draft.status.unwrap_or(TodoStatus::Pending),
            category: draft.category.clone(),
            due_date: draft.due_date,
            created_at: Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
        };
        self.todos.lock().unwrap().insert(0, todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &str, patch: &TodoPatch) -> Result<Todo> {
        self.mutation_guard()?;
        let mut todos = self.todos.lock().unwrap();
        let todo = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TodoError::NotFound(id.to_string()))?;
        patch.apply_to(todo);
        Ok(todo.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.mutation_guard()?;
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        if todos.len() == before {
            return Err(TodoError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn stats_summary(&self) -> Result<StatsSummary> {
        if let Some(err) = self.fail_stats.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(StatsSummary::from_todos(&self.todos.lock().unwrap()))
    }
}
