use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::filter::{CategoryFilter, FilterCriteria, ALL};
use crate::form::{FormSubmission, TodoForm};
use crate::gateway::TodoGateway;
use crate::notifier::Notifier;
use crate::presenter::{DeleteConfirmation, ItemActions, TodoItem};
use crate::task::{StatsSummary, Todo, TodoDraft, TodoPatch, TodoStatus};

/// Progress of the most recent list fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// Completion of a gateway call, delivered back to the board.
#[derive(Debug)]
pub enum BoardEvent {
    Listed(Result<Vec<Todo>>),
    Stats(Result<StatsSummary>),
    Created(Result<Todo>),
    Updated { id: String, result: Result<Todo> },
    Deleted { id: String, result: Result<()> },
}

/// Owns the todo list and stats shown on screen and keeps them in step with
/// the server.
///
/// Gateway calls run as tokio tasks. Their results come back as
/// [`BoardEvent`]s and are applied in arrival order, so when list fetches
/// overlap the last one to finish wins.
pub struct TodoBoard {
    gateway: Arc<dyn TodoGateway>,
    notifier: Arc<dyn Notifier>,
    events_tx: UnboundedSender<BoardEvent>,
    events_rx: UnboundedReceiver<BoardEvent>,
    todos: Vec<Todo>,
    stats: StatsSummary,
    criteria: FilterCriteria,
    load_state: LoadState,
    form: Option<TodoForm>,
    pending_delete: Option<DeleteConfirmation>,
    pub selected_task: usize,
}

impl TodoBoard {
    pub fn new(gateway: Arc<dyn TodoGateway>, notifier: Arc<dyn Notifier>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            notifier,
            events_tx,
            events_rx,
            todos: Vec::new(),
            stats: StatsSummary::default(),
            criteria: FilterCriteria::default(),
            load_state: LoadState::Idle,
            form: None,
            pending_delete: None,
            selected_task: 0,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn stats(&self) -> StatsSummary {
        self.stats
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn form(&self) -> Option<&TodoForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut TodoForm> {
        self.form.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&DeleteConfirmation> {
        self.pending_delete.as_ref()
    }

    pub fn selected_todo(&self) -> Option<&Todo> {
        self.todos.get(self.selected_task)
    }

    pub fn select_next(&mut self) {
        if self.selected_task + 1 < self.todos.len() {
            self.selected_task += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_task = self.selected_task.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        self.selected_task = self.selected_task.min(self.todos.len().saturating_sub(1));
    }

    /// `"All"` followed by each distinct non-empty category in the current
    /// list, in the order first seen.
    pub fn category_options(&self) -> Vec<String> {
        let mut options = vec![ALL.to_string()];
        for category in self.todos.iter().filter_map(Todo::category_label) {
            if !options.iter().skip(1).any(|c| c == category) {
                options.push(category.to_string());
            }
        }
        options
    }

    fn spawn<F>(&self, call: F)
    where
        F: Future<Output = BoardEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            // The receiver lives as long as the board; a closed channel means
            // the board is gone and nobody wants the result.
            let _ = tx.send(call.await);
        });
    }

    /// Fetch the list for the current criteria, and the stats alongside it.
    pub fn refresh(&mut self) {
        self.load_state = LoadState::Loading;
        let gateway = Arc::clone(&self.gateway);
        let criteria = self.criteria.clone();
        debug!("Fetching todos ({})", criteria);
        self.spawn(async move { BoardEvent::Listed(gateway.list(&criteria).await) });
        self.refresh_stats();
    }

    pub fn refresh_stats(&self) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn(async move { BoardEvent::Stats(gateway.stats_summary().await) });
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refresh();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.criteria.search = search.into();
        self.refresh();
    }

    pub fn push_search_char(&mut self, c: char) {
        self.criteria.search.push(c);
        self.refresh();
    }

    pub fn pop_search_char(&mut self) {
        if self.criteria.search.pop().is_some() {
            self.refresh();
        }
    }

    pub fn cycle_status_filter(&mut self) {
        self.criteria.status = self.criteria.status.cycle();
        self.refresh();
    }

    pub fn cycle_category_filter(&mut self) {
        let options = self.category_options();
        let current = options
            .iter()
            .position(|o| o.as_str() == self.criteria.category.as_str())
            .unwrap_or(0);
        let next = &options[(current + 1) % options.len()];
        self.criteria.category = CategoryFilter::from_label(next);
        self.refresh();
    }

    pub fn cycle_sort(&mut self) {
        self.criteria.cycle_sort();
        self.refresh();
    }

    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria {
            sort_by: self.criteria.sort_by,
            sort_order: self.criteria.sort_order,
            ..FilterCriteria::default()
        };
        self.refresh();
    }

    pub fn create(&mut self, draft: TodoDraft) {
        let gateway = Arc::clone(&self.gateway);
        self.spawn(async move { BoardEvent::Created(gateway.create(&draft).await) });
    }

    pub fn update(&mut self, id: &str, patch: TodoPatch) {
        let gateway = Arc::clone(&self.gateway);
        let id = id.to_string();
        self.spawn(async move {
            let result = gateway.update(&id, &patch).await;
            BoardEvent::Updated { id, result }
        });
    }

    pub fn delete(&mut self, id: &str) {
        let gateway = Arc::clone(&self.gateway);
        let id = id.to_string();
        self.spawn(async move {
            let result = gateway.delete(&id).await;
            BoardEvent::Deleted { id, result }
        });
    }

    pub fn open_create_form(&mut self) {
        self.form = Some(TodoForm::create());
    }

    /// Validate the open form and issue the matching gateway call. The form
    /// stays open with its error when validation fails.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.submit() {
            Ok(FormSubmission::Create(draft)) => {
                self.form = None;
                self.create(draft);
            }
            Ok(FormSubmission::Update { id, patch }) => {
                self.form = None;
                self.update(&id, patch);
            }
            Err(e) => debug!("Form not submitted: {}", e),
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    /// Move the selected item to `target`, if that transition is offered.
    pub fn change_selected_status(&mut self, target: TodoStatus) -> bool {
        let Some(todo) = self.selected_todo().cloned() else {
            return false;
        };
        TodoItem::new(&todo, Utc::now()).change_status(target, self)
    }

    pub fn edit_selected(&mut self) {
        if let Some(todo) = self.selected_todo().cloned() {
            TodoItem::new(&todo, Utc::now()).edit(self);
        }
    }

    pub fn begin_delete_selected(&mut self) {
        self.pending_delete = self
            .selected_todo()
            .map(|todo| TodoItem::new(todo, Utc::now()).begin_delete());
    }

    pub fn confirm_delete(&mut self) {
        if let Some(confirmation) = self.pending_delete.take() {
            confirmation.confirm(self);
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Reconcile one completed gateway call with the owned state.
    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::Listed(Ok(todos)) => {
                info!("Loaded {} todos", todos.len());
                self.todos = todos;
                self.load_state = LoadState::Ready;
                self.clamp_selection();
            }
            BoardEvent::Listed(Err(e)) => {
                error!("Error fetching todos: {}", e);
                self.load_state = LoadState::Error;
                self.notifier.error("Failed to fetch todos");
            }
            BoardEvent::Stats(Ok(stats)) => {
                if !stats.is_consistent() {
                    warn!("Stats summary does not add up: {:?}", stats);
                }
                self.stats = stats;
            }
            BoardEvent::Stats(Err(e)) => {
                warn!("Error fetching stats: {}", e);
            }
            BoardEvent::Created(Ok(todo)) => {
                info!("Created todo {}", todo.id);
                self.todos.insert(0, todo);
                self.notifier.success("Todo created successfully");
                self.refresh_stats();
            }
            BoardEvent::Created(Err(e)) => {
                error!("Error creating todo: {}", e);
                self.notifier.error(&e.user_message("Failed to create todo"));
            }
            BoardEvent::Updated {
                id,
                result: Ok(todo),
            } => {
                info!("Updated todo {}", id);
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = todo;
                }
                self.notifier.success("Todo updated successfully");
                self.refresh_stats();
            }
            BoardEvent::Updated { id, result: Err(e) } => {
                error!("Error updating todo {}: {}", id, e);
                self.notifier.error(&e.user_message("Failed to update todo"));
            }
            BoardEvent::Deleted { id, result: Ok(()) } => {
                info!("Deleted todo {}", id);
                self.todos.retain(|t| t.id != id);
                self.clamp_selection();
                self.notifier.success("Todo deleted successfully");
                self.refresh_stats();
            }
            BoardEvent::Deleted { id, result: Err(e) } => {
                error!("Error deleting todo {}: {}", id, e);
                self.notifier.error(&e.user_message("Failed to delete todo"));
            }
        }
    }

    /// Apply every completion that has already arrived, without waiting.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
            applied += 1;
        }
        applied
    }

    /// Wait for the next completion and apply it.
    pub async fn pump(&mut self) {
        if let Some(event) = self.events_rx.recv().await {
            self.apply(event);
        }
    }
}

impl ItemActions for TodoBoard {
    fn request_field_update(&mut self, id: &str, patch: TodoPatch) {
        if patch.is_empty() {
            return;
        }
        self.update(id, patch);
    }

    fn request_edit_mode(&mut self, id: &str) {
        if let Some(todo) = self.todos.iter().find(|t| t.id == id) {
            self.form = Some(TodoForm::edit(todo));
        }
    }

    fn request_delete(&mut self, id: &str) {
        self.delete(id);
    }
}
