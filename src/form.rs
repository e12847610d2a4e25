use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::task::{Todo, TodoDraft, TodoPatch, TodoStatus};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Status,
    Category,
    DueDate,
}

impl FormField {
    pub const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Status,
        FormField::Category,
        FormField::DueDate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title *",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::Category => "Category",
            FormField::DueDate => "Due date (YYYY-MM-DD)",
        }
    }

    fn index(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

/// What a valid form turns into. The board decides which gateway call to make.
#[derive(Debug, Clone, PartialEq)]
pub enum FormSubmission {
    Create(TodoDraft),
    Update { id: String, patch: TodoPatch },
}

/// Field values being edited for a new or an existing todo.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoForm {
    mode: FormMode,
    pub title: String,
    pub description: String,
    pub status: TodoStatus,
    pub category: String,
    pub due_date: String,
    focus: FormField,
    error: Option<FormError>,
}

impl TodoForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            status: TodoStatus::Pending,
            category: String::new(),
            due_date: String::new(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            mode: FormMode::Edit {
                id: todo.id.clone(),
            },
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            status: todo.status,
            category: todo.category.clone().unwrap_or_default(),
            due_date: todo
                .due_date
                .map(|d| d.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
            focus: FormField::Title,
            error: None,
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit { .. })
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Todo"
        } else {
            "Add Todo"
        }
    }

    pub fn focus(&self) -> FormField {
        self.focus
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn next_field(&mut self) {
        let i = (self.focus.index() + 1) % FormField::ORDER.len();
        self.focus = FormField::ORDER[i];
    }

    pub fn prev_field(&mut self) {
        let len = FormField::ORDER.len();
        let i = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ORDER[i];
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Category => Some(&mut self.category),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Status => None,
        }
    }

    pub fn insert_char(&mut self, c: char) {
        if let Some(text) = self.focused_text() {
            text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    /// Step the status field. Only meaningful while it has focus.
    pub fn cycle_status(&mut self, forward: bool) {
        if self.focus == FormField::Status {
            self.status = if forward {
                self.status.next()
            } else {
                self.status.prev()
            };
        }
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Description => self.description.clone(),
            FormField::Status => format!("< {} >", self.status),
            FormField::Category => self.category.clone(),
            FormField::DueDate => self.due_date.clone(),
        }
    }

    fn parse_due_date(&self) -> Result<Option<DateTime<Utc>>, FormError> {
        let raw = self.due_date.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Some(dt.and_utc()))
            .ok_or_else(|| FormError::InvalidDueDate(raw.to_string()))
    }

    /// Validate and build the submission. On failure the error is kept for
    /// display and the form stays open.
    pub fn submit(&mut self) -> Result<FormSubmission, FormError> {
        let result = self.build();
        self.error = result.as_ref().err().cloned();
        result
    }

    fn build(&self) -> Result<FormSubmission, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::TitleRequired);
        }
        let due_date = self.parse_due_date()?;
        let description = non_empty(&self.description);
        let category = non_empty(&self.category);

        Ok(match &self.mode {
            FormMode::Create => FormSubmission::Create(TodoDraft {
                title: title.to_string(),
                description,
                status: (self.status != TodoStatus::Pending).then_some(self.status),
                category,
                due_date,
            }),
            FormMode::Edit { id } => FormSubmission::Update {
                id: id.clone(),
                patch: TodoPatch {
                    title: Some(title.to_string()),
                    description: Some(description),
                    status: Some(self.status),
                    category: Some(category),
                    due_date: Some(due_date),
                },
            },
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn existing() -> Todo {
        Todo {
            id: "abc".into(),
            title: "Write report".into(),
            description: Some("Q1 numbers".into()),
            status: TodoStatus::InProgress,
            category: Some("Work".into()),
            due_date: Some(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn type_str(form: &mut TodoForm, s: &str) {
        s.chars().for_each(|c| form.insert_char(c));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut form = TodoForm::create();
        type_str(&mut form, "   ");
        assert_eq!(form.submit(), Err(FormError::TitleRequired));
        assert_eq!(form.error(), Some(&FormError::TitleRequired));
    }

    #[test]
    fn minimal_create_only_sends_title() {
        let mut form = TodoForm::create();
        type_str(&mut form, "Buy milk");
        assert_eq!(
            form.submit(),
            Ok(FormSubmission::Create(TodoDraft::new("Buy milk")))
        );
        assert!(form.error().is_none());
    }

    #[test]
    fn create_collects_optional_fields() {
        let mut form = TodoForm::create();
        type_str(&mut form, "Buy milk");
        form.next_field();
        type_str(&mut form, "semi-skimmed");
        form.next_field();
        form.cycle_status(true);
        form.next_field();
        type_str(&mut form, "Errands");
        form.next_field();
        type_str(&mut form, "2024-01-11");

        let Ok(FormSubmission::Create(draft)) = form.submit() else {
            panic!("expected a create submission");
        };
        assert_eq!(draft.description.as_deref(), Some("semi-skimmed"));
        assert_eq!(draft.status, Some(TodoStatus::InProgress));
        assert_eq!(draft.category.as_deref(), Some("Errands"));
        assert_eq!(
            draft.due_date,
            Some(Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn bad_due_date_is_reported() {
        let mut form = TodoForm::create();
        form.title = "Buy milk".into();
        form.due_date = "next tuesday".into();
        assert_eq!(
            form.submit(),
            Err(FormError::InvalidDueDate("next tuesday".into()))
        );
    }

    #[test]
    fn edit_is_prefilled_from_todo() {
        let form = TodoForm::edit(&existing());
        assert!(form.is_editing());
        assert_eq!(form.heading(), "Edit Todo");
        assert_eq!(form.title, "Write report");
        assert_eq!(form.category, "Work");
        assert_eq!(form.due_date, "2024-02-01");
        assert_eq!(form.status, TodoStatus::InProgress);
    }

    #[test]
    fn edit_submission_clears_removed_fields() {
        let mut form = TodoForm::edit(&existing());
        form.description.clear();
        form.due_date.clear();

        let Ok(FormSubmission::Update { id, patch }) = form.submit() else {
            panic!("expected an update submission");
        };
        assert_eq!(id, "abc");
        assert_eq!(patch.description, Some(None));
        assert_eq!(patch.due_date, Some(None));
        assert_eq!(patch.category, Some(Some("Work".to_string())));
        assert_eq!(patch.status, Some(TodoStatus::InProgress));
    }

    #[test]
    fn status_field_ignores_typing_and_wraps() {
        let mut form = TodoForm::create();
        form.prev_field();
        form.prev_field();
        form.prev_field();
        assert_eq!(form.focus(), FormField::Status);
        form.insert_char('x');
        form.cycle_status(false);
        assert_eq!(form.status, TodoStatus::Completed);
        assert_eq!(form.title, "");
    }

    #[test]
    fn backspace_edits_focused_field() {
        let mut form = TodoForm::edit(&existing());
        form.backspace();
        assert_eq!(form.title, "Write repor");
    }
}
