//! Per-item presentation
//!
//! Everything here is derived from a `Todo` and the current time on each
//! render. Nothing is cached on the todo itself.

use chrono::{DateTime, NaiveDate, Utc};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::ListItem,
};
use std::fmt;

use crate::task::{Todo, TodoPatch, TodoStatus};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub icon: &'static str,
    pub label: &'static str,
    pub color: Color,
}

pub fn status_badge(status: TodoStatus) -> StatusBadge {
    match status {
        TodoStatus::Pending => StatusBadge {
            icon: "◷",
            label: status.as_str(),
            color: Color::Yellow,
        },
        TodoStatus::InProgress => StatusBadge {
            icon: "▶",
            label: status.as_str(),
            color: Color::Blue,
        },
        TodoStatus::Completed => StatusBadge {
            icon: "✓",
            label: status.as_str(),
            color: Color::Green,
        },
    }
}

/// Whole days from `now` until `due`, rounded up.
///
/// A due time 12 hours ahead counts as one day away and one 12 hours behind
/// counts as zero, so a due date later today still reads "Today".
pub fn day_difference(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (due - now).num_milliseconds();
    -(-millis).div_euclid(MILLIS_PER_DAY)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueLabel {
    Today,
    Tomorrow,
    Yesterday,
    InDays(i64),
    DaysAgo(i64),
    Absolute(NaiveDate),
}

impl fmt::Display for DueLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DueLabel::Today => f.write_str("Today"),
            DueLabel::Tomorrow => f.write_str("Tomorrow"),
            DueLabel::Yesterday => f.write_str("Yesterday"),
            DueLabel::InDays(n) => write!(f, "In {} days", n),
            DueLabel::DaysAgo(n) => write!(f, "{} days ago", n),
            DueLabel::Absolute(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

pub fn relative_due_label(due: DateTime<Utc>, now: DateTime<Utc>) -> DueLabel {
    match day_difference(due, now) {
        0 => DueLabel::Today,
        1 => DueLabel::Tomorrow,
        -1 => DueLabel::Yesterday,
        d if d > 1 => DueLabel::InDays(d),
        d if d < -1 => DueLabel::DaysAgo(d.abs()),
        _ => DueLabel::Absolute(due.date_naive()),
    }
}

/// Past due and not completed. Purely informational.
pub fn is_overdue(todo: &Todo, now: DateTime<Utc>) -> bool {
    todo.status != TodoStatus::Completed && todo.due_date.is_some_and(|due| due < now)
}

/// Status changes offered inline for an item in `status`.
pub fn available_transitions(status: TodoStatus) -> &'static [TodoStatus] {
    match status {
        TodoStatus::Completed => &[],
        TodoStatus::Pending => &[TodoStatus::Completed, TodoStatus::InProgress],
        TodoStatus::InProgress => &[TodoStatus::Completed, TodoStatus::Pending],
    }
}

/// Hint shown next to the key that moves an item to `target`.
pub fn transition_hint(target: TodoStatus) -> &'static str {
    match target {
        TodoStatus::Completed => "Mark as completed",
        TodoStatus::InProgress => "Start working on this",
        TodoStatus::Pending => "Mark as pending",
    }
}

/// Receiver of the intents an item can raise.
pub trait ItemActions {
    fn request_field_update(&mut self, id: &str, patch: TodoPatch);
    fn request_edit_mode(&mut self, id: &str);
    fn request_delete(&mut self, id: &str);
}

/// A todo as shown in the list for one render pass.
#[derive(Debug, Clone, Copy)]
pub struct TodoItem<'a> {
    todo: &'a Todo,
    now: DateTime<Utc>,
}

impl<'a> TodoItem<'a> {
    pub fn new(todo: &'a Todo, now: DateTime<Utc>) -> Self {
        Self { todo, now }
    }

    pub fn badge(&self) -> StatusBadge {
        status_badge(self.todo.status)
    }

    pub fn due_label(&self) -> Option<DueLabel> {
        self.todo
            .due_date
            .map(|due| relative_due_label(due, self.now))
    }

    pub fn is_overdue(&self) -> bool {
        is_overdue(self.todo, self.now)
    }

    pub fn transitions(&self) -> &'static [TodoStatus] {
        available_transitions(self.todo.status)
    }

    /// Ask for a status change. Returns false when `target` is not offered
    /// for the current status.
    pub fn change_status(&self, target: TodoStatus, actions: &mut impl ItemActions) -> bool {
        if !self.transitions().contains(&target) {
            return false;
        }
        actions.request_field_update(&self.todo.id, TodoPatch::status(target));
        true
    }

    pub fn edit(&self, actions: &mut impl ItemActions) {
        actions.request_edit_mode(&self.todo.id);
    }

    /// First step of a delete. Nothing is requested until the returned
    /// confirmation is confirmed.
    pub fn begin_delete(&self) -> DeleteConfirmation {
        DeleteConfirmation {
            id: self.todo.id.clone(),
            title: self.todo.title.clone(),
        }
    }

    pub fn to_list_item(&self) -> ListItem<'a> {
        let badge = self.badge();
        let completed = self.todo.status == TodoStatus::Completed;

        let mut title_style = Style::default().fg(Color::White);
        if completed {
            title_style = title_style
                .add_modifier(Modifier::CROSSED_OUT)
                .add_modifier(Modifier::DIM);
        }

        let mut spans = vec![
            Span::styled(
                format!("{} {:<11} ", badge.icon, badge.label),
                Style::default().fg(badge.color),
            ),
            Span::styled(self.todo.title.as_str(), title_style),
        ];

        if let Some(category) = self.todo.category_label() {
            spans.push(Span::styled(
                format!("  #{}", category),
                Style::default().fg(Color::Magenta),
            ));
        }

        if let Some(label) = self.due_label() {
            let overdue = self.is_overdue();
            let style = if overdue {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(format!("  (Due: {})", label), style));
            if overdue {
                spans.push(Span::styled(
                    " (Overdue)",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ));
            }
        }

        let mut lines = vec![Line::from(spans)];
        if let Some(description) = self.todo.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(Line::from(Span::styled(
                format!("    {}", description),
                Style::default().fg(Color::Gray),
            )));
        }
        ListItem::new(lines)
    }
}

/// A delete waiting for the user to say yes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    id: String,
    title: String,
}

impl DeleteConfirmation {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn prompt(&self) -> String {
        format!("Delete \"{}\"? Are you sure? (y/n)", self.title)
    }

    pub fn confirm(self, actions: &mut impl ItemActions) {
        actions.request_delete(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn todo(status: TodoStatus, due: Option<DateTime<Utc>>) -> Todo {
        Todo {
            id: "t1".into(),
            title: "Water plants".into(),
            description: None,
            status,
            category: Some("Home".into()),
            due_date: due,
            created_at: at(2024, 1, 1),
        }
    }

    #[derive(Default)]
    struct Recorder {
        updates: Vec<(String, TodoPatch)>,
        edits: Vec<String>,
        deletes: Vec<String>,
    }

    impl ItemActions for Recorder {
        fn request_field_update(&mut self, id: &str, patch: TodoPatch) {
            self.updates.push((id.to_string(), patch));
        }
        fn request_edit_mode(&mut self, id: &str) {
            self.edits.push(id.to_string());
        }
        fn request_delete(&mut self, id: &str) {
            self.deletes.push(id.to_string());
        }
    }

    #[test]
    fn relative_labels_around_now() {
        let now = at(2024, 1, 10);
        assert_eq!(relative_due_label(at(2024, 1, 10), now).to_string(), "Today");
        assert_eq!(relative_due_label(at(2024, 1, 11), now).to_string(), "Tomorrow");
        assert_eq!(relative_due_label(at(2024, 1, 9), now).to_string(), "Yesterday");
        assert_eq!(relative_due_label(at(2024, 1, 15), now).to_string(), "In 5 days");
        assert_eq!(relative_due_label(at(2024, 1, 5), now).to_string(), "5 days ago");
    }

    #[test]
    fn partial_days_round_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
        // Midnight earlier today is half a day behind: still today.
        assert_eq!(day_difference(at(2024, 1, 10), now), 0);
        // Midnight tonight is half a day ahead.
        assert_eq!(day_difference(at(2024, 1, 11), now), 1);
        assert_eq!(day_difference(at(2024, 1, 9), now), -1);
    }

    #[test]
    fn overdue_requires_past_due_and_open_status() {
        let now = at(2024, 1, 10);
        assert!(is_overdue(&todo(TodoStatus::Pending, Some(at(2024, 1, 9))), now));
        assert!(is_overdue(&todo(TodoStatus::InProgress, Some(at(2024, 1, 9))), now));
        assert!(!is_overdue(&todo(TodoStatus::Completed, Some(at(2024, 1, 9))), now));
        assert!(!is_overdue(&todo(TodoStatus::Pending, Some(at(2024, 1, 11))), now));
        assert!(!is_overdue(&todo(TodoStatus::Pending, None), now));
    }

    #[test]
    fn transitions_depend_on_status() {
        assert!(available_transitions(TodoStatus::Completed).is_empty());
        assert_eq!(
            available_transitions(TodoStatus::Pending),
            &[TodoStatus::Completed, TodoStatus::InProgress]
        );
        assert_eq!(
            available_transitions(TodoStatus::InProgress),
            &[TodoStatus::Completed, TodoStatus::Pending]
        );
    }

    #[test]
    fn badges_are_fixed_per_status() {
        assert_eq!(status_badge(TodoStatus::Completed).color, Color::Green);
        assert_eq!(status_badge(TodoStatus::InProgress).color, Color::Blue);
        assert_eq!(status_badge(TodoStatus::Pending).label, "Pending");
    }

    #[test]
    fn change_status_forwards_only_offered_transitions() {
        let t = todo(TodoStatus::Pending, None);
        let item = TodoItem::new(&t, at(2024, 1, 10));
        let mut rec = Recorder::default();

        assert!(item.change_status(TodoStatus::InProgress, &mut rec));
        assert!(!item.change_status(TodoStatus::Pending, &mut rec));
        assert_eq!(rec.updates.len(), 1);
        assert_eq!(rec.updates[0].0, "t1");
        assert_eq!(rec.updates[0].1, TodoPatch::status(TodoStatus::InProgress));
    }

    #[test]
    fn completed_items_offer_no_status_change() {
        let t = todo(TodoStatus::Completed, None);
        let item = TodoItem::new(&t, at(2024, 1, 10));
        let mut rec = Recorder::default();
        assert!(!item.change_status(TodoStatus::Pending, &mut rec));
        assert!(rec.updates.is_empty());
    }

    #[test]
    fn edit_and_delete_go_through_separate_intents() {
        let t = todo(TodoStatus::Completed, None);
        let item = TodoItem::new(&t, at(2024, 1, 10));
        let mut rec = Recorder::default();

        item.edit(&mut rec);
        let confirmation = item.begin_delete();
        assert!(rec.deletes.is_empty());
        assert!(confirmation.prompt().contains("Water plants"));
        confirmation.confirm(&mut rec);

        assert_eq!(rec.edits, vec!["t1".to_string()]);
        assert_eq!(rec.deletes, vec!["t1".to_string()]);
        assert!(rec.updates.is_empty());
    }

    #[test]
    fn item_without_due_date_has_no_label() {
        let t = todo(TodoStatus::Pending, None);
        let item = TodoItem::new(&t, at(2024, 1, 10));
        assert_eq!(item.due_label(), None);
        assert!(!item.is_overdue());
    }
}
