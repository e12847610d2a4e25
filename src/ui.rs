use crate::board::{LoadState, TodoBoard};
use crate::form::{FormField, TodoForm};
use crate::notifier::ToastQueue;
use crate::presenter::{status_badge, transition_hint, TodoItem};
use crate::task::TodoStatus;
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
}

pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    board: &mut TodoBoard,
    toasts: &ToastQueue,
    tick: Duration,
) -> io::Result<()> {
    let mut mode = InputMode::Normal;
    board.refresh();
    loop {
        board.drain();
        terminal.draw(|f| draw(f, board, toasts, mode))?;

        if !event::poll(tick)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if handle_key(board, toasts, &mut mode, key) {
                return Ok(());
            }
        }
    }
}

/// Returns true when the user asked to quit.
fn handle_key(
    board: &mut TodoBoard,
    toasts: &ToastQueue,
    mode: &mut InputMode,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if board.form().is_some() {
        match key.code {
            KeyCode::Esc => board.cancel_form(),
            KeyCode::Enter => board.submit_form(),
            _ => {
                if let Some(form) = board.form_mut() {
                    edit_form(form, key.code);
                }
            }
        }
        return false;
    }

    if board.pending_delete().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => board.confirm_delete(),
            _ => board.cancel_delete(),
        }
        return false;
    }

    if *mode == InputMode::Search {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => *mode = InputMode::Normal,
            KeyCode::Backspace => board.pop_search_char(),
            KeyCode::Char(c) => board.push_search_char(c),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true, // Quit
        KeyCode::Esc => toasts.dismiss_all(),
        KeyCode::Up | KeyCode::Char('k') => board.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => board.select_next(),
        KeyCode::Char('a') => board.open_create_form(),
        KeyCode::Char('e') => board.edit_selected(),
        KeyCode::Char('d') => board.begin_delete_selected(),
        KeyCode::Char('c') => {
            board.change_selected_status(TodoStatus::Completed);
        }
        KeyCode::Char('s') => {
            board.change_selected_status(TodoStatus::InProgress);
        }
        KeyCode::Char('p') => {
            board.change_selected_status(TodoStatus::Pending);
        }
        KeyCode::Char('/') => *mode = InputMode::Search,
        KeyCode::Char('f') => board.cycle_status_filter(),
        KeyCode::Char('g') => board.cycle_category_filter(),
        KeyCode::Char('o') => board.cycle_sort(),
        KeyCode::Char('x') => board.clear_filters(),
        KeyCode::Char('r') => board.refresh(),
        _ => {}
    }
    false
}

fn edit_form(form: &mut TodoForm, code: KeyCode) {
    match code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Left => form.cycle_status(false),
        KeyCode::Right => form.cycle_status(true),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) => form.insert_char(c),
        _ => {}
    }
}

fn draw(f: &mut Frame, board: &TodoBoard, toasts: &ToastQueue, mode: InputMode) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(5),
        ])
        .split(f.area());

    draw_stats(f, board, chunks[0]);
    draw_filters(f, board, mode, chunks[1]);
    draw_list(f, board, chunks[2]);
    draw_footer(f, board, toasts, chunks[3]);

    if let Some(form) = board.form() {
        draw_form(f, form);
    }
}

fn draw_stats(f: &mut Frame, board: &TodoBoard, area: Rect) {
    let stats = board.stats();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(25); 4])
        .split(area);

    let mut cells = vec![("Total", stats.total, Color::Cyan)];
    cells.extend(
        TodoStatus::ALL
            .iter()
            .map(|s| (s.as_str(), stats.count(*s), status_badge(*s).color)),
    );

    for (i, (label, count, color)) in cells.into_iter().enumerate() {
        let paragraph = Paragraph::new(Line::from(Span::styled(
            count.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().title(label).borders(Borders::ALL));
        f.render_widget(paragraph, chunks[i]);
    }
}

fn draw_filters(f: &mut Frame, board: &TodoBoard, mode: InputMode, area: Rect) {
    let criteria = board.criteria();
    let searching = mode == InputMode::Search;
    let key = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let search = if searching {
        format!("{}_", criteria.search)
    } else if criteria.search.is_empty() {
        "Search todos...".to_string()
    } else {
        criteria.search.clone()
    };

    let line = Line::from(vec![
        Span::styled("[/] ", key),
        Span::styled(search, value),
        Span::styled("   [f] Status: ", key),
        Span::styled(criteria.status.as_str(), value),
        Span::styled("   [g] Category: ", key),
        Span::styled(criteria.category.as_str().to_string(), value),
        Span::styled("   [o] Sort: ", key),
        Span::styled(criteria.sort_label(), value),
    ]);

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .title("Filters")
            .borders(Borders::ALL)
            .border_style(if searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            }),
    );
    f.render_widget(paragraph, area);
}

fn draw_list(f: &mut Frame, board: &TodoBoard, area: Rect) {
    let title = match board.load_state() {
        LoadState::Loading => "My Todos (loading...)",
        LoadState::Error => "My Todos (showing last loaded results)",
        LoadState::Idle | LoadState::Ready => "My Todos",
    };
    let block = Block::default().title(title).borders(Borders::ALL);

    if board.todos().is_empty() {
        let message = match board.load_state() {
            LoadState::Loading | LoadState::Idle => vec![Line::from("Loading...")],
            _ => {
                let hint = if board.criteria().is_narrowed() {
                    "Try adjusting your filters ([x] clears them)"
                } else {
                    "Get started by creating your first todo ([a])"
                };
                vec![
                    Line::from(Span::styled(
                        "No todos found",
                        Style::default().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(hint),
                ]
            }
        };
        f.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let now = Utc::now();
    let items: Vec<_> = board
        .todos()
        .iter()
        .map(|t| TodoItem::new(t, now).to_list_item())
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD).bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(board.selected_task));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_footer(f: &mut Frame, board: &TodoBoard, toasts: &ToastQueue, area: Rect) {
    let mut lines = Vec::new();

    if let Some(confirmation) = board.pending_delete() {
        lines.push(Line::from(Span::styled(
            confirmation.prompt(),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    } else {
        let mut actions = vec![Span::raw("[a] add  [e] edit  [d] delete")];
        if let Some(todo) = board.selected_todo() {
            for target in TodoItem::new(todo, Utc::now()).transitions() {
                let key = match target {
                    TodoStatus::Completed => 'c',
                    TodoStatus::InProgress => 's',
                    TodoStatus::Pending => 'p',
                };
                actions.push(Span::styled(
                    format!("  [{}] {}", key, transition_hint(*target)),
                    Style::default().fg(status_badge(*target).color),
                ));
            }
        }
        actions.push(Span::raw("  [r] reload  [q] quit"));
        lines.push(Line::from(actions));
    }

    for toast in toasts.visible() {
        lines.push(Line::from(Span::styled(
            format!("{} {}", toast.level.icon(), toast.message),
            Style::default().fg(toast.level.color()),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn draw_form(f: &mut Frame, form: &TodoForm) {
    let area = centered_rect(60, 60, f.area());
    f.render_widget(Clear, area);

    let mut lines = Vec::new();
    for field in FormField::ORDER {
        let focused = form.focus() == field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut value = form.value(field);
        if focused && field != FormField::Status {
            value.push('_');
        }
        lines.push(Line::from(Span::styled(field.label(), label_style)));
        lines.push(Line::from(Span::raw(format!("  {}", value))));
    }

    lines.push(Line::from(""));
    if let Some(err) = form.error() {
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "[Tab] next field  [←/→] status  [Enter] save  [Esc] cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .title(form.heading())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Leave raw mode and the alternate screen before a panic message is printed.
pub fn install_panic_hook() {
    chain_panic_hook(restore_terminal);
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

fn chain_panic_hook<F>(restore: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore();
        previous(info);
    }));
}
