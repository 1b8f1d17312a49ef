//! Main UI Application
//!
//! Key handling and rendering for the users and items screens and their
//! modals. All state that outlives a frame lives in [`Admin`]; the app only
//! tracks which overlay is open, its focused field and the list cursors.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::admin::{Admin, Command, EditSession, ItemEditSession, View};
use crate::model::{Item, User};
use crate::roster::SortDirection;
use crate::ui::input::{cycle_item, edit_field, item_label, step_cursor, FieldKind};
use crate::ui::widgets::{progress_span, rank_badge, ProgressBar};

const BORDER: Color = Color::Rgb(100, 100, 120);

/// Fields before the catalogue rows in the create-user modal
const CREATE_FIELDS: usize = 4;
/// Fields before the progress rows in the edit modal
const EDIT_FIELDS: usize = 5;
/// Fields before the progress rows in the bulk panel
const BULK_FIELDS: usize = 4;
const ITEM_FIELDS: usize = 3;
/// Held items shown per row in the user table
const ITEMS_PER_ROW: usize = 3;

/// Truncate a string to fit within max_len characters, adding "…" if truncated
fn truncate_name(name: &str, max_len: usize) -> String {
    if name.chars().count() <= max_len {
        name.to_string()
    } else if max_len <= 1 {
        "…".to_string()
    } else {
        let truncated: String = name.chars().take(max_len - 1).collect();
        format!("{}…", truncated)
    }
}

/// Open modal or input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Overlay {
    #[default]
    None,
    Search,
    CreateUser { focus: usize },
    EditUser { focus: usize },
    ConfirmDelete,
    Bulk { focus: usize },
    CreateItem { focus: usize },
    EditItem { focus: usize },
    Help,
}

/// Main UI application
#[derive(Debug, Default)]
pub struct App {
    overlay: Overlay,
    /// Row under the cursor in the visible user list
    user_cursor: usize,
    item_cursor: usize,
}

/// Tab/arrow focus movement inside a form of `count` fields
fn move_focus(focus: usize, code: KeyCode, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    match code {
        KeyCode::Tab | KeyCode::Down => Some((focus + 1) % count),
        KeyCode::BackTab | KeyCode::Up => Some((focus + count - 1) % count),
        _ => None,
    }
}

/// Direction for a selector key, if it is one
fn selector_step(code: KeyCode) -> Option<bool> {
    match code {
        KeyCode::Right | KeyCode::Char(' ') | KeyCode::Char('+') => Some(true),
        KeyCode::Left | KeyCode::Char('-') => Some(false),
        _ => None,
    }
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press. Returns true when the app should quit.
    pub fn handle_input(&mut self, key: KeyEvent, admin: &mut Admin) -> Result<bool> {
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        // Queued work runs on the next update
        if admin.has_pending() {
            return Ok(false);
        }

        match self.overlay {
            Overlay::None => return Ok(self.handle_browse(key, admin)),
            Overlay::Search => self.handle_search(key, admin),
            Overlay::CreateUser { focus } => self.handle_create_user(key, admin, focus),
            Overlay::EditUser { focus } => self.handle_edit_user(key, admin, focus),
            Overlay::ConfirmDelete => self.handle_confirm_delete(key, admin),
            Overlay::Bulk { focus } => self.handle_bulk(key, admin, focus),
            Overlay::CreateItem { focus } => self.handle_item_form(key, admin, focus, false),
            Overlay::EditItem { focus } => self.handle_item_form(key, admin, focus, true),
            Overlay::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')) {
                    self.overlay = Overlay::None;
                }
            }
        }
        Ok(false)
    }

    /// Close overlays whose session ended and keep cursors in range.
    /// Call after every [`Admin::update`].
    pub fn sync(&mut self, admin: &Admin) {
        match self.overlay {
            Overlay::EditUser { focus } => match admin.edit_session() {
                EditSession::Idle => self.overlay = Overlay::None,
                EditSession::Editing { draft, .. } => {
                    let count = EDIT_FIELDS + draft.progress.len() + 2;
                    self.overlay = Overlay::EditUser { focus: focus.min(count - 1) };
                }
            },
            Overlay::EditItem { .. } => {
                if *admin.item_edit_session() == ItemEditSession::Idle {
                    self.overlay = Overlay::None;
                }
            }
            Overlay::ConfirmDelete => {
                if admin.pending_delete().is_none() {
                    self.overlay = Overlay::None;
                }
            }
            Overlay::Bulk { focus } => {
                let count = BULK_FIELDS + admin.bulk.rows.len() * 2;
                self.overlay = Overlay::Bulk { focus: focus.min(count - 1) };
            }
            Overlay::CreateUser { focus } => {
                let count = CREATE_FIELDS + admin.items().len();
                self.overlay = Overlay::CreateUser { focus: focus.min(count - 1) };
            }
            _ => {}
        }

        let users = admin.visible_users().len();
        self.user_cursor = self.user_cursor.min(users.saturating_sub(1));
        self.item_cursor = self.item_cursor.min(admin.items().len().saturating_sub(1));
    }

    fn cursor_user_id(&self, admin: &Admin) -> Option<String> {
        admin.visible_users().get(self.user_cursor).map(|u| u.id.clone())
    }

    fn cursor_item_id(&self, admin: &Admin) -> Option<String> {
        admin.items().get(self.item_cursor).map(|i| i.id.clone())
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    fn handle_browse(&mut self, key: KeyEvent, admin: &mut Admin) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => admin.set_view(match admin.view() {
                View::Users => View::Items,
                View::Items => View::Users,
            }),
            KeyCode::Char('1') => admin.set_view(View::Users),
            KeyCode::Char('2') => admin.set_view(View::Items),
            KeyCode::Char('r') | KeyCode::F(5) => admin.queue(Command::RefreshAll),
            KeyCode::Char('x') => admin.dismiss_error(),
            KeyCode::Char('?') => self.overlay = Overlay::Help,
            _ => match admin.view() {
                View::Users => self.handle_users_key(key, admin),
                View::Items => self.handle_items_key(key, admin),
            },
        }
        false
    }

    fn handle_users_key(&mut self, key: KeyEvent, admin: &mut Admin) {
        let len = admin.visible_users().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.user_cursor = step_cursor(self.user_cursor, -1, len),
            KeyCode::Down | KeyCode::Char('j') => self.user_cursor = step_cursor(self.user_cursor, 1, len),
            KeyCode::PageUp => self.user_cursor = step_cursor(self.user_cursor, -10, len),
            KeyCode::PageDown => self.user_cursor = step_cursor(self.user_cursor, 10, len),
            KeyCode::Home => self.user_cursor = 0,
            KeyCode::End => self.user_cursor = len.saturating_sub(1),
            KeyCode::Char(' ') => {
                if let Some(id) = self.cursor_user_id(admin) {
                    admin.selection.toggle(&id);
                }
            }
            KeyCode::Char('a') => admin.toggle_select_all_visible(),
            KeyCode::Char('c') => admin.selection.clear(),
            KeyCode::Char('/') => self.overlay = Overlay::Search,
            KeyCode::Char('s') => admin.query.key = admin.query.key.toggle(),
            KeyCode::Char('o') => admin.query.direction = admin.query.direction.toggle(),
            KeyCode::Char('n') => self.overlay = Overlay::CreateUser { focus: 0 },
            KeyCode::Char('b') => self.overlay = Overlay::Bulk { focus: 0 },
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.cursor_user_id(admin) {
                    admin.begin_edit(&id);
                    if matches!(admin.edit_session(), EditSession::Editing { .. }) {
                        self.overlay = Overlay::EditUser { focus: 0 };
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.cursor_user_id(admin) {
                    admin.request_delete(&id);
                    if admin.pending_delete().is_some() {
                        self.overlay = Overlay::ConfirmDelete;
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_items_key(&mut self, key: KeyEvent, admin: &mut Admin) {
        let len = admin.items().len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.item_cursor = step_cursor(self.item_cursor, -1, len),
            KeyCode::Down | KeyCode::Char('j') => self.item_cursor = step_cursor(self.item_cursor, 1, len),
            KeyCode::Char('n') => self.overlay = Overlay::CreateItem { focus: 0 },
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(id) = self.cursor_item_id(admin) {
                    admin.begin_item_edit(&id);
                    self.overlay = Overlay::EditItem { focus: 0 };
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.cursor_item_id(admin) {
                    admin.queue(Command::DeleteItem(id));
                }
            }
            _ => {}
        }
    }

    fn handle_search(&mut self, key: KeyEvent, admin: &mut Admin) {
        match key.code {
            KeyCode::Enter => self.overlay = Overlay::None,
            KeyCode::Esc => {
                admin.query.text.clear();
                self.overlay = Overlay::None;
            }
            _ => {
                if edit_field(&mut admin.query.text, key, FieldKind::Text) {
                    self.user_cursor = 0;
                }
            }
        }
    }

    fn handle_create_user(&mut self, key: KeyEvent, admin: &mut Admin, focus: usize) {
        let count = CREATE_FIELDS + admin.items().len();
        if let Some(next) = move_focus(focus, key.code, count) {
            self.overlay = Overlay::CreateUser { focus: next };
            return;
        }

        match key.code {
            KeyCode::Esc => self.overlay = Overlay::None,
            KeyCode::Enter => {
                if admin.create_form.to_payload().is_some() {
                    admin.queue(Command::CreateUser);
                    self.overlay = Overlay::None;
                }
            }
            _ if focus >= CREATE_FIELDS => {
                let Some(item) = admin.items().get(focus - CREATE_FIELDS).cloned() else {
                    return;
                };
                let picks = &mut admin.create_form.items;
                match key.code {
                    KeyCode::Char(' ') => picks.toggle(&item),
                    KeyCode::Right | KeyCode::Char('+') => {
                        if let Some(p) = picks.progress(&item.id) {
                            picks.set_progress(&item.id, p as f64 + 1.0);
                        }
                    }
                    KeyCode::Left | KeyCode::Char('-') => {
                        if let Some(p) = picks.progress(&item.id) {
                            picks.set_progress(&item.id, p.saturating_sub(1) as f64);
                        }
                    }
                    KeyCode::Backspace => {
                        if let Some(p) = picks.progress(&item.id) {
                            picks.set_progress(&item.id, (p / 10) as f64);
                        }
                    }
                    KeyCode::Char(c) => {
                        if let (Some(p), Some(digit)) = (picks.progress(&item.id), c.to_digit(10)) {
                            picks.set_progress(&item.id, p as f64 * 10.0 + digit as f64);
                        }
                    }
                    _ => {}
                }
            }
            _ => {
                let form = &mut admin.create_form;
                let (field, kind) = match focus {
                    0 => (&mut form.name, FieldKind::Text),
                    1 => (&mut form.points, FieldKind::Unsigned),
                    2 => (&mut form.clase, FieldKind::Text),
                    _ => (&mut form.steam_id, FieldKind::Text),
                };
                edit_field(field, key, kind);
            }
        }
    }

    fn handle_edit_user(&mut self, key: KeyEvent, admin: &mut Admin, focus: usize) {
        let rows = match admin.edit_session() {
            EditSession::Editing { draft, .. } => draft.progress.len(),
            EditSession::Idle => {
                self.overlay = Overlay::None;
                return;
            }
        };
        let append_at = EDIT_FIELDS + rows;
        if let Some(next) = move_focus(focus, key.code, append_at + 2) {
            self.overlay = Overlay::EditUser { focus: next };
            return;
        }

        match key.code {
            KeyCode::Esc => {
                admin.cancel_edit();
                self.overlay = Overlay::None;
                return;
            }
            KeyCode::Enter => {
                if focus >= append_at {
                    admin.queue(Command::AppendItem);
                } else {
                    admin.queue(Command::SaveEdit);
                }
                return;
            }
            _ => {}
        }

        if focus == append_at {
            let Some(forward) = selector_step(key.code) else {
                return;
            };
            let next = match admin.edit_session() {
                EditSession::Editing { draft, .. } => {
                    cycle_item(&admin.appendable_items(), &draft.new_item, forward)
                }
                EditSession::Idle => return,
            };
            if let Some(draft) = admin.edit_draft_mut() {
                draft.new_item = next;
            }
            return;
        }

        let Some(draft) = admin.edit_draft_mut() else {
            return;
        };
        match focus {
            0 => {
                edit_field(&mut draft.name, key, FieldKind::Text);
            }
            1 => match key.code {
                KeyCode::Char('+') | KeyCode::Right => draft.increase_points(),
                KeyCode::Char('-') | KeyCode::Left => draft.decrease_points(),
                _ => {
                    edit_field(&mut draft.points, key, FieldKind::Unsigned);
                }
            },
            2 => {
                edit_field(&mut draft.multiplier, key, FieldKind::Unsigned);
            }
            3 => {
                edit_field(&mut draft.clase, key, FieldKind::Text);
            }
            4 => {
                edit_field(&mut draft.steam_id, key, FieldKind::Text);
            }
            f if f == append_at + 1 => {
                edit_field(&mut draft.new_item_progress, key, FieldKind::Unsigned);
            }
            f => {
                let Some(entry) = draft.progress.entries().get(f - EDIT_FIELDS) else {
                    return;
                };
                let id = entry.item_id.clone();
                let current = entry.progress;
                match key.code {
                    KeyCode::Char('+') | KeyCode::Right => draft.progress.increment(&id),
                    KeyCode::Char('-') | KeyCode::Left => draft.progress.decrement(&id),
                    KeyCode::Backspace => {
                        draft.progress.set(&id, (current / 10) as f64);
                    }
                    KeyCode::Char(c) => {
                        if let Some(digit) = c.to_digit(10) {
                            draft.progress.set(&id, current as f64 * 10.0 + digit as f64);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, admin: &mut Admin) {
        match key.code {
            KeyCode::Char('s') | KeyCode::Char('y') | KeyCode::Enter => {
                admin.queue(Command::ConfirmDelete);
                self.overlay = Overlay::None;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                admin.cancel_delete();
                self.overlay = Overlay::None;
            }
            _ => {}
        }
    }

    fn handle_bulk(&mut self, key: KeyEvent, admin: &mut Admin, focus: usize) {
        let rows = admin.bulk.rows.len();

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') => {
                    admin.bulk.add_row();
                    self.overlay = Overlay::Bulk { focus: BULK_FIELDS + rows * 2 };
                }
                KeyCode::Char('d') if focus >= BULK_FIELDS => {
                    let row = (focus - BULK_FIELDS) / 2;
                    admin.bulk.remove_row(row);
                    let count = BULK_FIELDS + admin.bulk.rows.len() * 2;
                    self.overlay = Overlay::Bulk { focus: (BULK_FIELDS + row * 2).min(count - 1) };
                }
                KeyCode::Char('r') => {
                    admin.bulk.reset();
                    self.overlay = Overlay::Bulk { focus: 0 };
                }
                KeyCode::Char('x') => admin.selection.clear(),
                _ => {}
            }
            return;
        }

        if let Some(next) = move_focus(focus, key.code, BULK_FIELDS + rows * 2) {
            self.overlay = Overlay::Bulk { focus: next };
            return;
        }

        match key.code {
            KeyCode::Esc => {
                self.overlay = Overlay::None;
                return;
            }
            KeyCode::Enter => {
                if !admin.selection.is_empty() {
                    admin.queue(Command::ApplyBulk);
                    self.overlay = Overlay::None;
                }
                return;
            }
            _ => {}
        }

        let on_row_item = focus >= BULK_FIELDS && (focus - BULK_FIELDS) % 2 == 0;
        if focus == 2 || on_row_item {
            let Some(forward) = selector_step(key.code) else {
                return;
            };
            let current = if focus == 2 {
                admin.bulk.append_item.clone()
            } else {
                admin.bulk.rows.get((focus - BULK_FIELDS) / 2).map(|r| r.item.clone()).unwrap_or_default()
            };
            let options: Vec<&Item> = admin.items().iter().collect();
            let next = cycle_item(&options, &current, forward);
            if focus == 2 {
                admin.bulk.append_item = next;
            } else if let Some(row) = admin.bulk.rows.get_mut((focus - BULK_FIELDS) / 2) {
                row.item = next;
            }
            return;
        }

        let bulk = &mut admin.bulk;
        match focus {
            0 => {
                edit_field(&mut bulk.delta_points, key, FieldKind::Signed);
            }
            1 => {
                edit_field(&mut bulk.clase, key, FieldKind::Text);
            }
            3 => {
                edit_field(&mut bulk.append_progress, key, FieldKind::Unsigned);
            }
            f => {
                if let Some(row) = bulk.rows.get_mut((f - BULK_FIELDS) / 2) {
                    edit_field(&mut row.progress, key, FieldKind::Unsigned);
                }
            }
        }
    }

    fn handle_item_form(&mut self, key: KeyEvent, admin: &mut Admin, focus: usize, editing: bool) {
        if let Some(next) = move_focus(focus, key.code, ITEM_FIELDS) {
            self.overlay = if editing {
                Overlay::EditItem { focus: next }
            } else {
                Overlay::CreateItem { focus: next }
            };
            return;
        }

        match key.code {
            KeyCode::Esc => {
                if editing {
                    admin.cancel_item_edit();
                }
                self.overlay = Overlay::None;
                return;
            }
            KeyCode::Enter => {
                if editing {
                    let ready = matches!(
                        admin.item_edit_session(),
                        ItemEditSession::Editing { draft, .. } if draft.to_payload().is_some()
                    );
                    if ready {
                        admin.queue(Command::SaveItemEdit);
                    }
                } else if admin.item_form.to_payload().is_some() {
                    admin.queue(Command::CreateItem);
                    self.overlay = Overlay::None;
                }
                return;
            }
            _ => {}
        }

        let form = if editing {
            match admin.item_draft_mut() {
                Some(draft) => draft,
                None => return,
            }
        } else {
            &mut admin.item_form
        };
        let (field, kind) = match focus {
            0 => (&mut form.name, FieldKind::Text),
            1 => (&mut form.description, FieldKind::Text),
            _ => (&mut form.max_progress, FieldKind::Unsigned),
        };
        edit_field(field, key, kind);
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render the current frame
    pub fn render(&self, frame: &mut Frame, admin: &Admin) {
        let banner_height = if admin.error().is_some() { 3 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(banner_height),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.render_navbar(frame, admin, chunks[0]);
        if let Some(message) = admin.error() {
            self.render_error_banner(frame, message, chunks[1]);
        }
        match admin.view() {
            View::Users => self.render_users_view(frame, admin, chunks[2]),
            View::Items => self.render_items_view(frame, admin, chunks[2]),
        }
        self.render_footer(frame, admin, chunks[3]);

        match self.overlay {
            Overlay::None | Overlay::Search => {}
            Overlay::CreateUser { focus } => self.render_create_user(frame, admin, focus),
            Overlay::EditUser { focus } => self.render_edit_user(frame, admin, focus),
            Overlay::ConfirmDelete => self.render_confirm_delete(frame, admin),
            Overlay::Bulk { focus } => self.render_bulk(frame, admin, focus),
            Overlay::CreateItem { focus } => self.render_item_form(frame, admin, focus, false),
            Overlay::EditItem { focus } => self.render_item_form(frame, admin, focus, true),
            Overlay::Help => self.render_help_overlay(frame, admin),
        }

        if admin.is_saving() {
            self.render_busy(frame, "Guardando...");
        }
    }

    fn render_navbar(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(18)])
            .split(area);

        let selected = match admin.view() {
            View::Users => 0,
            View::Items => 1,
        };
        let tabs = Tabs::new(vec!["[1] Usuarios", "[2] Items"])
            .select(selected)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Inquisitorio ")
                    .border_style(Style::default().fg(BORDER)),
            )
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        frame.render_widget(tabs, chunks[0]);

        let (status, color) = if admin.is_loading() {
            ("Cargando...", Color::Cyan)
        } else if admin.is_saving() {
            ("Guardando...", Color::Yellow)
        } else {
            ("Listo", Color::Green)
        };
        let status = Paragraph::new(Span::styled(status, Style::default().fg(color)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(BORDER)));
        frame.render_widget(status, chunks[1]);
    }

    fn render_error_banner(&self, frame: &mut Frame, message: &str, area: Rect) {
        let banner = Paragraph::new(Line::from(vec![
            Span::styled(message.to_string(), Style::default().fg(Color::White).add_modifier(Modifier::BOLD)),
            Span::styled("  [x] cerrar", Style::default().fg(Color::Gray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error ")
                .border_style(Style::default().fg(Color::Red)),
        )
        .style(Style::default().bg(Color::Rgb(60, 20, 20)));
        frame.render_widget(banner, area);
    }

    fn render_users_view(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(3)])
            .split(area);
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(chunks[0]);

        self.render_stats(frame, admin, panels[0]);
        self.render_search_panel(frame, admin, panels[1]);
        self.render_user_table(frame, admin, chunks[1]);
    }

    fn render_stats(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let stats = admin.stats();
        let label = Style::default().fg(Color::Gray);
        let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(vec![
                Span::styled("Usuarios ", label),
                Span::styled(stats.users.to_string(), value),
                Span::styled("  Promedio ", label),
                Span::styled(stats.average_points.to_string(), value),
                Span::styled("  Máximo ", label),
                Span::styled(stats.max_points.to_string(), value),
            ]),
            Line::from(vec![
                Span::styled("Seleccionados ", label),
                Span::styled(admin.selection.len().to_string(), Style::default().fg(Color::Cyan)),
            ]),
        ];
        let panel = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Resumen ")
                .border_style(Style::default().fg(BORDER)),
        );
        frame.render_widget(panel, area);
    }

    fn render_search_panel(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let searching = self.overlay == Overlay::Search;
        let mut search = vec![
            Span::styled("Buscar: ", Style::default().fg(Color::Gray)),
            Span::styled(admin.query.text.clone(), Style::default().fg(Color::White)),
        ];
        if searching {
            search.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        } else if admin.query.text.is_empty() {
            search.push(Span::styled("[/] nombre o puntos", Style::default().fg(Color::DarkGray)));
        }

        let arrow = match admin.query.direction {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        };
        let sort = Line::from(vec![
            Span::styled("Orden: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} {} {}", admin.query.key.label(), arrow, admin.query.direction.label()),
                Style::default().fg(Color::White),
            ),
            Span::styled("  [s] campo [o] dirección", Style::default().fg(Color::DarkGray)),
        ]);

        let border = if searching { Color::Yellow } else { BORDER };
        let panel = Paragraph::new(vec![Line::from(search), sort]).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Búsqueda ")
                .border_style(Style::default().fg(border)),
        );
        frame.render_widget(panel, area);
    }

    fn items_summary(&self, user: &User, catalogue: &[Item]) -> Line<'static> {
        // Entries whose item was deleted are not shown
        let held: Vec<_> = user.items.iter().filter(|e| e.item.id().is_some()).collect();
        if held.is_empty() {
            return Line::from(Span::styled("-", Style::default().fg(Color::DarkGray)));
        }
        let mut spans = Vec::new();
        for entry in held.iter().take(ITEMS_PER_ROW) {
            let max = entry.item.max_progress(catalogue);
            spans.push(Span::styled(
                format!("{} ", truncate_name(entry.item.name(catalogue), 12)),
                Style::default().fg(Color::White),
            ));
            spans.push(progress_span(entry.progress, max, 6));
            spans.push(Span::styled(
                format!(" {}/{}  ", entry.progress, max),
                Style::default().fg(Color::Gray),
            ));
        }
        if held.len() > ITEMS_PER_ROW {
            spans.push(Span::styled(
                format!("+{}", held.len() - ITEMS_PER_ROW),
                Style::default().fg(Color::DarkGray),
            ));
        }
        Line::from(spans)
    }

    fn render_user_table(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let visible = admin.visible_users();
        let mut title = format!(" Usuarios ({}/{}) ", visible.len(), admin.users().len());
        if admin.all_visible_selected() {
            title.push_str("[todos seleccionados] ");
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(BORDER));

        if visible.is_empty() {
            let message = if admin.is_loading() {
                "Cargando usuarios..."
            } else if admin.users().is_empty() {
                "No hay usuarios. [n] para crear uno."
            } else {
                "Ningún usuario coincide con la búsqueda."
            };
            let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec!["", "Nombre", "Clase", "Pts", "Rango", "Items"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = visible
            .iter()
            .map(|user| {
                let check = if admin.selection.contains(&user.id) { "[x]" } else { "[ ]" };
                Row::new(vec![
                    Cell::from(check),
                    Cell::from(truncate_name(&user.name, 24)),
                    Cell::from(truncate_name(user.class_label(), 14)),
                    Cell::from(user.points.to_string()),
                    Cell::from(Line::from(rank_badge(admin.rank_of(user)))),
                    Cell::from(self.items_summary(user, admin.items())),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Percentage(20),
                Constraint::Percentage(12),
                Constraint::Length(6),
                Constraint::Length(14),
                Constraint::Min(20),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(self.user_cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_items_view(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Items ({}) ", admin.items().len()))
            .border_style(Style::default().fg(BORDER));

        if admin.items().is_empty() {
            let message = if admin.is_loading() { "Cargando items..." } else { "No hay items. [n] para crear uno." };
            let empty = Paragraph::new(Span::styled(message, Style::default().fg(Color::Gray)))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec!["Nombre", "Descripción", "Máx", "Usuarios"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
        let rows: Vec<Row> = admin
            .items()
            .iter()
            .map(|item| {
                let holders = admin.users().iter().filter(|u| u.holds_item(&item.id)).count();
                Row::new(vec![
                    Cell::from(truncate_name(&item.name, 24)),
                    Cell::from(item.description.clone()),
                    Cell::from(item.max_progress.to_string()),
                    Cell::from(holders.to_string()),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(25),
                Constraint::Min(20),
                Constraint::Length(6),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)).add_modifier(Modifier::BOLD))
        .highlight_symbol("▶ ");

        let mut state = TableState::default().with_selected(Some(self.item_cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn render_footer(&self, frame: &mut Frame, admin: &Admin, area: Rect) {
        let hints: &[(&str, &str)] = match (self.overlay, admin.view()) {
            (Overlay::Search, _) => &[("Enter", "listo"), ("Esc", "limpiar")],
            (Overlay::None, View::Users) => &[
                ("↑↓", "mover"),
                ("Espacio", "marcar"),
                ("a", "marcar todos"),
                ("n", "nuevo"),
                ("e", "editar"),
                ("d", "eliminar"),
                ("b", "masivo"),
                ("r", "recargar"),
                ("?", "ayuda"),
                ("q", "salir"),
            ],
            (Overlay::None, View::Items) => &[
                ("↑↓", "mover"),
                ("n", "nuevo"),
                ("e", "editar"),
                ("d", "eliminar"),
                ("r", "recargar"),
                ("Tab", "usuarios"),
                ("q", "salir"),
            ],
            _ => &[("Tab", "campo"), ("Enter", "confirmar"), ("Esc", "cerrar")],
        };

        let mut spans = Vec::new();
        for (key, action) in hints {
            spans.push(Span::styled(format!(" {} ", key), Style::default().fg(Color::Black).bg(Color::Gray)));
            spans.push(Span::styled(format!(" {} ", action), Style::default().fg(Color::Gray)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_busy(&self, frame: &mut Frame, message: &str) {
        let area = centered_rect(24, 10, frame.area());
        frame.render_widget(Clear, area);
        let busy = Paragraph::new(Span::styled(message.to_string(), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Yellow)));
        frame.render_widget(busy, area);
    }

    fn render_create_user(&self, frame: &mut Frame, admin: &Admin, focus: usize) {
        let area = centered_rect(60, 75, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Nuevo usuario ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let form = &admin.create_form;
        let mut lines = vec![
            field_line("Nombre", &form.name, focus == 0),
            field_line("Puntos", &form.points, focus == 1),
            field_line("Clase", &form.clase, focus == 2),
            field_line("Steam ID", &form.steam_id, focus == 3),
            Line::from(""),
            section_line("Items iniciales"),
        ];
        if admin.items().is_empty() {
            lines.push(Line::from(Span::styled("  (catálogo vacío)", Style::default().fg(Color::DarkGray))));
        }
        for (i, item) in admin.items().iter().enumerate() {
            let focused = focus == CREATE_FIELDS + i;
            let marker = if focused { "> " } else { "  " };
            let mut spans = vec![Span::styled(
                format!("{}{} {}", marker, if form.items.is_picked(&item.id) { "[x]" } else { "[ ]" }, item.name),
                if focused {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                },
            )];
            if let Some(progress) = form.items.progress(&item.id) {
                spans.push(Span::raw("  "));
                spans.push(progress_span(progress, item.max_progress, 8));
                spans.push(Span::styled(
                    format!(" {}/{}", progress, item.max_progress),
                    Style::default().fg(Color::Gray),
                ));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(hint_line("Espacio marca un item, +/- o dígitos su progreso. Enter crea, Esc cierra."));

        let scroll = focus.saturating_sub(inner.height.saturating_sub(4) as usize) as u16;
        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
    }

    fn render_edit_user(&self, frame: &mut Frame, admin: &Admin, focus: usize) {
        let EditSession::Editing { id, draft } = admin.edit_session() else {
            return;
        };
        let area = centered_rect(70, 85, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Editar: {} ", truncate_name(&draft.name, 30)))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = draft.progress.len();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(1),
                Constraint::Length(rows.max(1) as u16),
                Constraint::Length(4),
                Constraint::Min(0),
            ])
            .split(inner);

        let mut points = field_line("Puntos", &draft.points, focus == 1);
        if let Some(rank) = admin.edit_rank() {
            points.spans.push(Span::raw("  "));
            points.spans.push(rank_badge(rank));
        }
        let mut fields = vec![
            field_line("Nombre", &draft.name, focus == 0),
            points,
            field_line("Paso +/-", &draft.multiplier, focus == 2),
            field_line("Clase", &draft.clase, focus == 3),
            field_line("Steam ID", &draft.steam_id, focus == 4),
        ];
        let avatar = admin.users().iter().find(|u| u.id == *id).and_then(|u| u.steam_avatar.as_deref());
        if let Some(url) = avatar {
            fields.push(hint_line(&format!("  Avatar: {}", url)));
        }
        frame.render_widget(Paragraph::new(fields), chunks[0]);
        frame.render_widget(Paragraph::new(section_line("Progreso de items")), chunks[1]);

        if rows == 0 {
            frame.render_widget(
                Paragraph::new(Span::styled("  Sin items", Style::default().fg(Color::DarkGray))),
                chunks[2],
            );
        }
        let bars = chunks[2];
        for (i, entry) in draft.progress.entries().iter().enumerate() {
            if i as u16 >= bars.height {
                break;
            }
            let row = Rect { x: bars.x, y: bars.y + i as u16, width: bars.width, height: 1 };
            frame.render_widget(
                ProgressBar::new(entry.progress, entry.max_progress)
                    .label(&entry.name)
                    .focused(focus == EDIT_FIELDS + i)
                    .label_width(22),
                row,
            );
        }

        let append_at = EDIT_FIELDS + rows;
        let appendable = admin.appendable_items();
        let append = if appendable.is_empty() {
            vec![
                section_line("Añadir item"),
                Line::from(Span::styled("  No quedan items por añadir", Style::default().fg(Color::DarkGray))),
            ]
        } else {
            vec![
                section_line("Añadir item"),
                selector_line("Item", &item_label(admin.items(), &draft.new_item), focus == append_at),
                field_line("Progreso", &draft.new_item_progress, focus == append_at + 1),
            ]
        };
        frame.render_widget(Paragraph::new(append), chunks[3]);

        let hints = vec![
            Line::from(""),
            hint_line("Tab/↑↓ campo, +/- ajusta puntos o progreso, dígitos escriben el progreso."),
            hint_line("Enter guarda (en \"Añadir item\" lo añade). Esc cancela."),
        ];
        frame.render_widget(Paragraph::new(hints).wrap(Wrap { trim: true }), chunks[4]);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, admin: &Admin) {
        let Some(user) = admin.pending_delete() else {
            return;
        };
        let area = centered_rect(44, 30, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Eliminar usuario ")
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("¿Eliminar a {}?", user.name),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled("Esta acción no se puede deshacer.", Style::default().fg(Color::Gray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("[S/Enter] Sí", Style::default().fg(Color::Red)),
                Span::raw("    "),
                Span::styled("[N/Esc] No", Style::default().fg(Color::White)),
            ]),
        ])
        .alignment(Alignment::Center);
        frame.render_widget(text, inner);
    }

    fn render_bulk(&self, frame: &mut Frame, admin: &Admin, focus: usize) {
        let area = centered_rect(70, 80, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Edición masiva ({} seleccionados) ", admin.selection.len()))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let bulk = &admin.bulk;
        let catalogue = admin.items();
        let mut lines = vec![
            field_line("Δ Puntos", &bulk.delta_points, focus == 0),
            field_line("Fijar clase", &bulk.clase, focus == 1),
            selector_line("Añadir item", &item_label(catalogue, &bulk.append_item), focus == 2),
            field_line("  progreso", &bulk.append_progress, focus == 3),
            Line::from(""),
            section_line("Fijar progreso"),
        ];
        if bulk.rows.is_empty() {
            lines.push(Line::from(Span::styled("  (sin filas, Ctrl+N agrega)", Style::default().fg(Color::DarkGray))));
        }
        for (i, row) in bulk.rows.iter().enumerate() {
            let base = BULK_FIELDS + i * 2;
            lines.push(selector_line(&format!("Fila {}", i + 1), &item_label(catalogue, &row.item), focus == base));
            lines.push(field_line("  progreso", &row.progress, focus == base + 1));
        }
        lines.push(Line::from(""));
        if admin.selection.is_empty() {
            lines.push(Line::from(Span::styled(
                "Marcá usuarios con Espacio antes de aplicar.",
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(hint_line("Ctrl+N fila  Ctrl+D quitar fila  Ctrl+R limpiar  Ctrl+X desmarcar"));
        lines.push(hint_line("Enter aplica, Esc cierra."));

        let scroll = focus.saturating_sub(inner.height.saturating_sub(6) as usize) as u16;
        frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), inner);
    }

    fn render_item_form(&self, frame: &mut Frame, admin: &Admin, focus: usize, editing: bool) {
        let form = if editing {
            match admin.item_edit_session() {
                ItemEditSession::Editing { draft, .. } => draft,
                ItemEditSession::Idle => return,
            }
        } else {
            &admin.item_form
        };

        let area = centered_rect(50, 40, frame.area());
        frame.render_widget(Clear, area);
        let title = if editing { " Editar item " } else { " Nuevo item " };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = vec![
            field_line("Nombre", &form.name, focus == 0),
            field_line("Descripción", &form.description, focus == 1),
            field_line("Progreso máx", &form.max_progress, focus == 2),
            Line::from(""),
            hint_line("El progreso máximo es al menos 1."),
            hint_line("Enter guarda, Esc cierra."),
        ];
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_help_overlay(&self, frame: &mut Frame, admin: &Admin) {
        let area = centered_rect(70, 85, frame.area());
        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" ? Ayuda ")
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let keys = [
            ("Tab / 1 / 2", "Cambiar entre usuarios e items"),
            ("↑↓ / j k", "Mover el cursor"),
            ("Espacio", "Marcar usuario"),
            ("a", "Marcar o desmarcar todos los visibles"),
            ("c", "Desmarcar todos"),
            ("/", "Buscar por nombre o puntos"),
            ("s / o", "Campo y dirección de orden"),
            ("n", "Nuevo usuario o item"),
            ("e / Enter", "Editar"),
            ("d / Supr", "Eliminar"),
            ("b", "Edición masiva de marcados"),
            ("r / F5", "Recargar"),
            ("x", "Cerrar mensaje de error"),
            ("q / Ctrl+Q", "Salir"),
        ];

        let mut lines = vec![section_line("TECLAS"), Line::from("")];
        for (key, action) in keys {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<14}", key), Style::default().fg(Color::White)),
                Span::styled(action, Style::default().fg(Color::Gray)),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(section_line("RANGOS"));
        lines.push(Line::from(""));
        let ranks = admin.ranks().ranks();
        for (i, rank) in ranks.iter().enumerate() {
            let range = if i + 1 == ranks.len() && i > 0 {
                format!("  más de {} pts", ranks[i - 1].threshold)
            } else {
                format!("  hasta {} pts", rank.threshold)
            };
            lines.push(Line::from(vec![
                Span::raw("  "),
                rank_badge(rank),
                Span::styled(range, Style::default().fg(Color::Gray)),
            ]));
        }

        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
    }
}

fn field_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let label_style = if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let mut spans = vec![
        Span::styled(format!("{}{:<14}", marker, label), label_style),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

fn selector_line(label: &str, value: &str, focused: bool) -> Line<'static> {
    let marker = if focused { "> " } else { "  " };
    let (label_style, arrows) = if focused {
        (Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD), Style::default().fg(Color::Yellow))
    } else {
        (Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
    };
    Line::from(vec![
        Span::styled(format!("{}{:<14}", marker, label), label_style),
        Span::styled("◀ ", arrows),
        Span::styled(value.to_string(), Style::default().fg(Color::White)),
        Span::styled(" ▶", arrows),
    ])
}

fn section_line(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("═══ {} ═══", title),
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
    ))
}

fn hint_line(text: &str) -> Line<'static> {
    Line::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray)))
}

/// Create a centered rectangle for popups
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
