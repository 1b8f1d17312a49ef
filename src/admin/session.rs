//! Admin session state machine
//!
//! Owns the transient copy of users and items, the forms, the edit session
//! and the error banner. Every backend call is caught here: failures are
//! logged and turned into a banner message, successes trigger a re-fetch.

use crate::api::Backend;
use crate::model::{Item, User};
use crate::progression::{Rank, RankTable};
use crate::roster::{append_request, selectable_items, BulkForm, ListQuery, ProgressDraft, Selection};

use super::forms::{ItemForm, UserDraft, UserForm};

/// Which ABM is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Users,
    Items,
}

/// User being edited, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { id: String, draft: UserDraft },
}

/// Item being edited, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ItemEditSession {
    #[default]
    Idle,
    Editing { id: String, draft: ItemForm },
}

/// Backend work queued by the UI, run on the next update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RefreshAll,
    CreateUser,
    SaveEdit,
    AppendItem,
    ConfirmDelete,
    ApplyBulk,
    CreateItem,
    SaveItemEdit,
    DeleteItem(String),
}

impl Command {
    /// Whether the command only reads
    pub fn is_fetch(&self) -> bool {
        matches!(self, Command::RefreshAll)
    }
}

/// Quick numbers shown next to the user list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub users: usize,
    pub average_points: u32,
    pub max_points: u32,
}

pub struct Admin {
    backend: Box<dyn Backend>,
    ranks: RankTable,
    view: View,
    users: Vec<User>,
    items: Vec<Item>,
    loading: bool,
    saving: bool,
    error: Option<String>,
    edit: EditSession,
    item_edit: ItemEditSession,
    pending_delete: Option<User>,
    pending: Option<Command>,
    /// Search text and ordering of the user list
    pub query: ListQuery,
    pub create_form: UserForm,
    pub selection: Selection,
    pub bulk: BulkForm,
    pub item_form: ItemForm,
}

impl Admin {
    pub fn new(backend: Box<dyn Backend>, ranks: RankTable) -> Self {
        Self {
            backend,
            ranks,
            view: View::Users,
            users: Vec::new(),
            items: Vec::new(),
            loading: false,
            saving: false,
            error: None,
            edit: EditSession::Idle,
            item_edit: ItemEditSession::Idle,
            pending_delete: None,
            pending: None,
            query: ListQuery::default(),
            create_form: UserForm::new(),
            selection: Selection::new(),
            bulk: BulkForm::new(),
            item_form: ItemForm::new(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn view(&self) -> View {
        self.view
    }

    pub fn set_view(&mut self, view: View) {
        if self.view != view {
            log::info!("Switching to {:?} view", view);
            self.view = view;
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    /// Draft of the user being edited
    pub fn edit_draft_mut(&mut self) -> Option<&mut UserDraft> {
        match &mut self.edit {
            EditSession::Editing { draft, .. } => Some(draft),
            EditSession::Idle => None,
        }
    }

    pub fn item_edit_session(&self) -> &ItemEditSession {
        &self.item_edit
    }

    pub fn item_draft_mut(&mut self) -> Option<&mut ItemForm> {
        match &mut self.item_edit {
            ItemEditSession::Editing { draft, .. } => Some(draft),
            ItemEditSession::Idle => None,
        }
    }

    pub fn pending_delete(&self) -> Option<&User> {
        self.pending_delete.as_ref()
    }

    /// Users after search and sort
    pub fn visible_users(&self) -> Vec<&User> {
        self.query.apply(&self.users)
    }

    pub fn all_visible_selected(&self) -> bool {
        self.selection.all_selected(&self.query.apply(&self.users))
    }

    /// Select every visible user, or deselect them if all already are
    pub fn toggle_select_all_visible(&mut self) {
        let visible = self.query.apply(&self.users);
        self.selection.toggle_all(&visible);
    }

    pub fn rank_of(&self, user: &User) -> &Rank {
        self.ranks.rank_for(user.points as i64)
    }

    /// Rank preview for the points typed in the edit draft
    pub fn edit_rank(&self) -> Option<&Rank> {
        match &self.edit {
            EditSession::Editing { draft, .. } => Some(self.ranks.rank_for_input(&draft.points)),
            EditSession::Idle => None,
        }
    }

    /// Catalogue items the edited user does not hold yet
    pub fn appendable_items(&self) -> Vec<&Item> {
        match &self.edit {
            EditSession::Editing { draft, .. } => selectable_items(&self.items, &draft.progress),
            EditSession::Idle => Vec::new(),
        }
    }

    pub fn stats(&self) -> Stats {
        if self.users.is_empty() {
            return Stats::default();
        }
        let total: u64 = self.users.iter().map(|u| u.points as u64).sum();
        let average = (total as f64 / self.users.len() as f64).round() as u32;
        Stats {
            users: self.users.len(),
            average_points: average,
            max_points: self.users.iter().map(|u| u.points).max().unwrap_or(0),
        }
    }

    // ------------------------------------------------------------------
    // Command queue
    // ------------------------------------------------------------------

    /// Queue backend work so the loading state can be drawn before it runs
    pub fn queue(&mut self, command: Command) {
        if command.is_fetch() {
            self.loading = true;
        } else {
            self.saving = true;
        }
        self.pending = Some(command);
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Run queued backend work, if any
    pub fn update(&mut self) {
        if let Some(command) = self.pending.take() {
            self.execute(command);
        }
    }

    pub fn execute(&mut self, command: Command) {
        log::debug!("Executing {:?}", command);
        match command {
            Command::RefreshAll => self.refresh_all(),
            Command::CreateUser => self.create_user(),
            Command::SaveEdit => self.save_edit(),
            Command::AppendItem => self.append_item_to_edit(),
            Command::ConfirmDelete => self.confirm_delete(),
            Command::ApplyBulk => self.apply_bulk(),
            Command::CreateItem => self.create_item(),
            Command::SaveItemEdit => self.save_item_edit(),
            Command::DeleteItem(id) => self.delete_item(&id),
        }
        self.loading = false;
        self.saving = false;
    }

    fn fail(&mut self, message: &str, err: impl std::fmt::Display) {
        log::error!("{}: {}", message, err);
        self.error = Some(message.to_string());
    }

    // ------------------------------------------------------------------
    // Fetching
    // ------------------------------------------------------------------

    /// Ping the backend so a sleeping instance starts waking up
    pub fn wake_backend(&self) {
        match self.backend.health() {
            Ok(()) => log::info!("Backend is awake"),
            Err(e) => log::warn!("Backend wake-up failed: {}", e),
        }
    }

    /// Re-fetch both lists. A failure in either one stays in the banner.
    pub fn refresh_all(&mut self) {
        self.error = None;
        self.fetch_users();
        self.fetch_items();
    }

    /// Re-fetch users. On failure the previous list stays on screen.
    pub fn refresh_users(&mut self) {
        self.error = None;
        self.fetch_users();
    }

    /// Re-fetch the item catalogue
    pub fn refresh_items(&mut self) {
        self.error = None;
        self.fetch_items();
    }

    fn fetch_users(&mut self) {
        self.loading = true;
        match self.backend.list_users() {
            Ok(users) => {
                log::info!("Loaded {} users", users.len());
                self.users = users;
                self.selection.retain_existing(&self.users);
            }
            Err(e) => self.fail("No se pudo cargar la lista. Verificá el servidor API.", e),
        }
        self.loading = false;
    }

    fn fetch_items(&mut self) {
        match self.backend.list_items() {
            Ok(items) => {
                log::info!("Loaded {} items", items.len());
                self.items = items;
            }
            Err(e) => self.fail("No se pudo cargar el catálogo de items.", e),
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn create_user(&mut self) {
        let Some(payload) = self.create_form.to_payload() else {
            log::debug!("Create skipped, name is blank");
            return;
        };
        self.saving = true;
        match self.backend.create_user(&payload) {
            Ok(()) => {
                log::info!("Created user {}", payload.name);
                self.create_form.reset();
                self.refresh_users();
            }
            Err(e) => self.fail("No se pudo crear el usuario.", e),
        }
        self.saving = false;
    }

    pub fn begin_edit(&mut self, user_id: &str) {
        let Some(user) = self.users.iter().find(|u| u.id == user_id) else {
            log::warn!("Cannot edit unknown user {}", user_id);
            return;
        };
        log::info!("Editing user {}", user.id);
        self.edit = EditSession::Editing {
            id: user.id.clone(),
            draft: UserDraft::from_user(user, &self.items),
        };
    }

    pub fn cancel_edit(&mut self) {
        self.edit = EditSession::Idle;
    }

    pub fn save_edit(&mut self) {
        let EditSession::Editing { id, draft } = &self.edit else {
            return;
        };
        let id = id.clone();
        let payload = draft.to_payload();
        self.saving = true;
        match self.backend.update_user(&id, &payload) {
            Ok(()) => {
                log::info!("Updated user {}", id);
                self.cancel_edit();
                self.refresh_users();
            }
            Err(e) => self.fail("No se pudo actualizar el usuario.", e),
        }
        self.saving = false;
    }

    /// Give the edited user the item picked in the draft
    pub fn append_item_to_edit(&mut self) {
        let EditSession::Editing { id, draft } = &self.edit else {
            return;
        };
        let Some(entry) = append_request(&draft.progress, &self.items, &draft.new_item, &draft.new_item_progress) else {
            return;
        };
        let id = id.clone();
        self.saving = true;
        match self.backend.append_item(&id, &entry) {
            Ok(held) => {
                log::info!("Appended item {} to user {}", entry.item, id);
                let rebuilt = ProgressDraft::from_entries(&held, &self.items);
                if let Some(draft) = self.edit_draft_mut() {
                    draft.progress = rebuilt;
                    draft.clear_new_item();
                }
                self.refresh_users();
            }
            Err(e) => self.fail("No se pudo añadir item al usuario.", e),
        }
        self.saving = false;
    }

    /// Ask for confirmation before deleting
    pub fn request_delete(&mut self, user_id: &str) {
        self.pending_delete = self.users.iter().find(|u| u.id == user_id).cloned();
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) {
        let Some(user) = self.pending_delete.clone() else {
            return;
        };
        match self.backend.delete_user(&user.id) {
            Ok(()) => {
                log::info!("Deleted user {}", user.id);
                self.pending_delete = None;
                if matches!(&self.edit, EditSession::Editing { id, .. } if *id == user.id) {
                    self.cancel_edit();
                }
                self.refresh_users();
            }
            Err(e) => self.fail("No se pudo eliminar el usuario.", e),
        }
    }

    /// Send the bulk form for the selected users. No selection, no request.
    pub fn apply_bulk(&mut self) {
        let Some(request) = self.bulk.build(self.selection.ids(), &self.items) else {
            log::debug!("Bulk apply skipped, nothing selected");
            return;
        };
        self.saving = true;
        match self.backend.bulk_update(&request) {
            Ok(()) => {
                log::info!("Bulk update applied to {} users", request.ids.len());
                self.refresh_users();
                self.selection.clear();
                self.bulk.reset();
            }
            Err(e) => self.fail("No se pudieron aplicar cambios masivos.", e),
        }
        self.saving = false;
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub fn create_item(&mut self) {
        let Some(payload) = self.item_form.to_payload() else {
            return;
        };
        match self.backend.create_item(&payload) {
            Ok(()) => {
                log::info!("Created item {}", payload.name);
                self.item_form.reset();
                self.refresh_items();
            }
            Err(e) => self.fail("No se pudo crear el item.", e),
        }
    }

    pub fn begin_item_edit(&mut self, item_id: &str) {
        if let Some(item) = self.items.iter().find(|i| i.id == item_id) {
            self.item_edit = ItemEditSession::Editing {
                id: item.id.clone(),
                draft: ItemForm::from_item(item),
            };
        }
    }

    pub fn cancel_item_edit(&mut self) {
        self.item_edit = ItemEditSession::Idle;
    }

    pub fn save_item_edit(&mut self) {
        let ItemEditSession::Editing { id, draft } = &self.item_edit else {
            return;
        };
        let Some(payload) = draft.to_payload() else {
            return;
        };
        let id = id.clone();
        match self.backend.update_item(&id, &payload) {
            Ok(()) => {
                log::info!("Updated item {}", id);
                self.cancel_item_edit();
                self.refresh_items();
            }
            Err(e) => self.fail("No se pudo actualizar el item.", e),
        }
    }

    pub fn delete_item(&mut self, item_id: &str) {
        match self.backend.delete_item(item_id) {
            Ok(()) => {
                log::info!("Deleted item {}", item_id);
                self.refresh_items();
            }
            Err(e) => self.fail("No se pudo eliminar el item.", e),
        }
    }
}
