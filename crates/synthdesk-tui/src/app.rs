use std::collections::BTreeMap;

use tokio::sync::mpsc::UnboundedSender;
use tracing::warn;

use synthdesk_core::{
    BatchCreationRequest, BatchDecision, BatchResolution, FieldSchema, OperatorIdentity,
    PendingDecision, TableModel, UploadReceipt,
};

use crate::action::Action;
use crate::theme::Theme;
use crate::tui_event::{BackendCommand, BackendEvent};

/// Which screen is currently displayed. One variant per visible UI state;
/// transitions happen only in [`App::update`] and
/// [`App::handle_backend_event`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    Form,
    /// The entered batch identifier matched nothing; offer to create.
    BatchNotFound,
    /// The identifier matched several batches; the operator must pick one.
    BatchSelect,
    Summary,
}

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Focused widget on the Form screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFocus {
    Project,
    SynthesisType,
    BatchId,
    Rows,
}

impl FormFocus {
    fn next(self) -> Self {
        match self {
            FormFocus::Project => FormFocus::SynthesisType,
            FormFocus::SynthesisType => FormFocus::BatchId,
            FormFocus::BatchId => FormFocus::Rows,
            FormFocus::Rows => FormFocus::Project,
        }
    }

    fn prev(self) -> Self {
        match self {
            FormFocus::Project => FormFocus::Rows,
            FormFocus::SynthesisType => FormFocus::Project,
            FormFocus::BatchId => FormFocus::SynthesisType,
            FormFocus::Rows => FormFocus::BatchId,
        }
    }
}

/// Create-batch dialog contents (BatchNotFound screen).
#[derive(Debug, Clone, Default)]
pub struct CreateBatchForm {
    pub name: String,
    pub id: String,
    pub description: String,
    /// 0 = name, 1 = id, 2 = description.
    pub focus: usize,
}

impl CreateBatchForm {
    fn field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.name,
            1 => &mut self.id,
            _ => &mut self.description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// Main application state.
pub struct App {
    pub screen: Screen,
    pub input_mode: InputMode,
    pub should_quit: bool,
    /// One backend call in flight at a time; submissions are refused while set.
    pub busy: bool,
    pub status: Option<StatusLine>,
    pub theme: Theme,

    pub backend_cmd_tx: Option<UnboundedSender<BackendCommand>>,

    // Login
    pub login_email: String,
    pub identity: Option<OperatorIdentity>,
    pub session_token: String,

    // Form
    pub schemas: BTreeMap<String, Vec<String>>,
    pub synthesis_types: Vec<String>,
    pub project_idx: usize,
    pub synthesis_idx: usize,
    pub batch_id_text: String,
    pub table: Option<TableModel>,
    pub form_focus: FormFocus,
    pub row_cursor: usize,
    pub col_cursor: usize,
    pub edit_buffer: String,

    // Batch decision
    pub pending: Option<PendingDecision>,
    pub create_form: CreateBatchForm,
    pub select_cursor: usize,

    // Summary
    pub summary: Option<UploadReceipt>,
}

impl App {
    pub fn new(theme: Theme, email_prefill: String) -> Self {
        Self {
            screen: Screen::Login,
            input_mode: InputMode::Editing,
            should_quit: false,
            busy: false,
            status: None,
            theme,
            backend_cmd_tx: None,
            login_email: email_prefill,
            identity: None,
            session_token: String::new(),
            schemas: BTreeMap::new(),
            synthesis_types: Vec::new(),
            project_idx: 0,
            synthesis_idx: 0,
            batch_id_text: String::new(),
            table: None,
            form_focus: FormFocus::Project,
            row_cursor: 0,
            col_cursor: 0,
            edit_buffer: String::new(),
            pending: None,
            create_form: CreateBatchForm::default(),
            select_cursor: 0,
            summary: None,
        }
    }

    pub fn current_project(&self) -> Option<&str> {
        self.identity
            .as_ref()
            .and_then(|id| id.projects.get(self.project_idx))
            .map(String::as_str)
    }

    pub fn current_synthesis_type(&self) -> Option<&str> {
        self.synthesis_types.get(self.synthesis_idx).map(String::as_str)
    }

    fn send(&mut self, cmd: BackendCommand) {
        if let Some(tx) = &self.backend_cmd_tx {
            if tx.send(cmd).is_err() {
                warn!("backend channel closed");
                self.set_error("internal error: backend stopped");
                self.busy = false;
            }
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: false,
        });
    }

    fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            is_error: true,
        });
    }

    /// The table belongs to one synthesis type; switching destroys it.
    fn rebuild_table(&mut self) {
        let operator = self
            .identity
            .as_ref()
            .map(|id| id.name.clone())
            .unwrap_or_default();
        self.table = None;
        self.row_cursor = 0;
        self.col_cursor = 0;
        if let Some(synthesis_type) = self.current_synthesis_type() {
            let fields = self
                .schemas
                .get(synthesis_type)
                .cloned()
                .unwrap_or_default();
            match FieldSchema::new(synthesis_type, fields) {
                Ok(schema) => self.table = Some(TableModel::new(schema, operator)),
                Err(err) => self.set_error(format!("bad field schema: {err}")),
            }
        }
    }

    /// Apply one action; returns true when a redraw-worthy change happened.
    pub fn update(&mut self, action: Action) -> bool {
        if action == Action::Tick || action == Action::None {
            return false;
        }
        if action == Action::Quit {
            self.should_quit = true;
            return true;
        }
        match self.screen {
            Screen::Login => self.update_login(action),
            Screen::Form => self.update_form(action),
            Screen::BatchNotFound => self.update_batch_not_found(action),
            Screen::BatchSelect => self.update_batch_select(action),
            Screen::Summary => self.update_summary(action),
        }
        true
    }

    fn update_login(&mut self, action: Action) {
        match action {
            Action::Input(c) => self.login_email.push(c),
            Action::Backspace => {
                self.login_email.pop();
            }
            Action::PasteText(text) => self.login_email.push_str(text.trim()),
            Action::Confirm => {
                if self.busy {
                    return;
                }
                if self.login_email.trim().is_empty() {
                    self.set_error("enter an email address");
                    return;
                }
                self.busy = true;
                self.set_status("signing in…");
                let email = self.login_email.clone();
                self.send(BackendCommand::Login { email });
            }
            Action::Back => self.should_quit = true,
            _ => {}
        }
    }

    fn update_form(&mut self, action: Action) {
        if self.input_mode == InputMode::Editing {
            self.update_form_editing(action);
            return;
        }
        match action {
            Action::FocusNext => self.form_focus = self.form_focus.next(),
            Action::FocusPrev => self.form_focus = self.form_focus.prev(),
            Action::CycleLeft | Action::CycleRight => self.cycle(action),
            Action::MoveUp => {
                if self.form_focus == FormFocus::Rows {
                    self.row_cursor = self.row_cursor.saturating_sub(1);
                }
            }
            Action::MoveDown => {
                if self.form_focus == FormFocus::Rows {
                    let rows = self.table.as_ref().map_or(0, TableModel::row_count);
                    self.row_cursor = (self.row_cursor + 1).min(rows.saturating_sub(1));
                }
            }
            Action::StartEdit => self.start_edit(),
            Action::AddRow => {
                if let Some(table) = &mut self.table {
                    if table.append_blank().is_none() {
                        self.set_error("this synthesis type has no fields");
                    } else {
                        self.row_cursor = table.row_count() - 1;
                    }
                }
            }
            Action::RemoveLastRow => {
                if let Some(table) = &mut self.table {
                    table.remove_last();
                    let rows = table.row_count();
                    self.row_cursor = self.row_cursor.min(rows.saturating_sub(1));
                }
            }
            Action::ClearRows => {
                if let Some(table) = &mut self.table {
                    table.clear_all();
                    self.set_status("cleared all rows (count preserved)");
                }
            }
            Action::PasteText(text) => {
                if let Some(table) = &mut self.table {
                    let appended = table.paste(&text);
                    if appended > 0 {
                        self.row_cursor = table.row_count() - 1;
                    }
                    self.set_status(format!("pasted {appended} row(s)"));
                }
            }
            Action::Confirm => self.submit(),
            _ => {}
        }
    }

    fn cycle(&mut self, action: Action) {
        let forward = action == Action::CycleRight;
        match self.form_focus {
            FormFocus::Project => {
                let count = self.identity.as_ref().map_or(0, |id| id.projects.len());
                self.project_idx = cycle_index(self.project_idx, count, forward);
            }
            FormFocus::SynthesisType => {
                let count = self.synthesis_types.len();
                let next = cycle_index(self.synthesis_idx, count, forward);
                if next != self.synthesis_idx {
                    self.synthesis_idx = next;
                    self.rebuild_table();
                }
            }
            FormFocus::Rows => {
                let cols = self
                    .table
                    .as_ref()
                    .map_or(0, |table| table.columns().len());
                self.col_cursor = cycle_index(self.col_cursor, cols, forward);
            }
            FormFocus::BatchId => {}
        }
    }

    fn start_edit(&mut self) {
        match self.form_focus {
            FormFocus::BatchId => {
                self.edit_buffer = self.batch_id_text.clone();
                self.input_mode = InputMode::Editing;
            }
            FormFocus::Rows => {
                let Some(table) = &self.table else { return };
                let Some(row) = table.rows().get(self.row_cursor) else {
                    return;
                };
                let Some(column) = table.columns().get(self.col_cursor) else {
                    return;
                };
                self.edit_buffer = row.get(column).to_string();
                self.input_mode = InputMode::Editing;
            }
            _ => {}
        }
    }

    fn update_form_editing(&mut self, action: Action) {
        match action {
            Action::Input(c) => self.edit_buffer.push(c),
            Action::Backspace => {
                self.edit_buffer.pop();
            }
            Action::PasteText(text) => self.edit_buffer.push_str(&text),
            Action::Confirm => {
                self.commit_edit();
                self.input_mode = InputMode::Normal;
            }
            Action::Back => {
                self.edit_buffer.clear();
                self.input_mode = InputMode::Normal;
            }
            _ => {}
        }
    }

    fn commit_edit(&mut self) {
        let value = std::mem::take(&mut self.edit_buffer);
        match self.form_focus {
            FormFocus::BatchId => self.batch_id_text = value,
            FormFocus::Rows => {
                let row_cursor = self.row_cursor;
                let col_cursor = self.col_cursor;
                if let Some(table) = &mut self.table {
                    let Some(id) = table.rows().get(row_cursor).map(|r| r.id()) else {
                        return;
                    };
                    let Some(column) = table.columns().get(col_cursor).cloned() else {
                        return;
                    };
                    if let Some(row) = table.row_mut(id) {
                        row.set(&column, value);
                    }
                }
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if self.busy {
            self.set_error("a request is already in flight");
            return;
        }
        if self.synthesis_types.is_empty() {
            // Nothing to submit without schemas; retry the fetch instead.
            self.busy = true;
            self.set_status("fetching field schemas…");
            self.send(BackendCommand::FetchFields);
            return;
        }
        let Some(identity) = self.identity.clone() else {
            return;
        };
        let Some(table) = self.table.clone() else {
            self.set_error("select a synthesis type first");
            return;
        };
        let project = self.current_project().unwrap_or("").to_string();
        let synthesis_type = self.current_synthesis_type().unwrap_or("").to_string();
        self.busy = true;
        self.set_status("submitting…");
        self.send(BackendCommand::BeginSubmission {
            identity,
            project,
            synthesis_type,
            batch_id_text: self.batch_id_text.clone(),
            table,
        });
    }

    fn update_batch_not_found(&mut self, action: Action) {
        if self.input_mode == InputMode::Editing {
            match action {
                Action::Input(c) => self.create_form.field_mut().push(c),
                Action::Backspace => {
                    self.create_form.field_mut().pop();
                }
                Action::Confirm | Action::Back => self.input_mode = InputMode::Normal,
                Action::FocusNext => {
                    self.create_form.focus = (self.create_form.focus + 1) % 3;
                }
                _ => {}
            }
            return;
        }
        match action {
            Action::FocusNext => self.create_form.focus = (self.create_form.focus + 1) % 3,
            Action::FocusPrev => self.create_form.focus = (self.create_form.focus + 2) % 3,
            Action::StartEdit => self.input_mode = InputMode::Editing,
            Action::Confirm => self.resume_with_creation(),
            Action::SkipLinkage => self.resume(BatchDecision::Skip),
            Action::Back => self.abort_pending(),
            _ => {}
        }
    }

    fn resume_with_creation(&mut self) {
        let Some(identity) = self.identity.clone() else {
            return;
        };
        let project = self.current_project().unwrap_or("").to_string();
        let request = BatchCreationRequest {
            batch_name: self.create_form.name.clone(),
            batch_id: self.create_form.id.clone(),
            description: if self.create_form.description.trim().is_empty() {
                None
            } else {
                Some(self.create_form.description.clone())
            },
            orcid: identity.orcid,
            project,
        };
        // The resolver re-validates, but catching it here keeps the dialog open
        // with a message instead of bouncing through the backend.
        if request.batch_name.trim().is_empty() || request.batch_id.trim().is_empty() {
            self.set_error("batch name and identifier are required");
            return;
        }
        self.resume(BatchDecision::Create(request));
    }

    fn update_batch_select(&mut self, action: Action) {
        let candidates = self.candidate_count();
        match action {
            Action::MoveUp => self.select_cursor = self.select_cursor.saturating_sub(1),
            Action::MoveDown => {
                self.select_cursor = (self.select_cursor + 1).min(candidates.saturating_sub(1));
            }
            Action::Confirm => {
                let chosen = self.pending.as_ref().and_then(|pending| {
                    match pending.resolution() {
                        BatchResolution::MultipleMatches { matches } => matches
                            .get(self.select_cursor)
                            .map(|m| m.unique_id.clone()),
                        _ => None,
                    }
                });
                if let Some(unique_id) = chosen {
                    self.resume(BatchDecision::Select { unique_id });
                }
            }
            Action::SkipLinkage => self.resume(BatchDecision::Skip),
            Action::Back => self.abort_pending(),
            _ => {}
        }
    }

    pub fn candidate_count(&self) -> usize {
        match self.pending.as_ref().map(PendingDecision::resolution) {
            Some(BatchResolution::MultipleMatches { matches }) => matches.len(),
            _ => 0,
        }
    }

    fn resume(&mut self, decision: BatchDecision) {
        if self.busy {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };
        self.busy = true;
        self.set_status("resuming submission…");
        self.send(BackendCommand::Resume { pending, decision });
    }

    /// Synchronous cancellation: drop the pending payload, no network call.
    fn abort_pending(&mut self) {
        self.pending = None;
        self.screen = Screen::Form;
        self.input_mode = InputMode::Normal;
        self.set_status("submission cancelled; nothing uploaded");
    }

    fn update_summary(&mut self, action: Action) {
        if matches!(action, Action::Confirm | Action::Back) {
            self.summary = None;
            self.screen = Screen::Form;
        }
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::LoginSucceeded {
                user,
                session_token,
            } => {
                self.identity = Some(user);
                self.session_token = session_token;
                self.set_status("fetching field schemas…");
                self.send(BackendCommand::FetchFields);
            }
            BackendEvent::LoginDenied { message } => {
                self.busy = false;
                self.set_error(message);
            }
            BackendEvent::FieldsFetched { schemas } => {
                self.busy = false;
                self.synthesis_types = schemas.keys().cloned().collect();
                self.schemas = schemas;
                self.synthesis_idx = 0;
                self.project_idx = 0;
                self.rebuild_table();
                self.input_mode = InputMode::Normal;
                self.screen = Screen::Form;
                self.set_status("signed in; paste or add rows, Enter submits");
            }
            BackendEvent::FieldsFetchFailed { message } => {
                // Land on the form anyway; Enter re-requests the schemas.
                self.busy = false;
                self.input_mode = InputMode::Normal;
                self.screen = Screen::Form;
                self.set_error(message);
            }
            BackendEvent::DecisionNeeded { pending } => {
                self.busy = false;
                self.input_mode = InputMode::Normal;
                match pending.resolution() {
                    BatchResolution::NotFound { input } => {
                        self.create_form = CreateBatchForm {
                            name: input.clone(),
                            id: input.clone(),
                            description: String::new(),
                            focus: 0,
                        };
                        self.screen = Screen::BatchNotFound;
                    }
                    BatchResolution::MultipleMatches { .. } => {
                        self.select_cursor = 0;
                        self.screen = Screen::BatchSelect;
                    }
                    BatchResolution::Resolved { .. } => {
                        // Unambiguous resolutions never suspend.
                        warn!("resolved outcome delivered as a pending decision");
                    }
                }
                self.pending = Some(pending);
            }
            BackendEvent::UploadComplete { receipt } => {
                self.busy = false;
                self.pending = None;
                self.summary = Some(receipt);
                self.screen = Screen::Summary;
                // Fresh table for the next entry session.
                self.batch_id_text.clear();
                self.rebuild_table();
            }
            BackendEvent::SubmissionFailed { message } => {
                // Entered data survives: the table was never mutated.
                self.busy = false;
                self.pending = None;
                self.screen = if self.identity.is_some() {
                    Screen::Form
                } else {
                    Screen::Login
                };
                self.set_error(message);
            }
        }
    }
}

fn cycle_index(current: usize, count: usize, forward: bool) -> usize {
    if count == 0 {
        return 0;
    }
    if forward {
        (current + 1) % count
    } else {
        (current + count - 1) % count
    }
}
