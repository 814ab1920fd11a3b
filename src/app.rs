//! Application state and core logic

use crate::config::SignupConfig;
use crate::lookup::{PostalLookup, ViaCepClient};
use crate::state::forms::{
    AutofillOutcome, FieldValue, FormField, LookupCompletion, LookupRequest, OrderingPolicy, Record,
};
use crate::state::{AppState, View};
use crate::store::{self, RecordStore};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Results of background work, applied on the UI loop
#[derive(Debug)]
pub enum AppEvent {
    /// A postal lookup finished
    Lookup(LookupCompletion),
    /// A submitted record reached the store
    Stored { collection: &'static str },
    /// A submitted record could not be stored
    StoreFailed {
        collection: &'static str,
        message: String,
    },
}

/// Behavior switches taken from the configuration
#[derive(Debug, Clone, Copy)]
pub struct AppOptions {
    pub ordering: OrderingPolicy,
    pub report_lookup_failures: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            ordering: OrderingPolicy::default(),
            report_lookup_failures: true,
        }
    }
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Postal code lookup service
    lookup: Arc<dyn PostalLookup>,
    /// Destination of submitted records
    store: Arc<dyn RecordStore>,
    options: AppOptions,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    /// Whether the app should quit
    quit: bool,
    /// Message shown in the status bar until the next key press
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance from the user configuration
    pub fn new(config: &SignupConfig) -> Result<Self> {
        let lookup = ViaCepClient::new(config.viacep_url(), config.request_timeout())?;
        let store = store::from_config(config)?;
        tracing::info!(
            viacep = config.viacep_url(),
            store = %store.describe(),
            ordering = ?config.ordering(),
            "starting"
        );
        Ok(Self::with_collaborators(
            Arc::new(lookup),
            store,
            AppOptions {
                ordering: config.ordering(),
                report_lookup_failures: config.report_lookup_failures(),
            },
        ))
    }

    pub fn with_collaborators(
        lookup: Arc<dyn PostalLookup>,
        store: Arc<dyn RecordStore>,
        options: AppOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::default(),
            lookup,
            store,
            options,
            events_tx,
            events_rx,
            quit: false,
            status_message: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    pub fn store_description(&self) -> String {
        self.store.describe()
    }

    /// Whether the open form waits for its latest postal lookup
    pub fn lookup_in_flight(&self) -> bool {
        self.state
            .form
            .as_ref()
            .is_some_and(|form| form.autofill.in_flight())
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.status_message = None;

        match self.state.current_view {
            View::Home => self.handle_home_key(key),
            View::ClubForm | View::SponsorForm => self.handle_form_key(key),
        }
        Ok(())
    }

    /// Handle keys on the form picker
    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.state.move_home_selection(false),
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
                self.state.move_home_selection(true)
            }
            KeyCode::Enter => {
                let kind = self.state.selected_home_kind();
                tracing::debug!(?kind, "opening form");
                self.state.open_form(kind, self.options.ordering);
            }
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            _ => {}
        }
    }

    /// Handle keys on a registration form
    fn handle_form_key(&mut self, key: KeyEvent) {
        if is_submit_shortcut(&key) {
            self.submit_form();
            return;
        }
        if key.code == KeyCode::Esc {
            self.state.close_form();
            return;
        }

        let Some(form) = self.state.form.as_mut() else {
            self.state.close_form();
            return;
        };

        if form.is_buttons_row_active() {
            // Button order: 0=Cadastrar, 1=Cancelar
            let request = match key.code {
                KeyCode::Tab => form.focus_next(),
                KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
                KeyCode::Left | KeyCode::Char('h') => {
                    form.prev_button();
                    None
                }
                KeyCode::Right | KeyCode::Char('l') | KeyCode::Down => {
                    form.next_button();
                    None
                }
                KeyCode::Enter => {
                    if form.selected_button == 0 {
                        self.submit_form();
                    } else {
                        self.state.close_form();
                    }
                    None
                }
                _ => None,
            };
            if let Some(request) = request {
                self.start_lookup(request);
            }
            return;
        }

        let request = match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::Enter => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            _ => {
                if let Some(field) = form.active_field_mut() {
                    edit_field(field, key);
                }
                None
            }
        };
        if let Some(request) = request {
            self.start_lookup(request);
        }
    }

    /// Run a postal lookup in the background; the completion comes back as an event
    fn start_lookup(&self, request: LookupRequest) {
        let lookup = Arc::clone(&self.lookup);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = lookup.lookup(&request.code).await;
            let _ = tx.send(AppEvent::Lookup(LookupCompletion::new(request, result)));
        });
    }

    /// Validate the open form and forward its record to the store
    fn submit_form(&mut self) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };

        // Submitting from the postal code field blurs it
        let blurred = form.blur_active();

        let errors = form.validate();
        let submitted = if errors.is_empty() {
            let kind = form.kind;
            let record = form.record();
            if kind.resets_after_submit() {
                form.reset();
            }
            Some((kind.collection(), record))
        } else {
            tracing::debug!(count = errors.len(), kind = ?form.kind, "submission blocked");
            None
        };

        if let Some(request) = blurred {
            self.start_lookup(request);
        }

        match submitted {
            Some((collection, record)) => {
                tracing::info!(collection, "submitting record");
                self.persist(collection, record);
                self.status_message = Some("Cadastro enviado!".to_string());
            }
            None => {
                self.status_message = Some(format!(
                    "Corrija os campos destacados ({})",
                    errors.len()
                ));
            }
        }
    }

    /// Fire-and-forget write to the record store
    fn persist(&self, collection: &'static str, record: Record) {
        let store = Arc::clone(&self.store);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let event = match store.add_record(collection, record).await {
                Ok(()) => AppEvent::Stored { collection },
                Err(err) => {
                    tracing::error!(collection, error = %err, "failed to store record");
                    AppEvent::StoreFailed {
                        collection,
                        message: err.to_string(),
                    }
                }
            };
            let _ = tx.send(event);
        });
    }

    /// Apply every finished background job; returns how many were applied
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            applied += 1;
        }
        applied
    }

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Lookup(completion) => {
                let Some(form) = self
                    .state
                    .form
                    .as_mut()
                    .filter(|form| form.id == completion.form)
                else {
                    tracing::debug!(code = %completion.code, "lookup finished after its form closed");
                    return;
                };
                match form.apply_lookup(completion) {
                    AutofillOutcome::Applied(_) => {
                        self.status_message = Some("Endereço preenchido pelo CEP".to_string());
                    }
                    AutofillOutcome::Superseded => {}
                    AutofillOutcome::Failed(message) => {
                        if self.options.report_lookup_failures {
                            self.status_message = Some(message.to_string());
                        }
                    }
                }
            }
            AppEvent::Stored { collection } => {
                tracing::debug!(collection, "store acknowledged record");
            }
            AppEvent::StoreFailed {
                collection,
                message,
            } => {
                tracing::warn!(collection, %message, "record was not stored");
                self.status_message = Some("Falha ao salvar cadastro".to_string());
                self.push_error(format!("Falha ao salvar cadastro ({collection}): {message}"));
            }
        }
    }
}

fn is_submit_shortcut(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('s')
        && (key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(crate::platform::SUBMIT_MODIFIER))
}

/// Apply an editing key to the focused field
fn edit_field(field: &mut FormField, key: KeyEvent) {
    // Ctrl/Alt chords are shortcuts, never text
    let plain = key.modifiers.difference(KeyModifiers::SHIFT).is_empty();
    match key.code {
        KeyCode::Char(_) if !plain => {}
        KeyCode::Char(c) if field.is_text_input() => field.push_char(c),
        KeyCode::Char(' ') => field.toggle_value(),
        KeyCode::Backspace => field.pop_char(),
        // Sim/Não pairs have two positions, so either arrow flips them
        KeyCode::Left | KeyCode::Right if matches!(field.value, FieldValue::Toggle(_)) => {
            field.toggle_value()
        }
        KeyCode::Left => field.move_choice_cursor(false),
        KeyCode::Right => field.move_choice_cursor(true),
        _ => {}
    }
}
