//! Application state definitions

use super::forms::{FormKind, OrderingPolicy, RegistrationForm};
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Form picker
    #[default]
    Home,
    ClubForm,
    SponsorForm,
}

impl View {
    pub fn is_form_view(&self) -> bool {
        matches!(self, View::ClubForm | View::SponsorForm)
    }

    pub fn for_form(kind: FormKind) -> Self {
        match kind {
            FormKind::Club => View::ClubForm,
            FormKind::Sponsor => View::SponsorForm,
        }
    }
}

/// Main application state
#[derive(Debug, Default)]
pub struct AppState {
    // Navigation
    pub current_view: View,
    /// Highlighted entry on the home screen
    pub home_index: usize,

    // Form state
    pub form: Option<RegistrationForm>,

    // Errors waiting to be shown in the modal dialog, oldest first
    errors: VecDeque<String>,
}

impl AppState {
    /// Open a fresh form of the given kind
    pub fn open_form(&mut self, kind: FormKind, policy: OrderingPolicy) {
        self.form = Some(RegistrationForm::new(kind, policy));
        self.current_view = View::for_form(kind);
    }

    /// Drop the current form and return to the form picker
    pub fn close_form(&mut self) {
        self.form = None;
        self.current_view = View::Home;
    }

    pub fn move_home_selection(&mut self, down: bool) {
        let count = FormKind::ALL.len();
        self.home_index = if down {
            (self.home_index + 1) % count
        } else if self.home_index == 0 {
            count - 1
        } else {
            self.home_index - 1
        };
    }

    pub fn selected_home_kind(&self) -> FormKind {
        FormKind::ALL[self.home_index.min(FormKind::ALL.len() - 1)]
    }

    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }
}
