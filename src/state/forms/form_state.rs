//! Registration form state

use super::autofill::{
    AddressFields, AutofillController, AutofillOutcome, LookupCompletion, LookupRequest,
    OrderingPolicy,
};
use super::field::FormField;
use super::schema::{FieldError, Schema};
use std::sync::atomic::{AtomicU64, Ordering};

/// Submitted record: field name to JSON value
pub type Record = serde_json::Map<String, serde_json::Value>;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Identity of one opened form, used to route lookup completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

/// Read/write access to field values by name
pub trait FieldValueStore {
    fn value(&self, name: &str) -> Option<String>;
    /// Overwrite a field; returns false when no such field exists
    fn set_value(&mut self, name: &str, value: &str) -> bool;
    fn all_values(&self) -> Record;
}

/// Trait for common form navigation
pub trait Form {
    fn field_count(&self) -> usize;
    fn active_field(&self) -> usize;
    fn set_active_field(&mut self, index: usize);
    fn next_index(&self) -> usize {
        (self.active_field() + 1) % self.field_count()
    }
    fn prev_index(&self) -> usize {
        let current = self.active_field();
        if current == 0 {
            self.field_count() - 1
        } else {
            current - 1
        }
    }
    fn get_field(&self, index: usize) -> Option<&FormField>;
}

/// The two registration forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Club,
    Sponsor,
}

impl FormKind {
    pub const ALL: [FormKind; 2] = [FormKind::Club, FormKind::Sponsor];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Club => "Cadastrar Clube",
            Self::Sponsor => "Cadastrar Patrocinador",
        }
    }

    /// Document store collection receiving the records
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Club => "club",
            Self::Sponsor => "sponsor",
        }
    }

    pub fn address_fields(&self) -> AddressFields {
        let street = match self {
            Self::Club => "street",
            Self::Sponsor => "address",
        };
        AddressFields {
            postal_code: "zipCode",
            city: "city",
            neighborhood: "neighborhood",
            street,
            state: "state",
        }
    }

    /// Whether a successful submit clears the form
    pub fn resets_after_submit(&self) -> bool {
        matches!(self, Self::Club)
    }

    pub fn schema(&self) -> Schema {
        match self {
            Self::Club => Schema::club(),
            Self::Sponsor => Schema::sponsor(),
        }
    }

    fn build_fields(&self) -> Vec<FormField> {
        match self {
            Self::Club => vec![
                FormField::text("name", "Nome do Clube"),
                FormField::text("email", "Email"),
                FormField::text("taxId", "CPF / CNPJ"),
                FormField::secret("password", "Senha"),
                FormField::secret("confirmPassword", "Confirmação Senha").transient(),
                FormField::text("zipCode", "CEP"),
                FormField::text("street", "Endereço"),
                FormField::text("number", "Nº"),
                FormField::text("neighborhood", "Bairro"),
                FormField::text("state", "Estado"),
                FormField::text("city", "Cidade"),
                FormField::text("foundationDate", "Data de Fundação"),
                FormField::text("zone", "Região / Zona"),
                FormField::text("clubColors", "Cores do Clube"),
                FormField::text("instagram", "Instagram"),
                FormField::text("facebook", "Facebook"),
                FormField::text("nameContact", "Nome do Contato"),
                FormField::text("phoneContact", "Telefone"),
                FormField::toggle("ownField", "Campo Próprio?", false),
                FormField::toggle("wantSponsorship", "Deseja receber Patrocinio?", true),
                FormField::toggle("isSponsorship", "Tem Patrocinio?", false),
                FormField::text("endDate", "Término do Patrocinio"),
            ],
            Self::Sponsor => vec![
                FormField::text("fullname", "Nome do Patrocinador"),
                FormField::text("email", "Email"),
                FormField::text("taxId", "CPF / CNPJ"),
                FormField::secret("password", "Senha"),
                FormField::secret("confirmPassword", "Confirmação Senha").transient(),
                FormField::text("zipCode", "CEP"),
                FormField::text("address", "Endereço"),
                FormField::text("number", "Nº"),
                FormField::text("neighborhood", "Bairro"),
                FormField::text("state", "Estado"),
                FormField::text("city", "Cidade"),
                FormField::text("contactName", "Nome do Contato"),
                FormField::text("contactPhone", "Telefone"),
                FormField::toggle("wantsToSponsor", "Quer patrocinar?", false),
                FormField::choices(
                    "teams",
                    "Quantidade de times à patrocinar",
                    &[
                        ("juvenil", "Juvenil"),
                        ("sport", "Sport"),
                        ("veterano", "Veterano"),
                        ("feminino", "Feminino"),
                    ],
                ),
                FormField::choices(
                    "sponsorshipTypes",
                    "Tipo de Patrocínio",
                    &[
                        ("manga", "Manga"),
                        ("frente", "Frente"),
                        ("costa", "Costa"),
                        ("doacaoProdutos", "Doação de produtos"),
                        ("dinheiro", "Dinheiro em espécie"),
                        ("outroTipo", "Outro tipo"),
                    ],
                ),
                FormField::text("otherSponsorshipType", "Outro tipo:"),
            ],
        }
    }
}

/// Ordered fields of a form, addressable by name
#[derive(Debug, Clone)]
pub struct FieldSet {
    fields: Vec<FormField>,
}

impl FieldSet {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn get(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut FormField> {
        self.fields.get_mut(index)
    }

    pub fn by_name(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormField> {
        self.fields.iter()
    }

    fn reset(&mut self) {
        self.fields.iter_mut().for_each(FormField::reset);
    }

    fn clear_errors(&mut self) {
        for field in &mut self.fields {
            field.error = None;
        }
    }
}

impl FieldValueStore for FieldSet {
    fn value(&self, name: &str) -> Option<String> {
        self.by_name(name).map(FormField::value_string)
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        self.by_name_mut(name)
            .is_some_and(|field| field.set_from_str(value))
    }

    fn all_values(&self) -> Record {
        self.fields
            .iter()
            .filter(|f| f.persisted)
            .map(|f| (f.name.clone(), f.to_json()))
            .collect()
    }
}

/// A registration form being filled in
#[derive(Debug, Clone)]
pub struct RegistrationForm {
    pub kind: FormKind,
    pub id: FormId,
    pub fields: FieldSet,
    pub active_field_index: usize,
    /// Which button is selected when on the buttons row (0=Cadastrar, 1=Cancelar)
    pub selected_button: usize,
    pub autofill: AutofillController,
}

impl RegistrationForm {
    pub const BUTTON_COUNT: usize = 2;

    pub fn new(kind: FormKind, policy: OrderingPolicy) -> Self {
        let id = FormId::next();
        Self {
            kind,
            id,
            fields: FieldSet::new(kind.build_fields()),
            active_field_index: 0,
            selected_button: 0,
            autofill: AutofillController::new(id, kind.address_fields(), policy),
        }
    }

    /// Index of the buttons row (one past the last field)
    pub fn buttons_row(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the buttons row is currently active
    pub fn is_buttons_row_active(&self) -> bool {
        self.active_field_index == self.buttons_row()
    }

    /// Move to the next button (wraps around)
    pub fn next_button(&mut self) {
        self.selected_button = (self.selected_button + 1) % Self::BUTTON_COUNT;
    }

    /// Move to the previous button (wraps around)
    pub fn prev_button(&mut self) {
        self.selected_button = if self.selected_button == 0 {
            Self::BUTTON_COUNT - 1
        } else {
            self.selected_button - 1
        };
    }

    pub fn active_field_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.active_field_index)
    }

    /// Move focus to `index`.
    ///
    /// When focus leaves the postal code field this is its blur, and the
    /// autofill may ask for a lookup.
    pub fn focus(&mut self, index: usize) -> Option<LookupRequest> {
        let left = self.active_field_index;
        self.set_active_field(index);
        if left == self.active_field_index {
            return None;
        }
        self.blur_field(left)
    }

    fn blur_field(&mut self, index: usize) -> Option<LookupRequest> {
        let postal = self.kind.address_fields().postal_code;
        match self.fields.get(index) {
            Some(field) if field.name == postal => {
                let raw = field.as_text().to_string();
                self.autofill.on_blur(&raw)
            }
            _ => None,
        }
    }

    /// Blur of the focused field without moving focus, as happens on submit
    pub fn blur_active(&mut self) -> Option<LookupRequest> {
        self.blur_field(self.active_field_index)
    }

    pub fn focus_next(&mut self) -> Option<LookupRequest> {
        self.focus(self.next_index())
    }

    pub fn focus_prev(&mut self) -> Option<LookupRequest> {
        self.focus(self.prev_index())
    }

    /// Route a finished lookup into the autofill of this form
    pub fn apply_lookup(&mut self, completion: LookupCompletion) -> AutofillOutcome {
        self.autofill.apply(completion, &mut self.fields)
    }

    /// Run the schema, attach messages to fields, and focus the first invalid one
    pub fn validate(&mut self) -> Vec<FieldError> {
        self.fields.clear_errors();
        let errors = self.kind.schema().validate(&self.fields);
        for error in &errors {
            if let Some(field) = self.fields.by_name_mut(&error.field) {
                field.error = Some(error.message.clone());
            }
        }
        if let Some(index) = errors
            .first()
            .and_then(|first| self.fields.position(&first.field))
        {
            self.active_field_index = index;
        }
        errors
    }

    /// Record to persist, excluding transient fields
    pub fn record(&self) -> Record {
        self.fields.all_values()
    }

    /// Restore every field to its default and drop pending autofills
    pub fn reset(&mut self) {
        self.fields.reset();
        self.active_field_index = 0;
        self.selected_button = 0;
        self.autofill.invalidate();
    }
}

impl FieldValueStore for RegistrationForm {
    fn value(&self, name: &str) -> Option<String> {
        self.fields.value(name)
    }

    fn set_value(&mut self, name: &str, value: &str) -> bool {
        self.fields.set_value(name, value)
    }

    fn all_values(&self) -> Record {
        self.fields.all_values()
    }
}

impl Form for RegistrationForm {
    fn field_count(&self) -> usize {
        self.fields.len() + 1 // fields + buttons row
    }
    fn active_field(&self) -> usize {
        self.active_field_index
    }
    fn set_active_field(&mut self, index: usize) {
        self.active_field_index = index.min(self.buttons_row());
    }
    fn get_field(&self, index: usize) -> Option<&FormField> {
        self.fields.get(index)
    }
}
