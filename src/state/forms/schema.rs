//! Declarative validation schema evaluated on submit

use super::form_state::FieldValueStore;
use regex::Regex;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// A single check on a field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Value must be non-empty after trimming
    Required(&'static str),
    /// Value, when present, must look like an email address
    Email(&'static str),
    /// At least this many characters
    MinLen(usize, &'static str),
    /// At most this many characters
    MaxLen(usize, &'static str),
    /// Value must equal the value of another field
    Matches(&'static str, &'static str),
}

impl Rule {
    fn check(&self, value: &str, store: &dyn FieldValueStore) -> Result<(), &'static str> {
        let ok = match self {
            Rule::Required(_) => !value.trim().is_empty(),
            Rule::Email(_) => value.is_empty() || EMAIL_PATTERN.is_match(value),
            Rule::MinLen(min, _) => value.chars().count() >= *min,
            Rule::MaxLen(max, _) => value.chars().count() <= *max,
            Rule::Matches(other, _) => store.value(other).unwrap_or_default() == value,
        };
        if ok {
            Ok(())
        } else {
            Err(self.message())
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Rule::Required(m)
            | Rule::Email(m)
            | Rule::MinLen(_, m)
            | Rule::MaxLen(_, m)
            | Rule::Matches(_, m) => m,
        }
    }
}

/// A failed rule, attached to the field it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Ordered rule lists keyed by field name
#[derive(Debug, Clone, Default)]
pub struct Schema {
    entries: Vec<(&'static str, Vec<Rule>)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rules for a field (builder style)
    pub fn field(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.entries.push((name, rules));
        self
    }

    /// Schema of the club registration form
    pub fn club() -> Self {
        Self::new()
            .field("name", vec![Rule::Required("Nome do Clube é obrigatório")])
            .field("email", email_rules())
            .field("taxId", vec![Rule::Required("CPF/CNPJ é obrigatório")])
            .field("password", password_rules())
            .field(
                "confirmPassword",
                vec![Rule::Matches("password", PASSWORD_MISMATCH)],
            )
            .field("zipCode", vec![Rule::Required("CEP é obrigatório")])
            .field("street", vec![Rule::Required("Endereço é obrigatório")])
            .field("number", vec![Rule::Required("Número é obrigatório")])
            .field("neighborhood", vec![Rule::Required("Bairro é obrigatório")])
            .field("state", vec![Rule::Required("Estado é obrigatório")])
            .field("city", vec![Rule::Required("Cidade é obrigatório")])
    }

    /// Schema of the sponsor registration form
    pub fn sponsor() -> Self {
        Self::new()
            .field(
                "fullname",
                vec![Rule::Required("Nome do Patrocinador é obrigatório")],
            )
            .field("email", email_rules())
            .field("taxId", vec![Rule::Required("CPF/CNPJ é obrigatório")])
            .field("password", password_rules())
            .field(
                "confirmPassword",
                vec![
                    Rule::Required("Confirmação de senha é obrigatório"),
                    Rule::Matches("password", PASSWORD_MISMATCH),
                ],
            )
            .field("zipCode", vec![Rule::Required("CEP é obrigatório")])
            .field("address", vec![Rule::Required("Endereço é obrigatório")])
            .field("number", vec![Rule::Required("Número é obrigatório")])
            .field("neighborhood", vec![Rule::Required("Bairro é obrigatório")])
            .field("state", vec![Rule::Required("Estado é obrigatório")])
            .field("city", vec![Rule::Required("Cidade é obrigatório")])
    }

    /// Evaluate every field; only the first failing rule of a field is reported
    pub fn validate(&self, store: &dyn FieldValueStore) -> Vec<FieldError> {
        self.entries
            .iter()
            .filter_map(|(name, rules)| {
                let value = store.value(name).unwrap_or_default();
                rules
                    .iter()
                    .find_map(|rule| rule.check(&value, store).err())
                    .map(|message| FieldError {
                        field: name.to_string(),
                        message: message.to_string(),
                    })
            })
            .collect()
    }
}

const PASSWORD_MISMATCH: &str = "Senhas não são iguais";

fn email_rules() -> Vec<Rule> {
    vec![
        Rule::Required("Email é obrigatório"),
        Rule::Email("Email está inválido"),
    ]
}

fn password_rules() -> Vec<Rule> {
    vec![
        Rule::Required("Senha é obrigatório"),
        Rule::MinLen(6, "A senha deve ter pelo menos 6 caracteres"),
        Rule::MaxLen(40, "A senha não deve ter mais de 40 caracteres"),
    ]
}
