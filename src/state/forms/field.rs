//! Form field value objects

use serde_json::Value;

/// One entry of a checkbox group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Type-safe field values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Text rendered masked (passwords)
    Secret(String),
    /// Sim/Não radio pair
    Toggle(bool),
    /// Multi-select checkbox group
    Choices(Vec<ChoiceOption>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Represents a single form field with its configuration and value
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub value: FieldValue,
    /// Validation message shown beneath the input
    pub error: Option<String>,
    /// Whether the value is part of the submitted record
    pub persisted: bool,
    /// Highlighted option inside a checkbox group
    pub choice_cursor: usize,
    initial: FieldValue,
}

impl FormField {
    fn with_value(name: &str, label: &str, value: FieldValue) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            initial: value.clone(),
            value,
            error: None,
            persisted: true,
            choice_cursor: 0,
        }
    }

    /// Create a new text field
    pub fn text(name: &str, label: &str) -> Self {
        Self::with_value(name, label, FieldValue::Text(String::new()))
    }

    /// Create a new masked text field
    pub fn secret(name: &str, label: &str) -> Self {
        Self::with_value(name, label, FieldValue::Secret(String::new()))
    }

    /// Create a new Sim/Não field
    pub fn toggle(name: &str, label: &str, default: bool) -> Self {
        Self::with_value(name, label, FieldValue::Toggle(default))
    }

    /// Create a new checkbox group from `(value, label)` pairs
    pub fn choices(name: &str, label: &str, options: &[(&'static str, &'static str)]) -> Self {
        let options = options
            .iter()
            .map(|&(value, label)| ChoiceOption {
                value,
                label,
                selected: false,
            })
            .collect();
        Self::with_value(name, label, FieldValue::Choices(options))
    }

    /// Exclude this field from the submitted record
    pub fn transient(mut self) -> Self {
        self.persisted = false;
        self
    }

    /// True for fields edited by typing characters
    pub fn is_text_input(&self) -> bool {
        matches!(self.value, FieldValue::Text(_) | FieldValue::Secret(_))
    }

    /// Get the text value (returns empty string for toggles and groups)
    pub fn as_text(&self) -> &str {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => s,
            FieldValue::Toggle(_) | FieldValue::Choices(_) => "",
        }
    }

    /// Values of the selected options of a checkbox group
    pub fn selected_choices(&self) -> Vec<&'static str> {
        match &self.value {
            FieldValue::Choices(options) => options
                .iter()
                .filter(|o| o.selected)
                .map(|o| o.value)
                .collect(),
            _ => Vec::new(),
        }
    }

    /// String form of the value, as seen by the schema and the field store
    pub fn value_string(&self) -> String {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => s.clone(),
            FieldValue::Toggle(b) => b.to_string(),
            FieldValue::Choices(_) => self.selected_choices().join(","),
        }
    }

    /// Overwrite the value from its string form.
    ///
    /// Returns false when the string does not fit the field kind.
    pub fn set_from_str(&mut self, value: &str) -> bool {
        match &mut self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => {
                *s = value.to_string();
            }
            FieldValue::Toggle(b) => match value {
                "true" => *b = true,
                "false" => *b = false,
                _ => return false,
            },
            FieldValue::Choices(options) => {
                let wanted: Vec<&str> = value.split(',').filter(|v| !v.is_empty()).collect();
                if wanted
                    .iter()
                    .any(|w| !options.iter().any(|o| o.value == *w))
                {
                    return false;
                }
                for option in options.iter_mut() {
                    option.selected = wanted.contains(&option.value);
                }
            }
        }
        self.error = None;
        true
    }

    /// Push a character to the field value
    pub fn push_char(&mut self, c: char) {
        if let FieldValue::Text(s) | FieldValue::Secret(s) = &mut self.value {
            s.push(c);
            self.error = None;
        }
    }

    /// Remove the last character from the field value
    pub fn pop_char(&mut self) {
        if let FieldValue::Text(s) | FieldValue::Secret(s) = &mut self.value {
            s.pop();
            self.error = None;
        }
    }

    /// Flip a toggle, or the highlighted option of a checkbox group
    pub fn toggle_value(&mut self) {
        match &mut self.value {
            FieldValue::Toggle(b) => *b = !*b,
            FieldValue::Choices(options) => {
                if let Some(option) = options.get_mut(self.choice_cursor) {
                    option.selected = !option.selected;
                }
            }
            FieldValue::Text(_) | FieldValue::Secret(_) => return,
        }
        self.error = None;
    }

    /// Move the highlighted option of a checkbox group, wrapping around
    pub fn move_choice_cursor(&mut self, forward: bool) {
        if let FieldValue::Choices(options) = &self.value {
            let count = options.len();
            if count == 0 {
                return;
            }
            self.choice_cursor = if forward {
                (self.choice_cursor + 1) % count
            } else if self.choice_cursor == 0 {
                count - 1
            } else {
                self.choice_cursor - 1
            };
        }
    }

    /// Restore the value the field was created with
    pub fn reset(&mut self) {
        self.value = self.initial.clone();
        self.error = None;
        self.choice_cursor = 0;
    }

    /// JSON form of the value for the submitted record
    pub fn to_json(&self) -> Value {
        match &self.value {
            FieldValue::Text(s) | FieldValue::Secret(s) => Value::String(s.clone()),
            FieldValue::Toggle(b) => Value::Bool(*b),
            FieldValue::Choices(_) => Value::Array(
                self.selected_choices()
                    .into_iter()
                    .map(|v| Value::String(v.to_string()))
                    .collect(),
            ),
        }
    }

    /// Get the display value for rendering
    pub fn display_value(&self) -> String {
        match &self.value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Secret(s) => "•".repeat(s.chars().count()),
            FieldValue::Toggle(true) => "(•) Sim  ( ) Não".to_string(),
            FieldValue::Toggle(false) => "( ) Sim  (•) Não".to_string(),
            FieldValue::Choices(options) => options
                .iter()
                .map(|o| format!("[{}] {}", if o.selected { "x" } else { " " }, o.label))
                .collect::<Vec<_>>()
                .join("  "),
        }
    }
}
