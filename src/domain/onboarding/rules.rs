//! Static per-field validation rules applied by the step engine
//!
//! Rules cover what a single submission can prove about itself. Checks
//! that need the session or the entity store (verification codes,
//! organization existence) are step checks, not field rules.

use std::collections::{BTreeMap, HashMap};

use validator::ValidateEmail;

/// Field name mapped to the messages it failed with, ordered for stable
/// responses
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// A single constraint on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// Present and non-empty
    Required,
    /// Syntactically valid e-mail address
    Email,
    /// At most this many characters
    MaxLength(usize),
    /// At least this many characters
    MinLength(usize),
    /// Must equal the `<field>_confirmation` companion field
    Confirmed,
}

/// The rule set owned by one field of one step
#[derive(Debug, Clone)]
pub struct FieldRules {
    field: &'static str,
    rules: Vec<FieldRule>,
}

impl FieldRules {
    pub fn new(field: &'static str) -> Self {
        Self {
            field,
            rules: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.rules.push(FieldRule::Required);
        self
    }

    pub fn email(mut self) -> Self {
        self.rules.push(FieldRule::Email);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.rules.push(FieldRule::MaxLength(max));
        self
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.rules.push(FieldRule::MinLength(min));
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.rules.push(FieldRule::Confirmed);
        self
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Messages this field fails with for the given submission
    ///
    /// Apart from `Required`, rules are skipped for absent or empty
    /// values so a missing optional field does not cascade errors.
    fn apply(&self, fields: &HashMap<String, String>) -> Vec<String> {
        let value = fields.get(self.field).map(String::as_str).unwrap_or("");
        let label = self.field.replace('_', " ");
        let mut messages = Vec::new();

        for rule in &self.rules {
            match rule {
                FieldRule::Required => {
                    if value.trim().is_empty() {
                        messages.push(format!("The {} field is required.", label));
                    }
                }
                FieldRule::Email => {
                    if !value.is_empty() && !value.validate_email() {
                        messages.push(format!("The {} must be a valid email address.", label));
                    }
                }
                FieldRule::MaxLength(max) => {
                    if value.chars().count() > *max {
                        messages.push(format!(
                            "The {} may not be greater than {} characters.",
                            label, max
                        ));
                    }
                }
                FieldRule::MinLength(min) => {
                    if !value.is_empty() && value.chars().count() < *min {
                        messages.push(format!(
                            "The {} must be at least {} characters.",
                            label, min
                        ));
                    }
                }
                FieldRule::Confirmed => {
                    let companion = format!("{}_confirmation", self.field);
                    let confirmation =
                        fields.get(&companion).map(String::as_str).unwrap_or("");

                    if !value.is_empty() && value != confirmation {
                        messages.push(format!("The {} confirmation does not match.", label));
                    }
                }
            }
        }

        messages
    }
}

/// Apply a step's whole rule set to one submission
pub fn validate_fields(
    rule_set: &[FieldRules],
    fields: &HashMap<String, String>,
) -> FieldErrors {
    let mut errors = FieldErrors::new();

    for rules in rule_set {
        let messages = rules.apply(fields);
        if !messages.is_empty() {
            errors.insert(rules.field().to_string(), messages);
        }
    }

    errors
}
