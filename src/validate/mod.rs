use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;

pub type ValidationError = String;
pub type Validator = Box<dyn Fn(&str) -> Result<(), ValidationError> + Send + Sync>;

/// Blocking alert shown when an editor's input fails its constraints.
pub const INVALID_INPUT: &str = "The input is not valid. Please provide a valid input value.";

/// Run a list of validators against `value`, returning the first error.
pub fn run_validators(validators: &[Validator], value: &str) -> Result<(), String> {
    for validator in validators {
        validator(value)?;
    }
    Ok(())
}

pub fn required(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &str| {
        if value.trim().is_empty() {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}

pub fn min_length(min_len: usize, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &str| {
        if value.chars().count() < min_len {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}

/// Whole-value pattern match. Empty values pass; pair with [`required`]
/// when emptiness should also be an error.
pub fn pattern(regex: Regex, message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &str| {
        if value.is_empty() || regex.is_match(value) {
            Ok(())
        } else {
            Err(message.clone())
        }
    })
}

/// Integer strictly greater than zero.
pub fn positive_integer(message: impl Into<String>) -> Validator {
    let message = message.into();
    Box::new(move |value: &str| match value.trim().parse::<i64>() {
        Ok(parsed) if parsed > 0 => Ok(()),
        _ => Err(message.clone()),
    })
}

/// Rejects values already taken elsewhere, compared case-insensitively.
/// `original` is the edited row's own current value and never conflicts,
/// so saving a row without changing it stays legal.
pub fn unique_among(
    taken: Vec<String>,
    original: Option<String>,
    message: impl Into<String>,
) -> Validator {
    let message = message.into();
    let original = original.map(|v| v.to_uppercase());
    let taken: Vec<String> = taken.into_iter().map(|v| v.to_uppercase()).collect();
    Box::new(move |value: &str| {
        let candidate = value.to_uppercase();
        if Some(&candidate) == original.as_ref() {
            return Ok(());
        }
        if taken.contains(&candidate) {
            Err(message.clone())
        } else {
            Ok(())
        }
    })
}

// ---------------------------------------------------------------------------
// Declarative constraints
// ---------------------------------------------------------------------------

/// Constraints as they arrive from a page manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldConstraints {
    pub required: bool,
    pub pattern: Option<String>,
    pub min: Option<i64>,
}

impl FieldConstraints {
    pub fn is_empty(&self) -> bool {
        !self.required && self.pattern.is_none() && self.min.is_none()
    }

    pub fn compile(&self) -> Result<CompiledConstraints, regex::Error> {
        let pattern = match &self.pattern {
            // The whole value must match, as with form field patterns.
            Some(raw) => Some(Regex::new(&format!("^(?:{raw})$"))?),
            None => None,
        };
        Ok(CompiledConstraints {
            required: self.required,
            pattern,
            min: self.min,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompiledConstraints {
    required: bool,
    pattern: Option<Regex>,
    min: Option<i64>,
}

impl CompiledConstraints {
    /// First violated constraint, if any. Pattern and minimum checks skip
    /// empty values; only `required` rejects emptiness.
    pub fn check(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if self.required && trimmed.is_empty() {
            return Err("A value is required.".to_string());
        }
        if trimmed.is_empty() {
            return Ok(());
        }
        if let Some(regex) = &self.pattern {
            if !regex.is_match(value) {
                return Err("The value does not match the required format.".to_string());
            }
        }
        if let Some(min) = self.min {
            match trimmed.parse::<i64>() {
                Ok(parsed) if parsed >= min => {}
                Ok(_) => return Err(format!("The value must be at least {min}.")),
                Err(_) => return Err("The value must be a whole number.".to_string()),
            }
        }
        Ok(())
    }

    pub fn is_satisfied_by(&self, value: &str) -> bool {
        self.check(value).is_ok()
    }
}

// ---------------------------------------------------------------------------
// FormValidation
// ---------------------------------------------------------------------------

/// Per-field validity of a multi-field form, recomputed as the user types.
/// The save action stays unavailable while any field is invalid.
#[derive(Debug, Default)]
pub struct FormValidation {
    fields: IndexMap<String, Option<String>>,
}

impl FormValidation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, field: impl Into<String>, result: Result<(), String>) {
        self.fields.insert(field.into(), result.err());
    }

    pub fn can_save(&self) -> bool {
        self.fields.values().all(|err| err.is_none())
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|err| err.as_deref())
    }

    pub fn first_error(&self) -> Option<(&str, &str)> {
        self.fields
            .iter()
            .find_map(|(field, err)| err.as_deref().map(|msg| (field.as_str(), msg)))
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }
}
