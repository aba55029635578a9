use crate::catalog::{FieldType, FormField};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("required field '{0}' is missing")]
    MissingField(String),
    #[error("field '{field}' is not a number: '{value}'")]
    NotANumber { field: String, value: String },
    #[error("field '{field}' is out of range ({min:?}..{max:?})")]
    OutOfRange {
        field: String,
        min: Option<u64>,
        max: Option<u64>,
    },
    #[error("field '{0}' does not match the required pattern")]
    PatternMismatch(String),
    #[error("field '{field}' declares an invalid pattern: {source}")]
    BadPattern {
        field: String,
        source: regex::Error,
    },
    #[error("field '{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("field '{0}' is not a valid http(s) URL")]
    InvalidUrl(String),
    #[error("field '{0}' must be 'true' or 'false'")]
    InvalidBoolean(String),
}

/// User-submitted answers and exposure flags for one install or
/// reconfiguration. This is the `form` payload carried on dispatched
/// events, so the worker can regenerate artifacts from not-yet-persisted
/// input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppForm {
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default)]
    pub exposed: bool,
    #[serde(default)]
    pub exposed_local: bool,
    #[serde(default)]
    pub open_port: bool,
    #[serde(default)]
    pub enable_auth: bool,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub is_visible_on_guest_dashboard: bool,
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap())
}

/// Validate form answers against a catalog entry's declared fields.
///
/// `min`/`max` bound the numeric value for number fields and the length
/// for everything else. Optional fields left blank are skipped entirely.
pub fn validate_form(
    answers: &BTreeMap<String, String>,
    fields: &[FormField],
) -> Result<(), FormError> {
    for field in fields {
        let value = answers.get(&field.env_variable).map(String::as_str);
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            if field.required {
                return Err(FormError::MissingField(field.env_variable.clone()));
            }
            continue;
        };

        match field.kind {
            FieldType::Number => {
                let parsed: u64 = value.parse().map_err(|_| FormError::NotANumber {
                    field: field.env_variable.clone(),
                    value: value.to_owned(),
                })?;
                check_range(field, parsed)?;
            }
            FieldType::Email => {
                if !email_regex().is_match(value) {
                    return Err(FormError::InvalidEmail(field.env_variable.clone()));
                }
            }
            FieldType::Url => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(FormError::InvalidUrl(field.env_variable.clone()));
                }
            }
            FieldType::Boolean => {
                if value != "true" && value != "false" {
                    return Err(FormError::InvalidBoolean(field.env_variable.clone()));
                }
            }
            FieldType::Text | FieldType::Password | FieldType::Random => {
                check_range(field, value.len() as u64)?;
            }
        }

        if let Some(pattern) = &field.pattern {
            let re = Regex::new(pattern).map_err(|source| FormError::BadPattern {
                field: field.env_variable.clone(),
                source,
            })?;
            if !re.is_match(value) {
                return Err(FormError::PatternMismatch(field.env_variable.clone()));
            }
        }
    }
    Ok(())
}

fn check_range(field: &FormField, value: u64) -> Result<(), FormError> {
    let below = field.min.is_some_and(|min| value < min);
    let above = field.max.is_some_and(|max| value > max);
    if below || above {
        return Err(FormError::OutOfRange {
            field: field.env_variable.clone(),
            min: field.min,
            max: field.max,
        });
    }
    Ok(())
}
