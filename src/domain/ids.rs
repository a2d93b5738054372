//! Validated identifiers for learners, categories and scenarios

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::badges::BadgeError;

/// Reject empty, whitespace-only and control-character ids
fn validate(field: &'static str, raw: &str) -> Result<(), BadgeError> {
    if raw.trim().is_empty() {
        return Err(BadgeError::invalid(field, "must not be empty"));
    }
    if raw.chars().any(char::is_control) {
        return Err(BadgeError::invalid(field, "must not contain control characters"));
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw id
            pub fn new(raw: impl Into<String>) -> Result<Self, BadgeError> {
                let raw = raw.into();
                validate($field, &raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = BadgeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = BadgeError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a scenario category (e.g. `ethics-101`)
    CategoryId,
    "category_id"
);

string_id!(
    /// Identifier of a single scenario within a category
    ScenarioId,
    "scenario_id"
);

string_id!(
    /// Identifier of the learner whose progress is tracked
    LearnerId,
    "learner_id"
);
