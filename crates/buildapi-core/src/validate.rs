// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Input validation composed in front of an implementation body.
//!
//! Requirements address fields with dotted paths (`"build_target.name"`) over
//! the message's JSON view. A field counts as set when it differs from its
//! default: non-empty strings and lists, non-zero numbers, `true`, and objects
//! with at least one set field.

use crate::message::DynMessage;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// One check applied to an input message.
#[derive(Debug, Clone, PartialEq)]
enum Requirement {
    /// Every listed field must be set.
    Require(Vec<String>),
    /// At least one listed field must be set.
    RequireAny(Vec<String>),
    /// The field's value must be one of `values`.
    IsIn {
        /// Field path.
        field: String,
        /// Allowed values.
        values: Vec<Value>,
    },
    /// Every listed field must name a path that exists on disk.
    Exists(Vec<String>),
}

/// The input failed a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is unset.
    #[error("{field} is required")]
    Missing {
        /// Field path.
        field: String,
    },
    /// None of a group of fields is set.
    #[error("at least one of {fields} is required")]
    NoneSet {
        /// Comma-separated field paths.
        fields: String,
    },
    /// The field holds a value outside the allowed set.
    #[error("{field} has value {value}, expected one of {allowed}")]
    NotAllowed {
        /// Field path.
        field: String,
        /// Actual value, as JSON.
        value: String,
        /// Allowed values, as JSON.
        allowed: String,
    },
    /// The field names a path that does not exist.
    #[error("{field} path {path} does not exist")]
    PathMissing {
        /// Field path.
        field: String,
        /// Filesystem path from the field.
        path: String,
    },
    /// The message could not be inspected.
    #[error("could not inspect input: {0}")]
    Inspect(String),
}

/// Ordered list of requirements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validation {
    requirements: Vec<Requirement>,
}

impl Validation {
    /// A validation with no requirements.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require every field in `fields`.
    pub fn require(mut self, fields: &[&str]) -> Self {
        self.requirements.push(Requirement::Require(owned(fields)));
        self
    }

    /// Require at least one field in `fields`.
    pub fn require_any(mut self, fields: &[&str]) -> Self {
        self.requirements.push(Requirement::RequireAny(owned(fields)));
        self
    }

    /// Restrict `field` to `values`.
    pub fn is_in<V: Into<Value>>(
        mut self,
        field: &str,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.requirements.push(Requirement::IsIn {
            field: field.to_owned(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Require every field in `fields` to name an existing path.
    pub fn exists(mut self, fields: &[&str]) -> Self {
        self.requirements.push(Requirement::Exists(owned(fields)));
        self
    }

    /// Check `input` against every requirement, stopping at the first failure.
    pub fn check(&self, input: &dyn DynMessage) -> Result<(), ValidationError> {
        let json = input
            .to_json()
            .map_err(|e| ValidationError::Inspect(e.to_string()))?;
        self.requirements.iter().try_for_each(|req| check_one(req, &json))
    }
}

fn owned(fields: &[&str]) -> Vec<String> {
    fields.iter().map(|f| (*f).to_owned()).collect()
}

fn check_one(requirement: &Requirement, json: &Value) -> Result<(), ValidationError> {
    match requirement {
        Requirement::Require(fields) => {
            if let Some(field) = fields.iter().find(|f| !is_set(lookup(json, f))) {
                return Err(ValidationError::Missing { field: field.clone() });
            }
        }
        Requirement::RequireAny(fields) => {
            if !fields.iter().any(|f| is_set(lookup(json, f))) {
                return Err(ValidationError::NoneSet {
                    fields: fields.join(", "),
                });
            }
        }
        Requirement::IsIn { field, values } => {
            let value = lookup(json, field).cloned().unwrap_or(Value::Null);
            if !values.contains(&value) {
                return Err(ValidationError::NotAllowed {
                    field: field.clone(),
                    value: value.to_string(),
                    allowed: Value::Array(values.clone()).to_string(),
                });
            }
        }
        Requirement::Exists(fields) => {
            for field in fields {
                let path = lookup(json, field).and_then(Value::as_str).unwrap_or_default();
                if path.is_empty() || !Path::new(path).exists() {
                    return Err(ValidationError::PathMissing {
                        field: field.clone(),
                        path: path.to_owned(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn lookup<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(json, |node, key| node.get(key))
}

fn is_set(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(fields)) => fields.values().any(|v| is_set(Some(v))),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::message::Message;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Target {
        name: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(default)]
    struct Bundle {
        build_target: Target,
        output_dir: String,
        compression: String,
        jobs: u32,
    }

    impl Message for Bundle {
        const FULL_NAME: &'static str = "test.Bundle";
    }

    fn bundle(name: &str, output_dir: &str) -> Bundle {
        Bundle {
            build_target: Target { name: name.into() },
            output_dir: output_dir.into(),
            ..Bundle::default()
        }
    }

    #[test]
    fn require_checks_nested_fields() {
        let validation = Validation::new().require(&["build_target.name", "output_dir"]);
        assert!(validation.check(&bundle("eve", "/tmp")).is_ok());
        assert_eq!(
            validation.check(&bundle("", "/tmp")),
            Err(ValidationError::Missing {
                field: "build_target.name".into()
            })
        );
    }

    #[test]
    fn require_any_needs_one_field() {
        let validation = Validation::new().require_any(&["build_target.name", "jobs"]);
        assert!(validation.check(&bundle("eve", "")).is_ok());
        let err = validation.check(&Bundle::default()).unwrap_err();
        assert_eq!(err.to_string(), "at least one of build_target.name, jobs is required");
    }

    #[test]
    fn is_in_restricts_values() {
        let validation = Validation::new().is_in("compression", ["", "xz", "gz"]);
        assert!(validation.check(&Bundle::default()).is_ok());
        let bad = Bundle {
            compression: "zip".into(),
            ..Bundle::default()
        };
        assert!(matches!(
            validation.check(&bad),
            Err(ValidationError::NotAllowed { ref field, .. }) if field == "compression"
        ));
    }

    #[test]
    fn exists_checks_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().to_str().unwrap().to_owned();
        let validation = Validation::new().exists(&["output_dir"]);
        assert!(validation.check(&bundle("eve", &present)).is_ok());

        let missing = dir.path().join("nope").to_str().unwrap().to_owned();
        assert!(matches!(
            validation.check(&bundle("eve", &missing)),
            Err(ValidationError::PathMissing { .. })
        ));
        assert!(validation.check(&bundle("eve", "")).is_err());
    }

    #[test]
    fn first_failure_wins() {
        let validation = Validation::new().require(&["output_dir"]).require(&["build_target.name"]);
        assert_eq!(
            validation.check(&Bundle::default()),
            Err(ValidationError::Missing {
                field: "output_dir".into()
            })
        );
    }
}
