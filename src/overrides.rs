//! Override set validation
//!
//! Every override is checked and every failure reported, so a caller sees
//! the complete picture in one round trip. Failures come back in override
//! name order, which makes repeated runs over the same input identical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ValidationError, ValidationErrorKind};
use crate::schema::{SettingsSchema, TypedValue};
use crate::validate::validate_field;

/// Setting name to raw override value
pub type OverrideSet = BTreeMap<String, String>;

/// What to do with an override the chart does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownSettingPolicy {
    /// Report it as an `UnknownSetting` failure
    #[default]
    Reject,
    /// Skip it. Lets a chart drop a setting without breaking configured apps.
    Ignore,
}

/// Outcome of checking a whole override set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Validated {
    /// Coerced values of the overrides that passed
    pub values: BTreeMap<String, TypedValue>,
    pub failures: Vec<ValidationError>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check all `overrides` against `schema`, returning the failures.
///
/// An empty list means every override was accepted.
pub fn validate_all(
    overrides: &OverrideSet,
    schema: &SettingsSchema,
    policy: UnknownSettingPolicy,
) -> Vec<ValidationError> {
    check_all(overrides, schema, policy).failures
}

/// Check all `overrides` and hand back the coerced values when all pass.
pub fn coerce_all(
    overrides: &OverrideSet,
    schema: &SettingsSchema,
    policy: UnknownSettingPolicy,
) -> Result<BTreeMap<String, TypedValue>, Vec<ValidationError>> {
    let checked = check_all(overrides, schema, policy);
    if checked.is_valid() {
        Ok(checked.values)
    } else {
        Err(checked.failures)
    }
}

/// Check every override, keeping both the coerced values and the failures.
pub fn check_all(
    overrides: &OverrideSet,
    schema: &SettingsSchema,
    policy: UnknownSettingPolicy,
) -> Validated {
    let mut checked = Validated::default();

    for (name, value) in overrides {
        let Some(declaration) = schema.get(name) else {
            match policy {
                UnknownSettingPolicy::Reject => checked
                    .failures
                    .push(ValidationError::new(name.clone(), ValidationErrorKind::UnknownSetting)),
                UnknownSettingPolicy::Ignore => {
                    debug!(setting = %name, "ignoring override not declared by the app chart")
                }
            }
            continue;
        };

        match validate_field(name, value, declaration) {
            Ok(typed) => {
                checked.values.insert(name.clone(), typed);
            }
            Err(failure) => checked.failures.push(failure),
        }
    }

    debug!(
        overrides = overrides.len(),
        failures = checked.failures.len(),
        "validated overrides"
    );
    checked
}
