//! Validation of an application's stored chart values
//!
//! Resolves the app chart an application refers to and checks the
//! application's overrides against that chart's settings schema. The result
//! is a report the API and CLI layers render: one error entry per failing
//! setting, or the coerced values when everything passed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chart::{AppRecord, AppRef};
use crate::checksum::Revision;
use crate::error::{AppChartError, Result, ValidationError};
use crate::overrides::{check_all, UnknownSettingPolicy};
use crate::registry::ChartStore;
use crate::schema::TypedValue;

/// One entry of a multi-error API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub title: String,
    pub details: String,
}

impl ApiError {
    pub fn bad_request(title: impl Into<String>) -> Self {
        Self {
            status: 400,
            title: title.into(),
            details: String::new(),
        }
    }
}

/// Result of validating one application's chart values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub application: AppRef,
    pub chart: String,
    pub revision: Revision,
    /// Coerced values of every override that passed
    pub values: BTreeMap<String, TypedValue>,
    /// Rendered failure messages, in setting name order
    pub failures: Vec<String>,
    #[serde(skip)]
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// One 400 entry per failing setting
    pub fn api_errors(&self) -> Vec<ApiError> {
        self.errors
            .iter()
            .map(|e| ApiError::bad_request(e.to_string()))
            .collect()
    }

    /// Failures caused by the chart rather than the override values
    pub fn bad_spec_count(&self) -> usize {
        self.errors.iter().filter(|e| e.is_bad_spec()).count()
    }
}

/// Validate the chart values saved with `app` against its app chart.
///
/// An application without a chart name uses `default_chart`. A chart that
/// cannot be found is an error, not a validation failure.
pub fn validate_application(
    store: &dyn ChartStore,
    app: &AppRecord,
    policy: UnknownSettingPolicy,
    default_chart: Option<&str>,
) -> Result<ValidationReport> {
    let chart_name = if app.configuration.appchart.is_empty() {
        default_chart.unwrap_or_default()
    } else {
        app.configuration.appchart.as_str()
    };

    let chart = store
        .lookup(chart_name)?
        .ok_or_else(|| AppChartError::ChartNotKnown(chart_name.to_string()))?;

    debug!(app = %app.meta, chart = %chart.name, "validating chart values");

    let checked = check_all(&app.configuration.settings, &chart.settings, policy);
    if !checked.is_valid() {
        warn!(
            app = %app.meta,
            chart = %chart.name,
            failures = checked.failures.len(),
            "chart values rejected"
        );
    }

    Ok(ValidationReport {
        application: app.meta.clone(),
        chart: chart.name,
        revision: chart.revision,
        values: checked.values,
        failures: checked.failures.iter().map(ToString::to_string).collect(),
        errors: checked.failures,
    })
}
