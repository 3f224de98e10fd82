//! Conversion of unstructured chart resources into typed models
//!
//! Chart resources arrive as untyped documents (YAML or JSON, shaped like a
//! Kubernetes custom resource). Loading only checks *shape*: a field that is
//! present must have the right kind of value. What the values mean, e.g.
//! whether a `minimum` is a number, is left to the field validator so that a
//! chart with one bad setting only fails when that setting is exercised.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::chart::AppChart;
use crate::checksum::Revision;
use crate::error::{AppChartError, Result};
use crate::schema::{SettingDeclaration, SettingsSchema};

/// Resource kind of app chart documents
pub const APP_CHART_KIND: &str = "AppChart";

/// Build a settings schema from the raw `settings` section of a chart.
///
/// `null` means the chart declares no settings. Absent `minimum`, `maximum`
/// and `enum` are unconstrained; an absent `type` loads as the unknown type
/// `""` and is rejected on use.
pub fn load_settings(raw: &Value) -> Result<SettingsSchema> {
    let entries = match raw {
        Value::Null => return Ok(SettingsSchema::new()),
        Value::Object(entries) => entries,
        _ => return Err(malformed("spec settings should be a map")),
    };

    let mut schema = SettingsSchema::new();
    for (key, entry) in entries {
        let fields = entry
            .as_object()
            .ok_or_else(|| malformed(format!("setting {:?} should be a map", key)))?;

        let setting_type = string_field(fields, "type")
            .ok_or_else(|| malformed(format!("setting {:?}: type should be string", key)))?
            .unwrap_or_default();
        let minimum = string_field(fields, "minimum")
            .ok_or_else(|| malformed(format!("setting {:?}: minimum should be string", key)))?;
        let maximum = string_field(fields, "maximum")
            .ok_or_else(|| malformed(format!("setting {:?}: maximum should be string", key)))?;
        let enum_values = string_list_field(fields, "enum")
            .ok_or_else(|| malformed(format!("setting {:?}: enum should be string slice", key)))?
            .unwrap_or_default();

        schema.insert(
            key.clone(),
            SettingDeclaration {
                setting_type: setting_type.as_str().into(),
                minimum: minimum.filter(|m| !m.is_empty()),
                maximum: maximum.filter(|m| !m.is_empty()),
                enum_values,
            },
        );
    }

    Ok(schema)
}

/// Convert an unstructured app chart resource into an [`AppChart`].
pub fn load_chart(resource: &Value) -> Result<AppChart> {
    let name = nested_string(resource, &["metadata", "name"])
        .ok_or_else(|| malformed("chart should be string"))?
        .filter(|name| !name.is_empty())
        .ok_or_else(|| malformed("chart has no name"))?;

    let created_at = match nested_string(resource, &["metadata", "creationTimestamp"]) {
        None => return Err(malformed("creation timestamp should be string")),
        Some(None) => None,
        Some(Some(stamp)) => Some(
            DateTime::parse_from_rfc3339(&stamp)
                .map_err(|e| malformed(format!("bad creation timestamp {:?}: {}", stamp, e)))?
                .with_timezone(&Utc),
        ),
    };

    let description = nested_string(resource, &["spec", "description"])
        .ok_or_else(|| malformed("description should be string"))?
        .unwrap_or_default();
    let short_description = nested_string(resource, &["spec", "shortDescription"])
        .ok_or_else(|| malformed("shortdescription should be string"))?
        .unwrap_or_default();
    let helm_chart = nested_string(resource, &["spec", "helmChart"])
        .ok_or_else(|| malformed("helm chart should be string"))?
        .unwrap_or_default();
    let helm_repo = nested_string(resource, &["spec", "helmRepo"])
        .ok_or_else(|| malformed("helm repo should be string"))?
        .unwrap_or_default();

    let values = match nested(resource, &["spec", "values"]) {
        Some(Some(Value::Object(map))) => string_map(map)
            .ok_or_else(|| malformed("spec values should be string"))?,
        Some(None) => BTreeMap::new(),
        _ => return Err(malformed("spec values should be string")),
    };

    let settings = match nested(resource, &["spec", "settings"]) {
        Some(Some(raw)) => load_settings(raw)?,
        Some(None) => SettingsSchema::new(),
        None => return Err(malformed("spec settings should be a map")),
    };

    let spec = resource.get("spec").cloned().unwrap_or(Value::Null);
    let revision = Revision::from_json(&spec);

    debug!(chart = %name, settings = settings.len(), revision = %revision.short(), "loaded app chart");

    Ok(AppChart {
        name,
        created_at,
        description,
        short_description,
        helm_chart,
        helm_repo,
        settings,
        values,
        revision,
    })
}

/// Whether an unstructured resource is an app chart
pub fn is_app_chart(resource: &Value) -> bool {
    resource.get("kind").and_then(Value::as_str) == Some(APP_CHART_KIND)
}

/// Read every document of a YAML or JSON file, by extension.
///
/// YAML files may hold several `---` separated documents.
pub fn read_documents(path: &Path) -> Result<Vec<Value>> {
    let content = fs::read_to_string(path)?;
    let is_json = path.extension().map(|ext| ext == "json").unwrap_or(false);
    if is_json {
        return Ok(vec![serde_json::from_str(&content)?]);
    }

    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(&content) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

fn malformed(reason: impl Into<String>) -> AppChartError {
    AppChartError::SchemaMalformed(reason.into())
}

/// Walk `path` through nested maps.
///
/// `None` when an intermediate value is not a map; `Some(None)` when a key
/// is missing or the leaf is `null`.
fn nested<'a>(value: &'a Value, path: &[&str]) -> Option<Option<&'a Value>> {
    let mut current = value;
    for key in path {
        let map = current.as_object()?;
        match map.get(*key) {
            Some(next) => current = next,
            None => return Some(None),
        }
    }
    if current.is_null() {
        Some(None)
    } else {
        Some(Some(current))
    }
}

/// `None` on a shape error, `Some(None)` when absent
fn nested_string(value: &Value, path: &[&str]) -> Option<Option<String>> {
    match nested(value, path)? {
        None => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(_) => None,
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<Option<String>> {
    match fields.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(s)) => Some(Some(s.clone())),
        Some(_) => None,
    }
}

fn string_list_field(fields: &Map<String, Value>, key: &str) -> Option<Option<Vec<String>>> {
    match fields.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(String::from))
            .collect::<Option<Vec<_>>>()
            .map(Some),
        Some(_) => None,
    }
}

fn string_map(map: &Map<String, Value>) -> Option<BTreeMap<String, String>> {
    map.iter()
        .map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
        .collect()
}
