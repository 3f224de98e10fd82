//! App chart and application records

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::checksum::Revision;
use crate::schema::SettingsSchema;

/// A deployment template and the settings it exposes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppChart {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub helm_chart: String,
    #[serde(default)]
    pub helm_repo: String,
    #[serde(default)]
    pub settings: SettingsSchema,
    /// Fixed helm values the chart always applies
    #[serde(default)]
    pub values: BTreeMap<String, String>,
    /// Fingerprint of the spec the settings were loaded from
    pub revision: Revision,
}

impl AppChart {
    pub fn setting_count(&self) -> usize {
        self.settings.len()
    }
}

/// Namespaced application name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppRef {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

impl AppRef {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl std::fmt::Display for AppRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// The stored configuration of an application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfiguration {
    /// Name of the app chart; empty means the default chart
    #[serde(default)]
    pub appchart: String,
    /// Raw chart value overrides
    #[serde(default, deserialize_with = "string_map")]
    pub settings: BTreeMap<String, String>,
}

/// An application as far as settings validation is concerned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRecord {
    pub meta: AppRef,
    #[serde(default)]
    pub configuration: AppConfiguration,
}

impl AppRecord {
    pub fn new(meta: AppRef, appchart: impl Into<String>) -> Self {
        Self {
            meta,
            configuration: AppConfiguration {
                appchart: appchart.into(),
                settings: BTreeMap::new(),
            },
        }
    }

    pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.configuration.settings.insert(name.into(), value.into());
        self
    }
}

/// Overrides are strings. An unquoted YAML scalar such as `1.10` arrives
/// already reparsed as a number, with its spelling lost, so anything other
/// than a string is refused.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    raw.into_iter()
        .map(|(key, value)| match value {
            serde_json::Value::String(s) => Ok((key, s)),
            other => Err(D::Error::custom(format!(
                "setting {:?} must be a string, got {}; quote the value",
                key, other
            ))),
        })
        .collect()
}
