//! Settings schema types

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a setting
///
/// Any text outside the closed set is kept as `Unknown` so that a chart with
/// a bad declaration still loads; it only fails once the setting is used.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SettingType {
    String,
    Integer,
    Number,
    Bool,
    Unknown(String),
}

impl SettingType {
    /// Name as written in the chart resource
    pub fn as_str(&self) -> &str {
        match self {
            SettingType::String => "string",
            SettingType::Integer => "integer",
            SettingType::Number => "number",
            SettingType::Bool => "bool",
            SettingType::Unknown(other) => other,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, SettingType::Unknown(_))
    }
}

impl From<&str> for SettingType {
    fn from(s: &str) -> Self {
        match s {
            "string" => SettingType::String,
            "integer" => SettingType::Integer,
            "number" => SettingType::Number,
            "bool" => SettingType::Bool,
            other => SettingType::Unknown(other.to_string()),
        }
    }
}

impl From<String> for SettingType {
    fn from(s: String) -> Self {
        SettingType::from(s.as_str())
    }
}

impl From<SettingType> for String {
    fn from(t: SettingType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a chart's settings schema
///
/// Constraint text is stored verbatim. Whether `minimum` parses as a number
/// is decided by the field validator, and only for numeric types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingDeclaration {
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<String>,
    #[serde(default, rename = "enum", skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
}

impl SettingDeclaration {
    /// An unconstrained declaration of the given type
    pub fn new(setting_type: impl Into<SettingType>) -> Self {
        Self {
            setting_type: setting_type.into(),
            minimum: None,
            maximum: None,
            enum_values: Vec::new(),
        }
    }

    pub fn with_minimum(mut self, minimum: impl Into<String>) -> Self {
        self.minimum = Some(minimum.into());
        self
    }

    pub fn with_maximum(mut self, maximum: impl Into<String>) -> Self {
        self.maximum = Some(maximum.into());
        self
    }

    pub fn with_enum<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Human readable summary of the legal values, as shown by `chart show`.
    ///
    /// Strings list their enum, numbers show an inclusive range with
    /// `-inf`/`+inf` for open ends, everything else is unconstrained.
    pub fn allowed_values(&self) -> String {
        match self.setting_type {
            SettingType::String => self.enum_values.join(", "),
            SettingType::Integer | SettingType::Number => format!(
                "[{} ... {}]",
                self.minimum.as_deref().unwrap_or("-inf"),
                self.maximum.as_deref().unwrap_or("+inf"),
            ),
            SettingType::Bool | SettingType::Unknown(_) => String::new(),
        }
    }
}

/// Setting name to declaration, ordered by name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsSchema(BTreeMap<String, SettingDeclaration>);

impl SettingsSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, declaration: SettingDeclaration) {
        self.0.insert(name.into(), declaration);
    }

    pub fn get(&self, name: &str) -> Option<&SettingDeclaration> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingDeclaration)> {
        self.0.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl FromIterator<(String, SettingDeclaration)> for SettingsSchema {
    fn from_iter<T: IntoIterator<Item = (String, SettingDeclaration)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A setting value after coercion to its declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypedValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    String(String),
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::String(s) => f.write_str(s),
            TypedValue::Integer(i) => write!(f, "{}", i),
            TypedValue::Number(n) => write!(f, "{}", n),
            TypedValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for TypedValue {
    fn from(s: &str) -> Self {
        TypedValue::String(s.to_string())
    }
}

impl From<i64> for TypedValue {
    fn from(i: i64) -> Self {
        TypedValue::Integer(i)
    }
}

impl From<f64> for TypedValue {
    fn from(n: f64) -> Self {
        TypedValue::Number(n)
    }
}

impl From<bool> for TypedValue {
    fn from(b: bool) -> Self {
        TypedValue::Bool(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setting_type_roundtrip_text() {
        assert_eq!(SettingType::from("integer"), SettingType::Integer);
        assert_eq!(SettingType::from("foofara"), SettingType::Unknown("foofara".into()));
        assert_eq!(SettingType::from("foofara").as_str(), "foofara");
        assert!(!SettingType::from("").is_known());
    }

    #[test]
    fn test_allowed_values() {
        let s = SettingDeclaration::new("string").with_enum(["sna", "fu"]);
        assert_eq!(s.allowed_values(), "sna, fu");

        let n = SettingDeclaration::new("number").with_minimum("0").with_maximum("1");
        assert_eq!(n.allowed_values(), "[0 ... 1]");

        let open = SettingDeclaration::new("integer").with_maximum("100");
        assert_eq!(open.allowed_values(), "[-inf ... 100]");

        let floof = SettingDeclaration::new("number").with_minimum("0");
        assert_eq!(floof.allowed_values(), "[0 ... +inf]");

        assert_eq!(SettingDeclaration::new("bool").with_minimum("0").allowed_values(), "");
    }

    #[test]
    fn test_declaration_serializes_with_resource_keys() {
        let decl = SettingDeclaration::new("string").with_enum(["cat", "dog"]);
        let json = serde_json::to_value(&decl).unwrap();
        assert_eq!(json, serde_json::json!({"type": "string", "enum": ["cat", "dog"]}));
    }

    #[test]
    fn test_schema_is_ordered_by_name() {
        let mut schema = SettingsSchema::new();
        schema.insert("zeta", SettingDeclaration::new("bool"));
        schema.insert("alpha", SettingDeclaration::new("string"));
        let names: Vec<_> = schema.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_typed_value_display() {
        assert_eq!(TypedValue::from(3.5).to_string(), "3.5");
        assert_eq!(TypedValue::from(true).to_string(), "true");
        assert_eq!(serde_json::to_string(&TypedValue::from(7i64)).unwrap(), "7");
    }
}
