//! Chart Registry Tests
//!
//! Loading app chart resources from disk and validating applications
//! against them.

use std::fs;
use std::path::Path;

use appchart_settings::{
    validate_application, AppChartError, AppRecord, AppRef, ChartRegistry, ChartStore, SettingType,
    UnknownSettingPolicy,
};
use tempfile::tempdir;

const STANDARD: &str = r#"
apiVersion: application.epinio.io/v1
kind: AppChart
metadata:
  name: standard
  creationTimestamp: "2022-04-01T08:00:00Z"
spec:
  description: |-
    Epinio standard support chart
    for application deployment
  shortDescription: Epinio standard deployment
  helmChart: https://example.com/epinio-application-0.1.21.tgz
"#;

const CUSTOM: &str = r#"
apiVersion: application.epinio.io/v1
kind: AppChart
metadata:
  name: custom
spec:
  helmChart: https://example.com/epinio-application-0.1.21.tgz
  settings:
    bar:
      type: string
      enum: [sna, fu]
    cat:
      type: number
      minimum: "0"
      maximum: "1"
    fake:
      type: bool
    fox:
      type: integer
      maximum: "100"
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: unrelated
data:
  key: value
"#;

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn registry_with_charts() -> (tempfile::TempDir, ChartRegistry) {
    let dir = tempdir().unwrap();
    write(dir.path(), "standard.yaml", STANDARD);
    fs::create_dir(dir.path().join("extra")).unwrap();
    write(&dir.path().join("extra"), "custom.yml", CUSTOM);
    write(dir.path(), "README.md", "not a chart");
    let registry = ChartRegistry::open(dir.path()).unwrap();
    (dir, registry)
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_open_loads_app_charts_only() {
    let (_dir, registry) = registry_with_charts();
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["custom", "standard"]);

    let standard = registry.lookup("standard").unwrap().unwrap();
    assert_eq!(standard.short_description, "Epinio standard deployment");
    assert_eq!(standard.description.lines().count(), 2);
    assert!(standard.settings.is_empty());
    assert!(standard.created_at.is_some());

    let custom = registry.lookup("custom").unwrap().unwrap();
    assert_eq!(custom.setting_count(), 4);
    assert_eq!(custom.settings.get("fake").unwrap().setting_type, SettingType::Bool);
    assert_eq!(custom.settings.get("cat").unwrap().allowed_values(), "[0 ... 1]");
}

#[test]
fn test_json_resources() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "chart.json",
        r#"{"kind": "AppChart", "metadata": {"name": "jsonic"}, "spec": {"settings": {"n": {"type": "integer"}}}}"#,
    );
    let registry = ChartRegistry::open(dir.path()).unwrap();
    assert!(registry.exists("jsonic").unwrap());
}

#[test]
fn test_malformed_chart_names_the_file() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "broken.yaml",
        "kind: AppChart\nmetadata:\n  name: broken\nspec:\n  settings:\n    a:\n      type: [integer]\n",
    );

    match ChartRegistry::open(dir.path()) {
        Err(AppChartError::InvalidResource { path, reason }) => {
            assert!(path.ends_with("broken.yaml"));
            assert!(reason.contains("type should be string"), "{}", reason);
        }
        other => panic!("expected InvalidResource, got {:?}", other),
    }
}

#[test]
fn test_bad_constraints_load_fine() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "odd.yaml",
        "kind: AppChart\nmetadata:\n  name: odd\nspec:\n  settings:\n    flag:\n      type: bool\n      minimum: hello\n",
    );
    let registry = ChartRegistry::open(dir.path()).unwrap();
    assert_eq!(registry.get("odd").unwrap().settings.get("flag").unwrap().minimum.as_deref(), Some("hello"));
}

// =============================================================================
// Application validation
// =============================================================================

#[test]
fn test_validate_application_against_loaded_chart() {
    let (_dir, registry) = registry_with_charts();
    let app = AppRecord::new(AppRef::new("web", "workspace"), "custom")
        .with_setting("bar", "fu")
        .with_setting("cat", "1.5")
        .with_setting("fox", "hound");

    let report = validate_application(&registry, &app, UnknownSettingPolicy::Reject, None).unwrap();
    assert!(!report.is_valid());
    assert_eq!(
        report.failures,
        vec![
            r#"Setting "cat": Out of bounds, "1.5" too large"#.to_string(),
            r#"Setting "fox": Expected integer, got "hound""#.to_string(),
        ]
    );
    assert_eq!(report.api_errors().len(), 2);
    assert!(report.api_errors().iter().all(|e| e.status == 400));
    assert_eq!(report.values.len(), 1);
}

#[test]
fn test_validate_application_from_yaml_record() {
    let (_dir, registry) = registry_with_charts();
    let app: AppRecord = serde_yaml::from_str(
        "meta:\n  name: web\n  namespace: workspace\nconfiguration:\n  appchart: custom\n  settings:\n    fox: \"42\"\n    fake: \"true\"\n",
    )
    .unwrap();

    let report = validate_application(&registry, &app, UnknownSettingPolicy::Reject, None).unwrap();
    assert!(report.is_valid(), "{:?}", report.failures);
    assert_eq!(report.revision, registry.get("custom").unwrap().revision);
}

#[test]
fn test_yaml_record_values_keep_their_spelling() {
    let mut registry = ChartRegistry::new();
    registry
        .register_resource(&serde_json::json!({
            "kind": "AppChart",
            "metadata": {"name": "versioned"},
            "spec": {"settings": {"version": {"type": "string", "enum": ["1.10", "1.9"]}}}
        }))
        .unwrap();

    let quoted: AppRecord = serde_yaml::from_str(
        "meta:\n  name: web\nconfiguration:\n  appchart: versioned\n  settings:\n    version: \"1.10\"\n",
    )
    .unwrap();
    let report = validate_application(&registry, &quoted, UnknownSettingPolicy::Reject, None).unwrap();
    assert!(report.is_valid(), "{:?}", report.failures);
    assert_eq!(report.values["version"].to_string(), "1.10");

    let unquoted: Result<AppRecord, _> = serde_yaml::from_str(
        "meta:\n  name: web\nconfiguration:\n  appchart: versioned\n  settings:\n    version: 1.10\n",
    );
    let err = unquoted.unwrap_err().to_string();
    assert!(err.contains(r#"setting "version" must be a string"#), "{}", err);
}
