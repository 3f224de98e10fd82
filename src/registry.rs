//! App Chart Registry
//!
//! Holds the known app charts and their settings schemas. Charts are read
//! from a directory of resource files (YAML or JSON); each document of kind
//! `AppChart` becomes one entry. A chart's schema is immutable for its
//! revision: registering the same name with a different spec replaces the
//! whole entry rather than editing it.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::chart::AppChart;
use crate::checksum::Revision;
use crate::error::{AppChartError, Result};
use crate::loader::{is_app_chart, load_chart, read_documents};

/// Source of app chart records
///
/// The validation core never fetches charts itself; callers hand it a store.
pub trait ChartStore: Send + Sync {
    /// All known charts, ordered by name
    fn list(&self) -> Result<Vec<AppChart>>;

    /// The named chart, or `None` when there is no such chart
    fn lookup(&self, name: &str) -> Result<Option<AppChart>>;

    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.lookup(name)?.is_some())
    }
}

/// What happened when a chart was registered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// Same name, same revision
    Unchanged,
    /// Same name, new revision. Carries the revision that was dropped.
    Superseded(Revision),
}

/// In-memory chart registry, optionally backed by a resource directory
#[derive(Debug, Default)]
pub struct ChartRegistry {
    /// Directory the charts were read from
    root: Option<PathBuf>,
    charts: BTreeMap<String, AppChart>,
}

impl ChartRegistry {
    /// An empty registry with no backing directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from already loaded charts
    pub fn from_charts(charts: impl IntoIterator<Item = AppChart>) -> Self {
        let mut registry = Self::new();
        for chart in charts {
            registry.register(chart);
        }
        registry
    }

    /// Load every app chart resource found below `path`.
    ///
    /// A missing directory yields an empty registry. Any malformed chart
    /// fails the whole load, naming the offending file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let root = path.as_ref().to_path_buf();
        let mut registry = Self {
            root: Some(root.clone()),
            charts: BTreeMap::new(),
        };

        if !root.exists() {
            warn!(path = %root.display(), "chart directory does not exist");
            return Ok(registry);
        }

        let loaded = registry.load_resources(&root)?;
        info!(path = %root.display(), charts = loaded, "loaded app charts");
        Ok(registry)
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AppChart> {
        self.charts.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.charts.keys().map(String::as_str)
    }

    /// Add or replace a chart
    pub fn register(&mut self, chart: AppChart) -> Registration {
        let outcome = match self.charts.get(&chart.name) {
            None => Registration::Added,
            Some(existing) if existing.revision == chart.revision => Registration::Unchanged,
            Some(existing) => Registration::Superseded(existing.revision.clone()),
        };

        if let Registration::Superseded(previous) = &outcome {
            info!(
                chart = %chart.name,
                previous = %previous.short(),
                current = %chart.revision.short(),
                "app chart superseded"
            );
        }

        self.charts.insert(chart.name.clone(), chart);
        outcome
    }

    /// Convert and register one unstructured chart resource
    pub fn register_resource(&mut self, resource: &Value) -> Result<Registration> {
        let chart = load_chart(resource)?;
        Ok(self.register(chart))
    }

    /// Drop a chart, discarding its schema
    pub fn remove(&mut self, name: &str) -> Option<AppChart> {
        self.charts.remove(name)
    }

    /// Chart names starting with `prefix`, for command line completion
    pub fn matching(&self, prefix: &str) -> Vec<&str> {
        self.names().filter(|name| name.starts_with(prefix)).collect()
    }

    /// Closest known chart name, if any resembles `name`
    pub fn suggest(&self, name: &str) -> Option<&str> {
        use fuzzy_matcher::skim::SkimMatcherV2;
        use fuzzy_matcher::FuzzyMatcher;

        let matcher = SkimMatcherV2::default();
        self.names()
            .filter_map(|candidate| matcher.fuzzy_match(candidate, name).map(|score| (score, candidate)))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(&a.1)))
            .map(|(_, candidate)| candidate)
    }

    fn load_resources(&mut self, root: &Path) -> Result<usize> {
        let mut loaded = 0;

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_resource_file(path) {
                continue;
            }

            let documents = read_documents(path).map_err(|e| AppChartError::InvalidResource {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

            for document in documents.iter().filter(|d| is_app_chart(d)) {
                let chart = load_chart(document).map_err(|e| AppChartError::InvalidResource {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
                debug!(chart = %chart.name, path = %path.display(), "found app chart");
                self.register(chart);
                loaded += 1;
            }
        }

        Ok(loaded)
    }
}

impl ChartStore for ChartRegistry {
    fn list(&self) -> Result<Vec<AppChart>> {
        Ok(self.charts.values().cloned().collect())
    }

    fn lookup(&self, name: &str) -> Result<Option<AppChart>> {
        Ok(self.charts.get(name).cloned())
    }
}

fn is_resource_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml") | Some("json")
    )
}
