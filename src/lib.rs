//! App Chart Settings
//!
//! Settings schemas for application charts, and validation of the values an
//! application supplies for them.
//!
//! ## Features
//!
//! - **Deferred Schema Loading**: Chart resources are checked for shape only;
//!   constraint text is interpreted when a setting is first validated
//! - **Typed Coercion**: Raw override strings become `string`, `integer`,
//!   `number` or `bool` values
//! - **Type-Scoped Constraints**: Bounds apply to numbers, enums to strings,
//!   and nothing else
//! - **Complete Reports**: Every failing override is reported, not just the
//!   first one
//!
//! ## Flow
//!
//! ```text
//! chart resource ──load_chart──▶ AppChart { settings: SettingsSchema }
//!                                        │
//! app overrides ──────────────▶ validate_all ──▶ validate_field (per override)
//!                                        │
//!                                        ▼
//!                              Vec<ValidationError>
//! ```

pub mod application;
pub mod chart;
pub mod checksum;
pub mod config;
pub mod error;
pub mod loader;
pub mod overrides;
pub mod registry;
pub mod schema;
pub mod validate;

pub use application::{validate_application, ApiError, ValidationReport};
pub use chart::{AppChart, AppConfiguration, AppRecord, AppRef};
pub use checksum::Revision;
pub use config::AppChartConfig;
pub use error::{AppChartError, FailureCategory, Result, ValidationError, ValidationErrorKind};
pub use loader::{load_chart, load_settings};
pub use overrides::{check_all, coerce_all, validate_all, OverrideSet, UnknownSettingPolicy, Validated};
pub use registry::{ChartRegistry, ChartStore, Registration};
pub use schema::{SettingDeclaration, SettingType, SettingsSchema, TypedValue};
pub use validate::validate_field;
