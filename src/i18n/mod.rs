//! Internationalization (i18n) for the bilingual site.
//!
//! - `registry`: supported languages and their metadata (direction, strings)
//! - `language`: validated `Language` handle
//! - `strings`: user-facing server strings per language
//! - `metrics`: counters of how content translations were resolved
//!
//! # Example
//!
//! ```rust,ignore
//! use ario_studio::i18n::Language;
//!
//! let persian = Language::from_code("fa")?;
//! assert_eq!(persian.direction().as_html(), "rtl");
//! let message = persian.strings().generic_failure;
//! ```

mod language;
mod metrics;
mod registry;
mod strings;

pub use language::Language;
pub use metrics::{ResolutionMetrics, ResolutionReport};
pub use registry::{LanguageConfig, LanguageRegistry, TextDirection};
pub use strings::LanguageStrings;
