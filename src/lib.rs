/*!
 * # dspace-ctask - Metadata curation tasks for DSpace-style repositories
 *
 * A Rust library of curation tasks that a repository's curation engine runs
 * once per object.
 *
 * ## Features
 *
 * - Translate metadata fields into further languages through machine
 *   translation services:
 *   - Google Translate (v2)
 *   - Microsoft Translator (v3)
 * - Copy EXIF tags of JPEG bitstreams into bibliographic metadata
 * - Report bitstreams readable by the anonymous group
 * - Regenerate canonical handle URIs
 * - ISO 639-1 and ISO 639-2 language code validation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `curation`: Task contract, statuses and the reporting sink
 * - `host`: Collaborators supplied by the repository (items, storage,
 *   authorization, contexts) and an in-memory implementation of them
 * - `tasks`: The curation tasks:
 *   - `tasks::translator`: Field translator
 *   - `tasks::exif_extractor`: EXIF metadata copier
 *   - `tasks::policy_checker`: Anonymous-read policy reporter
 *   - `tasks::uri_generator`: Handle-URI regenerator
 * - `providers`: Client implementations for translation services
 * - `app_controller`: Runs a task over item record files
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod curation;
pub mod errors;
pub mod file_utils;
pub mod host;
pub mod language_utils;
pub mod providers;
pub mod tasks;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{Controller, RunSummary};
pub use curation::{CurationStatus, CurationTask, Curator, ReportCollector, ResultLog};
pub use errors::{ConfigError, ExifError, HostError, ProviderError};
pub use language_utils::{get_language_name, normalize_to_part2t};
pub use tasks::{ExifExtractor, FieldTranslator, PolicyChecker, TaskKind, UriGenerator};
