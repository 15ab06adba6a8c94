//! Project creation from templates.
//!
//! A template is a remote starter mirrored with `npx degit`, a directory of
//! bundled templates, or a local project distilled through the extractor.

mod catalog;
mod config;
mod create;
mod reporter;

// Re-export public API
pub use catalog::{LOCAL_TEMPLATE_ID, Template, TemplateCatalog, TemplateSource};
pub use config::CreateConfig;
pub use create::{CreateReport, run_create};
pub use reporter::print_create_summary;
