//! Intent and entity catalog.
//!
//! Maps each intent to the entities it needs, with per-entity question
//! templates, examples, and acknowledgments, plus per-intent retrieval
//! behavior. Backed by a JSON file and reloadable at runtime through the
//! registry's snapshot swap.

#[allow(clippy::module_inception)]
mod catalog;
mod definitions;
mod question;
mod registry;

pub use catalog::{Catalog, CatalogError};
pub use definitions::{AnswerFormat, EntityDefinition, IntentDefinition};
pub use question::{template_question, QuestionContext, QuestionSource};
pub use registry::{CatalogSummary, IntentRegistry};
