//! File-backed intent registry with atomic snapshot reload.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use super::catalog::{Catalog, CatalogError};
use super::question::{QuestionContext, QuestionSource};

/// Identifier lists returned by a successful reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSummary {
    /// All intent identifiers, sorted.
    pub intents: Vec<String>,
    /// All entity identifiers, sorted.
    pub entities: Vec<String>,
}

/// Registry over the intent/entity catalog.
///
/// Holds the current catalog behind an `Arc` that is replaced wholesale on
/// reload: readers hold either the old snapshot or the complete new one,
/// never a partially updated catalog. A failed reload leaves the old
/// snapshot in place.
pub struct IntentRegistry {
    path: Option<PathBuf>,
    snapshot: RwLock<Arc<Catalog>>,
    question_source: QuestionSource,
}

impl IntentRegistry {
    /// Loads the registry from a catalog file.
    pub fn load(
        path: impl Into<PathBuf>,
        question_source: QuestionSource,
    ) -> Result<Self, CatalogError> {
        let path = path.into();
        let catalog = read_catalog(&path)?;
        Ok(Self {
            path: Some(path),
            snapshot: RwLock::new(Arc::new(catalog)),
            question_source,
        })
    }

    /// Builds a registry around an already-parsed catalog (no backing
    /// file, so `reload` is unavailable).
    pub fn from_catalog(catalog: Catalog, question_source: QuestionSource) -> Self {
        Self {
            path: None,
            snapshot: RwLock::new(Arc::new(catalog)),
            question_source,
        }
    }

    /// The current catalog snapshot.
    ///
    /// Consumers that make several lookups within one turn should take one
    /// snapshot and use it throughout, so a concurrent reload cannot split
    /// their view.
    pub fn snapshot(&self) -> Arc<Catalog> {
        self.snapshot.read().expect("catalog lock poisoned").clone()
    }

    /// Re-reads and re-validates the backing file, then swaps the
    /// snapshot.
    pub fn reload(&self) -> Result<CatalogSummary, CatalogError> {
        let path = self.path.as_ref().ok_or(CatalogError::NoBackingFile)?;
        let catalog = read_catalog(path)?;
        let summary = CatalogSummary {
            intents: catalog.intent_ids(),
            entities: catalog.entity_ids(),
        };
        *self.snapshot.write().expect("catalog lock poisoned") = Arc::new(catalog);
        tracing::info!(
            intents = summary.intents.len(),
            entities = summary.entities.len(),
            "catalog reloaded"
        );
        Ok(summary)
    }

    /// Question text for a missing entity.
    ///
    /// Unknown entities get a generic request so a stale intent reference
    /// cannot break a turn.
    pub async fn question_for(&self, entity_id: &str, ctx: &QuestionContext<'_>) -> String {
        let catalog = self.snapshot();
        match catalog.entity(entity_id) {
            Some(entity) => self.question_source.question_for(entity, ctx).await,
            None => format!("Could you please provide: {}?", entity_id),
        }
    }
}

fn read_catalog(path: &PathBuf) -> Result<Catalog, CatalogError> {
    let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Catalog::from_json(&text)
}
