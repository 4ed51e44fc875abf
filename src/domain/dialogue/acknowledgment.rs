//! Acknowledgment lines for freshly collected entities.

use crate::domain::catalog::EntityDefinition;

/// Picks the acknowledgment for a just-collected entity value.
///
/// Variants come from the entity definition and are cycled by the number
/// of entities collected so far, so consecutive acknowledgments do not
/// repeat word for word. Entities without variants get a plain receipt.
pub fn acknowledgment_for(entity: &EntityDefinition, value: &str, collected_count: usize) -> String {
    if entity.acknowledgments.is_empty() {
        return format!("Got it, {}: {}.", entity.id.replace('_', " "), value);
    }
    let template = &entity.acknowledgments[collected_count % entity.acknowledgments.len()];
    template.replace("{value}", value)
}
