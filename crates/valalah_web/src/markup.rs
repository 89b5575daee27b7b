//! Names and value formats shared by the DOM surface and the page wiring.

use valalah_core::EntityId;

/// Attribute tagging an interactive node with its entity.
pub const ENTITY_ATTR: &str = "data-entity";

/// Selector matching any interactive node.
pub const ENTITY_SELECTOR: &str = "[data-entity]";

/// Class added to a cracked node.
pub const CRACKED_CLASS: &str = "cracked";

/// CSS length in viewport-width units.
#[must_use]
pub fn vw(value: f32) -> String {
    format!("{value}vw")
}

/// CSS length in pixels.
#[must_use]
pub fn px(value: f32) -> String {
    format!("{value}px")
}

/// Attribute value for an entity.
#[must_use]
pub fn entity_attr(id: EntityId) -> String {
    id.to_raw().to_string()
}

/// Reads an entity back from its attribute value.
#[must_use]
pub fn parse_entity(value: &str) -> Option<EntityId> {
    value.trim().parse::<u64>().ok().map(EntityId::from_raw)
}
