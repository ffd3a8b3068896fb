//! Canonical identifier names derived from a unit name.
//!
//! A unit such as `player_tag` owns two identifiers:
//! - the interface identifier `PlayerTagRepository` (the abstract contract)
//! - the implementation identifier `gormPlayerTagRepository` (the concrete type)
//!
//! Both are pure functions of the unit name plus the configured suffix and
//! prefix.

use serde::Serialize;

/// Separators that split a unit name into segments.
const SEGMENT_SEPARATORS: [char; 2] = ['_', '-'];

/// Interface and implementation identifiers for one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentifierPair {
    /// Name of the abstract contract type, e.g. `RoleRepository`.
    pub interface: String,
    /// Name of the concrete type, e.g. `gormRoleRepository`.
    pub implementation: String,
}

impl IdentifierPair {
    /// Derive both identifiers for `unit`.
    ///
    /// Returns `None` when the unit name has no non-empty segment.
    pub fn derive(unit: &str, suffix: &str, prefix: &str) -> Option<Self> {
        let interface = interface_identifier(unit, suffix)?;
        let implementation = format!("{}{}", prefix, interface);
        Some(IdentifierPair {
            interface,
            implementation,
        })
    }
}

/// Build the interface identifier: capitalize every segment, concatenate,
/// append `suffix`.
pub fn interface_identifier(unit: &str, suffix: &str) -> Option<String> {
    let mut name = String::with_capacity(unit.len() + suffix.len());
    for segment in unit.split(SEGMENT_SEPARATORS).filter(|s| !s.is_empty()) {
        name.push_str(&capitalize(segment));
    }
    if name.is_empty() {
        return None;
    }
    name.push_str(suffix);
    Some(name)
}

/// Uppercase the first character and lowercase the rest.
fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
