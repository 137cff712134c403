//! Draft identifiers.
//!
//! A draft row that has never been persisted carries a client-minted
//! identifier such as `couleur-1` or `variante-3`. Persisted identifiers
//! are UUIDs, so temporary and real ids are always distinguishable.

use uuid::Uuid;

/// A draft identifier is temporary iff it is not a valid UUID.
pub fn is_temp_id(id: &str) -> bool {
    Uuid::parse_str(id).is_err()
}

/// Parses a persisted identifier, `None` for temporary ones.
pub fn parse_persisted_id(id: &str) -> Option<Uuid> {
    Uuid::parse_str(id).ok()
}
