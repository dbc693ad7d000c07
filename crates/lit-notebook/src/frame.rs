//! Embedded frame identifiers.

use uuid::Uuid;

/// Prefix shared by every generated frame id.
pub const FRAME_ID_PREFIX: &str = "lit-frame-";

/// Random identifier for one embedded frame in a notebook document.
///
/// Drawn from a v4 UUID, so two frames in the same document only collide
/// with negligible probability.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameId(String);

impl FrameId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(format!("{FRAME_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    /// Use a caller-chosen identifier.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FrameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let ids: HashSet<FrameId> = (0..1000).map(|_| FrameId::generate()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_generated_id_shape() {
        let id = FrameId::generate();
        let hex = id.as_str().strip_prefix(FRAME_ID_PREFIX).unwrap();
        assert_eq!(hex.len(), 32);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
