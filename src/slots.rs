//! Per-batch texture → texture-unit assignments.

use std::collections::HashMap;

use crate::texture::TextureId;
use crate::types::WHITE_SLOT;

/// Maps texture identities to the texture unit they occupy in the current
/// batch.
///
/// Valid for one batch only: the engine clears it on every reset. Slot 0 is
/// reserved for the white texture and is never stored here.
#[derive(Debug, Default)]
pub struct TextureSlotCache {
    slots: HashMap<TextureId, u32>,
}

impl TextureSlotCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot assigned to `id` in this batch, if any.
    #[must_use]
    pub fn get(&self, id: TextureId) -> Option<u32> {
        self.slots.get(&id).copied()
    }

    /// Record that `id` occupies `slot`.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is the reserved white slot.
    pub fn assign(&mut self, id: TextureId, slot: u32) {
        assert_ne!(slot, WHITE_SLOT, "slot {WHITE_SLOT} is reserved");
        self.slots.insert(id, slot);
    }

    /// Forget every assignment.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Number of textures assigned in this batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no texture is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
