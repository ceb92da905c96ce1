//! Batch capacity configuration.

use crate::error::{RenderError, RenderResult};

/// Quads per batch in the default configuration.
pub const DEFAULT_MAX_QUADS: usize = 10_000;

/// Texture units available to one batch in the default configuration,
/// including the reserved white slot.
pub const DEFAULT_MAX_TEXTURE_SLOTS: u32 = 16;

/// Upper bound on texture slots the generated fragment shader supports.
pub const MAX_SUPPORTED_TEXTURE_SLOTS: u32 = 32;

/// Capacity limits for one [`BatchEngine`](crate::BatchEngine).
///
/// Fixed for the lifetime of the engine: the CPU mirrors and GPU buffers are
/// sized from these values once, at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Vertices held by one batch before it must be flushed.
    pub max_vertices: usize,
    /// Indices held by one batch before it must be flushed.
    pub max_indices: usize,
    /// Texture units usable by one batch, slot 0 included.
    pub max_texture_slots: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::with_max_quads(DEFAULT_MAX_QUADS)
    }
}

impl BatchConfig {
    /// A configuration sized for `quads` quads (4 vertices, 6 indices each).
    #[must_use]
    pub fn with_max_quads(quads: usize) -> Self {
        Self {
            max_vertices: quads * 4,
            max_indices: quads * 6,
            max_texture_slots: DEFAULT_MAX_TEXTURE_SLOTS,
        }
    }

    /// Replace the texture slot count.
    #[must_use]
    pub fn with_max_texture_slots(mut self, slots: u32) -> Self {
        self.max_texture_slots = slots;
        self
    }

    /// Check that the configuration can hold at least one quad, that every
    /// vertex is addressable by a 32-bit index, that a batch's index count
    /// fits a 32-bit draw count, and that the slot count is within what the
    /// batch shader supports.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidConfig`] describing the first violated
    /// limit.
    pub fn validate(&self) -> RenderResult<()> {
        if self.max_vertices < 4 || self.max_indices < 6 {
            return Err(RenderError::InvalidConfig(format!(
                "capacity {}/{} cannot hold a single quad (4 vertices, 6 indices)",
                self.max_vertices, self.max_indices
            )));
        }
        if u32::try_from(self.max_vertices).is_err() {
            return Err(RenderError::InvalidConfig(format!(
                "{} vertices exceed the 32-bit index range",
                self.max_vertices
            )));
        }
        if u32::try_from(self.max_indices).is_err() {
            return Err(RenderError::InvalidConfig(format!(
                "{} indices exceed the 32-bit draw count range",
                self.max_indices
            )));
        }
        if !(2..=MAX_SUPPORTED_TEXTURE_SLOTS).contains(&self.max_texture_slots) {
            return Err(RenderError::InvalidConfig(format!(
                "max_texture_slots must be in 2..={MAX_SUPPORTED_TEXTURE_SLOTS}, got {}",
                self.max_texture_slots
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_holds_ten_thousand_quads() {
        let config = BatchConfig::default();
        assert_eq!(config.max_vertices, 40_000);
        assert_eq!(config.max_indices, 60_000);
        assert_eq!(config.max_texture_slots, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_capacity_below_one_quad() {
        let config = BatchConfig {
            max_vertices: 3,
            max_indices: 6,
            max_texture_slots: 16,
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidConfig(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_slot_counts() {
        let base = BatchConfig::with_max_quads(4);
        assert!(base.with_max_texture_slots(1).validate().is_err());
        assert!(base.with_max_texture_slots(33).validate().is_err());
        assert!(base.with_max_texture_slots(2).validate().is_ok());
        assert!(base.with_max_texture_slots(32).validate().is_ok());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn rejects_index_count_beyond_u32() {
        let config = BatchConfig {
            max_vertices: 4,
            max_indices: u32::MAX as usize + 1,
            max_texture_slots: 16,
        };
        assert!(matches!(
            config.validate(),
            Err(RenderError::InvalidConfig(message)) if message.contains("indices")
        ));
    }
}
