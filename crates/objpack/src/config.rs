//! Codec configuration

/// Default maximum container nesting depth.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Default minimum allocation for a fresh output buffer.
pub const DEFAULT_MIN_ALLOC: usize = 32;

/// Configuration for packing and unpacking.
///
/// This is passed through every encode and decode call and controls
/// the recursion limit and the output buffer's initial allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum container nesting depth (stack overflow protection)
    pub max_depth: usize,

    /// Minimum allocation of every byte sink, including extension scratch
    /// buffers
    pub min_alloc: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            min_alloc: DEFAULT_MIN_ALLOC,
        }
    }
}

impl CodecConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with a custom nesting depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Default::default()
        }
    }

    /// Set the minimum allocation of byte sinks (builder pattern).
    pub fn min_alloc(mut self, min_alloc: usize) -> Self {
        self.min_alloc = min_alloc.max(1);
        self
    }
}
