//! Options for decoding extraction responses and grouping words.

/// Options for decoding an extraction response.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,
}

impl DecodeOptions {
    /// Create new decode options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (drop malformed boxes instead of failing).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }
}

/// Error handling mode while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Reject the payload on any malformed box
    #[default]
    Strict,
    /// Drop a malformed box; the element becomes unlocatable
    Lenient,
}

/// Options for grouping words into text blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockOptions {
    /// Smallest horizontal gap that can separate two blocks
    pub min_gap: f32,

    /// Multiple of the median word gap that separates two blocks
    pub gap_factor: f32,
}

impl BlockOptions {
    /// Create new block options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum gap.
    pub fn with_min_gap(mut self, min_gap: f32) -> Self {
        self.min_gap = min_gap;
        self
    }

    /// Set the gap factor.
    pub fn with_gap_factor(mut self, gap_factor: f32) -> Self {
        self.gap_factor = gap_factor;
        self
    }
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            min_gap: 5.0,
            gap_factor: 2.0,
        }
    }
}
