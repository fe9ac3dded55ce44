//! Table alignment options.

/// What to do with a field whose nearest column is already occupied by an
/// earlier field of the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Discard the later field (legacy behavior)
    #[default]
    Drop,
    /// Place the later field in the nearest column that is still free,
    /// dropping it only when the row is full
    NearestFree,
}

/// Options for table alignment.
#[derive(Debug, Clone)]
pub struct AlignOptions {
    /// Collision handling
    pub collision: CollisionPolicy,

    /// Whether to align multiple tables in parallel
    pub parallel: bool,
}

impl AlignOptions {
    /// Create new align options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set collision policy.
    pub fn with_collision(mut self, collision: CollisionPolicy) -> Self {
        self.collision = collision;
        self
    }

    /// Reassign colliding fields to the nearest free column.
    pub fn nearest_free(mut self) -> Self {
        self.collision = CollisionPolicy::NearestFree;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            collision: CollisionPolicy::Drop,
            parallel: true,
        }
    }
}
