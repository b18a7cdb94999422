/// Bounds enforced while compiling a pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompileLimits {
    /// Maximum nesting of groups and classes (default: 4,096).
    pub(crate) parse_depth: u32,
    /// Maximum number of capture groups (default: 32,767).
    pub(crate) max_captures: u16,
    /// Largest count accepted in `{n,m}` (default: 100,000).
    pub(crate) repeat_max: u32,
    /// Nesting of unbounded quantifiers at which explosion guards are
    /// emitted (default: 2; 0 disables the guard).
    pub(crate) explosion_depth: u16,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            parse_depth: 4096,
            max_captures: 32767,
            repeat_max: 100_000,
            explosion_depth: 2,
        }
    }
}

impl CompileLimits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_depth(mut self, depth: u32) -> Self {
        self.parse_depth = depth;
        self
    }

    pub fn max_captures(mut self, max: u16) -> Self {
        self.max_captures = max;
        self
    }

    pub fn repeat_max(mut self, max: u32) -> Self {
        self.repeat_max = max;
        self
    }

    pub fn explosion_depth(mut self, depth: u16) -> Self {
        self.explosion_depth = depth;
        self
    }

    pub fn get_parse_depth(&self) -> u32 {
        self.parse_depth
    }

    pub fn get_max_captures(&self) -> u16 {
        self.max_captures
    }

    pub fn get_repeat_max(&self) -> u32 {
        self.repeat_max
    }

    pub fn get_explosion_depth(&self) -> u16 {
        self.explosion_depth
    }
}
