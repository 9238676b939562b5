/// Engine settings chosen by the embedding program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run the syntax checker before building each statement's tree.
    pub syntax_check: bool,
    /// Upper bound on statements executed while handling one submitted line.
    pub max_steps: Option<u64>,
    /// Nested user function calls allowed before a call is refused.
    pub max_call_depth: usize,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_syntax_check(mut self, enabled: bool) -> Self {
        self.syntax_check = enabled;
        self
    }

    pub fn with_max_steps(mut self, limit: Option<u64>) -> Self {
        self.max_steps = limit;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            syntax_check: true,
            max_steps: None,
            max_call_depth: 128,
        }
    }
}
