use crate::limits::DEFAULT_MAX_CALL_DEPTH;

/// Settings of an interpreter instance. The binary fills it from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Nested function calls allowed before evaluation is aborted with a stack overflow.
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}
