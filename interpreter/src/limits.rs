pub const DEFAULT_MAX_CALL_DEPTH: usize = 256;

// Stack given to the thread that runs scripts in the binary. Every call of a script function
// goes through a couple dozen native frames.
pub const EVAL_STACK_SIZE: usize = 64 * 1024 * 1024;

pub(crate) const REPL_PROMPT: &str = ">> ";
