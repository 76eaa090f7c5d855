mod ast;
mod builtins;
mod callable;
mod config;
mod env;
mod error;
mod evaluator;
mod limits;
mod parser;
pub mod repl;
mod value;

use fro_core::Scanner;
use tracing::debug;

pub use ast::{Block, Expr, FunctionLiteral, Identifier, Program, Stmt};
pub use callable::{Builtin, Function};
pub use config::Config;
pub use error::Error;
pub use evaluator::Interpreter;
pub use limits::{DEFAULT_MAX_CALL_DEPTH, EVAL_STACK_SIZE};
pub use parser::Parser;
pub use value::{HashKey, HashPair, Kind, Pairs, Value};

/// Scans and parses `src`. The program is only handed out when there were no errors at all.
pub fn parse(src: &str) -> Result<Program, Vec<Error>> {
    let mut scanner = Scanner::new();
    let (program, errors) = Parser::new(scanner.scan_tokens(src)).parse();

    if errors.is_empty() {
        Ok(program)
    } else {
        debug!(errors = errors.len(), "parsing failed");
        Err(errors)
    }
}
