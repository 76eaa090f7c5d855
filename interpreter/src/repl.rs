use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::evaluator::Interpreter;
use crate::limits::REPL_PROMPT;
use crate::value::Value;

const BANNER: &str = "FroLang REPL, type an expression and press enter. Ctrl-D exits.";

/// Syntax errors are reported on the same stream as results, one `PARSE ERROR:` line each.
pub fn write_parse_errors(out: &mut dyn Write, errors: &[Error]) -> io::Result<()> {
    for err in errors {
        writeln!(out, "PARSE ERROR: {}", err)?;
    }
    Ok(())
}

/// Reads one line at a time from `input` and evaluates it. Every line shares the same root
/// environment, so bindings made on one line are visible on the next.
pub fn start<R: BufRead>(
    mut input: R,
    stdout: Rc<RefCell<dyn Write>>,
    config: Config,
) -> io::Result<()> {
    let mut interpreter = Interpreter::with_config(stdout.clone(), config);
    writeln!(stdout.borrow_mut(), "{}", BANNER)?;

    let mut line = String::new();
    loop {
        {
            let mut out = stdout.borrow_mut();
            write!(out, "{}", REPL_PROMPT)?;
            out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(stdout.borrow_mut())?;
            debug!("end of input, leaving the repl");
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let program = match crate::parse(&line) {
            Ok(program) => program,
            Err(errors) => {
                write_parse_errors(&mut *stdout.borrow_mut(), &errors)?;
                continue;
            }
        };

        match interpreter.interpret(&program) {
            Ok(Value::Null) => {}
            Ok(value) => writeln!(stdout.borrow_mut(), "{}", value)?,
            Err(err) => writeln!(stdout.borrow_mut(), "FATAL: {}", err)?,
        }
    }
}
