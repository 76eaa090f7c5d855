use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::exit;
use std::rc::Rc;
use std::thread;

use clap::Parser;
use interpreter::{repl, Config, Interpreter, Value, DEFAULT_MAX_CALL_DEPTH, EVAL_STACK_SIZE};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Runs FroLang scripts. Without a script or `-c`, starts an interactive session.
#[derive(Parser, Debug)]
#[command(name = "fro", version, about, long_about = None)]
struct Cli {
    /// Source code to run instead of a file.
    #[arg(short = 'c')]
    code: Option<String>,

    /// Nested function calls allowed before the script is aborted.
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Script to run, the file name must end in `.fro`.
    path: Option<PathBuf>,
}

enum Input {
    Source(String),
    Repl,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();
    let config = Config {
        max_call_depth: args.max_depth,
    };

    let input = if let Some(path) = args.path {
        if path.extension().map_or(true, |extension| extension != "fro") {
            eprintln!("Error: {} is not a .fro file", path.display());
            exit(1);
        }
        match fs::read_to_string(&path) {
            Ok(src) => Input::Source(src),
            Err(err) => {
                eprintln!("Error: cannot read {}: {}", path.display(), err);
                exit(1);
            }
        }
    } else if let Some(code) = args.code {
        Input::Source(code)
    } else {
        Input::Repl
    };

    // Evaluation recurses on the native stack, the main thread's one is too small for deep scripts
    let handle = thread::Builder::new()
        .name(String::from("evaluator"))
        .stack_size(EVAL_STACK_SIZE)
        .spawn(move || execute(input, config));

    let code = match handle {
        Ok(handle) => handle.join().unwrap_or(101),
        Err(err) => {
            eprintln!("Error: cannot start the evaluator: {}", err);
            1
        }
    };
    exit(code);
}

fn execute(input: Input, config: Config) -> i32 {
    let stdout = Rc::new(RefCell::new(io::stdout()));

    let src = match input {
        Input::Repl => {
            return match repl::start(io::stdin().lock(), stdout, config) {
                Ok(()) => 0,
                Err(err) => {
                    eprintln!("Error: {}", err);
                    1
                }
            }
        }
        Input::Source(src) => src,
    };

    let program = match interpreter::parse(&src) {
        Ok(program) => program,
        Err(errors) => {
            if let Err(err) = repl::write_parse_errors(&mut io::stdout(), &errors) {
                eprintln!("Error: {}", err);
            }
            return 1;
        }
    };

    let mut interpreter = Interpreter::with_config(stdout, config);
    match interpreter.interpret(&program) {
        Ok(Value::Null) => 0,
        Ok(value @ Value::Error(_)) => {
            println!("{}", value);
            1
        }
        Ok(value) => {
            println!("{}", value);
            0
        }
        Err(err) => {
            debug!(error = ?err, "script aborted");
            eprintln!("Error: {}", err);
            1
        }
    }
}
