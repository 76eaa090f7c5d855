use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use fro_core::{Token, Type};
use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::ast::{Block, Expr, ExprVisitor, FunctionLiteral, Identifier, Program, Stmt, StmtVisitor};
use crate::builtins;
use crate::callable::{Builtin, Function};
use crate::config::Config;
use crate::env::Environment;
use crate::error::Error;
use crate::value::{HashPair, Value};

/// Everything that stops the evaluation of a statement before it completes normally.
#[derive(Debug)]
pub(crate) enum Unwind {
    Return(Value),
    Break(Token),
    Continue(Token),
    // A runtime error of the script, catchable by `try`
    Raise(Rc<String>),
    Fatal(Error),
}

impl From<String> for Unwind {
    fn from(msg: String) -> Self {
        Unwind::Raise(Rc::new(msg))
    }
}

type Eval = Result<Value, Unwind>;

fn raise<T>(msg: String) -> Result<T, Unwind> {
    Err(Unwind::from(msg))
}

fn outside_loop(token: &Token) -> String {
    format!("'{}' outside of a loop at {}", token.literal, token.location)
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,
    env: Rc<RefCell<Environment>>,
    builtins: HashMap<&'static str, Rc<Builtin>>,
    config: Config,
    // Script function calls currently being evaluated
    depth: usize,
}

impl Interpreter {
    pub fn new(stdout: Rc<RefCell<dyn Write>>) -> Self {
        Interpreter::with_config(stdout, Config::default())
    }

    pub fn with_config(stdout: Rc<RefCell<dyn Write>>, config: Config) -> Self {
        let globals = Rc::new(RefCell::new(Environment::new()));

        Interpreter {
            env: globals.clone(),
            globals,
            builtins: builtins::catalog(stdout),
            config,
            depth: 0,
        }
    }

    /// Evaluates the program in the root environment, bindings stay around for the next call.
    ///
    /// A runtime error that no `try` catches is the result of the program, as an error value.
    /// `Err` is reserved for failures that abort the evaluation, currently a too deep recursion.
    pub fn interpret(&mut self, program: &Program) -> Result<Value, Error> {
        debug!(statements = program.statements.len(), "evaluating program");

        let result = match self.execute_statements(&program.statements) {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Raise(msg)) => Ok(Value::Error(msg)),
            Err(Unwind::Break(token)) | Err(Unwind::Continue(token)) => {
                Ok(Value::error(outside_loop(&token)))
            }
            Err(Unwind::Fatal(err)) => {
                warn!(error = %err, "evaluation aborted");
                self.env = self.globals.clone();
                self.depth = 0;
                Err(err)
            }
        };

        debug!(result = ?result, "program evaluated");
        result
    }

    // Statements run in the current environment, the value of the last one is the result.
    fn execute_statements(&mut self, statements: &[Stmt]) -> Eval {
        let mut result = Value::Null;
        for stmt in statements {
            #[cfg(feature = "debug-trace-execution")]
            trace!(stmt = %stmt, location = %stmt.token().location, "execute");

            result = self.visit_stmt(stmt)?;
        }
        Ok(result)
    }

    pub(crate) fn execute_block_with_env(
        &mut self,
        block: &Block,
        env: Rc<RefCell<Environment>>,
    ) -> Eval {
        let current = std::mem::replace(&mut self.env, env);
        let result = self.execute_statements(&block.statements);
        self.env = current;
        result
    }

    fn child_env(&self) -> Environment {
        Environment::with(self.env.clone())
    }

    // Folds the outcome of one iteration into whether the loop goes on.
    fn loop_body(&mut self, body: &Block) -> Result<bool, Unwind> {
        match self.execute_statements(&body.statements) {
            Ok(_) | Err(Unwind::Continue(_)) => Ok(true),
            Err(Unwind::Break(_)) => Ok(false),
            Err(unwind) => Err(unwind),
        }
    }

    fn call_function(&mut self, paren: &Token, function: &Function, args: Vec<Value>) -> Eval {
        if args.len() != function.arity() {
            return raise(format!(
                "Wrong number of arguments to {}. Got={} want={}",
                function.name(),
                args.len(),
                function.arity()
            ));
        }

        if self.depth >= self.config.max_call_depth {
            return Err(Unwind::Fatal(Error::StackOverflow {
                location: paren.location,
                limit: self.config.max_call_depth,
            }));
        }

        let mut env = Environment::with(function.closure());
        for (param, arg) in function.params().iter().zip(args) {
            env.define(param.name(), arg);
        }

        trace!(function = function.name(), depth = self.depth, "call");
        self.depth += 1;
        let result = self.execute_block_with_env(function.body(), Rc::new(RefCell::new(env)));
        self.depth -= 1;

        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(Unwind::Break(token)) | Err(Unwind::Continue(token)) => raise(outside_loop(&token)),
            Err(unwind) => Err(unwind),
        }
    }

    fn evaluate_all(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, Unwind> {
        exprs.iter().map(|expr| self.visit_expr(expr)).collect()
    }
}

impl ExprVisitor for Interpreter {
    type Item = Eval;

    fn visit_identifier(&mut self, identifier: &Identifier) -> Eval {
        if let Some(value) = self.env.borrow().get(identifier.name()) {
            return Ok(value);
        }

        match self.builtins.get(identifier.name()) {
            Some(builtin) => Ok(Value::Builtin(Rc::clone(builtin))),
            None => raise(format!(
                "Identifier: {} not found at {}",
                identifier.name(),
                identifier.token.location
            )),
        }
    }

    fn visit_integer(&mut self, value: i64) -> Eval {
        Ok(Value::Integer(value))
    }

    fn visit_float(&mut self, value: f64) -> Eval {
        Ok(Value::Float(value))
    }

    fn visit_boolean(&mut self, value: bool) -> Eval {
        Ok(Value::Boolean(value))
    }

    fn visit_string(&mut self, value: &str) -> Eval {
        Ok(Value::from(value))
    }

    fn visit_array(&mut self, elements: &[Expr]) -> Eval {
        Ok(Value::array(self.evaluate_all(elements)?))
    }

    fn visit_hash(&mut self, pairs: &[(Expr, Expr)]) -> Eval {
        let mut entries = IndexMap::with_capacity(pairs.len());
        for (key, value) in pairs {
            let key = self.visit_expr(key)?;
            let hash_key = match key.hash_key() {
                Some(hash_key) => hash_key,
                None => return raise(format!("Key: {} cannot be hashed", key.kind())),
            };
            let value = self.visit_expr(value)?;
            entries.insert(hash_key, HashPair { key, value });
        }
        Ok(Value::hash(entries))
    }

    fn visit_function(&mut self, function: &Rc<FunctionLiteral>) -> Eval {
        let function = Function::new(self.env.clone(), Rc::clone(function));
        Ok(Value::Function(Rc::new(function)))
    }

    fn visit_prefix(&mut self, operator: &Token, right: &Expr) -> Eval {
        let right = self.visit_expr(right)?;
        match operator.ty {
            Type::Minus => Ok((-right)?),
            Type::Bang => Ok(!right),
            _ => raise(format!("Unknown operator: {}{}", operator.literal, right.kind())),
        }
    }

    // Both operands are evaluated before the operator is looked at, `and` and `or` included.
    fn visit_infix(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Eval {
        let left = self.visit_expr(left)?;
        let right = self.visit_expr(right)?;

        match operator.ty {
            Type::Plus => Ok((left + right)?),
            Type::Minus => Ok((left - right)?),
            Type::Star => Ok((left * right)?),
            Type::Slash => Ok((left / right)?),
            Type::EqualEqual => Ok(Value::Boolean(left == right)),
            Type::BangEqual => Ok(Value::Boolean(left != right)),
            Type::Less | Type::LessEqual | Type::Greater | Type::GreaterEqual => {
                Ok(left.compare(operator.ty, &right)?)
            }
            Type::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
            Type::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
            Type::In => Ok(Value::Boolean(right.contains(&left)?)),
            _ => raise(format!(
                "Unknown operator: {} {} {}",
                left.kind(),
                operator.literal,
                right.kind()
            )),
        }
    }

    fn visit_assign(&mut self, name: &Identifier, value: &Expr) -> Eval {
        let value = self.visit_expr(value)?;
        match self.env.borrow_mut().assign(name.name(), value.clone()) {
            Ok(()) => Ok(value),
            Err(_) => raise(format!(
                "Identifier: {} is not defined at {}",
                name.name(),
                name.token.location
            )),
        }
    }

    fn visit_index(&mut self, _: &Token, left: &Expr, index: &Expr) -> Eval {
        let left = self.visit_expr(left)?;
        let index = self.visit_expr(index)?;
        Ok(left.index(&index)?)
    }

    fn visit_call(&mut self, paren: &Token, callee: &Expr, args: &[Expr]) -> Eval {
        let callee = self.visit_expr(callee)?;
        let args = self.evaluate_all(args)?;

        match callee {
            Value::Function(function) => self.call_function(paren, &function, args),
            Value::Builtin(builtin) => {
                trace!(builtin = builtin.name(), "call");
                Ok(builtin.call(&args)?)
            }
            other => raise(format!("{}: not a function", other.kind())),
        }
    }

    fn visit_if(
        &mut self,
        condition: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Eval {
        if self.visit_expr(condition)?.is_truthy() {
            self.execute_statements(&consequence.statements)
        } else if let Some(alternative) = alternative {
            self.execute_statements(&alternative.statements)
        } else {
            Ok(Value::Null)
        }
    }
}

impl StmtVisitor for Interpreter {
    type Item = Eval;

    fn visit_let(&mut self, name: &Identifier, value: &Expr) -> Eval {
        let value = self.visit_expr(value)?;
        self.env.borrow_mut().define(name.name(), value);
        Ok(Value::Null)
    }

    fn visit_return(&mut self, value: &Expr) -> Eval {
        Err(Unwind::Return(self.visit_expr(value)?))
    }

    fn visit_expression(&mut self, expression: &Expr) -> Eval {
        self.visit_expr(expression)
    }

    fn visit_for(&mut self, element: &Identifier, iterable: &Expr, body: &Block) -> Eval {
        let iterable = self.visit_expr(iterable)?;
        let elements = match iterable.elements() {
            Some(elements) => elements,
            None => return raise(format!("{}: is not iterable", iterable.kind())),
        };

        // One environment for the whole loop, the element is rebound in it on every iteration
        let env = Rc::new(RefCell::new(self.child_env()));
        let current = std::mem::replace(&mut self.env, env);

        let mut result = Ok(Value::Null);
        for value in elements {
            self.env.borrow_mut().define(element.name(), value);
            match self.loop_body(body) {
                Ok(true) => {}
                Ok(false) => break,
                Err(unwind) => {
                    result = Err(unwind);
                    break;
                }
            }
        }

        self.env = current;
        result
    }

    fn visit_while(&mut self, condition: &Expr, body: &Block) -> Eval {
        let env = Rc::new(RefCell::new(self.child_env()));
        let current = std::mem::replace(&mut self.env, env);

        let result = loop {
            match self.visit_expr(condition) {
                Ok(value) if value.is_truthy() => {}
                Ok(_) => break Ok(Value::Null),
                Err(unwind) => break Err(unwind),
            }

            match self.loop_body(body) {
                Ok(true) => {}
                Ok(false) => break Ok(Value::Null),
                Err(unwind) => break Err(unwind),
            }
        };

        self.env = current;
        result
    }

    fn visit_break(&mut self, token: &Token) -> Eval {
        Err(Unwind::Break(token.clone()))
    }

    fn visit_continue(&mut self, token: &Token) -> Eval {
        Err(Unwind::Continue(token.clone()))
    }

    fn visit_try(
        &mut self,
        body: &Block,
        error: &Identifier,
        catch: &Block,
        finally: Option<&Block>,
    ) -> Eval {
        let result = match self.execute_statements(&body.statements) {
            Err(Unwind::Raise(msg)) => {
                debug!(error = %msg, "caught");
                let mut env = self.child_env();
                env.define(error.name(), Value::Error(msg));
                self.execute_block_with_env(catch, Rc::new(RefCell::new(env)))
            }
            result => result,
        };

        if let Err(Unwind::Fatal(_)) = result {
            return result;
        }

        // `finally` only replaces the outcome when it does not complete normally itself
        if let Some(finally) = finally {
            self.execute_statements(&finally.statements)?;
        }
        result
    }
}
