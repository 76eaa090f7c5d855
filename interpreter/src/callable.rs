use std::cell::RefCell;
use std::fmt::{Debug, Display, Formatter};
use std::rc::Rc;

use crate::ast::{Block, FunctionLiteral, Identifier};
use crate::env::Environment;
use crate::value::Value;

/// A function value: the literal it was created from plus the environment it was created in.
pub struct Function {
    closure: Rc<RefCell<Environment>>,
    literal: Rc<FunctionLiteral>,
}

impl Function {
    // The literal is shared with the AST, creating a closure never copies the body.
    pub(crate) fn new(closure: Rc<RefCell<Environment>>, literal: Rc<FunctionLiteral>) -> Self {
        Function { closure, literal }
    }

    pub fn name(&self) -> &str {
        self.literal.name.as_deref().unwrap_or("anonymous")
    }

    pub fn arity(&self) -> usize {
        self.literal.params.len()
    }

    pub(crate) fn params(&self) -> &[Identifier] {
        &self.literal.params
    }

    pub(crate) fn body(&self) -> &Block {
        &self.literal.body
    }

    pub(crate) fn closure(&self) -> Rc<RefCell<Environment>> {
        Rc::clone(&self.closure)
    }
}

impl Display for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "fn")?;
        if let Some(name) = &self.literal.name {
            write!(f, " {}", name)?;
        }
        write!(f, "(")?;
        for (idx, param) in self.literal.params.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param)?;
        }
        write!(f, ") {{...}}")
    }
}

// The closure is left out, it usually holds the function itself.
impl Debug for Function {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

/// Native operations get the evaluated arguments and either produce a value or the message of a
/// runtime error.
pub(crate) type BoxedFunction = Box<dyn Fn(&[Value]) -> Result<Value, String>>;

// `Builtin` bridges native rust calls and scripts. They are created per interpreter and looked up
// by name after the environment chain.
pub struct Builtin {
    func: BoxedFunction,
    name: &'static str,
}

impl Builtin {
    pub(crate) fn new(name: &'static str, func: BoxedFunction) -> Self {
        Builtin { func, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.func)(args)
    }
}

impl Debug for Builtin {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<builtin {}>", self.name)
    }
}
