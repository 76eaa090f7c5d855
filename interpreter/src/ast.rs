use std::fmt::{Display, Formatter, Write};
use std::rc::Rc;

use fro_core::Token;

// Tokens are cloned into every node, they are small and the cloning happens during parsing only.
// Nodes are never mutated once the parser hands the program over.

#[derive(Debug, PartialEq, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Identifier {
    pub token: Token,
}

impl Identifier {
    pub fn new(token: Token) -> Self {
        Identifier { token }
    }

    pub fn name(&self) -> &str {
        &self.token.literal
    }
}

/// Statements between braces, evaluated as a unit by `if`, loops, functions and `try`.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
    pub token: Token,
    pub statements: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionLiteral {
    pub token: Token,
    // Set when the literal is bound by `let`, used for rendering only
    pub name: Option<String>,
    pub params: Vec<Identifier>,
    pub body: Block,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    Identifier(Identifier),
    Integer {
        token: Token,
        value: i64,
    },
    Float {
        token: Token,
        value: f64,
    },
    Boolean {
        token: Token,
        value: bool,
    },
    Str {
        token: Token,
        value: String,
    },
    Array {
        token: Token,
        elements: Vec<Expr>,
    },
    Hash {
        token: Token,
        // Kept in source order so evaluation and rendering are deterministic
        pairs: Vec<(Expr, Expr)>,
    },
    Function(Rc<FunctionLiteral>),
    Prefix {
        operator: Token,
        right: Box<Expr>,
    },
    Infix {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },
    Assign {
        token: Token,
        name: Identifier,
        value: Box<Expr>,
    },
    Index {
        token: Token,
        left: Box<Expr>,
        index: Box<Expr>,
    },
    Call {
        paren: Token,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    If {
        token: Token,
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
    },
}

pub(crate) trait ExprVisitor {
    type Item;

    fn visit_expr(&mut self, expr: &Expr) -> Self::Item {
        match expr {
            Expr::Identifier(identifier) => self.visit_identifier(identifier),
            Expr::Integer { value, .. } => self.visit_integer(*value),
            Expr::Float { value, .. } => self.visit_float(*value),
            Expr::Boolean { value, .. } => self.visit_boolean(*value),
            Expr::Str { value, .. } => self.visit_string(value),
            Expr::Array { elements, .. } => self.visit_array(elements),
            Expr::Hash { pairs, .. } => self.visit_hash(pairs),
            Expr::Function(function) => self.visit_function(function),
            Expr::Prefix { operator, right } => self.visit_prefix(operator, right),
            Expr::Infix {
                left,
                operator,
                right,
            } => self.visit_infix(left, operator, right),
            Expr::Assign { name, value, .. } => self.visit_assign(name, value),
            Expr::Index { token, left, index } => self.visit_index(token, left, index),
            Expr::Call {
                paren,
                callee,
                args,
            } => self.visit_call(paren, callee, args),
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => self.visit_if(condition, consequence, alternative.as_ref()),
        }
    }

    fn visit_identifier(&mut self, identifier: &Identifier) -> Self::Item;
    fn visit_integer(&mut self, value: i64) -> Self::Item;
    fn visit_float(&mut self, value: f64) -> Self::Item;
    fn visit_boolean(&mut self, value: bool) -> Self::Item;
    fn visit_string(&mut self, value: &str) -> Self::Item;
    fn visit_array(&mut self, elements: &[Expr]) -> Self::Item;
    fn visit_hash(&mut self, pairs: &[(Expr, Expr)]) -> Self::Item;
    fn visit_function(&mut self, function: &Rc<FunctionLiteral>) -> Self::Item;
    fn visit_prefix(&mut self, operator: &Token, right: &Expr) -> Self::Item;
    fn visit_infix(&mut self, left: &Expr, operator: &Token, right: &Expr) -> Self::Item;
    fn visit_assign(&mut self, name: &Identifier, value: &Expr) -> Self::Item;
    fn visit_index(&mut self, token: &Token, left: &Expr, index: &Expr) -> Self::Item;
    fn visit_call(&mut self, paren: &Token, callee: &Expr, args: &[Expr]) -> Self::Item;
    fn visit_if(
        &mut self,
        condition: &Expr,
        consequence: &Block,
        alternative: Option<&Block>,
    ) -> Self::Item;
}

impl Expr {
    // Creator methods used by the parser, mostly to hide the boxing.
    pub(crate) fn prefix(operator: Token, right: Expr) -> Self {
        Expr::Prefix {
            operator,
            right: Box::new(right),
        }
    }

    pub(crate) fn infix(left: Expr, operator: Token, right: Expr) -> Self {
        Expr::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub(crate) fn assign(token: Token, name: Identifier, value: Expr) -> Self {
        Expr::Assign {
            token,
            name,
            value: Box::new(value),
        }
    }

    pub(crate) fn index(token: Token, left: Expr, index: Expr) -> Self {
        Expr::Index {
            token,
            left: Box::new(left),
            index: Box::new(index),
        }
    }

    pub(crate) fn call(paren: Token, callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            paren,
            callee: Box::new(callee),
            args,
        }
    }

    pub fn token(&self) -> &Token {
        match self {
            Expr::Identifier(identifier) => &identifier.token,
            Expr::Function(function) => &function.token,
            Expr::Integer { token, .. }
            | Expr::Float { token, .. }
            | Expr::Boolean { token, .. }
            | Expr::Str { token, .. }
            | Expr::Array { token, .. }
            | Expr::Hash { token, .. }
            | Expr::Assign { token, .. }
            | Expr::Index { token, .. }
            | Expr::If { token, .. } => token,
            Expr::Prefix { operator, .. } | Expr::Infix { operator, .. } => operator,
            Expr::Call { paren, .. } => paren,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().literal
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Let {
        token: Token,
        name: Identifier,
        value: Expr,
    },
    Return {
        token: Token,
        value: Expr,
    },
    Expression {
        token: Token,
        expression: Expr,
    },
    For {
        token: Token,
        element: Identifier,
        iterable: Expr,
        body: Block,
    },
    While {
        token: Token,
        condition: Expr,
        body: Block,
    },
    Break {
        token: Token,
    },
    Continue {
        token: Token,
    },
    Try {
        token: Token,
        body: Block,
        error: Identifier,
        catch: Block,
        finally: Option<Block>,
    },
}

pub(crate) trait StmtVisitor {
    type Item;

    fn visit_stmt(&mut self, stmt: &Stmt) -> Self::Item {
        match stmt {
            Stmt::Let { name, value, .. } => self.visit_let(name, value),
            Stmt::Return { value, .. } => self.visit_return(value),
            Stmt::Expression { expression, .. } => self.visit_expression(expression),
            Stmt::For {
                element,
                iterable,
                body,
                ..
            } => self.visit_for(element, iterable, body),
            Stmt::While {
                condition, body, ..
            } => self.visit_while(condition, body),
            Stmt::Break { token } => self.visit_break(token),
            Stmt::Continue { token } => self.visit_continue(token),
            Stmt::Try {
                body,
                error,
                catch,
                finally,
                ..
            } => self.visit_try(body, error, catch, finally.as_ref()),
        }
    }

    fn visit_let(&mut self, name: &Identifier, value: &Expr) -> Self::Item;
    fn visit_return(&mut self, value: &Expr) -> Self::Item;
    fn visit_expression(&mut self, expression: &Expr) -> Self::Item;
    fn visit_for(&mut self, element: &Identifier, iterable: &Expr, body: &Block) -> Self::Item;
    fn visit_while(&mut self, condition: &Expr, body: &Block) -> Self::Item;
    fn visit_break(&mut self, token: &Token) -> Self::Item;
    fn visit_continue(&mut self, token: &Token) -> Self::Item;
    fn visit_try(
        &mut self,
        body: &Block,
        error: &Identifier,
        catch: &Block,
        finally: Option<&Block>,
    ) -> Self::Item;
}

impl Stmt {
    pub fn token(&self) -> &Token {
        match self {
            Stmt::Let { token, .. }
            | Stmt::Return { token, .. }
            | Stmt::Expression { token, .. }
            | Stmt::For { token, .. }
            | Stmt::While { token, .. }
            | Stmt::Break { token }
            | Stmt::Continue { token }
            | Stmt::Try { token, .. } => token,
        }
    }

    pub fn token_literal(&self) -> &str {
        &self.token().literal
    }
}

// The string forms below are valid source code: feeding them back to the parser produces a tree
// with the same string form. Operators are fully parenthesised to make grouping visible.

fn write_list<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> std::fmt::Result {
    for (idx, item) in items.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

fn write_quoted(f: &mut Formatter<'_>, value: &str) -> std::fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}

impl Display for Program {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (idx, stmt) in self.statements.iter().enumerate() {
            if idx > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{}", stmt)?;
        }
        Ok(())
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_char('{')?;
        for stmt in &self.statements {
            write!(f, " {}", stmt)?;
        }
        f.write_str(" }")
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("fn(")?;
        write_list(f, &self.params)?;
        write!(f, ") {}", self.body)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Identifier(identifier) => write!(f, "{}", identifier),
            Expr::Integer { token, .. } | Expr::Float { token, .. } => {
                f.write_str(&token.literal)
            }
            Expr::Boolean { value, .. } => write!(f, "{}", value),
            Expr::Str { value, .. } => write_quoted(f, value),
            Expr::Array { elements, .. } => {
                f.write_char('[')?;
                write_list(f, elements)?;
                f.write_char(']')
            }
            Expr::Hash { pairs, .. } => {
                f.write_char('{')?;
                for (idx, (key, value)) in pairs.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_char('}')
            }
            Expr::Function(function) => write!(f, "{}", function),
            Expr::Prefix { operator, right } => write!(f, "({}{})", operator.literal, right),
            Expr::Infix {
                left,
                operator,
                right,
            } => write!(f, "({} {} {})", left, operator.literal, right),
            Expr::Assign { name, value, .. } => write!(f, "({} = {})", name, value),
            Expr::Index { left, index, .. } => write!(f, "({}[{}])", left, index),
            Expr::Call { callee, args, .. } => {
                write!(f, "{}(", callee)?;
                write_list(f, args)?;
                f.write_char(')')
            }
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", alternative)?;
                }
                Ok(())
            }
        }
    }
}

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Let { name, value, .. } => write!(f, "let {} = {};", name, value),
            Stmt::Return { value, .. } => write!(f, "return {};", value),
            Stmt::Expression { expression, .. } => write!(f, "{};", expression),
            Stmt::For {
                element,
                iterable,
                body,
                ..
            } => write!(f, "for ({} in {}) {}", element, iterable, body),
            Stmt::While {
                condition, body, ..
            } => write!(f, "while ({}) {}", condition, body),
            Stmt::Break { .. } => f.write_str("break;"),
            Stmt::Continue { .. } => f.write_str("continue;"),
            Stmt::Try {
                body,
                error,
                catch,
                finally,
                ..
            } => {
                write!(f, "try {} catch ({}) {}", body, error, catch)?;
                if let Some(finally) = finally {
                    write!(f, " finally {}", finally)?;
                }
                Ok(())
            }
        }
    }
}
