use std::collections::HashMap;
use std::rc::Rc;

use fro_core::{Token, TokenStream, Type};
use tracing::trace;

use crate::ast::{Block, Expr, FunctionLiteral, Identifier, Program, Stmt};
use crate::error::Error;

type PrefixRule = fn(&mut Parser) -> Option<Expr>;
type InfixRule = fn(&mut Parser, Expr) -> Option<Expr>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

/// Pratt parser over a token stream with one token of lookahead.
///
/// Failing rules record an error and return `None`, the statement loop then skips ahead to a
/// likely statement boundary and carries on, so one pass reports as many errors as possible.
pub struct Parser {
    tokens: TokenStream,
    current: Token,
    peek: Token,
    // Number of tokens moved past, lets error recovery know whether it made progress
    consumed: usize,
    // Depth of blocks being parsed, a `}` only ends error recovery when it can close one
    blocks: usize,
    errors: Vec<Error>,
    prefix_rules: HashMap<Type, PrefixRule>,
    infix_rules: HashMap<Type, (Precedence, InfixRule)>,
}

impl Parser {
    pub fn new(tokens: TokenStream) -> Self {
        let mut parser = Parser {
            tokens,
            current: Token::new(Type::Eof, "", 0, 0),
            peek: Token::new(Type::Eof, "", 0, 0),
            consumed: 0,
            blocks: 0,
            errors: Vec::new(),
            prefix_rules: HashMap::new(),
            infix_rules: HashMap::new(),
        };

        parser.register_prefix(Type::Identifier, Parser::parse_identifier);
        parser.register_prefix(Type::Integer, Parser::parse_integer);
        parser.register_prefix(Type::Float, Parser::parse_float);
        parser.register_prefix(Type::String, Parser::parse_string);
        parser.register_prefix(Type::True, Parser::parse_boolean);
        parser.register_prefix(Type::False, Parser::parse_boolean);
        parser.register_prefix(Type::Bang, Parser::parse_prefix);
        parser.register_prefix(Type::Minus, Parser::parse_prefix);
        parser.register_prefix(Type::LeftParen, Parser::parse_grouped);
        parser.register_prefix(Type::LeftBracket, Parser::parse_array);
        parser.register_prefix(Type::LeftBrace, Parser::parse_hash);
        parser.register_prefix(Type::Function, Parser::parse_function);
        parser.register_prefix(Type::If, Parser::parse_if);

        for ty in [Type::EqualEqual, Type::BangEqual, Type::And, Type::Or, Type::In] {
            parser.register_infix(ty, Precedence::Equals, Parser::parse_infix);
        }
        for ty in [
            Type::Less,
            Type::LessEqual,
            Type::Greater,
            Type::GreaterEqual,
        ] {
            parser.register_infix(ty, Precedence::LessGreater, Parser::parse_infix);
        }
        parser.register_infix(Type::Plus, Precedence::Sum, Parser::parse_infix);
        parser.register_infix(Type::Minus, Precedence::Sum, Parser::parse_infix);
        parser.register_infix(Type::Star, Precedence::Product, Parser::parse_infix);
        parser.register_infix(Type::Slash, Precedence::Product, Parser::parse_infix);
        parser.register_infix(Type::Assign, Precedence::Equals, Parser::parse_assign);
        parser.register_infix(Type::LeftParen, Precedence::Call, Parser::parse_call);
        parser.register_infix(Type::LeftBracket, Precedence::Index, Parser::parse_index);

        // fill both `current` and `peek`
        parser.next_token();
        parser.next_token();
        parser
    }

    fn register_prefix(&mut self, ty: Type, rule: PrefixRule) {
        self.prefix_rules.insert(ty, rule);
    }

    fn register_infix(&mut self, ty: Type, precedence: Precedence, rule: InfixRule) {
        self.infix_rules.insert(ty, (precedence, rule));
    }

    /// Parses the whole stream. The program holds every statement that parsed cleanly, it should
    /// only be evaluated when the error list is empty.
    pub fn parse(mut self) -> (Program, Vec<Error>) {
        let mut statements = Vec::new();

        while !self.current_is(Type::Eof) {
            if let Some(stmt) = self.statement() {
                statements.push(stmt);
            }
        }

        trace!(
            statements = statements.len(),
            errors = self.errors.len(),
            "parsed program"
        );
        (Program { statements }, self.errors)
    }

    // Parses one statement and leaves the cursor on the first token after it.
    fn statement(&mut self) -> Option<Stmt> {
        match self.current.ty {
            Type::SemiColon => {
                self.next_token();
                return None;
            }
            Type::CommentOpen => {
                self.skip_comment();
                return None;
            }
            _ => {}
        }

        let start = self.consumed;
        match self.parse_statement() {
            Some(stmt) => {
                if self.peek_is(Type::SemiColon) {
                    self.next_token();
                }
                self.next_token();
                Some(stmt)
            }
            None => {
                self.synchronize(start);
                None
            }
        }
    }

    fn parse_statement(&mut self) -> Option<Stmt> {
        match self.current.ty {
            Type::Let => self.parse_let(),
            Type::Return => self.parse_return(),
            Type::For => self.parse_for(),
            Type::While => self.parse_while(),
            Type::Break => Some(Stmt::Break {
                token: self.current.clone(),
            }),
            Type::Continue => Some(Stmt::Continue {
                token: self.current.clone(),
            }),
            Type::Try => self.parse_try(),
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_let(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        self.expect_peek(Type::Identifier)?;
        let name = Identifier::new(self.current.clone());
        self.expect_peek(Type::Assign)?;
        self.next_token();

        let mut value = self.parse_expression(Precedence::Lowest)?;
        if let Expr::Function(function) = &mut value {
            // the literal was created just now, nothing else holds it yet
            if let Some(function) = Rc::get_mut(function) {
                function.name = Some(name.name().to_string());
            }
        }

        Some(Stmt::Let { token, name, value })
    }

    fn parse_return(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Return { token, value })
    }

    fn parse_for(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        let parens = self.peek_is(Type::LeftParen);
        if parens {
            self.next_token();
        }

        self.expect_peek(Type::Identifier)?;
        let element = Identifier::new(self.current.clone());
        self.expect_peek(Type::In)?;
        self.next_token();
        let iterable = self.parse_expression(Precedence::Lowest)?;

        if parens {
            self.expect_peek(Type::RightParen)?;
        }
        self.expect_peek(Type::LeftBrace)?;
        let body = self.parse_block()?;

        Some(Stmt::For {
            token,
            element,
            iterable,
            body,
        })
    }

    // A parenthesised condition is just a grouped expression, no special casing needed.
    fn parse_while(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Type::LeftBrace)?;
        let body = self.parse_block()?;

        Some(Stmt::While {
            token,
            condition,
            body,
        })
    }

    fn parse_try(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        self.expect_peek(Type::LeftBrace)?;
        let body = self.parse_block()?;

        self.expect_peek(Type::Catch)?;
        let parens = self.peek_is(Type::LeftParen);
        if parens {
            self.next_token();
        }
        self.expect_peek(Type::Identifier)?;
        let error = Identifier::new(self.current.clone());
        if parens {
            self.expect_peek(Type::RightParen)?;
        }
        self.expect_peek(Type::LeftBrace)?;
        let catch = self.parse_block()?;

        let mut finally = None;
        if self.peek_is(Type::Finally) {
            self.next_token();
            self.expect_peek(Type::LeftBrace)?;
            finally = Some(self.parse_block()?);
        }

        Some(Stmt::Try {
            token,
            body,
            error,
            catch,
            finally,
        })
    }

    fn parse_expression_statement(&mut self) -> Option<Stmt> {
        let token = self.current.clone();
        let expression = self.parse_expression(Precedence::Lowest)?;
        Some(Stmt::Expression { token, expression })
    }

    // Expects the cursor on `{` and leaves it on the matching `}`.
    fn parse_block(&mut self) -> Option<Block> {
        let token = self.current.clone();
        let mut statements = Vec::new();
        self.next_token();

        self.blocks += 1;
        while !self.current_is(Type::RightBrace) && !self.current_is(Type::Eof) {
            if let Some(stmt) = self.statement() {
                statements.push(stmt);
            }
        }
        self.blocks -= 1;

        if !self.current_is(Type::RightBrace) {
            self.errors
                .push(Error::unexpected_token(Type::RightBrace, &self.current));
            return None;
        }

        Some(Block { token, statements })
    }

    fn skip_comment(&mut self) {
        while !self.current_is(Type::CommentClose) && !self.current_is(Type::Eof) {
            self.next_token();
        }
        if self.current_is(Type::CommentClose) {
            self.next_token();
        }
    }

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expr> {
        let prefix = match self.prefix_rules.get(&self.current.ty) {
            Some(rule) => *rule,
            None => {
                self.no_prefix_error();
                return None;
            }
        };
        let mut left = prefix(self)?;

        while !self.peek_is(Type::SemiColon) && precedence < self.peek_precedence() {
            let infix = match self.infix_rules.get(&self.peek.ty) {
                Some((_, rule)) => *rule,
                None => return Some(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expr> {
        Some(Expr::Identifier(Identifier::new(self.current.clone())))
    }

    fn parse_integer(&mut self) -> Option<Expr> {
        match self.current.literal.parse::<i64>() {
            Ok(value) => Some(Expr::Integer {
                token: self.current.clone(),
                value,
            }),
            Err(_) => {
                self.error(&format!(
                    "Could not parse \"{}\" as integer",
                    self.current.literal
                ));
                None
            }
        }
    }

    fn parse_float(&mut self) -> Option<Expr> {
        match self.current.literal.parse::<f64>() {
            Ok(value) => Some(Expr::Float {
                token: self.current.clone(),
                value,
            }),
            Err(_) => {
                self.error(&format!(
                    "Could not parse \"{}\" as float",
                    self.current.literal
                ));
                None
            }
        }
    }

    fn parse_string(&mut self) -> Option<Expr> {
        Some(Expr::Str {
            token: self.current.clone(),
            value: self.current.literal.clone(),
        })
    }

    fn parse_boolean(&mut self) -> Option<Expr> {
        Some(Expr::Boolean {
            token: self.current.clone(),
            value: self.current_is(Type::True),
        })
    }

    fn parse_prefix(&mut self) -> Option<Expr> {
        let operator = self.current.clone();
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expr::prefix(operator, right))
    }

    fn parse_grouped(&mut self) -> Option<Expr> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Type::RightParen)?;
        Some(expr)
    }

    fn parse_array(&mut self) -> Option<Expr> {
        let token = self.current.clone();
        let elements = self.parse_list(Type::RightBracket, Parser::parse_list_expression)?;
        Some(Expr::Array { token, elements })
    }

    fn parse_hash(&mut self) -> Option<Expr> {
        let token = self.current.clone();
        let mut pairs = Vec::new();

        while !self.peek_is(Type::RightBrace) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(Type::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));

            if !self.peek_is(Type::RightBrace) {
                self.expect_peek(Type::Comma)?;
            }
        }
        self.expect_peek(Type::RightBrace)?;

        Some(Expr::Hash { token, pairs })
    }

    fn parse_function(&mut self) -> Option<Expr> {
        let token = self.current.clone();
        self.expect_peek(Type::LeftParen)?;
        let params = self.parse_list(Type::RightParen, Parser::parse_param)?;
        self.expect_peek(Type::LeftBrace)?;
        let body = self.parse_block()?;

        Some(Expr::Function(Rc::new(FunctionLiteral {
            token,
            name: None,
            params,
            body,
        })))
    }

    fn parse_if(&mut self) -> Option<Expr> {
        let token = self.current.clone();
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Type::LeftBrace)?;
        let consequence = self.parse_block()?;

        let mut alternative = None;
        if self.peek_is(Type::Else) {
            self.next_token();
            if self.peek_is(Type::If) {
                // `else if` is sugar for an else block holding a single `if`
                self.next_token();
                let block_token = self.current.clone();
                let nested = self.parse_if()?;
                alternative = Some(Block {
                    token: block_token.clone(),
                    statements: vec![Stmt::Expression {
                        token: block_token,
                        expression: nested,
                    }],
                });
            } else {
                self.expect_peek(Type::LeftBrace)?;
                alternative = Some(self.parse_block()?);
            }
        }

        Some(Expr::If {
            token,
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }

    fn parse_infix(&mut self, left: Expr) -> Option<Expr> {
        let operator = self.current.clone();
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expr::infix(left, operator, right))
    }

    // Assignment binds like equality but recurses at the lowest level for its value, which makes
    // `a = b = 1` group to the right.
    fn parse_assign(&mut self, left: Expr) -> Option<Expr> {
        let token = self.current.clone();
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;

        match left {
            Expr::Identifier(name) => Some(Expr::assign(token, name, value)),
            _ => {
                self.errors.push(Error::parser_error(
                    &token,
                    "Cannot assign value to a non-identifier",
                ));
                None
            }
        }
    }

    fn parse_call(&mut self, callee: Expr) -> Option<Expr> {
        let paren = self.current.clone();
        let args = self.parse_list(Type::RightParen, Parser::parse_list_expression)?;
        Some(Expr::call(paren, callee, args))
    }

    fn parse_index(&mut self, left: Expr) -> Option<Expr> {
        let token = self.current.clone();
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(Type::RightBracket)?;
        Some(Expr::index(token, left, index))
    }

    // Comma separated items up to `end`, starting with the cursor on the opening delimiter and
    // leaving it on `end`. Shared by arguments, array elements and parameters.
    fn parse_list<T>(&mut self, end: Type, item: fn(&mut Parser) -> Option<T>) -> Option<Vec<T>> {
        let mut items = Vec::new();
        if self.peek_is(end) {
            self.next_token();
            return Some(items);
        }

        self.next_token();
        items.push(item(self)?);
        while self.peek_is(Type::Comma) {
            self.next_token();
            self.next_token();
            items.push(item(self)?);
        }
        self.expect_peek(end)?;

        Some(items)
    }

    fn parse_list_expression(&mut self) -> Option<Expr> {
        self.parse_expression(Precedence::Lowest)
    }

    fn parse_param(&mut self) -> Option<Identifier> {
        if self.current_is(Type::Identifier) {
            Some(Identifier::new(self.current.clone()))
        } else {
            self.errors
                .push(Error::unexpected_token(Type::Identifier, &self.current));
            None
        }
    }

    // Skips the rest of a broken statement. Stops after a `;`, or in front of a statement keyword
    // or a block's `}` once at least one token has been skipped.
    fn synchronize(&mut self, start: usize) {
        while !self.current_is(Type::Eof) {
            let moved = self.consumed > start;
            match self.current.ty {
                Type::SemiColon => {
                    self.next_token();
                    return;
                }
                Type::RightBrace if moved && self.blocks > 0 => return,
                Type::Let
                | Type::Return
                | Type::For
                | Type::While
                | Type::Break
                | Type::Continue
                | Type::Try
                    if moved =>
                {
                    return
                }
                _ => {}
            }
            self.next_token();
        }
    }

    fn next_token(&mut self) {
        let next = self.pull();
        self.current = std::mem::replace(&mut self.peek, next);
        self.consumed += 1;
    }

    // The stream stops yielding after its `Eof` or after a scanning failure, both end up as an
    // `Eof` token here. A scanning failure is recorded once, when it first shows up.
    fn pull(&mut self) -> Token {
        if let Some(token) = self.tokens.next() {
            return token;
        }

        if let Some(err) = self.tokens.error() {
            let err = Error::from(err.clone());
            if !self.errors.contains(&err) {
                self.errors.push(err);
            }
        }

        let location = self.tokens.location();
        Token::new(Type::Eof, "", location.line, location.col)
    }

    fn current_is(&self, ty: Type) -> bool {
        self.current.is(ty)
    }

    fn peek_is(&self, ty: Type) -> bool {
        self.peek.is(ty)
    }

    fn expect_peek(&mut self, ty: Type) -> Option<()> {
        if self.peek_is(ty) {
            self.next_token();
            Some(())
        } else {
            self.errors.push(Error::unexpected_token(ty, &self.peek));
            None
        }
    }

    fn peek_precedence(&self) -> Precedence {
        self.infix_rules
            .get(&self.peek.ty)
            .map_or(Precedence::Lowest, |(precedence, _)| *precedence)
    }

    fn current_precedence(&self) -> Precedence {
        self.infix_rules
            .get(&self.current.ty)
            .map_or(Precedence::Lowest, |(precedence, _)| *precedence)
    }

    fn no_prefix_error(&mut self) {
        let msg = match self.current.ty {
            Type::Illegal => format!("Illegal token: {}", self.current.literal),
            ty => format!("No prefix parse function registered for {}", ty),
        };
        self.error(&msg);
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(Error::parser_error(&self.current, msg));
    }
}

#[cfg(test)]
mod tests {
    use fro_core::{Error as CoreError, Location, Scanner};

    use crate::ast::{Expr, Program, Stmt};
    use crate::error::Error;
    use crate::parser::Parser;

    fn parse(src: &str) -> (Program, Vec<Error>) {
        let mut scanner = Scanner::new();
        Parser::new(scanner.scan_tokens(src)).parse()
    }

    fn parse_ok(src: &str) -> Program {
        let (program, errors) = parse(src);
        assert!(errors.is_empty(), "{}: {:?}", src, errors);
        program
    }

    fn error_strings(src: &str) -> Vec<String> {
        parse(src).1.iter().map(|err| err.to_string()).collect()
    }

    #[test]
    fn test_operator_precedence() {
        let tests = [
            ("-a * b", "((-a) * b);"),
            ("!-a", "(!(-a));"),
            ("a + b + c", "((a + b) + c);"),
            ("a - b - c", "((a - b) - c);"),
            ("a + b * c + d / e - f", "(((a + (b * c)) + (d / e)) - f);"),
            ("5 > 4 == 3 < 4", "((5 > 4) == (3 < 4));"),
            (
                "3 + 4 * 5 == 3 * 1 + 4 * 5",
                "((3 + (4 * 5)) == ((3 * 1) + (4 * 5)));",
            ),
            ("a & b | c", "((a & b) | c);"),
            ("x in xs == true", "((x in xs) == true);"),
            ("x == 1 & y <= 2.5", "((x == 1) & (y <= 2.5));"),
            ("1 + (2 + 3) + 4", "((1 + (2 + 3)) + 4);"),
            ("(5 + 5) * 2", "((5 + 5) * 2);"),
            (
                "a * [1, 2, 3, 4][b * c] * d",
                "((a * ([1, 2, 3, 4][(b * c)])) * d);",
            ),
            (
                "add(a * b[2], b[1], 2 * [1, 2][1])",
                "add((a * (b[2])), (b[1]), (2 * ([1, 2][1])));",
            ),
            ("a + add(b * c) + d", "((a + add((b * c))) + d);"),
            ("-f(x)[0]", "(-(f(x)[0]));"),
            ("a = b = 1", "(a = (b = 1));"),
            ("a = 1 + 2", "(a = (1 + 2));"),
        ];

        for (src, expected) in tests {
            assert_eq!(parse_ok(src).to_string(), expected, "{}", src);
        }
    }

    #[test]
    fn test_statements() {
        let tests = [
            ("let x = 5;", "let x = 5;"),
            ("let s = \"a\\\"b\"", "let s = \"a\\\"b\";"),
            ("return x * 2", "return (x * 2);"),
            (
                "let add = fn(a, b) { return a + b; };",
                "let add = fn(a, b) { return (a + b); };",
            ),
            ("fn() {}", "fn() { };"),
            (
                "if (x < y) { x } else { y }",
                "if ((x < y)) { x; } else { y; };",
            ),
            (
                "if a { 1 } else if b { 2 } else { 3 }",
                "if (a) { 1; } else { if (b) { 2; } else { 3; }; };",
            ),
            (
                "for (i in range(0, 3)) { print(i); }",
                "for (i in range(0, 3)) { print(i); }",
            ),
            ("for i in xs { continue; }", "for (i in xs) { continue; }"),
            (
                "while x < 3 { x = x + 1; break }",
                "while ((x < 3)) { (x = (x + 1)); break; }",
            ),
            (
                "try { 10 / 0 } catch e { str(e) } finally { print(\"done\") }",
                "try { (10 / 0); } catch (e) { str(e); } finally { print(\"done\"); }",
            ),
            ("try { a } catch (err) { }", "try { a; } catch (err) { }"),
            ("{\"a\": 1, 2: [true]}", "{\"a\": 1, 2: [true]};"),
            ("{}", "{};"),
            ("1.50 + 2", "(1.50 + 2);"),
        ];

        for (src, expected) in tests {
            assert_eq!(parse_ok(src).to_string(), expected, "{}", src);
        }
    }

    #[test]
    fn test_let_names_function_literal() {
        let program = parse_ok("let add = fn(a, b) { a + b }; let f = g;");

        match &program.statements[0] {
            Stmt::Let {
                name,
                value: Expr::Function(function),
                ..
            } => {
                assert_eq!(name.name(), "add");
                assert_eq!(function.name.as_deref(), Some("add"));
                assert_eq!(function.params.len(), 2);
            }
            stmt => panic!("unexpected statement {:?}", stmt),
        }
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_literal_values() {
        let program = parse_ok("10; 2.5; true; \"hi\";");
        let values: Vec<&Expr> = program
            .statements
            .iter()
            .map(|stmt| match stmt {
                Stmt::Expression { expression, .. } => expression,
                stmt => panic!("unexpected statement {:?}", stmt),
            })
            .collect();

        assert!(matches!(values[0], Expr::Integer { value: 10, .. }));
        assert!(matches!(values[1], Expr::Float { value, .. } if *value == 2.5));
        assert!(matches!(values[2], Expr::Boolean { value: true, .. }));
        assert!(matches!(values[3], Expr::Str { value, .. } if value == "hi"));
    }

    #[test]
    fn test_print_parse_idempotence() {
        let sources = [
            "let a = 5; a = a + 1; a",
            "let counter = fn() { let c = 0; fn() { c = c + 1; c } }; counter()()",
            "let xs = [1, \"two\", 3.0, [4]]; xs[1 + 2][0]",
            "let h = {\"a\": 1, true: fn(x) { x }}; h[\"a\"]",
            "if !(a == b) { -a } else if a in [1, 2] { a } else { \"tab\\t\" }",
            "for (x in \"abc\") { if x == \"b\" { continue } print(x) }",
            "let i = 0; while (i < 10) { i = i + 1; if i > 3 { break; } }",
            "try { 10 / 0 } catch e { str(e) } finally { print(\"done\") }",
            "fn(a, b) { return a & b | !a; }(true, false)",
            "{}; []; f()",
        ];

        for src in sources {
            let first = parse_ok(src).to_string();
            let second = parse_ok(&first).to_string();
            assert_eq!(first, second, "{}", src);
        }
    }

    #[test]
    fn test_comments_and_empty_statements() {
        let program = parse_ok(";; /* this @ is ignored */ let a = 1;; /* unterminated");
        assert_eq!(program.to_string(), "let a = 1;");

        let program = parse_ok("let a = 1 /* between */ let b = 2");
        assert_eq!(program.to_string(), "let a = 1;\nlet b = 2;");
    }

    #[test]
    fn test_errors() {
        let tests = [
            (
                "let = 5;",
                "[1:5] parse error: Expected next token to be IDENTIFIER, got = instead",
            ),
            (
                "let x 5;",
                "[1:7] parse error: Expected next token to be =, got INTEGER instead",
            ),
            (
                "1 + ;",
                "[1:5] parse error: No prefix parse function registered for ;",
            ),
            (
                "1 = 2",
                "[1:3] parse error: Cannot assign value to a non-identifier",
            ),
            (
                "a[0] = 2",
                "[1:6] parse error: Cannot assign value to a non-identifier",
            ),
            (
                "99999999999999999999",
                "[1:1] parse error: Could not parse \"99999999999999999999\" as integer",
            ),
            (
                "1.2.3",
                "[1:1] parse error: Could not parse \"1.2.3\" as float",
            ),
            ("a @ b", "[1:3] parse error: Illegal token: @"),
            (
                "fn() { 1",
                "[1:9] parse error: Expected next token to be }, got EOF instead",
            ),
            (
                "fn(a, 1) { a }",
                "[1:7] parse error: Expected next token to be IDENTIFIER, got INTEGER instead",
            ),
            (
                "try { 1 } finally { 2 }",
                "[1:11] parse error: Expected next token to be CATCH, got FINALLY instead",
            ),
        ];

        for (src, expected) in tests {
            assert_eq!(error_strings(src), vec![expected], "{}", src);
        }
    }

    #[test]
    fn test_collects_multiple_errors() {
        let (program, errors) = parse("let = 1; let y = ; let z = 3;");

        assert_eq!(
            errors.iter().map(|err| err.location()).collect::<Vec<_>>(),
            vec![Location::new(1, 5), Location::new(1, 18)]
        );
        assert_eq!(program.to_string(), "let z = 3;");
    }

    #[test]
    fn test_recovers_inside_blocks() {
        let (program, errors) = parse("let f = fn() { let = 1; 2 }; let b = 3;");
        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "let f = fn() { 2; };\nlet b = 3;");

        let (program, errors) = parse("} let a = 1;");
        assert_eq!(errors.len(), 1);
        assert_eq!(program.to_string(), "let a = 1;");
    }

    #[test]
    fn test_scanner_error_is_reported() {
        let (_, errors) = parse("let s = \"abc");

        assert_eq!(
            errors[0],
            Error::ScannerError {
                location: Location::new(1, 9),
                source: CoreError::UnterminatedString {
                    location: Location::new(1, 9)
                },
            }
        );
        assert_eq!(
            errors[0].to_string(),
            "[1:9] scanner error: unterminated string"
        );
    }
}
