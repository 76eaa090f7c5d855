use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Identifier,
    Integer,
    Float,
    String,
    True,
    False,

    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Assign,

    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,

    And,
    Or,
    In,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    SemiColon,
    Colon,
    CommentOpen,
    CommentClose,

    Let,
    If,
    Else,
    For,
    While,
    Function,
    Return,
    Break,
    Continue,
    Try,
    Catch,
    Finally,

    Illegal,
    Eof,
}

impl Type {
    pub fn as_str(&self) -> &'static str {
        match self {
            Type::Identifier => "IDENTIFIER",
            Type::Integer => "INTEGER",
            Type::Float => "FLOAT",
            Type::String => "STRING",
            Type::True => "TRUE",
            Type::False => "FALSE",
            Type::Plus => "+",
            Type::Minus => "-",
            Type::Star => "*",
            Type::Slash => "/",
            Type::Bang => "!",
            Type::Assign => "=",
            Type::EqualEqual => "==",
            Type::BangEqual => "!=",
            Type::Less => "<",
            Type::LessEqual => "<=",
            Type::Greater => ">",
            Type::GreaterEqual => ">=",
            Type::And => "&",
            Type::Or => "|",
            Type::In => "in",
            Type::LeftParen => "(",
            Type::RightParen => ")",
            Type::LeftBrace => "{",
            Type::RightBrace => "}",
            Type::LeftBracket => "[",
            Type::RightBracket => "]",
            Type::Comma => ",",
            Type::SemiColon => ";",
            Type::Colon => ":",
            Type::CommentOpen => "/*",
            Type::CommentClose => "*/",
            Type::Let => "LET",
            Type::If => "IF",
            Type::Else => "ELSE",
            Type::For => "FOR",
            Type::While => "WHILE",
            Type::Function => "FUNCTION",
            Type::Return => "RETURN",
            Type::Break => "BREAK",
            Type::Continue => "CONTINUE",
            Type::Try => "TRY",
            Type::Catch => "CATCH",
            Type::Finally => "FINALLY",
            Type::Illegal => "ILLEGAL",
            Type::Eof => "EOF",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of the first character of a token, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Location {
    pub line: usize,
    pub col: usize,
}

impl Location {
    pub fn new(line: usize, col: usize) -> Self {
        Location { line, col }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// For string tokens `literal` holds the decoded contents without the quotes, for every other
// token it is the exact source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: Type,
    pub literal: String,
    pub location: Location,
}

impl Token {
    pub fn new(ty: Type, literal: impl Into<String>, line: usize, col: usize) -> Self {
        Token {
            ty,
            literal: literal.into(),
            location: Location::new(line, col),
        }
    }

    pub fn is(&self, ty: Type) -> bool {
        self.ty == ty
    }
}
