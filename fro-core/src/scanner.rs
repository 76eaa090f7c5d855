use phf::{phf_map, Map};

use crate::error::Error;
use crate::token::{Location, Token, Type};

pub struct Scanner;

impl Scanner {
    const KEYWORDS: Map<&'static str, Type> = phf_map! {
        "let" => Type::Let,
        "true" => Type::True,
        "false" => Type::False,
        "in" => Type::In,
        "if" => Type::If,
        "else" => Type::Else,
        "for" => Type::For,
        "while" => Type::While,
        "fn" => Type::Function,
        "return" => Type::Return,
        "break" => Type::Break,
        "continue" => Type::Continue,
        "try" => Type::Try,
        "catch" => Type::Catch,
        "finally" => Type::Finally,
    };

    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Scanner
    }

    pub fn scan_tokens(&mut self, src: &str) -> TokenStream {
        TokenStream::new(src)
    }

    pub fn keyword(word: &str) -> Option<Type> {
        Scanner::KEYWORDS.get(word).copied()
    }
}

pub struct TokenStream {
    src: Vec<char>,

    // `start` and `current` points to the start and end of the token being scanned
    start: usize,
    current: usize,

    line: usize,
    // Index of the first character of the current line, used to derive columns
    line_start: usize,
    // Location of the token being scanned, captured before its first character is consumed
    location: Location,

    // This flag is set to `true` if the eof is reached and the eof token has been emitted.
    // This is required because the iterator needs to distinguish between when eof is reached but
    // the token is not emitted, and eof is reached and token has been emitted.
    eof: bool,
    error: Option<Error>,
}

impl TokenStream {
    pub fn new(src: &str) -> Self {
        TokenStream {
            src: src.chars().collect(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            location: Location::new(1, 1),
            eof: false,
            error: None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Location just past the last consumed character.
    pub fn location(&self) -> Location {
        Location::new(self.line, self.current - self.line_start + 1)
    }

    fn scan_token(&mut self) -> Result<Option<Token>, Error> {
        let c = self.advance();

        let token = match c {
            '(' => Some(self.make_token(Type::LeftParen)),
            ')' => Some(self.make_token(Type::RightParen)),
            '{' => Some(self.make_token(Type::LeftBrace)),
            '}' => Some(self.make_token(Type::RightBrace)),
            '[' => Some(self.make_token(Type::LeftBracket)),
            ']' => Some(self.make_token(Type::RightBracket)),
            ',' => Some(self.make_token(Type::Comma)),
            ';' => Some(self.make_token(Type::SemiColon)),
            ':' => Some(self.make_token(Type::Colon)),
            '+' => Some(self.make_token(Type::Plus)),
            '-' => Some(self.make_token(Type::Minus)),
            '&' => Some(self.make_token(Type::And)),
            '|' => Some(self.make_token(Type::Or)),

            '/' => {
                if self.match_char('*') {
                    Some(self.make_token(Type::CommentOpen))
                } else {
                    Some(self.make_token(Type::Slash))
                }
            }

            '*' => {
                if self.match_char('/') {
                    Some(self.make_token(Type::CommentClose))
                } else {
                    Some(self.make_token(Type::Star))
                }
            }

            '!' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::BangEqual))
                } else {
                    Some(self.make_token(Type::Bang))
                }
            }

            '=' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::EqualEqual))
                } else {
                    Some(self.make_token(Type::Assign))
                }
            }

            '<' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::LessEqual))
                } else {
                    Some(self.make_token(Type::Less))
                }
            }

            '>' => {
                if self.match_char('=') {
                    Some(self.make_token(Type::GreaterEqual))
                } else {
                    Some(self.make_token(Type::Greater))
                }
            }

            '"' => Some(self.string()?),

            // White spaces, do nothing
            ' ' | '\t' | '\r' => None,

            '\n' => {
                self.new_line();
                None
            }

            _ => {
                if c.is_ascii_digit() {
                    Some(self.number())
                } else if c.is_alphabetic() || c == '_' {
                    Some(self.identifier())
                } else {
                    // Unknown characters are handed over to the parser, which decides whether
                    // they matter (they do not inside a comment span)
                    Some(self.make_token(Type::Illegal))
                }
            }
        };

        Ok(token)
    }

    fn string(&mut self) -> Result<Token, Error> {
        let mut value = String::new();

        while self.peek() != '"' && !self.is_at_end() {
            let c = self.advance();
            match c {
                '\n' => {
                    self.new_line();
                    value.push(c);
                }
                '\\' => {
                    if self.is_at_end() {
                        break;
                    }

                    let escaped = self.advance();
                    match escaped {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '"' => value.push('"'),
                        '\\' => value.push('\\'),
                        ch => {
                            return Err(Error::UnknownEscape {
                                ch,
                                location: self.location,
                            })
                        }
                    }
                }
                _ => value.push(c),
            }
        }

        if self.is_at_end() {
            return Err(Error::UnterminatedString {
                location: self.location,
            });
        }

        // consume the closing "
        self.advance();
        Ok(Token {
            ty: Type::String,
            literal: value,
            location: self.location,
        })
    }

    // Digits and dots are scanned greedily, deciding whether the text is actually a valid number
    // is left to the parser so that it can be reported as a syntax error with its location.
    fn number(&mut self) -> Token {
        while self.peek().is_ascii_digit() || self.peek() == '.' {
            self.advance();
        }

        if self.lexeme().contains('.') {
            self.make_token(Type::Float)
        } else {
            self.make_token(Type::Integer)
        }
    }

    fn identifier(&mut self) -> Token {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        match Scanner::keyword(&self.lexeme()) {
            None => self.make_token(Type::Identifier),
            Some(keyword) => self.make_token(keyword),
        }
    }

    fn lexeme(&self) -> String {
        self.src[self.start..self.current].iter().collect()
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.src[self.current]
        }
    }

    fn advance(&mut self) -> char {
        let res = self.src[self.current];
        self.current += 1;
        res
    }

    fn match_char(&mut self, c: char) -> bool {
        if self.is_at_end() || self.src[self.current] != c {
            false
        } else {
            self.current += 1;
            true
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.line_start = self.current;
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.src.len()
    }

    fn make_token(&mut self, ty: Type) -> Token {
        let literal = match ty {
            Type::Eof => String::new(),
            _ => self.lexeme(),
        };

        Token {
            ty,
            literal,
            location: self.location,
        }
    }
}

impl Iterator for TokenStream {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof || self.error.is_some() {
            return None;
        }

        while !self.is_at_end() {
            self.start = self.current;
            self.location = self.location();

            let token = self.scan_token();
            match token {
                Ok(None) => continue,
                Ok(Some(token)) => return Some(token),
                Err(err) => {
                    self.error = Some(err);
                    return None;
                }
            }
        }

        self.eof = true;
        self.start = self.current;
        self.location = self.location();
        Some(self.make_token(Type::Eof))
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::scanner::Scanner;
    use crate::token::{Location, Token, Type};

    fn scan(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::new();
        scanner.scan_tokens(source).collect()
    }

    #[test]
    fn test_basic_scanning() {
        let source = "let foo = fn(a) { a + 12.45 } \"hello\" true false";

        assert_eq!(
            scan(source),
            vec![
                Token::new(Type::Let, "let", 1, 1),
                Token::new(Type::Identifier, "foo", 1, 5),
                Token::new(Type::Assign, "=", 1, 9),
                Token::new(Type::Function, "fn", 1, 11),
                Token::new(Type::LeftParen, "(", 1, 13),
                Token::new(Type::Identifier, "a", 1, 14),
                Token::new(Type::RightParen, ")", 1, 15),
                Token::new(Type::LeftBrace, "{", 1, 17),
                Token::new(Type::Identifier, "a", 1, 19),
                Token::new(Type::Plus, "+", 1, 21),
                Token::new(Type::Float, "12.45", 1, 23),
                Token::new(Type::RightBrace, "}", 1, 29),
                Token::new(Type::String, "hello", 1, 31),
                Token::new(Type::True, "true", 1, 39),
                Token::new(Type::False, "false", 1, 44),
                Token::new(Type::Eof, "", 1, 49),
            ]
        );
    }

    #[test]
    fn test_operators() {
        let types: Vec<Type> = scan("== != <= >= < > = ! & | in [ ] : ; , /* */ * /")
            .into_iter()
            .map(|token| token.ty)
            .collect();

        assert_eq!(
            types,
            vec![
                Type::EqualEqual,
                Type::BangEqual,
                Type::LessEqual,
                Type::GreaterEqual,
                Type::Less,
                Type::Greater,
                Type::Assign,
                Type::Bang,
                Type::And,
                Type::Or,
                Type::In,
                Type::LeftBracket,
                Type::RightBracket,
                Type::Colon,
                Type::SemiColon,
                Type::Comma,
                Type::CommentOpen,
                Type::CommentClose,
                Type::Star,
                Type::Slash,
                Type::Eof,
            ]
        );
    }

    #[test]
    fn test_locations_across_lines() {
        let tokens = scan("let a\n  break;\ncontinue");
        let locations: Vec<Location> = tokens.iter().map(|token| token.location).collect();

        assert_eq!(
            locations,
            vec![
                Location::new(1, 1),
                Location::new(1, 5),
                Location::new(2, 3),
                Location::new(2, 8),
                Location::new(3, 1),
                Location::new(3, 9),
            ]
        );
    }

    #[test]
    fn test_numbers_are_not_validated() {
        let tokens = scan("10 1.5 1.2.3");
        assert_eq!(tokens[0], Token::new(Type::Integer, "10", 1, 1));
        assert_eq!(tokens[1], Token::new(Type::Float, "1.5", 1, 4));
        assert_eq!(tokens[2], Token::new(Type::Float, "1.2.3", 1, 8));
    }

    #[test]
    fn test_string_escapes() {
        let tokens = scan(r#""a\"b\n\\""#);
        assert_eq!(tokens[0], Token::new(Type::String, "a\"b\n\\", 1, 1));
    }

    #[test]
    fn test_illegal_character() {
        let tokens = scan("a @ b");
        assert_eq!(tokens[1], Token::new(Type::Illegal, "@", 1, 3));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn test_unterminated_string() {
        let source = "let a = \"hello";
        let mut scanner = Scanner::new();
        let mut stream = scanner.scan_tokens(source);
        stream.by_ref().last();

        assert_eq!(
            stream.error().unwrap(),
            &Error::UnterminatedString {
                location: Location::new(1, 9)
            }
        );
    }

    #[test]
    fn test_unknown_escape() {
        let mut scanner = Scanner::new();
        let mut stream = scanner.scan_tokens("\"\\q\"");
        stream.by_ref().last();

        assert_eq!(
            stream.error().unwrap(),
            &Error::UnknownEscape {
                ch: 'q',
                location: Location::new(1, 1)
            }
        );
    }
}
