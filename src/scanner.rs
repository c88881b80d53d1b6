//! Lexical analysis: source text to a token stream ending in `Eof`.

use crate::session::Session;
use crate::token::{Token, TokenType};
use log::debug;
use std::iter::Peekable;
use std::str::CharIndices;

use phf::phf_map;

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and" => TokenType::And,
    "class" => TokenType::Class,
    "else" => TokenType::Else,
    "false" => TokenType::False,
    "for" => TokenType::For,
    "fun" => TokenType::Fun,
    "if" => TokenType::If,
    "nil" => TokenType::Nil,
    "or" => TokenType::Or,
    "print" => TokenType::Print,
    "return" => TokenType::Return,
    "super" => TokenType::Super,
    "this" => TokenType::This,
    "true" => TokenType::True,
    "var" => TokenType::Var,
    "while" => TokenType::While,
};

pub struct Scanner<'a, 's> {
    source: &'a str,
    iter: Peekable<CharIndices<'a>>,
    tokens: Vec<Token>,
    start: usize,
    line: usize,
    session: &'s mut Session,
}

impl<'a, 's> Scanner<'a, 's> {
    pub fn new(source: &'a str, session: &'s mut Session) -> Scanner<'a, 's> {
        Scanner {
            source,
            iter: source.char_indices().peekable(),
            tokens: Vec::new(),
            start: 0,
            line: 1,
            session,
        }
    }

    /// Scan the whole source. Bad characters and unterminated strings are
    /// reported through the session and skipped; scanning never aborts.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        while let Some((idx, _)) = self.iter.peek() {
            self.start = *idx;
            self.scan_token();
        }
        self.tokens.push(Token::new(TokenType::Eof, "", self.line));
        debug!("scanned {} token(s)", self.tokens.len());
        self.tokens
    }

    fn scan_token(&mut self) {
        let Some((_, c)) = self.iter.next() else {
            return;
        };
        match c {
            '(' => self.add_token(TokenType::LeftParen),
            ')' => self.add_token(TokenType::RightParen),
            '{' => self.add_token(TokenType::LeftBrace),
            '}' => self.add_token(TokenType::RightBrace),
            ',' => self.add_token(TokenType::Comma),
            '.' => self.add_token(TokenType::Dot),
            '-' => self.add_token(TokenType::Minus),
            '+' => self.add_token(TokenType::Plus),
            ';' => self.add_token(TokenType::Semicolon),
            '*' => self.add_token(TokenType::Star),
            '!' => {
                let kind = if self.next_if('=') {
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                };
                self.add_token(kind);
            }
            '=' => {
                let kind = if self.next_if('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                };
                self.add_token(kind);
            }
            '<' => {
                let kind = if self.next_if('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(kind);
            }
            '>' => {
                let kind = if self.next_if('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(kind);
            }
            '/' => {
                if self.next_if('/') {
                    // Line comment; runs to end of line.
                    while let Some((_, c)) = self.iter.peek() {
                        if *c == '\n' {
                            break;
                        }
                        self.iter.next();
                    }
                } else {
                    self.add_token(TokenType::Slash);
                }
            }
            ' ' | '\r' | '\t' => (),
            '\n' => {
                self.line += 1;
            }
            '"' => self.string(),
            '0'..='9' => self.number(),
            'a'..='z' | 'A'..='Z' | '_' => self.identifier(),
            _ => self.session.error(self.line, "Unexpected character."),
        }
    }

    /// Byte offset just past the last consumed character.
    fn current(&mut self) -> usize {
        match self.iter.peek() {
            None => self.source.len(),
            Some((idx, _)) => *idx,
        }
    }

    fn add_token(&mut self, kind: TokenType) {
        let current = self.current();
        self.tokens
            .push(Token::new(kind, &self.source[self.start..current], self.line));
    }

    fn next_if(&mut self, expected: char) -> bool {
        if let Some((_, c)) = self.iter.peek() {
            if *c == expected {
                self.iter.next();
                return true;
            }
        }
        false
    }

    fn string(&mut self) {
        while let Some((_, c)) = self.iter.peek() {
            match c {
                '"' => break,
                '\n' => {
                    self.line += 1;
                    self.iter.next();
                }
                _ => {
                    self.iter.next();
                }
            }
        }

        if self.iter.next().is_none() {
            self.session.error(self.line, "Unterminated string.");
            return;
        }

        // The literal excludes the surrounding quotes.
        let current = self.current();
        let literal = self.source[self.start + 1..current - 1].to_string();
        self.add_token(TokenType::String(literal));
    }

    fn number(&mut self) {
        self.digits();

        // A '.' is part of the number only when a digit follows it.
        let mut lookahead = self.iter.clone();
        if let Some((_, '.')) = lookahead.next() {
            if let Some((_, '0'..='9')) = lookahead.peek() {
                self.iter.next();
                self.digits();
            }
        }

        let current = self.current();
        let value = self.source[self.start..current]
            .parse()
            .expect("numeric lexeme parses as f64");
        self.add_token(TokenType::Number(value));
    }

    fn digits(&mut self) {
        while let Some((_, '0'..='9')) = self.iter.peek() {
            self.iter.next();
        }
    }

    fn identifier(&mut self) {
        while let Some((_, c)) = self.iter.peek() {
            match c {
                '0'..='9' | 'a'..='z' | 'A'..='Z' | '_' => {
                    self.iter.next();
                }
                _ => break,
            }
        }
        let current = self.current();
        let text = &self.source[self.start..current];
        match KEYWORDS.get(text) {
            Some(kind) => self.add_token(kind.clone()),
            None => self.add_token(TokenType::Identifier),
        }
    }
}

#[cfg(test)]
mod scanner_tests {
    use super::*;

    fn scan(source: &str) -> (Vec<Token>, bool) {
        let mut session = Session::new();
        let tokens = Scanner::new(source, &mut session).scan_tokens();
        (tokens, session.had_error())
    }

    #[test]
    fn basic_scanner_test() {
        let (tokens, had_error) = scan("x = 2");
        assert!(!had_error);
        assert_eq!(tokens.len(), 4);
        assert!(matches!(tokens[0].kind, TokenType::Identifier));
        assert_eq!(tokens[0].lexeme, "x");
        assert!(matches!(tokens[1].kind, TokenType::Equal));
        assert!(matches!(tokens[2].kind, TokenType::Number(n) if n == 2.0));
        assert!(matches!(tokens[3].kind, TokenType::Eof));
    }

    #[test]
    fn two_char_operators() {
        let (tokens, had_error) = scan("! != = == < <= > >=");
        assert!(!had_error);
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                TokenType::Bang,
                TokenType::BangEqual,
                TokenType::Equal,
                TokenType::EqualEqual,
                TokenType::Less,
                TokenType::LessEqual,
                TokenType::Greater,
                TokenType::GreaterEqual,
                TokenType::Eof,
            ]
        );
    }

    #[test]
    fn keywords_versus_identifiers() {
        let (tokens, _) = scan("class classy or orchid");
        assert!(matches!(tokens[0].kind, TokenType::Class));
        assert!(matches!(tokens[1].kind, TokenType::Identifier));
        assert_eq!(tokens[1].lexeme, "classy");
        assert!(matches!(tokens[2].kind, TokenType::Or));
        assert!(matches!(tokens[3].kind, TokenType::Identifier));
    }

    #[test]
    fn string_literal_spans_lines() {
        let (tokens, had_error) = scan("\"one\ntwo\" x");
        assert!(!had_error);
        assert!(matches!(&tokens[0].kind, TokenType::String(s) if s == "one\ntwo"));
        assert_eq!(tokens[0].line, 2);
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unterminated_string_reports_error() {
        let (tokens, had_error) = scan("\"oops");
        assert!(had_error);
        assert_eq!(tokens.len(), 1); // just Eof
    }

    #[test]
    fn number_with_no_trailing_dot() {
        let (tokens, had_error) = scan("123. 4.5");
        assert!(!had_error);
        assert!(matches!(tokens[0].kind, TokenType::Number(n) if n == 123.0));
        assert!(matches!(tokens[1].kind, TokenType::Dot));
        assert!(matches!(tokens[2].kind, TokenType::Number(n) if n == 4.5));
    }

    #[test]
    fn comments_and_whitespace_are_skipped() {
        let (tokens, had_error) = scan("1 // the rest is noise + - *\n2");
        assert!(!had_error);
        assert_eq!(tokens.len(), 3);
        assert!(matches!(tokens[1].kind, TokenType::Number(n) if n == 2.0));
        assert_eq!(tokens[1].line, 2);
    }

    #[test]
    fn unknown_character_is_skipped() {
        let (tokens, had_error) = scan("@ 1");
        assert!(had_error);
        assert!(matches!(tokens[0].kind, TokenType::Number(n) if n == 1.0));
    }

    #[test]
    fn lexemes_are_source_substrings() {
        let source = "var answer = 42;";
        let (tokens, _) = scan(source);
        for token in &tokens {
            if !matches!(token.kind, TokenType::Eof) {
                assert!(source.contains(&token.lexeme), "lexeme {:?}", token.lexeme);
            }
        }
    }
}
