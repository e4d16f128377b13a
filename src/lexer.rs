use crate::token::{lookup_identifier, Token};
use std::str::Chars;

pub struct Lexer<'a> {
    input: Chars<'a>,
    cur: Option<char>,
    peek: Option<char>,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Self {
            input: input.chars(),
            cur: None,
            peek: None,
        };
        lexer.read_char();
        lexer.read_char();
        lexer
    }
    /// Like `next`, but keeps yielding `EOF` once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        self.next().unwrap_or(Token::EOF)
    }
    fn read_char(&mut self) {
        self.cur = self.peek;
        self.peek = self.input.next();
    }
    fn skip_whitespace(&mut self) {
        while self.cur.map_or(false, |c| c.is_ascii_whitespace()) {
            self.read_char();
        }
    }
    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut res = String::new();
        while let Some(c) = self.cur.filter(|&c| pred(c)) {
            res.push(c);
            self.read_char();
        }
        res
    }
    fn read_number(&mut self) -> String {
        self.read_while(|c| c.is_ascii_digit())
    }
    fn read_identifier(&mut self) -> String {
        self.read_while(|c| is_letter(c) || c.is_ascii_digit())
    }
    fn read_string(&mut self) -> String {
        // opening quote
        self.read_char();
        let res = self.read_while(|c| c != '"');
        // closing quote, if any
        self.read_char();
        res
    }
    fn single(&mut self, token: Token) -> Token {
        self.read_char();
        token
    }
    fn with_assign(&mut self, plain: Token, with_assign: Token) -> Token {
        if self.peek == Some('=') {
            self.read_char();
            self.read_char();
            with_assign
        } else {
            self.single(plain)
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        use Token::*;
        self.skip_whitespace();
        let c = self.cur?;
        let token = match c {
            '=' => self.with_assign(ASSIGN, EQ),
            '!' => self.with_assign(BANG, NEQ),
            '+' => self.single(PLUS),
            '-' => self.single(MINUS),
            '*' => self.single(ASTERISK),
            '/' => self.single(SLASH),
            '<' => self.single(LT),
            '>' => self.single(GT),
            ',' => self.single(COMMA),
            ';' => self.single(SEMICOLON),
            ':' => self.single(COLON),
            '(' => self.single(LPAREN),
            ')' => self.single(RPAREN),
            '{' => self.single(LBRACE),
            '}' => self.single(RBRACE),
            '[' => self.single(LBRACKET),
            ']' => self.single(RBRACKET),
            '"' => STRING(self.read_string()),
            c if c.is_ascii_digit() => INT(self.read_number()),
            c if is_letter(c) => lookup_identifier(&self.read_identifier()),
            c => self.single(ILLEGAL(c)),
        };
        Some(token)
    }
}
