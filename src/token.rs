use std::fmt::{Display, Formatter};

#[derive(PartialEq, Debug, Clone)]
pub enum Token {
    ILLEGAL(char),
    EOF,

    IDENT(String), // foobar, x, y, ...
    INT(String),
    STRING(String),

    ASSIGN,   // =
    PLUS,     // +
    MINUS,    // -
    BANG,     // !
    ASTERISK, // *
    SLASH,    // /

    LT, // <
    GT, // >

    EQ,  // ==
    NEQ, // !=

    COMMA,     // ,
    SEMICOLON, // ;
    COLON,     // :

    LPAREN,   // (
    RPAREN,   // )
    LBRACE,   // {
    RBRACE,   // }
    LBRACKET, // [
    RBRACKET, // ]

    FUNCTION,
    LET,
    TRUE,
    FALSE,
    IF,
    ELSE,
    RETURN,
}

pub fn lookup_identifier(ident: &str) -> Token {
    use Token::*;
    match ident {
        "fn" => FUNCTION,
        "let" => LET,
        "true" => TRUE,
        "false" => FALSE,
        "if" => IF,
        "else" => ELSE,
        "return" => RETURN,
        _ => IDENT(ident.to_string()),
    }
}

impl Token {
    /// Name of the token kind, without the literal it carries.
    pub fn kind(&self) -> &'static str {
        use Token::*;
        match self {
            ILLEGAL(_) => "ILLEGAL",
            EOF => "EOF",
            IDENT(_) => "IDENT",
            INT(_) => "INT",
            STRING(_) => "STRING",
            ASSIGN => "=",
            PLUS => "+",
            MINUS => "-",
            BANG => "!",
            ASTERISK => "*",
            SLASH => "/",
            LT => "<",
            GT => ">",
            EQ => "==",
            NEQ => "!=",
            COMMA => ",",
            SEMICOLON => ";",
            COLON => ":",
            LPAREN => "(",
            RPAREN => ")",
            LBRACE => "{",
            RBRACE => "}",
            LBRACKET => "[",
            RBRACKET => "]",
            FUNCTION => "FUNCTION",
            LET => "LET",
            TRUE => "TRUE",
            FALSE => "FALSE",
            IF => "IF",
            ELSE => "ELSE",
            RETURN => "RETURN",
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use Token::*;
        match self {
            ILLEGAL(c) => write!(f, "ILLEGAL({})", c),
            IDENT(literal) | INT(literal) => write!(f, "{}", literal),
            STRING(literal) => write!(f, "\"{}\"", literal),
            token => write!(f, "{}", token.kind()),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::token::{lookup_identifier, Token};

    #[test]
    fn test_lookup_identifier() {
        let tests = vec![
            ("fn", Token::FUNCTION),
            ("let", Token::LET),
            ("return", Token::RETURN),
            ("lettuce", Token::IDENT("lettuce".to_string())),
        ];
        for (input, expected) in tests {
            assert_eq!(expected, lookup_identifier(input));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!("IDENT", Token::IDENT("x".to_string()).kind());
        assert_eq!("x", Token::IDENT("x".to_string()).to_string());
        assert_eq!("==", Token::EQ.to_string());
        assert_eq!("ILLEGAL(@)", Token::ILLEGAL('@').to_string());
    }
}
