use crate::ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
use crate::lexer::Lexer;
use crate::token::Token;
use anyhow::{bail, Result};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("expected next token to be `{}`, got `{}` instead", .expected, .actual.kind())]
    UnexpectedToken {
        expected: &'static str,
        actual: Token,
    },
    #[error("no prefix parse function for `{0}` found")]
    NoPrefixParseFn(Token),
    #[error("could not parse `{0}` as integer")]
    InvalidInteger(String),
}

#[derive(Debug, Clone, Copy, PartialOrd, PartialEq)]
enum Precedence {
    LOWEST,
    EQUALS,
    LESSGREATER,
    SUM,
    PRODUCT,
    PREFIX,
    CALL,
}

type PrefixParseFn<'a> = fn(&mut Parser<'a>) -> Result<Expression>;
type InfixParseFn<'a> = fn(&mut Parser<'a>, Expression) -> Result<Expression>;

impl Token {
    fn precedence(&self) -> Precedence {
        use Precedence::*;
        use Token::*;
        match self {
            PLUS | MINUS => SUM,
            ASTERISK | SLASH => PRODUCT,
            LT | GT => LESSGREATER,
            EQ | NEQ => EQUALS,
            LPAREN => CALL,
            _ => LOWEST,
        }
    }
}

pub struct Parser<'a> {
    l: Lexer<'a>,
    cur: Token,
    peek: Token,
    errors: Vec<String>,
    // open `{` up to and including `cur`
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(l: Lexer<'a>) -> Self {
        let mut parser = Parser {
            l,
            cur: Token::EOF,
            peek: Token::EOF,
            errors: Vec::new(),
            depth: 0,
        };
        parser.next_token();
        parser.next_token();
        parser
    }
    /// Diagnostics recorded by the last `parse_program`, in source order.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }
    fn next_token(&mut self) {
        self.cur = std::mem::replace(&mut self.peek, self.l.next_token());
        match self.cur {
            Token::LBRACE => self.depth += 1,
            Token::RBRACE => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
    }
    fn cur_token_is(&self, token: &Token) -> bool {
        &self.cur == token
    }
    fn peek_token_is(&self, token: &Token) -> bool {
        &self.peek == token
    }
    fn expect_peek(&mut self, token: Token) -> Result<()> {
        if self.peek_token_is(&token) {
            self.next_token();
            Ok(())
        } else {
            bail!(ParseError::UnexpectedToken {
                expected: token.kind(),
                actual: self.peek.clone(),
            })
        }
    }
    fn expect_peek_ident(&mut self) -> Result<String> {
        match &self.peek {
            Token::IDENT(name) => {
                let name = name.clone();
                self.next_token();
                Ok(name)
            }
            actual => bail!(ParseError::UnexpectedToken {
                expected: "IDENT",
                actual: actual.clone(),
            }),
        }
    }
    /// Parses `Ok` only when no diagnostics were recorded.
    pub fn parse(&mut self) -> Result<Program> {
        let program = self.parse_program();
        if !self.errors.is_empty() {
            bail!("{}", self.errors.join("\n"));
        }
        Ok(program)
    }
    /// Parses the whole input. A malformed statement is recorded in `errors`
    /// and skipped as a whole, so the returned program may have gaps.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();
        while !self.cur_token_is(&Token::EOF) {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(err) => {
                    debug!(%err, "parse error");
                    self.errors.push(err.to_string());
                    self.synchronize();
                }
            }
            self.next_token();
        }
        Program { statements }
    }
    /// Skips to the last token of the malformed top-level statement. Outside
    /// any block that is a `;`, a `}` the statement does not continue past, or
    /// the token before a `let`/`return`.
    fn synchronize(&mut self) {
        loop {
            match self.cur {
                Token::EOF => return,
                Token::SEMICOLON if self.depth == 0 => return,
                Token::RBRACE if self.depth == 0 && !self.peek_continues_statement() => return,
                _ => {}
            }
            if self.depth == 0 && matches!(self.peek, Token::LET | Token::RETURN) {
                return;
            }
            self.next_token();
        }
    }
    fn peek_continues_statement(&self) -> bool {
        matches!(self.peek, Token::SEMICOLON | Token::ELSE)
            || Self::infix_parse_fn(&self.peek).is_some()
    }
    fn parse_statement(&mut self) -> Result<Statement> {
        match self.cur {
            Token::LET => self.parse_let_statement(),
            Token::RETURN => self.parse_return_statement(),
            _ => self.parse_expression_statement(),
        }
    }
    fn parse_let_statement(&mut self) -> Result<Statement> {
        let name = self.expect_peek_ident()?;
        self.expect_peek(Token::ASSIGN)?;
        self.next_token();
        let value = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(&Token::SEMICOLON) {
            self.next_token();
        }
        Ok(Statement::LetStatement { name, value })
    }
    fn parse_return_statement(&mut self) -> Result<Statement> {
        let value = match self.peek {
            Token::SEMICOLON | Token::RBRACE | Token::EOF => None,
            _ => {
                self.next_token();
                Some(self.parse_expression(Precedence::LOWEST)?)
            }
        };
        if self.peek_token_is(&Token::SEMICOLON) {
            self.next_token();
        }
        Ok(Statement::ReturnStatement(value))
    }
    fn parse_expression_statement(&mut self) -> Result<Statement> {
        let exp = self.parse_expression(Precedence::LOWEST)?;
        if self.peek_token_is(&Token::SEMICOLON) {
            self.next_token();
        }
        Ok(Statement::ExpressionStatement(exp))
    }
    fn prefix_parse_fn(token: &Token) -> Option<PrefixParseFn<'a>> {
        use Token::*;
        let f: PrefixParseFn<'a> = match token {
            IDENT(_) => Self::parse_identifier,
            INT(_) => Self::parse_integer_literal,
            STRING(_) => Self::parse_string_literal,
            TRUE | FALSE => Self::parse_boolean,
            MINUS | BANG => Self::parse_prefix_expression,
            LPAREN => Self::parse_grouped_expression,
            IF => Self::parse_if_expression,
            FUNCTION => Self::parse_function_literal,
            _ => return None,
        };
        Some(f)
    }
    fn infix_parse_fn(token: &Token) -> Option<InfixParseFn<'a>> {
        use Token::*;
        let f: InfixParseFn<'a> = match token {
            PLUS | MINUS | ASTERISK | SLASH | LT | GT | EQ | NEQ => Self::parse_infix_expression,
            LPAREN => Self::parse_call_expression,
            _ => return None,
        };
        Some(f)
    }
    fn parse_expression(&mut self, precedence: Precedence) -> Result<Expression> {
        let prefix = match Self::prefix_parse_fn(&self.cur) {
            Some(prefix) => prefix,
            None => bail!(ParseError::NoPrefixParseFn(self.cur.clone())),
        };
        let mut exp = prefix(self)?;
        while !self.peek_token_is(&Token::SEMICOLON) && precedence < self.peek.precedence() {
            let infix = match Self::infix_parse_fn(&self.peek) {
                Some(infix) => infix,
                None => return Ok(exp),
            };
            self.next_token();
            exp = infix(self, exp)?;
        }
        Ok(exp)
    }
    fn parse_identifier(&mut self) -> Result<Expression> {
        match &self.cur {
            Token::IDENT(name) => Ok(Expression::Identifier(name.clone())),
            token => bail!(ParseError::NoPrefixParseFn(token.clone())),
        }
    }
    fn parse_integer_literal(&mut self) -> Result<Expression> {
        match &self.cur {
            Token::INT(literal) => {
                let value = literal
                    .parse::<i64>()
                    .map_err(|_| ParseError::InvalidInteger(literal.clone()))?;
                Ok(Expression::IntegerLiteral { value })
            }
            token => bail!(ParseError::NoPrefixParseFn(token.clone())),
        }
    }
    fn parse_string_literal(&mut self) -> Result<Expression> {
        match &self.cur {
            Token::STRING(value) => Ok(Expression::StringLiteral {
                value: value.clone(),
            }),
            token => bail!(ParseError::NoPrefixParseFn(token.clone())),
        }
    }
    fn parse_boolean(&mut self) -> Result<Expression> {
        Ok(Expression::Boolean {
            value: self.cur_token_is(&Token::TRUE),
        })
    }
    fn parse_grouped_expression(&mut self) -> Result<Expression> {
        self.next_token();
        let exp = self.parse_expression(Precedence::LOWEST)?;
        self.expect_peek(Token::RPAREN)?;
        Ok(exp)
    }
    fn parse_prefix_expression(&mut self) -> Result<Expression> {
        let op = match &self.cur {
            Token::MINUS => PrefixOperator::MINUS,
            Token::BANG => PrefixOperator::BANG,
            token => bail!(ParseError::NoPrefixParseFn(token.clone())),
        };
        self.next_token();
        let right = self.parse_expression(Precedence::PREFIX)?;
        Ok(Expression::PrefixExpression {
            operator: op,
            right: Box::new(right),
        })
    }
    fn parse_infix_expression(&mut self, left: Expression) -> Result<Expression> {
        let op = match &self.cur {
            Token::PLUS => InfixOperator::PLUS,
            Token::MINUS => InfixOperator::MINUS,
            Token::ASTERISK => InfixOperator::ASTERISK,
            Token::SLASH => InfixOperator::SLASH,
            Token::LT => InfixOperator::LT,
            Token::GT => InfixOperator::GT,
            Token::EQ => InfixOperator::EQ,
            Token::NEQ => InfixOperator::NEQ,
            token => bail!("unexpected operator: {}", token),
        };
        let precedence = self.cur.precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Ok(Expression::InfixExpression {
            left: Box::new(left),
            operator: op,
            right: Box::new(right),
        })
    }
    fn parse_if_expression(&mut self) -> Result<Expression> {
        self.expect_peek(Token::LPAREN)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::LOWEST)?;
        self.expect_peek(Token::RPAREN)?;
        self.expect_peek(Token::LBRACE)?;
        let consequence = self.parse_block_statement()?;
        let alternative = if self.peek_token_is(&Token::ELSE) {
            self.next_token();
            self.expect_peek(Token::LBRACE)?;
            Some(self.parse_block_statement()?)
        } else {
            None
        };
        Ok(Expression::IfExpression {
            condition: Box::new(condition),
            consequence,
            alternative,
        })
    }
    fn parse_function_literal(&mut self) -> Result<Expression> {
        self.expect_peek(Token::LPAREN)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(Token::LBRACE)?;
        let body = self.parse_block_statement()?;
        Ok(Expression::FunctionLiteral { parameters, body })
    }
    fn parse_function_parameters(&mut self) -> Result<Vec<String>> {
        let mut parameters = Vec::new();
        if self.peek_token_is(&Token::RPAREN) {
            self.next_token();
            return Ok(parameters);
        }
        parameters.push(self.expect_peek_ident()?);
        while self.peek_token_is(&Token::COMMA) {
            self.next_token();
            parameters.push(self.expect_peek_ident()?);
        }
        self.expect_peek(Token::RPAREN)?;
        Ok(parameters)
    }
    fn parse_call_expression(&mut self, function: Expression) -> Result<Expression> {
        let arguments = self.parse_expression_list(Token::RPAREN)?;
        Ok(Expression::CallExpression {
            function: Box::new(function),
            arguments,
        })
    }
    fn parse_expression_list(&mut self, end: Token) -> Result<Vec<Expression>> {
        let mut list = Vec::new();
        if self.peek_token_is(&end) {
            self.next_token();
            return Ok(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::LOWEST)?);
        while self.peek_token_is(&Token::COMMA) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::LOWEST)?);
        }
        self.expect_peek(end)?;
        Ok(list)
    }
    fn parse_block_statement(&mut self) -> Result<BlockStatement> {
        self.next_token();
        let mut statements = Vec::new();
        while !self.cur_token_is(&Token::RBRACE) {
            if self.cur_token_is(&Token::EOF) {
                bail!(ParseError::UnexpectedToken {
                    expected: Token::RBRACE.kind(),
                    actual: Token::EOF,
                });
            }
            let stmt = self.parse_statement()?;
            statements.push(stmt);
            self.next_token();
        }
        Ok(BlockStatement { statements })
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{
        BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement,
    };
    use crate::lexer::Lexer;
    use crate::parser::Parser;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Program {
        let lexer = Lexer::new(input);
        let mut parser = Parser::new(lexer);
        parser
            .parse()
            .unwrap_or_else(|err| panic!("parse error: {}", err))
    }

    fn parse_errors(input: &str) -> (Program, Vec<String>) {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        (program, parser.errors().to_vec())
    }

    fn int(value: i64) -> Box<Expression> {
        Box::new(Expression::IntegerLiteral { value })
    }

    fn ident(name: &str) -> Expression {
        Expression::Identifier(name.to_string())
    }

    #[test]
    fn test_integer_literal_expression() {
        let program = parse("123;");
        let statements = program.statements;
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            Statement::ExpressionStatement(Expression::IntegerLiteral { value: 123 })
        );
    }

    #[test]
    fn test_string_literal_expression() {
        let program = parse(r#""hello world";"#);
        assert_eq!(
            program.statements,
            vec![Statement::ExpressionStatement(Expression::StringLiteral {
                value: "hello world".to_string()
            })]
        );
    }

    #[test]
    fn test_let_statements() {
        let tests = vec![
            ("let x = 5;", "x", Expression::IntegerLiteral { value: 5 }),
            ("let y = true;", "y", Expression::Boolean { value: true }),
            ("let foobar = y", "foobar", ident("y")),
        ];
        for (input, name, value) in tests {
            let program = parse(input);
            assert_eq!(
                program.statements,
                vec![Statement::LetStatement {
                    name: name.to_string(),
                    value
                }]
            );
        }
    }

    #[test]
    fn test_let_statement_value_is_full_expression() {
        let program = parse("let x = 1 + 2 * 3;");
        assert_eq!("let x = (1 + (2 * 3));\n", program.to_string());
    }

    #[test]
    fn test_return_statements() {
        let program = parse("return 5; return x + 1; return;");
        assert_eq!(
            program.statements,
            vec![
                Statement::ReturnStatement(Some(Expression::IntegerLiteral { value: 5 })),
                Statement::ReturnStatement(Some(Expression::InfixExpression {
                    left: Box::new(ident("x")),
                    operator: InfixOperator::PLUS,
                    right: int(1),
                })),
                Statement::ReturnStatement(None),
            ]
        );
    }

    #[test]
    fn test_bare_return_in_block() {
        let program = parse("if (true) { return }");
        assert_eq!("if true { return; }\n", program.to_string());
    }

    #[test]
    fn test_prefix_expressions() {
        let program = parse("!5; -15; !true;");
        assert_eq!(
            program.statements,
            vec![
                Statement::ExpressionStatement(Expression::PrefixExpression {
                    operator: PrefixOperator::BANG,
                    right: int(5),
                }),
                Statement::ExpressionStatement(Expression::PrefixExpression {
                    operator: PrefixOperator::MINUS,
                    right: int(15),
                }),
                Statement::ExpressionStatement(Expression::PrefixExpression {
                    operator: PrefixOperator::BANG,
                    right: Box::new(Expression::Boolean { value: true }),
                }),
            ]
        );
    }

    #[test]
    fn test_if_else_expression() {
        use Expression::*;
        use Statement::*;
        let program = parse("if (1 < 2) { 3; 4 } else { 5; };");
        let statements = program.statements;
        assert_eq!(statements.len(), 1);
        assert_eq!(
            statements[0],
            ExpressionStatement(IfExpression {
                condition: Box::new(InfixExpression {
                    left: int(1),
                    operator: InfixOperator::LT,
                    right: int(2),
                }),
                consequence: BlockStatement {
                    statements: vec![
                        ExpressionStatement(IntegerLiteral { value: 3 }),
                        ExpressionStatement(IntegerLiteral { value: 4 }),
                    ]
                },
                #[rustfmt::skip]
                alternative: Some(BlockStatement {
                    statements: vec![ExpressionStatement(IntegerLiteral { value: 5 })]
                }),
            })
        )
    }

    #[test]
    fn test_function_literal() {
        let program = parse("fn(x, y) { x + y; }");
        assert_eq!(
            program.statements,
            vec![Statement::ExpressionStatement(Expression::FunctionLiteral {
                parameters: vec!["x".to_string(), "y".to_string()],
                body: BlockStatement {
                    statements: vec![Statement::ExpressionStatement(
                        Expression::InfixExpression {
                            left: Box::new(ident("x")),
                            operator: InfixOperator::PLUS,
                            right: Box::new(ident("y")),
                        }
                    )]
                },
            })]
        );
    }

    #[test]
    fn test_function_parameters() {
        let tests = vec![
            ("fn() {};", vec![]),
            ("fn(x) {};", vec!["x"]),
            ("fn(x, y, z) {};", vec!["x", "y", "z"]),
        ];
        for (input, expected) in tests {
            let program = parse(input);
            match &program.statements[0] {
                Statement::ExpressionStatement(Expression::FunctionLiteral {
                    parameters, ..
                }) => assert_eq!(&expected, parameters),
                stmt => panic!("not a function literal: {:?}", stmt),
            }
        }
    }

    #[test]
    fn test_operator_precedence_parsing() {
        let tests = vec![
            ("1 + 2 + 3", "((1 + 2) + 3)"),
            ("1 + 2 * 3", "(1 + (2 * 3))"),
            ("1 * 2 + 3", "((1 * 2) + 3)"),
            ("1 - 2 - 3", "((1 - 2) - 3)"),
            ("1 + (2 + 3)", "(1 + (2 + 3))"),
            ("1 + 2 == 3", "((1 + 2) == 3)"),
            ("1 < 2 != 3 > 4", "((1 < 2) != (3 > 4))"),
            ("-1 * 2", "((-1) * 2)"),
            ("1 * -2", "(1 * (-2))"),
            ("!-a", "(!(-a))"),
            ("a + b / c", "(a + (b / c))"),
            ("3 > 5 == false", "((3 > 5) == false)"),
            ("-(5 + 5)", "(-(5 + 5))"),
            ("!(true == true)", "(!(true == true))"),
            ("a + add(b * c) + d", "((a + add((b * c))) + d)"),
            (
                "add(a, b, 1, 2 * 3, 4 + 5, add(6, 7 * 8))",
                "add(a, b, 1, (2 * 3), (4 + 5), add(6, (7 * 8)))",
            ),
            ("-add(1)", "(-add(1))"),
        ];
        for (input, expected) in tests {
            let program = parse(input);
            let actual = format!("{}", program);
            assert_eq!(expected, actual.trim_end());
        }
    }

    #[test]
    fn test_malformed_let_is_skipped() {
        let (program, errors) = parse_errors("let x 5; let y = 10;");
        assert_eq!(
            errors,
            vec!["expected next token to be `=`, got `INT` instead".to_string()]
        );
        assert_eq!(
            program.statements,
            vec![Statement::LetStatement {
                name: "y".to_string(),
                value: Expression::IntegerLiteral { value: 10 },
            }]
        );
    }

    #[test]
    fn test_error_inside_block_skips_whole_statement() {
        let tests = vec![
            (
                "let f = fn(x) { let = 1; x }; f(2);",
                "expected next token to be `IDENT`, got `=` instead",
                "f(2)",
            ),
            (
                "if (true) { let y 2; 3 }; 4;",
                "expected next token to be `=`, got `INT` instead",
                "4",
            ),
            (
                "if (a) { if (b) { 1 + ; 2 } 3; } 5;",
                "no prefix parse function for `;` found",
                "5",
            ),
            (
                "if (x) { let = 1 } else { 2 }; 5;",
                "expected next token to be `IDENT`, got `=` instead",
                "5",
            ),
            (
                "let g = fn() { if (x { 1 } }; g();",
                "expected next token to be `)`, got `{` instead",
                "g()",
            ),
        ];
        for (input, expected_error, expected_program) in tests {
            let (program, errors) = parse_errors(input);
            assert_eq!(vec![expected_error.to_string()], errors, "input: {}", input);
            assert_eq!(expected_program, program.to_string().trim_end(), "input: {}", input);
        }
    }

    #[test]
    fn test_recovers_at_next_statement_keyword() {
        let tests = vec![
            ("let x 5\nlet y = 10;", "let y = 10;"),
            ("let x 5\nreturn 1;", "return 1;"),
            ("let f = fn() { let = 1 }\nlet z = 3", "let z = 3;"),
        ];
        for (input, expected_program) in tests {
            let (program, errors) = parse_errors(input);
            assert_eq!(1, errors.len(), "input: {}, errors: {:?}", input, errors);
            assert_eq!(expected_program, program.to_string().trim_end(), "input: {}", input);
        }
    }

    #[test]
    fn test_parser_errors() {
        let tests = vec![
            ("let = 5;", "expected next token to be `IDENT`, got `=` instead"),
            ("if (x { 1 }", "expected next token to be `)`, got `{` instead"),
            ("}", "no prefix parse function for `}` found"),
            ("1 + @", "no prefix parse function for `ILLEGAL(@)` found"),
            (
                "99999999999999999999",
                "could not parse `99999999999999999999` as integer",
            ),
            ("if (x) { 1", "expected next token to be `}`, got `EOF` instead"),
            ("fn(x, 1) {}", "expected next token to be `IDENT`, got `INT` instead"),
        ];
        for (input, expected) in tests {
            let (_, errors) = parse_errors(input);
            assert_eq!(vec![expected.to_string()], errors, "input: {}", input);
        }
    }

    #[test]
    fn test_parse_reports_all_errors() {
        let mut parser = Parser::new(Lexer::new("let = 1; let y 2; 3;"));
        let err = parser.parse().unwrap_err();
        assert_eq!(
            "expected next token to be `IDENT`, got `=` instead\n\
             expected next token to be `=`, got `INT` instead",
            err.to_string()
        );
    }
}
