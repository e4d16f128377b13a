use crate::environment::{Env, Environment};
use crate::evaluator::evaluate;
use crate::lexer::Lexer;
use crate::parser::Parser;
use anyhow::Result;
use std::io::{self, BufRead, Write};

const PROMPT: &str = ">> ";

pub fn start() -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    run(stdin.lock(), stdout.lock())
}

/// Reads one program per line until EOF. Bindings persist across lines.
pub fn run<R: BufRead, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let env = Environment::new();
    loop {
        write!(output, "{}", PROMPT)?;
        output.flush()?;
        let mut line = String::new();
        let read = input.read_line(&mut line)?;
        if read == 0 {
            // EOF
            return Ok(());
        }
        eval_line(line.trim_end(), &env, &mut output)?;
    }
}

fn eval_line<W: Write>(line: &str, env: &Env, output: &mut W) -> Result<()> {
    let mut parser = Parser::new(Lexer::new(line));
    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        writeln!(output, "parser errors:")?;
        for err in parser.errors() {
            writeln!(output, "\t{}", err)?;
        }
        return Ok(());
    }
    let evaluated = evaluate(&program, env);
    writeln!(output, "{}", evaluated)?;
    Ok(())
}
