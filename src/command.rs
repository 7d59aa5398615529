//! Line-oriented statement language on top of the rewriting engine.
//! (see [engine](super::engine) module)

use std::fmt;
use std::io;
use std::io::Write;

use log::{debug, warn};

use super::engine::expr::*;
use super::engine::lexer::*;
use super::engine::rule::*;
use super::engine::search::*;

const SEPARATOR: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";

#[derive(Debug, Clone)]
pub enum Command {
    /// Define a directed rule
    ///
    /// Example:
    /// ```text
    /// rule plus(*x, zero) *x
    /// ```
    DefineRule { keyword: Token, rule: Rule },
    /// Define a rule together with its reverse
    ///
    /// Example:
    /// ```text
    /// rule both plus(*x, *y) plus(*y, *x)
    /// ```
    DefineBothRules { keyword: Token, rule: Rule },
    /// Print every expression reachable from `expr`
    ///
    /// Example:
    /// ```text
    /// apply plus(a, zero)
    /// ```
    Apply { keyword: Token, expr: Expr },
    /// Search for a chain of rewrites from `lhs` to `rhs`
    ///
    /// Example:
    /// ```text
    /// equal plus(a, zero) a
    /// ```
    Equal { keyword: Token, lhs: Expr, rhs: Expr },
}

impl Command {
    /// Parses one statement line.
    ///
    /// Blank lines and lines that do not start with a statement keyword
    /// yield `Ok(None)`.
    pub fn parse(lexer: &mut Lexer<impl Iterator<Item=char>>) -> Result<Option<Command>, SyntaxError> {
        let keyword = lexer.next_token();
        let command = match keyword.kind {
            TokenKind::End => return Ok(None),
            TokenKind::Ident => match keyword.text.as_str() {
                "rule" => {
                    let both = {
                        let token = lexer.peek_token();
                        token.kind == TokenKind::Ident && token.text == "both"
                    };
                    if both {
                        lexer.next_token();
                    }
                    let head = Expr::parse(lexer)?;
                    let body = Expr::parse(lexer)?;
                    let rule = Rule::new(head, body);
                    if both {
                        Command::DefineBothRules { keyword, rule }
                    } else {
                        Command::DefineRule { keyword, rule }
                    }
                }
                "apply" => {
                    let expr = Expr::parse(lexer)?;
                    Command::Apply { keyword, expr }
                }
                "equal" => {
                    let lhs = Expr::parse(lexer)?;
                    let rhs = Expr::parse(lexer)?;
                    Command::Equal { keyword, lhs, rhs }
                }
                _ => {
                    warn!("{}: ignoring unknown statement {}", keyword.loc, keyword.report());
                    return Ok(None);
                }
            },
            _ => {
                warn!("{}: ignoring statement starting with {}", keyword.loc, keyword.report());
                return Ok(None);
            }
        };

        let trailing = lexer.next_token();
        if trailing.kind != TokenKind::End {
            warn!("{}: ignoring the rest of the line starting with {}", trailing.loc, trailing.report());
        }
        Ok(Some(command))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Command::DefineRule { rule, .. } => write!(f, "rule {} {}", rule.head, rule.body),
            Command::DefineBothRules { rule, .. } => write!(f, "rule both {} {}", rule.head, rule.body),
            Command::Apply { expr, .. } => write!(f, "apply {}", expr),
            Command::Equal { lhs, rhs, .. } => write!(f, "equal {} {}", lhs, rhs),
        }
    }
}

#[derive(Debug)]
/// An error that aborts the interpretation of a program
pub enum Error {
    Syntax(SyntaxError),
    Io(io::Error),
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Self::Syntax(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Syntax(err) => write!(f, "{}: {}", err.loc(), err),
            Error::Io(err) => write!(f, "could not write the trace: {}", err),
        }
    }
}

/// The only state that survives between statements: the rules defined
/// so far, in definition order.
#[derive(Default)]
pub struct Context {
    rules: Vec<Rule>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn process_line(&mut self, line: &str, file_path: Option<String>, row: usize, sink: &mut impl Write) -> Result<(), Error> {
        let mut lexer = Lexer::new(line.chars(), file_path, row);
        if let Some(command) = Command::parse(&mut lexer)? {
            self.process_command(command, sink)?;
        }
        Ok(())
    }

    pub fn process_command(&mut self, command: Command, sink: &mut impl Write) -> io::Result<()> {
        writeln!(sink, "{}", SEPARATOR)?;
        match command {
            Command::DefineRule { keyword, rule } => {
                writeln!(sink, "Parsing rule")?;
                writeln!(sink, "{}", rule)?;
                debug!("{}: defined rule {}", keyword.loc, rule);
                self.rules.push(rule);
            }
            Command::DefineBothRules { keyword, rule } => {
                writeln!(sink, "Parsing rule both")?;
                let reversed = rule.reversed();
                writeln!(sink, "{}", rule)?;
                writeln!(sink, "{}", reversed)?;
                debug!("{}: defined rules {} and {}", keyword.loc, rule, reversed);
                self.rules.push(rule);
                self.rules.push(reversed);
            }
            Command::Apply { keyword, expr } => {
                writeln!(sink, "Parsing application")?;
                writeln!(sink, "Trying all applications on {}", expr)?;
                debug!("{}: exploring {} with {} rule(s)", keyword.loc, expr, self.rules.len());
                for applied in reachable(&expr, &self.rules) {
                    writeln!(sink, "{}", applied)?;
                }
            }
            Command::Equal { keyword, lhs, rhs } => {
                writeln!(sink, "Proving equality")?;
                writeln!(sink, "{} ?= {}", lhs, rhs)?;
                debug!("{}: searching a path with {} rule(s)", keyword.loc, self.rules.len());
                let path = find_path(&lhs, &rhs, &self.rules);
                for applied in &path {
                    writeln!(sink, "{}", applied)?;
                }
                if path.is_empty() {
                    writeln!(sink, "They are not equal")?;
                } else {
                    writeln!(sink, "They are equal")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_line(line: &str) -> Result<Option<Command>, SyntaxError> {
        Command::parse(&mut Lexer::new(line.chars(), None, 1))
    }

    fn run(program: &str) -> (Context, Vec<String>) {
        let mut context = Context::new();
        let mut sink = Vec::new();
        for (i, line) in program.lines().enumerate() {
            context.process_line(line, None, i + 1, &mut sink).unwrap();
        }
        let trace = String::from_utf8(sink).unwrap();
        (context, trace.lines().map(str::to_string).collect())
    }

    #[test]
    fn statements_are_dispatched_by_their_first_word() {
        assert!(matches!(parse_line("rule a b"), Ok(Some(Command::DefineRule { .. }))));
        assert!(matches!(parse_line("rule both a b"), Ok(Some(Command::DefineBothRules { .. }))));
        assert!(matches!(parse_line("apply f(a)"), Ok(Some(Command::Apply { .. }))));
        assert!(matches!(parse_line("equal a b"), Ok(Some(Command::Equal { .. }))));
    }

    #[test]
    fn blank_and_unknown_lines_are_skipped() {
        assert!(matches!(parse_line(""), Ok(None)));
        assert!(matches!(parse_line("   \t"), Ok(None)));
        assert!(matches!(parse_line("prove a b"), Ok(None)));
        assert!(matches!(parse_line("(a)"), Ok(None)));
    }

    #[test]
    fn malformed_statements_are_syntax_errors() {
        assert!(matches!(parse_line("rule a"), Err(SyntaxError::ExpectedName(_))));
        assert!(matches!(parse_line("apply f(a"), Err(SyntaxError::UnclosedArgs(_, _))));
        assert!(matches!(parse_line("equal *"), Err(SyntaxError::ExpectedName(_))));
    }

    #[test]
    fn trailing_tokens_after_a_statement_are_ignored() {
        let command = parse_line("apply a b").unwrap().unwrap();
        assert_eq!(command.to_string(), "apply a");
        let command = parse_line("rule a b c(").unwrap().unwrap();
        assert_eq!(command.to_string(), "rule a b");

        let (context, trace) = run("rule a b c\napply a b");
        assert_eq!(context.rules(), &[Rule::new(Expr::sym("a"), Expr::sym("b"))]);
        assert_eq!(trace[trace.len() - 3..], ["Trying all applications on a", "a", "b"]);
    }

    #[test]
    fn parsed_statements_render_back_to_source() {
        let command = parse_line("rule  both plus(*x,*y)   plus(*y, *x)").unwrap().unwrap();
        assert_eq!(command.to_string(), "rule both plus(*x, *y) plus(*y, *x)");
    }

    #[test]
    fn rule_both_is_the_rule_and_its_reverse() {
        let (both, _) = run("rule both f(*x) g(*x)");
        let (pair, _) = run("rule f(*x) g(*x)\nrule g(*x) f(*x)");
        assert_eq!(both.rules(), pair.rules());
        assert_eq!(both.rules().len(), 2);
    }

    #[test]
    fn rules_trace() {
        let (_, trace) = run("rule both f(*x) g(*x)\nrule a b");
        assert_eq!(trace, vec![
            SEPARATOR,
            "Parsing rule both",
            "f(*x) = g(*x)",
            "g(*x) = f(*x)",
            SEPARATOR,
            "Parsing rule",
            "a = b",
        ]);
    }

    #[test]
    fn apply_uses_only_rules_defined_so_far() {
        let (_, trace) = run("apply h(f(a))\nrule f(*x) g(*x)\napply h(f(a))");
        assert_eq!(trace, vec![
            SEPARATOR,
            "Parsing application",
            "Trying all applications on h(f(a))",
            "h(f(a))",
            SEPARATOR,
            "Parsing rule",
            "f(*x) = g(*x)",
            SEPARATOR,
            "Parsing application",
            "Trying all applications on h(f(a))",
            "h(f(a))",
            "h(g(a))",
        ]);
    }

    #[test]
    fn equal_prints_the_path_and_a_verdict() {
        let (_, trace) = run("rule a b\nequal a b\nequal a c");
        assert_eq!(trace, vec![
            SEPARATOR,
            "Parsing rule",
            "a = b",
            SEPARATOR,
            "Proving equality",
            "a ?= b",
            "a",
            "b",
            "They are equal",
            SEPARATOR,
            "Proving equality",
            "a ?= c",
            "They are not equal",
        ]);
    }
}
