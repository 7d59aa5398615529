use super::lexer::Loc;

use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Severity {
    Info,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// Sink for user-facing reports about malformed input.
pub trait Diagnoster {
    fn report(&mut self, loc: &Loc, severity: Severity, message: &str);
}

pub struct StderrDiagnoster {}

impl Diagnoster for StderrDiagnoster {
    fn report(&mut self, loc: &Loc, severity: Severity, message: &str) {
        eprintln!("{}: {}: {}", loc, severity, message);
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct CollectingDiagnoster {
    pub reports: Vec<(Severity, String)>,
}

#[cfg(test)]
impl Diagnoster for CollectingDiagnoster {
    fn report(&mut self, loc: &Loc, severity: Severity, message: &str) {
        self.reports.push((severity, format!("{}: {}", loc, message)));
    }
}
