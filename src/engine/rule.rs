use std::fmt;

use log::{trace, warn};

use super::expr::*;

/// A directed rewrite `head -> body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub head: Expr,
    pub body: Expr,
}

impl Rule {
    pub fn new(head: Expr, body: Expr) -> Self {
        Self { head, body }
    }

    pub fn reversed(&self) -> Self {
        Self {
            head: self.body.clone(),
            body: self.head.clone(),
        }
    }

    /// Every expression obtained by rewriting exactly one node of `expr`
    /// with this rule.
    ///
    /// Sites are visited in pre-order. A site where the head does not
    /// match, or where the body cannot be instantiated, contributes
    /// nothing. The result may contain duplicates.
    pub fn applications(&self, expr: &Expr) -> Vec<Expr> {
        let mut result = Vec::new();
        expr.walk(&mut |site| {
            let Some(bindings) = self.head.pattern_match(site) else {
                return;
            };
            trace!("matched {} with {}", site, self.head);
            match self.body.substitute(&bindings) {
                Ok(replacement) => result.push(expr.clone_and_replace(site, &replacement)),
                Err(err) => warn!("skipping application of `{}` to {}: {}", self, site, err),
            }
        });
        result
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} = {}", self.head, self.body)
    }
}
