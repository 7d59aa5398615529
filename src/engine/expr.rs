use std::collections::HashMap;
use std::fmt;
use std::ptr;
use std::str::FromStr;

use super::diagnostics::*;
use super::lexer::*;

pub type Bindings = HashMap<String, Expr>;

const HASH_BASE: i64 = 257;

#[allow(unused_macros)]
macro_rules! fun_args {
    () => { vec![] };
    (*$name:ident) => { vec![expr!(*$name)] };
    (*$name:ident,$($rest:tt)*) => {
        {
            let mut t = vec![expr!(*$name)];
            t.append(&mut fun_args!($($rest)*));
            t
        }
    };
    (*$name:ident($($args:tt)*)) => {
        vec![expr!(*$name($($args)*))]
    };
    (*$name:ident($($args:tt)*),$($rest:tt)*) => {
        {
            let mut t = vec![expr!(*$name($($args)*))];
            t.append(&mut fun_args!($($rest)*));
            t
        }
    };
    ($name:ident) => { vec![expr!($name)] };
    ($name:ident,$($rest:tt)*) => {
        {
            let mut t = vec![expr!($name)];
            t.append(&mut fun_args!($($rest)*));
            t
        }
    };
    ($name:ident($($args:tt)*)) => {
        vec![expr!($name($($args)*))]
    };
    ($name:ident($($args:tt)*),$($rest:tt)*) => {
        {
            let mut t = vec![expr!($name($($args)*))];
            t.append(&mut fun_args!($($rest)*));
            t
        }
    }
}

#[allow(unused_macros)]
macro_rules! expr {
    (*$name:ident) => {
        Expr::var(stringify!($name))
    };
    (*$name:ident($($args:tt)*)) => {
        Expr::new(stringify!($name), fun_args!($($args)*), true)
    };
    ($name:ident) => {
        Expr::sym(stringify!($name))
    };
    ($name:ident($($args:tt)*)) => {
        Expr::new(stringify!($name), fun_args!($($args)*), false)
    };
}

/// A node of a symbolic tree.
///
/// The `hash` and `weight` fields are a rolling hash over the canonical
/// rendering of the subtree. They are computed once in [`Expr::new`] and
/// the node is never mutated afterwards, so they always describe the
/// current structure.
#[derive(Debug, Clone)]
pub struct Expr {
    name: String,
    args: Vec<Expr>,
    free: bool,
    hash: i64,
    weight: i64,
}

fn fold(hash: &mut i64, weight: &mut i64, code: i64) {
    *hash = hash.wrapping_mul(HASH_BASE).wrapping_add(code);
    *weight = weight.wrapping_mul(HASH_BASE);
}

impl Expr {
    pub fn new(name: impl Into<String>, args: Vec<Expr>, free: bool) -> Self {
        let mut expr = Self {
            name: name.into(),
            args,
            free,
            hash: 0,
            weight: 1,
        };
        expr.recalculate_hash();
        expr
    }

    #[cfg(test)]
    pub fn sym(name: impl Into<String>) -> Self {
        Self::new(name, vec![], false)
    }

    #[cfg(test)]
    pub fn var(name: impl Into<String>) -> Self {
        Self::new(name, vec![], true)
    }

    // Wrapping arithmetic is intended: there is no modulus.
    fn recalculate_hash(&mut self) {
        let mut hash = 0;
        let mut weight = 1;

        if self.free {
            fold(&mut hash, &mut weight, '*' as i64);
        }
        // Name bytes are folded as signed values.
        for x in self.name.bytes() {
            fold(&mut hash, &mut weight, x as i8 as i64);
        }

        fold(&mut hash, &mut weight, '(' as i64);
        for arg in &self.args {
            hash = hash.wrapping_add(arg.hash.wrapping_mul(weight));
            weight = weight.wrapping_mul(arg.weight);
            fold(&mut hash, &mut weight, ',' as i64);
        }
        fold(&mut hash, &mut weight, ')' as i64);

        self.hash = hash;
        self.weight = weight;
    }

    #[cfg(test)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[cfg(test)]
    pub fn args(&self) -> &[Expr] {
        &self.args
    }

    #[cfg(test)]
    pub fn is_free(&self) -> bool {
        self.free
    }

    /// Only a zero-arity free node acts as a wildcard in patterns.
    pub fn is_var(&self) -> bool {
        self.free && self.args.is_empty()
    }

    pub fn hash(&self) -> i64 {
        self.hash
    }

    #[cfg(test)]
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Deep copy of `self` where exactly the node `site` is swapped for a
    /// copy of `replacement`.
    ///
    /// `site` is located by address, not by structure: it must be a
    /// reference into `self`. Other occurrences that merely look the same
    /// are left untouched.
    pub fn clone_and_replace(&self, site: &Expr, replacement: &Expr) -> Expr {
        if ptr::eq(self, site) {
            return replacement.clone();
        }

        Expr::new(
            self.name.clone(),
            self.args.iter().map(|arg| arg.clone_and_replace(site, replacement)).collect(),
            self.free,
        )
    }

    /// Calls `visit` on every node of the tree in pre-order, root first.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr)) {
        visit(self);
        for arg in &self.args {
            arg.walk(visit);
        }
    }

    /// Matches `value` against `self` used as a pattern.
    ///
    /// Repeated variables must bind to equal subtrees. A free node with
    /// arguments is not a wildcard: it is compared by name and arity like
    /// any other node.
    pub fn pattern_match(&self, value: &Expr) -> Option<Bindings> {
        fn pattern_match_impl(pattern: &Expr, value: &Expr, bindings: &mut Bindings) -> bool {
            if pattern.is_var() {
                if let Some(bound_value) = bindings.get(&pattern.name) {
                    bound_value == value
                } else {
                    bindings.insert(pattern.name.clone(), value.clone());
                    true
                }
            } else {
                pattern.name == value.name
                    && pattern.args.len() == value.args.len()
                    && pattern.args.iter().zip(&value.args).all(|(arg1, arg2)| pattern_match_impl(arg1, arg2, bindings))
            }
        }

        let mut bindings = HashMap::new();

        if pattern_match_impl(self, value, &mut bindings) {
            Some(bindings)
        } else {
            None
        }
    }

    /// Instantiates `self` used as a template.
    ///
    /// Unbound free nodes are kept as they are. A bound free node applied
    /// to arguments would need higher-order substitution, which is not
    /// supported.
    pub fn substitute(&self, bindings: &Bindings) -> Result<Expr, SubstitutionError> {
        if self.free {
            if let Some(value) = bindings.get(&self.name) {
                if self.args.is_empty() {
                    return Ok(value.clone());
                }
                return Err(SubstitutionError::HigherOrder {
                    name: self.name.clone(),
                    arity: self.args.len(),
                });
            }
        }

        let args = self.args
            .iter()
            .map(|arg| arg.substitute(bindings))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::new(self.name.clone(), args, self.free))
    }

    pub fn parse(lexer: &mut Lexer<impl Iterator<Item=char>>) -> Result<Self, SyntaxError> {
        let free = if lexer.peek_token().kind == TokenKind::Star {
            lexer.next_token();
            true
        } else {
            false
        };

        let name = lexer.next_token();
        if name.kind != TokenKind::Ident {
            return Err(SyntaxError::ExpectedName(name));
        }

        let mut args = Vec::new();
        if lexer.peek_token().kind == TokenKind::OpenParen {
            let open_paren = lexer.next_token();
            loop {
                args.push(Self::parse(lexer)?);
                let token = lexer.next_token();
                match token.kind {
                    TokenKind::CloseParen => break,
                    TokenKind::Comma => {},
                    _ => return Err(SyntaxError::UnclosedArgs(open_paren, token)),
                }
            }
        }

        Ok(Self::new(name.text, args, free))
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.args.len() == other.args.len()
            && self.free == other.free
            && self.hash == other.hash
            && self.args.iter().zip(&other.args).all(|(arg1, arg2)| arg1 == arg2)
    }
}

impl Eq for Expr {}

impl FromStr for Expr {
    type Err = SyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let mut lexer = Lexer::new(source.chars(), None, 1);
        let expr = Self::parse(&mut lexer)?;
        lexer.expect_token(TokenKind::End).map_err(|(expected_kind, actual_token)| {
            SyntaxError::ExpectedToken(expected_kind, actual_token)
        })?;
        Ok(expr)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.free {
            write!(f, "*")?;
        }
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "(")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 { write!(f, ", ")? }
                write!(f, "{}", arg)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubstitutionError {
    HigherOrder {
        name: String,
        arity: usize,
    },
}

impl std::error::Error for SubstitutionError {}

impl fmt::Display for SubstitutionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SubstitutionError::HigherOrder { name, arity } => {
                write!(f, "variable `{}` is bound but applied to {} argument(s); higher-order substitution is not supported", name, arity)
            }
        }
    }
}

#[derive(Debug)]
/// An error that happens while parsing a statement line
pub enum SyntaxError {
    ExpectedToken(TokenKind, Token),
    ExpectedName(Token),
    UnclosedArgs(Token, Token),
}

impl SyntaxError {
    pub fn loc(&self) -> &Loc {
        match self {
            Self::ExpectedToken(_, token) | Self::ExpectedName(token) | Self::UnclosedArgs(_, token) => &token.loc,
        }
    }

    pub fn report(&self, diag: &mut impl Diagnoster) {
        diag.report(self.loc(), Severity::Error, &self.to_string());
        if let Self::UnclosedArgs(open_paren, _) = self {
            diag.report(&open_paren.loc, Severity::Info, &format!("The corresponding {} is here.", open_paren.kind));
        }
    }
}

impl std::error::Error for SyntaxError {}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ExpectedToken(expected_kind, actual_token) => {
                write!(f, "expected {} but got {} instead", expected_kind, actual_token.report())
            }
            Self::ExpectedName(actual_token) => {
                write!(f, "expected {} as the name of an expression, but got {} instead", TokenKind::Ident, actual_token.report())
            }
            Self::UnclosedArgs(_, actual_token) => {
                write!(f, "argument list must continue with {} or end with {}, but got {} instead", TokenKind::Comma, TokenKind::CloseParen, actual_token.report())
            }
        }
    }
}
