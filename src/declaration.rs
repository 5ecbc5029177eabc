//! Solidity-like declaration to schema parsing.
//!
//! This module parses compact, human-readable declarations such as
//! `"Error(string message)"` or
//! `"function transfer(address to, uint256 amount) returns (bool)"` into
//! lists of [`TypeDescriptor`]s. The leading `function`, `error`, `event` or
//! `constructor` keyword is optional for functions and errors.
//!
//! Note that the parser is rudimentary. It doesn't support library function
//! declarations with named `enum` parameters.

use crate::{abi::StateMutability, descriptor::TypeDescriptor, kind::TypeKind};
use std::fmt::{self, Display, Formatter};
use thiserror::Error;

/// A Solidity declaration parsing result.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// A parsed declaration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    /// The declared name, empty for constructors.
    pub name: String,
    pub inputs: Vec<TypeDescriptor>,
    /// The `returns (...)` parameters of functions.
    pub outputs: Vec<TypeDescriptor>,
    pub state_mutability: StateMutability,
}

/// The keyword a declaration starts with.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeclarationKind {
    Function,
    Constructor,
    Event,
    Error,
    /// A declaration without a leading keyword, e.g. `Error(string)`.
    Bare,
}

/// Parses a declaration.
pub fn parse(s: &str) -> Result<Declaration> {
    Parser::exec(s, |p| p.declaration())
}

/// Parses a parenthesized parameter list, e.g. `(uint256 a, bool)`.
pub fn parse_parameters(s: &str) -> Result<Vec<TypeDescriptor>> {
    Parser::exec(s, |p| p.fields())
}

/// Internal parser type that keeps a string buffer and the parser's current
/// position (which is used for error reporting).
#[derive(Clone)]
struct Parser<'a> {
    buf: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn exec<T, F>(buf: &'a str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let mut parser = Self { buf, pos: 0 };
        let result = f(&mut parser)?;
        parser.end()?;
        Ok(result)
    }

    fn err(&self, kind: ParseErrorKind) -> ParseError {
        ParseError {
            kind,
            pos: self.pos,
        }
    }

    fn eos(&self) -> ParseError {
        self.err(ParseErrorKind::Eos)
    }

    fn expected(&self, name: &'static str) -> ParseError {
        self.err(ParseErrorKind::Expect(name))
    }

    fn rest(&self) -> &'a str {
        self.buf.get(self.pos..).unwrap_or_default()
    }

    fn peek(&mut self) -> Option<char> {
        let _ = self.whitespace();
        self.rest().chars().next()
    }

    fn tri<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&Self, &mut Self) -> Result<T>,
    {
        let mut sub = self.clone();
        let result = f(self, &mut sub)?;
        *self = sub;
        Ok(result)
    }

    fn take(&mut self, c: char) -> Result<()> {
        self.tri(|_, sub| {
            let next = sub.peek().ok_or_else(|| sub.eos())?;
            if next != c {
                return Err(sub.err(ParseErrorKind::ExpectChar(c)));
            }
            sub.pos += next.len_utf8();
            Ok(())
        })
    }

    fn scan<T, F>(&mut self, state: T, mut f: F) -> &'a str
    where
        F: FnMut(&mut T, char) -> bool,
    {
        let start = self.pos;
        self.pos += self
            .rest()
            .chars()
            .scan(state, |state, c| f(state, c).then_some(c))
            .map(char::len_utf8)
            .sum::<usize>();

        self.buf.get(start..self.pos).unwrap_or_default()
    }

    fn whitespace(&mut self) -> &'a str {
        self.scan((), |_, c| c.is_whitespace())
    }

    fn word(&mut self) -> &'a str {
        let _ = self.whitespace();
        self.scan(true, |first, c| {
            if *first {
                *first = false;
                matches!(c, 'a'..='z' | 'A'..='Z' | '$' | '_')
            } else {
                matches!(c, 'a'..='z' | 'A'..='Z' | '0'..='9' | '$' | '_')
            }
        })
    }

    fn ident(&mut self) -> Result<&'a str> {
        const KEYWORDS: &[&str] = &["returns", "indexed", "memory", "calldata", "storage"];

        self.tri(|this, sub| {
            let word = sub.word();
            if word.is_empty() || KEYWORDS.iter().copied().any(|k| k == word) {
                return Err(this.expected("identifier"));
            }
            Ok(word)
        })
    }

    fn keyword(&mut self, keyword: &'static str) -> Result<()> {
        self.keyword_of(keyword, &[keyword])?;
        Ok(())
    }

    fn keyword_of(&mut self, name: &'static str, keywords: &[&str]) -> Result<&'a str> {
        self.tri(|this, sub| {
            let word = sub.word();
            if keywords.iter().copied().all(|k| k != word) {
                return Err(this.expected(name));
            }
            Ok(word)
        })
    }

    /// Parses a parameter type, returning the type string and the tuple
    /// components, if any.
    fn field_type(&mut self) -> Result<(String, Option<Vec<TypeDescriptor>>)> {
        self.tri(|_, sub| {
            if let Some('(') = sub.peek() {
                let components = sub.fields()?;
                let mut ty = String::from("tuple");
                while let Ok(suffix) = sub.array_suffix() {
                    match suffix {
                        Some(n) => ty.push_str(&format!("[{n}]")),
                        None => ty.push_str("[]"),
                    }
                }
                Ok((ty, Some(components)))
            } else {
                let ty = sub.tri(|this, ssub| {
                    let ty = ssub.scan((), |_, c| !c.is_whitespace() && !matches!(c, ',' | ')'));
                    ty.parse::<TypeKind>()
                        .map_err(|_| this.expected("Solidity type"))?;
                    Ok(ty.to_owned())
                })?;
                Ok((ty, None))
            }
        })
    }

    fn array_suffix(&mut self) -> Result<Option<usize>> {
        self.tri(|_, sub| {
            sub.take('[')?;
            let n = match sub.scan((), |_, c| c.is_ascii_digit()) {
                "" => None,
                n => Some(n.parse().map_err(|_| sub.expected("fixed array length"))?),
            };
            sub.take(']')?;

            Ok(n)
        })
    }

    fn field(&mut self) -> Result<TypeDescriptor> {
        let (ty, components) = self.field_type()?;
        let _ = self.keyword_of("data location", &["memory", "calldata", "storage"]);
        let _ = self.keyword("indexed");
        let name = self.ident().unwrap_or_default().to_owned();
        Ok(TypeDescriptor {
            name,
            ty,
            components,
        })
    }

    fn fields(&mut self) -> Result<Vec<TypeDescriptor>> {
        self.tri(|_, sub| {
            sub.take('(')?;
            let mut fields = Vec::new();
            while let Ok(field) = if fields.is_empty() {
                sub.field()
            } else {
                sub.tri(|_, ssub| ssub.take(',').and_then(|_| ssub.field()))
            } {
                fields.push(field);
            }
            sub.take(')')?;

            Ok(fields)
        })
    }

    fn state_mutability(&mut self) -> StateMutability {
        let mut state_mutability = StateMutability::NonPayable;
        while let Ok(word) = self.keyword_of(
            "function modifier",
            &[
                "pure",
                "view",
                "payable",
                "nonpayable",
                "external",
                "public",
            ],
        ) {
            state_mutability = match word {
                "pure" => StateMutability::Pure,
                "view" => StateMutability::View,
                "payable" => StateMutability::Payable,
                "nonpayable" => StateMutability::NonPayable,
                _ => state_mutability,
            };
        }
        state_mutability
    }

    fn declaration(&mut self) -> Result<Declaration> {
        let kind = match self.keyword_of(
            "declaration keyword",
            &["function", "constructor", "event", "error"],
        ) {
            Ok("function") => DeclarationKind::Function,
            Ok("constructor") => DeclarationKind::Constructor,
            Ok("event") => DeclarationKind::Event,
            Ok(_) => DeclarationKind::Error,
            Err(_) => DeclarationKind::Bare,
        };

        let name = match kind {
            DeclarationKind::Constructor => String::new(),
            _ => self.ident()?.to_owned(),
        };
        let inputs = self.fields()?;

        let (outputs, state_mutability) = match kind {
            DeclarationKind::Function | DeclarationKind::Bare => {
                let state_mutability = self.state_mutability();
                let outputs = match self.keyword("returns") {
                    Ok(_) => self.fields()?,
                    Err(_) => Vec::new(),
                };
                (outputs, state_mutability)
            }
            DeclarationKind::Constructor => (Vec::new(), self.state_mutability()),
            DeclarationKind::Event => {
                let _ = self.keyword("anonymous");
                (Vec::new(), StateMutability::NonPayable)
            }
            DeclarationKind::Error => (Vec::new(), StateMutability::NonPayable),
        };

        Ok(Declaration {
            kind,
            name,
            inputs,
            outputs,
            state_mutability,
        })
    }

    fn end(mut self) -> Result<()> {
        let _ = self.take(';');
        let _ = self.whitespace();
        if !self.rest().is_empty() {
            return Err(self.expected("end of declaration"));
        }

        Ok(())
    }
}

/// A declaration parsing error.
#[derive(Debug, Error)]
#[error("{kind} at position {pos}")]
pub struct ParseError {
    kind: ParseErrorKind,
    pos: usize,
}

impl ParseError {
    /// Returns the byte position in the declaration the error occured at.
    pub fn position(&self) -> usize {
        self.pos
    }
}

/// Internal message representation of parsing error.
///
/// This allows us to make these errors freely without any allocations.
#[derive(Debug)]
enum ParseErrorKind {
    Eos,
    Expect(&'static str),
    ExpectChar(char),
}

impl Display for ParseErrorKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ParseErrorKind::Eos => f.write_str("unexpected end of stream"),
            ParseErrorKind::Expect(name) => write!(f, "expected {name}"),
            ParseErrorKind::ExpectChar(char) => write!(f, "expected {char}"),
        }
    }
}
