//! Operation kind detection for GraphQL documents
//!
//! Only enough of the GraphQL lexical grammar is understood to find the
//! first executable operation definition: whitespace, commas, comments,
//! strings (plain and block) and balanced braces. Fragment definitions
//! ahead of the operation are skipped. Anything else is reported as
//! undeterminable rather than guessed.

use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// The root operation type of a GraphQL request
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Determine the kind of the operation a request on `document` runs
    ///
    /// A selection-set shorthand (`{ hello }`) is a query. A document that
    /// defines several operations is a mutation if any of them is one.
    /// Returns `None` when no operation definition can be identified.
    pub fn from_document(document: &str) -> Option<Self> {
        inspect_document(document).map(|header| header.kind)
    }
}

/// Kind and optional name of one operation definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationHeader {
    pub kind: OperationKind,
    pub name: Option<String>,
}

/// The operation a request on `document` runs when no name is given
pub fn inspect_document(document: &str) -> Option<OperationHeader> {
    select_operation(document, None)
}

/// Pick the operation definition a request runs
///
/// With `operation_name`, the definition of that name is chosen. Otherwise,
/// or if no definition has that name, a lone definition is chosen; among
/// several, the first mutation, else the first definition.
pub fn select_operation(document: &str, operation_name: Option<&str>) -> Option<OperationHeader> {
    let mut definitions = operation_definitions(document)?;

    let named = operation_name
        .and_then(|name| definitions.iter().position(|d| d.name.as_deref() == Some(name)));
    let mutation = || {
        definitions
            .iter()
            .position(|d| d.kind == OperationKind::Mutation)
    };
    let index = named.or_else(mutation).unwrap_or(0);
    Some(definitions.swap_remove(index))
}

/// Every operation definition in `document`, in document order
///
/// Fragment definitions are skipped. Returns `None` if anything else is
/// defined at the top level, a definition is unterminated, or the document
/// holds no operation.
pub fn operation_definitions(document: &str) -> Option<Vec<OperationHeader>> {
    let mut scanner = Scanner::new(document);
    let mut definitions = Vec::new();

    loop {
        scanner.skip_ignored();
        let Some(next) = scanner.peek() else {
            break;
        };

        let kind = match next {
            b'{' => OperationKind::Query,
            c if is_name_start(c) => match scanner.name() {
                "query" => OperationKind::Query,
                "mutation" => OperationKind::Mutation,
                "subscription" => OperationKind::Subscription,
                "fragment" => {
                    scanner.skip_definition()?;
                    continue;
                }
                _ => return None,
            },
            _ => return None,
        };

        scanner.skip_ignored();
        let name = match scanner.peek() {
            Some(c) if next != b'{' && is_name_start(c) => Some(scanner.name().to_string()),
            _ => None,
        };
        scanner.skip_definition()?;
        definitions.push(OperationHeader { kind, name });
    }

    if definitions.is_empty() {
        None
    } else {
        Some(definitions)
    }
}

fn is_name_start(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphabetic()
}

fn is_name_continue(c: u8) -> bool {
    c == b'_' || c.is_ascii_alphanumeric()
}

struct Scanner<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        Self { source, pos: 0 }
    }

    fn bytes(&self) -> &'a [u8] {
        self.source.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn starts_with(&self, pattern: &str) -> bool {
        self.bytes()
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(pattern.as_bytes()))
    }

    /// Skip whitespace, line terminators, commas and comments
    fn skip_ignored(&mut self) {
        while let Some(c) = self.peek() {
            match c {
                b' ' | b'\t' | b'\n' | b'\r' | b',' => self.pos += 1,
                b'#' => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' || c == b'\r' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn name(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_continue(c)) {
            self.pos += 1;
        }
        &self.source[start..self.pos]
    }

    fn skip_string(&mut self) -> Option<()> {
        if self.starts_with("\"\"\"") {
            self.pos += 3;
            loop {
                if self.starts_with("\\\"\"\"") {
                    self.pos += 4;
                } else if self.starts_with("\"\"\"") {
                    self.pos += 3;
                    return Some(());
                } else {
                    self.peek()?;
                    self.pos += 1;
                }
            }
        }

        self.pos += 1;
        loop {
            match self.peek()? {
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return Some(());
                }
                b'\n' | b'\r' => return None,
                _ => self.pos += 1,
            }
        }
    }

    /// Skip one definition: everything up to and including its top-level
    /// selection set. Argument lists may hold object values, so they are
    /// skipped as a whole.
    fn skip_definition(&mut self) -> Option<()> {
        loop {
            self.skip_ignored();
            match self.peek()? {
                b'"' => self.skip_string()?,
                b'(' => self.skip_group(b'(', b')')?,
                b'{' => return self.skip_group(b'{', b'}'),
                _ => self.pos += 1,
            }
        }
    }

    /// Skip a balanced `open`..`close` group starting at the current byte
    fn skip_group(&mut self, open: u8, close: u8) -> Option<()> {
        let mut depth = 0usize;
        loop {
            self.skip_ignored();
            match self.peek()? {
                b'"' => self.skip_string()?,
                c if c == open => {
                    depth += 1;
                    self.pos += 1;
                }
                c if c == close => {
                    depth = depth.checked_sub(1)?;
                    self.pos += 1;
                    if depth == 0 {
                        return Some(());
                    }
                }
                _ => self.pos += 1,
            }
        }
    }
}
