//! Source positions for diagnostics

use serde::{Deserialize, Serialize};
use std::fmt;

/// A line/column position in a source file
///
/// Lines are 1-based and columns are 0-based, matching what the external
/// front end reports for its tree nodes.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}:{}", self.line, self.col)
    }
}
