//! Error types for compilation
//!
//! One taxonomy covers the whole pipeline. Every failure aborts the current
//! unit immediately; nothing here is recoverable and nothing is logged.

use kr_span::Pos;

/// Errors that abort compilation of the current unit
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// A name, dotted path, or imported module that nothing declares
    #[error("unresolved reference to `{name}`")]
    UnresolvedReference {
        /// The name or dotted path that failed to resolve
        name: String,
        /// Position of the triggering node, when it carries one
        pos: Option<Pos>,
    },

    /// An expression whose inferred type conflicts with the declared one
    #[error("mismatched types: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        /// Source-facing name of the declared type
        expected: String,
        /// Source-facing name of the inferred type
        found: String,
        /// Position of the triggering node, when it carries one
        pos: Option<Pos>,
    },

    /// The same name declared twice at the same scope level
    #[error("duplicate declaration of `{name}` in the same scope")]
    DuplicateDeclaration {
        /// The re-declared name
        name: String,
        /// Position of the triggering node, when it carries one
        pos: Option<Pos>,
    },

    /// A source form outside the supported subset
    #[error("unsupported construct: {detail}")]
    UnsupportedConstruct {
        /// What the input used that the subset excludes
        detail: String,
        /// Position of the triggering node, when it carries one
        pos: Option<Pos>,
    },
}

impl CompileError {
    /// Position of the triggering node, if one was recorded
    pub fn pos(&self) -> Option<Pos> {
        match self {
            Self::UnresolvedReference { pos, .. }
            | Self::TypeMismatch { pos, .. }
            | Self::DuplicateDeclaration { pos, .. }
            | Self::UnsupportedConstruct { pos, .. } => *pos,
        }
    }

    /// Attach a position if the error does not already carry one
    ///
    /// Errors raised below the statement level (scope lookups, type checks)
    /// often lack a position; the compiler closest to the source node fills
    /// it in as the error propagates outward.
    pub fn with_pos(mut self, at: Pos) -> Self {
        let slot = match &mut self {
            Self::UnresolvedReference { pos, .. }
            | Self::TypeMismatch { pos, .. }
            | Self::DuplicateDeclaration { pos, .. }
            | Self::UnsupportedConstruct { pos, .. } => pos,
        };
        if slot.is_none() {
            *slot = Some(at);
        }
        self
    }
}
