//! C code generation for the typed scripting subset
//!
//! Four compilers cooperate over one scope chain:
//!
//! - [`ExpressionCompiler`] lowers a single expression node to C text and
//!   an inferred type tag
//! - [`StatementCompiler`] lowers statements, driving the expression
//!   compiler; nested if/while bodies reuse the enclosing scope
//! - [`FunctionCompiler`] wraps a statement sequence in one C function
//! - [`ModuleCompiler`] pre-declares module-level symbols, synthesizes the
//!   init function, and partitions out the named function definitions
//!
//! Output is plain C text. A failed unit produces no output at all.

pub mod expression;
pub mod function;
pub mod module;
pub mod statement;

pub use expression::{ExpressionCompiler, Lowered};
pub use function::FunctionCompiler;
pub use module::{ModuleCompiler, ModuleOutput};
pub use statement::StatementCompiler;
