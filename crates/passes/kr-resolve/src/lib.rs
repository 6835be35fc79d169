//! Name resolution for the typed scripting subset
//!
//! This crate holds the symbol side of the compiler: the scope chain with
//! its dual source/target identities and name mangling, the closed type
//! system with its C translation table, the read-only bridge registry that
//! exposes platform capabilities, and the compile error taxonomy.
//!
//! # Architecture
//!
//! - **Scope chain**: sealed parent frames plus one mutable current frame;
//!   resolution walks the chain read-only and never mutates an ancestor
//! - **Type system**: closed set of type tags with exact-equality
//!   compatibility and a total source→C translation table
//! - **Bridge registry**: immutable map from external module names to fixed
//!   target symbols, shared by every compilation unit

pub mod bridge;
pub mod error;
pub mod scope;
pub mod types;

pub use bridge::{BridgeModule, BridgeRegistry};
pub use error::CompileError;
pub use scope::{Scope, SourceIdentity, SymbolEntry, TargetIdentity};
pub use scope::{ATTR_SEPARATOR, INIT_SUFFIX, MODULE_PREFIX};
pub use types::TypeKind;
