//! Scope chain and symbol entries
//!
//! A scope is an explicit chain of sealed parent frames plus one mutable
//! current frame. Creating a child seals a snapshot of the parent's current
//! frame, so declarations added to the parent afterwards stay invisible to
//! children that already exist. Resolution walks the chain read-only and
//! never mutates an ancestor. Frames keep insertion order so emitted
//! declarations follow source order.
//!
//! Every declared symbol carries two identities: the source-facing one
//! (name, type tag, callability) and the target-facing one (mangled C name,
//! C storage type, callability). Both are filled at declaration time from
//! the closed translation table.

use crate::bridge::BridgeRegistry;
use crate::error::CompileError;
use crate::types::TypeKind;
use indexmap::IndexMap;
use std::sync::Arc;

/// Prefix for every module-level target name
pub const MODULE_PREFIX: &str = "PYMOD_";
/// Separator standing in for `.` inside mangled target names
pub const ATTR_SEPARATOR: &str = "_DOT_";
/// Suffix of a module's synthesized init function
pub const INIT_SUFFIX: &str = "_INIT";

/// The source-facing half of a symbol
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIdentity {
    /// Name as written in the source
    pub name: String,
    /// Declared type tag
    pub ty: TypeKind,
    /// Whether the symbol may be called
    pub callable: bool,
}

/// The target-facing half of a symbol
#[derive(Debug, Clone, PartialEq)]
pub struct TargetIdentity {
    /// Mangled C identifier
    pub name: String,
    /// C storage type from the translation table
    pub ty: &'static str,
    /// Whether the symbol may be called
    pub callable: bool,
}

/// A declared name with both of its identities
///
/// Immutable once created; scopes hand out references and clones only.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolEntry {
    pub source: SourceIdentity,
    pub target: TargetIdentity,
}

impl SymbolEntry {
    /// Build an entry whose target identity is already known
    ///
    /// Scope declarations go through [`Scope::declare`] instead; this is for
    /// bridge bindings, where the target symbol is fixed by the platform.
    pub fn new(source_name: &str, ty: TypeKind, callable: bool, target_name: &str) -> Self {
        let c_ty = ty.c_type();
        Self {
            source: SourceIdentity {
                name: source_name.to_string(),
                ty,
                callable,
            },
            target: TargetIdentity {
                name: target_name.to_string(),
                ty: c_ty,
                callable,
            },
        }
    }
}

/// A sealed, read-only set of bindings
#[derive(Debug)]
struct Frame {
    symbols: IndexMap<String, SymbolEntry>,
}

/// A lexical scope: sealed ancestor frames plus one mutable frame
#[derive(Debug)]
pub struct Scope {
    /// Ancestors, outermost first; the bridge registry frame sits at index 0
    frames: Vec<Arc<Frame>>,
    /// Bindings declared at this level, in insertion order
    current: IndexMap<String, SymbolEntry>,
    /// Mangling prefix applied to names declared at this level
    prefix: Option<String>,
}

impl Scope {
    /// Create a root scope with no ancestors
    pub fn new(prefix: Option<String>) -> Self {
        Self {
            frames: Vec::new(),
            current: IndexMap::new(),
            prefix,
        }
    }

    /// Create a child scope
    ///
    /// The parent's current frame is sealed into a snapshot at this moment;
    /// names the parent declares later are invisible to the child. The
    /// ordering is load-bearing: the module compiler finishes its
    /// pre-declaration pass before any function child is created.
    pub fn child(&self, prefix: Option<String>) -> Self {
        let mut frames = self.frames.clone();
        frames.push(Arc::new(Frame {
            symbols: self.current.clone(),
        }));
        Self {
            frames,
            current: IndexMap::new(),
            prefix,
        }
    }

    /// Declare a name at this level
    ///
    /// The target name follows the prefix rule: `prefix + separator + name`,
    /// or the name unchanged when the scope carries no prefix. Fails with
    /// [`CompileError::DuplicateDeclaration`] when the name already exists
    /// in the current frame; a name bound only in an ancestor frame may be
    /// shadowed.
    pub fn declare(
        &mut self,
        name: &str,
        ty: TypeKind,
        callable: bool,
    ) -> Result<SymbolEntry, CompileError> {
        if self.current.contains_key(name) {
            return Err(CompileError::DuplicateDeclaration {
                name: name.to_string(),
                pos: None,
            });
        }
        let target_name = match &self.prefix {
            Some(prefix) => format!("{prefix}{ATTR_SEPARATOR}{name}"),
            None => name.to_string(),
        };
        let entry = SymbolEntry::new(name, ty, callable, &target_name);
        self.current.insert(name.to_string(), entry.clone());
        Ok(entry)
    }

    /// Look up a single name, innermost frame first
    pub fn lookup(&self, name: &str) -> Option<&SymbolEntry> {
        if let Some(entry) = self.current.get(name) {
            return Some(entry);
        }
        for frame in self.frames.iter().rev() {
            if let Some(entry) = frame.symbols.get(name) {
                return Some(entry);
            }
        }
        None
    }

    /// Resolve a dotted path of name segments
    ///
    /// A single segment walks the chain. A longer path treats a module
    /// value as a nested scope: when the head names a recognized bridge
    /// module, resolution goes straight to the registry, bypassing chain
    /// delegation entirely. Any absent segment fails with
    /// [`CompileError::UnresolvedReference`].
    pub fn resolve<'a>(
        &'a self,
        path: &[String],
        registry: &'a BridgeRegistry,
    ) -> Result<&'a SymbolEntry, CompileError> {
        let Some(head) = path.first() else {
            return Err(CompileError::UnresolvedReference {
                name: String::new(),
                pos: None,
            });
        };

        let bridged = if path.len() > 1 {
            registry.module_entry(head)
        } else {
            None
        };
        let mut entry = match bridged.or_else(|| self.lookup(head)) {
            Some(entry) => entry,
            None => {
                return Err(CompileError::UnresolvedReference {
                    name: head.clone(),
                    pos: None,
                });
            }
        };

        for (depth, segment) in path.iter().enumerate().skip(1) {
            let nested = match entry.source.ty {
                TypeKind::Module => registry.module(&entry.source.name),
                _ => None,
            };
            entry = match nested.and_then(|module| module.symbol(segment)) {
                Some(entry) => entry,
                None => {
                    return Err(CompileError::UnresolvedReference {
                        name: path[..=depth].join("."),
                        pos: None,
                    });
                }
            };
        }
        Ok(entry)
    }

    /// Insert a pre-built entry, used by the registry to seed its frame
    pub(crate) fn insert(&mut self, entry: SymbolEntry) {
        self.current.insert(entry.source.name.clone(), entry);
    }
}
