//! Bridge registry: platform capabilities exposed to the source language
//!
//! A bridge module is an external capability (a libc entry point, a device
//! driver) surfaced as a fixed, read-only set of callable symbols. The
//! registry is built once per platform configuration, passed explicitly to
//! every compiler instance, and never mutated afterwards — compilation
//! units may share it across threads.

use crate::scope::{Scope, SymbolEntry};
use crate::types::TypeKind;
use indexmap::IndexMap;

/// One external module and its fixed symbols
#[derive(Debug)]
pub struct BridgeModule {
    name: String,
    symbols: IndexMap<String, SymbolEntry>,
}

impl BridgeModule {
    /// Create an empty bridge module
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            symbols: IndexMap::new(),
        }
    }

    /// Bind a callable symbol to its fixed target name
    pub fn bind(
        mut self,
        source_name: &str,
        target_name: &str,
        params: Vec<TypeKind>,
        ret: TypeKind,
    ) -> Self {
        let ty = TypeKind::Function {
            params,
            ret: Box::new(ret),
        };
        self.symbols.insert(
            source_name.to_string(),
            SymbolEntry::new(source_name, ty, true, target_name),
        );
        self
    }

    /// Source name of the module
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an exposed symbol
    pub fn symbol(&self, name: &str) -> Option<&SymbolEntry> {
        self.symbols.get(name)
    }
}

/// The read-only set of bridge modules for one platform
#[derive(Debug, Default)]
pub struct BridgeRegistry {
    modules: IndexMap<String, BridgeModule>,
    /// Module-name entries seeding the root scope frame
    entries: IndexMap<String, SymbolEntry>,
}

impl BridgeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bridge module
    pub fn with_module(mut self, module: BridgeModule) -> Self {
        let entry = SymbolEntry::new(module.name(), TypeKind::Module, false, module.name());
        self.entries.insert(module.name().to_string(), entry);
        self.modules.insert(module.name().to_string(), module);
        self
    }

    /// Look up a bridge module by source name
    pub fn module(&self, name: &str) -> Option<&BridgeModule> {
        self.modules.get(name)
    }

    /// The scope entry standing for a module name
    pub fn module_entry(&self, name: &str) -> Option<&SymbolEntry> {
        self.entries.get(name)
    }

    /// Whether a module name is bound in the registry
    pub fn contains_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    /// Build the root scope frame every module scope chains to
    pub fn root_scope(&self) -> Scope {
        let mut scope = Scope::new(None);
        for entry in self.entries.values() {
            scope.insert(entry.clone());
        }
        scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_symbols_carry_both_identities() {
        let module = BridgeModule::new("io").bind(
            "print",
            "printf",
            vec![TypeKind::Str],
            TypeKind::None,
        );
        let entry = module.symbol("print").unwrap();
        assert_eq!(entry.source.name, "print");
        assert_eq!(entry.target.name, "printf");
        assert!(entry.source.callable);
        assert!(entry.target.callable);
        assert_eq!(entry.target.ty, "void");
    }

    #[test]
    fn unknown_module_and_symbol_are_absent() {
        let registry = BridgeRegistry::new()
            .with_module(BridgeModule::new("io").bind("print", "printf", vec![], TypeKind::None));
        assert!(registry.contains_module("io"));
        assert!(!registry.contains_module("gpio"));
        assert!(registry.module("io").unwrap().symbol("println").is_none());
    }

    #[test]
    fn root_scope_exposes_module_names_unmangled() {
        let registry = BridgeRegistry::new()
            .with_module(BridgeModule::new("io"))
            .with_module(BridgeModule::new("avr"));
        let scope = registry.root_scope();
        let entry = scope.lookup("io").unwrap();
        assert_eq!(entry.source.ty, TypeKind::Module);
        assert_eq!(entry.target.name, "io");
        assert!(scope.lookup("avr").is_some());
    }
}
