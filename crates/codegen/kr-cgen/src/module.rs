//! Module lowering
//!
//! A module compiles in three steps. First the self-referential name symbol
//! is registered, before anything else. Then a pre-declaration pass walks
//! ALL top-level statement subtrees — declarations may sit inside top-level
//! control flow — declaring every module-level variable and every function
//! ahead of body emission, and emitting the globals and prototypes section.
//! Finally the body is partitioned: function definitions become named C
//! functions, everything else becomes the synthesized init function, whose
//! mangled name is the module's externally visible identity.

use crate::function::{self, FunctionCompiler};
use crate::statement::StatementCompiler;
use kr_ast::{FunctionDef, Module, Stmt};
use kr_resolve::{BridgeRegistry, CompileError, Scope, TypeKind, INIT_SUFFIX, MODULE_PREFIX};
use rustc_hash::FxHashSet;

/// The lowered pieces of one module, in emission order
#[derive(Debug, Clone)]
pub struct ModuleOutput {
    /// Module-level globals and function prototypes
    pub declarations: String,
    /// The synthesized init function
    pub init: String,
    /// Named function definitions
    pub functions: String,
    /// Mangled name of the init function — the module's identity
    pub init_symbol: String,
}

/// Lowers one compilation unit
pub struct ModuleCompiler<'a> {
    registry: &'a BridgeRegistry,
    module_name: String,
    self_name: String,
}

impl<'a> ModuleCompiler<'a> {
    /// Create a module compiler
    ///
    /// `self_name` is the value bound to the module's own name symbol; the
    /// driver passes `__main__` for the program's first unit and the module
    /// name otherwise.
    pub fn new(registry: &'a BridgeRegistry, module_name: &str, self_name: &str) -> Self {
        Self {
            registry,
            module_name: module_name.to_string(),
            self_name: self_name.to_string(),
        }
    }

    /// Lower the unit
    pub fn compile(&self, module: &Module) -> Result<ModuleOutput, CompileError> {
        let mut scope = self
            .registry
            .root_scope()
            .child(Some(format!("{MODULE_PREFIX}{}", self.module_name)));

        // The module's own name registers before anything else.
        let self_entry = scope.declare("__name__", TypeKind::Str, false)?;
        let mut declarations = format!(
            "char {}[] = {};\n",
            self_entry.target.name,
            byte_array(&self.self_name)
        );

        // Pre-declaration pass over every top-level subtree.
        let mut predeclared = FxHashSet::default();
        for stmt in &module.body {
            match stmt {
                Stmt::FunctionDef(def) => {
                    declarations.push_str(&self.predeclare_function(def, &mut scope)?);
                }
                other => {
                    self.predeclare_variables(other, &mut scope, &mut predeclared, &mut declarations)?;
                }
            }
        }

        // Partition: named functions on one side, init body on the other.
        let mut defs: Vec<&FunctionDef> = Vec::new();
        let init_symbol = format!("{MODULE_PREFIX}{}{INIT_SUFFIX}", self.module_name);
        let stmts = StatementCompiler::for_module_init(self.registry, &predeclared);
        let mut init_body = String::new();
        for stmt in &module.body {
            match stmt {
                Stmt::FunctionDef(def) => defs.push(def),
                other => init_body.push_str(&stmts.compile(other, &mut scope)?),
            }
        }
        let init = format!("int32_t {init_symbol}(void) {{\n{init_body}return 0;\n}}\n");

        // Function children are created only now, after the pre-pass, so
        // every body sees the complete set of module bindings.
        let compiler = FunctionCompiler::new(self.registry);
        let mut lowered_defs = Vec::with_capacity(defs.len());
        for def in defs {
            lowered_defs.push(compiler.compile(def, &scope)?);
        }

        Ok(ModuleOutput {
            declarations,
            init,
            functions: lowered_defs.join("\n"),
            init_symbol,
        })
    }

    /// Declare a top-level function and emit its prototype
    fn predeclare_function(
        &self,
        def: &FunctionDef,
        scope: &mut Scope,
    ) -> Result<String, CompileError> {
        let ret = function::return_type(def)?;
        let typed = function::typed_params(def)?;
        let mut proto_params = Vec::with_capacity(typed.len());
        let mut param_types = Vec::with_capacity(typed.len());
        for (ty, param) in typed {
            proto_params.push(format!("{} {}", ty.c_type(), param.name));
            param_types.push(ty);
        }
        let signature = TypeKind::Function {
            params: param_types,
            ret: Box::new(ret.clone()),
        };
        let entry = scope
            .declare(&def.name, signature, true)
            .map_err(|err| err.with_pos(def.pos))?;

        let args = if proto_params.is_empty() {
            "void".to_string()
        } else {
            proto_params.join(", ")
        };
        Ok(format!("{} {}({});\n", ret.c_type(), entry.target.name, args))
    }

    /// Declare every annotated name in a statement subtree as a global
    fn predeclare_variables(
        &self,
        stmt: &Stmt,
        scope: &mut Scope,
        predeclared: &mut FxHashSet<String>,
        declarations: &mut String,
    ) -> Result<(), CompileError> {
        match stmt {
            Stmt::AnnAssign {
                target,
                annotation,
                pos,
                ..
            } => {
                let ty = TypeKind::from_annotation(annotation).ok_or_else(|| {
                    CompileError::UnsupportedConstruct {
                        detail: format!("unknown type annotation `{annotation}`"),
                        pos: Some(*pos),
                    }
                })?;
                if ty == TypeKind::None {
                    return Err(CompileError::UnsupportedConstruct {
                        detail: "variable of type `None`".to_string(),
                        pos: Some(*pos),
                    });
                }
                let entry = scope
                    .declare(target, ty, false)
                    .map_err(|err| err.with_pos(*pos))?;
                declarations.push_str(&format!("{} {};\n", entry.target.ty, entry.target.name));
                predeclared.insert(target.clone());
            }
            Stmt::If { body, orelse, .. } | Stmt::While { body, orelse, .. } => {
                for nested in body.iter().chain(orelse) {
                    self.predeclare_variables(nested, scope, predeclared, declarations)?;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

/// Byte-sequence form of a compile-time string value
fn byte_array(value: &str) -> String {
    let mut bytes: Vec<String> = value.bytes().map(|b| b.to_string()).collect();
    bytes.push("0".to_string());
    format!("{{{}}}", bytes.join(", "))
}
