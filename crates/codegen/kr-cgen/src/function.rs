//! Function lowering
//!
//! Wraps a statement sequence in one C function. The function's scope is a
//! child of the flat module scope, created only after the module pre-pass
//! has declared every module-level symbol — so bodies may call functions
//! defined later in the file and may shadow module globals with locals.

use crate::statement::StatementCompiler;
use kr_ast::{FunctionDef, Param};
use kr_resolve::{BridgeRegistry, CompileError, Scope, TypeKind};

/// Lowers one function definition to a C function
pub struct FunctionCompiler<'a> {
    registry: &'a BridgeRegistry,
}

impl<'a> FunctionCompiler<'a> {
    /// Create a function compiler over an immutable registry
    pub fn new(registry: &'a BridgeRegistry) -> Self {
        Self { registry }
    }

    /// Lower a function whose symbol the module pre-pass already declared
    pub fn compile(
        &self,
        def: &FunctionDef,
        module_scope: &Scope,
    ) -> Result<String, CompileError> {
        if let Some(decorator) = def.decorators.first() {
            return Err(CompileError::UnsupportedConstruct {
                detail: format!("function decorators (`@{decorator}`)"),
                pos: Some(def.pos),
            });
        }

        let ret = return_type(def)?;
        let path = [def.name.clone()];
        let entry = module_scope
            .resolve(&path, self.registry)
            .map_err(|err| err.with_pos(def.pos))?;
        let target_name = entry.target.name.clone();

        let mut scope = module_scope.child(None);
        let mut args = Vec::with_capacity(def.params.len());
        for (ty, param) in typed_params(def)? {
            let declared = scope
                .declare(&param.name, ty, false)
                .map_err(|err| err.with_pos(param.pos))?;
            args.push(format!("{} {}", declared.target.ty, declared.target.name));
        }
        let args_src = if args.is_empty() {
            "void".to_string()
        } else {
            args.join(", ")
        };

        let body = StatementCompiler::new(self.registry, ret.clone())
            .compile_block(&def.body, &mut scope)?;

        Ok(format!(
            "{} {}({}) {{\n{}}}\n",
            ret.c_type(),
            target_name,
            args_src,
            body
        ))
    }
}

/// Parse a definition's return annotation; absent means `None`/`void`
pub(crate) fn return_type(def: &FunctionDef) -> Result<TypeKind, CompileError> {
    match &def.returns {
        None => Ok(TypeKind::None),
        Some(annotation) => TypeKind::from_annotation(annotation).ok_or_else(|| {
            CompileError::UnsupportedConstruct {
                detail: format!(
                    "unknown return type annotation `{}` for function `{}`",
                    annotation, def.name
                ),
                pos: Some(def.pos),
            }
        }),
    }
}

/// Parse every parameter annotation of a definition
pub(crate) fn typed_params(
    def: &FunctionDef,
) -> Result<Vec<(TypeKind, &Param)>, CompileError> {
    let mut typed = Vec::with_capacity(def.params.len());
    for param in &def.params {
        let Some(annotation) = &param.annotation else {
            return Err(CompileError::UnsupportedConstruct {
                detail: format!("parameter `{}` without a type annotation", param.name),
                pos: Some(param.pos),
            });
        };
        let ty = TypeKind::from_annotation(annotation).ok_or_else(|| {
            CompileError::UnsupportedConstruct {
                detail: format!(
                    "unknown type annotation `{}` for parameter `{}`",
                    annotation, param.name
                ),
                pos: Some(param.pos),
            }
        })?;
        if ty == TypeKind::None {
            return Err(CompileError::UnsupportedConstruct {
                detail: format!("parameter `{}` of type `None`", param.name),
                pos: Some(param.pos),
            });
        }
        typed.push((ty, param));
    }
    Ok(typed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kr_ast::{Expr, Stmt};
    use kr_resolve::MODULE_PREFIX;
    use kr_span::Pos;

    fn registry() -> BridgeRegistry {
        BridgeRegistry::new()
    }

    fn at(line: u32, col: u32) -> Pos {
        Pos::new(line, col)
    }

    fn param(name: &str, annotation: &str) -> Param {
        Param {
            name: name.to_string(),
            annotation: Some(annotation.to_string()),
            pos: at(1, 8),
        }
    }

    /// Module scope with `def`'s symbol pre-declared, as the module
    /// compiler would have done.
    fn scope_with(def: &FunctionDef, registry: &BridgeRegistry) -> Scope {
        let mut scope = registry
            .root_scope()
            .child(Some(format!("{MODULE_PREFIX}demo")));
        let params = typed_params(def)
            .unwrap()
            .into_iter()
            .map(|(ty, _)| ty)
            .collect();
        let ty = TypeKind::Function {
            params,
            ret: Box::new(return_type(def).unwrap()),
        };
        scope.declare(&def.name, ty, true).unwrap();
        scope
    }

    #[test]
    fn signature_uses_the_mangled_name_and_bare_params() {
        let registry = registry();
        let def = FunctionDef {
            name: "add".into(),
            params: vec![param("a", "int"), param("b", "int")],
            returns: Some("int".into()),
            body: vec![Stmt::Return {
                value: Some(Expr::Binary {
                    op: kr_ast::BinOp::Add,
                    left: Box::new(Expr::Name {
                        name: "a".into(),
                        pos: at(2, 11),
                    }),
                    right: Box::new(Expr::Name {
                        name: "b".into(),
                        pos: at(2, 15),
                    }),
                    pos: at(2, 11),
                }),
                pos: at(2, 4),
            }],
            decorators: vec![],
            pos: at(1, 0),
        };
        let scope = scope_with(&def, &registry);

        let src = FunctionCompiler::new(&registry).compile(&def, &scope).unwrap();
        assert_eq!(
            src,
            "int32_t PYMOD_demo_DOT_add(int32_t a, int32_t b) {\nreturn (a + b);\n}\n"
        );
    }

    #[test]
    fn a_function_without_parameters_takes_void() {
        let registry = registry();
        let def = FunctionDef {
            name: "noop".into(),
            params: vec![],
            returns: None,
            body: vec![Stmt::Pass { pos: at(2, 4) }],
            decorators: vec![],
            pos: at(1, 0),
        };
        let scope = scope_with(&def, &registry);

        let src = FunctionCompiler::new(&registry).compile(&def, &scope).unwrap();
        assert_eq!(src, "void PYMOD_demo_DOT_noop(void) {\n;\n}\n");
    }

    #[test]
    fn parameters_shadow_module_globals() {
        let registry = registry();
        let def = FunctionDef {
            name: "f".into(),
            params: vec![param("x", "str")],
            returns: Some("str".into()),
            body: vec![Stmt::Return {
                value: Some(Expr::Name {
                    name: "x".into(),
                    pos: at(2, 11),
                }),
                pos: at(2, 4),
            }],
            decorators: vec![],
            pos: at(1, 0),
        };
        let mut scope = scope_with(&def, &registry);
        scope.declare("x", TypeKind::Int32, false).unwrap();

        let src = FunctionCompiler::new(&registry).compile(&def, &scope).unwrap();
        // `x` resolves to the parameter, not the mangled global.
        assert_eq!(src, "char* PYMOD_demo_DOT_f(char* x) {\nreturn x;\n}\n");
    }

    #[test]
    fn a_valued_return_without_an_annotation_is_a_mismatch() {
        let registry = registry();
        let def = FunctionDef {
            name: "f".into(),
            params: vec![],
            returns: None,
            body: vec![Stmt::Return {
                value: Some(Expr::Int {
                    value: 1,
                    pos: at(2, 11),
                }),
                pos: at(2, 4),
            }],
            decorators: vec![],
            pos: at(1, 0),
        };
        let scope = scope_with(&def, &registry);

        let err = FunctionCompiler::new(&registry)
            .compile(&def, &scope)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::TypeMismatch {
                expected: "None".into(),
                found: "int".into(),
                pos: Some(at(2, 11)),
            }
        );
    }

    #[test]
    fn decorators_are_unsupported() {
        let registry = registry();
        let def = FunctionDef {
            name: "f".into(),
            params: vec![],
            returns: None,
            body: vec![Stmt::Pass { pos: at(2, 4) }],
            decorators: vec!["staticmethod".into()],
            pos: at(1, 0),
        };
        let mut scope = registry.root_scope().child(None);
        scope
            .declare(
                "f",
                TypeKind::Function {
                    params: vec![],
                    ret: Box::new(TypeKind::None),
                },
                true,
            )
            .unwrap();

        let err = FunctionCompiler::new(&registry)
            .compile(&def, &scope)
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedConstruct {
                detail: "function decorators (`@staticmethod`)".into(),
                pos: Some(at(1, 0)),
            }
        );
    }

    #[test]
    fn unannotated_parameters_are_unsupported() {
        let registry = registry();
        let def = FunctionDef {
            name: "f".into(),
            params: vec![Param {
                name: "x".into(),
                annotation: None,
                pos: at(1, 6),
            }],
            returns: None,
            body: vec![],
            decorators: vec![],
            pos: at(1, 0),
        };

        let err = typed_params(&def).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedConstruct {
                detail: "parameter `x` without a type annotation".into(),
                pos: Some(at(1, 6)),
            }
        );
    }
}
