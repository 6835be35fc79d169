//! Statement and control-flow lowering
//!
//! A nested if/while body compiles over the SAME scope object as the
//! enclosing statement — there is no block-local scope, so a name declared
//! inside a conditional body remains visible and assignable after the
//! block ends. That mirrors the observed source semantics and is kept
//! deliberately (see DESIGN.md).

use crate::expression::ExpressionCompiler;
use kr_ast::{AssignTarget, Expr, Stmt};
use kr_resolve::{BridgeRegistry, CompileError, Scope, TypeKind};
use kr_span::Pos;
use rustc_hash::FxHashSet;

/// Lowers statements against a scope, driving the expression compiler
pub struct StatementCompiler<'a> {
    registry: &'a BridgeRegistry,
    exprs: ExpressionCompiler<'a>,
    /// Declared return type of the enclosing function
    ret: TypeKind,
    /// Names the module compiler pre-declared as globals; present only when
    /// compiling the synthesized init body
    predeclared: Option<&'a FxHashSet<String>>,
}

impl<'a> StatementCompiler<'a> {
    /// Compiler for a named function body with the given return type
    pub fn new(registry: &'a BridgeRegistry, ret: TypeKind) -> Self {
        Self {
            registry,
            exprs: ExpressionCompiler::new(registry),
            ret,
            predeclared: None,
        }
    }

    /// Compiler for the module init body
    ///
    /// The init function's return type is fixed to int32. Annotated
    /// declarations whose names appear in `predeclared` were already
    /// emitted as globals and lower to plain assignments here.
    pub fn for_module_init(
        registry: &'a BridgeRegistry,
        predeclared: &'a FxHashSet<String>,
    ) -> Self {
        Self {
            registry,
            exprs: ExpressionCompiler::new(registry),
            ret: TypeKind::Int32,
            predeclared: Some(predeclared),
        }
    }

    /// Lower a statement sequence, concatenating the emitted text
    pub fn compile_block(&self, stmts: &[Stmt], scope: &mut Scope) -> Result<String, CompileError> {
        let mut src = String::new();
        for stmt in stmts {
            src.push_str(&self.compile(stmt, scope)?);
        }
        Ok(src)
    }

    /// Lower one statement
    pub fn compile(&self, stmt: &Stmt, scope: &mut Scope) -> Result<String, CompileError> {
        match stmt {
            Stmt::FunctionDef(def) => Err(CompileError::UnsupportedConstruct {
                detail: "nested function definitions".to_string(),
                pos: Some(def.pos),
            }),
            Stmt::AnnAssign {
                target,
                annotation,
                value,
                pos,
            } => self.compile_ann_assign(target, annotation, value.as_ref(), *pos, scope),
            Stmt::Assign {
                targets,
                value,
                pos,
            } => self.compile_assign(targets, value, *pos, scope),
            Stmt::If {
                test,
                body,
                orelse,
                pos: _,
            } => {
                let test = self.exprs.compile(test, scope)?;
                let body_src = self.compile_block(body, scope)?;
                if orelse.is_empty() {
                    Ok(format!("if ({}) {{\n{}}}\n", test.text, body_src))
                } else {
                    let orelse_src = self.compile_block(orelse, scope)?;
                    Ok(format!(
                        "if ({}) {{\n{}}} else {{\n{}}}\n",
                        test.text, body_src, orelse_src
                    ))
                }
            }
            Stmt::While {
                test,
                body,
                orelse,
                pos,
            } => {
                if !orelse.is_empty() {
                    return Err(CompileError::UnsupportedConstruct {
                        detail: "`else` clause on a loop".to_string(),
                        pos: Some(*pos),
                    });
                }
                let test = self.exprs.compile(test, scope)?;
                let body_src = self.compile_block(body, scope)?;
                Ok(format!("while ({}) {{\n{}}}\n", test.text, body_src))
            }
            Stmt::Return { value, pos } => match value {
                None => {
                    if self.ret != TypeKind::None {
                        return Err(CompileError::TypeMismatch {
                            expected: self.ret.to_string(),
                            found: TypeKind::None.to_string(),
                            pos: Some(*pos),
                        });
                    }
                    Ok("return;\n".to_string())
                }
                Some(expr) => {
                    let lowered = self.exprs.compile(expr, scope)?;
                    if lowered.ty != self.ret {
                        return Err(CompileError::TypeMismatch {
                            expected: self.ret.to_string(),
                            found: lowered.ty.to_string(),
                            pos: Some(expr.pos()),
                        });
                    }
                    Ok(format!("return {};\n", lowered.text))
                }
            },
            Stmt::Expr { value, pos: _ } => {
                let lowered = self.exprs.compile(value, scope)?;
                Ok(format!("{};\n", lowered.text))
            }
            Stmt::Import { names, pos } => {
                // A bridge import compiles to nothing: its symbols are
                // reached through attribute access. Anything else is for an
                // external module loader, which the core does not have.
                for name in names {
                    if !self.registry.contains_module(name) {
                        return Err(CompileError::UnresolvedReference {
                            name: name.clone(),
                            pos: Some(*pos),
                        });
                    }
                }
                Ok(String::new())
            }
            Stmt::Pass { pos: _ } => Ok(";\n".to_string()),
        }
    }

    fn compile_ann_assign(
        &self,
        target: &str,
        annotation: &str,
        value: Option<&Expr>,
        pos: Pos,
        scope: &mut Scope,
    ) -> Result<String, CompileError> {
        let ty = TypeKind::from_annotation(annotation).ok_or_else(|| {
            CompileError::UnsupportedConstruct {
                detail: format!("unknown type annotation `{annotation}`"),
                pos: Some(pos),
            }
        })?;
        if ty == TypeKind::None {
            return Err(CompileError::UnsupportedConstruct {
                detail: "variable of type `None`".to_string(),
                pos: Some(pos),
            });
        }

        if self
            .predeclared
            .is_some_and(|names| names.contains(target))
        {
            // Already emitted as a global by the module pre-pass; the
            // declaration site contributes only the initializing assignment.
            let path = [target.to_string()];
            let entry = scope
                .resolve(&path, self.registry)
                .map_err(|err| err.with_pos(pos))?;
            if entry.source.ty != ty {
                return Err(CompileError::TypeMismatch {
                    expected: entry.source.ty.to_string(),
                    found: ty.to_string(),
                    pos: Some(pos),
                });
            }
            let Some(value) = value else {
                return Ok(String::new());
            };
            let target_name = entry.target.name.clone();
            let lowered = self.exprs.compile(value, scope)?;
            if lowered.ty != ty {
                return Err(CompileError::TypeMismatch {
                    expected: ty.to_string(),
                    found: lowered.ty.to_string(),
                    pos: Some(value.pos()),
                });
            }
            return Ok(format!("{} = {};\n", target_name, lowered.text));
        }

        // The value compiles before the declaration lands, so an
        // initializer cannot see the name it initializes.
        let lowered = match value {
            Some(value) => {
                let lowered = self.exprs.compile(value, scope)?;
                if lowered.ty != ty {
                    return Err(CompileError::TypeMismatch {
                        expected: ty.to_string(),
                        found: lowered.ty.to_string(),
                        pos: Some(value.pos()),
                    });
                }
                Some(lowered)
            }
            None => None,
        };
        let entry = scope
            .declare(target, ty, false)
            .map_err(|err| err.with_pos(pos))?;
        match lowered {
            Some(lowered) => Ok(format!(
                "{} {} = {};\n",
                entry.target.ty, entry.target.name, lowered.text
            )),
            None => Ok(format!("{} {};\n", entry.target.ty, entry.target.name)),
        }
    }

    fn compile_assign(
        &self,
        targets: &[AssignTarget],
        value: &Expr,
        pos: Pos,
        scope: &mut Scope,
    ) -> Result<String, CompileError> {
        if targets.len() != 1 {
            return Err(CompileError::UnsupportedConstruct {
                detail: "multiple assignment targets".to_string(),
                pos: Some(pos),
            });
        }
        let (name, target_pos) = match &targets[0] {
            AssignTarget::Attribute { pos, .. } => {
                return Err(CompileError::UnsupportedConstruct {
                    detail: "assignment to an attribute".to_string(),
                    pos: Some(*pos),
                });
            }
            AssignTarget::Name { name, pos } => (name, *pos),
        };

        let path = [name.clone()];
        let entry = scope
            .resolve(&path, self.registry)
            .map_err(|err| err.with_pos(target_pos))?;
        let declared = entry.source.ty.clone();
        let target_name = entry.target.name.clone();

        let lowered = self.exprs.compile(value, scope)?;
        if lowered.ty != declared {
            return Err(CompileError::TypeMismatch {
                expected: declared.to_string(),
                found: lowered.ty.to_string(),
                pos: Some(value.pos()),
            });
        }
        Ok(format!("{} = {};\n", target_name, lowered.text))
    }
}
