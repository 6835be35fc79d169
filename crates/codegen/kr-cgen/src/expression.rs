//! Expression lowering
//!
//! One expression node plus a scope becomes C text and an inferred type
//! tag. Call arity and per-argument types are not checked — a documented
//! limitation carried over from the source semantics.

use kr_ast::{CmpOp, Expr, UnaryOp};
use kr_resolve::{BridgeRegistry, CompileError, Scope, TypeKind};
use kr_span::Pos;

/// The result of lowering one expression
#[derive(Debug, Clone, PartialEq)]
pub struct Lowered {
    /// C text for the expression
    pub text: String,
    /// Inferred type tag
    pub ty: TypeKind,
}

/// Lowers expression nodes against a scope
pub struct ExpressionCompiler<'a> {
    registry: &'a BridgeRegistry,
}

impl<'a> ExpressionCompiler<'a> {
    /// Create an expression compiler over an immutable registry
    pub fn new(registry: &'a BridgeRegistry) -> Self {
        Self { registry }
    }

    /// Lower one expression node
    pub fn compile(&self, expr: &Expr, scope: &Scope) -> Result<Lowered, CompileError> {
        match expr {
            Expr::Int { value, pos: _ } => Ok(Lowered {
                text: value.to_string(),
                ty: TypeKind::Int32,
            }),
            Expr::Str { value, pos: _ } => Ok(Lowered {
                text: string_literal(value),
                ty: TypeKind::Str,
            }),
            Expr::Bool { value, pos: _ } => Ok(Lowered {
                text: if *value { "true" } else { "false" }.to_string(),
                ty: TypeKind::Bool,
            }),
            Expr::Name { .. } | Expr::Attribute { .. } => {
                let (path, pos) = name_path(expr)?;
                let entry = scope
                    .resolve(&path, self.registry)
                    .map_err(|err| err.with_pos(pos))?;
                Ok(Lowered {
                    text: entry.target.name.clone(),
                    ty: entry.source.ty.clone(),
                })
            }
            Expr::Call { func, args, pos } => self.compile_call(func, args, *pos, scope),
            Expr::Binary {
                op,
                left,
                right,
                pos,
            } => {
                let lhs = self.compile(left, scope)?;
                let rhs = self.compile(right, scope)?;
                if lhs.ty != rhs.ty {
                    return Err(CompileError::TypeMismatch {
                        expected: lhs.ty.to_string(),
                        found: rhs.ty.to_string(),
                        pos: Some(right.pos()),
                    });
                }
                if lhs.ty != TypeKind::Int32 {
                    return Err(CompileError::UnsupportedConstruct {
                        detail: format!("arithmetic on `{}` operands", lhs.ty),
                        pos: Some(*pos),
                    });
                }
                Ok(Lowered {
                    text: format!("({} {} {})", lhs.text, op, rhs.text),
                    ty: TypeKind::Int32,
                })
            }
            Expr::Compare {
                left,
                ops,
                comparators,
                pos,
            } => self.compile_compare(left, ops, comparators, *pos, scope),
            Expr::Logical { op, values, pos: _ } => {
                let mut parts = Vec::with_capacity(values.len());
                for value in values {
                    let lowered = self.compile(value, scope)?;
                    parts.push(format!("({})", lowered.text));
                }
                Ok(Lowered {
                    text: parts.join(&format!(" {op} ")),
                    ty: TypeKind::Bool,
                })
            }
            Expr::Unary {
                op: UnaryOp::Not,
                operand: _,
                pos,
            } => Err(CompileError::UnsupportedConstruct {
                detail: "the `not` operator".to_string(),
                pos: Some(*pos),
            }),
        }
    }

    fn compile_call(
        &self,
        func: &Expr,
        args: &[Expr],
        pos: Pos,
        scope: &Scope,
    ) -> Result<Lowered, CompileError> {
        let (path, func_pos) = name_path(func)?;
        let entry = scope
            .resolve(&path, self.registry)
            .map_err(|err| err.with_pos(func_pos))?;

        let TypeKind::Function { ret, .. } = &entry.source.ty else {
            return Err(CompileError::TypeMismatch {
                expected: "function".to_string(),
                found: entry.source.ty.to_string(),
                pos: Some(pos),
            });
        };
        let ret = (**ret).clone();
        let target = entry.target.name.clone();

        // Arguments compile positionally; arity and argument types are not
        // checked against the parameter list.
        let mut lowered_args = Vec::with_capacity(args.len());
        for arg in args {
            lowered_args.push(self.compile(arg, scope)?.text);
        }
        Ok(Lowered {
            text: format!("{}({})", target, lowered_args.join(", ")),
            ty: ret,
        })
    }

    fn compile_compare(
        &self,
        left: &Expr,
        ops: &[CmpOp],
        comparators: &[Expr],
        pos: Pos,
        scope: &Scope,
    ) -> Result<Lowered, CompileError> {
        if comparators.is_empty() || ops.len() != comparators.len() {
            return Err(CompileError::UnsupportedConstruct {
                detail: "malformed comparison".to_string(),
                pos: Some(pos),
            });
        }
        let lhs = self.compile(left, scope)?;

        if lhs.ty == TypeKind::Str {
            // Strings lower to a byte-wise three-way compare against a
            // literal; exactly one comparator is accepted.
            if comparators.len() > 1 {
                return Err(CompileError::UnsupportedConstruct {
                    detail: "string comparison with more than one comparator".to_string(),
                    pos: Some(pos),
                });
            }
            let rhs = self.compile(&comparators[0], scope)?;
            if rhs.ty != TypeKind::Str {
                return Err(CompileError::TypeMismatch {
                    expected: TypeKind::Str.to_string(),
                    found: rhs.ty.to_string(),
                    pos: Some(comparators[0].pos()),
                });
            }
            let (relation, literal) = match ops[0] {
                CmpOp::Eq => ("==", "0"),
                CmpOp::NotEq => ("!=", "0"),
                CmpOp::Lt => ("==", "-1"),
                CmpOp::Gt => ("==", "1"),
                CmpOp::LtE | CmpOp::GtE => {
                    return Err(CompileError::UnsupportedConstruct {
                        detail: format!("`{}` on string operands", ops[0]),
                        pos: Some(pos),
                    });
                }
            };
            return Ok(Lowered {
                text: format!("(strcmp({}, {}) {} {})", lhs.text, rhs.text, relation, literal),
                ty: TypeKind::Bool,
            });
        }

        // Non-string chains translate operator-by-operator, preserving
        // source ordering.
        let mut parts = vec![lhs.text];
        for (op, comparator) in ops.iter().zip(comparators) {
            let rhs = self.compile(comparator, scope)?;
            if rhs.ty != lhs.ty {
                return Err(CompileError::TypeMismatch {
                    expected: lhs.ty.to_string(),
                    found: rhs.ty.to_string(),
                    pos: Some(comparator.pos()),
                });
            }
            parts.push(op.to_string());
            parts.push(rhs.text);
        }
        Ok(Lowered {
            text: parts.join(" "),
            ty: TypeKind::Bool,
        })
    }
}

/// Lower a string literal to an explicit byte sequence plus terminator
///
/// The embedded toolchain does not reliably place literal string data, so
/// no native C string literal is ever emitted.
fn string_literal(value: &str) -> String {
    let mut bytes: Vec<String> = value.bytes().map(|b| b.to_string()).collect();
    bytes.push("0".to_string());
    format!("(char[]){{{}}}", bytes.join(", "))
}

/// Flatten a bare name or dotted attribute chain into path segments
fn name_path(expr: &Expr) -> Result<(Vec<String>, Pos), CompileError> {
    match expr {
        Expr::Name { name, pos } => Ok((vec![name.clone()], *pos)),
        Expr::Attribute { value, attr, pos } => {
            let (mut path, _) = name_path(value).map_err(|_| {
                CompileError::UnsupportedConstruct {
                    detail: "attribute access on a non-name expression".to_string(),
                    pos: Some(*pos),
                }
            })?;
            path.push(attr.clone());
            Ok((path, *pos))
        }
        other => Err(CompileError::UnsupportedConstruct {
            detail: "call of a computed expression".to_string(),
            pos: Some(other.pos()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kr_ast::{BinOp, LogicalOp};
    use kr_resolve::{BridgeModule, MODULE_PREFIX};

    fn registry() -> BridgeRegistry {
        BridgeRegistry::new().with_module(BridgeModule::new("avr").bind(
            "delay_ms",
            "avr_delay_ms",
            vec![TypeKind::Int32],
            TypeKind::None,
        ))
    }

    fn module_scope(registry: &BridgeRegistry) -> Scope {
        registry
            .root_scope()
            .child(Some(format!("{MODULE_PREFIX}demo")))
    }

    fn at(line: u32, col: u32) -> Pos {
        Pos::new(line, col)
    }

    fn int(value: i32) -> Expr {
        Expr::Int {
            value,
            pos: at(1, 0),
        }
    }

    fn string(value: &str) -> Expr {
        Expr::Str {
            value: value.to_string(),
            pos: at(1, 0),
        }
    }

    fn name(ident: &str) -> Expr {
        Expr::Name {
            name: ident.to_string(),
            pos: at(1, 0),
        }
    }

    #[test]
    fn literals_lower_directly() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let lowered = exprs.compile(&int(42), &scope).unwrap();
        assert_eq!(lowered.text, "42");
        assert_eq!(lowered.ty, TypeKind::Int32);

        let lowered = exprs
            .compile(
                &Expr::Bool {
                    value: true,
                    pos: at(1, 0),
                },
                &scope,
            )
            .unwrap();
        assert_eq!(lowered.text, "true");
        assert_eq!(lowered.ty, TypeKind::Bool);
    }

    #[test]
    fn string_literals_lower_to_bytes_with_terminator() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let lowered = exprs.compile(&string("hi"), &scope).unwrap();
        assert_eq!(lowered.text, "(char[]){104, 105, 0}");
        assert_eq!(lowered.ty, TypeKind::Str);

        let lowered = exprs.compile(&string(""), &scope).unwrap();
        assert_eq!(lowered.text, "(char[]){0}");
    }

    #[test]
    fn names_lower_to_their_mangled_identity() {
        let registry = registry();
        let mut scope = module_scope(&registry);
        scope.declare("x", TypeKind::Int32, false).unwrap();
        let exprs = ExpressionCompiler::new(&registry);

        let lowered = exprs.compile(&name("x"), &scope).unwrap();
        assert_eq!(lowered.text, "PYMOD_demo_DOT_x");
        assert_eq!(lowered.ty, TypeKind::Int32);
    }

    #[test]
    fn undeclared_name_fails_with_position() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let err = exprs
            .compile(
                &Expr::Name {
                    name: "ghost".into(),
                    pos: at(7, 3),
                },
                &scope,
            )
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::UnresolvedReference {
                name: "ghost".into(),
                pos: Some(at(7, 3)),
            }
        );
    }

    #[test]
    fn bridge_call_uses_the_fixed_target_symbol() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let call = Expr::Call {
            func: Box::new(Expr::Attribute {
                value: Box::new(name("avr")),
                attr: "delay_ms".into(),
                pos: at(2, 0),
            }),
            args: vec![int(100)],
            pos: at(2, 0),
        };
        let lowered = exprs.compile(&call, &scope).unwrap();
        assert_eq!(lowered.text, "avr_delay_ms(100)");
        assert_eq!(lowered.ty, TypeKind::None);
    }

    #[test]
    fn calling_a_non_callable_is_a_type_mismatch() {
        let registry = registry();
        let mut scope = module_scope(&registry);
        scope.declare("x", TypeKind::Int32, false).unwrap();
        let exprs = ExpressionCompiler::new(&registry);

        let call = Expr::Call {
            func: Box::new(name("x")),
            args: vec![],
            pos: at(3, 0),
        };
        let err = exprs.compile(&call, &scope).unwrap_err();
        assert_eq!(
            err,
            CompileError::TypeMismatch {
                expected: "function".into(),
                found: "int".into(),
                pos: Some(at(3, 0)),
            }
        );
    }

    #[test]
    fn arithmetic_parenthesizes_and_stays_int() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let sum = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(int(1)),
            right: Box::new(int(2)),
            pos: at(1, 0),
        };
        let lowered = exprs.compile(&sum, &scope).unwrap();
        assert_eq!(lowered.text, "(1 + 2)");
        assert_eq!(lowered.ty, TypeKind::Int32);
    }

    #[test]
    fn arithmetic_on_strings_is_unsupported() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let cat = Expr::Binary {
            op: BinOp::Add,
            left: Box::new(string("a")),
            right: Box::new(string("b")),
            pos: at(4, 2),
        };
        let err = exprs.compile(&cat, &scope).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedConstruct { .. }));
    }

    #[test]
    fn string_comparisons_lower_to_three_way_compare() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let cases = [
            (CmpOp::Eq, "(strcmp((char[]){97, 0}, (char[]){98, 0}) == 0)"),
            (CmpOp::NotEq, "(strcmp((char[]){97, 0}, (char[]){98, 0}) != 0)"),
            (CmpOp::Lt, "(strcmp((char[]){97, 0}, (char[]){98, 0}) == -1)"),
            (CmpOp::Gt, "(strcmp((char[]){97, 0}, (char[]){98, 0}) == 1)"),
        ];
        for (op, expected) in cases {
            let compare = Expr::Compare {
                left: Box::new(string("a")),
                ops: vec![op],
                comparators: vec![string("b")],
                pos: at(1, 0),
            };
            let lowered = exprs.compile(&compare, &scope).unwrap();
            assert_eq!(lowered.text, expected);
            assert_eq!(lowered.ty, TypeKind::Bool);
        }
    }

    #[test]
    fn string_comparison_with_two_comparators_is_unsupported() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let chain = Expr::Compare {
            left: Box::new(string("a")),
            ops: vec![CmpOp::Lt, CmpOp::Lt],
            comparators: vec![string("b"), string("c")],
            pos: at(5, 0),
        };
        let err = exprs.compile(&chain, &scope).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedConstruct {
                detail: "string comparison with more than one comparator".into(),
                pos: Some(at(5, 0)),
            }
        );
    }

    #[test]
    fn int_chains_preserve_source_ordering() {
        let registry = registry();
        let mut scope = module_scope(&registry);
        scope.declare("x", TypeKind::Int32, false).unwrap();
        let exprs = ExpressionCompiler::new(&registry);

        let chain = Expr::Compare {
            left: Box::new(int(1)),
            ops: vec![CmpOp::Lt, CmpOp::LtE],
            comparators: vec![name("x"), int(9)],
            pos: at(1, 0),
        };
        let lowered = exprs.compile(&chain, &scope).unwrap();
        assert_eq!(lowered.text, "1 < PYMOD_demo_DOT_x <= 9");
        assert_eq!(lowered.ty, TypeKind::Bool);
    }

    #[test]
    fn mixed_comparison_types_fail_naming_both() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let compare = Expr::Compare {
            left: Box::new(int(1)),
            ops: vec![CmpOp::Eq],
            comparators: vec![string("x")],
            pos: at(1, 0),
        };
        let err = exprs.compile(&compare, &scope).unwrap_err();
        assert_eq!(
            err,
            CompileError::TypeMismatch {
                expected: "int".into(),
                found: "str".into(),
                pos: Some(at(1, 0)),
            }
        );
    }

    #[test]
    fn logical_chains_parenthesize_every_operand() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let both = Expr::Logical {
            op: LogicalOp::And,
            values: vec![
                Expr::Bool {
                    value: true,
                    pos: at(1, 0),
                },
                Expr::Bool {
                    value: false,
                    pos: at(1, 0),
                },
            ],
            pos: at(1, 0),
        };
        let lowered = exprs.compile(&both, &scope).unwrap();
        assert_eq!(lowered.text, "(true) && (false)");
        assert_eq!(lowered.ty, TypeKind::Bool);
    }

    #[test]
    fn not_is_unsupported() {
        let registry = registry();
        let scope = module_scope(&registry);
        let exprs = ExpressionCompiler::new(&registry);

        let negation = Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(Expr::Bool {
                value: true,
                pos: at(1, 4),
            }),
            pos: at(1, 0),
        };
        let err = exprs.compile(&negation, &scope).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedConstruct {
                detail: "the `not` operator".into(),
                pos: Some(at(1, 0)),
            }
        );
    }
}
