//! Flow narrowing for `instanceof` and `istype<T>` guards.
//!
//! A truthy guard contributes `TypeNarrowing` entries the IR builder applies
//! to its type environment while converting the guarded branch. Conjunctions
//! collect narrowings from both sides; disjunctions collect none.

use crate::state::DeclId;
use rustc_hash::FxHashMap;
use tsonic_parser::ast::{BinaryOp, Expression, NodeId, TypeNode, TypeRef};

/// One refinement: while the guard holds, `decl` has type `target`.
#[derive(Debug, Clone)]
pub struct TypeNarrowing {
    pub decl: DeclId,
    pub target: TypeNode,
}

/// Collect the narrowings a condition establishes in its truthy branch.
pub fn collect_narrowings(
    condition: &Expression,
    resolution: &FxHashMap<NodeId, DeclId>,
) -> Vec<TypeNarrowing> {
    let mut out = Vec::new();
    collect_into(condition, resolution, &mut out);
    out
}

fn collect_into(
    condition: &Expression,
    resolution: &FxHashMap<NodeId, DeclId>,
    out: &mut Vec<TypeNarrowing>,
) {
    match condition {
        Expression::Paren(paren) => collect_into(&paren.expression, resolution, out),
        Expression::Binary(binary) => match binary.op {
            BinaryOp::And => {
                collect_into(&binary.left, resolution, out);
                collect_into(&binary.right, resolution, out);
            }
            BinaryOp::Instanceof => {
                if let (Expression::Ident(subject), Expression::Ident(class)) =
                    (binary.left.as_ref(), binary.right.as_ref())
                    && let Some(&decl) = resolution.get(&subject.id)
                {
                    out.push(TypeNarrowing {
                        decl,
                        target: TypeNode::Ref(TypeRef {
                            head: class.clone(),
                            rest: Vec::new(),
                            type_args: Vec::new(),
                            span: class.span,
                        }),
                    });
                }
            }
            _ => {}
        },
        Expression::Call(call) => {
            // `istype<T>(x)`
            if let Expression::Ident(callee) = call.callee.as_ref()
                && callee.name == "istype"
                && call.type_args.len() == 1
                && call.args.len() == 1
                && let Expression::Ident(subject) = &call.args[0]
                && let Some(&decl) = resolution.get(&subject.id)
            {
                out.push(TypeNarrowing {
                    decl,
                    target: call.type_args[0].clone(),
                });
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::BinderState;
    use tsonic_parser::ast::Statement;
    use tsonic_parser::parse_source_file;

    fn narrowings_for(source: &str) -> Vec<TypeNarrowing> {
        let result = parse_source_file("test.ts", source);
        assert!(!result.has_errors(), "{:?}", result.diagnostics);
        let binding = BinderState::new().bind_file(&result.file);
        // Last statement is the `if`.
        let Some(Statement::If(if_stmt)) = result.file.statements.last() else {
            panic!("expected trailing if statement");
        };
        collect_narrowings(&if_stmt.condition, &binding.resolution)
    }

    #[test]
    fn instanceof_narrows() {
        let narrowings = narrowings_for(
            "class Dog {}\nlet pet: object = x;\nif (pet instanceof Dog) {}",
        );
        assert_eq!(narrowings.len(), 1);
        let TypeNode::Ref(target) = &narrowings[0].target else {
            panic!("expected reference target");
        };
        assert_eq!(target.head.name, "Dog");
    }

    #[test]
    fn istype_narrows() {
        let narrowings =
            narrowings_for("let value: object = x;\nif (istype<string>(value)) {}");
        assert_eq!(narrowings.len(), 1);
    }

    #[test]
    fn conjunction_collects_both_sides() {
        let narrowings = narrowings_for(
            "class A {}\nclass B {}\nlet x: object = v;\nlet y: object = w;\nif (x instanceof A && y instanceof B) {}",
        );
        assert_eq!(narrowings.len(), 2);
    }

    #[test]
    fn disjunction_collects_none() {
        let narrowings = narrowings_for(
            "class A {}\nclass B {}\nlet x: object = v;\nif (x instanceof A || x instanceof B) {}",
        );
        assert!(narrowings.is_empty());
    }
}
