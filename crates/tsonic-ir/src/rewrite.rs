//! Persistent-update traversal helpers for the IR.
//!
//! Passes use these to rebuild the tree: `map_expression` applies a
//! transform bottom-up to every expression node, and the statement mappers
//! push that through statements, declaration initializers, and nested
//! function bodies.

use crate::model::*;

/// Rebuild an expression bottom-up, applying `f` to every node after its
/// children have been rebuilt.
pub fn map_expression(expr: IrExpression, f: &mut dyn FnMut(IrExpression) -> IrExpression) -> IrExpression {
    let IrExpression {
        kind,
        inferred_type,
        source_span,
    } = expr;

    let kind = match kind {
        IrExpressionKind::Literal { .. }
        | IrExpressionKind::Identifier { .. }
        | IrExpressionKind::This
        | IrExpressionKind::DynamicImport { .. }
        | IrExpressionKind::UnsupportedExpression { .. } => kind,
        IrExpressionKind::MemberAccess {
            object,
            member,
            access_kind,
            optional,
        } => IrExpressionKind::MemberAccess {
            object: Box::new(map_expression(*object, f)),
            member: match member {
                MemberKey::Name(name) => MemberKey::Name(name),
                MemberKey::Index(index) => MemberKey::Index(Box::new(map_expression(*index, f))),
            },
            access_kind,
            optional,
        },
        IrExpressionKind::Call {
            callee,
            type_args,
            args,
            optional,
        } => IrExpressionKind::Call {
            callee: Box::new(map_expression(*callee, f)),
            type_args,
            args: args.into_iter().map(|a| map_expression(a, f)).collect(),
            optional,
        },
        IrExpressionKind::New { callee, args } => IrExpressionKind::New {
            callee,
            args: args.into_iter().map(|a| map_expression(a, f)).collect(),
        },
        IrExpressionKind::Binary { op, left, right } => IrExpressionKind::Binary {
            op,
            left: Box::new(map_expression(*left, f)),
            right: Box::new(map_expression(*right, f)),
        },
        IrExpressionKind::Logical { op, left, right } => IrExpressionKind::Logical {
            op,
            left: Box::new(map_expression(*left, f)),
            right: Box::new(map_expression(*right, f)),
        },
        IrExpressionKind::Unary { op, operand } => IrExpressionKind::Unary {
            op,
            operand: Box::new(map_expression(*operand, f)),
        },
        IrExpressionKind::Update {
            increment,
            prefix,
            operand,
        } => IrExpressionKind::Update {
            increment,
            prefix,
            operand: Box::new(map_expression(*operand, f)),
        },
        IrExpressionKind::Conditional {
            condition,
            when_true,
            when_false,
        } => IrExpressionKind::Conditional {
            condition: Box::new(map_expression(*condition, f)),
            when_true: Box::new(map_expression(*when_true, f)),
            when_false: Box::new(map_expression(*when_false, f)),
        },
        IrExpressionKind::Assignment { op, target, value } => IrExpressionKind::Assignment {
            op,
            target: Box::new(map_expression(*target, f)),
            value: Box::new(map_expression(*value, f)),
        },
        IrExpressionKind::ArrayLiteral { elements } => IrExpressionKind::ArrayLiteral {
            elements: elements.into_iter().map(|e| map_expression(e, f)).collect(),
        },
        IrExpressionKind::ObjectLiteral {
            target_type,
            properties,
        } => IrExpressionKind::ObjectLiteral {
            target_type,
            properties: properties
                .into_iter()
                .map(|(name, value)| (name, map_expression(value, f)))
                .collect(),
        },
        IrExpressionKind::FunctionValue {
            is_async,
            is_generator,
            params,
            return_type,
            body,
            is_expression_body,
        } => IrExpressionKind::FunctionValue {
            is_async,
            is_generator,
            params,
            return_type,
            body: body.into_iter().map(|s| map_statement(s, f)).collect(),
            is_expression_body,
        },
        IrExpressionKind::TemplateLiteral { head, spans } => IrExpressionKind::TemplateLiteral {
            head,
            spans: spans
                .into_iter()
                .map(|(expr, text)| (map_expression(expr, f), text))
                .collect(),
        },
        IrExpressionKind::Spread { expression } => IrExpressionKind::Spread {
            expression: Box::new(map_expression(*expression, f)),
        },
        IrExpressionKind::Await { expression } => IrExpressionKind::Await {
            expression: Box::new(map_expression(*expression, f)),
        },
        IrExpressionKind::Yield {
            expression,
            delegate,
        } => IrExpressionKind::Yield {
            expression: expression.map(|e| Box::new(map_expression(*e, f))),
            delegate,
        },
        IrExpressionKind::TypeAssertion { expression, target } => IrExpressionKind::TypeAssertion {
            expression: Box::new(map_expression(*expression, f)),
            target,
        },
        IrExpressionKind::TryCast { expression, target } => IrExpressionKind::TryCast {
            expression: Box::new(map_expression(*expression, f)),
            target,
        },
        IrExpressionKind::StackAlloc { element, length } => IrExpressionKind::StackAlloc {
            element,
            length: Box::new(map_expression(*length, f)),
        },
        IrExpressionKind::NumericNarrowing {
            expression,
            target_kind,
        } => IrExpressionKind::NumericNarrowing {
            expression: Box::new(map_expression(*expression, f)),
            target_kind,
        },
    };

    f(IrExpression {
        kind,
        inferred_type,
        source_span,
    })
}

/// Rebuild a statement, applying `f` to every expression it contains
/// (bottom-up), including nested statements and function bodies.
pub fn map_statement(stmt: IrStatement, f: &mut dyn FnMut(IrExpression) -> IrExpression) -> IrStatement {
    match stmt {
        IrStatement::VariableDeclaration(mut decl) => {
            decl.initializer = decl.initializer.map(|e| map_expression(e, f));
            IrStatement::VariableDeclaration(decl)
        }
        IrStatement::FunctionDeclaration(mut func) => {
            func.body = func.body.into_iter().map(|s| map_statement(s, f)).collect();
            IrStatement::FunctionDeclaration(func)
        }
        IrStatement::ClassDeclaration(mut class) => {
            class.members = class
                .members
                .into_iter()
                .map(|member| match member {
                    IrClassMember::Field(mut field) => {
                        field.initializer = field.initializer.map(|e| map_expression(e, f));
                        IrClassMember::Field(field)
                    }
                    IrClassMember::Method(mut method) => {
                        method.body = method
                            .body
                            .map(|body| body.into_iter().map(|s| map_statement(s, f)).collect());
                        IrClassMember::Method(method)
                    }
                })
                .collect();
            IrStatement::ClassDeclaration(class)
        }
        IrStatement::EnumDeclaration(mut decl) => {
            decl.members = decl
                .members
                .into_iter()
                .map(|mut member| {
                    member.initializer = member.initializer.map(|e| map_expression(e, f));
                    member
                })
                .collect();
            IrStatement::EnumDeclaration(decl)
        }
        IrStatement::InterfaceDeclaration(_)
        | IrStatement::TypeAliasDeclaration(_)
        | IrStatement::Break
        | IrStatement::Continue
        | IrStatement::Empty
        | IrStatement::Unsupported { .. } => stmt,
        IrStatement::ExpressionStatement(expr) => {
            IrStatement::ExpressionStatement(map_expression(expr, f))
        }
        IrStatement::If(if_stmt) => IrStatement::If(IrIf {
            condition: map_expression(if_stmt.condition, f),
            then_branch: Box::new(map_statement(*if_stmt.then_branch, f)),
            else_branch: if_stmt
                .else_branch
                .map(|e| Box::new(map_statement(*e, f))),
        }),
        IrStatement::While(while_stmt) => IrStatement::While(IrWhile {
            condition: map_expression(while_stmt.condition, f),
            body: Box::new(map_statement(*while_stmt.body, f)),
        }),
        IrStatement::DoWhile(do_stmt) => IrStatement::DoWhile(IrDoWhile {
            body: Box::new(map_statement(*do_stmt.body, f)),
            condition: map_expression(do_stmt.condition, f),
        }),
        IrStatement::For(for_stmt) => IrStatement::For(IrFor {
            init: for_stmt.init.map(|s| Box::new(map_statement(*s, f))),
            condition: for_stmt.condition.map(|e| map_expression(e, f)),
            update: for_stmt.update.map(|e| map_expression(e, f)),
            body: Box::new(map_statement(*for_stmt.body, f)),
        }),
        IrStatement::ForOf(for_of) => IrStatement::ForOf(IrForOf {
            binding: for_of.binding,
            binding_decl: for_of.binding_decl,
            binding_type: for_of.binding_type,
            iterable: map_expression(for_of.iterable, f),
            body: Box::new(map_statement(*for_of.body, f)),
        }),
        IrStatement::ForIn(for_in) => IrStatement::ForIn(IrForIn {
            binding: for_in.binding,
            binding_decl: for_in.binding_decl,
            object: map_expression(for_in.object, f),
            body: Box::new(map_statement(*for_in.body, f)),
        }),
        IrStatement::Switch(switch) => IrStatement::Switch(IrSwitch {
            discriminant: map_expression(switch.discriminant, f),
            cases: switch
                .cases
                .into_iter()
                .map(|case| IrSwitchCase {
                    test: case.test.map(|t| map_expression(t, f)),
                    statements: case
                        .statements
                        .into_iter()
                        .map(|s| map_statement(s, f))
                        .collect(),
                })
                .collect(),
        }),
        IrStatement::Try(try_stmt) => IrStatement::Try(IrTry {
            block: try_stmt
                .block
                .into_iter()
                .map(|s| map_statement(s, f))
                .collect(),
            catch_param: try_stmt.catch_param,
            catch_block: try_stmt
                .catch_block
                .map(|b| b.into_iter().map(|s| map_statement(s, f)).collect()),
            finally_block: try_stmt
                .finally_block
                .map(|b| b.into_iter().map(|s| map_statement(s, f)).collect()),
        }),
        IrStatement::Throw(expr) => IrStatement::Throw(map_expression(expr, f)),
        IrStatement::Block(statements) => IrStatement::Block(
            statements
                .into_iter()
                .map(|s| map_statement(s, f))
                .collect(),
        ),
        IrStatement::Return(expr) => IrStatement::Return(expr.map(|e| map_expression(e, f))),
        IrStatement::YieldStatement(yield_stmt) => IrStatement::YieldStatement(IrYieldStatement {
            value: yield_stmt.value.map(|e| map_expression(e, f)),
            delegate: yield_stmt.delegate,
        }),
        IrStatement::GeneratorReturnStatement(expr) => {
            IrStatement::GeneratorReturnStatement(expr.map(|e| map_expression(e, f)))
        }
    }
}

/// Visit every expression in a statement (including nested bodies).
pub fn visit_expressions(stmt: &IrStatement, f: &mut dyn FnMut(&IrExpression)) {
    match stmt {
        IrStatement::VariableDeclaration(decl) => {
            if let Some(init) = &decl.initializer {
                visit_expression(init, f);
            }
        }
        IrStatement::FunctionDeclaration(func) => {
            for inner in &func.body {
                visit_expressions(inner, f);
            }
        }
        IrStatement::ClassDeclaration(class) => {
            for member in &class.members {
                match member {
                    IrClassMember::Field(field) => {
                        if let Some(init) = &field.initializer {
                            visit_expression(init, f);
                        }
                    }
                    IrClassMember::Method(method) => {
                        if let Some(body) = &method.body {
                            for inner in body {
                                visit_expressions(inner, f);
                            }
                        }
                    }
                }
            }
        }
        IrStatement::EnumDeclaration(decl) => {
            for member in &decl.members {
                if let Some(init) = &member.initializer {
                    visit_expression(init, f);
                }
            }
        }
        IrStatement::InterfaceDeclaration(_)
        | IrStatement::TypeAliasDeclaration(_)
        | IrStatement::Break
        | IrStatement::Continue
        | IrStatement::Empty
        | IrStatement::Unsupported { .. } => {}
        IrStatement::ExpressionStatement(expr) => visit_expression(expr, f),
        IrStatement::If(if_stmt) => {
            visit_expression(&if_stmt.condition, f);
            visit_expressions(&if_stmt.then_branch, f);
            if let Some(else_branch) = &if_stmt.else_branch {
                visit_expressions(else_branch, f);
            }
        }
        IrStatement::While(while_stmt) => {
            visit_expression(&while_stmt.condition, f);
            visit_expressions(&while_stmt.body, f);
        }
        IrStatement::DoWhile(do_stmt) => {
            visit_expressions(&do_stmt.body, f);
            visit_expression(&do_stmt.condition, f);
        }
        IrStatement::For(for_stmt) => {
            if let Some(init) = &for_stmt.init {
                visit_expressions(init, f);
            }
            if let Some(condition) = &for_stmt.condition {
                visit_expression(condition, f);
            }
            if let Some(update) = &for_stmt.update {
                visit_expression(update, f);
            }
            visit_expressions(&for_stmt.body, f);
        }
        IrStatement::ForOf(for_of) => {
            visit_expression(&for_of.iterable, f);
            visit_expressions(&for_of.body, f);
        }
        IrStatement::ForIn(for_in) => {
            visit_expression(&for_in.object, f);
            visit_expressions(&for_in.body, f);
        }
        IrStatement::Switch(switch) => {
            visit_expression(&switch.discriminant, f);
            for case in &switch.cases {
                if let Some(test) = &case.test {
                    visit_expression(test, f);
                }
                for inner in &case.statements {
                    visit_expressions(inner, f);
                }
            }
        }
        IrStatement::Try(try_stmt) => {
            for inner in &try_stmt.block {
                visit_expressions(inner, f);
            }
            if let Some(catch_block) = &try_stmt.catch_block {
                for inner in catch_block {
                    visit_expressions(inner, f);
                }
            }
            if let Some(finally_block) = &try_stmt.finally_block {
                for inner in finally_block {
                    visit_expressions(inner, f);
                }
            }
        }
        IrStatement::Throw(expr) => visit_expression(expr, f),
        IrStatement::Block(statements) => {
            for inner in statements {
                visit_expressions(inner, f);
            }
        }
        IrStatement::Return(expr) | IrStatement::GeneratorReturnStatement(expr) => {
            if let Some(expr) = expr {
                visit_expression(expr, f);
            }
        }
        IrStatement::YieldStatement(yield_stmt) => {
            if let Some(value) = &yield_stmt.value {
                visit_expression(value, f);
            }
        }
    }
}

/// Visit an expression and all of its children (top-down).
pub fn visit_expression(expr: &IrExpression, f: &mut dyn FnMut(&IrExpression)) {
    f(expr);
    match &expr.kind {
        IrExpressionKind::Literal { .. }
        | IrExpressionKind::Identifier { .. }
        | IrExpressionKind::This
        | IrExpressionKind::DynamicImport { .. }
        | IrExpressionKind::UnsupportedExpression { .. } => {}
        IrExpressionKind::MemberAccess { object, member, .. } => {
            visit_expression(object, f);
            if let MemberKey::Index(index) = member {
                visit_expression(index, f);
            }
        }
        IrExpressionKind::Call { callee, args, .. } => {
            visit_expression(callee, f);
            for arg in args {
                visit_expression(arg, f);
            }
        }
        IrExpressionKind::New { args, .. } => {
            for arg in args {
                visit_expression(arg, f);
            }
        }
        IrExpressionKind::Binary { left, right, .. }
        | IrExpressionKind::Logical { left, right, .. } => {
            visit_expression(left, f);
            visit_expression(right, f);
        }
        IrExpressionKind::Unary { operand, .. } | IrExpressionKind::Update { operand, .. } => {
            visit_expression(operand, f);
        }
        IrExpressionKind::Conditional {
            condition,
            when_true,
            when_false,
        } => {
            visit_expression(condition, f);
            visit_expression(when_true, f);
            visit_expression(when_false, f);
        }
        IrExpressionKind::Assignment { target, value, .. } => {
            visit_expression(target, f);
            visit_expression(value, f);
        }
        IrExpressionKind::ArrayLiteral { elements } => {
            for element in elements {
                visit_expression(element, f);
            }
        }
        IrExpressionKind::ObjectLiteral { properties, .. } => {
            for (_, value) in properties {
                visit_expression(value, f);
            }
        }
        IrExpressionKind::FunctionValue { body, .. } => {
            for inner in body {
                visit_expressions(inner, f);
            }
        }
        IrExpressionKind::TemplateLiteral { spans, .. } => {
            for (inner, _) in spans {
                visit_expression(inner, f);
            }
        }
        IrExpressionKind::Spread { expression }
        | IrExpressionKind::Await { expression }
        | IrExpressionKind::TypeAssertion { expression, .. }
        | IrExpressionKind::TryCast { expression, .. }
        | IrExpressionKind::NumericNarrowing { expression, .. } => {
            visit_expression(expression, f);
        }
        IrExpressionKind::Yield { expression, .. } => {
            if let Some(expression) = expression {
                visit_expression(expression, f);
            }
        }
        IrExpressionKind::StackAlloc { length, .. } => visit_expression(length, f),
    }
}
