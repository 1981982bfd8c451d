//! Statement conversion and control flow.

use super::ModuleBuilder;
use crate::model::*;
use rustc_hash::FxHashMap;
use tsonic_binder::collect_narrowings;
use tsonic_parser::ast;
use tsonic_types::{IrType, UnifiedTypeCatalog};

impl<'a> ModuleBuilder<'a> {
    pub(crate) fn build_statements(
        &mut self,
        statements: &[ast::Statement],
        catalog: &UnifiedTypeCatalog,
    ) -> Vec<IrStatement> {
        let mut out = Vec::new();
        for statement in statements {
            match statement {
                ast::Statement::Variable(decl) => {
                    self.build_variable_declaration(decl, catalog, false, &mut out);
                }
                other => {
                    if let Some(ir) = self.build_statement(other, catalog) {
                        out.push(ir);
                    }
                }
            }
        }
        out
    }

    pub(crate) fn build_statement(
        &mut self,
        statement: &ast::Statement,
        catalog: &UnifiedTypeCatalog,
    ) -> Option<IrStatement> {
        match statement {
            ast::Statement::Variable(decl) => {
                let mut out = Vec::new();
                self.build_variable_declaration(decl, catalog, false, &mut out);
                match out.len() {
                    0 => None,
                    1 => out.pop(),
                    _ => Some(IrStatement::Block(out)),
                }
            }
            ast::Statement::Function(func) => Some(self.build_function_declaration(func, catalog)),
            ast::Statement::Class(class) => Some(self.build_class_declaration(class, catalog)),
            ast::Statement::Interface(iface) => self.build_interface(iface),
            ast::Statement::Enum(decl) => Some(self.build_enum_declaration(decl, catalog)),
            ast::Statement::TypeAlias(alias) => Some(self.build_type_alias(alias)),
            ast::Statement::Import(_) | ast::Statement::ExportNamed(_) => None,
            ast::Statement::Expression(stmt) => {
                // Generator lowering: a bare `yield x;` becomes the lowered
                // yield statement shape.
                if self.in_generator
                    && let ast::Expression::Yield(yield_expr) = &stmt.expression
                {
                    let value = yield_expr
                        .expression
                        .as_ref()
                        .map(|e| self.build_expression(e, catalog));
                    return Some(IrStatement::YieldStatement(IrYieldStatement {
                        value,
                        delegate: yield_expr.delegate,
                    }));
                }
                Some(IrStatement::ExpressionStatement(
                    self.build_expression(&stmt.expression, catalog),
                ))
            }
            ast::Statement::If(stmt) => {
                let condition = self.build_expression(&stmt.condition, catalog);

                // Truthy-side narrowing for the guarded branch. Targets are
                // captured as opaque type-syntax handles and resolved when
                // the frame is applied.
                let narrowings = collect_narrowings(&stmt.condition, &self.binding.resolution);
                let captured: Vec<_> = narrowings
                    .iter()
                    .map(|n| (n.decl, self.type_syntax.capture(&n.target)))
                    .collect();
                let mut frame = FxHashMap::default();
                for (decl, handle) in captured {
                    let node = self.type_syntax.resolve(handle).clone();
                    let ty = self.convert_type(&node);
                    frame.insert(decl, ty);
                }
                self.type_env.push(frame);
                let then_branch = Box::new(
                    self.build_statement(&stmt.then_branch, catalog)
                        .unwrap_or(IrStatement::Empty),
                );
                self.type_env.pop();

                let else_branch = stmt.else_branch.as_ref().map(|else_branch| {
                    Box::new(
                        self.build_statement(else_branch, catalog)
                            .unwrap_or(IrStatement::Empty),
                    )
                });
                Some(IrStatement::If(IrIf {
                    condition,
                    then_branch,
                    else_branch,
                }))
            }
            ast::Statement::While(stmt) => Some(IrStatement::While(IrWhile {
                condition: self.build_expression(&stmt.condition, catalog),
                body: Box::new(
                    self.build_statement(&stmt.body, catalog)
                        .unwrap_or(IrStatement::Empty),
                ),
            })),
            ast::Statement::DoWhile(stmt) => Some(IrStatement::DoWhile(IrDoWhile {
                body: Box::new(
                    self.build_statement(&stmt.body, catalog)
                        .unwrap_or(IrStatement::Empty),
                ),
                condition: self.build_expression(&stmt.condition, catalog),
            })),
            ast::Statement::For(stmt) => {
                let init = match &stmt.init {
                    Some(ast::ForInit::Variable(decl)) => {
                        let mut out = Vec::new();
                        self.build_variable_declaration(decl, catalog, false, &mut out);
                        out.pop().map(Box::new)
                    }
                    Some(ast::ForInit::Expression(expr)) => Some(Box::new(
                        IrStatement::ExpressionStatement(self.build_expression(expr, catalog)),
                    )),
                    None => None,
                };
                Some(IrStatement::For(IrFor {
                    init,
                    condition: stmt
                        .condition
                        .as_ref()
                        .map(|c| self.build_expression(c, catalog)),
                    update: stmt
                        .update
                        .as_ref()
                        .map(|u| self.build_expression(u, catalog)),
                    body: Box::new(
                        self.build_statement(&stmt.body, catalog)
                            .unwrap_or(IrStatement::Empty),
                    ),
                }))
            }
            ast::Statement::ForOf(stmt) => {
                let iterable = self.build_expression(&stmt.iterable, catalog);
                let binding_ident = stmt.binding.as_ident();
                let binding_decl = binding_ident
                    .and_then(|ident| self.binding.decl_of_node.get(&ident.id).copied())
                    .or_else(|| {
                        binding_ident
                            .and_then(|ident| self.binding.resolution.get(&ident.id).copied())
                    });
                let binding_type = iterable.inferred_type.as_ref().and_then(element_type_of);
                if let (Some(decl), Some(ty)) = (binding_decl, binding_type.clone()) {
                    self.decl_types.insert(decl, ty);
                }
                Some(IrStatement::ForOf(IrForOf {
                    binding: binding_ident.map_or_else(String::new, |i| i.name.clone()),
                    binding_decl,
                    binding_type,
                    iterable,
                    body: Box::new(
                        self.build_statement(&stmt.body, catalog)
                            .unwrap_or(IrStatement::Empty),
                    ),
                }))
            }
            ast::Statement::ForIn(stmt) => {
                let binding_ident = stmt.binding.as_ident();
                let binding_decl = binding_ident
                    .and_then(|ident| self.binding.decl_of_node.get(&ident.id).copied());
                if let Some(decl) = binding_decl {
                    self.decl_types.insert(decl, IrType::primitive("string"));
                }
                Some(IrStatement::ForIn(IrForIn {
                    binding: binding_ident.map_or_else(String::new, |i| i.name.clone()),
                    binding_decl,
                    object: self.build_expression(&stmt.object, catalog),
                    body: Box::new(
                        self.build_statement(&stmt.body, catalog)
                            .unwrap_or(IrStatement::Empty),
                    ),
                }))
            }
            ast::Statement::Switch(stmt) => Some(IrStatement::Switch(IrSwitch {
                discriminant: self.build_expression(&stmt.discriminant, catalog),
                cases: stmt
                    .cases
                    .iter()
                    .map(|case| IrSwitchCase {
                        test: case.test.as_ref().map(|t| self.build_expression(t, catalog)),
                        statements: self.build_statements(&case.statements, catalog),
                    })
                    .collect(),
            })),
            ast::Statement::Try(stmt) => Some(IrStatement::Try(IrTry {
                block: self.build_statements(&stmt.block.statements, catalog),
                catch_param: stmt
                    .catch
                    .as_ref()
                    .and_then(|c| c.param.as_ref().map(|p| p.name.clone())),
                catch_block: stmt
                    .catch
                    .as_ref()
                    .map(|c| self.build_statements(&c.body.statements, catalog)),
                finally_block: stmt
                    .finally
                    .as_ref()
                    .map(|f| self.build_statements(&f.statements, catalog)),
            })),
            ast::Statement::Throw(stmt) => Some(IrStatement::Throw(
                self.build_expression(&stmt.expression, catalog),
            )),
            ast::Statement::Block(block) => Some(IrStatement::Block(
                self.build_statements(&block.statements, catalog),
            )),
            ast::Statement::Break(_) => Some(IrStatement::Break),
            ast::Statement::Continue(_) => Some(IrStatement::Continue),
            ast::Statement::Return(stmt) => {
                let value = stmt
                    .expression
                    .as_ref()
                    .map(|e| self.build_expression(e, catalog));
                // Generator lowering: returns become the lowered
                // generator-return shape.
                if self.in_generator {
                    Some(IrStatement::GeneratorReturnStatement(value))
                } else {
                    Some(IrStatement::Return(value))
                }
            }
            ast::Statement::Empty(_) => Some(IrStatement::Empty),
            // `with` survives to the unsupported-features pass, which owns
            // the diagnostic.
            ast::Statement::With(stmt) => Some(IrStatement::Unsupported {
                what: "with statement".to_string(),
                span: stmt.span,
            }),
        }
    }
}

/// Element type produced by iterating a value of `ty`.
pub(crate) fn element_type_of(ty: &IrType) -> Option<IrType> {
    match ty {
        IrType::Array { element, .. } => Some((**element).clone()),
        IrType::Primitive { name, .. } if name == "string" => Some(IrType::primitive("string")),
        IrType::Dictionary { key, .. } => Some((**key).clone()),
        IrType::Reference {
            name,
            type_arguments,
            ..
        } if (name == "Iterator" || name == "Iterable") && type_arguments.len() == 1 => {
            Some(type_arguments[0].clone())
        }
        _ => None,
    }
}
