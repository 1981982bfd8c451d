//! Expression conversion and best-effort inference.
//!
//! Inference here is deliberately local: declared types flow through
//! identifiers, members resolve through the catalogue, and numeric intents
//! follow the C# promotion rules. The numeric proof pass re-derives what it
//! needs; nothing downstream trusts inference it can't re-check.

use super::ModuleBuilder;
use crate::model::*;
use tsonic_common::{NumericKind, RuntimeMode, Spanned};
use tsonic_parser::ast;
use tsonic_types::{
    ArrayOrigin, IrObjectMember, IrParamType, IrType, NominalEnv, UnifiedTypeCatalog,
};

impl<'a> ModuleBuilder<'a> {
    pub(crate) fn build_expression(
        &mut self,
        expression: &ast::Expression,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        self.build_expression_expecting(expression, None, catalog)
    }

    pub(crate) fn build_expression_expecting(
        &mut self,
        expression: &ast::Expression,
        expected: Option<&IrType>,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        let span = expression.span();
        let built = match expression {
            ast::Expression::Literal(lit) => self.build_literal(lit),
            ast::Expression::Ident(ident) => self.build_identifier(ident),
            ast::Expression::PropertyAccess(access) => {
                self.build_property_access(access, catalog)
            }
            ast::Expression::ElementAccess(access) => self.build_element_access(access, catalog),
            ast::Expression::Call(call) => self.build_call(call, catalog),
            ast::Expression::New(new) => self.build_new(new, catalog),
            ast::Expression::Binary(binary) => self.build_binary(binary, catalog),
            ast::Expression::Unary(unary) => self.build_unary(unary, catalog),
            ast::Expression::Update(update) => {
                let operand = self.build_expression(&update.operand, catalog);
                let ty = operand.inferred_type.clone();
                let ir = IrExpression::new(IrExpressionKind::Update {
                    increment: update.increment,
                    prefix: update.prefix,
                    operand: Box::new(operand),
                });
                match ty {
                    Some(ty) => ir.with_type(ty),
                    None => ir,
                }
            }
            ast::Expression::Conditional(cond) => {
                let condition = self.build_expression(&cond.condition, catalog);
                let when_true =
                    self.build_expression_expecting(&cond.when_true, expected, catalog);
                let when_false =
                    self.build_expression_expecting(&cond.when_false, expected, catalog);
                let ty = match (&when_true.inferred_type, &when_false.inferred_type) {
                    (Some(a), Some(b)) => Some(self.union_of(vec![a.clone(), b.clone()])),
                    _ => None,
                };
                let ir = IrExpression::new(IrExpressionKind::Conditional {
                    condition: Box::new(condition),
                    when_true: Box::new(when_true),
                    when_false: Box::new(when_false),
                });
                match ty {
                    Some(ty) => ir.with_type(ty),
                    None => ir,
                }
            }
            ast::Expression::Assignment(assignment) => {
                let target = self.build_expression(&assignment.target, catalog);
                let expected_value = target.inferred_type.clone();
                let value = self.build_expression_expecting(
                    &assignment.value,
                    expected_value.as_ref(),
                    catalog,
                );
                let ty = value.inferred_type.clone();
                let ir = IrExpression::new(IrExpressionKind::Assignment {
                    op: convert_assign_op(assignment.op),
                    target: Box::new(target),
                    value: Box::new(value),
                });
                match ty {
                    Some(ty) => ir.with_type(ty),
                    None => ir,
                }
            }
            ast::Expression::ArrayLit(array) => self.build_array_literal(array, expected, catalog),
            ast::Expression::ObjectLit(object) => {
                self.build_object_literal(object, expected, catalog)
            }
            ast::Expression::Arrow(arrow) => self.build_arrow(arrow, catalog),
            ast::Expression::FunctionExpr(func) => self.build_function_expr(func, catalog),
            ast::Expression::Template(template) => {
                let spans = template
                    .spans
                    .iter()
                    .map(|(expr, text)| (self.build_expression(expr, catalog), text.clone()))
                    .collect();
                IrExpression::new(IrExpressionKind::TemplateLiteral {
                    head: template.head.clone(),
                    spans,
                })
                .with_type(IrType::primitive("string"))
            }
            ast::Expression::Spread(spread) => {
                let inner = self.build_expression(&spread.expression, catalog);
                IrExpression::new(IrExpressionKind::Spread {
                    expression: Box::new(inner),
                })
            }
            ast::Expression::This(_) => IrExpression::new(IrExpressionKind::This),
            ast::Expression::Await(await_expr) => {
                let inner = self.build_expression(&await_expr.expression, catalog);
                let ty = inner.inferred_type.as_ref().map(unwrap_promise);
                let ir = IrExpression::new(IrExpressionKind::Await {
                    expression: Box::new(inner),
                });
                match ty {
                    Some(ty) => ir.with_type(ty),
                    None => ir,
                }
            }
            ast::Expression::Yield(yield_expr) => {
                let inner = yield_expr
                    .expression
                    .as_ref()
                    .map(|e| Box::new(self.build_expression(e, catalog)));
                IrExpression::new(IrExpressionKind::Yield {
                    expression: inner,
                    delegate: yield_expr.delegate,
                })
            }
            ast::Expression::TypeAssertion(assertion) => {
                self.build_type_assertion(assertion, catalog)
            }
            ast::Expression::NonNull(non_null) => {
                // `x!` has no CLR-side effect; the inner expression flows
                // through with its type intact.
                return self.build_expression_expecting(&non_null.expression, expected, catalog);
            }
            ast::Expression::Paren(paren) => {
                return self
                    .build_expression_expecting(&paren.expression, expected, catalog)
                    .with_span(span);
            }
            ast::Expression::DynamicImport(import) => {
                let specifier = match import.argument.as_ref() {
                    ast::Expression::Literal(lit) => match &lit.value {
                        ast::LitValue::String(s)
                            if s.starts_with("./") || s.starts_with("../") =>
                        {
                            Some(s.clone())
                        }
                        _ => None,
                    },
                    _ => None,
                };
                IrExpression::new(IrExpressionKind::DynamicImport { specifier })
            }
            ast::Expression::ImportMeta(_) => {
                IrExpression::new(IrExpressionKind::UnsupportedExpression {
                    what: "import.meta".to_string(),
                })
            }
        };
        built.with_span(span)
    }

    fn build_literal(&mut self, lit: &ast::Literal) -> IrExpression {
        let (value, ty) = match &lit.value {
            ast::LitValue::Number(n) => (
                IrLiteralValue::Number(*n),
                Some(IrType::primitive("number")),
            ),
            ast::LitValue::String(s) => (
                IrLiteralValue::String(s.clone()),
                Some(IrType::primitive("string")),
            ),
            ast::LitValue::Bool(b) => (
                IrLiteralValue::Bool(*b),
                Some(IrType::primitive("boolean")),
            ),
            ast::LitValue::Null => (IrLiteralValue::Null, Some(IrType::primitive("null"))),
            ast::LitValue::Undefined => (
                IrLiteralValue::Undefined,
                Some(IrType::primitive("undefined")),
            ),
        };
        let ir = IrExpression::new(IrExpressionKind::Literal { value });
        match ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_identifier(&mut self, ident: &ast::Ident) -> IrExpression {
        let decl = self.binding.resolution.get(&ident.id).copied();
        let ty = decl.and_then(|d| self.lookup_decl_type(d));
        let ir = IrExpression::new(IrExpressionKind::Identifier {
            name: ident.name.clone(),
            decl,
        });
        match ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_property_access(
        &mut self,
        access: &ast::PropertyAccess,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        let object = self.build_expression(&access.object, catalog);
        let member_ty = object
            .inferred_type
            .as_ref()
            .and_then(|ty| self.resolve_member_type(ty, &access.name, catalog));
        let ir = IrExpression::new(IrExpressionKind::MemberAccess {
            object: Box::new(object),
            member: MemberKey::Name(access.name.clone()),
            access_kind: AccessKind::Unknown,
            optional: access.optional,
        });
        match member_ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    /// Member type through the nominal environment, including inherited
    /// members viewed through the receiver's instantiation.
    pub(crate) fn resolve_member_type(
        &self,
        receiver: &IrType,
        member: &str,
        catalog: &UnifiedTypeCatalog,
    ) -> Option<IrType> {
        if let Some(direct) = self.member_type_of(receiver, member) {
            return Some(direct);
        }
        let IrType::Reference {
            type_id: Some(type_id),
            type_arguments,
            ..
        } = receiver
        else {
            // Arrays expose `length` as a proven-int surface.
            if let IrType::Array { .. } = receiver
                && member == "length"
            {
                return Some(IrType::primitive("int"));
            }
            if let IrType::Primitive { name, .. } = receiver
                && name == "string"
                && member == "length"
            {
                return Some(IrType::primitive("int"));
            }
            return None;
        };
        let env = NominalEnv::new(catalog);
        let (owner, subst) = env.find_member_declaring_type(type_id, type_arguments, member)?;
        let info = catalog.get(&owner)?.members.get(member)?;
        Some(subst.apply(&info.ty))
    }

    fn build_element_access(
        &mut self,
        access: &ast::ElementAccess,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        let object = self.build_expression(&access.object, catalog);
        let index = self.build_expression(&access.index, catalog);

        let (access_kind, element_ty) = match object.inferred_type.as_ref() {
            Some(IrType::Array { element, origin }) => {
                let kind = if self.runtime() == RuntimeMode::Dotnet
                    && *origin == ArrayOrigin::Explicit
                {
                    AccessKind::ClrIndexer
                } else {
                    AccessKind::JsRuntimeArray
                };
                (kind, Some((**element).clone()))
            }
            Some(IrType::Primitive { name, .. }) if name == "string" => {
                (AccessKind::StringChar, Some(IrType::primitive("string")))
            }
            Some(IrType::Dictionary { value, .. }) => {
                (AccessKind::Dictionary, Some((**value).clone()))
            }
            _ => (AccessKind::Unknown, None),
        };

        let ir = IrExpression::new(IrExpressionKind::MemberAccess {
            object: Box::new(object),
            member: MemberKey::Index(Box::new(index)),
            access_kind,
            optional: false,
        });
        match element_ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_call(&mut self, call: &ast::Call, catalog: &UnifiedTypeCatalog) -> IrExpression {
        // Core intrinsics with their own IR shapes.
        if let ast::Expression::Ident(callee) = call.callee.as_ref() {
            match callee.name.as_str() {
                "trycast" if call.type_args.len() == 1 && call.args.len() == 1 => {
                    let target = self.convert_type(&call.type_args[0]);
                    let inner = self.build_expression(&call.args[0], catalog);
                    return IrExpression::new(IrExpressionKind::TryCast {
                        expression: Box::new(inner),
                        target: target.clone(),
                    })
                    .with_type(target);
                }
                "stackalloc" if call.type_args.len() == 1 && call.args.len() == 1 => {
                    let element = self.convert_type(&call.type_args[0]);
                    let length = self.build_expression(&call.args[0], catalog);
                    let span_type = IrType::Reference {
                        name: "Span".to_string(),
                        type_id: None,
                        resolved_clr_type: Some("System.Span".to_string()),
                        type_arguments: vec![element.clone()],
                        members: None,
                    };
                    return IrExpression::new(IrExpressionKind::StackAlloc {
                        element,
                        length: Box::new(length),
                    })
                    .with_type(span_type);
                }
                _ => {}
            }
        }

        let callee = self.build_expression(&call.callee, catalog);
        let type_args: Vec<IrType> = call
            .type_args
            .iter()
            .map(|t| self.convert_type(t))
            .collect();
        let return_ty = match callee.inferred_type.as_ref() {
            Some(IrType::Function { return_type, .. }) => Some((**return_type).clone()),
            _ => {
                if let ast::Expression::Ident(ident) = call.callee.as_ref() {
                    match ident.name.as_str() {
                        "istype" => Some(IrType::primitive("boolean")),
                        "nameof" => Some(IrType::primitive("string")),
                        "sizeof" => Some(IrType::primitive("int")),
                        _ => None,
                    }
                } else {
                    None
                }
            }
        };

        let expected_args: Vec<Option<IrType>> = match callee.inferred_type.as_ref() {
            Some(IrType::Function { params, .. }) => {
                params.iter().map(|p| Some(p.ty.clone())).collect()
            }
            _ => Vec::new(),
        };
        let args: Vec<IrExpression> = call
            .args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                let expected = expected_args.get(i).and_then(|e| e.as_ref());
                self.build_expression_expecting(arg, expected, catalog)
            })
            .collect();

        let ir = IrExpression::new(IrExpressionKind::Call {
            callee: Box::new(callee),
            type_args,
            args,
            optional: call.optional,
        });
        match return_ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_new(&mut self, new: &ast::New, catalog: &UnifiedTypeCatalog) -> IrExpression {
        let callee_type = self.type_of_new_callee(&new.callee, &new.type_args);
        let args: Vec<IrExpression> = new
            .args
            .iter()
            .map(|arg| self.build_expression(arg, catalog))
            .collect();
        IrExpression::new(IrExpressionKind::New {
            callee: callee_type.clone(),
            args,
        })
        .with_type(callee_type)
    }

    /// Turn a `new` callee expression into the constructed type.
    fn type_of_new_callee(
        &mut self,
        callee: &ast::Expression,
        type_args: &[ast::TypeNode],
    ) -> IrType {
        match callee {
            ast::Expression::Ident(ident) => {
                let reference = ast::TypeRef {
                    head: ident.clone(),
                    rest: Vec::new(),
                    type_args: type_args.to_vec(),
                    span: ident.span,
                };
                self.convert_type(&ast::TypeNode::Ref(reference))
            }
            ast::Expression::PropertyAccess(access) => {
                let mut parts = vec![access.name.clone()];
                let mut current = access.object.as_ref();
                let head = loop {
                    match current {
                        ast::Expression::PropertyAccess(outer) => {
                            parts.push(outer.name.clone());
                            current = outer.object.as_ref();
                        }
                        ast::Expression::Ident(ident) => break ident.clone(),
                        _ => {
                            return IrType::primitive("object");
                        }
                    }
                };
                parts.reverse();
                let reference = ast::TypeRef {
                    head,
                    rest: parts,
                    type_args: type_args.to_vec(),
                    span: access.span,
                };
                self.convert_type(&ast::TypeNode::Ref(reference))
            }
            _ => IrType::primitive("object"),
        }
    }

    fn build_binary(&mut self, binary: &ast::Binary, catalog: &UnifiedTypeCatalog) -> IrExpression {
        let left = self.build_expression(&binary.left, catalog);
        let right = self.build_expression(&binary.right, catalog);

        if let Some(op) = convert_logical_op(binary.op) {
            let ty = match (&left.inferred_type, &right.inferred_type) {
                (Some(a), Some(b)) => Some(self.union_of(vec![a.clone(), b.clone()])),
                _ => None,
            };
            let ir = IrExpression::new(IrExpressionKind::Logical {
                op,
                left: Box::new(left),
                right: Box::new(right),
            });
            return match ty {
                Some(ty) => ir.with_type(ty),
                None => ir,
            };
        }

        let op = convert_binary_op(binary.op);
        let ty = binary_result_type(op, &left, &right);
        let ir = IrExpression::new(IrExpressionKind::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        });
        match ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_unary(&mut self, unary: &ast::Unary, catalog: &UnifiedTypeCatalog) -> IrExpression {
        let operand = self.build_expression(&unary.operand, catalog);
        let ty = match unary.op {
            ast::UnaryOp::Not | ast::UnaryOp::Delete => Some(IrType::primitive("boolean")),
            ast::UnaryOp::Typeof => Some(IrType::primitive("string")),
            ast::UnaryOp::Void => Some(IrType::primitive("undefined")),
            ast::UnaryOp::Minus | ast::UnaryOp::Plus | ast::UnaryOp::BitNot => {
                operand.inferred_type.clone()
            }
        };
        let ir = IrExpression::new(IrExpressionKind::Unary {
            op: convert_unary_op(unary.op),
            operand: Box::new(operand),
        });
        match ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    fn build_array_literal(
        &mut self,
        array: &ast::ArrayLit,
        expected: Option<&IrType>,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        let expected_element = match expected {
            Some(IrType::Array { element, .. }) => Some((**element).clone()),
            _ => None,
        };
        let elements: Vec<IrExpression> = array
            .elements
            .iter()
            .map(|element| {
                self.build_expression_expecting(element, expected_element.as_ref(), catalog)
            })
            .collect();

        let ty = match expected {
            Some(expected @ IrType::Array { .. }) => Some(expected.clone()),
            _ => {
                let element_types: Vec<IrType> = elements
                    .iter()
                    .filter(|e| !matches!(e.kind, IrExpressionKind::Spread { .. }))
                    .filter_map(|e| e.inferred_type.clone())
                    .collect();
                let element = if element_types.is_empty() {
                    IrType::primitive("any")
                } else {
                    self.union_of(element_types)
                };
                Some(IrType::Array {
                    element: Box::new(element),
                    origin: ArrayOrigin::Inferred,
                })
            }
        };

        let ir = IrExpression::new(IrExpressionKind::ArrayLiteral { elements });
        match ty {
            Some(ty) => ir.with_type(ty),
            None => ir,
        }
    }

    /// Object literals: with a nominal contextual type they construct it;
    /// without one, an anonymous synthetic interface is interned per shape.
    fn build_object_literal(
        &mut self,
        object: &ast::ObjectLit,
        expected: Option<&IrType>,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        // Contextual nominal type wins; no synthesis.
        if let Some(expected_ty @ IrType::Reference { .. }) = expected {
            let properties = self.build_object_properties(object, Some(expected_ty), catalog);
            return IrExpression::new(IrExpressionKind::ObjectLiteral {
                target_type: Some(expected_ty.clone()),
                properties,
            })
            .with_type(expected_ty.clone());
        }

        let properties = self.build_object_properties(object, expected, catalog);

        // Eligibility for anonymous synthesis.
        let eligible = object.properties.iter().all(|prop| match prop.kind {
            ast::PropKind::Init | ast::PropKind::Shorthand => match &prop.key {
                ast::PropKey::Ident(_) | ast::PropKey::String(_) => true,
                ast::PropKey::Computed(expr) => {
                    matches!(
                        expr.as_ref(),
                        ast::Expression::Literal(lit)
                            if matches!(lit.value, ast::LitValue::String(_))
                    )
                }
                ast::PropKey::Number(_) => false,
            },
            ast::PropKind::Method | ast::PropKind::Getter | ast::PropKind::Setter => false,
            ast::PropKind::Spread => false,
        });

        if !eligible || properties.is_empty() {
            let members: Vec<IrObjectMember> = properties
                .iter()
                .map(|(name, value)| IrObjectMember {
                    name: name.clone(),
                    ty: value
                        .inferred_type
                        .clone()
                        .unwrap_or_else(|| IrType::primitive("any")),
                    optional: false,
                    readonly: false,
                })
                .collect();
            return IrExpression::new(IrExpressionKind::ObjectLiteral {
                target_type: None,
                properties,
            })
            .with_type(IrType::Object { members });
        }

        let members: Vec<IrObjectMember> = properties
            .iter()
            .map(|(name, value)| IrObjectMember {
                name: name.clone(),
                ty: value
                    .inferred_type
                    .clone()
                    .unwrap_or_else(|| IrType::primitive("any")),
                optional: false,
                readonly: false,
            })
            .collect();
        let synthetic = self.intern_anonymous(&members, object.span);
        IrExpression::new(IrExpressionKind::ObjectLiteral {
            target_type: Some(synthetic.clone()),
            properties,
        })
        .with_type(synthetic)
    }

    fn build_object_properties(
        &mut self,
        object: &ast::ObjectLit,
        expected: Option<&IrType>,
        catalog: &UnifiedTypeCatalog,
    ) -> Vec<(String, IrExpression)> {
        object
            .properties
            .iter()
            .filter_map(|prop| {
                let name = match &prop.key {
                    ast::PropKey::Ident(name) | ast::PropKey::String(name) => name.clone(),
                    ast::PropKey::Number(n) => n.to_string(),
                    ast::PropKey::Computed(expr) => match expr.as_ref() {
                        ast::Expression::Literal(lit) => match &lit.value {
                            ast::LitValue::String(s) => s.clone(),
                            _ => return None,
                        },
                        _ => return None,
                    },
                };
                let value = prop.value.as_ref()?;
                let member_expected =
                    expected.and_then(|ty| self.resolve_member_type(ty, &name, catalog));
                let built =
                    self.build_expression_expecting(value, member_expected.as_ref(), catalog);
                Some((name, built))
            })
            .collect()
    }

    fn build_arrow(&mut self, arrow: &ast::Arrow, catalog: &UnifiedTypeCatalog) -> IrExpression {
        self.push_type_params(&arrow.type_params);
        let params = self.convert_params(&arrow.params);
        let return_type = arrow.return_type.as_ref().map(|t| self.convert_type(t));
        let (body, is_expression_body) = match &arrow.body {
            ast::ArrowBody::Block(block) => {
                (self.build_statements(&block.statements, catalog), false)
            }
            ast::ArrowBody::Expr(expr) => {
                let value = self.build_expression(expr, catalog);
                (vec![IrStatement::Return(Some(value))], true)
            }
        };
        self.pop_type_params();

        let fn_type = IrType::Function {
            params: params
                .iter()
                .map(|p| IrParamType {
                    name: p.name.clone(),
                    ty: p.ty.clone().unwrap_or_else(|| IrType::primitive("any")),
                    optional: p.optional,
                })
                .collect(),
            return_type: Box::new(
                return_type.clone().unwrap_or_else(|| IrType::primitive("void")),
            ),
        };

        IrExpression::new(IrExpressionKind::FunctionValue {
            is_async: arrow.is_async,
            is_generator: false,
            params,
            return_type,
            body,
            is_expression_body,
        })
        .with_type(fn_type)
    }

    fn build_function_expr(
        &mut self,
        func: &ast::FunctionExpr,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        self.push_type_params(&func.type_params);
        let params = self.convert_params(&func.params);
        let return_type = func.return_type.as_ref().map(|t| self.convert_type(t));
        let was_generator = self.in_generator;
        self.in_generator = func.is_generator;
        let body = self.build_statements(&func.body.statements, catalog);
        self.in_generator = was_generator;
        self.pop_type_params();

        let fn_type = IrType::Function {
            params: params
                .iter()
                .map(|p| IrParamType {
                    name: p.name.clone(),
                    ty: p.ty.clone().unwrap_or_else(|| IrType::primitive("any")),
                    optional: p.optional,
                })
                .collect(),
            return_type: Box::new(
                return_type.clone().unwrap_or_else(|| IrType::primitive("void")),
            ),
        };

        IrExpression::new(IrExpressionKind::FunctionValue {
            is_async: func.is_async,
            is_generator: func.is_generator,
            params,
            return_type,
            body,
            is_expression_body: false,
        })
        .with_type(fn_type)
    }

    fn build_type_assertion(
        &mut self,
        assertion: &ast::TypeAssertion,
        catalog: &UnifiedTypeCatalog,
    ) -> IrExpression {
        let target = self.convert_type(&assertion.ty);
        let inner = self.build_expression(&assertion.expression, catalog);

        // Assertions to a numeric kind lower to explicit numeric narrowing.
        if let IrType::Primitive { name, .. } = &target
            && let Some(kind) = NumericKind::from_alias(name)
        {
            return IrExpression::new(IrExpressionKind::NumericNarrowing {
                expression: Box::new(inner),
                target_kind: kind,
            })
            .with_type(IrType::primitive_with_intent(name, kind));
        }

        IrExpression::new(IrExpressionKind::TypeAssertion {
            expression: Box::new(inner),
            target: target.clone(),
        })
        .with_type(target)
    }
}

/// The inferred type of a binary arithmetic/comparison expression.
fn binary_result_type(
    op: IrBinaryOp,
    left: &IrExpression,
    right: &IrExpression,
) -> Option<IrType> {
    match op {
        IrBinaryOp::Eq
        | IrBinaryOp::NotEq
        | IrBinaryOp::Less
        | IrBinaryOp::LessEq
        | IrBinaryOp::Greater
        | IrBinaryOp::GreaterEq
        | IrBinaryOp::Instanceof
        | IrBinaryOp::In => Some(IrType::primitive("boolean")),
        IrBinaryOp::Add => {
            // String concatenation wins over numeric addition.
            let is_string = |e: &IrExpression| {
                matches!(
                    e.inferred_type.as_ref(),
                    Some(IrType::Primitive { name, .. }) if name == "string"
                )
            };
            if is_string(left) || is_string(right) {
                return Some(IrType::primitive("string"));
            }
            numeric_promotion(left, right)
        }
        IrBinaryOp::Sub
        | IrBinaryOp::Mul
        | IrBinaryOp::Div
        | IrBinaryOp::Rem
        | IrBinaryOp::Exp
        | IrBinaryOp::ShiftLeft
        | IrBinaryOp::ShiftRight
        | IrBinaryOp::ShiftRightUnsigned
        | IrBinaryOp::BitAnd
        | IrBinaryOp::BitOr
        | IrBinaryOp::BitXor => numeric_promotion(left, right),
    }
}

fn numeric_promotion(left: &IrExpression, right: &IrExpression) -> Option<IrType> {
    let left_kind = left.inferred_type.as_ref().and_then(IrType::numeric_intent);
    let right_kind = right
        .inferred_type
        .as_ref()
        .and_then(IrType::numeric_intent);
    match (left_kind, right_kind) {
        (Some(l), Some(r)) => {
            let promoted = NumericKind::binary_promotion(l, r)?;
            Some(IrType::primitive_with_intent(promoted.alias(), promoted))
        }
        _ => Some(IrType::primitive("number")),
    }
}

/// `await` unwraps `Promise<T>` / `PromiseLike<T>` / `Task<T>`.
fn unwrap_promise(ty: &IrType) -> IrType {
    if let IrType::Reference {
        name,
        type_arguments,
        ..
    } = ty
        && (name == "Promise" || name == "PromiseLike" || name == "Task")
    {
        return match type_arguments.first() {
            Some(inner) => inner.clone(),
            None => IrType::primitive("void"),
        };
    }
    ty.clone()
}

fn convert_binary_op(op: ast::BinaryOp) -> IrBinaryOp {
    match op {
        ast::BinaryOp::Add => IrBinaryOp::Add,
        ast::BinaryOp::Sub => IrBinaryOp::Sub,
        ast::BinaryOp::Mul => IrBinaryOp::Mul,
        ast::BinaryOp::Div => IrBinaryOp::Div,
        ast::BinaryOp::Rem => IrBinaryOp::Rem,
        ast::BinaryOp::Exp => IrBinaryOp::Exp,
        ast::BinaryOp::ShiftLeft => IrBinaryOp::ShiftLeft,
        ast::BinaryOp::ShiftRight => IrBinaryOp::ShiftRight,
        ast::BinaryOp::ShiftRightUnsigned => IrBinaryOp::ShiftRightUnsigned,
        ast::BinaryOp::BitAnd => IrBinaryOp::BitAnd,
        ast::BinaryOp::BitOr => IrBinaryOp::BitOr,
        ast::BinaryOp::BitXor => IrBinaryOp::BitXor,
        // Strict and loose equality coincide in the typed subset.
        ast::BinaryOp::Eq | ast::BinaryOp::StrictEq => IrBinaryOp::Eq,
        ast::BinaryOp::NotEq | ast::BinaryOp::StrictNotEq => IrBinaryOp::NotEq,
        ast::BinaryOp::Less => IrBinaryOp::Less,
        ast::BinaryOp::LessEq => IrBinaryOp::LessEq,
        ast::BinaryOp::Greater => IrBinaryOp::Greater,
        ast::BinaryOp::GreaterEq => IrBinaryOp::GreaterEq,
        ast::BinaryOp::Instanceof => IrBinaryOp::Instanceof,
        ast::BinaryOp::In => IrBinaryOp::In,
        ast::BinaryOp::And | ast::BinaryOp::Or | ast::BinaryOp::Coalesce => {
            unreachable!("logical operators handled separately")
        }
    }
}

fn convert_logical_op(op: ast::BinaryOp) -> Option<IrLogicalOp> {
    Some(match op {
        ast::BinaryOp::And => IrLogicalOp::And,
        ast::BinaryOp::Or => IrLogicalOp::Or,
        ast::BinaryOp::Coalesce => IrLogicalOp::Coalesce,
        _ => return None,
    })
}

fn convert_unary_op(op: ast::UnaryOp) -> IrUnaryOp {
    match op {
        ast::UnaryOp::Minus => IrUnaryOp::Minus,
        ast::UnaryOp::Plus => IrUnaryOp::Plus,
        ast::UnaryOp::Not => IrUnaryOp::Not,
        ast::UnaryOp::BitNot => IrUnaryOp::BitNot,
        ast::UnaryOp::Typeof => IrUnaryOp::Typeof,
        ast::UnaryOp::Void => IrUnaryOp::Void,
        ast::UnaryOp::Delete => IrUnaryOp::Delete,
    }
}

fn convert_assign_op(op: ast::AssignOp) -> IrAssignOp {
    match op {
        ast::AssignOp::Assign => IrAssignOp::Assign,
        ast::AssignOp::Add => IrAssignOp::Add,
        ast::AssignOp::Sub => IrAssignOp::Sub,
        ast::AssignOp::Mul => IrAssignOp::Mul,
        ast::AssignOp::Div => IrAssignOp::Div,
        ast::AssignOp::Rem => IrAssignOp::Rem,
        ast::AssignOp::Exp => IrAssignOp::Exp,
        ast::AssignOp::ShiftLeft => IrAssignOp::ShiftLeft,
        ast::AssignOp::ShiftRight => IrAssignOp::ShiftRight,
        ast::AssignOp::ShiftRightUnsigned => IrAssignOp::ShiftRightUnsigned,
        ast::AssignOp::BitAnd => IrAssignOp::BitAnd,
        ast::AssignOp::BitOr => IrAssignOp::BitOr,
        ast::AssignOp::BitXor => IrAssignOp::BitXor,
        ast::AssignOp::And => IrAssignOp::And,
        ast::AssignOp::Or => IrAssignOp::Or,
        ast::AssignOp::Coalesce => IrAssignOp::Coalesce,
    }
}
