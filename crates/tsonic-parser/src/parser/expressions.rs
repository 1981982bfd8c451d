//! Expression parsing (precedence climbing).

use super::Parser;
use crate::ast::*;
use tsonic_common::diagnostics::codes;
use tsonic_common::numeric::parse_numeric_literal_value;
use tsonic_common::{Span, Spanned};
use tsonic_scanner::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_expression(&mut self) -> Expression {
        self.parse_assignment_expression()
    }

    pub(crate) fn parse_assignment_expression(&mut self) -> Expression {
        if self.at(TokenKind::Yield) {
            return self.parse_yield_expression();
        }

        // Arrow lookahead: `x => ...`, `(...) => ...`, `<T>(...) => ...`,
        // `async (...) => ...`, `async x => ...`
        if let Some(arrow) = self.try_parse_arrow() {
            return Expression::Arrow(arrow);
        }

        let expr = self.parse_conditional_expression();

        let op = match self.token.kind {
            TokenKind::Equals => Some(AssignOp::Assign),
            TokenKind::PlusEquals => Some(AssignOp::Add),
            TokenKind::MinusEquals => Some(AssignOp::Sub),
            TokenKind::AsteriskEquals => Some(AssignOp::Mul),
            TokenKind::SlashEquals => Some(AssignOp::Div),
            TokenKind::PercentEquals => Some(AssignOp::Rem),
            TokenKind::AsteriskAsteriskEquals => Some(AssignOp::Exp),
            TokenKind::LessLessEquals => Some(AssignOp::ShiftLeft),
            TokenKind::GreaterGreaterEquals => Some(AssignOp::ShiftRight),
            TokenKind::GreaterGreaterGreaterEquals => Some(AssignOp::ShiftRightUnsigned),
            TokenKind::AmpersandEquals => Some(AssignOp::BitAnd),
            TokenKind::BarEquals => Some(AssignOp::BitOr),
            TokenKind::CaretEquals => Some(AssignOp::BitXor),
            TokenKind::AmpersandAmpersandEquals => Some(AssignOp::And),
            TokenKind::BarBarEquals => Some(AssignOp::Or),
            TokenKind::QuestionQuestionEquals => Some(AssignOp::Coalesce),
            _ => None,
        };

        if let Some(op) = op {
            self.bump();
            let value = self.parse_assignment_expression();
            let span = expr.span().merge(value.span());
            return Expression::Assignment(Assignment {
                op,
                target: Box::new(expr),
                value: Box::new(value),
                span,
            });
        }

        expr
    }

    fn parse_yield_expression(&mut self) -> Expression {
        let start = self.expect(TokenKind::Yield, "yield");
        let delegate = self.eat(TokenKind::Asterisk);
        let expression = if matches!(
            self.token.kind,
            TokenKind::Semicolon
                | TokenKind::CloseParen
                | TokenKind::CloseBrace
                | TokenKind::CloseBracket
                | TokenKind::Comma
                | TokenKind::Eof
        ) {
            None
        } else {
            Some(Box::new(self.parse_assignment_expression()))
        };
        let end = expression.as_ref().map_or(start, |e| e.span());
        Expression::Yield(Yield {
            expression,
            delegate,
            span: start.merge(end),
        })
    }

    // =========================================================================
    // Arrow functions
    // =========================================================================

    fn try_parse_arrow(&mut self) -> Option<Arrow> {
        let is_async_candidate = self.at(TokenKind::Async);
        let starts_arrow = is_async_candidate
            || self.at(TokenKind::OpenParen)
            || self.at(TokenKind::Less)
            || self.at_name();
        if !starts_arrow {
            return None;
        }

        let checkpoint = self.checkpoint();
        let start = self.token.span;
        let is_async = if is_async_candidate {
            self.bump();
            true
        } else {
            false
        };

        // `x => ...`
        if self.at_name() {
            let name = self.parse_ident();
            if self.at(TokenKind::Arrow) {
                self.bump();
                let span = name.span;
                let params = vec![Param {
                    id: self.fresh_id(),
                    name,
                    type_annotation: None,
                    optional: false,
                    is_rest: false,
                    initializer: None,
                    span,
                }];
                return Some(self.finish_arrow(start, is_async, Vec::new(), params, None));
            }
            self.restore(checkpoint);
            return None;
        }

        // `<T>(...) => ...` / `(...) => ...`
        if self.at(TokenKind::Less) || self.at(TokenKind::OpenParen) {
            let type_params = if self.at(TokenKind::Less) {
                self.parse_type_params()
            } else {
                Vec::new()
            };
            if !self.at(TokenKind::OpenParen) {
                self.restore(checkpoint);
                return None;
            }
            let params = self.parse_params();
            let return_type = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            if !self.at(TokenKind::Arrow) {
                self.restore(checkpoint);
                return None;
            }
            self.bump();
            return Some(self.finish_arrow(start, is_async, type_params, params, return_type));
        }

        self.restore(checkpoint);
        None
    }

    fn finish_arrow(
        &mut self,
        start: Span,
        is_async: bool,
        type_params: Vec<TypeParam>,
        params: Vec<Param>,
        return_type: Option<TypeNode>,
    ) -> Arrow {
        let body = if self.at(TokenKind::OpenBrace) {
            ArrowBody::Block(self.parse_block())
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment_expression()))
        };
        let end = match &body {
            ArrowBody::Block(block) => block.span,
            ArrowBody::Expr(expr) => expr.span(),
        };
        Arrow {
            id: self.fresh_id(),
            is_async,
            type_params,
            params,
            return_type,
            body,
            span: start.merge(end),
        }
    }

    // =========================================================================
    // Conditional / binary
    // =========================================================================

    fn parse_conditional_expression(&mut self) -> Expression {
        let condition = self.parse_binary_expression(1);
        if !self.at(TokenKind::Question) {
            return condition;
        }
        self.bump();
        let when_true = self.parse_assignment_expression();
        self.expect(TokenKind::Colon, ":");
        let when_false = self.parse_assignment_expression();
        let span = condition.span().merge(when_false.span());
        Expression::Conditional(Conditional {
            condition: Box::new(condition),
            when_true: Box::new(when_true),
            when_false: Box::new(when_false),
            span,
        })
    }

    fn parse_binary_expression(&mut self, min_prec: u8) -> Expression {
        let mut left = self.parse_unary_expression();

        loop {
            // `as` binds at relational precedence and takes a type operand
            if self.at(TokenKind::As) && min_prec <= 8 {
                self.bump();
                let ty = self.parse_type();
                let span = left.span().merge(ty.span());
                left = Expression::TypeAssertion(TypeAssertion {
                    expression: Box::new(left),
                    ty,
                    span,
                });
                continue;
            }

            let Some((op, prec, right_assoc)) = binary_op_info(self.token.kind) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let next_min = if right_assoc { prec } else { prec + 1 };
            let right = self.parse_binary_expression(next_min);
            let span = left.span().merge(right.span());
            left = Expression::Binary(Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            });
        }

        left
    }

    fn parse_unary_expression(&mut self) -> Expression {
        let op = match self.token.kind {
            TokenKind::Exclamation => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(op) = op {
            let start = self.bump().span;
            let operand = self.parse_unary_expression();
            let span = start.merge(operand.span());
            return Expression::Unary(Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }

        if self.at(TokenKind::Await) {
            let start = self.bump().span;
            let expression = self.parse_unary_expression();
            let span = start.merge(expression.span());
            return Expression::Await(Await {
                expression: Box::new(expression),
                span,
            });
        }

        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            let increment = self.at(TokenKind::PlusPlus);
            let start = self.bump().span;
            let operand = self.parse_unary_expression();
            let span = start.merge(operand.span());
            return Expression::Update(Update {
                increment,
                prefix: true,
                operand: Box::new(operand),
                span,
            });
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Expression {
        let expr = self.parse_left_hand_side_expression();
        if self.at(TokenKind::PlusPlus) || self.at(TokenKind::MinusMinus) {
            let increment = self.at(TokenKind::PlusPlus);
            let end = self.bump().span;
            let span = expr.span().merge(end);
            return Expression::Update(Update {
                increment,
                prefix: false,
                operand: Box::new(expr),
                span,
            });
        }
        expr
    }

    // =========================================================================
    // Call / member chains
    // =========================================================================

    fn parse_left_hand_side_expression(&mut self) -> Expression {
        let mut expr = if self.at(TokenKind::New) {
            self.parse_new_expression()
        } else {
            self.parse_primary_expression()
        };

        loop {
            match self.token.kind {
                TokenKind::Dot => {
                    self.bump();
                    let name_span = self.token.span;
                    let name = self.parse_name("property name");
                    let span = expr.span().merge(name_span);
                    expr = Expression::PropertyAccess(PropertyAccess {
                        object: Box::new(expr),
                        name,
                        name_span,
                        optional: false,
                        span,
                    });
                }
                TokenKind::QuestionDot => {
                    self.bump();
                    if self.at(TokenKind::OpenParen) {
                        let (args, end) = self.parse_arguments();
                        let span = expr.span().merge(end);
                        expr = Expression::Call(Call {
                            callee: Box::new(expr),
                            type_args: Vec::new(),
                            args,
                            optional: true,
                            span,
                        });
                    } else if self.at(TokenKind::OpenBracket) {
                        self.bump();
                        let index = self.parse_expression();
                        let end = self.expect(TokenKind::CloseBracket, "]");
                        let span = expr.span().merge(end);
                        expr = Expression::ElementAccess(ElementAccess {
                            object: Box::new(expr),
                            index: Box::new(index),
                            span,
                        });
                    } else {
                        let name_span = self.token.span;
                        let name = self.parse_name("property name");
                        let span = expr.span().merge(name_span);
                        expr = Expression::PropertyAccess(PropertyAccess {
                            object: Box::new(expr),
                            name,
                            name_span,
                            optional: true,
                            span,
                        });
                    }
                }
                TokenKind::OpenBracket => {
                    self.bump();
                    let index = self.parse_expression();
                    let end = self.expect(TokenKind::CloseBracket, "]");
                    let span = expr.span().merge(end);
                    expr = Expression::ElementAccess(ElementAccess {
                        object: Box::new(expr),
                        index: Box::new(index),
                        span,
                    });
                }
                TokenKind::OpenParen => {
                    let (args, end) = self.parse_arguments();
                    let span = expr.span().merge(end);
                    expr = Expression::Call(Call {
                        callee: Box::new(expr),
                        type_args: Vec::new(),
                        args,
                        optional: false,
                        span,
                    });
                }
                TokenKind::Less => {
                    // `f<T>(x)` - type arguments need backtracking since `<`
                    // is also the less-than operator.
                    let checkpoint = self.checkpoint();
                    if let Some(type_args) = self.try_parse_call_type_args() {
                        let (args, end) = self.parse_arguments();
                        let span = expr.span().merge(end);
                        expr = Expression::Call(Call {
                            callee: Box::new(expr),
                            type_args,
                            args,
                            optional: false,
                            span,
                        });
                    } else {
                        self.restore(checkpoint);
                        break;
                    }
                }
                TokenKind::Exclamation => {
                    let end = self.bump().span;
                    let span = expr.span().merge(end);
                    expr = Expression::NonNull(NonNull {
                        expression: Box::new(expr),
                        span,
                    });
                }
                _ => break,
            }
        }

        expr
    }

    fn try_parse_call_type_args(&mut self) -> Option<Vec<TypeNode>> {
        self.expect(TokenKind::Less, "<");
        let mut type_args = Vec::new();
        while !self.at(TokenKind::Greater) && !self.at(TokenKind::Eof) {
            type_args.push(self.parse_type());
            if !self.at(TokenKind::Greater) && !self.eat(TokenKind::Comma) {
                return None;
            }
        }
        if !self.eat(TokenKind::Greater) {
            return None;
        }
        if !self.at(TokenKind::OpenParen) {
            return None;
        }
        Some(type_args)
    }

    fn parse_new_expression(&mut self) -> Expression {
        let start = self.expect(TokenKind::New, "new");
        let mut callee = self.parse_primary_expression();
        // Member chain before the argument list: `new a.b.C()`
        while self.at(TokenKind::Dot) {
            self.bump();
            let name_span = self.token.span;
            let name = self.parse_name("property name");
            let span = callee.span().merge(name_span);
            callee = Expression::PropertyAccess(PropertyAccess {
                object: Box::new(callee),
                name,
                name_span,
                optional: false,
                span,
            });
        }
        let type_args = if self.at(TokenKind::Less) {
            let checkpoint = self.checkpoint();
            match self.try_parse_call_type_args() {
                Some(args) => args,
                None => {
                    self.restore(checkpoint);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        let (args, end) = if self.at(TokenKind::OpenParen) {
            self.parse_arguments()
        } else {
            (Vec::new(), callee.span())
        };
        let span = start.merge(end);
        Expression::New(New {
            callee: Box::new(callee),
            type_args,
            args,
            span,
        })
    }

    fn parse_arguments(&mut self) -> (Vec<Expression>, Span) {
        self.expect(TokenKind::OpenParen, "(");
        let mut args = Vec::new();
        while !self.at(TokenKind::CloseParen) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::DotDotDot) {
                let start = self.bump().span;
                let expression = self.parse_assignment_expression();
                let span = start.merge(expression.span());
                args.push(Expression::Spread(Spread {
                    expression: Box::new(expression),
                    span,
                }));
            } else {
                args.push(self.parse_assignment_expression());
            }
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        let end = self.expect(TokenKind::CloseParen, ")");
        (args, end)
    }

    // =========================================================================
    // Primary expressions
    // =========================================================================

    fn parse_primary_expression(&mut self) -> Expression {
        match self.token.kind {
            TokenKind::NumericLiteral => {
                let raw = self.token_text().to_string();
                let span = self.bump().span;
                let value = parse_numeric_literal_value(&raw).unwrap_or(0.0);
                Expression::Literal(Literal {
                    value: LitValue::Number(value),
                    raw,
                    span,
                })
            }
            TokenKind::StringLiteral => {
                let raw = self.token_text().to_string();
                let span = self.bump().span;
                let inner = &raw[1..raw.len().saturating_sub(1)];
                Expression::Literal(Literal {
                    value: LitValue::String(unescape_string(inner)),
                    raw,
                    span,
                })
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at(TokenKind::True);
                let raw = self.token_text().to_string();
                let span = self.bump().span;
                Expression::Literal(Literal {
                    value: LitValue::Bool(value),
                    raw,
                    span,
                })
            }
            TokenKind::Null => {
                let raw = self.token_text().to_string();
                let span = self.bump().span;
                Expression::Literal(Literal {
                    value: LitValue::Null,
                    raw,
                    span,
                })
            }
            TokenKind::Undefined => {
                let raw = self.token_text().to_string();
                let span = self.bump().span;
                Expression::Literal(Literal {
                    value: LitValue::Undefined,
                    raw,
                    span,
                })
            }
            TokenKind::This => Expression::This(self.bump().span),
            TokenKind::OpenParen => {
                let start = self.bump().span;
                let expression = self.parse_expression();
                let end = self.expect(TokenKind::CloseParen, ")");
                Expression::Paren(Paren {
                    expression: Box::new(expression),
                    span: start.merge(end),
                })
            }
            TokenKind::OpenBracket => self.parse_array_literal(),
            TokenKind::OpenBrace => self.parse_object_literal(),
            TokenKind::TemplateHead | TokenKind::NoSubstitutionTemplate => {
                self.parse_template_literal()
            }
            TokenKind::Function => self.parse_function_expression(false),
            TokenKind::Async => {
                let checkpoint = self.checkpoint();
                self.bump();
                if self.at(TokenKind::Function) {
                    self.parse_function_expression(true)
                } else {
                    self.restore(checkpoint);
                    Expression::Ident(self.parse_ident())
                }
            }
            TokenKind::Import => {
                let start = self.bump().span;
                if self.eat(TokenKind::Dot) {
                    let end = self.token.span;
                    self.parse_name("meta");
                    Expression::ImportMeta(start.merge(end))
                } else {
                    self.expect(TokenKind::OpenParen, "(");
                    let argument = self.parse_assignment_expression();
                    let end = self.expect(TokenKind::CloseParen, ")");
                    Expression::DynamicImport(DynamicImport {
                        argument: Box::new(argument),
                        span: start.merge(end),
                    })
                }
            }
            _ if self.at_name() => Expression::Ident(self.parse_ident()),
            _ => {
                self.error_unexpected();
                let span = self.bump().span;
                Expression::Literal(Literal {
                    value: LitValue::Undefined,
                    raw: String::new(),
                    span,
                })
            }
        }
    }

    fn parse_array_literal(&mut self) -> Expression {
        let start = self.expect(TokenKind::OpenBracket, "[");
        let mut elements = Vec::new();
        while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::Eof) {
            if self.at(TokenKind::DotDotDot) {
                let spread_start = self.bump().span;
                let expression = self.parse_assignment_expression();
                let span = spread_start.merge(expression.span());
                elements.push(Expression::Spread(Spread {
                    expression: Box::new(expression),
                    span,
                }));
            } else {
                elements.push(self.parse_assignment_expression());
            }
            if !self.at(TokenKind::CloseBracket) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        let end = self.expect(TokenKind::CloseBracket, "]");
        Expression::ArrayLit(ArrayLit {
            elements,
            span: start.merge(end),
        })
    }

    fn parse_object_literal(&mut self) -> Expression {
        let start = self.expect(TokenKind::OpenBrace, "{");
        let mut properties = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let before = self.token.span;
            properties.push(self.parse_object_property());
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, ",");
            }
            if self.token.span == before {
                self.bump();
            }
        }
        let end = self.expect(TokenKind::CloseBrace, "}");
        Expression::ObjectLit(ObjectLit {
            properties,
            span: start.merge(end),
        })
    }

    fn parse_object_property(&mut self) -> ObjectProp {
        let start = self.token.span;

        if self.at(TokenKind::DotDotDot) {
            self.bump();
            let value = self.parse_assignment_expression();
            let span = start.merge(value.span());
            return ObjectProp {
                key: PropKey::Ident(String::new()),
                kind: PropKind::Spread,
                value: Some(value),
                span,
            };
        }

        // Accessors: `get name() {}` / `set name(v) {}`
        if (self.at(TokenKind::Get) || self.at(TokenKind::Set)) && {
            let checkpoint = self.checkpoint();
            self.bump();
            let follows_name = self.at_name() || self.at(TokenKind::StringLiteral);
            self.restore(checkpoint);
            follows_name
        } {
            let kind = if self.at(TokenKind::Get) {
                PropKind::Getter
            } else {
                PropKind::Setter
            };
            self.bump();
            let name = self.parse_name("accessor name");
            let func = self.parse_property_function(false, false);
            let span = start.merge(func.span);
            return ObjectProp {
                key: PropKey::Ident(name),
                kind,
                value: Some(Expression::FunctionExpr(func)),
                span,
            };
        }

        let key = self.parse_property_key();

        if self.at(TokenKind::OpenParen) || self.at(TokenKind::Less) {
            // Method shorthand
            let func = self.parse_property_function(false, false);
            let span = start.merge(func.span);
            return ObjectProp {
                key,
                kind: PropKind::Method,
                value: Some(Expression::FunctionExpr(func)),
                span,
            };
        }

        if self.eat(TokenKind::Colon) {
            let value = self.parse_assignment_expression();
            let span = start.merge(value.span());
            return ObjectProp {
                key,
                kind: PropKind::Init,
                value: Some(value),
                span,
            };
        }

        // Shorthand `{ x }`
        let value = match &key {
            PropKey::Ident(name) => Some(Expression::Ident(Ident {
                id: self.fresh_id(),
                name: name.clone(),
                span: start,
            })),
            _ => {
                self.error_unexpected();
                None
            }
        };
        ObjectProp {
            key,
            kind: PropKind::Shorthand,
            value,
            span: start,
        }
    }

    fn parse_property_key(&mut self) -> PropKey {
        match self.token.kind {
            TokenKind::StringLiteral => {
                let raw = self.token_text();
                let inner = raw[1..raw.len().saturating_sub(1)].to_string();
                self.bump();
                PropKey::String(unescape_string(&inner))
            }
            TokenKind::NumericLiteral => {
                let value = parse_numeric_literal_value(self.token_text()).unwrap_or(0.0);
                self.bump();
                PropKey::Number(value)
            }
            TokenKind::OpenBracket => {
                self.bump();
                let expr = self.parse_assignment_expression();
                self.expect(TokenKind::CloseBracket, "]");
                PropKey::Computed(Box::new(expr))
            }
            _ => PropKey::Ident(self.parse_name("property name")),
        }
    }

    fn parse_property_function(&mut self, is_async: bool, is_generator: bool) -> FunctionExpr {
        let start = self.token.span;
        let type_params = self.parse_type_params();
        let params = self.parse_params();
        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = self.parse_block();
        let span = start.merge(body.span);
        FunctionExpr {
            id: self.fresh_id(),
            name: None,
            is_async,
            is_generator,
            type_params,
            params,
            return_type,
            body,
            span,
        }
    }

    fn parse_function_expression(&mut self, is_async: bool) -> Expression {
        let start = self.expect(TokenKind::Function, "function");
        let is_generator = self.eat(TokenKind::Asterisk);
        let name = if self.at_name() {
            Some(self.parse_ident())
        } else {
            None
        };
        let type_params = self.parse_type_params();
        let params = self.parse_params();
        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = self.parse_block();
        let span = start.merge(body.span);
        Expression::FunctionExpr(FunctionExpr {
            id: self.fresh_id(),
            name,
            is_async,
            is_generator,
            type_params,
            params,
            return_type,
            body,
            span,
        })
    }

    fn parse_template_literal(&mut self) -> Expression {
        let start = self.token.span;

        if self.at(TokenKind::NoSubstitutionTemplate) {
            let raw = self.token_text();
            let head = unescape_string(&raw[1..raw.len().saturating_sub(1)]);
            let span = self.bump().span;
            return Expression::Template(Template {
                head,
                spans: Vec::new(),
                span,
            });
        }

        // TemplateHead: `text${
        let raw = self.token_text();
        let head = unescape_string(&raw[1..raw.len().saturating_sub(2)]);
        self.bump();

        let mut spans = Vec::new();
        let mut end = start;
        loop {
            let expr = self.parse_expression();
            if !self.at(TokenKind::CloseBrace) {
                self.error_at(self.token.span, codes::EXPECTED_TOKEN, &["}"]);
                break;
            }
            // The `}` closing a substitution re-enters template scanning.
            let close = self.token;
            let part = self.scanner.rescan_template_continuation(close);
            let part_text = part.text(self.source);
            match part.kind {
                TokenKind::TemplateMiddle => {
                    let cooked = unescape_string(&part_text[1..part_text.len().saturating_sub(2)]);
                    spans.push((expr, cooked));
                    self.token = self.scanner.scan();
                }
                TokenKind::TemplateTail => {
                    let cooked = unescape_string(&part_text[1..part_text.len().saturating_sub(1)]);
                    spans.push((expr, cooked));
                    end = part.span;
                    self.token = self.scanner.scan();
                    break;
                }
                _ => {
                    self.error_at(part.span, codes::UNTERMINATED_STRING, &[]);
                    spans.push((expr, String::new()));
                    self.token = self.scanner.scan();
                    break;
                }
            }
        }

        Expression::Template(Template {
            head,
            spans,
            span: start.merge(end),
        })
    }
}

/// Operator info: (op, precedence, right-associative).
fn binary_op_info(kind: TokenKind) -> Option<(BinaryOp, u8, bool)> {
    Some(match kind {
        TokenKind::QuestionQuestion => (BinaryOp::Coalesce, 2, false),
        TokenKind::BarBar => (BinaryOp::Or, 2, false),
        TokenKind::AmpersandAmpersand => (BinaryOp::And, 3, false),
        TokenKind::Bar => (BinaryOp::BitOr, 4, false),
        TokenKind::Caret => (BinaryOp::BitXor, 5, false),
        TokenKind::Ampersand => (BinaryOp::BitAnd, 6, false),
        TokenKind::EqualsEquals => (BinaryOp::Eq, 7, false),
        TokenKind::ExclamationEquals => (BinaryOp::NotEq, 7, false),
        TokenKind::EqualsEqualsEquals => (BinaryOp::StrictEq, 7, false),
        TokenKind::ExclamationEqualsEquals => (BinaryOp::StrictNotEq, 7, false),
        TokenKind::Less => (BinaryOp::Less, 8, false),
        TokenKind::LessEquals => (BinaryOp::LessEq, 8, false),
        TokenKind::Greater => (BinaryOp::Greater, 8, false),
        TokenKind::GreaterEquals => (BinaryOp::GreaterEq, 8, false),
        TokenKind::Instanceof => (BinaryOp::Instanceof, 8, false),
        TokenKind::In => (BinaryOp::In, 8, false),
        TokenKind::LessLess => (BinaryOp::ShiftLeft, 9, false),
        TokenKind::GreaterGreater => (BinaryOp::ShiftRight, 9, false),
        TokenKind::GreaterGreaterGreater => (BinaryOp::ShiftRightUnsigned, 9, false),
        TokenKind::Plus => (BinaryOp::Add, 10, false),
        TokenKind::Minus => (BinaryOp::Sub, 10, false),
        TokenKind::Asterisk => (BinaryOp::Mul, 11, false),
        TokenKind::Slash => (BinaryOp::Div, 11, false),
        TokenKind::Percent => (BinaryOp::Rem, 11, false),
        TokenKind::AsteriskAsterisk => (BinaryOp::Exp, 12, true),
        _ => return None,
    })
}

/// Process escape sequences in string and template literal text.
pub(crate) fn unescape_string(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some('0') => result.push('\0'),
            Some('b') => result.push('\u{8}'),
            Some('f') => result.push('\u{c}'),
            Some('v') => result.push('\u{b}'),
            Some('u') => {
                let mut rest = chars.clone();
                if rest.next() == Some('{') {
                    let mut hex = String::new();
                    for c in rest.by_ref() {
                        if c == '}' {
                            break;
                        }
                        hex.push(c);
                    }
                    if let Some(decoded) =
                        u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                    {
                        result.push(decoded);
                        chars = rest;
                        continue;
                    }
                } else {
                    let hex: String = chars.clone().take(4).collect();
                    if hex.len() == 4
                        && let Some(decoded) =
                            u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
                    {
                        result.push(decoded);
                        for _ in 0..4 {
                            chars.next();
                        }
                        continue;
                    }
                }
                result.push('u');
            }
            Some(other) => result.push(other),
            None => break,
        }
    }
    result
}
