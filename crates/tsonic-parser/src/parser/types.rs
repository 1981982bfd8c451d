//! Type syntax parsing.

use super::Parser;
use crate::ast::*;
use tsonic_common::numeric::parse_numeric_literal_value;
use tsonic_common::{Span, Spanned};
use tsonic_scanner::TokenKind;

impl<'a> Parser<'a> {
    pub(crate) fn parse_type(&mut self) -> TypeNode {
        // Leading `|` is allowed on unions
        self.eat(TokenKind::Bar);
        let first = self.parse_intersection_type();
        if !self.at(TokenKind::Bar) {
            return first;
        }
        let mut types = vec![first];
        while self.eat(TokenKind::Bar) {
            types.push(self.parse_intersection_type());
        }
        let span = types[0].span().merge(types[types.len() - 1].span());
        TypeNode::Union(UnionTypeNode { types, span })
    }

    fn parse_intersection_type(&mut self) -> TypeNode {
        let first = self.parse_postfix_type();
        if !self.at(TokenKind::Ampersand) {
            return first;
        }
        let mut types = vec![first];
        while self.eat(TokenKind::Ampersand) {
            types.push(self.parse_postfix_type());
        }
        let span = types[0].span().merge(types[types.len() - 1].span());
        TypeNode::Intersection(IntersectionTypeNode { types, span })
    }

    fn parse_postfix_type(&mut self) -> TypeNode {
        let mut ty = self.parse_primary_type();
        while self.at(TokenKind::OpenBracket) {
            let checkpoint = self.checkpoint();
            self.bump();
            if self.eat(TokenKind::CloseBracket) {
                let span = ty.span();
                ty = TypeNode::Array(ArrayTypeNode {
                    element: Box::new(ty),
                    span,
                });
            } else {
                // Indexed access types are not in the input subset
                self.restore(checkpoint);
                break;
            }
        }
        ty
    }

    fn parse_primary_type(&mut self) -> TypeNode {
        match self.token.kind {
            TokenKind::OpenParen => self.parse_paren_or_function_type(),
            TokenKind::Less => self.parse_generic_function_type(),
            TokenKind::OpenBrace => {
                let start = self.token.span;
                let (members, end) = self.parse_type_member_block();
                TypeNode::Object(ObjectTypeNode {
                    members,
                    span: start.merge(end),
                })
            }
            TokenKind::OpenBracket => {
                let start = self.bump().span;
                let mut elements = Vec::new();
                while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::Eof) {
                    let before = self.token.span;
                    elements.push(self.parse_type());
                    if !self.at(TokenKind::CloseBracket) {
                        self.expect(TokenKind::Comma, ",");
                    }
                    if self.token.span == before {
                        self.bump();
                    }
                }
                let end = self.expect(TokenKind::CloseBracket, "]");
                TypeNode::Tuple(TupleTypeNode {
                    elements,
                    span: start.merge(end),
                })
            }
            TokenKind::StringLiteral => {
                let raw = self.token_text();
                let value = raw[1..raw.len().saturating_sub(1)].to_string();
                let span = self.bump().span;
                TypeNode::Literal(LiteralTypeNode {
                    value: LitValue::String(value),
                    span,
                })
            }
            TokenKind::NumericLiteral => {
                let value = parse_numeric_literal_value(self.token_text()).unwrap_or(0.0);
                let span = self.bump().span;
                TypeNode::Literal(LiteralTypeNode {
                    value: LitValue::Number(value),
                    span,
                })
            }
            TokenKind::Minus => {
                let start = self.bump().span;
                let value = parse_numeric_literal_value(self.token_text()).unwrap_or(0.0);
                let end = self.expect(TokenKind::NumericLiteral, "number");
                TypeNode::Literal(LiteralTypeNode {
                    value: LitValue::Number(-value),
                    span: start.merge(end),
                })
            }
            TokenKind::True | TokenKind::False => {
                let value = self.at(TokenKind::True);
                let span = self.bump().span;
                TypeNode::Literal(LiteralTypeNode {
                    value: LitValue::Bool(value),
                    span,
                })
            }
            TokenKind::Null => {
                let span = self.bump().span;
                TypeNode::Literal(LiteralTypeNode {
                    value: LitValue::Null,
                    span,
                })
            }
            TokenKind::Undefined | TokenKind::Void => {
                // `void` and `undefined` both surface as the undefined type
                let name = self.token_text().to_string();
                let span = self.bump().span;
                TypeNode::Ref(TypeRef {
                    head: Ident {
                        id: self.fresh_id(),
                        name,
                        span,
                    },
                    rest: Vec::new(),
                    type_args: Vec::new(),
                    span,
                })
            }
            _ => self.parse_type_reference(),
        }
    }

    fn parse_type_reference(&mut self) -> TypeNode {
        let head = self.parse_ident();
        let start = head.span;
        let mut rest = Vec::new();
        let mut end = start;
        while self.at(TokenKind::Dot) {
            self.bump();
            end = self.token.span;
            rest.push(self.parse_name("type name"));
        }
        let type_args = if self.at(TokenKind::Less) {
            self.parse_type_args(&mut end)
        } else {
            Vec::new()
        };
        TypeNode::Ref(TypeRef {
            head,
            rest,
            type_args,
            span: start.merge(end),
        })
    }

    fn parse_type_args(&mut self, end: &mut Span) -> Vec<TypeNode> {
        self.expect(TokenKind::Less, "<");
        let mut args = Vec::new();
        while !self.at(TokenKind::Greater) && !self.at(TokenKind::Eof) {
            let before = self.token.span;
            args.push(self.parse_type());
            if !self.at(TokenKind::Greater) {
                self.expect(TokenKind::Comma, ",");
            }
            if self.token.span == before {
                self.bump();
            }
        }
        *end = self.expect(TokenKind::Greater, ">");
        args
    }

    /// `(` starts either a function type `(a: T) => U` or a parenthesized
    /// type `(T | U)`.
    fn parse_paren_or_function_type(&mut self) -> TypeNode {
        let checkpoint = self.checkpoint();
        let start = self.token.span;

        // Try a function type first.
        let params = self.parse_params();
        if self.at(TokenKind::Arrow) {
            self.bump();
            let return_type = self.parse_type();
            let span = start.merge(return_type.span());
            return TypeNode::Function(FunctionTypeNode {
                params,
                return_type: Box::new(return_type),
                span,
            });
        }

        self.restore(checkpoint);
        self.expect(TokenKind::OpenParen, "(");
        let inner = self.parse_type();
        self.expect(TokenKind::CloseParen, ")");
        TypeNode::Paren(Box::new(inner))
    }

    /// `<T>(a: T) => U` - generic function type.
    fn parse_generic_function_type(&mut self) -> TypeNode {
        let start = self.token.span;
        // Type parameters of function *types* are not representable in the
        // IR's function type; parse and flatten them into the signature.
        let _type_params = self.parse_type_params();
        let params = self.parse_params();
        self.expect(TokenKind::Arrow, "=>");
        let return_type = self.parse_type();
        let span = start.merge(return_type.span());
        TypeNode::Function(FunctionTypeNode {
            params,
            return_type: Box::new(return_type),
            span,
        })
    }

    /// `{ ... }` member block shared by interfaces and inline object types.
    /// Returns the members and the closing brace span.
    pub(crate) fn parse_type_member_block(&mut self) -> (Vec<TypeMember>, Span) {
        self.expect(TokenKind::OpenBrace, "{");
        let mut members = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) || self.eat(TokenKind::Comma) {
                continue;
            }
            let before = self.token.span;
            members.push(self.parse_type_member());
            if self.token.span == before {
                self.error_unexpected();
                self.bump();
                members.pop();
            }
        }
        let end = self.expect(TokenKind::CloseBrace, "}");
        (members, end)
    }

    fn parse_type_member(&mut self) -> TypeMember {
        let start = self.token.span;
        let readonly = if self.at(TokenKind::Readonly) {
            let checkpoint = self.checkpoint();
            self.bump();
            if self.at(TokenKind::Colon)
                || self.at(TokenKind::Question)
                || self.at(TokenKind::OpenParen)
            {
                // `readonly` is the member name here
                self.restore(checkpoint);
                false
            } else {
                true
            }
        } else {
            false
        };

        // Index signature: `[key: string]: T`
        if self.at(TokenKind::OpenBracket) {
            self.bump();
            let key_name = self.parse_name("index parameter");
            self.expect(TokenKind::Colon, ":");
            let key_type = self.parse_type();
            self.expect(TokenKind::CloseBracket, "]");
            self.expect(TokenKind::Colon, ":");
            let value_type = self.parse_type();
            let span = start.merge(value_type.span());
            self.eat_semicolon();
            return TypeMember::Index(IndexSignature {
                key_name,
                key_type,
                value_type,
                readonly,
                span,
            });
        }

        let name = self.parse_name("member name");
        let optional = self.eat(TokenKind::Question);

        if self.at(TokenKind::OpenParen) || self.at(TokenKind::Less) {
            let type_params = self.parse_type_params();
            let params = self.parse_params();
            let return_type = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            let end = return_type.as_ref().map_or(start, Spanned::span);
            self.eat_semicolon();
            return TypeMember::Method(MethodSignature {
                name,
                optional,
                type_params,
                params,
                return_type,
                span: start.merge(end),
            });
        }

        let type_annotation = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let end = type_annotation.as_ref().map_or(start, Spanned::span);
        self.eat_semicolon();
        TypeMember::Property(PropertySignature {
            name,
            optional,
            readonly,
            type_annotation,
            span: start.merge(end),
        })
    }
}
