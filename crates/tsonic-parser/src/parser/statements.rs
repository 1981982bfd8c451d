//! Statement and declaration parsing.

use super::Parser;
use crate::ast::*;
use tsonic_common::{Span, Spanned};
use tsonic_scanner::TokenKind;

/// Modifiers collected before a declaration keyword.
#[derive(Default)]
struct Modifiers {
    export: bool,
    declare: bool,
    is_abstract: bool,
    is_async: bool,
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_statements_until(&mut self, end: TokenKind) -> Vec<Statement> {
        let mut statements = Vec::new();
        while !self.at(end) && !self.at(TokenKind::Eof) {
            let before = self.token.span;
            self.parse_statement_into(&mut statements);
            // Guarantee progress even on malformed input.
            if self.token.span == before && !self.at(end) && !self.at(TokenKind::Eof) {
                self.error_unexpected();
                self.bump();
            }
        }
        statements
    }

    pub(crate) fn parse_statement_into(&mut self, out: &mut Vec<Statement>) {
        let mut modifiers = Modifiers::default();
        loop {
            let kind = self.token.kind;
            match kind {
                TokenKind::Export if !modifiers.export => {
                    // `export {` / `export ... from` is a named-export statement
                    let checkpoint = self.checkpoint();
                    self.bump();
                    if self.at(TokenKind::OpenBrace) {
                        self.restore(checkpoint);
                        out.push(self.parse_export_named());
                        return;
                    }
                    modifiers.export = true;
                }
                TokenKind::Declare if !modifiers.declare => {
                    self.bump();
                    modifiers.declare = true;
                }
                TokenKind::Abstract if !modifiers.is_abstract => {
                    self.bump();
                    modifiers.is_abstract = true;
                }
                TokenKind::Async if !modifiers.is_async && self.is_async_function_ahead() => {
                    self.bump();
                    modifiers.is_async = true;
                }
                _ => break,
            }
        }

        let kind = self.token.kind;
        match kind {
            TokenKind::Const | TokenKind::Let | TokenKind::Var => {
                self.parse_variable_statement(&modifiers, out);
            }
            TokenKind::Function => {
                out.push(Statement::Function(self.parse_function_declaration(&modifiers)));
            }
            TokenKind::Class => {
                out.push(Statement::Class(self.parse_class_declaration(&modifiers)));
            }
            TokenKind::Interface => {
                out.push(Statement::Interface(self.parse_interface_declaration(&modifiers)));
            }
            TokenKind::Enum => {
                out.push(Statement::Enum(self.parse_enum_declaration(&modifiers)));
            }
            TokenKind::Type if !self.is_type_used_as_identifier() => {
                out.push(Statement::TypeAlias(self.parse_type_alias(&modifiers)));
            }
            TokenKind::Import if !self.is_import_expression_ahead() => {
                out.push(Statement::Import(self.parse_import_declaration()));
            }
            TokenKind::If => out.push(self.parse_if_statement()),
            TokenKind::While => out.push(self.parse_while_statement()),
            TokenKind::Do => out.push(self.parse_do_while_statement()),
            TokenKind::For => out.push(self.parse_for_statement()),
            TokenKind::Switch => out.push(self.parse_switch_statement()),
            TokenKind::Try => out.push(self.parse_try_statement()),
            TokenKind::Throw => out.push(self.parse_throw_statement()),
            TokenKind::With => out.push(self.parse_with_statement()),
            TokenKind::OpenBrace => out.push(Statement::Block(self.parse_block())),
            TokenKind::Break => {
                let span = self.bump().span;
                self.eat_semicolon();
                out.push(Statement::Break(BreakStatement { span }));
            }
            TokenKind::Continue => {
                let span = self.bump().span;
                self.eat_semicolon();
                out.push(Statement::Continue(ContinueStatement { span }));
            }
            TokenKind::Return => {
                let start = self.bump().span;
                let expression = if self.at(TokenKind::Semicolon)
                    || self.at(TokenKind::CloseBrace)
                    || self.at(TokenKind::Eof)
                {
                    None
                } else {
                    Some(self.parse_expression())
                };
                let end = expression
                    .as_ref()
                    .map_or(start, tsonic_common::Spanned::span);
                self.eat_semicolon();
                out.push(Statement::Return(ReturnStatement {
                    expression,
                    span: start.merge(end),
                }));
            }
            TokenKind::Semicolon => {
                let span = self.bump().span;
                out.push(Statement::Empty(span));
            }
            _ => {
                let expression = self.parse_expression();
                let span = expression.span();
                self.eat_semicolon();
                out.push(Statement::Expression(ExpressionStatement { expression, span }));
            }
        }
    }

    /// `async` starts a function only when `function` follows.
    fn is_async_function_ahead(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        self.bump();
        let is_function = self.at(TokenKind::Function);
        self.restore(checkpoint);
        is_function
    }

    /// Distinguish a `type X = ...` alias from `type` used as a plain
    /// identifier expression.
    fn is_type_used_as_identifier(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        self.bump();
        let is_alias = self.at_name() || self.at(TokenKind::Identifier);
        self.restore(checkpoint);
        !is_alias
    }

    /// `import(` and `import.meta` are expressions, not declarations.
    fn is_import_expression_ahead(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        self.bump();
        let is_expr = self.at(TokenKind::OpenParen) || self.at(TokenKind::Dot);
        self.restore(checkpoint);
        is_expr
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn parse_variable_statement(&mut self, modifiers: &Modifiers, out: &mut Vec<Statement>) {
        let kind_token = self.bump();
        let kind = match kind_token.kind {
            TokenKind::Const => VarKind::Const,
            TokenKind::Let => VarKind::Let,
            _ => VarKind::Var,
        };

        loop {
            let name = self.parse_pattern();
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Equals) {
                Some(self.parse_assignment_expression())
            } else {
                None
            };
            let end = initializer
                .as_ref()
                .map(Spanned::span)
                .or_else(|| type_annotation.as_ref().map(Spanned::span))
                .unwrap_or_else(|| name.bound_idents().first().map_or(kind_token.span, |i| i.span));
            out.push(Statement::Variable(VariableDeclaration {
                id: self.fresh_id(),
                kind,
                name,
                type_annotation,
                initializer,
                export: modifiers.export,
                declare: modifiers.declare,
                span: kind_token.span.merge(end),
            }));
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.eat_semicolon();
    }

    pub(crate) fn parse_pattern(&mut self) -> Pattern {
        match self.token.kind {
            TokenKind::OpenBracket => {
                let start = self.bump().span;
                let mut elements = Vec::new();
                while !self.at(TokenKind::CloseBracket) && !self.at(TokenKind::Eof) {
                    if self.eat(TokenKind::Comma) {
                        elements.push(None);
                        continue;
                    }
                    let before = self.token.span;
                    elements.push(Some(self.parse_pattern()));
                    if !self.at(TokenKind::CloseBracket) {
                        self.expect(TokenKind::Comma, ",");
                    }
                    if self.token.span == before {
                        self.bump();
                    }
                }
                let end = self.expect(TokenKind::CloseBracket, "]");
                Pattern::Array(ArrayPattern {
                    elements,
                    span: start.merge(end),
                })
            }
            TokenKind::OpenBrace => {
                let start = self.bump().span;
                let mut properties = Vec::new();
                while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
                    let key_span = self.token.span;
                    if !self.at_name() && !self.token.kind.is_keyword() && !self.at(TokenKind::StringLiteral) {
                        self.error_unexpected();
                        self.bump();
                        continue;
                    }
                    let key = self.parse_name("property name");
                    let value = if self.eat(TokenKind::Colon) {
                        self.parse_pattern()
                    } else {
                        Pattern::Ident(Ident {
                            id: self.fresh_id(),
                            name: key.clone(),
                            span: key_span,
                        })
                    };
                    let span = key_span.merge(value.bound_idents().last().map_or(key_span, |i| i.span));
                    properties.push(ObjectPatternProp { key, value, span });
                    if !self.at(TokenKind::CloseBrace) {
                        self.expect(TokenKind::Comma, ",");
                    }
                }
                let end = self.expect(TokenKind::CloseBrace, "}");
                Pattern::Object(ObjectPattern {
                    properties,
                    span: start.merge(end),
                })
            }
            _ => Pattern::Ident(self.parse_ident()),
        }
    }

    pub(crate) fn parse_ident(&mut self) -> Ident {
        if self.at_name() {
            let span = self.token.span;
            let name = self.token_text().to_string();
            self.bump();
            Ident {
                id: self.fresh_id(),
                name,
                span,
            }
        } else {
            self.error_at(self.token.span, tsonic_common::diagnostics::codes::EXPECTED_TOKEN, &["identifier"]);
            Ident {
                id: self.fresh_id(),
                name: String::new(),
                span: self.token.span,
            }
        }
    }

    /// Parse a plain name (identifier, contextual keyword, or string literal
    /// in property positions).
    pub(crate) fn parse_name(&mut self, expected: &str) -> String {
        if self.at_name() || self.token.kind.is_keyword() {
            let text = self.token_text().to_string();
            self.bump();
            text
        } else if self.at(TokenKind::StringLiteral) {
            let text = self.token_text();
            let unquoted = text[1..text.len().saturating_sub(1)].to_string();
            self.bump();
            unquoted
        } else {
            self.error_at(
                self.token.span,
                tsonic_common::diagnostics::codes::EXPECTED_TOKEN,
                &[expected],
            );
            String::new()
        }
    }

    fn parse_function_declaration(&mut self, modifiers: &Modifiers) -> FunctionDeclaration {
        let start = self.expect(TokenKind::Function, "function");
        let is_generator = self.eat(TokenKind::Asterisk);
        let name = self.parse_ident();
        let type_params = self.parse_type_params();
        let params = self.parse_params();
        let return_type = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let body = if self.at(TokenKind::OpenBrace) {
            Some(self.parse_block())
        } else {
            self.eat_semicolon();
            None
        };
        let end = body.as_ref().map_or(name.span, |b| b.span);
        FunctionDeclaration {
            id: self.fresh_id(),
            name,
            is_async: modifiers.is_async,
            is_generator,
            type_params,
            params,
            return_type,
            body,
            export: modifiers.export,
            declare: modifiers.declare,
            span: start.merge(end),
        }
    }

    pub(crate) fn parse_type_params(&mut self) -> Vec<TypeParam> {
        let mut params = Vec::new();
        if !self.eat(TokenKind::Less) {
            return params;
        }
        while !self.at(TokenKind::Greater) && !self.at(TokenKind::Eof) {
            let before = self.token.span;
            let name = self.parse_ident();
            let constraint = if self.eat(TokenKind::Extends) {
                Some(self.parse_type())
            } else {
                None
            };
            let default = if self.eat(TokenKind::Equals) {
                Some(self.parse_type())
            } else {
                None
            };
            let span = name.span;
            params.push(TypeParam {
                id: self.fresh_id(),
                name,
                constraint,
                default,
                span,
            });
            if !self.at(TokenKind::Greater) {
                self.expect(TokenKind::Comma, ",");
            }
            if self.token.span == before {
                self.bump();
            }
        }
        self.expect(TokenKind::Greater, ">");
        params
    }

    pub(crate) fn parse_params(&mut self) -> Vec<Param> {
        let mut params = Vec::new();
        self.expect(TokenKind::OpenParen, "(");
        while !self.at(TokenKind::CloseParen) && !self.at(TokenKind::Eof) {
            let before = self.token.span;
            params.push(self.parse_param());
            if !self.at(TokenKind::CloseParen) {
                self.expect(TokenKind::Comma, ",");
            }
            if self.token.span == before {
                self.bump();
            }
        }
        self.expect(TokenKind::CloseParen, ")");
        params
    }

    pub(crate) fn parse_param(&mut self) -> Param {
        let is_rest = self.eat(TokenKind::DotDotDot);
        // Parameter visibility modifiers are accepted and ignored here;
        // constructor parameter properties are not in the input subset.
        while matches!(
            self.token.kind,
            TokenKind::Public | TokenKind::Private | TokenKind::Protected | TokenKind::Readonly
        ) {
            self.bump();
        }
        let name = self.parse_ident();
        let optional = self.eat(TokenKind::Question);
        let type_annotation = if self.eat(TokenKind::Colon) {
            Some(self.parse_type())
        } else {
            None
        };
        let initializer = if self.eat(TokenKind::Equals) {
            Some(self.parse_assignment_expression())
        } else {
            None
        };
        let span = name.span;
        Param {
            id: self.fresh_id(),
            name,
            type_annotation,
            optional,
            is_rest,
            initializer,
            span,
        }
    }

    fn parse_class_declaration(&mut self, modifiers: &Modifiers) -> ClassDeclaration {
        let start = self.expect(TokenKind::Class, "class");
        let name = self.parse_ident();
        let type_params = self.parse_type_params();
        let extends = if self.eat(TokenKind::Extends) {
            Some(self.parse_type())
        } else {
            None
        };
        let mut implements = Vec::new();
        if self.eat(TokenKind::Implements) {
            loop {
                implements.push(self.parse_type());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::OpenBrace, "{");
        let mut members = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            if self.eat(TokenKind::Semicolon) {
                continue;
            }
            let before = self.token.span;
            members.push(self.parse_class_member());
            if self.token.span == before {
                self.error_unexpected();
                self.bump();
                members.pop();
            }
        }
        let end = self.expect(TokenKind::CloseBrace, "}");
        ClassDeclaration {
            id: self.fresh_id(),
            name,
            type_params,
            extends,
            implements,
            members,
            is_abstract: modifiers.is_abstract,
            export: modifiers.export,
            span: start.merge(end),
        }
    }

    fn parse_class_member(&mut self) -> ClassMember {
        let start = self.token.span;
        let mut visibility = Visibility::Public;
        let mut is_static = false;
        let mut is_readonly = false;
        let mut is_async = false;
        loop {
            let kind = self.token.kind;
            match kind {
                TokenKind::Public => {
                    self.bump();
                }
                TokenKind::Private => {
                    visibility = Visibility::Private;
                    self.bump();
                }
                TokenKind::Protected => {
                    visibility = Visibility::Protected;
                    self.bump();
                }
                TokenKind::Static if !is_static => {
                    is_static = true;
                    self.bump();
                }
                TokenKind::Readonly if !is_readonly && !self.is_member_name_ahead() => {
                    is_readonly = true;
                    self.bump();
                }
                TokenKind::Async if !is_async && !self.is_member_name_ahead() => {
                    is_async = true;
                    self.bump();
                }
                TokenKind::Abstract => {
                    self.bump();
                }
                _ => break,
            }
        }

        let mut kind = MethodKind::Method;
        if (self.at(TokenKind::Get) || self.at(TokenKind::Set)) && !self.is_member_name_ahead() {
            kind = if self.at(TokenKind::Get) {
                MethodKind::Getter
            } else {
                MethodKind::Setter
            };
            self.bump();
        }

        let is_generator = self.eat(TokenKind::Asterisk);
        let name = self.parse_name("member name");
        if name == "constructor" && kind == MethodKind::Method {
            kind = MethodKind::Constructor;
        }

        if self.at(TokenKind::OpenParen) || self.at(TokenKind::Less) {
            let type_params = self.parse_type_params();
            let params = self.parse_params();
            let return_type = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            let body = if self.at(TokenKind::OpenBrace) {
                Some(self.parse_block())
            } else {
                self.eat_semicolon();
                None
            };
            let end = body.as_ref().map_or(start, |b| b.span);
            ClassMember::Method(MethodMember {
                id: self.fresh_id(),
                name,
                kind,
                visibility,
                is_static,
                is_async,
                is_generator,
                type_params,
                params,
                return_type,
                body,
                span: start.merge(end),
            })
        } else {
            let optional = self.eat(TokenKind::Question);
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Equals) {
                Some(self.parse_assignment_expression())
            } else {
                None
            };
            self.eat_semicolon();
            let end = initializer
                .as_ref()
                .map(Spanned::span)
                .or_else(|| type_annotation.as_ref().map(Spanned::span))
                .unwrap_or(start);
            ClassMember::Property(PropertyMember {
                id: self.fresh_id(),
                name,
                visibility,
                is_static,
                is_readonly,
                optional,
                type_annotation,
                initializer,
                span: start.merge(end),
            })
        }
    }

    /// Check whether the current modifier-like keyword is actually a member
    /// name (`readonly: string` or `async() {}`).
    fn is_member_name_ahead(&mut self) -> bool {
        let checkpoint = self.checkpoint();
        self.bump();
        let is_name = matches!(
            self.token.kind,
            TokenKind::Colon
                | TokenKind::Question
                | TokenKind::OpenParen
                | TokenKind::Equals
                | TokenKind::Semicolon
                | TokenKind::Less
        );
        self.restore(checkpoint);
        is_name
    }

    fn parse_interface_declaration(&mut self, modifiers: &Modifiers) -> InterfaceDeclaration {
        let start = self.expect(TokenKind::Interface, "interface");
        let name = self.parse_ident();
        let type_params = self.parse_type_params();
        let mut extends = Vec::new();
        if self.eat(TokenKind::Extends) {
            loop {
                extends.push(self.parse_type());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        let (members, end) = self.parse_type_member_block();
        InterfaceDeclaration {
            id: self.fresh_id(),
            name,
            type_params,
            extends,
            members,
            export: modifiers.export,
            span: start.merge(end),
        }
    }

    fn parse_enum_declaration(&mut self, modifiers: &Modifiers) -> EnumDeclaration {
        let start = self.expect(TokenKind::Enum, "enum");
        let name = self.parse_ident();
        self.expect(TokenKind::OpenBrace, "{");
        let mut members = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let span = self.token.span;
            if !self.at_name() && !self.token.kind.is_keyword() && !self.at(TokenKind::StringLiteral)
            {
                self.error_unexpected();
                self.bump();
                continue;
            }
            let member_name = self.parse_name("enum member");
            let initializer = if self.eat(TokenKind::Equals) {
                Some(self.parse_assignment_expression())
            } else {
                None
            };
            members.push(EnumMember {
                name: member_name,
                initializer,
                span,
            });
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        let end = self.expect(TokenKind::CloseBrace, "}");
        EnumDeclaration {
            id: self.fresh_id(),
            name,
            members,
            export: modifiers.export,
            span: start.merge(end),
        }
    }

    fn parse_type_alias(&mut self, modifiers: &Modifiers) -> TypeAliasDeclaration {
        let start = self.expect(TokenKind::Type, "type");
        let name = self.parse_ident();
        let type_params = self.parse_type_params();
        self.expect(TokenKind::Equals, "=");
        let ty = self.parse_type();
        let end = ty.span();
        self.eat_semicolon();
        TypeAliasDeclaration {
            id: self.fresh_id(),
            name,
            type_params,
            ty,
            export: modifiers.export,
            span: start.merge(end),
        }
    }

    fn parse_import_declaration(&mut self) -> ImportDeclaration {
        let start = self.expect(TokenKind::Import, "import");
        let mut specifiers = Vec::new();
        let mut namespace = None;

        if self.at(TokenKind::StringLiteral) {
            // `import "System"` - bare side-effect/namespace import
            let text = self.token_text();
            let module = text[1..text.len().saturating_sub(1)].to_string();
            let end = self.bump().span;
            self.eat_semicolon();
            return ImportDeclaration {
                specifiers,
                namespace,
                module,
                span: start.merge(end),
            };
        }

        if self.eat(TokenKind::Asterisk) {
            self.expect(TokenKind::As, "as");
            namespace = Some(self.parse_ident());
        } else {
            self.expect(TokenKind::OpenBrace, "{");
            while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
                let span = self.token.span;
                if !self.at_name() && !self.token.kind.is_keyword() {
                    self.error_unexpected();
                    self.bump();
                    continue;
                }
                let imported = self.parse_name("import name");
                let local = if self.eat(TokenKind::As) {
                    self.parse_ident()
                } else {
                    Ident {
                        id: self.fresh_id(),
                        name: imported.clone(),
                        span,
                    }
                };
                specifiers.push(ImportSpecifier {
                    imported,
                    local,
                    span,
                });
                if !self.at(TokenKind::CloseBrace) {
                    self.expect(TokenKind::Comma, ",");
                }
            }
            self.expect(TokenKind::CloseBrace, "}");
        }

        self.expect(TokenKind::From, "from");
        let text = self.token_text();
        let module = if self.at(TokenKind::StringLiteral) {
            text[1..text.len().saturating_sub(1)].to_string()
        } else {
            String::new()
        };
        let end = self.expect(TokenKind::StringLiteral, "module specifier");
        self.eat_semicolon();
        ImportDeclaration {
            specifiers,
            namespace,
            module,
            span: start.merge(end),
        }
    }

    fn parse_export_named(&mut self) -> Statement {
        let start = self.expect(TokenKind::Export, "export");
        self.expect(TokenKind::OpenBrace, "{");
        let mut specifiers = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let span = self.token.span;
            if !self.at_name() && !self.token.kind.is_keyword() {
                self.error_unexpected();
                self.bump();
                continue;
            }
            let local = self.parse_name("export name");
            let exported = if self.eat(TokenKind::As) {
                self.parse_name("export alias")
            } else {
                local.clone()
            };
            specifiers.push(ExportSpecifier {
                local,
                exported,
                span,
            });
            if !self.at(TokenKind::CloseBrace) {
                self.expect(TokenKind::Comma, ",");
            }
        }
        let mut end = self.expect(TokenKind::CloseBrace, "}");
        let source = if self.eat(TokenKind::From) {
            let text = self.token_text();
            let module = if self.at(TokenKind::StringLiteral) {
                text[1..text.len().saturating_sub(1)].to_string()
            } else {
                String::new()
            };
            end = self.expect(TokenKind::StringLiteral, "module specifier");
            Some(module)
        } else {
            None
        };
        self.eat_semicolon();
        Statement::ExportNamed(ExportNamedDeclaration {
            specifiers,
            source,
            span: start.merge(end),
        })
    }

    // =========================================================================
    // Control flow
    // =========================================================================

    pub(crate) fn parse_block(&mut self) -> Block {
        let start = self.expect(TokenKind::OpenBrace, "{");
        let statements = self.parse_statements_until(TokenKind::CloseBrace);
        let end = self.expect(TokenKind::CloseBrace, "}");
        Block {
            statements,
            span: start.merge(end),
        }
    }

    fn parse_embedded_statement(&mut self) -> Statement {
        let mut out = Vec::new();
        self.parse_statement_into(&mut out);
        match out.len() {
            0 => Statement::Empty(self.token.span),
            1 => out.remove(0),
            _ => {
                // `if (c) let a = 1, b = 2;` - wrap multi-declarator bodies
                let span = out[0].span().merge(out[out.len() - 1].span());
                Statement::Block(Block {
                    statements: out,
                    span,
                })
            }
        }
    }

    fn parse_if_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::If, "if");
        self.expect(TokenKind::OpenParen, "(");
        let condition = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        let then_branch = Box::new(self.parse_embedded_statement());
        let else_branch = if self.eat(TokenKind::Else) {
            Some(Box::new(self.parse_embedded_statement()))
        } else {
            None
        };
        let end = else_branch
            .as_ref()
            .map_or(then_branch.span(), |e| e.span());
        Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
            span: start.merge(end),
        })
    }

    fn parse_while_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::While, "while");
        self.expect(TokenKind::OpenParen, "(");
        let condition = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        let body = Box::new(self.parse_embedded_statement());
        let end = body.span();
        Statement::While(WhileStatement {
            condition,
            body,
            span: start.merge(end),
        })
    }

    fn parse_do_while_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::Do, "do");
        let body = Box::new(self.parse_embedded_statement());
        self.expect(TokenKind::While, "while");
        self.expect(TokenKind::OpenParen, "(");
        let condition = self.parse_expression();
        let end = self.expect(TokenKind::CloseParen, ")");
        self.eat_semicolon();
        Statement::DoWhile(DoWhileStatement {
            body,
            condition,
            span: start.merge(end),
        })
    }

    fn parse_for_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::For, "for");
        self.expect(TokenKind::OpenParen, "(");

        // for-of / for-in with a declaring binding
        if matches!(
            self.token.kind,
            TokenKind::Const | TokenKind::Let | TokenKind::Var
        ) {
            let kind = match self.bump().kind {
                TokenKind::Const => VarKind::Const,
                TokenKind::Let => VarKind::Let,
                _ => VarKind::Var,
            };
            let binding = self.parse_pattern();
            if self.eat(TokenKind::Of) {
                return self.finish_for_of(start, Some(kind), binding);
            }
            if self.eat(TokenKind::In) {
                return self.finish_for_in(start, Some(kind), binding);
            }
            // Classic for with declaration init
            let type_annotation = if self.eat(TokenKind::Colon) {
                Some(self.parse_type())
            } else {
                None
            };
            let initializer = if self.eat(TokenKind::Equals) {
                Some(self.parse_assignment_expression())
            } else {
                None
            };
            let decl_span = binding.bound_idents().first().map_or(start, |i| i.span);
            let mut init_decls = vec![VariableDeclaration {
                id: self.fresh_id(),
                kind,
                name: binding,
                type_annotation,
                initializer,
                export: false,
                declare: false,
                span: decl_span,
            }];
            while self.eat(TokenKind::Comma) {
                let name = self.parse_pattern();
                let type_annotation = if self.eat(TokenKind::Colon) {
                    Some(self.parse_type())
                } else {
                    None
                };
                let initializer = if self.eat(TokenKind::Equals) {
                    Some(self.parse_assignment_expression())
                } else {
                    None
                };
                let span = name.bound_idents().first().map_or(start, |i| i.span);
                init_decls.push(VariableDeclaration {
                    id: self.fresh_id(),
                    kind,
                    name,
                    type_annotation,
                    initializer,
                    export: false,
                    declare: false,
                    span,
                });
            }
            self.expect(TokenKind::Semicolon, ";");
            // Multi-declarator for-inits keep the first declarator in the IR
            // header; the rest precede the loop. The builder handles this.
            let init = Some(ForInit::Variable(init_decls.remove(0)));
            let mut prologue: Vec<Statement> =
                init_decls.into_iter().map(Statement::Variable).collect();
            let for_stmt = self.finish_classic_for(start, init);
            if prologue.is_empty() {
                for_stmt
            } else {
                let span = start.merge(for_stmt.span());
                prologue.push(for_stmt);
                Statement::Block(Block {
                    statements: prologue,
                    span,
                })
            }
        } else if self.at(TokenKind::Semicolon) {
            self.bump();
            self.finish_classic_for(start, None)
        } else {
            let expr = self.parse_expression();
            if self.eat(TokenKind::Of) {
                let binding = expression_to_pattern(self, expr);
                return self.finish_for_of(start, None, binding);
            }
            if self.eat(TokenKind::In) {
                let binding = expression_to_pattern(self, expr);
                return self.finish_for_in(start, None, binding);
            }
            self.expect(TokenKind::Semicolon, ";");
            self.finish_classic_for(start, Some(ForInit::Expression(expr)))
        }
    }

    fn finish_classic_for(&mut self, start: Span, init: Option<ForInit>) -> Statement {
        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::Semicolon, ";");
        let update = if self.at(TokenKind::CloseParen) {
            None
        } else {
            Some(self.parse_expression())
        };
        self.expect(TokenKind::CloseParen, ")");
        let body = Box::new(self.parse_embedded_statement());
        let end = body.span();
        Statement::For(ForStatement {
            init,
            condition,
            update,
            body,
            span: start.merge(end),
        })
    }

    fn finish_for_of(&mut self, start: Span, decl_kind: Option<VarKind>, binding: Pattern) -> Statement {
        let iterable = self.parse_assignment_expression();
        self.expect(TokenKind::CloseParen, ")");
        let body = Box::new(self.parse_embedded_statement());
        let end = body.span();
        Statement::ForOf(ForOfStatement {
            decl_kind,
            binding,
            iterable,
            body,
            span: start.merge(end),
        })
    }

    fn finish_for_in(&mut self, start: Span, decl_kind: Option<VarKind>, binding: Pattern) -> Statement {
        let object = self.parse_assignment_expression();
        self.expect(TokenKind::CloseParen, ")");
        let body = Box::new(self.parse_embedded_statement());
        let end = body.span();
        Statement::ForIn(ForInStatement {
            decl_kind,
            binding,
            object,
            body,
            span: start.merge(end),
        })
    }

    fn parse_switch_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::Switch, "switch");
        self.expect(TokenKind::OpenParen, "(");
        let discriminant = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        self.expect(TokenKind::OpenBrace, "{");
        let mut cases = Vec::new();
        while !self.at(TokenKind::CloseBrace) && !self.at(TokenKind::Eof) {
            let case_start = self.token.span;
            let test = if self.eat(TokenKind::Case) {
                let test = self.parse_expression();
                self.expect(TokenKind::Colon, ":");
                Some(test)
            } else {
                self.expect(TokenKind::Default, "default");
                self.expect(TokenKind::Colon, ":");
                None
            };
            let mut statements = Vec::new();
            while !matches!(
                self.token.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::CloseBrace | TokenKind::Eof
            ) {
                let before = self.token.span;
                self.parse_statement_into(&mut statements);
                if self.token.span == before {
                    break;
                }
            }
            let end = statements.last().map_or(case_start, Spanned::span);
            cases.push(SwitchCase {
                test,
                statements,
                span: case_start.merge(end),
            });
        }
        let end = self.expect(TokenKind::CloseBrace, "}");
        Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span: start.merge(end),
        })
    }

    fn parse_try_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::Try, "try");
        let block = self.parse_block();
        let catch = if self.eat(TokenKind::Catch) {
            let catch_start = self.token.span;
            let param = if self.eat(TokenKind::OpenParen) {
                let ident = self.parse_ident();
                self.expect(TokenKind::CloseParen, ")");
                Some(ident)
            } else {
                None
            };
            let body = self.parse_block();
            let span = catch_start.merge(body.span);
            Some(CatchClause {
                param_id: self.fresh_id(),
                param,
                body,
                span,
            })
        } else {
            None
        };
        let finally = if self.eat(TokenKind::Finally) {
            Some(self.parse_block())
        } else {
            None
        };
        let end = finally
            .as_ref()
            .map(|b| b.span)
            .or_else(|| catch.as_ref().map(|c| c.span))
            .unwrap_or(block.span);
        Statement::Try(TryStatement {
            block,
            catch,
            finally,
            span: start.merge(end),
        })
    }

    fn parse_throw_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::Throw, "throw");
        let expression = self.parse_expression();
        let end = expression.span();
        self.eat_semicolon();
        Statement::Throw(ThrowStatement {
            expression,
            span: start.merge(end),
        })
    }

    fn parse_with_statement(&mut self) -> Statement {
        let start = self.expect(TokenKind::With, "with");
        self.expect(TokenKind::OpenParen, "(");
        let object = self.parse_expression();
        self.expect(TokenKind::CloseParen, ")");
        let body = Box::new(self.parse_embedded_statement());
        let end = body.span();
        Statement::With(WithStatement {
            object,
            body,
            span: start.merge(end),
        })
    }
}

/// Reinterpret an already-parsed expression as a for-of/for-in binding
/// (`for (x of xs)` parses `x` as an expression first).
fn expression_to_pattern(parser: &mut Parser<'_>, expr: Expression) -> Pattern {
    match expr {
        Expression::Ident(ident) => Pattern::Ident(ident),
        other => {
            parser.error_at(
                other.span(),
                tsonic_common::diagnostics::codes::EXPECTED_TOKEN,
                &["binding identifier"],
            );
            Pattern::Ident(Ident {
                id: parser.fresh_id(),
                name: String::new(),
                span: other.span(),
            })
        }
    }
}
