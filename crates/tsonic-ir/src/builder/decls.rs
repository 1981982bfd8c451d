//! Declaration conversion: types, interfaces, classes, enums, aliases,
//! functions, variables, and catalogue registration.

use super::{ImportedName, LoweredGenericSignature, ModuleBuilder};
use crate::model::*;
use indexmap::IndexMap;
use tsonic_common::diagnostics::codes;
use tsonic_common::{NumericKind, Spanned};
use tsonic_parser::ast;
use tsonic_types::{
    HeritageEdge, HeritageKind, IrObjectMember, IrParamType, IrType, MemberInfo, NominalKind,
    TypeEntry, TypeId, UnifiedTypeCatalog,
};

/// Parameter passing wrappers: `ref<T>`, `out<T>`, `in<T>`, `inref<T>`.
fn passing_for_wrapper(name: &str) -> Option<ParamPassing> {
    Some(match name {
        "ref" => ParamPassing::Ref,
        "out" => ParamPassing::Out,
        "in" => ParamPassing::In,
        "inref" => ParamPassing::InRef,
        _ => return None,
    })
}

/// The `struct` marker interface brands value types.
fn is_struct_marker_name(name: &str) -> bool {
    name == "struct" || name == "Struct"
}

/// An interface *declaration* is the marker itself when it has exactly the
/// single `__brand` member.
fn is_struct_marker_decl(iface: &ast::InterfaceDeclaration) -> bool {
    is_struct_marker_name(&iface.name.name)
        && iface.members.len() == 1
        && matches!(
            &iface.members[0],
            ast::TypeMember::Property(p) if p.name == "__brand"
        )
}

impl<'a> ModuleBuilder<'a> {
    // =========================================================================
    // Catalogue registration
    // =========================================================================

    /// Register this module's nominal declarations into the shared
    /// catalogue. Runs before any module body is built.
    pub(crate) fn register_module_types(&mut self, catalog: &mut UnifiedTypeCatalog) {
        let file = self.file;
        for statement in &file.statements {
            match statement {
                ast::Statement::Interface(iface) => {
                    if is_struct_marker_decl(iface) || Self::index_signature_only(iface) {
                        continue;
                    }
                    self.push_type_params(&iface.type_params);
                    let mut members = IndexMap::new();
                    for member in &iface.members {
                        if let Some(info) = self.member_info(member) {
                            members.insert(info.name.clone(), info);
                        }
                    }
                    let heritage = self.heritage_edges(&iface.extends, &[]);
                    let is_struct = self.extends_has_struct_marker(&iface.extends);
                    self.pop_type_params();
                    catalog.register(TypeEntry {
                        id: TypeId::new(self.local_stable_id(&iface.name.name)),
                        name: iface.name.name.clone(),
                        type_params: iface
                            .type_params
                            .iter()
                            .map(|p| p.name.name.clone())
                            .collect(),
                        members,
                        heritage,
                        kind: NominalKind::Interface,
                        is_struct,
                    });
                }
                ast::Statement::Class(class) => {
                    self.push_type_params(&class.type_params);
                    let mut members = IndexMap::new();
                    for member in &class.members {
                        if let Some(info) = self.class_member_info(member) {
                            members.insert(info.name.clone(), info);
                        }
                    }
                    let extends: Vec<ast::TypeNode> =
                        class.extends.iter().cloned().collect();
                    let heritage = self.heritage_edges(&extends, &class.implements);
                    let is_struct = self.extends_has_struct_marker(&extends);
                    self.pop_type_params();
                    catalog.register(TypeEntry {
                        id: TypeId::new(self.local_stable_id(&class.name.name)),
                        name: class.name.name.clone(),
                        type_params: class
                            .type_params
                            .iter()
                            .map(|p| p.name.name.clone())
                            .collect(),
                        members,
                        heritage,
                        kind: NominalKind::Class,
                        is_struct,
                    });
                }
                ast::Statement::Enum(decl) => {
                    let mut members = IndexMap::new();
                    for member in &decl.members {
                        members.insert(
                            member.name.clone(),
                            MemberInfo {
                                name: member.name.clone(),
                                ty: IrType::primitive("int"),
                                optional: false,
                                readonly: true,
                                is_method: false,
                            },
                        );
                    }
                    catalog.register(TypeEntry {
                        id: TypeId::new(self.local_stable_id(&decl.name.name)),
                        name: decl.name.name.clone(),
                        type_params: Vec::new(),
                        members,
                        heritage: Vec::new(),
                        kind: NominalKind::Enum,
                        is_struct: false,
                    });
                }
                _ => {}
            }
        }
    }

    pub(crate) fn register_synthetic(
        &self,
        catalog: &mut UnifiedTypeCatalog,
        synthetic: &IrInterfaceDeclaration,
    ) {
        let mut members = IndexMap::new();
        for member in &synthetic.members {
            if let IrInterfaceMember::Property(prop) = member {
                members.insert(
                    prop.name.clone(),
                    MemberInfo {
                        name: prop.name.clone(),
                        ty: prop.ty.clone(),
                        optional: prop.optional,
                        readonly: prop.readonly,
                        is_method: false,
                    },
                );
            }
        }
        catalog.register(TypeEntry {
            id: TypeId::new(self.local_stable_id(&synthetic.name)),
            name: synthetic.name.clone(),
            type_params: synthetic.type_params.iter().map(|p| p.name.clone()).collect(),
            members,
            heritage: Vec::new(),
            kind: NominalKind::Interface,
            is_struct: false,
        });
    }

    fn member_info(&mut self, member: &ast::TypeMember) -> Option<MemberInfo> {
        match member {
            ast::TypeMember::Property(prop) => Some(MemberInfo {
                name: prop.name.clone(),
                ty: prop
                    .type_annotation
                    .as_ref()
                    .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                optional: prop.optional,
                readonly: prop.readonly,
                is_method: false,
            }),
            ast::TypeMember::Method(method) => {
                let ty = self.method_signature_type(&method.params, method.return_type.as_ref());
                Some(MemberInfo {
                    name: method.name.clone(),
                    ty,
                    optional: method.optional,
                    readonly: false,
                    is_method: true,
                })
            }
            ast::TypeMember::Index(_) => None,
        }
    }

    fn class_member_info(&mut self, member: &ast::ClassMember) -> Option<MemberInfo> {
        match member {
            ast::ClassMember::Property(prop) => Some(MemberInfo {
                name: prop.name.clone(),
                ty: prop
                    .type_annotation
                    .as_ref()
                    .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                optional: prop.optional,
                readonly: prop.is_readonly,
                is_method: false,
            }),
            ast::ClassMember::Method(method) => {
                if method.kind == ast::MethodKind::Constructor {
                    return None;
                }
                let ty = self.method_signature_type(&method.params, method.return_type.as_ref());
                Some(MemberInfo {
                    name: method.name.clone(),
                    ty,
                    optional: false,
                    readonly: false,
                    is_method: true,
                })
            }
        }
    }

    fn method_signature_type(
        &mut self,
        params: &[ast::Param],
        return_type: Option<&ast::TypeNode>,
    ) -> IrType {
        IrType::Function {
            params: params
                .iter()
                .map(|p| IrParamType {
                    name: p.name.name.clone(),
                    ty: p
                        .type_annotation
                        .as_ref()
                        .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                    optional: p.optional,
                })
                .collect(),
            return_type: Box::new(
                return_type.map_or_else(|| IrType::primitive("void"), |t| self.convert_type(t)),
            ),
        }
    }

    fn heritage_edges(
        &mut self,
        extends: &[ast::TypeNode],
        implements: &[ast::TypeNode],
    ) -> Vec<HeritageEdge> {
        let mut edges = Vec::new();
        for (nodes, kind) in [
            (extends, HeritageKind::Extends),
            (implements, HeritageKind::Implements),
        ] {
            for node in nodes {
                let ast::TypeNode::Ref(reference) = node else {
                    continue;
                };
                if is_struct_marker_name(&reference.head.name) {
                    continue;
                }
                let target_stable_id = self.stable_id_for_type_name(&reference.head.name);
                let type_arguments = reference
                    .type_args
                    .iter()
                    .map(|t| self.convert_type(t))
                    .collect();
                edges.push(HeritageEdge {
                    target_stable_id,
                    type_arguments,
                    kind,
                });
            }
        }
        edges
    }

    fn extends_has_struct_marker(&self, extends: &[ast::TypeNode]) -> bool {
        extends.iter().any(|node| {
            matches!(node, ast::TypeNode::Ref(r) if is_struct_marker_name(&r.head.name))
        })
    }

    /// Stable id a bare type name refers to: local declaration, imported
    /// type, or the name itself for ambient/unknown types.
    pub(crate) fn stable_id_for_type_name(&self, name: &str) -> String {
        if let Some(imported) = self.imported_names.get(name) {
            return match imported {
                ImportedName::LocalType { stable_id } => stable_id.clone(),
                ImportedName::Clr { clr_name } => clr_name.clone(),
                ImportedName::ClrAmbient { fq_name } => fq_name.clone(),
            };
        }
        let declared_locally = self.binding.decls.values().any(|info| {
            info.name == name && info.kind.is_type_decl()
        });
        if declared_locally {
            self.local_stable_id(name)
        } else {
            name.to_string()
        }
    }

    // =========================================================================
    // Type conversion
    // =========================================================================

    pub(crate) fn convert_type(&mut self, node: &ast::TypeNode) -> IrType {
        match node {
            ast::TypeNode::Ref(reference) => self.convert_type_ref(reference),
            ast::TypeNode::Array(array) => IrType::Array {
                element: Box::new(self.convert_type(&array.element)),
                origin: tsonic_types::ArrayOrigin::Explicit,
            },
            ast::TypeNode::Tuple(tuple) => IrType::Tuple {
                elements: tuple.elements.iter().map(|t| self.convert_type(t)).collect(),
            },
            ast::TypeNode::Function(function) => IrType::Function {
                params: function
                    .params
                    .iter()
                    .map(|p| IrParamType {
                        name: p.name.name.clone(),
                        ty: p
                            .type_annotation
                            .as_ref()
                            .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                        optional: p.optional,
                    })
                    .collect(),
                return_type: Box::new(self.convert_type(&function.return_type)),
            },
            ast::TypeNode::Object(object) => IrType::Object {
                members: self.convert_object_type_members(&object.members),
            },
            ast::TypeNode::Union(union) => {
                let members = union.types.iter().map(|t| self.convert_type(t)).collect();
                self.union_of(members)
            }
            ast::TypeNode::Intersection(intersection) => IrType::Intersection {
                types: intersection
                    .types
                    .iter()
                    .map(|t| self.convert_type(t))
                    .collect(),
            },
            ast::TypeNode::Literal(literal) => IrType::Literal {
                value: match &literal.value {
                    ast::LitValue::String(s) => tsonic_types::LiteralValue::String(s.clone()),
                    ast::LitValue::Number(n) => tsonic_types::LiteralValue::Number(*n),
                    ast::LitValue::Bool(b) => tsonic_types::LiteralValue::Bool(*b),
                    ast::LitValue::Null | ast::LitValue::Undefined => {
                        return IrType::primitive("null");
                    }
                },
            },
            ast::TypeNode::Paren(inner) => self.convert_type(inner),
        }
    }

    pub(crate) fn convert_object_type_members(
        &mut self,
        members: &[ast::TypeMember],
    ) -> Vec<IrObjectMember> {
        members
            .iter()
            .filter_map(|member| match member {
                ast::TypeMember::Property(prop) => Some(IrObjectMember {
                    name: prop.name.clone(),
                    ty: prop
                        .type_annotation
                        .as_ref()
                        .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                    optional: prop.optional,
                    readonly: prop.readonly,
                }),
                ast::TypeMember::Method(method) => Some(IrObjectMember {
                    name: method.name.clone(),
                    ty: self.method_signature_type(&method.params, method.return_type.as_ref()),
                    optional: method.optional,
                    readonly: false,
                }),
                ast::TypeMember::Index(_) => None,
            })
            .collect()
    }

    fn convert_type_ref(&mut self, reference: &ast::TypeRef) -> IrType {
        if !reference.rest.is_empty() {
            // Dotted CLR name (`System.DateTime`).
            return IrType::Reference {
                name: reference.dotted_name(),
                type_id: None,
                resolved_clr_type: Some(reference.dotted_name()),
                type_arguments: reference
                    .type_args
                    .iter()
                    .map(|t| self.convert_type(t))
                    .collect(),
                members: None,
            };
        }

        let name = reference.head.name.as_str();

        if self.is_type_param(name) {
            return IrType::type_parameter(name);
        }

        // Parameter-passing wrappers unwrap to their element outside
        // parameter position.
        if passing_for_wrapper(name).is_some() && reference.type_args.len() == 1 {
            return self.convert_type(&reference.type_args[0]);
        }

        if matches!(
            name,
            "string"
                | "number"
                | "boolean"
                | "void"
                | "undefined"
                | "null"
                | "object"
                | "any"
                | "unknown"
                | "never"
        ) || NumericKind::from_alias(name).is_some()
        {
            return IrType::primitive(name);
        }

        if name == "Array" && reference.type_args.len() == 1 {
            return IrType::Array {
                element: Box::new(self.convert_type(&reference.type_args[0])),
                origin: tsonic_types::ArrayOrigin::Explicit,
            };
        }

        let type_arguments: Vec<IrType> = reference
            .type_args
            .iter()
            .map(|t| self.convert_type(t))
            .collect();

        // Imported name?
        if let Some(imported) = self.imported_names.get(name).cloned() {
            return match imported {
                ImportedName::LocalType { stable_id } => IrType::Reference {
                    name: name.to_string(),
                    type_id: Some(stable_id),
                    resolved_clr_type: None,
                    type_arguments,
                    members: None,
                },
                ImportedName::Clr { clr_name } => IrType::Reference {
                    name: name.to_string(),
                    type_id: None,
                    resolved_clr_type: Some(clr_name),
                    type_arguments,
                    members: None,
                },
                ImportedName::ClrAmbient { fq_name } => IrType::Reference {
                    name: name.to_string(),
                    type_id: None,
                    resolved_clr_type: Some(fq_name),
                    type_arguments,
                    members: None,
                },
            };
        }

        // Locally declared nominal type?
        if let Some(info) = self.binding.decl_for_use(reference.head.id) {
            if info.kind == tsonic_binder::DeclKind::TypeParam {
                return IrType::type_parameter(name);
            }
            if info.kind.is_type_decl() {
                return IrType::Reference {
                    name: name.to_string(),
                    type_id: Some(self.local_stable_id(name)),
                    resolved_clr_type: None,
                    type_arguments,
                    members: None,
                };
            }
        }

        // Ambient globals (Promise, Span, ptr, ...) and anything the
        // registry can resolve; otherwise a plain named reference the
        // backend validates.
        let resolved_clr_type = self
            .registry
            .lookup(name)
            .map(|binding| binding.clr_name.clone());
        IrType::Reference {
            name: name.to_string(),
            type_id: None,
            resolved_clr_type,
            type_arguments,
            members: None,
        }
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    pub(crate) fn build_top_level_statement(
        &mut self,
        statement: &ast::Statement,
        catalog: &UnifiedTypeCatalog,
        out: &mut Vec<IrStatement>,
    ) {
        match statement {
            ast::Statement::Import(_) | ast::Statement::ExportNamed(_) => {}
            ast::Statement::Interface(iface) => {
                if let Some(ir) = self.build_interface(iface) {
                    out.push(ir);
                }
            }
            ast::Statement::TypeAlias(alias) => {
                out.push(self.build_type_alias(alias));
            }
            ast::Statement::Variable(decl) => {
                self.build_variable_declaration(decl, catalog, true, out);
            }
            other => {
                if let Some(ir) = self.build_statement(other, catalog) {
                    out.push(ir);
                }
            }
        }
    }

    /// Interfaces: the struct marker vanishes, index-signature-only
    /// interfaces lower to dictionary aliases, everything else converts
    /// structurally.
    pub(crate) fn build_interface(
        &mut self,
        iface: &ast::InterfaceDeclaration,
    ) -> Option<IrStatement> {
        if is_struct_marker_decl(iface) {
            return None;
        }

        if Self::index_signature_only(iface) {
            let ast::TypeMember::Index(index) = &iface.members[0] else {
                unreachable!("index_signature_only guarantees an index member");
            };
            let key = self.dictionary_key_type(&index.key_type)?;
            self.push_type_params(&iface.type_params);
            let value = self.convert_type(&index.value_type);
            let type_params = self.convert_type_params(&iface.type_params);
            self.pop_type_params();
            return Some(IrStatement::TypeAliasDeclaration(IrTypeAliasDeclaration {
                name: iface.name.name.clone(),
                type_params,
                ty: IrType::Dictionary {
                    key: Box::new(key),
                    value: Box::new(value),
                },
                exported: iface.export,
                span: iface.span,
            }));
        }

        self.push_type_params(&iface.type_params);
        let is_struct = self.extends_has_struct_marker(&iface.extends);
        let extends: Vec<IrType> = iface
            .extends
            .iter()
            .filter(|node| {
                !matches!(node, ast::TypeNode::Ref(r) if is_struct_marker_name(&r.head.name))
            })
            .map(|node| self.convert_type(node))
            .collect();
        let members: Vec<IrInterfaceMember> = iface
            .members
            .iter()
            .filter_map(|member| self.build_interface_member(member))
            .collect();
        let type_params = self.convert_type_params(&iface.type_params);
        self.pop_type_params();

        Some(IrStatement::InterfaceDeclaration(IrInterfaceDeclaration {
            name: iface.name.name.clone(),
            type_params,
            extends,
            members,
            is_struct,
            exported: iface.export,
            synthetic: false,
            span: iface.span,
        }))
    }

    fn index_signature_only(iface: &ast::InterfaceDeclaration) -> bool {
        iface.members.len() == 1 && matches!(iface.members[0], ast::TypeMember::Index(_))
    }

    /// Dictionary keys are constrained to `string` and `number` (emitted as
    /// `double`).
    pub(crate) fn dictionary_key_type(&mut self, key_type: &ast::TypeNode) -> Option<IrType> {
        if let ast::TypeNode::Ref(reference) = key_type {
            match reference.head.name.as_str() {
                "string" => return Some(IrType::primitive("string")),
                "number" => return Some(IrType::primitive("number")),
                _ => {}
            }
        }
        let descr = match key_type {
            ast::TypeNode::Ref(r) => r.dotted_name(),
            _ => "complex type".to_string(),
        };
        self.error(codes::INVALID_DICTIONARY_KEY, &[&descr], key_type.span());
        None
    }

    fn build_interface_member(&mut self, member: &ast::TypeMember) -> Option<IrInterfaceMember> {
        match member {
            ast::TypeMember::Property(prop) => {
                Some(IrInterfaceMember::Property(IrPropertySignature {
                    name: prop.name.clone(),
                    ty: prop
                        .type_annotation
                        .as_ref()
                        .map_or_else(|| IrType::primitive("any"), |t| self.convert_type(t)),
                    optional: prop.optional,
                    readonly: prop.readonly,
                }))
            }
            ast::TypeMember::Method(method) => {
                self.push_type_params(&method.type_params);
                let signature = IrMethodSignature {
                    name: method.name.clone(),
                    type_params: self.convert_type_params(&method.type_params),
                    params: self.convert_params(&method.params),
                    return_type: method.return_type.as_ref().map(|t| self.convert_type(t)),
                };
                self.pop_type_params();
                Some(IrInterfaceMember::Method(signature))
            }
            ast::TypeMember::Index(index) => {
                // Mixed index signatures have no C# mapping.
                self.error(
                    codes::UNSUPPORTED_FEATURE,
                    &["index signature on an interface with other members"],
                    index.span,
                );
                None
            }
        }
    }

    /// Union-of-object-literal aliases promote each object arm to a
    /// synthetic interface `Name__<i>`.
    pub(crate) fn build_type_alias(&mut self, alias: &ast::TypeAliasDeclaration) -> IrStatement {
        self.push_type_params(&alias.type_params);
        let type_params = self.convert_type_params(&alias.type_params);

        let ty = if let ast::TypeNode::Union(union) = &alias.ty {
            let mut arm_index = 0usize;
            let mut members = Vec::new();
            for arm in &union.types {
                match arm {
                    ast::TypeNode::Object(object) => {
                        let name = format!("{}__{arm_index}", alias.name.name);
                        arm_index += 1;
                        let object_members = self.convert_object_type_members(&object.members);
                        self.anon.decls.push(IrInterfaceDeclaration {
                            name: name.clone(),
                            type_params: type_params.clone(),
                            extends: Vec::new(),
                            members: object_members
                                .iter()
                                .map(|m| {
                                    IrInterfaceMember::Property(IrPropertySignature {
                                        name: m.name.clone(),
                                        ty: m.ty.clone(),
                                        optional: m.optional,
                                        readonly: m.readonly,
                                    })
                                })
                                .collect(),
                            is_struct: false,
                            exported: alias.export,
                            synthetic: true,
                            span: object.span,
                        });
                        members.push(IrType::Reference {
                            name: name.clone(),
                            type_id: Some(self.local_stable_id(&name)),
                            resolved_clr_type: None,
                            type_arguments: type_params
                                .iter()
                                .map(|p| IrType::type_parameter(&p.name))
                                .collect(),
                            members: Some(object_members),
                        });
                    }
                    other => members.push(self.convert_type(other)),
                }
            }
            self.union_of(members)
        } else {
            self.convert_type(&alias.ty)
        };

        self.pop_type_params();
        IrStatement::TypeAliasDeclaration(IrTypeAliasDeclaration {
            name: alias.name.name.clone(),
            type_params,
            ty,
            exported: alias.export,
            span: alias.span,
        })
    }

    pub(crate) fn convert_type_params(
        &mut self,
        params: &[ast::TypeParam],
    ) -> Vec<IrTypeParamDecl> {
        params
            .iter()
            .map(|p| IrTypeParamDecl {
                name: p.name.name.clone(),
                constraint: p.constraint.as_ref().map(|c| self.convert_type(c)),
            })
            .collect()
    }

    pub(crate) fn convert_params(&mut self, params: &[ast::Param]) -> Vec<IrParamDecl> {
        params
            .iter()
            .map(|param| {
                let mut passing = ParamPassing::Value;
                let ty = param.type_annotation.as_ref().map(|annotation| {
                    if let ast::TypeNode::Ref(reference) = annotation
                        && let Some(mode) = passing_for_wrapper(&reference.head.name)
                        && reference.type_args.len() == 1
                    {
                        passing = mode;
                        self.convert_type(&reference.type_args[0])
                    } else {
                        self.convert_type(annotation)
                    }
                });
                let decl = self.binding.decl_of_node.get(&param.name.id).copied();
                if let (Some(decl), Some(ty)) = (decl, ty.clone()) {
                    self.decl_types.insert(decl, ty);
                }
                IrParamDecl {
                    name: param.name.name.clone(),
                    decl,
                    ty,
                    optional: param.optional,
                    is_rest: param.is_rest,
                    passing,
                    default_value: None,
                }
            })
            .collect()
    }

    pub(crate) fn build_function_declaration(
        &mut self,
        func: &ast::FunctionDeclaration,
        catalog: &UnifiedTypeCatalog,
    ) -> IrStatement {
        self.push_type_params(&func.type_params);
        let type_params = self.convert_type_params(&func.type_params);
        let params = self.convert_params(&func.params);
        let return_type = func.return_type.as_ref().map(|t| self.convert_type(t));
        let decl = self.binding.decl_of_node.get(&func.name.id).copied();

        // Make the function's type available to later expressions.
        if let Some(decl) = decl {
            self.decl_types.insert(
                decl,
                IrType::Function {
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
                },
            );
        }

        let was_generator = self.in_generator;
        self.in_generator = func.is_generator;
        let body = func
            .body
            .as_ref()
            .map(|block| self.build_statements(&block.statements, catalog))
            .unwrap_or_default();
        self.in_generator = was_generator;
        self.pop_type_params();

        IrStatement::FunctionDeclaration(IrFunctionDeclaration {
            name: func.name.name.clone(),
            decl,
            is_async: func.is_async,
            is_generator: func.is_generator,
            type_params,
            params,
            return_type,
            body,
            exported: func.export,
            attributes: Vec::new(),
            span: func.span,
        })
    }

    pub(crate) fn build_class_declaration(
        &mut self,
        class: &ast::ClassDeclaration,
        catalog: &UnifiedTypeCatalog,
    ) -> IrStatement {
        self.push_type_params(&class.type_params);
        let type_params = self.convert_type_params(&class.type_params);

        let extends_nodes: Vec<ast::TypeNode> = class.extends.iter().cloned().collect();
        let is_struct = self.extends_has_struct_marker(&extends_nodes);
        let base = class.extends.as_ref().and_then(|node| {
            if matches!(node, ast::TypeNode::Ref(r) if is_struct_marker_name(&r.head.name)) {
                None
            } else {
                Some(self.convert_type(node))
            }
        });
        let implements: Vec<IrType> = class
            .implements
            .iter()
            .map(|node| self.convert_type(node))
            .collect();

        let mut members = Vec::new();
        for member in &class.members {
            match member {
                ast::ClassMember::Property(prop) => {
                    // Fields cannot carry free type parameters either.
                    let generic_literal = match &prop.initializer {
                        Some(ast::Expression::Arrow(arrow)) => !arrow.type_params.is_empty(),
                        Some(ast::Expression::FunctionExpr(func)) => {
                            !func.type_params.is_empty()
                        }
                        _ => false,
                    };
                    if generic_literal {
                        self.error(codes::GENERIC_DELEGATE_VALUE, &[&prop.name], prop.span);
                        continue;
                    }
                    let ty = prop.type_annotation.as_ref().map(|t| self.convert_type(t));
                    let initializer = prop.initializer.as_ref().map(|init| {
                        let expected = ty.clone();
                        self.build_expression_expecting(init, expected.as_ref(), catalog)
                    });
                    members.push(IrClassMember::Field(IrFieldMember {
                        name: prop.name.clone(),
                        ty,
                        initializer,
                        visibility: convert_visibility(prop.visibility),
                        is_static: prop.is_static,
                        is_readonly: prop.is_readonly,
                        optional: prop.optional,
                        span: prop.span,
                    }));
                }
                ast::ClassMember::Method(method) => {
                    self.push_type_params(&method.type_params);
                    let method_type_params = self.convert_type_params(&method.type_params);
                    let params = self.convert_params(&method.params);
                    let return_type =
                        method.return_type.as_ref().map(|t| self.convert_type(t));
                    let was_generator = self.in_generator;
                    self.in_generator = method.is_generator;
                    let body = method
                        .body
                        .as_ref()
                        .map(|block| self.build_statements(&block.statements, catalog));
                    self.in_generator = was_generator;
                    self.pop_type_params();
                    members.push(IrClassMember::Method(IrMethodMember {
                        name: method.name.clone(),
                        kind: convert_method_kind(method.kind),
                        visibility: convert_visibility(method.visibility),
                        is_static: method.is_static,
                        is_async: method.is_async,
                        is_generator: method.is_generator,
                        type_params: method_type_params,
                        params,
                        return_type,
                        body,
                        span: method.span,
                    }));
                }
            }
        }
        self.pop_type_params();

        IrStatement::ClassDeclaration(IrClassDeclaration {
            name: class.name.name.clone(),
            type_params,
            base,
            implements,
            members,
            is_struct,
            is_abstract: class.is_abstract,
            exported: class.export,
            attributes: Vec::new(),
            ctor_attributes: Vec::new(),
            span: class.span,
        })
    }

    pub(crate) fn build_enum_declaration(
        &mut self,
        decl: &ast::EnumDeclaration,
        catalog: &UnifiedTypeCatalog,
    ) -> IrStatement {
        IrStatement::EnumDeclaration(IrEnumDeclaration {
            name: decl.name.name.clone(),
            members: decl
                .members
                .iter()
                .map(|member| IrEnumMember {
                    name: member.name.clone(),
                    initializer: member
                        .initializer
                        .as_ref()
                        .map(|init| self.build_expression(init, catalog)),
                })
                .collect(),
            exported: decl.export,
            span: decl.span,
        })
    }

    /// Variable declarations. At module level the declared type is
    /// mandatory (static fields need one); supported generic values lower
    /// to function declarations instead.
    pub(crate) fn build_variable_declaration(
        &mut self,
        decl: &ast::VariableDeclaration,
        catalog: &UnifiedTypeCatalog,
        module_level: bool,
        out: &mut Vec<IrStatement>,
    ) {
        let decl_id = decl
            .name
            .as_ident()
            .and_then(|ident| self.binding.decl_of_node.get(&ident.id).copied());

        // Supported generic-function values become top-level generic
        // methods; C# delegates cannot be generic.
        if let Some(id) = decl_id
            && self.binding.generic_values.contains(&id)
        {
            if let Some(ir) = self.lower_generic_value(decl, id, catalog) {
                out.push(ir);
                return;
            }
        }

        // A generic function value the binder could not lift has no C#
        // shape at all: a delegate-typed field cannot carry free type
        // parameters.
        if self.is_unsupported_generic_value(decl, decl_id) {
            let name = decl
                .name
                .as_ident()
                .map_or_else(String::new, |ident| ident.name.clone());
            self.error(codes::GENERIC_DELEGATE_VALUE, &[&name], decl.span);
            return;
        }

        let Some(ident) = decl.name.as_ident() else {
            self.build_destructuring_declaration(decl, catalog, out);
            return;
        };

        let annotated = decl.type_annotation.as_ref().map(|t| self.convert_type(t));
        let initializer = decl.initializer.as_ref().map(|init| {
            self.build_expression_expecting(init, annotated.as_ref(), catalog)
        });

        let declared_type = annotated.or_else(|| {
            initializer
                .as_ref()
                .and_then(|init| init.inferred_type.clone())
        });

        if module_level && declared_type.is_none() {
            self.error(codes::MODULE_LEVEL_TYPE_REQUIRED, &[&ident.name], decl.span);
        }

        if let (Some(id), Some(ty)) = (decl_id, declared_type.clone()) {
            self.decl_types.insert(id, ty);
        }

        out.push(IrStatement::VariableDeclaration(IrVariableDeclaration {
            name: ident.name.clone(),
            decl: decl_id,
            decl_kind: convert_decl_kind(decl.kind),
            declared_type,
            initializer,
            exported: decl.export,
            is_written: decl_id.is_some_and(|id| self.binding.written.contains(&id)),
            span: decl.span,
        }))
    }

    /// Destructuring declarations lower to a temporary plus per-binding
    /// member reads.
    fn build_destructuring_declaration(
        &mut self,
        decl: &ast::VariableDeclaration,
        catalog: &UnifiedTypeCatalog,
        out: &mut Vec<IrStatement>,
    ) {
        let Some(initializer) = &decl.initializer else {
            self.unsupported("destructuring declaration without initializer", decl.span);
            return;
        };
        let source = self.build_expression(initializer, catalog);
        let temp_name = format!("__tmp{}", out.len());
        let source_type = source.inferred_type.clone();
        out.push(IrStatement::VariableDeclaration(IrVariableDeclaration {
            name: temp_name.clone(),
            decl: None,
            decl_kind: IrDeclKind::Const,
            declared_type: source_type.clone(),
            initializer: Some(source),
            exported: false,
            is_written: false,
            span: decl.span,
        }));

        match &decl.name {
            ast::Pattern::Array(pattern) => {
                for (position, element) in pattern.elements.iter().enumerate() {
                    let Some(ast::Pattern::Ident(ident)) = element.as_ref() else {
                        continue;
                    };
                    self.push_destructured_binding(
                        decl,
                        ident,
                        &temp_name,
                        MemberKey::Index(Box::new(
                            IrExpression::new(IrExpressionKind::Literal {
                                value: IrLiteralValue::Number(position as f64),
                            })
                            .with_type(IrType::primitive_with_intent(
                                "int",
                                NumericKind::Int32,
                            )),
                        )),
                        source_type.as_ref(),
                        out,
                    );
                }
            }
            ast::Pattern::Object(pattern) => {
                for prop in &pattern.properties {
                    let Some(ident) = prop.value.as_ident() else { continue };
                    self.push_destructured_binding(
                        decl,
                        ident,
                        &temp_name,
                        MemberKey::Name(prop.key.clone()),
                        source_type.as_ref(),
                        out,
                    );
                }
            }
            ast::Pattern::Ident(_) => unreachable!("simple bindings handled by the caller"),
        }
    }

    fn push_destructured_binding(
        &mut self,
        decl: &ast::VariableDeclaration,
        ident: &ast::Ident,
        temp_name: &str,
        member: MemberKey,
        source_type: Option<&IrType>,
        out: &mut Vec<IrStatement>,
    ) {
        let decl_id = self.binding.decl_of_node.get(&ident.id).copied();
        let access_kind = match (&member, source_type) {
            (MemberKey::Index(_), Some(IrType::Array { .. })) => AccessKind::ClrIndexer,
            (MemberKey::Index(_), Some(IrType::Tuple { .. })) => AccessKind::Unknown,
            (MemberKey::Index(_), _) => AccessKind::Unknown,
            (MemberKey::Name(_), _) => AccessKind::Unknown,
        };
        let binding_type = match (&member, source_type) {
            (MemberKey::Index(_), Some(IrType::Array { element, .. })) => {
                Some((**element).clone())
            }
            (MemberKey::Name(name), Some(ty)) => self.member_type_of(ty, name),
            _ => None,
        };
        if let (Some(id), Some(ty)) = (decl_id, binding_type.clone()) {
            self.decl_types.insert(id, ty);
        }
        let initializer = IrExpression::new(IrExpressionKind::MemberAccess {
            object: Box::new(IrExpression::new(IrExpressionKind::Identifier {
                name: temp_name.to_string(),
                decl: None,
            })),
            member,
            access_kind,
            optional: false,
        });
        let initializer = match binding_type.clone() {
            Some(ty) => initializer.with_type(ty),
            None => initializer,
        };
        out.push(IrStatement::VariableDeclaration(IrVariableDeclaration {
            name: ident.name.clone(),
            decl: decl_id,
            decl_kind: convert_decl_kind(decl.kind),
            declared_type: binding_type,
            initializer: Some(initializer),
            exported: decl.export,
            is_written: decl_id.is_some_and(|id| self.binding.written.contains(&id)),
            span: ident.span,
        }));
    }

    /// Whether this declaration stores a generic function value the binder
    /// did not mark as liftable (reassigned `let`, alias of one, ...).
    fn is_unsupported_generic_value(
        &self,
        decl: &ast::VariableDeclaration,
        decl_id: Option<tsonic_binder::DeclId>,
    ) -> bool {
        if decl_id.is_some_and(|id| self.binding.generic_values.contains(&id)) {
            return false;
        }
        match &decl.initializer {
            Some(ast::Expression::Arrow(arrow)) => !arrow.type_params.is_empty(),
            Some(ast::Expression::FunctionExpr(func)) => !func.type_params.is_empty(),
            Some(ast::Expression::Ident(target)) => self
                .binding
                .resolution
                .get(&target.id)
                .copied()
                .is_some_and(|t| self.points_at_generic_value(t)),
            _ => false,
        }
    }

    /// Whether a declaration transitively names a generic function.
    fn points_at_generic_value(&self, target: tsonic_binder::DeclId) -> bool {
        if self.binding.generic_values.contains(&target)
            || self.lowered_generics.contains_key(&target)
        {
            return true;
        }
        let Some(info) = self.binding.decls.get(&target) else {
            return false;
        };
        info.kind == tsonic_binder::DeclKind::Function
            && self.file.statements.iter().any(|statement| {
                matches!(
                    statement,
                    ast::Statement::Function(func)
                        if func.name.name == info.name && !func.type_params.is_empty()
                )
            })
    }

    /// Lower a supported generic-function value to a function declaration.
    fn lower_generic_value(
        &mut self,
        decl: &ast::VariableDeclaration,
        decl_id: tsonic_binder::DeclId,
        catalog: &UnifiedTypeCatalog,
    ) -> Option<IrStatement> {
        let name = decl.name.as_ident()?.name.clone();
        match decl.initializer.as_ref()? {
            ast::Expression::Arrow(arrow) => {
                self.push_type_params(&arrow.type_params);
                let type_params = self.convert_type_params(&arrow.type_params);
                let params = self.convert_params(&arrow.params);
                let return_type = arrow.return_type.as_ref().map(|t| self.convert_type(t));
                let body = match &arrow.body {
                    ast::ArrowBody::Block(block) => {
                        self.build_statements(&block.statements, catalog)
                    }
                    ast::ArrowBody::Expr(expr) => {
                        let value = self.build_expression(expr, catalog);
                        vec![IrStatement::Return(Some(value))]
                    }
                };
                self.pop_type_params();
                self.lowered_generics.insert(
                    decl_id,
                    LoweredGenericSignature {
                        name: name.clone(),
                        type_params: type_params.clone(),
                        params: params.clone(),
                        return_type: return_type.clone(),
                    },
                );
                Some(IrStatement::FunctionDeclaration(IrFunctionDeclaration {
                    name,
                    decl: Some(decl_id),
                    is_async: arrow.is_async,
                    is_generator: false,
                    type_params,
                    params,
                    return_type,
                    body,
                    exported: decl.export,
                    attributes: Vec::new(),
                    span: decl.span,
                }))
            }
            ast::Expression::FunctionExpr(func) => {
                self.push_type_params(&func.type_params);
                let type_params = self.convert_type_params(&func.type_params);
                let params = self.convert_params(&func.params);
                let return_type = func.return_type.as_ref().map(|t| self.convert_type(t));
                let body = self.build_statements(&func.body.statements, catalog);
                self.pop_type_params();
                self.lowered_generics.insert(
                    decl_id,
                    LoweredGenericSignature {
                        name: name.clone(),
                        type_params: type_params.clone(),
                        params: params.clone(),
                        return_type: return_type.clone(),
                    },
                );
                Some(IrStatement::FunctionDeclaration(IrFunctionDeclaration {
                    name,
                    decl: Some(decl_id),
                    is_async: func.is_async,
                    is_generator: func.is_generator,
                    type_params,
                    params,
                    return_type,
                    body,
                    exported: decl.export,
                    attributes: Vec::new(),
                    span: decl.span,
                }))
            }
            ast::Expression::Ident(target) => {
                // Alias of another lowered generic: emit a forwarding
                // generic method with the target's signature.
                let target_id = self.binding.resolution.get(&target.id).copied()?;
                let signature = match self.lowered_generics.get(&target_id).cloned() {
                    Some(signature) => signature,
                    None => self.find_generic_function_signature(target_id)?,
                };
                let forward_call = IrExpression::new(IrExpressionKind::Call {
                    callee: Box::new(IrExpression::new(IrExpressionKind::Identifier {
                        name: target.name.clone(),
                        decl: Some(target_id),
                    })),
                    type_args: Vec::new(),
                    args: signature
                        .params
                        .iter()
                        .map(|p| {
                            IrExpression::new(IrExpressionKind::Identifier {
                                name: p.name.clone(),
                                decl: None,
                            })
                        })
                        .collect(),
                    optional: false,
                });
                self.lowered_generics.insert(
                    decl_id,
                    LoweredGenericSignature {
                        name: name.clone(),
                        ..signature.clone()
                    },
                );
                Some(IrStatement::FunctionDeclaration(IrFunctionDeclaration {
                    name,
                    decl: Some(decl_id),
                    is_async: false,
                    is_generator: false,
                    type_params: signature.type_params,
                    params: signature.params,
                    return_type: signature.return_type,
                    body: vec![IrStatement::Return(Some(forward_call))],
                    exported: decl.export,
                    attributes: Vec::new(),
                    span: decl.span,
                }))
            }
            _ => None,
        }
    }

    /// Signature of a generic *function declaration* aliased by a value.
    fn find_generic_function_signature(
        &mut self,
        target_id: tsonic_binder::DeclId,
    ) -> Option<LoweredGenericSignature> {
        let info = self.binding.decls.get(&target_id)?;
        let target_name = info.name.clone();
        let file = self.file;
        for statement in &file.statements {
            if let ast::Statement::Function(func) = statement
                && func.name.name == target_name
                && !func.type_params.is_empty()
            {
                self.push_type_params(&func.type_params);
                let signature = LoweredGenericSignature {
                    name: target_name.clone(),
                    type_params: self.convert_type_params(&func.type_params),
                    params: self.convert_params(&func.params),
                    return_type: func.return_type.as_ref().map(|t| self.convert_type(t)),
                };
                self.pop_type_params();
                return Some(signature);
            }
        }
        None
    }

    /// The type of a named member of `ty`, when statically known.
    pub(crate) fn member_type_of(&self, ty: &IrType, member: &str) -> Option<IrType> {
        match ty {
            IrType::Object { members } => members
                .iter()
                .find(|m| m.name == member)
                .map(|m| m.ty.clone()),
            IrType::Reference {
                members: Some(members),
                ..
            } => members
                .iter()
                .find(|m| m.name == member)
                .map(|m| m.ty.clone()),
            _ => None,
        }
    }
}

pub(crate) fn convert_decl_kind(kind: ast::VarKind) -> IrDeclKind {
    match kind {
        ast::VarKind::Const => IrDeclKind::Const,
        ast::VarKind::Let => IrDeclKind::Let,
        ast::VarKind::Var => IrDeclKind::Var,
    }
}

pub(crate) fn convert_visibility(visibility: ast::Visibility) -> IrVisibility {
    match visibility {
        ast::Visibility::Public => IrVisibility::Public,
        ast::Visibility::Private => IrVisibility::Private,
        ast::Visibility::Protected => IrVisibility::Protected,
    }
}

pub(crate) fn convert_method_kind(kind: ast::MethodKind) -> IrMethodKind {
    match kind {
        ast::MethodKind::Method => IrMethodKind::Method,
        ast::MethodKind::Constructor => IrMethodKind::Constructor,
        ast::MethodKind::Getter => IrMethodKind::Getter,
        ast::MethodKind::Setter => IrMethodKind::Setter,
    }
}
