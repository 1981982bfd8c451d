//! Binder implementation.
//!
//! The binder walks each file's AST with a lexical scope stack, allocating a
//! `DeclId` per declaration site and resolving every identifier use to the
//! declaration it names. Per-scope hoisting matches the input language:
//! all declarations in a scope are visible throughout that scope.

use rustc_hash::{FxHashMap, FxHashSet};
use tsonic_parser::ast::*;

/// Program-unique numeric id for a lexical declaration site.
pub type DeclId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Const,
    Let,
    Var,
    Function,
    Class,
    Interface,
    Enum,
    TypeAlias,
    Param,
    TypeParam,
    Import,
    CatchParam,
}

impl DeclKind {
    pub const fn is_type_decl(self) -> bool {
        matches!(
            self,
            Self::Class | Self::Interface | Self::Enum | Self::TypeAlias | Self::TypeParam
        )
    }
}

#[derive(Debug, Clone)]
pub struct DeclInfo {
    pub name: String,
    pub kind: DeclKind,
    /// The declaring AST node.
    pub node: NodeId,
    pub exported: bool,
}

/// One exported name of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportEntry {
    /// Name inside this module (for re-exports, the name in the source module).
    pub local: String,
    /// Name seen by importers.
    pub exported: String,
    /// `Some` for `export { x } from "./other"` re-exports.
    pub source: Option<String>,
}

/// Binding results for one file.
#[derive(Debug, Default)]
pub struct FileBinding {
    /// Declaration AST node -> DeclId.
    pub decl_of_node: FxHashMap<NodeId, DeclId>,
    /// Identifier-use AST node -> resolved DeclId.
    pub resolution: FxHashMap<NodeId, DeclId>,
    pub decls: FxHashMap<DeclId, DeclInfo>,
    /// Declarations that appear as assignment targets somewhere in the file.
    pub written: FxHashSet<DeclId>,
    /// Declarations lowered to top-level generic methods (see
    /// `supported generic-function values`).
    pub generic_values: FxHashSet<DeclId>,
    pub exports: Vec<ExportEntry>,
}

impl FileBinding {
    /// Resolve an identifier use to its declaration info.
    pub fn decl_for_use(&self, use_node: NodeId) -> Option<&DeclInfo> {
        let decl = self.resolution.get(&use_node)?;
        self.decls.get(decl)
    }

    /// Whether a declaration is `const` or a never-written `let`.
    pub fn is_effectively_const(&self, decl: DeclId) -> bool {
        match self.decls.get(&decl).map(|d| d.kind) {
            Some(DeclKind::Const) => true,
            Some(DeclKind::Let) => !self.written.contains(&decl),
            _ => false,
        }
    }
}

/// Program-level binder state. One instance binds every file so `DeclId`s
/// are unique across the compilation.
pub struct BinderState {
    next_decl_id: DeclId,
}

impl BinderState {
    pub fn new() -> Self {
        Self { next_decl_id: 0 }
    }

    pub fn bind_file(&mut self, file: &SourceFile) -> FileBinding {
        let mut binder = Binder {
            next_decl_id: &mut self.next_decl_id,
            scopes: vec![Scope::default()],
            out: FileBinding::default(),
            generic_candidates: Vec::new(),
        };
        binder.predeclare_statements(&file.statements);
        for statement in &file.statements {
            binder.bind_statement(statement);
        }
        binder.collect_exports(&file.statements);
        binder.resolve_generic_values();
        binder.out
    }
}

#[derive(Default)]
struct Scope {
    names: FxHashMap<String, DeclId>,
}

/// A candidate edge for generic-value analysis: either the declaration is
/// itself a generic function value, or it aliases another declaration.
enum GenericCandidate {
    GenericFunctionValue(DeclId),
    Alias { decl: DeclId, points_at: DeclId },
}

struct Binder<'a> {
    next_decl_id: &'a mut DeclId,
    scopes: Vec<Scope>,
    out: FileBinding,
    generic_candidates: Vec<GenericCandidate>,
}

impl<'a> Binder<'a> {
    // =========================================================================
    // Scope plumbing
    // =========================================================================

    fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, ident: &Ident, kind: DeclKind, exported: bool) -> DeclId {
        let decl = *self.next_decl_id;
        *self.next_decl_id += 1;
        self.out.decl_of_node.insert(ident.id, decl);
        self.out.decls.insert(
            decl,
            DeclInfo {
                name: ident.name.clone(),
                kind,
                node: ident.id,
                exported,
            },
        );
        if let Some(scope) = self.scopes.last_mut() {
            scope.names.insert(ident.name.clone(), decl);
        }
        decl
    }

    fn resolve_name(&self, name: &str) -> Option<DeclId> {
        for scope in self.scopes.iter().rev() {
            if let Some(&decl) = scope.names.get(name) {
                return Some(decl);
            }
        }
        None
    }

    fn resolve_use(&mut self, ident: &Ident) {
        if let Some(decl) = self.resolve_name(&ident.name) {
            self.out.resolution.insert(ident.id, decl);
        }
    }

    // =========================================================================
    // Hoisting
    // =========================================================================

    /// Declare every declaration of a statement list into the current scope
    /// before walking it, so uses anywhere in the scope resolve.
    fn predeclare_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Variable(decl) => {
                    let kind = match decl.kind {
                        VarKind::Const => DeclKind::Const,
                        VarKind::Let => DeclKind::Let,
                        VarKind::Var => DeclKind::Var,
                    };
                    for ident in decl.name.bound_idents() {
                        self.declare(ident, kind, decl.export);
                    }
                }
                Statement::Function(func) => {
                    let decl = self.declare(&func.name, DeclKind::Function, func.export);
                    if !func.type_params.is_empty() {
                        self.generic_candidates
                            .push(GenericCandidate::GenericFunctionValue(decl));
                    }
                }
                Statement::Class(class) => {
                    self.declare(&class.name, DeclKind::Class, class.export);
                }
                Statement::Interface(iface) => {
                    self.declare(&iface.name, DeclKind::Interface, iface.export);
                }
                Statement::Enum(decl) => {
                    self.declare(&decl.name, DeclKind::Enum, decl.export);
                }
                Statement::TypeAlias(alias) => {
                    self.declare(&alias.name, DeclKind::TypeAlias, alias.export);
                }
                Statement::Import(import) => {
                    for specifier in &import.specifiers {
                        self.declare(&specifier.local, DeclKind::Import, false);
                    }
                    if let Some(namespace) = &import.namespace {
                        self.declare(namespace, DeclKind::Import, false);
                    }
                }
                _ => {}
            }
        }
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn bind_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Variable(decl) => self.bind_variable(decl),
            Statement::Function(func) => self.bind_function_like(
                &func.type_params,
                &func.params,
                func.return_type.as_ref(),
                func.body.as_ref(),
            ),
            Statement::Class(class) => self.bind_class(class),
            Statement::Interface(iface) => self.bind_interface(iface),
            Statement::Enum(decl) => {
                for member in &decl.members {
                    if let Some(init) = &member.initializer {
                        self.bind_expression(init);
                    }
                }
            }
            Statement::TypeAlias(alias) => {
                self.push_scope();
                self.declare_type_params(&alias.type_params);
                self.bind_type(&alias.ty);
                self.pop_scope();
            }
            Statement::Import(_) | Statement::ExportNamed(_) | Statement::Empty(_) => {}
            Statement::Expression(stmt) => self.bind_expression(&stmt.expression),
            Statement::If(stmt) => {
                self.bind_expression(&stmt.condition);
                self.bind_embedded(&stmt.then_branch);
                if let Some(else_branch) = &stmt.else_branch {
                    self.bind_embedded(else_branch);
                }
            }
            Statement::While(stmt) => {
                self.bind_expression(&stmt.condition);
                self.bind_embedded(&stmt.body);
            }
            Statement::DoWhile(stmt) => {
                self.bind_embedded(&stmt.body);
                self.bind_expression(&stmt.condition);
            }
            Statement::For(stmt) => {
                self.push_scope();
                match &stmt.init {
                    Some(ForInit::Variable(decl)) => {
                        let kind = match decl.kind {
                            VarKind::Const => DeclKind::Const,
                            VarKind::Let => DeclKind::Let,
                            VarKind::Var => DeclKind::Var,
                        };
                        for ident in decl.name.bound_idents() {
                            self.declare(ident, kind, false);
                        }
                        self.bind_variable_parts(decl);
                    }
                    Some(ForInit::Expression(expr)) => self.bind_expression(expr),
                    None => {}
                }
                if let Some(condition) = &stmt.condition {
                    self.bind_expression(condition);
                }
                if let Some(update) = &stmt.update {
                    self.bind_expression(update);
                }
                self.bind_embedded(&stmt.body);
                self.pop_scope();
            }
            Statement::ForOf(stmt) => {
                self.bind_expression(&stmt.iterable);
                self.push_scope();
                self.bind_iteration_binding(stmt.decl_kind, &stmt.binding);
                self.bind_embedded(&stmt.body);
                self.pop_scope();
            }
            Statement::ForIn(stmt) => {
                self.bind_expression(&stmt.object);
                self.push_scope();
                self.bind_iteration_binding(stmt.decl_kind, &stmt.binding);
                self.bind_embedded(&stmt.body);
                self.pop_scope();
            }
            Statement::Switch(stmt) => {
                self.bind_expression(&stmt.discriminant);
                self.push_scope();
                for case in &stmt.cases {
                    if let Some(test) = &case.test {
                        self.bind_expression(test);
                    }
                    self.predeclare_statements(&case.statements);
                    for inner in &case.statements {
                        self.bind_statement(inner);
                    }
                }
                self.pop_scope();
            }
            Statement::Try(stmt) => {
                self.bind_block(&stmt.block);
                if let Some(catch) = &stmt.catch {
                    self.push_scope();
                    if let Some(param) = &catch.param {
                        self.declare(param, DeclKind::CatchParam, false);
                    }
                    self.predeclare_statements(&catch.body.statements);
                    for inner in &catch.body.statements {
                        self.bind_statement(inner);
                    }
                    self.pop_scope();
                }
                if let Some(finally) = &stmt.finally {
                    self.bind_block(finally);
                }
            }
            Statement::Throw(stmt) => self.bind_expression(&stmt.expression),
            Statement::Block(block) => self.bind_block(block),
            Statement::Break(_) | Statement::Continue(_) => {}
            Statement::Return(stmt) => {
                if let Some(expression) = &stmt.expression {
                    self.bind_expression(expression);
                }
            }
            Statement::With(stmt) => {
                self.bind_expression(&stmt.object);
                self.bind_embedded(&stmt.body);
            }
        }
    }

    fn bind_block(&mut self, block: &Block) {
        self.push_scope();
        self.predeclare_statements(&block.statements);
        for statement in &block.statements {
            self.bind_statement(statement);
        }
        self.pop_scope();
    }

    fn bind_embedded(&mut self, statement: &Statement) {
        match statement {
            Statement::Block(block) => self.bind_block(block),
            other => {
                self.push_scope();
                self.bind_statement(other);
                self.pop_scope();
            }
        }
    }

    fn bind_iteration_binding(&mut self, decl_kind: Option<VarKind>, binding: &Pattern) {
        match decl_kind {
            Some(kind) => {
                let kind = match kind {
                    VarKind::Const => DeclKind::Const,
                    VarKind::Let => DeclKind::Let,
                    VarKind::Var => DeclKind::Var,
                };
                for ident in binding.bound_idents() {
                    self.declare(ident, kind, false);
                }
            }
            None => {
                // Pre-declared binding: a use that is also a write.
                for ident in binding.bound_idents() {
                    self.resolve_use(ident);
                    if let Some(&decl) = self.out.resolution.get(&ident.id) {
                        self.out.written.insert(decl);
                    }
                }
            }
        }
    }

    fn bind_variable(&mut self, decl: &VariableDeclaration) {
        self.bind_variable_parts(decl);

        // Generic-value candidates: `const f = <T>(x: T) => ...` and
        // `const g = f;` aliases.
        if let Some(ident) = decl.name.as_ident()
            && let Some(&decl_id) = self.out.decl_of_node.get(&ident.id)
        {
            match &decl.initializer {
                Some(Expression::Arrow(arrow)) if !arrow.type_params.is_empty() => {
                    self.generic_candidates
                        .push(GenericCandidate::GenericFunctionValue(decl_id));
                }
                Some(Expression::FunctionExpr(func)) if !func.type_params.is_empty() => {
                    self.generic_candidates
                        .push(GenericCandidate::GenericFunctionValue(decl_id));
                }
                Some(Expression::Ident(target)) => {
                    if let Some(&points_at) = self.out.resolution.get(&target.id) {
                        self.generic_candidates.push(GenericCandidate::Alias {
                            decl: decl_id,
                            points_at,
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn bind_variable_parts(&mut self, decl: &VariableDeclaration) {
        if let Some(annotation) = &decl.type_annotation {
            self.bind_type(annotation);
        }
        if let Some(initializer) = &decl.initializer {
            self.bind_expression(initializer);
        }
    }

    fn bind_class(&mut self, class: &ClassDeclaration) {
        self.push_scope();
        self.declare_type_params(&class.type_params);
        if let Some(extends) = &class.extends {
            self.bind_type(extends);
        }
        for implemented in &class.implements {
            self.bind_type(implemented);
        }
        for member in &class.members {
            match member {
                ClassMember::Property(prop) => {
                    if let Some(annotation) = &prop.type_annotation {
                        self.bind_type(annotation);
                    }
                    if let Some(initializer) = &prop.initializer {
                        self.bind_expression(initializer);
                    }
                }
                ClassMember::Method(method) => {
                    self.bind_function_like(
                        &method.type_params,
                        &method.params,
                        method.return_type.as_ref(),
                        method.body.as_ref(),
                    );
                }
            }
        }
        self.pop_scope();
    }

    fn bind_interface(&mut self, iface: &InterfaceDeclaration) {
        self.push_scope();
        self.declare_type_params(&iface.type_params);
        for base in &iface.extends {
            self.bind_type(base);
        }
        for member in &iface.members {
            self.bind_type_member(member);
        }
        self.pop_scope();
    }

    fn bind_type_member(&mut self, member: &TypeMember) {
        match member {
            TypeMember::Property(prop) => {
                if let Some(annotation) = &prop.type_annotation {
                    self.bind_type(annotation);
                }
            }
            TypeMember::Method(method) => {
                self.push_scope();
                self.declare_type_params(&method.type_params);
                for param in &method.params {
                    if let Some(annotation) = &param.type_annotation {
                        self.bind_type(annotation);
                    }
                }
                if let Some(return_type) = &method.return_type {
                    self.bind_type(return_type);
                }
                self.pop_scope();
            }
            TypeMember::Index(index) => {
                self.bind_type(&index.key_type);
                self.bind_type(&index.value_type);
            }
        }
    }

    fn declare_type_params(&mut self, type_params: &[TypeParam]) {
        for param in type_params {
            self.declare(&param.name, DeclKind::TypeParam, false);
        }
        // Constraints and defaults may reference sibling type parameters.
        for param in type_params {
            if let Some(constraint) = &param.constraint {
                self.bind_type(constraint);
            }
            if let Some(default) = &param.default {
                self.bind_type(default);
            }
        }
    }

    fn bind_function_like(
        &mut self,
        type_params: &[TypeParam],
        params: &[Param],
        return_type: Option<&TypeNode>,
        body: Option<&Block>,
    ) {
        self.push_scope();
        self.declare_type_params(type_params);
        for param in params {
            self.declare(&param.name, DeclKind::Param, false);
            if let Some(annotation) = &param.type_annotation {
                self.bind_type(annotation);
            }
            if let Some(initializer) = &param.initializer {
                self.bind_expression(initializer);
            }
        }
        if let Some(return_type) = return_type {
            self.bind_type(return_type);
        }
        if let Some(body) = body {
            self.predeclare_statements(&body.statements);
            for statement in &body.statements {
                self.bind_statement(statement);
            }
        }
        self.pop_scope();
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn bind_expression(&mut self, expression: &Expression) {
        match expression {
            Expression::Literal(_)
            | Expression::This(_)
            | Expression::ImportMeta(_) => {}
            Expression::Ident(ident) => self.resolve_use(ident),
            Expression::PropertyAccess(access) => self.bind_expression(&access.object),
            Expression::ElementAccess(access) => {
                self.bind_expression(&access.object);
                self.bind_expression(&access.index);
            }
            Expression::Call(call) => {
                self.bind_expression(&call.callee);
                for type_arg in &call.type_args {
                    self.bind_type(type_arg);
                }
                for arg in &call.args {
                    self.bind_expression(arg);
                }
            }
            Expression::New(new) => {
                self.bind_expression(&new.callee);
                for type_arg in &new.type_args {
                    self.bind_type(type_arg);
                }
                for arg in &new.args {
                    self.bind_expression(arg);
                }
            }
            Expression::Binary(binary) => {
                self.bind_expression(&binary.left);
                self.bind_expression(&binary.right);
            }
            Expression::Unary(unary) => self.bind_expression(&unary.operand),
            Expression::Update(update) => {
                self.bind_expression(&update.operand);
                self.mark_written(&update.operand);
            }
            Expression::Conditional(cond) => {
                self.bind_expression(&cond.condition);
                self.bind_expression(&cond.when_true);
                self.bind_expression(&cond.when_false);
            }
            Expression::Assignment(assignment) => {
                self.bind_expression(&assignment.target);
                self.mark_written(&assignment.target);
                self.bind_expression(&assignment.value);
            }
            Expression::ArrayLit(array) => {
                for element in &array.elements {
                    self.bind_expression(element);
                }
            }
            Expression::ObjectLit(object) => {
                for prop in &object.properties {
                    if let PropKey::Computed(key) = &prop.key {
                        self.bind_expression(key);
                    }
                    if let Some(value) = &prop.value {
                        self.bind_expression(value);
                    }
                }
            }
            Expression::Arrow(arrow) => {
                self.push_scope();
                self.declare_type_params(&arrow.type_params);
                for param in &arrow.params {
                    self.declare(&param.name, DeclKind::Param, false);
                    if let Some(annotation) = &param.type_annotation {
                        self.bind_type(annotation);
                    }
                    if let Some(initializer) = &param.initializer {
                        self.bind_expression(initializer);
                    }
                }
                if let Some(return_type) = &arrow.return_type {
                    self.bind_type(return_type);
                }
                match &arrow.body {
                    ArrowBody::Block(block) => {
                        self.predeclare_statements(&block.statements);
                        for statement in &block.statements {
                            self.bind_statement(statement);
                        }
                    }
                    ArrowBody::Expr(expr) => self.bind_expression(expr),
                }
                self.pop_scope();
            }
            Expression::FunctionExpr(func) => {
                self.bind_function_like(
                    &func.type_params,
                    &func.params,
                    func.return_type.as_ref(),
                    Some(&func.body),
                );
            }
            Expression::Template(template) => {
                for (expr, _) in &template.spans {
                    self.bind_expression(expr);
                }
            }
            Expression::Spread(spread) => self.bind_expression(&spread.expression),
            Expression::Await(await_expr) => self.bind_expression(&await_expr.expression),
            Expression::Yield(yield_expr) => {
                if let Some(expr) = &yield_expr.expression {
                    self.bind_expression(expr);
                }
            }
            Expression::TypeAssertion(assertion) => {
                self.bind_expression(&assertion.expression);
                self.bind_type(&assertion.ty);
            }
            Expression::NonNull(non_null) => self.bind_expression(&non_null.expression),
            Expression::Paren(paren) => self.bind_expression(&paren.expression),
            Expression::DynamicImport(import) => self.bind_expression(&import.argument),
        }
    }

    /// Record the declaration behind an assignment target as written.
    fn mark_written(&mut self, target: &Expression) {
        match target {
            Expression::Ident(ident) => {
                if let Some(&decl) = self.out.resolution.get(&ident.id) {
                    self.out.written.insert(decl);
                }
            }
            Expression::Paren(paren) => self.mark_written(&paren.expression),
            Expression::NonNull(non_null) => self.mark_written(&non_null.expression),
            Expression::TypeAssertion(assertion) => self.mark_written(&assertion.expression),
            Expression::ArrayLit(array) => {
                for element in &array.elements {
                    match element {
                        Expression::Spread(spread) => self.mark_written(&spread.expression),
                        other => self.mark_written(other),
                    }
                }
            }
            Expression::ObjectLit(object) => {
                for prop in &object.properties {
                    if let Some(value) = &prop.value {
                        self.mark_written(value);
                    }
                }
            }
            // Property/element stores mutate the object, not a local binding.
            _ => {}
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn bind_type(&mut self, ty: &TypeNode) {
        match ty {
            TypeNode::Ref(reference) => {
                self.resolve_use(&reference.head);
                for arg in &reference.type_args {
                    self.bind_type(arg);
                }
            }
            TypeNode::Array(array) => self.bind_type(&array.element),
            TypeNode::Tuple(tuple) => {
                for element in &tuple.elements {
                    self.bind_type(element);
                }
            }
            TypeNode::Function(function) => {
                for param in &function.params {
                    if let Some(annotation) = &param.type_annotation {
                        self.bind_type(annotation);
                    }
                }
                self.bind_type(&function.return_type);
            }
            TypeNode::Object(object) => {
                for member in &object.members {
                    self.bind_type_member(member);
                }
            }
            TypeNode::Union(union) => {
                for member in &union.types {
                    self.bind_type(member);
                }
            }
            TypeNode::Intersection(intersection) => {
                for member in &intersection.types {
                    self.bind_type(member);
                }
            }
            TypeNode::Literal(_) => {}
            TypeNode::Paren(inner) => self.bind_type(inner),
        }
    }

    // =========================================================================
    // Post passes
    // =========================================================================

    fn collect_exports(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Variable(decl) if decl.export => {
                    for ident in decl.name.bound_idents() {
                        self.out.exports.push(ExportEntry {
                            local: ident.name.clone(),
                            exported: ident.name.clone(),
                            source: None,
                        });
                    }
                }
                Statement::Function(func) if func.export => {
                    self.push_simple_export(&func.name.name);
                }
                Statement::Class(class) if class.export => {
                    self.push_simple_export(&class.name.name);
                }
                Statement::Interface(iface) if iface.export => {
                    self.push_simple_export(&iface.name.name);
                }
                Statement::Enum(decl) if decl.export => {
                    self.push_simple_export(&decl.name.name);
                }
                Statement::TypeAlias(alias) if alias.export => {
                    self.push_simple_export(&alias.name.name);
                }
                Statement::ExportNamed(export) => {
                    for specifier in &export.specifiers {
                        self.out.exports.push(ExportEntry {
                            local: specifier.local.clone(),
                            exported: specifier.exported.clone(),
                            source: export.source.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn push_simple_export(&mut self, name: &str) {
        self.out.exports.push(ExportEntry {
            local: name.to_string(),
            exported: name.to_string(),
            source: None,
        });
    }

    /// Fixed-point resolution of supported generic-function values:
    /// generic function declarations, effectively-const variables initialized
    /// with generic function literals, and const aliases of either.
    fn resolve_generic_values(&mut self) {
        let mut supported: FxHashSet<DeclId> = FxHashSet::default();

        for candidate in &self.generic_candidates {
            if let GenericCandidate::GenericFunctionValue(decl) = candidate {
                let is_function_decl = matches!(
                    self.out.decls.get(decl).map(|d| d.kind),
                    Some(DeclKind::Function)
                );
                if is_function_decl || self.out.is_effectively_const(*decl) {
                    supported.insert(*decl);
                }
            }
        }

        // Alias edges run to a fixed point so chains resolve regardless of
        // declaration order.
        loop {
            let mut changed = false;
            for candidate in &self.generic_candidates {
                if let GenericCandidate::Alias { decl, points_at } = candidate
                    && !supported.contains(decl)
                    && supported.contains(points_at)
                    && self.out.is_effectively_const(*decl)
                {
                    supported.insert(*decl);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // Only value declarations count; plain function declarations are
        // already functions and need no lowering entry.
        self.out.generic_values = supported
            .into_iter()
            .filter(|decl| {
                matches!(
                    self.out.decls.get(decl).map(|d| d.kind),
                    Some(DeclKind::Const | DeclKind::Let)
                )
            })
            .collect();
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
