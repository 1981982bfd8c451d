//! The typed AST.
//!
//! AST nodes are produced once by the parser and never mutated. Identifiers
//! and declarations carry a file-unique `NodeId` the binder keys on.

use tsonic_common::{Span, Spanned};

/// File-unique id for nodes the binder needs to address.
pub type NodeId = u32;

/// One parsed source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path as given to the compiler.
    pub path: String,
    /// The source text (kept for line/column resolution downstream).
    pub source: String,
    pub statements: Vec<Statement>,
}

/// An identifier use or declaration name.
#[derive(Debug, Clone)]
pub struct Ident {
    pub id: NodeId,
    pub name: String,
    pub span: Span,
}

impl Spanned for Ident {
    fn span(&self) -> Span {
        self.span
    }
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone)]
pub enum Statement {
    Variable(VariableDeclaration),
    Function(FunctionDeclaration),
    Class(ClassDeclaration),
    Interface(InterfaceDeclaration),
    Enum(EnumDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Import(ImportDeclaration),
    ExportNamed(ExportNamedDeclaration),
    Expression(ExpressionStatement),
    If(IfStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    For(ForStatement),
    ForOf(ForOfStatement),
    ForIn(ForInStatement),
    Switch(SwitchStatement),
    Try(TryStatement),
    Throw(ThrowStatement),
    Block(Block),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Return(ReturnStatement),
    Empty(Span),
    With(WithStatement),
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        match self {
            Statement::Variable(s) => s.span,
            Statement::Function(s) => s.span,
            Statement::Class(s) => s.span,
            Statement::Interface(s) => s.span,
            Statement::Enum(s) => s.span,
            Statement::TypeAlias(s) => s.span,
            Statement::Import(s) => s.span,
            Statement::ExportNamed(s) => s.span,
            Statement::Expression(s) => s.span,
            Statement::If(s) => s.span,
            Statement::While(s) => s.span,
            Statement::DoWhile(s) => s.span,
            Statement::For(s) => s.span,
            Statement::ForOf(s) => s.span,
            Statement::ForIn(s) => s.span,
            Statement::Switch(s) => s.span,
            Statement::Try(s) => s.span,
            Statement::Throw(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Break(s) => s.span,
            Statement::Continue(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Empty(span) => *span,
            Statement::With(s) => s.span,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VarKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone)]
pub struct VariableDeclaration {
    pub id: NodeId,
    pub kind: VarKind,
    pub name: Pattern,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub export: bool,
    pub declare: bool,
    pub span: Span,
}

/// Binding patterns. The restricted input language allows destructuring only
/// in variable declarations and assignment targets.
#[derive(Debug, Clone)]
pub enum Pattern {
    Ident(Ident),
    Array(ArrayPattern),
    Object(ObjectPattern),
}

impl Pattern {
    /// The single identifier, if this is a simple binding.
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Pattern::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Collect every identifier bound by this pattern.
    pub fn bound_idents(&self) -> Vec<&Ident> {
        let mut out = Vec::new();
        self.collect_idents(&mut out);
        out
    }

    fn collect_idents<'a>(&'a self, out: &mut Vec<&'a Ident>) {
        match self {
            Pattern::Ident(ident) => out.push(ident),
            Pattern::Array(arr) => {
                for element in arr.elements.iter().flatten() {
                    element.collect_idents(out);
                }
            }
            Pattern::Object(obj) => {
                for prop in &obj.properties {
                    prop.value.collect_idents(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArrayPattern {
    pub elements: Vec<Option<Pattern>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectPattern {
    pub properties: Vec<ObjectPatternProp>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectPatternProp {
    pub key: String,
    pub value: Pattern,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionDeclaration {
    pub id: NodeId,
    pub name: Ident,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub body: Option<Block>,
    pub export: bool,
    pub declare: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeParam {
    pub id: NodeId,
    pub name: Ident,
    pub constraint: Option<TypeNode>,
    pub default: Option<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub id: NodeId,
    pub name: Ident,
    pub type_annotation: Option<TypeNode>,
    pub optional: bool,
    pub is_rest: bool,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone)]
pub struct ClassDeclaration {
    pub id: NodeId,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Option<TypeNode>,
    pub implements: Vec<TypeNode>,
    pub members: Vec<ClassMember>,
    pub is_abstract: bool,
    pub export: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ClassMember {
    Property(PropertyMember),
    Method(MethodMember),
}

#[derive(Debug, Clone)]
pub struct PropertyMember {
    pub id: NodeId,
    pub name: String,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub optional: bool,
    pub type_annotation: Option<TypeNode>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodKind {
    Method,
    Constructor,
    Getter,
    Setter,
}

#[derive(Debug, Clone)]
pub struct MethodMember {
    pub id: NodeId,
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct InterfaceDeclaration {
    pub id: NodeId,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub extends: Vec<TypeNode>,
    pub members: Vec<TypeMember>,
    pub export: bool,
    pub span: Span,
}

/// Members of interfaces and inline object types.
#[derive(Debug, Clone)]
pub enum TypeMember {
    Property(PropertySignature),
    Method(MethodSignature),
    Index(IndexSignature),
}

#[derive(Debug, Clone)]
pub struct PropertySignature {
    pub name: String,
    pub optional: bool,
    pub readonly: bool,
    pub type_annotation: Option<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct MethodSignature {
    pub name: String,
    pub optional: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IndexSignature {
    pub key_name: String,
    pub key_type: TypeNode,
    pub value_type: TypeNode,
    pub readonly: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumDeclaration {
    pub id: NodeId,
    pub name: Ident,
    pub members: Vec<EnumMember>,
    pub export: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct EnumMember {
    pub name: String,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAliasDeclaration {
    pub id: NodeId,
    pub name: Ident,
    pub type_params: Vec<TypeParam>,
    pub ty: TypeNode,
    pub export: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportDeclaration {
    pub specifiers: Vec<ImportSpecifier>,
    /// `import * as ns from "..."`
    pub namespace: Option<Ident>,
    /// The module specifier string (unquoted).
    pub module: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ImportSpecifier {
    /// Name as exported by the source module.
    pub imported: String,
    /// Local binding (differs under `as`).
    pub local: Ident,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExportNamedDeclaration {
    pub specifiers: Vec<ExportSpecifier>,
    /// `export { x } from "./other"`.
    pub source: Option<String>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExportSpecifier {
    pub local: String,
    pub exported: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DoWhileStatement {
    pub body: Box<Statement>,
    pub condition: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ForInit {
    Variable(VariableDeclaration),
    Expression(Expression),
}

#[derive(Debug, Clone)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub condition: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForOfStatement {
    /// `None` when iterating with a pre-declared binding (`for (x of ...)`)
    pub decl_kind: Option<VarKind>,
    pub binding: Pattern,
    pub iterable: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ForInStatement {
    pub decl_kind: Option<VarKind>,
    pub binding: Pattern,
    pub object: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the `default` clause.
    pub test: Option<Expression>,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TryStatement {
    pub block: Block,
    pub catch: Option<CatchClause>,
    pub finally: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Option<Ident>,
    pub param_id: NodeId,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ThrowStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct BreakStatement {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ContinueStatement {
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStatement {
    pub expression: Option<Expression>,
    pub span: Span,
}

/// `with` parses but is always rejected by validation.
#[derive(Debug, Clone)]
pub struct WithStatement {
    pub object: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

// =============================================================================
// Expressions
// =============================================================================

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Ident(Ident),
    PropertyAccess(PropertyAccess),
    ElementAccess(ElementAccess),
    Call(Call),
    New(New),
    Binary(Binary),
    Unary(Unary),
    Update(Update),
    Conditional(Conditional),
    Assignment(Assignment),
    ArrayLit(ArrayLit),
    ObjectLit(ObjectLit),
    Arrow(Arrow),
    FunctionExpr(FunctionExpr),
    Template(Template),
    Spread(Spread),
    This(Span),
    Await(Await),
    Yield(Yield),
    TypeAssertion(TypeAssertion),
    NonNull(NonNull),
    Paren(Paren),
    /// `import("./x.ts")` - recorded for dependency edges only.
    DynamicImport(DynamicImport),
    ImportMeta(Span),
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        match self {
            Expression::Literal(e) => e.span,
            Expression::Ident(e) => e.span,
            Expression::PropertyAccess(e) => e.span,
            Expression::ElementAccess(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::ArrayLit(e) => e.span,
            Expression::ObjectLit(e) => e.span,
            Expression::Arrow(e) => e.span,
            Expression::FunctionExpr(e) => e.span,
            Expression::Template(e) => e.span,
            Expression::Spread(e) => e.span,
            Expression::This(span) => *span,
            Expression::Await(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::TypeAssertion(e) => e.span,
            Expression::NonNull(e) => e.span,
            Expression::Paren(e) => e.span,
            Expression::DynamicImport(e) => e.span,
            Expression::ImportMeta(span) => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LitValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: LitValue,
    /// Raw source text (numeric literals keep their spelling).
    pub raw: String,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct PropertyAccess {
    pub object: Box<Expression>,
    pub name: String,
    pub name_span: Span,
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ElementAccess {
    pub object: Box<Expression>,
    pub index: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub callee: Box<Expression>,
    pub type_args: Vec<TypeNode>,
    pub args: Vec<Expression>,
    pub optional: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct New {
    pub callee: Box<Expression>,
    pub type_args: Vec<TypeNode>,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    BitAnd,
    BitOr,
    BitXor,
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Coalesce,
    Instanceof,
    In,
}

impl BinaryOp {
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or | Self::Coalesce)
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Rem | Self::Exp
        )
    }
}

#[derive(Debug, Clone)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug, Clone)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Update {
    pub increment: bool,
    pub prefix: bool,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Conditional {
    pub condition: Box<Expression>,
    pub when_true: Box<Expression>,
    pub when_false: Box<Expression>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Exp,
    ShiftLeft,
    ShiftRight,
    ShiftRightUnsigned,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
    Coalesce,
}

#[derive(Debug, Clone)]
pub struct Assignment {
    pub op: AssignOp,
    pub target: Box<Expression>,
    pub value: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ArrayLit {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectLit {
    pub properties: Vec<ObjectProp>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum PropKey {
    Ident(String),
    String(String),
    Number(f64),
    Computed(Box<Expression>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PropKind {
    Init,
    Shorthand,
    Method,
    Getter,
    Setter,
    Spread,
}

#[derive(Debug, Clone)]
pub struct ObjectProp {
    pub key: PropKey,
    pub kind: PropKind,
    pub value: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ArrowBody {
    Expr(Box<Expression>),
    Block(Block),
}

#[derive(Debug, Clone)]
pub struct Arrow {
    pub id: NodeId,
    pub is_async: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub body: ArrowBody,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionExpr {
    pub id: NodeId,
    pub name: Option<Ident>,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<TypeParam>,
    pub params: Vec<Param>,
    pub return_type: Option<TypeNode>,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Template {
    /// Cooked text before the first substitution.
    pub head: String,
    /// (substitution expression, cooked text following it) pairs.
    pub spans: Vec<(Expression, String)>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Spread {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Await {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Yield {
    pub expression: Option<Box<Expression>>,
    pub delegate: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TypeAssertion {
    pub expression: Box<Expression>,
    pub ty: TypeNode,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct NonNull {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Paren {
    pub expression: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct DynamicImport {
    pub argument: Box<Expression>,
    pub span: Span,
}

// =============================================================================
// Type syntax
// =============================================================================

#[derive(Debug, Clone)]
pub enum TypeNode {
    /// Reference to a named type, possibly qualified (`Outer.Inner`) and
    /// possibly generic.
    Ref(TypeRef),
    /// `T[]`
    Array(ArrayTypeNode),
    /// `[T, U]`
    Tuple(TupleTypeNode),
    /// `(a: T) => U`
    Function(FunctionTypeNode),
    /// Inline `{ a: T }`
    Object(ObjectTypeNode),
    Union(UnionTypeNode),
    Intersection(IntersectionTypeNode),
    /// `"lit"`, `42`, `true`
    Literal(LiteralTypeNode),
    Paren(Box<TypeNode>),
}

impl Spanned for TypeNode {
    fn span(&self) -> Span {
        match self {
            TypeNode::Ref(t) => t.span,
            TypeNode::Array(t) => t.span,
            TypeNode::Tuple(t) => t.span,
            TypeNode::Function(t) => t.span,
            TypeNode::Object(t) => t.span,
            TypeNode::Union(t) => t.span,
            TypeNode::Intersection(t) => t.span,
            TypeNode::Literal(t) => t.span,
            TypeNode::Paren(t) => t.span(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TypeRef {
    /// Dotted name parts (`System.Collections` has two parts). The head part
    /// carries a `NodeId` so the binder can resolve it.
    pub head: Ident,
    pub rest: Vec<String>,
    pub type_args: Vec<TypeNode>,
    pub span: Span,
}

impl TypeRef {
    /// Render the full dotted name.
    pub fn dotted_name(&self) -> String {
        if self.rest.is_empty() {
            self.head.name.clone()
        } else {
            let mut name = self.head.name.clone();
            for part in &self.rest {
                name.push('.');
                name.push_str(part);
            }
            name
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArrayTypeNode {
    pub element: Box<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct TupleTypeNode {
    pub elements: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FunctionTypeNode {
    pub params: Vec<Param>,
    pub return_type: Box<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ObjectTypeNode {
    pub members: Vec<TypeMember>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UnionTypeNode {
    pub types: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IntersectionTypeNode {
    pub types: Vec<TypeNode>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct LiteralTypeNode {
    pub value: LitValue,
    pub span: Span,
}
