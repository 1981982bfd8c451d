//! IR data model.
//!
//! Closed sum types throughout. Every expression carries an optional
//! `inferred_type` and an optional `source_span`; passes rebuild nodes
//! rather than mutating shared state.

use indexmap::IndexMap;
use tsonic_binder::DeclId;
use tsonic_common::Span;
use tsonic_types::IrType;

/// The whole program in dependency order.
#[derive(Debug, Clone, Default)]
pub struct IrProgram {
    pub modules: Vec<IrModule>,
}

/// How a local name imported into a module resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBinding {
    /// Fully-qualified container (namespace + container class) of the
    /// defining module, or the CLR type for bound assemblies.
    pub fq_container: String,
    /// The name as exported by the defining module.
    pub export_name: String,
    pub kind: ImportBindingKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImportBindingKind {
    Value,
    Type,
}

#[derive(Debug, Clone)]
pub struct IrModule {
    pub source_path: String,
    /// Relative output path of the emitted C# file.
    pub output_path: String,
    pub namespace: String,
    pub container_name: String,
    /// `using` directives required by imports (CLR namespaces, bound
    /// assemblies).
    pub using_imports: Vec<String>,
    pub body: Vec<IrStatement>,
    pub exports: Vec<String>,
    pub has_top_level_code: bool,
    /// Whether this module is the configured entry point.
    pub is_entry_point: bool,
    /// Local import name -> binding.
    pub import_bindings: IndexMap<String, ImportBinding>,
    /// Synthetic interfaces registered during building; appended to the body
    /// by the synthetics finalization pass.
    pub synthetics: Vec<IrInterfaceDeclaration>,
}

// =============================================================================
// Statements
// =============================================================================

#[derive(Debug, Clone)]
pub enum IrStatement {
    VariableDeclaration(IrVariableDeclaration),
    FunctionDeclaration(IrFunctionDeclaration),
    ClassDeclaration(IrClassDeclaration),
    InterfaceDeclaration(IrInterfaceDeclaration),
    EnumDeclaration(IrEnumDeclaration),
    TypeAliasDeclaration(IrTypeAliasDeclaration),
    ExpressionStatement(IrExpression),
    If(IrIf),
    While(IrWhile),
    DoWhile(IrDoWhile),
    For(IrFor),
    ForOf(IrForOf),
    ForIn(IrForIn),
    Switch(IrSwitch),
    Try(IrTry),
    Throw(IrExpression),
    Block(Vec<IrStatement>),
    Break,
    Continue,
    Empty,
    Return(Option<IrExpression>),
    /// Produced only by generator lowering.
    YieldStatement(IrYieldStatement),
    /// Produced only by generator lowering.
    GeneratorReturnStatement(Option<IrExpression>),
    /// Source syntax with no C# mapping; the unsupported-features pass
    /// turns these into diagnostics and removes them.
    Unsupported { what: String, span: Span },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrDeclKind {
    Const,
    Let,
    Var,
}

#[derive(Debug, Clone)]
pub struct IrVariableDeclaration {
    pub name: String,
    pub decl: Option<DeclId>,
    pub decl_kind: IrDeclKind,
    /// Explicit declared type. Required for module-level and exported
    /// declarations (C# static fields need one).
    pub declared_type: Option<IrType>,
    pub initializer: Option<IrExpression>,
    pub exported: bool,
    /// Whether the binding is ever reassigned.
    pub is_written: bool,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ParamPassing {
    #[default]
    Value,
    Ref,
    Out,
    In,
    InRef,
}

#[derive(Debug, Clone)]
pub struct IrTypeParamDecl {
    pub name: String,
    pub constraint: Option<IrType>,
}

#[derive(Debug, Clone)]
pub struct IrParamDecl {
    pub name: String,
    pub decl: Option<DeclId>,
    pub ty: Option<IrType>,
    pub optional: bool,
    pub is_rest: bool,
    pub passing: ParamPassing,
    pub default_value: Option<IrExpression>,
}

/// An attribute attached by the attribute-collection pass.
#[derive(Debug, Clone, PartialEq)]
pub struct IrAttribute {
    pub attribute_type: String,
    pub arguments: Vec<IrAttributeArgument>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrAttributeArgument {
    String(String),
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone)]
pub struct IrFunctionDeclaration {
    pub name: String,
    pub decl: Option<DeclId>,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<IrTypeParamDecl>,
    pub params: Vec<IrParamDecl>,
    pub return_type: Option<IrType>,
    pub body: Vec<IrStatement>,
    pub exported: bool,
    pub attributes: Vec<IrAttribute>,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrVisibility {
    Public,
    Private,
    Protected,
}

#[derive(Debug, Clone)]
pub struct IrClassDeclaration {
    pub name: String,
    pub type_params: Vec<IrTypeParamDecl>,
    pub base: Option<IrType>,
    pub implements: Vec<IrType>,
    pub members: Vec<IrClassMember>,
    pub is_struct: bool,
    pub is_abstract: bool,
    pub exported: bool,
    pub attributes: Vec<IrAttribute>,
    pub ctor_attributes: Vec<IrAttribute>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrClassMember {
    Field(IrFieldMember),
    Method(IrMethodMember),
}

#[derive(Debug, Clone)]
pub struct IrFieldMember {
    pub name: String,
    pub ty: Option<IrType>,
    pub initializer: Option<IrExpression>,
    pub visibility: IrVisibility,
    pub is_static: bool,
    pub is_readonly: bool,
    pub optional: bool,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrMethodKind {
    Method,
    Constructor,
    Getter,
    Setter,
}

#[derive(Debug, Clone)]
pub struct IrMethodMember {
    pub name: String,
    pub kind: IrMethodKind,
    pub visibility: IrVisibility,
    pub is_static: bool,
    pub is_async: bool,
    pub is_generator: bool,
    pub type_params: Vec<IrTypeParamDecl>,
    pub params: Vec<IrParamDecl>,
    pub return_type: Option<IrType>,
    pub body: Option<Vec<IrStatement>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IrInterfaceDeclaration {
    pub name: String,
    pub type_params: Vec<IrTypeParamDecl>,
    pub extends: Vec<IrType>,
    pub members: Vec<IrInterfaceMember>,
    pub is_struct: bool,
    pub exported: bool,
    /// True for compiler-introduced anonymous/union-arm interfaces.
    pub synthetic: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrInterfaceMember {
    Property(IrPropertySignature),
    Method(IrMethodSignature),
}

#[derive(Debug, Clone)]
pub struct IrPropertySignature {
    pub name: String,
    pub ty: IrType,
    pub optional: bool,
    pub readonly: bool,
}

#[derive(Debug, Clone)]
pub struct IrMethodSignature {
    pub name: String,
    pub type_params: Vec<IrTypeParamDecl>,
    pub params: Vec<IrParamDecl>,
    pub return_type: Option<IrType>,
}

#[derive(Debug, Clone)]
pub struct IrEnumDeclaration {
    pub name: String,
    pub members: Vec<IrEnumMember>,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IrEnumMember {
    pub name: String,
    pub initializer: Option<IrExpression>,
}

#[derive(Debug, Clone)]
pub struct IrTypeAliasDeclaration {
    pub name: String,
    pub type_params: Vec<IrTypeParamDecl>,
    pub ty: IrType,
    pub exported: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IrIf {
    pub condition: IrExpression,
    pub then_branch: Box<IrStatement>,
    pub else_branch: Option<Box<IrStatement>>,
}

#[derive(Debug, Clone)]
pub struct IrWhile {
    pub condition: IrExpression,
    pub body: Box<IrStatement>,
}

#[derive(Debug, Clone)]
pub struct IrDoWhile {
    pub body: Box<IrStatement>,
    pub condition: IrExpression,
}

#[derive(Debug, Clone)]
pub struct IrFor {
    pub init: Option<Box<IrStatement>>,
    pub condition: Option<IrExpression>,
    pub update: Option<IrExpression>,
    pub body: Box<IrStatement>,
}

#[derive(Debug, Clone)]
pub struct IrForOf {
    pub binding: String,
    pub binding_decl: Option<DeclId>,
    pub binding_type: Option<IrType>,
    pub iterable: IrExpression,
    pub body: Box<IrStatement>,
}

#[derive(Debug, Clone)]
pub struct IrForIn {
    pub binding: String,
    pub binding_decl: Option<DeclId>,
    pub object: IrExpression,
    pub body: Box<IrStatement>,
}

#[derive(Debug, Clone)]
pub struct IrSwitch {
    pub discriminant: IrExpression,
    pub cases: Vec<IrSwitchCase>,
}

#[derive(Debug, Clone)]
pub struct IrSwitchCase {
    pub test: Option<IrExpression>,
    pub statements: Vec<IrStatement>,
}

#[derive(Debug, Clone)]
pub struct IrTry {
    pub block: Vec<IrStatement>,
    pub catch_param: Option<String>,
    pub catch_block: Option<Vec<IrStatement>>,
    pub finally_block: Option<Vec<IrStatement>>,
}

#[derive(Debug, Clone)]
pub struct IrYieldStatement {
    pub value: Option<IrExpression>,
    pub delegate: bool,
}

// =============================================================================
// Expressions
// =============================================================================

/// An IR expression: a kind plus the inference/provenance annotations every
/// expression carries.
#[derive(Debug, Clone)]
pub struct IrExpression {
    pub kind: IrExpressionKind,
    pub inferred_type: Option<IrType>,
    pub source_span: Option<Span>,
}

impl IrExpression {
    pub fn new(kind: IrExpressionKind) -> Self {
        Self {
            kind,
            inferred_type: None,
            source_span: None,
        }
    }

    #[must_use]
    pub fn with_type(mut self, ty: IrType) -> Self {
        self.inferred_type = Some(ty);
        self
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.source_span = Some(span);
        self
    }
}

/// How an element access resolves, decided during IR construction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessKind {
    /// Native CLR indexer (`T[]`, `Span<T>`, CLR `this[int]`).
    ClrIndexer,
    /// JS-runtime array (`List<T>` in emission).
    JsRuntimeArray,
    /// `string` character access.
    StringChar,
    /// Dictionary lookup; index proof does not apply.
    Dictionary,
    Unknown,
}

impl AccessKind {
    /// Whether the numeric proof must establish an Int32 index.
    pub const fn requires_int32_index(self) -> bool {
        matches!(self, Self::ClrIndexer | Self::JsRuntimeArray | Self::StringChar)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IrLiteralValue {
    Number(f64),
    String(String),
    Bool(bool),
    Null,
    Undefined,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrBinaryOp {
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
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Instanceof,
    In,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrLogicalOp {
    And,
    Or,
    Coalesce,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrUnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrAssignOp {
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
pub enum MemberKey {
    Name(String),
    Index(Box<IrExpression>),
}

#[derive(Debug, Clone)]
pub enum IrExpressionKind {
    Literal {
        value: IrLiteralValue,
    },
    Identifier {
        name: String,
        decl: Option<DeclId>,
    },
    MemberAccess {
        object: Box<IrExpression>,
        member: MemberKey,
        access_kind: AccessKind,
        optional: bool,
    },
    Call {
        callee: Box<IrExpression>,
        type_args: Vec<IrType>,
        args: Vec<IrExpression>,
        optional: bool,
    },
    New {
        callee: IrType,
        args: Vec<IrExpression>,
    },
    Binary {
        op: IrBinaryOp,
        left: Box<IrExpression>,
        right: Box<IrExpression>,
    },
    Logical {
        op: IrLogicalOp,
        left: Box<IrExpression>,
        right: Box<IrExpression>,
    },
    Unary {
        op: IrUnaryOp,
        operand: Box<IrExpression>,
    },
    Update {
        increment: bool,
        prefix: bool,
        operand: Box<IrExpression>,
    },
    Conditional {
        condition: Box<IrExpression>,
        when_true: Box<IrExpression>,
        when_false: Box<IrExpression>,
    },
    Assignment {
        op: IrAssignOp,
        target: Box<IrExpression>,
        value: Box<IrExpression>,
    },
    ArrayLiteral {
        elements: Vec<IrExpression>,
    },
    ObjectLiteral {
        /// Reference to the nominal (possibly synthetic) type constructed.
        target_type: Option<IrType>,
        properties: Vec<(String, IrExpression)>,
    },
    FunctionValue {
        is_async: bool,
        is_generator: bool,
        params: Vec<IrParamDecl>,
        return_type: Option<IrType>,
        body: Vec<IrStatement>,
        /// Set for expression-bodied arrows; return finalization reads the
        /// trailing expression's type through it.
        is_expression_body: bool,
    },
    TemplateLiteral {
        head: String,
        spans: Vec<(IrExpression, String)>,
    },
    Spread {
        expression: Box<IrExpression>,
    },
    This,
    Await {
        expression: Box<IrExpression>,
    },
    Yield {
        expression: Option<Box<IrExpression>>,
        delegate: bool,
    },
    TypeAssertion {
        expression: Box<IrExpression>,
        target: IrType,
    },
    TryCast {
        expression: Box<IrExpression>,
        target: IrType,
    },
    StackAlloc {
        element: IrType,
        length: Box<IrExpression>,
    },
    NumericNarrowing {
        expression: Box<IrExpression>,
        target_kind: tsonic_common::NumericKind,
    },
    /// `import("./x.ts")`. A static local specifier is a dependency edge
    /// only; anything else is rejected by validation.
    DynamicImport {
        specifier: Option<String>,
    },
    /// `import.meta` and friends; rejected by validation.
    UnsupportedExpression {
        what: String,
    },
}
