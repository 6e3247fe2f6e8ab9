//! Abstract Syntax Tree (AST) definitions for JavaScript.
//!
//! The node shapes follow ESTree. Every node carries a [`Span`] of byte
//! offsets; line/column information is attached to the span only when the
//! parser was asked for locations.
//!
//! Ownership is strictly tree shaped. There are no parent pointers; use
//! [`visit::Visit`] to walk a tree.

pub mod visit;

pub use crate::lexer::{Position, SourceLocation, Span};

/// A complete JavaScript program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Always covers the whole source text
    pub span: Span,
    /// Script or module goal
    pub source_type: SourceType,
    /// The statements in the program
    pub body: Vec<Statement>,
}

/// The goal symbol a program was parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceType {
    /// Classic script
    Script,
    /// ES module
    Module,
}

/// An identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    /// Source range
    pub span: Span,
    /// The name with escapes decoded
    pub name: String,
}

/// A private class member name such as `#count`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrivateIdentifier {
    /// Source range, including the `#`
    pub span: Span,
    /// The name without the `#`
    pub name: String,
}

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// A JavaScript statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Expression statement, possibly a directive
    Expression(ExpressionStatement),
    /// Block statement { ... }
    Block(BlockStatement),
    /// Empty statement (;)
    Empty(Span),
    /// Debugger statement
    Debugger(Span),
    /// With statement (sloppy mode only)
    With(WithStatement),
    /// Return statement
    Return(ReturnStatement),
    /// Labeled statement
    Labeled(LabeledStatement),
    /// Break statement
    Break(BreakStatement),
    /// Continue statement
    Continue(ContinueStatement),
    /// If statement
    If(IfStatement),
    /// Switch statement
    Switch(SwitchStatement),
    /// Throw statement
    Throw(ThrowStatement),
    /// Try statement
    Try(TryStatement),
    /// While statement
    While(WhileStatement),
    /// Do-while statement
    DoWhile(DoWhileStatement),
    /// For statement
    For(ForStatement),
    /// For-in statement
    ForIn(ForInStatement),
    /// For-of statement
    ForOf(ForOfStatement),
    /// Function declaration
    FunctionDeclaration(Box<Function>),
    /// Variable declaration (var, let, const)
    VariableDeclaration(VariableDeclaration),
    /// Class declaration
    ClassDeclaration(Box<Class>),
    /// import declaration
    Import(ImportDeclaration),
    /// export of declarations or a specifier list
    ExportNamed(ExportNamedDeclaration),
    /// export default
    ExportDefault(ExportDefaultDeclaration),
    /// export * from
    ExportAll(ExportAllDeclaration),
}

impl Statement {
    /// Returns the source range of this statement.
    pub fn span(&self) -> Span {
        match self {
            Statement::Expression(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::Empty(span) | Statement::Debugger(span) => *span,
            Statement::With(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Labeled(s) => s.span,
            Statement::Break(s) => s.span,
            Statement::Continue(s) => s.span,
            Statement::If(s) => s.span,
            Statement::Switch(s) => s.span,
            Statement::Throw(s) => s.span,
            Statement::Try(s) => s.span,
            Statement::While(s) => s.span,
            Statement::DoWhile(s) => s.span,
            Statement::For(s) => s.span,
            Statement::ForIn(s) => s.span,
            Statement::ForOf(s) => s.span,
            Statement::FunctionDeclaration(f) => f.span,
            Statement::VariableDeclaration(d) => d.span,
            Statement::ClassDeclaration(c) => c.span,
            Statement::Import(d) => d.span,
            Statement::ExportNamed(d) => d.span,
            Statement::ExportDefault(d) => d.span,
            Statement::ExportAll(d) => d.span,
        }
    }

    /// Returns the directive text if this is a directive prologue entry.
    pub fn directive(&self) -> Option<&str> {
        match self {
            Statement::Expression(s) => s.directive.as_deref(),
            _ => None,
        }
    }
}

/// An expression statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    /// Source range
    pub span: Span,
    /// The expression
    pub expression: Expression,
    /// Decoded string value when the statement belongs to a directive prologue
    pub directive: Option<String>,
}

/// A block statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockStatement {
    /// Source range
    pub span: Span,
    /// The statements in the block
    pub body: Vec<Statement>,
}

/// A with statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WithStatement {
    /// Source range
    pub span: Span,
    /// The object expression
    pub object: Expression,
    /// The body statement
    pub body: Box<Statement>,
}

/// A return statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    /// Source range
    pub span: Span,
    /// The return value
    pub argument: Option<Expression>,
}

/// A labeled statement.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStatement {
    /// Source range
    pub span: Span,
    /// The label identifier
    pub label: Identifier,
    /// The labeled body
    pub body: Box<Statement>,
}

/// A break statement.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    /// Source range
    pub span: Span,
    /// Target label, if any
    pub label: Option<Identifier>,
}

/// A continue statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    /// Source range
    pub span: Span,
    /// Target label, if any
    pub label: Option<Identifier>,
}

/// An if statement.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    /// Source range
    pub span: Span,
    /// The condition
    pub test: Expression,
    /// The then branch
    pub consequent: Box<Statement>,
    /// The optional else branch
    pub alternate: Option<Box<Statement>>,
}

/// A switch statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    /// Source range
    pub span: Span,
    /// The discriminant expression
    pub discriminant: Expression,
    /// The case clauses
    pub cases: Vec<SwitchCase>,
}

/// A switch case clause.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchCase {
    /// Source range
    pub span: Span,
    /// The test expression (None for default)
    pub test: Option<Expression>,
    /// The consequent statements
    pub consequent: Vec<Statement>,
}

/// A throw statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowStatement {
    /// Source range
    pub span: Span,
    /// The thrown expression
    pub argument: Expression,
}

/// A try statement.
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    /// Source range
    pub span: Span,
    /// The try block
    pub block: BlockStatement,
    /// The catch clause
    pub handler: Option<CatchClause>,
    /// The finally block
    pub finalizer: Option<BlockStatement>,
}

/// A catch clause.
#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    /// Source range
    pub span: Span,
    /// The error parameter; absent for `catch {}`
    pub param: Option<Pattern>,
    /// The catch body
    pub body: BlockStatement,
}

/// A while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    /// Source range
    pub span: Span,
    /// The condition
    pub test: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A do-while statement.
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    /// Source range
    pub span: Span,
    /// The loop body
    pub body: Box<Statement>,
    /// The condition
    pub test: Expression,
}

/// A for statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    /// Source range
    pub span: Span,
    /// The initializer
    pub init: Option<ForInit>,
    /// The condition
    pub test: Option<Expression>,
    /// The update expression
    pub update: Option<Expression>,
    /// The loop body
    pub body: Box<Statement>,
}

/// For loop initializer.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    /// Variable declaration
    Declaration(VariableDeclaration),
    /// Expression
    Expression(Expression),
}

/// A for-in statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForInStatement {
    /// Source range
    pub span: Span,
    /// The left-hand side
    pub left: ForInLeft,
    /// The object to iterate over
    pub right: Expression,
    /// The loop body
    pub body: Box<Statement>,
}

/// A for-of statement.
#[derive(Debug, Clone, PartialEq)]
pub struct ForOfStatement {
    /// Source range
    pub span: Span,
    /// The left-hand side
    pub left: ForInLeft,
    /// The iterable
    pub right: Expression,
    /// The loop body
    pub body: Box<Statement>,
    /// `for await (...)`
    pub is_await: bool,
}

/// Left-hand side of for-in/for-of.
#[derive(Debug, Clone, PartialEq)]
pub enum ForInLeft {
    /// Variable declaration without initializer
    Declaration(VariableDeclaration),
    /// Assignment target
    Pattern(Pattern),
}

/// Variable declaration kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// var declaration
    Var,
    /// let declaration
    Let,
    /// const declaration
    Const,
}

impl VariableKind {
    /// Returns the keyword.
    pub fn as_str(self) -> &'static str {
        match self {
            VariableKind::Var => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
        }
    }
}

/// A variable declaration statement.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    /// Source range
    pub span: Span,
    /// The kind of declaration
    pub kind: VariableKind,
    /// The declarators
    pub declarations: Vec<VariableDeclarator>,
}

/// A single variable declarator.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    /// Source range
    pub span: Span,
    /// The binding target
    pub id: Pattern,
    /// Optional initializer expression
    pub init: Option<Expression>,
}

// ---------------------------------------------------------------------------
// Functions and classes
// ---------------------------------------------------------------------------

/// A function declaration, expression or method value.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Source range
    pub span: Span,
    /// The function name
    pub id: Option<Identifier>,
    /// The parameters
    pub params: Vec<Pattern>,
    /// The function body
    pub body: FunctionBody,
    /// Whether this is an async function
    pub is_async: bool,
    /// Whether this is a generator function
    pub is_generator: bool,
}

/// The braced body of a function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionBody {
    /// Source range
    pub span: Span,
    /// The statements, directives first
    pub body: Vec<Statement>,
}

/// An arrow function expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowFunctionExpression {
    /// Source range
    pub span: Span,
    /// Parameters
    pub params: Vec<Pattern>,
    /// Body (expression or block)
    pub body: ArrowBody,
    /// Whether async
    pub is_async: bool,
}

/// Arrow function body.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrowBody {
    /// Expression body
    Expression(Box<Expression>),
    /// Block body
    Block(FunctionBody),
}

/// A class declaration or expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Class {
    /// Source range
    pub span: Span,
    /// The class name
    pub id: Option<Identifier>,
    /// The `extends` clause
    pub super_class: Option<Box<Expression>>,
    /// The class body
    pub body: ClassBody,
}

/// The braced body of a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassBody {
    /// Source range
    pub span: Span,
    /// Methods, fields and static blocks in source order
    pub body: Vec<ClassElement>,
}

/// A class member.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassElement {
    /// Method, getter, setter or constructor
    Method(MethodDefinition),
    /// Field
    Property(PropertyDefinition),
    /// `static { ... }`
    StaticBlock(StaticBlock),
}

impl ClassElement {
    /// Returns the source range of this element.
    pub fn span(&self) -> Span {
        match self {
            ClassElement::Method(m) => m.span,
            ClassElement::Property(p) => p.span,
            ClassElement::StaticBlock(b) => b.span,
        }
    }
}

/// Kinds of class methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    /// `constructor() {}`
    Constructor,
    /// Ordinary method
    Method,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// A method definition inside a class body.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// Source range
    pub span: Span,
    /// Name; an identifier, literal, private name or computed expression
    pub key: Expression,
    /// The function value
    pub value: Box<Function>,
    /// Constructor, method or accessor
    pub kind: MethodKind,
    /// `[expr]` key
    pub computed: bool,
    /// Declared with `static`
    pub is_static: bool,
}

/// A class field.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDefinition {
    /// Source range
    pub span: Span,
    /// The field name
    pub key: Expression,
    /// Initializer
    pub value: Option<Expression>,
    /// The key was written in brackets
    pub computed: bool,
    /// Declared with `static`
    pub is_static: bool,
}

/// A class static initialization block.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBlock {
    /// Source range
    pub span: Span,
    /// Statements inside the block
    pub body: Vec<Statement>,
}

// ---------------------------------------------------------------------------
// Modules
// ---------------------------------------------------------------------------

/// An import declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDeclaration {
    /// Source range
    pub span: Span,
    /// Imported bindings; empty for `import "mod"`
    pub specifiers: Vec<ImportDeclarationSpecifier>,
    /// Module specifier string
    pub source: Literal,
}

/// One binding of an import declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportDeclarationSpecifier {
    /// `{ a as b }`
    Specifier(ImportSpecifier),
    /// `a`
    Default(ImportDefaultSpecifier),
    /// `* as ns`
    Namespace(ImportNamespaceSpecifier),
}

impl ImportDeclarationSpecifier {
    /// Returns the local binding.
    pub fn local(&self) -> &Identifier {
        match self {
            ImportDeclarationSpecifier::Specifier(s) => &s.local,
            ImportDeclarationSpecifier::Default(s) => &s.local,
            ImportDeclarationSpecifier::Namespace(s) => &s.local,
        }
    }
}

/// `imported as local`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpecifier {
    /// Source range
    pub span: Span,
    /// Name exported by the source module
    pub imported: ModuleExportName,
    /// Local binding
    pub local: Identifier,
}

/// A default import binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDefaultSpecifier {
    /// Source range
    pub span: Span,
    /// Local binding for the default export
    pub local: Identifier,
}

/// A namespace import binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportNamespaceSpecifier {
    /// Source range
    pub span: Span,
    /// Local binding for the namespace object
    pub local: Identifier,
}

/// A name in an import or export list: an identifier or a string.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleExportName {
    /// Plain name
    Identifier(Identifier),
    /// String literal name
    Literal(Literal),
}

impl ModuleExportName {
    /// Returns the exported name as text.
    pub fn name(&self) -> &str {
        match self {
            ModuleExportName::Identifier(id) => &id.name,
            ModuleExportName::Literal(lit) => match &lit.value {
                LiteralValue::String(s) => s,
                _ => &lit.raw,
            },
        }
    }

    /// Returns the source range.
    pub fn span(&self) -> Span {
        match self {
            ModuleExportName::Identifier(id) => id.span,
            ModuleExportName::Literal(lit) => lit.span,
        }
    }
}

/// `export <declaration>` or `export { a, b as c } [from "mod"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportNamedDeclaration {
    /// Source range
    pub span: Span,
    /// Exported declaration
    pub declaration: Option<Box<Statement>>,
    /// `{ a as b }` entries; empty when a declaration is exported
    pub specifiers: Vec<ExportSpecifier>,
    /// Re-export source
    pub source: Option<Literal>,
}

/// `local as exported`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSpecifier {
    /// Source range
    pub span: Span,
    /// Name in this module
    pub local: ModuleExportName,
    /// Name seen by importers
    pub exported: ModuleExportName,
}

/// `export default ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDefaultDeclaration {
    /// Source range
    pub span: Span,
    /// The exported declaration or expression
    pub declaration: ExportDefaultKind,
}

/// What follows `export default`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportDefaultKind {
    /// Function declaration, possibly anonymous
    Function(Box<Function>),
    /// Class declaration, possibly anonymous
    Class(Box<Class>),
    /// Any assignment expression
    Expression(Expression),
}

/// `export * [as name] from "mod"`
#[derive(Debug, Clone, PartialEq)]
pub struct ExportAllDeclaration {
    /// Source range
    pub span: Span,
    /// `as name`, if present
    pub exported: Option<ModuleExportName>,
    /// Module specifier
    pub source: Literal,
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// A JavaScript expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Identifier reference
    Identifier(Identifier),
    /// `#name`, as a member property, a class key or the left of `in`
    PrivateIdentifier(PrivateIdentifier),
    /// Literal value
    Literal(Literal),
    /// this keyword
    This(Span),
    /// super keyword, only as a callee or member object
    Super(Span),
    /// Array literal
    Array(ArrayExpression),
    /// Object literal
    Object(ObjectExpression),
    /// Function expression
    Function(Box<Function>),
    /// Arrow function expression
    Arrow(Box<ArrowFunctionExpression>),
    /// Class expression
    Class(Box<Class>),
    /// Untagged template literal
    TemplateLiteral(TemplateLiteral),
    /// Tagged template
    TaggedTemplate(TaggedTemplateExpression),
    /// Unary expression
    Unary(UnaryExpression),
    /// Update expression (++/--)
    Update(UpdateExpression),
    /// Binary expression
    Binary(BinaryExpression),
    /// `&&`, `||` and `??`
    Logical(LogicalExpression),
    /// Assignment expression
    Assignment(AssignmentExpression),
    /// Conditional (ternary) expression
    Conditional(ConditionalExpression),
    /// Function call expression
    Call(CallExpression),
    /// new expression
    New(NewExpression),
    /// Member access expression
    Member(MemberExpression),
    /// Wraps an optional chain once at its outermost member or call
    Chain(ChainExpression),
    /// Sequence expression (comma operator)
    Sequence(SequenceExpression),
    /// yield / yield*
    Yield(YieldExpression),
    /// await
    Await(AwaitExpression),
    /// `new.target` or `import.meta`
    MetaProperty(MetaProperty),
    /// `import(source)`
    Import(ImportExpression),
    /// JSX element
    JsxElement(Box<JsxElement>),
    /// JSX fragment
    JsxFragment(Box<JsxFragment>),
}

impl Expression {
    /// Returns the source range of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::PrivateIdentifier(e) => e.span,
            Expression::Literal(e) => e.span,
            Expression::This(span) | Expression::Super(span) => *span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Function(e) => e.span,
            Expression::Arrow(e) => e.span,
            Expression::Class(e) => e.span,
            Expression::TemplateLiteral(e) => e.span,
            Expression::TaggedTemplate(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Logical(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Chain(e) => e.span,
            Expression::Sequence(e) => e.span,
            Expression::Yield(e) => e.span,
            Expression::Await(e) => e.span,
            Expression::MetaProperty(e) => e.span,
            Expression::Import(e) => e.span,
            Expression::JsxElement(e) => e.span,
            Expression::JsxFragment(e) => e.span,
        }
    }

    /// Returns the identifier name if this is a plain identifier.
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier(id) => Some(&id.name),
            _ => None,
        }
    }
}

/// A literal value with its source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    /// Source range
    pub span: Span,
    /// The decoded value
    pub value: LiteralValue,
    /// Source text of the literal
    pub raw: String,
}

impl Literal {
    /// Returns the numeric value. BigInt literals report `0.0`.
    pub fn numeric_value(&self) -> f64 {
        match self.value {
            LiteralValue::Number(n) => n,
            _ => 0.0,
        }
    }

    /// Returns the string value for string literals.
    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            LiteralValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// The decoded value of a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// null literal
    Null,
    /// Boolean literal
    Boolean(bool),
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// BigInt literal, base-10 magnitude
    BigInt(String),
    /// Regular expression literal
    RegExp {
        /// Body between the slashes
        pattern: String,
        /// Flag characters
        flags: String,
    },
}

/// An array expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayExpression {
    /// Source range
    pub span: Span,
    /// The elements (None represents a hole)
    pub elements: Vec<Option<ExprOrSpread>>,
}

/// An array element or call argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprOrSpread {
    /// Plain element
    Expression(Expression),
    /// `...element`
    Spread(SpreadElement),
}

impl ExprOrSpread {
    /// Returns the source range.
    pub fn span(&self) -> Span {
        match self {
            ExprOrSpread::Expression(e) => e.span(),
            ExprOrSpread::Spread(s) => s.span,
        }
    }
}

/// `...argument`
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadElement {
    /// Source range
    pub span: Span,
    /// The spread operand
    pub argument: Expression,
}

/// An object expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectExpression {
    /// Source range
    pub span: Span,
    /// The properties
    pub properties: Vec<ObjectProperty>,
}

/// An entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectProperty {
    /// Key/value pair, shorthand or method
    Property(Property),
    /// `...source`
    Spread(SpreadElement),
}

impl ObjectProperty {
    /// Returns the source range.
    pub fn span(&self) -> Span {
        match self {
            ObjectProperty::Property(p) => p.span,
            ObjectProperty::Spread(s) => s.span,
        }
    }
}

/// Kinds of object literal properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Value or method
    Init,
    /// Getter
    Get,
    /// Setter
    Set,
}

/// An object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Source range
    pub span: Span,
    /// The property key
    pub key: Expression,
    /// The property value. For `{a = 1}` this is an assignment expression
    /// which only survives if the object becomes a pattern.
    pub value: Expression,
    /// Value or accessor
    pub kind: PropertyKind,
    /// Method shorthand `{ f() {} }`
    pub method: bool,
    /// Whether this is shorthand syntax
    pub shorthand: bool,
    /// `[expr]` key
    pub computed: bool,
}

/// A template literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLiteral {
    /// Source range
    pub span: Span,
    /// Text chunks; always one more than `expressions`
    pub quasis: Vec<TemplateElement>,
    /// Substitutions between the quasis
    pub expressions: Vec<Expression>,
}

/// One text chunk of a template.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    /// Range of the text, excluding the backquote and `${`/`}` delimiters
    pub span: Span,
    /// Last chunk
    pub tail: bool,
    /// Decoded text; `None` for an invalid escape in a tagged template
    pub cooked: Option<String>,
    /// Source text with line endings normalized
    pub raw: String,
}

/// A tagged template expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedTemplateExpression {
    /// Source range
    pub span: Span,
    /// The tag function
    pub tag: Box<Expression>,
    /// The template
    pub quasi: TemplateLiteral,
}

/// A unary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    /// Source range
    pub span: Span,
    /// The operator
    pub operator: UnaryOperator,
    /// The operand
    pub argument: Box<Expression>,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// -
    Minus,
    /// +
    Plus,
    /// !
    LogicalNot,
    /// ~
    BitwiseNot,
    /// typeof
    Typeof,
    /// void
    Void,
    /// delete
    Delete,
}

impl UnaryOperator {
    /// Returns the operator's source text.
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOperator::Minus => "-",
            UnaryOperator::Plus => "+",
            UnaryOperator::LogicalNot => "!",
            UnaryOperator::BitwiseNot => "~",
            UnaryOperator::Typeof => "typeof",
            UnaryOperator::Void => "void",
            UnaryOperator::Delete => "delete",
        }
    }
}

/// An update expression (++/--)
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// Source range
    pub span: Span,
    /// The operator
    pub operator: UpdateOperator,
    /// Whether prefix (++x) or postfix (x++)
    pub prefix: bool,
    /// The operand
    pub argument: Box<Expression>,
}

/// Update operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOperator {
    /// ++
    Increment,
    /// --
    Decrement,
}

impl UpdateOperator {
    /// Returns the operator's source text.
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateOperator::Increment => "++",
            UpdateOperator::Decrement => "--",
        }
    }
}

/// A binary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    /// Source range
    pub span: Span,
    /// The operator
    pub operator: BinaryOperator,
    /// The left operand; a private identifier for `#x in obj`
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Modulo,
    /// `**`
    Exponent,
    // Comparison
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `===`
    StrictEqual,
    /// `!==`
    StrictNotEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessThanEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanEqual,
    // Bitwise
    /// `&`
    BitwiseAnd,
    /// `|`
    BitwiseOr,
    /// `^`
    BitwiseXor,
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `>>>`
    UnsignedRightShift,
    // Other
    /// `in`
    In,
    /// `instanceof`
    InstanceOf,
}

impl BinaryOperator {
    /// Returns the operator's source text.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Exponent => "**",
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::StrictEqual => "===",
            BinaryOperator::StrictNotEqual => "!==",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessThanEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterThanEqual => ">=",
            BinaryOperator::BitwiseAnd => "&",
            BinaryOperator::BitwiseOr => "|",
            BinaryOperator::BitwiseXor => "^",
            BinaryOperator::LeftShift => "<<",
            BinaryOperator::RightShift => ">>",
            BinaryOperator::UnsignedRightShift => ">>>",
            BinaryOperator::In => "in",
            BinaryOperator::InstanceOf => "instanceof",
        }
    }
}

/// A short-circuiting expression.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpression {
    /// Source range
    pub span: Span,
    /// The operator
    pub operator: LogicalOperator,
    /// The left operand
    pub left: Box<Expression>,
    /// The right operand
    pub right: Box<Expression>,
}

/// Logical operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    /// &&
    And,
    /// ||
    Or,
    /// ??
    NullishCoalescing,
}

impl LogicalOperator {
    /// Returns the operator's source text.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "&&",
            LogicalOperator::Or => "||",
            LogicalOperator::NullishCoalescing => "??",
        }
    }
}

/// An assignment expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentExpression {
    /// Source range
    pub span: Span,
    /// The operator
    pub operator: AssignmentOperator,
    /// The target; a destructuring pattern only for `=`
    pub left: Box<Pattern>,
    /// The right-hand side
    pub right: Box<Expression>,
}

/// Assignment operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOperator {
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubtractAssign,
    /// `*=`
    MultiplyAssign,
    /// `/=`
    DivideAssign,
    /// `%=`
    ModuloAssign,
    /// `**=`
    ExponentAssign,
    /// `<<=`
    LeftShiftAssign,
    /// `>>=`
    RightShiftAssign,
    /// `>>>=`
    UnsignedRightShiftAssign,
    /// `&=`
    BitwiseAndAssign,
    /// `|=`
    BitwiseOrAssign,
    /// `^=`
    BitwiseXorAssign,
    /// `&&=`
    LogicalAndAssign,
    /// `||=`
    LogicalOrAssign,
    /// `??=`
    NullishCoalescingAssign,
}

impl AssignmentOperator {
    /// Returns the operator's source text.
    pub fn as_str(self) -> &'static str {
        match self {
            AssignmentOperator::Assign => "=",
            AssignmentOperator::AddAssign => "+=",
            AssignmentOperator::SubtractAssign => "-=",
            AssignmentOperator::MultiplyAssign => "*=",
            AssignmentOperator::DivideAssign => "/=",
            AssignmentOperator::ModuloAssign => "%=",
            AssignmentOperator::ExponentAssign => "**=",
            AssignmentOperator::LeftShiftAssign => "<<=",
            AssignmentOperator::RightShiftAssign => ">>=",
            AssignmentOperator::UnsignedRightShiftAssign => ">>>=",
            AssignmentOperator::BitwiseAndAssign => "&=",
            AssignmentOperator::BitwiseOrAssign => "|=",
            AssignmentOperator::BitwiseXorAssign => "^=",
            AssignmentOperator::LogicalAndAssign => "&&=",
            AssignmentOperator::LogicalOrAssign => "||=",
            AssignmentOperator::NullishCoalescingAssign => "??=",
        }
    }
}

/// A conditional (ternary) expression.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionalExpression {
    /// Source range
    pub span: Span,
    /// The condition
    pub test: Box<Expression>,
    /// The consequent (if true)
    pub consequent: Box<Expression>,
    /// The alternate (if false)
    pub alternate: Box<Expression>,
}

/// A function call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    /// Source range
    pub span: Span,
    /// The function being called
    pub callee: Box<Expression>,
    /// The arguments
    pub arguments: Vec<ExprOrSpread>,
    /// Called with `?.()`
    pub optional: bool,
}

/// A new expression.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    /// Source range
    pub span: Span,
    /// The constructor
    pub callee: Box<Expression>,
    /// The arguments
    pub arguments: Vec<ExprOrSpread>,
}

/// A member access expression.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    /// Source range
    pub span: Span,
    /// The object
    pub object: Box<Expression>,
    /// The property: an identifier, a private identifier or any expression
    /// when computed
    pub property: Box<Expression>,
    /// Whether this is computed (bracket notation)
    pub computed: bool,
    /// Accessed with `?.`
    pub optional: bool,
}

/// The outermost node of an optional chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainExpression {
    /// Source range
    pub span: Span,
    /// A member or call expression
    pub expression: Box<Expression>,
}

/// A sequence expression (comma operator).
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceExpression {
    /// Source range
    pub span: Span,
    /// The expressions
    pub expressions: Vec<Expression>,
}

/// A yield expression.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldExpression {
    /// Source range
    pub span: Span,
    /// The yielded value, if any
    pub argument: Option<Box<Expression>>,
    /// `yield*`
    pub delegate: bool,
}

/// An await expression.
#[derive(Debug, Clone, PartialEq)]
pub struct AwaitExpression {
    /// Source range
    pub span: Span,
    /// The awaited value
    pub argument: Box<Expression>,
}

/// `new.target` or `import.meta`.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaProperty {
    /// Source range
    pub span: Span,
    /// `new` or `import`
    pub meta: Identifier,
    /// `target` or `meta`
    pub property: Identifier,
}

/// A dynamic `import(source)` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportExpression {
    /// Source range
    pub span: Span,
    /// Module specifier expression
    pub source: Box<Expression>,
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// A binding or assignment target.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// Plain name
    Identifier(Identifier),
    /// `{ a, b: c, ...rest }`
    Object(ObjectPattern),
    /// `[a, , b, ...rest]`
    Array(ArrayPattern),
    /// `target = default`
    Assignment(AssignmentPattern),
    /// `...target`
    Rest(RestElement),
    /// A member expression; only valid in assignment targets
    Expression(Box<Expression>),
}

impl Pattern {
    /// Returns the source range of this pattern.
    pub fn span(&self) -> Span {
        match self {
            Pattern::Identifier(p) => p.span,
            Pattern::Object(p) => p.span,
            Pattern::Array(p) => p.span,
            Pattern::Assignment(p) => p.span,
            Pattern::Rest(p) => p.span,
            Pattern::Expression(e) => e.span(),
        }
    }

    /// Returns true for a plain identifier.
    pub fn is_identifier(&self) -> bool {
        matches!(self, Pattern::Identifier(_))
    }
}

/// An object destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectPattern {
    /// Source range
    pub span: Span,
    /// Properties and an optional rest element
    pub properties: Vec<ObjectPatternProperty>,
}

/// An entry of an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectPatternProperty {
    /// `key: target` or shorthand
    Property(AssignmentProperty),
    /// `...rest`
    Rest(RestElement),
}

/// `key: value` inside an object pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentProperty {
    /// Source range
    pub span: Span,
    /// Property name
    pub key: Expression,
    /// Binding target
    pub value: Pattern,
    /// Written as `{ a }`
    pub shorthand: bool,
    /// The key was written in brackets
    pub computed: bool,
}

/// An array destructuring pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayPattern {
    /// Source range
    pub span: Span,
    /// The elements (None represents a hole)
    pub elements: Vec<Option<Pattern>>,
}

/// A pattern with a default value.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentPattern {
    /// Source range
    pub span: Span,
    /// The target
    pub left: Box<Pattern>,
    /// The default value
    pub right: Box<Expression>,
}

/// A rest element in a pattern or parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct RestElement {
    /// Source range
    pub span: Span,
    /// The target receiving the rest
    pub argument: Box<Pattern>,
}

// ---------------------------------------------------------------------------
// JSX
// ---------------------------------------------------------------------------

/// `<name attrs>children</name>` or `<name attrs />`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxElement {
    /// Source range
    pub span: Span,
    /// The opening tag
    pub opening: JsxOpeningElement,
    /// Absent for self-closing elements
    pub closing: Option<JsxClosingElement>,
    /// Children between the tags
    pub children: Vec<JsxChild>,
}

/// The opening tag of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxOpeningElement {
    /// Source range
    pub span: Span,
    /// Tag name
    pub name: JsxElementName,
    /// Attributes and spreads in source order
    pub attributes: Vec<JsxAttributeItem>,
    /// Written as `<tag />`
    pub self_closing: bool,
}

/// The closing tag of an element.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxClosingElement {
    /// Source range
    pub span: Span,
    /// Tag name
    pub name: JsxElementName,
}

/// `<>children</>`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxFragment {
    /// Source range
    pub span: Span,
    /// Range of `<>`
    pub opening: Span,
    /// Range of `</>`
    pub closing: Span,
    /// Children between `<>` and `</>`
    pub children: Vec<JsxChild>,
}

/// A plain JSX name such as `div` or `data-id`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxIdentifier {
    /// Source range
    pub span: Span,
    /// The name, which may contain `-`
    pub name: String,
}

/// `namespace:name`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxNamespacedName {
    /// Source range
    pub span: Span,
    /// Part before the colon
    pub namespace: JsxIdentifier,
    /// Part after the colon
    pub name: JsxIdentifier,
}

/// `object.property`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxMemberExpression {
    /// Source range
    pub span: Span,
    /// An identifier or another member expression
    pub object: Box<JsxElementName>,
    /// The property name
    pub property: JsxIdentifier,
}

/// The name of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxElementName {
    /// `div`
    Identifier(JsxIdentifier),
    /// `svg:path`
    Namespaced(JsxNamespacedName),
    /// `Foo.Bar`
    Member(JsxMemberExpression),
}

impl JsxElementName {
    /// Returns the source range.
    pub fn span(&self) -> Span {
        match self {
            JsxElementName::Identifier(n) => n.span,
            JsxElementName::Namespaced(n) => n.span,
            JsxElementName::Member(n) => n.span,
        }
    }

    /// Renders the qualified name as written, e.g. `a.b` or `svg:path`.
    pub fn qualified_name(&self) -> String {
        match self {
            JsxElementName::Identifier(n) => n.name.clone(),
            JsxElementName::Namespaced(n) => format!("{}:{}", n.namespace.name, n.name.name),
            JsxElementName::Member(n) => format!("{}.{}", n.object.qualified_name(), n.property.name),
        }
    }
}

/// An entry of an opening tag's attribute list.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttributeItem {
    /// `name` or `name=value`
    Attribute(JsxAttribute),
    /// `{...props}`
    Spread(JsxSpreadAttribute),
}

/// `name` or `name=value`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxAttribute {
    /// Source range
    pub span: Span,
    /// Attribute name
    pub name: JsxAttributeName,
    /// Value; `None` for a bare attribute
    pub value: Option<JsxAttributeValue>,
}

/// The name of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttributeName {
    /// `name`
    Identifier(JsxIdentifier),
    /// `ns:name`
    Namespaced(JsxNamespacedName),
}

/// The value of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxAttributeValue {
    /// Quoted string, entities decoded
    Literal(Literal),
    /// `{expr}`
    ExpressionContainer(JsxExpressionContainer),
    /// An element
    Element(Box<JsxElement>),
    /// A fragment
    Fragment(Box<JsxFragment>),
}

/// `{...argument}` in an attribute list.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxSpreadAttribute {
    /// Source range
    pub span: Span,
    /// The spread object
    pub argument: Expression,
}

/// `{expression}`
#[derive(Debug, Clone, PartialEq)]
pub struct JsxExpressionContainer {
    /// Source range
    pub span: Span,
    /// The contents
    pub expression: JsxExpression,
}

/// Contents of an expression container.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxExpression {
    /// `{}` or `{/* comment */}`; spans the text between the braces
    Empty(Span),
    /// A non-empty expression
    Expression(Expression),
}

/// A child of an element or fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum JsxChild {
    /// Raw text
    Text(JsxText),
    /// `{expr}`
    ExpressionContainer(JsxExpressionContainer),
    /// `{...children}`
    Spread(JsxSpreadChild),
    /// Nested element
    Element(Box<JsxElement>),
    /// Nested fragment
    Fragment(Box<JsxFragment>),
}

impl JsxChild {
    /// Returns the source range.
    pub fn span(&self) -> Span {
        match self {
            JsxChild::Text(t) => t.span,
            JsxChild::ExpressionContainer(c) => c.span,
            JsxChild::Spread(s) => s.span,
            JsxChild::Element(e) => e.span,
            JsxChild::Fragment(f) => f.span,
        }
    }
}

/// Text between tags.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxText {
    /// Source range
    pub span: Span,
    /// Entity-decoded text
    pub value: String,
    /// Source text
    pub raw: String,
}

/// `{...expression}` as a child.
#[derive(Debug, Clone, PartialEq)]
pub struct JsxSpreadChild {
    /// Source range
    pub span: Span,
    /// The spread operand
    pub expression: Expression,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, start: usize) -> Identifier {
        Identifier {
            span: Span::new(start, start + name.len()),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_statement_span() {
        let stmt = Statement::Break(BreakStatement {
            span: Span::new(3, 9),
            label: None,
        });
        assert_eq!(stmt.span(), Span::new(3, 9));
        assert_eq!(Statement::Empty(Span::new(0, 1)).span(), Span::new(0, 1));
    }

    #[test]
    fn test_directive_accessor() {
        let stmt = Statement::Expression(ExpressionStatement {
            span: Span::new(0, 13),
            expression: Expression::Literal(Literal {
                span: Span::new(0, 12),
                value: LiteralValue::String("use strict".into()),
                raw: "\"use strict\"".into(),
            }),
            directive: Some("use strict".into()),
        });
        assert_eq!(stmt.directive(), Some("use strict"));
    }

    #[test]
    fn test_bigint_numeric_value_is_zero() {
        let lit = Literal {
            span: Span::new(0, 3),
            value: LiteralValue::BigInt("10".into()),
            raw: "10n".into(),
        };
        assert_eq!(lit.numeric_value(), 0.0);
    }

    #[test]
    fn test_pattern_span_of_member_target() {
        let member = Expression::Member(MemberExpression {
            span: Span::new(0, 3),
            object: Box::new(Expression::Identifier(ident("a", 0))),
            property: Box::new(Expression::Identifier(ident("b", 2))),
            computed: false,
            optional: false,
        });
        assert_eq!(Pattern::Expression(Box::new(member)).span(), Span::new(0, 3));
    }

    #[test]
    fn test_jsx_qualified_name() {
        let name = JsxElementName::Member(JsxMemberExpression {
            span: Span::new(0, 5),
            object: Box::new(JsxElementName::Identifier(JsxIdentifier {
                span: Span::new(0, 1),
                name: "a".into(),
            })),
            property: JsxIdentifier {
                span: Span::new(2, 5),
                name: "b-c".into(),
            },
        });
        assert_eq!(name.qualified_name(), "a.b-c");
    }

    #[test]
    fn test_operator_text() {
        assert_eq!(BinaryOperator::UnsignedRightShift.as_str(), ">>>");
        assert_eq!(LogicalOperator::NullishCoalescing.as_str(), "??");
        assert_eq!(AssignmentOperator::LogicalOrAssign.as_str(), "||=");
        assert_eq!(UnaryOperator::Typeof.as_str(), "typeof");
    }
}
