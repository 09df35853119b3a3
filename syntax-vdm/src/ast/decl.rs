use super::expr::Expr;
use super::node::Node;
use super::pat::IdentTypePair;
use super::pat::MultipleBind;
use super::pat::Pattern;
use super::pat::PatternTypePair;
use super::stmt::Stmt;
use super::type_expr::TypeExpr;
use derive_more::derive::From;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Visibility {
  #[default]
  Private,
  Protected,
  Public,
}

/// Access specifier of a class member or module definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Access {
  pub visibility: Visibility,
  pub is_static: bool,
  pub is_pure: bool,
  pub is_async: bool,
}

impl Access {
  pub fn public() -> Access {
    Access {
      visibility: Visibility::Public,
      ..Access::default()
    }
  }

  pub fn protected() -> Access {
    Access {
      visibility: Visibility::Protected,
      ..Access::default()
    }
  }

  pub fn with_static(mut self) -> Access {
    self.is_static = true;
    self
  }

  pub fn with_pure(mut self) -> Access {
    self.is_pure = true;
    self
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum Decl {
  Type(TypeDecl),
  Value(ValueDecl),
  ExplicitFunction(ExplicitFunctionDecl),
  ImplicitFunction(ImplicitFunctionDecl),
  ExplicitOperation(ExplicitOperationDecl),
  ImplicitOperation(ImplicitOperationDecl),
  InstanceVariable(InstanceVariableDecl),
  State(StateDecl),
  ClassInvariant(ClassInvariantDecl),
  Mutex(MutexDecl),
  Per(PerDecl),
  Trace(TraceDecl),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TypeDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  pub shape: TypeShape,
  pub inv: Option<Node<TypeInvariant>>,
  pub eq: Option<Node<TypeRelation>>,
  pub ord: Option<Node<TypeRelation>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum TypeShape {
  /// `T = <type>`
  Alias(Node<TypeExpr>),
  /// `T :: f1 : T1 ...`
  Record(Vec<Node<FieldDecl>>),
}

/// A record field. Fields without a tag are addressed by position only.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FieldDecl {
  #[drive(skip)]
  pub tag: Option<String>,
  pub ty: Node<TypeExpr>,
  /// `:-` fields are ignored by equality.
  #[drive(skip)]
  pub equality_abstraction: bool,
}

/// `inv p == predicate`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TypeInvariant {
  pub pattern: Node<Pattern>,
  pub predicate: Node<Expr>,
}

/// `eq p1 = p2 == body` and `ord p1 < p2 == body`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TypeRelation {
  pub left: Node<Pattern>,
  pub right: Node<Pattern>,
  pub body: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ValueDecl {
  #[drive(skip)]
  pub access: Access,
  pub pattern: Node<Pattern>,
  pub ty: Option<Node<TypeExpr>>,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum FunctionBody {
  Expr(Node<Expr>),
  NotYetSpecified,
  SubclassResponsibility,
}

#[derive(Debug, Drive, DriveMut, From, Serialize)]
pub enum Measure {
  /// `measure m`, naming a function over the same parameters.
  Name(Node<MeasureName>),
  /// `measure e`, an expression over the parameters.
  Expr(Node<Expr>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MeasureName {
  #[drive(skip)]
  pub name: String,
}

/// `f[@T]: A * B -> C  f(a, b) == body`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExplicitFunctionDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub type_params: Vec<String>,
  pub ty: Node<TypeExpr>,
  /// One parameter list per curried application.
  pub params: Vec<Vec<Node<Pattern>>>,
  pub body: FunctionBody,
  pub pre: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub measure: Option<Measure>,
}

/// `f(a: A, b: B) r: R pre ... post ...`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImplicitFunctionDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub type_params: Vec<String>,
  pub params: Vec<Node<PatternTypePair>>,
  pub result: Node<IdentTypePair>,
  /// An extended explicit body, when one is given.
  pub body: Option<FunctionBody>,
  pub pre: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub measure: Option<Measure>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExplicitOperationDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  pub ty: Node<TypeExpr>,
  pub params: Vec<Node<Pattern>>,
  pub body: Node<Stmt>,
  pub pre: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ExternalMode {
  Read,
  Write,
}

/// `ext rd x : T`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExternalClause {
  #[drive(skip)]
  pub mode: ExternalMode,
  #[drive(skip)]
  pub names: Vec<String>,
  pub ty: Option<Node<TypeExpr>>,
}

/// `errs NAME: condition -> result`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ErrorCase {
  #[drive(skip)]
  pub name: String,
  pub condition: Node<Expr>,
  pub result: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImplicitOperationDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  pub params: Vec<Node<PatternTypePair>>,
  pub result: Option<Node<IdentTypePair>>,
  pub externals: Vec<Node<ExternalClause>>,
  pub body: Option<Node<Stmt>>,
  pub pre: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub errors: Vec<Node<ErrorCase>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct InstanceVariableDecl {
  #[drive(skip)]
  pub access: Access,
  #[drive(skip)]
  pub name: String,
  pub ty: Node<TypeExpr>,
  pub init: Option<Node<Expr>>,
}

/// The state of a VDM-SL module.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct StateDecl {
  #[drive(skip)]
  pub name: String,
  pub fields: Vec<Node<FieldDecl>>,
  pub inv: Option<Node<TypeInvariant>>,
  pub init: Option<Node<StateInit>>,
}

/// `init p == predicate`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct StateInit {
  pub pattern: Node<Pattern>,
  pub predicate: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassInvariantDecl {
  pub predicate: Node<Expr>,
}

/// `mutex(all)` when `operations` is empty.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MutexDecl {
  #[drive(skip)]
  pub operations: Vec<String>,
}

/// `per op => guard`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct PerDecl {
  #[drive(skip)]
  pub operation: String,
  pub guard: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceDecl {
  #[drive(skip)]
  pub name: String,
  pub body: Node<TraceDef>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum TraceDef {
  /// `obj.op(args)` or `op(args)`.
  Apply(TraceApply),
  /// `t{n, m}`
  Repeat(TraceRepeat),
  Let(TraceLet),
  LetBe(TraceLetBe),
  Choice(TraceList),
  Sequence(TraceList),
  Concurrent(TraceList),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceApply {
  #[drive(skip)]
  pub object: Option<String>,
  #[drive(skip)]
  pub operation: String,
  pub args: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceRepeat {
  pub inner: Node<TraceDef>,
  #[drive(skip)]
  pub from: u64,
  #[drive(skip)]
  pub to: u64,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceLet {
  pub defs: Vec<Node<Decl>>,
  pub body: Node<TraceDef>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceLetBe {
  pub bind: Node<MultipleBind>,
  pub such_that: Option<Node<Expr>>,
  pub body: Node<TraceDef>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TraceList {
  pub items: Vec<Node<TraceDef>>,
}
