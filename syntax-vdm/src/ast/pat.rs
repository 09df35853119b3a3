use super::expr::Expr;
use super::expr::Literal;
use super::node::Node;
use super::type_expr::TypeExpr;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum Pattern {
  Identifier(IdPattern),
  /// `-`
  Ignore,
  Literal(LiteralPattern),
  /// `(e)`: matches values equal to an expression.
  Expression(ExprPattern),
  Tuple(TuplePattern),
  Record(RecordPattern),
  Set(SetPattern),
  SetUnion(UnionPattern),
  Seq(SeqPattern),
  SeqConcat(UnionPattern),
  Map(MapPattern),
  MapUnion(UnionPattern),
  Object(ObjectPattern),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdPattern {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LiteralPattern {
  #[drive(skip)]
  pub value: Literal,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExprPattern {
  pub expr: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TuplePattern {
  pub items: Vec<Node<Pattern>>,
}

/// `mk_R(p1, ..., pn)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct RecordPattern {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
  pub fields: Vec<Node<Pattern>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SetPattern {
  pub items: Vec<Node<Pattern>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SeqPattern {
  pub items: Vec<Node<Pattern>>,
}

/// Shared shape of `p1 union p2`, `p1 ^ p2` and `p1 munion p2`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnionPattern {
  pub left: Node<Pattern>,
  pub right: Node<Pattern>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MapPattern {
  pub maplets: Vec<Node<MapletPattern>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MapletPattern {
  pub from: Node<Pattern>,
  pub to: Node<Pattern>,
}

/// `obj_C(field |-> p, ...)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjectPattern {
  #[drive(skip)]
  pub class: String,
  pub fields: Vec<Node<ObjectFieldPattern>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjectFieldPattern {
  #[drive(skip)]
  pub field: String,
  pub pattern: Node<Pattern>,
}

/// What a bind ranges over.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum BindSource {
  Set(Node<Expr>),
  Seq(Node<Expr>),
  Type(Node<TypeExpr>),
}

/// A single bind, as in `iota x in set s & ...`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Bind {
  pub pattern: Node<Pattern>,
  pub source: BindSource,
}

/// A bind of several patterns over one source, as in `forall x, y : nat & ...`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MultipleBind {
  pub patterns: Vec<Node<Pattern>>,
  pub source: BindSource,
}

/// A parameter pattern with its declared type, as used by implicit
/// definitions and lambdas.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct PatternTypePair {
  pub pattern: Node<Pattern>,
  pub ty: Node<TypeExpr>,
}

/// A named result in an implicit definition, as in `r: nat`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdentTypePair {
  #[drive(skip)]
  pub name: String,
  pub ty: Node<TypeExpr>,
}
