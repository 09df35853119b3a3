use super::node::Node;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

/// A type as written in the source, before names are resolved.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum TypeExpr {
  Bool,
  Nat,
  Nat1,
  Int,
  Rat,
  Real,
  Char,
  Token,
  Quote(QuoteTypeExpr),
  Named(NamedTypeExpr),
  Set(SetTypeExpr),
  Seq(SeqTypeExpr),
  Map(MapTypeExpr),
  Product(ProductTypeExpr),
  Union(UnionTypeExpr),
  Optional(OptionalTypeExpr),
  Function(FunctionTypeExpr),
  Operation(OperationTypeExpr),
  Bracket(BracketTypeExpr),
  Parameter(TypeParamExpr),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct QuoteTypeExpr {
  #[drive(skip)]
  pub value: String,
}

/// A reference to a type or class name, optionally qualified with a module.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NamedTypeExpr {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SetTypeExpr {
  pub elem: Node<TypeExpr>,
  /// `set1 of`.
  #[drive(skip)]
  pub non_empty: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SeqTypeExpr {
  pub elem: Node<TypeExpr>,
  /// `seq1 of`.
  #[drive(skip)]
  pub non_empty: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MapTypeExpr {
  pub dom: Node<TypeExpr>,
  pub rng: Node<TypeExpr>,
  /// `inmap`.
  #[drive(skip)]
  pub injective: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ProductTypeExpr {
  pub members: Vec<Node<TypeExpr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnionTypeExpr {
  pub members: Vec<Node<TypeExpr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct OptionalTypeExpr {
  pub inner: Node<TypeExpr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FunctionTypeExpr {
  /// Empty for `() -> T`.
  pub params: Vec<Node<TypeExpr>>,
  pub result: Node<TypeExpr>,
  /// `-+>` is partial, `+>` is total.
  #[drive(skip)]
  pub partial: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct OperationTypeExpr {
  pub params: Vec<Node<TypeExpr>>,
  /// `None` for `==> ()`.
  pub result: Option<Node<TypeExpr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BracketTypeExpr {
  pub inner: Node<TypeExpr>,
}

/// `@T` inside a polymorphic function.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TypeParamExpr {
  #[drive(skip)]
  pub name: String,
}
