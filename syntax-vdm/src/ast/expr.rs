use super::decl::Decl;
use super::node::Node;
use super::op::BinaryOp;
use super::op::HistoryOp;
use super::op::UnaryOp;
use super::pat::Bind;
use super::pat::MultipleBind;
use super::pat::Pattern;
use super::pat::PatternTypePair;
use super::type_expr::TypeExpr;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Literal {
  Bool(bool),
  /// Natural number literal; negative numbers are unary minus applications.
  Nat(u64),
  Real(f64),
  Char(char),
  Str(String),
  Quote(String),
  Nil,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum Expr {
  Literal(LiteralExpr),
  Variable(VariableExpr),
  SelfRef,
  Apply(ApplyExpr),
  Field(FieldExpr),
  TupleField(TupleFieldExpr),
  Instantiate(InstantiateExpr),
  Unary(UnaryExpr),
  Binary(BinaryExpr),
  If(IfExpr),
  Cases(CasesExpr),
  LetDef(LetDefExpr),
  LetBeSt(LetBeStExpr),
  Def(DefExpr),
  Exists(QuantifierExpr),
  Forall(QuantifierExpr),
  Exists1(UniqueExpr),
  Iota(UniqueExpr),
  Lambda(LambdaExpr),
  SetEnum(EnumExpr),
  SetComp(SetCompExpr),
  SetRange(SetRangeExpr),
  SeqEnum(EnumExpr),
  SeqComp(SeqCompExpr),
  SubSeq(SubSeqExpr),
  MapEnum(MapEnumExpr),
  MapComp(MapCompExpr),
  Tuple(EnumExpr),
  Record(RecordExpr),
  Mu(MuExpr),
  IsType(IsTypeExpr),
  Narrow(NarrowExpr),
  Pre(PreExpr),
  New(NewExpr),
  IsOfClass(IsOfClassExpr),
  IsOfBaseClass(IsOfClassExpr),
  SameClass(SameClassExpr),
  SameBaseClass(SameClassExpr),
  History(HistoryExpr),
  Undefined,
  Time,
  ThreadId,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LiteralExpr {
  #[drive(skip)]
  pub value: Literal,
}

/// A name reference, optionally qualified (`M`x`, `C`x`) or old (`x~`).
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct VariableExpr {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub old: bool,
}

/// Function or operation call, sequence index or map lookup.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ApplyExpr {
  pub root: Node<Expr>,
  pub args: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FieldExpr {
  pub object: Node<Expr>,
  #[drive(skip)]
  pub field: String,
}

/// `t.#n`, one-based.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TupleFieldExpr {
  pub tuple: Node<Expr>,
  #[drive(skip)]
  pub index: usize,
}

/// `f[nat, bool]`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct InstantiateExpr {
  pub function: Node<Expr>,
  pub type_args: Vec<Node<TypeExpr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UnaryExpr {
  #[drive(skip)]
  pub op: UnaryOp,
  pub operand: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BinaryExpr {
  #[drive(skip)]
  pub op: BinaryOp,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IfExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub elseifs: Vec<Node<ElseIfExpr>>,
  pub alternate: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ElseIfExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CasesExpr {
  pub subject: Node<Expr>,
  pub alternatives: Vec<Node<CaseAlternative>>,
  pub others: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CaseAlternative {
  pub patterns: Vec<Node<Pattern>>,
  pub result: Node<Expr>,
}

/// `let d1, ..., dn in e`; the definitions are values or local functions.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LetDefExpr {
  pub defs: Vec<Node<Decl>>,
  pub body: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LetBeStExpr {
  pub bind: Node<MultipleBind>,
  pub such_that: Option<Node<Expr>>,
  pub body: Node<Expr>,
}

/// `def p = e; ... in body`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DefExpr {
  pub defs: Vec<Node<EqualsDef>>,
  pub body: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct EqualsDef {
  pub pattern: Node<Pattern>,
  pub ty: Option<Node<TypeExpr>>,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct QuantifierExpr {
  pub binds: Vec<Node<MultipleBind>>,
  pub predicate: Node<Expr>,
}

/// Shared shape of `exists1` and `iota`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct UniqueExpr {
  pub bind: Node<Bind>,
  pub predicate: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LambdaExpr {
  pub params: Vec<Node<PatternTypePair>>,
  pub body: Node<Expr>,
}

/// Shared shape of set, sequence and tuple enumerations.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct EnumExpr {
  pub members: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SetCompExpr {
  pub element: Node<Expr>,
  pub binds: Vec<Node<MultipleBind>>,
  pub predicate: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SetRangeExpr {
  pub first: Node<Expr>,
  pub last: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SeqCompExpr {
  pub element: Node<Expr>,
  pub bind: Node<Bind>,
  pub predicate: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SubSeqExpr {
  pub seq: Node<Expr>,
  pub from: Node<Expr>,
  pub to: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct Maplet {
  pub from: Node<Expr>,
  pub to: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MapEnumExpr {
  pub maplets: Vec<Node<Maplet>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MapCompExpr {
  pub maplet: Node<Maplet>,
  pub binds: Vec<Node<MultipleBind>>,
  pub predicate: Option<Node<Expr>>,
}

/// `mk_R(e1, ..., en)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct RecordExpr {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
  pub args: Vec<Node<Expr>>,
}

/// `mu(e, f1 |-> e1, ...)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct MuExpr {
  pub record: Node<Expr>,
  pub updates: Vec<Node<RecordModifier>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct RecordModifier {
  #[drive(skip)]
  pub field: String,
  pub value: Node<Expr>,
}

/// `is_T(e)` and `is_(e, T)`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IsTypeExpr {
  pub test_type: Node<TypeExpr>,
  pub operand: Node<Expr>,
}

/// `narrow_(e, T)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NarrowExpr {
  pub operand: Node<Expr>,
  pub ty: Node<TypeExpr>,
}

/// `pre_(f, a1, ..., an)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct PreExpr {
  pub function: Node<Expr>,
  pub args: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NewExpr {
  #[drive(skip)]
  pub class: String,
  pub args: Vec<Node<Expr>>,
}

/// `isofclass(C, e)` and `isofbaseclass(C, e)`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IsOfClassExpr {
  #[drive(skip)]
  pub class: String,
  pub operand: Node<Expr>,
}

/// `sameclass(a, b)` and `samebaseclass(a, b)`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SameClassExpr {
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

/// `#act(op1, op2)` and friends.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct HistoryExpr {
  #[drive(skip)]
  pub op: HistoryOp,
  #[drive(skip)]
  pub operations: Vec<String>,
}
