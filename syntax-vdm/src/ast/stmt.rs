use super::decl::Decl;
use super::decl::ErrorCase;
use super::decl::ExternalClause;
use super::expr::EqualsDef;
use super::expr::Expr;
use super::node::Node;
use super::pat::MultipleBind;
use super::pat::Pattern;
use super::type_expr::TypeExpr;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use serde::Serialize;

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum Stmt {
  Assign(AssignStmt),
  /// `atomic (a1; ...; an)`
  Atomic(AtomicStmt),
  Block(BlockStmt),
  Call(CallStmt),
  CallObject(CallObjectStmt),
  If(IfStmt),
  Cases(CasesStmt),
  While(WhileStmt),
  ForAllSet(ForAllSetStmt),
  ForSeq(ForSeqStmt),
  ForIndex(ForIndexStmt),
  Return(ReturnStmt),
  LetDef(LetDefStmt),
  LetBeSt(LetBeStStmt),
  Def(DefStmt),
  Exit(ExitStmt),
  Tixe(TixeStmt),
  Trap(TrapStmt),
  Always(AlwaysStmt),
  Error,
  Skip,
  Specification(SpecificationStmt),
  NonDeterministic(NonDeterministicStmt),
  Start(StartStmt),
  StartList(StartStmt),
  Stop(StartStmt),
  StopList(StartStmt),
  NotYetSpecified,
  SubclassResponsibility,
}

/// The target of an assignment.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum StateDesignator {
  Name(NameDesignator),
  Field(FieldDesignator),
  /// `m(k) := v` or `s(i) := v`.
  Apply(ApplyDesignator),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NameDesignator {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct FieldDesignator {
  pub object: Node<StateDesignator>,
  #[drive(skip)]
  pub field: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ApplyDesignator {
  pub target: Node<StateDesignator>,
  pub index: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct AssignStmt {
  pub target: Node<StateDesignator>,
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct AtomicStmt {
  pub assignments: Vec<Node<AssignStmt>>,
}

/// `dcl x : T := e;`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DclStmt {
  #[drive(skip)]
  pub name: String,
  pub ty: Node<TypeExpr>,
  pub init: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BlockStmt {
  pub dcls: Vec<Node<DclStmt>>,
  pub stmts: Vec<Node<Stmt>>,
}

/// `op(args)` or `C`op(args)`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CallStmt {
  #[drive(skip)]
  pub module: Option<String>,
  #[drive(skip)]
  pub name: String,
  pub args: Vec<Node<Expr>>,
}

/// `obj.op(args)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CallObjectStmt {
  pub object: Node<Expr>,
  #[drive(skip)]
  pub field: String,
  pub args: Vec<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub elseifs: Vec<Node<ElseIfStmt>>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ElseIfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CasesStmt {
  pub subject: Node<Expr>,
  pub alternatives: Vec<Node<CaseStmtAlternative>>,
  pub others: Option<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CaseStmtAlternative {
  pub patterns: Vec<Node<Pattern>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct WhileStmt {
  pub test: Node<Expr>,
  pub body: Node<Stmt>,
}

/// `for all p in set s do ...`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForAllSetStmt {
  pub pattern: Node<Pattern>,
  pub set: Node<Expr>,
  pub body: Node<Stmt>,
}

/// `for p in [reverse] s do ...`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForSeqStmt {
  pub pattern: Node<Pattern>,
  pub seq: Node<Expr>,
  #[drive(skip)]
  pub reverse: bool,
  pub body: Node<Stmt>,
}

/// `for i = a to b [by c] do ...`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForIndexStmt {
  #[drive(skip)]
  pub var: String,
  pub from: Node<Expr>,
  pub to: Node<Expr>,
  pub by: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LetDefStmt {
  pub defs: Vec<Node<Decl>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LetBeStStmt {
  pub bind: Node<MultipleBind>,
  pub such_that: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DefStmt {
  pub defs: Vec<Node<EqualsDef>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExitStmt {
  pub value: Option<Node<Expr>>,
}

/// `tixe { p1 |-> s1, ... } in body`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TixeStmt {
  pub traps: Vec<Node<TixeTrap>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TixeTrap {
  pub pattern: Node<Pattern>,
  pub handler: Node<Stmt>,
}

/// `trap p with handler in body`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TrapStmt {
  pub pattern: Node<Pattern>,
  pub handler: Node<Stmt>,
  pub body: Node<Stmt>,
}

/// `always s1 in s2`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct AlwaysStmt {
  pub always: Node<Stmt>,
  pub body: Node<Stmt>,
}

/// `[ext ... pre ... post ... errs ...]`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SpecificationStmt {
  pub externals: Vec<Node<ExternalClause>>,
  pub pre: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub errors: Vec<Node<ErrorCase>>,
}

/// `||(s1, ..., sn)`
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct NonDeterministicStmt {
  pub stmts: Vec<Node<Stmt>>,
}

/// Shared shape of `start`, `startlist`, `stop` and `stoplist`.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct StartStmt {
  pub object: Node<Expr>,
}
