use serde::Serialize;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
  Plus,
  Minus,
  Abs,
  Floor,
  Not,
  // Sets.
  Card,
  Power,
  DistUnion,
  DistInter,
  // Sequences.
  Head,
  Tail,
  Len,
  Elems,
  Inds,
  Reverse,
  DistConc,
  // Maps.
  Dom,
  Rng,
  DistMerge,
  MapInverse,
}

impl UnaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      UnaryOp::Plus => "+",
      UnaryOp::Minus => "-",
      UnaryOp::Abs => "abs",
      UnaryOp::Floor => "floor",
      UnaryOp::Not => "not",
      UnaryOp::Card => "card",
      UnaryOp::Power => "power",
      UnaryOp::DistUnion => "dunion",
      UnaryOp::DistInter => "dinter",
      UnaryOp::Head => "hd",
      UnaryOp::Tail => "tl",
      UnaryOp::Len => "len",
      UnaryOp::Elems => "elems",
      UnaryOp::Inds => "inds",
      UnaryOp::Reverse => "reverse",
      UnaryOp::DistConc => "conc",
      UnaryOp::Dom => "dom",
      UnaryOp::Rng => "rng",
      UnaryOp::DistMerge => "merge",
      UnaryOp::MapInverse => "inverse",
    }
  }
}

impl Display for UnaryOp {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
  // Numeric.
  Add,
  Sub,
  Mul,
  Div,
  IntDiv,
  Rem,
  Mod,
  /// `**`: numeric power, map iteration or function iteration.
  StarStar,
  Lt,
  Le,
  Gt,
  Ge,
  // Logic.
  And,
  Or,
  Implies,
  Equiv,
  // Equality.
  Eq,
  Ne,
  // Sets.
  InSet,
  NotInSet,
  Subset,
  ProperSubset,
  Union,
  Inter,
  Difference,
  // Sequences.
  Concat,
  /// `++`: map or sequence override.
  PlusPlus,
  // Maps.
  MapUnion,
  DomRestrictTo,
  DomRestrictBy,
  RngRestrictTo,
  RngRestrictBy,
  Comp,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::IntDiv => "div",
      BinaryOp::Rem => "rem",
      BinaryOp::Mod => "mod",
      BinaryOp::StarStar => "**",
      BinaryOp::Lt => "<",
      BinaryOp::Le => "<=",
      BinaryOp::Gt => ">",
      BinaryOp::Ge => ">=",
      BinaryOp::And => "and",
      BinaryOp::Or => "or",
      BinaryOp::Implies => "=>",
      BinaryOp::Equiv => "<=>",
      BinaryOp::Eq => "=",
      BinaryOp::Ne => "<>",
      BinaryOp::InSet => "in set",
      BinaryOp::NotInSet => "not in set",
      BinaryOp::Subset => "subset",
      BinaryOp::ProperSubset => "psubset",
      BinaryOp::Union => "union",
      BinaryOp::Inter => "inter",
      BinaryOp::Difference => "\\",
      BinaryOp::Concat => "^",
      BinaryOp::PlusPlus => "++",
      BinaryOp::MapUnion => "munion",
      BinaryOp::DomRestrictTo => "<:",
      BinaryOp::DomRestrictBy => "<-:",
      BinaryOp::RngRestrictTo => ":>",
      BinaryOp::RngRestrictBy => ":->",
      BinaryOp::Comp => "comp",
    }
  }

  pub fn is_boolean(self) -> bool {
    matches!(
      self,
      BinaryOp::And | BinaryOp::Or | BinaryOp::Implies | BinaryOp::Equiv
    )
  }
}

impl Display for BinaryOp {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(self.symbol())
  }
}

/// Operation history counters used in permission guards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum HistoryOp {
  Act,
  Fin,
  Active,
  Req,
  Waiting,
}

impl Display for HistoryOp {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      HistoryOp::Act => "#act",
      HistoryOp::Fin => "#fin",
      HistoryOp::Active => "#active",
      HistoryOp::Req => "#req",
      HistoryOp::Waiting => "#waiting",
    })
  }
}
