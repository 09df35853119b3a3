//! Free variables of expressions.
//!
//! Used to find the functions a function body may call before anything is
//! type checked, which is all the recursion analysis needs.

use crate::check::pattern::pattern_names;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use itertools::Itertools;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::expr::CaseAlternative;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::pat::Bind;
use syntax_vdm::ast::pat::MultipleBind;
use syntax_vdm::ast::pat::Pattern;

type ExprNode = Node<Expr>;
type CaseAlternativeNode = Node<CaseAlternative>;
type DeclNode = Node<Decl>;

/// A name as written: its explicit module, if any, and the name.
pub(crate) type FreeName = (Option<String>, String);

#[derive(Visitor, Default)]
#[visitor(ExprNode(enter, exit), CaseAlternativeNode(enter, exit), DeclNode(enter, exit))]
struct FreeVariables {
  bound: Vec<Vec<String>>,
  free: Vec<FreeName>,
}

fn names_of<'p>(patterns: impl IntoIterator<Item = &'p Node<Pattern>>) -> Vec<String> {
  patterns
    .into_iter()
    .flat_map(pattern_names)
    .map(|(name, _)| name.to_string())
    .collect()
}

fn multiple_bind_names(binds: &[Node<MultipleBind>]) -> Vec<String> {
  names_of(binds.iter().flat_map(|b| b.stx.patterns.iter()))
}

fn bind_names(bind: &Node<Bind>) -> Vec<String> {
  names_of([&bind.stx.pattern])
}

impl FreeVariables {
  fn is_bound(&self, name: &str) -> bool {
    self.bound.iter().any(|scope| scope.iter().any(|b| b == name))
  }

  fn enter_expr_node(&mut self, node: &ExprNode) {
    let names = match &*node.stx {
      Expr::Variable(v) => {
        if v.module.is_some() || !self.is_bound(&v.name) {
          self.free.push((v.module.clone(), v.name.clone()));
        }
        Vec::new()
      }
      Expr::LetDef(l) => l
        .defs
        .iter()
        .flat_map(|d| match &*d.stx {
          Decl::Value(v) => names_of([&v.pattern]),
          Decl::ExplicitFunction(f) => vec![f.name.clone()],
          Decl::ImplicitFunction(f) => vec![f.name.clone()],
          _ => Vec::new(),
        })
        .collect(),
      Expr::LetBeSt(l) => multiple_bind_names(std::slice::from_ref(&l.bind)),
      Expr::Def(d) => names_of(d.defs.iter().map(|e| &e.stx.pattern)),
      Expr::Exists(q) | Expr::Forall(q) => multiple_bind_names(&q.binds),
      Expr::Exists1(u) | Expr::Iota(u) => bind_names(&u.bind),
      Expr::Lambda(l) => names_of(l.params.iter().map(|p| &p.stx.pattern)),
      Expr::SetComp(c) => multiple_bind_names(&c.binds),
      Expr::MapComp(c) => multiple_bind_names(&c.binds),
      Expr::SeqComp(c) => bind_names(&c.bind),
      _ => Vec::new(),
    };
    self.bound.push(names);
  }

  fn exit_expr_node(&mut self, _node: &ExprNode) {
    self.bound.pop();
  }

  fn enter_case_alternative_node(&mut self, node: &CaseAlternativeNode) {
    self.bound.push(names_of(&node.stx.patterns));
  }

  fn exit_case_alternative_node(&mut self, _node: &CaseAlternativeNode) {
    self.bound.pop();
  }

  fn enter_decl_node(&mut self, node: &DeclNode) {
    let names = match &*node.stx {
      Decl::ExplicitFunction(f) => names_of(f.params.iter().flatten()),
      Decl::ImplicitFunction(f) => {
        let mut names = names_of(f.params.iter().map(|p| &p.stx.pattern));
        names.push(f.result.stx.name.clone());
        names
      }
      _ => Vec::new(),
    };
    self.bound.push(names);
  }

  fn exit_decl_node(&mut self, _node: &DeclNode) {
    self.bound.pop();
  }
}

/// Every name read by `expr` that `expr` does not bind itself, without
/// duplicates, in order of first appearance. `bound` names are treated as
/// already bound.
pub(crate) fn free_variables(expr: &Node<Expr>, bound: &[String]) -> Vec<FreeName> {
  let mut visitor = FreeVariables {
    bound: vec![bound.to_vec()],
    free: Vec::new(),
  };
  expr.drive(&mut visitor);
  visitor.free.into_iter().unique().collect()
}

#[cfg(test)]
mod tests {
  use super::free_variables;
  use syntax_vdm::ast::op::BinaryOp;
  use syntax_vdm::build::Builder;

  #[test]
  fn binders_hide_names() {
    let b = Builder::new();
    let body = b.binary(BinaryOp::Add, b.var("x"), b.call("f", vec![b.var("y")]));
    let expr = b.forall(vec![b.type_bind(&["x"], b.t_nat())], body);
    let free = free_variables(&expr, &["y".to_string()]);
    assert_eq!(free, vec![(None, "f".to_string())]);
  }

  #[test]
  fn qualified_names_are_always_free() {
    let b = Builder::new();
    let expr = b.binary(BinaryOp::Add, b.qvar("M", "x"), b.qvar("M", "x"));
    let free = free_variables(&expr, &["x".to_string()]);
    assert_eq!(free, vec![(Some("M".to_string()), "x".to_string())]);
  }
}
