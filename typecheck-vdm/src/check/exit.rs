//! Exit analysis: which exception values a statement may raise.
//!
//! `exit e` raises the type of `e`. Calls raise whatever the callee raises,
//! which is only worked out for operations that cannot be overridden (module
//! operations, and private, static or constructor class operations); every
//! other callee may raise anything. Results per operation are memoised in the
//! definition slot, and a callee reached again while its own body is being
//! analysed contributes nothing more.

use super::Checker;
use super::ResolvedDef;
use super::ResolvedType;
use crate::def::DefId;
use crate::def::Exits;
use crate::def::Memo;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::stmt::Stmt;
use tracing::trace;
use types_vdm::TypeId;

type StmtNode = Node<Stmt>;
type ExprNode = Node<Expr>;

#[derive(Visitor, Default)]
#[visitor(StmtNode(enter), ExprNode(enter))]
struct ExitSites {
  exits: Exits,
  callees: Vec<DefId>,
  void: Option<TypeId>,
}

impl ExitSites {
  fn enter_stmt_node(&mut self, node: &StmtNode) {
    match &*node.stx {
      Stmt::Exit(e) => {
        let ty = match &e.value {
          Some(value) => value.assoc.get::<ResolvedType>().map(|ResolvedType(t)| t),
          None => self.void,
        };
        match ty {
          Some(ty) => self.exits.add(ty),
          None => self.exits.any = true,
        }
      }
      Stmt::Call(_) => match node.assoc.get::<ResolvedDef>() {
        Some(ResolvedDef(callee)) => self.callees.push(callee),
        None => self.exits.any = true,
      },
      Stmt::CallObject(_) => self.exits.any = true,
      _ => {}
    }
  }

  fn enter_expr_node(&mut self, node: &ExprNode) {
    if let Expr::Variable(_) | Expr::Field(_) = &*node.stx {
      if let Some(ResolvedDef(def)) = node.assoc.get::<ResolvedDef>() {
        self.callees.push(def);
      }
    }
  }
}

impl<'a> Checker<'a> {
  /// The type a `tixe` or `trap` handler pattern is matched against:
  /// everything `body` may exit with, or unknown when that is not known.
  pub(crate) fn exit_type(&mut self, body: &'a Node<Stmt>) -> TypeId {
    let exits = self.stmt_exits(body);
    if exits.any || exits.types.is_empty() {
      return self.unknown();
    }
    self.store.union(exits.types)
  }

  /// Exits of a checked statement.
  pub(crate) fn stmt_exits(&self, body: &Node<Stmt>) -> Exits {
    let mut sites = ExitSites {
      void: Some(self.store.void()),
      ..ExitSites::default()
    };
    body.drive(&mut sites);
    let mut exits = sites.exits;
    for callee in sites.callees {
      if exits.any {
        break;
      }
      exits.merge(&self.operation_exits(callee));
    }
    exits
  }

  /// Whether an operation's exits can be worked out from its own body.
  fn exits_analyzable(&self, op: DefId) -> bool {
    let def = self.table.get(op);
    def.class.is_none()
      || def.visibility() == Visibility::Private
      || def.is_static()
      || def.is_constructor()
  }

  /// Exits of a call to `callee`. Anything that is not an operation raises
  /// nothing.
  pub(crate) fn operation_exits(&self, callee: DefId) -> Exits {
    let op = self.table.origin(callee);
    let def = self.table.get(op);
    let Some(info) = def.kind.operation_info() else {
      return Exits::default();
    };
    if !self.exits_analyzable(op) {
      return Exits::anything();
    }
    match &*info.exits.borrow() {
      Memo::Done(exits) => return exits.clone(),
      Memo::InProgress => {
        trace!(operation = %def.name, "exit analysis cycle");
        return Exits::default();
      }
      Memo::NotStarted => {}
    }
    let Some(body) = def.kind.operation_body() else {
      return Exits::default();
    };
    if !body.assoc.has::<ResolvedType>() {
      return Exits::anything();
    }
    *info.exits.borrow_mut() = Memo::InProgress;
    let exits = self.stmt_exits(body);
    *info.exits.borrow_mut() = Memo::Done(exits.clone());
    exits
  }
}
