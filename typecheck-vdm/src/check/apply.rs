use super::Checker;
use crate::codes;
use crate::env::Env;
use crate::name::NameScope;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::expr::ApplyExpr;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::node::Node;
use types_vdm::TypeId;

impl<'a> Checker<'a> {
  /// `f(args)`: a function or operation call, a sequence index or a map
  /// lookup, depending on the type of the root.
  pub(crate) fn apply(
    &mut self,
    node: &'a Node<Expr>,
    a: &'a ApplyExpr,
    env: &Rc<Env>,
    scope: NameScope,
  ) -> TypeId {
    let span = self.span(node.loc);
    let unknown = self.unknown();
    let args: Vec<TypeId> = a
      .args
      .iter()
      .map(|arg| self.expr(arg, env, scope, None))
      .collect();
    let qualifier = matches!(*a.root.stx, Expr::Variable(_) | Expr::Field(_)).then_some(&args[..]);
    let root = self.expr_with(&a.root, env, scope, None, qualifier);
    if self.store.is_unknown(root) {
      return unknown;
    }

    if let Some(func) = self.store.as_function(root) {
      if func.is_uninstantiated() {
        let d = codes::UNINSTANTIATED
          .at(self.span(a.root.loc))
          .with_detail("Type", self.display(root));
        self.report(d);
        return unknown;
      }
      self.check_args(span, &func.params, &args, &a.args);
      return func.result;
    }
    if let Some(op) = self.store.as_operation(root) {
      self.check_args(span, &op.params, &args, &a.args);
      return op.result;
    }

    let mut results = Vec::new();
    if let Some(seq) = self.store.as_seq(root) {
      let nat1 = self.store.nat1();
      self.check_index(span, nat1, &args, &a.args);
      results.push(seq.elem);
    }
    if let Some(map) = self.store.as_map(root) {
      self.check_index(span, map.dom, &args, &a.args);
      results.push(map.rng);
    }
    if results.is_empty() {
      let d = codes::NOT_APPLICABLE
        .at(self.span(a.root.loc))
        .with_detail("Type", self.display(root));
      self.report(d);
      return unknown;
    }
    self.store.union(results)
  }

  /// Checks arguments against parameters: first the count, then each type.
  pub(crate) fn check_args(
    &mut self,
    span: Span,
    params: &[TypeId],
    args: &[TypeId],
    arg_nodes: &[Node<Expr>],
  ) {
    if args.len() != params.len() {
      let code = if args.len() > params.len() {
        codes::TOO_MANY_ARGUMENTS
      } else {
        codes::TOO_FEW_ARGUMENTS
      };
      let d = code
        .at(span)
        .with_detail("Args", self.store.display_list(args))
        .with_detail("Params", self.store.display_list(params));
      self.report(d);
      return;
    }
    for (i, ((param, arg), node)) in params.iter().zip(args).zip(arg_nodes).enumerate() {
      let arg_span = self.span(node.loc);
      if self
        .store
        .as_function(*arg)
        .is_some_and(|func| func.is_uninstantiated())
      {
        let d = codes::UNINSTANTIATED
          .at(arg_span)
          .with_detail("Type", self.display(*arg));
        self.report(d);
        continue;
      }
      self.check_assignable(
        || codes::ARGUMENT_TYPE.numbered(i + 1, arg_span),
        arg_span,
        *param,
        *arg,
      );
    }
  }

  fn check_index(&mut self, span: Span, expected: TypeId, args: &[TypeId], arg_nodes: &[Node<Expr>]) {
    match (args, arg_nodes) {
      ([arg], [node]) => {
        if !self.compatible(expected, *arg) {
          let d = codes::INDEX_TYPE
            .at(self.span(node.loc))
            .with_detail("Expected", self.display(expected))
            .with_detail("Actual", self.display(*arg));
          self.report(d);
        }
      }
      _ => self.check_args(span, &[expected], args, arg_nodes),
    }
  }
}
