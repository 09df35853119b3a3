use super::Checker;
use super::ResolvedDef;
use super::ResolvedType;
use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::LocalRole;
use crate::env::Env;
use crate::name::Name;
use crate::name::NameScope;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::decl::ErrorCase;
use syntax_vdm::ast::decl::ExternalClause;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::pat::Pattern;
use syntax_vdm::ast::stmt::AssignStmt;
use syntax_vdm::ast::stmt::BlockStmt;
use syntax_vdm::ast::stmt::CallObjectStmt;
use syntax_vdm::ast::stmt::CallStmt;
use syntax_vdm::ast::stmt::StateDesignator;
use syntax_vdm::ast::stmt::Stmt;
use types_vdm::TypeId;

/// How control can leave a statement.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Flow {
  /// Types of the values returned by `return` statements.
  pub(crate) returns: Vec<TypeId>,
  /// Whether execution may continue with the next statement.
  pub(crate) falls_through: bool,
}

impl Flow {
  pub(crate) fn through() -> Flow {
    Flow {
      returns: Vec::new(),
      falls_through: true,
    }
  }

  pub(crate) fn stop() -> Flow {
    Flow::default()
  }

  pub(crate) fn returning(ty: TypeId) -> Flow {
    Flow {
      returns: vec![ty],
      falls_through: false,
    }
  }

  /// Either `self` or `other` runs.
  pub(crate) fn or(mut self, other: Flow) -> Flow {
    self.returns.extend(other.returns);
    self.falls_through |= other.falls_through;
    self
  }

  /// `self` runs, then `next` if `self` falls through.
  pub(crate) fn then(mut self, next: Flow) -> Flow {
    if !self.falls_through {
      return self;
    }
    self.returns.extend(next.returns);
    self.falls_through = next.falls_through;
    self
  }
}

/// The operation a statement belongs to.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpCtx {
  /// Declared result; void for operations without one.
  pub(crate) result: TypeId,
  pub(crate) is_constructor: bool,
}

impl<'a> Checker<'a> {
  /// Checks a statement and returns how control leaves it. The statement's
  /// type, the union of its returns and void when it falls through, is
  /// recorded on the node.
  pub(crate) fn stmt(
    &mut self,
    node: &'a Node<Stmt>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> Flow {
    let flow = self.stmt_kind(node, env, scope, ctx);
    let mut types = flow.returns.clone();
    if flow.falls_through {
      types.push(self.store.void());
    }
    let ty = self.store.union(types);
    node.assoc.set(ResolvedType(ty));
    flow
  }

  fn stmt_kind(
    &mut self,
    node: &'a Node<Stmt>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> Flow {
    let span = self.span(node.loc);
    match &*node.stx {
      Stmt::Assign(a) => {
        self.assign(span, a, env, scope, ctx);
        Flow::through()
      }
      Stmt::Atomic(a) => {
        for assignment in &a.assignments {
          let span = self.span(assignment.loc);
          self.assign(span, &assignment.stx, env, scope, ctx);
        }
        Flow::through()
      }
      Stmt::Block(b) => self.block(b, env, scope, ctx),
      Stmt::Call(c) => {
        self.call(node, c, env, scope, ctx);
        Flow::through()
      }
      Stmt::CallObject(c) => {
        self.call_object(span, c, env, scope, ctx);
        Flow::through()
      }
      Stmt::If(i) => {
        self.condition(&i.test, env, scope, codes::EXPECTED_BOOLEAN);
        let then_env = self.narrowed(&i.test, env);
        let mut flow = self.stmt(&i.consequent, &then_env, scope, ctx);
        for elseif in &i.elseifs {
          self.condition(&elseif.stx.test, env, scope, codes::EXPECTED_BOOLEAN);
          let then_env = self.narrowed(&elseif.stx.test, env);
          flow = flow.or(self.stmt(&elseif.stx.consequent, &then_env, scope, ctx));
        }
        match &i.alternate {
          Some(alternate) => flow.or(self.stmt(alternate, env, scope, ctx)),
          None => flow.or(Flow::through()),
        }
      }
      Stmt::Cases(c) => {
        let subject = self.expr(&c.subject, env, scope, None);
        let mut flow = Flow::stop();
        for alt in &c.alternatives {
          let mut defs = Vec::new();
          for pattern in &alt.stx.patterns {
            defs.extend(self.bind_pattern(pattern, subject, env, LocalRole::Bound));
          }
          let alt_env = Env::flat(defs, env);
          flow = flow.or(self.stmt(&alt.stx.body, &alt_env, scope, ctx));
        }
        match &c.others {
          Some(others) => flow.or(self.stmt(others, env, scope, ctx)),
          None => flow.or(Flow::through()),
        }
      }
      Stmt::While(w) => {
        self.condition(&w.test, env, scope, codes::EXPECTED_BOOLEAN);
        Flow::through().or(self.stmt(&w.body, env, scope, ctx))
      }
      Stmt::ForAllSet(f) => {
        let set_ty = self.expr(&f.set, env, scope, None);
        let elem = match self.store.as_set(set_ty) {
          Some(set) => set.elem,
          None => {
            let d = codes::LOOP_NOT_SET
              .at(self.span(f.set.loc))
              .with_detail("Actual", self.display(set_ty));
            self.report(d);
            self.unknown()
          }
        };
        self.loop_body(&f.pattern, elem, &f.body, env, scope, ctx)
      }
      Stmt::ForSeq(f) => {
        let seq_ty = self.expr(&f.seq, env, scope, None);
        let elem = match self.store.as_seq(seq_ty) {
          Some(seq) => seq.elem,
          None => {
            let d = codes::LOOP_NOT_SEQ
              .at(self.span(f.seq.loc))
              .with_detail("Actual", self.display(seq_ty));
            self.report(d);
            self.unknown()
          }
        };
        self.loop_body(&f.pattern, elem, &f.body, env, scope, ctx)
      }
      Stmt::ForIndex(f) => {
        for bound in [Some(&f.from), Some(&f.to), f.by.as_ref()].into_iter().flatten() {
          let ty = self.expr(bound, env, scope, None);
          if !self.store.is_numeric(ty) {
            let d = codes::LOOP_BOUNDS
              .at(self.span(bound.loc))
              .with_detail("Actual", self.display(ty));
            self.report(d);
          }
        }
        let int = self.store.int();
        let var = self.local(env, &f.var, node.loc, LocalRole::Loop, int);
        let body_env = Env::flat(vec![var], env);
        Flow::through().or(self.stmt(&f.body, &body_env, scope, ctx))
      }
      Stmt::Return(r) => self.return_stmt(span, r.value.as_ref(), env, scope, ctx),
      Stmt::LetDef(l) => {
        let (body_env, defs) = self.let_defs(&l.defs, env, scope);
        let flow = self.stmt(&l.body, &body_env, scope, ctx);
        self.finish_scope(&defs);
        flow
      }
      Stmt::LetBeSt(l) => {
        let defs = self.bind_multiple(std::slice::from_ref(&l.bind), env, scope, LocalRole::Let);
        let body_env = Env::flat(defs.clone(), env);
        if let Some(such_that) = &l.such_that {
          self.condition(such_that, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        let flow = self.stmt(&l.body, &body_env, scope, ctx);
        self.finish_scope(&defs);
        flow
      }
      Stmt::Def(d) => {
        let (body_env, defs) = self.equals_defs(&d.defs, env, scope);
        let flow = self.stmt(&d.body, &body_env, scope, ctx);
        self.finish_scope(&defs);
        flow
      }
      Stmt::Exit(e) => {
        if let Some(value) = &e.value {
          self.expr(value, env, scope, None);
        }
        Flow::stop()
      }
      Stmt::Tixe(t) => {
        let mut flow = self.stmt(&t.body, env, scope, ctx);
        let raised = self.exit_type(&t.body);
        for trap in &t.traps {
          flow = flow.or(self.handler(&trap.stx.pattern, raised, &trap.stx.handler, env, scope, ctx));
        }
        flow
      }
      Stmt::Trap(t) => {
        let flow = self.stmt(&t.body, env, scope, ctx);
        let raised = self.exit_type(&t.body);
        flow.or(self.handler(&t.pattern, raised, &t.handler, env, scope, ctx))
      }
      Stmt::Always(a) => {
        let body = self.stmt(&a.body, env, scope, ctx);
        let always = self.stmt(&a.always, env, scope, ctx);
        Flow {
          returns: body.returns.into_iter().chain(always.returns).collect(),
          falls_through: body.falls_through && always.falls_through,
        }
      }
      Stmt::Error => Flow::stop(),
      Stmt::Skip => Flow::through(),
      Stmt::Specification(s) => {
        self.check_externals(&s.externals, env);
        self.specification_clauses(s.pre.as_ref(), s.post.as_ref(), &s.errors, env);
        Flow::through()
      }
      Stmt::NonDeterministic(n) => {
        let mut flow = Flow::through();
        for stmt in &n.stmts {
          let next = self.stmt(stmt, env, scope, ctx);
          flow = flow.then(next);
        }
        flow
      }
      Stmt::Start(s) | Stmt::Stop(s) => {
        let ty = self.expr(&s.object, env, scope, None);
        if !self.store.is_class(ty) {
          let d = codes::NOT_AN_OBJECT
            .at(self.span(s.object.loc))
            .with_detail("Actual", self.display(ty));
          self.report(d);
        }
        Flow::through()
      }
      Stmt::StartList(s) | Stmt::StopList(s) => {
        let ty = self.expr(&s.object, env, scope, None);
        let objects = self.store.as_set(ty).is_some_and(|set| self.store.is_class(set.elem));
        if !objects {
          let d = codes::NOT_AN_OBJECT
            .at(self.span(s.object.loc))
            .with_detail("Actual", self.display(ty));
          self.report(d);
        }
        Flow::through()
      }
      Stmt::NotYetSpecified | Stmt::SubclassResponsibility => Flow::returning(ctx.result),
    }
  }

  fn block(&mut self, b: &'a BlockStmt, env: &Rc<Env>, scope: NameScope, ctx: &OpCtx) -> Flow {
    let mut env = Rc::clone(env);
    let mut dcls = Vec::new();
    for dcl in &b.dcls {
      let span = self.span(dcl.loc);
      let ty = self.resolve_type(&dcl.stx.ty, &env);
      if let Some(init) = &dcl.stx.init {
        let value = self.expr(init, &env, scope, Some(ty));
        self.check_assignable(|| codes::ASSIGN_TYPE.at(span), span, ty, value);
      }
      let id = self.local(&env, &dcl.stx.name, dcl.loc, LocalRole::Dcl, ty);
      env = Env::flat(vec![id], &env);
      dcls.push(id);
    }
    let mut flow = Flow::through();
    let mut reported = false;
    for stmt in &b.stmts {
      if !flow.falls_through && !reported {
        self.report(codes::UNREACHABLE.at(self.span(stmt.loc)));
        reported = true;
      }
      let next = self.stmt(stmt, &env, scope, ctx);
      flow = flow.then(next);
    }
    self.finish_scope(&dcls);
    flow
  }

  fn loop_body(
    &mut self,
    pattern: &'a Node<Pattern>,
    elem: TypeId,
    body: &'a Node<Stmt>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> Flow {
    let defs = self.bind_pattern(pattern, elem, env, LocalRole::Loop);
    let body_env = Env::flat(defs, env);
    Flow::through().or(self.stmt(body, &body_env, scope, ctx))
  }

  fn handler(
    &mut self,
    pattern: &'a Node<Pattern>,
    raised: TypeId,
    handler: &'a Node<Stmt>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> Flow {
    let defs = self.bind_pattern(pattern, raised, env, LocalRole::Handler);
    let handler_env = Env::flat(defs, env);
    self.stmt(handler, &handler_env, scope, ctx)
  }

  fn return_stmt(
    &mut self,
    span: Span,
    value: Option<&'a Node<Expr>>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> Flow {
    let void = self.store.is_void(ctx.result);
    match value {
      Some(value) => {
        let ty = self.expr(value, env, scope, (!void).then_some(ctx.result));
        if void {
          self.report(codes::RETURN_IN_VOID.at(span));
          return Flow::returning(ty);
        }
        self.check_assignable(|| codes::RETURN_TYPE.at(span), span, ctx.result, ty);
        Flow::returning(ty)
      }
      None => {
        if !void && !ctx.is_constructor {
          let d = codes::RETURN_VALUE_MISSING
            .at(span)
            .with_detail("Expected", self.display(ctx.result));
          self.report(d);
        }
        Flow::returning(self.store.void())
      }
    }
  }

  fn assign(&mut self, span: Span, a: &'a AssignStmt, env: &Rc<Env>, scope: NameScope, ctx: &OpCtx) {
    let target = self.designator(&a.target, env, scope, ctx);
    let value = self.expr(&a.value, env, scope, Some(target));
    self.check_assignable(|| codes::ASSIGN_TYPE.at(span), span, target, value);
    if env.is_functional() {
      self.report(codes::ASSIGN_IN_FUNCTION.at(span));
    }
  }

  /// The type of an assignment target.
  fn designator(
    &mut self,
    node: &'a Node<StateDesignator>,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) -> TypeId {
    let span = self.span(node.loc);
    let unknown = self.unknown();
    match &*node.stx {
      StateDesignator::Name(n) => {
        let current = env.container_name(&self.table);
        let lookup = Name::reference(&current, n.module.as_deref(), &n.name);
        let Some(found) = env.find_name(&self.table, &lookup, NameScope::NAMESANDSTATE) else {
          let d = codes::UNKNOWN_NAME
            .at(span)
            .with_detail("Name", lookup.to_string());
          self.report(d);
          return unknown;
        };
        node.assoc.set(ResolvedDef(found));
        let origin = self.table.origin(found);
        let assignable = match &self.table.get(origin).kind {
          DefKind::InstanceVariable { initialized, .. } => {
            if ctx.is_constructor {
              initialized.set(true);
            }
            true
          }
          DefKind::Local {
            role: LocalRole::Dcl | LocalRole::StateField,
          } => true,
          _ => false,
        };
        if !assignable {
          let d = codes::NOT_ASSIGNABLE
            .at(span)
            .with_detail("Name", lookup.to_string());
          self.report(d);
        }
        self.check_reference(found, env, span, false);
        self.table.ty(found)
      }
      StateDesignator::Field(f) => {
        let object = self.designator(&f.object, env, scope, ctx);
        if self.store.is_unknown(object) {
          return unknown;
        }
        for record in self.store.records(object) {
          if let Some(field) = self.store.named(record).field(&f.field) {
            return field.ty;
          }
        }
        for class in self.store.classes(object) {
          let Some(class) = self.table.class_by_type(class) else {
            continue;
          };
          let lookup = Name::explicit(self.table.get(class).name.name.clone(), f.field.clone());
          if let Some(member) = self
            .global
            .find_name(&self.table, &lookup, NameScope::STATE)
          {
            self.check_reference(member, env, span, true);
            return self.table.ty(member);
          }
        }
        let d = codes::UNKNOWN_FIELD
          .at(span)
          .with_detail("Field", f.field.clone())
          .with_detail("Type", self.display(object));
        self.report(d);
        unknown
      }
      StateDesignator::Apply(a) => {
        let target = self.designator(&a.target, env, scope, ctx);
        let index = self.expr(&a.index, env, scope, None);
        if self.store.is_unknown(target) {
          return unknown;
        }
        let expected = if let Some(map) = self.store.as_map(target) {
          Some((map.dom, map.rng))
        } else {
          let nat1 = self.store.nat1();
          self.store.as_seq(target).map(|seq| (nat1, seq.elem))
        };
        match expected {
          Some((key, value)) => {
            if !self.compatible(key, index) {
              let d = codes::INDEX_TYPE
                .at(self.span(a.index.loc))
                .with_detail("Expected", self.display(key))
                .with_detail("Actual", self.display(index));
              self.report(d);
            }
            value
          }
          None => {
            let d = codes::NOT_APPLICABLE
              .at(span)
              .with_detail("Type", self.display(target));
            self.report(d);
            unknown
          }
        }
      }
    }
  }

  /// Picks the operation a call statement names among `candidates`.
  fn select_callee(
    &mut self,
    candidates: &[DefId],
    args: &[TypeId],
    span: Span,
    name: &Name,
  ) -> Option<DefId> {
    match candidates.len() {
      0 => {
        let d = codes::UNKNOWN_NAME
          .at(span)
          .with_detail("Name", name.to_string())
          .with_detail("Args", self.store.display_list(args));
        self.report(d);
        None
      }
      1 => Some(candidates[0]),
      _ => {
        let qualified = name.clone().with_qualifier(args.to_vec());
        self.select_overload(candidates, span, &qualified)
      }
    }
  }

  /// Checks a resolved callee and its arguments. `via_object` is set for
  /// `obj.op(...)`.
  fn check_callee(
    &mut self,
    callee: DefId,
    span: Span,
    args: &[TypeId],
    arg_nodes: &'a [Node<Expr>],
    env: &Rc<Env>,
    ctx: &OpCtx,
    via_object: bool,
  ) {
    let origin = self.table.origin(callee);
    let def = self.table.get(origin);
    let name = def.name.to_string();
    let is_operation = def.is_operation();
    let is_constructor = def.is_constructor();
    if !is_operation {
      let code = if via_object {
        codes::NOT_AN_OPERATION_FIELD
      } else {
        codes::CALL_NOT_OPERATION
      };
      self.report(code.at(span).with_detail("Name", name));
      return;
    }
    if is_constructor && !ctx.is_constructor {
      self.report(codes::CONSTRUCTOR_CALL.at(span).with_detail("Name", name));
    }
    self.table.mark_used(callee);
    self.check_reference(callee, env, span, via_object);
    let ty = self.table.ty(callee);
    if let Some(op) = self.store.as_operation(ty) {
      self.check_args(span, &op.params, args, arg_nodes);
    }
  }

  fn call(&mut self, node: &'a Node<Stmt>, c: &'a CallStmt, env: &Rc<Env>, scope: NameScope, ctx: &OpCtx) {
    let span = self.span(node.loc);
    let args: Vec<TypeId> = c.args.iter().map(|a| self.expr(a, env, scope, None)).collect();
    let current = env.container_name(&self.table);
    let lookup = Name::reference(&current, c.module.as_deref(), &c.name);
    let candidates = env.find_matches(&self.table, &lookup, NameScope::NAMESANDSTATE);
    let Some(callee) = self.select_callee(&candidates, &args, span, &lookup) else {
      return;
    };
    node.assoc.set(ResolvedDef(callee));
    self.check_callee(callee, span, &args, &c.args, env, ctx, false);
  }

  fn call_object(
    &mut self,
    span: Span,
    c: &'a CallObjectStmt,
    env: &Rc<Env>,
    scope: NameScope,
    ctx: &OpCtx,
  ) {
    let object = self.expr(&c.object, env, scope, None);
    let args: Vec<TypeId> = c.args.iter().map(|a| self.expr(a, env, scope, None)).collect();
    if self.store.is_unknown(object) {
      return;
    }
    let classes = self.store.classes(object);
    if classes.is_empty() {
      let d = codes::NOT_AN_OBJECT
        .at(self.span(c.object.loc))
        .with_detail("Actual", self.display(object));
      self.report(d);
      return;
    }
    for class in classes {
      let Some(class) = self.table.class_by_type(class) else {
        continue;
      };
      let lookup = Name::explicit(self.table.get(class).name.name.clone(), c.field.clone());
      let candidates = self.global.find_matches(&self.table, &lookup, NameScope::NAMESANDSTATE);
      if let Some(callee) = self.select_callee(&candidates, &args, span, &lookup) {
        self.check_callee(callee, span, &args, &c.args, env, ctx, true);
      }
    }
  }

  /// `ext` clauses may only name state.
  pub(crate) fn check_externals(&mut self, externals: &'a [Node<ExternalClause>], env: &Rc<Env>) {
    let current = env.container_name(&self.table);
    for clause in externals {
      let span = self.span(clause.loc);
      let declared = clause.stx.ty.as_ref().map(|t| self.resolve_type(t, env));
      for name in &clause.stx.names {
        let lookup = Name::reference(&current, None, name);
        let found = env
          .find_name(&self.table, &lookup, NameScope::STATE)
          .filter(|d| self.table.get(*d).scope.contains(NameScope::STATE));
        let Some(found) = found else {
          let d = codes::EXTERNAL_NOT_STATE
            .at(span)
            .with_detail("Name", name.clone());
          self.report(d);
          continue;
        };
        if let Some(declared) = declared {
          let actual = self.table.ty(found);
          self.check_assignable(|| codes::VALUE_TYPE.at(span), span, actual, declared);
        }
      }
    }
  }

  /// The pre, post and `errs` clauses of an implicit operation or a
  /// specification statement. State is visible; the postcondition also
  /// sees old state.
  pub(crate) fn specification_clauses(
    &mut self,
    pre: Option<&'a Node<Expr>>,
    post: Option<&'a Node<Expr>>,
    errors: &'a [Node<ErrorCase>],
    env: &Rc<Env>,
  ) {
    if let Some(pre) = pre {
      self.condition(pre, env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
    if let Some(post) = post {
      self.condition(post, env, NameScope::NAMESANDANYSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
    for error in errors {
      self.condition(&error.stx.condition, env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
      self.condition(&error.stx.result, env, NameScope::NAMESANDANYSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
  }
}
