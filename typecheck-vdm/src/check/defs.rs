//! Checking each definition in its pass.

use super::stmt::OpCtx;
use super::Checker;
use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::LocalRole;
use crate::def::Pass;
use crate::env::Context;
use crate::env::Env;
use crate::env::Frame;
use crate::name::Name;
use crate::name::NameScope;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::decl::ClassInvariantDecl;
use syntax_vdm::ast::decl::ExplicitFunctionDecl;
use syntax_vdm::ast::decl::ExplicitOperationDecl;
use syntax_vdm::ast::decl::FunctionBody;
use syntax_vdm::ast::decl::ImplicitFunctionDecl;
use syntax_vdm::ast::decl::ImplicitOperationDecl;
use syntax_vdm::ast::decl::InstanceVariableDecl;
use syntax_vdm::ast::decl::Measure;
use syntax_vdm::ast::decl::MutexDecl;
use syntax_vdm::ast::decl::PerDecl;
use syntax_vdm::ast::decl::StateDecl;
use syntax_vdm::ast::decl::TraceDef;
use syntax_vdm::ast::decl::TypeDecl;
use syntax_vdm::ast::decl::ValueDecl;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::pat::Pattern;
use syntax_vdm::ast::stmt::Stmt;
use syntax_vdm::loc::Loc;
use tracing::debug_span;
use types_vdm::RelateCtx;
use types_vdm::TypeId;

/// Name of the result in the postcondition of an explicit definition.
const RESULT: &str = "RESULT";

impl<'a> Checker<'a> {
  /// Checks every definition of `declared` that belongs to `pass`, in
  /// declaration order.
  pub(crate) fn run_pass(&mut self, pass: Pass, declared: &[DefId]) {
    let ids: Vec<DefId> = declared
      .iter()
      .copied()
      .filter(|id| self.table.get(*id).pass == pass)
      .collect();
    let span = debug_span!("typecheck_vdm.pass", pass = ?pass, definitions = ids.len());
    let _guard = span.enter();
    for id in ids {
      self.check_definition(id);
    }
  }

  fn check_definition(&mut self, id: DefId) {
    self.enter(id);
    let def = self.table.get(id);
    let span = debug_span!("typecheck_vdm.definition", name = %def.name, kind = def.kind.name());
    let _guard = span.enter();
    match &def.kind {
      DefKind::Type { decl, .. } => {
        let decl = *decl;
        self.check_type_definition(id, decl);
      }
      DefKind::State { decl, .. } => {
        let decl = *decl;
        self.check_state(id, decl);
      }
      DefKind::Value { decl, names } => {
        let (decl, names) = (*decl, names.clone());
        self.check_value(id, decl, &names);
      }
      DefKind::InstanceVariable { decl, .. } => {
        let decl = *decl;
        self.check_instance_variable(id, decl);
      }
      DefKind::ExplicitFunction { decl, .. } => {
        let decl = *decl;
        self.type_params = decl.type_params.clone();
        let env = self.member_env(id, Context::Function);
        self.check_explicit_function(id, decl, &env);
        self.type_params.clear();
      }
      DefKind::ImplicitFunction { decl, .. } => {
        let decl = *decl;
        self.type_params = decl.type_params.clone();
        let env = self.member_env(id, Context::Function);
        self.check_implicit_function(id, decl, &env);
        self.type_params.clear();
      }
      DefKind::ExplicitOperation { decl, .. } => {
        let decl = *decl;
        self.check_explicit_operation(id, decl);
      }
      DefKind::ImplicitOperation { decl, .. } => {
        let decl = *decl;
        self.check_implicit_operation(id, decl);
      }
      DefKind::ClassInvariant { decl } => {
        let decl = *decl;
        self.check_class_invariant(id, decl);
      }
      DefKind::MutexSync { decl } => {
        let decl = *decl;
        self.check_mutex(id, decl);
      }
      DefKind::PerSync { decl } => {
        let decl = *decl;
        self.check_per(id, decl);
      }
      DefKind::NamedTrace { decl } => {
        let decl = *decl;
        let env = self.member_env(id, Context::Operation);
        self.check_trace(&decl.body, &env);
      }
      DefKind::Local { .. }
      | DefKind::Class(_)
      | DefKind::Imported { .. }
      | DefKind::Inherited { .. }
      | DefKind::Renamed { .. }
      | DefKind::Qualified { .. }
      | DefKind::Equals { .. }
      | DefKind::MultiBindList { .. }
      | DefKind::Derived { .. }
      | DefKind::Untyped => {}
    }
  }

  /// The environment of a member's body: its container, with the member's
  /// static flag and the given context.
  fn member_env(&self, id: DefId, context: Context) -> Rc<Env> {
    let container = self.container_env(id);
    Env::new(Frame::Flat(Vec::new()))
      .within(&container)
      .with_static(self.table.get(id).is_static())
      .with_context(context)
      .build()
  }

  /// Binds each pattern to the parameter type at the same position.
  fn bind_params(
    &mut self,
    id: DefId,
    span: Span,
    patterns: &[&'a Node<Pattern>],
    params: &[TypeId],
    env: &Rc<Env>,
  ) -> Vec<DefId> {
    if patterns.len() != params.len() {
      let d = codes::PARAMETER_PATTERNS
        .at(span)
        .with_detail("Name", self.table.get(id).name.name.clone())
        .with_detail("Params", self.store.display_list(params));
      self.report(d);
    }
    let mut defs = Vec::new();
    for (pattern, ty) in patterns.iter().zip(params) {
      defs.extend(self.bind_pattern(pattern, *ty, env, LocalRole::Parameter));
    }
    defs
  }

  fn check_type_definition(&mut self, id: DefId, decl: &'a TypeDecl) {
    let ty = self.table.get(id).ty();
    let env = self.member_env(id, Context::Function);
    if let Some(inv) = &decl.inv {
      let defs = self.bind_pattern(&inv.stx.pattern, ty, &env, LocalRole::Parameter);
      let inv_env = Env::flat(defs, &env);
      self.condition(&inv.stx.predicate, &inv_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    for relation in [&decl.eq, &decl.ord].into_iter().flatten() {
      let mut defs = self.bind_pattern(&relation.stx.left, ty, &env, LocalRole::Parameter);
      defs.extend(self.bind_pattern(&relation.stx.right, ty, &env, LocalRole::Parameter));
      let rel_env = Env::flat(defs, &env);
      self.condition(&relation.stx.body, &rel_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
  }

  fn check_state(&mut self, id: DefId, decl: &'a StateDecl) {
    let ty = self.table.get(id).ty();
    let env = self.member_env(id, Context::Function);
    if let Some(inv) = &decl.inv {
      let defs = self.bind_pattern(&inv.stx.pattern, ty, &env, LocalRole::Parameter);
      let inv_env = Env::flat(defs, &env);
      self.condition(&inv.stx.predicate, &inv_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    if let Some(init) = &decl.init {
      let shaped = match &*init.stx.pattern.stx {
        Pattern::Identifier(_) => true,
        Pattern::Record(r) => r.name == decl.name,
        _ => false,
      };
      if !shaped {
        let d = codes::STATE_INIT_PATTERN.at(self.span(init.stx.pattern.loc));
        self.report(d);
      }
      let defs = self.bind_pattern(&init.stx.pattern, ty, &env, LocalRole::Parameter);
      let init_env = Env::flat(defs, &env);
      self.condition(&init.stx.predicate, &init_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
  }

  fn check_value(&mut self, id: DefId, decl: &'a ValueDecl, names: &[DefId]) {
    let span = self.table.get(id).span;
    let env = Env::new(Frame::Flat(Vec::new()))
      .within(&self.container_env(id))
      .with_static(true)
      .with_context(Context::Function)
      .build();
    let declared = decl.ty.as_ref().map(|_| self.table.get(id).ty());
    let ty = self.expr(&decl.value, &env, NameScope::NAMES, declared);
    let bound = match declared {
      Some(declared) => {
        self.check_assignable(|| codes::VALUE_TYPE.at(span), span, declared, ty);
        declared
      }
      None => ty,
    };
    self.table.get(id).set_ty(bound);
    let mut bindings = Vec::new();
    self.match_pattern(&decl.pattern, bound, &env, &mut bindings);
    for name in names {
      let def = self.table.get(*name);
      if let Some((_, _, ty)) = bindings.iter().find(|(n, _, _)| *n == def.name.name) {
        def.set_ty(*ty);
      }
    }
  }

  fn check_instance_variable(&mut self, id: DefId, decl: &'a InstanceVariableDecl) {
    let Some(init) = &decl.init else {
      return;
    };
    let span = self.span(init.loc);
    let declared = self.table.get(id).ty();
    let env = self.member_env(id, Context::Function);
    let ty = self.expr(init, &env, NameScope::NAMESANDSTATE, Some(declared));
    self.check_assignable(|| codes::VALUE_TYPE.at(span), span, declared, ty);
  }

  /// Checks an explicit function, module level or local. `env` is the
  /// environment the function is declared in.
  pub(crate) fn check_explicit_function(&mut self, id: DefId, f: &'a ExplicitFunctionDecl, env: &Rc<Env>) {
    let ty = self.table.get(id).ty();
    let span = self.table.get(id).span;
    let Some(mut func) = self.store.as_function(ty) else {
      return;
    };
    let mut params = Vec::new();
    let first_params = func.params.clone();
    for (i, list) in f.params.iter().enumerate() {
      if i > 0 {
        let Some(next) = self.store.as_function(func.result) else {
          let d = codes::PARAMETER_PATTERNS
            .at(span)
            .with_detail("Name", f.name.clone());
          self.report(d);
          break;
        };
        func = next;
      }
      let patterns: Vec<&'a Node<Pattern>> = list.iter().collect();
      params.extend(self.bind_params(id, span, &patterns, &func.params, env));
    }
    let result = func.result;
    let (body_env, pre_env) = self.function_envs(id, &params, env);
    if let Some(pre) = &f.pre {
      self.condition(pre, &pre_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    if let Some(post) = &f.post {
      let result_def = self.local(&body_env, RESULT, post.loc, LocalRole::Result, result);
      let post_env = Env::flat(vec![result_def], &body_env);
      self.condition(post, &post_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    self.function_body(&f.body, result, &body_env);
    if let Some(measure) = &f.measure {
      self.check_measure(id, measure, &first_params, &body_env);
    }
  }

  /// Checks an implicit function, module level or local.
  pub(crate) fn check_implicit_function(&mut self, id: DefId, f: &'a ImplicitFunctionDecl, env: &Rc<Env>) {
    let ty = self.table.get(id).ty();
    let span = self.table.get(id).span;
    let Some(func) = self.store.as_function(ty) else {
      return;
    };
    let patterns: Vec<&'a Node<Pattern>> = f.params.iter().map(|p| &p.stx.pattern).collect();
    let params = self.bind_params(id, span, &patterns, &func.params, env);
    let (body_env, pre_env) = self.function_envs(id, &params, env);
    if let Some(pre) = &f.pre {
      self.condition(pre, &pre_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    let result_def = self.local(&body_env, &f.result.stx.name, f.result.loc, LocalRole::Result, func.result);
    if let Some(post) = &f.post {
      let post_env = Env::flat(vec![result_def], &body_env);
      self.condition(post, &post_env, NameScope::NAMES, codes::PREDICATE_NOT_BOOLEAN);
    }
    if let Some(body) = &f.body {
      self.function_body(body, func.result, &body_env);
    }
    if let Some(measure) = &f.measure {
      self.check_measure(id, measure, &func.params, &body_env);
    }
  }

  /// The environments of a function's body and of its precondition.
  fn function_envs(&self, id: DefId, params: &[DefId], env: &Rc<Env>) -> (Rc<Env>, Rc<Env>) {
    let body = Env::new(Frame::Flat(params.to_vec()))
      .within(env)
      .with_context(Context::Function)
      .with_enclosing(id)
      .build();
    let pre = Env::new(Frame::Flat(params.to_vec()))
      .within(env)
      .with_context(Context::Function)
      .with_enclosing(id)
      .in_precondition()
      .build();
    (body, pre)
  }

  fn function_body(&mut self, body: &'a FunctionBody, result: TypeId, env: &Rc<Env>) {
    let FunctionBody::Expr(body) = body else {
      return;
    };
    let span = self.span(body.loc);
    let actual = self.expr(body, env, NameScope::NAMES, Some(result));
    self.check_assignable(|| codes::FUNCTION_RESULT.at(span), span, result, actual);
  }

  /// A measure takes the function's parameters and returns a natural number
  /// or a tuple of them.
  fn check_measure(&mut self, id: DefId, measure: &'a Measure, params: &[TypeId], env: &Rc<Env>) {
    let result = match measure {
      Measure::Name(name) => {
        let span = self.span(name.loc);
        let current = env.container_name(&self.table);
        let lookup = Name::reference(&current, None, &name.stx.name);
        let found = env
          .find_name(&self.table, &lookup, NameScope::NAMES)
          .filter(|m| self.table.is_function(*m));
        let Some(found) = found else {
          let d = codes::MEASURE_UNDEFINED
            .at(span)
            .with_detail("Name", name.stx.name.clone());
          self.report(d);
          return;
        };
        let measure_ty = self.table.ty(found);
        let Some(func) = self.store.as_function(measure_ty) else {
          return;
        };
        let same = RelateCtx::new(&self.store).compatible_lists(params, &func.params)
          && RelateCtx::new(&self.store).compatible_lists(&func.params, params);
        if !same {
          let d = codes::MEASURE_PARAMS
            .at(span)
            .with_detail("Expected", self.store.display_list(params))
            .with_detail("Actual", self.store.display_list(&func.params));
          self.report(d);
        }
        (span, func.result)
      }
      Measure::Expr(expr) => {
        let span = self.span(expr.loc);
        (span, self.expr(expr, env, NameScope::NAMES, None))
      }
    };
    let (span, ty) = result;
    if !self.is_natural(ty) {
      let d = codes::MEASURE_NOT_NATURAL
        .at(span)
        .with_detail("Actual", self.display(ty));
      self.report(d);
    }
    if let Some(info) = self.table.get(id).kind.function_info() {
      info.measure.set(Some(ty));
    }
  }

  fn operation_context(&self, id: DefId) -> Context {
    if self.table.get(id).access.is_pure {
      Context::PureOperation
    } else {
      Context::Operation
    }
  }

  /// Checks the result of a constructor or an async operation.
  fn check_operation_result(&mut self, id: DefId, result: TypeId) {
    let def = self.table.get(id);
    let span = def.span;
    let is_async = def.access.is_async;
    let class_ty = def
      .is_constructor()
      .then_some(def.class)
      .flatten()
      .map(|class| self.table.get(class).ty());
    if let Some(class_ty) = class_ty {
      if !self.store.is_void(result) && !self.is_sub_type(result, class_ty) {
        let d = codes::CONSTRUCTOR_RESULT
          .at(span)
          .with_detail("Expected", self.display(class_ty))
          .with_detail("Actual", self.display(result));
        self.report(d);
      }
    }
    if is_async && !self.store.is_void(result) {
      self.report(codes::ASYNC_RESULT.at(span));
    }
  }

  /// Checks an operation body and warns when a value-returning operation may
  /// run off its end.
  fn operation_body(&mut self, id: DefId, body: &'a Node<Stmt>, result: TypeId, env: &Rc<Env>) {
    let ctx = OpCtx {
      result,
      is_constructor: self.table.get(id).is_constructor(),
    };
    let flow = self.stmt(body, env, NameScope::NAMESANDSTATE, &ctx);
    if flow.falls_through && !self.store.is_void(result) && !ctx.is_constructor {
      self.report(codes::MAY_NOT_RETURN.at(self.span(body.loc)));
    }
  }

  /// Environments of an operation's body, precondition and postcondition.
  fn operation_envs(
    &mut self,
    id: DefId,
    params: &[DefId],
    result: Option<(&str, Loc, TypeId)>,
  ) -> (Rc<Env>, Rc<Env>, Rc<Env>) {
    let env = self.member_env(id, self.operation_context(id));
    let body = Env::new(Frame::Flat(params.to_vec()))
      .within(&env)
      .with_enclosing(id)
      .build();
    let pre = Env::new(Frame::Flat(params.to_vec()))
      .within(&env)
      .with_context(Context::Function)
      .with_enclosing(id)
      .in_precondition()
      .build();
    let post_context = Env::new(Frame::Flat(params.to_vec()))
      .within(&env)
      .with_context(Context::Function)
      .with_enclosing(id)
      .build();
    let post = match result {
      Some((name, loc, ty)) => {
        let result_def = self.local(&post_context, name, loc, LocalRole::Result, ty);
        Env::flat(vec![result_def], &post_context)
      }
      None => post_context,
    };
    (body, pre, post)
  }

  fn check_explicit_operation(&mut self, id: DefId, decl: &'a ExplicitOperationDecl) {
    let ty = self.table.get(id).ty();
    let span = self.table.get(id).span;
    let Some(op) = self.store.as_operation(ty) else {
      return;
    };
    self.check_operation_result(id, op.result);
    let container = self.member_env(id, self.operation_context(id));
    let patterns: Vec<&'a Node<Pattern>> = decl.params.iter().collect();
    let params = self.bind_params(id, span, &patterns, &op.params, &container);
    let result = (!self.store.is_void(op.result)).then_some((RESULT, decl.ty.loc, op.result));
    let (body_env, pre_env, post_env) = self.operation_envs(id, &params, result);
    if let Some(pre) = &decl.pre {
      self.condition(pre, &pre_env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
    if let Some(post) = &decl.post {
      self.condition(post, &post_env, NameScope::NAMESANDANYSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
    self.operation_body(id, &decl.body, op.result, &body_env);
  }

  fn check_implicit_operation(&mut self, id: DefId, decl: &'a ImplicitOperationDecl) {
    let ty = self.table.get(id).ty();
    let span = self.table.get(id).span;
    let Some(op) = self.store.as_operation(ty) else {
      return;
    };
    self.check_operation_result(id, op.result);
    let container = self.member_env(id, self.operation_context(id));
    self.check_externals(&decl.externals, &container);
    let patterns: Vec<&'a Node<Pattern>> = decl.params.iter().map(|p| &p.stx.pattern).collect();
    let params = self.bind_params(id, span, &patterns, &op.params, &container);
    let result = decl
      .result
      .as_ref()
      .map(|r| (r.stx.name.as_str(), r.loc, op.result));
    let (body_env, pre_env, post_env) = self.operation_envs(id, &params, result);
    if let Some(pre) = &decl.pre {
      self.condition(pre, &pre_env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
    }
    self.specification_clauses(None, decl.post.as_ref(), &decl.errors, &post_env);
    if let Some(body) = &decl.body {
      self.operation_body(id, body, op.result, &body_env);
    }
  }

  fn check_class_invariant(&mut self, id: DefId, decl: &'a ClassInvariantDecl) {
    let env = self.member_env(id, Context::Function);
    self.condition(&decl.predicate, &env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
  }

  /// The operation a `per` or `mutex` names, reporting it when there is none.
  fn sync_operation(&mut self, span: Span, name: &str, env: &Env) -> Option<DefId> {
    let current = env.container_name(&self.table);
    let lookup = Name::reference(&current, None, name);
    let found = env
      .find_matches(&self.table, &lookup, NameScope::NAMES)
      .into_iter()
      .find(|d| self.table.is_operation(*d));
    if found.is_none() {
      let d = codes::SYNC_NOT_OPERATION
        .at(span)
        .with_detail("Name", name.to_string());
      self.report(d);
    }
    found
  }

  fn check_mutex(&mut self, id: DefId, decl: &'a MutexDecl) {
    let span = self.table.get(id).span;
    let env = self.member_env(id, Context::Function);
    for name in &decl.operations {
      if let Some(op) = self.sync_operation(span, name, &env) {
        self.table.mark_used(op);
      }
    }
  }

  fn check_per(&mut self, id: DefId, decl: &'a PerDecl) {
    let span = self.table.get(id).span;
    let env = self.member_env(id, Context::Function);
    if let Some(op) = self.sync_operation(span, &decl.operation, &env) {
      self.table.mark_used(op);
    }
    self.condition(&decl.guard, &env, NameScope::NAMESANDSTATE, codes::PREDICATE_NOT_BOOLEAN);
  }

  fn check_trace(&mut self, node: &'a Node<TraceDef>, env: &Rc<Env>) {
    let scope = NameScope::NAMESANDSTATE;
    match &*node.stx {
      TraceDef::Apply(apply) => {
        let span = self.span(node.loc);
        let args: Vec<TypeId> = apply.args.iter().map(|a| self.expr(a, env, scope, None)).collect();
        let candidates = match &apply.object {
          Some(object) => {
            let current = env.container_name(&self.table);
            let lookup = Name::reference(&current, None, object);
            let Some(found) = env.find_name(&self.table, &lookup, scope) else {
              let d = codes::UNKNOWN_NAME
                .at(span)
                .with_detail("Name", lookup.to_string());
              self.report(d);
              return;
            };
            let object_ty = self.table.ty(found);
            let mut candidates = Vec::new();
            for class in self.store.classes(object_ty) {
              let Some(class) = self.table.class_by_type(class) else {
                continue;
              };
              let lookup = Name::explicit(self.table.get(class).name.name.clone(), apply.operation.clone());
              candidates.extend(self.global.find_matches(&self.table, &lookup, NameScope::NAMES));
            }
            candidates
          }
          None => {
            let current = env.container_name(&self.table);
            let lookup = Name::reference(&current, None, &apply.operation);
            env.find_matches(&self.table, &lookup, NameScope::NAMES)
          }
        };
        let operations: Vec<DefId> = candidates
          .into_iter()
          .filter(|c| self.table.is_operation(*c))
          .collect();
        if operations.is_empty() {
          let d = codes::TRACE_NOT_OPERATION
            .at(span)
            .with_detail("Name", apply.operation.clone());
          self.report(d);
          return;
        }
        let lookup =
          Name::new(env.container_name(&self.table), apply.operation.clone()).with_qualifier(args.clone());
        let Some(op) = self.select_overload(&operations, span, &lookup) else {
          return;
        };
        self.table.mark_used(op);
        let op_ty = self.table.ty(op);
        if let Some(op_ty) = self.store.as_operation(op_ty) {
          self.check_args(span, &op_ty.params, &args, &apply.args);
        }
      }
      TraceDef::Repeat(repeat) => self.check_trace(&repeat.inner, env),
      TraceDef::Let(l) => {
        let (inner, defs) = self.let_defs(&l.defs, env, scope);
        self.check_trace(&l.body, &inner);
        self.finish_scope(&defs);
      }
      TraceDef::LetBe(l) => {
        let defs = self.bind_multiple(std::slice::from_ref(&l.bind), env, scope, LocalRole::Let);
        let inner = Env::flat(defs.clone(), env);
        if let Some(such_that) = &l.such_that {
          self.condition(such_that, &inner, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        self.check_trace(&l.body, &inner);
        self.finish_scope(&defs);
      }
      TraceDef::Choice(list) | TraceDef::Sequence(list) | TraceDef::Concurrent(list) => {
        for item in &list.items {
          self.check_trace(item, env);
        }
      }
    }
  }

  /// Warns about private members and unexported module definitions that
  /// nothing refers to.
  pub(crate) fn check_unused(&mut self, declared: &[DefId]) {
    if !self.options.warn_unused {
      return;
    }
    for id in declared {
      let def = self.table.get(*id);
      if def.is_used() || def.name.name.is_empty() || def.is_constructor() {
        continue;
      }
      let member = matches!(
        def.kind,
        DefKind::ExplicitFunction { .. }
          | DefKind::ImplicitFunction { .. }
          | DefKind::ExplicitOperation { .. }
          | DefKind::ImplicitOperation { .. }
          | DefKind::InstanceVariable { .. }
          | DefKind::Type { .. }
          | DefKind::Local {
            role: LocalRole::Value(_)
          }
      );
      if !member {
        continue;
      }
      let unused = match (def.class, def.module) {
        (Some(_), _) => def.visibility() == Visibility::Private,
        (None, Some(module)) => {
          let module = self.table.module(module);
          module.decl.is_some() && !module.exports_all && !module.exported.contains(id)
        }
        (None, None) => false,
      };
      if unused {
        let d = codes::UNUSED
          .at(def.span)
          .with_detail("Name", def.name.name.clone());
        self.report(d);
      }
    }
  }
}
