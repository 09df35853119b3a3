use super::Checker;
use super::ResolvedDef;
use super::ResolvedType;
use crate::codes;
use crate::codes::Code;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::Definition;
use crate::def::FunctionInfo;
use crate::def::LocalRole;
use crate::env::Context;
use crate::env::Env;
use crate::env::Frame;
use crate::name::Name;
use crate::name::NameScope;
use ahash::AHashMap;
use diagnostics::Label;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::ExplicitFunctionDecl;
use syntax_vdm::ast::decl::ImplicitFunctionDecl;
use syntax_vdm::ast::decl::ValueDecl;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::expr::EqualsDef;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::expr::FieldExpr;
use syntax_vdm::ast::expr::Literal;
use syntax_vdm::ast::expr::VariableExpr;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::loc::Loc;
use tracing::trace;
use types_vdm::FunctionType;
use types_vdm::NumericKind;
use types_vdm::RelateCtx;
use types_vdm::TypeId;

impl<'a> Checker<'a> {
  /// Checks an expression and returns its type. `constraint` is the type the
  /// context expects, used to type empty collections and `undefined`.
  pub(crate) fn expr(
    &mut self,
    node: &'a Node<Expr>,
    env: &Rc<Env>,
    scope: NameScope,
    constraint: Option<TypeId>,
  ) -> TypeId {
    self.expr_with(node, env, scope, constraint, None)
  }

  /// As [`Self::expr`]. `qualifier` holds the argument types when the
  /// expression is the root of an application, to select an overload.
  pub(crate) fn expr_with(
    &mut self,
    node: &'a Node<Expr>,
    env: &Rc<Env>,
    scope: NameScope,
    constraint: Option<TypeId>,
    qualifier: Option<&[TypeId]>,
  ) -> TypeId {
    let ty = self.expr_kind(node, env, scope, constraint, qualifier);
    node.assoc.set(ResolvedType(ty));
    ty
  }

  fn expr_kind(
    &mut self,
    node: &'a Node<Expr>,
    env: &Rc<Env>,
    scope: NameScope,
    constraint: Option<TypeId>,
    qualifier: Option<&[TypeId]>,
  ) -> TypeId {
    let span = self.span(node.loc);
    let unknown = self.unknown();
    let bool_ty = self.store.bool();
    match &*node.stx {
      Expr::Literal(lit) => self.literal_type(&lit.value),
      Expr::Variable(v) => self.variable(node, v, env, scope, qualifier),
      Expr::SelfRef => match env.find_class_definition() {
        Some(class) if !env.is_static() => self.table.get(class).ty(),
        _ => {
          self.report(codes::SELF_NOT_ALLOWED.at(span));
          unknown
        }
      },
      Expr::Apply(a) => self.apply(node, a, env, scope),
      Expr::Field(f) => self.field(node, f, env, scope, qualifier),
      Expr::TupleField(t) => {
        let tuple_ty = self.expr(&t.tuple, env, scope, None);
        if self.store.is_unknown(tuple_ty) {
          return unknown;
        }
        match self.store.as_product(tuple_ty) {
          Some(members) if t.index >= 1 && t.index <= members.len() => members[t.index - 1],
          Some(members) => {
            let d = codes::TUPLE_INDEX
              .at(span)
              .with_detail("Index", t.index.to_string())
              .with_detail("Size", members.len().to_string());
            self.report(d);
            unknown
          }
          None => {
            let d = codes::NOT_A_TUPLE
              .at(span)
              .with_detail("Actual", self.display(tuple_ty));
            self.report(d);
            unknown
          }
        }
      }
      Expr::Instantiate(i) => self.instantiate(span, i.function.loc, &i.function, &i.type_args, env, scope),
      Expr::Unary(u) => self.unary(u, env, scope),
      Expr::Binary(b) => self.binary(span, b, env, scope),
      Expr::If(i) => {
        self.condition(&i.test, env, scope, codes::EXPECTED_BOOLEAN);
        let then_env = self.narrowed(&i.test, env);
        let mut types = vec![self.expr(&i.consequent, &then_env, scope, constraint)];
        for elseif in &i.elseifs {
          self.condition(&elseif.stx.test, env, scope, codes::EXPECTED_BOOLEAN);
          let then_env = self.narrowed(&elseif.stx.test, env);
          types.push(self.expr(&elseif.stx.consequent, &then_env, scope, constraint));
        }
        types.push(self.expr(&i.alternate, env, scope, constraint));
        self.store.union(types)
      }
      Expr::Cases(c) => {
        let subject = self.expr(&c.subject, env, scope, None);
        let mut types = Vec::new();
        for alt in &c.alternatives {
          let mut defs = Vec::new();
          for pattern in &alt.stx.patterns {
            defs.extend(self.bind_pattern(pattern, subject, env, LocalRole::Bound));
          }
          let alt_env = Env::flat(defs, env);
          types.push(self.expr(&alt.stx.result, &alt_env, scope, constraint));
        }
        if let Some(others) = &c.others {
          types.push(self.expr(others, env, scope, constraint));
        }
        self.store.union(types)
      }
      Expr::LetDef(l) => {
        let (body_env, defs) = self.let_defs(&l.defs, env, scope);
        let ty = self.expr(&l.body, &body_env, scope, constraint);
        self.finish_scope(&defs);
        ty
      }
      Expr::LetBeSt(l) => {
        let defs = self.bind_multiple(std::slice::from_ref(&l.bind), env, scope, LocalRole::Let);
        self.bind_group(node.loc, env, defs.clone());
        let body_env = Env::flat(defs.clone(), env);
        if let Some(such_that) = &l.such_that {
          self.condition(such_that, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        let ty = self.expr(&l.body, &body_env, scope, constraint);
        self.finish_scope(&defs);
        ty
      }
      Expr::Def(d) => {
        let (body_env, defs) = self.equals_defs(&d.defs, env, scope);
        let ty = self.expr(&d.body, &body_env, scope, constraint);
        self.finish_scope(&defs);
        ty
      }
      Expr::Exists(q) | Expr::Forall(q) => {
        let defs = self.bind_multiple(&q.binds, env, scope, LocalRole::Bound);
        self.bind_group(node.loc, env, defs.clone());
        let body_env = Env::flat(defs, env);
        self.condition(&q.predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        bool_ty
      }
      Expr::Exists1(u) => {
        let (defs, _) = self.bind_single(&u.bind, env, scope, LocalRole::Bound);
        let body_env = Env::flat(defs, env);
        self.condition(&u.predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        bool_ty
      }
      Expr::Iota(u) => {
        let (defs, elem) = self.bind_single(&u.bind, env, scope, LocalRole::Bound);
        let body_env = Env::flat(defs, env);
        self.condition(&u.predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        elem
      }
      Expr::Lambda(l) => {
        let mut params = Vec::new();
        let mut defs = Vec::new();
        for pair in &l.params {
          let ty = self.resolve_type(&pair.stx.ty, env);
          params.push(ty);
          defs.extend(self.bind_pattern(&pair.stx.pattern, ty, env, LocalRole::Parameter));
        }
        let body_env = Env::new(Frame::Flat(defs))
          .within(env)
          .with_context(Context::Function)
          .build();
        let result = self.expr(&l.body, &body_env, NameScope::NAMES, None);
        self.store.function(FunctionType::new(params, result).total())
      }
      Expr::SetEnum(e) => {
        let elem_constraint = constraint.and_then(|c| self.store.as_set(c)).map(|s| s.elem);
        if e.members.is_empty() {
          return match elem_constraint {
            Some(elem) if !self.store.is_unknown(elem) => self.store.set(elem),
            _ => self.store.empty_set(),
          };
        }
        let members = e
          .members
          .iter()
          .map(|m| self.expr(m, env, scope, elem_constraint))
          .collect();
        let elem = self.store.union(members);
        self.store.set1(elem)
      }
      Expr::SeqEnum(e) => {
        let elem_constraint = constraint.and_then(|c| self.store.as_seq(c)).map(|s| s.elem);
        if e.members.is_empty() {
          return match elem_constraint {
            Some(elem) if !self.store.is_unknown(elem) => self.store.seq(elem),
            _ => self.store.empty_seq(),
          };
        }
        let members = e
          .members
          .iter()
          .map(|m| self.expr(m, env, scope, elem_constraint))
          .collect();
        let elem = self.store.union(members);
        self.store.seq1(elem)
      }
      Expr::MapEnum(m) => {
        let parts = constraint.and_then(|c| self.store.as_map(c));
        if m.maplets.is_empty() {
          return match parts {
            Some(map) if !self.store.is_unknown(map.dom) || !self.store.is_unknown(map.rng) => {
              self.store.map(map.dom, map.rng)
            }
            _ => self.store.empty_map(),
          };
        }
        let mut doms = Vec::new();
        let mut rngs = Vec::new();
        for maplet in &m.maplets {
          doms.push(self.expr(&maplet.stx.from, env, scope, parts.map(|p| p.dom)));
          rngs.push(self.expr(&maplet.stx.to, env, scope, parts.map(|p| p.rng)));
        }
        let dom = self.store.union(doms);
        let rng = self.store.union(rngs);
        self.store.map(dom, rng)
      }
      Expr::Tuple(e) => {
        let member_constraints = constraint
          .and_then(|c| self.store.as_product(c))
          .filter(|members| members.len() == e.members.len());
        let members = e
          .members
          .iter()
          .enumerate()
          .map(|(i, m)| {
            let c = member_constraints.as_ref().map(|members| members[i]);
            self.expr(m, env, scope, c)
          })
          .collect();
        self.store.product(members)
      }
      Expr::SetComp(c) => {
        let defs = self.bind_multiple(&c.binds, env, scope, LocalRole::Bound);
        let body_env = Env::flat(defs, env);
        if let Some(predicate) = &c.predicate {
          self.condition(predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        let elem = self.expr(&c.element, &body_env, scope, None);
        self.store.set(elem)
      }
      Expr::SetRange(r) => {
        let first = self.numeric_operand(&r.first, env, scope, ",...,");
        let last = self.numeric_operand(&r.last, env, scope, ",...,");
        let kind = [first, last]
          .into_iter()
          .flatten()
          .max()
          .unwrap_or(NumericKind::Int)
          .min(NumericKind::Int);
        let elem = self.store.numeric(kind);
        self.store.set(elem)
      }
      Expr::SeqComp(c) => {
        let (defs, _) = self.bind_single(&c.bind, env, scope, LocalRole::Bound);
        let body_env = Env::flat(defs, env);
        if let Some(predicate) = &c.predicate {
          self.condition(predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        let elem = self.expr(&c.element, &body_env, scope, None);
        self.store.seq(elem)
      }
      Expr::SubSeq(s) => {
        let seq_ty = self.expr(&s.seq, env, scope, None);
        self.numeric_operand(&s.from, env, scope, "(,...,)");
        self.numeric_operand(&s.to, env, scope, "(,...,)");
        match self.store.as_seq(seq_ty) {
          Some(seq) => self.store.seq(seq.elem),
          None => {
            let d = codes::EXPECTED_SEQ
              .at(self.span(s.seq.loc))
              .with_detail("Actual", self.display(seq_ty));
            self.report(d);
            unknown
          }
        }
      }
      Expr::MapComp(c) => {
        let defs = self.bind_multiple(&c.binds, env, scope, LocalRole::Bound);
        let body_env = Env::flat(defs, env);
        if let Some(predicate) = &c.predicate {
          self.condition(predicate, &body_env, scope, codes::PREDICATE_NOT_BOOLEAN);
        }
        let dom = self.expr(&c.maplet.stx.from, &body_env, scope, None);
        let rng = self.expr(&c.maplet.stx.to, &body_env, scope, None);
        self.store.map(dom, rng)
      }
      Expr::Record(r) => {
        let Some((record_ty, named)) = self.resolve_record(node.loc, r.module.as_deref(), &r.name, env)
        else {
          for arg in &r.args {
            self.expr(arg, env, scope, None);
          }
          return unknown;
        };
        let fields: Vec<TypeId> = self.store.named(named).fields.iter().map(|f| f.ty).collect();
        if fields.len() != r.args.len() {
          for arg in &r.args {
            self.expr(arg, env, scope, None);
          }
          let d = codes::RECORD_FIELD_COUNT
            .at(span)
            .with_detail("Expected", fields.len().to_string())
            .with_detail("Actual", r.args.len().to_string());
          self.report(d);
          return record_ty;
        }
        for (i, (arg, field)) in r.args.iter().zip(fields).enumerate() {
          let arg_ty = self.expr(arg, env, scope, Some(field));
          let arg_span = self.span(arg.loc);
          self.check_assignable(
            || codes::RECORD_FIELD_TYPE.numbered(i + 1, arg_span),
            arg_span,
            field,
            arg_ty,
          );
        }
        record_ty
      }
      Expr::Mu(m) => {
        let record_ty = self.expr(&m.record, env, scope, None);
        let records = self.store.records(record_ty);
        let [named] = records[..] else {
          if !self.store.is_unknown(record_ty) {
            let d = codes::MU_NOT_RECORD
              .at(span)
              .with_detail("Actual", self.display(record_ty));
            self.report(d);
          }
          for update in &m.updates {
            self.expr(&update.stx.value, env, scope, None);
          }
          return unknown;
        };
        for update in &m.updates {
          let field = self.store.named(named).field(&update.stx.field).map(|f| f.ty);
          let update_span = self.span(update.loc);
          let value_ty = self.expr(&update.stx.value, env, scope, field);
          match field {
            Some(field) => {
              self.check_assignable(
                || codes::MU_FIELD_TYPE.at(update_span).with_detail("Field", update.stx.field.clone()),
                update_span,
                field,
                value_ty,
              );
            }
            None => {
              let d = codes::UNKNOWN_FIELD
                .at(update_span)
                .with_detail("Field", update.stx.field.clone())
                .with_detail("Type", self.display(record_ty));
              self.report(d);
            }
          }
        }
        record_ty
      }
      Expr::IsType(t) => {
        let test_ty = self.resolve_type(&t.test_type, env);
        let operand = self.expr(&t.operand, env, scope, None);
        self.check_type_test(span, test_ty, operand);
        bool_ty
      }
      Expr::Narrow(n) => {
        let operand = self.expr(&n.operand, env, scope, None);
        let ty = self.resolve_type(&n.ty, env);
        self.check_type_test(span, ty, operand);
        ty
      }
      Expr::Pre(p) => {
        let function = self.expr(&p.function, env, scope, None);
        for arg in &p.args {
          self.expr(arg, env, scope, None);
        }
        if !self.store.is_function(function) {
          let d = codes::PRE_NOT_FUNCTION
            .at(self.span(p.function.loc))
            .with_detail("Actual", self.display(function));
          self.report(d);
        }
        bool_ty
      }
      Expr::New(n) => {
        let args: Vec<TypeId> = n.args.iter().map(|a| self.expr(a, env, scope, None)).collect();
        self.new_object(node, &n.class, &args, env)
      }
      Expr::IsOfClass(c) | Expr::IsOfBaseClass(c) => {
        if self.table.find_class(&c.class).is_none() {
          let d = codes::UNKNOWN_CLASS.at(span).with_detail("Name", c.class.clone());
          self.report(d);
        }
        let operand = self.expr(&c.operand, env, scope, None);
        self.expect_object(c.operand.loc, operand);
        bool_ty
      }
      Expr::SameClass(s) | Expr::SameBaseClass(s) => {
        let left = self.expr(&s.left, env, scope, None);
        self.expect_object(s.left.loc, left);
        let right = self.expr(&s.right, env, scope, None);
        self.expect_object(s.right.loc, right);
        bool_ty
      }
      Expr::History(h) => {
        let class = env.find_class_definition();
        for operation in &h.operations {
          let is_operation = class.is_some_and(|class| {
            let lookup = Name::new(self.table.get(class).name.name.clone(), operation.clone());
            env
              .find_matches(&self.table, &lookup, NameScope::NAMES)
              .iter()
              .any(|d| self.table.is_operation(*d))
          });
          if !is_operation {
            let d = codes::HISTORY_NOT_OPERATION
              .at(span)
              .with_detail("Name", operation.clone());
            self.report(d);
          }
        }
        self.store.nat()
      }
      Expr::Undefined => constraint.unwrap_or(unknown),
      Expr::Time | Expr::ThreadId => self.store.nat(),
    }
  }

  pub(crate) fn literal_type(&mut self, lit: &Literal) -> TypeId {
    match lit {
      Literal::Bool(_) => self.store.bool(),
      Literal::Nat(0) => self.store.nat(),
      Literal::Nat(_) => self.store.nat1(),
      Literal::Real(r) if r.fract() == 0.0 && *r >= 1.0 => self.store.nat1(),
      Literal::Real(r) if *r == 0.0 => self.store.nat(),
      Literal::Real(_) => self.store.real(),
      Literal::Char(_) => self.store.char(),
      Literal::Str(_) => self.store.string(),
      Literal::Quote(q) => self.store.quote(q.clone()),
      Literal::Nil => self.store.nil(),
    }
  }

  /// Checks a condition, reporting `code` unless it is boolean.
  pub(crate) fn condition(&mut self, node: &'a Node<Expr>, env: &Rc<Env>, scope: NameScope, code: Code) {
    let bool_ty = self.store.bool();
    let ty = self.expr(node, env, scope, Some(bool_ty));
    if !self.store.is_bool(ty) {
      let d = code
        .at(self.span(node.loc))
        .with_detail("Actual", self.display(ty));
      self.report(d);
    }
  }

  /// Checks an operand that must be numeric, returning its widest kind.
  pub(crate) fn numeric_operand(
    &mut self,
    node: &'a Node<Expr>,
    env: &Rc<Env>,
    scope: NameScope,
    operator: &str,
  ) -> Option<NumericKind> {
    let ty = self.expr(node, env, scope, None);
    if !self.store.is_numeric(ty) {
      let d = codes::EXPECTED_NUMERIC
        .at(self.span(node.loc))
        .with_detail("Operator", operator.to_string())
        .with_detail("Actual", self.display(ty));
      self.report(d);
      return None;
    }
    self.store.numeric_kind(ty)
  }

  fn expect_object(&mut self, loc: Loc, ty: TypeId) {
    if !self.store.is_class(ty) {
      let d = codes::NOT_AN_OBJECT
        .at(self.span(loc))
        .with_detail("Actual", self.display(ty));
      self.report(d);
    }
  }

  fn check_type_test(&mut self, span: Span, test_ty: TypeId, operand: TypeId) {
    if self.store.is_unknown(operand) || self.store.is_unknown(test_ty) {
      return;
    }
    let ctx = RelateCtx::new(&self.store);
    if !ctx.compatible(test_ty, operand) && !ctx.compatible(operand, test_ty) {
      let d = codes::TYPE_TEST_NEVER
        .at(span)
        .with_detail("Type", self.display(test_ty))
        .with_detail("Actual", self.display(operand));
      self.report(d);
    }
  }

  fn variable(
    &mut self,
    node: &'a Node<Expr>,
    v: &VariableExpr,
    env: &Rc<Env>,
    scope: NameScope,
    qualifier: Option<&[TypeId]>,
  ) -> TypeId {
    let span = self.span(node.loc);
    let unknown = self.unknown();
    if v.old && !scope.contains(NameScope::OLDSTATE) {
      let d = codes::OLD_NAME_NOT_ALLOWED
        .at(span)
        .with_detail("Name", format!("{}~", v.name));
      self.report(d);
      return unknown;
    }
    let current = env.container_name(&self.table);
    let mut lookup = Name::reference(&current, v.module.as_deref(), &v.name).with_old(v.old);
    if let Some(args) = qualifier {
      lookup = lookup.with_qualifier(args.to_vec());
    }
    let candidates = env.find_matches(&self.table, &lookup, scope);
    let found = match candidates.len() {
      0 => {
        let mut d = codes::UNKNOWN_NAME
          .at(span)
          .with_detail("Name", lookup.to_string());
        if let Some(args) = qualifier {
          d = d.with_detail("Args", self.store.display_list(args));
        }
        self.report(d);
        return unknown;
      }
      1 => candidates[0],
      _ => match self.select_overload(&candidates, span, &lookup) {
        Some(found) => found,
        None => return unknown,
      },
    };
    self.table.mark_used(found);
    node.assoc.set(ResolvedDef(found));
    self.check_reference(found, env, span, false);
    self.table.ty(found)
  }

  /// Picks the overload whose parameters accept the type qualifier of
  /// `name`. An unqualified name must leave exactly one candidate.
  pub(crate) fn select_overload(
    &mut self,
    candidates: &[DefId],
    span: Span,
    name: &Name,
  ) -> Option<DefId> {
    let qualifier = name.qualifier.as_deref();
    if !candidates.iter().all(|c| self.table.is_callable(*c)) {
      return candidates.first().copied();
    }
    let applicable: Vec<DefId> = match qualifier {
      Some(args) => {
        let params: Vec<(DefId, Option<Vec<TypeId>>)> = candidates
          .iter()
          .map(|c| (*c, self.params_of(self.table.ty(*c))))
          .collect();
        let ctx = RelateCtx::new(&self.store);
        params
          .into_iter()
          .filter(|(_, params)| params.as_ref().is_some_and(|p| ctx.compatible_lists(p, args)))
          .map(|(c, _)| c)
          .collect()
      }
      None => candidates.to_vec(),
    };
    match applicable[..] {
      [one] => Some(one),
      [] => {
        let mut d = codes::UNKNOWN_NAME
          .at(span)
          .with_detail("Name", name.to_string());
        if let Some(args) = qualifier {
          d = d.with_detail("Args", self.store.display_list(args));
        }
        self.report(d);
        None
      }
      _ => {
        let mut d = codes::AMBIGUOUS_NAME
          .at(span)
          .with_detail("Name", name.to_string());
        for candidate in &applicable {
          d = d.with_label(Label::secondary(self.table.get(*candidate).span, "candidate"));
        }
        self.report(d);
        None
      }
    }
  }

  /// Parameter types of a function or operation type.
  pub(crate) fn params_of(&mut self, ty: TypeId) -> Option<Vec<TypeId>> {
    if let Some(func) = self.store.as_function(ty) {
      return Some(func.params);
    }
    self.store.as_operation(ty).map(|op| op.params)
  }

  /// Whether `member` may be referred to from code in class `from`.
  pub(crate) fn member_visible(&self, member: DefId, from: Option<DefId>) -> bool {
    let def = self.table.get(member);
    let Some(owner) = def.class else {
      return true;
    };
    match def.visibility() {
      Visibility::Public => true,
      Visibility::Private => from == Some(owner),
      Visibility::Protected => from.is_some_and(|from| {
        from == owner
          || self
            .store
            .is_subclass(self.table.class_info(from).id, self.table.class_info(owner).id)
      }),
    }
  }

  /// Checks that the definition a name resolved to may be used here.
  pub(crate) fn check_reference(&mut self, found: DefId, env: &Env, span: Span, via_object: bool) {
    let origin = self.table.origin(found);
    let def = self.table.get(origin);
    let name = def.name.to_string();
    let instance_member = def.is_instance_member();
    let operation = def.is_operation() && !matches!(def.kind, DefKind::Derived { .. });
    let pure = def.access.is_pure;
    if !via_object && env.is_static() && instance_member {
      self.report(codes::STATIC_ACCESS.at(span).with_detail("Name", name.clone()));
    }
    if env.is_precondition() && env.enclosing() == Some(origin) {
      self.report(codes::RECURSIVE_PRECONDITION.at(span).with_detail("Name", name.clone()));
    }
    if operation {
      match env.context() {
        Context::Function => {
          self.report(codes::OPERATION_IN_FUNCTION.at(span).with_detail("Name", name.clone()));
        }
        Context::PureOperation if !pure => {
          self.report(codes::IMPURE_CALL.at(span).with_detail("Name", name.clone()));
        }
        _ => {}
      }
    }
    if !self.member_visible(origin, env.find_class_definition()) {
      self.report(codes::NOT_VISIBLE.at(span).with_detail("Name", name));
    }
  }

  fn field(
    &mut self,
    node: &'a Node<Expr>,
    f: &'a FieldExpr,
    env: &Rc<Env>,
    scope: NameScope,
    qualifier: Option<&[TypeId]>,
  ) -> TypeId {
    let unknown = self.unknown();
    let object = self.expr(&f.object, env, scope, None);
    if self.store.is_unknown(object) {
      return unknown;
    }
    let span = self.span(node.loc);
    let records = self.store.records(object);
    let classes = self.store.classes(object);
    if records.is_empty() && classes.is_empty() {
      let d = codes::NOT_A_RECORD_OR_OBJECT
        .at(span)
        .with_detail("Actual", self.display(object));
      self.report(d);
      return unknown;
    }
    let mut found = Vec::new();
    for record in records {
      if let Some(field) = self.store.named(record).field(&f.field) {
        found.push(field.ty);
      }
    }
    for class in classes {
      let Some(class) = self.table.class_by_type(class) else {
        continue;
      };
      let mut lookup = Name::explicit(self.table.get(class).name.name.clone(), f.field.clone());
      if let Some(args) = qualifier {
        lookup = lookup.with_qualifier(args.to_vec());
      }
      let members = self
        .global
        .find_matches(&self.table, &lookup, NameScope::NAMESANDSTATE);
      let member = match members.len() {
        0 => continue,
        1 => Some(members[0]),
        _ => self.select_overload(&members, span, &lookup),
      };
      let Some(member) = member else {
        found.push(unknown);
        continue;
      };
      self.table.mark_used(member);
      node.assoc.set(ResolvedDef(member));
      self.check_reference(member, env, span, true);
      found.push(self.table.ty(member));
    }
    if found.is_empty() {
      let d = codes::UNKNOWN_FIELD
        .at(span)
        .with_detail("Field", f.field.clone())
        .with_detail("Type", self.display(object));
      self.report(d);
      return unknown;
    }
    self.store.union(found)
  }

  fn instantiate(
    &mut self,
    span: Span,
    function_loc: Loc,
    function: &'a Node<Expr>,
    type_args: &'a [Node<syntax_vdm::ast::type_expr::TypeExpr>],
    env: &Rc<Env>,
    scope: NameScope,
  ) -> TypeId {
    let unknown = self.unknown();
    let function_ty = self.expr(function, env, scope, None);
    let args = self.resolve_types(type_args, env);
    if self.store.is_unknown(function_ty) {
      return unknown;
    }
    let polymorphic = self
      .store
      .as_function(function_ty)
      .filter(|f| f.is_uninstantiated());
    let type_params = function
      .assoc
      .get::<ResolvedDef>()
      .map(|ResolvedDef(d)| {
        let origin = self.table.origin(d);
        match self.table.get(origin).kind {
          DefKind::Derived { origin, .. } => self.table.get(origin).kind.type_params(),
          ref kind => kind.type_params(),
        }
      })
      .unwrap_or(&[]);
    let Some(func) = polymorphic else {
      let d = codes::INSTANTIATION
        .at(self.span(function_loc))
        .with_detail("Actual", self.display(function_ty));
      self.report(d);
      return unknown;
    };
    if type_params.len() != args.len() {
      let d = codes::INSTANTIATION
        .at(span)
        .with_detail("Expected", type_params.len().to_string())
        .with_detail("Actual", args.len().to_string());
      self.report(d);
      return unknown;
    }
    let bindings: AHashMap<String, TypeId> = type_params.iter().cloned().zip(args).collect();
    let instantiated = FunctionType {
      instantiated: Some(true),
      ..func
    };
    let ty = self.store.function(instantiated);
    self.store.substitute(ty, &bindings)
  }

  fn new_object(&mut self, node: &'a Node<Expr>, class_name: &str, args: &[TypeId], env: &Env) -> TypeId {
    let span = self.span(node.loc);
    let Some(class) = self.table.find_class(class_name) else {
      let d = codes::UNKNOWN_CLASS
        .at(span)
        .with_detail("Name", class_name.to_string());
      self.report(d);
      return self.unknown();
    };
    let class_ty = self.table.get(class).ty();
    let constructors: Vec<DefId> = self
      .table
      .class_info(class)
      .locals
      .iter()
      .copied()
      .filter(|d| self.table.get(*d).is_constructor())
      .collect();
    if constructors.is_empty() {
      if !args.is_empty() {
        let d = codes::NO_CONSTRUCTOR
          .at(span)
          .with_detail("Name", class_name.to_string())
          .with_detail("Args", self.store.display_list(args));
        self.report(d);
      }
      return class_ty;
    }
    let params: Vec<(DefId, Option<Vec<TypeId>>)> = constructors
      .iter()
      .map(|c| (*c, self.params_of(self.table.ty(*c))))
      .collect();
    let applicable: Vec<DefId> = {
      let ctx = RelateCtx::new(&self.store);
      params
        .into_iter()
        .filter(|(_, p)| p.as_ref().is_some_and(|p| ctx.compatible_lists(p, args)))
        .map(|(c, _)| c)
        .collect()
    };
    match applicable[..] {
      [constructor] => {
        self.table.mark_used(constructor);
        node.assoc.set(ResolvedDef(constructor));
        if !self.member_visible(constructor, env.find_class_definition()) {
          let d = codes::NOT_VISIBLE
            .at(span)
            .with_detail("Name", class_name.to_string());
          self.report(d);
        }
      }
      [] => {
        let d = codes::NO_CONSTRUCTOR
          .at(span)
          .with_detail("Name", class_name.to_string())
          .with_detail("Args", self.store.display_list(args));
        self.report(d);
      }
      _ => {
        let mut d = codes::AMBIGUOUS_NAME
          .at(span)
          .with_detail("Name", class_name.to_string());
        for c in &applicable {
          d = d.with_label(Label::secondary(self.table.get(*c).span, "candidate"));
        }
        self.report(d);
      }
    }
    class_ty
  }

  /// The environment in which `test` is known to hold: a name tested with
  /// `is_T(x)` or `isofclass(C, x)` has the tested type there.
  pub(crate) fn narrowed(&mut self, test: &'a Node<Expr>, env: &Rc<Env>) -> Rc<Env> {
    let mut defs = Vec::new();
    self.collect_narrowings(test, &mut defs);
    if defs.is_empty() {
      Rc::clone(env)
    } else {
      Env::flat(defs, env)
    }
  }

  fn collect_narrowings(&mut self, test: &'a Node<Expr>, out: &mut Vec<DefId>) {
    match &*test.stx {
      Expr::IsType(t) => {
        if let Some(ResolvedType(ty)) = t.test_type.assoc.get::<ResolvedType>() {
          self.narrow_name(&t.operand, ty, out);
        }
      }
      Expr::IsOfClass(c) | Expr::IsOfBaseClass(c) => {
        if let Some(class) = self.table.find_class(&c.class) {
          let ty = self.table.get(class).ty();
          self.narrow_name(&c.operand, ty, out);
        }
      }
      Expr::Binary(b) if matches!(b.op, BinaryOp::And) => {
        self.collect_narrowings(&b.left, out);
        self.collect_narrowings(&b.right, out);
      }
      _ => {}
    }
  }

  fn narrow_name(&mut self, operand: &Node<Expr>, ty: TypeId, out: &mut Vec<DefId>) {
    if !matches!(*operand.stx, Expr::Variable(_)) {
      return;
    }
    let Some(ResolvedDef(target)) = operand.assoc.get::<ResolvedDef>() else {
      return;
    };
    if self.table.is_callable(target) || self.store.is_unknown(ty) {
      return;
    }
    let def = self.table.get(target);
    let narrowed = Definition::new(
      def.name.clone(),
      def.span,
      def.scope,
      DefKind::Qualified { target },
      ty,
    )
    .with_access(def.access)
    .with_class(def.class)
    .with_module(def.module);
    trace!(name = %def.name, "narrowed");
    out.push(self.table.alloc(narrowed));
  }

  /// Binds `let` definitions in order; each sees the ones before it.
  pub(crate) fn let_defs(
    &mut self,
    defs: &'a [Node<Decl>],
    env: &Rc<Env>,
    scope: NameScope,
  ) -> (Rc<Env>, Vec<DefId>) {
    let mut env = Rc::clone(env);
    let mut all = Vec::new();
    for decl in defs {
      let new = match &*decl.stx {
        Decl::Value(v) => self.local_value(decl.loc, v, &env, scope),
        Decl::ExplicitFunction(f) => vec![self.local_explicit_function(decl.loc, f, &env)],
        Decl::ImplicitFunction(f) => vec![self.local_implicit_function(decl.loc, f, &env)],
        _ => Vec::new(),
      };
      if !new.is_empty() {
        env = Env::flat(new.clone(), &env);
      }
      all.extend(new);
    }
    (env, all)
  }

  fn local_value(&mut self, loc: Loc, v: &'a ValueDecl, env: &Rc<Env>, scope: NameScope) -> Vec<DefId> {
    let span = self.span(loc);
    let declared = v.ty.as_ref().map(|t| self.resolve_type(t, env));
    let ty = self.expr(&v.value, env, scope, declared);
    let bound = match declared {
      Some(declared) => {
        self.check_assignable(|| codes::VALUE_TYPE.at(span), span, declared, ty);
        declared
      }
      None => ty,
    };
    self.bind_pattern(&v.pattern, bound, env, LocalRole::Let)
  }

  fn local_function_def(&mut self, loc: Loc, name: &str, kind: DefKind<'a>, env: &Env) -> DefId {
    let container = env.container_name(&self.table);
    let def = Definition::new(
      Name::new(container, name),
      self.span(loc),
      NameScope::LOCAL,
      kind,
      self.unknown(),
    )
    .with_class(env.find_class_definition())
    .with_module(env.find_module());
    self.table.alloc(def)
  }

  fn local_explicit_function(&mut self, loc: Loc, f: &'a ExplicitFunctionDecl, env: &Rc<Env>) -> DefId {
    let kind = DefKind::ExplicitFunction {
      decl: f,
      info: FunctionInfo::new(None, None),
    };
    let id = self.local_function_def(loc, &f.name, kind, env);
    let saved = self.type_params.clone();
    self.type_params.extend(f.type_params.iter().cloned());
    let ty = self.resolve_type(&f.ty, env);
    self.table.get(id).set_ty(ty);
    let inner = Env::flat(vec![id], env);
    self.check_explicit_function(id, f, &inner);
    self.type_params = saved;
    id
  }

  fn local_implicit_function(&mut self, loc: Loc, f: &'a ImplicitFunctionDecl, env: &Rc<Env>) -> DefId {
    let kind = DefKind::ImplicitFunction {
      decl: f,
      info: FunctionInfo::new(None, None),
    };
    let id = self.local_function_def(loc, &f.name, kind, env);
    let saved = self.type_params.clone();
    self.type_params.extend(f.type_params.iter().cloned());
    let params = f
      .params
      .iter()
      .map(|p| self.resolve_type(&p.stx.ty, env))
      .collect();
    let result = self.resolve_type(&f.result.stx.ty, env);
    let ty = self.store.function(FunctionType::new(params, result));
    self.table.get(id).set_ty(ty);
    let inner = Env::flat(vec![id], env);
    self.check_implicit_function(id, f, &inner);
    self.type_params = saved;
    id
  }

  /// Binds `def` definitions in order.
  pub(crate) fn equals_defs(
    &mut self,
    defs: &'a [Node<EqualsDef>],
    env: &Rc<Env>,
    scope: NameScope,
  ) -> (Rc<Env>, Vec<DefId>) {
    let mut env = Rc::clone(env);
    let mut all = Vec::new();
    for def in defs {
      let span = self.span(def.loc);
      let declared = def.stx.ty.as_ref().map(|t| self.resolve_type(t, &env));
      let ty = self.expr(&def.stx.value, &env, scope, declared);
      let bound = match declared {
        Some(declared) => {
          self.check_assignable(|| codes::VALUE_TYPE.at(span), span, declared, ty);
          declared
        }
        None => ty,
      };
      let names = self.bind_pattern(&def.stx.pattern, bound, &env, LocalRole::Let);
      let container = env.container_name(&self.table);
      self.table.alloc(Definition::new(
        Name::new(container, ""),
        span,
        NameScope::empty(),
        DefKind::Equals {
          decl: &*def.stx,
          names: names.clone(),
        },
        bound,
      ));
      if !names.is_empty() {
        env = Env::flat(names.clone(), &env);
      }
      all.extend(names);
    }
    (env, all)
  }

  /// Records the names one multiple bind introduced.
  fn bind_group(&mut self, loc: Loc, env: &Env, names: Vec<DefId>) {
    let container = env.container_name(&self.table);
    let span = self.span(loc);
    self.table.alloc(Definition::new(
      Name::new(container, ""),
      span,
      NameScope::empty(),
      DefKind::MultiBindList { names },
      self.store.void(),
    ));
  }
}
