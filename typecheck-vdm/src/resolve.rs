//! Resolving type expressions and the signatures of every definition.
//!
//! Runs once every class is linked: named types are defined first, so that
//! every signature resolved afterwards can already see through aliases.

use crate::check::Checker;
use crate::check::ResolvedType;
use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::DerivedRole;
use crate::env::Env;
use crate::name::Name;
use syntax_vdm::ast::decl::TypeShape;
use syntax_vdm::ast::decl::Visibility;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::type_expr::TypeExpr;
use syntax_vdm::loc::Loc;
use tracing::debug;
use tracing::debug_span;
use types_vdm::FunctionType;
use types_vdm::NamedId;
use types_vdm::NumericKind;
use types_vdm::OperationType;
use types_vdm::RecordField;
use types_vdm::TypeId;
use types_vdm::TypeKind;

impl<'a> Checker<'a> {
  /// Resolves a type expression in `env`. `@T` must name a type parameter
  /// of the function being checked.
  pub(crate) fn resolve_type(&mut self, texpr: &Node<TypeExpr>, env: &Env) -> TypeId {
    let ty = match &*texpr.stx {
      TypeExpr::Bool => self.store.bool(),
      TypeExpr::Nat => self.store.numeric(NumericKind::Nat),
      TypeExpr::Nat1 => self.store.numeric(NumericKind::Nat1),
      TypeExpr::Int => self.store.numeric(NumericKind::Int),
      TypeExpr::Rat => self.store.numeric(NumericKind::Rat),
      TypeExpr::Real => self.store.numeric(NumericKind::Real),
      TypeExpr::Char => self.store.char(),
      TypeExpr::Token => self.store.token(),
      TypeExpr::Quote(q) => self.store.quote(q.value.clone()),
      TypeExpr::Named(n) => self.resolve_named(texpr.loc, n.module.as_deref(), &n.name, env),
      TypeExpr::Set(s) => {
        let elem = self.resolve_type(&s.elem, env);
        if s.non_empty {
          self.store.set1(elem)
        } else {
          self.store.set(elem)
        }
      }
      TypeExpr::Seq(s) => {
        let elem = self.resolve_type(&s.elem, env);
        if s.non_empty {
          self.store.seq1(elem)
        } else {
          self.store.seq(elem)
        }
      }
      TypeExpr::Map(m) => {
        let dom = self.resolve_type(&m.dom, env);
        let rng = self.resolve_type(&m.rng, env);
        if m.injective {
          self.store.inmap(dom, rng)
        } else {
          self.store.map(dom, rng)
        }
      }
      TypeExpr::Product(p) => {
        let members = self.resolve_types(&p.members, env);
        self.store.product(members)
      }
      TypeExpr::Union(u) => {
        let members = self.resolve_types(&u.members, env);
        self.store.union(members)
      }
      TypeExpr::Optional(o) => {
        let inner = self.resolve_type(&o.inner, env);
        self.store.optional(inner)
      }
      TypeExpr::Function(f) => {
        let params = self.resolve_types(&f.params, env);
        let result = self.resolve_type(&f.result, env);
        let func = FunctionType::new(params, result);
        let func = if f.partial { func } else { func.total() };
        self.store.function(func)
      }
      TypeExpr::Operation(o) => {
        let params = self.resolve_types(&o.params, env);
        let result = match &o.result {
          Some(r) => self.resolve_type(r, env),
          None => self.store.void(),
        };
        self.store.operation(OperationType {
          params,
          result,
          pure: false,
        })
      }
      TypeExpr::Bracket(b) => self.resolve_type(&b.inner, env),
      TypeExpr::Parameter(p) => {
        if self.type_params.contains(&p.name) {
          self.store.parameter(p.name.clone())
        } else {
          let d = codes::UNDEFINED_TYPE_PARAMETER
            .at(self.span(texpr.loc))
            .with_detail("Name", format!("@{}", p.name));
          self.report(d);
          self.unknown()
        }
      }
    };
    texpr.assoc.set(ResolvedType(ty));
    ty
  }

  pub(crate) fn resolve_types(&mut self, texprs: &[Node<TypeExpr>], env: &Env) -> Vec<TypeId> {
    texprs.iter().map(|t| self.resolve_type(t, env)).collect()
  }

  fn resolve_named(&mut self, loc: Loc, module: Option<&str>, name: &str, env: &Env) -> TypeId {
    let current = env.container_name(&self.table);
    let lookup = Name::reference(&current, module, name);
    let span = self.span(loc);
    match env.find_type(&self.table, &lookup) {
      Some(found) => {
        let def = self.table.get(self.table.origin(found));
        if def.is_type_definition() || matches!(def.kind, DefKind::Class(_)) {
          self.table.ty(found)
        } else {
          let d = codes::NOT_A_TYPE
            .at(span)
            .with_detail("Name", lookup.to_string());
          self.report(d);
          self.unknown()
        }
      }
      None => {
        let d = codes::UNDEFINED_TYPE
          .at(span)
          .with_detail("Name", lookup.to_string());
        self.report(d);
        self.unknown()
      }
    }
  }

  /// Resolves `mk_R` and record patterns: the record type and its slot.
  pub(crate) fn resolve_record(
    &mut self,
    loc: Loc,
    module: Option<&str>,
    name: &str,
    env: &Env,
  ) -> Option<(TypeId, NamedId)> {
    let current = env.container_name(&self.table);
    let lookup = Name::reference(&current, module, name);
    let span = self.span(loc);
    let Some(found) = env.find_type(&self.table, &lookup) else {
      let d = codes::UNDEFINED_TYPE
        .at(span)
        .with_detail("Name", lookup.to_string());
      self.report(d);
      return None;
    };
    let named = match &self.table.get(self.table.origin(found)).kind {
      DefKind::Type { named, .. } | DefKind::State { named, .. } => Some(*named),
      _ => None,
    };
    match named {
      Some(named) if self.store.named(named).is_record => Some((self.table.ty(found), named)),
      _ => {
        let d = codes::NOT_A_RECORD_TYPE
          .at(span)
          .with_detail("Name", lookup.to_string());
        self.report(d);
        None
      }
    }
  }

  /// Defines every named type, then gives every definition its type.
  pub(crate) fn resolve_all(&mut self) {
    let span = debug_span!("typecheck_vdm.resolve", definitions = self.table.len());
    let _guard = span.enter();
    let ids: Vec<DefId> = self.table.iter().map(|(id, _)| id).collect();
    for id in &ids {
      if self.table.get(*id).is_type_definition() {
        self.resolve_type_definition(*id);
      }
    }
    for id in &ids {
      self.resolve_signature(*id);
    }
    for id in &ids {
      self.check_type_visibility(*id);
    }
    self.type_params.clear();
    debug!(types = self.store.len(), "resolved signatures");
  }

  fn resolve_type_definition(&mut self, id: DefId) {
    self.enter(id);
    let env = self.container_env(id);
    let def_ty = self.table.get(id).ty();
    let bool_ty = self.store.bool();
    match &self.table.get(id).kind {
      DefKind::Type {
        decl,
        named,
        derived,
      } => {
        let (decl, named, derived) = (*decl, *named, derived.clone());
        match &decl.shape {
          TypeShape::Alias(texpr) => {
            let ty = self.resolve_type(texpr, &env);
            self.store.define_named(named, ty);
          }
          TypeShape::Record(fields) => {
            let fields = fields
              .iter()
              .map(|f| RecordField {
                tag: f.stx.tag.clone().unwrap_or_default(),
                ty: self.resolve_type(&f.stx.ty, &env),
                equality_abstraction: f.stx.equality_abstraction,
              })
              .collect();
            self.store.define_record(named, fields);
          }
        }
        for d in derived {
          let role = match self.table.get(d).kind {
            DefKind::Derived { role, .. } => role,
            _ => continue,
          };
          let func = match role {
            DerivedRole::Inv => FunctionType::new(vec![def_ty], bool_ty),
            DerivedRole::Eq | DerivedRole::Ord => FunctionType::new(vec![def_ty, def_ty], bool_ty),
            DerivedRole::Min | DerivedRole::Max => FunctionType::new(vec![def_ty, def_ty], def_ty),
            _ => continue,
          };
          let ty = self.store.function(func.total());
          self.table.get(d).set_ty(ty);
        }
      }
      DefKind::State {
        decl,
        named,
        fields: field_defs,
        derived,
      } => {
        let (decl, named, field_defs, derived) = (*decl, *named, field_defs.clone(), derived.clone());
        let fields: Vec<RecordField> = decl
          .fields
          .iter()
          .map(|f| RecordField {
            tag: f.stx.tag.clone().unwrap_or_default(),
            ty: self.resolve_type(&f.stx.ty, &env),
            equality_abstraction: f.stx.equality_abstraction,
          })
          .collect();
        for field in field_defs {
          let tag = self.table.get(field).name.name.clone();
          if let Some(f) = fields.iter().find(|f| f.tag == tag) {
            self.table.get(field).set_ty(f.ty);
          }
        }
        self.store.define_record(named, fields);
        let check = self.store.function(FunctionType::new(vec![def_ty], bool_ty).total());
        for d in derived {
          self.table.get(d).set_ty(check);
        }
      }
      _ => {}
    }
  }

  fn resolve_signature(&mut self, id: DefId) {
    let def = self.table.get(id);
    let access = def.access;
    let module_state = def
      .module
      .and_then(|m| self.table.module(m).state)
      .map(|s| self.table.get(s).ty());
    match &def.kind {
      DefKind::ExplicitFunction { decl, info } => {
        let (decl, pre, post) = (*decl, info.pre, info.post);
        self.enter(id);
        let env = self.container_env(id);
        self.type_params = decl.type_params.clone();
        let ty = self.resolve_type(&decl.ty, &env);
        let func = match self.store.as_function(ty) {
          Some(func) => func,
          None => {
            if !self.store.is_unknown(ty) {
              let d = codes::SIGNATURE_KIND
                .at(self.span(decl.ty.loc))
                .with_detail("Name", decl.name.clone())
                .with_detail("Actual", self.display(ty));
              self.report(d);
            }
            return;
          }
        };
        let polymorphic = !decl.type_params.is_empty();
        self.set_function_types(id, func, polymorphic, pre, post);
      }
      DefKind::ImplicitFunction { decl, info } => {
        let (decl, pre, post) = (*decl, info.pre, info.post);
        self.enter(id);
        let env = self.container_env(id);
        self.type_params = decl.type_params.clone();
        let params = decl
          .params
          .iter()
          .map(|p| self.resolve_type(&p.stx.ty, &env))
          .collect();
        let result = self.resolve_type(&decl.result.stx.ty, &env);
        let polymorphic = !decl.type_params.is_empty();
        self.set_function_types(id, FunctionType::new(params, result), polymorphic, pre, post);
      }
      DefKind::ExplicitOperation { decl, info } => {
        let (decl, pre, post) = (*decl, info.pre, info.post);
        self.enter(id);
        let env = self.container_env(id);
        self.type_params.clear();
        let ty = self.resolve_type(&decl.ty, &env);
        let Some(op) = self.store.as_operation(ty) else {
          if !self.store.is_unknown(ty) {
            let d = codes::SIGNATURE_KIND
              .at(self.span(decl.ty.loc))
              .with_detail("Name", decl.name.clone())
              .with_detail("Actual", self.display(ty));
            self.report(d);
          }
          return;
        };
        let op = OperationType {
          pure: access.is_pure,
          ..op
        };
        self.set_operation_types(id, op, module_state, pre, post);
      }
      DefKind::ImplicitOperation { decl, info } => {
        let (decl, pre, post) = (*decl, info.pre, info.post);
        self.enter(id);
        let env = self.container_env(id);
        self.type_params.clear();
        let params = decl
          .params
          .iter()
          .map(|p| self.resolve_type(&p.stx.ty, &env))
          .collect();
        let result = match &decl.result {
          Some(r) => self.resolve_type(&r.stx.ty, &env),
          None => self.store.void(),
        };
        let op = OperationType {
          params,
          result,
          pure: access.is_pure,
        };
        self.set_operation_types(id, op, module_state, pre, post);
      }
      DefKind::InstanceVariable { decl, .. } => {
        let decl = *decl;
        self.enter(id);
        let env = self.container_env(id);
        self.type_params.clear();
        let ty = self.resolve_type(&decl.ty, &env);
        self.table.get(id).set_ty(ty);
      }
      DefKind::Value { decl, names } => {
        let (decl, names) = (*decl, names.clone());
        let Some(texpr) = &decl.ty else {
          return;
        };
        self.enter(id);
        let env = self.container_env(id);
        self.type_params.clear();
        let ty = self.resolve_type(texpr, &env);
        self.table.get(id).set_ty(ty);
        // A single name takes the declared type until the value is checked.
        if let [name] = names[..] {
          self.table.get(name).set_ty(ty);
        }
      }
      _ => {}
    }
  }

  fn set_function_types(
    &mut self,
    id: DefId,
    func: FunctionType,
    polymorphic: bool,
    pre: Option<DefId>,
    post: Option<DefId>,
  ) {
    let instantiated = polymorphic.then_some(false);
    let bool_ty = self.store.bool();
    let ty = self.store.function(FunctionType {
      instantiated,
      ..func.clone()
    });
    self.table.get(id).set_ty(ty);
    if let Some(pre) = pre {
      let pre_ty = self.store.function(FunctionType {
        instantiated,
        ..FunctionType::new(func.params.clone(), bool_ty).total()
      });
      self.table.get(pre).set_ty(pre_ty);
    }
    if let Some(post) = post {
      let mut params = func.params.clone();
      params.push(func.result);
      let post_ty = self.store.function(FunctionType {
        instantiated,
        ..FunctionType::new(params, bool_ty).total()
      });
      self.table.get(post).set_ty(post_ty);
    }
  }

  /// Operation pre and post functions take the state too: the initial one
  /// for `pre_op`, the initial and final ones for `post_op`.
  fn set_operation_types(
    &mut self,
    id: DefId,
    op: OperationType,
    state: Option<TypeId>,
    pre: Option<DefId>,
    post: Option<DefId>,
  ) {
    let bool_ty = self.store.bool();
    let result = op.result;
    let params = op.params.clone();
    let ty = self.store.operation(op);
    self.table.get(id).set_ty(ty);
    if let Some(pre) = pre {
      let mut pre_params = params.clone();
      pre_params.extend(state);
      let pre_ty = self.store.function(FunctionType::new(pre_params, bool_ty).total());
      self.table.get(pre).set_ty(pre_ty);
    }
    if let Some(post) = post {
      let mut post_params = params;
      if !self.store.is_void(result) {
        post_params.push(result);
      }
      post_params.extend(state);
      post_params.extend(state);
      let post_ty = self.store.function(FunctionType::new(post_params, bool_ty).total());
      self.table.get(post).set_ty(post_ty);
    }
  }

  /// A class member may not expose a type that is less visible than itself.
  fn check_type_visibility(&mut self, id: DefId) {
    let def = self.table.get(id);
    if def.class.is_none() || def.visibility() == Visibility::Private {
      return;
    }
    let visibility = def.visibility();
    let exposed = match &def.kind {
      DefKind::Type { named, .. } => {
        let slot = self.store.named(*named);
        match slot.underlying {
          Some(u) => vec![u],
          None => slot.fields.iter().map(|f| f.ty).collect(),
        }
      }
      DefKind::ExplicitFunction { .. }
      | DefKind::ImplicitFunction { .. }
      | DefKind::ExplicitOperation { .. }
      | DefKind::ImplicitOperation { .. }
      | DefKind::InstanceVariable { .. } => vec![def.ty()],
      _ => return,
    };
    let span = def.span;
    let name = def.name.name.clone();
    if let Some(ty) = exposed
      .into_iter()
      .find(|ty| self.store.narrower_than(*ty, visibility))
    {
      let d = codes::TYPE_LESS_VISIBLE
        .at(span)
        .with_detail("Name", name)
        .with_detail("Type", self.display(ty));
      self.report(d);
    }
  }

  /// Whether the type is a natural number, or a tuple of them.
  pub(crate) fn is_natural(&mut self, ty: TypeId) -> bool {
    if self.store.is_unknown(ty) {
      return true;
    }
    if let TypeKind::Product(members) = self.store.get(self.store.deref(ty)) {
      let members = members.clone();
      return members.into_iter().all(|m| self.is_natural(m));
    }
    matches!(
      self.store.get(self.store.deref(ty)),
      TypeKind::Numeric(NumericKind::Nat | NumericKind::Nat1)
    )
  }
}
