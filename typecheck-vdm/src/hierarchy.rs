//! Linking classes to their superclasses and working out what each class
//! inherits.
//!
//! Linking runs before any type is resolved: it only needs class names. It
//! walks the hierarchy depth first and breaks every cycle at the edge that
//! closes it, so later stages may assume the hierarchy is a DAG. Collecting
//! inherited members runs right after; overrides are checked once signatures
//! are known.

use crate::check::Checker;
use crate::codes;
use crate::def::DefId;
use crate::def::DefKind;
use crate::def::Definition;
use crate::def::DerivedRole;
use crate::def::LinkState;
use crate::name::Name;
use crate::name::NameScope;
use ahash::AHashSet;
use diagnostics::Label;
use diagnostics::Span;
use itertools::Itertools;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Visibility;
use tracing::debug;
use tracing::debug_span;
use tracing::trace;
use types_vdm::ClassId;
use types_vdm::OperationType;
use types_vdm::RelateCtx;

impl<'a> Checker<'a> {
  pub(crate) fn link_classes(&mut self) {
    let classes = self.table.classes().to_vec();
    let mut stack = Vec::new();
    for class in classes {
      if self.table.class_info(class).link.get() == LinkState::Unset {
        self.link(class, &mut stack);
      }
    }
  }

  fn link(&mut self, class: DefId, stack: &mut Vec<DefId>) {
    let name = self.table.get(class).name.name.clone();
    let span = debug_span!("typecheck_vdm.link", class = %name);
    let _guard = span.enter();
    self.enter(class);
    let info = self.table.class_info(class);
    info.link.set(LinkState::InProgress);
    let decl = info.decl;
    stack.push(class);
    let mut supers: Vec<DefId> = Vec::new();
    for sup in &decl.supers {
      let sup_span = Span::at(self.table.get(class).span.file, sup.loc);
      let Some(target) = self.table.find_class(&sup.stx.name) else {
        let d = codes::UNDEFINED_SUPERCLASS
          .at(sup_span)
          .with_detail("Name", sup.stx.name.clone());
        self.report(d);
        continue;
      };
      match self.table.class_info(target).link.get() {
        LinkState::InProgress => {
          self.report_cycle(class, target, stack, sup_span);
          continue;
        }
        LinkState::Unset => {
          self.link(target, stack);
          self.enter(class);
        }
        LinkState::Done => {}
      }
      if !supers.contains(&target) {
        supers.push(target);
      }
    }
    stack.pop();
    let ids: Vec<ClassId> = supers
      .iter()
      .map(|s| self.table.class_info(*s).id)
      .collect();
    let info = self.table.class_info(class);
    self.store.set_supers(info.id, ids);
    *info.supers.borrow_mut() = supers;
    info.link.set(LinkState::Done);
    trace!(class = %name, "linked");
  }

  /// Reports the cycle closed by the edge from `class` to `target`, once,
  /// at the superclass reference that closes it.
  fn report_cycle(&mut self, class: DefId, target: DefId, stack: &[DefId], span: Span) {
    let start = stack.iter().position(|c| *c == target).unwrap_or(0);
    let members = &stack[start..];
    let names = members
      .iter()
      .chain(std::iter::once(&target))
      .map(|c| self.table.get(*c).name.name.clone())
      .join(" -> ");
    let mut d = codes::CIRCULAR_HIERARCHY
      .at(span)
      .with_detail("Name", self.table.get(class).name.name.clone())
      .with_detail("Cycle", names);
    for other in members.iter().filter(|c| **c != class) {
      d = d.with_label(Label::secondary(self.table.get(*other).span, "part of the cycle"));
    }
    self.report(d);
  }

  pub(crate) fn collect_all_inherited(&mut self) {
    for class in self.table.classes().to_vec() {
      self.collect_inherited(class);
    }
  }

  /// Gives `class` a proxy for every non-private member of its superclasses,
  /// and its aggregated class invariant.
  fn collect_inherited(&mut self, class: DefId) {
    let info = self.table.class_info(class);
    if info.collect.get() != LinkState::Unset {
      return;
    }
    info.collect.set(LinkState::InProgress);
    let supers = info.supers.borrow().clone();
    for sup in &supers {
      self.collect_inherited(*sup);
    }

    let locals = self.table.class_info(class).locals.clone();
    let mut seen: AHashSet<DefId> = AHashSet::new();
    let mut proxies = Vec::new();
    let mut invariants: Vec<DefId> = Vec::new();
    for sup in &supers {
      for inv in self.table.class_info(*sup).invariants.borrow().iter() {
        if !invariants.contains(inv) {
          invariants.push(*inv);
        }
      }
      for member in self.table.class_members(*sup) {
        let origin = self.table.origin(member);
        let def = self.table.get(origin);
        let excluded = def.visibility() == Visibility::Private
          || def.scope.is_empty()
          || def.name.name.is_empty()
          || def.is_constructor()
          || matches!(
            def.kind,
            DefKind::Derived {
              role: DerivedRole::ClassInv,
              ..
            }
          );
        if excluded || !seen.insert(origin) {
          continue;
        }
        let proxy = Definition::new(
          def.name.clone(),
          def.span,
          def.scope,
          DefKind::Inherited { target: member },
          def.ty(),
        )
        .with_pass(def.pass)
        .with_access(def.access)
        .with_class(def.class);
        proxies.push(self.table.alloc(proxy));
      }
    }

    // Local definitions hide inherited ones that cannot be overloaded.
    let local_inherited: Vec<DefId> = proxies
      .iter()
      .copied()
      .filter(|p| {
        let proxy = self.table.get(*p);
        self.table.is_callable(*p)
          || !locals.iter().any(|l| {
            let local = self.table.get(*l);
            local.name.name == proxy.name.name
              && local.scope.contains(NameScope::TYPENAME) == proxy.scope.contains(NameScope::TYPENAME)
          })
      })
      .collect();

    for local in &locals {
      if matches!(self.table.get(*local).kind, DefKind::ClassInvariant { .. }) {
        invariants.push(*local);
      }
    }
    let inv_operation = (!invariants.is_empty()).then(|| {
      let def = self.table.get(class);
      let name = Name::new(def.name.name.clone(), def.name.name.clone()).inv_name();
      let span = def.span;
      let bool_ty = self.store.bool();
      let ty = self.store.operation(OperationType {
        params: Vec::new(),
        result: bool_ty,
        pure: true,
      });
      self.table.alloc(
        Definition::new(
          name,
          span,
          NameScope::GLOBAL,
          DefKind::Derived {
            origin: class,
            role: DerivedRole::ClassInv,
          },
          ty,
        )
        .with_access(Access::public())
        .with_class(Some(class)),
      )
    });
    if let DefKind::Class(info) = &mut self.table.get_mut(class).kind {
      if let Some(inv) = inv_operation {
        info.locals.push(inv);
      }
    }

    let info = self.table.class_info(class);
    debug!(
      class = %self.table.get(class).name.name,
      inherited = proxies.len(),
      visible = local_inherited.len(),
      "collected inherited members"
    );
    *info.all_inherited.borrow_mut() = proxies;
    *info.local_inherited.borrow_mut() = local_inherited;
    *info.invariants.borrow_mut() = invariants;
    info.inv_operation.set(inv_operation);
    info.collect.set(LinkState::Done);
  }

  /// Checks overriding, inherited ambiguities and local overloads of every
  /// class. Needs resolved signatures.
  pub(crate) fn check_hierarchy(&mut self) {
    for class in self.table.classes().to_vec() {
      self.enter(class);
      self.check_overrides(class);
      self.check_inherited_ambiguity(class);
      self.check_local_overloads(class);
    }
  }

  fn check_overrides(&mut self, class: DefId) {
    let info = self.table.class_info(class);
    let locals = info.locals.clone();
    let inherited = info.local_inherited.borrow().clone();
    let mut overridden: Vec<DefId> = Vec::new();
    for proxy in inherited {
      if !self.table.is_callable(proxy) {
        continue;
      }
      let p = self.table.get(proxy);
      let same_name: Vec<DefId> = locals
        .iter()
        .copied()
        .filter(|l| {
          let local = self.table.get(*l);
          local.name.name == p.name.name && !local.scope.contains(NameScope::TYPENAME)
        })
        .collect();
      for local in same_name {
        if let Some(diagnostic) = self.override_error(local, proxy) {
          self.report(diagnostic);
          overridden.push(proxy);
        } else if self.overrides(local, proxy) {
          overridden.push(proxy);
        }
      }
    }
    if !overridden.is_empty() {
      self
        .table
        .class_info(class)
        .local_inherited
        .borrow_mut()
        .retain(|p| !overridden.contains(p));
    }
  }

  /// Whether `local` takes the place of the inherited callable `proxy`.
  fn overrides(&self, local: DefId, proxy: DefId) -> bool {
    self.table.is_callable(local)
      && self.table.is_function(local) == self.table.is_function(proxy)
      && RelateCtx::new(&self.store).compatible_params_only(self.table.ty(proxy), self.table.ty(local))
  }

  fn override_error(&mut self, local: DefId, proxy: DefId) -> Option<diagnostics::Diagnostic> {
    let l = self.table.get(local);
    let p = self.table.get(proxy);
    let span = l.span;
    let name = l.name.name.clone();
    let kind_differs =
      !self.table.is_callable(local) || self.table.is_function(local) != self.table.is_function(proxy);
    let narrower = l.visibility() < p.visibility();
    let purity_differs = self.table.is_operation(local) && l.access.is_pure != p.access.is_pure;
    let origin_span = self.table.get(self.table.origin(proxy)).span;
    let label = Label::secondary(origin_span, "overridden definition");
    if kind_differs {
      return Some(
        codes::OVERRIDE_KIND
          .at(span)
          .with_label(label)
          .with_detail("Name", name),
      );
    }
    if !self.overrides(local, proxy) {
      return None;
    }
    if narrower {
      return Some(
        codes::OVERRIDE_ACCESS
          .at(span)
          .with_label(label)
          .with_detail("Name", name),
      );
    }
    if purity_differs {
      return Some(
        codes::OVERRIDE_PURITY
          .at(span)
          .with_label(label)
          .with_detail("Name", name),
      );
    }
    let local_ty = self.table.ty(local);
    let proxy_ty = self.table.ty(proxy);
    let (expected, actual) = match (self.result_of(proxy_ty), self.result_of(local_ty)) {
      (Some(expected), Some(actual)) => (expected, actual),
      _ => return None,
    };
    if self.compatible(expected, actual) {
      return None;
    }
    Some(
      codes::OVERRIDE_INCOMPATIBLE
        .at(span)
        .with_label(label)
        .with_detail("Name", name)
        .with_detail("Expected", self.display(proxy_ty))
        .with_detail("Actual", self.display(local_ty)),
    )
  }

  fn result_of(&mut self, ty: types_vdm::TypeId) -> Option<types_vdm::TypeId> {
    if let Some(func) = self.store.as_function(ty) {
      return Some(func.result);
    }
    self.store.as_operation(ty).map(|op| op.result)
  }

  /// Two inherited members of the same name from unrelated classes cannot
  /// both be visible unless they are distinguishable overloads.
  fn check_inherited_ambiguity(&mut self, class: DefId) {
    let inherited = self.table.class_info(class).local_inherited.borrow().clone();
    let locals = self.table.class_info(class).locals.clone();
    let mut reported: AHashSet<String> = AHashSet::new();
    for (i, a) in inherited.iter().enumerate() {
      for b in &inherited[i + 1..] {
        let (da, db) = (self.table.get(*a), self.table.get(*b));
        if da.name.name != db.name.name || reported.contains(&da.name.name) {
          continue;
        }
        if da.scope.contains(NameScope::TYPENAME) != db.scope.contains(NameScope::TYPENAME) {
          continue;
        }
        let hidden = locals
          .iter()
          .any(|l| self.table.get(*l).name.name == da.name.name);
        let callable = self.table.is_callable(*a) && self.table.is_callable(*b);
        if hidden && !callable {
          continue;
        }
        let (ca, cb) = match (da.class, db.class) {
          (Some(ca), Some(cb)) => (self.table.class_info(ca).id, self.table.class_info(cb).id),
          _ => continue,
        };
        if self.store.is_subclass(ca, cb) || self.store.is_subclass(cb, ca) {
          continue;
        }
        let clash = if callable {
          let ctx = RelateCtx::new(&self.store);
          let (ta, tb) = (self.table.ty(*a), self.table.ty(*b));
          self.table.is_function(*a) == self.table.is_function(*b)
            && (ctx.compatible_params_only(ta, tb) || ctx.compatible_params_only(tb, ta))
        } else {
          true
        };
        if !clash {
          continue;
        }
        reported.insert(da.name.name.clone());
        let d = codes::INHERITED_AMBIGUITY
          .at(self.table.get(class).span)
          .with_label(Label::secondary(da.span, "inherited here"))
          .with_label(Label::secondary(db.span, "and here"))
          .with_detail("Name", da.name.name.clone());
        self.report(d);
      }
    }
  }

  /// Overloads declared in one class must be distinguishable by their
  /// parameter types.
  fn check_local_overloads(&mut self, class: DefId) {
    let locals = self.table.class_info(class).locals.clone();
    for (i, a) in locals.iter().enumerate() {
      for b in &locals[i + 1..] {
        let (da, db) = (self.table.get(*a), self.table.get(*b));
        if da.name.name != db.name.name || !self.table.is_callable(*a) || !self.table.is_callable(*b) {
          continue;
        }
        if da.name.name.is_empty() || matches!(db.kind, DefKind::Derived { .. }) {
          continue;
        }
        let label = Label::secondary(da.span, "first defined here");
        if self.table.is_function(*a) != self.table.is_function(*b) {
          let d = codes::DUPLICATE_DEFINITION
            .at(db.span)
            .with_label(label)
            .with_detail("Name", db.name.name.clone());
          self.report(d);
          continue;
        }
        let ctx = RelateCtx::new(&self.store);
        let (ta, tb) = (self.table.ty(*a), self.table.ty(*b));
        if ctx.compatible_params_only(ta, tb) || ctx.compatible_params_only(tb, ta) {
          let d = codes::DUPLICATE_OVERLOAD
            .at(db.span)
            .with_label(label)
            .with_detail("Name", db.name.name.clone());
          self.report(d);
        }
      }
    }
  }
}
