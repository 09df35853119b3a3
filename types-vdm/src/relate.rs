use crate::types::TypeId;
use crate::types::TypeKind;
use crate::types::TypeStore;
use bitflags::bitflags;
use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::HashSet;
use std::time::Instant;
use tracing::debug_span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
  /// A value of the source type may appear where the target is expected.
  Compatible,
  /// Every value of the source type is a value of the target type.
  SubType,
}

bitflags! {
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
  pub struct RelationMode: u8 {
    const NONE = 0;
    /// Ignore function and operation results.
    const PARAMS_ONLY = 1 << 0;
    /// A named type with an invariant only contains itself.
    const INVARIANTS = 1 << 1;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RelationKey {
  src: TypeId,
  dst: TypeId,
  kind: RelationKind,
  mode: RelationMode,
}

struct RelationSpan {
  span: tracing::Span,
  start: Instant,
}

impl RelationSpan {
  fn enter(key: RelationKey, cache_hit: bool) -> Option<RelationSpan> {
    let span = debug_span!(
      "types_vdm.relate",
      type_id = key.src.0,
      target_type_id = key.dst.0,
      relation = ?key.kind,
      cache_hit,
      duration_ms = tracing::field::Empty,
      outcome = tracing::field::Empty,
    );
    if span.is_disabled() {
      return None;
    }
    Some(RelationSpan {
      span,
      start: Instant::now(),
    })
  }

  fn finish(self, outcome: bool) {
    self.span.record("outcome", outcome);
    self
      .span
      .record("duration_ms", self.start.elapsed().as_secs_f64() * 1000.0);
  }
}

/// The type comparator.
///
/// Results are cached for the lifetime of the context. A relation that is
/// asked again while it is still being computed (through a recursive named
/// type) is assumed to hold, which makes recursive types terminate.
pub struct RelateCtx<'a> {
  store: &'a TypeStore,
  cache: RefCell<HashMap<RelationKey, bool>>,
  in_progress: RefCell<HashSet<RelationKey>>,
}

impl<'a> RelateCtx<'a> {
  pub fn new(store: &'a TypeStore) -> Self {
    Self {
      store,
      cache: RefCell::new(HashMap::new()),
      in_progress: RefCell::new(HashSet::new()),
    }
  }

  pub fn store(&self) -> &'a TypeStore {
    self.store
  }

  /// Whether a value of type `actual` may be used where `expected` is
  /// required.
  pub fn compatible(&self, expected: TypeId, actual: TypeId) -> bool {
    self.relate(actual, expected, RelationKind::Compatible, RelationMode::NONE)
  }

  /// As [`Self::compatible`], but function and operation results are ignored.
  /// Used to compare overloaded signatures.
  pub fn compatible_params_only(&self, expected: TypeId, actual: TypeId) -> bool {
    self.relate(
      actual,
      expected,
      RelationKind::Compatible,
      RelationMode::PARAMS_ONLY,
    )
  }

  /// Pairwise compatibility of two lists of the same length.
  pub fn compatible_lists(&self, expected: &[TypeId], actual: &[TypeId]) -> bool {
    expected.len() == actual.len()
      && expected
        .iter()
        .zip(actual)
        .all(|(e, a)| self.compatible(*e, *a))
  }

  /// Whether `sub` is a subtype of `sup`. With `invariants`, a named type
  /// with an invariant is only a supertype of itself.
  pub fn is_sub_type(&self, sub: TypeId, sup: TypeId, invariants: bool) -> bool {
    let mode = if invariants {
      RelationMode::INVARIANTS
    } else {
      RelationMode::NONE
    };
    self.relate(sub, sup, RelationKind::SubType, mode)
  }

  /// Whether the two types are mutual subtypes.
  pub fn equivalent(&self, a: TypeId, b: TypeId) -> bool {
    self.is_sub_type(a, b, false) && self.is_sub_type(b, a, false)
  }

  fn relate(&self, src: TypeId, dst: TypeId, kind: RelationKind, mode: RelationMode) -> bool {
    let key = RelationKey {
      src,
      dst,
      kind,
      mode,
    };
    let cached = self.cache.borrow().get(&key).copied();
    let mut span = RelationSpan::enter(key, cached.is_some());
    if let Some(hit) = cached {
      if let Some(span) = span.take() {
        span.finish(hit);
      }
      return hit;
    }
    if self.in_progress.borrow().contains(&key) {
      if let Some(span) = span.take() {
        span.finish(true);
      }
      return true;
    }

    self.in_progress.borrow_mut().insert(key);
    let outcome = match kind {
      RelationKind::Compatible => self.compatible_inner(dst, src, mode),
      RelationKind::SubType => self.sub_type_inner(src, dst, mode),
    };
    self.in_progress.borrow_mut().remove(&key);
    self.cache.borrow_mut().insert(key, outcome);
    if let Some(span) = span.take() {
      span.finish(outcome);
    }
    outcome
  }

  fn compat(&self, to: TypeId, from: TypeId, mode: RelationMode) -> bool {
    self.relate(from, to, RelationKind::Compatible, mode)
  }

  fn compat_all(&self, to: &[TypeId], from: &[TypeId], mode: RelationMode) -> bool {
    to.len() == from.len() && to.iter().zip(from).all(|(t, f)| self.compat(*t, *f, mode))
  }

  fn compatible_inner(&self, to: TypeId, from: TypeId, mode: RelationMode) -> bool {
    if to == from {
      return true;
    }
    let store = self.store;
    // Aliases are transparent; their own identity is irrelevant here.
    if let TypeKind::Named(n) = store.get(to) {
      let underlying = store.named(*n).underlying.unwrap_or(store.unknown());
      return self.compat(underlying, from, mode);
    }
    if let TypeKind::Named(n) = store.get(from) {
      let underlying = store.named(*n).underlying.unwrap_or(store.unknown());
      return self.compat(to, underlying, mode);
    }

    match (store.get(to), store.get(from)) {
      (TypeKind::Unknown | TypeKind::Parameter(_), _)
      | (_, TypeKind::Unknown | TypeKind::Parameter(_)) => true,
      (TypeKind::Union(members), _) => members.iter().any(|m| self.compat(*m, from, mode)),
      (_, TypeKind::Union(members)) => members.iter().any(|m| self.compat(to, *m, mode)),
      (TypeKind::Optional(t), TypeKind::Optional(f)) => {
        *f == store.unknown() || self.compat(*t, *f, mode)
      }
      (TypeKind::Optional(t), _) => self.compat(*t, from, mode),
      // `nil` is never a value of a non-optional type.
      (_, TypeKind::Optional(f)) => *f != store.unknown() && self.compat(to, *f, mode),
      (TypeKind::Numeric(_), TypeKind::Numeric(_))
      | (TypeKind::Bool, TypeKind::Bool)
      | (TypeKind::Char, TypeKind::Char)
      | (TypeKind::Token, TypeKind::Token)
      | (TypeKind::Void, TypeKind::Void) => true,
      (TypeKind::Quote(a), TypeKind::Quote(b)) => a == b,
      (TypeKind::Product(a), TypeKind::Product(b)) => self.compat_all(a, b, mode),
      (TypeKind::Set(a), TypeKind::Set(b)) => a.empty || b.empty || self.compat(a.elem, b.elem, mode),
      (TypeKind::Seq(a), TypeKind::Seq(b)) => a.empty || b.empty || self.compat(a.elem, b.elem, mode),
      (TypeKind::Map(a), TypeKind::Map(b)) => {
        a.empty || b.empty || (self.compat(a.dom, b.dom, mode) && self.compat(a.rng, b.rng, mode))
      }
      (TypeKind::Function(a), TypeKind::Function(b)) => {
        self.compat_all(&a.params, &b.params, mode)
          && (mode.contains(RelationMode::PARAMS_ONLY) || self.compat(a.result, b.result, mode))
      }
      (TypeKind::Operation(a), TypeKind::Operation(b)) => {
        self.compat_all(&a.params, &b.params, mode)
          && (mode.contains(RelationMode::PARAMS_ONLY) || self.compat(a.result, b.result, mode))
      }
      (TypeKind::Record(a), TypeKind::Record(b)) => a == b,
      (TypeKind::Class(a), TypeKind::Class(b)) => a == b || store.is_subclass(*b, *a),
      _ => false,
    }
  }

  fn sub(&self, sub: TypeId, sup: TypeId, mode: RelationMode) -> bool {
    self.relate(sub, sup, RelationKind::SubType, mode)
  }

  fn sub_all(&self, sub: &[TypeId], sup: &[TypeId], mode: RelationMode) -> bool {
    sub.len() == sup.len() && sub.iter().zip(sup).all(|(a, b)| self.sub(*a, *b, mode))
  }

  fn sub_type_inner(&self, sub: TypeId, sup: TypeId, mode: RelationMode) -> bool {
    if sub == sup {
      return true;
    }
    let store = self.store;
    if let TypeKind::Named(n) = store.get(sup) {
      let slot = store.named(*n);
      if mode.contains(RelationMode::INVARIANTS) && slot.has_inv && !store.is_unknown(sub) {
        return false;
      }
      return self.sub(sub, slot.underlying.unwrap_or(store.unknown()), mode);
    }
    if let TypeKind::Named(n) = store.get(sub) {
      let underlying = store.named(*n).underlying.unwrap_or(store.unknown());
      return self.sub(underlying, sup, mode);
    }

    match (store.get(sub), store.get(sup)) {
      (TypeKind::Unknown | TypeKind::Parameter(_), _)
      | (_, TypeKind::Unknown | TypeKind::Parameter(_)) => true,
      (TypeKind::Union(members), _) => members.iter().all(|m| self.sub(*m, sup, mode)),
      (_, TypeKind::Union(members)) => members.iter().any(|m| self.sub(sub, *m, mode)),
      (TypeKind::Optional(s), TypeKind::Optional(t)) => {
        *s == store.unknown() || self.sub(*s, *t, mode)
      }
      (_, TypeKind::Optional(t)) => self.sub(sub, *t, mode),
      (TypeKind::Optional(_), _) => false,
      (TypeKind::Numeric(a), TypeKind::Numeric(b)) => a <= b,
      (TypeKind::Bool, TypeKind::Bool)
      | (TypeKind::Char, TypeKind::Char)
      | (TypeKind::Token, TypeKind::Token)
      | (TypeKind::Void, TypeKind::Void) => true,
      (TypeKind::Quote(a), TypeKind::Quote(b)) => a == b,
      (TypeKind::Product(a), TypeKind::Product(b)) => self.sub_all(a, b, mode),
      (TypeKind::Set(a), TypeKind::Set(b)) => {
        if a.empty {
          !b.non_empty
        } else if b.empty || (b.non_empty && !a.non_empty) {
          false
        } else {
          self.sub(a.elem, b.elem, mode)
        }
      }
      (TypeKind::Seq(a), TypeKind::Seq(b)) => {
        if a.empty {
          !b.non_empty
        } else if b.empty || (b.non_empty && !a.non_empty) {
          false
        } else {
          self.sub(a.elem, b.elem, mode)
        }
      }
      (TypeKind::Map(a), TypeKind::Map(b)) => {
        if a.empty {
          true
        } else if b.empty || (b.injective && !a.injective) {
          false
        } else {
          self.sub(a.dom, b.dom, mode) && self.sub(a.rng, b.rng, mode)
        }
      }
      (TypeKind::Function(a), TypeKind::Function(b)) => {
        // A partial function is not a total one.
        (b.partial || !a.partial)
          && self.sub_all(&a.params, &b.params, mode)
          && self.sub(a.result, b.result, mode)
      }
      (TypeKind::Operation(a), TypeKind::Operation(b)) => {
        self.sub_all(&a.params, &b.params, mode) && self.sub(a.result, b.result, mode)
      }
      (TypeKind::Record(a), TypeKind::Record(b)) => a == b,
      (TypeKind::Class(a), TypeKind::Class(b)) => store.is_subclass(*a, *b),
      _ => false,
    }
  }
}

impl TypeStore {
  /// The greatest common type of `a` and `b`, as needed for the element type
  /// of a set intersection. `None` when no value can belong to both.
  pub fn intersect(&mut self, a: TypeId, b: TypeId) -> Option<TypeId> {
    let members = {
      let ctx = RelateCtx::new(self);
      if ctx.is_sub_type(a, b, false) {
        return Some(a);
      }
      if ctx.is_sub_type(b, a, false) {
        return Some(b);
      }
      let left = self.members(a);
      let right = self.members(b);
      let mut common: Vec<TypeId> = Vec::new();
      for l in &left {
        for r in &right {
          let pick = if ctx.is_sub_type(*l, *r, false) {
            Some(*l)
          } else if ctx.is_sub_type(*r, *l, false) {
            Some(*r)
          } else {
            None
          };
          if let Some(p) = pick {
            if !common.contains(&p) {
              common.push(p);
            }
          }
        }
      }
      common
    };
    if members.is_empty() {
      None
    } else {
      Some(self.union(members))
    }
  }
}

#[cfg(test)]
mod tests {
  use super::RelateCtx;
  use crate::types::TypeName;
  use crate::types::TypeStore;
  use syntax_vdm::ast::decl::Visibility;

  #[test]
  fn recursive_named_types_terminate() {
    let mut store = TypeStore::new();
    // Tree = nat | seq of Tree
    let tree = store.declare_named(TypeName::new("M", "Tree"), false, Visibility::Public);
    let tt = store.named_type(tree);
    let nat = store.nat();
    let children = store.seq(tt);
    let body = store.union(vec![nat, children]);
    store.define_named(tree, body);

    let other = store.declare_named(TypeName::new("M", "Other"), false, Visibility::Public);
    let to = store.named_type(other);
    let children = store.seq(to);
    let body = store.union(vec![nat, children]);
    store.define_named(other, body);

    let ctx = RelateCtx::new(&store);
    assert!(ctx.compatible(tt, to));
    assert!(ctx.is_sub_type(tt, to, false));
  }

  #[test]
  fn intersection_of_unrelated_basics_is_none() {
    let mut store = TypeStore::new();
    let nat = store.nat();
    let b = store.bool();
    assert_eq!(store.intersect(nat, b), None);
    let int = store.int();
    assert_eq!(store.intersect(nat, int), Some(nat));
    let c = store.char();
    let u1 = store.union(vec![nat, c]);
    let u2 = store.union(vec![int, b]);
    assert_eq!(store.intersect(u1, u2), Some(nat));
  }
}
