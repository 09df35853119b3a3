use super::Checker;
use crate::codes;
use crate::def::DefId;
use crate::def::LocalRole;
use crate::env::Env;
use crate::name::Name;
use crate::name::NameScope;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::pat::Bind;
use syntax_vdm::ast::pat::BindSource;
use syntax_vdm::ast::pat::MultipleBind;
use syntax_vdm::ast::pat::Pattern;
use syntax_vdm::ast::pat::UnionPattern;
use syntax_vdm::loc::Loc;
use types_vdm::TypeId;

/// The names a pattern binds, in order of appearance.
pub(crate) fn pattern_names(pattern: &Node<Pattern>) -> Vec<(&str, Loc)> {
  let mut names = Vec::new();
  collect_names(pattern, &mut names);
  names
}

fn collect_names<'p>(pattern: &'p Node<Pattern>, out: &mut Vec<(&'p str, Loc)>) {
  match &*pattern.stx {
    Pattern::Identifier(id) => out.push((id.name.as_str(), pattern.loc)),
    Pattern::Ignore | Pattern::Literal(_) | Pattern::Expression(_) => {}
    Pattern::Tuple(t) => t.items.iter().for_each(|p| collect_names(p, out)),
    Pattern::Set(s) => s.items.iter().for_each(|p| collect_names(p, out)),
    Pattern::Seq(s) => s.items.iter().for_each(|p| collect_names(p, out)),
    Pattern::Record(r) => r.fields.iter().for_each(|p| collect_names(p, out)),
    Pattern::SetUnion(u) | Pattern::SeqConcat(u) | Pattern::MapUnion(u) => {
      collect_names(&u.left, out);
      collect_names(&u.right, out);
    }
    Pattern::Map(m) => {
      for maplet in &m.maplets {
        collect_names(&maplet.stx.from, out);
        collect_names(&maplet.stx.to, out);
      }
    }
    Pattern::Object(o) => o
      .fields
      .iter()
      .for_each(|f| collect_names(&f.stx.pattern, out)),
  }
}

/// A name bound by a pattern, with the type it takes.
pub(crate) type Binding<'a> = (&'a str, Loc, TypeId);

impl<'a> Checker<'a> {
  /// Checks that `pattern` can match a value of type `ty` and collects the
  /// names it binds.
  pub(crate) fn match_pattern(
    &mut self,
    pattern: &'a Node<Pattern>,
    ty: TypeId,
    env: &Rc<Env>,
    out: &mut Vec<Binding<'a>>,
  ) {
    let span = self.span(pattern.loc);
    let unknown = self.unknown();
    match &*pattern.stx {
      Pattern::Identifier(id) => out.push((id.name.as_str(), pattern.loc, ty)),
      Pattern::Ignore => {}
      Pattern::Literal(lit) => {
        let lit_ty = self.literal_type(&lit.value);
        self.check_pattern_type(span, ty, lit_ty);
      }
      Pattern::Expression(e) => {
        let expr_ty = self.expr(&e.expr, env, NameScope::NAMESANDSTATE, Some(ty));
        self.check_pattern_type(span, ty, expr_ty);
      }
      Pattern::Tuple(t) => {
        let members = match self.store.as_product(ty) {
          Some(members) if members.len() == t.items.len() => members,
          _ if self.store.is_unknown(ty) => vec![unknown; t.items.len()],
          _ => {
            let d = codes::PATTERN_TYPE
              .at(span)
              .with_detail("Expected", self.display(ty))
              .with_detail("Actual", format!("{}-tuple", t.items.len()));
            self.report(d);
            vec![unknown; t.items.len()]
          }
        };
        for (item, member) in t.items.iter().zip(members) {
          self.match_pattern(item, member, env, out);
        }
      }
      Pattern::Record(r) => {
        let fields = match self.resolve_record(pattern.loc, r.module.as_deref(), &r.name, env) {
          Some((record_ty, named)) => {
            self.check_pattern_type(span, ty, record_ty);
            let fields: Vec<TypeId> = self.store.named(named).fields.iter().map(|f| f.ty).collect();
            if fields.len() == r.fields.len() {
              fields
            } else {
              let d = codes::RECORD_FIELD_COUNT
                .at(span)
                .with_detail("Expected", fields.len().to_string())
                .with_detail("Actual", r.fields.len().to_string());
              self.report(d);
              vec![unknown; r.fields.len()]
            }
          }
          None => vec![unknown; r.fields.len()],
        };
        for (field, field_ty) in r.fields.iter().zip(fields) {
          self.match_pattern(field, field_ty, env, out);
        }
      }
      Pattern::Set(s) => {
        let elem = self.pattern_set_elem(span, ty);
        for item in &s.items {
          self.match_pattern(item, elem, env, out);
        }
      }
      Pattern::SetUnion(u) => {
        self.pattern_set_elem(span, ty);
        self.match_union(u, ty, env, out);
      }
      Pattern::Seq(s) => {
        let elem = self.pattern_seq_elem(span, ty);
        for item in &s.items {
          self.match_pattern(item, elem, env, out);
        }
      }
      Pattern::SeqConcat(u) => {
        self.pattern_seq_elem(span, ty);
        self.match_union(u, ty, env, out);
      }
      Pattern::Map(m) => {
        let (dom, rng) = self.pattern_map_parts(span, ty);
        for maplet in &m.maplets {
          self.match_pattern(&maplet.stx.from, dom, env, out);
          self.match_pattern(&maplet.stx.to, rng, env, out);
        }
      }
      Pattern::MapUnion(u) => {
        self.pattern_map_parts(span, ty);
        self.match_union(u, ty, env, out);
      }
      Pattern::Object(o) => {
        let Some(class) = self.table.find_class(&o.class) else {
          self.report(codes::UNKNOWN_CLASS.at(span).with_detail("Name", o.class.clone()));
          for field in &o.fields {
            self.match_pattern(&field.stx.pattern, unknown, env, out);
          }
          return;
        };
        let class_ty = self.table.get(class).ty();
        self.check_pattern_type(span, ty, class_ty);
        for field in &o.fields {
          let lookup = Name::explicit(o.class.clone(), field.stx.field.clone());
          let member = self
            .global
            .find_name(&self.table, &lookup, NameScope::NAMESANDSTATE);
          let field_ty = match member {
            Some(member) => self.table.ty(member),
            None => {
              let d = codes::UNKNOWN_FIELD
                .at(self.span(field.loc))
                .with_detail("Field", field.stx.field.clone());
              self.report(d);
              unknown
            }
          };
          self.match_pattern(&field.stx.pattern, field_ty, env, out);
        }
      }
    }
  }

  fn match_union(
    &mut self,
    u: &'a UnionPattern,
    ty: TypeId,
    env: &Rc<Env>,
    out: &mut Vec<Binding<'a>>,
  ) {
    self.match_pattern(&u.left, ty, env, out);
    self.match_pattern(&u.right, ty, env, out);
  }

  fn pattern_set_elem(&mut self, span: Span, ty: TypeId) -> TypeId {
    match self.store.as_set(ty) {
      Some(set) => set.elem,
      None => {
        self.pattern_mismatch(span, ty, "set");
        self.unknown()
      }
    }
  }

  fn pattern_seq_elem(&mut self, span: Span, ty: TypeId) -> TypeId {
    match self.store.as_seq(ty) {
      Some(seq) => seq.elem,
      None => {
        self.pattern_mismatch(span, ty, "seq");
        self.unknown()
      }
    }
  }

  fn pattern_map_parts(&mut self, span: Span, ty: TypeId) -> (TypeId, TypeId) {
    match self.store.as_map(ty) {
      Some(map) => (map.dom, map.rng),
      None => {
        self.pattern_mismatch(span, ty, "map");
        (self.unknown(), self.unknown())
      }
    }
  }

  fn pattern_mismatch(&mut self, span: Span, ty: TypeId, shape: &str) {
    let d = codes::PATTERN_TYPE
      .at(span)
      .with_detail("Expected", self.display(ty))
      .with_detail("Actual", shape.to_string());
    self.report(d);
  }

  /// A pattern of type `pattern_ty` can only match a value of type `ty` if
  /// such a value may have the pattern's type.
  fn check_pattern_type(&mut self, span: Span, ty: TypeId, pattern_ty: TypeId) {
    if !self.compatible(pattern_ty, ty) {
      let d = codes::PATTERN_TYPE
        .at(span)
        .with_detail("Expected", self.display(ty))
        .with_detail("Actual", self.display(pattern_ty));
      self.report(d);
    }
  }

  /// Matches `pattern` against `ty` and binds its names as locals.
  pub(crate) fn bind_pattern(
    &mut self,
    pattern: &'a Node<Pattern>,
    ty: TypeId,
    env: &Rc<Env>,
    role: LocalRole,
  ) -> Vec<DefId> {
    let mut bindings = Vec::new();
    self.match_pattern(pattern, ty, env, &mut bindings);
    bindings
      .into_iter()
      .map(|(name, loc, ty)| self.local(env, name, loc, role, ty))
      .collect()
  }

  /// The type of the values a bind ranges over.
  pub(crate) fn bind_source(
    &mut self,
    source: &'a BindSource,
    env: &Rc<Env>,
    scope: NameScope,
  ) -> TypeId {
    match source {
      BindSource::Set(set) => {
        let set_ty = self.expr(set, env, scope, None);
        match self.store.as_set(set_ty) {
          Some(s) => s.elem,
          None => {
            let d = codes::BIND_NOT_SET
              .at(self.span(set.loc))
              .with_detail("Actual", self.display(set_ty));
            self.report(d);
            self.unknown()
          }
        }
      }
      BindSource::Seq(seq) => {
        let seq_ty = self.expr(seq, env, scope, None);
        match self.store.as_seq(seq_ty) {
          Some(s) => s.elem,
          None => {
            let d = codes::BIND_NOT_SEQ
              .at(self.span(seq.loc))
              .with_detail("Actual", self.display(seq_ty));
            self.report(d);
            self.unknown()
          }
        }
      }
      BindSource::Type(ty) => self.resolve_type(ty, env),
    }
  }

  /// Binds every pattern of every bind. All sources are evaluated in the
  /// outer environment.
  pub(crate) fn bind_multiple(
    &mut self,
    binds: &'a [Node<MultipleBind>],
    env: &Rc<Env>,
    scope: NameScope,
    role: LocalRole,
  ) -> Vec<DefId> {
    let sources: Vec<TypeId> = binds
      .iter()
      .map(|b| self.bind_source(&b.stx.source, env, scope))
      .collect();
    let mut defs = Vec::new();
    for (bind, elem) in binds.iter().zip(sources) {
      for pattern in &bind.stx.patterns {
        defs.extend(self.bind_pattern(pattern, elem, env, role));
      }
    }
    defs
  }

  /// Binds a single bind, returning its names and the element type.
  pub(crate) fn bind_single(
    &mut self,
    bind: &'a Node<Bind>,
    env: &Rc<Env>,
    scope: NameScope,
    role: LocalRole,
  ) -> (Vec<DefId>, TypeId) {
    let elem = self.bind_source(&bind.stx.source, env, scope);
    let defs = self.bind_pattern(&bind.stx.pattern, elem, env, role);
    (defs, elem)
  }
}

#[cfg(test)]
mod tests {
  use super::pattern_names;
  use syntax_vdm::ast::pat::Pattern;
  use syntax_vdm::ast::pat::TuplePattern;
  use syntax_vdm::build::Builder;

  #[test]
  fn names_come_out_in_order() {
    let b = Builder::new();
    let tuple = b.node(Pattern::Tuple(TuplePattern {
      items: vec![b.pid("a"), b.pignore(), b.pid("b")],
    }));
    let names: Vec<&str> = pattern_names(&tuple).into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["a", "b"]);
  }
}
