use super::Checker;
use crate::codes;
use crate::env::Env;
use crate::name::NameScope;
use ahash::AHashSet;
use diagnostics::Span;
use std::rc::Rc;
use syntax_vdm::ast::expr::BinaryExpr;
use syntax_vdm::ast::expr::UnaryExpr;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::ast::op::UnaryOp;
use syntax_vdm::loc::Loc;
use types_vdm::FunctionType;
use types_vdm::MapType;
use types_vdm::NamedSlot;
use types_vdm::NumericKind;
use types_vdm::SeqType;
use types_vdm::SetType;
use types_vdm::TypeId;
use types_vdm::TypeKind;

impl<'a> Checker<'a> {
  pub(crate) fn unary(
    &mut self,
    u: &'a UnaryExpr,
    env: &Rc<Env>,
    scope: NameScope,
  ) -> TypeId {
    let op = u.op.symbol();
    let loc = u.operand.loc;
    let operand = self.expr(&u.operand, env, scope, None);
    let unknown = self.unknown();
    match u.op {
      UnaryOp::Plus | UnaryOp::Minus | UnaryOp::Abs | UnaryOp::Floor => {
        let Some(kind) = self.numeric(op, loc, operand) else {
          return unknown;
        };
        let kind = match u.op {
          UnaryOp::Minus => kind.max(NumericKind::Int),
          UnaryOp::Abs if kind == NumericKind::Int => NumericKind::Nat,
          UnaryOp::Floor => kind.min(NumericKind::Int),
          _ => kind,
        };
        self.store.numeric(kind)
      }
      UnaryOp::Not => {
        self.boolean(op, loc, operand);
        self.store.bool()
      }
      UnaryOp::Card => {
        self.set_operand(op, loc, operand);
        self.store.nat()
      }
      UnaryOp::Power => match self.set_operand(op, loc, operand) {
        Some(set) => {
          let inner = self.store.set(set.elem);
          self.store.set1(inner)
        }
        None => unknown,
      },
      UnaryOp::DistUnion | UnaryOp::DistInter => {
        let Some(outer) = self.set_operand(op, loc, operand) else {
          return unknown;
        };
        match self.set_operand(op, loc, outer.elem) {
          Some(inner) => self.store.set(inner.elem),
          None => unknown,
        }
      }
      UnaryOp::Head => match self.seq_operand(op, loc, operand) {
        Some(seq) => seq.elem,
        None => unknown,
      },
      UnaryOp::Tail | UnaryOp::Reverse => match self.seq_operand(op, loc, operand) {
        Some(seq) => self.store.seq(seq.elem),
        None => unknown,
      },
      UnaryOp::Len => {
        self.seq_operand(op, loc, operand);
        self.store.nat()
      }
      UnaryOp::Elems => match self.seq_operand(op, loc, operand) {
        Some(seq) => self.store.set(seq.elem),
        None => unknown,
      },
      UnaryOp::Inds => {
        self.seq_operand(op, loc, operand);
        let nat1 = self.store.nat1();
        self.store.set(nat1)
      }
      UnaryOp::DistConc => {
        let Some(outer) = self.seq_operand(op, loc, operand) else {
          return unknown;
        };
        match self.seq_operand(op, loc, outer.elem) {
          Some(inner) => self.store.seq(inner.elem),
          None => unknown,
        }
      }
      UnaryOp::Dom => match self.map_operand(op, loc, operand) {
        Some(map) => self.store.set(map.dom),
        None => unknown,
      },
      UnaryOp::Rng => match self.map_operand(op, loc, operand) {
        Some(map) => self.store.set(map.rng),
        None => unknown,
      },
      UnaryOp::DistMerge => {
        let Some(set) = self.set_operand(op, loc, operand) else {
          return unknown;
        };
        match self.map_operand(op, loc, set.elem) {
          Some(map) => self.store.map(map.dom, map.rng),
          None => unknown,
        }
      }
      UnaryOp::MapInverse => match self.map_operand(op, loc, operand) {
        Some(map) => self.store.inmap(map.rng, map.dom),
        None => unknown,
      },
    }
  }

  pub(crate) fn binary(
    &mut self,
    span: Span,
    b: &'a BinaryExpr,
    env: &Rc<Env>,
    scope: NameScope,
  ) -> TypeId {
    let op = b.op.symbol();
    let (l, r) = (b.left.loc, b.right.loc);
    let left = self.expr(&b.left, env, scope, None);
    let right = match b.op {
      BinaryOp::And | BinaryOp::Implies => {
        let narrowed = self.narrowed(&b.left, env);
        self.expr(&b.right, &narrowed, scope, Some(left))
      }
      _ => self.expr(&b.right, env, scope, Some(left)),
    };
    let unknown = self.unknown();
    let bool_ty = self.store.bool();
    match b.op {
      BinaryOp::Add
      | BinaryOp::Sub
      | BinaryOp::Mul
      | BinaryOp::Div
      | BinaryOp::IntDiv
      | BinaryOp::Rem
      | BinaryOp::Mod => {
        let lk = self.numeric(op, l, left);
        let rk = self.numeric(op, r, right);
        let (Some(lk), Some(rk)) = (lk, rk) else {
          return unknown;
        };
        let (low, high) = (lk.min(rk), lk.max(rk));
        let kind = match b.op {
          BinaryOp::Add if high <= NumericKind::Nat && low == NumericKind::Nat1 => {
            NumericKind::Nat1
          }
          BinaryOp::Add | BinaryOp::Mul => high,
          BinaryOp::Sub => high.max(NumericKind::Int),
          BinaryOp::Div => NumericKind::Real,
          _ if high <= NumericKind::Nat => NumericKind::Nat,
          _ => NumericKind::Int,
        };
        self.store.numeric(kind)
      }
      BinaryOp::StarStar => self.star_star(op, l, left, r, right),
      BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
        for (loc, ty) in [(l, left), (r, right)] {
          if !self.store.is_numeric(ty) && !self.has_named(ty, |slot| slot.has_ord) {
            self.report_operand(codes::EXPECTED_NUMERIC, op, loc, ty);
          }
        }
        bool_ty
      }
      BinaryOp::And | BinaryOp::Or | BinaryOp::Implies | BinaryOp::Equiv => {
        self.boolean(op, l, left);
        self.boolean(op, r, right);
        bool_ty
      }
      BinaryOp::Eq | BinaryOp::Ne => {
        if !self.compatible(left, right) && !self.compatible(right, left) {
          let d = codes::INCOMPATIBLE_OPERANDS
            .at(span)
            .with_detail("Left", self.display(left))
            .with_detail("Right", self.display(right));
          self.report(d);
        }
        self.check_equality_abstractions(span, left, right);
        bool_ty
      }
      BinaryOp::InSet | BinaryOp::NotInSet => {
        if let Some(set) = self.set_operand(op, r, right) {
          if !self.compatible(set.elem, left) && !set.empty {
            let d = codes::INCOMPATIBLE_OPERANDS
              .at(span)
              .with_detail("Left", self.display(left))
              .with_detail("Right", self.display(right));
            self.report(d);
          }
        }
        bool_ty
      }
      BinaryOp::Subset | BinaryOp::ProperSubset => {
        self.set_operand(op, l, left);
        self.set_operand(op, r, right);
        bool_ty
      }
      BinaryOp::Union | BinaryOp::Inter | BinaryOp::Difference => {
        let ls = self.set_operand(op, l, left);
        let rs = self.set_operand(op, r, right);
        let (Some(ls), Some(rs)) = (ls, rs) else {
          return unknown;
        };
        match b.op {
          BinaryOp::Union => self.merge_sets(ls, rs),
          BinaryOp::Difference => left,
          _ => {
            if ls.empty || rs.empty {
              return self.store.empty_set();
            }
            match self.store.intersect(ls.elem, rs.elem) {
              Some(elem) => self.store.set(elem),
              None => {
                let d = codes::EMPTY_INTERSECTION
                  .at(span)
                  .with_detail("Left", self.display(left))
                  .with_detail("Right", self.display(right));
                self.report(d);
                unknown
              }
            }
          }
        }
      }
      BinaryOp::Concat => {
        let ls = self.seq_operand(op, l, left);
        let rs = self.seq_operand(op, r, right);
        match (ls, rs) {
          (Some(ls), Some(rs)) => self.merge_seqs(ls, rs),
          _ => unknown,
        }
      }
      BinaryOp::PlusPlus => {
        if self.store.as_seq(left).is_some() && !self.store.is_unknown(left) {
          let nat1 = self.store.nat1();
          if let Some(map) = self.map_operand(op, r, right) {
            if !self.compatible(nat1, map.dom) {
              let d = codes::INDEX_TYPE
                .at(self.span(r))
                .with_detail("Expected", self.display(nat1))
                .with_detail("Actual", self.display(map.dom));
              self.report(d);
            }
          }
          return left;
        }
        let lm = self.map_operand(op, l, left);
        let rm = self.map_operand(op, r, right);
        match (lm, rm) {
          (Some(lm), Some(rm)) => self.merge_maps(lm, rm),
          _ => unknown,
        }
      }
      BinaryOp::MapUnion => {
        let lm = self.map_operand(op, l, left);
        let rm = self.map_operand(op, r, right);
        match (lm, rm) {
          (Some(lm), Some(rm)) => self.merge_maps(lm, rm),
          _ => unknown,
        }
      }
      BinaryOp::DomRestrictTo | BinaryOp::DomRestrictBy => {
        self.set_operand(op, l, left);
        match self.map_operand(op, r, right) {
          Some(_) => right,
          None => unknown,
        }
      }
      BinaryOp::RngRestrictTo | BinaryOp::RngRestrictBy => {
        self.set_operand(op, r, right);
        match self.map_operand(op, l, left) {
          Some(_) => left,
          None => unknown,
        }
      }
      BinaryOp::Comp => self.compose(op, span, l, left, r, right),
    }
  }

  fn star_star(&mut self, op: &str, l: Loc, left: TypeId, r: Loc, right: TypeId) -> TypeId {
    let unknown = self.unknown();
    if self.store.is_unknown(left) {
      self.numeric(op, r, right);
      return unknown;
    }
    if !self.store.is_numeric(left) && (self.store.is_map(left) || self.store.is_function(left)) {
      self.numeric(op, r, right);
      return left;
    }
    let lk = self.numeric(op, l, left);
    let rk = self.numeric(op, r, right);
    match (lk, rk) {
      (Some(lk), Some(rk)) => self.store.numeric(lk.max(rk)),
      _ => unknown,
    }
  }

  fn compose(&mut self, op: &str, span: Span, l: Loc, left: TypeId, r: Loc, right: TypeId) -> TypeId {
    let unknown = self.unknown();
    if self.store.is_unknown(left) || self.store.is_unknown(right) {
      return unknown;
    }
    if let (Some(f), Some(g)) = (self.store.as_function(left), self.store.as_function(right)) {
      if let [param] = f.params[..] {
        if !self.compatible(param, g.result) {
          let d = codes::INCOMPATIBLE_OPERANDS
            .at(span)
            .with_detail("Left", self.display(left))
            .with_detail("Right", self.display(right));
          self.report(d);
        }
      }
      let composed = FunctionType {
        partial: f.partial || g.partial,
        ..FunctionType::new(g.params, f.result)
      };
      return self.store.function(composed);
    }
    let lm = self.map_operand(op, l, left);
    let rm = self.map_operand(op, r, right);
    match (lm, rm) {
      (Some(outer), Some(inner)) => {
        if !self.compatible(outer.dom, inner.rng) {
          let d = codes::INCOMPATIBLE_OPERANDS
            .at(span)
            .with_detail("Left", self.display(left))
            .with_detail("Right", self.display(right));
          self.report(d);
        }
        self.store.map(inner.dom, outer.rng)
      }
      _ => unknown,
    }
  }

  fn merge_sets(&mut self, a: SetType, b: SetType) -> TypeId {
    match (a.empty, b.empty) {
      (true, true) => self.store.empty_set(),
      (true, false) => self.store.set(b.elem),
      (false, true) => self.store.set(a.elem),
      (false, false) => {
        let elem = self.store.union(vec![a.elem, b.elem]);
        self.store.set(elem)
      }
    }
  }

  fn merge_seqs(&mut self, a: SeqType, b: SeqType) -> TypeId {
    let elems = [a, b].iter().filter(|s| !s.empty).map(|s| s.elem).collect::<Vec<_>>();
    if elems.is_empty() {
      return self.store.empty_seq();
    }
    let elem = self.store.union(elems);
    if a.non_empty || b.non_empty {
      self.store.seq1(elem)
    } else {
      self.store.seq(elem)
    }
  }

  fn merge_maps(&mut self, a: MapType, b: MapType) -> TypeId {
    let live: Vec<MapType> = [a, b].into_iter().filter(|m| !m.empty).collect();
    if live.is_empty() {
      return self.store.empty_map();
    }
    let dom = self.store.union(live.iter().map(|m| m.dom).collect());
    let rng = self.store.union(live.iter().map(|m| m.rng).collect());
    self.store.map(dom, rng)
  }

  fn report_operand(&mut self, code: codes::Code, op: &str, loc: Loc, ty: TypeId) {
    let d = code
      .at(self.span(loc))
      .with_detail("Operator", op.to_string())
      .with_detail("Actual", self.display(ty));
    self.report(d);
  }

  /// The numeric kind of an operand, reporting non-numeric ones. Unknown
  /// operands give `None` without a report.
  fn numeric(&mut self, op: &str, loc: Loc, ty: TypeId) -> Option<NumericKind> {
    if !self.store.is_numeric(ty) {
      self.report_operand(codes::EXPECTED_NUMERIC, op, loc, ty);
      return None;
    }
    self.store.numeric_kind(ty)
  }

  fn boolean(&mut self, op: &str, loc: Loc, ty: TypeId) {
    if !self.store.is_bool(ty) {
      self.report_operand(codes::EXPECTED_BOOLEAN, op, loc, ty);
    }
  }

  fn set_operand(&mut self, op: &str, loc: Loc, ty: TypeId) -> Option<SetType> {
    let set = self.store.as_set(ty);
    if set.is_none() {
      self.report_operand(codes::EXPECTED_SET, op, loc, ty);
    }
    set
  }

  fn seq_operand(&mut self, op: &str, loc: Loc, ty: TypeId) -> Option<SeqType> {
    let seq = self.store.as_seq(ty);
    if seq.is_none() {
      self.report_operand(codes::EXPECTED_SEQ, op, loc, ty);
    }
    seq
  }

  fn map_operand(&mut self, op: &str, loc: Loc, ty: TypeId) -> Option<MapType> {
    let map = self.store.as_map(ty);
    if map.is_none() {
      self.report_operand(codes::EXPECTED_MAP, op, loc, ty);
    }
    map
  }

  /// Named and record types reachable from `ty` through unions and
  /// optionals, without looking inside them.
  fn named_members(&self, ty: TypeId) -> Vec<&NamedSlot> {
    let mut out = Vec::new();
    let mut seen = AHashSet::new();
    let mut stack = vec![ty];
    while let Some(current) = stack.pop() {
      if !seen.insert(current) {
        continue;
      }
      match self.store.get(current) {
        TypeKind::Named(n) => {
          let slot = self.store.named(*n);
          out.push(slot);
          if let Some(underlying) = slot.underlying {
            stack.push(underlying);
          }
        }
        TypeKind::Record(n) => out.push(self.store.named(*n)),
        TypeKind::Union(members) => stack.extend(members.iter().copied()),
        TypeKind::Optional(inner) => stack.push(*inner),
        _ => {}
      }
    }
    out
  }

  fn has_named(&self, ty: TypeId, f: impl Fn(&NamedSlot) -> bool) -> bool {
    self.named_members(ty).into_iter().any(f)
  }

  /// `=` over values whose types define equality in different ways cannot
  /// pick one definition.
  fn check_equality_abstractions(&mut self, span: Span, left: TypeId, right: TypeId) {
    let mut with_eq: Vec<String> = self
      .named_members(left)
      .into_iter()
      .chain(self.named_members(right))
      .filter(|slot| slot.has_eq)
      .map(|slot| slot.name.name.clone())
      .collect();
    with_eq.sort();
    with_eq.dedup();
    if with_eq.len() > 1 {
      let d = codes::AMBIGUOUS_EQUALITY
        .at(span)
        .with_detail("Types", with_eq.join(", "));
      self.report(d);
    }
  }
}
