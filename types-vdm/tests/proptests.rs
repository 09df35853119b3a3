use proptest::prelude::*;
use types_vdm::FunctionType;
use types_vdm::RelateCtx;
use types_vdm::TypeId;
use types_vdm::TypeStore;

/// A type description that can be interned into any store.
#[derive(Clone, Debug)]
enum Shape {
  Bool,
  Nat,
  Int,
  Real,
  Char,
  Token,
  Quote(u8),
  Set(Box<Shape>),
  Seq(Box<Shape>),
  Map(Box<Shape>, Box<Shape>),
  Product(Vec<Shape>),
  Union(Vec<Shape>),
  Optional(Box<Shape>),
  Function(Vec<Shape>, Box<Shape>),
}

fn arb_leaf() -> impl Strategy<Value = Shape> {
  prop_oneof![
    Just(Shape::Bool),
    Just(Shape::Nat),
    Just(Shape::Int),
    Just(Shape::Real),
    Just(Shape::Char),
    Just(Shape::Token),
    (0u8..4).prop_map(Shape::Quote),
  ]
}

fn arb_shape(depth: u32) -> impl Strategy<Value = Shape> {
  arb_leaf().prop_recursive(depth, 24, 4, |inner| {
    prop_oneof![
      inner.clone().prop_map(|s| Shape::Set(Box::new(s))),
      inner.clone().prop_map(|s| Shape::Seq(Box::new(s))),
      (inner.clone(), inner.clone()).prop_map(|(d, r)| Shape::Map(Box::new(d), Box::new(r))),
      prop::collection::vec(inner.clone(), 2..4).prop_map(Shape::Product),
      prop::collection::vec(inner.clone(), 2..4).prop_map(Shape::Union),
      inner.clone().prop_map(|s| Shape::Optional(Box::new(s))),
      (prop::collection::vec(inner.clone(), 0..3), inner)
        .prop_map(|(p, r)| Shape::Function(p, Box::new(r))),
    ]
  })
}

fn intern(store: &mut TypeStore, shape: &Shape) -> TypeId {
  match shape {
    Shape::Bool => store.bool(),
    Shape::Nat => store.nat(),
    Shape::Int => store.int(),
    Shape::Real => store.real(),
    Shape::Char => store.char(),
    Shape::Token => store.token(),
    Shape::Quote(q) => store.quote(format!("Q{q}")),
    Shape::Set(e) => {
      let e = intern(store, e);
      store.set(e)
    }
    Shape::Seq(e) => {
      let e = intern(store, e);
      store.seq(e)
    }
    Shape::Map(d, r) => {
      let d = intern(store, d);
      let r = intern(store, r);
      store.map(d, r)
    }
    Shape::Product(members) => {
      let members = members.iter().map(|m| intern(store, m)).collect();
      store.product(members)
    }
    Shape::Union(members) => {
      let members = members.iter().map(|m| intern(store, m)).collect();
      store.union(members)
    }
    Shape::Optional(inner) => {
      let inner = intern(store, inner);
      store.optional(inner)
    }
    Shape::Function(params, result) => {
      let params = params.iter().map(|p| intern(store, p)).collect();
      let result = intern(store, result);
      store.function(FunctionType::new(params, result))
    }
  }
}

proptest! {
  #[test]
  fn compatible_is_reflexive(shape in arb_shape(3)) {
    let mut store = TypeStore::new();
    let t = intern(&mut store, &shape);
    let ctx = RelateCtx::new(&store);
    prop_assert!(ctx.compatible(t, t));
    prop_assert!(ctx.is_sub_type(t, t, true));
  }

  #[test]
  fn union_of_compatible_members_is_compatible(
    expected in arb_shape(2),
    members in prop::collection::vec(arb_shape(2), 1..4),
  ) {
    let mut store = TypeStore::new();
    let e = intern(&mut store, &expected);
    let ms: Vec<TypeId> = members.iter().map(|m| intern(&mut store, m)).collect();
    let u = store.union(ms.clone());
    let ctx = RelateCtx::new(&store);
    if ms.iter().all(|m| ctx.compatible(e, *m)) {
      prop_assert!(ctx.compatible(e, u));
    }
  }

  #[test]
  fn empty_containers_fit_any_element_type(elem in arb_shape(3)) {
    let mut store = TypeStore::new();
    let e = intern(&mut store, &elem);
    let set = store.set(e);
    let seq = store.seq(e);
    let map = store.map(e, e);
    let empty_set = store.empty_set();
    let empty_seq = store.empty_seq();
    let empty_map = store.empty_map();
    let ctx = RelateCtx::new(&store);
    prop_assert!(ctx.compatible(set, empty_set));
    prop_assert!(ctx.compatible(seq, empty_seq));
    prop_assert!(ctx.compatible(map, empty_map));
  }

  #[test]
  fn subtype_implies_compatible(a in arb_shape(2), b in arb_shape(2)) {
    let mut store = TypeStore::new();
    let ta = intern(&mut store, &a);
    let tb = intern(&mut store, &b);
    let ctx = RelateCtx::new(&store);
    if ctx.is_sub_type(ta, tb, false) {
      prop_assert!(ctx.compatible(tb, ta));
    }
  }

  #[test]
  fn intersection_is_a_subtype_of_both(a in arb_shape(2), b in arb_shape(2)) {
    let mut store = TypeStore::new();
    let ta = intern(&mut store, &a);
    let tb = intern(&mut store, &b);
    if let Some(i) = store.intersect(ta, tb) {
      let ctx = RelateCtx::new(&store);
      prop_assert!(ctx.is_sub_type(i, ta, false));
      prop_assert!(ctx.is_sub_type(i, tb, false));
    }
  }
}
