use syntax_vdm::ast::decl::Visibility;
use types_vdm::*;

#[test]
fn numerics_are_mutually_compatible_but_ranked_as_subtypes() {
  let store = TypeStore::new();
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(store.nat(), store.real()));
  assert!(ctx.compatible(store.real(), store.nat1()));
  assert!(ctx.is_sub_type(store.nat1(), store.nat(), false));
  assert!(ctx.is_sub_type(store.nat(), store.real(), false));
  assert!(!ctx.is_sub_type(store.int(), store.nat(), false));
  assert!(!ctx.compatible(store.nat(), store.bool()));
}

#[test]
fn unknown_relates_to_everything() {
  let mut store = TypeStore::new();
  let seq = store.seq(store.nat());
  let ctx = RelateCtx::new(&store);
  assert!(ctx.compatible(seq, store.unknown()));
  assert!(ctx.compatible(store.unknown(), seq));
  assert!(ctx.is_sub_type(store.unknown(), seq, true));
}

#[test]
fn unions_on_either_side() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let b = store.bool();
  let c = store.char();
  let nat_or_bool = store.union(vec![nat, b]);
  let bool_or_char = store.union(vec![b, c]);
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(nat_or_bool, nat));
  assert!(ctx.compatible(nat, nat_or_bool));
  assert!(ctx.compatible(nat_or_bool, bool_or_char));
  assert!(!ctx.compatible(c, nat));

  // Subtyping needs every member of the sub union.
  assert!(!ctx.is_sub_type(nat_or_bool, nat, false));
  assert!(ctx.is_sub_type(nat, nat_or_bool, false));
}

#[test]
fn nil_and_optionals() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let opt = store.optional(nat);
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(opt, store.nil()));
  assert!(ctx.compatible(opt, nat));
  assert!(!ctx.compatible(nat, store.nil()));
  assert!(ctx.compatible(nat, opt));
  assert!(ctx.is_sub_type(nat, opt, false));
  assert!(!ctx.is_sub_type(opt, nat, false));
}

#[test]
fn empty_containers() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let set_nat = store.set(nat);
  let set1_nat = store.set1(nat);
  let empty = store.empty_set();
  let seq1_char = store.seq1(store.char());
  let empty_seq = store.empty_seq();
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(set_nat, empty));
  assert!(ctx.is_sub_type(empty, set_nat, false));
  assert!(!ctx.is_sub_type(empty, set1_nat, false));
  assert!(ctx.is_sub_type(set1_nat, set_nat, false));
  assert!(!ctx.is_sub_type(set_nat, set1_nat, false));
  assert!(ctx.compatible(seq1_char, empty_seq));
}

#[test]
fn maps_and_injectivity() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let c = store.char();
  let m = store.map(nat, c);
  let im = store.inmap(nat, c);
  let empty = store.empty_map();
  let ctx = RelateCtx::new(&store);

  assert!(ctx.is_sub_type(im, m, false));
  assert!(!ctx.is_sub_type(m, im, false));
  assert!(ctx.compatible(im, m));
  assert!(ctx.compatible(m, empty));
  assert!(ctx.is_sub_type(empty, im, false));
}

#[test]
fn functions_compare_params_and_results() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let b = store.bool();
  let c = store.char();
  let f1 = store.function(FunctionType::new(vec![nat], b));
  let f2 = store.function(FunctionType::new(vec![nat], c));
  let f3 = store.function(FunctionType::new(vec![nat, nat], b));
  let total = store.function(FunctionType::new(vec![nat], b).total());
  let ctx = RelateCtx::new(&store);

  assert!(!ctx.compatible(f1, f2));
  assert!(ctx.compatible_params_only(f1, f2));
  assert!(!ctx.compatible_params_only(f1, f3));
  assert!(ctx.is_sub_type(total, f1, false));
  assert!(!ctx.is_sub_type(f1, total, false));
}

#[test]
fn records_are_nominal() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let a = store.declare_named(TypeName::new("M", "A"), true, Visibility::Public);
  let b = store.declare_named(TypeName::new("M", "B"), true, Visibility::Public);
  for id in [a, b] {
    store.define_record(
      id,
      vec![RecordField {
        tag: "x".into(),
        ty: nat,
        equality_abstraction: false,
      }],
    );
  }
  let ta = store.named_type(a);
  let tb = store.named_type(b);
  let ctx = RelateCtx::new(&store);
  assert!(ctx.compatible(ta, ta));
  assert!(!ctx.compatible(ta, tb));
}

#[test]
fn named_types_with_invariants_under_strict_subtyping() {
  let mut store = TypeStore::new();
  let nat = store.nat();
  let even = store.declare_named(TypeName::new("M", "Even"), false, Visibility::Public);
  store.define_named(even, nat);
  store.named_mut(even).has_inv = true;
  let te = store.named_type(even);
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(te, nat));
  assert!(ctx.is_sub_type(nat, te, false));
  assert!(!ctx.is_sub_type(nat, te, true));
  assert!(ctx.is_sub_type(te, nat, true));
}

#[test]
fn classes_follow_inheritance() {
  let mut store = TypeStore::new();
  let base = store.declare_class("Base");
  let derived = store.declare_class("Derived");
  store.set_supers(derived, vec![base]);
  let tb = store.class_type(base);
  let td = store.class_type(derived);
  let ctx = RelateCtx::new(&store);

  assert!(ctx.compatible(tb, td));
  assert!(!ctx.compatible(td, tb));
  assert!(ctx.is_sub_type(td, tb, false));
}
