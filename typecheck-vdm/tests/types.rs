mod common;

use common::assert_no_errors;
use common::check_pp;
use common::check_sl;
use common::count;
use common::flat_program;
use common::with_code;
use proptest::prelude::*;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::TypeInvariant;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::build::Builder;
use typecheck_vdm::codes;

#[test]
fn public_members_cannot_expose_private_types() {
  let b = Builder::new();
  let hidden = b.type_alias("Hidden", b.t_nat());
  let mut f = b.function("f", b.t_fn(vec![b.t_named("Hidden")], b.t_nat()), &["h"], b.nat(0));
  f.access = Access::public();
  let mut rec = b.record("Rec", vec![("h", b.t_named("Hidden"))]);
  rec.access = Access::public();
  let g = b.function("g", b.t_fn(vec![b.t_named("Hidden")], b.t_nat()), &["h"], b.nat(0));
  let program = b.program(vec![b.class("A", &[], vec![
    b.decl(Decl::Type(hidden)),
    b.decl(Decl::ExplicitFunction(f)),
    b.decl(Decl::Type(rec)),
    b.decl(Decl::ExplicitFunction(g)),
  ])]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::TYPE_LESS_VISIBLE);
  let mut names: Vec<_> = reported.iter().filter_map(|d| d.detail("Name")).collect();
  names.sort();
  assert_eq!(names, vec!["Rec", "f"], "{:#?}", result.diagnostics);
}

#[test]
fn forward_type_reference_resolves() {
  let b = Builder::new();
  let earlier = b.type_alias("A", b.t_seq(b.t_named("B")));
  let later = b.record("B", vec![("x", b.t_nat())]);
  let value = b.value("v", Some(b.t_named("A")), b.seq_enum(vec![b.mk("B", vec![b.nat(1)])]));
  let program = flat_program(&b, vec![
    b.decl(Decl::Type(earlier)),
    b.decl(Decl::Type(later)),
    b.decl(Decl::Value(value)),
  ]);
  let result = check_sl(&program);
  assert_no_errors(&result);
}

#[test]
fn missing_type_is_undefined() {
  let b = Builder::new();
  let missing = b.t_named("Missing");
  let missing_loc = missing.loc;
  let alias = b.type_alias("A", b.t_set(missing));
  let program = flat_program(&b, vec![b.decl(Decl::Type(alias))]);
  let result = check_sl(&program);

  let reported = with_code(&result, codes::UNDEFINED_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(
    reported[0].primary.range,
    diagnostics::TextRange::from(missing_loc)
  );
}

#[test]
fn type_invariant_is_synthesised_and_checked() {
  let b = Builder::new();
  let mut even = b.type_alias("Even", b.t_nat());
  even.inv = Some(b.node(TypeInvariant {
    pattern: b.pid("n"),
    predicate: b.binary(
      BinaryOp::Eq,
      b.binary(BinaryOp::Mod, b.var("n"), b.nat(2)),
      b.nat(0),
    ),
  }));
  let program = flat_program(&b, vec![b.decl(Decl::Type(even))]);
  let result = check_sl(&program);
  assert_no_errors(&result);
  let inv = result.find_definition("DEFAULT", "inv_Even").expect("invariant function");
  let ty = result.defs.ty(inv);
  let func = result.store.get(result.store.deref(ty));
  assert!(matches!(func, types_vdm::TypeKind::Function(f) if f.params.len() == 1));
}

#[test]
fn non_boolean_invariant_is_reported() {
  let b = Builder::new();
  let mut t = b.type_alias("T", b.t_nat());
  t.inv = Some(b.node(TypeInvariant {
    pattern: b.pid("n"),
    predicate: b.var("n"),
  }));
  let program = flat_program(&b, vec![b.decl(Decl::Type(t))]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::PREDICATE_NOT_BOOLEAN), 1, "{:#?}", result.diagnostics);
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(32))]

  /// A chain of aliases `T0 = T1, T1 = T2, ..., Tn = nat` resolves whatever
  /// order the definitions come in.
  #[test]
  fn alias_chains_resolve_in_any_order(order in (1usize..8).prop_flat_map(|n| Just((0..n).collect::<Vec<_>>()).prop_shuffle())) {
    let b = Builder::new();
    let n = order.len();
    let decls = order
      .iter()
      .map(|i| {
        let target = if i + 1 == n { b.t_nat() } else { b.t_named(&format!("T{}", i + 1)) };
        b.decl(Decl::Type(b.type_alias(&format!("T{i}"), target)))
      })
      .collect();
    let program = flat_program(&b, decls);
    let result = check_sl(&program);
    prop_assert_eq!(result.errors().count(), 0);
    let first = result.find_definition("DEFAULT", "T0").expect("first alias");
    prop_assert!(result.store.is_numeric(result.defs.ty(first)));
  }

  /// Every reference to an undeclared name is reported exactly once.
  #[test]
  fn each_undefined_reference_is_reported_once(missing in 2usize..6) {
    let b = Builder::new();
    let members = (0..missing).map(|i| b.t_named(&format!("Missing{i}"))).collect();
    let alias = b.type_alias("A", b.t_product(members));
    let program = flat_program(&b, vec![b.decl(Decl::Type(alias))]);
    let result = check_sl(&program);
    prop_assert_eq!(count(&result, codes::UNDEFINED_TYPE), missing);
  }
}
