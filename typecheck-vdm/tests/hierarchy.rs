mod common;

use common::assert_no_errors;
use common::check_pp;
use common::count;
use common::function_decl;
use common::operation_decl;
use common::with_code;
use diagnostics::TextRange;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::PerDecl;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::type_expr::TypeExpr;
use syntax_vdm::build::Builder;
use typecheck_vdm::codes;

/// `name: () ==> nat  name() == return 1`
fn nat_operation(b: &Builder, name: &str, access: Access) -> Node<Decl> {
  let mut op = b.operation(name, b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(1))));
  op.access = access;
  b.decl(Decl::ExplicitOperation(op))
}

/// `foo: param ==> param  foo(x) == return x`
fn identity_operation(b: &Builder, param: fn(&Builder) -> Node<TypeExpr>) -> Node<Decl> {
  operation_decl(
    b,
    b.operation("foo", b.t_op(vec![param(b)], Some(param(b))), &["x"], b.ret(Some(b.var("x")))),
  )
}

#[test]
fn incompatible_override_is_reported_once_with_both_locations() {
  let b = Builder::new();
  let base_op = operation_decl(
    &b,
    b.operation("foo", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(1)))),
  );
  let base_loc = base_op.loc;
  let derived_op = operation_decl(
    &b,
    b.operation("foo", b.t_op(vec![], Some(b.t_bool())), &[], b.ret(Some(b.boolean(true)))),
  );
  let derived_loc = derived_op.loc;
  let program = b.program(vec![
    b.class("A", &[], vec![base_op]),
    b.class("B", &["A"], vec![derived_op]),
  ]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::OVERRIDE_INCOMPATIBLE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  let d = reported[0];
  assert_eq!(d.primary.range, TextRange::from(derived_loc));
  assert!(d.labels.iter().any(|l| !l.is_primary && l.span.range == TextRange::from(base_loc)));
}

#[test]
fn compatible_override_is_accepted() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![operation_decl(
      &b,
      b.operation("foo", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(1)))),
    )]),
    b.class("B", &["A"], vec![operation_decl(
      &b,
      b.operation("foo", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(2)))),
    )]),
  ]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::OVERRIDE_INCOMPATIBLE), 0);
}

#[test]
fn circular_hierarchy_is_reported_once() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &["B"], vec![]),
    b.class("B", &["C"], vec![]),
    b.class("C", &["A"], vec![]),
  ]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::CIRCULAR_HIERARCHY);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  let cycle = reported[0].detail("Cycle").unwrap();
  for class in ["A", "B", "C"] {
    assert!(cycle.contains(class), "{cycle}");
  }
}

#[test]
fn self_inheritance_is_a_cycle() {
  let b = Builder::new();
  let program = b.program(vec![b.class("A", &["A"], vec![])]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::CIRCULAR_HIERARCHY), 1);
}

#[test]
fn unknown_superclass_is_reported() {
  let b = Builder::new();
  let program = b.program(vec![b.class("A", &["Missing"], vec![])]);
  let result = check_pp(&program);
  let reported = with_code(&result, codes::UNDEFINED_SUPERCLASS);
  assert_eq!(reported.len(), 1);
  assert_eq!(reported[0].detail("Name"), Some("Missing"));
}

#[test]
fn inherited_operation_is_callable_from_subclass() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![operation_decl(
      &b,
      b.operation("foo", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(1)))),
    )]),
    b.class("B", &["A"], vec![operation_decl(
      &b,
      b.operation(
        "bar",
        b.t_op(vec![], None),
        &[],
        b.block(vec![], vec![b.call_stmt("foo", vec![])]),
      ),
    )]),
  ]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::UNKNOWN_NAME), 0, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::CALL_NOT_OPERATION), 0);
}

#[test]
fn classes_are_rejected_in_sl() {
  let b = Builder::new();
  let program = b.program(vec![b.class("A", &[], vec![])]);
  let result = common::check_sl(&program);
  assert_eq!(count(&result, codes::WRONG_DIALECT), 1);
}

#[test]
fn override_may_not_reduce_visibility() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![nat_operation(&b, "foo", Access::public())]),
    b.class("B", &["A"], vec![nat_operation(&b, "foo", Access::default())]),
  ]);
  let result = check_pp(&program);
  let reported = with_code(&result, codes::OVERRIDE_ACCESS);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Name"), Some("foo"));
}

#[test]
fn override_must_keep_purity() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![nat_operation(&b, "foo", Access::public().with_pure())]),
    b.class("B", &["A"], vec![nat_operation(&b, "foo", Access::public())]),
  ]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::OVERRIDE_PURITY), 1, "{:#?}", result.diagnostics);
}

#[test]
fn operation_cannot_override_function() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![function_decl(
      &b,
      b.function("foo", b.t_fn(vec![], b.t_nat()), &[], b.nat(1)),
    )]),
    b.class("B", &["A"], vec![nat_operation(&b, "foo", Access::public())]),
  ]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::OVERRIDE_KIND), 1, "{:#?}", result.diagnostics);
}

#[test]
fn same_member_from_two_superclasses_is_ambiguous() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![nat_operation(&b, "foo", Access::public())]),
    b.class("B", &[], vec![nat_operation(&b, "foo", Access::public())]),
    b.class("C", &["A", "B"], vec![]),
  ]);
  let result = check_pp(&program);
  let reported = with_code(&result, codes::INHERITED_AMBIGUITY);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Name"), Some("foo"));
}

#[test]
fn distinguishable_overloads_from_two_superclasses_coexist() {
  let b = Builder::new();
  let program = b.program(vec![
    b.class("A", &[], vec![identity_operation(&b, Builder::t_nat)]),
    b.class("B", &[], vec![identity_operation(&b, Builder::t_bool)]),
    b.class("C", &["A", "B"], vec![]),
  ]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::INHERITED_AMBIGUITY), 0, "{:#?}", result.diagnostics);
}

#[test]
fn local_overload_keeps_inherited_one_callable() {
  let b = Builder::new();
  let run = operation_decl(
    &b,
    b.operation(
      "run",
      b.t_op(vec![], Some(b.t_nat())),
      &[],
      b.ret(Some(b.call("foo", vec![b.nat(1)]))),
    ),
  );
  let program = b.program(vec![
    b.class("A", &[], vec![identity_operation(&b, Builder::t_nat)]),
    b.class("B", &["A"], vec![identity_operation(&b, Builder::t_bool), run]),
  ]);
  let result = check_pp(&program);
  assert_no_errors(&result);
}

#[test]
fn indistinguishable_local_overloads_are_duplicates() {
  let b = Builder::new();
  let first = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n")),
  );
  let first_loc = first.loc;
  let second = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_nat()], b.t_bool()), &["n"], b.boolean(true)),
  );
  let second_loc = second.loc;
  let program = b.program(vec![b.class("A", &[], vec![first, second])]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::DUPLICATE_OVERLOAD);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].primary.range, TextRange::from(second_loc));
  assert!(reported[0]
    .labels
    .iter()
    .any(|l| !l.is_primary && l.span.range == TextRange::from(first_loc)));
}

#[test]
fn repeated_invariants_and_guards_are_not_duplicates() {
  let b = Builder::new();
  let work = operation_decl(&b, b.operation("work", b.t_op(vec![], None), &[], b.skip()));
  let per = |b: &Builder| {
    b.decl(Decl::Per(PerDecl {
      operation: "work".to_string(),
      guard: b.boolean(true),
    }))
  };
  let program = b.program(vec![b.class("A", &[], vec![
    work,
    b.class_invariant(b.boolean(true)),
    b.class_invariant(b.boolean(true)),
    per(&b),
    per(&b),
  ])]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::DUPLICATE_DEFINITION), 0, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::DUPLICATE_OVERLOAD), 0);
  assert_no_errors(&result);
}
