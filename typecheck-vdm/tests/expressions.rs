mod common;

use common::check_pp;
use common::check_sl;
use common::count;
use common::flat_program;
use common::function_decl;
use common::operation_decl;
use common::with_code;
use diagnostics::TextRange;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::ValueDecl;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::item::Program;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::build::Builder;
use typecheck_vdm::check_program;
use typecheck_vdm::codes;
use typecheck_vdm::CheckOptions;

fn value_decl(b: &Builder, v: ValueDecl) -> Node<Decl> {
  b.decl(Decl::Value(v))
}

#[test]
fn record_constructor_reports_only_the_wrong_field() {
  let b = Builder::new();
  let rec = b.record("Rec", vec![("a", b.t_nat()), ("b", b.t_nat())]);
  let second = b.string("x");
  let second_loc = second.loc;
  let value = b.value("v", None, b.mk("Rec", vec![b.nat(1), second]));
  let program = flat_program(&b, vec![b.decl(Decl::Type(rec)), value_decl(&b, value)]);
  let result = check_sl(&program);

  let reported = with_code(&result, codes::RECORD_FIELD_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].message, "Constructor field 2 is of wrong type");
  assert_eq!(reported[0].primary.range, TextRange::from(second_loc));
}

#[test]
fn record_constructor_arity_is_checked() {
  let b = Builder::new();
  let rec = b.record("Rec", vec![("a", b.t_nat()), ("b", b.t_nat())]);
  let value = b.value("v", None, b.mk("Rec", vec![b.nat(1)]));
  let program = flat_program(&b, vec![b.decl(Decl::Type(rec)), value_decl(&b, value)]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::RECORD_FIELD_COUNT), 1, "{:#?}", result.diagnostics);
}

#[test]
fn unqualified_overloaded_reference_is_ambiguous_once() {
  let b = Builder::new();
  let first = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n")),
  );
  let second = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_bool()], b.t_bool()), &["p"], b.var("p")),
  );
  let (first_loc, second_loc) = (first.loc, second.loc);
  let reference = b.var("f");
  let reference_loc = reference.loc;
  let g = function_decl(
    &b,
    b.function(
      "g",
      b.t_fn(vec![], b.t_fn(vec![b.t_nat()], b.t_nat())),
      &[],
      reference,
    ),
  );
  let program = b.program(vec![b.class("A", &[], vec![first, second, g])]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::AMBIGUOUS_NAME);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  let d = reported[0];
  assert_eq!(d.primary.range, TextRange::from(reference_loc));
  let candidates: Vec<TextRange> = d
    .labels
    .iter()
    .filter(|l| !l.is_primary)
    .map(|l| l.span.range)
    .collect();
  assert!(candidates.contains(&TextRange::from(first_loc)));
  assert!(candidates.contains(&TextRange::from(second_loc)));
}

#[test]
fn applied_overload_is_selected_by_argument_types() {
  let b = Builder::new();
  let first = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n")),
  );
  let second = function_decl(
    &b,
    b.function("f", b.t_fn(vec![b.t_bool()], b.t_bool()), &["p"], b.var("p")),
  );
  let g = function_decl(
    &b,
    b.function("g", b.t_fn(vec![], b.t_bool()), &[], b.call("f", vec![b.boolean(true)])),
  );
  let program = b.program(vec![b.class("A", &[], vec![first, second, g])]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::AMBIGUOUS_NAME), 0, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::FUNCTION_RESULT), 0);
}

#[test]
fn unknown_names_are_reported_and_typed_unknown() {
  let b = Builder::new();
  let missing = b.var("missing");
  let value = b.value("v", None, b.binary(BinaryOp::Add, missing, b.nat(1)));
  let program = flat_program(&b, vec![value_decl(&b, value)]);
  let result = check_sl(&program);

  let reported = with_code(&result, codes::UNKNOWN_NAME);
  assert_eq!(reported.len(), 1);
  assert_eq!(count(&result, codes::EXPECTED_NUMERIC), 0);
}

#[test]
fn checked_expressions_carry_their_types() {
  let b = Builder::new();
  let set = b.set_enum(vec![b.nat(1), b.nat(2)]);
  let value = b.value("s", Some(b.t_set(b.t_nat())), set);
  let program = flat_program(&b, vec![value_decl(&b, value)]);
  let result = check_sl(&program);
  common::assert_no_errors(&result);

  let Decl::Value(v) = &*program_value(&program).stx else {
    unreachable!();
  };
  let ty = result.type_of(&v.value).expect("value was checked");
  assert!(result.store.is_set(ty));
  let s = result.find_definition("DEFAULT", "s").expect("value name is defined");
  assert!(result.store.is_set(result.defs.ty(s)));
}

fn program_value(program: &syntax_vdm::ast::item::Program) -> &syntax_vdm::ast::node::Node<Decl> {
  match &*program.files[0].items[0].stx {
    syntax_vdm::ast::item::Item::Decl(decl) => decl,
    other => panic!("unexpected item {other:?}"),
  }
}

#[test]
fn value_type_mismatch_is_reported() {
  let b = Builder::new();
  let value = b.value("v", Some(b.t_bool()), b.nat(3));
  let program = flat_program(&b, vec![value_decl(&b, value)]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::VALUE_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Expected"), Some("bool"));
}

#[test]
fn quantifier_predicates_must_be_boolean() {
  let b = Builder::new();
  let forall = b.forall(vec![b.type_bind(&["x"], b.t_nat())], b.var("x"));
  let value = b.value("v", None, forall);
  let program = flat_program(&b, vec![value_decl(&b, value)]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::PREDICATE_NOT_BOOLEAN), 1, "{:#?}", result.diagnostics);
}

#[test]
fn disjoint_set_intersection_is_reported() {
  let b = Builder::new();
  let inter = b.binary(
    BinaryOp::Inter,
    b.set_enum(vec![b.nat(1)]),
    b.set_enum(vec![b.boolean(true)]),
  );
  let program = flat_program(&b, vec![value_decl(&b, b.value("v", None, inter))]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::EMPTY_INTERSECTION), 1, "{:#?}", result.diagnostics);
}

/// `f: nat | bool -> nat  f(x) == if <test> then x else 0`
fn union_to_nat(b: &Builder, test: fn(&Builder) -> Node<Expr>) -> Program {
  let f = b.function(
    "f",
    b.t_fn(vec![b.t_union(vec![b.t_nat(), b.t_bool()])], b.t_nat()),
    &["x"],
    b.if_expr(test(b), b.var("x"), b.nat(0)),
  );
  flat_program(b, vec![b.decl(Decl::ExplicitFunction(f))])
}

#[test]
fn is_type_test_narrows_the_consequent() {
  let strict = CheckOptions {
    strict: true,
    ..CheckOptions::sl()
  };

  let b = Builder::new();
  let narrowed = union_to_nat(&b, |b| b.is_type(b.t_nat(), b.var("x")));
  let result = check_program(&narrowed, strict.clone());
  assert_eq!(count(&result, codes::MAY_NOT_MATCH), 0, "{:#?}", result.diagnostics);

  let b = Builder::new();
  let untested = union_to_nat(&b, |b| b.boolean(true));
  let result = check_program(&untested, strict);
  assert_eq!(count(&result, codes::MAY_NOT_MATCH), 1, "{:#?}", result.diagnostics);
}

#[test]
fn polymorphic_function_argument_must_be_instantiated() {
  let b = Builder::new();
  let mut id = b.function("id", b.t_fn(vec![b.t_param("T")], b.t_param("T")), &["x"], b.var("x"));
  id.type_params = vec!["T".to_string()];
  let twice = b.function(
    "twice",
    b.t_fn(vec![b.t_fn(vec![b.t_nat()], b.t_nat()), b.t_nat()], b.t_nat()),
    &["g", "n"],
    b.call("g", vec![b.var("n")]),
  );
  let id_arg = b.var("id");
  let id_loc = id_arg.loc;
  let value = b.value("v", Some(b.t_nat()), b.call("twice", vec![id_arg, b.nat(1)]));
  let program = flat_program(&b, vec![
    b.decl(Decl::ExplicitFunction(id)),
    b.decl(Decl::ExplicitFunction(twice)),
    value_decl(&b, value),
  ]);
  let result = check_sl(&program);

  let reported = with_code(&result, codes::UNINSTANTIATED);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].primary.range, TextRange::from(id_loc));
  assert_eq!(count(&result, codes::ARGUMENT_TYPE), 0);
}

#[test]
fn static_operations_cannot_reach_the_instance() {
  let b = Builder::new();
  let mut x = b.instance_variable("x", b.t_nat(), Some(b.nat(0)));
  x.access = Access::public();
  let mut get = b.operation("get", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.var("x"))));
  get.access = Access::public().with_static();
  let mut me = b.operation(
    "me",
    b.t_op(vec![], Some(b.t_named("A"))),
    &[],
    b.ret(Some(b.self_ref())),
  );
  me.access = Access::public().with_static();
  let program = b.program(vec![b.class("A", &[], vec![
    b.decl(Decl::InstanceVariable(x)),
    b.decl(Decl::ExplicitOperation(get)),
    b.decl(Decl::ExplicitOperation(me)),
  ])]);
  let result = check_pp(&program);

  let access = with_code(&result, codes::STATIC_ACCESS);
  assert_eq!(access.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(access[0].detail("Name"), Some("x"));
  assert_eq!(count(&result, codes::SELF_NOT_ALLOWED), 1);
}

#[test]
fn instance_operation_may_use_self_and_fields() {
  let b = Builder::new();
  let x = b.instance_variable("x", b.t_nat(), Some(b.nat(0)));
  let get = operation_decl(
    &b,
    b.operation("get", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.var("x")))),
  );
  let me = operation_decl(
    &b,
    b.operation("me", b.t_op(vec![], Some(b.t_named("A"))), &[], b.ret(Some(b.self_ref()))),
  );
  let program = b.program(vec![b.class("A", &[], vec![b.decl(Decl::InstanceVariable(x)), get, me])]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::STATIC_ACCESS), 0, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::SELF_NOT_ALLOWED), 0);
}
