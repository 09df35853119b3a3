mod common;

use common::count;
use common::flat_program;
use common::with_code;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::ExplicitFunctionDecl;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::build::Builder;
use typecheck_vdm::check_program;
use typecheck_vdm::codes;
use typecheck_vdm::CheckOptions;
use typecheck_vdm::Release;

/// `name: nat -> nat  name(n) == if n = 0 then 0 else callee(n - 1)`
fn countdown(b: &Builder, name: &str, callee: &str) -> ExplicitFunctionDecl {
  let body = b.if_expr(
    b.binary(BinaryOp::Eq, b.var("n"), b.nat(0)),
    b.nat(0),
    b.call(callee, vec![b.binary(BinaryOp::Sub, b.var("n"), b.nat(1))]),
  );
  b.function(name, b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], body)
}

fn decl(b: &Builder, f: ExplicitFunctionDecl) -> Node<Decl> {
  b.decl(Decl::ExplicitFunction(f))
}

#[test]
fn direct_recursion_without_measure_warns_once() {
  let b = Builder::new();
  let program = flat_program(&b, vec![decl(&b, countdown(&b, "f", "f"))]);
  let result = common::check_sl(&program);

  let reported = with_code(&result, codes::NO_MEASURE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert!(reported[0].is_warning());
  assert_eq!(reported[0].detail("Name"), Some("f"));
  assert_eq!(count(&result, codes::NO_MEASURE_CYCLE), 0);
}

#[test]
fn mutual_recursion_without_measure_warns_once_for_the_cycle() {
  let b = Builder::new();
  let program = flat_program(&b, vec![
    decl(&b, countdown(&b, "f", "g")),
    decl(&b, countdown(&b, "g", "f")),
  ]);
  let result = common::check_sl(&program);

  let reported = with_code(&result, codes::NO_MEASURE_CYCLE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Cycle"), Some("f, g"));
  assert_eq!(count(&result, codes::NO_MEASURE), 0);
}

#[test]
fn classic_release_reports_each_function_of_a_cycle() {
  let b = Builder::new();
  let program = flat_program(&b, vec![
    decl(&b, countdown(&b, "f", "g")),
    decl(&b, countdown(&b, "g", "f")),
  ]);
  let options = CheckOptions {
    release: Release::Classic,
    ..CheckOptions::sl()
  };
  let result = check_program(&program, options);
  assert_eq!(count(&result, codes::NO_MEASURE), 2);
  assert_eq!(count(&result, codes::NO_MEASURE_CYCLE), 0);
}

#[test]
fn measured_recursion_is_quiet() {
  let b = Builder::new();
  let mut f = countdown(&b, "f", "f");
  f.measure = Some(b.measure_name("m"));
  let m = b.function("m", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n"));
  let program = flat_program(&b, vec![decl(&b, f), decl(&b, m)]);
  let result = common::check_sl(&program);

  assert_eq!(count(&result, codes::NO_MEASURE), 0, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::MEASURE_UNDEFINED), 0);
  assert_eq!(count(&result, codes::MEASURE_PARAMS), 0);
  assert_eq!(count(&result, codes::MEASURE_NOT_NATURAL), 0);
}

#[test]
fn measure_must_return_a_natural() {
  let b = Builder::new();
  let mut f = countdown(&b, "f", "f");
  f.measure = Some(b.measure_name("m"));
  let m = b.function("m", b.t_fn(vec![b.t_nat()], b.t_bool()), &["n"], b.boolean(true));
  let program = flat_program(&b, vec![decl(&b, f), decl(&b, m)]);
  let result = common::check_sl(&program);
  assert_eq!(count(&result, codes::MEASURE_NOT_NATURAL), 1, "{:#?}", result.diagnostics);
}

#[test]
fn unknown_measure_is_reported() {
  let b = Builder::new();
  let mut f = countdown(&b, "f", "f");
  f.measure = Some(b.measure_name("nowhere"));
  let program = flat_program(&b, vec![decl(&b, f)]);
  let result = common::check_sl(&program);
  let reported = with_code(&result, codes::MEASURE_UNDEFINED);
  assert_eq!(reported.len(), 1);
  assert_eq!(reported[0].detail("Name"), Some("nowhere"));
}

#[test]
fn non_recursive_functions_need_no_measure() {
  let b = Builder::new();
  let program = flat_program(&b, vec![
    decl(&b, countdown(&b, "f", "g")),
    decl(
      &b,
      b.function("g", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n")),
    ),
  ]);
  let result = common::check_sl(&program);
  assert_eq!(count(&result, codes::NO_MEASURE), 0);
  assert_eq!(count(&result, codes::NO_MEASURE_CYCLE), 0);
}

#[test]
fn measures_of_a_cycle_must_agree() {
  let b = Builder::new();
  let mut f = countdown(&b, "f", "g");
  f.measure = Some(b.measure_name("mf"));
  let mut g = countdown(&b, "g", "f");
  g.measure = Some(b.measure_name("mg"));
  let mf = b.function("mf", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n"));
  let mg = b.function(
    "mg",
    b.t_fn(vec![b.t_nat()], b.t_product(vec![b.t_nat(), b.t_nat()])),
    &["n"],
    b.tuple(vec![b.var("n"), b.var("n")]),
  );
  let program = flat_program(&b, vec![decl(&b, f), decl(&b, g), decl(&b, mf), decl(&b, mg)]);
  let result = common::check_sl(&program);

  let reported = with_code(&result, codes::MEASURE_INCOMPATIBLE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::MEASURE_NOT_NATURAL), 0);
}
