mod common;

use common::assert_no_errors;
use common::check_sl;
use common::count;
use common::flat_program;
use common::with_code;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::ExplicitOperationDecl;
use syntax_vdm::ast::node::Node;
use syntax_vdm::ast::stmt::Stmt;
use syntax_vdm::build::Builder;
use typecheck_vdm::codes;

fn op(b: &Builder, name: &str, result: Option<bool>, body: Node<Stmt>) -> Node<Decl> {
  let result = result.map(|nat| if nat { b.t_nat() } else { b.t_bool() });
  let decl: ExplicitOperationDecl = b.operation(name, b.t_op(vec![], result), &[], body);
  b.decl(Decl::ExplicitOperation(decl))
}

const NAT: Option<bool> = Some(true);
const VOID: Option<bool> = None;

#[test]
fn falling_off_a_value_returning_operation_warns() {
  let b = Builder::new();
  let program = flat_program(&b, vec![op(&b, "f", NAT, b.skip())]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::MAY_NOT_RETURN);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert!(reported[0].is_warning());
}

#[test]
fn both_branches_returning_is_enough() {
  let b = Builder::new();
  let body = b.if_stmt(
    b.boolean(true),
    b.ret(Some(b.nat(1))),
    Some(b.ret(Some(b.nat(2)))),
  );
  let program = flat_program(&b, vec![op(&b, "f", NAT, body)]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::MAY_NOT_RETURN), 0, "{:#?}", result.diagnostics);
  assert_no_errors(&result);
}

#[test]
fn return_values_are_checked_against_the_result() {
  let b = Builder::new();
  let program = flat_program(&b, vec![
    op(&b, "f", NAT, b.ret(Some(b.boolean(true)))),
    op(&b, "g", VOID, b.ret(Some(b.nat(1)))),
    op(&b, "h", NAT, b.ret(None)),
  ]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::RETURN_TYPE), 1, "{:#?}", result.diagnostics);
  assert_eq!(count(&result, codes::RETURN_IN_VOID), 1);
  assert_eq!(count(&result, codes::RETURN_VALUE_MISSING), 1);
}

#[test]
fn assignment_checks_the_declared_type() {
  let b = Builder::new();
  let body = b.block(
    vec![b.dcl("x", b.t_nat(), Some(b.nat(0)))],
    vec![b.assign("x", b.boolean(false))],
  );
  let program = flat_program(&b, vec![op(&b, "f", VOID, body)]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::ASSIGN_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Expected"), Some("nat"));
}

#[test]
fn statements_after_return_are_unreachable() {
  let b = Builder::new();
  let body = b.block(vec![], vec![b.ret(Some(b.nat(1))), b.skip(), b.skip()]);
  let program = flat_program(&b, vec![op(&b, "f", NAT, body)]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::UNREACHABLE), 1, "{:#?}", result.diagnostics);
}

#[test]
fn trap_handler_sees_the_exit_type() {
  let b = Builder::new();
  let body = b.trap(
    b.pid("e"),
    b.ret(Some(b.var("e"))),
    b.exit(Some(b.nat(5))),
  );
  let program = flat_program(&b, vec![op(&b, "f", NAT, body)]);
  let result = check_sl(&program);
  assert_no_errors(&result);
  assert_eq!(count(&result, codes::MAY_NOT_RETURN), 0);
}

#[test]
fn exits_of_called_operations_reach_the_handler() {
  let b = Builder::new();
  let raise = op(&b, "raise", VOID, b.exit(Some(b.boolean(true))));
  let body = b.trap(
    b.pid("e"),
    b.ret(Some(b.var("e"))),
    b.block(vec![], vec![b.call_stmt("raise", vec![]), b.ret(Some(b.nat(1)))]),
  );
  let program = flat_program(&b, vec![raise, op(&b, "f", NAT, body)]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::RETURN_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Actual"), Some("bool"));
}

#[test]
fn mutually_calling_operations_contribute_both_exits() {
  let b = Builder::new();
  let p = op(&b, "p", VOID, b.block(vec![], vec![b.call_stmt("q", vec![]), b.exit(Some(b.nat(1)))]));
  let q = op(&b, "q", VOID, b.block(vec![], vec![b.call_stmt("p", vec![]), b.exit(Some(b.boolean(true)))]));
  let body = b.trap(
    b.pid("e"),
    b.ret(Some(b.var("e"))),
    b.block(vec![], vec![b.call_stmt("p", vec![]), b.ret(Some(b.char('a')))]),
  );
  let f = b.operation("f", b.t_op(vec![], Some(b.t_char())), &[], body);
  let program = flat_program(&b, vec![p, q, b.decl(Decl::ExplicitOperation(f))]);
  let result = check_sl(&program);

  let reported = with_code(&result, codes::RETURN_TYPE);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  let actual = reported[0].detail("Actual").unwrap_or_default();
  assert!(actual.contains("nat") && actual.contains("bool"), "{actual}");
}

#[test]
fn operations_cannot_be_called_from_functions() {
  let b = Builder::new();
  let f = b.function("f", b.t_fn(vec![], b.t_nat()), &[], b.call("g", vec![]));
  let program = flat_program(&b, vec![
    b.decl(Decl::ExplicitFunction(f)),
    op(&b, "g", NAT, b.ret(Some(b.nat(1)))),
  ]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::OPERATION_IN_FUNCTION), 1, "{:#?}", result.diagnostics);
}

#[test]
fn calling_a_function_as_a_statement_is_an_error() {
  let b = Builder::new();
  let f = b.function("f", b.t_fn(vec![], b.t_nat()), &[], b.nat(1));
  let program = flat_program(&b, vec![
    b.decl(Decl::ExplicitFunction(f)),
    op(&b, "g", VOID, b.call_stmt("f", vec![])),
  ]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::CALL_NOT_OPERATION), 1, "{:#?}", result.diagnostics);
}

#[test]
fn loops_over_non_sets_are_reported() {
  let b = Builder::new();
  let body = b.node(Stmt::ForAllSet(syntax_vdm::ast::stmt::ForAllSetStmt {
    pattern: b.pid("x"),
    set: b.nat(3),
    body: b.skip(),
  }));
  let program = flat_program(&b, vec![op(&b, "f", VOID, body)]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::LOOP_NOT_SET), 1, "{:#?}", result.diagnostics);
}
