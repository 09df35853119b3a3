mod common;

use common::assert_no_errors;
use common::check_pp;
use common::check_sl;
use common::count;
use common::flat_program;
use common::operation_decl;
use common::with_code;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::MutexDecl;
use syntax_vdm::ast::decl::PerDecl;
use syntax_vdm::ast::decl::TraceApply;
use syntax_vdm::ast::decl::TraceDecl;
use syntax_vdm::ast::decl::TraceDef;
use syntax_vdm::ast::op::BinaryOp;
use syntax_vdm::build::Builder;
use typecheck_vdm::check_program;
use typecheck_vdm::codes;
use typecheck_vdm::CheckOptions;

#[test]
fn pre_and_post_conditions_are_synthesised() {
  let b = Builder::new();
  let mut f = b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["n"], b.var("n"));
  f.pre = Some(b.binary(BinaryOp::Gt, b.var("n"), b.nat(0)));
  f.post = Some(b.binary(BinaryOp::Eq, b.var("RESULT"), b.var("n")));
  let program = flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))]);
  let result = check_sl(&program);
  assert_no_errors(&result);
  assert!(result.find_definition("DEFAULT", "pre_f").is_some());
  assert!(result.find_definition("DEFAULT", "post_f").is_some());
}

#[test]
fn function_body_must_match_the_result() {
  let b = Builder::new();
  let f = b.function("f", b.t_fn(vec![b.t_nat()], b.t_bool()), &["n"], b.var("n"));
  let program = flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::FUNCTION_RESULT);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Expected"), Some("bool"));
  assert_eq!(reported[0].detail("Actual"), Some("nat"));
}

#[test]
fn parameter_count_must_match_the_signature() {
  let b = Builder::new();
  let f = b.function("f", b.t_fn(vec![b.t_nat()], b.t_nat()), &["a", "b"], b.var("a"));
  let program = flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))]);
  let result = check_sl(&program);
  assert_eq!(count(&result, codes::PARAMETER_PATTERNS), 1, "{:#?}", result.diagnostics);
}

#[test]
fn implicit_function_postcondition_sees_the_result() {
  let b = Builder::new();
  let post = b.binary(BinaryOp::Gt, b.var("r"), b.var("n"));
  let f = b.implicit_function("next", vec![("n", b.t_nat())], ("r", b.t_nat()), post);
  let program = flat_program(&b, vec![b.decl(Decl::ImplicitFunction(f))]);
  let result = check_sl(&program);
  assert_no_errors(&result);
}

#[test]
fn unused_private_members_warn() {
  let b = Builder::new();
  let helper = b.decl(Decl::ExplicitFunction(b.function(
    "helper",
    b.t_fn(vec![], b.t_nat()),
    &[],
    b.nat(1),
  )));
  let used = b.decl(Decl::ExplicitFunction(b.function(
    "used",
    b.t_fn(vec![], b.t_nat()),
    &[],
    b.nat(2),
  )));
  let caller = operation_decl(
    &b,
    b.operation("run", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.call("used", vec![])))),
  );
  let program = b.program(vec![b.class("A", &[], vec![helper, used, caller])]);
  let result = check_pp(&program);

  let names: Vec<&str> = with_code(&result, codes::UNUSED)
    .into_iter()
    .filter_map(|d| d.detail("Name"))
    .collect();
  assert_eq!(names, vec!["helper"], "{:#?}", result.diagnostics);
}

#[test]
fn unused_warnings_can_be_turned_off() {
  let b = Builder::new();
  let helper = b.decl(Decl::ExplicitFunction(b.function(
    "helper",
    b.t_fn(vec![], b.t_nat()),
    &[],
    b.let_in(
      vec![b.decl(Decl::Value(b.value("x", None, b.nat(1))))],
      b.nat(2),
    ),
  )));
  let program = b.program(vec![b.class("A", &[], vec![helper])]);
  let options = CheckOptions {
    warn_unused: false,
    ..CheckOptions::pp()
  };
  let result = check_program(&program, options);
  assert_eq!(count(&result, codes::UNUSED), 0);
}

#[test]
fn unused_let_names_warn() {
  let b = Builder::new();
  let body = b.let_in(
    vec![b.decl(Decl::Value(b.value("x", None, b.nat(1))))],
    b.nat(2),
  );
  let f = b.function("f", b.t_fn(vec![], b.t_nat()), &[], body);
  let program = flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))]);
  let result = check_sl(&program);
  let reported = with_code(&result, codes::UNUSED);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Name"), Some("x"));
}

#[test]
fn constructor_must_return_its_class() {
  let b = Builder::new();
  let ctor = operation_decl(
    &b,
    b.operation("A", b.t_op(vec![], Some(b.t_nat())), &[], b.ret(Some(b.nat(1)))),
  );
  let program = b.program(vec![b.class("A", &[], vec![ctor])]);
  let result = check_pp(&program);
  assert_eq!(count(&result, codes::CONSTRUCTOR_RESULT), 1, "{:#?}", result.diagnostics);
}

#[test]
fn sync_clauses_must_name_operations() {
  let b = Builder::new();
  let op = operation_decl(&b, b.operation("work", b.t_op(vec![], None), &[], b.skip()));
  let mutex = b.decl(Decl::Mutex(MutexDecl {
    operations: vec!["work".to_string(), "nothing".to_string()],
  }));
  let per = b.decl(Decl::Per(PerDecl {
    operation: "work".to_string(),
    guard: b.nat(1),
  }));
  let program = b.program(vec![b.class("A", &[], vec![op, mutex, per])]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::SYNC_NOT_OPERATION);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Name"), Some("nothing"));
  assert_eq!(count(&result, codes::PREDICATE_NOT_BOOLEAN), 1);
}

#[test]
fn traces_must_call_operations() {
  let b = Builder::new();
  let op = operation_decl(&b, b.operation("work", b.t_op(vec![b.t_nat()], None), &["n"], b.skip()));
  let good = b.node(TraceDef::Apply(TraceApply {
    object: None,
    operation: "work".to_string(),
    args: vec![b.nat(1)],
  }));
  let bad = b.node(TraceDef::Apply(TraceApply {
    object: None,
    operation: "missing".to_string(),
    args: vec![],
  }));
  let trace = |name: &str, body| {
    b.decl(Decl::Trace(TraceDecl {
      name: name.to_string(),
      body,
    }))
  };
  let program = b.program(vec![b.class("A", &[], vec![op, trace("T1", good), trace("T2", bad)])]);
  let result = check_pp(&program);

  let reported = with_code(&result, codes::TRACE_NOT_OPERATION);
  assert_eq!(reported.len(), 1, "{:#?}", result.diagnostics);
  assert_eq!(reported[0].detail("Name"), Some("missing"));
  assert_eq!(count(&result, codes::ARGUMENT_TYPE), 0);
}

#[test]
fn strict_mode_flags_values_that_only_may_match() {
  let b = Builder::new();
  let f = b.function(
    "f",
    b.t_fn(vec![b.t_union(vec![b.t_nat(), b.t_bool()])], b.t_nat()),
    &["x"],
    b.var("x"),
  );
  let program = flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))]);

  let relaxed = check_sl(&program);
  assert_eq!(count(&relaxed, codes::MAY_NOT_MATCH), 0);

  let program_again = {
    let b = Builder::new();
    let f = b.function(
      "f",
      b.t_fn(vec![b.t_union(vec![b.t_nat(), b.t_bool()])], b.t_nat()),
      &["x"],
      b.var("x"),
    );
    flat_program(&b, vec![b.decl(Decl::ExplicitFunction(f))])
  };
  let options = CheckOptions {
    strict: true,
    ..CheckOptions::sl()
  };
  let strict = check_program(&program_again, options);
  assert_eq!(count(&strict, codes::MAY_NOT_MATCH), 1, "{:#?}", strict.diagnostics);
}

#[test]
fn error_limit_truncates_with_one_warning() {
  let b = Builder::new();
  let decls = (0..5)
    .map(|i| {
      let value = b.value(&format!("v{i}"), None, b.var(&format!("missing{i}")));
      b.decl(Decl::Value(value))
    })
    .collect();
  let program = flat_program(&b, decls);
  let options = CheckOptions {
    max_errors: 2,
    ..CheckOptions::sl()
  };
  let result = check_program(&program, options);
  assert_eq!(result.errors().count(), 2);
  assert_eq!(count(&result, codes::TOO_MANY_ERRORS), 1);
}

#[test]
fn diagnostics_serialise_with_codes_and_details() {
  let b = Builder::new();
  let value = b.value("v", Some(b.t_bool()), b.nat(3));
  let program = flat_program(&b, vec![b.decl(Decl::Value(value))]);
  let result = check_sl(&program);
  let json = serde_json::to_value(&result.diagnostics).expect("diagnostics serialise");
  let first = &json[0];
  assert_eq!(first["code"], codes::VALUE_TYPE.id);
  assert_eq!(first["severity"], "Error");
}
