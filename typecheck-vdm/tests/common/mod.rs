#![allow(dead_code)]

use diagnostics::Diagnostic;
use syntax_vdm::ast::decl::Access;
use syntax_vdm::ast::decl::Decl;
use syntax_vdm::ast::decl::ExplicitFunctionDecl;
use syntax_vdm::ast::decl::ExplicitOperationDecl;
use syntax_vdm::ast::item::Program;
use syntax_vdm::ast::node::Node;
use syntax_vdm::build::Builder;
use typecheck_vdm::check_program;
use typecheck_vdm::codes::Code;
use typecheck_vdm::CheckOptions;
use typecheck_vdm::CheckResult;

pub fn check_sl(program: &Program) -> CheckResult<'_> {
  check_program(program, CheckOptions::sl())
}

pub fn check_pp(program: &Program) -> CheckResult<'_> {
  check_program(program, CheckOptions::pp())
}

/// Diagnostics carrying `code`.
pub fn with_code<'r>(result: &'r CheckResult<'_>, code: Code) -> Vec<&'r Diagnostic> {
  result
    .diagnostics
    .iter()
    .filter(|d| d.code == code.id)
    .collect()
}

pub fn count(result: &CheckResult<'_>, code: Code) -> usize {
  with_code(result, code).len()
}

/// Panics with every error when there is one.
pub fn assert_no_errors(result: &CheckResult<'_>) {
  let errors: Vec<String> = result
    .errors()
    .map(|d| format!("{} {} {:?}", d.code, d.message, d.details))
    .collect();
  assert!(errors.is_empty(), "unexpected errors: {errors:#?}");
}

pub fn public(mut access: Access) -> Access {
  access.visibility = syntax_vdm::ast::decl::Visibility::Public;
  access
}

pub fn function_decl(b: &Builder, mut f: ExplicitFunctionDecl) -> Node<Decl> {
  f.access = public(f.access);
  b.decl(Decl::ExplicitFunction(f))
}

pub fn operation_decl(b: &Builder, mut op: ExplicitOperationDecl) -> Node<Decl> {
  op.access = public(op.access);
  b.decl(Decl::ExplicitOperation(op))
}

/// A flat VDM-SL program of loose definitions.
pub fn flat_program(b: &Builder, decls: Vec<Node<Decl>>) -> Program {
  b.program(b.flat(decls))
}
