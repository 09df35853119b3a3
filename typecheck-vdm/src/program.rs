use crate::check::Checker;
use crate::check::ResolvedType;
use crate::def::build::build_definitions;
use crate::def::DefId;
use crate::def::DefTable;
use crate::def::Pass;
use crate::options::CheckOptions;
use crate::sink::Sink;
use diagnostics::sort_diagnostics;
use diagnostics::Diagnostic;
use syntax_vdm::ast::expr::Expr;
use syntax_vdm::ast::item::Program;
use syntax_vdm::ast::node::Node;
use tracing::debug;
use tracing::debug_span;
use types_vdm::TypeId;
use types_vdm::TypeStore;

/// Everything a checking run produced.
pub struct CheckResult<'a> {
  pub defs: DefTable<'a>,
  pub store: TypeStore,
  /// Sorted by file, then position, then code.
  pub diagnostics: Vec<Diagnostic>,
}

impl<'a> CheckResult<'a> {
  pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
    self.diagnostics.iter().filter(|d| d.is_error())
  }

  pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
    self.diagnostics.iter().filter(|d| d.is_warning())
  }

  /// Looks up a definition declared directly in a module or class, including
  /// synthesised ones such as `pre_f` or `inv_T`.
  pub fn find_definition(&self, container: &str, name: &str) -> Option<DefId> {
    let members = match self.defs.find_class(container) {
      Some(class) => self.defs.class_members(class),
      None => {
        let module = self.defs.find_module(container)?;
        self.defs.module(module).defs.clone()
      }
    };
    members
      .into_iter()
      .find(|id| self.defs.get(*id).name.name == name)
  }

  /// The type the checker computed for an expression, if it was reached.
  pub fn type_of(&self, expr: &Node<Expr>) -> Option<TypeId> {
    expr.assoc.get::<ResolvedType>().map(|ResolvedType(ty)| ty)
  }
}

/// Checks a whole program. Syntax nodes reached by checking are annotated
/// with their types and the definitions their names refer to.
pub fn check_program(program: &Program, options: CheckOptions) -> CheckResult<'_> {
  let span = debug_span!("typecheck_vdm.check_program", files = program.files.len());
  let _guard = span.enter();

  let mut store = TypeStore::new();
  let mut sink = Sink::new(options.max_errors);
  let table = build_definitions(program, &mut store, &mut sink, &options);
  let mut checker = Checker::new(options, table, store, sink);

  checker.link_classes();
  checker.collect_all_inherited();
  checker.resolve_all();
  checker.check_hierarchy();

  let declared: Vec<DefId> = checker.table.iter().map(|(id, _)| id).collect();
  let graph = checker.build_call_graph();
  for pass in Pass::ALL {
    checker.run_pass(pass, &declared);
  }
  checker.check_measures(&graph);
  checker.check_unused(&declared);

  let Checker {
    table, store, sink, ..
  } = checker;
  let mut diagnostics = sink.into_diagnostics();
  sort_diagnostics(&mut diagnostics);
  debug!(
    definitions = table.len(),
    diagnostics = diagnostics.len(),
    "checked program"
  );
  CheckResult {
    defs: table,
    store,
    diagnostics,
  }
}
