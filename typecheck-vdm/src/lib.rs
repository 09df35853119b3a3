//! Static semantic analysis of VDM-SL, VDM++ and VDM-RT specifications.
//!
//! [`check_program`] takes a syntax tree, builds a table of every
//! definition it declares, resolves their types and checks every body
//! against them. Problems are reported as diagnostics with stable numeric
//! codes (see [`codes`]); nothing here panics on bad input. Checked nodes
//! carry a [`ResolvedType`], and names carry the [`ResolvedDef`] they refer
//! to, so later tools can read the results straight off the tree.
//!
//! Checking runs in four passes, [`def::Pass::Types`] to [`def::Pass::Final`],
//! so that every definition a body can see has its type before the body is
//! checked. Recursive functions are found from a call graph built before the
//! passes and reported once all bodies are checked.

mod check;
pub mod codes;
pub mod def;
pub mod env;
mod free_vars;
mod hierarchy;
pub mod name;
mod options;
mod program;
mod resolve;
mod sink;

pub use check::ResolvedDef;
pub use check::ResolvedType;
pub use def::DefId;
pub use def::DefKind;
pub use def::DefTable;
pub use def::Definition;
pub use name::Name;
pub use name::NameScope;
pub use options::CheckOptions;
pub use options::Dialect;
pub use options::Release;
pub use program::check_program;
pub use program::CheckResult;
pub use sink::Sink;
