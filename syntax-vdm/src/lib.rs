//! Syntax tree for VDM specifications.
//!
//! Nothing here reads text: trees come from an external parser or are put
//! together with [`build::Builder`]. Every node carries a [`loc::Loc`] and an
//! annotation slot that later stages use to record what they learned about it.

pub mod ast;
pub mod build;
pub mod loc;
