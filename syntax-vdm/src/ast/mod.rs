pub mod decl;
pub mod expr;
pub mod item;
pub mod node;
pub mod op;
pub mod pat;
pub mod stmt;
pub mod type_expr;
