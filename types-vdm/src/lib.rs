//! Resolved types of VDM specifications and the relations between them.
//!
//! Types are interned in a [`TypeStore`] and referred to by [`TypeId`]. Named
//! and record types live in slots of the store so that they can be declared
//! before their definitions are resolved, which is what lets a type refer to
//! one declared after it. [`RelateCtx`] answers the two questions the checker
//! asks all the time: is this type compatible with that one, and is it a
//! subtype.

mod display;
mod relate;
mod types;

pub use display::TypeDisplay;
pub use relate::RelateCtx;
pub use relate::RelationKind;
pub use relate::RelationMode;
pub use types::ClassId;
pub use types::ClassSlot;
pub use types::FunctionType;
pub use types::MapType;
pub use types::NamedId;
pub use types::NamedSlot;
pub use types::NumericKind;
pub use types::OperationType;
pub use types::RecordField;
pub use types::SeqType;
pub use types::SetType;
pub use types::TypeId;
pub use types::TypeKind;
pub use types::TypeName;
pub use types::TypeStore;
