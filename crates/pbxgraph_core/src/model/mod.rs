//! Object-graph domain model.
//!
//! # Responsibility
//! - Define the record, id and value types shared by every engine layer.
//! - Keep record kinds a closed, exhaustively matched set derived from `isa`.
//!
//! # Invariants
//! - Every record is identified by a store-unique `ObjectId`.
//! - Unknown attributes survive any read-modify-write cycle unchanged.

pub mod id;
pub mod object;
pub mod source_tree;
pub mod value;
