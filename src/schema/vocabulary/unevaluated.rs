//! The `unevaluated` vocabulary: `unevaluatedProperties`/`unevaluatedItems`
//! apply only to the complement of what sibling (and nested, through
//! `$ref`/`allOf`/`anyOf`/`oneOf`/`if`-`then`-`else`) applicators already
//! covered. The complement itself is computed by
//! [`crate::schema::vocabulary::applicator::unmatched_properties`]/
//! [`unmatched_indices`](crate::schema::vocabulary::applicator::unmatched_indices);
//! this module only re-exports the concept so `unevaluated*` dispatch reads
//! as its own vocabulary, matching the dispatch-order design note.

pub use super::applicator::{unmatched_indices, unmatched_properties};
