//! Keyword logic grouped the way the draft 2020-12 specification itself
//! groups vocabularies. These modules hold pure predicate/check functions;
//! [`crate::schema::evaluator`] is the dispatcher that calls them in
//! core → applicator → validation → unevaluated order and threads the
//! recursive subschema calls and annotation bookkeeping they can't do on
//! their own.

pub mod applicator;
mod regex_cache;
pub mod unevaluated;
pub mod validation;
