//! Composition domain
//!
//! A request's `model` is either a backend name (pass-through) or a
//! composite that may nest arbitrarily:
//!
//! ```text
//! ModelRef ── Named("gpt-4o")
//!          └─ Composite ── Trio([Member; 3])          A, B in parallel → C synthesizes
//!                      └─ Ensemble(Vec<Member>, method) all in parallel → aggregated
//! Member = ModelRef + seed messages (variance vector)
//! ```
//!
//! Raw wire shapes live in [`request`]; [`RawModelRef::validate`] is the only
//! way to obtain the validated [`ModelRef`].

pub mod method;
pub mod request;
pub mod spec;

pub use method::AggregationMethod;
pub use request::{RawCompositeSpec, RawMember, RawModelRef};
pub use spec::{CompositeSpec, EnsembleSpec, Member, ModelRef, TrioSpec};
