//! Contour tracing: scalar field in, level-set polylines out.
//!
//! The crate exposes the tracing capability as a trait so the engine
//! depends on an interface rather than a concrete algorithm:
//!
//! ```text
//! ScalarField ──► march squares ──► link segments ──► clip ──► transform
//!                                                        │
//!                                                        ▼
//!                                         simplify ──► split ways ──► TracedLevel
//! ```
//!
//! `MarchingSquaresTracer` is the default implementation; anything else
//! satisfying [`ContourTracer`] can be substituted for testing or to plug
//! in a different geometric engine.

pub mod field;
pub mod march;
pub mod simplify;
pub mod tracer;

pub use field::ScalarField;
pub use march::{is_closed, link_segments, march_squares, Point, Polyline, Segment};
pub use simplify::simplify_rdp;
pub use tracer::{ContourTracer, MarchingSquaresTracer, TraceError, TracedLevel};
