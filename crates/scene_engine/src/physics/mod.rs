//! Geometric query primitives
//!
//! Rays, segments and triangles used by mouse picking. Shapes carry no
//! coordinate space of their own; callers move them between world and
//! model space with [`LineSegment::transformed`].

pub mod primitives;

pub use primitives::{LineSegment, Ray, Triangle};
