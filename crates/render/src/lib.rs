//! Backend-neutral frame building for the panorama editing canvas.
//!
//! [`TileRenderer`] turns a scene, a view and an image status into an ordered
//! list of [`RenderCommand`]s. Web and CLI front ends execute or dump them.

pub mod renderer;
pub mod style;

pub use renderer::*;
pub use style::*;
