//! Pointer-driven editing of a panorama scene.
//!
//! [`transition`] is the whole state machine: it takes the current
//! [`SceneEditorState`] and one [`EditorEvent`] and returns the next state
//! plus the [`Effect`]s the host must carry out (redraw, persist, load an
//! image). [`InteractionController`] owns the state for hosts that prefer a
//! mutable handle.

pub mod config;
pub mod controller;
pub mod event;
pub mod image_load;
pub mod state;

pub use config::*;
pub use controller::*;
pub use event::*;
pub use image_load::*;
pub use state::*;
