pub mod scene_document;

pub use scene_document::*;
