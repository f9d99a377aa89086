pub mod asset;
pub mod connectivity;
pub mod graph;
pub mod link;
pub mod picking;
pub mod snapshot;

pub use asset::*;
pub use connectivity::RepairReport;
pub use graph::*;
pub use link::*;
pub use snapshot::*;
