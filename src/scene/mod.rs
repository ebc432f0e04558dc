//! Scene graph
//!
//! - Node: hierarchy links and an optional drawable
//! - Scene: node tree, meshes and the asset pools they reference

pub mod node;
pub mod scene;

pub use node::Node;
pub use scene::{InvalidationReport, Scene};

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct MeshKey;
}
