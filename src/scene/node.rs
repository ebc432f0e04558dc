use smallvec::SmallVec;

use crate::scene::{MeshKey, NodeHandle};

/// A scene node: hierarchy links plus an optional drawable.
///
/// # Hierarchy
///
/// Nodes form a tree structure through parent-child relationships:
/// - `parent`: Optional handle to parent node (None for root nodes)
/// - `children`: List of child node handles
///
/// Use [`Scene::attach`](crate::scene::Scene::attach) to change the
/// hierarchy so both ends stay in sync.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: SmallVec<[NodeHandle; 4]>,

    /// Drawable attached to this node
    pub(crate) mesh: Option<MeshKey>,

    pub visible: bool,
}

impl Node {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            parent: None,
            children: SmallVec::new(),
            mesh: None,
            visible: true,
        }
    }

    #[must_use]
    pub fn with_name(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new()
        }
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}
