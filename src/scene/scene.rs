use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use crate::assets::{AssetStore, GeometryHandle, MaterialHandle, TextureHandle};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::resources::Mesh;
use crate::scene::node::Node;
use crate::scene::{MeshKey, NodeHandle};

/// What one pass of [`Scene::invalidate_gpu_resources`] marked stale.
///
/// Shared resources are counted once per pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    pub drawables: usize,
    pub materials: usize,
    pub attributes: usize,
    pub index_buffers: usize,
    pub textures: usize,
}

/// Scene graph
///
/// Pure data: the node tree, the meshes hanging off it, and the asset pools
/// those meshes draw from. GPU copies live in the renderer and are tracked
/// per resource through its change tracker.
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,

    pub meshes: SlotMap<MeshKey, Mesh>,
    pub assets: AssetStore,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            meshes: SlotMap::with_key(),
            assets: AssetStore::new(),
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    /// Creates a detached node. It is not traversed until attached to a
    /// root or added with [`add_node`](Self::add_node).
    pub fn create_node(&mut self) -> NodeHandle {
        self.nodes.insert(Node::new())
    }

    pub fn create_node_with_name(&mut self, name: &str) -> NodeHandle {
        self.nodes.insert(Node::with_name(name))
    }

    /// Adds a node at the root level.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[must_use]
    pub fn get_name(&self, handle: NodeHandle) -> Option<&str> {
        self.nodes.get(handle)?.name.as_deref()
    }

    pub fn set_name(&mut self, handle: NodeHandle, name: &str) {
        if let Some(node) = self.nodes.get_mut(handle) {
            node.name = Some(name.to_string());
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = Some(node);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.nodes.get(h).and_then(|n| n.parent);
        }
        false
    }

    /// Makes `child` a child of `parent`, unlinking it from its old parent
    /// or from the root list. Attaching a node to itself or to one of its
    /// descendants is ignored.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return;
        }
        if self.is_ancestor(child, parent) {
            return;
        }
        self.unlink(child);

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Moves `child` to the root level.
    pub fn detach(&mut self, child: NodeHandle) {
        if !self.nodes.contains_key(child) {
            return;
        }
        self.unlink(child);
        self.root_nodes.push(child);
    }

    fn unlink(&mut self, handle: NodeHandle) {
        let parent = self.nodes.get(handle).and_then(|n| n.parent);
        if let Some(parent_handle) = parent {
            if let Some(p) = self.nodes.get_mut(parent_handle) {
                p.children.retain(|c| *c != handle);
            }
            if let Some(n) = self.nodes.get_mut(handle) {
                n.parent = None;
            }
        } else {
            self.root_nodes.retain(|r| *r != handle);
        }
    }

    /// Removes a node, its subtree and the meshes attached to them.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.nodes.contains_key(handle) {
            return;
        }
        self.unlink(handle);

        let mut stack = vec![handle];
        while let Some(h) = stack.pop() {
            if let Some(node) = self.nodes.remove(h) {
                if let Some(mesh) = node.mesh {
                    self.meshes.remove(mesh);
                }
                stack.extend(node.children);
            }
        }
    }

    // ========================================================================
    // Meshes
    // ========================================================================

    /// Attaches a mesh to a node, replacing (and dropping) any previous one.
    pub fn set_mesh(&mut self, node: NodeHandle, mesh: Mesh) -> Option<MeshKey> {
        if !self.nodes.contains_key(node) {
            return None;
        }
        let key = self.meshes.insert(mesh);
        let old = self.nodes.get_mut(node).and_then(|n| n.mesh.replace(key));
        if let Some(old) = old {
            self.meshes.remove(old);
        }
        Some(key)
    }

    #[must_use]
    pub fn get_mesh(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    /// Convenience: adds a root node named `name` drawing `geometry` with
    /// `material`.
    pub fn spawn_mesh(&mut self, name: &str, geometry: GeometryHandle, material: MaterialHandle) -> NodeHandle {
        let node = self.add_node(Node::with_name(name));
        self.set_mesh(node, Mesh::new(geometry, material).with_name(name));
        node
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Depth-first, pre-order walk over every node reachable from the roots.
    pub fn traverse(&self, mut visitor: impl FnMut(NodeHandle, &Node)) {
        let mut stack: Vec<NodeHandle> = self.root_nodes.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = self.nodes.get(handle) else {
                continue;
            };
            visitor(handle, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Reachable nodes carrying a mesh, visible or not, in traversal order.
    #[must_use]
    pub fn drawables(&self) -> Vec<(NodeHandle, MeshKey)> {
        let mut out = Vec::new();
        self.traverse(|handle, node| {
            if let Some(mesh) = node.mesh {
                out.push((handle, mesh));
            }
        });
        out
    }

    // ========================================================================
    // GPU invalidation
    // ========================================================================

    /// Marks every GPU-backed resource reachable from the roots as needing
    /// re-upload: each drawable's material, the populated attribute and index
    /// buffers of its geometry, and the textures in the material's occupied
    /// slots. The renderer regenerates them lazily on its next draw.
    ///
    /// Handles that no longer resolve are skipped and reported once through
    /// `diagnostics`.
    pub fn invalidate_gpu_resources(&mut self, diagnostics: &mut Diagnostics) -> InvalidationReport {
        let mut report = InvalidationReport::default();

        let mut geometries: Vec<GeometryHandle> = Vec::new();
        let mut materials: Vec<MaterialHandle> = Vec::new();
        let mut seen_geometries = FxHashSet::default();
        let mut seen_materials = FxHashSet::default();

        for (node, key) in self.drawables() {
            let Some(mesh) = self.meshes.get(key) else {
                diagnostics.warn_once(
                    WarningKind::DANGLING_MESH,
                    format_args!("node {node:?} references missing mesh {key:?}"),
                );
                continue;
            };
            report.drawables += 1;
            if seen_geometries.insert(mesh.geometry) {
                geometries.push(mesh.geometry);
            }
            if seen_materials.insert(mesh.material) {
                materials.push(mesh.material);
            }
        }

        for handle in geometries {
            match self.assets.geometries.get_mut(handle) {
                Some(geometry) => {
                    let marked = geometry.mark_needs_upload();
                    report.attributes += marked.attributes;
                    report.index_buffers += marked.index_buffers;
                }
                None => {
                    diagnostics.warn_once(
                        WarningKind::DANGLING_GEOMETRY,
                        format_args!("mesh references missing geometry {handle:?}"),
                    );
                }
            }
        }

        let mut textures: Vec<TextureHandle> = Vec::new();
        let mut seen_textures = FxHashSet::default();
        for handle in materials {
            match self.assets.materials.get_mut(handle) {
                Some(material) => {
                    material.mark_needs_upload();
                    report.materials += 1;
                    for (_, texture) in material.textures().iter() {
                        if seen_textures.insert(texture) {
                            textures.push(texture);
                        }
                    }
                }
                None => {
                    diagnostics.warn_once(
                        WarningKind::DANGLING_MATERIAL,
                        format_args!("mesh references missing material {handle:?}"),
                    );
                }
            }
        }

        for handle in textures {
            match self.assets.textures.get_mut(handle) {
                Some(texture) => {
                    texture.mark_needs_upload();
                    report.textures += 1;
                }
                None => {
                    diagnostics.warn_once(
                        WarningKind::DANGLING_TEXTURE,
                        format_args!("material references missing texture {handle:?}"),
                    );
                }
            }
        }

        report
    }
}
