//! Scene Integration Tests
//!
//! Tests for:
//! - Scene: create/remove nodes, attach/detach hierarchy
//! - Traversal: pre-order walk from the roots, drawable collection
//! - GPU invalidation: reachability, sharing, dangling handles, visibility

use glam::Vec4;
use relume::diagnostics::{Diagnostics, WarningKind};
use relume::resources::{Attribute, Geometry, Material, Texture, TextureSlot};
use relume::scene::{Node, Scene};
use wgpu::VertexFormat;

fn quad_geometry() -> Geometry {
    let mut geo = Geometry::new();
    geo.set_attribute(
        "position",
        Attribute::new_planar(
            &[[0.0_f32, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            VertexFormat::Float32x3,
        ),
    );
    geo.set_indices(&[0, 1, 2, 0, 2, 3]);
    geo
}

fn quiet() -> Diagnostics {
    Diagnostics::new(false)
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn scene_create_node_with_name() {
    let mut scene = Scene::new();
    let handle = scene.create_node_with_name("TestNode");
    assert_eq!(scene.get_name(handle), Some("TestNode"));
    assert!(!scene.root_nodes.contains(&handle));
}

#[test]
fn scene_add_node_is_root() {
    let mut scene = Scene::new();
    let handle = scene.add_node(Node::new());
    assert!(scene.root_nodes.contains(&handle));
    assert_eq!(scene.node_count(), 1);
}

#[test]
fn scene_remove_node_drops_subtree_and_meshes() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let mat = scene.assets.materials.add(Material::new_basic(Vec4::ONE));

    let parent = scene.spawn_mesh("Parent", geo, mat);
    let child = scene.spawn_mesh("Child", geo, mat);
    scene.attach(child, parent);
    assert_eq!(scene.meshes.len(), 2);

    scene.remove_node(parent);

    assert!(scene.get_node(parent).is_none());
    assert!(scene.get_node(child).is_none());
    assert!(scene.meshes.is_empty());
    assert!(scene.root_nodes.is_empty());
    // Assets are owned by the store, not the nodes
    assert!(scene.assets.geometries.contains(geo));
}

#[test]
fn set_mesh_replaces_previous_mesh() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let basic = scene.assets.materials.add(Material::new_basic(Vec4::ONE));
    let phong = scene.assets.materials.add(Material::new_phong(Vec4::ONE));
    let node = scene.add_node(Node::new());

    let first = scene.set_mesh(node, relume::Mesh::new(geo, basic)).unwrap();
    let second = scene.set_mesh(node, relume::Mesh::new(geo, phong)).unwrap();

    assert!(scene.get_mesh(first).is_none());
    assert_eq!(scene.get_node(node).unwrap().mesh(), Some(second));
    assert_eq!(scene.get_mesh(second).unwrap().material, phong);
    assert_eq!(scene.meshes.len(), 1);

    let detached = scene.create_node();
    scene.remove_node(detached);
    assert!(scene.set_mesh(detached, relume::Mesh::new(geo, basic)).is_none());
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_moves_node_out_of_roots() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::with_name("Parent"));
    let child = scene.add_node(Node::with_name("Child"));

    scene.attach(child, parent);

    assert_eq!(scene.root_nodes, vec![parent]);
    assert_eq!(scene.get_node(child).unwrap().parent(), Some(parent));
    assert_eq!(scene.get_node(parent).unwrap().children(), &[child]);
}

#[test]
fn attach_to_descendant_is_ignored() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new());
    let b = scene.create_node();
    scene.attach(b, a);

    scene.attach(a, b);
    scene.attach(a, a);

    assert_eq!(scene.get_node(a).unwrap().parent(), None);
    assert_eq!(scene.get_node(b).unwrap().parent(), Some(a));
}

#[test]
fn detach_returns_node_to_roots() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new());
    let child = scene.create_node();
    scene.attach(child, parent);

    scene.detach(child);

    assert!(scene.root_nodes.contains(&child));
    assert!(scene.get_node(parent).unwrap().children().is_empty());
}

// ============================================================================
// Traversal
// ============================================================================

#[test]
fn traverse_is_preorder_from_roots() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::with_name("a"));
    let b = scene.create_node_with_name("b");
    let c = scene.create_node_with_name("c");
    let d = scene.add_node(Node::with_name("d"));
    scene.attach(b, a);
    scene.attach(c, b);
    let _orphan = scene.create_node_with_name("orphan");

    let mut names = Vec::new();
    scene.traverse(|_, node| names.push(node.name.clone().unwrap_or_default()));

    assert_eq!(names, ["a", "b", "c", "d"]);
    assert_eq!(scene.get_node(d).unwrap().parent(), None);
}

#[test]
fn drawables_skip_unreachable_nodes() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let mat = scene.assets.materials.add(Material::new_basic(Vec4::ONE));

    let reachable = scene.spawn_mesh("Reachable", geo, mat);
    let orphan = scene.create_node();
    scene.set_mesh(orphan, relume::Mesh::new(geo, mat));

    let drawables: Vec<_> = scene.drawables().into_iter().map(|(node, _)| node).collect();
    assert_eq!(drawables, vec![reachable]);
}

// ============================================================================
// GPU Invalidation
// ============================================================================

#[test]
fn invalidation_counts_shared_resources_once() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let tex = scene.assets.textures.add(Texture::solid("shared", [255, 255, 255, 255]));
    let mat = scene
        .assets
        .materials
        .add(Material::new_phong(Vec4::ONE).with_texture(TextureSlot::Map, tex).unwrap());
    for name in ["a", "b", "c"] {
        scene.spawn_mesh(name, geo, mat);
    }

    let report = scene.invalidate_gpu_resources(&mut quiet());

    assert_eq!(report.drawables, 3);
    assert_eq!(report.materials, 1);
    assert_eq!(report.attributes, 1);
    assert_eq!(report.index_buffers, 1);
    assert_eq!(report.textures, 1);
    assert_eq!(scene.assets.textures.get(tex).unwrap().tracker().version(), 1);
}

#[test]
fn invalidation_includes_hidden_drawables() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let mat = scene.assets.materials.add(Material::new_basic(Vec4::ONE));
    let node = scene.spawn_mesh("Hidden", geo, mat);
    scene.get_node_mut(node).unwrap().visible = false;

    let report = scene.invalidate_gpu_resources(&mut quiet());

    assert_eq!(report.drawables, 1);
    assert!(scene.assets.materials.get(mat).unwrap().needs_upload());
}

#[test]
fn invalidation_skips_empty_attributes() {
    let mut scene = Scene::new();
    let mut geo = quad_geometry();
    geo.set_attribute("color", Attribute::new_planar::<[f32; 4]>(&[], VertexFormat::Float32x4));
    let geo = scene.assets.geometries.add(geo);
    let mat = scene.assets.materials.add(Material::new_basic(Vec4::ONE));
    scene.spawn_mesh("Mesh", geo, mat);

    let report = scene.invalidate_gpu_resources(&mut quiet());

    assert_eq!(report.attributes, 1);
    let geometry = scene.assets.geometries.get(geo).unwrap();
    assert_eq!(geometry.get_attribute("color").unwrap().tracker().version(), 0);
}

#[test]
fn invalidation_reports_dangling_handles_once() {
    let mut scene = Scene::new();
    let geo = scene.assets.geometries.add(quad_geometry());
    let tex = scene.assets.textures.add(Texture::solid("gone", [0, 0, 0, 255]));
    let mat = scene
        .assets
        .materials
        .add(Material::new_standard(Vec4::ONE).with_texture(TextureSlot::EmissiveMap, tex).unwrap());
    scene.spawn_mesh("a", geo, mat);
    scene.spawn_mesh("b", geo, mat);

    scene.assets.geometries.remove(geo);
    scene.assets.textures.remove(tex);

    let mut diagnostics = quiet();
    let report = scene.invalidate_gpu_resources(&mut diagnostics);

    assert_eq!(report.drawables, 2);
    assert_eq!(report.materials, 1);
    assert_eq!(report.attributes, 0);
    assert_eq!(report.textures, 0);
    assert_eq!(
        diagnostics.warned(),
        WarningKind::DANGLING_GEOMETRY | WarningKind::DANGLING_TEXTURE
    );
}

#[test]
fn invalidation_of_empty_scene_is_noop() {
    let mut scene = Scene::new();
    let report = scene.invalidate_gpu_resources(&mut quiet());
    assert_eq!(report, relume::InvalidationReport::default());
}
