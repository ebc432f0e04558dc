//! Resource Component Tests
//!
//! Tests for:
//! - ChangeTracker / MutGuard: upload state across edits and invalidation
//! - Geometry: attribute layout versioning, index buffers, re-upload marking
//! - Material: capability-checked texture slots and feature flags
//! - Clone: copies get their own GPU identity
//! - AssetStorage: handle / UUID lookup
//! - Sphere primitive

use glam::{Vec3, Vec4};
use uuid::Uuid;
use wgpu::{IndexFormat, VertexFormat};

use relume::assets::AssetStorage;
use relume::scene::Scene;
use relume::surface::{HeadlessSurface, SurfaceConfig};
use relume::resources::version_tracker::{ChangeTracker, MutGuard};
use relume::resources::{Attribute, Geometry, Material, MaterialFeatures, Texture, TextureSlot};
use relume::{GeometryHandle, RelumeError, SphereOptions, TextureHandle, create_sphere};

// ============================================================================
// ChangeTracker Tests
// ============================================================================

#[test]
fn tracker_starts_unuploaded() {
    let tracker = ChangeTracker::new();
    assert_eq!(tracker.version(), 0);
    assert_eq!(tracker.uploaded_version(), None);
    assert!(tracker.needs_upload());
}

#[test]
fn tracker_change_after_upload_is_stale() {
    let mut tracker = ChangeTracker::new();
    tracker.mark_uploaded();
    assert!(!tracker.needs_upload());

    tracker.changed();
    assert!(tracker.needs_upload());
    assert_eq!(tracker.uploaded_version(), Some(0));
}

#[test]
fn mut_guard_bumps_on_drop() {
    let mut data = vec![1_u8, 2, 3];
    let mut tracker = ChangeTracker::new();
    {
        let mut guard = MutGuard::new(&mut data, &mut tracker);
        guard.push(4);
    }
    assert_eq!(data, [1, 2, 3, 4]);
    assert_eq!(tracker.version(), 1);
}

// ============================================================================
// Geometry Tests
// ============================================================================

#[test]
fn attribute_read_back() {
    let attr = Attribute::new_planar(&[[1.0_f32, 2.0], [3.0, 4.0]], VertexFormat::Float32x2);
    assert_eq!(attr.count, 2);
    assert_eq!(attr.stride, 8);
    assert_eq!(attr.read::<[f32; 2]>(1), Some([3.0, 4.0]));
    assert_eq!(attr.read::<[f32; 2]>(2), None);
}

#[test]
fn attribute_update_marks_stale() {
    let mut attr = Attribute::new_planar(&[0.0_f32; 3], VertexFormat::Float32);
    attr.mark_uploaded();
    attr.update_data(&[1.0_f32, 2.0]);
    assert!(attr.needs_upload());
    assert_eq!(attr.count, 2);
}

#[test]
fn layout_version_tracks_format_changes() {
    let mut geo = Geometry::new();
    let v0 = geo.layout_version();
    geo.set_attribute("uv", Attribute::new_planar(&[[0.0_f32; 2]], VertexFormat::Float32x2));
    let v1 = geo.layout_version();
    assert_ne!(v0, v1);

    // Same format: data-only change
    geo.set_attribute("uv", Attribute::new_planar(&[[1.0_f32; 2]], VertexFormat::Float32x2));
    assert_eq!(geo.layout_version(), v1);

    geo.remove_attribute("uv");
    assert_ne!(geo.layout_version(), v1);
}

#[test]
fn geometry_mark_needs_upload_covers_index() {
    let mut geo = Geometry::new();
    geo.set_attribute("position", Attribute::new_planar(&[[0.0_f32; 3]; 3], VertexFormat::Float32x3));
    geo.set_indices(&[0, 1, 2]);
    for attr in geo.attributes().values() {
        assert!(attr.needs_upload());
    }
    assert_eq!(geo.index().unwrap().format, IndexFormat::Uint16);

    let marked = geo.mark_needs_upload();
    assert_eq!(marked.attributes, 1);
    assert_eq!(marked.index_buffers, 1);
    assert!(geo.needs_upload());
}

// ============================================================================
// Material Tests
// ============================================================================

#[test]
fn basic_material_rejects_normal_map() {
    let mut store: AssetStorage<TextureHandle, Texture> = AssetStorage::new();
    let tex = store.add(Texture::solid("n", [128, 128, 255, 255]));

    let err = Material::new_basic(Vec4::ONE)
        .with_texture(TextureSlot::NormalMap, tex)
        .unwrap_err();
    assert!(matches!(
        err,
        RelumeError::UnsupportedTextureSlot {
            kind: "mesh_basic",
            slot: TextureSlot::NormalMap
        }
    ));
}

#[test]
fn features_follow_slot_assignment() {
    let mut store: AssetStorage<TextureHandle, Texture> = AssetStorage::new();
    let albedo = store.add(Texture::solid("a", [255; 4]));
    let emissive = store.add(Texture::solid("e", [0, 0, 0, 255]));

    let mut mat = Material::new_phong(Vec4::ONE);
    mat.set_texture(TextureSlot::Map, Some(albedo)).unwrap();
    mat.set_texture(TextureSlot::EmissiveMap, Some(emissive)).unwrap();
    assert_eq!(mat.features(), MaterialFeatures::USE_MAP | MaterialFeatures::USE_EMISSIVE_MAP);
    assert_eq!(mat.textures().len(), 2);

    mat.set_texture(TextureSlot::Map, None).unwrap();
    let occupied: Vec<_> = mat.textures().iter().collect();
    assert_eq!(occupied, vec![(TextureSlot::EmissiveMap, emissive)]);
}

#[test]
fn data_mut_marks_material_stale() {
    let mut mat = Material::new_standard(Vec4::ONE);
    mat.mark_uploaded();
    {
        let _guard = mat.data_mut();
    }
    assert!(mat.needs_upload());
    assert_eq!(mat.shader_name(), "mesh_standard");
    assert!(mat.as_standard().is_some());
}

#[test]
fn clones_are_distinct_gpu_resources() {
    let mut scene = Scene::new();
    let texture = Texture::solid("albedo", [255; 4]);
    let original_tex = scene.assets.textures.add(texture.clone());
    let copy_tex = scene.assets.textures.add(texture);

    let material = Material::new_basic(Vec4::ONE).with_texture(TextureSlot::Map, original_tex).unwrap();
    let mut geometry = Geometry::new();
    geometry.set_attribute("position", Attribute::new_planar(&[[0.0_f32; 3]; 3], VertexFormat::Float32x3));

    let geo = scene.assets.geometries.add(geometry.clone());
    let mat = scene.assets.materials.add(material.clone());
    scene.spawn_mesh("Original", geo, mat);

    let mut surface = HeadlessSurface::new(SurfaceConfig::default());
    surface.render(&mut scene).unwrap();

    // Clone of an already-uploaded resource
    let uploaded = scene.assets.materials.get(mat).unwrap().clone();
    assert_ne!(uploaded.uuid, material.uuid);
    assert!(uploaded.needs_upload());

    let mut copy = uploaded;
    copy.set_texture(TextureSlot::Map, Some(copy_tex)).unwrap();
    let copy_mat = scene.assets.materials.add(copy);
    let geometry_copy = scene.assets.geometries.get(geo).unwrap().clone();
    let copy_geo = scene.assets.geometries.add(geometry_copy);
    scene.spawn_mesh("Copy", copy_geo, copy_mat);

    let stats = surface.render(&mut scene).unwrap();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.buffer_uploads, 1);
    assert_eq!(stats.material_uploads, 1);
    assert_eq!(stats.texture_uploads, 1);
}

// ============================================================================
// AssetStorage Tests
// ============================================================================

#[test]
fn storage_uuid_lookup() {
    let mut store: AssetStorage<GeometryHandle, Geometry> = AssetStorage::new();
    let uuid = Uuid::new_v4();
    let handle = store.add_with_uuid(uuid, Geometry::new());

    assert_eq!(store.get_handle_by_uuid(&uuid), Some(handle));
    assert!(store.remove(handle).is_some());
    assert_eq!(store.get_handle_by_uuid(&uuid), None);
    assert!(store.get(handle).is_none());
}

// ============================================================================
// Sphere Tests
// ============================================================================

#[test]
fn sphere_normals_point_outward() {
    let geo = create_sphere(&SphereOptions {
        radius: 2.0,
        ..Default::default()
    });
    let positions = geo.get_attribute("position").unwrap();
    let normals = geo.get_attribute("normal").unwrap();

    for i in 0..positions.count {
        let p = Vec3::from_array(positions.read::<[f32; 3]>(i).unwrap());
        let n = Vec3::from_array(normals.read::<[f32; 3]>(i).unwrap());
        assert!((p.normalize_or_zero() - n).length() < 1e-4 || p.length() < 1e-4);
    }
    assert!(geo.get_attribute("uv").is_some());
}
