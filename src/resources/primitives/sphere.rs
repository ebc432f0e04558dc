use std::f32::consts::PI;

use wgpu::VertexFormat;

use crate::resources::geometry::{Attribute, Geometry};

pub struct SphereOptions {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
}

impl Default for SphereOptions {
    fn default() -> Self {
        Self {
            radius: 1.0,
            width_segments: 32,
            height_segments: 16,
        }
    }
}

/// UV sphere with `position`, `normal` and `uv` attributes.
#[must_use]
pub fn create_sphere(options: &SphereOptions) -> Geometry {
    let radius = options.radius;
    let width_segments = options.width_segments.max(3);
    let height_segments = options.height_segments.max(2);

    let ring = (width_segments + 1) as usize;
    let vertex_total = ring * (height_segments + 1) as usize;
    let mut positions = Vec::with_capacity(vertex_total);
    let mut normals = Vec::with_capacity(vertex_total);
    let mut uvs = Vec::with_capacity(vertex_total);
    let mut indices = Vec::new();

    for y in 0..=height_segments {
        let v_ratio = y as f32 / height_segments as f32;
        // Latitude from the south pole (0) to the north pole (PI)
        let theta = v_ratio * PI;
        let py = -radius * theta.cos();
        let ring_radius = radius * theta.sin();

        for x in 0..=width_segments {
            let u_ratio = x as f32 / width_segments as f32;
            let phi = u_ratio * 2.0 * PI;

            let px = -ring_radius * phi.cos();
            let pz = ring_radius * phi.sin();

            positions.push([px, py, pz]);
            normals.push([px / radius, py / radius, pz / radius]);
            uvs.push([u_ratio, 1.0 - v_ratio]);
        }
    }

    let stride = width_segments + 1;
    for y in 0..height_segments {
        for x in 0..width_segments {
            let v0 = y * stride + x;
            let v1 = v0 + 1;
            let v2 = (y + 1) * stride + x;
            let v3 = v2 + 1;

            indices.extend_from_slice(&[v0, v1, v2, v1, v3, v2]);
        }
    }

    let mut geo = Geometry::new();
    geo.name = "Sphere".to_string();
    geo.set_attribute("position", Attribute::new_planar(&positions, VertexFormat::Float32x3));
    geo.set_attribute("normal", Attribute::new_planar(&normals, VertexFormat::Float32x3));
    geo.set_attribute("uv", Attribute::new_planar(&uvs, VertexFormat::Float32x2));

    if vertex_total <= u16::MAX as usize {
        let narrow: Vec<u16> = indices.iter().map(|&i| i as u16).collect();
        geo.set_indices(&narrow);
    } else {
        geo.set_indices_u32(&indices);
    }
    geo
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sphere_has_three_attributes_and_indices() {
        let geo = create_sphere(&SphereOptions::default());
        assert_eq!(geo.vertex_count(), 33 * 17);
        assert!(geo.get_attribute("normal").is_some());
        assert!(geo.get_attribute("uv").is_some());
        let index = geo.index().unwrap();
        assert_eq!(index.count, 32 * 16 * 6);
        assert_eq!(index.format, wgpu::IndexFormat::Uint16);
    }

    #[test]
    fn sphere_positions_lie_on_radius() {
        let geo = create_sphere(&SphereOptions { radius: 2.0, ..Default::default() });
        let pos = geo.get_attribute("position").unwrap();
        for i in [0, 40, 100] {
            let p: [f32; 3] = pos.read(i).unwrap();
            let len = glam::Vec3::from_array(p).length();
            assert!((len - 2.0).abs() < 1e-4);
        }
    }
}
