use std::f32::consts::PI;

/// Interleaved `position.xyz, normal.xyz` UV sphere used as the light marker.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SphereMesh {
    pub radius: f32,
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub const DEFAULT_RADIUS: f32 = 0.5;
    pub const DEFAULT_SECTORS: u32 = 36;
    pub const DEFAULT_STACKS: u32 = 18;

    /// Generates a sphere whose poles lie on the Y axis.
    ///
    /// `sectors` must be at least 3 and `stacks` at least 2.
    pub fn new(radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);
        Self {
            radius,
            vertices: generate_vertices(radius, sectors, stacks),
            indices: generate_indices(sectors, stacks),
        }
    }

    pub fn light_marker() -> Self {
        Self::new(
            Self::DEFAULT_RADIUS,
            Self::DEFAULT_SECTORS,
            Self::DEFAULT_STACKS,
        )
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 6
    }
}

fn generate_vertices(radius: f32, sectors: u32, stacks: u32) -> Vec<f32> {
    let sector_step = 2.0 * PI / sectors as f32;
    let stack_step = PI / stacks as f32;
    let mut vertices = Vec::with_capacity(((stacks + 1) * (sectors + 1) * 6) as usize);

    for i in 0..=stacks {
        // From the north pole down to the south pole.
        let stack_angle = PI / 2.0 - i as f32 * stack_step;
        let xy = radius * stack_angle.cos();
        let z = radius * stack_angle.sin();

        for j in 0..=sectors {
            let sector_angle = j as f32 * sector_step;
            let x = xy * sector_angle.cos();
            let y = xy * sector_angle.sin();
            // y and z swap places so the poles point along +Y/-Y.
            vertices.extend_from_slice(&[x, z, y, x / radius, z / radius, y / radius]);
        }
    }
    vertices
}

fn generate_indices(sectors: u32, stacks: u32) -> Vec<u32> {
    let mut indices = Vec::new();
    for i in 0..stacks {
        let mut k1 = i * (sectors + 1);
        let mut k2 = k1 + sectors + 1;
        for _ in 0..sectors {
            if i != 0 {
                indices.extend_from_slice(&[k1, k2, k1 + 1]);
            }
            if i != stacks - 1 {
                indices.extend_from_slice(&[k1 + 1, k2, k2 + 1]);
            }
            k1 += 1;
            k2 += 1;
        }
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn marker_has_expected_topology() {
        let sphere = SphereMesh::light_marker();
        assert_eq!(sphere.vertex_count(), 19 * 37);
        assert_eq!(sphere.indices.len(), 6 * 36 * 17);
        let max = sphere.vertex_count() as u32;
        assert!(sphere.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn vertices_lie_on_the_sphere_with_outward_normals() {
        let sphere = SphereMesh::new(2.0, 8, 4);
        for chunk in sphere.vertices.chunks_exact(6) {
            let position = Vec3::from_slice(&chunk[..3]);
            let normal = Vec3::from_slice(&chunk[3..]);
            assert!((position.length() - 2.0).abs() < 1e-5);
            assert!((normal - position / 2.0).length() < 1e-6);
        }
    }

    #[test]
    fn first_ring_is_the_north_pole() {
        let sphere = SphereMesh::new(1.0, 4, 2);
        let pole = Vec3::from_slice(&sphere.vertices[..3]);
        assert!((pole - Vec3::Y).length() < 1e-6);
    }
}
