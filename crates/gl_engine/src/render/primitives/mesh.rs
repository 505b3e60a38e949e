//! CPU-side mesh data and procedural shapes
//!
//! [`MeshData`] is what loaders and factories produce; the renderer uploads it
//! and hands back a [`crate::render::resources::MeshHandle`].

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec3;

/// Interleaved vertex: position, normal, texture coordinate
///
/// Attribute locations are 0, 1 and 2 in that order.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self { position, normal, tex_coord }
    }
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertices
    pub vertices: Vec<Vertex>,
    /// Triangle indices, three per face
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Create mesh data from vertices and indices
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Replace normals with area-weighted face normals
    pub fn generate_normals(&mut self) {
        let mut accumulated = vec![Vec3::zeros(); self.vertices.len()];
        for face in self.indices.chunks_exact(3) {
            let [a, b, c] = [face[0] as usize, face[1] as usize, face[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) =
                (self.vertices.get(a), self.vertices.get(b), self.vertices.get(c))
            else {
                continue;
            };
            let pa = Vec3::from(pa.position);
            let edge1 = Vec3::from(pb.position) - pa;
            let edge2 = Vec3::from(pc.position) - pa;
            // Unnormalized cross product weights by face area.
            let face_normal = edge1.cross(&edge2);
            for index in [a, b, c] {
                accumulated[index] += face_normal;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accumulated) {
            let normal = normal.try_normalize(1.0e-12).unwrap_or_else(|| Vec3::new(0.0, 1.0, 0.0));
            vertex.normal = normal.into();
        }
    }
}

/// Procedural meshes used by the demos
pub struct MeshFactory;

impl MeshFactory {
    /// Axis-aligned cube with per-face normals and UVs
    pub fn cube(side: f32) -> MeshData {
        let h = side * 0.5;
        // (normal, tangent u, tangent v) per face
        let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
            ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let (n, u, v) = (Vec3::from(normal), Vec3::from(u), Vec3::from(v));
            let base = vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let p = (n + u * su + v * sv) * h;
                vertices.push(Vertex::new(
                    p.into(),
                    normal,
                    [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
                ));
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        MeshData::new(vertices, indices)
    }

    /// Cube with side 1
    pub fn unit_cube() -> MeshData {
        Self::cube(1.0)
    }

    /// 1x1 plane in XZ facing +Y
    pub fn unit_plane() -> MeshData {
        let n = [0.0, 1.0, 0.0];
        let vertices = vec![
            Vertex::new([-0.5, 0.0, 0.5], n, [0.0, 0.0]),
            Vertex::new([0.5, 0.0, 0.5], n, [1.0, 0.0]),
            Vertex::new([0.5, 0.0, -0.5], n, [1.0, 1.0]),
            Vertex::new([-0.5, 0.0, -0.5], n, [0.0, 1.0]),
        ];
        MeshData::new(vertices, vec![0, 1, 2, 0, 2, 3])
    }

    /// Single textured triangle in XY facing +Z
    pub fn triangle() -> MeshData {
        let n = [0.0, 0.0, 1.0];
        let vertices = vec![
            Vertex::new([-0.5, -0.5, 0.0], n, [0.0, 0.0]),
            Vertex::new([0.5, -0.5, 0.0], n, [1.0, 0.0]),
            Vertex::new([0.0, 0.5, 0.0], n, [0.5, 1.0]),
        ];
        MeshData::new(vertices, vec![0, 1, 2])
    }

    /// Cube of shared corners at +-1 for sky rendering
    ///
    /// Faces wind outward; the skybox draw culls front faces to see the inside.
    pub fn sky_cube() -> MeshData {
        let corners = [
            [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
            [1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, 1.0],
        ];
        let vertices = corners
            .iter()
            .map(|&p| Vertex::new(p, p, [0.0, 0.0]))
            .collect();
        let indices = vec![
            4, 5, 6, 4, 6, 7, // +Z
            1, 0, 3, 1, 3, 2, // -Z
            5, 1, 2, 5, 2, 6, // +X
            0, 4, 7, 0, 7, 3, // -X
            7, 6, 2, 7, 2, 3, // +Y
            0, 1, 5, 0, 5, 4, // -Y
        ];
        MeshData::new(vertices, indices)
    }
}
