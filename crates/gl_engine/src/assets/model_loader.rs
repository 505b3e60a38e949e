//! Wavefront OBJ loading through `tobj`
//!
//! Faces are triangulated and re-indexed so that every vertex carries one
//! position, normal and texture coordinate. Texture coordinates are flipped
//! vertically (`v -> 1 - v`) to match images uploaded top row first.

use std::path::Path;

use crate::assets::{AssetError, AssetResult};
use crate::foundation::math::{utils, Mat4, Point3, Vec3};
use crate::render::primitives::{MeshData, Vertex};

/// Options applied while importing a model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Matrix baked into positions and normals
    pub pre_transform: Option<Mat4>,
    /// Recompute normals even if the file provides them
    pub generate_normals: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { pre_transform: None, generate_normals: false }
    }
}

/// OBJ model importer
pub struct ModelLoader;

impl ModelLoader {
    /// Load the first mesh of a model file
    pub fn load_first_mesh(path: impl AsRef<Path>, options: &LoadOptions) -> AssetResult<MeshData> {
        let path = path.as_ref();
        let mut meshes = Self::import(path, options, true)?;
        if meshes.is_empty() {
            return Err(AssetError::NoMeshes(path.to_path_buf()));
        }
        Ok(meshes.swap_remove(0))
    }

    /// Load every mesh of a model file in file order
    pub fn load_all_meshes(path: impl AsRef<Path>, options: &LoadOptions) -> AssetResult<Vec<MeshData>> {
        let path = path.as_ref();
        let meshes = Self::import(path, options, false)?;
        if meshes.is_empty() {
            return Err(AssetError::NoMeshes(path.to_path_buf()));
        }
        Ok(meshes)
    }

    fn import(path: &Path, options: &LoadOptions, first_only: bool) -> AssetResult<Vec<MeshData>> {
        let import_options = tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ignore_points: true,
            ignore_lines: true,
            ..tobj::LoadOptions::default()
        };
        let (models, _materials) = tobj::load_obj(path, &import_options).map_err(|source| match source {
            tobj::LoadError::OpenFileFailed => AssetError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "cannot open model file"),
            },
            source => AssetError::MeshImport { path: path.to_path_buf(), source },
        })?;

        let take = if first_only { 1 } else { models.len() };
        let meshes: Vec<MeshData> = models
            .iter()
            .filter(|model| !model.mesh.indices.is_empty())
            .take(take)
            .map(|model| Self::convert(&model.mesh, options))
            .collect();

        for mesh in &meshes {
            log::debug!(
                "Imported mesh from {}: {} vertices, {} triangles",
                path.display(),
                mesh.vertices.len(),
                mesh.triangle_count()
            );
        }
        Ok(meshes)
    }

    fn convert(mesh: &tobj::Mesh, options: &LoadOptions) -> MeshData {
        let vertex_count = mesh.positions.len() / 3;
        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_uvs = mesh.texcoords.len() / 2 == vertex_count;

        let vertices = (0..vertex_count)
            .map(|i| {
                let position = [mesh.positions[3 * i], mesh.positions[3 * i + 1], mesh.positions[3 * i + 2]];
                let normal = if has_normals {
                    [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
                } else {
                    [0.0; 3]
                };
                let tex_coord = if has_uvs {
                    [mesh.texcoords[2 * i], 1.0 - mesh.texcoords[2 * i + 1]]
                } else {
                    [0.0; 2]
                };
                Vertex::new(position, normal, tex_coord)
            })
            .collect();

        let mut data = MeshData::new(vertices, mesh.indices.clone());
        if let Some(matrix) = options.pre_transform {
            Self::apply_transform(&mut data, &matrix);
        }
        if options.generate_normals || !has_normals {
            data.generate_normals();
        }
        data
    }

    fn apply_transform(data: &mut MeshData, matrix: &Mat4) {
        let normal_matrix = utils::upper_left_3x3(&utils::inverse_or_identity(matrix)).transpose();
        for vertex in &mut data.vertices {
            let position = matrix.transform_point(&Point3::from(vertex.position));
            vertex.position = [position.x, position.y, position.z];
            let normal = utils::normalize_or(normal_matrix * Vec3::from(vertex.normal), Vec3::zeros());
            vertex.normal = normal.into();
        }
    }
}
