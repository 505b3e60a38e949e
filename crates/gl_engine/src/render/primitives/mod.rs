//! Geometry primitives

pub mod mesh;

pub use mesh::{MeshData, MeshFactory, Vertex};
