// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::BoundingBox;
use crate::error::{Result, SceneError};
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Vertex {
    pub fn new(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self { position, normal }
    }

    /// Apply a rigid transform. Normals only see the rotation part.
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        self.position = matrix.transform_point(&self.position);
        let normal = matrix.transform_vector(&self.normal);
        self.normal = normal.try_normalize(f64::EPSILON).unwrap_or(normal);
    }
}

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh holding world-space vertex positions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    /// Build a mesh from a raw vertex array and face index array.
    ///
    /// Vertex normals are the normalized sum of the adjacent face normals.
    pub fn from_raw(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Result<Self> {
        let mut normals = vec![Vector3::zeros(); positions.len()];
        for (face_idx, face) in faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i >= positions.len()) {
                return Err(SceneError::validation(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    face_idx,
                    bad,
                    positions.len()
                )));
            }
            let [a, b, c] = *face;
            let face_normal = (positions[b] - positions[a]).cross(&(positions[c] - positions[a]));
            for &i in face {
                normals[i] += face_normal;
            }
        }

        let vertices = positions
            .into_iter()
            .zip(normals)
            .map(|(p, n)| Vertex::new(p, n.try_normalize(f64::EPSILON).unwrap_or(n)))
            .collect();
        let triangles = faces.into_iter().map(Triangle::new).collect();

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, vertex: Vertex) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a triangle
    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Transform all vertices by a matrix
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for vertex in &mut self.vertices {
            vertex.transform(matrix);
        }
    }

    /// Extents of the vertex positions, `None` for an empty mesh
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.vertices.iter().map(|v| &v.position))
    }

    /// Mean of all vertex positions, `None` for an empty mesh
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.vertices.is_empty() {
            return None;
        }
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.position.coords);
        Some(Point3::from(sum / self.vertices.len() as f64))
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Check that the mesh can be compiled into a collision shape
    pub fn validate(&self) -> Result<()> {
        if self.triangles.is_empty() {
            return Err(SceneError::validation("mesh has no faces"));
        }

        for (idx, vertex) in self.vertices.iter().enumerate() {
            if !vertex.position.iter().all(|c| c.is_finite()) {
                return Err(SceneError::validation(format!(
                    "vertex {} has a non-finite coordinate",
                    idx
                )));
            }
        }

        for (idx, triangle) in self.triangles.iter().enumerate() {
            if let Some(&bad) = triangle.indices.iter().find(|&&i| i >= self.vertices.len()) {
                return Err(SceneError::validation(format!(
                    "face {} references vertex {} but the mesh has {} vertices",
                    idx,
                    bad,
                    self.vertices.len()
                )));
            }
        }

        Ok(())
    }
}
