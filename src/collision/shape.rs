// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Compilation of meshes into engine-native collision shapes

use crate::error::Result;
use crate::geometry::{transform, BoundingBox, Mesh, Transform};
use nalgebra::{Isometry3, Point3, Vector3};
use parry3d::bounding_volume::Aabb;
use parry3d::shape::TriMesh;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persistent identifier stored inside a compiled shape.
///
/// Assigned once when the shape is compiled and never reused, so it stays
/// valid for reverse lookups for as long as the shape is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShapeId(pub u64);

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Immutable triangle geometry with a mutable placement
pub struct CollisionShape {
    id: ShapeId,
    trimesh: TriMesh,
    position: Isometry3<f32>,
}

impl CollisionShape {
    /// Build the triangle soup of `mesh` into a shape placed at `initial`
    pub fn compile(id: ShapeId, mesh: &Mesh, initial: &Transform) -> Result<Self> {
        mesh.validate()?;
        transform::validate_rigid(initial)?;

        let vertices: Vec<Point3<f32>> = mesh
            .vertices
            .iter()
            .map(|v| v.position.cast::<f32>())
            .collect();

        let indices: Vec<[u32; 3]> = mesh
            .triangles
            .iter()
            .map(|t| {
                [
                    t.indices[0] as u32,
                    t.indices[1] as u32,
                    t.indices[2] as u32,
                ]
            })
            .collect();

        Ok(Self {
            id,
            trimesh: TriMesh::new(vertices, indices),
            position: transform::to_isometry(initial),
        })
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn trimesh(&self) -> &TriMesh {
        &self.trimesh
    }

    pub fn position(&self) -> &Isometry3<f32> {
        &self.position
    }

    /// Replace rotation and translation; the geometry itself never changes
    pub fn set_pose(&mut self, pose: &Transform) {
        self.position = transform::to_isometry(pose);
    }

    /// World-space bounding box at the current placement
    pub fn world_aabb(&self) -> Aabb {
        self.trimesh.aabb(&self.position)
    }

    /// [`Self::world_aabb`] in scene precision
    pub fn world_bounds(&self) -> BoundingBox {
        let aabb = self.world_aabb();
        BoundingBox::new(aabb.mins.cast::<f64>(), aabb.maxs.cast::<f64>())
    }

    pub fn triangle_count(&self) -> usize {
        self.trimesh.indices().len()
    }

    /// Outward unit normal of one triangle at the current placement,
    /// `None` for an out-of-range index or a degenerate triangle
    pub fn face_normal(&self, triangle: usize) -> Option<Vector3<f64>> {
        let [a, b, c] = self
            .trimesh
            .indices()
            .get(triangle)?
            .map(|i| self.trimesh.vertices()[i as usize]);
        let local = (b - a).cross(&(c - a));
        let world = self.position.rotation * local;
        world.cast::<f64>().try_normalize(1.0e-12)
    }
}

impl fmt::Debug for CollisionShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionShape")
            .field("id", &self.id)
            .field("triangles", &self.triangle_count())
            .field("position", &self.position)
            .finish()
    }
}
