// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Spatial index over registered collision shapes
//!
//! The broad phase keeps one world AABB per shape and finds candidate pairs
//! with a sweep along the x axis. Candidate pairs are handed to parry's
//! contact manifold dispatcher, which reports the triangle index on each side.

use super::{CollisionShape, RawContact, ShapeId};
use crate::error::{Result, SceneError};
use crate::geometry::Transform;
use log::trace;
use nalgebra::{Point3, Vector3};
use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::query::{
    ContactManifold, ContactManifoldsWorkspace, DefaultQueryDispatcher, PersistentQueryDispatcher,
};
use std::collections::BTreeMap;

const NORMAL_EPSILON: f64 = 1.0e-6;

/// Parameters of a single collision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollideRequest {
    /// Distance below which separated shapes still count as contacting
    pub security_margin: f64,
    /// Upper bound on the number of reported contacts
    pub max_contacts: usize,
}

/// Broad and narrow phase engine the scene drives
pub trait SpatialIndex {
    /// Insert a shape. A shape with the same id is replaced.
    fn register(&mut self, shape: CollisionShape);

    /// Remove a shape, returning it if it was registered
    fn unregister(&mut self, id: ShapeId) -> Option<CollisionShape>;

    fn contains(&self, id: ShapeId) -> bool;

    fn shape(&self, id: ShapeId) -> Option<&CollisionShape>;

    /// Move a registered shape. Bounds are refreshed lazily.
    fn set_pose(&mut self, id: ShapeId, pose: &Transform) -> Result<()>;

    /// Refresh the bounds of one shape now
    fn refresh(&mut self, id: ShapeId) -> Result<()>;

    /// Flush all pending bound refreshes
    fn update(&mut self);

    /// Report contacts between distinct registered shapes
    fn collide(&mut self, request: &CollideRequest) -> Result<Vec<RawContact>>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct Entry {
    shape: CollisionShape,
    aabb: Aabb,
    stale: bool,
}

impl Entry {
    fn new(shape: CollisionShape) -> Self {
        let aabb = shape.world_aabb();
        Self {
            shape,
            aabb,
            stale: false,
        }
    }

    fn refresh(&mut self) {
        self.aabb = self.shape.world_aabb();
        self.stale = false;
    }
}

/// Sweep-and-prune broad phase with parry narrow phase
#[derive(Default)]
pub struct SweepPruneIndex {
    entries: BTreeMap<ShapeId, Entry>,
}

impl SweepPruneIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs of shapes whose bounds, each loosened by half the margin, overlap.
    /// Pairs are ordered `(lower id, higher id)` and sorted.
    fn candidate_pairs(&self, margin: f32) -> Vec<(ShapeId, ShapeId)> {
        let mut boxes: Vec<(ShapeId, Aabb)> = self
            .entries
            .iter()
            .map(|(id, entry)| (*id, entry.aabb.loosened(margin / 2.0)))
            .collect();
        boxes.sort_by(|a, b| a.1.mins.x.total_cmp(&b.1.mins.x));

        let mut pairs = Vec::new();
        for (i, (id_a, aabb_a)) in boxes.iter().enumerate() {
            for (id_b, aabb_b) in &boxes[i + 1..] {
                if aabb_b.mins.x > aabb_a.maxs.x {
                    break;
                }
                if aabb_a.intersects(aabb_b) {
                    pairs.push(((*id_a).min(*id_b), (*id_a).max(*id_b)));
                }
            }
        }

        pairs.sort_unstable();
        pairs
    }

    fn collide_pair(
        a: &CollisionShape,
        b: &CollisionShape,
        margin: f32,
        out: &mut Vec<RawContact>,
    ) -> Result<()> {
        let pos1 = a.position();
        let pos2 = b.position();
        let pos12 = pos1.inv_mul(pos2);

        let mut manifolds: Vec<ContactManifold<(), ()>> = Vec::new();
        let mut workspace: Option<ContactManifoldsWorkspace> = None;
        DefaultQueryDispatcher
            .contact_manifolds(
                &pos12,
                a.trimesh(),
                b.trimesh(),
                margin,
                &mut manifolds,
                &mut workspace,
            )
            .map_err(|_| {
                SceneError::UnsupportedShapes(format!("{} against {}", a.id(), b.id()))
            })?;

        for manifold in &manifolds {
            // One contact per triangle pair: the deepest tracked point.
            let Some(deepest) = manifold
                .points
                .iter()
                .min_by(|x, y| x.dist.total_cmp(&y.dist))
            else {
                continue;
            };
            if deepest.dist > margin {
                continue;
            }

            let (local_p1, local_n1) = match &manifold.subshape_pos1 {
                Some(sub) => (sub * deepest.local_p1, sub * manifold.local_n1),
                None => (deepest.local_p1, manifold.local_n1),
            };
            let local_p2 = match &manifold.subshape_pos2 {
                Some(sub) => sub * deepest.local_p2,
                None => deepest.local_p2,
            };

            let point1: Point3<f64> = (pos1 * local_p1).cast::<f64>();
            let point2: Point3<f64> = (pos2 * local_p2).cast::<f64>();
            let triangle1 = manifold.subshape1 as usize;
            let normal = contact_normal(
                a,
                triangle1,
                (pos1 * local_n1).cast::<f64>(),
                point2 - point1,
                deepest.dist,
            );

            trace!(
                "{}[{}] x {}[{}] dist={}",
                a.id(),
                manifold.subshape1,
                b.id(),
                manifold.subshape2,
                deepest.dist
            );

            out.push(RawContact {
                shape1: a.id(),
                shape2: b.id(),
                triangle1,
                triangle2: manifold.subshape2 as usize,
                position: nalgebra::center(&point1, &point2),
                normal,
                penetration_depth: -f64::from(deepest.dist),
                nearest_point1: point1,
                nearest_point2: point2,
            });
        }

        Ok(())
    }
}

/// Unit normal pointing from shape 1 toward shape 2.
///
/// Coincident coplanar triangles yield a zero manifold normal. The witness
/// points are tried next, flipped when the shapes overlap, then the face
/// normal of the first triangle.
fn contact_normal(
    shape1: &CollisionShape,
    triangle1: usize,
    manifold_normal: Vector3<f64>,
    witness: Vector3<f64>,
    dist: f32,
) -> Vector3<f64> {
    let witness = if dist < 0.0 { -witness } else { witness };
    manifold_normal
        .try_normalize(NORMAL_EPSILON)
        .or_else(|| witness.try_normalize(NORMAL_EPSILON))
        .or_else(|| shape1.face_normal(triangle1))
        .unwrap_or_else(Vector3::z)
}

impl SpatialIndex for SweepPruneIndex {
    fn register(&mut self, shape: CollisionShape) {
        self.entries.insert(shape.id(), Entry::new(shape));
    }

    fn unregister(&mut self, id: ShapeId) -> Option<CollisionShape> {
        self.entries.remove(&id).map(|entry| entry.shape)
    }

    fn contains(&self, id: ShapeId) -> bool {
        self.entries.contains_key(&id)
    }

    fn shape(&self, id: ShapeId) -> Option<&CollisionShape> {
        self.entries.get(&id).map(|entry| &entry.shape)
    }

    fn set_pose(&mut self, id: ShapeId, pose: &Transform) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| SceneError::consistency(format!("{} is not in the spatial index", id)))?;
        entry.shape.set_pose(pose);
        entry.stale = true;
        Ok(())
    }

    fn refresh(&mut self, id: ShapeId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&id)
            .ok_or_else(|| SceneError::consistency(format!("{} is not in the spatial index", id)))?;
        entry.refresh();
        Ok(())
    }

    fn update(&mut self) {
        for entry in self.entries.values_mut().filter(|entry| entry.stale) {
            entry.refresh();
        }
    }

    fn collide(&mut self, request: &CollideRequest) -> Result<Vec<RawContact>> {
        self.update();

        let margin = request.security_margin as f32;
        let mut contacts = Vec::new();
        for (id_a, id_b) in self.candidate_pairs(margin) {
            let (Some(a), Some(b)) = (self.entries.get(&id_a), self.entries.get(&id_b)) else {
                continue;
            };
            Self::collide_pair(&a.shape, &b.shape, margin, &mut contacts)?;
            if contacts.len() >= request.max_contacts {
                contacts.truncate(request.max_contacts);
                break;
            }
        }

        Ok(contacts)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Translation3;

    fn unit_box(id: u64, x: f64) -> CollisionShape {
        let mesh = Primitive::cube(Vector3::new(1.0, 1.0, 1.0)).to_mesh();
        let pose = Translation3::new(x, 0.0, 0.0).to_homogeneous();
        CollisionShape::compile(ShapeId(id), &mesh, &pose).unwrap()
    }

    fn request() -> CollideRequest {
        CollideRequest {
            security_margin: 0.005,
            max_contacts: 1000,
        }
    }

    #[test]
    fn test_register_and_unregister() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(1, 0.0));
        index.register(unit_box(2, 5.0));
        assert_eq!(index.len(), 2);

        let removed = index.unregister(ShapeId(1)).unwrap();
        assert_eq!(removed.id(), ShapeId(1));
        assert!(!index.contains(ShapeId(1)));
        assert!(index.unregister(ShapeId(1)).is_none());
    }

    #[test]
    fn test_candidate_pairs() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(3, 0.0));
        index.register(unit_box(1, 0.9));
        index.register(unit_box(2, 10.0));

        assert_eq!(index.candidate_pairs(0.0), vec![(ShapeId(1), ShapeId(3))]);
        // A margin wide enough bridges the gap between 0.9 and 10.0
        assert_eq!(index.candidate_pairs(20.0).len(), 3);
    }

    #[test]
    fn test_separated_boxes_have_no_contacts() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(1, 0.0));
        index.register(unit_box(2, 10.0));
        assert!(index.collide(&request()).unwrap().is_empty());
    }

    #[test]
    fn test_overlapping_boxes_report_triangles() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(1, 0.0));
        index.register(unit_box(2, 0.5));

        let contacts = index.collide(&request()).unwrap();
        assert!(!contacts.is_empty());
        for contact in &contacts {
            assert_eq!(contact.shape1, ShapeId(1));
            assert_eq!(contact.shape2, ShapeId(2));
            assert!(contact.triangle1 < 12 && contact.triangle2 < 12);
            assert!(contact.penetration_depth >= -0.005 - 1e-6);
            assert!((contact.normal.norm() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_manifold_normal_falls_back() {
        let shape = unit_box(1, 0.0);

        // Witness points along -x while overlapping: the normal flips to +x
        let witness = Vector3::new(-0.2, 0.0, 0.0);
        let normal = contact_normal(&shape, 0, Vector3::zeros(), witness, -0.2);
        assert!((normal - Vector3::x()).norm() < 1e-9);

        // Coincident witnesses: face normal of triangle 0, the z+ face
        let normal = contact_normal(&shape, 0, Vector3::zeros(), Vector3::zeros(), 0.0);
        assert!((normal - Vector3::z()).norm() < 1e-6);

        let manifold_normal = Vector3::new(0.0, 2.0, 0.0);
        let normal = contact_normal(&shape, 4, manifold_normal, Vector3::zeros(), 0.0);
        assert!((normal - Vector3::y()).norm() < 1e-9);
    }

    #[test]
    fn test_pending_pose_is_flushed_before_query() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(1, 0.0));
        index.register(unit_box(2, 10.0));

        index
            .set_pose(ShapeId(2), &Translation3::new(0.5, 0.0, 0.0).to_homogeneous())
            .unwrap();
        assert!(!index.collide(&request()).unwrap().is_empty());
    }

    #[test]
    fn test_max_contacts_caps_results() {
        let mut index = SweepPruneIndex::new();
        index.register(unit_box(1, 0.0));
        index.register(unit_box(2, 0.5));

        let capped = CollideRequest {
            max_contacts: 1,
            ..request()
        };
        assert_eq!(index.collide(&capped).unwrap().len(), 1);
    }

    #[test]
    fn test_set_pose_unknown_shape() {
        let mut index = SweepPruneIndex::new();
        let err = index.set_pose(ShapeId(9), &Transform::identity()).unwrap_err();
        assert!(matches!(err, SceneError::Consistency(_)));
    }
}
