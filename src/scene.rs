// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision scene API
//!
//! A [`CollisionScene`] owns the object registry and the spatial index and
//! keeps them in step. All operations are synchronous; callers sharing a
//! scene across threads must serialize access themselves.

use crate::collision::{
    pose, resolve_pairs, CollisionObject, CollisionPairs, CollisionShape, ContactHighlights,
    ContactQuery, ContactRecord, ObjectRegistry, RawContact, SpatialIndex, SweepPruneIndex,
};
use crate::config::SceneConfig;
use crate::error::{Result, SceneError};
use crate::geometry::{transform, BoundingBox, Mesh, Transform};
use log::debug;
use nalgebra::DMatrix;
use std::collections::BTreeMap;
use std::fmt;

/// Named rigid meshes and their collision state
pub struct CollisionScene<I: SpatialIndex = SweepPruneIndex> {
    registry: ObjectRegistry,
    index: I,
    query: ContactQuery,
}

impl CollisionScene {
    /// Create a scene with default query settings
    pub fn new() -> Self {
        Self {
            registry: ObjectRegistry::new(),
            index: SweepPruneIndex::new(),
            query: ContactQuery::default(),
        }
    }

    /// Create a scene with explicit query settings
    pub fn with_config(config: &SceneConfig) -> Result<Self> {
        Self::with_index(SweepPruneIndex::new(), config)
    }
}

impl Default for CollisionScene {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SpatialIndex> fmt::Debug for CollisionScene<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionScene")
            .field("objects", &self.object_names())
            .field("shapes", &self.index.len())
            .field("query", &self.query)
            .finish()
    }
}

impl<I: SpatialIndex> CollisionScene<I> {
    /// Create a scene over a caller-provided spatial index
    pub fn with_index(index: I, config: &SceneConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| SceneError::validation(e.to_string()))?;
        Ok(Self {
            registry: ObjectRegistry::new(),
            index,
            query: ContactQuery::from_config(config),
        })
    }

    /// Register `mesh` under `name`, replacing any object of the same name.
    ///
    /// The mesh is taken in its local frame. With a transform the stored
    /// mesh is moved to that pose and the transform becomes the applied pose.
    pub fn add_object(
        &mut self,
        name: impl Into<String>,
        mut mesh: Mesh,
        transform: Option<&Transform>,
    ) -> Result<()> {
        let name = name.into();
        let initial = transform.copied().unwrap_or_else(Transform::identity);

        let replaced = self.registry.get(&name).map(|object| object.shape_id);
        if let Some(old_id) = replaced {
            if !self.index.contains(old_id) {
                return Err(SceneError::consistency(format!(
                    "'{}' is registered as {} but the spatial index does not hold it",
                    name, old_id
                )));
            }
        }

        let shape_id = self.registry.allocate_id();
        let shape = CollisionShape::compile(shape_id, &mesh, &initial)?;
        if transform.is_some() {
            mesh.transform(&initial);
        }

        if let Some(old_id) = replaced {
            self.index.unregister(old_id);
            debug!("replacing '{}': {} -> {}", name, old_id, shape_id);
        }
        debug!(
            "registered '{}' as {} ({} triangles)",
            name,
            shape_id,
            shape.triangle_count()
        );

        self.index.register(shape);
        self.registry.insert(CollisionObject {
            name,
            shape_id,
            mesh,
            applied_transform: transform.copied(),
        });
        self.index.update();
        Ok(())
    }

    /// Like [`add_object`](Self::add_object) for a transform of unchecked shape
    pub fn add_object_with_matrix(
        &mut self,
        name: impl Into<String>,
        mesh: Mesh,
        transform: &DMatrix<f64>,
    ) -> Result<()> {
        let transform = transform::from_dmatrix(transform)?;
        self.add_object(name, mesh, Some(&transform))
    }

    /// Set the absolute pose of `name`, or compose a delta onto it when `relative`
    pub fn set_transform(&mut self, name: &str, transform: &Transform, relative: bool) -> Result<()> {
        let object = self
            .registry
            .get_mut(name)
            .ok_or_else(|| SceneError::not_found(name))?;
        pose::apply_pose(object, &mut self.index, transform, relative)
    }

    /// Like [`set_transform`](Self::set_transform) for a transform of unchecked shape
    pub fn set_transform_with_matrix(
        &mut self,
        name: &str,
        transform: &DMatrix<f64>,
        relative: bool,
    ) -> Result<()> {
        if !self.registry.contains(name) {
            return Err(SceneError::not_found(name));
        }
        let transform = transform::from_dmatrix(transform)?;
        self.set_transform(name, &transform, relative)
    }

    /// Current absolute pose of `name`
    pub fn get_transform(&self, name: &str) -> Result<Transform> {
        self.registry
            .get(name)
            .map(CollisionObject::pose)
            .ok_or_else(|| SceneError::not_found(name))
    }

    /// Copy of the world-space mesh of `name`
    pub fn get_object(&self, name: &str) -> Option<Mesh> {
        self.registry.mesh(name)
    }

    /// Copies of all registered meshes
    pub fn get_objects(&self) -> BTreeMap<String, Mesh> {
        self.registry.meshes()
    }

    /// Run the narrow phase over every registered pair
    pub fn query_contacts(&mut self) -> Result<Vec<RawContact>> {
        self.query.run(&mut self.index)
    }

    /// Whether any two registered objects are in contact
    pub fn in_collision(&mut self) -> Result<bool> {
        Ok(!self.query_contacts()?.is_empty())
    }

    /// Name and deduplicate raw contacts
    pub fn resolve_pairs<C: ContactRecord>(
        &self,
        contacts: &[C],
        bidirectional: bool,
    ) -> Result<CollisionPairs> {
        resolve_pairs(&self.registry, contacts, bidirectional)
    }

    /// Triangles, points and rays to highlight for a set of contacts
    pub fn contact_highlights<C: ContactRecord>(&self, contacts: &[C]) -> Result<ContactHighlights> {
        ContactHighlights::collect(&self.registry, contacts)
    }

    /// World-space extents of one object's mesh
    pub fn object_bounds(&self, name: &str) -> Option<BoundingBox> {
        self.registry.get(name)?.mesh.bounding_box()
    }

    /// World-space extents of every object, by name
    pub fn object_extents(&self) -> BTreeMap<String, BoundingBox> {
        self.registry
            .iter()
            .filter_map(|object| Some((object.name.clone(), object.mesh.bounding_box()?)))
            .collect()
    }

    pub fn query(&self) -> &ContactQuery {
        &self.query
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    pub fn object_names(&self) -> Vec<String> {
        self.registry.names().map(str::to_string).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
