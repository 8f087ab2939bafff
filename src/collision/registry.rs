// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Name-keyed registry of collision objects

use super::ShapeId;
use crate::geometry::{Mesh, Transform};
use ahash::AHashMap;
use std::collections::BTreeMap;

/// One named body tracked by the scene
#[derive(Debug, Clone)]
pub struct CollisionObject {
    pub name: String,
    /// Handle of the compiled shape held by the spatial index
    pub shape_id: ShapeId,
    /// World-space mesh, transformed in place on every pose update
    pub mesh: Mesh,
    /// Last absolute pose, `None` until the object is first placed
    pub applied_transform: Option<Transform>,
}

impl CollisionObject {
    /// Current absolute pose; an unplaced object sits at the identity
    pub fn pose(&self) -> Transform {
        self.applied_transform.unwrap_or_else(Transform::identity)
    }
}

/// Maps names to objects and shape ids back to names
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: BTreeMap<String, CollisionObject>,
    names: AHashMap<ShapeId, String>,
    next_id: u64,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh shape id. Ids are never reused.
    pub fn allocate_id(&mut self) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Store an object, returning the one it replaced under the same name
    pub fn insert(&mut self, object: CollisionObject) -> Option<CollisionObject> {
        let previous = self.objects.remove(&object.name);
        if let Some(prev) = &previous {
            self.names.remove(&prev.shape_id);
        }
        self.names.insert(object.shape_id, object.name.clone());
        self.objects.insert(object.name.clone(), object);
        previous
    }

    pub fn get(&self, name: &str) -> Option<&CollisionObject> {
        self.objects.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CollisionObject> {
        self.objects.get_mut(name)
    }

    /// Copy of the current mesh registered under `name`
    pub fn mesh(&self, name: &str) -> Option<Mesh> {
        self.objects.get(name).map(|object| object.mesh.clone())
    }

    /// Snapshot of every registered mesh
    pub fn meshes(&self) -> BTreeMap<String, Mesh> {
        self.objects
            .iter()
            .map(|(name, object)| (name.clone(), object.mesh.clone()))
            .collect()
    }

    /// Reverse lookup from a shape id to the name it is registered under
    pub fn resolve_name(&self, id: ShapeId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollisionObject> {
        self.objects.values()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
