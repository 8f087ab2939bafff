// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcollide
//!
//! Collision scene manager for named rigid triangle meshes. Tracks poses,
//! keeps the collision engine in step with them, and turns anonymous
//! triangle-level contacts into named, deduplicated collision pairs.

pub mod cli;
pub mod collision;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod scene;

pub use collision::{
    CollisionPairKey, CollisionPairs, ContactGeometry, ContactHighlights, ContactRecord,
    RawContact, ShapeId, SpatialIndex,
};
pub use config::SceneConfig;
pub use error::{Result, SceneError};
pub use geometry::{BoundingBox, Mesh, Primitive, Transform};
pub use io::{load_scene_file, SceneFile};
pub use scene::CollisionScene;

/// Load a scene file and register all of its objects
pub fn load_scene(path: &str) -> anyhow::Result<CollisionScene> {
    load_scene_file(path)?.build()
}
