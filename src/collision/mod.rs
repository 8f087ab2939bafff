// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision module - shape compilation, spatial index, registry and contact naming

mod contact;
mod highlight;
mod index;
pub mod pose;
mod query;
mod registry;
mod resolver;
mod shape;

pub use contact::{ContactRecord, RawContact};
pub use highlight::{ContactHighlights, ContactRay};
pub use index::{CollideRequest, SpatialIndex, SweepPruneIndex};
pub use query::ContactQuery;
pub use registry::{CollisionObject, ObjectRegistry};
pub use resolver::{resolve_pairs, CollisionPairKey, CollisionPairs, ContactGeometry};
pub use shape::{CollisionShape, ShapeId};
