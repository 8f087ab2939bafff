// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Translation of raw contacts into named collision pairs

use super::{ContactRecord, ObjectRegistry, ShapeId};
use crate::error::{Result, SceneError};
use log::warn;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// `(name a, name b, triangle on a, triangle on b)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CollisionPairKey {
    pub name1: String,
    pub name2: String,
    pub sub_element1: usize,
    pub sub_element2: usize,
}

impl CollisionPairKey {
    pub fn new(
        name1: impl Into<String>,
        name2: impl Into<String>,
        sub_element1: usize,
        sub_element2: usize,
    ) -> Self {
        Self {
            name1: name1.into(),
            name2: name2.into(),
            sub_element1,
            sub_element2,
        }
    }

    /// Same contact seen from the other object
    pub fn mirrored(&self) -> Self {
        Self {
            name1: self.name2.clone(),
            name2: self.name1.clone(),
            sub_element1: self.sub_element2,
            sub_element2: self.sub_element1,
        }
    }
}

impl fmt::Display for CollisionPairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}[{}], {}[{}])",
            self.name1, self.sub_element1, self.name2, self.sub_element2
        )
    }
}

/// Nearest points on the two colliding sub-elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactGeometry {
    pub point1: Point3<f64>,
    pub point2: Point3<f64>,
}

impl ContactGeometry {
    pub fn swapped(&self) -> Self {
        Self {
            point1: self.point2,
            point2: self.point1,
        }
    }
}

/// Named pairs produced by one query
pub type CollisionPairs = BTreeMap<CollisionPairKey, ContactGeometry>;

/// Name a shape id or fail: the engine reported a shape the registry never tracked
pub(crate) fn require_name(registry: &ObjectRegistry, id: ShapeId) -> Result<&str> {
    registry.resolve_name(id).ok_or_else(|| {
        SceneError::consistency(format!("contact references unregistered {}", id))
    })
}

fn insert_unique(
    pairs: &mut CollisionPairs,
    key: CollisionPairKey,
    geometry: ContactGeometry,
) -> Result<()> {
    match pairs.entry(key) {
        Entry::Occupied(occupied) => {
            warn!("conflicting contact pairs for {}", occupied.key());
            Err(SceneError::consistency(format!(
                "conflicting contact pairs for {}",
                occupied.key()
            )))
        }
        Entry::Vacant(vacant) => {
            vacant.insert(geometry);
            Ok(())
        }
    }
}

/// Relabel raw contacts with registered names.
///
/// Only the engine's nearest points are carried over; nothing is recomputed.
pub fn resolve_pairs<C: ContactRecord>(
    registry: &ObjectRegistry,
    contacts: &[C],
    bidirectional: bool,
) -> Result<CollisionPairs> {
    let mut pairs = CollisionPairs::new();

    for contact in contacts {
        let (id1, id2) = contact.shape_ids();
        let name1 = require_name(registry, id1)?;
        let name2 = require_name(registry, id2)?;
        let (sub1, sub2) = contact.sub_elements();
        let (point1, point2) = contact.nearest_points();

        let key = CollisionPairKey::new(name1, name2, sub1, sub2);
        let geometry = ContactGeometry { point1, point2 };

        let mirror = bidirectional.then(|| key.mirrored()).filter(|m| *m != key);
        insert_unique(&mut pairs, key, geometry)?;
        if let Some(mirror) = mirror {
            insert_unique(&mut pairs, mirror, geometry.swapped())?;
        }
    }

    Ok(pairs)
}
