// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Per-object contact data for renderers

use super::resolver::require_name;
use super::{ContactRecord, ObjectRegistry};
use crate::error::Result;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Contact position and normal, drawn as a line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactRay {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

/// Everything a viewer needs to mark contacts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactHighlights {
    /// Triangle indices in contact, one entry per registered object
    pub faces: BTreeMap<String, BTreeSet<usize>>,
    /// Nearest points, two per contact
    pub points: Vec<Point3<f64>>,
    pub rays: Vec<ContactRay>,
}

impl ContactHighlights {
    /// Bucket a contact set in one pass
    pub fn collect<C: ContactRecord>(registry: &ObjectRegistry, contacts: &[C]) -> Result<Self> {
        let mut highlights = Self {
            faces: registry
                .names()
                .map(|name| (name.to_string(), BTreeSet::new()))
                .collect(),
            points: Vec::with_capacity(contacts.len() * 2),
            rays: Vec::with_capacity(contacts.len()),
        };

        for contact in contacts {
            let (id1, id2) = contact.shape_ids();
            let (sub1, sub2) = contact.sub_elements();
            for (id, sub) in [(id1, sub1), (id2, sub2)] {
                let name = require_name(registry, id)?;
                highlights
                    .faces
                    .entry(name.to_string())
                    .or_default()
                    .insert(sub);
            }

            let (p1, p2) = contact.nearest_points();
            highlights.points.push(p1);
            highlights.points.push(p2);
            highlights.rays.push(ContactRay {
                origin: contact.position(),
                direction: contact.normal(),
            });
        }

        Ok(highlights)
    }

    /// Triangles of `name` that touch anything
    pub fn faces_of(&self, name: &str) -> Option<&BTreeSet<usize>> {
        self.faces.get(name)
    }

    pub fn contact_count(&self) -> usize {
        self.rays.len()
    }
}
