// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned extents of world-space geometry

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Tightest box around `points`, `None` when there are none
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = *points.next()?;
        Some(points.fold(Self::new(first, first), |bbox, p| {
            Self::new(bbox.min.inf(p), bbox.max.sup(p))
        }))
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Edge lengths along x, y and z
    pub fn extent(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Grow every face outward by `amount`
    pub fn loosened(&self, amount: f64) -> Self {
        let pad = Vector3::repeat(amount);
        Self::new(self.min - pad, self.max + pad)
    }

    /// Inclusive point test
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }

    pub fn contains_box(&self, other: &BoundingBox) -> bool {
        self.contains(&other.min) && self.contains(&other.max)
    }

    /// Closed-interval overlap on every axis
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        (0..3).all(|i| self.min[i] <= other.max[i] && other.min[i] <= self.max[i])
    }
}
