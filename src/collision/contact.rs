// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Raw contact records as reported by a spatial index

use super::ShapeId;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// What the resolver and highlighter need from any contact source
pub trait ContactRecord {
    /// Identifiers of the two shapes in contact
    fn shape_ids(&self) -> (ShapeId, ShapeId);
    /// Sub-element (triangle) index on each shape
    fn sub_elements(&self) -> (usize, usize);
    /// World-space contact position
    fn position(&self) -> Point3<f64>;
    /// Unit normal pointing from the first shape toward the second
    fn normal(&self) -> Vector3<f64>;
    /// Positive when interpenetrating, negative for near misses inside the margin
    fn penetration_depth(&self) -> f64;
    /// Nearest surface point on each shape, world space
    fn nearest_points(&self) -> (Point3<f64>, Point3<f64>);
}

/// Contact between two triangles of two registered shapes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawContact {
    pub shape1: ShapeId,
    pub shape2: ShapeId,
    pub triangle1: usize,
    pub triangle2: usize,
    pub position: Point3<f64>,
    pub normal: Vector3<f64>,
    pub penetration_depth: f64,
    pub nearest_point1: Point3<f64>,
    pub nearest_point2: Point3<f64>,
}

impl ContactRecord for RawContact {
    fn shape_ids(&self) -> (ShapeId, ShapeId) {
        (self.shape1, self.shape2)
    }

    fn sub_elements(&self) -> (usize, usize) {
        (self.triangle1, self.triangle2)
    }

    fn position(&self) -> Point3<f64> {
        self.position
    }

    fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    fn penetration_depth(&self) -> f64 {
        self.penetration_depth
    }

    fn nearest_points(&self) -> (Point3<f64>, Point3<f64>) {
        (self.nearest_point1, self.nearest_point2)
    }
}
