// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator
//!
//! All primitives are centered at the origin and use outward winding.

use super::Mesh;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

const DEFAULT_SEGMENTS: u32 = 32;

/// Geometric primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Primitive {
    #[serde(rename = "box")]
    Cuboid { size: [f64; 3] },
    Sphere {
        radius: f64,
        #[serde(default = "default_segments")]
        segments: u32,
    },
    Cylinder {
        height: f64,
        radius: f64,
        #[serde(default = "default_segments")]
        segments: u32,
    },
}

fn default_segments() -> u32 {
    DEFAULT_SEGMENTS
}

impl Primitive {
    pub fn cube(size: Vector3<f64>) -> Self {
        Self::Cuboid {
            size: [size.x, size.y, size.z],
        }
    }

    pub fn sphere(radius: f64, segments: u32) -> Self {
        Self::Sphere {
            radius,
            segments: segments.max(3),
        }
    }

    pub fn cylinder(height: f64, radius: f64, segments: u32) -> Self {
        Self::Cylinder {
            height,
            radius,
            segments: segments.max(3),
        }
    }

    pub fn to_mesh(&self) -> Mesh {
        match self {
            Self::Cuboid { size } => generate_box_mesh(Vector3::from(*size)),
            Self::Sphere { radius, segments } => generate_sphere_mesh(*radius, (*segments).max(3)),
            Self::Cylinder {
                height,
                radius,
                segments,
            } => generate_cylinder_mesh(*height, *radius, (*segments).max(3)),
        }
    }
}

fn build(positions: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Mesh {
    // Generated faces only reference generated vertices.
    Mesh::from_raw(positions, faces).unwrap_or_default()
}

fn generate_box_mesh(size: Vector3<f64>) -> Mesh {
    let h = size / 2.0;

    let positions = vec![
        Point3::new(-h.x, -h.y, -h.z),
        Point3::new(h.x, -h.y, -h.z),
        Point3::new(h.x, h.y, -h.z),
        Point3::new(-h.x, h.y, -h.z),
        Point3::new(-h.x, -h.y, h.z),
        Point3::new(h.x, -h.y, h.z),
        Point3::new(h.x, h.y, h.z),
        Point3::new(-h.x, h.y, h.z),
    ];

    let faces = vec![
        // z+
        [4, 5, 6],
        [4, 6, 7],
        // z-
        [1, 0, 3],
        [1, 3, 2],
        // x+
        [5, 1, 2],
        [5, 2, 6],
        // x-
        [0, 4, 7],
        [0, 7, 3],
        // y+
        [7, 6, 2],
        [7, 2, 3],
        // y-
        [0, 1, 5],
        [0, 5, 4],
    ];

    build(positions, faces)
}

fn generate_sphere_mesh(radius: f64, segments: u32) -> Mesh {
    let stacks = segments as usize;
    let slices = segments as usize;

    // Poles are single vertices so no triangle degenerates.
    let mut positions = vec![Point3::new(0.0, radius, 0.0)];
    for i in 1..stacks {
        let phi = PI * i as f64 / stacks as f64;
        let y = radius * phi.cos();
        let r = radius * phi.sin();
        for j in 0..slices {
            let theta = 2.0 * PI * j as f64 / slices as f64;
            positions.push(Point3::new(r * theta.cos(), y, r * theta.sin()));
        }
    }
    let south = positions.len();
    positions.push(Point3::new(0.0, -radius, 0.0));

    let ring = |i: usize, j: usize| 1 + (i - 1) * slices + (j % slices);
    let mut faces = Vec::with_capacity(2 * slices * (stacks - 1));

    for j in 0..slices {
        faces.push([0, ring(1, j + 1), ring(1, j)]);
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let a = ring(i, j);
            let b = ring(i, j + 1);
            let c = ring(i + 1, j);
            let d = ring(i + 1, j + 1);
            faces.push([a, b, c]);
            faces.push([b, d, c]);
        }
    }
    for j in 0..slices {
        faces.push([south, ring(stacks - 1, j), ring(stacks - 1, j + 1)]);
    }

    build(positions, faces)
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> Mesh {
    let n = segments as usize;
    let half = height / 2.0;

    let mut positions = vec![Point3::new(0.0, 0.0, -half), Point3::new(0.0, 0.0, half)];
    for i in 0..n {
        let angle = 2.0 * PI * i as f64 / n as f64;
        let (sin, cos) = angle.sin_cos();
        positions.push(Point3::new(radius * cos, radius * sin, -half));
        positions.push(Point3::new(radius * cos, radius * sin, half));
    }

    let bottom = |i: usize| 2 + 2 * (i % n);
    let top = |i: usize| 3 + 2 * (i % n);
    let mut faces = Vec::with_capacity(4 * n);

    for i in 0..n {
        faces.push([0, bottom(i + 1), bottom(i)]);
        faces.push([1, top(i), top(i + 1)]);
        faces.push([bottom(i), bottom(i + 1), top(i)]);
        faces.push([top(i), bottom(i + 1), top(i + 1)]);
    }

    build(positions, faces)
}
