// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh representation, primitives and rigid transforms

mod bbox;
mod mesh;
mod primitives;
pub mod transform;

pub use bbox::BoundingBox;
pub use mesh::{Mesh, Triangle, Vertex};
pub use primitives::Primitive;
pub use transform::Transform;
