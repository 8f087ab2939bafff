// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - scene description files

mod scene_file;

pub use scene_file::{load_scene_file, ObjectSpec, SceneFile};
