// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for scene operations

use thiserror::Error;

/// Errors surfaced by the collision scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// Malformed input at the API boundary (bad transform, bad mesh)
    #[error("validation error: {0}")]
    Validation(String),

    /// An operation referenced a name that is not registered
    #[error("object not found: {0}")]
    NotFound(String),

    /// The registry and the spatial index disagree
    #[error("consistency error: {0}")]
    Consistency(String),

    /// The collision engine cannot compute contacts for a shape pair
    #[error("unsupported shape pair: {0}")]
    UnsupportedShapes(String),
}

impl SceneError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    pub fn consistency(msg: impl Into<String>) -> Self {
        Self::Consistency(msg.into())
    }
}

/// Result alias for scene operations
pub type Result<T> = std::result::Result<T, SceneError>;
