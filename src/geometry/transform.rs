// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Rigid transform helpers
//!
//! Transforms are column-vector homogeneous matrices: `world = T * local`.

use crate::error::{Result, SceneError};
use nalgebra::{DMatrix, Isometry3, Matrix3, Matrix4, Rotation3, Translation3, UnitQuaternion};

/// 4x4 homogeneous rigid transform
pub type Transform = Matrix4<f64>;

const RIGID_TOLERANCE: f64 = 1e-6;

/// Build a transform from a dynamically sized matrix, rejecting anything that is not 4x4
pub fn from_dmatrix(matrix: &DMatrix<f64>) -> Result<Transform> {
    if matrix.shape() != (4, 4) {
        return Err(SceneError::validation(format!(
            "transform must be 4x4, got {}x{}",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    let transform = Transform::from_fn(|r, c| matrix[(r, c)]);
    validate_rigid(&transform)?;
    Ok(transform)
}

/// Build a transform from row-major rows
pub fn from_rows(rows: &[Vec<f64>]) -> Result<Transform> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.len() != 4 || rows.iter().any(|row| row.len() != 4) {
        return Err(SceneError::validation(format!(
            "transform must be 4x4, got {}x{}",
            rows.len(),
            ncols
        )));
    }
    let transform = Transform::from_fn(|r, c| rows[r][c]);
    validate_rigid(&transform)?;
    Ok(transform)
}

/// Check that a 4x4 matrix is a proper rigid homogeneous transform
pub fn validate_rigid(transform: &Transform) -> Result<()> {
    if !transform.iter().all(|v| v.is_finite()) {
        return Err(SceneError::validation("transform has non-finite entries"));
    }

    let bottom = transform.fixed_view::<1, 4>(3, 0);
    if (bottom[0].abs() + bottom[1].abs() + bottom[2].abs() + (bottom[3] - 1.0).abs())
        > RIGID_TOLERANCE
    {
        return Err(SceneError::validation(
            "transform bottom row must be [0, 0, 0, 1]",
        ));
    }

    let rotation: Matrix3<f64> = transform.fixed_view::<3, 3>(0, 0).into_owned();
    let orthogonality = (rotation.transpose() * rotation - Matrix3::identity()).abs().max();
    if orthogonality > RIGID_TOLERANCE || (rotation.determinant() - 1.0).abs() > RIGID_TOLERANCE {
        return Err(SceneError::validation(
            "transform rotation block must be orthonormal with determinant +1",
        ));
    }

    Ok(())
}

/// Exact inverse of a rigid transform: `[R^T, -R^T t]`
pub fn rigid_inverse(transform: &Transform) -> Transform {
    let rotation_t = transform.fixed_view::<3, 3>(0, 0).transpose();
    let translation = transform.fixed_view::<3, 1>(0, 3).into_owned();

    let mut inverse = Transform::identity();
    inverse.fixed_view_mut::<3, 3>(0, 0).copy_from(&rotation_t);
    inverse
        .fixed_view_mut::<3, 1>(0, 3)
        .copy_from(&(-(rotation_t * translation)));
    inverse
}

/// Compose a relative delta on top of a previous absolute pose
pub fn compose(delta: &Transform, previous: &Transform) -> Transform {
    delta * previous
}

/// Convert to the isometry type the collision engine works with
pub fn to_isometry(transform: &Transform) -> Isometry3<f32> {
    let rotation = Rotation3::from_matrix(&transform.fixed_view::<3, 3>(0, 0).into_owned());
    let translation = transform.fixed_view::<3, 1>(0, 3);
    let iso = Isometry3::from_parts(
        Translation3::new(translation[0], translation[1], translation[2]),
        UnitQuaternion::from_rotation_matrix(&rotation),
    );
    iso.cast::<f32>()
}
