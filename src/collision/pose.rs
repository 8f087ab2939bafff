// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pose updates that keep shape, index bounds, mesh and applied transform in step

use super::{CollisionObject, SpatialIndex};
use crate::error::Result;
use crate::geometry::transform::{self, Transform};
use log::debug;

/// Absolute pose an update resolves to.
///
/// A relative delta is composed on top of the previous absolute pose, so
/// it acts in world space: `new = delta * previous`.
pub fn target_pose(object: &CollisionObject, update: &Transform, relative: bool) -> Transform {
    if relative {
        transform::compose(update, &object.pose())
    } else {
        *update
    }
}

/// Move `object` to a new pose.
///
/// Every check that can fail runs before the first mutation, so a failed
/// update leaves the object and the index untouched.
pub fn apply_pose<I: SpatialIndex + ?Sized>(
    object: &mut CollisionObject,
    index: &mut I,
    update: &Transform,
    relative: bool,
) -> Result<()> {
    transform::validate_rigid(update)?;
    let pose = target_pose(object, update, relative);
    transform::validate_rigid(&pose)?;

    index.set_pose(object.shape_id, &pose)?;
    index.refresh(object.shape_id)?;

    // The mesh holds world coordinates: undo the old pose, then apply the new one.
    if let Some(previous) = &object.applied_transform {
        object.mesh.transform(&transform::rigid_inverse(previous));
    }
    object.mesh.transform(&pose);
    object.applied_transform = Some(pose);

    debug!(
        "moved '{}' ({}) to translation [{:.4}, {:.4}, {:.4}]",
        object.name,
        object.shape_id,
        pose[(0, 3)],
        pose[(1, 3)],
        pose[(2, 3)]
    );

    Ok(())
}
