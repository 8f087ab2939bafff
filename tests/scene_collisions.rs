// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision scene integration tests

use anyhow::Result;
use approx::assert_relative_eq;
use meshcollide::collision::{ContactRecord, RawContact};
use meshcollide::{
    CollisionPairKey, CollisionScene, Mesh, Primitive, SceneError, SpatialIndex, Transform,
};
use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_cube() -> Mesh {
    Primitive::cube(Vector3::new(1.0, 1.0, 1.0)).to_mesh()
}

fn translation(x: f64, y: f64, z: f64) -> Transform {
    Translation3::new(x, y, z).to_homogeneous()
}

fn random_pose(rng: &mut StdRng) -> Transform {
    let iso = Translation3::new(
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
        rng.gen_range(-2.0..2.0),
    ) * UnitQuaternion::from_euler_angles(
        rng.gen_range(-3.0..3.0),
        rng.gen_range(-1.5..1.5),
        rng.gen_range(-3.0..3.0),
    );
    iso.to_homogeneous()
}

#[test]
fn test_repeated_add_replaces_object() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("link", unit_cube(), None)?;
    scene.add_object("link", unit_cube(), Some(&translation(5.0, 0.0, 0.0)))?;

    assert_eq!(scene.len(), 1);
    assert_eq!(scene.index().len(), 1);
    assert_eq!(scene.get_transform("link")?, translation(5.0, 0.0, 0.0));

    // The first shape sat at the origin; a dangling copy would collide here.
    scene.add_object("probe", unit_cube(), None)?;
    assert!(!scene.in_collision()?);
    Ok(())
}

#[test]
fn test_transform_round_trip() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("link", unit_cube(), None)?;

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let t = random_pose(&mut rng);
        scene.set_transform("link", &t, false)?;
        assert_relative_eq!(scene.get_transform("link")?, t, epsilon = 1e-12);
    }
    Ok(())
}

#[test]
fn test_relative_composition_law() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..10 {
        let t0 = random_pose(&mut rng);
        let delta = random_pose(&mut rng);

        let mut relative = CollisionScene::new();
        relative.add_object("a", unit_cube(), None)?;
        relative.set_transform("a", &t0, false)?;
        relative.set_transform("a", &delta, true)?;

        let mut absolute = CollisionScene::new();
        absolute.add_object("a", unit_cube(), None)?;
        absolute.set_transform("a", &(delta * t0), false)?;

        let got = relative.get_transform("a")?;
        assert_relative_eq!(got, delta * t0, epsilon = 1e-12);
        assert_relative_eq!(got, absolute.get_transform("a")?, epsilon = 1e-12);

        let mesh_relative = relative.get_object("a").unwrap();
        let mesh_absolute = absolute.get_object("a").unwrap();
        for (va, vb) in mesh_relative.vertices.iter().zip(&mesh_absolute.vertices) {
            assert_relative_eq!(va.position, vb.position, epsilon = 1e-9);
        }
    }
    Ok(())
}

#[test]
fn test_mesh_tracks_pose() -> Result<()> {
    // Off-center geometry so rotations move the centroid.
    let base = Mesh::from_raw(
        vec![
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 0.0, 1.0),
        ],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )?;
    let original_centroid = base.centroid().unwrap();

    let mut scene = CollisionScene::new();
    scene.add_object("tetra", base, None)?;

    let mut rng = StdRng::seed_from_u64(3);
    for step in 0..200 {
        let relative = step % 3 != 0;
        let t = if relative {
            let small = UnitQuaternion::from_euler_angles(
                rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.2..0.2),
                rng.gen_range(-0.2..0.2),
            );
            (Translation3::new(rng.gen_range(-0.1..0.1), 0.0, 0.0) * small).to_homogeneous()
        } else {
            random_pose(&mut rng)
        };
        scene.set_transform("tetra", &t, relative)?;

        let pose = scene.get_transform("tetra")?;
        let centroid = scene.get_object("tetra").unwrap().centroid().unwrap();
        assert_relative_eq!(centroid, pose.transform_point(&original_centroid), epsilon = 1e-8);
    }
    Ok(())
}

#[test]
fn test_returned_mesh_is_a_copy() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("link", unit_cube(), None)?;

    let mut copy = scene.get_object("link").unwrap();
    copy.transform(&translation(100.0, 0.0, 0.0));

    let centroid = scene.get_object("link").unwrap().centroid().unwrap();
    assert_relative_eq!(centroid, Point3::origin(), epsilon = 1e-12);
    assert_eq!(scene.get_objects().len(), 1);
    Ok(())
}

#[test]
fn test_separated_boxes_do_not_collide() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("left", unit_cube(), None)?;
    scene.add_object("right", unit_cube(), Some(&translation(10.0, 0.0, 0.0)))?;

    assert!(scene.query_contacts()?.is_empty());
    Ok(())
}

#[test]
fn test_overlapping_cubes_collide() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("cube_a", unit_cube(), None)?;
    scene.add_object("cube_b", unit_cube(), Some(&translation(0.5, 0.0, 0.0)))?;

    let contacts = scene.query_contacts()?;
    assert!(!contacts.is_empty());

    let margin = scene.query().security_margin();
    for contact in &contacts {
        let depth = contact.penetration_depth();
        assert!(depth >= -margin - 1e-5, "depth {} below the margin", depth);
        assert!(depth <= 0.5 + margin + 1e-5, "depth {} deeper than the overlap", depth);
        assert_relative_eq!(contact.normal().norm(), 1.0, epsilon = 1e-5);
    }

    let pairs = scene.resolve_pairs(&contacts, false)?;
    assert_eq!(pairs.len(), contacts.len());
    for key in pairs.keys() {
        let mut names = [key.name1.as_str(), key.name2.as_str()];
        names.sort_unstable();
        assert_eq!(names, ["cube_a", "cube_b"]);
        assert!(key.sub_element1 < 12 && key.sub_element2 < 12);
    }
    Ok(())
}

#[test]
fn test_rotated_overlap_reports_penetration() -> Result<()> {
    // A corner of the turned cube reaches about 0.31 into the other one.
    let mut scene = CollisionScene::new();
    scene.add_object("cube_a", unit_cube(), None)?;
    let turned = Translation3::new(0.9, 0.0, 0.0)
        * UnitQuaternion::from_euler_angles(0.0, 0.0, std::f64::consts::FRAC_PI_4);
    scene.add_object("cube_b", unit_cube(), Some(&turned.to_homogeneous()))?;

    let contacts = scene.query_contacts()?;
    let margin = scene.query().security_margin();
    let deepest = contacts
        .iter()
        .map(|c| c.penetration_depth())
        .fold(f64::NEG_INFINITY, f64::max);

    assert!(deepest > 0.0, "deepest contact {} does not overlap", deepest);
    assert!(deepest <= 0.5 + margin + 1e-5);
    for contact in &contacts {
        assert_relative_eq!(contact.normal().norm(), 1.0, epsilon = 1e-5);
    }
    Ok(())
}

#[test]
fn test_moving_apart_clears_contacts() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(0.5, 0.0, 0.0)))?;
    assert!(scene.in_collision()?);

    scene.set_transform("b", &translation(3.0, 0.0, 0.0), true)?;
    assert_relative_eq!(scene.get_transform("b")?, translation(3.5, 0.0, 0.0));
    assert!(!scene.in_collision()?);
    Ok(())
}

#[test]
fn test_security_margin_reports_near_miss() -> Result<()> {
    let config = meshcollide::SceneConfig {
        security_margin: 0.2,
        ..Default::default()
    };
    let mut scene = CollisionScene::with_config(&config)?;
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(1.1, 0.0, 0.0)))?;

    let contacts = scene.query_contacts()?;
    assert!(!contacts.is_empty());
    assert!(contacts.iter().all(|c| c.penetration_depth < 0.0));

    let mut tight = CollisionScene::new();
    tight.add_object("a", unit_cube(), None)?;
    tight.add_object("b", unit_cube(), Some(&translation(1.1, 0.0, 0.0)))?;
    assert!(!tight.in_collision()?);
    Ok(())
}

#[test]
fn test_duplicate_contacts_are_rejected() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(0.5, 0.0, 0.0)))?;

    let contacts = scene.query_contacts()?;
    let first = contacts[0];
    let duplicated: Vec<RawContact> = vec![first, first];

    let err = scene.resolve_pairs(&duplicated, false).unwrap_err();
    assert!(matches!(err, SceneError::Consistency(_)));
    Ok(())
}

#[test]
fn test_stale_contacts_after_replace_are_rejected() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(0.5, 0.0, 0.0)))?;
    let contacts = scene.query_contacts()?;

    // Re-adding retires the old shape id.
    scene.add_object("a", unit_cube(), None)?;
    let err = scene.resolve_pairs(&contacts, false).unwrap_err();
    assert!(matches!(err, SceneError::Consistency(_)));
    Ok(())
}

#[test]
fn test_bidirectional_pairs_are_mirrored() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(0.5, 0.2, 0.0)))?;

    let contacts = scene.query_contacts()?;
    let pairs = scene.resolve_pairs(&contacts, true)?;
    assert_eq!(pairs.len(), 2 * contacts.len());

    for (key, geometry) in &pairs {
        let mirror = CollisionPairKey::new(
            key.name2.clone(),
            key.name1.clone(),
            key.sub_element2,
            key.sub_element1,
        );
        let mirrored = pairs.get(&mirror).expect("mirrored key present");
        assert_eq!(mirrored.point1, geometry.point2);
        assert_eq!(mirrored.point2, geometry.point1);
    }
    Ok(())
}

#[test]
fn test_highlights_cover_every_object() -> Result<()> {
    let mut scene = CollisionScene::new();
    scene.add_object("a", unit_cube(), None)?;
    scene.add_object("b", unit_cube(), Some(&translation(0.5, 0.0, 0.0)))?;
    scene.add_object("far", unit_cube(), Some(&translation(0.0, 8.0, 0.0)))?;

    let contacts = scene.query_contacts()?;
    let highlights = scene.contact_highlights(&contacts)?;

    assert!(!highlights.faces_of("a").unwrap().is_empty());
    assert!(!highlights.faces_of("b").unwrap().is_empty());
    assert!(highlights.faces_of("far").unwrap().is_empty());
    assert_eq!(highlights.points.len(), 2 * contacts.len());
    assert_eq!(highlights.rays.len(), contacts.len());
    Ok(())
}

#[test]
fn test_unknown_names_are_not_found() {
    let mut scene = CollisionScene::new();
    assert!(matches!(
        scene.set_transform("nobody", &Transform::identity(), true),
        Err(SceneError::NotFound(_))
    ));
    assert!(matches!(
        scene.get_transform("nobody"),
        Err(SceneError::NotFound(_))
    ));
    assert!(scene.get_object("nobody").is_none());
}
