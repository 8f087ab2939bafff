// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! TOML scene descriptions

use crate::config::SceneConfig;
use crate::geometry::{transform, Primitive, Transform};
use crate::scene::CollisionScene;
use anyhow::{Context, Result};
use nalgebra::{Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One object entry of a scene file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSpec {
    pub name: String,
    pub shape: Primitive,
    /// Full 4x4 pose given as rows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Vec<Vec<f64>>>,
    /// Translation, used when `transform` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f64; 3]>,
    /// Roll, pitch, yaw in radians, used when `transform` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f64; 3]>,
}

impl ObjectSpec {
    /// Initial pose, `None` when the entry gives no placement at all
    pub fn pose(&self) -> Result<Option<Transform>> {
        if let Some(rows) = &self.transform {
            let t = transform::from_rows(rows)
                .with_context(|| format!("Invalid transform for object '{}'", self.name))?;
            return Ok(Some(t));
        }
        if self.translation.is_none() && self.rotation.is_none() {
            return Ok(None);
        }

        let [x, y, z] = self.translation.unwrap_or_default();
        let [roll, pitch, yaw] = self.rotation.unwrap_or_default();
        let iso = Translation3::new(x, y, z) * UnitQuaternion::from_euler_angles(roll, pitch, yaw);
        Ok(Some(iso.to_homogeneous()))
    }
}

/// Scene file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    /// Query settings; `None` when the file has no `[config]` table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<SceneConfig>,
    #[serde(default)]
    pub objects: Vec<ObjectSpec>,
}

impl SceneFile {
    pub fn parse(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse scene description")
    }

    /// Settings of the `[config]` table, else [`SceneConfig::load`]
    pub fn resolve_config(&self) -> Result<SceneConfig> {
        match &self.config {
            Some(config) => Ok(config.clone()),
            None => SceneConfig::load(),
        }
    }

    /// Register every object, in file order, into a fresh scene using the
    /// file's settings or the defaults
    pub fn build(&self) -> Result<CollisionScene> {
        self.build_with(&self.config.clone().unwrap_or_default())
    }

    /// Register every object, in file order, into a fresh scene
    pub fn build_with(&self, config: &SceneConfig) -> Result<CollisionScene> {
        let mut scene = CollisionScene::with_config(config)?;
        for object in &self.objects {
            let pose = object.pose()?;
            scene
                .add_object(object.name.clone(), object.shape.to_mesh(), pose.as_ref())
                .with_context(|| format!("Failed to add object '{}'", object.name))?;
        }
        Ok(scene)
    }
}

/// Read and parse a scene file
pub fn load_scene_file(path: impl AsRef<Path>) -> Result<SceneFile> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scene file: {}", path.display()))?;
    SceneFile::parse(&source).with_context(|| format!("Failed to load scene file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SCENE: &str = r#"
[config]
security_margin = 0.01

[[objects]]
name = "table"
shape = { kind = "box", size = [2.0, 2.0, 0.1] }
translation = [0.0, 0.0, -0.05]

[[objects]]
name = "cup"
shape = { kind = "cylinder", height = 0.2, radius = 0.05, segments = 16 }
transform = [
    [1.0, 0.0, 0.0, 0.3],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.1],
    [0.0, 0.0, 0.0, 1.0],
]

[[objects]]
name = "ball"
shape = { kind = "sphere", radius = 0.1 }
"#;

    #[test]
    fn test_parse_and_build() -> Result<()> {
        let file = SceneFile::parse(SCENE)?;
        assert_eq!(file.objects.len(), 3);
        assert_eq!(file.config.as_ref().unwrap().security_margin, 0.01);

        let scene = file.build()?;
        assert_eq!(scene.len(), 3);
        assert_eq!(scene.get_transform("cup")?[(0, 3)], 0.3);
        assert_eq!(scene.get_transform("table")?[(2, 3)], -0.05);
        assert_eq!(scene.get_transform("ball")?, Transform::identity());
        Ok(())
    }

    #[test]
    fn test_bad_transform_rows() {
        let source = r#"
[[objects]]
name = "bad"
shape = { kind = "box", size = [1.0, 1.0, 1.0] }
transform = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
"#;
        let file = SceneFile::parse(source).unwrap();
        assert!(file.config.is_none());
        let err = file.build().unwrap_err();
        assert!(format!("{:#}", err).contains("4x4"));
    }

    #[test]
    fn test_build_with_overrides_settings() -> Result<()> {
        let file = SceneFile::parse(SCENE)?;
        let config = SceneConfig {
            security_margin: 0.3,
            max_contacts: 5,
        };
        let scene = file.build_with(&config)?;
        assert_eq!(scene.query().security_margin(), 0.3);
        assert_eq!(scene.query().max_contacts(), 5);
        assert_eq!(file.resolve_config()?.security_margin, 0.01);
        Ok(())
    }

    #[test]
    fn test_load_scene_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        write!(file, "{}", SCENE)?;
        let scene_file = load_scene_file(file.path())?;
        assert_eq!(scene_file.objects[1].name, "cup");
        Ok(())
    }
}
