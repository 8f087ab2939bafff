// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::collision::{CollisionPairs, ContactHighlights, RawContact};
use crate::geometry::BoundingBox;
use colored::*;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Flattened collision pair, suitable for JSON output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairRecord {
    pub object1: String,
    pub object2: String,
    pub triangle1: usize,
    pub triangle2: usize,
    pub point1: Point3<f64>,
    pub point2: Point3<f64>,
}

/// Result of checking one scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub objects: usize,
    pub contacts: usize,
    pub possibly_truncated: bool,
    pub max_penetration: Option<f64>,
    pub pairs: Vec<PairRecord>,
    /// World-space extents of the objects, by name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extents: BTreeMap<String, BoundingBox>,
}

impl CheckReport {
    pub fn new(
        objects: usize,
        contacts: &[RawContact],
        pairs: &CollisionPairs,
        possibly_truncated: bool,
    ) -> Self {
        let max_penetration = contacts
            .iter()
            .map(|c| c.penetration_depth)
            .max_by(f64::total_cmp);

        Self {
            objects,
            contacts: contacts.len(),
            possibly_truncated,
            max_penetration,
            pairs: pairs
                .iter()
                .map(|(key, geometry)| PairRecord {
                    object1: key.name1.clone(),
                    object2: key.name2.clone(),
                    triangle1: key.sub_element1,
                    triangle2: key.sub_element2,
                    point1: geometry.point1,
                    point2: geometry.point2,
                })
                .collect(),
            extents: BTreeMap::new(),
        }
    }

    pub fn with_extents(mut self, extents: BTreeMap<String, BoundingBox>) -> Self {
        self.extents = extents;
        self
    }

    /// Distinct object pairs in contact, in order
    pub fn colliding_objects(&self) -> Vec<(&str, &str)> {
        let mut seen: Vec<(&str, &str)> = self
            .pairs
            .iter()
            .map(|p| (p.object1.as_str(), p.object2.as_str()))
            .collect();
        seen.dedup();
        seen
    }

    pub fn in_collision(&self) -> bool {
        self.contacts > 0
    }
}

/// CLI reporter for formatted output
pub struct Reporter;

impl Reporter {
    /// Report a collision check with colors
    pub fn report_check(file: &str, report: &CheckReport, duration: Duration) {
        println!("\n{}", "━".repeat(80).bright_black());
        println!("{} {}", "Scene:".bold(), file.cyan());
        println!("{}", "━".repeat(80).bright_black());

        if report.in_collision() {
            println!("{} {}", "❌".red(), "Collisions detected".red().bold());
        } else {
            println!("{} {}", "✅".green(), "Scene is collision free".green().bold());
        }

        println!(
            "  {} {}",
            "Objects:".bright_black(),
            report.objects.to_string().cyan()
        );
        println!(
            "  {} {}",
            "Contacts:".bright_black(),
            report.contacts.to_string().cyan()
        );
        if let Some(depth) = report.max_penetration {
            println!(
                "  {} {}",
                "Max penetration:".bright_black(),
                format!("{:.5}", depth).yellow()
            );
        }

        let objects = report.colliding_objects();
        if !objects.is_empty() {
            println!("\n{}", "Colliding pairs:".bold());
            for &(a, b) in &objects {
                let count = report
                    .pairs
                    .iter()
                    .filter(|p| p.object1 == a && p.object2 == b)
                    .count();
                println!(
                    "  {} {} {} {}",
                    a.cyan(),
                    "↔".bright_black(),
                    b.cyan(),
                    format!("({} triangle pairs)", count).bright_black()
                );
            }
        }

        let boxes: Vec<_> = report
            .extents
            .iter()
            .filter(|(name, _)| {
                objects
                    .iter()
                    .any(|&(a, b)| a == name.as_str() || b == name.as_str())
            })
            .collect();
        if !boxes.is_empty() {
            println!("\n{}", "Extents of colliding objects:".bold());
            for (name, bbox) in boxes {
                let center = bbox.center();
                let size = bbox.extent();
                println!(
                    "  {} {} {}",
                    name.cyan(),
                    format!("at ({:.3}, {:.3}, {:.3})", center.x, center.y, center.z).bright_black(),
                    format!("size {:.3} x {:.3} x {:.3}", size.x, size.y, size.z).bright_black()
                );
            }
        }

        if report.possibly_truncated {
            Self::report_warning("contact limit reached, results may be truncated");
        }

        println!(
            "\n  {} {}",
            "Time:".bright_black(),
            Self::format_duration(duration).yellow()
        );
        println!("{}", "━".repeat(80).bright_black());
    }

    /// Report the triangles of each object that are in contact
    pub fn report_highlights(highlights: &ContactHighlights) {
        println!("{}", "Triangles in contact:".bold());
        for (name, faces) in &highlights.faces {
            let list = faces
                .iter()
                .map(usize::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            if faces.is_empty() {
                println!("  {} {}", name.cyan(), "-".bright_black());
            } else {
                println!("  {} {}", name.cyan(), list);
            }
        }
        println!(
            "  {} {}",
            "Contact points:".bright_black(),
            highlights.points.len()
        );
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("\n{} {}", "❌ Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("\n{} {}", "⚠️  Warning:".yellow().bold(), message);
    }

    /// Format duration for display
    fn format_duration(duration: Duration) -> String {
        let micros = duration.as_micros();

        if micros < 1_000 {
            format!("{}µs", micros)
        } else if micros < 1_000_000 {
            format!("{:.2}ms", micros as f64 / 1_000.0)
        } else {
            format!("{:.2}s", micros as f64 / 1_000_000.0)
        }
    }
}
