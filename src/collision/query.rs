// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Collision queries against the spatial index

use super::{CollideRequest, RawContact, SpatialIndex};
use crate::config::SceneConfig;
use crate::error::Result;
use log::{debug, warn};
use std::time::Instant;

/// Query settings fixed when the scene is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactQuery {
    request: CollideRequest,
}

impl ContactQuery {
    pub fn new(security_margin: f64, max_contacts: usize) -> Self {
        Self {
            request: CollideRequest {
                security_margin,
                max_contacts,
            },
        }
    }

    pub fn from_config(config: &SceneConfig) -> Self {
        Self::new(config.security_margin, config.max_contacts)
    }

    pub fn security_margin(&self) -> f64 {
        self.request.security_margin
    }

    pub fn max_contacts(&self) -> usize {
        self.request.max_contacts
    }

    /// A result holding exactly `max_contacts` entries may have been cut short
    pub fn is_possibly_truncated(&self, contacts: &[RawContact]) -> bool {
        contacts.len() >= self.request.max_contacts
    }

    /// Flush pending pose updates, then collect contacts
    pub fn run<I: SpatialIndex + ?Sized>(&self, index: &mut I) -> Result<Vec<RawContact>> {
        let start = Instant::now();
        index.update();
        let contacts = index.collide(&self.request)?;

        debug!(
            "queried {} shapes: {} contacts in {:.2?}",
            index.len(),
            contacts.len(),
            start.elapsed()
        );
        if self.is_possibly_truncated(&contacts) {
            warn!(
                "contact query hit the limit of {} contacts; results may be truncated",
                self.request.max_contacts
            );
        }

        Ok(contacts)
    }
}

impl Default for ContactQuery {
    fn default() -> Self {
        Self::from_config(&SceneConfig::default())
    }
}
