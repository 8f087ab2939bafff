// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem: collision reports for scene files

pub mod reporter;

pub use reporter::{CheckReport, PairRecord, Reporter};
