// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by geometry validation, lookups, and configuration.

use thiserror::Error;

use crate::types::Axis;

/// Errors reported by this crate.
///
/// Every variant rejects a malformed argument. Removing an absent entry is
/// not an error, and mutating a lookup while a visit borrows it does not
/// compile.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum LookupError {
    /// A box coordinate is NaN or infinite.
    #[error("bounding box has a non-finite coordinate on the {axis} axis")]
    NonFinite {
        /// Offending axis.
        axis: Axis,
    },

    /// A box has `min > max` on some axis.
    #[error("bounding box is inverted on the {axis} axis (min {min} > max {max})")]
    Inverted {
        /// Offending axis.
        axis: Axis,
        /// Minimum coordinate on that axis.
        min: f64,
        /// Maximum coordinate on that axis.
        max: f64,
    },

    /// A grid needs at least one cell per axis.
    #[error("grid resolution must be at least 1")]
    ZeroGridResolution,

    /// The grid would hold more cells than allowed.
    #[error("grid resolution {requested} exceeds the maximum of {max}")]
    GridResolutionTooLarge {
        /// Requested cells per axis.
        requested: usize,
        /// Largest accepted cells per axis.
        max: usize,
    },

    /// Backend name did not parse.
    #[error("unknown lookup kind `{0}` (expected list, grid, or tree)")]
    UnknownKind(String),

    /// An environment override could not be parsed.
    #[error("invalid value `{value}` for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Raw value.
        value: String,
    },
}
