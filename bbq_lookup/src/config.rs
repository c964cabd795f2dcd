// Copyright 2025 the Bbq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend selection and tuning.

use core::fmt;
use core::str::FromStr;
use std::env::{self, VarError};

use crate::backends::grid::{DEFAULT_GRID_SIZE, MAX_GRID_SIZE};
use crate::error::LookupError;

/// Environment variable overriding [`LookupOptions::grid_resolution`].
pub const GRID_SIZE_VAR: &str = "BBQ_GRID_SIZE";

/// Environment variable selecting the backend for [`LookupKind::from_env`].
pub const LOOKUP_KIND_VAR: &str = "BBQ_LOOKUP_KIND";

/// Which backend [`create`](crate::create) builds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LookupKind {
    /// [`ListLookup`](crate::ListLookup).
    #[default]
    List,
    /// [`GridLookup`](crate::GridLookup).
    Grid,
    /// [`TreeLookup`](crate::TreeLookup).
    Tree,
}

impl LookupKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 3] = [Self::List, Self::Grid, Self::Tree];

    /// Kind named by `BBQ_LOOKUP_KIND`, or [`LookupKind::List`] when unset.
    pub fn from_env() -> Result<Self, LookupError> {
        match read_var(LOOKUP_KIND_VAR)? {
            Some(raw) => raw.parse(),
            None => Ok(Self::default()),
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Grid => "grid",
            Self::Tree => "tree",
        })
    }
}

impl FromStr for LookupKind {
    type Err = LookupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| s.eq_ignore_ascii_case(&k.to_string()))
            .ok_or_else(|| LookupError::UnknownKind(s.to_owned()))
    }
}

/// Tuning knobs for [`create`](crate::create).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LookupOptions {
    /// Cells per axis for the grid backend. Ignored by the others.
    pub grid_resolution: usize,
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            grid_resolution: DEFAULT_GRID_SIZE,
        }
    }
}

impl LookupOptions {
    /// Set [`LookupOptions::grid_resolution`].
    #[must_use]
    pub const fn with_grid_resolution(mut self, n: usize) -> Self {
        self.grid_resolution = n;
        self
    }

    /// Check the options without building anything.
    pub fn validate(&self) -> Result<(), LookupError> {
        match self.grid_resolution {
            0 => Err(LookupError::ZeroGridResolution),
            n if n > MAX_GRID_SIZE => Err(LookupError::GridResolutionTooLarge {
                requested: n,
                max: MAX_GRID_SIZE,
            }),
            _ => Ok(()),
        }
    }

    /// Defaults, with the grid resolution taken from `BBQ_GRID_SIZE` if set.
    pub fn from_env() -> Result<Self, LookupError> {
        let options = match read_var(GRID_SIZE_VAR)? {
            Some(raw) => Self::default().with_grid_resolution(parse_grid_size(&raw)?),
            None => Self::default(),
        };
        options.validate()?;
        Ok(options)
    }
}

fn parse_grid_size(raw: &str) -> Result<usize, LookupError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| LookupError::InvalidEnv {
            var: GRID_SIZE_VAR,
            value: raw.to_owned(),
        })
}

fn read_var(var: &'static str) -> Result<Option<String>, LookupError> {
    match env::var(var) {
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotPresent) => Ok(None),
        Err(VarError::NotUnicode(raw)) => Err(LookupError::InvalidEnv {
            var,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}
