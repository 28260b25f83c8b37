// Copyright (C) 2025 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::io;

use thiserror::Error;

use crate::{analysis::AnalysisError, config::ConfigError, transport::TransportError};

/// Everything that can go wrong setting up or feeding the player. The
/// scheduler itself never reports errors.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("unable to read timeline: {0}")]
    Io(#[from] io::Error),

    #[error("unable to parse timeline: {0}")]
    Json(#[from] serde_json::Error),
}
