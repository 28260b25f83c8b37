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
use std::path::PathBuf;

use serde::Deserialize;

/// The port the OLA daemon listens on by default.
pub const DEFAULT_OLA_PORT: u16 = 9010;

fn default_ola_port() -> u16 {
    DEFAULT_OLA_PORT
}

fn default_ola_universe() -> u32 {
    1
}

/// A YAML representation of the fixture bus transport.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Transport {
    /// Print commands to stdout for a bridge process.
    #[default]
    Stdout,

    /// Write commands to a serial device.
    Serial {
        device: PathBuf,
        #[serde(default)]
        only_changes: bool,
    },

    /// Send DMX frames through the OLA daemon.
    Ola {
        #[serde(default = "default_ola_universe")]
        universe: u32,
        #[serde(default = "default_ola_port")]
        port: u16,
    },
}
