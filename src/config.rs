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
use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

mod error;
mod fixtures;
mod scheduler;
mod transport;

pub use error::ConfigError;
pub use fixtures::Fixtures;
pub use scheduler::Scheduler;
pub use transport::{Transport, DEFAULT_OLA_PORT};

/// The prefix of environment variables that override the configuration, e.g.
/// `DISCOFY_SCHEDULER__WARM_UP=500ms`.
const ENV_PREFIX: &str = "DISCOFY";

/// A YAML representation of the player configuration.
#[derive(Deserialize, Clone, Default)]
pub struct Player {
    /// Timing of the delivery thread.
    #[serde(default)]
    scheduler: Scheduler,

    /// Where fixture states are written.
    #[serde(default)]
    transport: Transport,

    /// The layout of the light pair.
    #[serde(default)]
    fixtures: Fixtures,
}

impl Player {
    /// Loads the configuration from the given YAML file, if any, applying
    /// environment overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Player, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Yaml));
        }
        Ok(builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<Player>()?)
    }

    /// Parses the configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Player, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize::<Player>()?)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn fixtures(&self) -> &Fixtures {
        &self.fixtures
    }
}
