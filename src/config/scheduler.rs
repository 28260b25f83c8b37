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
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use crate::scheduler::Timings;

use super::ConfigError;

/// A YAML representation of the scheduler timings. Every field is a duration
/// string such as `250ms` or `2s`.
#[derive(Deserialize, Clone, Default)]
pub struct Scheduler {
    /// How far ahead of now an entry must be to be accepted.
    grace_window: Option<String>,

    /// How long a freshly spawned delivery thread waits before delivering.
    warm_up: Option<String>,

    /// How long an exhausted delivery thread lingers before exiting.
    idle_grace: Option<String>,

    /// How long to pause after the transport fails.
    failure_backoff: Option<String>,
}

impl Scheduler {
    /// Gets the scheduler timings, using defaults for anything unset.
    pub fn timings(&self) -> Result<Timings, ConfigError> {
        let defaults = Timings::default();
        Ok(Timings {
            grace_window: parse("grace_window", &self.grace_window, defaults.grace_window)?,
            warm_up: parse("warm_up", &self.warm_up, defaults.warm_up)?,
            idle_grace: parse("idle_grace", &self.idle_grace, defaults.idle_grace)?,
            failure_backoff: parse(
                "failure_backoff",
                &self.failure_backoff,
                defaults.failure_backoff,
            )?,
        })
    }
}

fn parse(
    field: &'static str,
    value: &Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    value.as_ref().map_or(Ok(default), |duration| {
        DurationString::from_string(duration.clone())
            .map(Duration::from)
            .map_err(|e| ConfigError::Duration {
                field,
                value: duration.clone(),
                reason: e.to_string(),
            })
    })
}
