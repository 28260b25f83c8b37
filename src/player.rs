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
use std::{fs, path::Path, time::Duration};

use parking_lot::Mutex;
use rand::{rngs::StdRng, SeedableRng};
use tracing::{info, span, Level, Span};

use crate::{
    analysis::{synthetic_section, Analysis},
    config,
    effects::{Pattern, Show},
    error::Error,
    planner,
    scheduler::Scheduler,
    timeline::Timeline,
    transport::{self, Transport},
    util::{duration_minutes_seconds, epoch_seconds},
};

/// Turns tracks and raw timelines into light output.
pub struct Player {
    /// Layout of the light pair.
    fixtures: config::Fixtures,
    /// Delivers the planned timelines.
    scheduler: Scheduler,
    /// The pattern chain, carried over from track to track.
    show: Mutex<Show>,
    rng: Mutex<StdRng>,
    /// The logging span.
    span: Span,
}

impl Player {
    /// Creates a player writing to the configured transport.
    pub fn new(config: &config::Player) -> Result<Player, Error> {
        let transport = transport::from_config(config.transport())?;
        Player::with_transport(config, transport)
    }

    /// Creates a player writing to the given transport.
    pub fn with_transport<T: Transport + 'static>(
        config: &config::Player,
        transport: T,
    ) -> Result<Player, Error> {
        Ok(Player::from_parts(
            config.fixtures().clone(),
            Scheduler::with_timings(transport, config.scheduler().timings()?),
            StdRng::from_entropy(),
        ))
    }

    /// Replaces the random source, making pattern choices repeatable.
    pub fn seeded(self, seed: u64) -> Player {
        Player::from_parts(self.fixtures, self.scheduler, StdRng::seed_from_u64(seed))
    }

    fn from_parts(fixtures: config::Fixtures, scheduler: Scheduler, mut rng: StdRng) -> Player {
        let first = Pattern::choose(&mut rng);
        Player {
            fixtures,
            scheduler,
            show: Mutex::new(Show::new(first)),
            rng: Mutex::new(rng),
            span: span!(Level::INFO, "player"),
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Plans the analysed track and submits it. `seek_start` is the epoch time
    /// at which the track was at position zero. Returns the number of entries
    /// planned.
    pub fn play(&self, analysis: &Analysis, seek_start: f64) -> usize {
        let _enter = self.span.enter();

        let timeline = planner::plan(
            analysis,
            seek_start,
            &self.fixtures,
            &mut self.show.lock(),
            &mut *self.rng.lock(),
        );
        let planned = timeline.len();
        let length = timeline
            .end()
            .and_then(|end| Duration::try_from_secs_f64(end - seek_start).ok())
            .unwrap_or_default();
        info!(
            planned,
            length = duration_minutes_seconds(length),
            "Track planned."
        );

        self.scheduler.submit(timeline);
        planned
    }

    /// Loads a track analysis from disk and plays it.
    pub fn play_file(&self, path: &Path, seek_start: f64) -> Result<usize, Error> {
        let analysis = Analysis::load(path)?;
        Ok(self.play(&analysis, seek_start))
    }

    /// Submits a timeline read from a JSON file. Relative timelines are
    /// shifted to start from now.
    pub fn submit_file(&self, path: &Path, relative: bool) -> Result<usize, Error> {
        let _enter = self.span.enter();

        let mut timeline: Timeline = serde_json::from_str(&fs::read_to_string(path)?)?;
        if relative {
            timeline = timeline.offset(epoch_seconds());
        }
        info!(
            path = path.display().to_string(),
            entries = timeline.len(),
            relative,
            "Submitting timeline file."
        );

        let entries = timeline.len();
        self.scheduler.submit(timeline);
        Ok(entries)
    }

    /// Renders a synthetic section at the given tempo starting now and submits
    /// it. Returns how long to wait before the next round, which is three
    /// quarters of the section so rounds overlap.
    pub fn demo_round(&self, tempo: f64, bars: usize) -> Duration {
        let _enter = self.span.enter();

        let section = synthetic_section(tempo, bars);
        info!(tempo, bars, "Starting demo round.");

        let timeline = planner::render(
            std::slice::from_ref(&section),
            epoch_seconds(),
            &self.fixtures,
            &mut self.show.lock(),
            &mut *self.rng.lock(),
        );
        self.scheduler.submit(timeline);

        Duration::from_secs_f64((section.end - section.start).max(0.0) * 3.0 / 4.0)
    }

    /// Cancels everything scheduled.
    pub fn stop(&self) {
        let _enter = self.span.enter();
        info!("Stopping.");
        self.scheduler.submit(Timeline::new());
    }

    /// Blocks until the scheduler goes idle or the timeout passes.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.scheduler.wait_idle(timeout)
    }
}
