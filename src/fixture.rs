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
use tracing::warn;

use crate::{
    state::{Channel, ChannelState, Intensity},
    timeline::TimelineEntry,
};

mod composite;
mod spin;

pub use composite::CompositeFixture;
pub use spin::{SpinColor, SpinEnable, SpinLight};

/// Something that records channel states over time.
pub trait Fixture {
    /// Sets a channel of the fixture's working state.
    fn set(&mut self, channel: Channel, value: Intensity);

    /// Records a copy of the whole working state at the given time.
    fn record(&mut self, time: f64);

    /// Returns everything recorded so far, in recording order.
    fn drain(&self) -> Vec<TimelineEntry>;
}

impl<F: Fixture + ?Sized> Fixture for &mut F {
    fn set(&mut self, channel: Channel, value: Intensity) {
        (**self).set(channel, value)
    }

    fn record(&mut self, time: f64) {
        (**self).record(time)
    }

    fn drain(&self) -> Vec<TimelineEntry> {
        (**self).drain()
    }
}

/// A single physical fixture. Channels are addressed relative to the fixture and
/// shifted by its base offset on the bus.
#[derive(Debug, Clone, Default)]
pub struct FixtureScript {
    offset: Channel,
    state: ChannelState,
    script: Vec<TimelineEntry>,
}

impl FixtureScript {
    /// Creates a fixture whose channel 1 sits at bus channel `offset + 1`.
    pub fn new(offset: Channel) -> FixtureScript {
        FixtureScript {
            offset,
            state: ChannelState::new(),
            script: Vec::new(),
        }
    }

    pub fn offset(&self) -> Channel {
        self.offset
    }

    /// The current working state, in bus channels.
    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    /// Forgets all recorded entries. The working state is kept.
    pub fn clear(&mut self) {
        self.script.clear();
    }
}

impl Fixture for FixtureScript {
    fn set(&mut self, channel: Channel, value: Intensity) {
        match channel.checked_add(self.offset) {
            Some(channel) => self.state.set(channel, value),
            None => warn!(
                channel,
                offset = self.offset,
                "Channel is past the end of the bus, ignoring."
            ),
        }
    }

    fn record(&mut self, time: f64) {
        // Entries own their state so that later sets never reach back into
        // history.
        self.script.push(TimelineEntry::new(time, self.state.clone()));
    }

    fn drain(&self) -> Vec<TimelineEntry> {
        self.script.clone()
    }
}
