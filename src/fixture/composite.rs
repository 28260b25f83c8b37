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
use crate::{
    state::{Channel, Intensity},
    timeline::{Timeline, TimelineEntry},
};

use super::{Fixture, FixtureScript};

/// A group of fixtures driven by the same commands, e.g. a left and right
/// unit of a stereo pair. Every set and record fans out to each member, and
/// the members' scripts are merged back into a single timeline. Member order
/// decides which member wins when two set the same channel at the same time.
#[derive(Debug, Clone, Default)]
pub struct CompositeFixture {
    members: Vec<FixtureScript>,
}

impl CompositeFixture {
    /// Creates a composite over the given members, in declaration order.
    pub fn new(members: Vec<FixtureScript>) -> CompositeFixture {
        CompositeFixture { members }
    }

    /// Creates a left/right pair at the given channel offsets.
    pub fn pair(left_offset: Channel, right_offset: Channel) -> CompositeFixture {
        CompositeFixture::new(vec![
            FixtureScript::new(left_offset),
            FixtureScript::new(right_offset),
        ])
    }

    pub fn members(&self) -> &[FixtureScript] {
        &self.members
    }

    pub fn member_mut(&mut self, index: usize) -> Option<&mut FixtureScript> {
        self.members.get_mut(index)
    }

    /// The first member of a pair.
    pub fn left(&mut self) -> Option<&mut FixtureScript> {
        self.member_mut(0)
    }

    /// The second member of a pair.
    pub fn right(&mut self) -> Option<&mut FixtureScript> {
        self.member_mut(1)
    }

    /// Forgets every member's recorded entries.
    pub fn clear(&mut self) {
        self.members.iter_mut().for_each(FixtureScript::clear);
    }

    /// Merges the members' scripts into a strictly time-ascending timeline.
    pub fn finalize(&self) -> Timeline {
        Timeline::merge_sources(self.members.iter().map(|member| member.drain()))
    }
}

impl Fixture for CompositeFixture {
    fn set(&mut self, channel: Channel, value: Intensity) {
        for member in self.members.iter_mut() {
            member.set(channel, value);
        }
    }

    fn record(&mut self, time: f64) {
        for member in self.members.iter_mut() {
            member.record(time);
        }
    }

    fn drain(&self) -> Vec<TimelineEntry> {
        self.finalize().into_entries()
    }
}
