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
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An addressable control line on the fixture bus.
pub type Channel = u16;

/// The value written to a channel. Fixtures expect 0-255, but values are
/// carried as given and only narrowed by transports that need to.
pub type Intensity = i32;

/// A sparse snapshot of channel intensities.
///
/// Only channels that were explicitly set are present. An absent channel is
/// unspecified rather than zero, and merging never fills it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelState {
    channels: BTreeMap<Channel, Intensity>,
}

impl ChannelState {
    /// Creates an empty channel state.
    pub fn new() -> ChannelState {
        ChannelState::default()
    }

    /// Sets the channel to the given value. Out of range values are kept as-is.
    pub fn set(&mut self, channel: Channel, value: Intensity) {
        self.channels.insert(channel, value);
    }

    /// Gets the value of the channel, if it has been specified.
    pub fn get(&self, channel: Channel) -> Option<Intensity> {
        self.channels.get(&channel).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Iterates over the specified channels in ascending channel order.
    pub fn iter(&self) -> impl Iterator<Item = (Channel, Intensity)> + '_ {
        self.channels.iter().map(|(channel, value)| (*channel, *value))
    }

    /// Combines the other state into this one. Channels specified by both take
    /// the other state's value.
    pub fn merge(&mut self, other: &ChannelState) {
        self.channels.extend(other.channels.iter().map(|(k, v)| (*k, *v)));
    }

    /// Returns the channels whose value differs from the previous state. A
    /// channel missing from the previous state counts as changed; a channel
    /// missing from this state is unspecified and never reported.
    pub fn changes_since(&self, previous: &ChannelState) -> ChannelState {
        self.channels
            .iter()
            .filter(|(channel, value)| previous.channels.get(channel) != Some(value))
            .map(|(channel, value)| (*channel, *value))
            .collect()
    }
}

impl FromIterator<(Channel, Intensity)> for ChannelState {
    fn from_iter<T: IntoIterator<Item = (Channel, Intensity)>>(iter: T) -> Self {
        ChannelState {
            channels: iter.into_iter().collect(),
        }
    }
}

impl<const N: usize> From<[(Channel, Intensity); N]> for ChannelState {
    fn from(value: [(Channel, Intensity); N]) -> Self {
        value.into_iter().collect()
    }
}

/// Formats the state as fixture bus serial commands, e.g. `3c20w10c50w`.
impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (channel, value) in self.iter() {
            write!(f, "{}c{}w", channel, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_set_keeps_out_of_range_values() {
        let mut state = ChannelState::new();
        state.set(1, 300);
        state.set(2, -5);
        assert_eq!(Some(300), state.get(1));
        assert_eq!(Some(-5), state.get(2));
        assert_eq!(None, state.get(3));
    }

    #[test]
    fn test_merge_union_other_wins() {
        let mut state = ChannelState::from([(1, 10), (2, 20)]);
        state.merge(&ChannelState::from([(2, 99), (3, 30)]));
        assert_eq!(ChannelState::from([(1, 10), (2, 99), (3, 30)]), state);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = ChannelState::from([(3, 20), (4, 120)]);
        let b = ChannelState::from([(4, 190), (10, 50)]);

        let mut once = a.clone();
        once.merge(&b);
        let mut twice = once.clone();
        twice.merge(&b);
        assert_eq!(once, twice);

        let mut itself = once.clone();
        itself.merge(&once);
        assert_eq!(once, itself);
    }

    #[test]
    fn test_changes_since() {
        let previous = ChannelState::from([(1, 50), (2, 0), (5, 10)]);
        let current = ChannelState::from([(1, 50), (2, 80), (3, 120)]);

        // Channel 5 is unspecified in the current state, so it is not a change.
        assert_eq!(
            ChannelState::from([(2, 80), (3, 120)]),
            current.changes_since(&previous)
        );
        assert!(current.changes_since(&current).is_empty());
    }

    #[test]
    fn test_display_serial_commands() {
        let state = ChannelState::from([(10, 50), (3, 20)]);
        assert_eq!("3c20w10c50w", state.to_string());
        assert_eq!("", ChannelState::new().to_string());
    }

    #[test]
    fn test_json_is_a_plain_map() {
        let state = ChannelState::from([(1, 50)]);
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(r#"{"1":50}"#, json);
        let parsed: ChannelState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, parsed);
    }
}
