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
use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::state::ChannelState;

/// A channel state that should be output at the given time. Depending on where
/// the entry lives the time is either relative to the start of a track or
/// absolute seconds since the epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, ChannelState)", into = "(f64, ChannelState)")]
pub struct TimelineEntry {
    pub time: f64,
    pub state: ChannelState,
}

impl TimelineEntry {
    pub fn new(time: f64, state: ChannelState) -> TimelineEntry {
        TimelineEntry { time, state }
    }
}

impl From<(f64, ChannelState)> for TimelineEntry {
    fn from((time, state): (f64, ChannelState)) -> Self {
        TimelineEntry { time, state }
    }
}

impl From<TimelineEntry> for (f64, ChannelState) {
    fn from(entry: TimelineEntry) -> Self {
        (entry.time, entry.state)
    }
}

/// Orders entries by time. NaN times sort after every real time.
fn by_time(a: &TimelineEntry, b: &TimelineEntry) -> Ordering {
    a.time.total_cmp(&b.time)
}

/// A time-ascending sequence of channel states, ready to be handed to the
/// scheduler. Serialized as a list of `[time, {channel: value}]` pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    /// Creates an empty timeline. Submitting it stops everything scheduled.
    pub fn new() -> Timeline {
        Timeline::default()
    }

    /// Creates a timeline from the given entries, sorting them by time. Entries
    /// with equal times keep their relative order.
    pub fn from_entries(mut entries: Vec<TimelineEntry>) -> Timeline {
        entries.sort_by(by_time);
        Timeline { entries }
    }

    /// Merges independently recorded entry lists into one timeline.
    ///
    /// Every entry is tagged with the position of its source, sorted stably by
    /// (time, source position) and then equal times are folded together by
    /// key-wise union. On a channel collision the entry later in that order
    /// wins. Entries at distinct times are never combined, no matter how close.
    /// A time of -0.0 is treated as 0.0.
    pub fn merge_sources<I>(sources: I) -> Timeline
    where
        I: IntoIterator<Item = Vec<TimelineEntry>>,
    {
        let mut tagged: Vec<(usize, TimelineEntry)> = sources
            .into_iter()
            .enumerate()
            .flat_map(|(order, entries)| {
                entries.into_iter().map(move |mut entry| {
                    if entry.time == 0.0 {
                        entry.time = 0.0;
                    }
                    (order, entry)
                })
            })
            .collect();
        tagged.sort_by(|(a_order, a), (b_order, b)| by_time(a, b).then(a_order.cmp(b_order)));

        let mut entries: Vec<TimelineEntry> = Vec::with_capacity(tagged.len());
        for (_, entry) in tagged {
            match entries.last_mut() {
                Some(last) if by_time(last, &entry).is_eq() => last.state.merge(&entry.state),
                _ => entries.push(entry),
            }
        }

        Timeline { entries }
    }

    /// Shifts every entry by the given number of seconds. Used to turn track
    /// relative times into absolute ones.
    pub fn offset(mut self, seconds: f64) -> Timeline {
        self.entries
            .iter_mut()
            .for_each(|entry| entry.time += seconds);
        self
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<TimelineEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The time of the last entry, if any.
    pub fn end(&self) -> Option<f64> {
        self.entries.last().map(|entry| entry.time)
    }
}

impl IntoIterator for Timeline {
    type Item = TimelineEntry;
    type IntoIter = std::vec::IntoIter<TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(time: f64, state: ChannelState) -> TimelineEntry {
        TimelineEntry::new(time, state)
    }

    #[test]
    fn test_from_entries_sorts() {
        let timeline = Timeline::from_entries(vec![
            entry(3.0, ChannelState::from([(1, 3)])),
            entry(1.0, ChannelState::from([(1, 1)])),
            entry(2.0, ChannelState::from([(1, 2)])),
        ]);
        let times: Vec<f64> = timeline.entries().iter().map(|e| e.time).collect();
        assert_eq!(vec![1.0, 2.0, 3.0], times);
    }

    #[test]
    fn test_merge_left_and_right_at_same_time() {
        let left = vec![entry(5.0, ChannelState::from([(3, 20)]))];
        let right = vec![entry(5.0, ChannelState::from([(10, 90)]))];

        let timeline = Timeline::merge_sources(vec![left, right]);
        assert_eq!(
            vec![entry(5.0, ChannelState::from([(3, 20), (10, 90)]))],
            timeline.into_entries()
        );
    }

    #[test]
    fn test_merge_later_source_wins_collision() {
        let left = vec![entry(1.0, ChannelState::from([(4, 120), (3, 20)]))];
        let right = vec![entry(1.0, ChannelState::from([(4, 190)]))];

        let timeline = Timeline::merge_sources(vec![left.clone(), right.clone()]);
        assert_eq!(Some(190), timeline.entries()[0].state.get(4));
        assert_eq!(Some(20), timeline.entries()[0].state.get(3));

        // Swapping the declared order flips the winner.
        let timeline = Timeline::merge_sources(vec![right, left]);
        assert_eq!(Some(120), timeline.entries()[0].state.get(4));
    }

    #[test]
    fn test_merge_same_source_later_record_wins() {
        let source = vec![
            entry(2.0, ChannelState::from([(1, 10)])),
            entry(2.0, ChannelState::from([(1, 11)])),
        ];
        let timeline = Timeline::merge_sources(vec![source]);
        assert_eq!(
            vec![entry(2.0, ChannelState::from([(1, 11)]))],
            timeline.into_entries()
        );
    }

    #[test]
    fn test_merge_negative_zero_keeps_declared_order() {
        let left = vec![entry(0.0, ChannelState::from([(1, 10)]))];
        let right = vec![entry(-0.0, ChannelState::from([(1, 20), (8, 5)]))];

        let entries = Timeline::merge_sources(vec![left, right]).into_entries();
        assert_eq!(1, entries.len());
        assert!(entries[0].time.is_sign_positive());
        assert_eq!(ChannelState::from([(1, 20), (8, 5)]), entries[0].state);
    }

    #[test]
    fn test_merge_never_combines_distinct_times() {
        let left = vec![entry(1.0, ChannelState::from([(1, 1)]))];
        let right = vec![entry(1.0004, ChannelState::from([(8, 1)]))];
        let timeline = Timeline::merge_sources(vec![left, right]);
        assert_eq!(2, timeline.len());
    }

    #[test]
    fn test_merge_output_strictly_ascending() {
        let left = vec![
            entry(4.0, ChannelState::from([(1, 4)])),
            entry(1.0, ChannelState::from([(1, 1)])),
            entry(2.0, ChannelState::from([(1, 2)])),
        ];
        let right = vec![
            entry(2.0, ChannelState::from([(8, 2)])),
            entry(3.0, ChannelState::from([(8, 3)])),
            entry(1.0, ChannelState::from([(8, 1)])),
        ];
        let timeline = Timeline::merge_sources(vec![left, right]);
        let times: Vec<f64> = timeline.entries().iter().map(|e| e.time).collect();
        assert_eq!(vec![1.0, 2.0, 3.0, 4.0], times);
        assert_eq!(
            ChannelState::from([(1, 2), (8, 2)]),
            timeline.entries()[1].state
        );
    }

    #[test]
    fn test_merge_is_deterministic() {
        let sources = || {
            vec![
                vec![entry(1.0, ChannelState::from([(1, 5), (2, 6)]))],
                vec![entry(1.0, ChannelState::from([(2, 7)]))],
            ]
        };
        let first = Timeline::merge_sources(sources());
        let second = Timeline::merge_sources(sources());
        assert_eq!(first, second);

        // Merging an already merged timeline with itself changes nothing.
        let again = Timeline::merge_sources(vec![
            first.clone().into_entries(),
            first.clone().into_entries(),
        ]);
        assert_eq!(first, again);
    }

    #[test]
    fn test_merge_empty() {
        assert!(Timeline::merge_sources(Vec::<Vec<TimelineEntry>>::new()).is_empty());
        assert!(Timeline::merge_sources(vec![vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_offset() {
        let timeline = Timeline::from_entries(vec![entry(1.5, ChannelState::new())]).offset(100.0);
        assert_eq!(101.5, timeline.entries()[0].time);
        assert_eq!(Some(101.5), timeline.end());
    }

    #[test]
    fn test_json_round_trip_shape() {
        let json = r#"[[10.0, {"1": 0}], [2.5, {"3": 20, "10": 50}]]"#;
        let timeline: Timeline = serde_json::from_str(json).unwrap();
        assert_eq!(2, timeline.len());
        assert_eq!(Some(50), timeline.entries()[1].state.get(10));
    }
}
