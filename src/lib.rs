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
//! Plans light shows for a pair of spinning-effect lights and plays them out
//! to the fixture bus in real time.

pub mod analysis;
pub mod config;
pub mod effects;
pub mod error;
pub mod fixture;
pub mod planner;
pub mod player;
pub mod scheduler;
pub mod state;
pub mod timeline;
pub mod transport;
pub mod util;

#[cfg(test)]
mod testutil;

pub use error::Error;
pub use player::Player;
pub use scheduler::Scheduler;
pub use state::ChannelState;
pub use timeline::{Timeline, TimelineEntry};
