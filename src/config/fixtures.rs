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
use serde::Deserialize;

use crate::{
    fixture::{CompositeFixture, SpinLight},
    state::Channel,
};

const DEFAULT_LEFT_OFFSET: Channel = 0;
const DEFAULT_RIGHT_OFFSET: Channel = 7;

/// A YAML representation of the light pair.
#[derive(Deserialize, Clone, Default)]
pub struct Fixtures {
    /// The channel offset of the left light.
    left_offset: Option<Channel>,

    /// The channel offset of the right light.
    right_offset: Option<Channel>,

    /// Keeps the UV lamps on at all times.
    force_uv: Option<bool>,
}

impl Fixtures {
    pub fn left_offset(&self) -> Channel {
        self.left_offset.unwrap_or(DEFAULT_LEFT_OFFSET)
    }

    pub fn right_offset(&self) -> Channel {
        self.right_offset.unwrap_or(DEFAULT_RIGHT_OFFSET)
    }

    pub fn force_uv(&self) -> bool {
        self.force_uv.unwrap_or(true)
    }

    /// Builds an empty left/right pair with the configured offsets.
    pub fn pair(&self) -> CompositeFixture {
        CompositeFixture::pair(self.left_offset(), self.right_offset())
    }

    /// Wraps an empty pair in the spin light vocabulary.
    pub fn lights(&self) -> SpinLight<CompositeFixture> {
        SpinLight::new(self.pair(), self.force_uv())
    }
}
