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
    timeline::Timeline,
};

use super::{CompositeFixture, Fixture, FixtureScript};

const UV_CHANNEL: Channel = 1;
const WHITE_CHANNEL: Channel = 2;
const COLOR_CHANNEL: Channel = 3;
const ENABLE_CHANNEL: Channel = 4;
const STROBE_CHANNEL: Channel = 5;
const ROTATE_CHANNEL: Channel = 6;

/// The value for the white and UV channels when they are switched on.
const LAMP_ON: Intensity = 50;

/// Which light sources of a spin light are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinEnable {
    None,
    Uv,
    White,
    Color,
    ColorUv,
    ColorWhite,
}

impl SpinEnable {
    fn value(self) -> Intensity {
        match self {
            SpinEnable::None => 0,
            SpinEnable::Uv => 40,
            SpinEnable::White => 80,
            SpinEnable::Color => 120,
            SpinEnable::ColorUv => 190,
            SpinEnable::ColorWhite => 230,
        }
    }
}

/// The color wheel positions of a spin light.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinColor {
    None,
    Red,
    Yellow,
    Blue,
    RedYellow,
    RedBlue,
    YellowBlue,
    All,
}

impl SpinColor {
    /// The single primary colors.
    pub const PRIMARIES: [SpinColor; 3] = [SpinColor::Red, SpinColor::Yellow, SpinColor::Blue];

    fn value(self) -> Intensity {
        match self {
            SpinColor::None => 0,
            SpinColor::Red => 20,
            SpinColor::Yellow => 50,
            SpinColor::Blue => 90,
            SpinColor::RedYellow => 120,
            SpinColor::RedBlue => 180,
            SpinColor::YellowBlue => 200,
            SpinColor::All => 220,
        }
    }
}

/// The control vocabulary of a spinning-effect light, on top of any fixture.
/// Wrapping a [CompositeFixture] drives a whole group with the same commands.
#[derive(Debug, Clone)]
pub struct SpinLight<F> {
    fixture: F,
    force_uv: bool,
}

impl<F: Fixture> SpinLight<F> {
    /// Wraps the fixture. With `force_uv` the UV lamp never switches off and a
    /// plain color enable is promoted to color + UV.
    pub fn new(fixture: F, force_uv: bool) -> SpinLight<F> {
        SpinLight { fixture, force_uv }
    }

    pub fn enable(&mut self, mode: SpinEnable) {
        let mode = if mode == SpinEnable::Color && self.force_uv {
            self.uv(true);
            SpinEnable::ColorUv
        } else {
            mode
        };
        self.fixture.set(ENABLE_CHANNEL, mode.value());
    }

    pub fn color(&mut self, color: SpinColor) {
        self.fixture.set(COLOR_CHANNEL, color.value());
    }

    pub fn white(&mut self, on: bool) {
        self.fixture.set(WHITE_CHANNEL, if on { LAMP_ON } else { 0 });
    }

    pub fn uv(&mut self, on: bool) {
        self.fixture
            .set(UV_CHANNEL, if on || self.force_uv { LAMP_ON } else { 0 });
    }

    pub fn strobe(&mut self, speed: Intensity) {
        self.fixture.set(STROBE_CHANNEL, speed);
    }

    pub fn rotate(&mut self, speed: Intensity) {
        self.fixture.set(ROTATE_CHANNEL, speed);
    }

    /// Records the fixture's current state at the given time.
    pub fn at(&mut self, time: f64) {
        self.fixture.record(time);
    }

    pub fn fixture(&self) -> &F {
        &self.fixture
    }

    pub fn into_inner(self) -> F {
        self.fixture
    }
}

impl SpinLight<CompositeFixture> {
    /// Addresses a single member of the group. Nothing is recorded until the
    /// member's (or the whole group's) `at` is called.
    pub fn member(&mut self, index: usize) -> Option<SpinLight<&mut FixtureScript>> {
        let force_uv = self.force_uv;
        self.fixture
            .member_mut(index)
            .map(|fixture| SpinLight::new(fixture, force_uv))
    }

    pub fn left(&mut self) -> Option<SpinLight<&mut FixtureScript>> {
        self.member(0)
    }

    pub fn right(&mut self) -> Option<SpinLight<&mut FixtureScript>> {
        self.member(1)
    }

    /// Merges the group's recordings into a timeline.
    pub fn finalize(&self) -> Timeline {
        self.fixture.finalize()
    }
}
