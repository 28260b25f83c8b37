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
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

use crate::{
    analysis::Section,
    fixture::{CompositeFixture, SpinColor, SpinEnable, SpinLight},
    state::Intensity,
};

/// The light pair every pattern draws on.
pub type Lights = SpinLight<CompositeFixture>;

const BEATS_PER_BAR: usize = 4;

/// The chance of following a section that opened with a strobe intro with
/// another one.
const INTRO_REPEAT_CHANCE: f64 = 0.9;

/// The chance of a strobe intro after a section without one.
const INTRO_RESUME_CHANCE: f64 = 0.5;

/// A way of lighting a section, one state per beat or bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Red, yellow, red, blue on consecutive beats.
    CycleColors,
    /// The lights swap colors and spin speeds every beat, one going dark in
    /// between.
    Alternate,
    /// The lights trade two colors every beat.
    ToggleColors,
    /// Two colors on the strong beats, dark on the weak ones.
    ColorBlink,
    /// Alternating slow and fast spins, one light flashing white per bar.
    FlashSpin,
    /// A color per bar that drops out on the last beat.
    ColorOutage,
}

impl Pattern {
    pub const ALL: [Pattern; 6] = [
        Pattern::CycleColors,
        Pattern::Alternate,
        Pattern::ToggleColors,
        Pattern::ColorBlink,
        Pattern::FlashSpin,
        Pattern::ColorOutage,
    ];

    /// Picks a pattern at random, favouring the busier ones.
    pub fn choose<R: Rng + ?Sized>(rng: &mut R) -> Pattern {
        if rng.gen_bool(0.10) {
            Pattern::Alternate
        } else if rng.gen_bool(0.08) {
            Pattern::ToggleColors
        } else if rng.gen_bool(0.20) {
            Pattern::FlashSpin
        } else if rng.gen_bool(0.10) {
            Pattern::ColorOutage
        } else if rng.gen_bool(0.30) {
            Pattern::CycleColors
        } else {
            Pattern::ColorBlink
        }
    }

    /// Records the pattern over the whole section and returns the pattern to
    /// use for the next one.
    pub fn render<R: Rng + ?Sized>(
        self,
        lights: &mut Lights,
        section: &Section,
        rng: &mut R,
    ) -> Pattern {
        match self {
            Pattern::CycleColors => cycle_colors(lights, section),
            Pattern::Alternate => alternate(lights, section, rng),
            Pattern::ToggleColors => toggle_colors(lights, section, rng),
            Pattern::ColorBlink => color_blink(lights, section, rng),
            Pattern::FlashSpin => flash_spin(lights, section, rng),
            Pattern::ColorOutage => color_outage(lights, section, rng),
        }
        Pattern::choose(rng)
    }
}

/// Chains patterns from section to section, opening sections with a strobe
/// intro every so often.
#[derive(Debug, Clone)]
pub struct Show {
    next: Pattern,
    strobe_intro: bool,
}

impl Show {
    pub fn new(first: Pattern) -> Show {
        Show {
            next: first,
            strobe_intro: true,
        }
    }

    /// The pattern the next section will get.
    pub fn next(&self) -> Pattern {
        self.next
    }

    /// Records the next section. A section that gets an intro hands its
    /// remaining bars to the pattern.
    pub fn render<R: Rng + ?Sized>(&mut self, lights: &mut Lights, section: &Section, rng: &mut R) {
        let intro = if self.strobe_intro {
            strobe_intro(lights, section, rng)
        } else {
            None
        };

        debug!(
            start = section.start,
            bars = section.bars.len(),
            pattern = ?self.next,
            intro = intro.is_some(),
            "Rendering section."
        );

        let body = intro.as_ref().unwrap_or(section);
        self.next = self.next.render(lights, body, rng);

        // Sections too short for an intro don't count against the chain.
        if intro.is_some() {
            self.strobe_intro = rng.gen_bool(INTRO_REPEAT_CHANCE);
        } else if !self.strobe_intro {
            self.strobe_intro = rng.gen_bool(INTRO_RESUME_CHANCE);
        }
    }
}

/// Which lamp an intro accents.
#[derive(Debug, Clone, Copy)]
enum Accent {
    White,
    Uv,
}

impl Accent {
    fn set(self, lights: &mut Lights, on: bool) {
        match self {
            Accent::White => lights.white(on),
            Accent::Uv => lights.uv(on),
        }
    }
}

/// Strobes through the first two bars. Returns the rest of the section, or
/// None without recording anything if the section is too short or doesn't
/// open with a full bar.
fn strobe_intro<R: Rng + ?Sized>(
    lights: &mut Lights,
    section: &Section,
    rng: &mut R,
) -> Option<Section> {
    if section.bars.len() < 4 || section.bars[0].beats.len() != BEATS_PER_BAR {
        return None;
    }
    let rest = section.from_bar(2)?;
    let first = &section.bars[0];
    let second = &section.bars[1];
    let second_downbeat = *second.beats.first()?;

    let white = rng.gen_bool(0.85);
    let (mode, accent, speed) = if white {
        (SpinEnable::ColorWhite, Accent::White, 10)
    } else {
        (SpinEnable::ColorUv, Accent::Uv, 20)
    };
    lights.enable(mode);
    accent.set(lights, true);
    lights.color(SpinColor::None);
    lights.strobe(speed);
    lights.at(first.beats[0]);

    lights.rotate(120);
    lights.color(SpinColor::All);
    accent.set(lights, false);
    lights.strobe(10);
    lights.at(first.beats[2]);

    lights.color(SpinColor::None);
    let uv_suffix = rng.gen_bool(0.6);
    let accent = if uv_suffix { Accent::Uv } else { Accent::White };
    if uv_suffix && white {
        lights.enable(SpinEnable::Uv);
    }
    accent.set(lights, true);
    lights.strobe(0);
    lights.at(second_downbeat);
    accent.set(lights, false);
    lights.at(second_downbeat + second.duration() / 16.0);

    Some(rest)
}

/// Two distinct primaries.
fn two_primaries<R: Rng + ?Sized>(rng: &mut R) -> [SpinColor; 2] {
    let mut colors = SpinColor::PRIMARIES;
    colors.shuffle(rng);
    [colors[0], colors[1]]
}

/// Sets up a steady color, no white and no strobe.
fn base(lights: &mut Lights, color: SpinColor, rotate: Intensity) {
    lights.enable(SpinEnable::Color);
    lights.white(false);
    lights.color(color);
    lights.strobe(0);
    lights.rotate(rotate);
}

fn set_member(lights: &mut Lights, index: usize, color: SpinColor, rotate: Option<Intensity>) {
    if let Some(mut light) = lights.member(index) {
        light.color(color);
        if let Some(rotate) = rotate {
            light.rotate(rotate);
        }
    }
}

fn cycle_colors(lights: &mut Lights, section: &Section) {
    const CYCLE: [SpinColor; 4] = [
        SpinColor::Red,
        SpinColor::Yellow,
        SpinColor::Red,
        SpinColor::Blue,
    ];

    base(lights, CYCLE[0], 140);
    for bar in &section.bars {
        for (i, beat) in bar.beats.iter().enumerate() {
            lights.color(CYCLE[i % CYCLE.len()]);
            lights.at(*beat);
        }
    }
}

fn alternate<R: Rng + ?Sized>(lights: &mut Lights, section: &Section, rng: &mut R) {
    let [left, right] = two_primaries(rng);

    base(lights, left, 140);
    for bar in &section.bars {
        for (i, beat) in bar.beats.iter().enumerate() {
            let ((left_color, left_rotate), (right_color, right_rotate)) = match i % 4 {
                0 => ((left, 140), (right, 20)),
                1 => ((left, 20), (SpinColor::None, 140)),
                2 => ((left, 20), (right, 140)),
                _ => ((SpinColor::None, 140), (right, 20)),
            };
            set_member(lights, 0, left_color, Some(left_rotate));
            set_member(lights, 1, right_color, Some(right_rotate));
            lights.at(*beat);
        }
    }
}

fn toggle_colors<R: Rng + ?Sized>(lights: &mut Lights, section: &Section, rng: &mut R) {
    let [a, b] = two_primaries(rng);

    base(lights, a, 140);
    for bar in &section.bars {
        for (i, beat) in bar.beats.iter().enumerate() {
            let (left, right) = if i % 2 == 0 { (a, b) } else { (b, a) };
            set_member(lights, 0, left, None);
            set_member(lights, 1, right, None);
            lights.at(*beat);
        }
    }
}

fn color_blink<R: Rng + ?Sized>(lights: &mut Lights, section: &Section, rng: &mut R) {
    let colors = two_primaries(rng);

    base(lights, colors[0], 140);
    for bar in &section.bars {
        for (i, beat) in bar.beats.iter().enumerate() {
            lights.color(match i % 4 {
                0 => colors[0],
                2 => colors[1],
                _ => SpinColor::None,
            });
            lights.at(*beat);
        }
    }
}

fn flash_spin<R: Rng + ?Sized>(lights: &mut Lights, section: &Section, rng: &mut R) {
    let [slow_color, fast_color] = two_primaries(rng);

    lights.enable(if rng.gen_bool(0.7) {
        SpinEnable::ColorWhite
    } else {
        SpinEnable::Color
    });
    lights.white(false);
    lights.strobe(0);

    let mut slow = false;
    let mut flash_right = rng.gen_bool(0.5);
    for bar in &section.bars {
        let Some(&downbeat) = bar.beats.first() else {
            continue;
        };

        if slow {
            lights.rotate(90);
            lights.color(slow_color);
        } else {
            lights.rotate(10);
            lights.color(fast_color);
        }
        lights.at(downbeat);
        slow = !slow;

        let flashing = if flash_right { lights.right() } else { lights.left() };
        if let Some(mut light) = flashing {
            light.white(true);
            light.at(downbeat);
            light.white(false);
            light.at(downbeat + bar.duration() / 16.0);
        }
        flash_right = !flash_right;
    }
}

fn color_outage<R: Rng + ?Sized>(lights: &mut Lights, section: &Section, rng: &mut R) {
    let colors = two_primaries(rng);

    base(lights, colors[0], 40);
    for (index, bar) in section.bars.iter().enumerate() {
        let bar_color = colors[(index + 1) % colors.len()];
        for (i, beat) in bar.beats.iter().enumerate() {
            match i % 4 {
                0 => lights.color(bar_color),
                3 => lights.color(SpinColor::None),
                _ => continue,
            }
            lights.at(*beat);
        }
    }
}
