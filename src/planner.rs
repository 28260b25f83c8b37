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
use rand::Rng;
use tracing::info;

use crate::{
    analysis::{Analysis, Section},
    config::Fixtures,
    effects::Show,
    timeline::Timeline,
};

/// Renders a whole track. `seek_start` is the epoch time at which the track
/// was at position zero, so the returned timeline is in absolute time. The
/// show carries on from wherever the previous track left it.
pub fn plan<R: Rng + ?Sized>(
    analysis: &Analysis,
    seek_start: f64,
    fixtures: &Fixtures,
    show: &mut Show,
    rng: &mut R,
) -> Timeline {
    let sections = analysis.sections();
    info!(
        tempo = analysis.tempo(),
        sections = sections.len(),
        seek_start,
        "Planning track."
    );
    render(&sections, seek_start, fixtures, show, rng)
}

/// Renders the given sections onto a fresh light pair and shifts the result
/// by `seek_start`.
pub fn render<R: Rng + ?Sized>(
    sections: &[Section],
    seek_start: f64,
    fixtures: &Fixtures,
    show: &mut Show,
    rng: &mut R,
) -> Timeline {
    let mut lights = fixtures.lights();
    for section in sections {
        show.render(&mut lights, section, rng);
    }
    lights.finalize().offset(seek_start)
}

#[cfg(test)]
mod test {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::{analysis::synthetic_section, config::Player, effects::Pattern};

    use super::*;

    fn analysis() -> Analysis {
        let interval =
            |start: f64, duration: f64| serde_json::json!({"start": start, "duration": duration});
        Analysis::from_json(
            &serde_json::json!({
                "track": {"tempo": 120.0},
                "sections": [interval(0.0, 8.0), interval(8.0, 0.5), interval(8.5, 8.0)],
                "bars": (0..9).map(|i| interval(i as f64 * 2.0, 2.0)).collect::<Vec<_>>(),
                "beats": (0..36).map(|i| interval(i as f64 * 0.5, 0.5)).collect::<Vec<_>>(),
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_plan_offsets_by_seek_start() {
        let fixtures = Player::from_yaml("fixtures:\n  force_uv: false")
            .unwrap()
            .fixtures()
            .clone();
        let seek_start = 1_700_000_000.0;

        let mut rng = StdRng::seed_from_u64(3);
        let mut show = Show::new(Pattern::CycleColors);
        let timeline = plan(&analysis(), seek_start, &fixtures, &mut show, &mut rng);

        assert!(!timeline.is_empty());
        let first = timeline.entries()[0].time;
        assert_eq!(seek_start, first);
        assert!(timeline.end().unwrap() < seek_start + 18.0);
        assert!(timeline
            .entries()
            .windows(2)
            .all(|pair| pair[0].time < pair[1].time));
    }

    #[test]
    fn test_plan_is_deterministic_per_seed() {
        let fixtures = Fixtures::default();
        let run = || {
            let mut rng = StdRng::seed_from_u64(11);
            let mut show = Show::new(Pattern::Alternate);
            plan(&analysis(), 0.0, &fixtures, &mut show, &mut rng)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_render_uses_configured_offsets() {
        let fixtures = Player::from_yaml("fixtures:\n  left_offset: 100\n  right_offset: 200")
            .unwrap()
            .fixtures()
            .clone();
        let mut show = Show::new(Pattern::CycleColors);
        let timeline = render(
            &[synthetic_section(120.0, 2)],
            10.0,
            &fixtures,
            &mut show,
            &mut StdRng::seed_from_u64(0),
        );

        assert_eq!(10.0, timeline.entries()[0].time);
        for entry in timeline.entries() {
            assert!(entry.state.iter().all(|(channel, _)| (101..=106).contains(&channel)
                || (201..=206).contains(&channel)));
        }
    }

    #[test]
    fn test_plan_empty_analysis() {
        let analysis = Analysis::from_json(r#"{"track": {"tempo": 100.0}}"#).unwrap();
        let timeline = plan(
            &analysis,
            5.0,
            &Fixtures::default(),
            &mut Show::new(Pattern::CycleColors),
            &mut StdRng::seed_from_u64(0),
        );
        assert!(timeline.is_empty());
    }
}
