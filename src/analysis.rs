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
use std::{fs, io, path::Path};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// How far before its end a bar or section stops claiming children.
const BOUNDARY_TOLERANCE: f64 = 0.001;

const BEATS_PER_BAR: usize = 4;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("unable to read analysis: {0}")]
    Io(#[from] io::Error),

    #[error("unable to parse analysis: {0}")]
    Json(#[from] serde_json::Error),
}

/// A span of a track, in seconds from the track start.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub start: f64,
    pub duration: f64,
}

impl Interval {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }

    /// Whether the given time falls within the interval, ignoring anything in
    /// the last millisecond.
    fn claims(&self, time: f64) -> bool {
        self.start <= time && time < self.end() - BOUNDARY_TOLERANCE
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct TrackSummary {
    pub tempo: f64,
}

/// The rhythmic analysis of a track. Fields other than these are ignored.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Analysis {
    pub track: TrackSummary,
    #[serde(default)]
    pub sections: Vec<Interval>,
    #[serde(default)]
    pub bars: Vec<Interval>,
    #[serde(default)]
    pub beats: Vec<Interval>,
}

/// A bar with the beat times that fall in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub beats: Vec<f64>,
    pub start: f64,
    pub half: f64,
    pub end: f64,
}

impl Bar {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A section of a track with the bars that fall in it.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub bars: Vec<Bar>,
    pub start: f64,
    pub end: f64,
}

impl Section {
    /// The section from the given bar onwards, starting at that bar's first
    /// beat. None if there's no such bar or it has no beats.
    pub fn from_bar(&self, index: usize) -> Option<Section> {
        let bars = self.bars.get(index..)?.to_vec();
        let start = *bars.first()?.beats.first()?;
        Some(Section {
            bars,
            start,
            end: self.end,
        })
    }
}

impl Analysis {
    /// Reads an analysis document from a JSON file.
    pub fn load(path: &Path) -> Result<Analysis, AnalysisError> {
        debug!(path = path.display().to_string(), "Loading track analysis.");
        Analysis::from_json(&fs::read_to_string(path)?)
    }

    pub fn from_json(json: &str) -> Result<Analysis, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn tempo(&self) -> f64 {
        self.track.tempo
    }

    /// Groups the bars into sections and the beats into bars. Sections with
    /// fewer than two bars are left out.
    pub fn sections(&self) -> Vec<Section> {
        self.sections
            .iter()
            .filter_map(|section| {
                let bars: Vec<Bar> = self
                    .bars
                    .iter()
                    .filter(|bar| section.claims(bar.start))
                    .map(|bar| Bar {
                        beats: self
                            .beats
                            .iter()
                            .map(|beat| beat.start)
                            .filter(|start| bar.claims(*start))
                            .collect(),
                        start: bar.start,
                        half: bar.start + bar.duration / 2.0,
                        end: bar.end(),
                    })
                    .collect();

                (bars.len() >= 2).then(|| Section {
                    bars,
                    start: section.start,
                    end: section.end(),
                })
            })
            .collect()
    }
}

/// Builds an evenly spaced 4/4 section of the given length, starting at zero.
pub fn synthetic_section(tempo: f64, bars: usize) -> Section {
    let beat = 60.0 / tempo;
    let bar = beat * BEATS_PER_BAR as f64;

    let bars: Vec<Bar> = (0..bars)
        .map(|index| {
            let start = bar * index as f64;
            Bar {
                beats: (0..BEATS_PER_BAR)
                    .map(|beat_index| start + beat * beat_index as f64)
                    .collect(),
                start,
                half: start + bar / 2.0,
                end: start + bar,
            }
        })
        .collect();

    Section {
        start: 0.0,
        end: bars.last().map(|bar| bar.end).unwrap_or(0.0),
        bars,
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    fn interval(start: f64, duration: f64) -> serde_json::Value {
        serde_json::json!({"start": start, "duration": duration, "confidence": 0.5})
    }

    fn analysis_json() -> String {
        serde_json::json!({
            "meta": {"platform": "Linux"},
            "track": {"tempo": 120.0, "key": 5},
            "sections": [interval(0.0, 4.0), interval(4.0, 2.0), interval(6.0, 2.0)],
            "bars": [
                interval(0.0, 2.0),
                interval(2.0, 2.0),
                interval(4.0, 2.0),
                interval(6.0, 1.0),
                interval(7.0, 1.0),
            ],
            "beats": (0..16).map(|i| interval(i as f64 * 0.5, 0.5)).collect::<Vec<_>>(),
        })
        .to_string()
    }

    #[test]
    fn test_sections() {
        let analysis = Analysis::from_json(&analysis_json()).unwrap();
        assert_eq!(120.0, analysis.tempo());

        let sections = analysis.sections();
        // The middle section only has a single bar.
        assert_eq!(2, sections.len());

        let first = &sections[0];
        assert_eq!((0.0, 4.0), (first.start, first.end));
        assert_eq!(2, first.bars.len());
        assert_eq!(vec![0.0, 0.5, 1.0, 1.5], first.bars[0].beats);
        assert_eq!(vec![2.0, 2.5, 3.0, 3.5], first.bars[1].beats);
        assert_eq!(1.0, first.bars[0].half);
        assert_eq!(2.0, first.bars[0].end);

        let last = &sections[1];
        assert_eq!(vec![6.0, 6.5], last.bars[0].beats);
        assert_eq!(vec![7.0, 7.5], last.bars[1].beats);
    }

    #[test]
    fn test_boundary_tolerance() {
        let json = serde_json::json!({
            "track": {"tempo": 60.0},
            "sections": [interval(0.0, 2.0)],
            "bars": [interval(0.0, 1.0), interval(1.0, 1.0), interval(1.9995, 1.0)],
            "beats": [interval(0.0, 1.0), interval(0.9995, 0.5), interval(1.0, 1.0)],
        })
        .to_string();
        let sections = Analysis::from_json(&json).unwrap().sections();

        assert_eq!(1, sections.len());
        assert_eq!(2, sections[0].bars.len());
        assert_eq!(vec![0.0], sections[0].bars[0].beats);
        assert_eq!(vec![1.0], sections[0].bars[1].beats);
    }

    #[test]
    fn test_missing_lists() {
        let analysis = Analysis::from_json(r#"{"track": {"tempo": 99.5}}"#).unwrap();
        assert!(analysis.sections().is_empty());
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            Analysis::from_json(r#"{"sections": []}"#),
            Err(AnalysisError::Json(_))
        ));
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(analysis_json().as_bytes()).unwrap();
        assert_eq!(2, Analysis::load(file.path()).unwrap().sections().len());

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Analysis::load(&dir.path().join("missing.json")),
            Err(AnalysisError::Io(_))
        ));
    }

    #[test]
    fn test_synthetic_section() {
        let section = synthetic_section(120.0, 16);
        assert_eq!(16, section.bars.len());
        assert_eq!(0.0, section.start);
        assert_eq!(32.0, section.end);

        let bar = &section.bars[1];
        assert_eq!(vec![2.0, 2.5, 3.0, 3.5], bar.beats);
        assert_eq!(3.0, bar.half);
        assert_eq!(2.0, bar.duration());
    }

    #[test]
    fn test_from_bar() {
        let section = synthetic_section(120.0, 4);
        let tail = section.from_bar(2).unwrap();
        assert_eq!(2, tail.bars.len());
        assert_eq!(4.0, tail.start);
        assert_eq!(8.0, tail.end);
        assert!(section.from_bar(5).is_none());
    }
}
