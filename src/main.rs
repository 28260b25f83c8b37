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
use std::{error::Error, path::PathBuf, thread, time::Duration};

use clap::{crate_version, Parser, Subcommand};
use rand::Rng;
use tracing::{span, Level};
use tracing_subscriber::EnvFilter;

use discofy::{config, util::epoch_seconds, Player};

/// How long to wait for the scheduler to drain before giving up.
const MAX_PLAY_TIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A light show player for spinning-effect lights."
)]
struct Cli {
    /// The path to the player config.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plans a light show for the analysed track and plays it.
    Play {
        /// The path to the track analysis JSON.
        analysis_path: PathBuf,
        /// The epoch time in seconds at which the track was at position zero.
        /// Defaults to now.
        #[arg(short, long)]
        seek_start: Option<f64>,
    },
    /// Plays a raw timeline of [time, {channel: value}] pairs.
    Timeline {
        /// The path to the timeline JSON.
        timeline_path: PathBuf,
        /// Treats times as seconds from now instead of epoch times.
        #[arg(short, long)]
        relative: bool,
    },
    /// Loops random sections at a random tempo without any music.
    Demo {
        /// The lowest tempo to pick.
        #[arg(long, default_value_t = 160.0)]
        tempo_min: f64,
        /// The highest tempo to pick.
        #[arg(long, default_value_t = 180.0)]
        tempo_max: f64,
        /// The number of bars in each section.
        #[arg(short, long, default_value_t = 16)]
        bars: usize,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = config::Player::load(cli.config.as_deref())?;
    let player = Player::new(&config)?;

    match cli.command {
        Commands::Play {
            analysis_path,
            seek_start,
        } => {
            let seek_start = seek_start.unwrap_or_else(epoch_seconds);
            player.play_file(&analysis_path, seek_start)?;
            player.wait_idle(MAX_PLAY_TIME);
        }
        Commands::Timeline {
            timeline_path,
            relative,
        } => {
            player.submit_file(&timeline_path, relative)?;
            player.wait_idle(MAX_PLAY_TIME);
        }
        Commands::Demo {
            tempo_min,
            tempo_max,
            bars,
        } => {
            if !(tempo_min > 0.0 && tempo_min <= tempo_max) {
                return Err(format!("invalid tempo range {}..{}", tempo_min, tempo_max).into());
            }
            if bars == 0 {
                return Err("a demo section needs at least one bar".into());
            }

            let span = span!(Level::INFO, "demo");
            let _enter = span.enter();

            let mut rng = rand::thread_rng();
            loop {
                let tempo = if tempo_min < tempo_max {
                    rng.gen_range(tempo_min..tempo_max)
                } else {
                    tempo_min
                };
                thread::sleep(player.demo_round(tempo, bars));
            }
        }
    }

    Ok(())
}
