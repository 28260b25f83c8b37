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
use std::io;

use tracing::info;

use crate::{config, state::ChannelState};

mod channel;
mod ola;
mod serial;
mod stdout;

pub use channel::ChannelTransport;
pub use ola::{OlaClient, OlaTransport, RealOlaClient};
pub use serial::SerialTransport;
pub use stdout::StdoutTransport;

/// Errors raised while writing to the fixture bus. All of them are treated as
/// transient by the scheduler.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("OLA error: {0}")]
    Ola(String),
    #[error("unable to connect to OLA after {0} attempts")]
    OlaUnavailable(usize),
    #[error("receiver disconnected")]
    Disconnected,
}

/// The fixture bus. Writes are synchronous and only ever issued from the
/// scheduler's delivery thread.
pub trait Transport: Send {
    /// Outputs the given state.
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        (**self).write(state)
    }
}

/// Creates the transport described by the configuration.
pub fn from_config(config: &config::Transport) -> Result<Box<dyn Transport>, TransportError> {
    match config {
        config::Transport::Stdout => {
            info!("Writing fixture states to stdout.");
            Ok(Box::new(StdoutTransport::stdout()))
        }
        config::Transport::Serial {
            device,
            only_changes,
        } => {
            info!(device = device.display().to_string(), "Opening serial device.");
            Ok(Box::new(SerialTransport::open(device, *only_changes)?))
        }
        config::Transport::Ola { universe, port } => {
            info!(universe, port, "Connecting to OLA.");
            Ok(Box::new(OlaTransport::connect(*universe, *port)?))
        }
    }
}
