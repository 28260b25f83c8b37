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
use std::{net::TcpStream, thread, time::Duration};

use ola::{client::StreamingClientConfig, DmxBuffer};
use tracing::{debug, warn};

use crate::state::{ChannelState, Intensity};

use super::{Transport, TransportError};

/// A DMX universe is 512 channels.
const UNIVERSE_SIZE: usize = 512;

/// How many times to try reaching the OLA daemon before giving up.
const CONNECT_ATTEMPTS: usize = 10;

/// Trait for OLA client functionality
pub trait OlaClient: Send {
    /// Send DMX data to a universe
    fn send_dmx(&mut self, universe: u32, buffer: &DmxBuffer) -> Result<(), TransportError>;
}

/// Real OLA client implementation
pub struct RealOlaClient {
    client: ola::StreamingClient<TcpStream>,
}

impl RealOlaClient {
    pub fn new(client: ola::StreamingClient<TcpStream>) -> Self {
        Self { client }
    }
}

impl OlaClient for RealOlaClient {
    fn send_dmx(&mut self, universe: u32, buffer: &DmxBuffer) -> Result<(), TransportError> {
        self.client
            .send_dmx(universe, buffer)
            .map_err(|e| TransportError::Ola(e.to_string()))
    }
}

/// Sends states to an OLA universe. The universe keeps every channel it has
/// been sent, so each write only overlays the specified channels.
pub struct OlaTransport {
    client: Box<dyn OlaClient>,
    universe: u32,
    buffer: DmxBuffer,
}

impl OlaTransport {
    pub fn new(client: Box<dyn OlaClient>, universe: u32) -> OlaTransport {
        OlaTransport {
            client,
            universe,
            buffer: DmxBuffer::new(),
        }
    }

    /// Connects to the local OLA daemon, retrying for a while if it isn't up yet.
    pub fn connect(universe: u32, port: u16) -> Result<OlaTransport, TransportError> {
        let config = StreamingClientConfig {
            server_port: port,
            ..Default::default()
        };

        for i in 0..CONNECT_ATTEMPTS {
            // Don't sleep on the first iteration.
            if i > 0 {
                thread::sleep(Duration::from_secs(5));
            }

            match ola::connect_with_config(config.clone()) {
                Ok(client) => {
                    return Ok(OlaTransport::new(
                        Box::new(RealOlaClient::new(client)),
                        universe,
                    ))
                }
                Err(e) => debug!(
                    err = e.to_string(),
                    "Error connecting to OLA, waiting 5 seconds and trying again."
                ),
            }
        }

        Err(TransportError::OlaUnavailable(CONNECT_ATTEMPTS))
    }

    /// Copies the state into the DMX buffer. Bus channels are 1-based.
    fn apply(&mut self, state: &ChannelState) {
        for (channel, value) in state.iter() {
            let index = usize::from(channel);
            if index == 0 || index > UNIVERSE_SIZE {
                warn!(channel, "Channel is outside of the DMX universe, ignoring.");
                continue;
            }
            self.buffer.set_channel(index - 1, clamp(value));
        }
    }
}

/// DMX values are bytes, so this is the one place intensities get narrowed.
fn clamp(value: Intensity) -> u8 {
    value.clamp(u8::MIN.into(), u8::MAX.into()) as u8
}

impl Transport for OlaTransport {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        self.apply(state);
        self.client.send_dmx(self.universe, &self.buffer)
    }
}
