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
use crossbeam_channel::Sender;

use crate::state::ChannelState;

use super::{Transport, TransportError};

/// Hands every state to an in-process receiver.
pub struct ChannelTransport {
    sender: Sender<ChannelState>,
}

impl ChannelTransport {
    pub fn new(sender: Sender<ChannelState>) -> ChannelTransport {
        ChannelTransport { sender }
    }
}

impl Transport for ChannelTransport {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        self.sender
            .send(state.clone())
            .map_err(|_| TransportError::Disconnected)
    }
}
