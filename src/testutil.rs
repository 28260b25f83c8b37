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
use std::{
    thread,
    time::{Duration, SystemTime},
};

use crossbeam_channel::{Receiver, Sender};

use crate::{
    state::ChannelState,
    transport::{Transport, TransportError},
    util::epoch_seconds,
};

/// Wait for the given predicate to return true or fail.
#[inline]
pub fn eventually<F>(predicate: F, error_msg: &str)
where
    F: Fn() -> bool,
{
    let start = SystemTime::now();
    let mut tick = Duration::from_millis(5);
    let timeout = Duration::from_secs(10);
    let max_tick = Duration::from_millis(100);

    loop {
        let elapsed = start.elapsed();
        if elapsed.is_err() {
            panic!("System time error");
        }
        let elapsed = elapsed.unwrap();

        if elapsed > timeout {
            panic!("{}", error_msg);
        }
        if predicate() {
            return;
        }

        thread::sleep(tick);
        tick = std::cmp::min(tick * 2, max_tick);
    }
}

/// A state written to a [RecordingTransport], with the wall clock time it
/// arrived at.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub at: f64,
    pub state: ChannelState,
}

/// Records every write along with its time. Can be told to fail or panic on a
/// number of writes first.
pub struct RecordingTransport {
    sender: Sender<Delivery>,
    failures: usize,
    panics: usize,
}

impl RecordingTransport {
    pub fn new() -> (RecordingTransport, Receiver<Delivery>) {
        RecordingTransport::failing(0)
    }

    /// Fails the first `failures` writes.
    pub fn failing(failures: usize) -> (RecordingTransport, Receiver<Delivery>) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let transport = RecordingTransport {
            sender,
            failures,
            panics: 0,
        };
        (transport, receiver)
    }

    /// Panics on the first `panics` writes.
    pub fn panicking(panics: usize) -> (RecordingTransport, Receiver<Delivery>) {
        let (mut transport, receiver) = RecordingTransport::failing(0);
        transport.panics = panics;
        (transport, receiver)
    }
}

impl Transport for RecordingTransport {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        if self.panics > 0 {
            self.panics -= 1;
            panic!("transport blew up");
        }
        if self.failures > 0 {
            self.failures -= 1;
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "link fault",
            )));
        }
        self.sender
            .send(Delivery {
                at: epoch_seconds(),
                state: state.clone(),
            })
            .map_err(|_| TransportError::Disconnected)
    }
}
