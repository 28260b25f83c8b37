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
    fs::{File, OpenOptions},
    io::Write,
    path::Path,
};

use tracing::debug;

use crate::state::ChannelState;

use super::{Transport, TransportError};

/// Writes `<channel>c<value>w` commands directly to a serial device.
pub struct SerialTransport<W = File> {
    writer: W,
    /// Only send channels that differ from what the device was last sent.
    only_changes: bool,
    /// What the device has acknowledged so far.
    sent: ChannelState,
}

impl SerialTransport {
    /// Opens the serial device at the given path for writing.
    pub fn open(device: &Path, only_changes: bool) -> Result<SerialTransport, TransportError> {
        let file = OpenOptions::new().write(true).open(device)?;
        Ok(SerialTransport::new(file, only_changes))
    }
}

impl<W: Write + Send> SerialTransport<W> {
    pub fn new(writer: W, only_changes: bool) -> SerialTransport<W> {
        SerialTransport {
            writer,
            only_changes,
            sent: ChannelState::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for SerialTransport<W> {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        let commands = if self.only_changes {
            state.changes_since(&self.sent)
        } else {
            state.clone()
        };
        if commands.is_empty() {
            debug!("No channel changes to send.");
            return Ok(());
        }

        self.writer.write_all(commands.to_string().as_bytes())?;
        self.writer.flush()?;
        self.sent.merge(&commands);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::io;

    use super::*;

    #[test]
    fn test_full_states() {
        let mut transport = SerialTransport::new(Vec::new(), false);
        let state = ChannelState::from([(1, 50), (4, 120)]);
        transport.write(&state).unwrap();
        transport.write(&state).unwrap();

        assert_eq!(
            "1c50w4c120w1c50w4c120w",
            String::from_utf8(transport.into_inner()).unwrap()
        );
    }

    #[test]
    fn test_only_changes() {
        let mut transport = SerialTransport::new(Vec::new(), true);
        transport
            .write(&ChannelState::from([(1, 50), (4, 120)]))
            .unwrap();
        transport
            .write(&ChannelState::from([(1, 50), (4, 190)]))
            .unwrap();
        transport.write(&ChannelState::from([(1, 50)])).unwrap();

        assert_eq!(
            "1c50w4c120w4c190w",
            String::from_utf8(transport.into_inner()).unwrap()
        );
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_failed_write_is_not_remembered() {
        let mut transport = SerialTransport::new(BrokenWriter, true);
        assert!(matches!(
            transport.write(&ChannelState::from([(1, 50)])),
            Err(TransportError::Io(_))
        ));
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn test_open_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SerialTransport::open(&dir.path().join("missing"), false).is_err());
    }
}
