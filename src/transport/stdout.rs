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
use std::io::{self, Write};

use crate::state::ChannelState;

use super::{Transport, TransportError};

/// Prints each state as a `$ <commands>` line. A bridge process reading our
/// stdout forwards the lines to the fixture bus.
pub struct StdoutTransport<W = io::Stdout> {
    writer: W,
}

impl StdoutTransport {
    pub fn stdout() -> StdoutTransport {
        StdoutTransport {
            writer: io::stdout(),
        }
    }
}

impl<W: Write + Send> StdoutTransport<W> {
    pub fn new(writer: W) -> StdoutTransport<W> {
        StdoutTransport { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for StdoutTransport<W> {
    fn write(&mut self, state: &ChannelState) -> Result<(), TransportError> {
        writeln!(self.writer, "$ {}", state)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lines() {
        let mut transport = StdoutTransport::new(Vec::new());
        transport
            .write(&ChannelState::from([(3, 20), (10, 50)]))
            .unwrap();
        transport.write(&ChannelState::from([(1, 0)])).unwrap();

        assert_eq!(
            "$ 3c20w10c50w\n$ 1c0w\n",
            String::from_utf8(transport.into_inner()).unwrap()
        );
    }
}
