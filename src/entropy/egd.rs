//! External daemon source (`EGD`): Entropy Gathering Daemon protocol.
//! Grounded directly in `ottery_entropy_egd.c`: a two-byte non-blocking
//! request `(0x01, n)`, a one-byte length-prefixed response.

use super::{Source, SourceFlags};
use crate::error::Error;
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;

/// `0x01`: "tell me how many random bytes are available, up to N,
/// without blocking" in the EGD wire protocol.
const EGD_CMD_NONBLOCKING_READ: u8 = 0x01;

/// Where the EGD daemon listens.
pub(crate) enum EgdAddr {
    Tcp(SocketAddr),
    #[cfg(unix)]
    Unix(PathBuf),
}

/// Reads seed bytes from an EGD daemon.
pub(crate) struct Egd {
    addr: EgdAddr,
}

impl Egd {
    pub(crate) fn new(addr: EgdAddr) -> Self {
        Egd { addr }
    }

    fn request(&self, n: u8) -> Result<Vec<u8>, Error> {
        match &self.addr {
            EgdAddr::Tcp(addr) => {
                let mut stream = TcpStream::connect(addr).map_err(|_| Error::INIT_STRONG_RNG)?;
                Self::exchange(&mut stream, n).map_err(|_| Error::ACCESS_STRONG_RNG)
            }
            #[cfg(unix)]
            EgdAddr::Unix(path) => {
                let mut stream = std::os::unix::net::UnixStream::connect(path).map_err(|_| Error::INIT_STRONG_RNG)?;
                Self::exchange(&mut stream, n).map_err(|_| Error::ACCESS_STRONG_RNG)
            }
        }
    }

    /// Sends the non-blocking-read request and reads the response,
    /// checking the one-byte length prefix against `n` *before* reading
    /// any body bytes — matching `ottery_entropy_egd.c`'s `msg[0] !=
    /// outlen` check, which runs right after the length-prefix read and
    /// fails without ever reading a body a misbehaving daemon might
    /// otherwise make us block on.
    fn exchange<S: Read + Write>(stream: &mut S, n: u8) -> std::io::Result<Vec<u8>> {
        stream.write_all(&[EGD_CMD_NONBLOCKING_READ, n])?;
        let mut len = [0u8; 1];
        stream.read_exact(&mut len)?;
        if len[0] != n {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "EGD response length prefix does not match the request",
            ));
        }
        let mut body = vec![0u8; len[0] as usize];
        stream.read_exact(&mut body)?;
        Ok(body)
    }
}

impl Source for Egd {
    fn flags(&self) -> SourceFlags {
        SourceFlags::SRC_EGD | SourceFlags::FL_OS | SourceFlags::FL_STRONG
    }

    fn fill(&self, out: &mut [u8]) -> Result<(), Error> {
        let n = u8::try_from(out.len()).map_err(|_| Error::INVALID_ARGUMENT)?;
        let body = self.request(n)?;
        out.copy_from_slice(&body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// A duplex test double: writes go nowhere, reads come from a
    /// pre-scripted response buffer. A real `TcpStream`/`UnixStream`
    /// has independent read/write directions; `Cursor` alone does not.
    struct ScriptedStream {
        requests: Vec<u8>,
        response: Cursor<Vec<u8>>,
    }

    impl Write for ScriptedStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.requests.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Read for ScriptedStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.response.read(buf)
        }
    }

    #[test]
    fn exchange_sends_the_nonblocking_read_command() {
        let mut stream = ScriptedStream { requests: Vec::new(), response: Cursor::new(vec![4u8, 0xde, 0xad, 0xbe, 0xef]) };
        let body = Egd::exchange(&mut stream, 4).unwrap();
        assert_eq!(stream.requests, vec![EGD_CMD_NONBLOCKING_READ, 4]);
        assert_eq!(body, vec![0xde, 0xad, 0xbe, 0xef]);
    }

    #[test]
    fn length_mismatch_fails_before_reading_any_body() {
        // The daemon claims only 2 bytes are available though 4 were
        // requested: `exchange` must fail right after reading the
        // length prefix, never touching the 2 body bytes that follow.
        let mut stream = ScriptedStream { requests: Vec::new(), response: Cursor::new(vec![2u8, 0xaa, 0xbb]) };
        let err = Egd::exchange(&mut stream, 4).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }
}
