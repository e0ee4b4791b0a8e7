//! Unbuffered entropy reads.

use std::io;

use crate::handle::DeviceHandle;
use crate::QuantixError;

/// Reads raw entropy from a borrowed handle, one OS read per call.
///
/// There is no buffering: a starving device shows up as an
/// `IncompleteRead` or `EndOfStream` on the very call that hit it.
pub struct RawReader<'h> {
    handle: &'h mut DeviceHandle,
}

impl<'h> RawReader<'h> {
    pub fn new(handle: &'h mut DeviceHandle) -> Self {
        Self { handle }
    }

    /// Read exactly `count` bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>, QuantixError> {
        if count == 0 {
            return Err(QuantixError::EmptyRead);
        }
        let mut buf = vec![0u8; count];
        self.read_into(&mut buf)?;
        Ok(buf)
    }

    /// Fill `buf` completely with a single read.
    ///
    /// A read interrupted by a signal before transferring data is reissued.
    /// Anything short of `buf.len()` is an error; the caller decides whether
    /// to try again.
    pub fn read_into(&mut self, buf: &mut [u8]) -> Result<(), QuantixError> {
        if buf.is_empty() {
            return Err(QuantixError::EmptyRead);
        }
        let (path, channel) = self.handle.parts()?;
        let n = loop {
            match channel.read(buf) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(QuantixError::Io {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            }
        };
        match n {
            0 => Err(QuantixError::EndOfStream),
            n if n < buf.len() => Err(QuantixError::IncompleteRead {
                expected: buf.len(),
                actual: n,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{Channel, Driver};
    use crate::protocol::ControlRequest;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Each read returns the next scripted outcome; `Ok(n)` fills n bytes of 0xAB.
    struct ReadScript(Arc<Mutex<VecDeque<io::Result<usize>>>>);

    impl Channel for ReadScript {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let next = self.0.lock().unwrap().pop_front().unwrap_or(Ok(buf.len()));
            let n = next?.min(buf.len());
            buf[..n].fill(0xAB);
            Ok(n)
        }

        fn control(&mut self, _request: &ControlRequest, _payload: &mut [u8]) -> nix::Result<()> {
            Ok(())
        }

        fn close(self: Box<Self>) -> io::Result<()> {
            Ok(())
        }
    }

    struct ReadDriver(Arc<Mutex<VecDeque<io::Result<usize>>>>);

    impl Driver for ReadDriver {
        fn open(&self, _path: &Path) -> io::Result<Box<dyn Channel>> {
            Ok(Box::new(ReadScript(self.0.clone())))
        }
    }

    fn handle_with(script: Vec<io::Result<usize>>) -> (Arc<Mutex<VecDeque<io::Result<usize>>>>, DeviceHandle) {
        let script = Arc::new(Mutex::new(VecDeque::from(script)));
        let handle = DeviceHandle::open(&ReadDriver(script.clone()), "/dev/qrandom0").unwrap();
        (script, handle)
    }

    #[test]
    fn full_read() {
        let (_s, mut handle) = handle_with(vec![]);
        let data = RawReader::new(&mut handle).read_bytes(64).unwrap();
        assert_eq!(data, vec![0xAB; 64]);
    }

    #[test]
    fn short_read_is_incomplete() {
        let (_s, mut handle) = handle_with(vec![Ok(10)]);
        let err = RawReader::new(&mut handle).read_bytes(16).unwrap_err();
        assert!(matches!(err, QuantixError::IncompleteRead { expected: 16, actual: 10 }));
        assert!(handle.is_open());
    }

    #[test]
    fn zero_read_is_end_of_stream() {
        let (_s, mut handle) = handle_with(vec![Ok(0)]);
        let err = RawReader::new(&mut handle).read_bytes(4).unwrap_err();
        assert!(matches!(err, QuantixError::EndOfStream));
    }

    #[test]
    fn short_read_is_not_retried() {
        let (script, mut handle) = handle_with(vec![Ok(3), Ok(8)]);
        assert!(RawReader::new(&mut handle).read_bytes(8).is_err());
        assert_eq!(script.lock().unwrap().len(), 1);
    }

    #[test]
    fn interrupted_read_is_reissued() {
        let (_s, mut handle) =
            handle_with(vec![Err(io::Error::from(io::ErrorKind::Interrupted)), Ok(8)]);
        let data = RawReader::new(&mut handle).read_bytes(8).unwrap();
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn os_error_is_surfaced() {
        let (_s, mut handle) = handle_with(vec![Err(io::Error::from_raw_os_error(nix::libc::EIO))]);
        let err = RawReader::new(&mut handle).read_bytes(8).unwrap_err();
        assert!(matches!(err, QuantixError::Io { .. }));
        assert_eq!(err.os_error(), Some(nix::libc::EIO));
    }

    #[test]
    fn zero_count_rejected() {
        let (script, mut handle) = handle_with(vec![Ok(0)]);
        assert!(matches!(
            RawReader::new(&mut handle).read_bytes(0),
            Err(QuantixError::EmptyRead)
        ));
        assert_eq!(script.lock().unwrap().len(), 1);
    }

    #[test]
    fn closed_handle_is_not_open() {
        let (_s, mut handle) = handle_with(vec![]);
        handle.close();
        assert!(matches!(
            RawReader::new(&mut handle).read_bytes(4),
            Err(QuantixError::DeviceNotOpen { .. })
        ));
    }
}
