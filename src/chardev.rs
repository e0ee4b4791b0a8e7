//! Character-device transport: the real kernel driver behind `/dev/qrandom*`.

use std::fs::{File, OpenOptions};
use std::io::{self, Read};
use std::os::fd::{AsRawFd, IntoRawFd};
use std::path::Path;

use nix::errno::Errno;
use nix::libc;
use nix::sys::ioctl::ioctl_num_type;

use crate::handle::{Channel, Driver};
use crate::protocol::{ControlRequest, Direction};

/// Opens Quantis device nodes read-only, unbuffered.
#[derive(Debug, Default, Clone, Copy)]
pub struct CharDevice;

impl Driver for CharDevice {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Channel>> {
        let file = OpenOptions::new().read(true).open(path)?;
        Ok(Box::new(CharChannel { file }))
    }
}

/// An open device node. `File` is unbuffered, so each read is one `read(2)`.
struct CharChannel {
    file: File,
}

impl Channel for CharChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn control(&mut self, request: &ControlRequest, payload: &mut [u8]) -> nix::Result<()> {
        if payload.len() != request.encoded_size()
            || request.direction() != request.encoded_direction()
        {
            return Err(Errno::EINVAL);
        }
        let fd = self.file.as_raw_fd();
        let code = request.code() as ioctl_num_type;
        // SAFETY: `fd` is open for the lifetime of `self`. The driver copies
        // at most the size encoded in `code` to or from the pointer, and
        // `payload` was checked above to be exactly that long.
        let res = unsafe {
            match request.direction() {
                Direction::None => libc::ioctl(fd, code),
                Direction::Read | Direction::Write | Direction::ReadWrite => {
                    libc::ioctl(fd, code, payload.as_mut_ptr())
                }
            }
        };
        Errno::result(res).map(drop)
    }

    fn close(self: Box<Self>) -> io::Result<()> {
        let fd = self.file.into_raw_fd();
        nix::unistd::close(fd).map_err(io::Error::from)
    }
}
