use log::{debug, warn};
use std::fs;
use std::io::{self, Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

/// Byte asking the running launcher to raise and maximize its window.
pub const RAISE_REQUEST: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceRequest {
    Raise,
    Unknown(u8),
}

impl From<u8> for InstanceRequest {
    fn from(byte: u8) -> Self {
        match byte {
            RAISE_REQUEST => InstanceRequest::Raise,
            other => InstanceRequest::Unknown(other),
        }
    }
}

/// Asks an already running instance to come to the front.
pub fn send_raise(socket_path: &Path) -> io::Result<()> {
    let mut stream = UnixStream::connect(socket_path)?;
    stream.write_all(&[RAISE_REQUEST])?;
    stream.flush()
}

/// Listening side of the single-instance socket. The socket file is removed
/// again when the server is dropped.
pub struct InstanceServer {
    listener: UnixListener,
    socket_path: PathBuf,
}

impl InstanceServer {
    pub fn bind(socket_path: &Path) -> io::Result<Self> {
        // A leftover socket from a crashed instance would make bind fail.
        let _ = fs::remove_file(socket_path);
        let listener = UnixListener::bind(socket_path)?;
        debug!("Listening for instance requests on {:?}", socket_path);
        Ok(Self { listener, socket_path: socket_path.to_path_buf() })
    }

    /// Blocks until a client connects and sends its request byte.
    pub fn next_request(&self) -> io::Result<InstanceRequest> {
        let (mut stream, _) = self.listener.accept()?;
        let mut byte = [0u8; 1];
        stream.read_exact(&mut byte)?;
        let request = InstanceRequest::from(byte[0]);
        if let InstanceRequest::Unknown(b) = request {
            warn!("Ignoring unknown instance request {:#04x}", b);
        }
        Ok(request)
    }
}

impl Drop for InstanceServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.socket_path);
    }
}
