use std::io::ErrorKind;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tracing::{debug, info};

use crate::config::PhyConfig;
use crate::error::{PhyError, Result};
use crate::traits::PhyChannel;

/// Unix datagram medium.
///
/// Each frame travels as one datagram, so the socket's own message
/// boundaries delimit frames. Bound sockets live at a filesystem path and are
/// removed on `Drop` if the path still refers to the socket this value created.
pub struct DatagramPhy {
    socket: UnixDatagram,
    path: Option<PathBuf>,
    peer: Option<PathBuf>,
    created_inode: Option<(u64, u64)>,
    config: PhyConfig,
    recv_buf: BytesMut,
}

impl DatagramPhy {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// Maximum socket path length.
    /// Unix `sockaddr_un.sun_path` is typically 108 bytes on Linux, 104 on macOS.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind a datagram socket at `path` with default configuration.
    ///
    /// An existing socket file at `path` is removed first (stale socket
    /// cleanup). Any other existing file is left alone and binding fails.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_config(path, PhyConfig::default())
    }

    /// Bind a datagram socket at `path` with explicit configuration.
    pub fn bind_with_config(path: impl AsRef<Path>, config: PhyConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        validate_path_len(&path, Self::MAX_PATH_LEN)?;
        config.validate()?;

        if path.exists() {
            let metadata = std::fs::symlink_metadata(&path).map_err(|e| PhyError::Bind {
                path: path.clone(),
                source: e,
            })?;
            if metadata.file_type().is_socket() {
                debug!(?path, "removing stale socket");
                std::fs::remove_file(&path).map_err(|e| PhyError::Bind {
                    path: path.clone(),
                    source: e,
                })?;
            } else {
                return Err(PhyError::Bind {
                    path: path.clone(),
                    source: std::io::Error::new(
                        ErrorKind::AlreadyExists,
                        "existing path is not a unix socket",
                    ),
                });
            }
        }

        let socket = UnixDatagram::bind(&path).map_err(|e| PhyError::Bind {
            path: path.clone(),
            source: e,
        })?;

        std::fs::set_permissions(
            &path,
            std::fs::Permissions::from_mode(Self::DEFAULT_SOCKET_MODE),
        )
        .map_err(|e| PhyError::Bind {
            path: path.clone(),
            source: e,
        })?;
        let created = std::fs::symlink_metadata(&path).map_err(|e| PhyError::Bind {
            path: path.clone(),
            source: e,
        })?;

        info!(?path, "bound unix datagram medium");

        let mut phy = Self::from_socket(socket, config)?;
        phy.created_inode = Some((created.dev(), created.ino()));
        phy.path = Some(path);
        Ok(phy)
    }

    /// Create an unbound socket that can only transmit once connected.
    pub fn unbound(config: PhyConfig) -> Result<Self> {
        let socket = UnixDatagram::unbound()?;
        Self::from_socket(socket, config)
    }

    fn from_socket(socket: UnixDatagram, config: PhyConfig) -> Result<Self> {
        config.validate()?;
        // One spare byte tells a full-size datagram from a truncated one.
        let buf_len = config
            .max_frame_size
            .checked_add(1)
            .ok_or(PhyError::InvalidFrameLimit {
                size: config.max_frame_size,
                max: crate::config::MAX_FRAME_LIMIT,
            })?;
        socket.set_read_timeout(config.read_timeout)?;
        socket.set_write_timeout(config.write_timeout)?;
        Ok(Self {
            socket,
            path: None,
            peer: None,
            created_inode: None,
            recv_buf: BytesMut::zeroed(buf_len),
            config,
        })
    }

    /// Direct all subsequent sends to the socket bound at `peer`.
    pub fn connect(&mut self, peer: impl AsRef<Path>) -> Result<()> {
        let peer = peer.as_ref();
        validate_path_len(peer, Self::MAX_PATH_LEN)?;
        self.socket.connect(peer).map_err(|e| PhyError::Connect {
            path: peer.to_path_buf(),
            source: e,
        })?;
        debug!(?peer, "connected unix datagram medium");
        self.peer = Some(peer.to_path_buf());
        Ok(())
    }

    /// The path this socket is bound to, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl PhyChannel for DatagramPhy {
    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        if frame.len() > self.config.max_frame_size {
            return Err(PhyError::FrameTooLarge {
                size: frame.len(),
                max: self.config.max_frame_size,
            });
        }
        if self.peer.is_none() {
            return Err(PhyError::NotConnected);
        }

        loop {
            match self.socket.send(frame) {
                Ok(n) if n == frame.len() => return Ok(()),
                Ok(n) => {
                    return Err(PhyError::Io(std::io::Error::new(
                        ErrorKind::WriteZero,
                        format!("short datagram write ({n} of {} bytes)", frame.len()),
                    )))
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(PhyError::Io(err)),
            }
        }
    }

    fn recv_frame(&mut self) -> Result<Option<Bytes>> {
        let limit = self.config.max_frame_size;
        loop {
            match self.socket.recv(&mut self.recv_buf[..]) {
                Ok(n) if n > limit => return Err(PhyError::Truncated { size: n, max: limit }),
                Ok(n) => return Ok(Some(Bytes::copy_from_slice(&self.recv_buf[..n]))),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    return Ok(None)
                }
                Err(err) => return Err(PhyError::Io(err)),
            }
        }
    }

    fn medium_name(&self) -> &'static str {
        "unix-datagram"
    }
}

impl std::fmt::Debug for DatagramPhy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatagramPhy")
            .field("path", &self.path)
            .field("peer", &self.peer)
            .field("max_frame_size", &self.config.max_frame_size)
            .finish()
    }
}

impl Drop for DatagramPhy {
    fn drop(&mut self) {
        let (Some(path), Some((expected_dev, expected_ino))) = (&self.path, self.created_inode)
        else {
            return;
        };
        if let Ok(metadata) = std::fs::symlink_metadata(path) {
            if metadata.file_type().is_socket()
                && metadata.dev() == expected_dev
                && metadata.ino() == expected_ino
            {
                debug!(?path, "cleaning up socket file");
                let _ = std::fs::remove_file(path);
            } else {
                debug!(?path, "socket path identity changed; skipping cleanup");
            }
        }
    }
}

fn validate_path_len(path: &Path, max: usize) -> Result<()> {
    let len = path.as_os_str().len();
    if len >= max {
        return Err(PhyError::PathTooLong {
            path: path.to_path_buf(),
            len,
            max,
        });
    }
    Ok(())
}
