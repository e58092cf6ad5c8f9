//! Configuration and limits for WebSocket connections.

use crate::protocol::frame::MAX_PAYLOAD_LEN;

/// Resource limits applied while handshaking and framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum payload size of a single frame in bytes.
    ///
    /// Never larger than the 16-bit wire ceiling; values above it are clamped.
    ///
    /// Default: 65535
    pub max_payload_size: usize,

    /// Maximum size of the upgrade request head in bytes.
    ///
    /// Default: 8 KB (8192)
    pub max_handshake_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_LEN,
            max_handshake_size: 8192,
        }
    }
}

impl Limits {
    /// Create new limits with custom values.
    #[must_use]
    pub const fn new(max_payload_size: usize, max_handshake_size: usize) -> Self {
        let max_payload_size = if max_payload_size > MAX_PAYLOAD_LEN {
            MAX_PAYLOAD_LEN
        } else {
            max_payload_size
        };
        Self {
            max_payload_size,
            max_handshake_size,
        }
    }

    /// Validate that a payload size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OversizedPayload`](crate::Error::OversizedPayload) if `size` exceeds the configured maximum.
    pub const fn check_payload_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_payload_size {
            Err(crate::Error::OversizedPayload {
                size,
                max: self.max_payload_size,
            })
        } else {
            Ok(())
        }
    }

    /// Validate that handshake size is within limits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HandshakeTooLarge`](crate::Error::HandshakeTooLarge) if `size` exceeds the configured maximum.
    pub const fn check_handshake_size(&self, size: usize) -> Result<(), crate::Error> {
        if size > self.max_handshake_size {
            Err(crate::Error::HandshakeTooLarge {
                size,
                max: self.max_handshake_size,
            })
        } else {
            Ok(())
        }
    }
}

/// WebSocket connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Resource limits.
    pub limits: Limits,

    /// Accept unmasked frames from clients (server only).
    ///
    /// Clients are required to mask every frame. Setting this to `true` is
    /// only useful for testing against hand-written peers.
    ///
    /// Default: false
    pub accept_unmasked_frames: bool,

    /// Read buffer size (in bytes).
    ///
    /// Default: 8 KB (8192)
    pub read_buffer_size: usize,

    /// Write buffer size (in bytes).
    ///
    /// Default: 8 KB (8192)
    pub write_buffer_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            accept_unmasked_frames: false,
            read_buffer_size: 8192,
            write_buffer_size: 8192,
        }
    }
}

impl Config {
    /// Create a new configuration with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set custom limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Allow or reject unmasked client frames.
    #[must_use]
    pub const fn with_accept_unmasked_frames(mut self, accept: bool) -> Self {
        self.accept_unmasked_frames = accept;
        self
    }

    /// Set read buffer size.
    #[must_use]
    pub const fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Set write buffer size.
    #[must_use]
    pub const fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Configure for server role (reject unmasked client frames).
    #[must_use]
    pub fn server() -> Self {
        Self::default()
    }

    /// Configure for client role.
    ///
    /// Identical to the server defaults today; kept separate so callers
    /// state their intent.
    #[must_use]
    pub fn client() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_default() {
        let limits = Limits::default();
        assert_eq!(limits.max_payload_size, 65535);
        assert_eq!(limits.max_handshake_size, 8192);
    }

    #[test]
    fn test_limits_new_clamps_payload() {
        let limits = Limits::new(1 << 20, 1024);
        assert_eq!(limits.max_payload_size, MAX_PAYLOAD_LEN);
        assert_eq!(limits.max_handshake_size, 1024);
    }

    #[test]
    fn test_limits_check_payload_size() {
        let limits = Limits::default();
        assert!(limits.check_payload_size(65535).is_ok());
        assert_eq!(
            limits.check_payload_size(65536),
            Err(crate::Error::OversizedPayload {
                size: 65536,
                max: 65535
            })
        );
    }

    #[test]
    fn test_limits_check_handshake_size() {
        let limits = Limits::default();
        assert!(limits.check_handshake_size(1024).is_ok());
        assert!(limits.check_handshake_size(10000).is_err());
    }

    #[test]
    fn test_config_server() {
        let config = Config::server();
        assert!(!config.accept_unmasked_frames);
        assert_eq!(config.limits, Limits::default());
    }

    #[test]
    fn test_config_builder() {
        let config = Config::new()
            .with_limits(Limits::new(1000, 2048))
            .with_accept_unmasked_frames(true)
            .with_read_buffer_size(1024)
            .with_write_buffer_size(2048);

        assert!(config.accept_unmasked_frames);
        assert_eq!(config.limits.max_payload_size, 1000);
        assert_eq!(config.read_buffer_size, 1024);
        assert_eq!(config.write_buffer_size, 2048);
    }
}
