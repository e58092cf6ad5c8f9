//! Which end of the connection this engine plays.

/// Connection role.
///
/// Decides which mask bit the frame decoder expects on incoming frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Reads server frames: incoming frames are unmasked, outgoing ones masked.
    Client,
    /// Reads client frames: incoming frames are masked, outgoing ones unmasked.
    Server,
}

impl Role {
    /// Whether frames sent by this role carry a mask key.
    #[inline]
    #[must_use]
    pub const fn must_mask(&self) -> bool {
        matches!(self, Role::Client)
    }

    /// Whether frames received by this role must carry a mask key.
    #[inline]
    #[must_use]
    pub const fn expects_masked(&self) -> bool {
        matches!(self, Role::Server)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Client => "client",
            Role::Server => "server",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking_is_asymmetric() {
        assert!(Role::Client.must_mask());
        assert!(!Role::Client.expects_masked());
        assert!(!Role::Server.must_mask());
        assert!(Role::Server.expects_masked());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Client.to_string(), "client");
        assert_eq!(Role::Server.to_string(), "server");
    }
}
