//! Bot configuration.

use uuid::Uuid;

use crate::BotError;

/// Where the game server listens unless told otherwise.
pub const DEFAULT_ADDR: &str = "127.0.0.1:5942";

/// The name the bot plays under unless told otherwise.
pub const DEFAULT_NAME: &str = "RustBot";

// ---------------------------------------------------------------------------
// BotConfig
// ---------------------------------------------------------------------------

/// Everything the bot needs to join a game.
///
/// ```rust
/// use perudo_bot::BotConfig;
///
/// let config = BotConfig::default()
///     .addr("10.0.0.7:5942")
///     .name("Dudo");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// `host:port` of the game server.
    pub addr: String,

    /// Player name. `Turn::next_player` is compared against it.
    pub name: String,

    /// Stable player id. The server uses it to recognise a reconnecting
    /// player, so reuse it across runs to rejoin the same seat.
    pub uuid: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            name: DEFAULT_NAME.to_string(),
            uuid: Uuid::new_v4().to_string(),
        }
    }
}

impl BotConfig {
    /// Sets the server address.
    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Sets the player name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the player uuid.
    pub fn uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Checks the config before any connection is attempted.
    ///
    /// # Errors
    /// `BotError::Config` if the address or name is empty, or the uuid is
    /// not a UUID.
    pub fn validate(&self) -> Result<(), BotError> {
        if self.addr.trim().is_empty() {
            return Err(BotError::Config("server address must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(BotError::Config("name must not be empty".into()));
        }
        Uuid::parse_str(&self.uuid)
            .map_err(|e| BotError::Config(format!("uuid `{}`: {e}", self.uuid)))?;
        Ok(())
    }
}

/// Joins a host and port into an address `TcpStream::connect` accepts.
///
/// IPv6 literals get brackets.
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BotConfig::default();
        assert_eq!(config.addr, "127.0.0.1:5942");
        assert_eq!(config.name, "RustBot");
        assert!(Uuid::parse_str(&config.uuid).is_ok());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_uuid_is_fresh() {
        assert_ne!(BotConfig::default().uuid, BotConfig::default().uuid);
    }

    #[test]
    fn test_builder_setters() {
        let config = BotConfig::default()
            .addr("localhost:1")
            .name("PyBot")
            .uuid("80f2fa9e-5fbd-4e73-a518-141cb0e1e2d5");
        assert_eq!(config.addr, "localhost:1");
        assert_eq!(config.name, "PyBot");
        assert_eq!(config.uuid, "80f2fa9e-5fbd-4e73-a518-141cb0e1e2d5");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        let err = BotConfig::default().name("  ").validate().unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_empty_addr_rejected() {
        let err = BotConfig::default().addr("").validate().unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }

    #[test]
    fn test_bad_uuid_rejected() {
        let err = BotConfig::default().uuid("not-a-uuid").validate().unwrap_err();
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn test_join_host_port() {
        assert_eq!(join_host_port("127.0.0.1", 5942), "127.0.0.1:5942");
        assert_eq!(join_host_port("example.org", 80), "example.org:80");
        assert_eq!(join_host_port("::1", 5942), "[::1]:5942");
        assert_eq!(join_host_port("[::1]", 5942), "[::1]:5942");
    }
}
