//! Configuration for the duel client.
//!
//! For now this is intentionally simple: you can either use defaults
//! or override via a few environment variables:
//!
//! - `DUEL_SERVER_HOST`    (default: "127.0.0.1")
//! - `DUEL_SERVER_PORT`    (default: "7911")
//! - `DUEL_PLAYER_NAME`    (default: "duelist")
//! - `DUEL_CLIENT_VERSION` (default: the protocol version this client
//!   was built against)

use std::env;
use std::str::FromStr;

/// Client version sent during the join handshake.
pub const DEFAULT_CLIENT_VERSION: u32 = 0x1360;

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Host name / IP of the duel server.
    pub host: String,

    /// TCP port of the duel server.
    pub port: u16,

    /// Player name announced on join (40 UTF-16LE bytes on the wire).
    pub name: String,

    /// Client version announced on join.
    pub version: u32,
}

impl Config {
    /// Construct a `Config` from environment variables, falling back
    /// to reasonable defaults.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let host = env::var("DUEL_SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = read_env_or_default("DUEL_SERVER_PORT", 7911u16)?;
        let name = env::var("DUEL_PLAYER_NAME").unwrap_or_else(|_| "duelist".to_string());
        let version = read_env_or_default("DUEL_CLIENT_VERSION", DEFAULT_CLIENT_VERSION)?;

        Ok(Config {
            host,
            port,
            name,
            version,
        })
    }

    /// Convenience: `host:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_env_or_default<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(key) {
        Ok(val) => Ok(val.parse::<T>()?),
        Err(_) => Ok(default),
    }
}
