use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 3000);

/// Server settings, read from the environment at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `DRAFT_ADDR`, e.g. `0.0.0.0:8080`
    pub addr: SocketAddr,
    /// `DRAFT_STATIC_DIR`: built editor front-end to serve at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(DEFAULT_ADDR),
            static_dir: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var("DRAFT_ADDR").ok().as_deref(),
            std::env::var("DRAFT_STATIC_DIR").ok().as_deref(),
        )
    }

    fn from_vars(addr: Option<&str>, static_dir: Option<&str>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = addr {
            match raw.parse::<SocketAddr>() {
                Ok(addr) => config.addr = addr,
                Err(e) => warn!("Ignoring DRAFT_ADDR '{}': {}", raw, e),
            }
        }

        config.static_dir = static_dir
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from);

        config
    }
}
