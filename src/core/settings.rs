//! Process environment configuration.

use std::{
    env,
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
};

use tracing::warn;

pub const STORE_URI_VAR: &str = "STORE_URI";
pub const PORT_VAR: &str = "PORT";
pub const UPLOAD_DIR_VAR: &str = "UPLOAD_DIR";

const HOST: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));
const DEFAULT_PORT: u16 = 5000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    /// Document store connection string. `None` leaves the server running
    /// with a disconnected store.
    pub store_uri: Option<String>,
    pub upload_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let port = match env::var(PORT_VAR) {
            Ok(raw) => match raw.parse() {
                Ok(port) => port,
                Err(_) => {
                    warn!(%raw, "{} is not a valid port, using {}", PORT_VAR, DEFAULT_PORT);
                    DEFAULT_PORT
                }
            },
            Err(_) => DEFAULT_PORT,
        };

        let store_uri = env::var(STORE_URI_VAR).ok().filter(|uri| !uri.is_empty());

        let upload_dir = env::var(UPLOAD_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR));

        Settings {
            host: HOST,
            port,
            store_uri,
            upload_dir,
        }
    }
}
