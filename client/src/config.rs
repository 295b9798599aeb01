//! Launch configuration read from the page url the client was started with.

use crate::error::ClientError;
use log::debug;
use url::Url;

pub const PLAYER_PARAM: &str = "player";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// `host[:port]` of the page, as a browser would report `location.host`.
    pub host: String,
    /// Raw value of the `player` query parameter. Validated by the join handshake.
    pub player: Option<String>,
}

impl LaunchConfig {
    pub fn from_page_url(raw: &str) -> Result<Self, ClientError> {
        let url = Url::parse(raw)?;
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::MissingHost(raw.to_string()))?;

        let host = match url.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        let player = url
            .query_pairs()
            .find(|(key, _)| key == PLAYER_PARAM)
            .map(|(_, value)| value.into_owned());

        debug!("Launch host {} with player {:?}", host, player);
        Ok(LaunchConfig { host, player })
    }
}
