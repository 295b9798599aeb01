//! Maps the page host the client was launched from to a game server endpoint.

use crate::error::ClientError;
use url::Url;

const LOCAL_HOSTS: [&str; 2] = ["localhost:8000", "127.0.0.1:8000"];
const LOCAL_TARGET: &str = "ws://localhost:8001/";

const PRODUCTION_HOST: &str = "legfight.github.io";
const PRODUCTION_TARGET: &str = "wss://legfight.herokuapp.com/";

/// Resolves the websocket endpoint for a deployment host. Unknown hosts are rejected
/// rather than falling back to a default target.
pub fn resolve_endpoint(host: &str) -> Result<Url, ClientError> {
    let target = if LOCAL_HOSTS.contains(&host) {
        LOCAL_TARGET
    } else if host == PRODUCTION_HOST {
        PRODUCTION_TARGET
    } else {
        return Err(ClientError::UnsupportedDeployment {
            host: host.to_string(),
        });
    };

    Ok(Url::parse(target)?)
}
