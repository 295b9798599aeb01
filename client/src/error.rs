use shared::SnapshotError;
use thiserror::Error;

/// Everything that can go wrong on the client side.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unsupported deployment host {host:?}; this client only runs on localhost:8000 or the production site")]
    UnsupportedDeployment { host: String },

    #[error("{}", invalid_identity_message(.value))]
    InvalidIdentity { value: Option<String> },

    #[error("not connected to the game server")]
    NotConnected,

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(#[from] SnapshotError),

    #[error("invalid launch url: {0}")]
    InvalidLaunchUrl(#[from] url::ParseError),

    #[error("launch url {0:?} has no host")]
    MissingHost(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to encode outbound message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn invalid_identity_message(value: &Option<String>) -> String {
    match value {
        Some(value) => format!(
            "invalid player {:?}: set ?player=blue or ?player=red in the page url and reload",
            value
        ),
        None => "no player selected: add ?player=blue or ?player=red to the page url and reload"
            .to_string(),
    }
}
