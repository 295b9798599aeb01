//! One-shot join handshake sent once the connection is ready.

use crate::error::ClientError;
use crate::network::TransportSession;
use log::{info, warn};
use shared::{ClientMessage, Identity};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinState {
    Pending,
    Joined(Identity),
    Rejected(Option<String>),
}

pub struct JoinHandshake {
    configured: Option<String>,
    state: JoinState,
}

impl JoinHandshake {
    /// `configured` is the raw `player` launch parameter, validated on ready.
    pub fn new(configured: Option<String>) -> Self {
        Self {
            configured,
            state: JoinState::Pending,
        }
    }

    pub fn state(&self) -> &JoinState {
        &self.state
    }

    pub fn identity(&self) -> Option<Identity> {
        match self.state {
            JoinState::Joined(identity) => Some(identity),
            _ => None,
        }
    }

    /// Validates the configured identity and sends the join message. Only the first
    /// successful call sends anything; later calls report the settled outcome.
    pub fn on_ready(&mut self, session: &TransportSession) -> Result<Identity, ClientError> {
        match &self.state {
            JoinState::Joined(identity) => return Ok(*identity),
            JoinState::Rejected(value) => {
                return Err(ClientError::InvalidIdentity {
                    value: value.clone(),
                })
            }
            JoinState::Pending => {}
        }

        let identity = match self.configured.as_deref().map(str::parse::<Identity>) {
            Some(Ok(identity)) => identity,
            _ => {
                warn!("Refusing to join with player {:?}", self.configured);
                self.state = JoinState::Rejected(self.configured.clone());
                return Err(ClientError::InvalidIdentity {
                    value: self.configured.clone(),
                });
            }
        };

        session.send(&ClientMessage::join(identity))?;
        info!("Joined as {}", identity);
        self.state = JoinState::Joined(identity);
        Ok(identity)
    }
}
