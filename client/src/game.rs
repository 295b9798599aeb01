use crate::error::ClientError;
use crate::input::{InputRelay, KeyTransition};
use crate::join::{JoinHandshake, JoinState};
use crate::network::{SessionEvent, TransportSession};
use crate::particles::{ParticleSystem, SparkleCanvas};
use crate::scene::{Applied, SceneModel, StateRenderer};
use log::{error, info, warn};
use shared::{Identity, Scores};

/// Everything the client does between frames, wired to one transport session.
///
/// The frame loop calls [`ClientGame::handle_key`] for each key transition,
/// [`ClientGame::pump_network`] to process inbound events, and
/// [`ClientGame::tick_particles`] once per display refresh. All of it runs on the
/// render thread.
pub struct ClientGame {
    session: TransportSession,
    join: JoinHandshake,
    renderer: StateRenderer,
    scene: SceneModel,
    particles: ParticleSystem,
    relay: InputRelay,
    dropped_snapshots: u64,
}

impl ClientGame {
    pub fn new(session: TransportSession, configured_player: Option<String>) -> Self {
        Self {
            session,
            join: JoinHandshake::new(configured_player),
            renderer: StateRenderer::new(),
            scene: SceneModel::new(),
            particles: ParticleSystem::new(),
            relay: InputRelay::new(),
            dropped_snapshots: 0,
        }
    }

    /// Handles every event the transport has queued, in arrival order.
    pub fn pump_network(&mut self) {
        while let Some(event) = self.session.poll() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Ready => match self.join.on_ready(&self.session) {
                Ok(identity) => {
                    self.relay.arm();
                    info!("Playing as {}", identity);
                }
                Err(e) => {
                    error!("Join aborted: {}", e);
                    self.scene.set_diagnostic(e.to_string());
                }
            },

            SessionEvent::Message(raw) => {
                match self
                    .renderer
                    .on_message(&raw, &mut self.scene, &mut self.particles)
                {
                    Ok(Applied::Snapshot) => {}
                    Ok(Applied::GameOver(scores)) => {
                        info!("Game over: blue {}, red {}", scores.blue, scores.red);
                        let message = game_over_message(scores, self.identity());
                        self.scene.set_announcement(message);
                    }
                    Err(e) => {
                        self.dropped_snapshots += 1;
                        error!("Dropping server message: {}", e);
                    }
                }
            }

            // An identity problem outlives the connection; anything else is replaced
            // by the reason the connection went away.
            SessionEvent::Closed { reason } => {
                warn!("Disconnected: {}", reason);
                if !matches!(self.join.state(), JoinState::Rejected(_)) {
                    self.scene.set_diagnostic(format!(
                        "Disconnected from the game server ({}). Reload to play again.",
                        reason
                    ));
                }
            }
        }
    }

    pub fn handle_key(&mut self, transition: KeyTransition) {
        match self.relay.relay(&transition, &self.session) {
            Ok(_) => {}
            Err(ClientError::NotConnected) => {
                warn!("Dropping {:?}: not connected", transition);
            }
            Err(e) => error!("Failed to relay {:?}: {}", transition, e),
        }
    }

    pub fn tick_particles(&mut self, canvas: &mut impl SparkleCanvas) {
        self.particles.tick(canvas);
    }

    pub fn scene(&self) -> &SceneModel {
        &self.scene
    }

    pub fn identity(&self) -> Option<Identity> {
        self.join.identity()
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn snapshots_applied(&self) -> u64 {
        self.renderer.applied()
    }

    pub fn dropped_snapshots(&self) -> u64 {
        self.dropped_snapshots
    }
}

fn game_over_message(scores: Scores, me: Option<Identity>) -> String {
    let winner = match scores.blue.cmp(&scores.red) {
        std::cmp::Ordering::Greater => Some(Identity::Blue),
        std::cmp::Ordering::Less => Some(Identity::Red),
        std::cmp::Ordering::Equal => None,
    };
    let outcome = match (winner, me) {
        (None, _) => "Draw".to_string(),
        (Some(winner), Some(me)) if winner == me => "You won".to_string(),
        (Some(_), Some(_)) => "You lost".to_string(),
        (Some(winner), None) => format!("{} wins", winner),
    };
    format!("Game over. {}! Blue {}, red {}", outcome, scores.blue, scores.red)
}
