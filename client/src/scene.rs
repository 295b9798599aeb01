//! Applies decoded snapshots to whatever is showing the fight.

use crate::error::ClientError;
use crate::particles::{ParticleSystem, SparkleSeed};
use log::debug;
use macroquad::color::Color;
use shared::{DamagePoint, Identity, Limb, Position, Scores, ServerEvent, Snapshot};
use std::collections::BTreeMap;

pub const BLUE_COLOR: Color = Color::new(0.27, 0.53, 1.0, 1.0);
pub const RED_COLOR: Color = Color::new(1.0, 0.27, 0.27, 1.0);
pub const NEUTRAL_SPARKLE_COLOR: Color = Color::new(1.0, 0.85, 0.2, 1.0);

pub fn player_color(player: Identity) -> Color {
    match player {
        Identity::Blue => BLUE_COLOR,
        Identity::Red => RED_COLOR,
    }
}

/// Write-only view of the on-screen fight.
pub trait Scene {
    /// Forgets every limb drawn for `player`.
    fn clear_limbs(&mut self, player: Identity);
    fn set_limb_pose(&mut self, player: Identity, limb: Limb, pose: Position);
    fn set_score(&mut self, player: Identity, score: i64);
}

/// What the renderer draws each frame.
#[derive(Debug, Clone, Default)]
pub struct SceneModel {
    poses: BTreeMap<(Identity, Limb), Position>,
    scores: BTreeMap<Identity, i64>,
    diagnostic: Option<String>,
    announcement: Option<String>,
}

impl SceneModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pose(&self, player: Identity, limb: Limb) -> Option<Position> {
        self.poses.get(&(player, limb)).copied()
    }

    pub fn poses(&self) -> impl Iterator<Item = (Identity, Limb, Position)> + '_ {
        self.poses
            .iter()
            .map(|((player, limb), pose)| (*player, *limb, *pose))
    }

    pub fn score(&self, player: Identity) -> i64 {
        self.scores.get(&player).copied().unwrap_or(0)
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn set_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostic = Some(message.into());
    }

    /// Match news shown under the scores, such as the result of the last game.
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    pub fn set_announcement(&mut self, message: impl Into<String>) {
        self.announcement = Some(message.into());
    }
}

impl Scene for SceneModel {
    fn clear_limbs(&mut self, player: Identity) {
        self.poses.retain(|(owner, _), _| *owner != player);
    }

    fn set_limb_pose(&mut self, player: Identity, limb: Limb, pose: Position) {
        self.poses.insert((player, limb), pose);
    }

    fn set_score(&mut self, player: Identity, score: i64) {
        self.scores.insert(player, score);
    }
}

/// What an inbound message turned out to be once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Snapshot,
    GameOver(Scores),
}

/// Decodes inbound snapshots and pushes them onto a [`Scene`] and the particle system.
#[derive(Debug, Default)]
pub struct StateRenderer {
    applied: u64,
}

impl StateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one raw server message. A malformed message leaves the scene untouched.
    pub fn on_message(
        &mut self,
        raw: &str,
        scene: &mut impl Scene,
        particles: &mut ParticleSystem,
    ) -> Result<Applied, ClientError> {
        match ServerEvent::decode(raw)? {
            ServerEvent::Snapshot(snapshot) => {
                self.apply(&snapshot, scene, particles);
                Ok(Applied::Snapshot)
            }
            ServerEvent::GameOver { scores } => {
                for player in Identity::ALL {
                    scene.set_score(player, scores.get(player));
                }
                Ok(Applied::GameOver(scores))
            }
        }
    }

    pub fn apply(
        &mut self,
        snapshot: &Snapshot,
        scene: &mut impl Scene,
        particles: &mut ParticleSystem,
    ) {
        for player in Identity::ALL {
            scene.clear_limbs(player);
            for (limb, pose) in snapshot.player(player).limbs() {
                scene.set_limb_pose(player, limb, *pose);
            }
            if let Some(scores) = &snapshot.scores {
                scene.set_score(player, scores.get(player));
            }
        }

        if !snapshot.damage_points.is_empty() {
            let seeds: Vec<SparkleSeed> = snapshot.damage_points.iter().map(seed_for).collect();
            debug!("Spawning {} sparkles", seeds.len());
            particles.spawn(&seeds);
        }

        self.applied += 1;
    }

    /// Number of snapshots applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

fn seed_for(point: &DamagePoint) -> SparkleSeed {
    SparkleSeed {
        x: point.x,
        y: point.y,
        color: point
            .attacker
            .map(player_color)
            .unwrap_or(NEUTRAL_SPARKLE_COLOR),
    }
}
