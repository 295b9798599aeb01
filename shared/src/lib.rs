use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const ARENA_WIDTH: f32 = 1600.0;
pub const ARENA_HEIGHT: f32 = 800.0;

pub const TORSO_SIZE: (f32, f32) = (164.0, 254.0);
pub const THIGH_SIZE: (f32, f32) = (60.0, 142.0);
pub const CALF_SIZE: (f32, f32) = (60.0, 275.0);

/// One of the two fixed player roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Identity {
    Blue,
    Red,
}

impl Identity {
    pub const ALL: [Identity; 2] = [Identity::Blue, Identity::Red];

    pub fn as_str(&self) -> &'static str {
        match self {
            Identity::Blue => "blue",
            Identity::Red => "red",
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown player identity {0:?}, expected \"blue\" or \"red\"")]
pub struct ParseIdentityError(pub String);

impl FromStr for Identity {
    type Err = ParseIdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(Identity::Blue),
            "red" => Ok(Identity::Red),
            other => Err(ParseIdentityError(other.to_string())),
        }
    }
}

/// Rigid-body pose of a single limb. `angle` is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self { x, y, angle }
    }
}

/// Limbs a fighter can report. `Torso`, `Rleg` and `Lleg` form the canonical set;
/// the thigh/calf variants come from the articulated body of older servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Limb {
    Torso,
    Rleg,
    Lleg,
    Rthigh,
    Lthigh,
    Rcalf,
    Lcalf,
}

impl Limb {
    pub const CANONICAL: [Limb; 3] = [Limb::Torso, Limb::Rleg, Limb::Lleg];

    pub const ALL: [Limb; 7] = [
        Limb::Torso,
        Limb::Rleg,
        Limb::Lleg,
        Limb::Rthigh,
        Limb::Lthigh,
        Limb::Rcalf,
        Limb::Lcalf,
    ];

    pub fn from_name(name: &str) -> Option<Limb> {
        Self::ALL.iter().copied().find(|limb| limb.name() == name)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Limb::Torso => "torso",
            Limb::Rleg => "rleg",
            Limb::Lleg => "lleg",
            Limb::Rthigh => "rthigh",
            Limb::Lthigh => "lthigh",
            Limb::Rcalf => "rcalf",
            Limb::Lcalf => "lcalf",
        }
    }

    /// Box dimensions (width, height) of the limb in arena pixels.
    pub fn size(&self) -> (f32, f32) {
        match self {
            Limb::Torso => TORSO_SIZE,
            Limb::Rthigh | Limb::Lthigh => THIGH_SIZE,
            Limb::Rleg | Limb::Lleg | Limb::Rcalf | Limb::Lcalf => CALF_SIZE,
        }
    }
}

/// Limb poses of one fighter, keyed by limb.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerState {
    limbs: BTreeMap<Limb, Position>,
}

impl PlayerState {
    pub fn get(&self, limb: Limb) -> Option<&Position> {
        self.limbs.get(&limb)
    }

    pub fn limbs(&self) -> impl Iterator<Item = (Limb, &Position)> {
        self.limbs.iter().map(|(limb, pose)| (*limb, pose))
    }
}

/// A point where a strike landed, optionally tagged with the attacking player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamagePoint {
    pub x: f32,
    pub y: f32,
    pub attacker: Option<Identity>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scores {
    pub blue: i64,
    pub red: i64,
}

impl Scores {
    pub fn get(&self, player: Identity) -> i64 {
        match player {
            Identity::Blue => self.blue,
            Identity::Red => self.red,
        }
    }
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot has no positions for player {0}")]
    MissingPlayer(Identity),
    #[error("snapshot positions for player {0} contain no known limbs")]
    NoLimbs(Identity),
    #[error("unknown server event type {0:?}")]
    UnknownEvent(String),
}

/// One complete server broadcast. Scores are `None` when the server did not send any.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub blue: PlayerState,
    pub red: PlayerState,
    pub damage_points: Vec<DamagePoint>,
    pub scores: Option<Scores>,
}

impl Snapshot {
    pub fn player(&self, player: Identity) -> &PlayerState {
        match player {
            Identity::Blue => &self.blue,
            Identity::Red => &self.red,
        }
    }

    /// Decodes a server message. Top-level `blue`/`red`/`damagePoints` are canonical;
    /// `positions.*` and `hits.*` are only consulted when the canonical field is absent.
    pub fn decode(text: &str) -> Result<Snapshot, SnapshotError> {
        let wire: WireSnapshot = serde_json::from_str(text)?;
        let mut nested = wire.positions.unwrap_or_default();

        let blue = wire
            .blue
            .or_else(|| nested.blue.take())
            .ok_or(SnapshotError::MissingPlayer(Identity::Blue))?;
        let red = wire
            .red
            .or_else(|| nested.red.take())
            .ok_or(SnapshotError::MissingPlayer(Identity::Red))?;

        let damage_points = match (wire.damage_points, wire.hits) {
            (Some(points), _) => points.into_iter().map(DamagePoint::from).collect(),
            (None, Some(hits)) => hits.into_damage_points(),
            (None, None) => Vec::new(),
        };

        Ok(Snapshot {
            blue: player_state(Identity::Blue, blue)?,
            red: player_state(Identity::Red, red)?,
            damage_points,
            scores: wire.scores,
        })
    }
}

fn player_state(
    player: Identity,
    wire: HashMap<String, Position>,
) -> Result<PlayerState, SnapshotError> {
    let limbs: BTreeMap<Limb, Position> = wire
        .into_iter()
        .filter_map(|(name, pose)| Limb::from_name(&name).map(|limb| (limb, pose)))
        .collect();

    if limbs.is_empty() {
        return Err(SnapshotError::NoLimbs(player));
    }
    Ok(PlayerState { limbs })
}

#[derive(Debug, Deserialize)]
struct WireSnapshot {
    #[serde(default)]
    blue: Option<HashMap<String, Position>>,
    #[serde(default)]
    red: Option<HashMap<String, Position>>,
    #[serde(default)]
    positions: Option<WirePositions>,
    #[serde(default, rename = "damagePoints")]
    damage_points: Option<Vec<WireDamagePoint>>,
    #[serde(default)]
    hits: Option<WireHits>,
    #[serde(default)]
    scores: Option<Scores>,
}

#[derive(Debug, Default, Deserialize)]
struct WirePositions {
    #[serde(default)]
    blue: Option<HashMap<String, Position>>,
    #[serde(default)]
    red: Option<HashMap<String, Position>>,
}

#[derive(Debug, Deserialize)]
struct WireDamagePoint {
    x: f32,
    y: f32,
    #[serde(default)]
    player: Option<Identity>,
}

impl From<WireDamagePoint> for DamagePoint {
    fn from(point: WireDamagePoint) -> Self {
        DamagePoint {
            x: point.x,
            y: point.y,
            attacker: point.player,
        }
    }
}

// Hit lists keyed by the striking player. Older servers serialized points as tuples.
#[derive(Debug, Deserialize)]
struct WireHits {
    #[serde(default)]
    blue: Vec<WirePoint>,
    #[serde(default)]
    red: Vec<WirePoint>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePoint {
    Object { x: f32, y: f32 },
    Pair(f32, f32),
}

impl WireHits {
    fn into_damage_points(self) -> Vec<DamagePoint> {
        let tag = |attacker: Identity| {
            move |point: WirePoint| {
                let (x, y) = match point {
                    WirePoint::Object { x, y } => (x, y),
                    WirePoint::Pair(x, y) => (x, y),
                };
                DamagePoint {
                    x,
                    y,
                    attacker: Some(attacker),
                }
            }
        };

        self.blue
            .into_iter()
            .map(tag(Identity::Blue))
            .chain(self.red.into_iter().map(tag(Identity::Red)))
            .collect()
    }
}

/// Anything the server broadcasts. Untagged messages are snapshots; tagged ones carry
/// match events such as the end of a game.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Snapshot(Snapshot),
    GameOver { scores: Scores },
}

impl ServerEvent {
    pub fn decode(text: &str) -> Result<ServerEvent, SnapshotError> {
        let envelope: WireEnvelope = serde_json::from_str(text)?;
        match envelope.kind.as_deref() {
            None => Ok(ServerEvent::Snapshot(Snapshot::decode(text)?)),
            Some("game_over") => match serde_json::from_str::<WireEvent>(text)? {
                WireEvent::GameOver { scores } => Ok(ServerEvent::GameOver { scores }),
            },
            Some(other) => Err(SnapshotError::UnknownEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    GameOver { scores: Scores },
}

/// The one-shot join handshake, serialized as `{"type": "join", "player": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Handshake {
    Join { player: Identity },
}

/// Messages the client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClientMessage {
    Handshake(Handshake),
    KeyDown { keydown: String },
    KeyUp { keyup: String },
}

impl ClientMessage {
    pub fn join(player: Identity) -> Self {
        ClientMessage::Handshake(Handshake::Join { player })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
