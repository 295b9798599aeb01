//! # Legfight Client Library
//!
//! Player-facing client for the two-player legfight brawler. The server owns the
//! physics, hit detection and scoring; this crate keeps a websocket open to it,
//! relays raw key transitions, and draws whatever the server last broadcast.
//!
//! ## Architecture Overview
//!
//! Two clocks meet here. Server snapshots arrive whenever the server sends them,
//! while the window redraws at display refresh. Both are serviced from the render
//! thread: socket I/O runs on its own thread and reaches the render thread only
//! through channels, so every handler below runs to completion before the next one
//! starts.
//!
//! ### No prediction
//! Each snapshot is the literal truth. Poses are copied onto the scene unchanged and
//! never interpolated; a newer snapshot simply overwrites the older one.
//!
//! ### Local sparkles
//! Damage points spawn sparkles that fade on the frame clock. They never feed back
//! into the network side.
//!
//! ## Module Organization
//!
//! - `endpoint`: maps the launch host to a server endpoint, rejecting unknown hosts
//! - `config`: reads the launch url (host and `player` parameter)
//! - `network`: the transport session and its in-memory loopback
//! - `join`: the one-shot join handshake
//! - `scene`: snapshot application onto a scene model
//! - `particles`: sparkle lifecycle
//! - `input`: key transition capture and relay
//! - `game`: wires the above together for the frame loop
//! - `rendering`: macroquad drawing of the scene and sparkles
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::config::LaunchConfig;
//! use client::endpoint::resolve_endpoint;
//! use client::game::ClientGame;
//! use client::network::TransportSession;
//!
//! # fn main() -> Result<(), client::error::ClientError> {
//! let config = LaunchConfig::from_page_url("http://localhost:8000/?player=blue")?;
//! let endpoint = resolve_endpoint(&config.host)?;
//! let session = TransportSession::connect(&endpoint)?;
//! let mut game = ClientGame::new(session, config.player);
//!
//! // once per frame:
//! game.pump_network();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod game;
pub mod input;
pub mod join;
pub mod network;
pub mod particles;
pub mod rendering;
pub mod scene;
