//! Integration tests for the client session against real and in-memory servers
//!
//! These tests validate cross-component behavior: endpoint resolution, the join
//! handshake, snapshot application, sparkle decay and input relay.

use assert_approx_eq::assert_approx_eq;
use client::game::ClientGame;
use client::input::KeyTransition;
use client::network::TransportSession;
use client::particles::SparkleCanvas;
use macroquad::color::Color;
use serde_json::{json, Value};
use shared::{Identity, Limb};

/// Counts strokes instead of drawing them.
#[derive(Default)]
struct CountingCanvas {
    strokes: usize,
}

impl SparkleCanvas for CountingCanvas {
    fn stroke_circle(&mut self, _x: f32, _y: f32, _radius: f32, _color: Color) {
        self.strokes += 1;
    }
}

fn fighter(x: f32, angle: f32) -> Value {
    json!({
        "torso": {"x": x, "y": 300.0, "angle": angle},
        "rleg": {"x": x + 40.0, "y": 520.0, "angle": angle / 2.0},
        "lleg": {"x": x - 40.0, "y": 520.0, "angle": -angle}
    })
}

fn snapshot(blue_x: f32, red_x: f32, hits: usize) -> String {
    let points: Vec<Value> = (0..hits)
        .map(|i| json!({"x": 800.0 + i as f32, "y": 400.0, "player": "red"}))
        .collect();
    json!({
        "blue": fighter(blue_x, 1.25),
        "red": fighter(red_x, -2.5),
        "damagePoints": points,
        "scores": {"blue": 0, "red": hits}
    })
    .to_string()
}

/// END-TO-END TESTS OVER A REAL WEBSOCKET
mod websocket_tests {
    use super::*;
    use futures_util::{SinkExt, StreamExt};
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::{sleep, timeout};
    use tokio_tungstenite::{accept_async, tungstenite::Message};
    use url::Url;

    async fn pump_until(game: &mut ClientGame, done: impl Fn(&ClientGame) -> bool) {
        for _ in 0..300 {
            game.pump_network();
            if done(game) {
                return;
            }
            sleep(Duration::from_millis(10)).await;
        }
        panic!("client did not reach the expected state in time");
    }

    /// Tests the join handshake, a snapshot and a key relay against a local server
    #[tokio::test]
    async fn join_snapshot_and_input_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();

            let join = ws.next().await.unwrap().unwrap().into_text().unwrap();
            ws.send(Message::Text(snapshot(200.0, 1400.0, 2)))
                .await
                .unwrap();
            let key = ws.next().await.unwrap().unwrap().into_text().unwrap();
            (join, key)
        });

        let endpoint = Url::parse(&format!("ws://{}/", addr)).unwrap();
        let session = TransportSession::connect(&endpoint).unwrap();
        let mut game = ClientGame::new(session, Some("blue".to_string()));

        pump_until(&mut game, |g| g.snapshots_applied() == 1).await;
        assert_eq!(game.identity(), Some(Identity::Blue));
        assert_eq!(game.particles().len(), 2);

        let torso = game.scene().pose(Identity::Red, Limb::Torso).unwrap();
        assert_approx_eq!(torso.x, 1400.0, 1e-4);
        assert_approx_eq!(torso.angle, -2.5, 1e-6);

        game.handle_key(KeyTransition::Began("q".to_string()));

        let (join, key) = timeout(Duration::from_secs(3), server)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&join).unwrap(),
            json!({"type": "join", "player": "blue"})
        );
        assert_eq!(
            serde_json::from_str::<Value>(&key).unwrap(),
            json!({"keydown": "q"})
        );
    }

    /// Tests that a refused connection never joins and leaves a diagnostic
    #[tokio::test]
    async fn refused_connection_reports_disconnect() {
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap()
        };

        let endpoint = Url::parse(&format!("ws://{}/", addr)).unwrap();
        let session = TransportSession::connect(&endpoint).unwrap();
        let mut game = ClientGame::new(session, Some("red".to_string()));

        pump_until(&mut game, |g| g.scene().diagnostic().is_some()).await;
        assert_eq!(game.identity(), None);
        assert_eq!(game.snapshots_applied(), 0);
    }
}

/// SESSION FLOW TESTS OVER THE IN-MEMORY LOOPBACK
mod session_tests {
    use super::*;
    use client::error::ClientError;
    use tokio_test::{assert_err, assert_ok};

    /// Tests that exactly one join goes out, and only after ready
    #[test]
    fn join_is_sent_once_after_ready() {
        let (session, mut peer) = TransportSession::loopback();
        let mut game = ClientGame::new(session, Some("blue".to_string()));

        game.pump_network();
        assert!(peer.sent().is_empty());

        peer.open();
        peer.deliver(snapshot(100.0, 200.0, 0));
        game.pump_network();
        peer.deliver(snapshot(110.0, 210.0, 0));
        game.pump_network();

        let sent = peer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            serde_json::from_str::<Value>(&sent[0]).unwrap(),
            json!({"type": "join", "player": "blue"})
        );
    }

    /// Tests that an invalid identity never joins and never relays input
    #[test]
    fn invalid_identity_is_mute() {
        let (session, mut peer) = TransportSession::loopback();
        let mut game = ClientGame::new(session, Some("purple".to_string()));

        peer.open();
        game.pump_network();
        game.handle_key(KeyTransition::Began("ArrowLeft".to_string()));
        game.handle_key(KeyTransition::Ended("ArrowLeft".to_string()));

        assert!(peer.sent().is_empty());
        let diagnostic = game.scene().diagnostic().unwrap();
        assert!(diagnostic.contains("?player=blue"));
    }

    /// Tests that a held key relays every repeat, then the release
    #[test]
    fn held_key_relays_every_transition() {
        let (session, mut peer) = TransportSession::loopback();
        let mut game = ClientGame::new(session, Some("red".to_string()));
        peer.open();
        game.pump_network();
        peer.sent();

        for _ in 0..3 {
            game.handle_key(KeyTransition::Began("ArrowLeft".to_string()));
        }
        game.handle_key(KeyTransition::Ended("ArrowLeft".to_string()));

        let sent: Vec<Value> = peer
            .sent()
            .iter()
            .map(|text| serde_json::from_str(text).unwrap())
            .collect();
        assert_eq!(
            sent,
            vec![
                json!({"keydown": "ArrowLeft"}),
                json!({"keydown": "ArrowLeft"}),
                json!({"keydown": "ArrowLeft"}),
                json!({"keyup": "ArrowLeft"}),
            ]
        );
    }

    /// Tests that sends outside an open connection are a defined error
    #[test]
    fn send_outside_open_connection_is_not_connected() {
        let (mut session, peer) = TransportSession::loopback();
        let join = shared::ClientMessage::join(Identity::Red);

        assert_err!(session.send(&join));
        peer.open();
        session.poll();
        assert_ok!(session.send(&join));
        peer.close("done");
        session.poll();
        assert!(matches!(session.send(&join), Err(ClientError::NotConnected)));
    }
}

/// RENDER AND PARTICLE INTEGRATION TESTS
mod presentation_tests {
    use super::*;

    /// Tests that the newest snapshot fully replaces what the older one showed
    #[test]
    fn newest_snapshot_is_displayed() {
        let (session, peer) = TransportSession::loopback();
        let mut game = ClientGame::new(session, Some("red".to_string()));
        peer.open();

        for x in [100.0, 250.0, 175.0] {
            peer.deliver(snapshot(x, x + 1000.0, 1));
        }
        game.pump_network();

        for limb in Limb::CANONICAL {
            let pose = game.scene().pose(Identity::Blue, limb).unwrap();
            let expected = match limb {
                Limb::Rleg => 215.0,
                Limb::Lleg => 135.0,
                _ => 175.0,
            };
            assert_approx_eq!(pose.x, expected, 1e-4);
        }
        let lleg = game.scene().pose(Identity::Red, Limb::Lleg).unwrap();
        assert_approx_eq!(lleg.angle, 2.5, 1e-6);
        assert_eq!(game.scene().score(Identity::Red), 1);
    }

    /// Tests sparkle decay across snapshots arriving between frames
    #[test]
    fn sparkles_decay_on_the_frame_clock() {
        let (session, peer) = TransportSession::loopback();
        let mut game = ClientGame::new(session, Some("blue".to_string()));
        let mut canvas = CountingCanvas::default();
        peer.open();

        peer.deliver(snapshot(0.0, 0.0, 2));
        game.pump_network();
        for _ in 0..25 {
            game.tick_particles(&mut canvas);
        }

        peer.deliver(snapshot(0.0, 0.0, 1));
        game.pump_network();
        assert_eq!(game.particles().len(), 3);

        for _ in 0..25 {
            game.tick_particles(&mut canvas);
        }
        // The first batch reached 50 ticks and is gone; the second is half way.
        assert_eq!(game.particles().len(), 1);

        for _ in 0..25 {
            game.tick_particles(&mut canvas);
        }
        assert!(game.particles().is_empty());

        // 2 sparkles drawn 49 times each, 1 sparkle drawn 49 times.
        assert_eq!(canvas.strokes, 3 * 49);
    }
}
