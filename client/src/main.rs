use clap::Parser;
use client::config::LaunchConfig;
use client::endpoint::resolve_endpoint;
use client::error::ClientError;
use client::game::ClientGame;
use client::input::KeyboardListener;
use client::network::TransportSession;
use client::rendering::{Renderer, ScreenCanvas};
use log::{error, info};
use macroquad::prelude::*;
use shared::{ARENA_HEIGHT, ARENA_WIDTH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page url the client is launched from; its `player` parameter selects blue or red
    #[arg(short = 'u', long, default_value = "http://localhost:8000/")]
    page_url: String,

    /// Window width
    #[arg(short = 'w', long, default_value_t = ARENA_WIDTH as i32)]
    width: i32,

    /// Window height (no short flag to avoid conflict with --help)
    #[arg(long, default_value_t = ARENA_HEIGHT as i32)]
    height: i32,
}

fn window_conf() -> Conf {
    let args = Args::parse();
    Conf {
        window_title: "Legfight".to_string(),
        window_width: args.width,
        window_height: args.height,
        ..Default::default()
    }
}

fn start(page_url: &str) -> Result<ClientGame, ClientError> {
    let config = LaunchConfig::from_page_url(page_url)?;
    let endpoint = resolve_endpoint(&config.host)?;
    let session = TransportSession::connect(&endpoint)?;
    Ok(ClientGame::new(session, config.player))
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let mut renderer = Renderer::new(args.width, args.height);

    info!("Starting client from {}", args.page_url);
    let mut game = match start(&args.page_url) {
        Ok(game) => game,
        Err(e) => {
            error!("Cannot start: {}", e);
            let message = e.to_string();
            loop {
                renderer.render_fatal(&message);
                next_frame().await;
            }
        }
    };

    info!("Controls: Q opens the legs, W closes them");
    let mut keyboard = KeyboardListener::new();

    loop {
        for transition in keyboard.drain() {
            game.handle_key(transition);
        }
        game.pump_network();

        renderer.render(game.scene());
        game.tick_particles(&mut ScreenCanvas);

        next_frame().await;
    }
}
