use crate::particles::SparkleCanvas;
use crate::scene::{player_color, SceneModel};
use macroquad::prelude::*;
use shared::{Identity, Limb, Position};

const SPARKLE_STROKE: f32 = 2.0;
const SCORE_FONT_SIZE: f32 = 48.0;
const BANNER_FONT_SIZE: f32 = 24.0;

pub struct Renderer {
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new(width: i32, height: i32) -> Self {
        Renderer {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Draws the fight as the most recent snapshot left it.
    pub fn render(&mut self, scene: &SceneModel) {
        clear_background(Color::from_rgba(26, 26, 26, 255));

        for (player, limb, pose) in scene.poses() {
            self.draw_limb(player, limb, pose);
        }

        self.draw_scores(scene);

        if let Some(message) = scene.announcement() {
            self.draw_announcement(message);
        }

        if let Some(message) = scene.diagnostic() {
            self.draw_banner(message);
        }
    }

    /// Shown instead of the fight when the client cannot start at all.
    pub fn render_fatal(&mut self, message: &str) {
        clear_background(Color::from_rgba(26, 26, 26, 255));
        self.draw_banner(message);
    }

    // Limbs are centred on their pose and rotated by the pose angle, in radians.
    fn draw_limb(&mut self, player: Identity, limb: Limb, pose: Position) {
        let (w, h) = limb.size();
        let params = DrawRectangleParams {
            offset: vec2(0.5, 0.5),
            rotation: pose.angle,
            color: player_color(player),
        };

        draw_rectangle_ex(pose.x, pose.y, w, h, params.clone());
        draw_rectangle_lines_ex(
            pose.x,
            pose.y,
            w,
            h,
            2.0,
            DrawRectangleParams {
                color: WHITE,
                ..params
            },
        );
    }

    fn draw_scores(&mut self, scene: &SceneModel) {
        let y = 20.0 + SCORE_FONT_SIZE;

        let blue = scene.score(Identity::Blue).to_string();
        draw_text(&blue, 40.0, y, SCORE_FONT_SIZE, player_color(Identity::Blue));

        let red = scene.score(Identity::Red).to_string();
        let red_width = measure_text(&red, None, SCORE_FONT_SIZE as u16, 1.0).width;
        draw_text(
            &red,
            self.width - 40.0 - red_width,
            y,
            SCORE_FONT_SIZE,
            player_color(Identity::Red),
        );
    }

    fn draw_announcement(&mut self, message: &str) {
        let dims = measure_text(message, None, BANNER_FONT_SIZE as u16, 1.0);
        let x = ((self.width - dims.width) / 2.0).max(10.0);
        draw_text(message, x, 20.0 + SCORE_FONT_SIZE, BANNER_FONT_SIZE, WHITE);
    }

    fn draw_banner(&mut self, message: &str) {
        let banner_height = 80.0;
        let top = (self.height - banner_height) / 2.0;
        draw_rectangle(
            0.0,
            top,
            self.width,
            banner_height,
            Color::from_rgba(0, 0, 0, 200),
        );

        let dims = measure_text(message, None, BANNER_FONT_SIZE as u16, 1.0);
        let x = ((self.width - dims.width) / 2.0).max(10.0);
        let y = top + (banner_height + dims.height) / 2.0;
        draw_text(message, x, y, BANNER_FONT_SIZE, YELLOW);
    }
}

/// Draws sparkles straight onto the window.
pub struct ScreenCanvas;

impl SparkleCanvas for ScreenCanvas {
    fn stroke_circle(&mut self, x: f32, y: f32, radius: f32, color: Color) {
        draw_circle_lines(x, y, radius, SPARKLE_STROKE, color);
    }
}
