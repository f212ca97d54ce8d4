//! Frame renderer
//!
//! Rasterizes a round snapshot into a fixed-size RGB frame on the CPU.
//! Rendering is a pure function of the snapshot.

pub mod font;
pub mod raster;

use std::collections::HashMap;

use image::{Rgb, RgbImage, RgbaImage};

use crate::assets::FlagSprite;
use crate::config::Config;
use crate::sim::{Arena, EntityStore};

/// Winner banner glyph scale
const BANNER_SCALE: u32 = 3;

pub struct Renderer {
    width: u32,
    height: u32,
    arena: Arena,
    token_size: u32,
    bg_color: Rgb<u8>,
    arena_color: Rgb<u8>,
    arena_line_width: u32,
    banner_color: Rgb<u8>,
    /// Sprites keyed by flag label
    sprites: HashMap<String, RgbaImage>,
}

impl Renderer {
    pub fn new(config: &Config, sprites: impl IntoIterator<Item = FlagSprite>) -> Self {
        Self {
            width: config.width,
            height: config.height,
            arena: Arena::from_config(config),
            token_size: config.token_size,
            bg_color: Rgb(config.bg_color),
            arena_color: Rgb(config.arena_color),
            arena_line_width: config.arena_line_width,
            banner_color: Rgb(config.banner_color),
            sprites: sprites.into_iter().map(|s| (s.name, s.image)).collect(),
        }
    }

    /// Background, arena outline and every alive flag
    pub fn render_arena(&self, store: &EntityStore) -> RgbImage {
        let mut frame = RgbImage::from_pixel(self.width, self.height, self.bg_color);

        raster::draw_ring(
            &mut frame,
            self.arena.center,
            self.arena.radius,
            self.arena_line_width,
            self.arena_color,
        );

        let half = (self.token_size / 2) as i32;
        for entity in store.iter_alive() {
            // Truncate toward zero like an integer cast of the position
            let left = entity.pos.x as i32 - half;
            let top = entity.pos.y as i32 - half;
            match self.sprites.get(&entity.label) {
                Some(sprite) => raster::blit_rgba(&mut frame, sprite, left, top),
                None => raster::fill_rect(
                    &mut frame,
                    left,
                    top,
                    self.token_size,
                    self.token_size,
                    self.arena_color,
                ),
            }
        }

        frame
    }

    /// Plain background with a centred winner banner
    pub fn render_banner(&self, winner: Option<&str>) -> RgbImage {
        let mut frame = RgbImage::from_pixel(self.width, self.height, self.bg_color);
        let text = banner_text(winner);

        let text_w = font::text_width(&text, BANNER_SCALE) as i32;
        let text_h = (font::GLYPH_HEIGHT * BANNER_SCALE) as i32;
        let left = (self.width as i32 - text_w) / 2;
        let top = (self.height as i32 - text_h) / 2;
        font::draw_text(&mut frame, &text, left, top, BANNER_SCALE, self.banner_color);

        frame
    }
}

/// Banner caption for a round result
pub fn banner_text(winner: Option<&str>) -> String {
    format!("WINNER: {}", winner.unwrap_or("NONE"))
}
