use std::io::Cursor;

use base64::{engine::general_purpose, Engine as _};
use image::{GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};

/// Largest edge kept after decoding; official artwork ships at 475px.
pub const MAX_ARTWORK_PX: u32 = 240;
/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 2.0;
const KITTY_CHUNK: usize = 4096;
/// Kitty graphics `f=` value for PNG payloads.
const KITTY_FORMAT_PNG: u32 = 100;

/// A PNG ready to be sent through the kitty graphics protocol.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpriteData {
    pub payload: String,
    pub width: u32,
    pub height: u32,
}

/// Decodes downloaded artwork, shrinking it to [`MAX_ARTWORK_PX`] and
/// re-encoding it as base64 PNG.
pub fn decode_artwork(bytes: &[u8]) -> Result<SpriteData, String> {
    let image = image::load_from_memory(bytes).map_err(|err| err.to_string())?;
    let image = if image.width() > MAX_ARTWORK_PX || image.height() > MAX_ARTWORK_PX {
        image.thumbnail(MAX_ARTWORK_PX, MAX_ARTWORK_PX)
    } else {
        image
    };
    let (width, height) = image.dimensions();
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| err.to_string())?;
    Ok(SpriteData {
        payload: general_purpose::STANDARD.encode(&png),
        width,
        height,
    })
}

/// Builds the escape sequence that transmits and places `sprite` over
/// `cols` x `rows` cells at the cursor position.
pub fn kitty_sequence(sprite: &SpriteData, cols: u16, rows: u16) -> Result<String, String> {
    let payload = sprite.payload.as_bytes();
    let total_chunks = payload.len().div_ceil(KITTY_CHUNK);
    let mut sequences = String::new();

    for (index, chunk) in payload.chunks(KITTY_CHUNK).enumerate() {
        let more = u8::from(index + 1 < total_chunks);
        let chunk = std::str::from_utf8(chunk).map_err(|err| err.to_string())?;
        if index == 0 {
            let mut params = format!(
                "f={KITTY_FORMAT_PNG},s={},v={},a=T,t=d",
                sprite.width, sprite.height
            );
            if cols > 0 {
                params.push_str(&format!(",c={cols}"));
            }
            if rows > 0 {
                params.push_str(&format!(",r={rows}"));
            }
            sequences.push_str(&format!("\x1b_G{params},m={more};{chunk}\x1b\\"));
        } else {
            sequences.push_str(&format!("\x1b_Gm={more};{chunk}\x1b\\"));
        }
    }
    Ok(sequences)
}

/// Whether the environment names a terminal that speaks the kitty graphics
/// protocol. `var` reads one environment variable.
pub fn kitty_graphics_supported(var: impl Fn(&str) -> Option<String>) -> bool {
    if var("KITTY_WINDOW_ID").is_some() || var("GHOSTTY_RESOURCES_DIR").is_some() {
        return true;
    }
    let term = var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("kitty") || term.contains("ghostty") {
        return true;
    }
    let program = var("TERM_PROGRAM").unwrap_or_default().to_ascii_lowercase();
    matches!(program.as_str(), "kitty" | "wezterm" | "ghostty")
}

/// Largest cell box inside `max_cols` x `max_rows` that keeps the sprite's
/// aspect ratio.
pub fn fit_cells(sprite: &SpriteData, max_cols: u16, max_rows: u16) -> (u16, u16) {
    if max_cols == 0 || max_rows == 0 || sprite.height == 0 {
        return (max_cols, max_rows);
    }
    let ratio = sprite.width as f32 / sprite.height as f32;
    let cols_for_max_rows = ratio * max_rows as f32 * CELL_ASPECT;
    if cols_for_max_rows <= max_cols as f32 {
        let cols = cols_for_max_rows.max(1.0).round() as u16;
        return (cols.max(1), max_rows);
    }
    let rows = (max_cols as f32 / (ratio * CELL_ASPECT)).max(1.0).round() as u16;
    (max_cols, rows.clamp(1, max_rows))
}
