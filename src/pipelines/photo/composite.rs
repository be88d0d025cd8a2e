// SPDX-License-Identifier: MPL-2.0

//! Polaroid card composition
//!
//! Lays a captured still into a fixed-size card: white (optionally textured)
//! background, the photo cover-fitted into a rounded interior region, and the
//! caption centred underneath. Composition is a pure function of the still,
//! the caption, the layout and the texture.

use crate::constants::card;
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

/// Width and height of a glyph in the bitmap font
const GLYPH_CELL: u32 = 8;

/// Blank columns between two glyphs
const GLYPH_GAP: u32 = 1;

/// Advance of a space, in font columns
const SPACE_ADVANCE: u32 = 4;

/// Card geometry in output pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardLayout {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub spacing: u32,
    pub border_radius: u32,
    pub font_size: u32,
}

impl Default for CardLayout {
    fn default() -> Self {
        Self {
            width: card::WIDTH,
            height: card::HEIGHT,
            padding: card::PADDING,
            spacing: card::SPACING,
            border_radius: card::BORDER_RADIUS,
            font_size: card::FONT_SIZE,
        }
    }
}

/// Axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CardLayout {
    /// Interior region the photo fills
    pub fn photo_region(&self) -> Rect {
        let caption_area = self.font_size + self.spacing;
        Rect {
            x: self.padding,
            y: self.padding,
            width: self.width.saturating_sub(self.padding * 2),
            height: self
                .height
                .saturating_sub(self.padding * 2 + caption_area),
        }
    }

    /// Vertical centre of the caption line
    pub fn caption_center_y(&self) -> u32 {
        self.height
            .saturating_sub(self.padding + self.font_size / 2)
    }
}

/// Placement of a source image that covers a target region
///
/// `draw_*` give the scaled image's position relative to the region (it may
/// overhang on one axis); `crop` is the part of the source that stays visible.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoverFit {
    pub draw_x: f64,
    pub draw_y: f64,
    pub draw_width: f64,
    pub draw_height: f64,
    pub crop: Rect,
}

/// Scale `src` so its shorter side (relative to the region) fills the region,
/// centre it, and crop the overflow symmetrically.
pub fn cover_fit(src_width: u32, src_height: u32, region_width: u32, region_height: u32) -> CoverFit {
    let src_w = src_width.max(1) as f64;
    let src_h = src_height.max(1) as f64;
    let region_w = region_width.max(1) as f64;
    let region_h = region_height.max(1) as f64;

    let src_aspect = src_w / src_h;
    let region_aspect = region_w / region_h;

    if src_aspect > region_aspect {
        // Wider: fit height, crop left/right
        let draw_height = region_h;
        let draw_width = region_h * src_aspect;
        let visible = ((region_w * src_h / region_h).round() as u32).clamp(1, src_width.max(1));
        CoverFit {
            draw_x: (region_w - draw_width) / 2.0,
            draw_y: 0.0,
            draw_width,
            draw_height,
            crop: Rect {
                x: (src_width.max(1) - visible) / 2,
                y: 0,
                width: visible,
                height: src_height.max(1),
            },
        }
    } else {
        // Taller (or equal): fit width, crop top/bottom
        let draw_width = region_w;
        let draw_height = region_w / src_aspect;
        let visible = ((region_h * src_w / region_w).round() as u32).clamp(1, src_height.max(1));
        CoverFit {
            draw_x: 0.0,
            draw_y: (region_h - draw_height) / 2.0,
            draw_width,
            draw_height,
            crop: Rect {
                x: 0,
                y: (src_height.max(1) - visible) / 2,
                width: src_width.max(1),
                height: visible,
            },
        }
    }
}

/// Compose the finished card
pub fn compose_card(
    still: &RgbaImage,
    caption: &str,
    layout: &CardLayout,
    texture: Option<&RgbaImage>,
) -> RgbaImage {
    let mut card = RgbaImage::from_pixel(layout.width, layout.height, Rgba(card::BACKGROUND));

    if let Some(texture) = texture {
        blend_texture(&mut card, texture, card::TEXTURE_ALPHA);
    }

    let region = layout.photo_region();
    if region.width > 0 && region.height > 0 && still.width() > 0 && still.height() > 0 {
        draw_photo(&mut card, still, region, layout.border_radius);
    }

    draw_caption(
        &mut card,
        caption,
        layout.width / 2,
        layout.caption_center_y(),
        layout.font_size,
    );

    debug!(
        width = layout.width,
        height = layout.height,
        caption,
        "Card composed"
    );
    card
}

fn blend_texture(card: &mut RgbaImage, texture: &RgbaImage, alpha: f32) {
    let scaled = imageops::resize(texture, card.width(), card.height(), FilterType::Triangle);
    for (dst, src) in card.pixels_mut().zip(scaled.pixels()) {
        let a = alpha * src[3] as f32 / 255.0;
        for c in 0..3 {
            dst[c] = mix(dst[c], src[c], a);
        }
    }
}

fn draw_photo(card: &mut RgbaImage, still: &RgbaImage, region: Rect, radius: u32) {
    let fit = cover_fit(still.width(), still.height(), region.width, region.height);
    let visible = imageops::crop_imm(still, fit.crop.x, fit.crop.y, fit.crop.width, fit.crop.height)
        .to_image();
    let scaled = if visible.dimensions() == (region.width, region.height) {
        visible
    } else {
        imageops::resize(&visible, region.width, region.height, FilterType::Triangle)
    };

    let backing = card::PHOTO_BACKING;
    for (x, y, src) in scaled.enumerate_pixels() {
        if !inside_rounded_rect(x, y, region.width, region.height, radius) {
            continue;
        }
        let a = src[3] as f32 / 255.0;
        let pixel = Rgba([
            mix(backing[0], src[0], a),
            mix(backing[1], src[1], a),
            mix(backing[2], src[2], a),
            0xff,
        ]);
        card.put_pixel(region.x + x, region.y + y, pixel);
    }
}

/// Whether the centre of pixel `(x, y)` lies inside a `width`x`height`
/// rectangle with corners rounded to `radius`
fn inside_rounded_rect(x: u32, y: u32, width: u32, height: u32, radius: u32) -> bool {
    let r = radius.min(width / 2).min(height / 2) as f32;
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;
    let cx = px.clamp(r, width as f32 - r);
    let cy = py.clamp(r, height as f32 - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

fn mix(under: u8, over: u8, alpha: f32) -> u8 {
    (under as f32 * (1.0 - alpha) + over as f32 * alpha).round() as u8
}

/// Glyphs outside the bitmap font are spelled with the nearest ASCII
fn normalize_caption(caption: &str) -> String {
    caption
        .chars()
        .flat_map(|c| match c {
            '\u{2026}' => vec!['.', '.', '.'],
            '\u{2018}' | '\u{2019}' => vec!['\''],
            '\u{201c}' | '\u{201d}' => vec!['"'],
            c => vec![c],
        })
        .collect()
}

fn glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

/// Horizontal extent of a glyph's ink as `(first column, width)`.
///
/// Blank glyphs have no ink and advance by [`SPACE_ADVANCE`].
fn ink_columns(rows: &[u8; 8]) -> Option<(u32, u32)> {
    let bits = rows.iter().fold(0u8, |acc, row| acc | row);
    if bits == 0 {
        return None;
    }
    let first = bits.trailing_zeros();
    let last = 7 - bits.leading_zeros();
    Some((first, last - first + 1))
}

/// Glyphs placed left to right as `(rows, first inked column, x offset in
/// font columns)`, plus the line's advance width in font columns
fn layout_line(text: &str) -> (Vec<([u8; 8], u32, u32)>, u32) {
    let mut placed = Vec::new();
    let mut pen = 0;
    let mut gap = 0;
    for c in text.chars() {
        match glyph(c).and_then(|rows| ink_columns(&rows).map(|ink| (rows, ink))) {
            Some((rows, (first, width))) => {
                pen += gap;
                placed.push((rows, first, pen));
                pen += width;
                gap = GLYPH_GAP;
            }
            None => {
                pen += SPACE_ADVANCE;
                gap = 0;
            }
        }
    }
    (placed, pen)
}

/// Draw `caption` centred on `(center_x, center_y)` at the size given by
/// `font_size`. Whatever falls outside the card is clipped.
fn draw_caption(card: &mut RgbaImage, caption: &str, center_x: u32, center_y: u32, font_size: u32) {
    let text = normalize_caption(caption);
    let (placed, advance) = layout_line(&text);
    if placed.is_empty() {
        return;
    }

    let scale = (font_size / GLYPH_CELL).max(1);
    let line_width = (advance * scale) as i64;
    let left = center_x as i64 - line_width / 2;
    let top = center_y as i64 - (GLYPH_CELL * scale) as i64 / 2;
    let color = Rgba(card::CAPTION_COLOR);

    for (rows, first, offset) in placed {
        let origin_x = left + (offset * scale) as i64 - (first * scale) as i64;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_CELL {
                if bits & (1 << col) == 0 {
                    continue;
                }
                let x0 = origin_x + (col * scale) as i64;
                let y0 = top + (row as u32 * scale) as i64;
                fill_block(card, x0, y0, scale, color);
            }
        }
    }
}

fn fill_block(card: &mut RgbaImage, x0: i64, y0: i64, size: u32, color: Rgba<u8>) {
    let (width, height) = (card.width() as i64, card.height() as i64);
    for y in y0..y0 + size as i64 {
        for x in x0..x0 + size as i64 {
            if x >= 0 && y >= 0 && x < width && y < height {
                card.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
