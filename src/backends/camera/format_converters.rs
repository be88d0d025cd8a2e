// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for raw V4L2 frames
//!
//! Every converter produces tightly packed RGBA, the layout of
//! [`CameraFrame`](super::CameraFrame).

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion. `stride` is the
/// length of a source row in bytes, padding included.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Option<Vec<u8>> {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return Some(Vec::new());
    }
    // Odd widths still end on a whole pixel pair
    let row_bytes = w.div_ceil(2) * 4;
    let stride = (stride as usize).max(row_bytes);
    if data.len() < stride * h.saturating_sub(1) + row_bytes {
        return None;
    }

    let mut rgba = Vec::with_capacity(w * h * 4);
    for row in data.chunks(stride).take(h) {
        let mut remaining = w;
        for chunk in row[..row_bytes].chunks_exact(4) {
            let y0 = chunk[0] as f32;
            let u = chunk[1] as f32 - 128.0;
            let y1 = chunk[2] as f32;
            let v = chunk[3] as f32 - 128.0;

            for y in [y0, y1] {
                if remaining == 0 {
                    break;
                }
                rgba.extend_from_slice(&yuv_to_rgba(y, u, v));
                remaining -= 1;
            }
        }
    }

    Some(rgba)
}

fn yuv_to_rgba(y: f32, u: f32, v: f32) -> [u8; 4] {
    let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
    let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
    let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;
    [r, g, b, 255]
}

/// Convert packed RGB24 to RGBA by adding alpha=255
pub fn rgb_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Option<Vec<u8>> {
    let w = width as usize;
    let h = height as usize;
    if w == 0 || h == 0 {
        return Some(Vec::new());
    }
    let stride = (stride as usize).max(w * 3);
    if data.len() < stride * h.saturating_sub(1) + w * 3 {
        return None;
    }

    let mut rgba = Vec::with_capacity(w * h * 4);
    for row in data.chunks(stride).take(h) {
        for chunk in row[..w * 3].chunks_exact(3) {
            rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
        }
    }
    Some(rgba)
}
