//! Synthetic frame source used when no webcam is attached.
//!
//! Renders a moving test card (border, crosshair, scanline, sensor noise)
//! as an uncompressed 24-bit BMP so the stream and captured photos visibly
//! update from frame to frame.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{CameraError, Frame, FrameSource};
use crate::config::CameraConfig;

const BMP_HEADER_LEN: u32 = 54;
const NOISE_SPECKLES: usize = 200;

pub struct PlaceholderCamera {
    width: u32,
    height: u32,
    tick: AtomicU64,
}

impl PlaceholderCamera {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            width: config.frame_width.max(16),
            height: config.frame_height.max(16),
            tick: AtomicU64::new(0),
        }
    }

    fn render(&self, tick: u64) -> Vec<u8> {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut px = vec![235u8; w * h * 3];

        let mut set = |x: usize, y: usize, v: u8| {
            let i = (y * w + x) * 3;
            px[i] = v;
            px[i + 1] = v;
            px[i + 2] = v;
        };

        // Border
        for x in 0..w {
            for y in [0, 1, h - 2, h - 1] {
                set(x, y, 60);
            }
        }
        for y in 0..h {
            for x in [0, 1, w - 2, w - 1] {
                set(x, y, 60);
            }
        }

        // Crosshair diagonals
        let d = w.min(h);
        for i in 0..d {
            let (x, y) = (i * w / d, i * h / d);
            set(x, y, 120);
            set(w - 1 - x, y, 120);
        }

        // Scanline band sweeping down the frame
        let band = (tick as usize * 4) % h;
        for y in band..(band + 6).min(h) {
            for x in 0..w {
                set(x, y, 180);
            }
        }

        // Sensor noise so consecutive frames differ
        for _ in 0..NOISE_SPECKLES {
            let x = (rand::random::<u32>() as usize) % w;
            let y = (rand::random::<u32>() as usize) % h;
            let v = 40 + (rand::random::<u32>() % 160) as u8;
            set(x, y, v);
        }

        px
    }

    /// Encode top-down RGB pixels as a bottom-up 24bpp BMP.
    fn encode_bmp(&self, pixels: &[u8]) -> Vec<u8> {
        let w = self.width;
        let h = self.height;
        let row_bytes = (w * 3).div_ceil(4) * 4;
        let image_size = row_bytes * h;
        let file_size = BMP_HEADER_LEN + image_size;

        let mut out = Vec::with_capacity(file_size as usize);
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&file_size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&BMP_HEADER_LEN.to_le_bytes());
        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&(w as i32).to_le_bytes());
        out.extend_from_slice(&(h as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&24u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&image_size.to_le_bytes());
        out.extend_from_slice(&2835i32.to_le_bytes());
        out.extend_from_slice(&2835i32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        let w = w as usize;
        for y in (0..h as usize).rev() {
            for x in 0..w {
                let i = (y * w + x) * 3;
                out.push(pixels[i + 2]);
                out.push(pixels[i + 1]);
                out.push(pixels[i]);
            }
            for _ in 0..(row_bytes as usize - w * 3) {
                out.push(0);
            }
        }
        out
    }
}

#[async_trait]
impl FrameSource for PlaceholderCamera {
    async fn acquire_frame(&self) -> Result<Frame, CameraError> {
        let tick = self.tick.fetch_add(1, Ordering::Relaxed);
        let pixels = self.render(tick);
        Ok(Frame {
            bytes: self.encode_bmp(&pixels),
            content_type: "image/bmp",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(width: u32, height: u32) -> PlaceholderCamera {
        PlaceholderCamera::new(&CameraConfig {
            frame_width: width,
            frame_height: height,
            ..CameraConfig::default()
        })
    }

    #[tokio::test]
    async fn frame_is_a_well_formed_bmp() {
        let frame = camera(64, 48).acquire_frame().await.unwrap();
        assert_eq!(frame.content_type, "image/bmp");
        assert_eq!(frame.extension(), "bmp");
        assert_eq!(&frame.bytes[0..2], b"BM");
        // 64px * 3 bytes is already 4-byte aligned
        let expected = 54 + 64 * 3 * 48;
        assert_eq!(frame.bytes.len(), expected);
        let file_size = u32::from_le_bytes(frame.bytes[2..6].try_into().unwrap());
        assert_eq!(file_size as usize, expected);
    }

    #[tokio::test]
    async fn rows_are_padded_to_four_bytes() {
        // 30px * 3 = 90 bytes, padded to 92 per row
        let frame = camera(30, 16).acquire_frame().await.unwrap();
        assert_eq!(frame.bytes.len(), 54 + 92 * 16);
    }

    #[tokio::test]
    async fn consecutive_frames_differ() {
        let cam = camera(64, 48);
        let a = cam.acquire_frame().await.unwrap();
        let b = cam.acquire_frame().await.unwrap();
        assert_ne!(a.bytes, b.bytes);
    }
}
