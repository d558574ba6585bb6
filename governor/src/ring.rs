//! Ring-of-truth frame rendering into a `0RGB` pixel buffer.

pub const WIDTH: usize = 600;
pub const HEIGHT: usize = 600;
pub const BACKGROUND: u32 = 0x05_05_10;

const CENTER: (f64, f64) = (300.0, 300.0);
const BASE_RADIUS: f64 = 160.0;
const SAMPLES: usize = 1200;
const DEGREES_PER_SAMPLE: f64 = 0.3;

/// Ring radius pulses with entropy.
pub fn radius(entropy: f64) -> f64 {
    BASE_RADIUS + (entropy * 40.0).sin() * 10.0
}

/// Green for low entropy, shading to red as entropy rises.
pub fn ring_color(entropy: f64) -> u32 {
    let red = (entropy * 255.0) as u32;
    let green = ((1.0 - entropy) * 200.0 + 55.0) as u32;
    (red << 16) | (green << 8)
}

/// Clears `buffer` and draws the ring for `entropy`. `buffer` must hold
/// `WIDTH * HEIGHT` pixels.
pub fn render(buffer: &mut [u32], entropy: f64) {
    buffer.fill(BACKGROUND);

    let color = ring_color(entropy);
    let r = radius(entropy);
    let (cx, cy) = CENTER;
    let len = buffer.len();

    for a in 0..SAMPLES {
        let rad = (a as f64 * DEGREES_PER_SAMPLE).to_radians();
        let x = cx + r * rad.cos();
        let y = cy + r * rad.sin();
        if x < 0.0 || y < 0.0 {
            continue;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= WIDTH || y >= HEIGHT {
            continue;
        }

        let idx = y * WIDTH + x;
        buffer[idx] = color;
        // One-pixel glow to the right and below.
        if idx + 1 < len {
            buffer[idx + 1] = color;
        }
        if idx + WIDTH < len {
            buffer[idx + WIDTH] = color;
        }
    }
}
