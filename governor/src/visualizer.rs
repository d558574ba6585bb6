//! Ring-of-truth window, available with the `visualizer` feature.

use std::thread::JoinHandle;

use crate::gauge::EntropyGauge;

#[cfg(feature = "visualizer")]
const WINDOW_TITLE: &str = "GOVERNOR — RING OF TRUTH";

/// Opens the ring-of-truth window on its own thread. The window lives until
/// it is closed, Escape is pressed, or the process exits.
#[cfg(feature = "visualizer")]
pub fn spawn(gauge: EntropyGauge) -> Option<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("ring-of-truth".into())
        .spawn(move || {
            if let Err(e) = window_loop(&gauge) {
                tracing::warn!("Visualizer unavailable: {}", e);
            }
        });
    match handle {
        Ok(h) => Some(h),
        Err(e) => {
            tracing::warn!("Failed to start visualizer thread: {}", e);
            None
        }
    }
}

#[cfg(feature = "visualizer")]
fn window_loop(gauge: &EntropyGauge) -> Result<(), minifb::Error> {
    use crate::ring::{self, HEIGHT, WIDTH};
    use minifb::{Key, Scale, Window, WindowOptions};

    let mut window = Window::new(
        WINDOW_TITLE,
        WIDTH,
        HEIGHT,
        WindowOptions {
            scale: Scale::X1,
            ..Default::default()
        },
    )?;
    window.set_target_fps(60);

    let mut buffer = vec![ring::BACKGROUND; WIDTH * HEIGHT];
    while window.is_open() && !window.is_key_down(Key::Escape) {
        ring::render(&mut buffer, gauge.read());
        window.update_with_buffer(&buffer, WIDTH, HEIGHT)?;
    }
    Ok(())
}

#[cfg(not(feature = "visualizer"))]
pub fn spawn(_gauge: EntropyGauge) -> Option<JoinHandle<()>> {
    tracing::warn!("--visualize requested, but governor was built without the `visualizer` feature");
    None
}
