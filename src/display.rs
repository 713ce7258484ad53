//! Presenting frames and reading keys.
//!
//! The session only talks to the [`Presenter`] trait; [`WindowPresenter`]
//! implements it with a native minifb window.

use std::thread;
use std::time::{Duration, Instant};

use minifb::{Key, KeyRepeat, Window, WindowOptions};
use thiserror::Error;

use crate::camera::{Frame, FrameFormat};

/// Errors raised by a presenter.
#[derive(Debug, Error)]
pub enum DisplayError {
    #[error("Failed to open window: {0}")]
    OpenFailed(String),
    #[error("Failed to draw frame: {0}")]
    DrawFailed(String),
}

/// One poll result from the presenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A key with a printable character was pressed
    Key(char),
    /// The user closed the window
    Closed,
}

/// Shows frames and reports user input.
pub trait Presenter {
    /// Display `frame` in the window called `title`.
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), DisplayError>;

    /// Wait at most `timeout` for input. `None` means nothing happened,
    /// which is a normal outcome.
    fn poll_key(&mut self, timeout: Duration) -> Option<Input>;

    /// Close every window. Safe to call more than once.
    fn close(&mut self);
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), DisplayError> {
        (**self).show(title, frame)
    }

    fn poll_key(&mut self, timeout: Duration) -> Option<Input> {
        (**self).poll_key(timeout)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Native window presenter.
///
/// The window is created lazily on the first [`show`](Presenter::show) and
/// recreated if the frame size changes.
#[derive(Default)]
pub struct WindowPresenter {
    window: Option<Window>,
    size: (usize, usize),
    buffer: Vec<u32>,
}

impl WindowPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for WindowPresenter {
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), DisplayError> {
        let size = (frame.width as usize, frame.height as usize);
        if self.window.is_none() || self.size != size {
            let window = Window::new(title, size.0, size.1, WindowOptions::default())
                .map_err(|e| DisplayError::OpenFailed(e.to_string()))?;
            log::debug!("Opened window '{}' at {}x{}", title, size.0, size.1);
            self.window = Some(window);
            self.size = size;
        }

        fill_buffer(frame, &mut self.buffer);
        if let Some(window) = self.window.as_mut() {
            window
                .update_with_buffer(&self.buffer, size.0, size.1)
                .map_err(|e| DisplayError::DrawFailed(e.to_string()))?;
        }
        Ok(())
    }

    fn poll_key(&mut self, timeout: Duration) -> Option<Input> {
        let window = self.window.as_mut()?;
        let deadline = Instant::now() + timeout;

        loop {
            if !window.is_open() {
                return Some(Input::Closed);
            }
            if let Some(c) = window
                .get_keys_pressed(KeyRepeat::No)
                .into_iter()
                .find_map(key_to_char)
            {
                return Some(Input::Key(c));
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(Duration::from_millis(1));
            window.update();
        }
    }

    fn close(&mut self) {
        if self.window.take().is_some() {
            log::debug!("Window closed");
        }
    }
}

/// Pack a frame into minifb's 0RGB pixel buffer.
pub fn fill_buffer(frame: &Frame, buffer: &mut Vec<u32>) {
    buffer.clear();
    buffer.reserve(frame.pixel_count());
    match frame.format {
        FrameFormat::Rgb => buffer.extend(
            frame
                .data
                .chunks_exact(3)
                .map(|p| (p[0] as u32) << 16 | (p[1] as u32) << 8 | p[2] as u32),
        ),
        FrameFormat::Gray => buffer.extend(
            frame
                .data
                .iter()
                .map(|&v| (v as u32) << 16 | (v as u32) << 8 | v as u32),
        ),
    }
}

/// Lowercase character for a letter key.
fn key_to_char(key: Key) -> Option<char> {
    const LETTERS: [(Key, char); 26] = [
        (Key::A, 'a'),
        (Key::B, 'b'),
        (Key::C, 'c'),
        (Key::D, 'd'),
        (Key::E, 'e'),
        (Key::F, 'f'),
        (Key::G, 'g'),
        (Key::H, 'h'),
        (Key::I, 'i'),
        (Key::J, 'j'),
        (Key::K, 'k'),
        (Key::L, 'l'),
        (Key::M, 'm'),
        (Key::N, 'n'),
        (Key::O, 'o'),
        (Key::P, 'p'),
        (Key::Q, 'q'),
        (Key::R, 'r'),
        (Key::S, 's'),
        (Key::T, 't'),
        (Key::U, 'u'),
        (Key::V, 'v'),
        (Key::W, 'w'),
        (Key::X, 'x'),
        (Key::Y, 'y'),
        (Key::Z, 'z'),
    ];
    LETTERS.iter().find(|(k, _)| *k == key).map(|&(_, c)| c)
}
