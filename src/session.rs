//! Interactive session: the per-frame loop and the mode state machine.
//!
//! Each iteration acquires (or reuses) a frame, renders it in the current
//! [`Mode`], XORs the help legend on top, shows it, and reacts to at most
//! one key press.

use std::path::PathBuf;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::camera::{CameraSettings, Frame, Resolution};
use crate::cartoon::{self, Mode, PipelineError};
use crate::config::Config;
use crate::display::{DisplayError, Input, Presenter};
use crate::legend::{Legend, LegendError};
use crate::save::{save_filename, FrameSink};
use crate::source::{FrameSource, SourceError};

/// Title of the display window.
pub const WINDOW_TITLE: &str = "Cartoon Camera";

/// Default wait for a key press per iteration.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(1);

/// A user request decoded from one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Switch the rendering mode
    Select(Mode),
    /// Save the current rendering to disk
    Save,
    /// End the session
    Quit,
}

impl Command {
    /// Transition table lookup. Unmapped keys yield `None`.
    pub fn from_key(key: char) -> Option<Command> {
        match key {
            'n' => Some(Command::Select(Mode::Normal)),
            'b' => Some(Command::Select(Mode::BlackAndWhite)),
            'e' => Some(Command::Select(Mode::Edge)),
            'r' => Some(Command::Select(Mode::ReduceNoise)),
            'o' => Some(Command::Select(Mode::Original)),
            's' => Some(Command::Save),
            'q' => Some(Command::Quit),
            _ => None,
        }
    }

    /// Command for one presenter poll result.
    pub fn from_input(input: Input) -> Option<Command> {
        match input {
            Input::Key(c) => Command::from_key(c),
            Input::Closed => Some(Command::Quit),
        }
    }
}

/// Everything the session needs to know up front.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Still image to cartoonify; `None` selects the live camera
    pub input: Option<PathBuf>,
    pub camera: CameraSettings,
    pub window_title: String,
    pub poll_timeout: Duration,
    pub output_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            input: None,
            camera: CameraSettings::default(),
            window_title: WINDOW_TITLE.to_string(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SessionConfig {
    /// Merge the command-line input path with the config file.
    pub fn from_config(input: Option<PathBuf>, config: &Config) -> Self {
        let defaults = Self::default();
        let resolution = Resolution {
            width: config.camera.width.unwrap_or(defaults.camera.resolution.width),
            height: config.camera.height.unwrap_or(defaults.camera.resolution.height),
        };

        Self {
            input,
            camera: CameraSettings {
                device_index: config.camera.device,
                resolution,
                mirror: config.camera.mirror,
                ..defaults.camera
            },
            window_title: config
                .display
                .window_title
                .clone()
                .unwrap_or(defaults.window_title),
            poll_timeout: config
                .display
                .poll_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.poll_timeout),
            output_dir: config.output.directory.clone().unwrap_or(defaults.output_dir),
        }
    }
}

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No first frame could be obtained; the session never started
    #[error("Cannot start: {0}")]
    AcquisitionUnavailable(#[source] SourceError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Legend(#[from] LegendError),
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// The interactive loop and its state.
pub struct Session<S: FrameSource, P: Presenter, K: FrameSink> {
    config: SessionConfig,
    source: S,
    presenter: P,
    sink: K,
    mode: Mode,
    frame: Frame,
    legend: Legend,
    running: bool,
    read_failures: u32,
    rng: StdRng,
}

impl<S: FrameSource, P: Presenter, K: FrameSink> Session<S, P, K> {
    /// Acquire the first frame and build the legend.
    ///
    /// Failing to get a first frame is fatal: the source is released, the
    /// presenter closed, and `SessionError::AcquisitionUnavailable` returned.
    pub fn start(
        config: SessionConfig,
        mut source: S,
        mut presenter: P,
        sink: K,
    ) -> Result<Self, SessionError> {
        let frame = match source.next_frame() {
            Ok(frame) => frame,
            Err(e) => {
                source.release();
                presenter.close();
                return Err(SessionError::AcquisitionUnavailable(e));
            }
        };

        let legend = Legend::for_frame(&frame);
        log::debug!("Legend rendered at {}x{}", frame.width, frame.height);

        Ok(Self {
            config,
            source,
            presenter,
            sink,
            mode: Mode::default(),
            frame,
            legend,
            running: true,
            read_failures: 0,
            rng: StdRng::from_entropy(),
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The frame the next render will use.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Run one iteration. Returns whether the loop should continue.
    pub fn step(&mut self) -> Result<bool, SessionError> {
        self.refresh_frame();

        let output = cartoon::transform(&self.frame, self.mode)?;
        let shown = self.legend.composite(&output)?;
        self.presenter.show(&self.config.window_title, &shown)?;

        if let Some(command) = self
            .presenter
            .poll_key(self.config.poll_timeout)
            .and_then(Command::from_input)
        {
            self.apply(command);
        }
        Ok(self.running)
    }

    /// Apply one command to the session state.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Select(mode) => {
                if mode != self.mode {
                    log::info!("Mode: {}", mode);
                }
                self.mode = mode;
            }
            Command::Save => self.save_current(),
            Command::Quit => {
                log::info!("Quit requested");
                self.running = false;
            }
        }
    }

    /// Loop until the user quits or a fatal error occurs, then release the
    /// source and close the presenter.
    pub fn run(mut self) -> Result<(), SessionError> {
        log::info!("Applying cartoon effect");
        let result = loop {
            match self.step() {
                Ok(true) => continue,
                Ok(false) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.shutdown();
        result
    }

    /// Release the source and close the presenter.
    pub fn shutdown(&mut self) {
        self.running = false;
        self.presenter.close();
        self.source.release();
    }

    /// Pull the next frame, keeping the previous one if the read fails.
    fn refresh_frame(&mut self) {
        match self.source.next_frame() {
            Ok(frame) => {
                if self.read_failures > 0 {
                    log::info!("Frame source recovered after {} failed reads", self.read_failures);
                }
                self.read_failures = 0;
                self.frame = frame;
            }
            Err(e) => {
                if self.read_failures == 0 {
                    log::warn!("{}; keeping previous frame", e);
                }
                self.read_failures += 1;
            }
        }
    }

    /// Render the current frame in the current mode and hand it to the sink.
    /// Failures are reported and the session carries on.
    fn save_current(&mut self) {
        let name = save_filename(self.mode, &mut self.rng);
        let rendered = match cartoon::transform(&self.frame, self.mode) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::error!("Cannot save {}: {}", name, e);
                return;
            }
        };
        match self.sink.write_image(&name, &rendered) {
            Ok(path) => log::info!("Saved {}", path.display()),
            Err(e) => log::error!("{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_key_table() {
        assert_eq!(Command::from_key('n'), Some(Command::Select(Mode::Normal)));
        assert_eq!(Command::from_key('b'), Some(Command::Select(Mode::BlackAndWhite)));
        assert_eq!(Command::from_key('e'), Some(Command::Select(Mode::Edge)));
        assert_eq!(Command::from_key('r'), Some(Command::Select(Mode::ReduceNoise)));
        assert_eq!(Command::from_key('o'), Some(Command::Select(Mode::Original)));
        assert_eq!(Command::from_key('s'), Some(Command::Save));
        assert_eq!(Command::from_key('q'), Some(Command::Quit));
    }

    #[test]
    fn test_from_key_unmapped() {
        for c in ['x', 'N', 'Q', ' ', '1'] {
            assert_eq!(Command::from_key(c), None, "{:?}", c);
        }
    }

    #[test]
    fn test_closed_window_quits() {
        assert_eq!(Command::from_input(Input::Closed), Some(Command::Quit));
        assert_eq!(Command::from_input(Input::Key('z')), None);
    }

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::from_config(None, &Config::default());
        assert!(config.input.is_none());
        assert_eq!(config.camera.device_index, 0);
        assert_eq!(config.camera.resolution, Resolution::VGA);
        assert!(!config.camera.mirror);
        assert_eq!(config.window_title, WINDOW_TITLE);
        assert_eq!(config.poll_timeout, DEFAULT_POLL_TIMEOUT);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_session_config_overrides() {
        let mut file_config = Config::default();
        file_config.camera.device = 1;
        file_config.camera.width = Some(320);
        file_config.display.poll_timeout_ms = Some(10);
        file_config.output.directory = Some(PathBuf::from("shots"));

        let config = SessionConfig::from_config(Some(PathBuf::from("cat.jpg")), &file_config);
        assert_eq!(config.input, Some(PathBuf::from("cat.jpg")));
        assert_eq!(config.camera.device_index, 1);
        assert_eq!(config.camera.resolution.width, 320);
        assert_eq!(config.camera.resolution.height, 480);
        assert_eq!(config.poll_timeout, Duration::from_millis(10));
        assert_eq!(config.output_dir, PathBuf::from("shots"));
    }
}
