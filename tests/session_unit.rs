//! Unit tests for the session controller, driven by scripted collaborators.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use cartoon_camera::camera::{CameraError, Frame};
use cartoon_camera::cartoon::{transform, Mode};
use cartoon_camera::display::{DisplayError, Input, Presenter};
use cartoon_camera::legend::Legend;
use cartoon_camera::save::{FrameSink, SaveError};
use cartoon_camera::session::{Command, Session, SessionConfig, SessionError};
use cartoon_camera::source::{FrameSource, SourceError};

// ==================== Fakes ====================

/// Hands out scripted frames, then repeats the last successful one.
struct ScriptedSource {
    script: VecDeque<Result<Frame, SourceError>>,
    last: Option<Frame>,
    released: Rc<RefCell<u32>>,
}

impl ScriptedSource {
    fn new(script: Vec<Result<Frame, SourceError>>) -> (Self, Rc<RefCell<u32>>) {
        let released = Rc::new(RefCell::new(0));
        (
            Self {
                script: script.into(),
                last: None,
                released: Rc::clone(&released),
            },
            released,
        )
    }
}

impl FrameSource for ScriptedSource {
    fn next_frame(&mut self) -> Result<Frame, SourceError> {
        match self.script.pop_front() {
            Some(Ok(frame)) => {
                self.last = Some(frame.clone());
                Ok(frame)
            }
            Some(Err(e)) => Err(e),
            None => self.last.clone().ok_or_else(|| read_error("exhausted")),
        }
    }

    fn release(&mut self) {
        *self.released.borrow_mut() += 1;
    }
}

#[derive(Default)]
struct PresenterLog {
    shown: Vec<Frame>,
    titles: Vec<String>,
    closed: u32,
}

/// Replays scripted key presses and records what was shown.
struct ScriptedPresenter {
    keys: VecDeque<Option<Input>>,
    log: Rc<RefCell<PresenterLog>>,
}

impl ScriptedPresenter {
    fn new(keys: Vec<Option<Input>>) -> (Self, Rc<RefCell<PresenterLog>>) {
        let log = Rc::new(RefCell::new(PresenterLog::default()));
        (
            Self {
                keys: keys.into(),
                log: Rc::clone(&log),
            },
            log,
        )
    }
}

impl Presenter for ScriptedPresenter {
    fn show(&mut self, title: &str, frame: &Frame) -> Result<(), DisplayError> {
        let mut log = self.log.borrow_mut();
        log.shown.push(frame.clone());
        log.titles.push(title.to_string());
        Ok(())
    }

    fn poll_key(&mut self, _timeout: Duration) -> Option<Input> {
        // Quit once the script runs out so `run` always terminates
        self.keys.pop_front().unwrap_or(Some(Input::Key('q')))
    }

    fn close(&mut self) {
        self.log.borrow_mut().closed += 1;
    }
}

/// Records saved frames in memory, optionally failing every write.
struct MemorySink {
    saved: Rc<RefCell<Vec<(String, Frame)>>>,
    fail: bool,
}

impl MemorySink {
    fn new(fail: bool) -> (Self, Rc<RefCell<Vec<(String, Frame)>>>) {
        let saved = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                saved: Rc::clone(&saved),
                fail,
            },
            saved,
        )
    }
}

impl FrameSink for MemorySink {
    fn write_image(&mut self, name: &str, frame: &Frame) -> Result<PathBuf, SaveError> {
        if self.fail {
            return Err(SaveError::InvalidFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        self.saved.borrow_mut().push((name.to_string(), frame.clone()));
        Ok(PathBuf::from(name))
    }
}

fn read_error(msg: &str) -> SourceError {
    SourceError::Camera(CameraError::ReadFailed(msg.to_string()))
}

fn test_frame(seed: u8) -> Frame {
    let mut data = Vec::new();
    for y in 0..12u32 {
        for x in 0..16u32 {
            data.extend([
                seed.wrapping_add((x * 13) as u8),
                seed.wrapping_add((y * 21) as u8),
                seed.wrapping_mul(3).wrapping_add((x + y) as u8),
            ]);
        }
    }
    Frame::from_rgb(data, 16, 12).unwrap()
}

fn key(c: char) -> Option<Input> {
    Some(Input::Key(c))
}

type TestSession = Session<ScriptedSource, ScriptedPresenter, MemorySink>;

struct Harness {
    session: TestSession,
    released: Rc<RefCell<u32>>,
    presenter: Rc<RefCell<PresenterLog>>,
    saved: Rc<RefCell<Vec<(String, Frame)>>>,
}

fn harness(frames: Vec<Result<Frame, SourceError>>, keys: Vec<Option<Input>>) -> Harness {
    let (source, released) = ScriptedSource::new(frames);
    let (presenter, presenter_log) = ScriptedPresenter::new(keys);
    let (sink, saved) = MemorySink::new(false);
    let session = Session::start(SessionConfig::default(), source, presenter, sink).unwrap();
    Harness {
        session,
        released,
        presenter: presenter_log,
        saved,
    }
}

// ==================== Startup ====================

#[test]
fn test_initial_mode_is_normal() {
    let h = harness(vec![Ok(test_frame(0))], vec![]);
    assert_eq!(h.session.mode(), Mode::Normal);
    assert!(h.session.is_running());
}

#[test]
fn test_first_frame_failure_is_fatal_and_releases() {
    let (source, released) = ScriptedSource::new(vec![Err(read_error("no camera"))]);
    let (presenter, log) = ScriptedPresenter::new(vec![]);
    let (sink, _) = MemorySink::new(false);

    let result = Session::start(SessionConfig::default(), source, presenter, sink);
    assert!(matches!(result, Err(SessionError::AcquisitionUnavailable(_))));
    assert_eq!(*released.borrow(), 1);
    assert_eq!(log.borrow().closed, 1);
    assert!(log.borrow().shown.is_empty());
}

#[test]
fn test_legend_sized_from_first_frame() {
    let h = harness(vec![Ok(test_frame(0))], vec![]);
    let legend = h.session.legend();
    assert_eq!(legend, &Legend::for_frame(&test_frame(0)));
}

// ==================== Transitions ====================

#[test]
fn test_each_select_key_from_every_mode() {
    let table = [
        ('n', Mode::Normal),
        ('b', Mode::BlackAndWhite),
        ('e', Mode::Edge),
        ('r', Mode::ReduceNoise),
        ('o', Mode::Original),
    ];
    for start in Mode::ALL {
        for (c, expected) in table {
            let mut h = harness(vec![Ok(test_frame(0))], vec![]);
            h.session.apply(Command::Select(start));
            assert_eq!(h.session.mode(), start);

            h.session.apply(Command::from_key(c).unwrap());
            assert_eq!(h.session.mode(), expected, "{:?} --{}--> ", start, c);
            assert!(h.session.is_running());
        }
    }
}

#[test]
fn test_unrecognized_and_absent_input_are_noops() {
    let mut h = harness(
        vec![Ok(test_frame(0))],
        vec![None, key('x'), key('Z'), key(' '), None],
    );
    h.session.apply(Command::Select(Mode::Edge));

    for _ in 0..5 {
        assert!(h.session.step().unwrap());
        assert_eq!(h.session.mode(), Mode::Edge);
        assert!(h.session.is_running());
    }
    assert!(h.saved.borrow().is_empty());
}

#[test]
fn test_step_applies_key_after_showing() {
    let mut h = harness(vec![Ok(test_frame(0))], vec![key('b'), key('e')]);

    assert!(h.session.step().unwrap());
    assert_eq!(h.session.mode(), Mode::BlackAndWhite);
    assert!(h.session.step().unwrap());
    assert_eq!(h.session.mode(), Mode::Edge);

    // First frame was rendered in Normal, second in BlackAndWhite
    let legend = Legend::for_frame(&test_frame(0));
    let log = h.presenter.borrow();
    let expected_first =
        legend.composite(&transform(&test_frame(0), Mode::Normal).unwrap()).unwrap();
    let expected_second = legend
        .composite(&transform(&test_frame(0), Mode::BlackAndWhite).unwrap())
        .unwrap();
    assert_eq!(log.shown[0], expected_first);
    assert_eq!(log.shown[1], expected_second);
    assert!(log.titles.iter().all(|t| t == "Cartoon Camera"));
}

#[test]
fn test_quit_stops_and_releases() {
    let h = harness(vec![Ok(test_frame(0))], vec![None, key('o'), key('q')]);
    let released = Rc::clone(&h.released);
    let presenter = Rc::clone(&h.presenter);

    h.session.run().unwrap();
    assert_eq!(*released.borrow(), 1);
    assert_eq!(presenter.borrow().closed, 1);
    assert_eq!(presenter.borrow().shown.len(), 3);
}

#[test]
fn test_closed_window_quits() {
    let mut h = harness(vec![Ok(test_frame(0))], vec![Some(Input::Closed)]);
    assert!(!h.session.step().unwrap());
    assert!(!h.session.is_running());
}

// ==================== Frames ====================

#[test]
fn test_live_source_advances_each_iteration() {
    let frames = vec![Ok(test_frame(0)), Ok(test_frame(1)), Ok(test_frame(2))];
    let mut h = harness(frames, vec![key('o'), None]);

    // Original mode shows the raw frame with the legend XORed on
    h.session.step().unwrap();
    assert_eq!(h.session.frame(), &test_frame(1));
    h.session.step().unwrap();
    assert_eq!(h.session.frame(), &test_frame(2));

    let legend = Legend::for_frame(&test_frame(0));
    let log = h.presenter.borrow();
    assert_eq!(log.shown[1], legend.composite(&test_frame(2)).unwrap());
}

#[test]
fn test_transient_read_failure_keeps_previous_frame() {
    let frames = vec![
        Ok(test_frame(0)),
        Ok(test_frame(1)),
        Err(read_error("glitch")),
        Err(read_error("glitch")),
        Ok(test_frame(3)),
    ];
    let mut h = harness(frames, vec![None, None, None, None]);

    h.session.step().unwrap();
    assert_eq!(h.session.frame(), &test_frame(1));
    assert!(h.session.step().unwrap());
    assert_eq!(h.session.frame(), &test_frame(1));
    assert!(h.session.step().unwrap());
    assert_eq!(h.session.frame(), &test_frame(1));
    h.session.step().unwrap();
    assert_eq!(h.session.frame(), &test_frame(3));
}

#[test]
fn test_legend_not_recomputed_per_frame() {
    let frames = vec![Ok(test_frame(0)), Ok(test_frame(9)), Ok(test_frame(50))];
    let mut h = harness(frames, vec![None, None]);
    let before = h.session.legend().clone();
    h.session.step().unwrap();
    h.session.step().unwrap();
    assert_eq!(h.session.legend(), &before);
}

// ==================== Save ====================

#[test]
fn test_save_writes_current_mode_output() {
    let mut h = harness(vec![Ok(test_frame(4))], vec![key('r'), key('s')]);
    h.session.step().unwrap();
    h.session.step().unwrap();
    assert_eq!(h.session.mode(), Mode::ReduceNoise);

    let saved = h.saved.borrow();
    assert_eq!(saved.len(), 1);
    let (name, frame) = &saved[0];
    let digits = name
        .strip_prefix("reduceNoise_IMG_")
        .and_then(|r| r.strip_suffix(".jpg"))
        .unwrap();
    assert_eq!(digits.len(), 4);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
    // Saved without the legend
    assert_eq!(frame, &transform(&test_frame(4), Mode::ReduceNoise).unwrap());
}

#[test]
fn test_save_in_original_mode_has_empty_prefix() {
    let mut h = harness(vec![Ok(test_frame(4))], vec![]);
    h.session.apply(Command::Select(Mode::Original));
    h.session.apply(Command::Save);

    let saved = h.saved.borrow();
    let (name, frame) = &saved[0];
    assert!(name.starts_with("_IMG_"), "{}", name);
    assert!(name.ends_with(".jpg"));
    assert_eq!(name.len(), "_IMG_0000.jpg".len());
    assert_eq!(frame, &test_frame(4));
}

#[test]
fn test_save_does_not_change_mode() {
    let mut h = harness(vec![Ok(test_frame(4))], vec![]);
    h.session.apply(Command::Select(Mode::Edge));
    h.session.apply(Command::Save);
    assert_eq!(h.session.mode(), Mode::Edge);
    assert!(h.session.is_running());
}

#[test]
fn test_save_failure_keeps_session_running() {
    let (source, _) = ScriptedSource::new(vec![Ok(test_frame(0))]);
    let (presenter, log) = ScriptedPresenter::new(vec![key('s'), None]);
    let (sink, saved) = MemorySink::new(true);
    let mut session = Session::start(SessionConfig::default(), source, presenter, sink).unwrap();

    assert!(session.step().unwrap());
    assert!(session.step().unwrap());
    assert!(saved.borrow().is_empty());
    assert_eq!(log.borrow().shown.len(), 2);
}
