//! Timed view transitions.
//!
//! A [`TransitionRunner`] keeps track of clips started on a [`ClipDriver`] and
//! reports each one's completion exactly once, after the clip's nominal
//! duration has elapsed across ticks. Views don't use the runner directly;
//! they hold a boxed [`Transition`] such as [`ClipTransition`], which plays an
//! intro and a close clip through a runner.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use stagehand_views::transition::{ClipSet, TransitionRunner};
//!
//! let mut clips = ClipSet::new();
//! clips.insert("fade_in", 0.25);
//!
//! let mut runner = TransitionRunner::new(clips);
//! let done = Rc::new(Cell::new(false));
//! let flag = done.clone();
//! runner.start("fade_in", move |c| flag.set(!c.interrupted)).unwrap();
//!
//! runner.tick(0.1);
//! assert!(!done.get());
//! runner.tick(0.15);
//! assert!(done.get());
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use stagehand_core::alloc::HashMap;

/// Direction of a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionKind {
    /// Played while a view is shown.
    Intro,
    /// Played while a view is closed.
    Close,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionKind::Intro => f.write_str("show"),
            TransitionKind::Close => f.write_str("close"),
        }
    }
}

/// How a transition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// `true` when the transition did not play out (skipped, refused or
    /// rejected).
    pub interrupted: bool,
}

impl Completion {
    /// Played to the end.
    pub const FINISHED: Completion = Completion { interrupted: false };
    /// Skipped or refused.
    pub const INTERRUPTED: Completion = Completion { interrupted: true };
}

/// Reasons a transition could not be started.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionError {
    /// The driver does not know the clip, so its duration is unknown.
    UnknownClip {
        /// Name of the clip.
        clip: String,
    },
    /// A different clip is still running on the driver.
    DriverBusy {
        /// Clip that was requested.
        requested: String,
        /// Clip that is running.
        playing: String,
    },
    /// The driver refused to play the clip.
    PlaybackRefused {
        /// Name of the clip.
        clip: String,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionError::UnknownClip { clip } => write!(f, "Unknown clip: {}", clip),
            TransitionError::DriverBusy { requested, playing } => {
                write!(f, "Cannot play '{}' while '{}' is running", requested, playing)
            }
            TransitionError::PlaybackRefused { clip } => {
                write!(f, "Driver refused to play clip: {}", clip)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// The clip-playback primitive transitions are synchronised with.
///
/// Only the nominal duration and a "play now" request are needed; the runner
/// measures elapsed time itself.
pub trait ClipDriver {
    /// Nominal duration of `clip` in seconds, if the driver knows it.
    fn duration(&self, clip: &str) -> Option<f32>;

    /// Make `clip` known to the driver.
    fn add_clip(&mut self, clip: &str, duration: f32);

    /// Start playing `clip`. Returns `false` if the driver can't.
    fn play(&mut self, clip: &str) -> bool;
}

/// A named clip with its nominal duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub name: String,
    /// Duration in seconds.
    pub duration: f32,
}

impl Clip {
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration: duration.max(0.0),
        }
    }
}

/// In-memory [`ClipDriver`]: a table of clip durations.
#[derive(Debug, Clone, Default)]
pub struct ClipSet {
    clips: HashMap<String, f32>,
    playing: Option<String>,
}

impl ClipSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a clip.
    pub fn insert(&mut self, clip: impl Into<String>, duration: f32) {
        self.clips.insert(clip.into(), duration.max(0.0));
    }

    /// The clip most recently played.
    pub fn now_playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

impl ClipDriver for ClipSet {
    fn duration(&self, clip: &str) -> Option<f32> {
        self.clips.get(clip).copied()
    }

    fn add_clip(&mut self, clip: &str, duration: f32) {
        self.insert(clip, duration);
    }

    fn play(&mut self, clip: &str) -> bool {
        if self.clips.contains_key(clip) {
            self.playing = Some(clip.to_string());
            true
        } else {
            false
        }
    }
}

/// Progress of a single transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionState {
    Idle,
    Running,
    Done,
}

type CompletionFn = Box<dyn FnOnce(Completion)>;

/// One started clip.
struct TransitionProcess {
    clip: String,
    duration: f32,
    elapsed: f32,
    state: TransitionState,
    on_complete: Option<CompletionFn>,
}

impl TransitionProcess {
    /// Advance by `dt`; returns `true` once the clip has run its duration.
    fn step(&mut self, dt: f32) -> bool {
        if self.state == TransitionState::Running {
            self.elapsed += dt;
            if self.elapsed >= self.duration {
                self.state = TransitionState::Done;
            }
        }
        self.state == TransitionState::Done
    }
}

/// Drives timed transitions on a clip driver and reports completion once.
pub struct TransitionRunner<D: ClipDriver> {
    driver: D,
    processes: Vec<TransitionProcess>,
}

impl<D: ClipDriver> TransitionRunner<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            processes: Vec::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Start `clip`, calling `on_complete` once it has played out.
    ///
    /// Fails without side effects if the clip is unknown, if a different clip
    /// is still running, or if the driver refuses to play it.
    pub fn start(
        &mut self,
        clip: &str,
        on_complete: impl FnOnce(Completion) + 'static,
    ) -> Result<(), TransitionError> {
        let duration = self
            .driver
            .duration(clip)
            .ok_or_else(|| TransitionError::UnknownClip {
                clip: clip.to_string(),
            })?;

        if let Some(busy) = self.processes.iter().find(|p| p.clip != clip) {
            return Err(TransitionError::DriverBusy {
                requested: clip.to_string(),
                playing: busy.clip.clone(),
            });
        }

        if !self.driver.play(clip) {
            return Err(TransitionError::PlaybackRefused {
                clip: clip.to_string(),
            });
        }

        tracing::trace!("Transition '{}' started ({}s)", clip, duration);
        self.processes.push(TransitionProcess {
            clip: clip.to_string(),
            duration,
            elapsed: 0.0,
            state: TransitionState::Running,
            on_complete: Some(Box::new(on_complete)),
        });
        Ok(())
    }

    /// Register `clip` with the driver if needed, then [`start`](Self::start) it.
    pub fn start_clip(
        &mut self,
        clip: &Clip,
        on_complete: impl FnOnce(Completion) + 'static,
    ) -> Result<(), TransitionError> {
        if self.driver.duration(&clip.name).is_none() {
            self.driver.add_clip(&clip.name, clip.duration);
        }
        self.start(&clip.name, on_complete)
    }

    /// Advance every running transition by `dt` seconds.
    ///
    /// Finished transitions are removed and their callbacks invoked (in start
    /// order) with `interrupted = false`. Returns how many finished.
    pub fn tick(&mut self, dt: f32) -> usize {
        let mut finished = Vec::new();
        self.processes.retain_mut(|process| {
            if process.step(dt) {
                tracing::trace!("Transition '{}' done after {}s", process.clip, process.elapsed);
                finished.push(process.on_complete.take());
                false
            } else {
                true
            }
        });

        let count = finished.len();
        for callback in finished.into_iter().flatten() {
            callback(Completion::FINISHED);
        }
        count
    }

    /// State of the most recent request for `clip`.
    pub fn state(&self, clip: &str) -> TransitionState {
        self.processes
            .iter()
            .rev()
            .find(|p| p.clip == clip)
            .map_or(TransitionState::Idle, |p| p.state)
    }

    /// Number of transitions still running.
    pub fn running_count(&self) -> usize {
        self.processes.len()
    }

    pub fn is_idle(&self) -> bool {
        self.processes.is_empty()
    }
}

/// A view's visual transition, polled by the view lifecycle.
pub trait Transition {
    /// Start the transition for `kind`. Returns `false` if it can't be
    /// played; the lifecycle then finishes immediately as interrupted.
    fn play(&mut self, kind: TransitionKind) -> bool;

    /// Advance by `dt` seconds; returns the completion once the transition
    /// started by the last [`play`](Self::play) has finished.
    fn advance(&mut self, dt: f32) -> Option<Completion>;

    /// Fresh, idle copy used when a template is cloned.
    fn box_clone(&self) -> Box<dyn Transition>;
}

impl Clone for Box<dyn Transition> {
    fn clone(&self) -> Self {
        self.box_clone()
    }
}

/// Plays an intro clip and a close clip on a [`ClipDriver`].
pub struct ClipTransition<D: ClipDriver = ClipSet> {
    intro: Clip,
    close: Clip,
    runner: TransitionRunner<D>,
    completion: Rc<Cell<Option<Completion>>>,
}

impl<D: ClipDriver> ClipTransition<D> {
    /// Create a transition; both clips are registered with `driver` up front.
    pub fn new(mut driver: D, intro: Clip, close: Clip) -> Self {
        driver.add_clip(&intro.name, intro.duration);
        driver.add_clip(&close.name, close.duration);
        Self {
            intro,
            close,
            runner: TransitionRunner::new(driver),
            completion: Rc::new(Cell::new(None)),
        }
    }

    pub fn runner(&self) -> &TransitionRunner<D> {
        &self.runner
    }

    fn clip(&self, kind: TransitionKind) -> &Clip {
        match kind {
            TransitionKind::Intro => &self.intro,
            TransitionKind::Close => &self.close,
        }
    }
}

impl ClipTransition<ClipSet> {
    /// Intro and close clips of the given durations on an in-memory driver.
    pub fn timed(intro_secs: f32, close_secs: f32) -> Self {
        Self::new(
            ClipSet::new(),
            Clip::new("intro", intro_secs),
            Clip::new("close", close_secs),
        )
    }
}

impl<D: ClipDriver + Clone + 'static> Transition for ClipTransition<D> {
    fn play(&mut self, kind: TransitionKind) -> bool {
        let clip = self.clip(kind).clone();
        let slot = Rc::clone(&self.completion);
        slot.set(None);

        match self
            .runner
            .start_clip(&clip, move |completion| slot.set(Some(completion)))
        {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("Skipping {} transition: {}", kind, e);
                false
            }
        }
    }

    fn advance(&mut self, dt: f32) -> Option<Completion> {
        self.runner.tick(dt);
        self.completion.take()
    }

    fn box_clone(&self) -> Box<dyn Transition> {
        Box::new(ClipTransition::new(
            self.runner.driver().clone(),
            self.intro.clone(),
            self.close.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn recorder() -> (Rc<RefCell<Vec<Completion>>>, impl Fn() -> CompletionFn) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let log = log.clone();
            move || -> CompletionFn {
                let log = log.clone();
                Box::new(move |c| log.borrow_mut().push(c))
            }
        };
        (log, make)
    }

    fn runner_with(clips: &[(&str, f32)]) -> TransitionRunner<ClipSet> {
        let mut set = ClipSet::new();
        for (name, duration) in clips {
            set.insert(*name, *duration);
        }
        TransitionRunner::new(set)
    }

    #[test]
    fn test_unknown_clip_is_refused() {
        let mut runner = runner_with(&[]);
        let (log, make) = recorder();

        let result = runner.start("missing", make());
        assert_eq!(
            result,
            Err(TransitionError::UnknownClip {
                clip: "missing".to_string()
            })
        );
        assert!(runner.is_idle());
        runner.tick(1.0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_completion_fires_once() {
        let mut runner = runner_with(&[("fade", 0.5)]);
        let (log, make) = recorder();

        runner.start("fade", make()).unwrap();
        assert_eq!(runner.state("fade"), TransitionState::Running);

        assert_eq!(runner.tick(0.25), 0);
        assert!(log.borrow().is_empty());

        assert_eq!(runner.tick(0.25), 1);
        assert_eq!(*log.borrow(), vec![Completion::FINISHED]);
        assert_eq!(runner.state("fade"), TransitionState::Idle);

        runner.tick(1.0);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_zero_duration_completes_on_zero_tick() {
        let mut runner = runner_with(&[("snap", 0.0)]);
        let (log, make) = recorder();

        runner.start("snap", make()).unwrap();
        assert_eq!(runner.tick(0.0), 1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_busy_with_different_clip() {
        let mut runner = runner_with(&[("intro", 1.0), ("close", 1.0)]);
        let (log, make) = recorder();

        runner.start("intro", make()).unwrap();
        let err = runner.start("close", make()).unwrap_err();
        assert!(matches!(err, TransitionError::DriverBusy { .. }));

        // The same clip can be started again while running.
        runner.start("intro", make()).unwrap();
        assert_eq!(runner.running_count(), 2);

        runner.tick(1.0);
        assert_eq!(log.borrow().len(), 2);
        runner.start("close", make()).unwrap();
    }

    #[test]
    fn test_start_clip_registers_clip() {
        let mut runner = runner_with(&[]);
        let (log, make) = recorder();

        runner.start_clip(&Clip::new("pop", 0.1), make()).unwrap();
        assert_eq!(runner.driver().duration("pop"), Some(0.1));
        assert_eq!(runner.driver().now_playing(), Some("pop"));

        runner.tick(0.1);
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn test_clip_transition_reports_through_slot() {
        let mut transition = ClipTransition::timed(0.2, 0.4);

        assert!(transition.play(TransitionKind::Intro));
        assert_eq!(transition.advance(0.1), None);
        assert_eq!(transition.advance(0.1), Some(Completion::FINISHED));
        assert_eq!(transition.advance(0.1), None);

        assert!(transition.play(TransitionKind::Close));
        assert_eq!(transition.advance(0.3), None);
        assert_eq!(transition.advance(0.1), Some(Completion::FINISHED));
    }

    #[test]
    fn test_clip_transition_refuses_overlap() {
        let mut transition = ClipTransition::timed(1.0, 1.0);
        assert!(transition.play(TransitionKind::Intro));
        assert!(!transition.play(TransitionKind::Close));
    }

    #[test]
    fn test_box_clone_is_idle() {
        let mut transition = ClipTransition::timed(1.0, 1.0);
        transition.play(TransitionKind::Intro);

        let boxed: Box<dyn Transition> = Box::new(transition);
        let mut copy = boxed.clone();
        assert!(copy.play(TransitionKind::Close));
    }
}
