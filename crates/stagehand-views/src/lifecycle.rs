//! The show/close state machine every view runs.
//!
//! ```text
//! Idle --show--> Showing --intro done--> Active --close--> Closing --close done--> Closed
//!                   |                                          ^
//!                   +------ close (queued until intro done) ---+
//! ```
//!
//! At most one transition is in flight per view. Requests that can't be
//! honoured are rejected: their listener is notified right away with
//! `interrupted = true` and the transition in flight is left alone.

use std::mem;

use crate::error::ViewError;
use crate::transition::{Completion, TransitionKind};
use crate::view::{Listener, View, ViewEvent, ViewState};

/// What happened to a show or close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Finished synchronously; listeners have been notified.
    Completed,
    /// A transition is running; listeners fire when it completes.
    Started,
    /// Will start once the transition in flight completes.
    Queued,
    /// Not honoured; the listener was notified as interrupted.
    Rejected,
}

impl RequestOutcome {
    pub fn is_rejected(self) -> bool {
        self == RequestOutcome::Rejected
    }
}

/// Lifecycle operations, available on every [`View`].
pub trait ViewLifecycle {
    /// Show the view. Only valid from [`ViewState::Idle`].
    fn show(&mut self) -> RequestOutcome;

    /// [`show`](Self::show), notifying `listener` once the intro finishes.
    fn show_with(&mut self, listener: impl FnOnce(ViewEvent) + 'static) -> RequestOutcome;

    /// Close the view.
    ///
    /// A close during the intro is queued and starts once the intro is done.
    fn close(&mut self) -> RequestOutcome;

    /// [`close`](Self::close), notifying `listener` once closed.
    fn close_with(&mut self, listener: impl FnOnce(ViewEvent) + 'static) -> RequestOutcome;

    /// Advance the transition in flight, then run the view's update hook.
    fn update(&mut self, dt: f32);

    fn register_on_finish_showing(&mut self, listener: impl FnOnce(ViewEvent) + 'static);

    fn register_on_finish_closing(&mut self, listener: impl FnOnce(ViewEvent) + 'static);

    /// Drop every pending listener and any queued close.
    fn clear_listeners(&mut self);
}

impl<V: View + ?Sized> ViewLifecycle for V {
    fn show(&mut self) -> RequestOutcome {
        request_show(self, None)
    }

    fn show_with(&mut self, listener: impl FnOnce(ViewEvent) + 'static) -> RequestOutcome {
        request_show(self, Some(Box::new(listener)))
    }

    fn close(&mut self) -> RequestOutcome {
        request_close(self, None)
    }

    fn close_with(&mut self, listener: impl FnOnce(ViewEvent) + 'static) -> RequestOutcome {
        request_close(self, Some(Box::new(listener)))
    }

    fn update(&mut self, dt: f32) {
        if let Some(kind) = self.core().in_flight {
            let completion = self
                .core_mut()
                .transition
                .as_mut()
                .and_then(|t| t.advance(dt));
            if let Some(completion) = completion {
                finish(self, kind, completion);
            }
        }
        self.on_update(dt);
    }

    fn register_on_finish_showing(&mut self, listener: impl FnOnce(ViewEvent) + 'static) {
        self.core_mut().on_show.push(Box::new(listener));
    }

    fn register_on_finish_closing(&mut self, listener: impl FnOnce(ViewEvent) + 'static) {
        self.core_mut().on_close.push(Box::new(listener));
    }

    fn clear_listeners(&mut self) {
        self.core_mut().clear_listeners();
    }
}

fn request_show<V: View + ?Sized>(view: &mut V, listener: Option<Listener>) -> RequestOutcome {
    if view.core().state != ViewState::Idle {
        return reject(view, TransitionKind::Intro, listener);
    }

    let core = view.core_mut();
    core.set_active(true);
    core.state = ViewState::Showing;
    core.request_listener = listener;
    tracing::debug!("Showing {}", core.id);

    view.on_start_showing();
    begin(view, TransitionKind::Intro)
}

fn request_close<V: View + ?Sized>(view: &mut V, listener: Option<Listener>) -> RequestOutcome {
    let state = view.core().state;
    let queued = view.core().queued_close;
    match state {
        ViewState::Closing | ViewState::Closed => reject(view, TransitionKind::Close, listener),
        ViewState::Showing if queued => reject(view, TransitionKind::Close, listener),
        ViewState::Showing => {
            let core = view.core_mut();
            core.queued_close = true;
            core.queued_listener = listener;
            tracing::debug!("Close of {} queued behind its intro", core.id);
            RequestOutcome::Queued
        }
        ViewState::Idle | ViewState::Active => {
            let core = view.core_mut();
            core.state = ViewState::Closing;
            core.request_listener = listener;
            tracing::debug!("Closing {}", core.id);

            view.on_start_closing();
            begin(view, TransitionKind::Close)
        }
    }
}

fn reject<V: View + ?Sized>(
    view: &mut V,
    kind: TransitionKind,
    listener: Option<Listener>,
) -> RequestOutcome {
    let id = view.core().id;
    let error = ViewError::ReentrantTransition { view: id, kind };
    tracing::debug!("{} (state {:?})", error, view.core().state);

    if let Some(listener) = listener {
        listener(ViewEvent {
            view: id,
            kind,
            interrupted: true,
        });
    }
    RequestOutcome::Rejected
}

/// Start the transition for `kind`, or finish at once when there is none.
fn begin<V: View + ?Sized>(view: &mut V, kind: TransitionKind) -> RequestOutcome {
    let core = view.core_mut();
    core.in_flight = Some(kind);

    let Some(transition) = core.transition.as_mut() else {
        finish(view, kind, Completion::FINISHED);
        return RequestOutcome::Completed;
    };

    if !transition.play(kind) {
        tracing::debug!("{} transition of {} could not play", kind, core.id);
        finish(view, kind, Completion::INTERRUPTED);
        return RequestOutcome::Completed;
    }

    // Zero-length transitions complete without waiting for a tick.
    match transition.advance(0.0) {
        Some(completion) => {
            finish(view, kind, completion);
            RequestOutcome::Completed
        }
        None => RequestOutcome::Started,
    }
}

fn finish<V: View + ?Sized>(view: &mut V, kind: TransitionKind, completion: Completion) {
    let core = view.core_mut();
    core.in_flight = None;
    let event = ViewEvent {
        view: core.id,
        kind,
        interrupted: completion.interrupted,
    };

    match kind {
        TransitionKind::Intro => {
            core.state = ViewState::Active;
            view.on_finish_showing();

            let core = view.core_mut();
            let request = core.request_listener.take();
            let listeners = mem::take(&mut core.on_show);
            notify(request, listeners, event);

            let core = view.core_mut();
            if mem::take(&mut core.queued_close) {
                let listener = core.queued_listener.take();
                request_close(view, listener);
            }
        }
        TransitionKind::Close => {
            core.state = ViewState::Closed;
            view.on_finish_closing();

            let core = view.core_mut();
            let request = core.request_listener.take();
            let mut listeners = mem::take(&mut core.on_close);
            listeners.extend(core.take_close_hook());
            notify(request, listeners, event);

            view.core_mut().set_active(false);
            tracing::debug!("{} closed", event.view);
        }
    }
}

fn notify(request: Option<Listener>, listeners: Vec<Listener>, event: ViewEvent) {
    for listener in request.into_iter().chain(listeners) {
        listener(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::{ClipTransition, Transition};
    use crate::view::ViewCore;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct Panel {
        core: ViewCore,
        hooks: Vec<&'static str>,
        updates: u32,
    }

    impl View for Panel {
        fn core(&self) -> &ViewCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut ViewCore {
            &mut self.core
        }

        fn on_update(&mut self, _dt: f32) {
            self.updates += 1;
        }

        fn on_start_showing(&mut self) {
            self.hooks.push("start_showing");
        }

        fn on_finish_showing(&mut self) {
            self.hooks.push("finish_showing");
        }

        fn on_start_closing(&mut self) {
            self.hooks.push("start_closing");
        }

        fn on_finish_closing(&mut self) {
            self.hooks.push("finish_closing");
        }
    }

    /// A transition whose `play` always fails.
    #[derive(Clone)]
    struct Broken;

    impl Transition for Broken {
        fn play(&mut self, _kind: TransitionKind) -> bool {
            false
        }

        fn advance(&mut self, _dt: f32) -> Option<Completion> {
            None
        }

        fn box_clone(&self) -> Box<dyn Transition> {
            Box::new(self.clone())
        }
    }

    fn events() -> (Rc<RefCell<Vec<ViewEvent>>>, impl Fn() -> Box<dyn FnOnce(ViewEvent)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = {
            let log = log.clone();
            move || -> Box<dyn FnOnce(ViewEvent)> {
                let log = log.clone();
                Box::new(move |e| log.borrow_mut().push(e))
            }
        };
        (log, sink)
    }

    fn timed(intro: f32, close: f32) -> Panel {
        Panel {
            core: ViewCore::with_transition(ClipTransition::timed(intro, close)),
            ..Default::default()
        }
    }

    #[test]
    fn test_show_and_close_without_transition() {
        let mut panel = Panel::default();

        assert_eq!(panel.show(), RequestOutcome::Completed);
        assert_eq!(panel.core().state(), ViewState::Active);
        assert!(panel.core().is_active());

        assert_eq!(panel.close(), RequestOutcome::Completed);
        assert_eq!(panel.core().state(), ViewState::Closed);
        assert!(!panel.core().is_active());
        assert_eq!(
            panel.hooks,
            vec!["start_showing", "finish_showing", "start_closing", "finish_closing"]
        );
    }

    #[test]
    fn test_timed_show_completes_on_update() {
        let mut panel = timed(0.5, 0.5);
        let (log, sink) = events();

        assert_eq!(panel.show_with(sink()), RequestOutcome::Started);
        assert_eq!(panel.core().state(), ViewState::Showing);
        assert_eq!(panel.core().in_flight(), Some(TransitionKind::Intro));

        panel.update(0.3);
        assert!(log.borrow().is_empty());
        panel.update(0.3);

        assert_eq!(panel.core().state(), ViewState::Active);
        assert_eq!(log.borrow().len(), 1);
        assert!(!log.borrow()[0].interrupted);
        assert_eq!(panel.updates, 2);
    }

    #[test]
    fn test_request_listener_runs_before_registered() {
        let mut panel = Panel::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = order.clone();
        panel.register_on_finish_showing(move |_| o.borrow_mut().push("registered"));
        let o = order.clone();
        panel.show_with(move |_| o.borrow_mut().push("request"));

        assert_eq!(*order.borrow(), vec!["request", "registered"]);
    }

    #[test]
    fn test_listeners_are_one_shot() {
        let mut panel = Panel::default();
        let (log, sink) = events();
        panel.register_on_finish_closing(sink());

        panel.close();
        assert_eq!(log.borrow().len(), 1);
        assert!(panel.core().on_close.is_empty());
    }

    #[test]
    fn test_show_twice_is_rejected() {
        let mut panel = timed(1.0, 1.0);
        let (first, first_sink) = events();
        let (second, second_sink) = events();

        assert_eq!(panel.show_with(first_sink()), RequestOutcome::Started);
        assert_eq!(panel.show_with(second_sink()), RequestOutcome::Rejected);
        assert_eq!(
            *second.borrow(),
            vec![ViewEvent {
                view: panel.core().id(),
                kind: TransitionKind::Intro,
                interrupted: true,
            }]
        );
        assert!(first.borrow().is_empty());
        assert_eq!(panel.core().state(), ViewState::Showing);
        assert_eq!(panel.hooks, vec!["start_showing"]);

        // The original request still completes, exactly once.
        panel.update(1.0);
        panel.update(1.0);
        assert_eq!(
            *first.borrow(),
            vec![ViewEvent {
                view: panel.core().id(),
                kind: TransitionKind::Intro,
                interrupted: false,
            }]
        );
        assert_eq!(second.borrow().len(), 1);
        assert_eq!(panel.hooks, vec!["start_showing", "finish_showing"]);
    }

    #[test]
    fn test_clear_listeners_keeps_close_hook() {
        let mut panel = Panel::default();
        let (log, sink) = events();
        let hook = sink();
        panel.core_mut().set_close_hook(hook);
        panel.register_on_finish_closing(sink());

        panel.show();
        panel.clear_listeners();
        panel.close();

        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].kind, TransitionKind::Close);
        assert!(panel.core_mut().take_close_hook().is_none());
    }

    #[test]
    fn test_close_while_closing_is_rejected() {
        let mut panel = timed(0.0, 1.0);
        let (log, sink) = events();

        panel.show();
        assert_eq!(panel.close(), RequestOutcome::Started);
        assert_eq!(panel.close_with(sink()), RequestOutcome::Rejected);
        assert!(log.borrow()[0].interrupted);

        // The in-flight close is unaffected.
        panel.update(1.0);
        assert_eq!(panel.core().state(), ViewState::Closed);
    }

    #[test]
    fn test_show_while_closing_is_rejected() {
        let mut panel = timed(0.0, 1.0);
        panel.show();
        panel.close();
        assert_eq!(panel.show(), RequestOutcome::Rejected);
        assert_eq!(panel.core().state(), ViewState::Closing);
    }

    #[test]
    fn test_close_during_intro_is_queued() {
        let mut panel = timed(0.5, 0.5);
        let (log, sink) = events();

        panel.show();
        assert_eq!(panel.close_with(sink()), RequestOutcome::Queued);
        assert!(panel.core().is_close_queued());
        assert_eq!(panel.close(), RequestOutcome::Rejected);

        panel.update(0.5);
        assert_eq!(panel.core().state(), ViewState::Closing);
        assert!(log.borrow().is_empty());

        panel.update(0.5);
        assert_eq!(panel.core().state(), ViewState::Closed);
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(log.borrow()[0].kind, TransitionKind::Close);
    }

    #[test]
    fn test_zero_duration_transition_is_synchronous() {
        let mut panel = timed(0.0, 0.0);
        assert_eq!(panel.show(), RequestOutcome::Completed);
        assert_eq!(panel.close(), RequestOutcome::Completed);
        assert_eq!(panel.core().state(), ViewState::Closed);
    }

    #[test]
    fn test_unplayable_transition_fails_closed() {
        let mut panel = Panel {
            core: ViewCore::with_transition(Broken),
            ..Default::default()
        };
        let (log, sink) = events();

        assert_eq!(panel.show_with(sink()), RequestOutcome::Completed);
        assert_eq!(panel.core().state(), ViewState::Active);
        assert!(log.borrow()[0].interrupted);
        assert_eq!(panel.core().in_flight(), None);
    }

    #[test]
    fn test_close_from_idle() {
        let mut panel = Panel::default();
        assert_eq!(panel.close(), RequestOutcome::Completed);
        assert_eq!(panel.core().state(), ViewState::Closed);
        assert_eq!(panel.close(), RequestOutcome::Rejected);
    }

    #[test]
    fn test_clear_listeners_drops_queued_close() {
        let mut panel = timed(1.0, 1.0);
        panel.show();
        panel.close();
        panel.clear_listeners();

        panel.update(1.0);
        assert_eq!(panel.core().state(), ViewState::Active);
    }

    #[test]
    fn test_lifecycle_on_trait_object() {
        let mut boxed: Box<dyn View> = Box::new(Panel::default());
        assert_eq!(boxed.show(), RequestOutcome::Completed);
        assert_eq!(boxed.core().state(), ViewState::Active);
    }
}
