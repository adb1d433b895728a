//! Integration tests for the stage and its built-in plugins.

use std::rc::Rc;
use std::time::Duration;

use stagehand::host::MockHost;
use stagehand::prelude::*;

#[derive(Clone)]
struct Hud {
    core: ViewCore,
}

impl Default for Hud {
    fn default() -> Self {
        Self {
            core: ViewCore::with_transition(ClipTransition::timed(0.05, 0.05)),
        }
    }
}

impl View for Hud {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }
}

#[derive(Clone, Default)]
struct Popup {
    core: ViewCore,
}

impl View for Popup {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }
}

fn library() -> ViewLibrary {
    ViewLibrary::new("hud").with(Hud::default()).with(Popup::default())
}

fn stage_with(mock: &Rc<MockHost>) -> Stage {
    // Added before its dependency on purpose.
    StageBuilder::new()
        .add_plugin(ViewPlugin::new(mock.clone()).with_library(library()))
        .add_plugin(TimePlugin)
        .build()
}

#[test]
fn test_view_plugin_builds_after_time() {
    let mock = Rc::new(MockHost::new());
    let stage = stage_with(&mock);

    assert_eq!(
        stage.plugin_names().collect::<Vec<_>>(),
        vec!["TimePlugin", "ViewPlugin"]
    );
    let views = stage.views().unwrap();
    assert!(views.is_registered::<Hud>());
    assert_eq!(views.loaded_libraries(), ["hud"]);
}

#[test]
fn test_frames_drive_transitions() {
    let mock = Rc::new(MockHost::new());
    let mut stage = stage_with(&mock);

    let hud = stage
        .views_mut()
        .unwrap()
        .get_or_create::<Hud>(Some(ViewPriority::High))
        .unwrap();
    assert_eq!(hud.with(|v| v.show()), Some(RequestOutcome::Started));

    stage.advance(Duration::from_millis(30));
    assert_eq!(hud.with_ref(|v| v.core().state()), Some(ViewState::Showing));

    stage.advance(Duration::from_millis(30));
    assert_eq!(hud.with_ref(|v| v.core().state()), Some(ViewState::Active));
    assert_eq!(stage.get::<Time>().map(Time::frame_count), Some(2));
}

#[test]
fn test_paused_time_freezes_views() {
    let mock = Rc::new(MockHost::new());
    let mut stage = stage_with(&mock);

    let hud = stage
        .views_mut()
        .unwrap()
        .request_view::<Hud>(ViewPriority::Medium)
        .unwrap();
    hud.with(|v| v.show());

    if let Some(time) = stage.get_mut::<Time>() {
        time.pause();
    }
    for _ in 0..5 {
        stage.advance(Duration::from_millis(50));
    }
    assert_eq!(hud.with_ref(|v| v.core().state()), Some(ViewState::Showing));

    if let Some(time) = stage.get_mut::<Time>() {
        time.resume();
    }
    stage.advance(Duration::from_millis(60));
    assert_eq!(hud.with_ref(|v| v.core().state()), Some(ViewState::Active));
}

#[test]
fn test_hud_opens_popups_by_priority() {
    let mock = Rc::new(MockHost::new());
    let mut stage = stage_with(&mock);
    let views = stage.views_mut().unwrap();

    let hud = views.get_or_create::<Hud>(Some(ViewPriority::High)).unwrap();
    let low = views.request_view::<Popup>(ViewPriority::Medium).unwrap();
    let high = views.request_view::<Popup>(ViewPriority::Ultra).unwrap();
    for popup in [&low, &high] {
        popup.with(|v| v.show());
    }
    hud.with(|v| v.show());

    stage.advance(Duration::from_millis(100));

    let node = |h: &ViewHandle<Popup>| h.with_ref(|v| v.core().node()).flatten().unwrap();
    let hud_node = hud.with_ref(|v| v.core().node()).flatten().unwrap();
    assert_eq!(mock.draw_order(), vec![node(&low), hud_node, node(&high)]);
    assert_eq!(mock.children(ViewPriority::Ultra.bucket()), vec![node(&high)]);
}

#[test]
fn test_shutdown_recycles_every_view() {
    let mock = Rc::new(MockHost::new());
    let mut stage = stage_with(&mock);
    let views = stage.views_mut().unwrap();

    let hud = views.request_view::<Hud>(ViewPriority::High).unwrap();
    let popup = views.request_view::<Popup>(ViewPriority::Low).unwrap();
    hud.with(|v| v.show());
    popup.with(|v| v.show());

    stage.shutdown();

    assert!(hud.get().is_none());
    assert!(popup.get().is_none());
    assert_eq!(mock.children(Bucket::Holding).len(), 2);
    assert!(mock.draw_order().is_empty());
}
