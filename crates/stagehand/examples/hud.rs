//! A HUD that opens two popups at different priorities.
//!
//! Run with `RUST_LOG=debug` to see the view lifecycle.

use std::rc::Rc;
use std::time::Duration;

use stagehand::prelude::*;

#[derive(Clone)]
struct GameHud {
    core: ViewCore,
}

impl View for GameHud {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn on_finish_showing(&mut self) {
        tracing::info!("HUD is up");
    }
}

#[derive(Clone)]
struct Inventory {
    core: ViewCore,
}

impl View for Inventory {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }
}

#[derive(Clone)]
struct QuestLog {
    core: ViewCore,
}

impl View for QuestLog {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn on_start_closing(&mut self) {
        tracing::info!("Quest log closing");
    }
}

/// Prints every host call.
#[derive(Default)]
struct PrintHost {
    inner: NullHost,
}

impl PresentationHost for PrintHost {
    fn instantiate(&self, type_name: &'static str) -> NodeId {
        let node = self.inner.instantiate(type_name);
        println!("instantiate {} -> {}", type_name, node);
        node
    }

    fn set_visible(&self, node: NodeId, visible: bool) {
        println!("{} visible = {}", node, visible);
    }

    fn reparent(&self, node: NodeId, bucket: Bucket) {
        println!("{} -> {:?}", node, bucket);
    }
}

fn main() {
    stagehand::core::logging::init();

    let library = ViewLibrary::new("gameplay")
        .with(GameHud {
            core: ViewCore::with_transition(ClipTransition::timed(0.3, 0.2)),
        })
        .with(Inventory {
            core: ViewCore::with_transition(ClipTransition::timed(0.25, 0.25)),
        })
        .with(QuestLog {
            core: ViewCore::new(),
        });

    let mut stage = Stage::builder()
        .add_plugin(TimePlugin)
        .add_plugin(ViewPlugin::new(Rc::new(PrintHost::default())).with_library(library))
        .build();

    let Some(views) = stage.views_mut() else {
        return;
    };
    let hud = match views.get_or_create::<GameHud>(Some(ViewPriority::High)) {
        Ok(hud) => hud,
        Err(e) => {
            tracing::error!("{}", e);
            return;
        }
    };
    hud.with(|v| v.show());

    let inventory = views.request_view::<Inventory>(ViewPriority::Medium);
    let quests = views.request_view::<QuestLog>(ViewPriority::High);
    if let (Ok(inventory), Ok(quests)) = (&inventory, &quests) {
        inventory.with(|v| v.show());
        quests.with(|v| {
            v.show();
            v.close_with(|event| {
                println!("{} closed (interrupted: {})", event.view, event.interrupted)
            });
        });
    }

    for frame in 0..30 {
        stage.advance(Duration::from_millis(16));
        if let Some(views) = stage.views() {
            println!("frame {:2}: draw order {:?}", frame, views.draw_order());
        }
    }

    stage.shutdown();
    println!("HUD handle after shutdown: {:?}", hud.get().map(|_| "live"));
}
