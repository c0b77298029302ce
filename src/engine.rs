use std::collections::HashSet;

use crate::{
    core::{Canvas, FrameIndex, Fps},
    error::VeneerResult,
    hit::{InteractionArea, InteractionRegistry},
    overlay::Overlay,
    project::Project,
    render::{plan_frame, RenderCtx},
    scene::{FramePlan, PostFx, TextMeasure},
    store::{OverlayPatch, OverlayStore},
    time::Timeline,
    track::{Bounds, Track, TrackStore},
};

/// Host callbacks fired by the engine. All methods default to no-ops so
/// hosts implement only what they care about.
pub trait EngineHooks {
    /// The current frame changed through seek, step or tick.
    fn on_frame_change(&mut self, _frame: FrameIndex) {}

    /// An interactive overlay entered its activation window during a
    /// render.
    fn on_overlay_trigger(&mut self, _overlay: &Overlay) {}

    /// A key press was resolved against the interaction registry. `area`
    /// is the matched prompt on success, `None` on a miss.
    fn on_qte_prompt(&mut self, _success: bool, _area: Option<&InteractionArea>) {}
}

/// Default hook set: everything ignored.
pub struct NoHooks;

impl EngineHooks for NoHooks {}

/// Top-level facade owning the timeline, both stores, the interaction
/// registry and the post-effect chain. Hosts drive it with explicit calls;
/// it owns no event loop and reads no clock of its own.
pub struct Engine {
    timeline: Timeline,
    canvas: Canvas,
    store: OverlayStore,
    tracks: TrackStore,
    registry: InteractionRegistry,
    post: Vec<PostFx>,
    hooks: Box<dyn EngineHooks>,
    // ids active in the previous render, for trigger edge detection
    previously_active: HashSet<String>,
}

impl Engine {
    pub fn new(fps: Fps, canvas: Canvas, total_frames: i64) -> VeneerResult<Self> {
        Ok(Self {
            timeline: Timeline::new(fps, total_frames)?,
            canvas,
            store: OverlayStore::new(),
            tracks: TrackStore::new(),
            registry: InteractionRegistry::new(),
            post: Vec::new(),
            hooks: Box::new(NoHooks),
            previously_active: HashSet::new(),
        })
    }

    pub fn from_project(project: &Project) -> VeneerResult<Self> {
        project.validate()?;
        let fps = project.fps()?;
        let mut engine = Self::new(fps, project.canvas()?, project.total_frames)?;
        engine.store =
            OverlayStore::from_overlays(project.overlays.clone(), FrameIndex(0), fps);
        engine.tracks = TrackStore::from_tracks(project.tracked_objects.clone())?;
        engine.post = project.post.clone();
        Ok(engine)
    }

    /// Export the full state as a project document.
    pub fn to_project(&self) -> Project {
        Project {
            version: crate::project::PROJECT_VERSION,
            fps: self.timeline.fps().as_f64(),
            video_width: self.canvas.width,
            video_height: self.canvas.height,
            total_frames: self.timeline.total_frames(),
            overlays: self.store.list(),
            tracked_objects: self.tracks.list(),
            post: self.post.clone(),
        }
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn EngineHooks>) {
        self.hooks = hooks;
    }

    pub fn set_post(&mut self, post: Vec<PostFx>) {
        self.post = post;
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn registry(&self) -> &InteractionRegistry {
        &self.registry
    }

    // --- overlay CRUD -----------------------------------------------------

    pub fn add_overlay(&mut self, overlay: Overlay) -> String {
        self.store
            .add(overlay, self.timeline.current(), self.timeline.fps())
    }

    pub fn remove_overlay(&mut self, id: &str) -> VeneerResult<Overlay> {
        self.store.remove(id)
    }

    pub fn update_overlay(&mut self, id: &str, patch: OverlayPatch) -> VeneerResult<()> {
        self.store.update(id, patch)
    }

    pub fn get_overlay(&self, id: &str) -> Option<&Overlay> {
        self.store.get(id)
    }

    pub fn list_overlays(&self) -> Vec<Overlay> {
        self.store.list()
    }

    // --- tracked objects --------------------------------------------------

    pub fn create_track(
        &mut self,
        id: Option<String>,
        start: FrameIndex,
        end: FrameIndex,
        initial: Bounds,
    ) -> VeneerResult<String> {
        self.tracks.create(id, start, end, initial)
    }

    pub fn add_track_keyframe(
        &mut self,
        track_id: &str,
        frame: FrameIndex,
        bounds: Bounds,
    ) -> VeneerResult<()> {
        self.tracks.add_keyframe(track_id, frame, bounds)
    }

    pub fn remove_track(&mut self, track_id: &str) -> bool {
        self.tracks.remove(track_id)
    }

    pub fn track_bounds_at(&self, track_id: &str, frame: FrameIndex) -> Option<Bounds> {
        self.tracks.bounds_at(track_id, frame)
    }

    pub fn list_tracks(&self) -> Vec<Track> {
        self.tracks.list()
    }

    // --- playback ---------------------------------------------------------

    pub fn seek(&mut self, frame: FrameIndex) -> FrameIndex {
        let before = self.timeline.current();
        let now = self.timeline.seek(frame);
        if now != before {
            self.hooks.on_frame_change(now);
        }
        now
    }

    pub fn step(&mut self, delta: i64) -> FrameIndex {
        let before = self.timeline.current();
        let now = self.timeline.step(delta);
        if now != before {
            self.hooks.on_frame_change(now);
        }
        now
    }

    /// Playback tick; returns the new frame only when it changed.
    pub fn tick(&mut self, media_secs: f64) -> Option<FrameIndex> {
        let changed = self.timeline.tick(media_secs);
        if let Some(frame) = changed {
            self.hooks.on_frame_change(frame);
        }
        changed
    }

    pub fn play(&mut self) {
        self.timeline.play();
    }

    pub fn pause(&mut self) {
        self.timeline.pause();
    }

    // --- rendering and input ----------------------------------------------

    /// Plan the current frame, refresh the interaction registry from the
    /// plan, and fire trigger hooks for interactive overlays that just
    /// became active.
    pub fn render(&mut self, wall_clock_ms: u64, measure: &dyn TextMeasure) -> FramePlan {
        let ctx = RenderCtx {
            frame: self.timeline.current(),
            wall_clock_ms,
            canvas: self.canvas,
            fps: self.timeline.fps(),
            measure,
        };
        let plan = plan_frame(&self.store, &self.tracks, &ctx, &self.post);
        self.registry.replace(plan.areas.clone());

        let active = self.store.active_at(ctx.frame);
        // store order, so trigger order matches draw order
        for overlay in &active {
            if overlay.interactive && !self.previously_active.contains(&overlay.id) {
                self.hooks.on_overlay_trigger(overlay);
            }
        }
        self.previously_active = active.iter().map(|o| o.id.clone()).collect();
        plan
    }

    /// Resolve a key press against the current registry, notifying the
    /// host of the outcome either way.
    pub fn key_press(&mut self, key: &str) -> Option<InteractionArea> {
        let hit = self.registry.match_key(key).cloned();
        self.hooks.on_qte_prompt(hit.is_some(), hit.as_ref());
        hit
    }

    /// Resolve a pointer press against the current registry.
    pub fn pointer_down(&self, x: f64, y: f64) -> Option<InteractionArea> {
        self.registry.hit_test(x, y).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayKind;
    use crate::scene::HeuristicMeasure;

    fn engine() -> Engine {
        Engine::new(
            Fps::new(30.0).unwrap(),
            Canvas {
                width: 1280,
                height: 720,
            },
            300,
        )
        .unwrap()
    }

    #[test]
    fn add_uses_the_current_frame_for_defaults() {
        let mut e = engine();
        e.seek(FrameIndex(42));
        let id = e.add_overlay(Overlay::new(OverlayKind::Text).with_content("x"));
        let o = e.get_overlay(&id).unwrap();
        assert_eq!(o.frame_start, Some(FrameIndex(42)));
        assert_eq!(o.frame_end, Some(FrameIndex(72)));
    }

    #[test]
    fn render_refreshes_the_registry() {
        let mut e = engine();
        e.add_overlay(
            Overlay::new(OverlayKind::Qte {
                key: "X".to_string(),
                action: Some("dodge".to_string()),
            })
            .with_span(10, 20)
            .at(100.0, 100.0)
            .sized(80.0, 80.0),
        );

        e.seek(FrameIndex(15));
        e.render(0, &HeuristicMeasure);
        assert_eq!(e.registry().len(), 1);
        let hit = e.key_press("x").unwrap();
        assert_eq!(hit.action.as_deref(), Some("dodge"));
        assert!(e.pointer_down(140.0, 140.0).is_some());

        e.seek(FrameIndex(25));
        e.render(0, &HeuristicMeasure);
        assert!(e.registry().is_empty());
        assert!(e.key_press("x").is_none());
    }

    #[test]
    fn project_round_trip_through_the_engine() {
        let mut e = engine();
        e.add_overlay(
            Overlay::new(OverlayKind::Caption)
                .with_content("hi")
                .with_span(0, 30),
        );
        e.create_track(
            None,
            FrameIndex(0),
            FrameIndex(100),
            Bounds::new(1.0, 2.0, 3.0, 4.0),
        )
        .unwrap();

        let project = e.to_project();
        let restored = Engine::from_project(&project).unwrap();
        assert_eq!(restored.to_project(), project);
    }

    mod hooks {
        use super::*;
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Default)]
        struct Log {
            frames: Vec<i64>,
            triggers: Vec<String>,
            prompts: Vec<(bool, Option<String>)>,
        }

        struct Recorder(Rc<RefCell<Log>>);

        impl EngineHooks for Recorder {
            fn on_frame_change(&mut self, frame: FrameIndex) {
                self.0.borrow_mut().frames.push(frame.0);
            }
            fn on_overlay_trigger(&mut self, overlay: &Overlay) {
                self.0.borrow_mut().triggers.push(overlay.id.clone());
            }
            fn on_qte_prompt(&mut self, success: bool, area: Option<&InteractionArea>) {
                self.0
                    .borrow_mut()
                    .prompts
                    .push((success, area.map(|a| a.id.clone())));
            }
        }

        #[test]
        fn hooks_fire_on_change_and_trigger_edges() {
            let log = Rc::new(RefCell::new(Log::default()));
            let mut e = engine();
            e.set_hooks(Box::new(Recorder(log.clone())));

            let qte = e.add_overlay(
                Overlay::new(OverlayKind::Qte {
                    key: "X".to_string(),
                    action: None,
                })
                .with_span(10, 20)
                .at(0.0, 0.0),
            );

            e.seek(FrameIndex(5));
            e.seek(FrameIndex(5)); // unchanged: no second event
            e.render(0, &HeuristicMeasure); // not active yet

            e.seek(FrameIndex(12));
            e.render(0, &HeuristicMeasure); // trigger edge
            e.render(0, &HeuristicMeasure); // still active: no re-trigger

            // key resolution notifies on both hit and miss
            assert!(e.key_press("x").is_some());
            assert!(e.key_press("z").is_none());

            let log = log.borrow();
            assert_eq!(log.frames, vec![5, 12]);
            assert_eq!(log.triggers, vec![qte.clone()]);
            assert_eq!(log.prompts, vec![(true, Some(qte)), (false, None)]);
        }

        #[test]
        fn non_interactive_overlays_never_trigger() {
            let log = Rc::new(RefCell::new(Log::default()));
            let mut e = engine();
            e.set_hooks(Box::new(Recorder(log.clone())));

            let mut quiet = Overlay::new(OverlayKind::Text)
                .with_content("background label")
                .with_span(10, 20);
            quiet.interactive = false;
            e.add_overlay(quiet);

            e.seek(FrameIndex(10));
            e.render(0, &HeuristicMeasure);

            assert!(log.borrow().triggers.is_empty());
        }

        #[test]
        fn triggers_fire_in_store_order() {
            let log = Rc::new(RefCell::new(Log::default()));
            let mut e = engine();
            e.set_hooks(Box::new(Recorder(log.clone())));

            let a = e.add_overlay(
                Overlay::new(OverlayKind::Text)
                    .with_content("a")
                    .with_span(0, 50),
            );
            let b = e.add_overlay(
                Overlay::new(OverlayKind::Text)
                    .with_content("b")
                    .with_span(0, 50),
            );

            e.render(0, &HeuristicMeasure);
            assert_eq!(log.borrow().triggers, vec![a, b]);
        }

        #[test]
        fn tick_dedup_suppresses_frame_events() {
            let log = Rc::new(RefCell::new(Log::default()));
            let mut e = engine();
            e.set_hooks(Box::new(Recorder(log.clone())));

            assert!(e.tick(1.0).is_some());
            assert!(e.tick(1.0).is_none());
            assert!(e.tick(1.01).is_none());
            assert_eq!(log.borrow().frames, vec![30]);
        }
    }
}
