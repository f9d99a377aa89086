use foundation::math::{CanvasSize, Vec2, ViewRotation};
use render::{FrameInput, ImageStatus, Overlay, RenderCommand, RenderFrame, TileRenderer};
use scene::picking::pick_marker;
use scene::{IngestRequest, LinkPosition, NavigationLink, SceneSnapshot};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::event::{EditMode, EditorEvent, Effect, PendingLink, Rejection};
use crate::state::{Interaction, SceneEditorState};

/// Applies one event. Never panics on bad input: invalid requests come back
/// as [`Effect::Rejected`] with the state unchanged.
pub fn transition(
    config: &EditorConfig,
    state: SceneEditorState,
    event: EditorEvent,
) -> (SceneEditorState, Vec<Effect>) {
    let mut step = Step {
        config,
        state,
        effects: Vec::new(),
    };
    step.apply(event);
    (step.state, step.effects)
}

struct Step<'a> {
    config: &'a EditorConfig,
    state: SceneEditorState,
    effects: Vec<Effect>,
}

impl Step<'_> {
    fn apply(&mut self, event: EditorEvent) {
        match event {
            EditorEvent::PointerDown { at } => self.pointer_down(at),
            EditorEvent::PointerMove { at } => self.pointer_move(at),
            EditorEvent::PointerUp { .. } => self.end_gesture(),
            EditorEvent::Click { at } => self.click(at),

            EditorEvent::BeginLink => self.begin_link(),
            EditorEvent::ChooseTarget { target } => self.choose_target(target),
            EditorEvent::Cancel => self.cancel(),

            EditorEvent::SetMode { mode } => self.set_mode(mode),
            EditorEvent::SelectAsset { asset } => self.select_asset(asset),
            EditorEvent::Resize { size } => {
                self.state.canvas = CanvasSize::new(size.width, size.height);
                self.redraw();
            }
            EditorEvent::Ingest { request } => self.ingest(request),
            EditorEvent::RemoveAsset { asset } => self.remove_asset(asset),
            EditorEvent::RemoveLink { link } => self.remove_link(link),
            EditorEvent::SetAssetTitle { asset, title } => {
                match self.state.scene.set_asset_title(asset, title) {
                    Ok(()) => self.committed(),
                    Err(err) => self.reject(err.into()),
                }
            }
            EditorEvent::SetAssetDescription { asset, description } => {
                match self.state.scene.set_asset_description(asset, description) {
                    Ok(()) => self.committed(),
                    Err(err) => self.reject(err.into()),
                }
            }
            EditorEvent::SetLinkLabel { link, label } => {
                match self.state.scene.set_link_label(link, label) {
                    Ok(()) => self.committed(),
                    Err(err) => self.reject(err.into()),
                }
            }
            EditorEvent::SetLinkDescription { link, description } => {
                match self.state.scene.set_link_description(link, description) {
                    Ok(()) => self.committed(),
                    Err(err) => self.reject(err.into()),
                }
            }
            EditorEvent::ResetView => self.reset_view(),

            EditorEvent::ImageLoaded { generation } => {
                if self.state.loads.settle(generation).is_some() {
                    self.state.image = ImageStatus::Ready;
                    self.redraw();
                }
            }
            EditorEvent::ImageFailed { generation, reason } => {
                if let Some(ticket) = self.state.loads.settle(generation) {
                    info!(asset = ticket.asset, %reason, "panorama image failed to load");
                    self.state.image = ImageStatus::Failed { reason };
                    self.redraw();
                }
            }
        }
    }

    fn pointer_down(&mut self, at: Vec2) {
        if !matches!(self.state.interaction, Interaction::Idle) {
            return;
        }
        let Some(asset) = self.state.current else {
            return;
        };

        let hit = pick_marker(
            &self.state.scene,
            asset,
            &self.state.projection(),
            at,
            self.config.pick_options(),
        );

        match (self.state.mode, hit) {
            (EditMode::Navigation, Some(hit)) => {
                self.state.selected_link = Some(hit.link);
                self.state.interaction = Interaction::DraggingMarker { link: hit.link };
                self.redraw();
            }
            (EditMode::Navigation, None) => {
                if self.state.selected_link.take().is_some() {
                    self.redraw();
                }
            }
            // Selecting a marker in focus mode swallows the gesture.
            (EditMode::Focus, Some(hit)) => {
                self.state.selected_link = Some(hit.link);
                self.redraw();
            }
            (EditMode::Focus, None) => {
                self.state.interaction = Interaction::DraggingImage {
                    last: at,
                    moved: false,
                };
            }
        }
    }

    fn pointer_move(&mut self, at: Vec2) {
        match self.state.interaction {
            Interaction::DraggingImage { last, moved } => {
                let delta = at - last;
                let k = self.config.drag_degrees_per_px;
                self.state.view = self.state.view.nudged(delta.x * k, delta.y * k);
                self.state.interaction = Interaction::DraggingImage {
                    last: at,
                    moved: moved || delta != Vec2::ZERO,
                };
                self.redraw();
            }
            Interaction::DraggingMarker { link } => {
                let position = self.state.projection().to_spherical(at);
                match self.state.scene.set_link_position(link, position) {
                    Ok(()) => self.redraw(),
                    Err(err) => {
                        self.state.interaction = Interaction::Idle;
                        self.reject(err.into());
                    }
                }
            }
            _ => {}
        }
    }

    fn end_gesture(&mut self) {
        match std::mem::take(&mut self.state.interaction) {
            Interaction::DraggingImage { moved: true, .. } => self.commit_view(),
            Interaction::DraggingImage { moved: false, .. } => {}
            Interaction::DraggingMarker { link } => {
                debug!(link, "marker moved");
                self.committed();
            }
            other => self.state.interaction = other,
        }
    }

    fn click(&mut self, at: Vec2) {
        let Interaction::PlacingMarker { pending } = self.state.interaction else {
            return;
        };

        let hit = pick_marker(
            &self.state.scene,
            pending.source,
            &self.state.projection(),
            at,
            self.config.pick_options(),
        );
        if let Some(hit) = hit {
            self.reject(Rejection::MarkerOccupied { link: hit.link });
            return;
        }

        let position = LinkPosition::from_spherical(self.state.projection().to_spherical(at));
        let label = self
            .state
            .scene
            .asset(pending.target)
            .map(|a| a.title.clone())
            .unwrap_or_default();
        let link = NavigationLink::new(pending.source, pending.target, position).with_label(label);

        match self.state.scene.add_link(link) {
            Ok(index) => {
                info!(
                    link = index,
                    from = pending.source,
                    to = pending.target,
                    "navigation link placed"
                );
                self.state.interaction = Interaction::Idle;
                self.state.selected_link = Some(index);
                self.committed();
            }
            Err(err) => {
                self.state.interaction = Interaction::Idle;
                self.reject(err.into());
            }
        }
    }

    fn begin_link(&mut self) {
        if self.state.interaction.is_dragging() {
            self.reject(Rejection::Busy);
            return;
        }
        let Some(source) = self.state.current else {
            self.reject(Rejection::NoCurrentAsset);
            return;
        };
        if self.state.scene.len() < 2 {
            self.reject(Rejection::NotEnoughAssets);
            return;
        }
        self.state.interaction = Interaction::SelectingTarget { source };
    }

    fn choose_target(&mut self, target: usize) {
        let Interaction::SelectingTarget { source } = self.state.interaction else {
            debug!(target, "target chosen outside link workflow; ignored");
            return;
        };
        if target == source {
            self.reject(Rejection::SelfLink { asset: target });
            return;
        }
        if self.state.scene.asset(target).is_none() {
            self.reject(Rejection::UnknownAsset { index: target });
            return;
        }
        self.state.interaction = Interaction::PlacingMarker {
            pending: PendingLink { source, target },
        };
    }

    fn cancel(&mut self) {
        match self.state.interaction {
            Interaction::SelectingTarget { .. } | Interaction::PlacingMarker { .. } => {
                debug!("link workflow cancelled");
                self.state.interaction = Interaction::Idle;
            }
            Interaction::DraggingImage { .. } | Interaction::DraggingMarker { .. } => {
                self.end_gesture();
            }
            Interaction::Idle => {}
        }
    }

    fn set_mode(&mut self, mode: EditMode) {
        if self.state.interaction.is_dragging() {
            self.reject(Rejection::Busy);
            return;
        }
        if self.state.mode != mode {
            self.state.mode = mode;
            self.state.selected_link = None;
            self.redraw();
        }
    }

    fn select_asset(&mut self, asset: usize) {
        if self.state.interaction.is_dragging() {
            self.reject(Rejection::Busy);
            return;
        }
        if self.state.scene.asset(asset).is_none() {
            self.reject(Rejection::UnknownAsset { index: asset });
            return;
        }
        self.open_asset(Some(asset));
    }

    fn ingest(&mut self, request: IngestRequest) {
        let index = self.state.scene.add_asset(request);
        info!(index, "panorama ingested");
        self.push_snapshot();
        if self.state.current.is_none() {
            self.open_asset(Some(index));
        } else {
            self.redraw();
        }
    }

    fn remove_asset(&mut self, asset: usize) {
        if self.state.interaction.is_dragging() {
            self.reject(Rejection::Busy);
            return;
        }
        if let Err(err) = self.state.scene.remove_asset(asset) {
            self.reject(err.into());
            return;
        }
        info!(asset, remaining = self.state.scene.len(), "panorama removed");

        self.state.interaction = Interaction::Idle;
        self.state.selected_link = None;
        self.state.loads.shift_after_removal(asset);
        self.push_snapshot();

        match self.state.current {
            Some(current) if current == asset => {
                let len = self.state.scene.len();
                let next = if len == 0 { None } else { Some(asset.min(len - 1)) };
                self.open_asset(next);
            }
            Some(current) => {
                if current > asset {
                    self.state.current = Some(current - 1);
                }
                self.redraw();
            }
            None => self.redraw(),
        }
    }

    fn remove_link(&mut self, link: usize) {
        if self.state.interaction.is_dragging() {
            self.reject(Rejection::Busy);
            return;
        }
        match self.state.scene.remove_link(link) {
            Ok(_) => {
                self.state.selected_link = None;
                self.committed();
            }
            Err(err) => self.reject(err.into()),
        }
    }

    fn reset_view(&mut self) {
        if self.state.current.is_none() {
            self.reject(Rejection::NoCurrentAsset);
            return;
        }
        if let Interaction::DraggingImage { .. } = self.state.interaction {
            self.state.interaction = Interaction::Idle;
        }
        self.state.view = ViewRotation::IDENTITY;
        self.commit_view();
    }

    /// Switches the canvas to `asset` (or to nothing) and requests its image.
    fn open_asset(&mut self, asset: Option<usize>) {
        self.state.current = asset;
        self.state.interaction = Interaction::Idle;
        self.state.selected_link = None;

        match asset.and_then(|i| self.state.scene.asset(i).map(|a| (i, a.url.clone()))) {
            Some((index, url)) => {
                self.state.view = self.state.stored_view(index);
                self.state.image = ImageStatus::Loading;
                let ticket = self.state.loads.request(index);
                debug!(asset = index, generation = ticket.generation, "requesting panorama image");
                self.effects.push(Effect::LoadImage {
                    asset: index,
                    url,
                    generation: ticket.generation,
                });
            }
            None => {
                self.state.view = ViewRotation::IDENTITY;
                self.state.image = ImageStatus::Loading;
                self.state.loads.abandon();
            }
        }
        self.redraw();
    }

    fn commit_view(&mut self) {
        let Some(asset) = self.state.current else {
            return;
        };
        let rotation = self.state.view.to_storage();
        match self.state.scene.set_asset_rotation(asset, rotation) {
            Ok(()) => {
                debug!(asset, ?rotation, "initial view committed");
                self.committed();
            }
            Err(err) => self.reject(err.into()),
        }
    }

    fn committed(&mut self) {
        self.push_snapshot();
        self.redraw();
    }

    fn push_snapshot(&mut self) {
        self.effects
            .push(Effect::SceneChanged(self.state.scene.snapshot()));
    }

    fn redraw(&mut self) {
        if !self.effects.contains(&Effect::Redraw) {
            self.effects.push(Effect::Redraw);
        }
    }

    fn reject(&mut self, rejection: Rejection) {
        debug!(%rejection, "event rejected");
        self.effects.push(Effect::Rejected(rejection));
    }
}

/// Owns the editor state for hosts that drive it imperatively.
pub struct InteractionController {
    config: EditorConfig,
    state: SceneEditorState,
    renderer: TileRenderer,
}

impl InteractionController {
    pub fn new(config: EditorConfig) -> Self {
        let renderer = TileRenderer::new(config.style.clone());
        Self {
            config,
            state: SceneEditorState::default(),
            renderer,
        }
    }

    /// Opens a persisted scene on its first asset. The returned effects hold
    /// the first image load.
    pub fn open(config: EditorConfig, snapshot: SceneSnapshot) -> (Self, Vec<Effect>) {
        let mut controller = Self::new(config);
        controller.state = SceneEditorState::from_snapshot(snapshot);
        let effects = if controller.state.scene.is_empty() {
            vec![Effect::Redraw]
        } else {
            controller.dispatch(EditorEvent::SelectAsset { asset: 0 })
        };
        (controller, effects)
    }

    pub fn dispatch(&mut self, event: EditorEvent) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = transition(&self.config, state, event);
        self.state = next;
        effects
    }

    pub fn state(&self) -> &SceneEditorState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn render(&self) -> RenderFrame {
        let Some(asset) = self.state.current else {
            return RenderFrame {
                commands: vec![
                    RenderCommand::Clear {
                        color: self.config.style.background,
                    },
                    RenderCommand::Text {
                        at: self.state.canvas.center(),
                        text: "Add a panorama to start".to_string(),
                        color: self.config.style.text,
                    },
                ],
            };
        };
        self.renderer.collect(FrameInput {
            scene: &self.state.scene,
            asset,
            view: self.state.view,
            canvas: self.state.canvas,
            image: &self.state.image,
            overlay: Overlay {
                selected_link: self.state.selected_link,
                crosshair: self.state.mode == EditMode::Focus,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{InteractionController, transition};
    use crate::config::EditorConfig;
    use crate::event::{EditMode, EditorEvent, Effect, PendingLink, Rejection};
    use crate::state::{Interaction, SceneEditorState};
    use foundation::math::{CanvasSize, StorageRotation, Vec2, ViewRotation};
    use render::{ImageStatus, RenderCommand};
    use scene::{IngestRequest, SceneGraph, SceneSnapshot};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    fn scene(n: usize) -> SceneSnapshot {
        let mut g = SceneGraph::new();
        for i in 0..n {
            g.add_asset(IngestRequest::new(format!("pano-{i}.jpg")));
        }
        g.snapshot()
    }

    fn opened(n: usize) -> InteractionController {
        let (c, _) = InteractionController::open(EditorConfig::default(), scene(n));
        c
    }

    fn scene_changed(effects: &[Effect]) -> Option<&SceneSnapshot> {
        effects.iter().find_map(|e| match e {
            Effect::SceneChanged(s) => Some(s),
            _ => None,
        })
    }

    fn down(x: f64, y: f64) -> EditorEvent {
        EditorEvent::PointerDown { at: Vec2::new(x, y) }
    }

    fn moved(x: f64, y: f64) -> EditorEvent {
        EditorEvent::PointerMove { at: Vec2::new(x, y) }
    }

    fn up(x: f64, y: f64) -> EditorEvent {
        EditorEvent::PointerUp { at: Vec2::new(x, y) }
    }

    #[test]
    fn open_requests_first_image() {
        let (c, effects) = InteractionController::open(EditorConfig::default(), scene(2));
        assert_eq!(c.state().current, Some(0));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::LoadImage { asset: 0, url, .. } if url == "pano-0.jpg"
        )));
        assert_eq!(c.state().image, ImageStatus::Loading);
    }

    #[test]
    fn open_uses_stored_rotation_in_canvas_axes() {
        let mut snap = scene(1);
        snap.assets[0].rotation = StorageRotation::new(-15.0, 120.0, 30.0);
        let (c, _) = InteractionController::open(EditorConfig::default(), snap);
        assert_eq!(c.state().view, ViewRotation::new(30.0, 120.0, 15.0));
    }

    #[test]
    fn focus_drag_pans_and_tilts_then_commits() {
        let mut c = opened(2);
        assert!(c.dispatch(down(100.0, 100.0)).is_empty());
        assert!(matches!(c.state().interaction, Interaction::DraggingImage { .. }));

        let fx = c.dispatch(moved(140.0, 80.0));
        assert_eq!(fx, vec![Effect::Redraw]);
        assert_close(c.state().view.y, 20.0);
        assert_close(c.state().view.x, -10.0);

        let fx = c.dispatch(up(140.0, 80.0));
        let snap = scene_changed(&fx).expect("view committed");
        assert_eq!(snap.assets[0].rotation, StorageRotation::new(0.0, 20.0, -10.0));
        assert_eq!(c.state().interaction, Interaction::Idle);
    }

    #[test]
    fn drag_clamps_tilt_and_wraps_pan() {
        let mut c = opened(1);
        c.dispatch(down(0.0, 0.0));
        c.dispatch(moved(-100.0, 400.0));
        assert_close(c.state().view.y, 310.0);
        assert_close(c.state().view.x, 90.0);
    }

    #[test]
    fn click_without_motion_commits_nothing() {
        let mut c = opened(2);
        c.dispatch(down(10.0, 10.0));
        let fx = c.dispatch(up(10.0, 10.0));
        assert!(scene_changed(&fx).is_none());
    }

    #[test]
    fn focus_mode_marker_hit_selects_without_dragging() {
        let mut c = opened(2);
        let (link, pos) = {
            let (i, l) = c.state().scene.links_from(0).next().expect("auto exit");
            (i, c.state().projection().to_planar(l.position.spherical()))
        };
        let fx = c.dispatch(down(pos.x + 5.0, pos.y));
        assert_eq!(fx, vec![Effect::Redraw]);
        assert_eq!(c.state().selected_link, Some(link));
        assert_eq!(c.state().interaction, Interaction::Idle);

        // The rest of the gesture is inert.
        assert!(c.dispatch(moved(pos.x + 50.0, pos.y)).is_empty());
        assert_eq!(c.state().view, ViewRotation::IDENTITY);
    }

    #[test]
    fn navigation_mode_drags_marker() {
        let mut c = opened(2);
        c.dispatch(EditorEvent::SetMode {
            mode: EditMode::Navigation,
        });
        let (link, pos) = {
            let (i, l) = c.state().scene.links_from(0).next().expect("auto exit");
            (i, c.state().projection().to_planar(l.position.spherical()))
        };
        c.dispatch(down(pos.x, pos.y));
        assert_eq!(c.state().interaction, Interaction::DraggingMarker { link });

        c.dispatch(moved(400.0, 200.0));
        let position = c.state().scene.links()[link].position;
        assert_close(position.phi, 0.0);
        assert_close(position.theta, 0.0);

        let fx = c.dispatch(up(400.0, 200.0));
        assert!(scene_changed(&fx).is_some());
        assert_eq!(c.state().interaction, Interaction::Idle);
    }

    #[test]
    fn link_workflow_places_marker_at_click() {
        let mut c = opened(3);
        c.dispatch(EditorEvent::BeginLink);
        assert_eq!(c.state().interaction, Interaction::SelectingTarget { source: 0 });

        c.dispatch(EditorEvent::ChooseTarget { target: 2 });
        assert_eq!(
            c.state().interaction,
            Interaction::PlacingMarker {
                pending: PendingLink {
                    source: 0,
                    target: 2
                }
            }
        );

        // (600, 100) on 800x400 at identity view -> phi 90, theta -90.
        let fx = c.dispatch(EditorEvent::Click {
            at: Vec2::new(600.0, 100.0),
        });
        let snap = scene_changed(&fx).expect("link committed");
        let placed = snap
            .navigation
            .iter()
            .find(|l| l.from_index == 0 && l.to_index == 2 && !l.auto_generated)
            .expect("placed link");
        assert_close(placed.position.phi, 90.0);
        assert_close(placed.position.theta, -90.0);
        assert_eq!(placed.label, "Panorama 3");
        assert_eq!(c.state().interaction, Interaction::Idle);
    }

    #[test]
    fn placement_on_existing_marker_is_rejected() {
        let mut c = opened(2);
        let pos = {
            let (_, l) = c.state().scene.links_from(0).next().expect("auto exit");
            c.state().projection().to_planar(l.position.spherical())
        };
        c.dispatch(EditorEvent::BeginLink);
        c.dispatch(EditorEvent::ChooseTarget { target: 1 });
        let before = c.state().scene.clone();

        let fx = c.dispatch(EditorEvent::Click { at: pos });
        assert!(matches!(
            fx.as_slice(),
            [Effect::Rejected(Rejection::MarkerOccupied { .. })]
        ));
        assert_eq!(c.state().scene, before);
        assert!(matches!(c.state().interaction, Interaction::PlacingMarker { .. }));
    }

    #[test]
    fn self_target_and_small_scenes_are_rejected() {
        let mut c = opened(1);
        assert_eq!(
            c.dispatch(EditorEvent::BeginLink),
            vec![Effect::Rejected(Rejection::NotEnoughAssets)]
        );
        assert_eq!(c.state().interaction, Interaction::Idle);

        let mut c = opened(2);
        c.dispatch(EditorEvent::BeginLink);
        assert_eq!(
            c.dispatch(EditorEvent::ChooseTarget { target: 0 }),
            vec![Effect::Rejected(Rejection::SelfLink { asset: 0 })]
        );
        assert_eq!(c.state().interaction, Interaction::SelectingTarget { source: 0 });
    }

    #[test]
    fn cancel_discards_pending_link_silently() {
        let mut c = opened(2);
        c.dispatch(EditorEvent::BeginLink);
        c.dispatch(EditorEvent::ChooseTarget { target: 1 });
        let before = c.state().scene.clone();
        assert!(c.dispatch(EditorEvent::Cancel).is_empty());
        assert_eq!(c.state().interaction, Interaction::Idle);
        assert_eq!(c.state().scene, before);
    }

    #[test]
    fn cancel_while_selecting_target_returns_to_idle() {
        let mut c = opened(2);
        c.dispatch(EditorEvent::BeginLink);
        assert_eq!(c.state().interaction, Interaction::SelectingTarget { source: 0 });
        let before = c.state().scene.clone();
        assert!(c.dispatch(EditorEvent::Cancel).is_empty());
        assert_eq!(c.state().interaction, Interaction::Idle);
        assert_eq!(c.state().scene, before);
    }

    #[test]
    fn link_description_edit_is_persisted() {
        let mut c = opened(2);
        let fx = c.dispatch(EditorEvent::SetLinkDescription {
            link: 0,
            description: "Up the stairs".to_string(),
        });
        let snap = scene_changed(&fx).expect("scene changed");
        assert_eq!(snap.navigation[0].description, "Up the stairs");
        assert_eq!(snap.navigation.len(), c.state().scene.snapshot().navigation.len());

        assert_eq!(
            c.dispatch(EditorEvent::SetLinkDescription {
                link: 42,
                description: String::new(),
            }),
            vec![Effect::Rejected(Rejection::UnknownLink { index: 42 })]
        );
    }

    #[test]
    fn stale_image_completion_is_ignored() {
        let (mut c, fx) = InteractionController::open(EditorConfig::default(), scene(2));
        let first = fx
            .iter()
            .find_map(|e| match e {
                Effect::LoadImage { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("first load");
        let fx = c.dispatch(EditorEvent::SelectAsset { asset: 1 });
        let second = fx
            .iter()
            .find_map(|e| match e {
                Effect::LoadImage { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("second load");

        assert!(c.dispatch(EditorEvent::ImageLoaded { generation: first }).is_empty());
        assert_eq!(c.state().image, ImageStatus::Loading);

        assert_eq!(
            c.dispatch(EditorEvent::ImageLoaded { generation: second }),
            vec![Effect::Redraw]
        );
        assert_eq!(c.state().image, ImageStatus::Ready);
    }

    #[test]
    fn ingest_keeps_optional_description() {
        let mut c = InteractionController::new(EditorConfig::default());
        let mut request = IngestRequest::new("atrium.jpg");
        request.description = Some("North entrance".to_string());
        let fx = c.dispatch(EditorEvent::Ingest { request });
        let snap = scene_changed(&fx).expect("scene changed");
        assert_eq!(snap.assets[0].description, "North entrance");
    }

    #[test]
    fn stale_image_failure_is_ignored() {
        let (mut c, fx) = InteractionController::open(EditorConfig::default(), scene(2));
        let first = fx
            .iter()
            .find_map(|e| match e {
                Effect::LoadImage { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("first load");
        c.dispatch(EditorEvent::SelectAsset { asset: 1 });

        assert!(
            c.dispatch(EditorEvent::ImageFailed {
                generation: first,
                reason: "404".to_string(),
            })
            .is_empty()
        );
        assert_eq!(c.state().image, ImageStatus::Loading);
    }

    #[test]
    fn failed_image_shows_placeholder() {
        let (mut c, fx) = InteractionController::open(EditorConfig::default(), scene(1));
        let generation = fx
            .iter()
            .find_map(|e| match e {
                Effect::LoadImage { generation, .. } => Some(*generation),
                _ => None,
            })
            .expect("load");
        c.dispatch(EditorEvent::ImageFailed {
            generation,
            reason: "timeout".to_string(),
        });
        let frame = c.render();
        assert_eq!(frame.image_draws().count(), 0);
        assert!(frame.commands.iter().any(
            |cmd| matches!(cmd, RenderCommand::Text { text, .. } if text.contains("timeout"))
        ));
    }

    #[test]
    fn removing_current_asset_opens_neighbour() {
        let mut c = opened(3);
        c.dispatch(EditorEvent::SelectAsset { asset: 2 });
        let fx = c.dispatch(EditorEvent::RemoveAsset { asset: 2 });
        assert_eq!(c.state().current, Some(1));
        assert!(fx.iter().any(|e| matches!(e, Effect::LoadImage { asset: 1, .. })));
        let snap = scene_changed(&fx).expect("snapshot");
        assert_eq!(snap.assets.len(), 2);
        assert!(snap.navigation.iter().all(|l| l.from_index < 2 && l.to_index < 2));
    }

    #[test]
    fn removing_earlier_asset_keeps_current_asset() {
        let mut c = opened(3);
        c.dispatch(EditorEvent::SelectAsset { asset: 2 });
        let fx = c.dispatch(EditorEvent::RemoveAsset { asset: 0 });
        assert_eq!(c.state().current, Some(1));
        assert_eq!(c.state().scene.assets()[1].url, "pano-2.jpg");
        assert!(!fx.iter().any(|e| matches!(e, Effect::LoadImage { .. })));
    }

    #[test]
    fn removing_last_asset_empties_canvas() {
        let mut c = opened(1);
        c.dispatch(EditorEvent::RemoveAsset { asset: 0 });
        assert_eq!(c.state().current, None);
        assert!(c.render().image_draws().next().is_none());
    }

    #[test]
    fn unknown_indices_are_rejected() {
        let mut c = opened(2);
        assert_eq!(
            c.dispatch(EditorEvent::RemoveLink { link: 99 }),
            vec![Effect::Rejected(Rejection::UnknownLink { index: 99 })]
        );
        assert_eq!(
            c.dispatch(EditorEvent::SelectAsset { asset: 7 }),
            vec![Effect::Rejected(Rejection::UnknownAsset { index: 7 })]
        );
    }

    #[test]
    fn reset_view_commits_zero_rotation() {
        let mut snap = scene(1);
        snap.assets[0].rotation = StorageRotation::new(5.0, 40.0, -3.0);
        let (mut c, _) = InteractionController::open(EditorConfig::default(), snap);
        let fx = c.dispatch(EditorEvent::ResetView);
        let snap = scene_changed(&fx).expect("snapshot");
        assert_eq!(snap.assets[0].rotation.y, 0.0);
        assert_eq!(c.state().view, ViewRotation::IDENTITY);
    }

    #[test]
    fn ingest_into_empty_scene_opens_it() {
        let mut c = InteractionController::new(EditorConfig::default());
        let fx = c.dispatch(EditorEvent::Ingest {
            request: IngestRequest::new("first.jpg"),
        });
        assert_eq!(c.state().current, Some(0));
        assert!(scene_changed(&fx).is_some());
        assert!(fx.iter().any(|e| matches!(e, Effect::LoadImage { asset: 0, .. })));

        let fx = c.dispatch(EditorEvent::Ingest {
            request: IngestRequest::new("second.jpg"),
        });
        let snap = scene_changed(&fx).expect("snapshot");
        assert_eq!(snap.navigation.len(), 2);
        assert_eq!(c.state().current, Some(0));
    }

    #[test]
    fn transition_is_pure_over_state() {
        let cfg = EditorConfig::default();
        let state = SceneEditorState::from_snapshot(scene(2));
        let (a, fa) = transition(&cfg, state.clone(), EditorEvent::SelectAsset { asset: 1 });
        let (b, fb) = transition(&cfg, state, EditorEvent::SelectAsset { asset: 1 });
        assert_eq!(a, b);
        assert_eq!(fa, fb);
    }

    #[test]
    fn resize_clamps_canvas() {
        let mut c = opened(1);
        c.dispatch(EditorEvent::Resize {
            size: CanvasSize {
                width: 0.0,
                height: 300.0,
            },
        });
        assert_eq!(c.state().canvas, CanvasSize::new(1.0, 300.0));
    }

    #[test]
    fn user_link_anchor_is_stored_rounded() {
        let mut c = opened(2);
        c.dispatch(EditorEvent::BeginLink);
        c.dispatch(EditorEvent::ChooseTarget { target: 1 });
        c.dispatch(EditorEvent::Click {
            at: Vec2::new(123.456, 77.7),
        });
        let link = c
            .state()
            .scene
            .links()
            .iter()
            .find(|l| !l.auto_generated)
            .expect("user link");
        let tenths = |v: f64| ((v * 10.0).round() - v * 10.0).abs() < 1e-6;
        assert!(tenths(link.position.phi) && tenths(link.position.theta));
        let expected = c
            .state()
            .projection()
            .to_spherical(Vec2::new(123.456, 77.7));
        assert_close(link.position.phi, expected.phi);
        assert_close(link.position.theta, expected.theta);
    }
}
