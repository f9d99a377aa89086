use editor::{EditMode, EditorConfig, EditorEvent, Effect, InteractionController};
use foundation::math::Vec2;
use pretty_assertions::assert_eq;
use render::RenderCommand;
use scene::{IngestRequest, SceneGraph, SceneSnapshot};

fn last_snapshot(effects: &[Effect]) -> Option<SceneSnapshot> {
    effects.iter().rev().find_map(|e| match e {
        Effect::SceneChanged(s) => Some(s.clone()),
        _ => None,
    })
}

fn load_generation(effects: &[Effect]) -> Option<u64> {
    effects.iter().find_map(|e| match e {
        Effect::LoadImage { generation, .. } => Some(*generation),
        _ => None,
    })
}

/// Ingest three panoramas, frame the first, link it to the third, move the
/// marker, delete the middle panorama, then reopen the persisted result.
#[test]
fn full_editing_session() {
    let mut persisted: Option<SceneSnapshot> = None;
    let mut controller = InteractionController::new(EditorConfig::default());

    let mut generation = None;
    for (url, title) in [("hall.jpg", "Hall"), ("stairs.jpg", "Stairs"), ("roof.jpg", "Roof")] {
        let fx = controller.dispatch(EditorEvent::Ingest {
            request: IngestRequest::new(url).with_title(title),
        });
        generation = generation.or(load_generation(&fx));
        persisted = last_snapshot(&fx).or(persisted);
    }
    let generation = generation.expect("first ingest loads the image");
    assert_eq!(
        controller.dispatch(EditorEvent::ImageLoaded { generation }),
        vec![Effect::Redraw]
    );

    // Every asset got an exit, and the third was chained in from the second.
    let snap = persisted.clone().expect("persisted");
    assert_eq!(snap.assets.len(), 3);
    let ring: Vec<(usize, usize)> = snap
        .navigation
        .iter()
        .map(|l| (l.from_index, l.to_index))
        .collect();
    assert_eq!(ring, vec![(0, 1), (1, 0), (2, 0), (1, 2)]);

    // Frame the hall: drag 60px right, 20px down.
    controller.dispatch(EditorEvent::PointerDown {
        at: Vec2::new(700.0, 50.0),
    });
    controller.dispatch(EditorEvent::PointerMove {
        at: Vec2::new(730.0, 60.0),
    });
    controller.dispatch(EditorEvent::PointerMove {
        at: Vec2::new(760.0, 70.0),
    });
    let fx = controller.dispatch(EditorEvent::PointerUp {
        at: Vec2::new(760.0, 70.0),
    });
    let snap = last_snapshot(&fx).expect("view committed");
    assert_eq!(snap.assets[0].rotation.y, 30.0);
    assert_eq!(snap.assets[0].rotation.z, 10.0);

    // Link hall -> roof.
    controller.dispatch(EditorEvent::BeginLink);
    controller.dispatch(EditorEvent::ChooseTarget { target: 2 });
    let fx = controller.dispatch(EditorEvent::Click {
        at: Vec2::new(100.0, 100.0),
    });
    let snap = last_snapshot(&fx).expect("link committed");
    let user_link = snap
        .navigation
        .iter()
        .position(|l| !l.auto_generated)
        .expect("user link");
    assert_eq!(snap.navigation[user_link].label, "Roof");

    // Drag the new marker in navigation mode.
    controller.dispatch(EditorEvent::SetMode {
        mode: EditMode::Navigation,
    });
    controller.dispatch(EditorEvent::PointerDown {
        at: Vec2::new(100.0, 100.0),
    });
    controller.dispatch(EditorEvent::PointerMove {
        at: Vec2::new(150.0, 120.0),
    });
    let fx = controller.dispatch(EditorEvent::PointerUp {
        at: Vec2::new(150.0, 120.0),
    });
    let snap = last_snapshot(&fx).expect("marker committed");
    let moved = &snap.navigation[user_link];
    let expected = controller
        .state()
        .projection()
        .to_spherical(Vec2::new(150.0, 120.0));
    assert_eq!((moved.position.phi, moved.position.theta), (expected.phi, expected.theta));

    // The marker shows up in the frame, selected.
    let frame = controller.render();
    assert!(frame.commands.iter().any(|c| matches!(
        c,
        RenderCommand::Marker { link, radius, .. }
            if *link == user_link && *radius == controller.config().style.selected_marker_radius_px
    )));

    // Delete the middle panorama; the hall -> roof link is renumbered.
    let fx = controller.dispatch(EditorEvent::RemoveAsset { asset: 1 });
    let snap = last_snapshot(&fx).expect("removal committed");
    assert_eq!(snap.assets.len(), 2);
    assert_eq!(snap.assets[1].title, "Roof");
    assert!(snap
        .navigation
        .iter()
        .any(|l| !l.auto_generated && l.from_index == 0 && l.to_index == 1));
    for (i, a) in snap.assets.iter().enumerate() {
        assert_eq!(a.index, i);
        assert!(snap.navigation.iter().any(|l| l.from_index == i));
    }

    // Reopening the persisted scene yields the same graph and the hall view.
    let json = serde_json::to_string(&snap).expect("serialize snapshot");
    let reparsed: SceneSnapshot = serde_json::from_str(&json).expect("parse snapshot");
    let (reopened, fx) = InteractionController::open(EditorConfig::default(), reparsed);
    assert!(load_generation(&fx).is_some());
    assert_eq!(reopened.state().scene, SceneGraph::from_snapshot(snap));
    assert_eq!(reopened.state().view.y, 30.0);
    assert_eq!(reopened.state().view.x, 10.0);
}
