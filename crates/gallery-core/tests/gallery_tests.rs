// End-to-end behavior of a gallery instance: build, playback-driven redraw,
// click selection.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gallery_core::pick::project;
use gallery_core::{
    bob_offset, card_position, CardTextureRenderer, Gallery, MediaItem, NullCoverSource,
    PlaybackSnapshot,
};
use glam::{Vec2, Vec3};
use instant::Instant;

fn items() -> Vec<MediaItem> {
    (0..3)
        .map(|i| MediaItem {
            id: 10 + i as u64,
            title: format!("Track {i}"),
            artist: "Artist".into(),
            album: "Album".into(),
            cover: None,
            duration_sec: 100.0,
            media_ref: format!("media/{i}"),
        })
        .collect()
}

fn gallery() -> Gallery {
    let mut g = Gallery::with_renderer(
        CardTextureRenderer::without_fonts(),
        Box::new(NullCoverSource),
    );
    g.set_viewport(800.0, 600.0);
    g.set_items(&items());
    g
}

fn pixel(data: &[u8], x: u32, y: u32) -> [u8; 4] {
    let i = ((y * 512 + x) * 4) as usize;
    [data[i], data[i + 1], data[i + 2], data[i + 3]]
}

#[test]
fn build_creates_one_entity_per_item_at_layout_positions() {
    let g = gallery();
    let entities = g.scene().entities();
    assert_eq!(entities.len(), 3);
    for (i, entity) in entities.iter().enumerate() {
        assert_eq!(entity.item_id, 10 + i as u64);
        assert_eq!(entity.position.to_array(), card_position(3, i).to_array());
        assert_eq!(entity.texture_version, 0);
    }
}

#[test]
fn playback_update_regenerates_only_the_active_card() {
    let mut g = gallery();
    g.set_playback(PlaybackSnapshot {
        current_item_id: Some(11),
        is_playing: true,
        current_time_sec: 40.0,
    });
    let entities = g.scene().entities();
    assert_eq!(entities[0].texture_version, 0);
    assert_eq!(entities[1].texture_version, 1);
    assert_eq!(entities[2].texture_version, 0);

    // The regenerated face shows a 40% progress fill (track x 18..494).
    let data = entities[1].texture.data();
    let filled = pixel(data, 150, 597);
    let unfilled = pixel(data, 300, 597);
    assert!(filled[0] > 200, "fill missing: {filled:?}");
    assert!(unfilled[0] < 150, "fill overshoots 40%: {unfilled:?}");
}

#[test]
fn rapid_updates_coalesce_texture_regeneration() {
    let mut g = gallery();
    for k in 0..50 {
        g.set_playback(PlaybackSnapshot {
            current_item_id: Some(11),
            is_playing: true,
            current_time_sec: k as f64 * 0.1,
        });
    }
    // 5 seconds of media time at one redraw per 0.5s, plus the transition.
    let version = g.scene().entities()[1].texture_version;
    assert!((9..=11).contains(&version), "version {version}");
}

#[test]
fn click_on_a_card_fires_on_select_exactly_once() {
    let mut g = gallery();
    let selections: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = selections.clone();
    g.set_on_select(move |id| sink.borrow_mut().push(id));

    g.advance(Instant::now(), Duration::from_millis(16));

    let target = g.scene().entities()[2].position
        + Vec3::Y * bob_offset(g.bob_phase(), 2);
    let screen = project(target, g.viewport(), &g.camera).unwrap();
    g.pointer_down(screen);
    g.pointer_up(screen);
    assert_eq!(selections.borrow().as_slice(), &[12]);
}

#[test]
fn drag_suppresses_selection() {
    let mut g = gallery();
    let selections: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = selections.clone();
    g.set_on_select(move |id| sink.borrow_mut().push(id));

    g.advance(Instant::now(), Duration::from_millis(16));
    let screen = project(g.scene().entities()[0].position, g.viewport(), &g.camera).unwrap();
    g.pointer_down(screen);
    g.pointer_move(screen + Vec2::new(12.0, 0.0));
    g.pointer_up(screen + Vec2::new(12.0, 0.0));
    assert!(selections.borrow().is_empty());
}

#[test]
fn click_into_empty_space_fires_nothing() {
    let mut g = gallery();
    let selections: Rc<RefCell<Vec<u64>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = selections.clone();
    g.set_on_select(move |id| sink.borrow_mut().push(id));

    g.advance(Instant::now(), Duration::from_millis(16));
    let screen = project(Vec3::new(200.0, 200.0, 0.0), g.viewport(), &g.camera).unwrap();
    g.pointer_down(screen);
    g.pointer_up(screen);
    assert!(selections.borrow().is_empty());
}

#[test]
fn rebuilding_the_item_set_resets_entities() {
    let mut g = gallery();
    g.set_playback(PlaybackSnapshot {
        current_item_id: Some(11),
        is_playing: true,
        current_time_sec: 10.0,
    });
    let shorter = items()[..2].to_vec();
    g.set_items(&shorter);
    let entities = g.scene().entities();
    assert_eq!(entities.len(), 2);
    // Fresh entities, fresh versions, fresh two-item layout.
    for (i, entity) in entities.iter().enumerate() {
        assert_eq!(entity.texture_version, 0);
        assert_eq!(entity.position.to_array(), card_position(2, i).to_array());
    }
}

#[test]
fn advance_smooths_camera_and_advances_bob_phase() {
    let mut g = gallery();
    let before = g.bob_phase();
    g.advance(Instant::now(), Duration::from_millis(100));
    assert!(g.bob_phase() > before);
    // Camera eye snapped to the default orbit radius on the first tick.
    assert!((g.camera.eye().length() - 90.0).abs() < 1e-2);
}
