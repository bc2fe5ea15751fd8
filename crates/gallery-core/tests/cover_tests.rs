// Host-side tests for the cover load state machine: bounded retries with
// backoff, invalid raster handling and the teardown liveness guard.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use gallery_core::{
    CardTextureRenderer, CoverError, CoverHandle, CoverImage, CoverLoad, CoverSource, MediaItem,
    SceneGraph,
};
use instant::Instant;

/// Source that settles each request with the next scripted result and counts
/// how many requests were issued.
struct ScriptedSource {
    results: RefCell<VecDeque<Result<CoverImage, String>>>,
    requests: Rc<Cell<u32>>,
}

impl ScriptedSource {
    fn new(results: Vec<Result<CoverImage, String>>) -> Self {
        Self {
            results: RefCell::new(results.into()),
            requests: Rc::new(Cell::new(0)),
        }
    }
}

struct ScriptedHandle(Option<Result<CoverImage, String>>);

impl CoverHandle for ScriptedHandle {
    fn poll(&mut self) -> Option<Result<CoverImage, CoverError>> {
        self.0
            .take()
            .map(|r| r.map_err(CoverError::Fetch))
    }
}

impl CoverSource for ScriptedSource {
    fn request(&self, _reference: &str) -> Box<dyn CoverHandle> {
        self.requests.set(self.requests.get() + 1);
        let next = self.results.borrow_mut().pop_front();
        Box::new(ScriptedHandle(next.or(Some(Err("script exhausted".into())))))
    }
}

fn image(w: u32, h: u32) -> CoverImage {
    CoverImage {
        width: w,
        height: h,
        rgba: vec![0u8; (w * h * 4) as usize],
    }
}

fn item_with_cover(id: u64) -> MediaItem {
    MediaItem {
        id,
        title: format!("Track {id}"),
        artist: "Artist".into(),
        album: "Album".into(),
        cover: Some(format!("covers/{id}.png")),
        duration_sec: 180.0,
        media_ref: format!("media/{id}"),
    }
}

#[test]
fn success_resolves_on_first_poll() {
    let source = ScriptedSource::new(vec![Ok(image(300, 300))]);
    let mut load = CoverLoad::new(1, 1, "covers/1.png".into());
    let t0 = Instant::now();
    let resolved = load.tick(&source, t0);
    assert!(resolved.is_some());
    assert!(load.is_settled());
    assert_eq!(source.requests.get(), 1);
}

#[test]
fn failure_backs_off_500ms_then_1000ms() {
    let source = ScriptedSource::new(vec![
        Err("down".into()),
        Err("down".into()),
        Ok(image(64, 64)),
    ]);
    let mut load = CoverLoad::new(1, 1, "covers/1.png".into());
    let t0 = Instant::now();

    assert!(load.tick(&source, t0).is_none());
    assert_eq!(source.requests.get(), 1);

    // Still inside the first 500ms backoff: no new request.
    assert!(load.tick(&source, t0 + Duration::from_millis(499)).is_none());
    assert_eq!(source.requests.get(), 1);

    // Backoff elapsed: retry issued, fails again, second backoff is 1000ms.
    let t1 = t0 + Duration::from_millis(500);
    assert!(load.tick(&source, t1).is_none());
    assert!(load.tick(&source, t1).is_none());
    assert_eq!(source.requests.get(), 2);
    assert!(load
        .tick(&source, t1 + Duration::from_millis(999))
        .is_none());
    assert_eq!(source.requests.get(), 2);

    // Third request succeeds.
    let t2 = t1 + Duration::from_millis(1000);
    load.tick(&source, t2);
    let resolved = load.tick(&source, t2);
    assert!(resolved.is_some() || load.is_settled());
    assert_eq!(source.requests.get(), 3);
}

#[test]
fn zero_dimension_decode_takes_the_retry_path() {
    let source = ScriptedSource::new(vec![Ok(image(0, 100)), Ok(image(200, 200))]);
    let mut load = CoverLoad::new(1, 1, "covers/1.png".into());
    let t0 = Instant::now();
    assert!(load.tick(&source, t0).is_none(), "invalid raster must retry");
    assert!(!load.is_settled());
    let t1 = t0 + Duration::from_millis(500);
    load.tick(&source, t1); // reissues
    let resolved = load.tick(&source, t1);
    assert!(resolved.is_some());
}

#[test]
fn exhausted_retries_fail_silently() {
    let source = ScriptedSource::new(vec![
        Err("1".into()),
        Err("2".into()),
        Err("3".into()),
        Err("4".into()),
    ]);
    let mut load = CoverLoad::new(1, 1, "covers/1.png".into());
    let mut now = Instant::now();
    for _ in 0..12 {
        assert!(load.tick(&source, now).is_none());
        now += Duration::from_millis(1000);
    }
    assert!(load.is_settled());
    // Initial request plus exactly three retries.
    assert_eq!(source.requests.get(), 4);
}

#[test]
fn resolved_cover_attaches_to_the_entity() {
    let renderer = CardTextureRenderer::without_fonts();
    let source = ScriptedSource::new(vec![Ok(image(400, 400))]);
    let mut scene = SceneGraph::new();
    scene.build(&[item_with_cover(1)], |_| Default::default(), &renderer);
    assert_eq!(scene.pending_cover_loads(), 1);

    scene.tick_covers(&source, Instant::now());
    let entity = scene.entity_for_item(1).unwrap();
    let overlay = entity.cover.as_ref().expect("cover should attach");
    // Contain fit of a square image into the wider-than-tall preview region.
    assert!(overlay.size.x > 0.0 && (overlay.size.x - overlay.size.y).abs() < 1e-4);
    assert_eq!(scene.pending_cover_loads(), 0);
}

#[test]
fn rebuild_discards_pending_loads() {
    let renderer = CardTextureRenderer::without_fonts();
    // First request never settles until after the rebuild.
    let source = ScriptedSource::new(vec![Ok(image(128, 128))]);
    let mut scene = SceneGraph::new();
    scene.build(&[item_with_cover(1)], |_| Default::default(), &renderer);
    let first_generation = scene.generation();

    // Teardown/rebuild before the fetch is polled.
    scene.build(&[item_with_cover(2)], |_| Default::default(), &renderer);
    assert_eq!(scene.generation(), first_generation + 1);
    assert!(scene.entity_for_item(1).is_none());

    // The new scene's load resolves for item 2; nothing references item 1.
    scene.tick_covers(&source, Instant::now());
    assert!(scene.entity_for_item(2).unwrap().cover.is_some());
}
