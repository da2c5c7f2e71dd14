// media-engine/tests/reconciliation.rs
// Gallery editing flows against the in-memory remote

use std::collections::HashSet;
use std::sync::Arc;

use media_engine::planner::plan;
use media_engine::remote::{MemoryRemote, RemoteCall};
use media_engine::{
    CatalogImage, CollectionState, ItemId, MediaConfig, MediaError, MediaSession, OwnerRef,
    PreviewAllocator, PreviewHandle, StagedFile,
};
use parking_lot::Mutex;
use proptest::prelude::*;

/// Preview allocator that counts allocations and releases per handle
#[derive(Default)]
struct CountingPreviews {
    inner: Mutex<Counts>,
}

#[derive(Default)]
struct Counts {
    next_id: u64,
    live: HashSet<u64>,
    allocated: usize,
    released: usize,
    double_released: usize,
}

impl CountingPreviews {
    fn live(&self) -> usize {
        self.inner.lock().live.len()
    }

    fn allocated(&self) -> usize {
        self.inner.lock().allocated
    }

    fn released(&self) -> usize {
        self.inner.lock().released
    }

    fn double_released(&self) -> usize {
        self.inner.lock().double_released
    }
}

impl PreviewAllocator for CountingPreviews {
    fn allocate(&self, file: &StagedFile) -> PreviewHandle {
        let mut counts = self.inner.lock();
        counts.next_id += 1;
        let id = counts.next_id;
        counts.live.insert(id);
        counts.allocated += 1;
        PreviewHandle::new(id, format!("blob:test/{}/{}", id, file.name))
    }

    fn release(&self, handle: PreviewHandle) {
        let mut counts = self.inner.lock();
        if counts.live.remove(&handle.id()) {
            counts.released += 1;
        } else {
            counts.double_released += 1;
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn file(name: &str) -> StagedFile {
    StagedFile::new(name, vec![0xFF, 0xD8, 0xFF])
}

fn open_session(
    remote: &MemoryRemote,
    owner: &OwnerRef,
    locators: &[&str],
    cover: Option<usize>,
    max: usize,
    previews: Arc<CountingPreviews>,
) -> MediaSession {
    let records = remote.insert_gallery(owner, locators, cover);
    MediaSession::open(owner.clone(), records, MediaConfig::new(max), previews).unwrap()
}

fn id_at(session: &MediaSession, index: usize) -> ItemId {
    session.items().unwrap()[index].id().clone()
}

fn locators(images: &[CatalogImage]) -> Vec<&str> {
    images.iter().map(|i| i.storage_locator.as_str()).collect()
}

proptest! {
    /// Applying the planned deletions one at a time to a position-addressed
    /// array removes exactly the marked images, whatever order they were
    /// marked in.
    #[test]
    fn descending_deletes_remove_exactly_the_marked_images(
        (len, marks) in (1usize..24).prop_flat_map(|len| {
            (Just(len), proptest::collection::vec(0..len, 0..len).prop_shuffle())
        })
    ) {
        let records: Vec<CatalogImage> = (0..len)
            .map(|position| CatalogImage {
                id: format!("img-{position}"),
                storage_locator: format!("{position}.jpg"),
                is_cover: false,
                position,
            })
            .collect();
        let mut remote: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        let mut state = CollectionState::seed(
            records,
            len,
            Arc::new(CountingPreviews::default()),
        ).unwrap();

        let mut marked = HashSet::new();
        for position in marks {
            if marked.insert(position) {
                state.toggle_delete(&ItemId::new(format!("img-{position}"))).unwrap();
            }
        }

        let plan = plan(state.initial(), &state);
        prop_assert!(plan.deletions.windows(2).all(|w| w[0] > w[1]));
        for &position in &plan.deletions {
            remote.remove(position);
        }

        let expected: Vec<String> = (0..len)
            .filter(|p| !marked.contains(p))
            .map(|p| format!("img-{p}"))
            .collect();
        prop_assert_eq!(remote, expected);
    }
}

#[tokio::test]
async fn test_cover_exclusivity_and_deleted_cover() {
    init_tracing();
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["a.jpg", "b.jpg", "c.jpg"], Some(0), 5, previews);
    session.add_staged(vec![file("d.jpg")]).unwrap();

    for index in [1, 3, 2, 0, 2] {
        let id = id_at(&session, index);
        session.set_cover(&id).unwrap();
        let covers = session
            .items()
            .unwrap()
            .iter()
            .filter(|i| i.is_cover() && !i.is_marked_for_deletion())
            .count();
        assert_eq!(covers, 1);
    }

    // a is still cover remotely, so it takes the flag back
    let c = id_at(&session, 2);
    session.toggle_delete(&c).unwrap();
    assert_eq!(session.cover().unwrap().unwrap().display_url(), "a.jpg");
    assert!(matches!(
        session.set_cover(&c),
        Err(MediaError::CoverOnDeletedItem(_))
    ));

    let a = id_at(&session, 0);
    session.toggle_delete(&a).unwrap();
    assert!(session.cover().unwrap().is_none());
    assert!(session.items().unwrap().iter().all(|i| !i.is_cover()));

    let images = session.commit(&remote).await.unwrap();
    assert_eq!(cover_locator(&images), None);
    assert_eq!(images, remote.gallery(&owner));
}

#[tokio::test]
async fn test_unedited_session_is_noop() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::brand("b1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["a.jpg", "b.jpg"], Some(1), 5, previews);

    let plan = session.plan().unwrap();
    assert!(plan.is_noop());
    assert_eq!(plan.remote_call_count(), 0);
    drop(plan);
    assert!(!session.has_changes());

    let images = session.commit(&remote).await.unwrap();
    assert!(remote.calls().is_empty());
    assert_eq!(images, remote.gallery(&owner));
}

#[tokio::test]
async fn test_reorder_round_trip() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::category("c1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B", "C"], None, 5, previews);

    let c = id_at(&session, 2);
    session.reorder(&c, 0).unwrap();
    assert!(session.has_changes());

    let images = session.commit(&remote).await.unwrap();
    assert!(remote.calls().is_empty());
    assert_eq!(locators(&images), vec!["C", "A", "B"]);
    let positions: Vec<usize> = images.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);
}

#[tokio::test]
async fn test_mixed_commit() {
    init_tracing();
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B", "C"], None, 5, previews.clone());

    let b = id_at(&session, 1);
    session.toggle_delete(&b).unwrap();
    session.add_staged(vec![file("D.jpg")]).unwrap();
    let d = id_at(&session, 3);
    session.set_cover(&d).unwrap();
    session.reorder(&d, 1).unwrap();

    let images = session.commit(&remote).await.unwrap();

    assert_eq!(
        remote.calls(),
        vec![
            RemoteCall::DeleteAt(1),
            RemoteCall::Upload {
                files: vec!["D.jpg".to_string()],
                cover_index: Some(0)
            },
        ]
    );
    assert_eq!(locators(&images), vec!["A", "images/p1/D.jpg", "C"]);
    assert!(images[1].is_cover);
    assert!(!images[0].is_cover && !images[2].is_cover);
    assert_eq!(images[1].position, 1);

    // D' is the record the remote created
    let created = remote
        .gallery(&owner)
        .into_iter()
        .find(|i| i.storage_locator == "images/p1/D.jpg")
        .unwrap();
    assert_eq!(images[1].id, created.id);

    assert_eq!(previews.live(), 0);
    assert_eq!(previews.released(), 1);
}

#[tokio::test]
async fn test_capacity_enforcement() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["a", "b", "c"], None, 3, previews.clone());

    let outcome = session.add_staged(vec![file("x.jpg"), file("y.jpg")]).unwrap();
    assert_eq!(outcome.accepted, 0);
    assert_eq!(outcome.rejected, 2);
    assert_eq!(outcome.remaining_slots, 0);
    assert_eq!(session.remaining_slots(), 0);
    assert_eq!(previews.allocated(), 0);
}

#[tokio::test]
async fn test_previews_released_exactly_once() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());

    // add -> remove -> close
    let mut session = open_session(&remote, &owner, &["a"], None, 5, previews.clone());
    session
        .add_staged(vec![file("x.jpg"), file("y.jpg"), file("z.jpg")])
        .unwrap();
    assert_eq!(previews.live(), 3);

    let y = id_at(&session, 2);
    session.toggle_delete(&y).unwrap();
    assert_eq!(previews.live(), 2);
    assert_eq!(previews.released(), 1);

    session.close();
    session.close();
    assert_eq!(previews.live(), 0);
    assert_eq!(previews.released(), 3);
    drop(session);

    // failed commit keeps previews, dropping the session frees them
    let mut session = open_session(&remote, &owner, &["a"], None, 5, previews.clone());
    session.add_staged(vec![file("w.jpg")]).unwrap();
    remote.fail_on(Some(media_engine::remote::FailPoint::Upload));
    assert!(session.commit(&remote).await.is_err());
    assert_eq!(previews.live(), 1);
    drop(session);

    assert_eq!(previews.allocated(), 4);
    assert_eq!(previews.released(), 4);
    assert_eq!(previews.live(), 0);
    assert_eq!(previews.double_released(), 0);
}

fn cover_locator(images: &[CatalogImage]) -> Option<&str> {
    images
        .iter()
        .find(|i| i.is_cover)
        .map(|i| i.storage_locator.as_str())
}

#[tokio::test]
async fn test_cover_after_reorder_lands_on_the_chosen_image() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B", "C"], None, 5, previews);

    let c = id_at(&session, 2);
    session.reorder(&c, 0).unwrap();
    session.set_cover(&c).unwrap();

    let images = session.commit(&remote).await.unwrap();

    assert_eq!(remote.calls(), vec![RemoteCall::SetCover(2)]);
    assert_eq!(cover_locator(&images), Some("C"));
    assert_eq!(cover_locator(&remote.gallery(&owner)), Some("C"));
}

#[tokio::test]
async fn test_cover_behind_a_staged_image_lands_on_the_chosen_image() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::product("p1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B"], None, 5, previews);

    session.add_staged(vec![file("D.jpg")]).unwrap();
    let d = id_at(&session, 2);
    session.reorder(&d, 0).unwrap();
    let b = id_at(&session, 2);
    session.set_cover(&b).unwrap();

    let images = session.commit(&remote).await.unwrap();

    assert_eq!(
        remote.calls(),
        vec![
            RemoteCall::Upload {
                files: vec!["D.jpg".to_string()],
                cover_index: None
            },
            RemoteCall::SetCover(1),
        ]
    );
    assert_eq!(locators(&images), vec!["images/p1/D.jpg", "A", "B"]);
    assert_eq!(cover_locator(&images), Some("B"));
    assert_eq!(cover_locator(&remote.gallery(&owner)), Some("B"));
}

#[tokio::test]
async fn test_restored_cover_stays_cover() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::brand("b1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B"], Some(0), 5, previews);

    let a = id_at(&session, 0);
    session.toggle_delete(&a).unwrap();
    session.toggle_delete(&a).unwrap();
    assert!(!session.has_changes());

    let images = session.commit(&remote).await.unwrap();

    assert!(remote.calls().is_empty());
    assert_eq!(cover_locator(&images), Some("A"));
    assert_eq!(images, remote.gallery(&owner));
}

#[tokio::test]
async fn test_dropping_staged_cover_keeps_seeded_cover() {
    let remote = MemoryRemote::new();
    let owner = OwnerRef::brand("b1");
    let previews = Arc::new(CountingPreviews::default());
    let mut session = open_session(&remote, &owner, &["A", "B"], Some(0), 5, previews);

    session.add_staged(vec![file("x.jpg")]).unwrap();
    let x = id_at(&session, 2);
    session.set_cover(&x).unwrap();
    session.toggle_delete(&x).unwrap();

    let images = session.commit(&remote).await.unwrap();

    assert!(remote.calls().is_empty());
    assert_eq!(images, remote.gallery(&owner));
}
