//! Graph loading against an instrumented record store.
//!
//! The fetcher used here counts every lookup, can delay individual scenes to
//! force out-of-order completion, and can fail individual lookups.

use std::collections::{HashMap, HashSet, VecDeque};
use std::f32::consts::FRAC_PI_2;
use std::sync::Mutex;
use std::time::Duration;

use panotour::fetcher::FetchFuture;
use panotour::{
    load_graph, DestinationSummary, Error, GraphLoader, Hotspot, LinkStatus, RecordFetcher,
    Rotation, Scene, SceneId, StaticTour, TourIndex, VisitedSet,
};
use proptest::prelude::*;

#[derive(Default)]
struct InstrumentedFetcher {
    tour: StaticTour,
    delays: HashMap<SceneId, Duration>,
    failing_scenes: HashSet<SceneId>,
    failing_hotspot_lists: HashSet<SceneId>,
    scene_calls: Mutex<Vec<SceneId>>,
    hotspot_calls: Mutex<Vec<SceneId>>,
}

impl InstrumentedFetcher {
    fn new(tour: StaticTour) -> Self {
        Self {
            tour,
            ..Self::default()
        }
    }

    fn delay(mut self, id: i64, millis: u64) -> Self {
        self.delays.insert(SceneId(id), Duration::from_millis(millis));
        self
    }

    fn fail_scene(mut self, id: i64) -> Self {
        self.failing_scenes.insert(SceneId(id));
        self
    }

    fn fail_hotspots(mut self, id: i64) -> Self {
        self.failing_hotspot_lists.insert(SceneId(id));
        self
    }

    fn scene_calls(&self) -> Vec<SceneId> {
        self.scene_calls.lock().unwrap().clone()
    }

    fn scene_calls_for(&self, id: i64) -> usize {
        self.scene_calls()
            .iter()
            .filter(|c| **c == SceneId(id))
            .count()
    }
}

fn injected(what: &str, id: SceneId) -> Error {
    Error::Http {
        url: format!("test://{what}/{id}"),
        message: "connection reset".to_string(),
    }
}

impl RecordFetcher for InstrumentedFetcher {
    fn get_scene(&self, id: SceneId) -> FetchFuture<'_, Scene> {
        Box::pin(async move {
            self.scene_calls.lock().unwrap().push(id);
            if let Some(delay) = self.delays.get(&id) {
                tokio::time::sleep(*delay).await;
            }
            if self.failing_scenes.contains(&id) {
                return Err(injected("scene", id));
            }
            self.tour.get_scene(id).await
        })
    }

    fn get_hotspots_by_origin(&self, id: SceneId) -> FetchFuture<'_, Vec<Hotspot>> {
        Box::pin(async move {
            self.hotspot_calls.lock().unwrap().push(id);
            if self.failing_hotspot_lists.contains(&id) {
                return Err(injected("hotspots", id));
            }
            self.tour.get_hotspots_by_origin(id).await
        })
    }
}

fn link(id: i64, to: i64) -> Hotspot {
    Hotspot {
        destination: Some(DestinationSummary {
            id: SceneId(to),
            image: None,
            label: None,
        }),
        ..Hotspot::new(id, format!("to {to}"))
    }
}

fn scenes(ids: &[i64]) -> StaticTour {
    ids.iter().fold(StaticTour::new(), |tour, &id| {
        tour.with_scene(Scene::new(id, format!("/pano/{id}.jpg")))
    })
}

/// Scene 1 with three hotspots to scenes 2, 3 and 4.
fn fan_out() -> StaticTour {
    scenes(&[1, 2, 3, 4])
        .with_hotspot(1, link(11, 2))
        .with_hotspot(1, link(12, 3))
        .with_hotspot(1, link(13, 4))
}

#[tokio::test]
async fn test_mutual_cycle_terminates() {
    let tour = scenes(&[1, 2])
        .with_hotspot(1, link(10, 2))
        .with_hotspot(2, link(20, 1));
    let fetcher = InstrumentedFetcher::new(tour);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    let b = root.hotspots[0].destination.as_deref().unwrap();
    assert_eq!(b.id, SceneId(2));
    assert_eq!(root.hotspots[0].link, LinkStatus::Resolved);

    let back = &b.hotspots[0];
    assert_eq!(back.destination_id, Some(SceneId(1)));
    assert!(back.destination.is_none());
    assert_eq!(back.link, LinkStatus::AlreadyVisited);

    assert_eq!(fetcher.scene_calls(), vec![SceneId(1), SceneId(2)]);
}

#[tokio::test]
async fn test_shared_destination_fetched_once() {
    let tour = scenes(&[1, 3])
        .with_hotspot(1, link(11, 3))
        .with_hotspot(1, link(12, 3));
    let fetcher = InstrumentedFetcher::new(tour).delay(3, 20);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    assert_eq!(fetcher.scene_calls_for(3), 1);
    assert_eq!(root.hotspots[0].link, LinkStatus::Resolved);
    assert_eq!(root.hotspots[1].link, LinkStatus::AlreadyVisited);
    assert_eq!(root.hotspots[1].destination_id, Some(SceneId(3)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shared_destination_fetched_once_on_multi_thread_runtime() {
    // Four scenes all pointing at each other and at scene 5.
    let mut tour = scenes(&[1, 2, 3, 4, 5]);
    let mut next_id = 100;
    for from in 1..=4 {
        for to in 1..=5 {
            if from != to {
                tour = tour.with_hotspot(from, link(next_id, to));
                next_id += 1;
            }
        }
    }
    let fetcher = InstrumentedFetcher::new(tour)
        .delay(2, 5)
        .delay(3, 10)
        .delay(5, 15);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    for id in 1..=5 {
        assert_eq!(fetcher.scene_calls_for(id), 1, "scene {id}");
    }
    assert_eq!(root.scene_count(), 5);
}

#[tokio::test]
async fn test_hotspot_order_preserved_when_completion_is_reversed() {
    // The first hotspot's destination resolves last.
    let fetcher = InstrumentedFetcher::new(fan_out())
        .delay(2, 40)
        .delay(3, 20);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    let ids: Vec<_> = root.hotspots.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![11, 12, 13]);
    let destinations: Vec<_> = root
        .hotspots
        .iter()
        .map(|h| h.destination.as_ref().map(|d| d.id))
        .collect();
    assert_eq!(
        destinations,
        vec![Some(SceneId(2)), Some(SceneId(3)), Some(SceneId(4))]
    );
}

#[tokio::test]
async fn test_dead_end_hotspot_fetches_nothing() {
    let tour = scenes(&[1]).with_hotspot(1, Hotspot::new(10, "Info"));
    let fetcher = InstrumentedFetcher::new(tour);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    let info = &root.hotspots[0];
    assert_eq!(info.link, LinkStatus::DeadEnd);
    assert!(info.destination.is_none());
    assert_eq!(fetcher.scene_calls(), vec![SceneId(1)]);
}

#[tokio::test]
async fn test_scene_without_hotspots_is_valid() {
    let fetcher = InstrumentedFetcher::new(scenes(&[1]));
    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();
    assert!(root.hotspots.is_empty());
}

#[tokio::test]
async fn test_failed_branch_is_isolated() {
    // Show the recovered-failure warning in test output.
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let fetcher = InstrumentedFetcher::new(fan_out()).fail_scene(3);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    assert_eq!(root.hotspots.len(), 3);
    assert_eq!(root.hotspots[0].link, LinkStatus::Resolved);
    assert_eq!(root.hotspots[1].link, LinkStatus::Failed);
    assert!(root.hotspots[1].destination.is_none());
    assert_eq!(root.hotspots[2].link, LinkStatus::Resolved);
}

#[tokio::test]
async fn test_failed_hotspot_list_below_root_is_isolated() {
    let tour = fan_out().with_hotspot(2, link(21, 4));
    let fetcher = InstrumentedFetcher::new(tour).fail_hotspots(2);

    let root = load_graph(&fetcher, SceneId(1)).await.unwrap();

    assert_eq!(root.hotspots[0].link, LinkStatus::Failed);
    assert_eq!(root.hotspots[2].link, LinkStatus::Resolved);
}

#[tokio::test]
async fn test_missing_destination_is_isolated() {
    let tour = scenes(&[1, 2])
        .with_hotspot(1, link(10, 2))
        .with_hotspot(1, link(11, 99));
    let root = load_graph(tour, SceneId(1)).await.unwrap();

    assert_eq!(root.hotspots[0].link, LinkStatus::Resolved);
    assert_eq!(root.hotspots[1].link, LinkStatus::Failed);

    let index = TourIndex::from_graph(&root);
    assert_eq!(index.get("1").unwrap().hotspots[1].target, None);
}

#[tokio::test]
async fn test_root_scene_failure_propagates() {
    let fetcher = InstrumentedFetcher::new(fan_out()).fail_scene(1);
    let err = load_graph(&fetcher, SceneId(1)).await.unwrap_err();
    assert!(matches!(err, Error::Http { .. }));
    assert_eq!(fetcher.scene_calls(), vec![SceneId(1)]);
}

#[tokio::test]
async fn test_root_hotspot_list_failure_propagates() {
    let fetcher = InstrumentedFetcher::new(fan_out()).fail_hotspots(1);
    assert!(load_graph(&fetcher, SceneId(1)).await.is_err());
}

#[tokio::test]
async fn test_angles_converted_to_radians() {
    let tour = StaticTour::new()
        .with_scene(Scene {
            entry_rotation: Rotation::new(90.0, 0.0, 0.0),
            ..Scene::new(1, "/a.jpg")
        })
        .with_hotspot(
            1,
            Hotspot {
                entry_yaw: Some(90.0),
                pitch: Some(-90.0),
                ..Hotspot::new(10, "marker")
            },
        );

    let root = load_graph(tour, SceneId(1)).await.unwrap();

    assert!((root.entry_rotation.yaw - FRAC_PI_2).abs() < 1e-6);
    assert!((root.hotspots[0].rotation.yaw - FRAC_PI_2).abs() < 1e-6);
    assert!((root.hotspots[0].rotation.pitch + FRAC_PI_2).abs() < 1e-6);
}

#[tokio::test]
async fn test_shared_visited_set_across_calls() {
    let loader = GraphLoader::new(fan_out());
    let visited = VisitedSet::new();
    visited.insert(SceneId(3));

    let root = loader
        .load_graph(SceneId(1), &visited)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(root.hotspots[1].link, LinkStatus::AlreadyVisited);
    assert_eq!(
        visited.to_sorted_vec(),
        vec![SceneId(1), SceneId(2), SceneId(3), SceneId(4)]
    );
}

fn reachable(edges: &[(i64, i64)], root: i64) -> HashSet<i64> {
    let mut seen = HashSet::from([root]);
    let mut queue = VecDeque::from([root]);
    while let Some(from) = queue.pop_front() {
        for &(a, b) in edges {
            if a == from && seen.insert(b) {
                queue.push_back(b);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn prop_each_reachable_scene_loaded_once(
        edges in prop::collection::vec((1i64..=8, 1i64..=8), 0..24)
    ) {
        let mut tour = scenes(&[1, 2, 3, 4, 5, 6, 7, 8]);
        for (i, &(from, to)) in edges.iter().enumerate() {
            tour = tour.with_hotspot(from, link(i64::try_from(i).unwrap(), to));
        }
        let fetcher = InstrumentedFetcher::new(tour);

        let root = futures::executor::block_on(load_graph(&fetcher, SceneId(1))).unwrap();

        let expected = reachable(&edges, 1);
        let calls = fetcher.scene_calls();
        let distinct: HashSet<i64> = calls.iter().map(|id| id.0).collect();
        prop_assert_eq!(calls.len(), distinct.len());
        prop_assert_eq!(&distinct, &expected);
        prop_assert_eq!(root.scene_count(), expected.len());

        let index = TourIndex::from_graph(&root);
        prop_assert_eq!(index.len(), expected.len());
    }
}
