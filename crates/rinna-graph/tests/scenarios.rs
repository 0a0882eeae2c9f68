//! End-to-end tests for the critical path service.
//!
//! Covers: the four-item planning scenario, cycle rejection, unknown items,
//! direction queries, delay impact, parallel paths, block annotations,
//! schedules and concurrent mutation.

use std::sync::Arc;

use chrono::NaiveDate;
use rinna_core::{InMemoryItemStore, ItemId, Priority, WorkItem, WorkflowState};
use rinna_graph::{CriticalPathService, Direction, GraphError};

fn id(name: &str) -> ItemId {
    ItemId::from(name)
}

fn ids(items: &[WorkItem]) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

fn abcd() -> (Arc<InMemoryItemStore>, CriticalPathService<Arc<InMemoryItemStore>>) {
    let store = Arc::new(InMemoryItemStore::with_items([
        WorkItem::new("A", "Design schema").with_priority(Priority::High),
        WorkItem::new("B", "Build API").with_priority(Priority::Medium),
        WorkItem::new("C", "Ship UI").with_priority(Priority::Low),
        WorkItem::new("D", "Write docs").with_priority(Priority::Low),
    ]));
    let svc = CriticalPathService::new(Arc::clone(&store));
    (store, svc)
}

// ===========================================================================
// Planning scenario
// ===========================================================================

#[test]
fn four_item_scenario() {
    let (_, svc) = abcd();

    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();

    let err = svc.add_dependency(&id("A"), &id("C")).unwrap_err();
    match err {
        GraphError::CycleDetected { path, .. } => {
            assert_eq!(path, vec![id("A"), id("B"), id("C"), id("A")]);
        }
        other => panic!("expected cycle, got {other:?}"),
    }
    assert!(!svc.has_dependency(&id("A"), &id("C")));
    assert_eq!(svc.edge_count(), 2);

    assert_eq!(ids(&svc.find_critical_path()), vec!["A", "B", "C"]);
    assert!(svc.find_blocking_items().is_empty());

    svc.add_dependency(&id("D"), &id("A")).unwrap();
    assert_eq!(ids(&svc.find_blocking_items()), vec!["A"]);

    let mut impact = ids(&svc.calculate_delay_impact(&id("A"), 5).unwrap())
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    impact.sort();
    assert_eq!(impact, vec!["B", "C", "D"]);
}

#[test]
fn blocking_item_drops_out_once_done() {
    let (store, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("D"), &id("A")).unwrap();
    assert_eq!(ids(&svc.find_blocking_items()), vec!["A"]);

    store.upsert(WorkItem::new("A", "Design schema").with_state(WorkflowState::Done));
    assert!(svc.find_blocking_items().is_empty());
}

#[test]
fn removing_an_edge_allows_the_reverse() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    assert!(svc.add_dependency(&id("A"), &id("B")).is_err());

    assert!(svc.remove_dependency(&id("B"), &id("A")));
    assert!(!svc.remove_dependency(&id("B"), &id("A")));
    svc.add_dependency(&id("A"), &id("B")).unwrap();
    assert_eq!(svc.blockers_of(&id("A")), vec![id("B")]);
}

#[test]
fn self_dependency_is_a_cycle() {
    let (_, svc) = abcd();
    assert!(matches!(
        svc.add_dependency(&id("A"), &id("A")),
        Err(GraphError::CycleDetected { .. })
    ));
    assert_eq!(svc.edge_count(), 0);
}

// ===========================================================================
// Lookups and errors
// ===========================================================================

#[test]
fn unknown_items_are_reported() {
    let (_, svc) = abcd();
    let ghost = id("ghost");
    let unknown = Err(GraphError::UnknownItem(ghost.clone()));

    assert_eq!(svc.add_dependency(&ghost, &id("A")).map(|_| ()), unknown);
    assert_eq!(svc.add_dependency(&id("A"), &ghost).map(|_| ()), unknown);
    assert_eq!(svc.find_items_depending_on(&ghost).map(|_| ()), unknown);
    assert_eq!(svc.calculate_delay_impact(&ghost, 1).map(|_| ()), unknown);
    assert_eq!(svc.critical_path_to(&ghost).map(|_| ()), unknown);
    assert_eq!(svc.mark_as_blocked(&ghost, "x", None).map(|_| ()), unknown);
    assert_eq!(svc.mark_as_unblocked(&ghost).map(|_| ()), unknown);
}

#[test]
fn direction_queries() {
    let (_, svc) = abcd();
    svc.add_labeled_dependency(&id("B"), &id("A"), "REQUIRES", Some("lee"))
        .unwrap();
    svc.add_dependency(&id("C"), &id("A")).unwrap();

    let outgoing = svc.dependencies(&id("A"), Direction::Outgoing);
    assert_eq!(outgoing.len(), 2);
    assert!(svc.dependencies(&id("A"), Direction::Incoming).is_empty());

    let incoming = svc.dependencies_by_direction(&id("B"), " incoming ").unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].kind, "REQUIRES");
    assert_eq!(incoming[0].created_by.as_deref(), Some("lee"));

    assert!(matches!(
        svc.dependencies_by_direction(&id("B"), "up"),
        Err(GraphError::InvalidDirection(_))
    ));
}

#[test]
fn direct_dependents_resolve_to_items() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();
    assert_eq!(ids(&svc.find_items_depending_on(&id("A")).unwrap()), vec!["B"]);
    assert!(svc.find_items_depending_on(&id("C")).unwrap().is_empty());
}

#[test]
fn edges_snapshot_is_ordered() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("C"), &id("B")).unwrap();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    let pairs: Vec<_> = svc
        .edges()
        .into_iter()
        .map(|e| (e.dependent.to_string(), e.blocker.to_string()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("B".to_string(), "A".to_string()),
            ("C".to_string(), "B".to_string()),
        ]
    );
}

// ===========================================================================
// Critical path variants
// ===========================================================================

#[test]
fn critical_path_to_a_side_branch() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();
    svc.add_dependency(&id("D"), &id("A")).unwrap();

    let to_d = svc.critical_path_to(&id("D")).unwrap();
    assert_eq!(to_d.ids(), vec![id("A"), id("D")]);
    assert!((to_d.total_weight - 2.0).abs() < f64::EPSILON);

    let full = svc.critical_path();
    assert_eq!(full.ids(), vec![id("A"), id("B"), id("C")]);
    assert!((full.total_weight - 5.0).abs() < f64::EPSILON);
}

#[test]
fn parallel_paths_from_source_to_sink() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();
    svc.add_dependency(&id("D"), &id("A")).unwrap();

    let found = svc.parallel_paths(10);
    let paths: Vec<Vec<&str>> = found.iter().map(|p| ids(p)).collect();
    assert_eq!(paths, vec![vec!["A", "B", "C"], vec!["A", "D"]]);
    assert_eq!(svc.parallel_paths(1).len(), 1);
}

#[test]
fn empty_accessor_gives_empty_results() {
    let svc = CriticalPathService::new(InMemoryItemStore::new());
    assert!(svc.find_critical_path().is_empty());
    assert!(svc.find_blocking_items().is_empty());
    assert!(svc.topological_order().is_empty());
    assert!(svc
        .estimated_completion_dates(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
        .is_empty());
}

// ===========================================================================
// Block annotations and schedules
// ===========================================================================

#[test]
fn blocked_items_on_the_critical_path() {
    let (_, svc) = abcd();
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();

    svc.mark_as_blocked(&id("B"), "waiting on vendor", Some("ops"))
        .unwrap();
    svc.mark_as_blocked(&id("D"), "off path", None).unwrap();
    assert_eq!(ids(&svc.blocked_on_critical_path()), vec!["B"]);

    let cleared = svc.mark_as_unblocked(&id("B")).unwrap();
    assert!(cleared.block_state().is_none());
    assert!(svc.blocked_on_critical_path().is_empty());
    assert_eq!(svc.edge_count(), 2);
}

#[test]
fn schedule_follows_the_critical_path() {
    let store = InMemoryItemStore::with_items([
        WorkItem::new("A", "A").with_state(WorkflowState::Done),
        WorkItem::new("B", "B").with_metadata("estimated_days", "3"),
        WorkItem::new("C", "C"),
    ]);
    let svc = CriticalPathService::new(store);
    svc.add_dependency(&id("B"), &id("A")).unwrap();
    svc.add_dependency(&id("C"), &id("B")).unwrap();

    let start = NaiveDate::from_ymd_opt(2025, 2, 26).unwrap();
    let plan = svc.estimated_completion_dates(start);
    let got: Vec<_> = plan
        .iter()
        .map(|s| (s.id.as_str(), s.finish.to_string()))
        .collect();
    assert_eq!(
        got,
        vec![("B", "2025-03-01".to_string()), ("C", "2025-03-02".to_string())]
    );
}

// ===========================================================================
// Concurrency
// ===========================================================================

const fn assert_send_sync<T: Send + Sync>() {}

const _: () = assert_send_sync::<CriticalPathService<InMemoryItemStore>>();
const _: () = assert_send_sync::<CriticalPathService<Arc<InMemoryItemStore>>>();

#[test]
fn concurrent_mutations_keep_the_graph_acyclic() {
    const ITEMS: usize = 12;
    const THREADS: usize = 8;
    const OPS: usize = 2_000;

    let svc = CriticalPathService::new(InMemoryItemStore::with_items(
        (0..ITEMS).map(|i| WorkItem::new(format!("w{i}"), format!("work {i}"))),
    ));
    let name = |i: usize| ItemId::new(format!("w{}", i % ITEMS));

    std::thread::scope(|scope| {
        for t in 0..THREADS {
            let svc = &svc;
            scope.spawn(move || {
                for op in 0..OPS {
                    let dependent = name(t * 7 + op * 5);
                    let blocker = name(t * 3 + op * 11 + 1);
                    match op % 5 {
                        0..=2 => match svc.add_dependency(&dependent, &blocker) {
                            Ok(_) | Err(GraphError::CycleDetected { .. }) => {}
                            Err(other) => panic!("unexpected error: {other}"),
                        },
                        3 => {
                            svc.remove_dependency(&dependent, &blocker);
                        }
                        _ => {
                            let path = svc.find_critical_path();
                            assert!(!path.is_empty());
                        }
                    }
                }
            });
        }
    });

    let order: Vec<ItemId> = svc.topological_order().into_iter().map(|i| i.id).collect();
    assert_eq!(order.len(), ITEMS);
    for edge in svc.edges() {
        let d = order.iter().position(|i| i == &edge.dependent);
        let b = order.iter().position(|i| i == &edge.blocker);
        assert!(b < d, "{} must precede {}", edge.blocker, edge.dependent);
    }
}
