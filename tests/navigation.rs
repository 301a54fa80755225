//! End-to-end behavior of the navigator through its public API.

use backstack::builder::NavigatorBuilder;
use backstack::core::{FlowDefinition, NavigateOptions, Overlay, Priority};
use backstack::engine::{BackOutcome, Navigator, NavigatorConfig, NavigatorOptions};
use backstack::observer::NavigationSnapshot;
use backstack::persistence::{FileStorage, MemoryStorage, SnapshotStorage, DEFAULT_STORAGE_KEY};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn navigator() -> Navigator {
    NavigatorBuilder::new()
        .main_page("Home")
        .flow(FlowDefinition::new("pay", ["Input", "Detail", "Confirm"]))
        .build()
        .unwrap()
}

fn pages(nav: &Navigator) -> Vec<String> {
    nav.history().iter().map(|e| e.page_id.clone()).collect()
}

fn with_priority(priority: Priority) -> NavigateOptions {
    NavigateOptions::push().with_priority(priority)
}

#[test]
fn pushes_grow_history_and_index() {
    let mut nav = Navigator::default();
    nav.setup(NavigatorConfig::new("Home"), None).unwrap();

    for n in 1..=5 {
        nav.navigate_to(&format!("Page{n}")).unwrap();
        assert_eq!(nav.history().len(), n + 1);
        assert_eq!(nav.current_index(), Some(n));
    }
}

#[test]
fn push_after_back_truncates_forward_branch() {
    let mut nav = Navigator::default();
    nav.setup(NavigatorConfig::new("A"), None).unwrap();
    nav.navigate_to("B").unwrap();
    nav.navigate_to("C").unwrap();

    assert!(nav.back().unwrap());
    assert!(nav.back().unwrap());
    assert!(nav.can_go_forward());
    nav.navigate_to("D").unwrap();

    assert_eq!(pages(&nav), ["A", "D"]);
    assert!(!nav.can_go_forward());
}

#[test]
fn stacked_popups_close_in_one_back() {
    let mut nav = Navigator::default();
    nav.setup(NavigatorConfig::new("root"), Some("home")).unwrap();
    nav.navigate("p1", with_priority(Priority::Popup)).unwrap();
    nav.navigate("p2", with_priority(Priority::Popup)).unwrap();

    assert!(nav.can_go_back());
    assert!(nav.back().unwrap());

    assert_eq!(nav.current_page(), Some("home"));
    assert_eq!(nav.history().len(), 3);
}

#[test]
fn popups_without_page_below_cannot_go_back() {
    let mut nav = Navigator::new(NavigatorOptions {
        default_priority: Priority::Popup,
        ..NavigatorOptions::default()
    });
    nav.setup(NavigatorConfig::new("Home"), Some("p1")).unwrap();
    nav.navigate_to("p2").unwrap();

    assert!(!nav.can_go_back());
    assert!(!nav.back().unwrap());
    assert_eq!(nav.current_page(), Some("p2"));
}

#[test]
fn fullscreen_closes_in_one_step_over_popup() {
    let mut nav = Navigator::default();
    nav.setup(NavigatorConfig::new("Home"), None).unwrap();
    nav.navigate("sheet", with_priority(Priority::Popup)).unwrap();
    nav.navigate("video", with_priority(Priority::Fullscreen))
        .unwrap();

    assert!(nav.back().unwrap());

    assert_eq!(nav.current_page(), Some("sheet"));
}

#[test]
fn overlay_takes_precedence_over_history() {
    let mut nav = navigator();
    nav.navigate_to("List").unwrap();
    nav.open_overlay(Overlay::new("confirm-dialog")).unwrap();
    let history_before = pages(&nav);

    assert_eq!(nav.handle_back().unwrap(), BackOutcome::OverlayDismissed);
    assert_eq!(pages(&nav), history_before);
    assert_eq!(nav.current_page(), Some("List"));

    assert_eq!(nav.handle_back().unwrap(), BackOutcome::Navigated);
    assert_eq!(nav.current_page(), Some("Home"));
}

#[test]
fn flow_round_trip_returns_to_entry_page() {
    let mut nav = navigator();

    nav.navigate_to("Input").unwrap();
    assert_eq!(
        nav.active_flow().unwrap().entry_page.as_deref(),
        Some("Home")
    );
    nav.navigate_to("Detail").unwrap();
    nav.navigate_to("Confirm").unwrap();

    assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowStepBack);
    assert_eq!(nav.current_page(), Some("Detail"));
    assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowStepBack);
    assert_eq!(nav.current_page(), Some("Input"));
    assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowExited);
    assert_eq!(nav.current_page(), Some("Home"));
    assert!(nav.active_flow().is_none());

    let before = nav.state();
    assert_eq!(nav.handle_back().unwrap(), BackOutcome::Blocked);
    assert_eq!(nav.state(), before);
}

#[test]
fn back_into_flow_returns_to_page_before_it() {
    let mut nav = navigator();
    for page in ["Input", "Detail", "Receipt"] {
        nav.navigate_to(page).unwrap();
    }

    let outcomes: Vec<_> = (0..4).map(|_| nav.handle_back().unwrap()).collect();

    assert_eq!(
        outcomes,
        [
            BackOutcome::Navigated,
            BackOutcome::FlowStepBack,
            BackOutcome::FlowExited,
            BackOutcome::Blocked,
        ]
    );
    assert_eq!(nav.current_page(), Some("Home"));
}

#[test]
fn flow_exit_skips_repeated_first_step() {
    let mut nav = navigator();
    nav.navigate_to("Input").unwrap();
    nav.navigate_to("Input").unwrap();

    assert_eq!(nav.handle_back().unwrap(), BackOutcome::FlowExited);
    assert_eq!(nav.current_page(), Some("Home"));
    assert_eq!(nav.handle_back().unwrap(), BackOutcome::Blocked);
}

#[test]
fn removing_flow_entries_keeps_current_page() {
    let mut nav = navigator();
    for page in ["Input", "Detail", "Receipt", "Other"] {
        nav.navigate_to(page).unwrap();
    }
    nav.back().unwrap();

    nav.remove_flow_entries("pay").unwrap();

    assert_eq!(pages(&nav), ["Home", "Receipt", "Other"]);
    assert_eq!(nav.current_page(), Some("Receipt"));
}

#[test]
fn exit_flow_is_idempotent() {
    let mut nav = navigator();
    nav.navigate_to("Input").unwrap();
    nav.navigate_to("Detail").unwrap();

    assert!(nav.exit_flow(None).unwrap());
    let first = (nav.history().to_vec(), nav.active_flow().cloned());
    assert!(nav.exit_flow(None).unwrap());
    let second = (nav.history().to_vec(), nav.active_flow().cloned());

    assert_eq!(first, second);
    assert_eq!(pages(&nav), ["Home", "Input"]);
}

#[test]
fn history_survives_restart() {
    let storage = MemoryStorage::new();
    let mut nav = Navigator::with_storage(NavigatorOptions::default(), Box::new(storage.clone()));
    nav.setup(NavigatorConfig::new("Home"), None).unwrap();
    let payload = serde_json::json!({ "orderId": 42 })
        .as_object()
        .cloned()
        .unwrap();
    nav.navigate("List", NavigateOptions::push().with_payload(payload))
        .unwrap();
    nav.navigate("Sheet", with_priority(Priority::Popup)).unwrap();
    nav.back().unwrap();

    let restored =
        Navigator::with_storage(NavigatorOptions::default(), Box::new(storage.clone()));

    assert_eq!(restored.history(), nav.history());
    assert_eq!(restored.current(), nav.current());
    assert_eq!(restored.current_index(), Some(1));
    let payload = restored.current().unwrap().payload.as_ref().unwrap();
    assert_eq!(payload["orderId"], 42);
}

#[test]
fn restored_history_is_kept_by_setup() {
    let storage = MemoryStorage::new();
    let mut nav = Navigator::with_storage(NavigatorOptions::default(), Box::new(storage.clone()));
    nav.setup(NavigatorConfig::new("Home"), None).unwrap();
    nav.navigate_to("List").unwrap();

    let mut restored =
        Navigator::with_storage(NavigatorOptions::default(), Box::new(storage.clone()));
    restored.setup(NavigatorConfig::new("Home"), None).unwrap();

    assert_eq!(pages(&restored), ["Home", "List"]);
    assert_eq!(restored.handle_back().unwrap(), BackOutcome::Navigated);
}

#[test]
fn restored_flow_has_no_entry_page() {
    let storage = MemoryStorage::new();
    let flows = || FlowDefinition::new("pay", ["Input", "Detail"]);
    let mut nav = NavigatorBuilder::new()
        .main_page("Home")
        .flow(flows())
        .storage(storage.clone())
        .build()
        .unwrap();
    nav.navigate_to("Input").unwrap();

    let mut restored = NavigatorBuilder::new()
        .main_page("Home")
        .flow(flows())
        .storage(storage)
        .build()
        .unwrap();

    let active = restored.active_flow().unwrap();
    assert_eq!(active.flow_name, "pay");
    assert!(active.entry_page.is_none());
    assert_eq!(restored.handle_back().unwrap(), BackOutcome::Blocked);
}

#[test]
fn corrupt_history_yields_fresh_navigator() {
    let storage = MemoryStorage::new();
    storage
        .save(DEFAULT_STORAGE_KEY, b"{\"entries\": 7}")
        .unwrap();

    let mut nav = Navigator::with_storage(NavigatorOptions::default(), Box::new(storage));

    assert!(nav.history().is_empty());
    nav.setup(NavigatorConfig::new("Home"), None).unwrap();
    assert_eq!(pages(&nav), ["Home"]);
}

#[test]
fn file_storage_persists_between_navigators() {
    let dir = tempfile::tempdir().unwrap();
    let mut nav = NavigatorBuilder::new()
        .main_page("Home")
        .storage(FileStorage::new(dir.path()))
        .build()
        .unwrap();
    nav.navigate_to("Settings").unwrap();

    let restored = Navigator::with_storage(
        NavigatorOptions::default(),
        Box::new(FileStorage::new(dir.path())),
    );

    assert_eq!(restored.current_page(), Some("Settings"));
}

#[test]
fn listener_panic_does_not_block_others() {
    let mut nav = navigator();
    nav.subscribe(|snapshot: &NavigationSnapshot| {
        if snapshot.current_page() == Some("List") {
            panic!("listener failure");
        }
    });
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    nav.subscribe(move |snapshot: &NavigationSnapshot| {
        let page = snapshot.current_page().unwrap_or_default().to_string();
        sink.lock().unwrap().push(page);
    });

    nav.navigate_to("List").unwrap();

    assert_eq!(nav.current_page(), Some("List"));
    assert_eq!(*seen.lock().unwrap(), ["Home", "List"]);
}

#[test]
fn unsubscribed_listener_stops_receiving() {
    let mut nav = navigator();
    let count = Arc::new(AtomicUsize::new(0));
    let sink = Arc::clone(&count);
    let subscription = nav.subscribe(move |_: &NavigationSnapshot| {
        sink.fetch_add(1, Ordering::SeqCst);
    });

    nav.navigate_to("List").unwrap();
    assert!(subscription.unsubscribe());
    assert!(!subscription.unsubscribe());
    nav.navigate_to("Detail").unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[test]
fn snapshot_serializes_for_hosts() {
    let mut nav = navigator();
    nav.navigate_to("Input").unwrap();
    nav.open_overlay(Overlay::new("sheet")).unwrap();

    let json = serde_json::to_value(nav.state()).unwrap();

    assert_eq!(json["currentIndex"], 1);
    assert_eq!(json["current"]["pageId"], "Input");
    assert_eq!(json["current"]["flowId"], "pay");
    assert_eq!(json["activeFlow"]["entryPage"], "Home");
    assert_eq!(json["overlays"], serde_json::json!(["sheet"]));
    assert_eq!(json["canGoBack"], true);
}
