use crate::*;

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use scroll_restore::{
    DEFAULT_SESSION_KEY, Extent, HistoryAction, HistoryEvent, Location, MemoryStorage,
    MutationWatcher, Offset, RestoreOutcome, ScrollManager, ScrollManagerOptions, Scrollable,
    Viewport, WINDOW_SCROLL_KEY, WatchScope,
};

#[derive(Debug, Default)]
struct Node {
    offset: Offset,
    scroll: Extent,
    client: Extent,
    writes: Vec<Offset>,
}

#[derive(Clone, Debug, Default)]
struct MockNode(Rc<RefCell<Node>>);

impl MockNode {
    fn sized(scroll: f64, client: f64) -> Self {
        Self(Rc::new(RefCell::new(Node {
            scroll: Extent::new(scroll, scroll),
            client: Extent::new(client, client),
            ..Node::default()
        })))
    }

    fn writes(&self) -> Vec<Offset> {
        self.0.borrow().writes.clone()
    }

    fn scroll_to(&self, offset: Offset) {
        self.0.borrow_mut().offset = offset;
    }
}

impl Scrollable for MockNode {
    fn scroll_offset(&self) -> Offset {
        self.0.borrow().offset
    }

    fn set_scroll_offset(&mut self, offset: Offset) {
        let mut node = self.0.borrow_mut();
        node.writes.push(offset);
        node.offset = offset;
    }

    fn scroll_size(&self) -> Extent {
        self.0.borrow().scroll
    }

    fn client_size(&self) -> Extent {
        self.0.borrow().client
    }
}

impl Viewport for MockNode {
    fn scroll_into_view(&mut self, _element_id: &str) -> bool {
        false
    }
}

fn manager(storage: MemoryStorage, viewport: &MockNode, history_length: usize) -> ScrollManager {
    let mut m = ScrollManager::new(
        ScrollManagerOptions::default(),
        storage,
        viewport.clone(),
        Box::new(MutationWatcher::new()),
        history_length,
    );
    m.start();
    m
}

const STORED: &str = r#"{
    "positions": {
        "abcdef": {
            "window": { "scrollX": 10, "scrollY": 20 },
            "main": { "scrollLeft": 30, "scrollTop": 40 }
        }
    },
    "locations": ["abcdef"],
    "locationKey": "abcdef"
}"#;

#[test]
fn default_positioning_scrolls_to_origin() {
    let history = MemoryHistory::new();
    let viewport = MockNode::sized(500.0, 250.0);
    let mut m = manager(MemoryStorage::new(), &viewport, history.length());

    let mut window = WindowScroller::new();
    let mut element = ElementScroller::new("main");
    let node = MockNode::sized(500.0, 250.0);

    assert_eq!(
        window.mount(Some(&mut m), history.location().hash.as_deref(), 0),
        Some(RestoreOutcome::Applied)
    );
    assert_eq!(
        element.mount(Some(&mut m), Some(node.clone()), 0),
        Some(RestoreOutcome::Applied)
    );
    assert_eq!(viewport.writes(), [Offset::ZERO]);
    assert_eq!(node.writes(), [Offset::ZERO]);
    assert!(element.is_registered());
}

#[test]
fn stored_positioning_restores_window_and_element() {
    let history = MemoryHistory::new();
    let viewport = MockNode::sized(500.0, 250.0);
    let storage = MemoryStorage::new().with_item("scroll", STORED);
    let mut m = ScrollManager::new(
        ScrollManagerOptions::default().with_session_key("scroll"),
        storage,
        viewport.clone(),
        Box::new(MutationWatcher::new()),
        history.length(),
    );
    m.start();

    let node = MockNode::sized(500.0, 250.0);
    WindowScroller::new().mount(Some(&mut m), None, 0);
    ElementScroller::new("main").mount(Some(&mut m), Some(node.clone()), 0);

    assert_eq!(viewport.writes(), [Offset::new(10.0, 20.0)]);
    assert_eq!(node.writes(), [Offset::new(30.0, 40.0)]);
}

#[test]
fn scrollers_without_manager_degrade_to_noop() {
    let mut window = WindowScroller::new();
    assert!(window.mount(None, None, 0).is_none());
    assert!(window.misuse_reported());
    assert!(window.mount(None, None, 0).is_none());
    assert!(window.update(None, 0).is_none());

    let mut element = ElementScroller::new("main");
    let node = MockNode::sized(500.0, 250.0);
    assert!(element.mount(None, Some(node.clone()), 0).is_none());
    assert!(element.misuse_reported());
    assert!(!element.is_registered());
    element.unmount(None);
    assert!(node.writes().is_empty());
}

#[test]
fn element_update_moves_registration_to_new_key() {
    let viewport = MockNode::sized(500.0, 250.0);
    let storage = MemoryStorage::new().with_item(DEFAULT_SESSION_KEY, STORED);
    let mut m = manager(storage, &viewport, 1);

    let first = MockNode::sized(0.0, 0.0);
    let mut element = ElementScroller::new("main");
    assert_eq!(
        element.mount(Some(&mut m), Some(first), 0),
        Some(RestoreOutcome::Deferred)
    );
    assert!(m.is_restore_pending("main"));

    let second = MockNode::sized(500.0, 250.0);
    assert_eq!(
        element.update(Some(&mut m), "side", Some(second.clone()), 0),
        Some(RestoreOutcome::Applied)
    );
    assert_eq!(element.scroll_key(), "side");
    assert!(!m.is_restore_pending("main"));
    assert_eq!(m.watcher().active_watches(), 0);
    assert_eq!(second.writes(), [Offset::ZERO]);

    element.unmount(Some(&mut m));
    assert!(!element.is_registered());
    m.notify_mutation(WatchScope::Element(String::from("side")));
    assert_eq!(second.writes().len(), 1);
}

#[test]
fn empty_scroll_key_is_ignored() {
    let viewport = MockNode::sized(500.0, 250.0);
    let mut m = manager(MemoryStorage::new(), &viewport, 1);
    let node = MockNode::sized(500.0, 250.0);
    let mut element = ElementScroller::new("");
    assert!(element.mount(Some(&mut m), Some(node.clone()), 0).is_none());
    assert!(!element.is_registered());
    assert!(node.writes().is_empty());
}

#[test]
fn element_refused_by_the_manager_is_not_registered() {
    let viewport = MockNode::sized(500.0, 250.0);
    let mut m = manager(MemoryStorage::new(), &viewport, 1);
    let node = MockNode::sized(500.0, 250.0);
    let mut element = ElementScroller::new(WINDOW_SCROLL_KEY);
    assert_eq!(
        element.mount(Some(&mut m), Some(node.clone()), 0),
        Some(RestoreOutcome::NoTarget)
    );
    assert!(!element.is_registered());
    assert!(node.writes().is_empty());

    assert_eq!(
        element.update(Some(&mut m), "main", Some(node.clone()), 0),
        Some(RestoreOutcome::Applied)
    );
    assert!(element.is_registered());
}

#[test]
fn notifications_during_a_manager_borrow_are_delivered_in_order() {
    let mut history = MemoryHistory::new();
    let viewport = MockNode::sized(4000.0, 800.0);
    let shared: SharedManager = Rc::new(RefCell::new(manager(
        MemoryStorage::new(),
        &viewport,
        history.length(),
    )));
    let binding = bind_history(&shared, &mut history, || 0);

    {
        let _busy = shared.borrow_mut();
        history.push(Location::new().with_key("a"));
    }
    assert_eq!(binding.pending(), 1);
    assert_eq!(shared.borrow().active_location(), "initial");

    history.push(Location::new().with_key("b"));
    assert_eq!(binding.pending(), 0);
    assert_eq!(shared.borrow().active_location(), "b");
    assert_eq!(shared.borrow().live_locations(), ["a", "b"]);

    {
        let _busy = shared.borrow_mut();
        assert!(history.back());
        assert_eq!(binding.flush_pending(&shared), 0);
    }
    assert_eq!(binding.flush_pending(&shared), 1);
    assert_eq!(binding.pending(), 0);
    assert_eq!(shared.borrow().active_location(), "a");
    assert_eq!(shared.borrow().live_locations(), ["a", "b"]);

    binding.unbind(&mut history);
}

#[test]
fn bound_history_restores_window_on_back() {
    let mut history = MemoryHistory::new();
    let viewport = MockNode::sized(4000.0, 800.0);
    let shared: SharedManager = Rc::new(RefCell::new(manager(
        MemoryStorage::new(),
        &viewport,
        history.length(),
    )));
    let now = Rc::new(Cell::new(0u64));
    let clock = Rc::clone(&now);
    let binding = bind_history(&shared, &mut history, move || clock.get());
    let mut window = WindowScroller::new();
    window.mount(Some(&mut *shared.borrow_mut()), None, 0);

    let a = history.push(Location::new());
    window.update(Some(&mut *shared.borrow_mut()), 0);
    viewport.scroll_to(Offset::new(0.0, 1200.0));

    now.set(100);
    history.push(Location::new().with_key("b"));
    window.update(Some(&mut *shared.borrow_mut()), 100);
    assert_eq!(viewport.scroll_offset(), Offset::ZERO);

    now.set(200);
    assert!(history.back());
    assert_eq!(shared.borrow().active_location(), a);
    window.update(Some(&mut *shared.borrow_mut()), 200);
    assert_eq!(viewport.scroll_offset(), Offset::new(0.0, 1200.0));
    assert_eq!(shared.borrow().live_locations(), [a.as_str(), "b"]);

    binding.unbind(&mut history);
    history.push(Location::new().with_key("c"));
    assert_eq!(shared.borrow().active_location(), a);
}

#[test]
fn memory_history_truncates_forward_entries_on_push() {
    let mut history = MemoryHistory::new();
    let seen: Rc<RefCell<Vec<HistoryEvent>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let id = history.listen(Box::new(move |e: &HistoryEvent| sink.borrow_mut().push(e.clone())));

    let a = history.push(Location::new());
    history.push(Location::new().with_key("b").with_hash("#top"));
    assert_eq!(history.length(), 3);
    assert!(history.back());
    assert!(history.back());
    assert!(!history.back());
    assert!(!history.go(0));
    assert!(!history.go(5));
    assert_eq!(history.location().key, None);
    assert!(history.forward());
    assert_eq!(history.location().key.as_deref(), Some(a.as_str()));

    history.push(Location::new().with_key("c"));
    assert_eq!(history.length(), 3);
    history.replace(Location::new().with_key("d"));
    assert_eq!(history.length(), 3);
    assert_eq!(history.index(), 2);

    let events = seen.borrow();
    let summary: Vec<(HistoryAction, Option<&str>, usize)> = events
        .iter()
        .map(|e| (e.action, e.location.key.as_deref(), e.length))
        .collect();
    assert_eq!(
        summary,
        [
            (HistoryAction::Push, Some(a.as_str()), 2),
            (HistoryAction::Push, Some("b"), 3),
            (HistoryAction::Pop, Some(a.as_str()), 3),
            (HistoryAction::Pop, None, 3),
            (HistoryAction::Pop, Some(a.as_str()), 3),
            (HistoryAction::Push, Some("c"), 3),
            (HistoryAction::Replace, Some("d"), 3),
        ]
    );
    drop(summary);
    drop(events);

    history.unlisten(id);
    assert!(history.back());
    assert_eq!(seen.borrow().len(), 7);
}
