// Example: a minimal host that navigates, reloads, and restores.
use scroll_restore::{
    Extent, HistoryAction, HistoryEvent, Location, MemoryStorage, MutationWatcher, Offset,
    ScrollManager, ScrollManagerOptions, Scrollable, SessionStorage, Viewport,
};

#[derive(Default)]
struct Page {
    offset: Offset,
}

impl Scrollable for Page {
    fn scroll_offset(&self) -> Offset {
        self.offset
    }

    fn set_scroll_offset(&mut self, offset: Offset) {
        self.offset = offset;
    }

    fn scroll_size(&self) -> Extent {
        Extent::new(1280.0, 4000.0)
    }

    fn client_size(&self) -> Extent {
        Extent::new(1280.0, 800.0)
    }
}

impl Viewport for Page {
    fn scroll_into_view(&mut self, _element_id: &str) -> bool {
        false
    }
}

fn main() {
    let mut m = ScrollManager::new(
        ScrollManagerOptions::default(),
        MemoryStorage::new(),
        Page::default(),
        Box::new(MutationWatcher::new()),
        1,
    );
    m.start();

    let to_a = HistoryEvent::new(Location::new().with_key("a"), HistoryAction::Push, 2);
    m.handle_history(&to_a, 0);
    // The user scrolls down on "a".
    m.viewport_mut().set_scroll_offset(Offset::new(0.0, 1200.0));

    let to_b = HistoryEvent::new(Location::new().with_key("b"), HistoryAction::Push, 3);
    m.handle_history(&to_b, 16);
    m.restore_window(16);
    println!("on b: viewport offset={:?}", m.viewport().scroll_offset());

    let back = HistoryEvent::new(Location::new().with_key("a"), HistoryAction::Pop, 3);
    m.handle_history(&back, 32);
    let outcome = m.restore_window(32);
    println!("restore on back: {outcome:?}");
    println!("back on a: viewport offset={:?}", m.viewport().scroll_offset());

    m.flush();
    let stored = m
        .storage()
        .get_item("ScrollManager")
        .ok()
        .flatten()
        .unwrap_or_default();
    println!("session state: {stored}");
}
