// Example: drive a shared manager from an in-memory history and a window binding.
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use scroll_restore::{
    Extent, Location, MemoryStorage, Offset, ScrollManager, ScrollManagerOptions, Scrollable,
    Viewport, select_watcher,
};
use scroll_restore_adapter::{
    ListenableHistory, MemoryHistory, SharedManager, WindowScroller, bind_history,
};

#[derive(Clone, Default)]
struct Page(Rc<Cell<Offset>>);

impl Scrollable for Page {
    fn scroll_offset(&self) -> Offset {
        self.0.get()
    }

    fn set_scroll_offset(&mut self, offset: Offset) {
        self.0.set(offset);
    }

    fn scroll_size(&self) -> Extent {
        Extent::new(1024.0, 5000.0)
    }

    fn client_size(&self) -> Extent {
        Extent::new(1024.0, 768.0)
    }
}

impl Viewport for Page {
    fn scroll_into_view(&mut self, _element_id: &str) -> bool {
        false
    }
}

fn main() {
    let mut history = MemoryHistory::new();
    let page = Page::default();
    let shared: SharedManager = Rc::new(RefCell::new(ScrollManager::new(
        ScrollManagerOptions::default(),
        MemoryStorage::new(),
        page.clone(),
        select_watcher(true, 500),
        history.length(),
    )));
    shared.borrow_mut().start();

    let clock = Rc::new(Cell::new(0u64));
    let now = Rc::clone(&clock);
    let binding = bind_history(&shared, &mut history, move || now.get());

    let mut window = WindowScroller::new();
    window.mount(Some(&mut *shared.borrow_mut()), None, clock.get());

    history.push(Location::new().with_key("list"));
    window.update(Some(&mut *shared.borrow_mut()), clock.get());
    page.0.set(Offset::new(0.0, 2400.0));
    println!("scrolled list to {:?}", page.0.get());

    clock.set(1_000);
    history.push(Location::new().with_key("detail"));
    window.update(Some(&mut *shared.borrow_mut()), clock.get());
    println!("opened detail at {:?}", page.0.get());

    clock.set(2_000);
    history.back();
    window.update(Some(&mut *shared.borrow_mut()), clock.get());
    println!("back on list at {:?}", page.0.get());

    binding.unbind(&mut history);
    shared.borrow_mut().stop();
}
