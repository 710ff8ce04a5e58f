use crate::{Extent, Offset, ScrollRestoration};

/// A scrollable surface: an element (`scrollLeft/scrollTop`, `scrollWidth/clientWidth`, ...)
/// or the viewport (`scrollX/scrollY` over the document's sizes).
pub trait Scrollable {
    fn scroll_offset(&self) -> Offset;
    fn set_scroll_offset(&mut self, offset: Offset);
    fn scroll_size(&self) -> Extent;
    fn client_size(&self) -> Extent;
}

/// The window/document side of the host.
pub trait Viewport: Scrollable {
    /// Scrolls the element with `element_id` fully into view.
    ///
    /// Returns `false` when no such element exists (yet).
    fn scroll_into_view(&mut self, element_id: &str) -> bool;

    /// Switches the platform's native scroll restoration and returns the previous mode.
    ///
    /// Returns `None` when the platform has no such switch.
    fn set_scroll_restoration(&mut self, mode: ScrollRestoration) -> Option<ScrollRestoration> {
        let _ = mode;
        None
    }
}

/// Scroll range a target can currently accept, widened by `tolerance`.
pub fn available_range<T: Scrollable + ?Sized>(target: &T, tolerance: f64) -> Extent {
    let scroll = target.scroll_size();
    let client = target.client_size();
    Extent::new(
        scroll.width - client.width + tolerance,
        scroll.height - client.height + tolerance,
    )
}

fn within(current: f64, requested: f64, tolerance: f64) -> bool {
    current + tolerance >= requested && current <= requested + tolerance
}

/// One restore attempt.
///
/// The offset is only written when the target's available range covers it on both axes, so
/// an under-sized (not yet laid out) target is never clamped to a wrong position. Success is
/// judged on the position read back afterwards, whether or not this call wrote it.
pub fn attempt_scroll<T: Scrollable + ?Sized>(
    target: &mut T,
    requested: Offset,
    tolerance: f64,
) -> bool {
    let available = available_range(&*target, tolerance);
    if available.width >= requested.x && available.height >= requested.y {
        target.set_scroll_offset(requested);
    }
    let current = target.scroll_offset();
    within(current.x, requested.x, tolerance) && within(current.y, requested.y, tolerance)
}
