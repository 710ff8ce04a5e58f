//! View-layer bindings for the `scroll-restore` crate.
//!
//! The `scroll-restore` crate is UI-agnostic and owns the restoration state. This crate
//! provides the small pieces a view layer usually needs around it:
//!
//! - [`WindowScroller`] / [`ElementScroller`]: mount/update/unmount bindings for the viewport
//!   and keyed scroll containers
//! - [`ListenableHistory`] and [`bind_history`]: forwarding history notifications into a
//!   shared manager
//! - [`MemoryHistory`]: an in-memory history stack
//!
//! The manager is always passed in explicitly; nothing is looked up from ambient context.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod element;
mod history;
mod window;

#[cfg(test)]
mod tests;

pub use element::ElementScroller;
pub use history::{
    HistoryBinding, HistoryListener, ListenableHistory, ListenerId, MemoryHistory,
    SharedManager, bind_history,
};
pub use window::WindowScroller;
