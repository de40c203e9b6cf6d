//! Adapter utilities for the `windowed` crate.
//!
//! The `windowed` crate is UI-agnostic and owns the core math and state. This crate provides
//! small, framework-neutral helpers commonly needed by hosts:
//!
//! - Scroll anchoring (e.g. prepend in chat/timelines without visual jumps)
//! - An in-memory surface for terminals, servers and tests
//! - A controller with anchored item replacement and tail-following
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod anchor;
mod controller;
mod surface;

#[cfg(test)]
mod tests;

pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::Controller;
pub use surface::HeadlessSurface;
