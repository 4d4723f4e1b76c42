//! Adapter utilities for the `recycler` crate.
//!
//! The `recycler` crate is UI-agnostic and focuses on the core math and
//! state. This crate provides small, framework-neutral helpers commonly
//! needed by adapters:
//!
//! - Velocity tracking for hosts that only report scroll positions
//! - A `Controller` that wires layout, engaged tracking, render-stack
//!   recycling, and viewability together behind one scroll-event API
//!
//! This crate is intentionally framework-agnostic (no UI bindings).
#![forbid(unsafe_code)]

mod controller;
mod velocity;


pub use controller::{Controller, DataSource, ScrollUpdate};
pub use velocity::{MOMENTUM_END_DELAY_MS, VelocityTracker};
