//! Frame loop and map streaming for a networked, tile-based world client.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

#[cfg_attr(coverage_nightly, coverage(off))]
pub mod app;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod error;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod formatter;
#[cfg_attr(coverage_nightly, coverage(off))]
pub mod logging;

pub mod audio;
pub mod clock;
pub mod config;
pub mod constants;
pub mod entity;
pub mod events;
pub mod game;
pub mod holds;
pub mod map;
pub mod platform;
pub mod session;
pub mod state;
pub mod world_time;
