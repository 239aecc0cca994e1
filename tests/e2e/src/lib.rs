//! Maze End-to-End Testing
//!
//! Drives the maze service worker the way a browser host would: install,
//! activate, then route page fetches through it, against scripted networks
//! and real on-disk cache storage.

#![cfg_attr(not(test), no_std)]
extern crate alloc;

pub mod fixtures;
pub mod harness;


pub use fixtures::{MazeAssets, ScriptedNetwork};
pub use harness::OfflineHarness;
