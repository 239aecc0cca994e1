//! Test fixtures and data factories
//!
//! The maze page's assets and a scripted network that records every call.

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use maze_sw::{Network, NetworkError, Request, Response};
use spin::{Mutex, RwLock};

/// Maze page assets
pub struct MazeAssets;

impl MazeAssets {
    /// The game page
    pub fn index_html() -> Response {
        Response::new(200)
            .with_url("/index.html")
            .with_header("Content-Type", "text/html")
            .with_body(
                r#"<!DOCTYPE html>
<html>
<head>
    <title>Maze</title>
    <link rel="manifest" href="./manifest.json">
</head>
<body>
    <canvas id="maze" width="480" height="480"></canvas>
    <script>navigator.serviceWorker.register('./sw.js');</script>
</body>
</html>"#
                    .as_bytes()
                    .to_vec(),
            )
    }

    /// The web app manifest
    pub fn manifest_json() -> Response {
        Response::new(200)
            .with_url("/manifest.json")
            .with_header("Content-Type", "application/manifest+json")
            .with_body(
                r#"{"name":"Maze","short_name":"Maze","start_url":"./index.html","display":"standalone"}"#
                    .as_bytes()
                    .to_vec(),
            )
    }

    /// An image that is never pre-cached
    pub fn other_png() -> Response {
        Response::new(200)
            .with_url("/other.png")
            .with_header("Content-Type", "image/png")
            .with_body(alloc::vec![0x89, b'P', b'N', b'G'])
    }
}

/// Network answering from a route table.
///
/// Unknown URLs get a 404. While offline every call fails, but it is
/// still recorded.
pub struct ScriptedNetwork {
    routes: RwLock<BTreeMap<String, Result<Response, NetworkError>>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    /// Empty route table
    pub fn new() -> Self {
        Self {
            routes: RwLock::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
        }
    }

    /// Routes for the maze page and its assets
    pub fn maze() -> Self {
        let net = Self::new();
        net.route("/index.html", Ok(MazeAssets::index_html()));
        net.route("/manifest.json", Ok(MazeAssets::manifest_json()));
        net.route("/other.png", Ok(MazeAssets::other_png()));
        net
    }

    /// Set the outcome for a URL
    pub fn route(&self, url: &str, outcome: Result<Response, NetworkError>) {
        self.routes.write().insert(url.to_string(), outcome);
    }

    /// Toggle connectivity
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// URLs requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Number of requests so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Forget recorded calls
    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

impl Default for ScriptedNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl Network for ScriptedNetwork {
    fn fetch(&self, request: &Request) -> Result<Response, NetworkError> {
        self.calls.lock().push(request.url.clone());
        if self.offline.load(Ordering::SeqCst) {
            return Err(NetworkError::Offline);
        }
        match self.routes.read().get(&request.url) {
            Some(outcome) => outcome.clone(),
            None => Ok(Response::new(404).with_url(request.url.clone())),
        }
    }
}
