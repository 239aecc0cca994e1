//! E2E Test: Offline Capability
//!
//! 1. Install the worker (pre-cache index + manifest)
//! 2. Activate it
//! 3. Serve cached assets without the network
//! 4. Send everything else to the network, untouched

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    use maze_sw::{
        Cache, CacheError, FetchError, InstallError, NetworkError, Request, Response,
        ServiceWorkerError, WorkerState,
    };

    use crate::fixtures::{MazeAssets, ScriptedNetwork};
    use crate::harness::OfflineHarness;

    fn installed() -> OfflineHarness {
        let mut harness = OfflineHarness::new(ScriptedNetwork::maze()).unwrap();
        harness.install_and_activate().unwrap();
        harness.network.reset_calls();
        harness
    }

    #[test]
    fn scenario_a_install_seeds_exactly_two_entries() {
        let mut harness = OfflineHarness::new(ScriptedNetwork::maze()).unwrap();
        harness.install_and_activate().unwrap();

        let cache = harness.cache().unwrap();
        assert_eq!(cache.len(), 2);
        assert!(cache.match_request(&Request::new("/index.html")).is_some());
        assert!(cache.match_request(&Request::new("/manifest.json")).is_some());
        assert_eq!(harness.network.calls(), ["/index.html", "/manifest.json"]);
        assert_eq!(harness.worker.state(), WorkerState::Activated);
    }

    #[test]
    fn scenario_b_cached_index_needs_no_network() {
        let harness = installed();
        let resp = harness.worker.fetch(Request::new("./index.html")).unwrap();
        assert_eq!(resp, MazeAssets::index_html());
        assert_eq!(harness.network.call_count(), 0);
    }

    #[test]
    fn scenario_c_uncached_asset_fetched_once_verbatim() {
        let harness = installed();
        let resp = harness.worker.fetch(Request::new("./other.png")).unwrap();
        assert_eq!(resp, MazeAssets::other_png());
        assert_eq!(harness.network.calls(), ["/other.png"]);
        // Misses are not written back.
        assert_eq!(harness.cache().unwrap().len(), 2);
    }

    #[test]
    fn scenario_d_missing_manifest_rejects_install() {
        let network = ScriptedNetwork::maze();
        network.route("/manifest.json", Ok(Response::new(404)));
        let mut harness = OfflineHarness::new(network).unwrap();

        let err = harness.install_and_activate().unwrap_err();
        assert_eq!(
            err,
            ServiceWorkerError::Install(InstallError::Batch(CacheError::BadStatus {
                url: String::from("/manifest.json"),
                status: 404,
            }))
        );
        assert_eq!(harness.worker.state(), WorkerState::Redundant);
        assert!(harness.cache().unwrap().is_empty());
    }

    #[test]
    fn unreachable_asset_rejects_install() {
        let network = ScriptedNetwork::maze();
        network.route(
            "/index.html",
            Err(NetworkError::Unreachable(String::from("maze.example"))),
        );
        let mut harness = OfflineHarness::new(network).unwrap();
        assert!(matches!(
            harness.install_and_activate(),
            Err(ServiceWorkerError::Install(InstallError::Batch(CacheError::Network { .. })))
        ));
    }

    #[test]
    fn host_retry_succeeds_once_asset_is_back() {
        let network = ScriptedNetwork::maze();
        network.route("/manifest.json", Ok(Response::new(503)));
        let mut harness = OfflineHarness::new(network).unwrap();
        assert!(harness.worker.install().is_err());

        harness
            .network
            .route("/manifest.json", Ok(MazeAssets::manifest_json()));
        harness.worker.retry_install().unwrap();
        harness.worker.activate().unwrap();
        assert_eq!(harness.cache().unwrap().len(), 2);
    }

    #[test]
    fn offline_page_still_loads_cached_assets() {
        let harness = installed();
        harness.network.set_offline(true);

        assert!(harness.worker.fetch(Request::new("/index.html")).is_ok());
        assert!(harness.worker.fetch(Request::new("./manifest.json")).is_ok());
        assert_eq!(harness.network.call_count(), 0);
    }

    #[test]
    fn offline_miss_fails_the_load() {
        let harness = installed();
        harness.network.set_offline(true);

        let result = harness.worker.fetch(Request::new("./other.png"));
        assert_eq!(result, Err(FetchError::Network(NetworkError::Offline)));
        assert_eq!(harness.network.call_count(), 1);
    }

    #[test]
    fn miss_with_error_status_is_returned_as_is() {
        let harness = installed();
        let resp = harness.worker.fetch(Request::new("/nope.js")).unwrap();
        assert_eq!(resp.status, 404);
        assert_eq!(harness.network.call_count(), 1);
    }

    #[test]
    fn fetch_before_install_completes_uses_network() {
        let harness = OfflineHarness::new(ScriptedNetwork::maze()).unwrap();
        let handler = harness.handler();
        let resp = handler.handle_fetch(&Request::new("./index.html")).unwrap();
        assert!(resp.ok());
        assert_eq!(harness.network.call_count(), 1);
    }

    #[test]
    fn concurrent_fetches_share_the_cache() {
        let harness = installed();
        let handler = Arc::new(harness.handler());

        let threads: Vec<_> = (0..8)
            .map(|i| {
                let handler = handler.clone();
                std::thread::spawn(move || {
                    let url = if i % 2 == 0 { "./index.html" } else { "./manifest.json" };
                    handler.handle_fetch(&Request::new(url)).map(|r| r.status)
                })
            })
            .collect();

        for t in threads {
            assert_eq!(t.join().unwrap(), Ok(200));
        }
        assert_eq!(harness.network.call_count(), 0);
    }
}
