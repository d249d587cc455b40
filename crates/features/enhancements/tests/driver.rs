mod fixtures;

use fixtures::*;
use serde_json::json;
use std::time::Duration;
use tcard_domain::constants::WEEKEND_SHADING;
use tcard_domain::protocol::Response;
use tcard_enhancements::{Driver, DriverHandle, EnhancementManager, OverlayError, PassCounter};
use tcard_host::{ElementFixture, MemoryHost};
use tcard_storage::MemoryStore;
use tokio::task::JoinHandle;
use tokio::time::sleep;

type Served = JoinHandle<EnhancementManager<MemoryHost, MemoryStore>>;

/// Starts a driver over a grid whose passes never write text, so the pass count only
/// reflects host signals.
async fn start() -> (MemoryHost, DriverHandle, PassCounter, Served) {
    let host = MemoryHost::from_fixture(grid_without_totals());
    let manager = manager_with(&host, &MemoryStore::new());
    let passes = manager.pass_counter();
    let (driver, handle) = Driver::new(manager, 8);
    let served = tokio::spawn(driver.run());

    // The first answer proves init has run and the watcher is installed.
    let response = handle.request(json!({ "action": "getEnhancements" })).await.unwrap();
    assert!(response.is_success());
    (host, handle, passes, served)
}

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

#[tokio::test(start_paused = true)]
async fn burst_of_signals_runs_one_pass_after_quiet_window() {
    let (host, handle, passes, served) = start().await;

    for _ in 0..20 {
        host.append(host.root(), ElementFixture::new().class("oj-datagrid-cell")).unwrap();
        sleep(ms(10)).await;
    }
    // The last signal fired 10ms ago.
    sleep(ms(230)).await;
    assert_eq!(passes.get(), 0);

    sleep(ms(20)).await;
    assert_eq!(passes.get(), 1);

    sleep(ms(1_000)).await;
    assert_eq!(passes.get(), 1);

    handle.shutdown().await.unwrap();
    served.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn load_notification_schedules_one_delayed_pass() {
    let (host, handle, passes, served) = start().await;

    host.finish_load();
    sleep(ms(490)).await;
    assert_eq!(passes.get(), 0);

    sleep(ms(20)).await;
    assert_eq!(passes.get(), 1);

    host.finish_load();
    sleep(ms(1_000)).await;
    assert_eq!(passes.get(), 1);

    handle.shutdown().await.unwrap();
    served.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shading_toggle_coordinates_after_settle_delay() {
    let (host, handle, passes, served) = start().await;
    let shared = cell_id(1, 0);
    assert_eq!(bg(&host, &shared).as_deref(), Some("rgb(251,249,248)"));

    let response = handle
        .request(json!({ "action": "toggleEnhancement", "name": WEEKEND_SHADING, "enabled": false }))
        .await
        .unwrap();
    assert_eq!(response, Response::ok());
    assert_eq!(bg(&host, &shared).as_deref(), Some(PRESET_BG));

    sleep(ms(140)).await;
    assert_eq!(bg(&host, &shared).as_deref(), Some(PRESET_BG));

    sleep(ms(20)).await;
    assert_eq!(bg(&host, &shared).as_deref(), Some("rgb(245,254,255)"));
    assert_eq!(passes.get(), 0);

    handle.shutdown().await.unwrap();
    served.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn requests_are_answered_with_structured_responses() {
    let (host, handle, _passes, served) = start().await;

    let Response::Enhancements { enhancements } =
        handle.request(json!({ "action": "getEnhancements" })).await.unwrap()
    else {
        panic!("expected the enhancement list");
    };
    assert_eq!(enhancements.len(), 4);

    let unknown = handle.request(json!({ "action": "selfDestruct" })).await.unwrap();
    assert_eq!(unknown, Response::unknown_action());
    let missing = handle.request(json!({ "name": WEEKEND_SHADING })).await.unwrap();
    assert_eq!(missing, Response::unknown_action());

    let not_found = handle
        .request(json!({ "action": "toggleEnhancement", "name": "sparkles", "enabled": true }))
        .await
        .unwrap();
    assert_eq!(not_found, Response::failure("Enhancement 'sparkles' not found"));

    let malformed = handle
        .request(json!({ "action": "toggleEnhancement", "name": WEEKEND_SHADING }))
        .await
        .unwrap();
    let Response::Status { success: false, error: Some(error), .. } = malformed else {
        panic!("expected a failure");
    };
    assert!(error.starts_with("Invalid request"), "{error}");

    let bad_color =
        handle.request(json!({ "action": "updateWeekendColor", "color": "blue" })).await.unwrap();
    let Response::Status { success: false, error: Some(error), .. } = bad_color else {
        panic!("expected a failure");
    };
    assert!(error.contains("Invalid color 'blue'"), "{error}");

    let recolor = handle
        .request(json!({ "action": "updateWeekendColor", "color": "#102030" }))
        .await
        .unwrap();
    assert_eq!(serde_json::to_value(&recolor).unwrap(), json!({ "success": true }));
    assert_eq!(bg(&host, "header-c0").as_deref(), Some("rgb(16,32,48)"));

    handle.shutdown().await.unwrap();
    served.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn shutdown_cleans_up_and_stops_serving() {
    let (host, handle, _passes, served) = start().await;

    handle.shutdown().await.unwrap();
    let manager = served.await.unwrap();
    assert!(!manager.is_initialized());
    assert!(manager.ownership().is_empty());
    assert_eq!(bg(&host, &cell_id(1, 0)).as_deref(), Some(PRESET_BG));

    let err = handle.request(json!({ "action": "getEnhancements" })).await.unwrap_err();
    assert!(matches!(err, OverlayError::Stopped { .. }));
}

#[tokio::test(start_paused = true)]
async fn dropping_every_handle_stops_the_driver() {
    let (host, handle, _passes, served) = start().await;
    drop(handle);

    let manager = served.await.unwrap();
    assert!(!manager.is_initialized());
    assert!(host.style_sheet("dynamic-red-line-style").is_none());
}
