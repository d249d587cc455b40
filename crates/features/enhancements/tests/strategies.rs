mod fixtures;

use fixtures::*;
use tcard_domain::color::Color;
use tcard_domain::constants::{
    ALTERNATE_LINE_SHADING, DYNAMIC_RED_LINE, TIMECARD_TOTALS, WEEKEND_SHADING,
};
use tcard_enhancements::strategy::{AlternateRowShader, BoundaryMarker, WeekendShader};
use tcard_enhancements::*;
use tcard_host::{ElementFixture, HostView, MemoryHost};
use tcard_storage::MemoryStore;

const WEEKEND: &str = "rgb(251,249,248)";
const ALTERNATE: &str = "rgb(245,254,255)";

async fn started(fixture: ElementFixture) -> (MemoryHost, EnhancementManager<MemoryHost, MemoryStore>) {
    let host = MemoryHost::from_fixture(fixture);
    let mut manager = manager_with(&host, &MemoryStore::new());
    let _watcher = manager.init().await;
    (host, manager)
}

#[tokio::test]
async fn totals_sum_into_corner_with_reference_classes() {
    let (host, _manager) = started(grid()).await;
    let corner = id(&host, "timecard-datagrid:bcorner");

    assert_eq!(host.text(corner).as_deref(), Some("5.50 hours"));
    assert_eq!(
        host.classes(corner),
        vec!["oj-datagrid-end-header-cell".to_owned(), "oj-helper-text-align-end".to_owned()]
    );
}

#[tokio::test]
async fn totals_cleanup_clears_text_and_restores_classes() {
    let (host, mut manager) = started(grid()).await;
    manager.set_enhancement_enabled(TIMECARD_TOTALS, false).await.unwrap();

    let corner = id(&host, "timecard-datagrid:bcorner");
    assert_eq!(host.text(corner).as_deref(), Some(""));
    assert_eq!(host.classes(corner), vec!["oj-datagrid-corner".to_owned()]);
}

#[tokio::test]
async fn totals_without_anchors_is_a_no_op() {
    let (host, manager) = started(grid_without_totals()).await;
    assert!(host.element_by_id("timecard-datagrid:bcorner").is_none());
    assert!(manager.enhancement(TIMECARD_TOTALS).unwrap().is_initialized());
}

#[tokio::test]
async fn totals_follow_rerendered_rows() {
    let (mut host, mut manager) = started(grid()).await;
    let rows = id(&host, "timecard-datagrid:rowEndHeader");
    host.replace_children(
        rows,
        ["7.25 hours", "0.5 hours"].map(|t| ElementFixture::new().class("oj-datagrid-end-header-cell").text(t)),
    )
    .unwrap();

    manager.update_all();
    let corner = id(&host, "timecard-datagrid:bcorner");
    assert_eq!(host.text(corner).as_deref(), Some("7.75 hours"));

    // Unchanged totals leave the corner text alone.
    host.set_text(corner, "7.75 hours").unwrap();
    manager.update_all();
    assert_eq!(host.text(corner).as_deref(), Some("7.75 hours"));
}

#[test]
fn weekend_offsets_come_from_header_labels() {
    let host = MemoryHost::from_fixture(grid());
    assert_eq!(WeekendShader::weekend_offsets(&host), vec!["0px".to_owned(), "100px".to_owned()]);
}

#[tokio::test]
async fn weekend_columns_are_shaded_everywhere() {
    let (host, manager) = started(grid()).await;

    for dom_id in ["header-c0", "header-c1", "col-total-0", "col-total-1"] {
        assert_eq!(bg(&host, dom_id).as_deref(), Some(WEEKEND), "{dom_id}");
        assert_eq!(tag(&host, dom_id, "weekend-shaded").as_deref(), Some("true"));
    }
    for row in 0..ROWS {
        assert_eq!(bg(&host, &cell_id(row, 0)).as_deref(), Some(WEEKEND));
        assert_eq!(bg(&host, &cell_id(row, 1)).as_deref(), Some(WEEKEND));
    }
    assert!(bg(&host, "header-c2").is_none());
    assert_eq!(manager.ownership().owned_by(Owner::WEEKEND).len(), 10);
}

#[test]
fn alternate_targets_odd_rows_of_each_pane() {
    let host = MemoryHost::from_fixture(grid());
    let mut expected: Vec<_> = ["row-header-1", "row-total-1", "frozen-r1"]
        .into_iter()
        .map(|dom_id| id(&host, dom_id))
        .collect();
    expected.extend((0..COLUMNS.len()).map(|col| id(&host, &cell_id(1, col))));

    let mut targets = AlternateRowShader::targets(&host);
    targets.sort_unstable();
    expected.sort_unstable();
    assert_eq!(targets, expected);
}

#[tokio::test]
async fn alternate_rows_skip_weekend_cells() {
    let (host, manager) = started(grid()).await;

    assert_eq!(bg(&host, &cell_id(1, 0)).as_deref(), Some(WEEKEND));
    assert!(tag(&host, &cell_id(1, 0), "alternate-rows-shaded").is_none());
    for col in 2..COLUMNS.len() {
        assert_eq!(bg(&host, &cell_id(1, col)).as_deref(), Some(ALTERNATE));
    }
    assert_eq!(bg(&host, "frozen-r1").as_deref(), Some(ALTERNATE));
    assert!(bg(&host, "frozen-r0").is_none());
    assert!(bg(&host, &cell_id(0, 3)).is_none());
    assert_eq!(manager.ownership().owned_by(Owner::ALTERNATE).len(), 8);
}

#[test]
fn boundary_targets_column_before_today() {
    let host = MemoryHost::from_fixture(grid());
    assert_eq!(BoundaryMarker::target_offset(&host, today()).as_deref(), Some("200px"));

    let saturday = chrono::NaiveDate::from_ymd_opt(2025, 8, 2).unwrap();
    assert_eq!(BoundaryMarker::target_offset(&host, saturday), None);

    let off_grid = chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
    assert_eq!(BoundaryMarker::target_offset(&host, off_grid), None);
}

#[tokio::test]
async fn boundary_replaces_static_markers() {
    let (host, _manager) = started(grid()).await;

    for dom_id in ["header-c2", "col-total-2"] {
        assert!(host.has_class(id(&host, dom_id), MARKER), "{dom_id}");
        assert_eq!(tag(&host, dom_id, "dynamic-red-line-active").as_deref(), Some("true"));
    }
    for row in 0..ROWS {
        assert!(host.has_class(id(&host, &cell_id(row, 2)), MARKER));
        assert!(!host.has_class(id(&host, &cell_id(row, 0)), MARKER));
        assert_eq!(tag(&host, &cell_id(row, 0), "dynamic-red-line-removed").as_deref(), Some("true"));
    }
    assert_eq!(
        host.style_sheet("dynamic-red-line-style").as_deref(),
        Some(":root { --oj-palette-danger-rgb-100: 214, 45, 32; }")
    );
}

#[tokio::test]
async fn boundary_pass_is_idempotent() {
    let (host, mut manager) = started(grid()).await;
    let before = host.to_fixture();
    manager.update_all();
    manager.update_all();
    assert_eq!(host.to_fixture(), before);
}

#[tokio::test]
async fn boundary_cleanup_restores_static_markers() {
    let (host, mut manager) = started(grid()).await;
    manager.set_enhancement_enabled(DYNAMIC_RED_LINE, false).await.unwrap();

    for row in 0..ROWS {
        assert!(host.has_class(id(&host, &cell_id(row, 0)), MARKER));
        assert!(!host.has_class(id(&host, &cell_id(row, 2)), MARKER));
        assert!(tag(&host, &cell_id(row, 0), "dynamic-red-line-removed").is_none());
    }
    assert!(host.style_sheet("dynamic-red-line-style").is_none());
}

#[tokio::test]
async fn boundary_without_match_leaves_static_markers() {
    let host = MemoryHost::from_fixture(grid());
    let mut manager = EnhancementManager::with_builtin(
        host.clone(),
        MemoryStore::new(),
        std::sync::Arc::new(tcard_kernel::clock::FixedClock(
            chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
        )),
        tcard_kernel::domain::config::TimingConfig::default(),
    );
    let _watcher = manager.init().await;

    assert!(host.has_class(id(&host, "header-c0"), MARKER));
    assert!(tag(&host, "header-c0", "dynamic-red-line-removed").is_none());
    assert!(host.select(&tcard_host::Selector::tagged("dynamic-red-line-active", "true")).is_empty());
}

#[tokio::test]
async fn boundary_follows_the_clock_between_passes() {
    let host = MemoryHost::from_fixture(grid());
    let clock = MovableClock::new(today());
    let mut manager = EnhancementManager::with_builtin(
        host.clone(),
        MemoryStore::new(),
        std::sync::Arc::new(clock.clone()),
        tcard_kernel::domain::config::TimingConfig::default(),
    );
    let _watcher = manager.init().await;
    let active = tcard_host::Selector::tagged("dynamic-red-line-active", "true");
    assert!(host.has_class(id(&host, "header-c2"), MARKER));
    assert!(!host.has_class(id(&host, "header-c0"), MARKER));

    // Thursday: the line moves in front of the Thursday column.
    clock.set(chrono::NaiveDate::from_ymd_opt(2025, 8, 7).unwrap());
    manager.update_all();
    assert!(host.has_class(id(&host, "header-c4"), MARKER));
    assert!(!host.has_class(id(&host, "header-c2"), MARKER));
    assert_eq!(host.select(&active).len(), 5);

    // Today is no longer on the grid: no line, static week markers are back.
    clock.set(chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
    manager.update_all();
    assert!(host.select(&active).is_empty());
    assert!(!host.has_class(id(&host, "header-c4"), MARKER));
    for dom_id in ["header-c0", cell_id(0, 0).as_str(), cell_id(2, 0).as_str()] {
        assert!(host.has_class(id(&host, dom_id), MARKER), "{dom_id}");
        assert!(tag(&host, dom_id, "dynamic-red-line-removed").is_none(), "{dom_id}");
    }

    clock.set(today());
    manager.update_all();
    assert!(host.has_class(id(&host, "header-c2"), MARKER));
    assert!(!host.has_class(id(&host, "header-c0"), MARKER));
}

#[tokio::test]
async fn colors_apply_immediately_when_enabled() {
    let (host, mut manager) = started(grid()).await;

    manager
        .set_color(tcard_domain::preferences::ColorSlot::AlternateRow, Color::rgb(0, 0, 255))
        .await
        .unwrap();
    assert_eq!(bg(&host, &cell_id(1, 3)).as_deref(), Some("rgb(0,0,255)"));
    // Weekend precedence survives the reclaim.
    assert_eq!(bg(&host, &cell_id(1, 0)).as_deref(), Some(WEEKEND));

    manager
        .set_color(tcard_domain::preferences::ColorSlot::BoundaryMarker, Color::rgb(1, 2, 3))
        .await
        .unwrap();
    assert_eq!(
        host.style_sheet("dynamic-red-line-style").as_deref(),
        Some(":root { --oj-palette-danger-rgb-100: 1, 2, 3; }")
    );

    manager.set_enhancement_enabled(WEEKEND_SHADING, false).await.unwrap();
    manager
        .set_color(tcard_domain::preferences::ColorSlot::Weekend, Color::rgb(9, 9, 9))
        .await
        .unwrap();
    assert!(tag(&host, "header-c0", "weekend-shaded").is_none());
    assert_eq!(
        manager.enhancement(WEEKEND_SHADING).unwrap().color(),
        Some(Color::rgb(9, 9, 9))
    );
    assert!(manager.enhancement(ALTERNATE_LINE_SHADING).unwrap().is_active());
}
