#![allow(dead_code)]

use chrono::NaiveDate;
use std::sync::Arc;
use tcard_enhancements::EnhancementManager;
use tcard_host::{ElementFixture, ElementId, HostView, MemoryHost};
use parking_lot::Mutex;
use tcard_kernel::clock::{Clock, FixedClock};
use tcard_kernel::domain::config::TimingConfig;
use tcard_storage::MemoryStore;

/// Column labels and their `left` offsets. Saturday and Sunday lead the week.
pub const COLUMNS: [(&str, &str); 7] = [
    ("Sat,Aug 02", "0px"),
    ("Sun,Aug 03", "100px"),
    ("Mon,Aug 04", "200px"),
    ("Tue,Aug 05", "300px"),
    ("Wed,Aug 06", "400px"),
    ("Thu,Aug 07", "500px"),
    ("Fri,Aug 08", "600px"),
];
pub const ROWS: usize = 3;
pub const ROW_TOTALS: [&str; ROWS] = ["4.5 hours", "1 hour", "0 hours"];
pub const MARKER: &str = "oj-fa-time-hcm-dg-weekstart-border";
pub const BG: &str = "background-color";
/// Inline background of the body cell at row 1, Saturday.
pub const PRESET_BG: &str = "rgb(1,2,3)";

/// Tuesday, Aug 5 2025: the boundary belongs before the Tuesday column.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 5).unwrap()
}

/// A clock the test can move between passes. Clones share the date.
#[derive(Debug, Clone)]
pub struct MovableClock(Arc<Mutex<NaiveDate>>);

impl MovableClock {
    pub fn new(date: NaiveDate) -> Self {
        Self(Arc::new(Mutex::new(date)))
    }

    pub fn set(&self, date: NaiveDate) {
        *self.0.lock() = date;
    }
}

impl Clock for MovableClock {
    fn today(&self) -> NaiveDate {
        *self.0.lock()
    }
}

pub fn cell_id(row: usize, col: usize) -> String {
    format!("cell-r{row}-c{col}")
}

fn header_row() -> ElementFixture {
    let frozen = ElementFixture::new()
        .class("oj-datagrid-column-header-frozen")
        .child(ElementFixture::new().class("oj-datagrid-column-header-cell").text("Project"));
    let dates = COLUMNS.iter().enumerate().map(|(col, (label, left))| {
        let cell = ElementFixture::new()
            .id(format!("header-c{col}"))
            .class("oj-datagrid-column-header-cell")
            .style("left", left)
            .text(*label);
        if col == 0 { cell.class(MARKER) } else { cell }
    });
    ElementFixture::new().class("oj-datagrid-column-header").child(frozen).children(dates)
}

fn row_headers() -> ElementFixture {
    ElementFixture::new().class("oj-datagrid-row-header").children(
        (0..ROWS).map(|row| {
            ElementFixture::new()
                .id(format!("row-header-{row}"))
                .class("oj-datagrid-row-header-cell")
                .text((row + 1).to_string())
        }),
    )
}

fn row_end_headers() -> ElementFixture {
    ElementFixture::new().id("timecard-datagrid:rowEndHeader").children(ROW_TOTALS.iter().enumerate().map(
        |(row, total)| {
            ElementFixture::new()
                .id(format!("row-total-{row}"))
                .class("oj-datagrid-end-header-cell oj-datagrid-row-end-header-cell")
                .text(*total)
        },
    ))
}

fn frozen_body() -> ElementFixture {
    ElementFixture::new().class("oj-datagrid-frozen-body").children((0..ROWS).map(|row| {
        ElementFixture::new()
            .id(format!("frozen-r{row}"))
            .class("oj-datagrid-cell oj-datagrid-cell-frozen")
            .text("Project A")
    }))
}

pub fn body_cells() -> Vec<ElementFixture> {
    (0..ROWS)
        .flat_map(|row| {
            COLUMNS.iter().enumerate().map(move |(col, (_, left))| {
                let mut cell = ElementFixture::new()
                    .id(cell_id(row, col))
                    .class("oj-datagrid-cell")
                    .style("left", left)
                    .text("8");
                if col == 0 {
                    cell = cell.class(MARKER);
                }
                if row == 1 && col == 0 {
                    cell = cell.style(BG, PRESET_BG);
                }
                cell
            })
        })
        .collect()
}

fn column_end_headers() -> ElementFixture {
    let totals = COLUMNS.iter().enumerate().map(|(col, (_, left))| {
        ElementFixture::new()
            .id(format!("col-total-{col}"))
            .class("oj-datagrid-column-end-header-cell")
            .style("left", left)
            .text("8")
    });
    ElementFixture::new().class("oj-datagrid-column-end-header").children(totals)
}

fn column_end_reference() -> ElementFixture {
    ElementFixture::new().id("timecard-datagrid:columnEndHeader").child(
        ElementFixture::new().class("oj-datagrid-end-header-cell oj-helper-text-align-end").text("Total"),
    )
}

pub fn grid() -> ElementFixture {
    ElementFixture::new()
        .id("timecard-datagrid")
        .child(header_row())
        .child(row_headers())
        .child(row_end_headers())
        .child(frozen_body())
        .child(
            ElementFixture::new()
                .id("databody")
                .class("oj-datagrid-databody")
                .children(body_cells()),
        )
        .child(column_end_headers())
        .child(column_end_reference())
        .child(ElementFixture::new().id("timecard-datagrid:bcorner").class("oj-datagrid-corner"))
}

/// Same grid without the totals anchors, so passes never rewrite text.
pub fn grid_without_totals() -> ElementFixture {
    let mut fixture = grid();
    fixture.children.retain(|child| {
        !child.id.as_deref().is_some_and(|id| id.starts_with("timecard-datagrid:"))
    });
    fixture
}

pub fn manager_with(
    host: &MemoryHost,
    store: &MemoryStore,
) -> EnhancementManager<MemoryHost, MemoryStore> {
    EnhancementManager::with_builtin(
        host.clone(),
        store.clone(),
        Arc::new(FixedClock(today())),
        TimingConfig::default(),
    )
}

pub fn id(host: &MemoryHost, dom_id: &str) -> ElementId {
    host.element_by_id(dom_id).unwrap_or_else(|| panic!("missing element {dom_id}"))
}

pub fn bg(host: &MemoryHost, dom_id: &str) -> Option<String> {
    host.style(id(host, dom_id), BG)
}

pub fn tag(host: &MemoryHost, dom_id: &str, key: &str) -> Option<String> {
    host.tag(id(host, dom_id), key)
}
