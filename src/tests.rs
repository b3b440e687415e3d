use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::domain::column::{
    document_columns, effective_order, fixed_columns, propose_reorder, reorder_visible,
    ColumnSpec, ReorderRejected, ACTIONS_COLUMN, SELECT_COLUMN,
};
use crate::domain::date_range::{match_preset, row_in_range, DatePreset, DateRangePicker};
use crate::domain::entities::document::{
    AssignmentRequest, DashboardCounts, Document, DocumentId, ReviewSubmission, Stage, User,
    UserId, UserRole,
};
use crate::domain::entities::table_state::{
    ColumnFilter, ColumnId, DateRange, FilterState, FilterValue, Pagination, RouteKey, RowId,
    SortSpec, TableViewState,
};
use crate::infra::export::csv::{export_file_name, write_csv_file};
use crate::infra::http::client::HttpDocumentApi;
use crate::infra::sqlite::repo::SqlitePrefsRepo;
use crate::infra::sqlite::schema::init_db;
use crate::usecase::grid::{
    compare_cells, cycle_sort, document_grid, with_column_filter, ExportOptions, GridController,
    TableGrid,
};
use crate::usecase::ports::api::{ApiError, DocumentApi};
use crate::usecase::ports::prefs::ViewPrefsRepository;
use crate::usecase::services::assignment_service::{
    AssignError, AssignOutcome, AssignmentCoordinator, FlightKey,
};
use crate::usecase::services::prefs_service::ViewPrefsService;
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::review_service::{
    normalize_codes, ReviewError, ReviewForm, ReviewService,
};
use crate::usecase::services::table_state_store::TableViewStore;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("chart-audit-{prefix}-{nanos}"))
}

fn day(year: i32, month: u32, date: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, date).expect("valid test date")
}

fn ids(raw: &[&str]) -> Vec<ColumnId> {
    raw.iter().map(|id| ColumnId::from(*id)).collect()
}

fn doc(id: i64, file_name: &str, page_count: u32, received_date: &str) -> Document {
    Document {
        id: DocumentId(id),
        file_name: file_name.to_string(),
        project: "ACA".to_string(),
        page_count,
        received_date: received_date.to_string(),
        assigned_to: None,
        auditor: None,
        hcc_codes: Vec::new(),
    }
}

#[derive(Debug, Clone)]
struct Item {
    id: i64,
    title: String,
}

type ItemColumn = ColumnSpec<Item>;

fn item_grid() -> TableGrid<Item> {
    TableGrid::new(
        vec![
            ItemColumn::utility(SELECT_COLUMN, ""),
            ItemColumn::data("id", "id", |item: &Item| item.id.to_string()),
            ItemColumn::data("title", "title", |item: &Item| item.title.clone()),
            ItemColumn::utility(ACTIONS_COLUMN, "Actions"),
        ],
        |item: &Item| RowId::from(item.id),
    )
}

fn items(count: i64) -> Vec<Item> {
    (1..=count)
        .map(|id| Item {
            id,
            title: format!("item {id}"),
        })
        .collect()
}

#[derive(Default)]
struct FakeApi {
    documents: BTreeMap<Stage, Vec<Document>>,
    counts: DashboardCounts,
    fail_assign: bool,
    fail_fetch: bool,
    coordinator: Option<Arc<AssignmentCoordinator>>,
    assign_requests: Mutex<Vec<AssignmentRequest>>,
    in_flight_during_assign: Mutex<Vec<bool>>,
    auto_assign_calls: Mutex<Vec<UserId>>,
    reviews: Mutex<Vec<ReviewSubmission>>,
    fetched: Mutex<Vec<Stage>>,
}

impl DocumentApi for FakeApi {
    fn fetch_documents(&self, stage: Stage) -> Result<Vec<Document>, ApiError> {
        self.fetched.lock().expect("lock").push(stage);
        if self.fail_fetch {
            return Err(ApiError::Network("connection reset".to_string()));
        }
        Ok(self.documents.get(&stage).cloned().unwrap_or_default())
    }

    fn fetch_users(&self, role: Option<UserRole>) -> Result<Vec<User>, ApiError> {
        let users = vec![
            User {
                id: UserId(7),
                name: "Ana".to_string(),
                role: UserRole::Analyst,
            },
            User {
                id: UserId(9),
                name: "Ravi".to_string(),
                role: UserRole::Auditor,
            },
        ];
        Ok(users
            .into_iter()
            .filter(|user| role.map_or(true, |role| user.role == role))
            .collect())
    }

    fn fetch_dashboard_counts(&self) -> Result<DashboardCounts, ApiError> {
        Ok(self.counts)
    }

    fn assign_documents(&self, request: &AssignmentRequest) -> Result<(), ApiError> {
        if let Some(coordinator) = &self.coordinator {
            self.in_flight_during_assign
                .lock()
                .expect("lock")
                .push(coordinator.is_in_flight(FlightKey::Assign(request.stage)));
        }
        self.assign_requests.lock().expect("lock").push(request.clone());
        if self.fail_assign {
            return Err(ApiError::Status(500, "boom".to_string()));
        }
        Ok(())
    }

    fn auto_assign(&self, requesting_user_id: UserId) -> Result<(), ApiError> {
        self.auto_assign_calls
            .lock()
            .expect("lock")
            .push(requesting_user_id);
        Ok(())
    }

    fn submit_review(&self, review: &ReviewSubmission) -> Result<(), ApiError> {
        self.reviews.lock().expect("lock").push(review.clone());
        Ok(())
    }
}

fn select_rows(store: &mut TableViewStore, stage: Stage, rows: &[i64]) {
    store.set_selection(
        &RouteKey::for_stage(stage),
        rows.iter().map(|id| RowId::from(*id)).collect(),
    );
}

#[test]
fn route_key_concatenates_segments() {
    assert_eq!(
        RouteKey::from_segments(&["documents", "pending"]).as_str(),
        "documentspending"
    );
    assert_eq!(
        RouteKey::for_stage(Stage::Audit),
        RouteKey::from_segments(&["documents", "audit"])
    );
}

#[test]
fn get_or_init_creates_default_state_once() {
    let mut store = TableViewStore::new(25);
    let route = RouteKey::for_stage(Stage::Pending);

    assert!(store.get_state(&route).is_none());
    store.get_or_init(&route).pagination.page_index = 3;

    let state = store.get_or_init(&route);
    assert_eq!(state.pagination.page_index, 3);
    assert_eq!(state.pagination.page_size, 25);
}

#[test]
fn setters_only_touch_their_field_group() {
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Pending);
    store.set_pagination(&route, Pagination { page_index: 2, page_size: 50 });
    select_rows(&mut store, Stage::Pending, &[1, 2]);
    store.set_column_order(&route, ids(&["select", "project", "id"]));

    store.set_filters(
        &route,
        FilterState {
            sorting: vec![SortSpec {
                column_id: ColumnId::from("project"),
                descending: true,
            }],
            ..FilterState::default()
        },
    );

    let state = store.snapshot(&route);
    assert_eq!(state.pagination, Pagination { page_index: 2, page_size: 50 });
    assert_eq!(state.selected_row_ids, vec![RowId::from(1), RowId::from(2)]);
    assert_eq!(state.column_order, ids(&["select", "project", "id"]));
    assert_eq!(state.sorting.len(), 1);
}

#[test]
fn set_selection_drops_duplicates() {
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Pending);
    store.set_selection(
        &route,
        vec![RowId::from(4), RowId::from(2), RowId::from(4)],
    );
    assert_eq!(store.selection(&route), &[RowId::from(4), RowId::from(2)]);

    store.toggle_row(&route, RowId::from(4));
    store.toggle_row(&route, RowId::from(9));
    assert_eq!(store.selection(&route), &[RowId::from(2), RowId::from(9)]);
}

#[test]
fn clear_twice_matches_never_visited_route() {
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Assigned);
    store.set_filters(
        &route,
        FilterState {
            date_range: DateRange::new(day(2024, 1, 1), day(2024, 1, 31)),
            ..FilterState::default()
        },
    );
    select_rows(&mut store, Stage::Assigned, &[5]);

    store.clear(&route);
    let first = store.snapshot(&route);
    store.clear(&route);
    let second = store.snapshot(&route);

    assert_eq!(first, second);
    assert_eq!(first, store.snapshot(&RouteKey::from_segments(&["never", "seen"])));
    assert_eq!(first, store.default_state());
}

#[test]
fn selection_is_isolated_per_stage() {
    let mut store = TableViewStore::new(10);
    select_rows(&mut store, Stage::Pending, &[1, 2, 3]);

    assert!(store.selection(&RouteKey::for_stage(Stage::Assigned)).is_empty());
    assert!(store.selection(&RouteKey::for_stage(Stage::Audit)).is_empty());

    select_rows(&mut store, Stage::Audit, &[8]);
    assert_eq!(
        store.selection(&RouteKey::for_stage(Stage::Pending)).len(),
        3
    );
}

#[test]
fn render_clamps_page_after_filter_shrinks_rows() {
    let grid = item_grid();
    let rows = items(25);
    let route = RouteKey::from_segments(&["items"]);
    let mut store = TableViewStore::new(10);
    let controller = GridController::new(&grid, route.clone());

    controller.go_to_page(&mut store, 2);
    let projection = controller.render(&mut store, &rows);
    assert_eq!(projection.pagination.page_index, 2);
    assert_eq!(projection.rows.len(), 5);

    // "item 1" matches item 1 and items 10..=19: 11 rows, two pages.
    store.set_filters(
        &route,
        FilterState {
            column_filters: vec![ColumnFilter {
                column_id: ColumnId::from("title"),
                value: FilterValue::Text("item 1".to_string()),
            }],
            ..FilterState::default()
        },
    );
    assert_eq!(
        controller.clamp_target(&store, &rows),
        Some(Pagination { page_index: 1, page_size: 10 })
    );
    let projection = controller.render(&mut store, &rows);
    assert_eq!(projection.total_rows, 11);
    assert_eq!(projection.pagination.page_index, 1);
    assert_eq!(store.snapshot(&route).pagination.page_index, 1);
    assert_eq!(controller.clamp_target(&store, &rows), None);
}

#[test]
fn render_with_no_rows_stays_on_first_page() {
    let grid = item_grid();
    let route = RouteKey::from_segments(&["items"]);
    let mut store = TableViewStore::new(10);
    let controller = GridController::new(&grid, route.clone());
    controller.go_to_page(&mut store, 4);

    let projection = controller.render(&mut store, &[]);

    assert!(projection.is_empty());
    assert_eq!(projection.pagination.page_index, 0);
    assert_eq!(projection.page_count, 0);
}

#[test]
fn reorder_rejects_moves_across_fixed_columns() {
    let order = ids(&["A", "B", "C", "D"]);
    let fixed = ids(&["A", "C"]).into_iter().collect();

    let crossing = propose_reorder(&order, &fixed, 3, 1);
    assert_eq!(crossing, Err(ReorderRejected::BlockedBy(ColumnId::from("C"))));

    let adjacent = propose_reorder(&order, &fixed, 3, 2).expect("move next to B");
    assert_eq!(adjacent, ids(&["A", "B", "D", "C"]));

    assert_eq!(
        propose_reorder(&order, &fixed, 0, 1),
        Err(ReorderRejected::FixedColumn(ColumnId::from("A")))
    );
    assert_eq!(
        propose_reorder(&order, &fixed, 1, 9),
        Err(ReorderRejected::OutOfRange)
    );
    assert_eq!(propose_reorder(&order, &fixed, 1, 1), Ok(order.clone()));
}

#[test]
fn reorder_visible_keeps_hidden_column_slots() {
    let order = ids(&["select", "a", "hidden", "b", "c"]);
    let visibility = BTreeMap::from([(ColumnId::from("hidden"), false)]);
    let fixed = ids(&["select"]).into_iter().collect();

    let next = reorder_visible(
        &order,
        &visibility,
        &fixed,
        &ColumnId::from("c"),
        &ColumnId::from("a"),
    )
    .expect("move c to the front of the data columns");

    assert_eq!(next, ids(&["select", "c", "hidden", "a", "b"]));
    assert_eq!(
        reorder_visible(
            &order,
            &visibility,
            &fixed,
            &ColumnId::from("hidden"),
            &ColumnId::from("a"),
        ),
        Err(ReorderRejected::UnknownColumn(ColumnId::from("hidden")))
    );
}

#[test]
fn rejected_reorder_leaves_store_untouched() {
    let grid = document_grid(100);
    let route = RouteKey::for_stage(Stage::Pending);
    let mut store = TableViewStore::new(10);
    let controller = GridController::new(&grid, route.clone());
    let before = store.snapshot(&route);

    let result = controller.reorder(
        &mut store,
        &ColumnId::from("auditor"),
        &ColumnId::from(SELECT_COLUMN),
    );
    assert!(result.is_ok(), "moving next to a fixed target is allowed");

    let after_ok = store.snapshot(&route);
    assert_ne!(after_ok.column_order, before.column_order);

    let rejected = controller.reorder(
        &mut store,
        &ColumnId::from(ACTIONS_COLUMN),
        &ColumnId::from("id"),
    );
    assert!(matches!(rejected, Err(ReorderRejected::FixedColumn(_))));
    assert_eq!(store.snapshot(&route), after_ok);
}

#[test]
fn effective_order_drops_unknown_and_appends_new_columns() {
    let columns = document_columns();
    let order = effective_order(&columns, &ids(&["project", "gone", "id", "project"]));

    assert_eq!(&order[..2], &ids(&["project", "id"])[..]);
    assert_eq!(order.len(), columns.len());
    assert_eq!(
        fixed_columns(&columns),
        ids(&[SELECT_COLUMN, ACTIONS_COLUMN]).into_iter().collect()
    );
}

#[test]
fn date_range_bounds_are_inclusive() {
    let range = DateRange::new(day(2024, 3, 10), day(2024, 3, 20));

    assert!(row_in_range(&range, "03-10-2024"));
    assert!(row_in_range(&range, "03-20-2024"));
    assert!(!row_in_range(&range, "03-09-2024"));
    assert!(!row_in_range(&range, "03-21-2024"));
    assert!(!row_in_range(&range, "2024-03-15"));
    assert!(!row_in_range(&range, ""));
    assert!(row_in_range(&DateRange::default(), "not a date"));
}

#[test]
fn grid_applies_date_range_to_received_date() {
    let grid = document_grid(100);
    let rows = vec![
        doc(1, "a.pdf", 10, "03-10-2024"),
        doc(2, "b.pdf", 10, "03-21-2024"),
        doc(3, "c.pdf", 10, "garbage"),
    ];
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Pending);
    store.set_filters(
        &route,
        FilterState {
            date_range: DateRange::new(day(2024, 3, 10), day(2024, 3, 20)),
            ..FilterState::default()
        },
    );

    let projection = grid.project(&rows, &store.snapshot(&route));

    assert_eq!(projection.total_rows, 1);
    assert_eq!(projection.rows[0].row_id, RowId::from(1));
    assert!(projection.show_reset);
}

#[test]
fn half_set_date_range_neither_filters_nor_counts_as_customized() {
    let grid = document_grid(100);
    let rows = vec![doc(1, "a.pdf", 10, "03-10-2024"), doc(2, "b.pdf", 10, "01-01-2020")];
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Pending);
    store.set_filters(
        &route,
        FilterState {
            date_range: DateRange {
                start: Some(day(2024, 3, 1)),
                end: None,
            },
            ..FilterState::default()
        },
    );
    let state = store.snapshot(&route);

    assert!(!state.is_customized());
    let projection = grid.project(&rows, &state);
    assert_eq!(projection.total_rows, 2);
    assert!(!projection.show_reset);
}

#[test]
fn presets_are_highlighted_only_on_exact_match() {
    let today = day(2024, 5, 15);

    assert_eq!(
        match_preset(&DateRange::new(today, today), today),
        Some(DatePreset::Today)
    );
    assert_eq!(
        match_preset(&DateRange::new(day(2024, 5, 9), today), today),
        Some(DatePreset::Last7Days)
    );
    assert_eq!(
        match_preset(&DateRange::new(day(2024, 5, 8), today), today),
        None
    );
    assert_eq!(match_preset(&DateRange::default(), today), None);
    assert_eq!(
        DatePreset::LastMonth.range(today),
        DateRange::new(day(2024, 4, 1), day(2024, 4, 30))
    );
}

#[test]
fn picker_orders_free_dates_and_closes() {
    let today = day(2024, 5, 15);
    let mut picker = DateRangePicker::default();
    picker.open();

    assert_eq!(picker.pick_date(day(2024, 5, 12)), None);
    assert!(picker.open);
    let range = picker.pick_date(day(2024, 5, 2)).expect("second pick completes");

    assert_eq!(range, DateRange::new(day(2024, 5, 2), day(2024, 5, 12)));
    assert!(!picker.open);
    assert_eq!(picker.label(today), "Custom");

    picker.select_preset(DatePreset::Today, today);
    assert_eq!(picker.label(today), "Today");
    assert_eq!(picker.clear(), DateRange::default());
    assert_eq!(picker.label(today), "All dates");
}

#[test]
fn export_writes_visible_data_columns_only() {
    let grid = item_grid();
    let rows = vec![
        Item {
            id: 1,
            title: "A".to_string(),
        },
        Item {
            id: 2,
            title: "B".to_string(),
        },
    ];
    let store = TableViewStore::new(1);
    let state = store.snapshot(&RouteKey::from_segments(&["items"]));

    let csv = grid
        .export_csv(&rows, &state, &ExportOptions::default())
        .expect("export should succeed");

    assert_eq!(csv, "id,title\n1,A\n2,B");
}

#[test]
fn export_covers_every_filtered_row_and_honours_exclusions() {
    let grid = item_grid();
    let rows = items(12);
    let mut store = TableViewStore::new(5);
    let route = RouteKey::from_segments(&["items"]);
    store.set_filters(
        &route,
        FilterState {
            sorting: vec![SortSpec {
                column_id: ColumnId::from("id"),
                descending: true,
            }],
            ..FilterState::default()
        },
    );
    let options = ExportOptions {
        filename: "items".to_string(),
        exclude_columns: vec![ColumnId::from("title")],
    };

    let csv = grid
        .export_csv(&rows, &store.snapshot(&route), &options)
        .expect("export should succeed");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 13);
    assert_eq!(lines[0], "id");
    assert_eq!(lines[1], "12");
    assert_eq!(lines[12], "1");
}

#[test]
fn export_file_name_and_write() {
    assert_eq!(export_file_name("pending-documents"), "pending-documents.csv");
    assert_eq!(export_file_name("report.csv"), "report.csv");
    assert_eq!(export_file_name("  "), "export.csv");

    let temp_dir = unique_test_dir("export");
    let path = temp_dir.join("nested").join("out.csv");
    let written = write_csv_file(&path, "id\n1").expect("should write export");

    assert_eq!(written, path);
    assert_eq!(fs::read_to_string(&path).expect("read export"), "id\n1\n");
    let _ = fs::remove_dir_all(temp_dir);
}

#[test]
fn sort_cycles_and_compares_numbers_numerically() {
    let id = ColumnId::from("id");
    let title = ColumnId::from("title");

    let asc = cycle_sort(&[], &id, false);
    assert_eq!(asc, vec![SortSpec { column_id: id.clone(), descending: false }]);
    let desc = cycle_sort(&asc, &id, false);
    assert!(desc[0].descending);
    assert!(cycle_sort(&desc, &id, false).is_empty());

    let multi = cycle_sort(&asc, &title, true);
    assert_eq!(multi.len(), 2);
    assert_eq!(cycle_sort(&multi, &title, false).len(), 1);

    assert_eq!(compare_cells("9", "10"), std::cmp::Ordering::Less);
    assert_eq!(compare_cells("b", "A"), std::cmp::Ordering::Greater);
}

#[test]
fn mixed_numeric_and_text_column_sorts_numbers_first() {
    let grid = item_grid();
    let rows: Vec<Item> = ["b", "10", "NaN", "1a", "9", "A", "inf", "a", "9.0"]
        .iter()
        .enumerate()
        .map(|(index, title)| Item {
            id: index as i64 + 1,
            title: title.to_string(),
        })
        .collect();
    let mut state = TableViewState::new(50);
    state.sorting = vec![SortSpec { column_id: ColumnId::from("title"), descending: false }];

    let titles = |state: &TableViewState| -> Vec<String> {
        grid.filtered_sorted(&rows, state)
            .into_iter()
            .map(|item| item.title.clone())
            .collect()
    };

    assert_eq!(
        titles(&state),
        vec!["9", "9.0", "10", "1a", "A", "a", "b", "inf", "NaN"]
    );
    state.sorting[0].descending = true;
    assert_eq!(
        titles(&state),
        vec!["NaN", "inf", "b", "a", "A", "1a", "10", "9.0", "9"]
    );

    use std::cmp::Ordering;
    assert_eq!(compare_cells("10", "1a"), Ordering::Less);
    assert_eq!(compare_cells("1a", "9"), Ordering::Greater);
    assert_eq!(compare_cells("9", "10"), Ordering::Less);
    assert_eq!(compare_cells("9", "9.0"), Ordering::Less);
    assert_eq!(compare_cells("a", "A"), Ordering::Greater);
    assert_eq!(compare_cells("x", "x"), Ordering::Equal);
}

#[test]
fn text_filter_is_case_insensitive_and_empty_filter_is_removed() {
    let grid = document_grid(100);
    let rows = vec![
        doc(1, "Chart-Alpha.pdf", 10, "01-01-2024"),
        doc(2, "chart-beta.pdf", 10, "01-01-2024"),
    ];
    let column = ColumnId::from("fileName");
    let filters = with_column_filter(&[], &column, FilterValue::Text("ALPHA".to_string()));
    let mut store = TableViewStore::new(10);
    let route = RouteKey::for_stage(Stage::Pending);
    store.set_filters(
        &route,
        FilterState {
            column_filters: filters.clone(),
            ..FilterState::default()
        },
    );

    let projection = grid.project(&rows, &store.snapshot(&route));
    assert_eq!(projection.total_rows, 1);

    assert!(with_column_filter(&filters, &column, FilterValue::Text(" ".to_string())).is_empty());
}

fn filtered_ids(rows: &[Document], column: &str, value: FilterValue) -> Vec<DocumentId> {
    let mut state = TableViewState::new(50);
    state.column_filters = vec![ColumnFilter {
        column_id: ColumnId::from(column),
        value,
    }];
    document_grid(1000)
        .filtered_sorted(rows, &state)
        .into_iter()
        .map(|document| document.id)
        .collect()
}

fn bounds(min: Option<&str>, max: Option<&str>) -> FilterValue {
    FilterValue::Range(min.map(str::to_string), max.map(str::to_string))
}

#[test]
fn range_filter_bounds_are_inclusive_and_numeric() {
    let rows = vec![
        doc(1, "a.pdf", 9, "01-01-2024"),
        doc(2, "b.pdf", 10, "01-01-2024"),
        doc(3, "c.pdf", 55, "01-01-2024"),
        doc(4, "d.pdf", 100, "01-01-2024"),
        doc(5, "e.pdf", 101, "01-01-2024"),
    ];

    assert_eq!(
        filtered_ids(&rows, "pageCount", bounds(Some("10"), Some("100"))),
        vec![DocumentId(2), DocumentId(3), DocumentId(4)]
    );
    assert_eq!(
        filtered_ids(&rows, "pageCount", bounds(Some("10.0"), Some(" 100 "))),
        vec![DocumentId(2), DocumentId(3), DocumentId(4)]
    );
    assert_eq!(
        filtered_ids(&rows, "pageCount", bounds(Some("50"), Some(" "))),
        vec![DocumentId(3), DocumentId(4), DocumentId(5)]
    );
    assert_eq!(
        filtered_ids(&rows, "pageCount", bounds(None, Some("9"))),
        vec![DocumentId(1)]
    );
    assert_eq!(filtered_ids(&rows, "pageCount", bounds(Some(""), None)).len(), 5);
}

#[test]
fn range_filter_on_text_compares_case_insensitively() {
    let rows = vec![
        doc(1, "alpha.pdf", 1, "01-01-2024"),
        doc(2, "Bravo.pdf", 1, "01-01-2024"),
        doc(3, "charlie.pdf", 1, "01-01-2024"),
        doc(4, "delta.pdf", 1, "01-01-2024"),
    ];

    assert_eq!(
        filtered_ids(&rows, "fileName", bounds(Some("b"), Some("charlie.pdf"))),
        vec![DocumentId(2), DocumentId(3)]
    );
}

#[test]
fn one_of_filter_matches_exact_values_only() {
    let mut rows = vec![
        doc(1, "a.pdf", 1, "01-01-2024"),
        doc(2, "b.pdf", 1, "01-01-2024"),
        doc(3, "c.pdf", 1, "01-01-2024"),
    ];
    rows[1].project = "Medicare".to_string();
    rows[2].project = "aca".to_string();

    let one_of = |values: &[&str]| FilterValue::OneOf(values.iter().map(|v| v.to_string()).collect());

    assert_eq!(filtered_ids(&rows, "project", one_of(&["ACA"])), vec![DocumentId(1)]);
    assert_eq!(
        filtered_ids(&rows, "project", one_of(&["ACA", "Medicare"])),
        vec![DocumentId(1), DocumentId(2)]
    );
    assert!(filtered_ids(&rows, "project", one_of(&["Medi"])).is_empty());
    assert_eq!(filtered_ids(&rows, "project", one_of(&[])).len(), 3);
}

#[test]
fn range_and_one_of_emptiness() {
    assert!(bounds(None, None).is_empty());
    assert!(bounds(None, Some("")).is_empty());
    assert!(bounds(Some("  "), Some("")).is_empty());
    assert!(!bounds(Some("1"), None).is_empty());
    assert!(!bounds(None, Some("5")).is_empty());
    assert!(FilterValue::OneOf(Vec::new()).is_empty());
    assert!(!FilterValue::OneOf(vec!["x".to_string()]).is_empty());

    let column = ColumnId::from("pageCount");
    let filters = with_column_filter(&[], &column, bounds(Some("3"), None));
    assert_eq!(filters.len(), 1);
    assert!(with_column_filter(&filters, &column, bounds(Some(" "), None)).is_empty());
}

#[test]
fn large_charts_are_highlighted_without_affecting_filtering() {
    let grid = document_grid(100);
    let rows = vec![doc(1, "big.pdf", 250, "01-01-2024"), doc(2, "small.pdf", 3, "01-01-2024")];
    let state = TableViewStore::new(10).snapshot(&RouteKey::for_stage(Stage::Pending));

    let projection = grid.project(&rows, &state);

    assert_eq!(projection.total_rows, 2);
    assert!(projection.rows[0].highlighted);
    assert!(!projection.rows[1].highlighted);
    assert!(!projection
        .columns
        .iter()
        .any(|column| column.id == ColumnId::from("hccCodes")));
}

#[test]
fn assign_posts_selection_then_clears_it_and_refreshes() {
    let coordinator = Arc::new(AssignmentCoordinator::new());
    let api = FakeApi {
        documents: BTreeMap::from([(Stage::Pending, vec![doc(3, "c.pdf", 1, "01-01-2024")])]),
        counts: DashboardCounts {
            pending: 1,
            ..DashboardCounts::default()
        },
        coordinator: Some(coordinator.clone()),
        ..FakeApi::default()
    };
    let mut store = TableViewStore::new(10);
    select_rows(&mut store, Stage::Pending, &[1, 2]);
    coordinator.select_assignee(Stage::Pending, Some(UserId(7)));

    let outcome = coordinator
        .assign(&api, &mut store, Stage::Pending, UserId(1))
        .expect("assign should succeed");

    let AssignOutcome::Completed(refresh) = outcome else {
        panic!("expected a completed assignment");
    };
    assert_eq!(refresh.documents[&Stage::Pending].len(), 1);
    assert_eq!(refresh.counts.map(|counts| counts.pending), Some(1));

    let requests = api.assign_requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].document_ids, vec![DocumentId(1), DocumentId(2)]);
    assert_eq!(requests[0].assignee_id, Some(UserId(7)));
    assert_eq!(*api.in_flight_during_assign.lock().expect("lock"), vec![true]);

    assert!(store.selection(&RouteKey::for_stage(Stage::Pending)).is_empty());
    assert_eq!(coordinator.selected_assignee(Stage::Pending), None);
    assert!(!coordinator.is_in_flight(FlightKey::Assign(Stage::Pending)));
}

#[test]
fn assign_is_ignored_while_same_stage_is_in_flight() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi::default();
    let mut store = TableViewStore::new(10);
    select_rows(&mut store, Stage::Assigned, &[4]);
    coordinator.select_assignee(Stage::Assigned, Some(UserId(7)));

    let guard = coordinator
        .try_begin(FlightKey::Assign(Stage::Assigned))
        .expect("first flight starts");
    assert!(coordinator.try_begin(FlightKey::Assign(Stage::Assigned)).is_none());

    let outcome = coordinator
        .assign(&api, &mut store, Stage::Assigned, UserId(1))
        .expect("second request is ignored, not failed");

    assert_eq!(outcome, AssignOutcome::Ignored);
    assert!(api.assign_requests.lock().expect("lock").is_empty());
    assert_eq!(store.selection(&RouteKey::for_stage(Stage::Assigned)).len(), 1);

    drop(guard);
    assert!(!coordinator.is_in_flight(FlightKey::Assign(Stage::Assigned)));
    assert!(coordinator.try_begin(FlightKey::Assign(Stage::Pending)).is_some());
}

#[test]
fn failed_assign_keeps_selection_and_assignee() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi {
        fail_assign: true,
        ..FakeApi::default()
    };
    let mut store = TableViewStore::new(10);
    select_rows(&mut store, Stage::Audit, &[11]);
    coordinator.select_assignee(Stage::Audit, Some(UserId(9)));

    let result = coordinator.assign(&api, &mut store, Stage::Audit, UserId(1));

    assert!(matches!(result, Err(AssignError::Api(ApiError::Status(500, _)))));
    assert_eq!(store.selection(&RouteKey::for_stage(Stage::Audit)).len(), 1);
    assert_eq!(coordinator.selected_assignee(Stage::Audit), Some(UserId(9)));
    assert!(!coordinator.is_in_flight(FlightKey::Assign(Stage::Audit)));
    assert!(api.fetched.lock().expect("lock").is_empty());
}

#[test]
fn reload_failure_after_accepted_assign_is_reported_separately() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi {
        fail_fetch: true,
        ..FakeApi::default()
    };
    let mut store = TableViewStore::new(10);
    select_rows(&mut store, Stage::Pending, &[5, 6]);
    coordinator.select_assignee(Stage::Pending, Some(UserId(7)));

    let result = coordinator.assign(&api, &mut store, Stage::Pending, UserId(1));

    let Err(err) = result else {
        panic!("expected the reload failure to surface");
    };
    assert!(matches!(err, AssignError::RefreshFailed(ApiError::Network(_))));
    assert!(err.to_string().contains("documents were assigned"));
    assert_eq!(api.assign_requests.lock().expect("lock").len(), 1);
    assert_eq!(*api.fetched.lock().expect("lock"), vec![Stage::Pending]);
    assert!(store.selection(&RouteKey::for_stage(Stage::Pending)).is_empty());
    assert_eq!(coordinator.selected_assignee(Stage::Pending), None);
    assert!(!coordinator.is_in_flight(FlightKey::Assign(Stage::Pending)));
}

#[test]
fn reload_failure_after_auto_assign_is_reported_separately() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi {
        fail_fetch: true,
        ..FakeApi::default()
    };

    let result = coordinator.auto_assign(&api, UserId(3));

    assert!(matches!(result, Err(AssignError::RefreshFailed(_))));
    assert_eq!(*api.auto_assign_calls.lock().expect("lock"), vec![UserId(3)]);
    assert!(!coordinator.is_in_flight(FlightKey::AutoAssign));
}

#[test]
fn assign_validates_before_calling_api() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi::default();
    let mut store = TableViewStore::new(10);

    assert_eq!(
        coordinator.assign(&api, &mut store, Stage::Pending, UserId(1)),
        Err(AssignError::EmptySelection)
    );
    select_rows(&mut store, Stage::Pending, &[1]);
    assert_eq!(
        coordinator.assign(&api, &mut store, Stage::Pending, UserId(1)),
        Err(AssignError::MissingAssignee)
    );
    assert_eq!(
        coordinator.assign(&api, &mut store, Stage::Completed, UserId(1)),
        Err(AssignError::NotAssignable(Stage::Completed))
    );
    store.set_selection(&RouteKey::for_stage(Stage::Pending), vec![RowId::from("abc")]);
    coordinator.select_assignee(Stage::Pending, Some(UserId(7)));
    assert_eq!(
        coordinator.assign(&api, &mut store, Stage::Pending, UserId(1)),
        Err(AssignError::InvalidDocumentId(RowId::from("abc")))
    );
    assert!(api.assign_requests.lock().expect("lock").is_empty());
}

#[test]
fn auto_assign_refreshes_pending_assigned_and_counts() {
    let coordinator = AssignmentCoordinator::new();
    let api = FakeApi::default();

    let outcome = coordinator
        .auto_assign(&api, UserId(3))
        .expect("auto-assign should succeed");

    let AssignOutcome::Completed(refresh) = outcome else {
        panic!("expected a completed auto-assign");
    };
    assert_eq!(
        refresh.documents.keys().copied().collect::<Vec<_>>(),
        vec![Stage::Pending, Stage::Assigned]
    );
    assert!(refresh.counts.is_some());
    assert_eq!(*api.auto_assign_calls.lock().expect("lock"), vec![UserId(3)]);
    assert!(!coordinator.is_in_flight(FlightKey::AutoAssign));
}

#[test]
fn query_service_loads_assignees_for_stage_role() {
    let api: Arc<dyn DocumentApi> = Arc::new(FakeApi::default());
    let query = QueryService::new(api);

    let analysts = query.assignees(Stage::Pending).expect("users");
    let auditors = query.assignees(Stage::Audit).expect("users");

    assert_eq!(analysts.iter().map(|user| user.id).collect::<Vec<_>>(), vec![UserId(7)]);
    assert_eq!(auditors.iter().map(|user| user.id).collect::<Vec<_>>(), vec![UserId(9)]);
    assert!(query.assignees(Stage::Completed).expect("users").is_empty());
    assert_eq!(query.all_documents().expect("documents").len(), Stage::ALL.len());
}

#[test]
fn review_form_requires_rating_and_remarks() {
    let errors = ReviewForm::default().validate().expect_err("empty form is invalid");
    assert!(errors.contains_key("rating"));
    assert!(errors.contains_key("remarks"));

    let out_of_range = ReviewForm {
        rating: Some(6),
        remarks: "looks complete overall".to_string(),
        ..ReviewForm::default()
    };
    let errors = out_of_range.validate().expect_err("rating 6 is invalid");
    assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["rating"]);

    let draft = ReviewForm {
        codes_missed: "hcc18, hcc85 HCC18".to_string(),
        codes_corrected: String::new(),
        remarks: "  two codes were missed  ".to_string(),
        rating: Some(4),
    }
    .validate()
    .expect("valid form");
    assert_eq!(draft.codes_missed, vec!["HCC18".to_string(), "HCC85".to_string()]);
    assert_eq!(draft.remarks, "two codes were missed");
}

#[test]
fn normalize_codes_splits_and_dedups() {
    assert_eq!(
        normalize_codes(" e11.9,,i10  e11.9 "),
        vec!["E11.9".to_string(), "I10".to_string()]
    );
    assert!(normalize_codes(" , ").is_empty());
}

#[test]
fn review_submit_posts_and_reloads_audit_queue() {
    let api = FakeApi {
        documents: BTreeMap::from([(Stage::Audit, vec![doc(5, "e.pdf", 2, "01-01-2024")])]),
        ..FakeApi::default()
    };
    let form = ReviewForm {
        codes_missed: "hcc19".to_string(),
        codes_corrected: String::new(),
        remarks: "missed diabetes code".to_string(),
        rating: Some(3),
    };

    let queue = ReviewService::submit(&api, DocumentId(4), UserId(9), &form)
        .expect("review should submit");

    assert_eq!(queue.len(), 1);
    let reviews = api.reviews.lock().expect("lock");
    assert_eq!(reviews[0].document_id, DocumentId(4));
    assert_eq!(reviews[0].codes_missed, vec!["HCC19".to_string()]);

    let invalid = ReviewService::submit(&api, DocumentId(4), UserId(9), &ReviewForm::default());
    assert!(matches!(invalid, Err(ReviewError::Invalid(_))));
}

#[test]
fn init_db_creates_column_order_table() {
    let temp_dir = unique_test_dir("init-db");
    let db_path = temp_dir.join("prefs.sqlite");

    let result = init_db(&db_path);

    assert!(result.is_ok(), "init_db should succeed: {result:?}");
    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'view_column_order'",
            [],
            |row| row.get(0),
        )
        .expect("should count tables");
    assert_eq!(table_count, 1);
    let _ = fs::remove_dir_all(temp_dir);
}

#[test]
fn sqlite_prefs_round_trip_per_route() {
    let temp_dir = unique_test_dir("prefs");
    let repo = SqlitePrefsRepo {
        db_path: temp_dir.join("prefs.sqlite"),
    };
    repo.init().expect("init prefs db");
    let pending = RouteKey::for_stage(Stage::Pending);
    let audit = RouteKey::for_stage(Stage::Audit);

    repo.save_column_order(&pending, &ids(&["select", "project", "id"]))
        .expect("save order");
    repo.save_column_order(&pending, &ids(&["select", "id"]))
        .expect("overwrite order");

    assert_eq!(
        repo.load_column_order(&pending).expect("load order"),
        ids(&["select", "id"])
    );
    assert!(repo.load_column_order(&audit).expect("load order").is_empty());

    repo.clear_column_order(&pending).expect("clear order");
    assert!(repo.load_column_order(&pending).expect("load order").is_empty());
    let _ = fs::remove_dir_all(temp_dir);
}

#[test]
fn prefs_service_restores_saves_and_resets() {
    let temp_dir = unique_test_dir("prefs-service");
    let repo = Arc::new(SqlitePrefsRepo {
        db_path: temp_dir.join("prefs.sqlite"),
    });
    let prefs = ViewPrefsService::new(repo.clone());
    prefs.init().expect("init prefs");
    let route = RouteKey::for_stage(Stage::Assigned);

    let mut store = TableViewStore::new(10);
    prefs
        .save_order(&mut store, &route, ids(&["select", "auditor", "id"]))
        .expect("save order");

    let mut fresh = TableViewStore::new(10);
    prefs.restore(&mut fresh, &route).expect("restore order");
    assert_eq!(fresh.snapshot(&route).column_order, ids(&["select", "auditor", "id"]));

    fresh.set_column_order(&route, ids(&["id"]));
    prefs.restore(&mut fresh, &route).expect("restore keeps session order");
    assert_eq!(fresh.snapshot(&route).column_order, ids(&["id"]));

    prefs.reset(&mut fresh, &route).expect("reset");
    assert_eq!(fresh.snapshot(&route), fresh.default_state());
    assert!(repo.load_column_order(&route).expect("load").is_empty());
    let _ = fs::remove_dir_all(temp_dir);
}

#[test]
fn config_reads_overrides_and_rejects_bad_values() {
    let vars = BTreeMap::from([
        ("CHART_AUDIT_API_URL", "https://audit.example.com/api/"),
        ("CHART_AUDIT_USER_ID", "42"),
        ("CHART_AUDIT_PAGE_SIZE", "25"),
        ("CHART_AUDIT_TIMEOUT_SECS", "5"),
        ("CHART_AUDIT_DB_PATH", "/tmp/chart-audit/prefs.sqlite"),
    ]);
    let config = AppConfig::from_lookup(|key| vars.get(key).map(|value| value.to_string()))
        .expect("config should parse");

    assert_eq!(config.api_base_url, "https://audit.example.com/api");
    assert_eq!(config.user_id, UserId(42));
    assert_eq!(config.default_page_size, 25);
    assert_eq!(config.large_chart_page_threshold, 100);
    assert_eq!(config.request_timeout, Duration::from_secs(5));
    assert_eq!(config.db_path, PathBuf::from("/tmp/chart-audit/prefs.sqlite"));

    let with = |key: &'static str, value: &'static str| {
        move |lookup: &str| match lookup {
            "CHART_AUDIT_DB_PATH" => Some("/tmp/prefs.sqlite".to_string()),
            _ if lookup == key => Some(value.to_string()),
            _ => None,
        }
    };
    assert!(AppConfig::from_lookup(with("CHART_AUDIT_PAGE_SIZE", "0")).is_err());
    assert!(AppConfig::from_lookup(with("CHART_AUDIT_PAGE_SIZE", "ten")).is_err());
    assert!(AppConfig::from_lookup(with("CHART_AUDIT_API_URL", "ftp://nope")).is_err());
}

#[test]
fn http_client_joins_paths_onto_base_url() {
    let api = HttpDocumentApi::new("http://localhost:8080/api/", Duration::from_secs(1))
        .expect("client should build");

    assert_eq!(api.url("/documents"), "http://localhost:8080/api/documents");
    assert_eq!(api.url("dashboard/counts"), "http://localhost:8080/api/dashboard/counts");
}

#[test]
fn wire_types_use_camel_case() {
    let document: Document = serde_json::from_str(
        r#"{"id": 12, "fileName": "x.pdf", "pageCount": 140, "receivedDate": "02-01-2024", "hccCodes": ["HCC18"]}"#,
    )
    .expect("document should decode");
    assert_eq!(document.id, DocumentId(12));
    assert_eq!(document.page_count, 140);
    assert_eq!(document.assigned_to, None);

    let request = AssignmentRequest {
        document_ids: vec![DocumentId(1)],
        assignee_id: Some(UserId(7)),
        requesting_user_id: UserId(2),
        stage: Stage::Pending,
    };
    let json = serde_json::to_value(&request).expect("request should encode");
    assert_eq!(json["documentIds"], serde_json::json!([1]));
    assert_eq!(json["analystId"], serde_json::json!(7));
    assert_eq!(json["requestUserId"], serde_json::json!(2));
    assert_eq!(json["stage"], serde_json::json!("pending"));
}
