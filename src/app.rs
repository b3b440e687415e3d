use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use dioxus::prelude::*;
use rfd::FileDialog;

use crate::config::AppConfig;
use crate::domain::column::{ACTIONS_COLUMN, SELECT_COLUMN};
use crate::domain::date_range::{format_row_date, DatePreset, DateRangePicker};
use crate::domain::entities::document::{DashboardCounts, Document, DocumentId, Stage, UserId};
use crate::domain::entities::table_state::{
    ColumnId, FilterState, FilterValue, Pagination, RouteKey, RowId,
};
use crate::infra::export::csv::{export_file_name, write_csv_file};
use crate::infra::http::client::HttpDocumentApi;
use crate::infra::sqlite::repo::SqlitePrefsRepo;
use crate::platform::desktop::blocking::run_blocking;
use crate::ui::state::app_state::AppState;
use crate::usecase::grid::{
    cycle_sort, document_grid, with_column_filter, ExportOptions, GridController,
};
use crate::usecase::ports::api::DocumentApi;
use crate::usecase::services::assignment_service::{
    AssignOutcome, AssignmentCoordinator, FlightKey, Refresh,
};
use crate::usecase::services::prefs_service::ViewPrefsService;
use crate::usecase::services::query_service::QueryService;
use crate::usecase::services::review_service::{ReviewError, ReviewForm, ReviewService};
use crate::usecase::services::table_state_store::TableViewStore;

const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 4px 8px;";
const HEADER_STYLE: &str =
    "border: 1px solid #bbb; padding: 4px 8px; background: #f4f6fa; position: sticky; top: 0;";

#[derive(Clone)]
struct Services {
    query: Arc<QueryService>,
    prefs: Arc<ViewPrefsService>,
    coordinator: Arc<AssignmentCoordinator>,
}

fn build_services(config: &AppConfig) -> Result<Services, String> {
    let api: Arc<dyn DocumentApi> = Arc::new(
        HttpDocumentApi::new(&config.api_base_url, config.request_timeout)
            .map_err(|err| err.to_string())?,
    );
    let prefs_repo = Arc::new(SqlitePrefsRepo {
        db_path: config.db_path.clone(),
    });
    Ok(Services {
        query: Arc::new(QueryService::new(api)),
        prefs: Arc::new(ViewPrefsService::new(prefs_repo)),
        coordinator: Arc::new(AssignmentCoordinator::new()),
    })
}

fn update_filters(
    mut store: Signal<TableViewStore>,
    route: &RouteKey,
    change: impl FnOnce(&mut FilterState),
) {
    let mut filters = store.peek().snapshot(route).filter_state();
    change(&mut filters);
    store.write().set_filters(route, filters);
}

fn apply_refresh(
    mut documents: Signal<BTreeMap<Stage, Vec<Document>>>,
    mut counts: Signal<DashboardCounts>,
    refresh: Refresh,
) {
    let mut current = documents.write();
    for (stage, rows) in refresh.documents {
        current.insert(stage, rows);
    }
    if let Some(next_counts) = refresh.counts {
        counts.set(next_counts);
    }
}

fn sort_marker(sort: Option<(usize, bool)>, multi: bool) -> String {
    match sort {
        None => String::new(),
        Some((pos, descending)) => {
            let arrow = if descending { "▼" } else { "▲" };
            if multi {
                format!(" {arrow}{}", pos + 1)
            } else {
                format!(" {arrow}")
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let config = use_context::<AppConfig>();
    let services_result = use_hook(|| build_services(&config));
    let grid = use_hook(|| Arc::new(document_grid(config.large_chart_page_threshold)));

    let AppState {
        store,
        mut active_stage,
        documents,
        mut assignees,
        mut assignee_choice,
        counts,
        mut date_picker,
        mut multi_sort,
        mut drag_source,
        mut review_target,
        mut review_form,
        mut review_errors,
        mut busy,
        mut status,
    } = AppState::new(config.default_page_size);

    let services_for_init = services_result.clone();
    use_effect(move || {
        let Ok(services) = services_for_init.as_ref() else {
            return;
        };
        let mut documents = documents;
        let mut counts = counts;
        busy.set(true);
        if let Err(err) = run_blocking("prefs.init", || services.prefs.init()) {
            status.set(format!("Failed to open view preferences: {err}"));
        }
        match run_blocking("documents.all", || services.query.all_documents()) {
            Ok(loaded) => {
                documents.set(loaded);
                status.set("Documents loaded".to_string());
            }
            Err(err) => status.set(format!("Failed to load documents: {err}")),
        }
        match run_blocking("dashboard.counts", || services.query.counts()) {
            Ok(loaded) => counts.set(loaded),
            Err(err) => status.set(format!("Failed to load counts: {err}")),
        }
        busy.set(false);
    });

    let services_for_stage = services_result.clone();
    use_effect(move || {
        let stage = active_stage();
        let Ok(services) = services_for_stage.as_ref() else {
            return;
        };
        let mut store = store;
        let route = RouteKey::for_stage(stage);
        if let Err(err) = services.prefs.restore(&mut store.write(), &route) {
            status.set(format!("Failed to restore column order: {err}"));
        }
        let range = store.peek().snapshot(&route).date_range;
        date_picker.set(DateRangePicker::with_range(range));
        assignee_choice.set(services.coordinator.selected_assignee(stage));
        match run_blocking("users.assignees", || services.query.assignees(stage)) {
            Ok(users) => assignees.set(users),
            Err(err) => {
                assignees.set(Vec::new());
                status.set(format!("Failed to load users: {err}"));
            }
        }
    });

    let grid_for_clamp = grid.clone();
    use_effect(move || {
        let route = RouteKey::for_stage(active_stage());
        let rows = documents.read().get(&active_stage()).cloned().unwrap_or_default();
        let controller = GridController::new(&grid_for_clamp, route.clone());
        let target = controller.clamp_target(&store.read(), &rows);
        if let Some(pagination) = target {
            let mut store = store;
            store.write().set_pagination(&route, pagination);
        }
    });

    let services = match services_result {
        Ok(services) => services,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to start the dashboard: {err}" }
                }
            };
        }
    };

    let today: NaiveDate = Local::now().date_naive();
    let stage = active_stage();
    let route = RouteKey::for_stage(stage);
    let state = store.read().snapshot(&route);
    let stage_rows = documents.read().get(&stage).cloned().unwrap_or_default();
    let projection = grid.project(&stage_rows, &state);
    let counts_snapshot = counts();
    let picker = date_picker();
    let highlighted_preset = picker.highlighted_preset(today);
    let picker_label = picker.label(today);
    let multi = multi_sort();
    let page_ids: Vec<RowId> = projection.rows.iter().map(|row| row.row_id.clone()).collect();
    let all_page_selected =
        !page_ids.is_empty() && page_ids.iter().all(|id| state.is_selected(id));
    let assign_in_flight = services.coordinator.is_in_flight(FlightKey::Assign(stage));
    let auto_in_flight = services.coordinator.is_in_flight(FlightKey::AutoAssign);
    let column_count = projection.columns.len().max(1);
    let data_columns: Vec<(ColumnId, String, bool)> = grid
        .columns
        .iter()
        .filter(|column| column.id.as_str() != SELECT_COLUMN && column.id.as_str() != ACTIONS_COLUMN)
        .map(|column| {
            (
                column.id.clone(),
                column.title.clone(),
                state.is_column_visible(&column.id, column.visible_by_default),
            )
        })
        .collect();
    let selected_count = state.selected_row_ids.len();
    let review_snapshot = review_form();
    let review_errors_snapshot = review_errors();

    rsx! {
        div {
            style: "font-family: sans-serif; padding: 12px; min-height: 100vh;",
            h2 { "Chart Audit" }

            nav {
                style: "display: flex; gap: 8px; margin-bottom: 12px;",
                {Stage::ALL.into_iter().map(|tab| {
                    let weight = if tab == stage { "bold" } else { "normal" };
                    let count = counts_snapshot.for_stage(tab);
                    let slug = tab.slug();
                    let tab_label = tab.label();
                    rsx!(
                        button {
                            key: "{slug}",
                            style: "font-weight: {weight};",
                            disabled: busy(),
                            onclick: move |_| active_stage.set(tab),
                            "{tab_label} ({count})"
                        }
                    )
                })}
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; flex-wrap: wrap; margin-bottom: 8px;",
                div {
                    style: "position: relative;",
                    button {
                        onclick: move |_| {
                            let mut next = date_picker();
                            if next.open {
                                next.close();
                            } else {
                                next.open();
                            }
                            date_picker.set(next);
                        },
                        "{picker_label}"
                    }
                    if picker.open {
                        div {
                            style: "position: absolute; top: 28px; left: 0; background: #fff; border: 1px solid #bbb; padding: 8px; z-index: 10; display: flex; flex-direction: column; gap: 4px;",
                            {DatePreset::ALL.into_iter().map(|preset| {
                                let route = route.clone();
                                let background = if highlighted_preset == Some(preset) { "#eef4ff" } else { "transparent" };
                                let preset_label = preset.label();
                                rsx!(
                                    button {
                                        key: "{preset_label}",
                                        style: "background: {background};",
                                        onclick: move |_| {
                                            let mut next = date_picker();
                                            let range = next.select_preset(preset, today);
                                            date_picker.set(next);
                                            update_filters(store, &route, |filters| filters.date_range = range);
                                        },
                                        "{preset_label}"
                                    }
                                )
                            })}
                            {
                                let route = route.clone();
                                let pending = picker
                                    .pending_start
                                    .map(format_row_date)
                                    .unwrap_or_else(|| "pick start".to_string());
                                rsx!(
                                    label { "From/to ({pending})" }
                                    input {
                                        r#type: "date",
                                        oninput: move |event| {
                                            let Ok(date) = NaiveDate::parse_from_str(&event.value(), "%Y-%m-%d") else {
                                                return;
                                            };
                                            let mut next = date_picker();
                                            let completed = next.pick_date(date);
                                            date_picker.set(next);
                                            if let Some(range) = completed {
                                                update_filters(store, &route, |filters| filters.date_range = range);
                                            }
                                        }
                                    }
                                )
                            }
                            {
                                let route = route.clone();
                                rsx!(
                                    button {
                                        onclick: move |_| {
                                            let mut next = date_picker();
                                            let range = next.clear();
                                            date_picker.set(next);
                                            update_filters(store, &route, |filters| filters.date_range = range);
                                        },
                                        "Clear"
                                    }
                                )
                            }
                        }
                    }
                }

                label {
                    input {
                        r#type: "checkbox",
                        checked: multi,
                        onchange: move |event| {
                            multi_sort.set(event.value().parse::<bool>().unwrap_or(false));
                        }
                    }
                    " Multi-column sort"
                }

                {data_columns.iter().map(|(column_id, title, visible)| {
                    let route = route.clone();
                    let column_id = column_id.clone();
                    let column_key = column_id.0.clone();
                    let visible = *visible;
                    rsx!(
                        label {
                            key: "{column_key}",
                            input {
                                r#type: "checkbox",
                                checked: visible,
                                onclick: move |_| {
                                    let column_id = column_id.clone();
                                    update_filters(store, &route, move |filters| {
                                        filters.column_visibility.insert(column_id, !visible);
                                    });
                                }
                            }
                            " {title}"
                        }
                    )
                })}

                if projection.show_reset || selected_count > 0 {
                    {
                        let route = route.clone();
                        let services = services.clone();
                        let reset_label = if projection.hidden_column_count > 0 {
                            format!("Reset ({} hidden)", projection.hidden_column_count)
                        } else {
                            "Reset".to_string()
                        };
                        rsx!(
                            button {
                                onclick: move |_| {
                                    let mut store = store;
                                    if let Err(err) = services.prefs.reset(&mut store.write(), &route) {
                                        status.set(format!("Reset failed: {err}"));
                                    }
                                    date_picker.set(Default::default());
                                },
                                {reset_label}
                            }
                        )
                    }
                }

                {
                    let grid = grid.clone();
                    let route = route.clone();
                    rsx!(
                        button {
                            disabled: projection.total_rows == 0,
                            onclick: move |_| {
                                let state = store.peek().snapshot(&route);
                                let rows = documents.peek().get(&stage).cloned().unwrap_or_default();
                                let options = ExportOptions {
                                    filename: format!("{}-documents", stage.slug()),
                                    exclude_columns: Vec::new(),
                                };
                                let contents = match grid.export_csv(&rows, &state, &options) {
                                    Ok(contents) => contents,
                                    Err(err) => {
                                        status.set(format!("Export failed: {err}"));
                                        return;
                                    }
                                };
                                let Some(path) = FileDialog::new()
                                    .set_file_name(export_file_name(&options.filename))
                                    .add_filter("CSV", &["csv"])
                                    .save_file()
                                else {
                                    status.set("Export cancelled".to_string());
                                    return;
                                };
                                match write_csv_file(&path, &contents) {
                                    Ok(path) => status.set(format!("Exported to {}", path.display())),
                                    Err(err) => status.set(format!("Export failed: {err}")),
                                }
                            },
                            "Export CSV"
                        }
                    )
                }
            }

            if let Some(action_label) = stage.assign_action_label() {
                div {
                    style: "display: flex; gap: 8px; align-items: center; margin-bottom: 8px;",
                    span { "{selected_count} selected" }
                    {
                        let services = services.clone();
                        let choice_value = assignee_choice()
                            .map(|user| user.0.to_string())
                            .unwrap_or_default();
                        rsx!(
                            select {
                                value: "{choice_value}",
                                onchange: move |event| {
                                    let choice = event.value().parse::<i64>().ok().map(UserId);
                                    services.coordinator.select_assignee(stage, choice);
                                    assignee_choice.set(choice);
                                },
                                option { value: "", "Choose assignee" }
                                {assignees().into_iter().map(|user| {
                                    let value = user.id.0.to_string();
                                    rsx!(option { key: "{value}", value: "{value}", "{user.name}" })
                                })}
                            }
                        )
                    }
                    {
                        let services = services.clone();
                        let user_id = config.user_id;
                        rsx!(
                            button {
                                disabled: busy() || assign_in_flight || selected_count == 0 || assignee_choice().is_none(),
                                onclick: move |_| {
                                    let mut store = store;
                                    busy.set(true);
                                    let outcome = run_blocking("documents.assign", || {
                                        services.coordinator.assign(
                                            services.query.api(),
                                            &mut store.write(),
                                            stage,
                                            user_id,
                                        )
                                    });
                                    match outcome {
                                        Ok(AssignOutcome::Completed(refresh)) => {
                                            apply_refresh(documents, counts, refresh);
                                            assignee_choice.set(None);
                                            status.set("Documents assigned".to_string());
                                        }
                                        Ok(AssignOutcome::Ignored) => {}
                                        Err(err) => {
                                            assignee_choice.set(services.coordinator.selected_assignee(stage));
                                            status.set(err.to_string());
                                        }
                                    }
                                    busy.set(false);
                                },
                                "{action_label}"
                            }
                        )
                    }
                    if stage == Stage::Pending {
                        {
                            let services = services.clone();
                            let user_id = config.user_id;
                            rsx!(
                                button {
                                    disabled: busy() || auto_in_flight,
                                    onclick: move |_| {
                                        busy.set(true);
                                        let outcome = run_blocking("documents.auto_assign", || {
                                            services.coordinator.auto_assign(services.query.api(), user_id)
                                        });
                                        match outcome {
                                            Ok(AssignOutcome::Completed(refresh)) => {
                                                apply_refresh(documents, counts, refresh);
                                                status.set("Auto-assign finished".to_string());
                                            }
                                            Ok(AssignOutcome::Ignored) => {}
                                            Err(err) => status.set(err.to_string()),
                                        }
                                        busy.set(false);
                                    },
                                    "Auto-assign"
                                }
                            )
                        }
                    }
                }
            }

            table {
                style: "border-collapse: collapse; width: 100%;",
                thead {
                    tr {
                        {projection.columns.iter().map(|column| {
                            let column_id = column.id.clone();
                            let column_key = column.id.0.clone();
                            let select_route = route.clone();
                            let sort_route = route.clone();
                            let grid = grid.clone();
                            let services = services.clone();
                            let page_ids = page_ids.clone();
                            let marker = sort_marker(column.sort, multi);
                            let sortable = column.sortable;
                            let title_style = if sortable { "cursor: pointer;" } else { "" };
                            let draggable = if column.reorderable { "true" } else { "false" };
                            let title = column.title.clone();
                            let is_select = column.id.as_str() == SELECT_COLUMN;
                            let drop_target = column.id.clone();
                            let drop_route = sort_route.clone();
                            let drag_id = column.id.clone();
                            rsx!(
                                th {
                                    key: "{column_key}",
                                    style: "{HEADER_STYLE}",
                                    draggable: "{draggable}",
                                    ondragstart: move |_| drag_source.set(Some(drag_id.clone())),
                                    ondragover: move |event| event.prevent_default(),
                                    ondrop: move |event| {
                                        event.prevent_default();
                                        let Some(source) = drag_source() else {
                                            return;
                                        };
                                        drag_source.set(None);
                                        let mut store = store;
                                        let controller = GridController::new(&grid, drop_route.clone());
                                        let moved = controller.reorder(&mut store.write(), &source, &drop_target);
                                        if let Ok(order) = moved {
                                            if let Err(err) = services.prefs.save_order(&mut store.write(), &drop_route, order) {
                                                status.set(format!("Failed to save column order: {err}"));
                                            }
                                        }
                                    },
                                    if is_select {
                                        input {
                                            r#type: "checkbox",
                                            checked: all_page_selected,
                                            onclick: move |_| {
                                                let mut store = store;
                                                let mut selection = store.peek().selection(&select_route).to_vec();
                                                if all_page_selected {
                                                    selection.retain(|id| !page_ids.contains(id));
                                                } else {
                                                    selection.extend(page_ids.iter().cloned());
                                                }
                                                store.write().set_selection(&select_route, selection);
                                            }
                                        }
                                    } else {
                                        span {
                                            style: "{title_style}",
                                            onclick: move |_| {
                                                if !sortable {
                                                    return;
                                                }
                                                let column_id = column_id.clone();
                                                update_filters(store, &sort_route, move |filters| {
                                                    filters.sorting = cycle_sort(&filters.sorting, &column_id, multi);
                                                });
                                            },
                                            "{title}{marker}"
                                        }
                                    }
                                }
                            )
                        })}
                    }
                    tr {
                        {projection.columns.iter().map(|column| {
                            let column_id = column.id.clone();
                            let filter_key = format!("filter-{}", column.id.0);
                            let route = route.clone();
                            let current = match state.filter_for(&column.id) {
                                Some(FilterValue::Text(text)) => text.clone(),
                                _ => String::new(),
                            };
                            let filterable = column.filterable;
                            rsx!(
                                th {
                                    key: "{filter_key}",
                                    style: "{CELL_STYLE}",
                                    if filterable {
                                        input {
                                            value: "{current}",
                                            placeholder: "Filter",
                                            oninput: move |event| {
                                                let value = FilterValue::Text(event.value());
                                                let column_id = column_id.clone();
                                                update_filters(store, &route, move |filters| {
                                                    filters.column_filters = with_column_filter(&filters.column_filters, &column_id, value);
                                                });
                                            }
                                        }
                                    }
                                }
                            )
                        })}
                    }
                }
                tbody {
                    if projection.is_empty() {
                        tr {
                            td { colspan: "{column_count}", style: "{CELL_STYLE} text-align: center;", "No data" }
                        }
                    }
                    {projection.rows.iter().map(|row| {
                        let background = if row.selected {
                            "#eef4ff"
                        } else if row.highlighted {
                            "#fff4e0"
                        } else {
                            "transparent"
                        };
                        let row_key = row.row_id.0.clone();
                        let cells = projection
                            .columns
                            .iter()
                            .zip(row.cells.iter())
                            .map(|(column, value)| (column.id.clone(), value.clone()))
                            .collect::<Vec<_>>();
                        let row_id = row.row_id.clone();
                        let selected = row.selected;
                        let route = route.clone();
                        rsx!(
                            tr {
                                key: "{row_key}",
                                style: "background: {background};",
                                {cells.into_iter().map(|(column_id, value)| {
                                    let cell_key = column_id.0.clone();
                                    let row_id = row_id.clone();
                                    let route = route.clone();
                                    if column_id.as_str() == SELECT_COLUMN {
                                        rsx!(
                                            td { key: "{cell_key}", style: "{CELL_STYLE} text-align: center;",
                                                input {
                                                    r#type: "checkbox",
                                                    checked: selected,
                                                    onclick: move |_| {
                                                        let mut store = store;
                                                        store.write().toggle_row(&route, row_id.clone());
                                                    }
                                                }
                                            }
                                        )
                                    } else if column_id.as_str() == ACTIONS_COLUMN {
                                        let document_id = row_id.0.parse::<i64>().ok().map(DocumentId);
                                        rsx!(
                                            td { key: "{cell_key}", style: "{CELL_STYLE}",
                                                if stage == Stage::Audit {
                                                    button {
                                                        onclick: move |_| {
                                                            review_target.set(document_id);
                                                            review_form.set(ReviewForm::default());
                                                            review_errors.set(Default::default());
                                                        },
                                                        "Review"
                                                    }
                                                }
                                            }
                                        )
                                    } else {
                                        rsx!(td { key: "{cell_key}", style: "{CELL_STYLE}", "{value}" })
                                    }
                                })}
                            }
                        )
                    })}
                }
            }

            {
                let route_prev = route.clone();
                let route_next = route.clone();
                let route_size = route.clone();
                let grid_prev = grid.clone();
                let grid_next = grid.clone();
                let pagination = projection.pagination;
                let page_number = pagination.page_index + 1;
                let page_count = projection.page_count.max(1);
                let total_rows = projection.total_rows;
                rsx!(
                    div {
                        style: "display: flex; gap: 8px; align-items: center; margin-top: 8px;",
                        button {
                            disabled: pagination.page_index == 0,
                            onclick: move |_| {
                                let mut store = store;
                                GridController::new(&grid_prev, route_prev.clone())
                                    .go_to_page(&mut store.write(), pagination.page_index.saturating_sub(1));
                            },
                            "Previous"
                        }
                        span { "Page {page_number} of {page_count} ({total_rows} rows)" }
                        button {
                            disabled: page_number >= page_count,
                            onclick: move |_| {
                                let mut store = store;
                                GridController::new(&grid_next, route_next.clone())
                                    .go_to_page(&mut store.write(), pagination.page_index + 1);
                            },
                            "Next"
                        }
                        select {
                            value: "{pagination.page_size}",
                            onchange: move |event| {
                                let Ok(page_size) = event.value().parse::<usize>() else {
                                    return;
                                };
                                let mut store = store;
                                store.write().set_pagination(&route_size, Pagination::first(page_size));
                            },
                            {PAGE_SIZE_OPTIONS.into_iter().map(|size| rsx!(option { key: "{size}", value: "{size}", "{size} / page" }))}
                        }
                    }
                )
            }

            if let (Stage::Audit, Some(document_id)) = (stage, review_target()) {
                {
                    let services = services.clone();
                    let reviewer_id = config.user_id;
                    let rating_value = review_snapshot.rating.map(|r| r.to_string()).unwrap_or_default();
                    let rating_error = review_errors_snapshot.get("rating").cloned().unwrap_or_default();
                    let remarks_error = review_errors_snapshot.get("remarks").cloned().unwrap_or_default();
                    rsx!(
                        div {
                            style: "margin-top: 16px; border: 1px solid #bbb; padding: 12px; display: flex; flex-direction: column; gap: 6px; max-width: 480px;",
                            h3 { "Review document {document_id}" }
                            label { "Codes missed" }
                            input {
                                value: "{review_snapshot.codes_missed}",
                                oninput: move |event| review_form.write().codes_missed = event.value(),
                            }
                            label { "Codes corrected" }
                            input {
                                value: "{review_snapshot.codes_corrected}",
                                oninput: move |event| review_form.write().codes_corrected = event.value(),
                            }
                            label { "Remarks" }
                            textarea {
                                value: "{review_snapshot.remarks}",
                                oninput: move |event| review_form.write().remarks = event.value(),
                            }
                            span { style: "color: #c22;", "{remarks_error}" }
                            label { "Rating" }
                            select {
                                value: "{rating_value}",
                                onchange: move |event| review_form.write().rating = event.value().parse::<u8>().ok(),
                                option { value: "", "Choose rating" }
                                {(1..=5u8).map(|rating| rsx!(option { key: "{rating}", value: "{rating}", "{rating}" }))}
                            }
                            span { style: "color: #c22;", "{rating_error}" }
                            div {
                                style: "display: flex; gap: 8px;",
                                button {
                                    disabled: busy(),
                                    onclick: move |_| {
                                        let form = review_form();
                                        busy.set(true);
                                        let result = run_blocking("documents.review", || {
                                            ReviewService::submit(services.query.api(), document_id, reviewer_id, &form)
                                        });
                                        match result {
                                            Ok(audit_queue) => {
                                                let mut documents = documents;
                                                documents.write().insert(Stage::Audit, audit_queue);
                                                review_target.set(None);
                                                review_form.set(ReviewForm::default());
                                                review_errors.set(Default::default());
                                                status.set(format!("Review for document {document_id} submitted"));
                                            }
                                            Err(ReviewError::Invalid(errors)) => review_errors.set(errors),
                                            Err(err) => status.set(err.to_string()),
                                        }
                                        busy.set(false);
                                    },
                                    "Submit review"
                                }
                                button {
                                    onclick: move |_| review_target.set(None),
                                    "Cancel"
                                }
                            }
                        }
                    )
                }
            }

            p { style: "color: #555; margin-top: 12px;", "{status}" }
        }
    }
}
