use std::collections::BTreeMap;

use dioxus::prelude::{use_signal, Signal};

use crate::domain::date_range::DateRangePicker;
use crate::domain::entities::document::{DashboardCounts, Document, DocumentId, Stage, User, UserId};
use crate::domain::entities::table_state::ColumnId;
use crate::usecase::services::review_service::{ReviewForm, ReviewFormErrors};
use crate::usecase::services::table_state_store::TableViewStore;

pub struct AppState {
    pub store: Signal<TableViewStore>,
    pub active_stage: Signal<Stage>,
    pub documents: Signal<BTreeMap<Stage, Vec<Document>>>,
    pub assignees: Signal<Vec<User>>,
    pub assignee_choice: Signal<Option<UserId>>,
    pub counts: Signal<DashboardCounts>,
    pub date_picker: Signal<DateRangePicker>,
    pub multi_sort: Signal<bool>,
    pub drag_source: Signal<Option<ColumnId>>,
    pub review_target: Signal<Option<DocumentId>>,
    pub review_form: Signal<ReviewForm>,
    pub review_errors: Signal<ReviewFormErrors>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(default_page_size: usize) -> Self {
        Self {
            store: use_signal(|| TableViewStore::new(default_page_size)),
            active_stage: use_signal(|| Stage::Pending),
            documents: use_signal(BTreeMap::<Stage, Vec<Document>>::new),
            assignees: use_signal(Vec::<User>::new),
            assignee_choice: use_signal(|| None::<UserId>),
            counts: use_signal(DashboardCounts::default),
            date_picker: use_signal(DateRangePicker::default),
            multi_sort: use_signal(|| false),
            drag_source: use_signal(|| None::<ColumnId>),
            review_target: use_signal(|| None::<DocumentId>),
            review_form: use_signal(ReviewForm::default),
            review_errors: use_signal(ReviewFormErrors::new),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
