use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::entities::table_state::DateRange;

pub const ROW_DATE_FORMAT: &str = "%m-%d-%Y";

/// Parses a grid date cell; anything that is not `MM-DD-YYYY` yields `None`.
pub fn parse_row_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ROW_DATE_FORMAT).ok()
}

pub fn format_row_date(date: NaiveDate) -> String {
    date.format(ROW_DATE_FORMAT).to_string()
}

/// Row inclusion under a date filter. An inactive range keeps every row.
pub fn row_in_range(range: &DateRange, raw: &str) -> bool {
    if !range.is_active() {
        return true;
    }
    parse_row_date(raw).is_some_and(|date| range.contains(date))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatePreset {
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisMonth,
    LastMonth,
}

impl DatePreset {
    pub const ALL: [DatePreset; 6] = [
        DatePreset::Today,
        DatePreset::Yesterday,
        DatePreset::Last7Days,
        DatePreset::Last30Days,
        DatePreset::ThisMonth,
        DatePreset::LastMonth,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DatePreset::Today => "Today",
            DatePreset::Yesterday => "Yesterday",
            DatePreset::Last7Days => "Last 7 days",
            DatePreset::Last30Days => "Last 30 days",
            DatePreset::ThisMonth => "This month",
            DatePreset::LastMonth => "Last month",
        }
    }

    pub fn range(self, today: NaiveDate) -> DateRange {
        match self {
            DatePreset::Today => DateRange::new(today, today),
            DatePreset::Yesterday => {
                let yesterday = today - Duration::days(1);
                DateRange::new(yesterday, yesterday)
            }
            DatePreset::Last7Days => DateRange::new(today - Duration::days(6), today),
            DatePreset::Last30Days => DateRange::new(today - Duration::days(29), today),
            DatePreset::ThisMonth => DateRange::new(first_of_month(today), today),
            DatePreset::LastMonth => {
                let last_day = first_of_month(today) - Duration::days(1);
                DateRange::new(first_of_month(last_day), last_day)
            }
        }
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The preset whose bounds fall on the same calendar days as `range`.
pub fn match_preset(range: &DateRange, today: NaiveDate) -> Option<DatePreset> {
    if !range.is_active() {
        return None;
    }
    DatePreset::ALL
        .into_iter()
        .find(|preset| preset.range(today) == *range)
}

/// State of the date range dropdown: current range plus an in-progress free pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateRangePicker {
    pub range: DateRange,
    pub open: bool,
    pub pending_start: Option<NaiveDate>,
}

impl DateRangePicker {
    pub fn with_range(range: DateRange) -> Self {
        Self {
            range,
            open: false,
            pending_start: None,
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.pending_start = None;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.pending_start = None;
    }

    pub fn select_preset(&mut self, preset: DatePreset, today: NaiveDate) -> DateRange {
        self.range = preset.range(today);
        self.close();
        self.range
    }

    /// Records one free date. Returns the completed range once both bounds are chosen.
    pub fn pick_date(&mut self, date: NaiveDate) -> Option<DateRange> {
        match self.pending_start.take() {
            None => {
                self.open = true;
                self.pending_start = Some(date);
                None
            }
            Some(first) => {
                let (start, end) = if first <= date { (first, date) } else { (date, first) };
                self.range = DateRange::new(start, end);
                self.close();
                Some(self.range)
            }
        }
    }

    pub fn clear(&mut self) -> DateRange {
        self.range = DateRange::default();
        self.close();
        self.range
    }

    pub fn highlighted_preset(&self, today: NaiveDate) -> Option<DatePreset> {
        match_preset(&self.range, today)
    }

    pub fn label(&self, today: NaiveDate) -> String {
        if !self.range.is_active() {
            return "All dates".to_string();
        }
        match self.highlighted_preset(today) {
            Some(preset) => preset.label().to_string(),
            None => "Custom".to_string(),
        }
    }
}
