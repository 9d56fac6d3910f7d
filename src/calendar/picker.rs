//! Headless state of the BS date-picker: an input box plus a popup month grid
//! with month/year navigation.

use crate::calendar::converter::{days_in_month, first_weekday_of_month, BsDate};
use crate::calendar::data::{BS_END_YEAR, BS_START_YEAR};
use crate::utils::error::Result;
use regex::Regex;
use std::sync::OnceLock;

fn input_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridCell {
    /// `None` for the padding cells before day 1.
    pub day: Option<u32>,
    pub is_selected: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone)]
pub struct DatePicker {
    open: bool,
    view_year: i32,
    view_month: u32,
    display_value: String,
    today: BsDate,
}

impl DatePicker {
    pub fn new(value: Option<&str>, today: BsDate) -> Self {
        let display_value = value.unwrap_or_default().to_string();
        let start = value
            .and_then(|v| v.parse::<BsDate>().ok())
            .unwrap_or(today);

        Self {
            open: false,
            view_year: start.year(),
            view_month: start.month(),
            display_value,
            today,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Click outside the popup.
    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn view(&self) -> (i32, u32) {
        (self.view_year, self.view_month)
    }

    pub fn display_value(&self) -> &str {
        &self.display_value
    }

    pub fn selected(&self) -> Option<BsDate> {
        self.display_value.parse().ok()
    }

    /// Keeps the picker in sync when the bound value changes from outside.
    pub fn set_value(&mut self, value: &str) {
        self.display_value = value.to_string();
    }

    pub fn previous_month(&mut self) {
        if self.view_month == 1 {
            if self.view_year > BS_START_YEAR {
                self.view_year -= 1;
                self.view_month = 12;
            }
        } else {
            self.view_month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.view_month == 12 {
            if self.view_year < BS_END_YEAR {
                self.view_year += 1;
                self.view_month = 1;
            }
        } else {
            self.view_month += 1;
        }
    }

    pub fn go_to_today(&mut self) {
        self.view_year = self.today.year();
        self.view_month = self.today.month();
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        days_in_month(year, self.view_month)?;
        self.view_year = year;
        Ok(())
    }

    pub fn set_month(&mut self, month: u32) -> Result<()> {
        days_in_month(self.view_year, month)?;
        self.view_month = month;
        Ok(())
    }

    /// Years offered in the year dropdown.
    pub fn year_range(&self) -> std::ops::RangeInclusive<i32> {
        let current = self.today.year();
        (current - 100).max(BS_START_YEAR)..=(current + 10).min(BS_END_YEAR)
    }

    pub fn grid(&self) -> Vec<GridCell> {
        let (year, month) = (self.view_year, self.view_month);
        // view_year/view_month are only ever set to in-table values
        let leading = first_weekday_of_month(year, month).unwrap_or(0);
        let len = days_in_month(year, month).unwrap_or(0);
        let selected = self.selected();

        let mut cells: Vec<GridCell> = (0..leading)
            .map(|_| GridCell {
                day: None,
                is_selected: false,
                is_today: false,
            })
            .collect();

        cells.extend((1..=len).map(|day| GridCell {
            day: Some(day),
            is_selected: selected
                .map(|s| s.year() == year && s.month() == month && s.day() == day)
                .unwrap_or(false),
            is_today: self.today.year() == year
                && self.today.month() == month
                && self.today.day() == day,
        }));

        cells
    }

    /// Picks a day in the displayed month and returns the value to hand to the
    /// change callback.
    pub fn select_day(&mut self, day: u32) -> Result<String> {
        let date = BsDate::new(self.view_year, self.view_month, day)?;
        let formatted = date.to_string();
        tracing::debug!("📅 picked BS date {}", formatted);
        self.display_value = formatted.clone();
        self.open = false;
        Ok(formatted)
    }

    pub fn type_text(&mut self, text: &str) {
        self.display_value = text.to_string();
    }

    /// Commits typed text when it looks like `YYYY-MM-DD` and is a real BS date.
    pub fn blur(&mut self) -> Option<String> {
        let text = self.display_value.trim();
        if text.is_empty() || !input_pattern().is_match(text) {
            return None;
        }
        match text.parse::<BsDate>() {
            Ok(date) => {
                self.view_year = date.year();
                self.view_month = date.month();
                Some(date.to_string())
            }
            Err(e) => {
                tracing::debug!("ignoring typed date: {}", e);
                None
            }
        }
    }
}
