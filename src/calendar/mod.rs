pub mod converter;
pub mod data;
pub mod picker;

pub use converter::{age_on, days_in_month, days_in_year, first_weekday_of_month, BsDate};
pub use picker::{DatePicker, GridCell};
