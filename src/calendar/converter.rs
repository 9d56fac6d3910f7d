use crate::calendar::data::{AD_EPOCH, BS_END_YEAR, BS_START_YEAR, MONTH_DAYS};
use crate::utils::error::{HrmError, Result};
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const NEPALI_MONTHS: [&str; 12] = [
    "बैशाख", "जेष्ठ", "आषाढ", "श्रावण", "भाद्र", "आश्विन", "कार्तिक", "मंसिर", "पौष", "माघ", "फाल्गुन",
    "चैत्र",
];

pub const ROMAN_MONTHS: [&str; 12] = [
    "Baisakh", "Jestha", "Asar", "Shrawan", "Bhadra", "Ashwin", "Kartik", "Mangsir", "Poush",
    "Magh", "Falgun", "Chaitra",
];

/// Sunday-first, matching the picker grid.
pub const WEEKDAY_HEADERS: [&str; 7] = ["आइत", "सोम", "मंगल", "बुध", "बिही", "शुक्र", "शनि"];

fn ad_epoch() -> NaiveDate {
    let (y, m, d) = AD_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d).expect("AD epoch is a valid date")
}

fn check_year(year: i32) -> Result<usize> {
    if !(BS_START_YEAR..=BS_END_YEAR).contains(&year) {
        return Err(HrmError::DateOutOfRange {
            message: format!(
                "BS year {} is outside {}..={}",
                year, BS_START_YEAR, BS_END_YEAR
            ),
        });
    }
    Ok((year - BS_START_YEAR) as usize)
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32> {
    let row = check_year(year)?;
    if !(1..=12).contains(&month) {
        return Err(HrmError::InvalidDate {
            value: format!("{}-{:02}", year, month),
            reason: "month must be between 1 and 12".to_string(),
        });
    }
    Ok(MONTH_DAYS[row][(month - 1) as usize] as u32)
}

pub fn days_in_year(year: i32) -> Result<u32> {
    let row = check_year(year)?;
    Ok(MONTH_DAYS[row].iter().map(|d| *d as u32).sum())
}

/// Sunday-first index (0 = Sunday) of the first day of a BS month.
pub fn first_weekday_of_month(year: i32, month: u32) -> Result<u32> {
    Ok(BsDate::new(year, month, 1)?.weekday_index())
}

/// A validated Bikram Sambat date. Field order keeps `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BsDate {
    year: i32,
    month: u32,
    day: u32,
}

impl BsDate {
    pub fn new(year: i32, month: u32, day: u32) -> Result<Self> {
        let max_day = days_in_month(year, month)?;
        if day == 0 || day > max_day {
            return Err(HrmError::InvalidDate {
                value: format!("{}-{:02}-{:02}", year, month, day),
                reason: format!("day must be between 1 and {}", max_day),
            });
        }
        Ok(Self { year, month, day })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn month_name(&self) -> &'static str {
        NEPALI_MONTHS[(self.month - 1) as usize]
    }

    pub fn roman_month_name(&self) -> &'static str {
        ROMAN_MONTHS[(self.month - 1) as usize]
    }

    /// Days elapsed since BS 2000-01-01.
    fn ordinal_from_epoch(&self) -> i64 {
        let row = (self.year - BS_START_YEAR) as usize;
        let whole_years: i64 = MONTH_DAYS[..row]
            .iter()
            .flat_map(|months| months.iter())
            .map(|d| *d as i64)
            .sum();
        let whole_months: i64 = MONTH_DAYS[row][..(self.month - 1) as usize]
            .iter()
            .map(|d| *d as i64)
            .sum();
        whole_years + whole_months + (self.day as i64 - 1)
    }

    pub fn to_ad(&self) -> NaiveDate {
        ad_epoch() + Duration::days(self.ordinal_from_epoch())
    }

    pub fn from_ad(date: NaiveDate) -> Result<Self> {
        let mut remaining = (date - ad_epoch()).num_days();
        if remaining < 0 {
            return Err(HrmError::DateOutOfRange {
                message: format!("{} is before BS {}-01-01", date, BS_START_YEAR),
            });
        }

        for (row, months) in MONTH_DAYS.iter().enumerate() {
            let year_len: i64 = months.iter().map(|d| *d as i64).sum();
            if remaining >= year_len {
                remaining -= year_len;
                continue;
            }
            for (idx, len) in months.iter().enumerate() {
                let len = *len as i64;
                if remaining < len {
                    return Ok(Self {
                        year: BS_START_YEAR + row as i32,
                        month: idx as u32 + 1,
                        day: remaining as u32 + 1,
                    });
                }
                remaining -= len;
            }
        }

        Err(HrmError::DateOutOfRange {
            message: format!("{} is after the end of BS {}", date, BS_END_YEAR),
        })
    }

    pub fn today(today_ad: NaiveDate) -> Result<Self> {
        Self::from_ad(today_ad)
    }

    pub fn weekday(&self) -> Weekday {
        self.to_ad().weekday()
    }

    pub fn weekday_index(&self) -> u32 {
        self.weekday().num_days_from_sunday()
    }

    pub fn add_days(&self, days: i64) -> Result<Self> {
        Self::from_ad(self.to_ad() + Duration::days(days))
    }
}

/// Completed years between a BS birth date and an AD "today".
pub fn age_on(dob: BsDate, today: NaiveDate) -> u32 {
    let born = dob.to_ad();
    if born > today {
        return 0;
    }
    let mut age = today.year() - born.year();
    if (today.month(), today.day()) < (born.month(), born.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

impl fmt::Display for BsDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl FromStr for BsDate {
    type Err = HrmError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| HrmError::InvalidDate {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        let separator = match (trimmed.contains('-'), trimmed.contains('/')) {
            (true, false) => '-',
            (false, true) => '/',
            _ => return Err(invalid("expected YYYY-MM-DD")),
        };
        let parts: Vec<&str> = trimmed.split(separator).collect();
        let digits = |p: &str, len: std::ops::RangeInclusive<usize>| {
            len.contains(&p.len()) && p.bytes().all(|b| b.is_ascii_digit())
        };
        if parts.len() != 3
            || !digits(parts[0], 4..=4)
            || !digits(parts[1], 1..=2)
            || !digits(parts[2], 1..=2)
        {
            return Err(invalid("expected YYYY-MM-DD"));
        }

        let year: i32 = parts[0].parse().map_err(|_| invalid("bad year"))?;
        let month: u32 = parts[1].parse().map_err(|_| invalid("bad month"))?;
        let day: u32 = parts[2].parse().map_err(|_| invalid("bad day"))?;
        BsDate::new(year, month, day)
    }
}

impl TryFrom<String> for BsDate {
    type Error = HrmError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<BsDate> for String {
    fn from(value: BsDate) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ad(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_known_new_year_dates() {
        let cases = [
            ((2000, 1, 1), ad(1943, 4, 14)),
            ((2080, 1, 1), ad(2023, 4, 14)),
            ((2081, 1, 1), ad(2024, 4, 13)),
            ((2082, 1, 1), ad(2025, 4, 14)),
            ((2083, 1, 1), ad(2026, 4, 14)),
        ];
        for ((y, m, d), expected) in cases {
            let bs = BsDate::new(y, m, d).unwrap();
            assert_eq!(bs.to_ad(), expected, "BS {}", bs);
            assert_eq!(BsDate::from_ad(expected).unwrap(), bs);
        }
    }

    #[test]
    fn test_mid_year_conversion() {
        let bs = BsDate::new(2081, 9, 15).unwrap();
        assert_eq!(bs.to_ad(), ad(2024, 12, 30));
        assert_eq!(bs.weekday(), Weekday::Mon);

        let bs = BsDate::new(2050, 6, 10).unwrap();
        assert_eq!(bs.to_ad(), ad(1993, 9, 26));
        assert_eq!(bs.weekday_index(), 0);

        assert_eq!(BsDate::from_ad(ad(2001, 1, 30)).unwrap().to_string(), "2057-10-17");
    }

    #[test]
    fn test_table_edges() {
        let last = BsDate::new(2090, 12, 30).unwrap();
        assert_eq!(last.to_ad(), ad(2034, 4, 13));
        assert!(matches!(
            BsDate::from_ad(ad(2034, 4, 14)),
            Err(HrmError::DateOutOfRange { .. })
        ));
        assert!(matches!(
            BsDate::from_ad(ad(1943, 4, 13)),
            Err(HrmError::DateOutOfRange { .. })
        ));
        assert!(matches!(BsDate::new(1999, 12, 1), Err(HrmError::DateOutOfRange { .. })));
    }

    #[test]
    fn test_round_trip_whole_years() {
        let mut date = BsDate::new(2075, 1, 1).unwrap();
        let mut expected_ad = date.to_ad();
        for _ in 0..(366 * 3) {
            assert_eq!(date.to_ad(), expected_ad);
            assert_eq!(BsDate::from_ad(expected_ad).unwrap(), date);
            date = date.add_days(1).unwrap();
            expected_ad += Duration::days(1);
        }
    }

    #[test]
    fn test_month_lengths_and_validation() {
        assert_eq!(days_in_month(2000, 1).unwrap(), 30);
        assert_eq!(days_in_month(2000, 2).unwrap(), 32);
        assert_eq!(days_in_year(2081).unwrap(), 366);
        assert!(days_in_month(2081, 13).is_err());
        assert!(BsDate::new(2000, 1, 31).is_err());
        assert!(BsDate::new(2000, 2, 32).is_ok());
        assert!(BsDate::new(2000, 2, 0).is_err());
    }

    #[test]
    fn test_first_weekday() {
        // 1943-04-14 was a Wednesday.
        assert_eq!(first_weekday_of_month(2000, 1).unwrap(), 3);
        // 2082-01-01 = 2025-04-14, a Monday.
        assert_eq!(first_weekday_of_month(2082, 1).unwrap(), 1);
    }

    #[test]
    fn test_parse_and_display() {
        let bs: BsDate = "2081-09-15".parse().unwrap();
        assert_eq!(bs, BsDate::new(2081, 9, 15).unwrap());
        assert_eq!("2081/9/15".parse::<BsDate>().unwrap(), bs);
        assert_eq!(bs.to_string(), "2081-09-15");
        assert_eq!(bs.month_name(), "पौष");
        assert_eq!(bs.roman_month_name(), "Poush");

        assert!("2081-09".parse::<BsDate>().is_err());
        assert!("abcd-01-01".parse::<BsDate>().is_err());
        assert!("2081-01-40".parse::<BsDate>().is_err());
        assert!("".parse::<BsDate>().is_err());
    }

    #[test]
    fn test_parse_requires_one_separator_and_four_digit_year() {
        assert!("2081-01/05".parse::<BsDate>().is_err());
        assert!("2081/01-05".parse::<BsDate>().is_err());
        assert!("02081-01-05".parse::<BsDate>().is_err());
        assert!("81-01-05".parse::<BsDate>().is_err());
        assert!("2081-001-05".parse::<BsDate>().is_err());
        assert!("2081--05".parse::<BsDate>().is_err());
        assert_eq!(
            "2081/1/5".parse::<BsDate>().unwrap(),
            BsDate::new(2081, 1, 5).unwrap()
        );
        assert_eq!(
            " 2081-01-05 ".parse::<BsDate>().unwrap(),
            BsDate::new(2081, 1, 5).unwrap()
        );
    }

    #[test]
    fn test_serde_as_string() {
        let bs = BsDate::new(2082, 6, 30).unwrap();
        let json = serde_json::to_string(&bs).unwrap();
        assert_eq!(json, "\"2082-06-30\"");
        let back: BsDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bs);
        assert!(serde_json::from_str::<BsDate>("\"2082-13-01\"").is_err());
    }

    #[test]
    fn test_age_on() {
        let dob = BsDate::new(2050, 6, 10).unwrap(); // 1993-09-26
        assert_eq!(age_on(dob, ad(2025, 9, 25)), 31);
        assert_eq!(age_on(dob, ad(2025, 9, 26)), 32);
        assert_eq!(age_on(dob, ad(1990, 1, 1)), 0);
    }
}
