use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

static COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})(\d{2})(\d{2})$").expect("valid compact date regex"));
static HYPHENATED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid hyphenated date regex")
});

const DISPLAY_FORMAT: &str = "%b %-d, %Y";

/// A date directory name and the date it encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntry {
    pub name: String,
    pub date: NaiveDate,
}

impl DateEntry {
    /// `Jan 15, 2023`
    pub fn display(&self) -> String {
        format_display_date(self.date)
    }
}

pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

/// Decode a directory named `YYYYMMDD` or `YYYY-MM-DD`. Anything else,
/// including impossible calendar dates, is rejected.
pub fn decode_dir_name(name: &str) -> Option<DateEntry> {
    let caps = COMPACT_DATE
        .captures(name)
        .or_else(|| HYPHENATED_DATE.captures(name))?;

    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    Some(DateEntry {
        name: name.to_string(),
        date,
    })
}

/// `"<first> - <last>"` over an already sorted slice.
pub fn date_range(entries: &[DateEntry]) -> Option<String> {
    let first = entries.first()?;
    let last = entries.last()?;
    Some(format!("{} - {}", first.display(), last.display()))
}
