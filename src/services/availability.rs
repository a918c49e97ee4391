use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;

/// Fixed daily slot grid: on the hour from 09:00 to 18:00, skipping the
/// 12:00 lunch hour. Every booking occupies exactly one slot no matter how
/// many services it bundles.
pub const DAILY_SLOTS: [&str; 9] = [
    "09:00", "10:00", "11:00", "13:00", "14:00", "15:00", "16:00", "17:00", "18:00",
];

/// Shop dates are exchanged as `DD/MM/YYYY` strings.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%d/%m/%Y").ok()
}

/// A date can be booked unless it is already past (day granularity) or
/// falls on the weekly closed day (Sunday).
pub fn is_selectable_date(date: NaiveDate, today: NaiveDate) -> bool {
    date >= today && date.weekday() != Weekday::Sun
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub day: u32,
    pub date: String,
    pub selectable: bool,
}

/// Day-by-day eligibility for one month of the booking calendar.
/// Returns None for an invalid year/month pair.
pub fn month_days(year: i32, month: u32, today: NaiveDate) -> Option<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;

    let mut days = Vec::new();
    let mut cursor = first;
    while cursor.month() == month && cursor.year() == year {
        days.push(CalendarDay {
            day: cursor.day(),
            date: format_date(cursor),
            selectable: is_selectable_date(cursor, today),
        });
        cursor = match cursor.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    Some(days)
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub time: String,
    pub busy: bool,
}

/// Tag the fixed slot grid against a busy set. Busy slots stay visible so
/// the client can render them grayed out.
pub fn slot_board(busy: &[String]) -> Vec<SlotView> {
    DAILY_SLOTS
        .iter()
        .map(|t| SlotView {
            time: t.to_string(),
            busy: busy.iter().any(|b| b == t),
        })
        .collect()
}
