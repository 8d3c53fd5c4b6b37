//! Month projection: the pure derivation of calendar grid cells from a
//! reference date and the event collection. No hidden state; identical
//! inputs always produce identical output.

use chrono::{Datelike, NaiveDate};

use super::event::Event;

/// One position in the 7-column month grid.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Blank filler before day 1 so the first week lines up with its weekday.
    Padding,
    Day {
        date: NaiveDate,
        in_month: bool,
        /// Events on this calendar day, in store (insertion) order.
        events: Vec<Event>,
    },
}

/// Project the month containing `reference` onto a cell sequence:
/// `weekday(day 1)` padding cells (0 = Sunday), then one day cell per
/// calendar day, ascending.
pub fn project_month(reference: NaiveDate, events: &[Event]) -> Vec<Cell> {
    let year = reference.year();
    let month = reference.month();
    let first = first_of_month(reference);
    let leading = first.weekday().num_days_from_sunday() as usize;

    let mut cells = Vec::with_capacity(leading + days_in_month(year, month) as usize);
    cells.extend(std::iter::repeat_with(|| Cell::Padding).take(leading));

    for day in 1..=days_in_month(year, month) {
        let date = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        cells.push(Cell::Day {
            date,
            in_month: true,
            events: events
                .iter()
                .filter(|ev| ev.occurs_on(date))
                .cloned()
                .collect(),
        });
    }

    cells
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap()
    .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
    .num_days() as u32
}

/// Standard calendar-add: shift by whole months, rolling over year
/// boundaries and clamping the day when the target month is shorter
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = date.year() * 12 + date.month() as i32 - 1 + delta;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

/// "March 2024" — the grid title and the label baked into exports.
pub fn month_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ev(title: &str, d: NaiveDate) -> Event {
        Event::new(title.into(), "loc".into(), d, "10:00 AM".into())
    }

    fn leading_padding(cells: &[Cell]) -> usize {
        cells.iter().take_while(|c| **c == Cell::Padding).count()
    }

    #[test]
    fn month_starting_sunday_has_no_padding() {
        // September 2024 starts on a Sunday.
        let cells = project_month(date(2024, 9, 15), &[]);
        assert_eq!(leading_padding(&cells), 0);
        assert_eq!(cells.len(), 30);
    }

    #[test]
    fn month_starting_saturday_has_six_padding_cells() {
        // June 2024 starts on a Saturday.
        let cells = project_month(date(2024, 6, 1), &[]);
        assert_eq!(leading_padding(&cells), 6);
        assert_eq!(cells.len(), 6 + 30);
    }

    #[test]
    fn day_cells_are_ascending_and_in_month() {
        let cells = project_month(date(2024, 3, 10), &[]);
        let days: Vec<u32> = cells
            .iter()
            .filter_map(|c| match c {
                Cell::Day { date, in_month, .. } => {
                    assert!(in_month);
                    Some(date.day())
                }
                Cell::Padding => None,
            })
            .collect();
        assert_eq!(days, (1..=31).collect::<Vec<_>>());
    }

    #[test]
    fn events_land_in_their_day_cell_in_store_order() {
        let events = vec![
            ev("first", date(2024, 3, 4)),
            ev("elsewhere", date(2024, 3, 20)),
            ev("second", date(2024, 3, 4)),
        ];
        let cells = project_month(date(2024, 3, 1), &events);
        let march4 = cells
            .iter()
            .find_map(|c| match c {
                Cell::Day { date: d, events, .. } if d.day() == 4 => Some(events),
                _ => None,
            })
            .unwrap();
        let titles: Vec<&str> = march4.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["first", "second"]);
    }

    #[test]
    fn projection_is_pure() {
        let events = vec![ev("a", date(2024, 3, 4))];
        let reference = date(2024, 3, 1);
        assert_eq!(
            project_month(reference, &events),
            project_month(reference, &events)
        );
    }

    #[test]
    fn add_months_clamps_short_target_month() {
        assert_eq!(add_months(date(2024, 1, 31), 1), date(2024, 2, 29));
        assert_eq!(add_months(date(2023, 1, 31), 1), date(2023, 2, 28));
        assert_eq!(add_months(date(2024, 3, 31), -1), date(2024, 2, 29));
    }

    #[test]
    fn add_months_rolls_over_year_boundaries() {
        assert_eq!(add_months(date(2024, 12, 15), 1), date(2025, 1, 15));
        assert_eq!(add_months(date(2024, 1, 15), -1), date(2023, 12, 15));
    }

    #[test]
    fn february_day_count_tracks_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn month_label_formats_name_and_year() {
        assert_eq!(month_label(date(2024, 3, 4)), "March 2024");
    }
}
