use chrono::{
	Datelike,
	NaiveDate,
};

/// Week number together with the year it belongs to; around new year the
/// two can differ from the calendar year of the date.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct IsoWeek {
	pub year: i32,
	pub week: u8,
}

fn is_leap_year(year: i32) -> bool {
	(year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

// {day of year (0 to 365) + 11 - day of week (Mon = 1 to Sun = 7)} / 7
fn raw_week(date: NaiveDate) -> i64 {
	let day_of_year = i64::from(date.ordinal0());
	let weekday = i64::from(date.weekday().number_from_monday());
	(day_of_year + 11 - weekday) / 7
}

/// Monday-first week number (1..=53) of `date`.
pub fn week_of(date: NaiveDate) -> IsoWeek {
	let year = date.year();
	match raw_week(date) {
		0 => {
			// last week of the previous year; dec 31st never yields week 0
			match NaiveDate::from_ymd_opt(year - 1, 12, 31) {
				Some(last_day) => week_of(last_day),
				None => IsoWeek { year: year - 1, week: 52 },
			}
		},
		53 => {
			// 53 weeks only if the year ends on a thursday, or on a friday
			// in a leap year (which then started on a thursday)
			let last_weekday = date.weekday().num_days_from_sunday() as i64
				+ (31 - i64::from(date.day()));
			let has_53_weeks = match last_weekday % 7 {
				4 => true,
				5 => is_leap_year(year),
				_ => false,
			};
			if has_53_weeks {
				IsoWeek { year, week: 53 }
			} else {
				IsoWeek { year: year + 1, week: 1 }
			}
		},
		week => IsoWeek { year, week: week as u8 },
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use chrono::IsoWeek as ChronoIsoWeek;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn check_week(y: i32, m: u32, d: u32, week_year: i32, week: u8) {
		assert_eq!(week_of(date(y, m, d)), IsoWeek { year: week_year, week }, "wrong week for {}-{:02}-{:02}", y, m, d);
	}

	#[test]
	fn year_boundaries() {
		// sunday
		check_week(2017, 1, 1, 2016, 52);
		// monday
		check_week(2018, 12, 31, 2019, 1);
		check_week(2015, 12, 31, 2015, 53);
		check_week(2016, 1, 1, 2015, 53);
		check_week(2020, 12, 31, 2020, 53);
		check_week(2021, 1, 3, 2020, 53);
		check_week(2021, 1, 4, 2021, 1);
		check_week(2010, 12, 31, 2010, 52);
		check_week(2026, 10, 19, 2026, 43);
	}

	#[test]
	fn january_fourth_is_week_one() {
		for y in 1971..2100 {
			check_week(y, 1, 4, y, 1);
		}
	}

	#[test]
	fn matches_chrono_iso_week() {
		let mut d = date(1990, 1, 1);
		let end = date(2060, 12, 31);
		while d <= end {
			let expected: ChronoIsoWeek = d.iso_week();
			let w = week_of(d);
			assert_eq!((w.year, u32::from(w.week)), (expected.year(), expected.week()), "mismatch for {}", d);
			d = d.succ_opt().unwrap();
		}
	}
}
