//! Serial number field: `WWYYAAAANNNN`
//!
//! - `WW`: week of production (ISO week, 01..53)
//! - `YY`: year of production (year of century)
//! - `AAAA`: assembly code, right-aligned and space padded
//! - `NNNN`: board number, 0000..9999

use chrono::NaiveDate;

mod entropy;
mod week;

pub use self::entropy::{
	DevUrandom,
	Entropy,
	FixedEntropy,
	NoEntropy,
};

pub use self::week::{
	IsoWeek,
	week_of,
};

pub const SERIAL_LEN: usize = 12;
pub const ASSEMBLY_CODE_LEN: usize = 4;
pub const BOARD_NUMBER_OFFSET: usize = 8;
pub const BOARD_NUMBER_LEN: usize = 4;
pub const MAX_BOARD_NUMBER: u16 = 9999;
pub const DEFAULT_ASSEMBLY_CODE: &str = "0000";

/// Serial number parts collected from a cape description; unset parts get
/// defaults when the field is built.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct SerialNumber {
	pub week: Option<u8>,
	pub year: Option<u8>,
	pub assembly_code: Option<String>,
	pub board_number: Option<u16>,
}

/// Zero padded 4-digit board number
pub fn format_board_number(board_number: u16) -> [u8; BOARD_NUMBER_LEN] {
	let mut buf = [0u8; BOARD_NUMBER_LEN];
	let s = format!("{:04}", board_number % (MAX_BOARD_NUMBER + 1));
	buf.copy_from_slice(s.as_bytes());
	buf
}

fn format_assembly_code(code: &str) -> [u8; ASSEMBLY_CODE_LEN] {
	let code = code.as_bytes();
	let code = &code[..code.len().min(ASSEMBLY_CODE_LEN)];
	let mut buf = [b' '; ASSEMBLY_CODE_LEN];
	buf[ASSEMBLY_CODE_LEN - code.len()..].copy_from_slice(code);
	buf
}

impl SerialNumber {
	/// Builds the serial field; week and year default (independently) to
	/// the ISO week of `today`, the board number to a random one.
	pub fn build(&self, today: NaiveDate, entropy: &mut dyn Entropy) -> [u8; SERIAL_LEN] {
		let (week, year) = match (self.week, self.year) {
			(Some(week), Some(year)) => (week, year),
			(week, year) => {
				// year of the ISO week, not the calendar year: 2017-01-01 is
				// week 52 of 2016 and gives "5216"
				let current = week_of(today);
				(
					week.unwrap_or(current.week),
					year.unwrap_or(current.year.rem_euclid(100) as u8),
				)
			},
		};

		let board_number = match self.board_number {
			Some(n) => n,
			None => {
				let n = entropy.next_u32()
					.map(|v| (v % (u32::from(MAX_BOARD_NUMBER) + 1)) as u16)
					.unwrap_or(0);
				debug!("no board number configured, using {:04}", n);
				n
			},
		};

		let assembly_code = self.assembly_code.as_ref().map(String::as_str).unwrap_or(DEFAULT_ASSEMBLY_CODE);

		let mut serial = [0u8; SERIAL_LEN];
		serial[0..4].copy_from_slice(format!("{:02}{:02}", week % 100, year % 100).as_bytes());
		serial[4..BOARD_NUMBER_OFFSET].copy_from_slice(&format_assembly_code(assembly_code));
		serial[BOARD_NUMBER_OFFSET..].copy_from_slice(&format_board_number(board_number));
		serial
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn date(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	fn check_serial(serial: &SerialNumber, today: NaiveDate, entropy: &mut dyn Entropy, expected: &str) {
		let built = serial.build(today, entropy);
		assert_eq!(std::str::from_utf8(&built).unwrap(), expected, "wrong serial for {:?}", serial);
	}

	#[test]
	fn fully_configured() {
		let serial = SerialNumber {
			week: Some(7),
			year: Some(17),
			assembly_code: Some("BBBK".into()),
			board_number: Some(42),
		};
		check_serial(&serial, date(2026, 10, 19), &mut NoEntropy, "0717BBBK0042");
	}

	#[test]
	fn defaults() {
		check_serial(&SerialNumber::default(), date(2026, 10, 19), &mut NoEntropy, "432600000000");
		check_serial(&SerialNumber::default(), date(2026, 10, 19), &mut FixedEntropy(123_456), "432600003456");
		// week 52 of 2016
		check_serial(&SerialNumber::default(), date(2017, 1, 1), &mut NoEntropy, "521600000000");
	}

	#[test]
	fn week_and_year_default_independently() {
		let only_week = SerialNumber { week: Some(3), board_number: Some(1), ..Default::default() };
		check_serial(&only_week, date(2026, 10, 19), &mut NoEntropy, "032600000001");

		let only_year = SerialNumber { year: Some(9), board_number: Some(1), ..Default::default() };
		check_serial(&only_year, date(2026, 10, 19), &mut NoEntropy, "430900000001");
	}

	#[test]
	fn assembly_code_padding() {
		let short = SerialNumber { week: Some(1), year: Some(20), assembly_code: Some("AB".into()), board_number: Some(9999) };
		check_serial(&short, date(2026, 10, 19), &mut NoEntropy, "0120  AB9999");

		let long = SerialNumber { week: Some(1), year: Some(20), assembly_code: Some("ABCDEFG".into()), board_number: Some(5) };
		check_serial(&long, date(2026, 10, 19), &mut NoEntropy, "0120ABCD0005");
	}

	#[test]
	fn board_number_format() {
		assert_eq!(&format_board_number(0), b"0000");
		assert_eq!(&format_board_number(77), b"0077");
		assert_eq!(&format_board_number(9999), b"9999");
	}
}
