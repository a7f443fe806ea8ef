//! Parser for the line based cape description.
//!
//! ```text
//! # comment
//! board_name "BeagleBone LCD4 CAPE"
//! version "00A1"
//! number_of_pins 28
//! pinconfig P8_13 7 FAST OUTPUT PULL_UP RX_ENABLE
//! ```
//!
//! Problems in single lines are reported as [`Diagnostic`]s and the line
//! (or `pinconfig` entry) is skipped; parsing always runs to the end.

use std::io::BufRead;

use chrono::NaiveDate;
use failure::Fail;

use crate::pins::{
	InvalidPinField,
	PinConfigBuilder,
	PinId,
};
use crate::record::{
	BOARD_NAME_LEN,
	EepromRecord,
	MANUFACTURER_LEN,
	PART_NUMBER_LEN,
	VERSION_LEN,
	truncate_bytes,
};
use crate::serial_number::{
	ASSEMBLY_CODE_LEN,
	Entropy,
	MAX_BOARD_NUMBER,
	SerialNumber,
};

const COMMENT: char = '#';
const MAX_CURRENT: i64 = 9999;

#[derive(Clone, PartialEq, Eq, Debug, Fail)]
pub enum Diagnostic {
	#[fail(display = "line {}: can't parse line: {:?}", line, text)]
	UnparsableLine {
		line: usize,
		text: String,
	},
	#[fail(display = "line {}: unknown key {:?}", line, key)]
	UnknownKey {
		line: usize,
		key: String,
	},
	#[fail(display = "line {}: {}: expected a quoted value", line, key)]
	MissingQuotedValue {
		line: usize,
		key: &'static str,
	},
	#[fail(display = "line {}: {}: value truncated to {} bytes", line, key, max)]
	ValueTruncated {
		line: usize,
		key: &'static str,
		max: usize,
	},
	#[fail(display = "line {}: {}: invalid number {:?}", line, key, value)]
	InvalidNumber {
		line: usize,
		key: &'static str,
		value: String,
	},
	#[fail(display = "line {}: {}: {} not in range {}..={}", line, key, value, min, max)]
	OutOfRange {
		line: usize,
		key: &'static str,
		value: i64,
		min: i64,
		max: i64,
	},
	#[fail(display = "line {}: pin config: pin not recognised: {:?}", line, pin)]
	UnknownPin {
		line: usize,
		pin: String,
	},
	#[fail(display = "line {}: pin config for {}: {}", line, pin, error)]
	InvalidPinField {
		line: usize,
		pin: PinId,
		error: InvalidPinField,
	},
}

impl Diagnostic {
	pub fn line(&self) -> usize {
		match self {
			Diagnostic::UnparsableLine { line, .. } => *line,
			Diagnostic::UnknownKey { line, .. } => *line,
			Diagnostic::MissingQuotedValue { line, .. } => *line,
			Diagnostic::ValueTruncated { line, .. } => *line,
			Diagnostic::InvalidNumber { line, .. } => *line,
			Diagnostic::OutOfRange { line, .. } => *line,
			Diagnostic::UnknownPin { line, .. } => *line,
			Diagnostic::InvalidPinField { line, .. } => *line,
		}
	}
}

/// Result of parsing a cape description.
#[derive(Clone, Debug)]
pub struct ParsedConfig {
	pub record: EepromRecord,
	/// serial number parts as configured, before defaults were applied
	pub serial_number: SerialNumber,
	pub diagnostics: Vec<Diagnostic>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum TextField {
	BoardName,
	Version,
	Manufacturer,
	PartNumber,
	AssemblyCode,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum NumberField {
	PinCount,
	Week,
	Year,
	BoardNumber,
	Vdd3v3bCurrent,
	Vdd5vCurrent,
	Sys5vCurrent,
	DcSupplied,
}

impl NumberField {
	/// (max digits, min, max)
	fn limits(&self) -> (usize, i64, i64) {
		match self {
			NumberField::PinCount => (2, 0, 99),
			NumberField::Week => (2, 1, 53),
			NumberField::Year => (2, 0, 99),
			NumberField::BoardNumber => (4, 0, i64::from(MAX_BOARD_NUMBER)),
			NumberField::Vdd3v3bCurrent
			| NumberField::Vdd5vCurrent
			| NumberField::Sys5vCurrent
			| NumberField::DcSupplied => (4, 0, MAX_CURRENT),
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Key {
	Text(TextField, &'static str, usize),
	Number(NumberField, &'static str),
	PinConfig,
}

fn lookup_key(key: &str) -> Option<Key> {
	use self::NumberField::*;
	use self::TextField::*;

	Some(match key {
		"board_name" => Key::Text(BoardName, "board_name", BOARD_NAME_LEN),
		"version" => Key::Text(Version, "version", VERSION_LEN),
		"manufacturer" => Key::Text(Manufacturer, "manufacturer", MANUFACTURER_LEN),
		"part_number" => Key::Text(PartNumber, "part_number", PART_NUMBER_LEN),
		"assembly_code" => Key::Text(AssemblyCode, "assembly_code", ASSEMBLY_CODE_LEN),
		"number_of_pins" => Key::Number(PinCount, "number_of_pins"),
		"week_of_production" => Key::Number(Week, "week_of_production"),
		"year_of_production" => Key::Number(Year, "year_of_production"),
		"board_number" => Key::Number(BoardNumber, "board_number"),
		"vdd_3V3b_current" => Key::Number(Vdd3v3bCurrent, "vdd_3V3b_current"),
		"vdd_5v_current" => Key::Number(Vdd5vCurrent, "vdd_5v_current"),
		"sys_5v_current" => Key::Number(Sys5vCurrent, "sys_5v_current"),
		"dc_supplied" => Key::Number(DcSupplied, "dc_supplied"),
		"pinconfig" => Key::PinConfig,
		_ => return None,
	})
}

/// Text between the opening quote and the closing quote (or end of line).
fn quoted_value(rest: &str) -> Option<&str> {
	let rest = rest.trim_start();
	if !rest.starts_with('"') {
		return None;
	}
	let rest = &rest[1..];
	Some(match rest.find('"') {
		Some(end) => &rest[..end],
		None => rest.trim_end(),
	})
}

fn parse_number(token: &str, max_digits: usize) -> Option<i64> {
	let digits = token.trim_start_matches(|c: char| c == '+' || c == '-');
	if digits.is_empty() || digits.len() > max_digits || token.len() - digits.len() > 1 {
		return None;
	}
	token.parse::<i64>().ok()
}

struct Parser {
	record: EepromRecord,
	serial_number: SerialNumber,
	diagnostics: Vec<Diagnostic>,
}

impl Parser {
	fn new() -> Self {
		Parser {
			record: EepromRecord::new(),
			serial_number: SerialNumber::default(),
			diagnostics: Vec::new(),
		}
	}

	fn report(&mut self, diagnostic: Diagnostic) {
		warn!("{}", diagnostic);
		self.diagnostics.push(diagnostic);
	}

	fn line(&mut self, line_no: usize, raw: &str) {
		let text = raw.split(COMMENT).next().unwrap_or("").trim_start();
		let text = text.trim_end_matches(|c: char| c == '\r' || c == '\n');

		let first = match text.chars().next() {
			None => return,
			Some(c) => c,
		};
		if !first.is_ascii_alphanumeric() {
			self.report(Diagnostic::UnparsableLine { line: line_no, text: text.to_string() });
			return;
		}

		debug!("processing line {}: {}", line_no, text);

		let command_end = text.find(char::is_whitespace).unwrap_or(text.len());
		let (command, rest) = text.split_at(command_end);

		match lookup_key(command) {
			None => self.report(Diagnostic::UnknownKey { line: line_no, key: command.to_string() }),
			Some(Key::Text(field, key, max)) => self.text_field(line_no, field, key, max, rest),
			Some(Key::Number(field, key)) => self.number_field(line_no, field, key, rest),
			Some(Key::PinConfig) => self.pin_config(line_no, rest),
		}
	}

	fn text_field(&mut self, line_no: usize, field: TextField, key: &'static str, max: usize, rest: &str) {
		let value = match quoted_value(rest) {
			Some(v) => v,
			None => {
				self.report(Diagnostic::MissingQuotedValue { line: line_no, key });
				return;
			},
		};

		let complete = match field {
			TextField::BoardName => self.record.set_board_name(value),
			TextField::Version => self.record.set_version(value),
			TextField::Manufacturer => self.record.set_manufacturer(value),
			TextField::PartNumber => self.record.set_part_number(value),
			TextField::AssemblyCode => {
				let code = truncate_bytes(value, max);
				self.serial_number.assembly_code = Some(code.to_string());
				code.len() == value.len()
			},
		};
		if !complete {
			self.report(Diagnostic::ValueTruncated { line: line_no, key, max });
		}
	}

	fn number_field(&mut self, line_no: usize, field: NumberField, key: &'static str, rest: &str) {
		let (digits, min, max) = field.limits();
		let token = rest.split_whitespace().next().unwrap_or("");
		let value = match parse_number(token, digits) {
			Some(v) => v,
			None => {
				self.report(Diagnostic::InvalidNumber { line: line_no, key, value: token.to_string() });
				return;
			},
		};
		if value < min || value > max {
			self.report(Diagnostic::OutOfRange { line: line_no, key, value, min, max });
			return;
		}

		// range checked above, fits into u16
		let v = value as u16;
		match field {
			NumberField::PinCount => self.record.set_pin_count(v),
			NumberField::Week => self.serial_number.week = Some(v as u8),
			NumberField::Year => self.serial_number.year = Some(v as u8),
			NumberField::BoardNumber => self.serial_number.board_number = Some(v),
			NumberField::Vdd3v3bCurrent => self.record.set_vdd_3v3b_current(v),
			NumberField::Vdd5vCurrent => self.record.set_vdd_5v_current(v),
			NumberField::Sys5vCurrent => self.record.set_sys_5v_current(v),
			NumberField::DcSupplied => self.record.set_dc_supplied(v),
		}
	}

	fn pin_config(&mut self, line_no: usize, rest: &str) {
		let mut tokens = rest.split_whitespace();
		let pin_s = tokens.next().unwrap_or("");

		let resolved = pin_s.parse::<PinId>().ok().and_then(|pin| Some((pin, pin.slot()?)));
		let (pin, slot) = match resolved {
			Some(r) => r,
			None => {
				self.report(Diagnostic::UnknownPin { line: line_no, pin: pin_s.to_string() });
				return;
			},
		};

		let mut builder = PinConfigBuilder::new();
		if let Some(t) = tokens.next() { builder.mode(t); }
		if let Some(t) = tokens.next() { builder.slew(t); }
		if let Some(t) = tokens.next() { builder.direction(t); }
		if let Some(t) = tokens.next() { builder.pull(t); }
		if let Some(t) = tokens.next() { builder.receiver(t); }

		match builder.build() {
			Ok(config) => {
				let descriptor = config.encode();
				trace!("{} (slot {}): {:?}", pin, slot, descriptor);
				self.record.set_pin(slot, descriptor);
			},
			Err(errors) => {
				for error in errors {
					self.report(Diagnostic::InvalidPinField { line: line_no, pin, error });
				}
			},
		}
	}

	fn finish(mut self, today: NaiveDate, entropy: &mut dyn Entropy) -> ParsedConfig {
		let serial = self.serial_number.build(today, entropy);
		self.record.set_serial(serial);
		ParsedConfig {
			record: self.record,
			serial_number: self.serial_number,
			diagnostics: self.diagnostics,
		}
	}
}

/// Parses a complete cape description. `today` and `entropy` supply
/// defaults for an incomplete serial number.
pub fn parse_str(text: &str, today: NaiveDate, entropy: &mut dyn Entropy) -> ParsedConfig {
	let mut parser = Parser::new();
	for (i, line) in text.lines().enumerate() {
		parser.line(i + 1, line);
	}
	parser.finish(today, entropy)
}

/// Like [`parse_str`]; fails only if reading fails. Invalid UTF-8 is
/// replaced, not rejected.
pub fn parse_reader<R: BufRead>(reader: R, today: NaiveDate, entropy: &mut dyn Entropy) -> crate::AResult<ParsedConfig> {
	let mut parser = Parser::new();
	for (i, line) in reader.split(b'\n').enumerate() {
		let line_no = i + 1;
		let line = with_context!(("couldn't read line {}", line_no), Ok(line?))?;
		let line = String::from_utf8_lossy(&line);
		parser.line(line_no, line.strip_suffix('\r').unwrap_or(&line[..]));
	}
	Ok(parser.finish(today, entropy))
}
