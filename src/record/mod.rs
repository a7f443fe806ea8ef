//! Cape EEPROM record: fixed layout, all integers big-endian.
//!
//! ```text
//! offset  size  field
//! 0x000      4  magic (aa 55 33 ee)
//! 0x004      2  revision ("A1")
//! 0x006     32  board name
//! 0x026      4  version
//! 0x02a     16  manufacturer
//! 0x03a     16  part number
//! 0x04a      2  number of pins used
//! 0x04c     12  serial number (WWYYAAAANNNN)
//! 0x058    148  pin descriptors, 74 x u16
//! 0x0ec      2  VDD_3V3B current (mA)
//! 0x0ee      2  VDD_5V current (mA)
//! 0x0f0      2  SYS_5V current (mA)
//! 0x0f2      2  DC supplied (mA)
//! ```

use std::fmt;

use crate::pins::{
	PIN_SLOTS,
	PinConfig,
	PinDescriptor,
	PinId,
	pin_for_slot,
};
use crate::serial_number::{
	BOARD_NUMBER_LEN,
	BOARD_NUMBER_OFFSET,
	SERIAL_LEN,
	format_board_number,
};

mod display;

pub use self::display::{
	HexDump,
	Summary,
};

pub const MAGIC: [u8; 4] = [0xaa, 0x55, 0x33, 0xee];
pub const REVISION: [u8; 2] = *b"A1";

pub const BOARD_NAME_LEN: usize = 32;
pub const VERSION_LEN: usize = 4;
pub const MANUFACTURER_LEN: usize = 16;
pub const PART_NUMBER_LEN: usize = 16;

mod offsets {
	use super::*;

	pub const MAGIC: usize = 0x000;
	pub const REVISION: usize = 0x004;
	pub const BOARD_NAME: usize = 0x006;
	pub const VERSION: usize = BOARD_NAME + BOARD_NAME_LEN;
	pub const MANUFACTURER: usize = VERSION + VERSION_LEN;
	pub const PART_NUMBER: usize = MANUFACTURER + MANUFACTURER_LEN;
	pub const PIN_COUNT: usize = PART_NUMBER + PART_NUMBER_LEN;
	pub const SERIAL: usize = PIN_COUNT + 2;
	pub const PINS: usize = SERIAL + SERIAL_LEN;
	pub const VDD_3V3B_CURRENT: usize = PINS + 2 * PIN_SLOTS;
	pub const VDD_5V_CURRENT: usize = VDD_3V3B_CURRENT + 2;
	pub const SYS_5V_CURRENT: usize = VDD_5V_CURRENT + 2;
	pub const DC_SUPPLIED: usize = SYS_5V_CURRENT + 2;
	pub const END: usize = DC_SUPPLIED + 2;
}

/// Size of an encoded record in bytes.
pub const RECORD_SIZE: usize = offsets::END;

/// What to do with binary input shorter than [`RECORD_SIZE`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Truncation {
	/// Missing trailing bytes read as zero (with a warning).
	ZeroFill,
	Reject,
}

impl Default for Truncation {
	fn default() -> Self {
		Truncation::ZeroFill
	}
}

fn read_u16(buf: &[u8], offset: usize) -> u16 {
	u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

fn write_u16(buf: &mut [u8], offset: usize, value: u16) {
	buf[offset..offset + 2].copy_from_slice(&value.to_be_bytes());
}

fn copy_field<T: AsMut<[u8]>>(buf: &[u8], offset: usize, mut field: T) -> T {
	let len = field.as_mut().len();
	field.as_mut().copy_from_slice(&buf[offset..offset + len]);
	field
}

// text up to the first NUL byte
fn ascii_view(field: &[u8]) -> String {
	let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
	String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Longest prefix of `value` with at most `max` bytes that ends on a
/// char boundary.
pub(crate) fn truncate_bytes(value: &str, max: usize) -> &str {
	if value.len() <= max {
		return value;
	}
	let mut end = max;
	while !value.is_char_boundary(end) {
		end -= 1;
	}
	&value[..end]
}

/// Stores `value` zero padded; returns false if it had to be truncated.
fn set_ascii(field: &mut [u8], value: &str) -> bool {
	let stored = truncate_bytes(value, field.len()).as_bytes();
	for b in field.iter_mut() {
		*b = 0;
	}
	field[..stored.len()].copy_from_slice(stored);
	stored.len() == value.len()
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EepromRecord {
	magic: [u8; 4],
	revision: [u8; 2],
	board_name: [u8; BOARD_NAME_LEN],
	version: [u8; VERSION_LEN],
	manufacturer: [u8; MANUFACTURER_LEN],
	part_number: [u8; PART_NUMBER_LEN],
	pin_count: u16,
	serial: [u8; SERIAL_LEN],
	pins: [PinDescriptor; PIN_SLOTS],
	vdd_3v3b_current: u16,
	vdd_5v_current: u16,
	sys_5v_current: u16,
	dc_supplied: u16,
}

impl EepromRecord {
	/// All bytes zero, including magic and revision.
	pub fn zeroed() -> Self {
		EepromRecord {
			magic: [0; 4],
			revision: [0; 2],
			board_name: [0; BOARD_NAME_LEN],
			version: [0; VERSION_LEN],
			manufacturer: [0; MANUFACTURER_LEN],
			part_number: [0; PART_NUMBER_LEN],
			pin_count: 0,
			serial: [0; SERIAL_LEN],
			pins: [PinDescriptor::UNUSED; PIN_SLOTS],
			vdd_3v3b_current: 0,
			vdd_5v_current: 0,
			sys_5v_current: 0,
			dc_supplied: 0,
		}
	}

	/// Empty record with magic and revision set.
	pub fn new() -> Self {
		EepromRecord {
			magic: MAGIC,
			revision: REVISION,
			..Self::zeroed()
		}
	}

	/// Takes the fields verbatim from the first [`RECORD_SIZE`] bytes of
	/// `buf`; magic and revision are not checked.
	pub fn load_from_bytes(buf: &[u8], truncation: Truncation) -> crate::AResult<Self> {
		let mut raw = [0u8; RECORD_SIZE];
		if buf.len() < RECORD_SIZE {
			ensure!(truncation != Truncation::Reject,
				"truncated EEPROM record: got {} bytes, expected {}", buf.len(), RECORD_SIZE
			);
			warn!("EEPROM record has only {} of {} bytes, missing bytes read as zero", buf.len(), RECORD_SIZE);
		} else if buf.len() > RECORD_SIZE {
			debug!("ignoring {} bytes after EEPROM record", buf.len() - RECORD_SIZE);
		}
		let len = buf.len().min(RECORD_SIZE);
		raw[..len].copy_from_slice(&buf[..len]);

		let mut pins = [PinDescriptor::UNUSED; PIN_SLOTS];
		for (slot, pin) in pins.iter_mut().enumerate() {
			*pin = PinDescriptor(read_u16(&raw, offsets::PINS + 2 * slot));
		}

		Ok(EepromRecord {
			magic: copy_field(&raw, offsets::MAGIC, [0; 4]),
			revision: copy_field(&raw, offsets::REVISION, [0; 2]),
			board_name: copy_field(&raw, offsets::BOARD_NAME, [0; BOARD_NAME_LEN]),
			version: copy_field(&raw, offsets::VERSION, [0; VERSION_LEN]),
			manufacturer: copy_field(&raw, offsets::MANUFACTURER, [0; MANUFACTURER_LEN]),
			part_number: copy_field(&raw, offsets::PART_NUMBER, [0; PART_NUMBER_LEN]),
			pin_count: read_u16(&raw, offsets::PIN_COUNT),
			serial: copy_field(&raw, offsets::SERIAL, [0; SERIAL_LEN]),
			pins,
			vdd_3v3b_current: read_u16(&raw, offsets::VDD_3V3B_CURRENT),
			vdd_5v_current: read_u16(&raw, offsets::VDD_5V_CURRENT),
			sys_5v_current: read_u16(&raw, offsets::SYS_5V_CURRENT),
			dc_supplied: read_u16(&raw, offsets::DC_SUPPLIED),
		})
	}

	pub fn encode_to_bytes(&self) -> [u8; RECORD_SIZE] {
		let mut buf = [0u8; RECORD_SIZE];
		buf[offsets::MAGIC..][..4].copy_from_slice(&self.magic);
		buf[offsets::REVISION..][..2].copy_from_slice(&self.revision);
		buf[offsets::BOARD_NAME..][..BOARD_NAME_LEN].copy_from_slice(&self.board_name);
		buf[offsets::VERSION..][..VERSION_LEN].copy_from_slice(&self.version);
		buf[offsets::MANUFACTURER..][..MANUFACTURER_LEN].copy_from_slice(&self.manufacturer);
		buf[offsets::PART_NUMBER..][..PART_NUMBER_LEN].copy_from_slice(&self.part_number);
		write_u16(&mut buf, offsets::PIN_COUNT, self.pin_count);
		buf[offsets::SERIAL..][..SERIAL_LEN].copy_from_slice(&self.serial);
		for (slot, pin) in self.pins.iter().enumerate() {
			write_u16(&mut buf, offsets::PINS + 2 * slot, pin.0);
		}
		write_u16(&mut buf, offsets::VDD_3V3B_CURRENT, self.vdd_3v3b_current);
		write_u16(&mut buf, offsets::VDD_5V_CURRENT, self.vdd_5v_current);
		write_u16(&mut buf, offsets::SYS_5V_CURRENT, self.sys_5v_current);
		write_u16(&mut buf, offsets::DC_SUPPLIED, self.dc_supplied);
		buf
	}

	/// Replaces the last four serial number digits, the rest of the serial
	/// number stays as it is.
	pub fn set_board_number(&mut self, board_number: u16) {
		let digits = format_board_number(board_number);
		self.serial[BOARD_NUMBER_OFFSET..][..BOARD_NUMBER_LEN].copy_from_slice(&digits);
	}

	pub fn magic(&self) -> [u8; 4] {
		self.magic
	}

	pub fn revision(&self) -> [u8; 2] {
		self.revision
	}

	pub fn board_name(&self) -> String {
		ascii_view(&self.board_name)
	}

	pub fn version(&self) -> String {
		ascii_view(&self.version)
	}

	pub fn manufacturer(&self) -> String {
		ascii_view(&self.manufacturer)
	}

	pub fn part_number(&self) -> String {
		ascii_view(&self.part_number)
	}

	pub fn serial(&self) -> String {
		ascii_view(&self.serial)
	}

	pub fn serial_bytes(&self) -> &[u8; SERIAL_LEN] {
		&self.serial
	}

	pub fn board_number(&self) -> String {
		ascii_view(&self.serial[BOARD_NUMBER_OFFSET..])
	}

	pub fn pin_count(&self) -> u16 {
		self.pin_count
	}

	pub fn vdd_3v3b_current(&self) -> u16 {
		self.vdd_3v3b_current
	}

	pub fn vdd_5v_current(&self) -> u16 {
		self.vdd_5v_current
	}

	pub fn sys_5v_current(&self) -> u16 {
		self.sys_5v_current
	}

	pub fn dc_supplied(&self) -> u16 {
		self.dc_supplied
	}

	pub fn pin(&self, slot: usize) -> Option<PinDescriptor> {
		self.pins.get(slot).copied()
	}

	pub fn pins(&self) -> &[PinDescriptor; PIN_SLOTS] {
		&self.pins
	}

	/// Configured pins in slot order.
	pub fn used_pins<'a>(&'a self) -> impl Iterator<Item = (PinId, PinConfig)> + 'a {
		self.pins.iter().enumerate().filter_map(|(slot, pin)| {
			Some((pin_for_slot(slot)?, pin.decode()?))
		})
	}

	pub(crate) fn set_board_name(&mut self, value: &str) -> bool {
		set_ascii(&mut self.board_name, value)
	}

	pub(crate) fn set_version(&mut self, value: &str) -> bool {
		set_ascii(&mut self.version, value)
	}

	pub(crate) fn set_manufacturer(&mut self, value: &str) -> bool {
		set_ascii(&mut self.manufacturer, value)
	}

	pub(crate) fn set_part_number(&mut self, value: &str) -> bool {
		set_ascii(&mut self.part_number, value)
	}

	pub(crate) fn set_pin_count(&mut self, value: u16) {
		self.pin_count = value;
	}

	pub(crate) fn set_serial(&mut self, serial: [u8; SERIAL_LEN]) {
		self.serial = serial;
	}

	pub(crate) fn set_pin(&mut self, slot: usize, descriptor: PinDescriptor) {
		self.pins[slot] = descriptor;
	}

	pub(crate) fn set_vdd_3v3b_current(&mut self, value: u16) {
		self.vdd_3v3b_current = value;
	}

	pub(crate) fn set_vdd_5v_current(&mut self, value: u16) {
		self.vdd_5v_current = value;
	}

	pub(crate) fn set_sys_5v_current(&mut self, value: u16) {
		self.sys_5v_current = value;
	}

	pub(crate) fn set_dc_supplied(&mut self, value: u16) {
		self.dc_supplied = value;
	}
}

impl Default for EepromRecord {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for EepromRecord {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.debug_struct("EepromRecord")
			.field("magic", &self.magic)
			.field("revision", &String::from_utf8_lossy(&self.revision))
			.field("board_name", &self.board_name())
			.field("version", &self.version())
			.field("manufacturer", &self.manufacturer())
			.field("part_number", &self.part_number())
			.field("pin_count", &self.pin_count)
			.field("serial", &self.serial())
			.field("used_pins", &self.pins.iter().filter(|p| p.is_used()).count())
			.field("vdd_3v3b_current", &self.vdd_3v3b_current)
			.field("vdd_5v_current", &self.vdd_5v_current)
			.field("sys_5v_current", &self.sys_5v_current)
			.field("dc_supplied", &self.dc_supplied)
			.finish()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::pins::{
		Direction,
		Pull,
		Receiver,
		Slew,
		slot_for,
	};

	fn sample() -> EepromRecord {
		let mut r = EepromRecord::new();
		r.set_board_name("BeagleBone LCD4 CAPE");
		r.set_version("00A1");
		r.set_manufacturer("CircuitCo");
		r.set_part_number("BB-BONE-LCD4-01");
		r.set_pin_count(28);
		r.set_serial(*b"1217BBBK0042");
		r.set_vdd_3v3b_current(500);
		r.set_vdd_5v_current(1000);
		r.set_sys_5v_current(250);
		r.set_dc_supplied(0xabcd);
		let c = PinConfig::new(7, Direction::Output, Slew::Fast, Pull::Up, Receiver::Enabled).unwrap();
		r.set_pin(slot_for(8, 13).unwrap(), c.encode());
		r
	}

	#[test]
	fn layout() {
		assert_eq!(RECORD_SIZE, 244);
		let buf = sample().encode_to_bytes();
		assert_eq!(&buf[0..4], &[0xaa, 0x55, 0x33, 0xee]);
		assert_eq!(&buf[4..6], b"A1");
		assert_eq!(&buf[6..26], b"BeagleBone LCD4 CAPE");
		assert!(buf[26..38].iter().all(|&b| b == 0));
		assert_eq!(&buf[38..42], b"00A1");
		assert_eq!(&buf[42..51], b"CircuitCo");
		assert_eq!(&buf[58..73], b"BB-BONE-LCD4-01");
		assert_eq!(&buf[74..76], &[0x00, 28]);
		assert_eq!(&buf[76..88], b"1217BBBK0042");
		// P8_13 is slot 15
		assert_eq!(&buf[88 + 30..88 + 32], &[0xc0, 0x37]);
		assert_eq!(&buf[236..238], &[0x01, 0xf4]);
		assert_eq!(&buf[238..240], &[0x03, 0xe8]);
		assert_eq!(&buf[240..242], &[0x00, 0xfa]);
		assert_eq!(&buf[242..244], &[0xab, 0xcd]);
	}

	#[test]
	fn load_encoded() {
		let r = sample();
		let buf = r.encode_to_bytes();
		let loaded = EepromRecord::load_from_bytes(&buf, Truncation::Reject).unwrap();
		assert_eq!(loaded, r);
		assert_eq!(loaded.board_name(), "BeagleBone LCD4 CAPE");
		assert_eq!(loaded.part_number(), "BB-BONE-LCD4-01");
		assert_eq!(loaded.serial(), "1217BBBK0042");
		assert_eq!(loaded.board_number(), "0042");
		assert_eq!(loaded.used_pins().map(|(p, _)| p).collect::<Vec<_>>(), vec![PinId::new(8, 13)]);
	}

	#[test]
	fn truncated_input() {
		let buf = sample().encode_to_bytes();
		assert!(EepromRecord::load_from_bytes(&buf[..100], Truncation::Reject).is_err());

		let loaded = EepromRecord::load_from_bytes(&buf[..100], Truncation::ZeroFill).unwrap();
		assert_eq!(&loaded.encode_to_bytes()[..100], &buf[..100]);
		assert!(loaded.encode_to_bytes()[100..].iter().all(|&b| b == 0));
		assert_eq!(loaded.dc_supplied(), 0);

		let empty = EepromRecord::load_from_bytes(&[], Truncation::ZeroFill).unwrap();
		assert_eq!(empty, EepromRecord::zeroed());
	}

	#[test]
	fn trailing_bytes_ignored() {
		let r = sample();
		let mut buf = r.encode_to_bytes().to_vec();
		buf.extend_from_slice(&[0xff; 16]);
		assert_eq!(EepromRecord::load_from_bytes(&buf, Truncation::Reject).unwrap(), r);
	}

	#[test]
	fn board_number_override() {
		let mut r = sample();
		r.set_board_number(7);
		assert_eq!(r.serial(), "1217BBBK0007");
		r.set_board_number(9999);
		assert_eq!(r.serial(), "1217BBBK9999");
	}

	#[test]
	fn strings_replace_and_truncate() {
		let mut r = EepromRecord::new();
		assert!(r.set_version("00B0"));
		assert!(r.set_version("A"));
		assert_eq!(r.version(), "A");
		assert!(!r.set_version("00A12"));
		assert_eq!(r.version(), "00A1");
	}

	#[test]
	fn truncate_on_char_boundary() {
		let mut r = EepromRecord::new();
		// 'ü' occupies bytes 3 and 4
		assert!(!r.set_version("000\u{fc}"));
		assert_eq!(r.version(), "000");
		assert_eq!(&r.encode_to_bytes()[38..42], &[b'0', b'0', b'0', 0]);
		assert!(r.set_version("0\u{fc}A"));
		assert_eq!(r.version(), "0\u{fc}A");

		assert_eq!(truncate_bytes("a\u{20ac}", 2), "a");
		assert_eq!(truncate_bytes("a\u{20ac}", 4), "a\u{20ac}");
	}
}
