use std::fmt;
use std::str;

/// Number of pin slots in the record.
pub const PIN_SLOTS: usize = 74;

const FIRST_HEADER: u8 = 8;
const LAST_HEADER: u8 = 9;
const PINS_PER_HEADER: u8 = 46;

/// A physical pin on one of the expansion headers, e.g. `P8_13`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PinId {
	pub header: u8,
	pub pin: u8,
}

impl PinId {
	pub const fn new(header: u8, pin: u8) -> Self {
		PinId { header, pin }
	}

	pub fn slot(&self) -> Option<usize> {
		slot_for(self.header, self.pin)
	}
}

impl fmt::Display for PinId {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "P{}_{}", self.header, self.pin)
	}
}

impl str::FromStr for PinId {
	type Err = ::failure::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		ensure!(s.starts_with('P') || s.starts_with('p'), "pin name must start with 'P': {:?}", s);

		let mut parts = s[1..].splitn(2, '_');
		let header_s = parts.next().unwrap_or("");
		let pin_s = parts.next().ok_or_else(|| format_err!("Need '_' between header and pin: {:?}", s))?;

		let header = with_context!(("invalid header in pin name {:?}", s),
			Ok(header_s.parse::<u8>()?)
		)?;
		let pin = with_context!(("invalid pin number in pin name {:?}", s),
			Ok(pin_s.parse::<u8>()?)
		)?;

		Ok(PinId { header, pin })
	}
}

// slot order as expected by the cape manager
const PIN_ORDER: [PinId; PIN_SLOTS] = [
	PinId::new(9, 22), PinId::new(9, 21), PinId::new(9, 18), PinId::new(9, 17), PinId::new(9, 42),
	PinId::new(8, 35), PinId::new(8, 33), PinId::new(8, 31), PinId::new(8, 32), PinId::new(9, 19),
	PinId::new(9, 20), PinId::new(9, 26), PinId::new(9, 24), PinId::new(9, 41), PinId::new(8, 19),
	PinId::new(8, 13), PinId::new(8, 14), PinId::new(8, 17), PinId::new(9, 11), PinId::new(9, 13),
	PinId::new(8, 25), PinId::new(8, 24), PinId::new(8, 5), PinId::new(8, 6), PinId::new(8, 23),
	PinId::new(8, 22), PinId::new(8, 3), PinId::new(8, 4), PinId::new(8, 12), PinId::new(8, 11),
	PinId::new(8, 16), PinId::new(8, 15), PinId::new(9, 15), PinId::new(9, 23), PinId::new(9, 14),
	PinId::new(9, 16), PinId::new(9, 12), PinId::new(8, 26), PinId::new(8, 21), PinId::new(8, 20),
	PinId::new(8, 18), PinId::new(8, 7), PinId::new(8, 9), PinId::new(8, 10), PinId::new(8, 8),
	PinId::new(8, 45), PinId::new(8, 46), PinId::new(8, 43), PinId::new(8, 44), PinId::new(8, 41),
	PinId::new(8, 42), PinId::new(8, 39), PinId::new(8, 40), PinId::new(8, 37), PinId::new(8, 38),
	PinId::new(8, 36), PinId::new(8, 34), PinId::new(8, 27), PinId::new(8, 29), PinId::new(8, 28),
	PinId::new(8, 30), PinId::new(9, 29), PinId::new(9, 30), PinId::new(9, 28), PinId::new(9, 27),
	PinId::new(9, 31), PinId::new(9, 25), PinId::new(9, 39), PinId::new(9, 40), PinId::new(9, 37),
	PinId::new(9, 38), PinId::new(9, 33), PinId::new(9, 36), PinId::new(9, 35),
];

pub static PINS: [PinId; PIN_SLOTS] = PIN_ORDER;

const LOOKUP_LEN: usize = ((LAST_HEADER - FIRST_HEADER + 1) * PINS_PER_HEADER) as usize;

const fn lookup_index(header: u8, pin: u8) -> usize {
	((header - FIRST_HEADER) * PINS_PER_HEADER + (pin - 1)) as usize
}

const fn build_lookup() -> [Option<u8>; LOOKUP_LEN] {
	let mut lookup = [None; LOOKUP_LEN];
	let mut slot = 0;
	while slot < PIN_SLOTS {
		let p = PIN_ORDER[slot];
		lookup[lookup_index(p.header, p.pin)] = Some(slot as u8);
		slot += 1;
	}
	lookup
}

static SLOT_LOOKUP: [Option<u8>; LOOKUP_LEN] = build_lookup();

/// Record slot for header pin `P<header>_<pin>`; `None` if the pin has no slot.
pub fn slot_for(header: u8, pin: u8) -> Option<usize> {
	if header < FIRST_HEADER || header > LAST_HEADER || pin < 1 || pin > PINS_PER_HEADER {
		return None;
	}
	SLOT_LOOKUP[lookup_index(header, pin)].map(usize::from)
}

pub fn pin_for_slot(slot: usize) -> Option<PinId> {
	PINS.get(slot).copied()
}
