use std::fmt;

use failure::Fail;

// descriptor word layout
const PIN_USED: u16           = 0x0001 << 15;
const DIRECTION_SHIFT: u16    = 13;
const DIRECTION_MASK: u16     = 0x0003 << DIRECTION_SHIFT;
const SLEW_SLOW: u16          = 0x0001 << 6;
const RX_ENABLE: u16          = 0x0001 << 5;
const PULL_UP: u16            = 0x0001 << 4;
const PULL_DISABLE: u16       = 0x0001 << 3;
const MODE_MASK: u16          = 0x0007;

pub const MAX_MODE: u8 = 7;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Direction {
	Input,
	Output,
	Bidirectional,
}

impl Direction {
	pub const ALL: [Direction; 3] = [Direction::Input, Direction::Output, Direction::Bidirectional];

	pub fn from_token(token: &str) -> Option<Self> {
		match token {
			"INPUT" => Some(Direction::Input),
			"OUTPUT" => Some(Direction::Output),
			"BDIR" => Some(Direction::Bidirectional),
			_ => None,
		}
	}

	pub fn token(&self) -> &'static str {
		match self {
			Direction::Input => "INPUT",
			Direction::Output => "OUTPUT",
			Direction::Bidirectional => "BDIR",
		}
	}

	fn bits(&self) -> u16 {
		let v = match self {
			Direction::Input => 0b01,
			Direction::Output => 0b10,
			Direction::Bidirectional => 0b11,
		};
		v << DIRECTION_SHIFT
	}

	fn from_bits(word: u16) -> Self {
		match (word & DIRECTION_MASK) >> DIRECTION_SHIFT {
			0b10 => Direction::Output,
			0b11 => Direction::Bidirectional,
			// 0b00 never gets written; show it as input
			_ => Direction::Input,
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Slew {
	Slow,
	Fast,
}

impl Slew {
	pub const ALL: [Slew; 2] = [Slew::Slow, Slew::Fast];

	pub fn from_token(token: &str) -> Option<Self> {
		match token {
			"SLOW" => Some(Slew::Slow),
			"FAST" => Some(Slew::Fast),
			_ => None,
		}
	}

	pub fn token(&self) -> &'static str {
		match self {
			Slew::Slow => "SLOW",
			Slew::Fast => "FAST",
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Pull {
	Up,
	Down,
	Disabled,
}

impl Pull {
	pub const ALL: [Pull; 3] = [Pull::Up, Pull::Down, Pull::Disabled];

	pub fn from_token(token: &str) -> Option<Self> {
		match token {
			"PULL_UP" => Some(Pull::Up),
			"PULL_DOWN" => Some(Pull::Down),
			"PULL_NONE" => Some(Pull::Disabled),
			_ => None,
		}
	}

	pub fn token(&self) -> &'static str {
		match self {
			Pull::Up => "PULL_UP",
			Pull::Down => "PULL_DOWN",
			Pull::Disabled => "PULL_NONE",
		}
	}
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Receiver {
	Enabled,
	Disabled,
}

impl Receiver {
	pub const ALL: [Receiver; 2] = [Receiver::Enabled, Receiver::Disabled];

	pub fn from_token(token: &str) -> Option<Self> {
		match token {
			"RX_ENABLE" => Some(Receiver::Enabled),
			"RX_DISABLE" => Some(Receiver::Disabled),
			_ => None,
		}
	}

	pub fn token(&self) -> &'static str {
		match self {
			Receiver::Enabled => "RX_ENABLE",
			Receiver::Disabled => "RX_DISABLE",
		}
	}
}

macro_rules! token_display {
	($($t:ty),*) => {$(
		impl fmt::Display for $t {
			fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
				f.pad(self.token())
			}
		}
	)*};
}

token_display!(Direction, Slew, Pull, Receiver);

/// The parts of a `pinconfig` line after the pin name.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PinField {
	Mode,
	Slew,
	Direction,
	Pull,
	Receiver,
}

impl fmt::Display for PinField {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			PinField::Mode => "mode",
			PinField::Slew => "slew rate",
			PinField::Direction => "direction",
			PinField::Pull => "pull type",
			PinField::Receiver => "rx",
		})
	}
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct InvalidPinField {
	pub field: PinField,
	/// `None` if the token was missing altogether
	pub value: Option<String>,
}

impl fmt::Display for InvalidPinField {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match &self.value {
			Some(v) => write!(f, "{} not recognised: {:?}", self.field, v),
			None => write!(f, "{} missing", self.field),
		}
	}
}

impl Fail for InvalidPinField {}

/// Validated electrical configuration of a single pin.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PinConfig {
	mode: u8,
	slew: Slew,
	direction: Direction,
	pull: Pull,
	receiver: Receiver,
}

impl PinConfig {
	pub fn new(mode: u8, direction: Direction, slew: Slew, pull: Pull, receiver: Receiver) -> Result<Self, InvalidPinField> {
		if mode > MAX_MODE {
			return Err(InvalidPinField {
				field: PinField::Mode,
				value: Some(mode.to_string()),
			});
		}
		Ok(PinConfig { mode, slew, direction, pull, receiver })
	}

	pub fn mode(&self) -> u8 {
		self.mode
	}

	pub fn slew(&self) -> Slew {
		self.slew
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	pub fn pull(&self) -> Pull {
		self.pull
	}

	pub fn receiver(&self) -> Receiver {
		self.receiver
	}

	pub fn encode(&self) -> PinDescriptor {
		let mut word = PIN_USED | self.direction.bits() | u16::from(self.mode);
		if self.slew == Slew::Slow {
			word |= SLEW_SLOW;
		}
		if self.receiver == Receiver::Enabled {
			word |= RX_ENABLE;
		}
		match self.pull {
			Pull::Up => word |= PULL_UP,
			Pull::Down => (),
			Pull::Disabled => word |= PULL_DISABLE,
		}
		PinDescriptor(word)
	}
}

/// Raw 16-bit descriptor word as stored in a record slot.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PinDescriptor(pub u16);

impl PinDescriptor {
	pub const UNUSED: PinDescriptor = PinDescriptor(0);

	pub fn is_used(&self) -> bool {
		0 != self.0 & PIN_USED
	}

	/// `None` for slots not marked as used
	pub fn decode(&self) -> Option<PinConfig> {
		if !self.is_used() {
			return None;
		}
		let w = self.0;
		let pull = if 0 != w & PULL_DISABLE {
			Pull::Disabled
		} else if 0 != w & PULL_UP {
			Pull::Up
		} else {
			Pull::Down
		};
		Some(PinConfig {
			mode: (w & MODE_MASK) as u8,
			slew: if 0 != w & SLEW_SLOW { Slew::Slow } else { Slew::Fast },
			direction: Direction::from_bits(w),
			pull,
			receiver: if 0 != w & RX_ENABLE { Receiver::Enabled } else { Receiver::Disabled },
		})
	}
}

impl fmt::Debug for PinDescriptor {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "0x{:04x}", self.0)?;
		if let Some(c) = self.decode() {
			write!(f, " (mode {} {} {} {} {})", c.mode, c.slew, c.direction, c.pull, c.receiver)?;
		}
		Ok(())
	}
}

/// Collects the tokens of a `pinconfig` line; only yields a `PinConfig`
/// when every field is valid.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PinConfigBuilder {
	mode: Option<Result<u8, String>>,
	slew: Option<Result<Slew, String>>,
	direction: Option<Result<Direction, String>>,
	pull: Option<Result<Pull, String>>,
	receiver: Option<Result<Receiver, String>>,
}

fn field_from<T>(token: &str, parse: fn(&str) -> Option<T>) -> Result<T, String> {
	parse(token).ok_or_else(|| token.to_string())
}

fn parse_mode(token: &str) -> Option<u8> {
	token.parse::<u8>().ok().filter(|&m| m <= MAX_MODE)
}

fn check<T: Copy>(field: PinField, value: &Option<Result<T, String>>, errors: &mut Vec<InvalidPinField>) -> Option<T> {
	match value {
		Some(Ok(v)) => Some(*v),
		Some(Err(token)) => {
			errors.push(InvalidPinField { field, value: Some(token.clone()) });
			None
		},
		None => {
			errors.push(InvalidPinField { field, value: None });
			None
		},
	}
}

impl PinConfigBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn mode(&mut self, token: &str) -> &mut Self {
		self.mode = Some(field_from(token, parse_mode));
		self
	}

	pub fn slew(&mut self, token: &str) -> &mut Self {
		self.slew = Some(field_from(token, Slew::from_token));
		self
	}

	pub fn direction(&mut self, token: &str) -> &mut Self {
		self.direction = Some(field_from(token, Direction::from_token));
		self
	}

	pub fn pull(&mut self, token: &str) -> &mut Self {
		self.pull = Some(field_from(token, Pull::from_token));
		self
	}

	pub fn receiver(&mut self, token: &str) -> &mut Self {
		self.receiver = Some(field_from(token, Receiver::from_token));
		self
	}

	/// Every invalid or missing field is reported, in line order.
	pub fn build(&self) -> Result<PinConfig, Vec<InvalidPinField>> {
		let mut errors = Vec::new();
		let mode = check(PinField::Mode, &self.mode, &mut errors);
		let slew = check(PinField::Slew, &self.slew, &mut errors);
		let direction = check(PinField::Direction, &self.direction, &mut errors);
		let pull = check(PinField::Pull, &self.pull, &mut errors);
		let receiver = check(PinField::Receiver, &self.receiver, &mut errors);

		match (mode, slew, direction, pull, receiver) {
			(Some(mode), Some(slew), Some(direction), Some(pull), Some(receiver)) if errors.is_empty() => {
				Ok(PinConfig { mode, slew, direction, pull, receiver })
			},
			_ => Err(errors),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn encode_decode_all_combinations() {
		for mode in 0..=MAX_MODE {
			for &direction in Direction::ALL.iter() {
				for &slew in Slew::ALL.iter() {
					for &pull in Pull::ALL.iter() {
						for &receiver in Receiver::ALL.iter() {
							let config = PinConfig::new(mode, direction, slew, pull, receiver).unwrap();
							let word = config.encode();
							assert!(word.is_used(), "{:?} not marked used", config);
							assert_eq!(word.decode(), Some(config), "round trip failed for {:?}", word);
						}
					}
				}
			}
		}
	}

	#[test]
	fn known_words() {
		let c = PinConfig::new(7, Direction::Output, Slew::Fast, Pull::Up, Receiver::Enabled).unwrap();
		assert_eq!(c.encode(), PinDescriptor(0x8000 | 0x4000 | 0x0020 | 0x0010 | 0x0007));

		let c = PinConfig::new(0, Direction::Input, Slew::Slow, Pull::Disabled, Receiver::Disabled).unwrap();
		assert_eq!(c.encode(), PinDescriptor(0x8000 | 0x2000 | 0x0040 | 0x0008));

		let c = PinConfig::new(2, Direction::Bidirectional, Slew::Fast, Pull::Down, Receiver::Disabled).unwrap();
		assert_eq!(c.encode(), PinDescriptor(0x8000 | 0x6000 | 0x0002));
	}

	#[test]
	fn unused_slot_has_no_config() {
		assert_eq!(PinDescriptor::UNUSED.decode(), None);
		assert_eq!(PinDescriptor(0x6077).decode(), None);
	}

	#[test]
	fn mode_out_of_range() {
		let e = PinConfig::new(8, Direction::Input, Slew::Fast, Pull::Up, Receiver::Enabled).unwrap_err();
		assert_eq!(e.field, PinField::Mode);
	}

	#[test]
	fn builder_valid_tokens() {
		let c = PinConfigBuilder::new()
			.mode("4")
			.slew("SLOW")
			.direction("BDIR")
			.pull("PULL_NONE")
			.receiver("RX_ENABLE")
			.build()
			.unwrap();
		assert_eq!(c, PinConfig::new(4, Direction::Bidirectional, Slew::Slow, Pull::Disabled, Receiver::Enabled).unwrap());
	}

	#[test]
	fn builder_reports_every_invalid_field() {
		let errors = PinConfigBuilder::new()
			.mode("9")
			.slew("SLOW")
			.direction("SIDEWAYS")
			.pull("PULL_UP")
			.build()
			.unwrap_err();
		assert_eq!(errors, vec![
			InvalidPinField { field: PinField::Mode, value: Some("9".into()) },
			InvalidPinField { field: PinField::Direction, value: Some("SIDEWAYS".into()) },
			InvalidPinField { field: PinField::Receiver, value: None },
		]);
	}

	#[test]
	fn tokens_are_case_sensitive() {
		assert_eq!(Pull::from_token("pull_up"), None);
		assert_eq!(Direction::from_token("Output"), None);
		assert_eq!(Slew::from_token("fast"), None);
		assert_eq!(Receiver::from_token("RX_ENABLED"), None);
	}
}
