//! Cape pins: where each header pin lives in the EEPROM record, and how its
//! 16-bit configuration word is packed.
//!
//! The record reserves one big-endian word per pin for the 74 pins of the
//! P8 and P9 headers that can be muxed; the slot order is fixed by the
//! board-identification firmware and has nothing to do with pin numbering.

mod descriptor;
mod table;

pub use self::descriptor::{
	Direction,
	InvalidPinField,
	PinConfig,
	PinConfigBuilder,
	PinDescriptor,
	PinField,
	Pull,
	Receiver,
	Slew,
};

pub use self::table::{
	PIN_SLOTS,
	PINS,
	PinId,
	pin_for_slot,
	slot_for,
};
