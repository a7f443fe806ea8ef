use std::fmt;

use super::EepromRecord;

const RULER: &str = "#####################################################";

/// Human readable summary of a record, one line per used pin.
pub struct Summary<'a>(pub &'a EepromRecord);

impl<'a> fmt::Display for Summary<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let r = self.0;
		writeln!(f, "{}", RULER)?;
		writeln!(f, "Cape Name         : {}", r.board_name())?;
		writeln!(f, "Cape Version      : {}", r.version())?;
		writeln!(f, "Cape Manufacturer : {}", r.manufacturer())?;
		writeln!(f, "Part Number       : {}", r.part_number())?;
		writeln!(f, "Serial Number     : {}", r.serial())?;
		writeln!(f, "Pins Used         : {}", r.pin_count())?;
		writeln!(f, "VDD_3V3B Current  : {} mA", r.vdd_3v3b_current())?;
		writeln!(f, "VDD_5V Current    : {} mA", r.vdd_5v_current())?;
		writeln!(f, "SYS_5V Current    : {} mA", r.sys_5v_current())?;
		writeln!(f, "Supplied Current  : {} mA", r.dc_supplied())?;
		writeln!(f, "{}", RULER)?;
		writeln!(f, "Cape pins:")?;
		for (pin, config) in r.used_pins() {
			writeln!(f, "{:<7}{}  {:<7}{:<8}{:<11}{}",
				pin.to_string(),
				config.mode(),
				config.slew(),
				config.direction(),
				config.pull(),
				config.receiver(),
			)?;
		}
		Ok(())
	}
}

/// Classic hex dump: offset, 16 bytes split in two halves, printable ASCII.
pub struct HexDump<'a>(pub &'a [u8]);

impl<'a> fmt::Display for HexDump<'a> {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let data = self.0;
		for (row, chunk) in data.chunks(16).enumerate() {
			let offset = row * 16;
			if 0 == offset % 256 {
				writeln!(f, "     00 01 02 03 04 05 06 07 - 08 09 0a 0b 0c 0d 0e 0f")?;
			}
			write!(f, "{:04x} ", offset)?;
			for j in 0..16 {
				match chunk.get(j) {
					Some(b) => write!(f, "{:02x} ", b)?,
					None => write!(f, "   ")?,
				}
				if 7 == j {
					write!(f, "{}", if j < chunk.len() { "- " } else { "  " })?;
				}
			}
			write!(f, " | ")?;
			for (j, &b) in chunk.iter().enumerate() {
				let c = if b == b' ' || b.is_ascii_graphic() { b as char } else { '.' };
				write!(f, "{}", c)?;
				if 7 == j {
					write!(f, " ")?;
				}
			}
			writeln!(f)?;
		}
		Ok(())
	}
}
