#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod config;
pub mod pins;
pub mod record;
pub mod serial_number;

use std::fs;
use std::io;
use std::path::Path;

use chrono::Utc;

pub use self::config::ParsedConfig;
pub use self::record::{
	EepromRecord,
	Truncation,
};

/// Builds a record from a cape description file, using the current date
/// and `/dev/urandom` for serial number parts that are not configured.
pub fn build_from_config<P: AsRef<Path>>(path: P) -> AResult<ParsedConfig> {
	let path = path.as_ref();
	let file = with_context!(("couldn't open configuration file {}", path.display()),
		Ok(fs::File::open(path)?)
	)?;
	let today = Utc::now().naive_utc().date();
	let parsed = config::parse_reader(io::BufReader::new(file), today, &mut serial_number::DevUrandom)?;
	if !parsed.diagnostics.is_empty() {
		info!("{}: {} line(s) with problems were skipped", path.display(), parsed.diagnostics.len());
	}
	Ok(parsed)
}

/// Loads a binary EEPROM image.
pub fn load_from_binary<P: AsRef<Path>>(path: P, truncation: Truncation) -> AResult<EepromRecord> {
	let path = path.as_ref();
	let data = with_context!(("couldn't read EEPROM image {}", path.display()),
		Ok(fs::read(path)?)
	)?;
	with_context!(("invalid EEPROM image {}", path.display()),
		EepromRecord::load_from_bytes(&data, truncation)
	)
}

pub fn write_record<P: AsRef<Path>>(record: &EepromRecord, path: P) -> AResult<()> {
	let path = path.as_ref();
	with_context!(("couldn't write EEPROM image {}", path.display()),
		Ok(fs::write(path, &record.encode_to_bytes()[..])?)
	)?;
	info!("wrote {} bytes to {}", record::RECORD_SIZE, path.display());
	Ok(())
}
