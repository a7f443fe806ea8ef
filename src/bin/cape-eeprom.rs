#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate cape_eeprom;
use cape_eeprom::*;

use std::process::exit;

use cape_eeprom::record::{
	HexDump,
	Summary,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<Option<T>>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => return Ok(None),
	};
	param.parse::<T>().map(Some).map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid parameter {}: {}", name, e);
		e.context(msg).into()
	})
}

fn is_text_config(path: &str) -> bool {
	path.contains(".txt")
}

fn output_name(record: &EepromRecord, with_board_number: bool) -> String {
	if with_board_number {
		format!("{}-{}-{}.eep", record.part_number(), record.version(), record.board_number())
	} else {
		format!("{}-{}.eep", record.part_number(), record.version())
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg print: -p --print "print the cape information")
		(@arg dump: -d --dump "hex dump the EEPROM image")
		(@arg board_number: -n --number +takes_value "override the board number (0-9999)")
		(@arg strict: --strict "reject binary images shorter than a full record")
		(@arg INPUT: +required "cape description (*.txt) or binary EEPROM image")
		(@arg OUTPUT: "EEPROM image to write (default: <part number>-<version>[-<board number>].eep)")
	).get_matches();

	let input = matches.value_of("INPUT").ok_or_else(|| format_err!("missing parameter INPUT"))?;
	let board_number: Option<u16> = get_param(&matches, "board_number")?;
	if let Some(n) = board_number {
		ensure!(n <= serial_number::MAX_BOARD_NUMBER, "board number {} too big (max {})", n, serial_number::MAX_BOARD_NUMBER);
	}
	let truncation = if matches.is_present("strict") { Truncation::Reject } else { Truncation::ZeroFill };

	let text_mode = is_text_config(input);
	let mut record = if text_mode {
		build_from_config(input)?.record
	} else {
		load_from_binary(input, truncation)?
	};

	if let Some(n) = board_number {
		record.set_board_number(n);
	}

	match matches.value_of("OUTPUT") {
		Some(output) => write_record(&record, output)?,
		None if text_mode => write_record(&record, output_name(&record, board_number.is_some()))?,
		None => (),
	}

	if matches.is_present("print") {
		print!("{}", Summary(&record));
		println!();
	}

	if matches.is_present("dump") {
		print!("{}", HexDump(&record.encode_to_bytes()));
		println!();
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
