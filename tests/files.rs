use std::fs;
use std::path::PathBuf;

use cape_eeprom::record::RECORD_SIZE;
use cape_eeprom::{
	Truncation,
	build_from_config,
	load_from_binary,
	write_record,
};

fn scratch_path(name: &str) -> PathBuf {
	std::env::temp_dir().join(format!("cape-eeprom-{}-{}", std::process::id(), name))
}

#[test]
fn build_write_load() {
	let config = scratch_path("cape.txt");
	let image = scratch_path("cape.eep");
	fs::write(&config, concat!(
		"board_name \"File Cape\"\n",
		"version \"00A3\"\n",
		"part_number \"FILE-01\"\n",
		"week_of_production 5\n",
		"year_of_production 24\n",
		"board_number 17\n",
		"pinconfig P9_14 6 FAST OUTPUT PULL_DOWN RX_DISABLE\n",
		"pinconfig P9_99 6 FAST OUTPUT PULL_DOWN RX_DISABLE\n",
	)).unwrap();

	let parsed = build_from_config(&config).unwrap();
	assert_eq!(parsed.diagnostics.len(), 1);
	assert_eq!(parsed.record.serial(), "052400000017");

	write_record(&parsed.record, &image).unwrap();
	assert_eq!(fs::metadata(&image).unwrap().len(), RECORD_SIZE as u64);

	let loaded = load_from_binary(&image, Truncation::Reject).unwrap();
	assert_eq!(loaded, parsed.record);
	assert_eq!(loaded.part_number(), "FILE-01");

	fs::remove_file(&config).unwrap();
	fs::remove_file(&image).unwrap();
}

#[test]
fn truncated_image() {
	let image = scratch_path("short.eep");
	fs::write(&image, &[0xaa, 0x55, 0x33, 0xee, b'A', b'1']).unwrap();

	assert!(load_from_binary(&image, Truncation::Reject).is_err());
	let loaded = load_from_binary(&image, Truncation::ZeroFill).unwrap();
	assert_eq!(loaded.revision(), *b"A1");
	assert_eq!(loaded.board_name(), "");

	fs::remove_file(&image).unwrap();
}

#[test]
fn missing_files_are_errors() {
	let missing = scratch_path("does-not-exist.txt");
	let err = build_from_config(&missing).unwrap_err();
	assert!(err.to_string().contains("couldn't open configuration file"), "{}", err);
	assert!(load_from_binary(&missing, Truncation::ZeroFill).is_err());

	let record = cape_eeprom::EepromRecord::new();
	let bad_output = scratch_path("no-such-dir").join("out.eep");
	assert!(write_record(&record, &bad_output).is_err());
}

#[test]
fn latin1_comment_is_not_fatal() {
	let config = scratch_path("latin1.txt");
	let mut text = b"# Copyright Stefan B".to_vec();
	text.push(0xfc);
	text.extend_from_slice(b"hler\nboard_name \"Latin Cape\"\nweek_of_production 3\nyear_of_production 21\nboard_number 12\n");
	fs::write(&config, &text).unwrap();

	let parsed = build_from_config(&config).unwrap();
	assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
	assert_eq!(parsed.record.board_name(), "Latin Cape");
	assert_eq!(parsed.record.serial(), "032100000012");

	fs::remove_file(&config).unwrap();
}
