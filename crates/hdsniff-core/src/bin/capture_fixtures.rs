use std::fs;
use std::path::{Path, PathBuf};

use hdsniff_core::protocols::hitec::encode::{
    encode_read_transaction, encode_write_command,
};

const REG_MODEL_NUMBER: u8 = 0x00;
const REG_CURRENT_APV: u8 = 0x0C;
const REG_TARGET: u8 = 0x1E;
const REG_ID: u8 = 0x32;
const REG_DIRECTION: u8 = 0x5E;
const REG_SAVE: u8 = 0x70;
const REG_UNNAMED: u8 = 0x22;

fn main() -> Result<(), String> {
    let root = PathBuf::from("tests/golden");
    write_capture(&root.join("clean"), &clean_capture())?;
    write_capture(&root.join("glitches"), &glitch_capture())?;
    Ok(())
}

fn clean_capture() -> Vec<u8> {
    let mut capture = encode_read_transaction(REG_MODEL_NUMBER, 0x00, 485, 5);
    capture.extend_from_slice(&[0x00; 3]);
    capture.extend_from_slice(&encode_write_command(REG_TARGET, 3000));
    capture.extend_from_slice(&encode_read_transaction(REG_CURRENT_APV, 0xFF, 0x2000, 2));
    capture.extend_from_slice(&encode_write_command(REG_SAVE, 0xFFFF));
    capture
}

fn glitch_capture() -> Vec<u8> {
    // Power-up glitch seen as 0xFF on an inverted line.
    let mut capture = vec![0xFF];

    let mut bad_checksum = encode_write_command(REG_ID, 5);
    bad_checksum[6] = bad_checksum[6].wrapping_add(1);
    capture.extend_from_slice(&bad_checksum);

    let mut bad_marker = encode_write_command(REG_DIRECTION, 1);
    bad_marker[0] = 0x97;
    capture.extend_from_slice(&bad_marker);

    capture.extend_from_slice(&encode_read_transaction(REG_TARGET, 0x00, 100, 0));
    capture.extend_from_slice(&[0x96, 0x00, REG_TARGET, 0x05]);
    capture.extend_from_slice(&encode_write_command(REG_UNNAMED, 0x1000));
    capture
}

fn write_capture(dir: &Path, capture: &[u8]) -> Result<(), String> {
    fs::create_dir_all(dir)
        .map_err(|err| format!("failed to create {}: {}", dir.display(), err))?;
    let path = dir.join("input.bin");
    fs::write(&path, capture).map_err(|err| format!("failed to write {}: {}", path.display(), err))
}
