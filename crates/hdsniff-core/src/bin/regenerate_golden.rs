use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use hdsniff_core::{DecodeOptions, RecoveryMode, decode_capture_file};

fn main() -> ExitCode {
    if let Err(err) = run() {
        eprintln!("error: {}", err);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run() -> Result<(), String> {
    let root = PathBuf::from("tests").join("golden");
    let entries =
        fs::read_dir(&root).map_err(|err| format!("failed to read {}: {}", root.display(), err))?;

    for entry in entries {
        let entry = entry.map_err(|err| format!("failed to read entry: {}", err))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let input = path.join("input.bin");
        if !input.exists() {
            continue;
        }
        regenerate_one(&input, &path.join("expected.txt"), RecoveryMode::Local)?;
        regenerate_one(&input, &path.join("expected_resync.txt"), RecoveryMode::Resync)?;
    }

    Ok(())
}

fn regenerate_one(input: &Path, output: &Path, recovery: RecoveryMode) -> Result<(), String> {
    let report = decode_capture_file(input, DecodeOptions { recovery })
        .map_err(|err| format!("decoding failed for {}: {}", input.display(), err))?;
    let mut text = String::new();
    for event in &report.events {
        text.push_str(&event.line);
        text.push('\n');
    }
    fs::write(output, text)
        .map_err(|err| format!("failed to write {}: {}", output.display(), err))?;
    Ok(())
}
