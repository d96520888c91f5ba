//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `phonebook_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use std::process::ExitCode;

fn main() -> ExitCode {
    println!("phonebook_core version={}", phonebook_core::core_version());

    // Opening an in-memory database exercises pragma setup and the full
    // migration chain without touching disk.
    match phonebook_core::db::open_db_in_memory() {
        Ok(_) => {
            println!(
                "phonebook_core schema_version={}",
                phonebook_core::db::migrations::latest_version()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("phonebook_core db_error={err}");
            ExitCode::FAILURE
        }
    }
}
