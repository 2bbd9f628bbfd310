//! Command handlers for the `kfgc` CLI.
//!
//! Each submodule implements one command. Shared helpers for loading units
//! live here in the module root.

use kfg_flow::{CompilationUnit, SharedUnit};

mod decode;
mod encode;
mod strings;

pub use decode::{
    decode_file, decode_unit, parse_decode_options, DecodeOptions, DecodeReport, DecodedNode,
};
pub use encode::{demo_unit, encode_demo};
pub use strings::{dump_strings, string_table, StringEntry};

/// Read a file's bytes, exiting with a message on failure.
pub(crate) fn read_file(path: &str) -> Vec<u8> {
    match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

/// Load a unit from disk, exiting with a message if it is not a binary unit.
pub(crate) fn load_unit(path: &str) -> SharedUnit {
    match CompilationUnit::new(path, read_file(path)) {
        Ok(unit) => unit,
        Err(fault) => {
            eprintln!("error: '{path}' is not a binary unit: {fault}");
            std::process::exit(1);
        }
    }
}
