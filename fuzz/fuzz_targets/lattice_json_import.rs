#![no_main]

use libfuzzer_sys::fuzz_target;
use rhizome_resin_serde::{JsonFormat, import_lattice};

fuzz_target!(|data: &[u8]| {
    // import_lattice should never panic on any input
    let _ = import_lattice(data, &JsonFormat::new());
});
