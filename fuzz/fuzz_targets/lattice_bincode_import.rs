#![no_main]

use libfuzzer_sys::fuzz_target;
use rhizome_resin_serde::{BincodeFormat, import_lattice};

fuzz_target!(|data: &[u8]| {
    let _ = import_lattice(data, &BincodeFormat::new());
});
