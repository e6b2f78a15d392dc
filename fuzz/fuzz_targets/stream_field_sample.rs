#![no_main]

use libfuzzer_sys::fuzz_target;
use rhizome_resin_flowtile::{CornerVelocity, Flux, StreamField};

fuzz_target!(|data: (i8, i8, i8, i8, f32, f32)| {
    let (top, right, bottom, left, x, y) = data;
    let flux = Flux::new(top.into(), right.into(), bottom.into(), left.into());
    let Ok(tile) = StreamField::new(5, flux, CornerVelocity::zero()) else {
        return;
    };
    // Sampling anywhere, NaN included, returns a value or an error.
    let _ = tile.velocity(x, y);
});
