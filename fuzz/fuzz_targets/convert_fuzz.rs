//! Conversion fuzz target: feed arbitrary strings to every input setter
//! and regenerate the other representations from whichever accepts it.
//! None of it may panic; each setter returns Ok or a structured error.
//! Build with: cargo fuzz run convert_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };

    let mut enc = gs1syntax::Gs1Encoder::new();
    enc.set_permit_unknown_ais(s.len() % 2 == 0);

    for set in [
        gs1syntax::Gs1Encoder::set_ai_data_str,
        gs1syntax::Gs1Encoder::set_data_str,
        gs1syntax::Gs1Encoder::set_scan_data,
    ] {
        if set(&mut enc, s).is_ok() {
            let _ = enc.ai_data_str();
            let _ = enc.hri();
            let _ = enc.dl_uri(None);
            enc.set_sym(gs1syntax::Symbology::Qr);
            let _ = enc.scan_data();
        } else {
            let _ = enc.err_msg();
            let _ = enc.err_markup();
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run convert_fuzz");
}
