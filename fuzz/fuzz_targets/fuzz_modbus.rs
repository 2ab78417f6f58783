#![no_main]
use libfuzzer_sys::fuzz_target;

use rtusniff::token;
use rtusniff_modbus::Modbus;

fuzz_target!(|data: &[u8]| {
    let modbus = Modbus::default();
    let tokens = token::from_bytes(data, 0.0);
    let frames = modbus.decode(&tokens);
    let covered: usize = frames.iter().map(|frame| frame.total_length()).sum();
    if tokens.len() >= 8 {
        assert_eq!(covered, tokens.len());
    } else {
        assert!(frames.is_empty());
    }
});
