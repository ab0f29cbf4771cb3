#![no_main]
use libfuzzer_sys::fuzz_target;
use parkdesk::spots::parse_location;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let (_level, section) = parse_location(Some(s));
        assert_eq!(section.chars().count(), 1);
        assert!(section.chars().all(|c| c.is_ascii_alphabetic()));
    }
});
