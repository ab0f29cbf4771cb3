#![no_main]
use libfuzzer_sys::fuzz_target;
use parkdesk::{Reservation, ReservationDto};

fuzz_target!(|data: &[u8]| {
    if let Ok(dto) = serde_json::from_slice::<ReservationDto>(data) {
        let reservation = Reservation::from(dto);
        assert!(reservation.driver_name.starts_with("Driver "));
        assert!(!reservation.license_plate.is_empty());
    }
});
