#![no_main]
use chrono::Utc;
use libfuzzer_sys::fuzz_target;
use parkdesk::{spots::normalize_spots, ParkingSpotDto};

fuzz_target!(|data: &[u8]| {
    if let Ok(dtos) = serde_json::from_slice::<Vec<ParkingSpotDto>>(data) {
        let count = dtos.len();
        let spots = normalize_spots(dtos, Utc::now());
        assert_eq!(spots.len(), count);
        for (index, spot) in spots.iter().enumerate() {
            assert_eq!(spot.spot_id as usize, index + 1);
        }
    }
});
