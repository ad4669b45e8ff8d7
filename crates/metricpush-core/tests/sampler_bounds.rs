//! Random sampler range checks.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{TimeZone, Utc};
use metricpush_core::reading::{MetricsReading, CPU_PERCENT_LIMIT, MEMORY_PERCENT_LIMIT};
use metricpush_core::{sampler, RandomSampler, Sampler};

#[test]
fn every_reading_stays_in_bounds() {
    let s = RandomSampler::new();
    for _ in 0..10_000 {
        let r = s.sample().unwrap();
        assert!(r.cpu_percent() < 100, "cpu out of range: {}", r.cpu_percent());
        assert!(r.memory_percent() < 100, "memory out of range: {}", r.memory_percent());
        assert!(
            r.requests_per_second() < 500,
            "requests out of range: {}",
            r.requests_per_second()
        );
    }
}

#[test]
fn fields_are_not_constant() {
    // 200 draws over 100 values; a constant field would mean a broken rng wiring.
    let readings: Vec<_> = (0..200).map(|_| sampler::sample()).collect();
    let first = readings[0];
    assert!(readings.iter().any(|r| r.cpu_percent() != first.cpu_percent()));
    assert!(readings.iter().any(|r| r.memory_percent() != first.memory_percent()));
    assert!(readings
        .iter()
        .any(|r| r.requests_per_second() != first.requests_per_second()));
}

#[test]
fn reading_is_stamped_with_now() {
    let before = Utc::now();
    let r = RandomSampler.draw();
    let after = Utc::now();
    assert!(r.captured_at() >= before && r.captured_at() <= after);
}

#[test]
fn constructor_rejects_out_of_range() {
    let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    assert!(MetricsReading::new(CPU_PERCENT_LIMIT, 0, 0, at).is_none());
    assert!(MetricsReading::new(0, MEMORY_PERCENT_LIMIT, 0, at).is_none());
    assert!(MetricsReading::new(0, 0, 500, at).is_none());

    let ok = MetricsReading::new(99, 99, 499, at).expect("upper edges are valid");
    assert_eq!(ok.cpu_percent(), 99);
    assert_eq!(ok.requests_per_second(), 499);
}
