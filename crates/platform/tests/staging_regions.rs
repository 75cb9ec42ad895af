//! Architecture tests: staging regions and buffer placement.
//! These tests pin the physical layout the transfer engine depends on.

// Test files legitimately use arithmetic for verification; allow at file level.
#![allow(clippy::arithmetic_side_effects)]
#![allow(clippy::indexing_slicing)]
#![allow(clippy::unwrap_used)]

use platform::memory_map::{
    StagingRegion, CACHE_LINE_BYTES, LEGACY_STAGING, PRIMARY_STAGING, SAMPLE_BYTES,
};
use platform::{CaptureConfig, Direction, StagingBuffer, TransferDescriptor};

// Test 1: both regions are cache-line aligned at base and end
#[test]
fn regions_are_cache_line_aligned() {
    for r in [PRIMARY_STAGING, LEGACY_STAGING] {
        assert_eq!(r.base() % CACHE_LINE_BYTES, 0);
        assert_eq!(r.end() % CACHE_LINE_BYTES, 0);
    }
}

// Test 2: the two regions are disjoint
#[test]
fn regions_do_not_overlap() {
    assert!(!PRIMARY_STAGING.overlaps(&LEGACY_STAGING));
}

// Test 3: fixed addresses the board's transfer engine is wired for
#[test]
fn region_addresses_are_fixed() {
    assert_eq!(PRIMARY_STAGING.base(), 0x0020_0000);
    assert_eq!(LEGACY_STAGING.base(), 0x0010_0000);
    assert_eq!(LEGACY_STAGING.end(), PRIMARY_STAGING.base());
}

// Test 4: presets stage into the documented regions
#[test]
fn presets_use_their_regions() {
    assert_eq!(CaptureConfig::current_sensor().region, PRIMARY_STAGING);
    assert_eq!(CaptureConfig::raw_batched().region, LEGACY_STAGING);
    assert_eq!(CaptureConfig::raw_per_sample().region, LEGACY_STAGING);
}

// Test 5: a full buffer's valid range is exactly the region, never past it
#[test]
fn full_buffer_range_stays_inside_region() {
    let region = StagingRegion::new(0x0040_0000, 256).unwrap();
    let mut cells = vec![0u32; region.capacity_samples()];
    let mut buf = StagingBuffer::new(region.base(), &mut cells);
    let mut pushed = 0;
    while buf.push(pushed).is_ok() {
        pushed += 1;
    }
    assert_eq!(pushed as usize, 256 / SAMPLE_BYTES);
    let d = TransferDescriptor::for_staging(&buf, Direction::DeviceToMemory);
    assert_eq!(d.address(), region.base());
    assert_eq!(d.length_bytes(), region.size_bytes());
    assert!(region.contains_range(d.address(), d.length_bytes()));
}

// Test 6: an empty cycle describes a zero-length range at the base
#[test]
fn empty_buffer_describes_zero_bytes() {
    let mut cells = [0u32; 8];
    let buf = StagingBuffer::new(PRIMARY_STAGING.base(), &mut cells);
    let d = TransferDescriptor::for_staging(&buf, Direction::DeviceToMemory);
    assert_eq!(d.address(), 0x0020_0000);
    assert_eq!(d.length_bytes(), 0);
}
