//! Physical memory regions reserved for sample staging.
//!
//! ## Staging regions
//!
//! | Region            | Base address | Size  | Used by                        |
//! |-------------------|-------------|-------|--------------------------------|
//! | `PRIMARY_STAGING` | 0x0020_0000 | 1 MiB | current-sensor capture         |
//! | `LEGACY_STAGING`  | 0x0010_0000 | 1 MiB | raw-code capture presets       |
//!
//! Both regions are reserved in `memory.x` (`STAGING` output region) so the
//! linker never places stack, heap or `.bss` on top of them. The transfer
//! engine reads and writes them by bus address, so base and size are kept
//! cache-line aligned: a flush or invalidate of the region can never touch
//! a line shared with unrelated data.

/// Data cache line size of the Cortex-M7 L1 D-cache, in bytes.
pub const CACHE_LINE_BYTES: usize = 32;

/// Width of one staged sample, in bytes.
pub const SAMPLE_BYTES: usize = core::mem::size_of::<u32>();

/// Why a region description was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegionError {
    /// Base address is not a multiple of [`CACHE_LINE_BYTES`].
    #[error("region base {0:#x} is not cache-line aligned")]
    MisalignedBase(usize),
    /// Size is zero or not a multiple of [`CACHE_LINE_BYTES`].
    #[error("region size {0} is not a non-zero multiple of the cache line")]
    InvalidSize(usize),
    /// `base + size` does not fit the address space.
    #[error("region at {0:#x} wraps the address space")]
    Wraps(usize),
}

/// A contiguous, cache-line aligned staging region in bus address space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StagingRegion {
    base: usize,
    size_bytes: usize,
}

impl StagingRegion {
    /// Describe a region, validating alignment and bounds.
    pub const fn new(base: usize, size_bytes: usize) -> Result<Self, RegionError> {
        if base % CACHE_LINE_BYTES != 0 {
            return Err(RegionError::MisalignedBase(base));
        }
        if size_bytes == 0 || size_bytes % CACHE_LINE_BYTES != 0 {
            return Err(RegionError::InvalidSize(size_bytes));
        }
        if base.checked_add(size_bytes).is_none() {
            return Err(RegionError::Wraps(base));
        }
        Ok(Self { base, size_bytes })
    }

    /// Bus address of the first byte.
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Region size in bytes.
    pub const fn size_bytes(&self) -> usize {
        self.size_bytes
    }

    /// Number of 32-bit samples the region holds.
    pub const fn capacity_samples(&self) -> usize {
        self.size_bytes / SAMPLE_BYTES
    }

    /// One past the last byte.
    #[allow(clippy::arithmetic_side_effects)] // checked in `new`
    pub const fn end(&self) -> usize {
        self.base + self.size_bytes
    }

    /// `true` if the two regions share at least one byte.
    pub const fn overlaps(&self, other: &StagingRegion) -> bool {
        self.base < other.end() && other.base < self.end()
    }

    /// `true` if `[addr, addr + len)` lies inside this region.
    pub const fn contains_range(&self, addr: usize, len: usize) -> bool {
        match addr.checked_add(len) {
            Some(end) => addr >= self.base && end <= self.end(),
            None => false,
        }
    }
}

/// Build a region at compile time; misuse is a compile error.
const fn region(base: usize, size_bytes: usize) -> StagingRegion {
    match StagingRegion::new(base, size_bytes) {
        Ok(r) => r,
        #[allow(clippy::panic)] // const evaluation only: fails the build, never at runtime
        Err(_) => panic!("invalid staging region constant"),
    }
}

/// Staging region size for both presets (1 MiB).
pub const STAGING_REGION_BYTES: usize = 1024 * 1024;

/// Staging region used by the current-sensor capture.
pub const PRIMARY_STAGING: StagingRegion = region(0x0020_0000, STAGING_REGION_BYTES);

/// Staging region used by the raw-code capture presets.
pub const LEGACY_STAGING: StagingRegion = region(0x0010_0000, STAGING_REGION_BYTES);
