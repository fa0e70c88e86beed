//! Region descriptors and the region/mirror address bookkeeping.

use crate::error::{ConfigError, NvmError};

/// One named, fixed-address, fixed-size span of NVM bound to a driver.
///
/// Supplied by the platform as part of an immutable table; all
/// dispatcher addressing is relative to `start_addr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// Human-readable region name, used in diagnostics only.
    pub name: &'static str,
    /// Absolute device address where the region begins.
    pub start_addr: u32,
    /// Region size in bytes.
    pub size: u32,
    /// Index into the driver table.
    pub driver: usize,
    /// Route reads/writes/erases through the RAM mirror instead of
    /// the driver (EEPROM emulation over block-erase flash).
    pub emulated: bool,
}

/// Validates a region-relative range and returns the absolute device
/// address, or an error if the range is invalid.
pub(crate) fn abs_addr(region: &Region, addr: u32, len: usize) -> Result<u32, NvmError> {
    if len == 0 {
        return Err(NvmError::ZeroLength);
    }

    let end = (addr as u64)
        .checked_add(len as u64)
        .ok_or(NvmError::OutOfBounds)?;

    if end > region.size as u64 {
        return Err(NvmError::OutOfBounds);
    }

    Ok(region.start_addr + addr)
}

/// Byte offset of `region`'s slice in the mirror buffer, or `None`
/// for regions that are not emulated.
///
/// The offset is the sum of sizes of all *emulated* regions preceding
/// `region` in table order. This is the single authority for mirror
/// placement; slices produced from it never overlap.
pub(crate) fn mirror_offset(regions: &[Region], region: usize) -> Option<usize> {
    if !regions.get(region)?.emulated {
        return None;
    }

    let mut offset = 0usize;
    for r in &regions[..region] {
        if r.emulated {
            offset += r.size as usize;
        }
    }

    Some(offset)
}

/// Total mirror space required by the table, in bytes.
pub(crate) fn mirror_len(regions: &[Region]) -> u64 {
    regions
        .iter()
        .filter(|r| r.emulated)
        .map(|r| r.size as u64)
        .sum()
}

/// One-time configuration validation, run at `init` before any driver
/// is touched.
pub(crate) fn validate_config(
    regions: &[Region],
    driver_count: usize,
    max_regions: usize,
    mirror_capacity: usize,
) -> Result<(), ConfigError> {
    if regions.is_empty() {
        return Err(ConfigError::EmptyRegionTable);
    }

    if regions.len() > max_regions {
        return Err(ConfigError::TooManyRegions);
    }

    for r in regions {
        if r.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        if r.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if r.driver >= driver_count {
            return Err(ConfigError::BadDriverIndex);
        }
    }

    if mirror_len(regions) > mirror_capacity as u64 {
        return Err(ConfigError::MirrorOverflow);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(size: u32, emulated: bool) -> Region {
        Region {
            name: "R",
            start_addr: 0x1000,
            size,
            driver: 0,
            emulated,
        }
    }

    #[test]
    fn abs_addr_edge_cases() {
        let r = region(64, false);

        // Zero length
        assert_eq!(abs_addr(&r, 0, 0), Err(NvmError::ZeroLength));

        // Out of bounds
        assert_eq!(abs_addr(&r, 63, 2), Err(NvmError::OutOfBounds));
        assert_eq!(abs_addr(&r, 64, 1), Err(NvmError::OutOfBounds));

        // addr + len overflow must not wrap
        assert_eq!(abs_addr(&r, u32::MAX, usize::MAX), Err(NvmError::OutOfBounds));

        // Last byte of the region
        assert_eq!(abs_addr(&r, 63, 1), Ok(0x1000 + 63));

        // Exact region span
        assert_eq!(abs_addr(&r, 0, 64), Ok(0x1000));
    }

    #[test]
    fn mirror_offset_skips_direct_regions() {
        let regions = [
            region(16, true),
            region(32, false),
            region(8, true),
            region(4, true),
        ];

        assert_eq!(mirror_offset(&regions, 0), Some(0));
        assert_eq!(mirror_offset(&regions, 1), None); // direct region
        assert_eq!(mirror_offset(&regions, 2), Some(16)); // direct 32 not counted
        assert_eq!(mirror_offset(&regions, 3), Some(24));
        assert_eq!(mirror_offset(&regions, 4), None); // past the table
    }

    #[test]
    fn mirror_len_sums_emulated_only() {
        let regions = [region(16, true), region(32, false), region(8, true)];
        assert_eq!(mirror_len(&regions), 24);
    }

    #[test]
    fn validate_config_rejects_defects() {
        let good = [region(16, true)];
        assert_eq!(validate_config(&good, 1, 4, 64), Ok(()));

        assert_eq!(
            validate_config(&[], 1, 4, 64),
            Err(ConfigError::EmptyRegionTable)
        );

        let mut unnamed = good;
        unnamed[0].name = "";
        assert_eq!(
            validate_config(&unnamed, 1, 4, 64),
            Err(ConfigError::EmptyName)
        );

        let mut empty = good;
        empty[0].size = 0;
        assert_eq!(validate_config(&empty, 1, 4, 64), Err(ConfigError::ZeroSize));

        let mut orphan = good;
        orphan[0].driver = 1;
        assert_eq!(
            validate_config(&orphan, 1, 4, 64),
            Err(ConfigError::BadDriverIndex)
        );

        assert_eq!(
            validate_config(&good, 1, 0, 64),
            Err(ConfigError::TooManyRegions)
        );

        assert_eq!(
            validate_config(&good, 1, 4, 8),
            Err(ConfigError::MirrorOverflow)
        );
    }
}
