//! RAM mirror giving block-erase flash byte-granular, EEPROM-like
//! semantics.
//!
//! The mirror holds the authoritative *volatile* copy of every
//! emulated region, packed in table order into one buffer. Reads and
//! writes touch RAM only; [`Mirror::flush`] is the single path that
//! touches flash. The cache is write-back: data is lost on power-down
//! unless the caller syncs first.

use bitmaps::{Bitmap, Bits, BitsImpl};
use log::{debug, warn};

use crate::{
    driver::NvmDriver,
    error::{ConfigError, NvmError},
    region::{self, Region},
};

/// Value flash cells take after an erase.
pub const ERASED_BYTE: u8 = 0xFF;

/// Write-back RAM mirror of all emulated regions.
///
/// # Const Generics
/// - `CAP`: mirror buffer capacity in bytes; must cover the summed
///   sizes of all emulated regions
/// - `RN`: pending-set capacity; must cover the region table length
pub(crate) struct Mirror<const CAP: usize, const RN: usize>
where
    BitsImpl<RN>: Bits,
{
    bytes: heapless::Vec<u8, CAP>,
    pending: Bitmap<RN>,
}

impl<const CAP: usize, const RN: usize> Mirror<CAP, RN>
where
    BitsImpl<RN>: Bits,
{
    pub(crate) fn new() -> Self {
        Self {
            bytes: heapless::Vec::new(),
            pending: Bitmap::new(),
        }
    }

    /// Sizes the buffer and bulk-reads every emulated region from
    /// flash, in table order. On any failure the mirror is released
    /// again and stays unusable.
    pub(crate) fn load(
        &mut self,
        regions: &[Region],
        drivers: &mut [&mut dyn NvmDriver],
    ) -> Result<(), NvmError> {
        let len = region::mirror_len(regions) as usize;
        self.bytes
            .resize(len, 0)
            .map_err(|_| ConfigError::MirrorOverflow)?;

        let mut offset = 0usize;
        for r in regions.iter().filter(|r| r.emulated) {
            let size = r.size as usize;
            let slice = &mut self.bytes[offset..offset + size];
            let drv = drivers.get_mut(r.driver).ok_or(ConfigError::BadDriverIndex)?;
            if drv.read(r.start_addr, slice).is_err() {
                warn!("mirror load failed for region {}", r.name);
                self.release();
                return Err(NvmError::Device);
            }
            offset += size;
        }

        self.pending = Bitmap::new();
        debug!("mirror loaded: {len} bytes");
        Ok(())
    }

    /// Drops the mirrored content and pending marks.
    pub(crate) fn release(&mut self) {
        self.bytes.clear();
        self.pending = Bitmap::new();
    }

    /// Copies `data` into the region's RAM slice. Flash is untouched;
    /// the region is marked pending until the next flush.
    pub(crate) fn write(
        &mut self,
        regions: &[Region],
        region: usize,
        addr: u32,
        data: &[u8],
    ) -> Result<(), NvmError> {
        let span = self.span(regions, region, addr, data.len())?;
        self.bytes[span].copy_from_slice(data);
        self.pending.set(region, true);
        Ok(())
    }

    /// Copies out of the region's RAM slice; never touches flash.
    /// Always reflects the most recent write or the most recent
    /// completed load/flush.
    pub(crate) fn read(
        &self,
        regions: &[Region],
        region: usize,
        addr: u32,
        out: &mut [u8],
    ) -> Result<(), NvmError> {
        let span = self.span(regions, region, addr, out.len())?;
        out.copy_from_slice(&self.bytes[span]);
        Ok(())
    }

    /// Fills the region's RAM slice with [`ERASED_BYTE`]. A logical
    /// erase, not a physical one.
    pub(crate) fn erase(
        &mut self,
        regions: &[Region],
        region: usize,
        addr: u32,
        len: usize,
    ) -> Result<(), NvmError> {
        let span = self.span(regions, region, addr, len)?;
        self.bytes[span].fill(ERASED_BYTE);
        self.pending.set(region, true);
        Ok(())
    }

    /// Flushes the whole mirror back to flash: erases the flash range
    /// of every emulated region, then rewrites each region's full
    /// mirror slice.
    ///
    /// All regions are visited even after a failure; the first error
    /// is reported. On error, mirror and flash may be left diverged
    /// and the pending marks are kept; there is no rollback.
    pub(crate) fn flush(
        &mut self,
        regions: &[Region],
        drivers: &mut [&mut dyn NvmDriver],
    ) -> Result<(), NvmError> {
        let mut first: Option<NvmError> = None;

        for r in regions.iter().filter(|r| r.emulated) {
            match drivers.get_mut(r.driver) {
                Some(drv) => {
                    if drv.erase(r.start_addr, r.size as usize).is_err() {
                        warn!("flush erase failed for region {}", r.name);
                        first.get_or_insert(NvmError::Device);
                    }
                }
                None => {
                    first.get_or_insert(ConfigError::BadDriverIndex.into());
                }
            }
        }

        let mut offset = 0usize;
        for r in regions.iter().filter(|r| r.emulated) {
            let size = r.size as usize;
            let slice = &self.bytes[offset..offset + size];
            if let Some(drv) = drivers.get_mut(r.driver) {
                if drv.write(r.start_addr, slice).is_err() {
                    warn!("flush write failed for region {}", r.name);
                    first.get_or_insert(NvmError::Device);
                }
            }
            offset += size;
        }

        match first {
            None => {
                self.pending = Bitmap::new();
                debug!("mirror flushed: {} bytes", self.bytes.len());
                Ok(())
            }
            Some(e) => Err(e),
        }
    }

    /// True if the region's mirror content has diverged from flash
    /// since the last load or completed flush.
    pub(crate) fn is_pending(&self, region: usize) -> bool {
        self.pending.get(region)
    }

    /// True if any emulated region has unsynced mirror content.
    pub(crate) fn any_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    fn span(
        &self,
        regions: &[Region],
        region: usize,
        addr: u32,
        len: usize,
    ) -> Result<core::ops::Range<usize>, NvmError> {
        if len == 0 {
            return Err(NvmError::ZeroLength);
        }

        let base = region::mirror_offset(regions, region).ok_or(NvmError::InvalidRegion)?;
        let start = base
            .checked_add(addr as usize)
            .ok_or(NvmError::OutOfBounds)?;
        let end = start.checked_add(len).ok_or(NvmError::OutOfBounds)?;

        debug_assert!(
            end <= base + regions[region].size as usize,
            "dispatcher must bound-check before routing to the mirror",
        );

        if end > self.bytes.len() || addr as u64 + len as u64 > regions[region].size as u64 {
            return Err(NvmError::OutOfBounds);
        }

        Ok(start..end)
    }
}
