//! Region dispatcher: validated routing of NVM calls to per-region
//! drivers or the RAM mirror, under a mutual-exclusion discipline.

use bitmaps::{Bits, BitsImpl};
use log::{debug, warn};

use crate::{
    driver::NvmDriver,
    error::{ConfigError, NvmError},
    lock::LockPolicy,
    mirror::Mirror,
    region::{self, Region},
};

/// NVM region dispatcher, owned by the caller.
///
/// Routes `read`/`write`/`erase` to the backing driver for direct
/// regions, or to the RAM mirror for emulated regions. Every data
/// operation validates its range first, then runs under the
/// configured [`LockPolicy`]. All operations are synchronous and
/// caller-blocking; a hanging driver call hangs the caller.
///
/// # Const Generics
/// - `CAP`: mirror buffer capacity in bytes
/// - `RN`: maximum region table length
///
/// # Lifecycle
///
/// `Uninitialized -> init() -> Ready -> deinit() -> Uninitialized`.
/// Any failure during `init` leaves the handle uninitialized; there
/// is no partial-ready state and no automatic retry.
pub struct Nvm<'t, 'd, L, const CAP: usize, const RN: usize>
where
    L: LockPolicy,
    BitsImpl<RN>: Bits,
{
    regions: &'t [Region],
    drivers: &'t mut [&'d mut dyn NvmDriver],
    lock: L,
    mirror: Mirror<CAP, RN>,
    initialized: bool,
}

impl<'t, 'd, L, const CAP: usize, const RN: usize> Nvm<'t, 'd, L, CAP, RN>
where
    L: LockPolicy,
    BitsImpl<RN>: Bits,
{
    /// Creates an uninitialized handle over immutable configuration
    /// tables. Call [`Nvm::init`] before any data operation.
    pub fn new(
        regions: &'t [Region],
        drivers: &'t mut [&'d mut dyn NvmDriver],
        lock: L,
    ) -> Self {
        Self {
            regions,
            drivers,
            lock,
            mirror: Mirror::new(),
            initialized: false,
        }
    }

    /// Validates the configuration tables, brings up every driver and
    /// loads the mirror from flash.
    ///
    /// Configuration defects are fatal and reported before any driver
    /// is touched. Driver `init` is attempted for *every* driver even
    /// after one fails; the first failure is returned.
    pub fn init(&mut self) -> Result<(), NvmError> {
        if self.initialized {
            return Err(NvmError::AlreadyInitialized);
        }

        region::validate_config(self.regions, self.drivers.len(), RN, CAP)?;

        let mut first: Option<NvmError> = None;
        for (idx, drv) in self.drivers.iter_mut().enumerate() {
            if drv.init().is_err() {
                warn!("driver {idx} init failed");
                first.get_or_insert(NvmError::Device);
            } else {
                debug!("driver {idx} initialized");
            }
        }
        if let Some(e) = first {
            return Err(e);
        }

        self.mirror.load(self.regions, self.drivers)?;

        self.initialized = true;
        debug!("nvm up: {} regions", self.regions.len());
        Ok(())
    }

    /// Shuts down every driver. The handle returns to the
    /// uninitialized state and the mirror is released only if all
    /// drivers deinitialize cleanly.
    pub fn deinit(&mut self) -> Result<(), NvmError> {
        if !self.initialized {
            return Err(NvmError::NotInitialized);
        }

        let mut first: Option<NvmError> = None;
        for (idx, drv) in self.drivers.iter_mut().enumerate() {
            if drv.deinit().is_err() {
                warn!("driver {idx} deinit failed");
                first.get_or_insert(NvmError::Device);
            }
        }

        match first {
            None => {
                self.mirror.release();
                self.initialized = false;
                debug!("nvm down");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }

    /// True once `init` has completed and until `deinit`.
    pub fn is_init(&self) -> bool {
        self.initialized
    }

    /// Writes `data` at the region-relative address `addr`.
    ///
    /// Emulated regions are written in RAM only and stay volatile
    /// until [`Nvm::sync`]; direct regions hit the driver at the
    /// absolute address `start_addr + addr`.
    pub fn write(&mut self, region: usize, addr: u32, data: &[u8]) -> Result<(), NvmError> {
        let (r, abs) = self.check(region, addr, data.len())?;
        let regions = self.regions;
        let Self {
            drivers,
            lock,
            mirror,
            ..
        } = self;

        lock.try_with(|| {
            if r.emulated {
                mirror.write(regions, region, addr, data)
            } else {
                let drv = drivers
                    .get_mut(r.driver)
                    .ok_or(NvmError::Config(ConfigError::BadDriverIndex))?;
                drv.write(abs, data).map_err(|_| NvmError::Device)
            }
        })
        .ok_or(NvmError::LockContended)?
    }

    /// Reads `out.len()` bytes from the region-relative address
    /// `addr` into `out`.
    ///
    /// Emulated regions read from RAM and always reflect the most
    /// recent write, never the (possibly stale) flash content.
    pub fn read(&mut self, region: usize, addr: u32, out: &mut [u8]) -> Result<(), NvmError> {
        let (r, abs) = self.check(region, addr, out.len())?;
        let regions = self.regions;
        let Self {
            drivers,
            lock,
            mirror,
            ..
        } = self;

        lock.try_with(|| {
            if r.emulated {
                mirror.read(regions, region, addr, out)
            } else {
                let drv = drivers
                    .get_mut(r.driver)
                    .ok_or(NvmError::Config(ConfigError::BadDriverIndex))?;
                drv.read(abs, out).map_err(|_| NvmError::Device)
            }
        })
        .ok_or(NvmError::LockContended)?
    }

    /// Erases `len` bytes at the region-relative address `addr`.
    ///
    /// For emulated regions this is a logical erase of the RAM slice;
    /// for direct regions the driver's erase primitive runs.
    pub fn erase(&mut self, region: usize, addr: u32, len: usize) -> Result<(), NvmError> {
        let (r, abs) = self.check(region, addr, len)?;
        let regions = self.regions;
        let Self {
            drivers,
            lock,
            mirror,
            ..
        } = self;

        lock.try_with(|| {
            if r.emulated {
                mirror.erase(regions, region, addr, len)
            } else {
                let drv = drivers
                    .get_mut(r.driver)
                    .ok_or(NvmError::Config(ConfigError::BadDriverIndex))?;
                drv.erase(abs, len).map_err(|_| NvmError::Device)
            }
        })
        .ok_or(NvmError::LockContended)?
    }

    /// Flushes the RAM mirror to flash.
    ///
    /// Flushes *every* emulated region regardless of the region id
    /// passed, erasing each region's flash range and rewriting its
    /// full mirror slice. The caller must invoke this explicitly,
    /// e.g. before power-down; there is no automatic flush.
    pub fn sync(&mut self, region: usize) -> Result<(), NvmError> {
        if !self.initialized {
            return Err(NvmError::NotInitialized);
        }
        if region >= self.regions.len() {
            return Err(NvmError::InvalidRegion);
        }

        let regions = self.regions;
        let Self {
            drivers,
            lock,
            mirror,
            ..
        } = self;

        lock.try_with(|| mirror.flush(regions, drivers))
            .ok_or(NvmError::LockContended)?
    }

    /// True if the region's mirror content has not been flushed to
    /// flash since the last `init` or completed `sync`. Always false
    /// for direct regions.
    pub fn is_pending(&self, region: usize) -> bool {
        region < self.regions.len() && region < RN && self.mirror.is_pending(region)
    }

    /// True if any emulated region has unsynced mirror content.
    pub fn any_pending(&self) -> bool {
        self.mirror.any_pending()
    }

    /// Shared precondition path for every data operation: init guard,
    /// region id check, overflow-safe bounds check. Violations leave
    /// zero side effects; no driver is called and no RAM is touched.
    fn check(&self, region: usize, addr: u32, len: usize) -> Result<(Region, u32), NvmError> {
        if !self.initialized {
            return Err(NvmError::NotInitialized);
        }

        let r = *self.regions.get(region).ok_or(NvmError::InvalidRegion)?;
        let abs = region::abs_addr(&r, addr, len)?;
        Ok((r, abs))
    }
}
