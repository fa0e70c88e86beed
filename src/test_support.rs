//! Test support utilities - only compiled in test builds.

use crate::{
    driver::{DriverError, NvmDriver},
    lock::LockPolicy,
    region::Region,
};

/// Standard test table: CFG direct, LOG and CAL emulated, all on
/// driver 0. Mirror layout is `[LOG (128) | CAL (32)]`.
pub const REGIONS: &[Region] = &[
    Region {
        name: "CFG",
        start_addr: 0x0000,
        size: 64,
        driver: 0,
        emulated: false,
    },
    Region {
        name: "LOG",
        start_addr: 0x0040,
        size: 128,
        driver: 0,
        emulated: true,
    },
    Region {
        name: "CAL",
        start_addr: 0x00C0,
        size: 32,
        driver: 0,
        emulated: true,
    },
];

/// Array-backed driver with operation counters and a fail switch.
///
/// Counters let tests prove that refused operations never reached a
/// primitive; `last_write_addr` exposes the absolute address of the
/// most recent write.
pub struct MemFlash<const N: usize> {
    pub mem: [u8; N],
    pub inits: usize,
    pub deinits: usize,
    pub reads: usize,
    pub writes: usize,
    pub erases: usize,
    pub last_write_addr: Option<u32>,
    pub fail: bool,
}

impl<const N: usize> MemFlash<N> {
    pub fn new() -> Self {
        Self {
            mem: [0; N],
            inits: 0,
            deinits: 0,
            reads: 0,
            writes: 0,
            erases: 0,
            last_write_addr: None,
            fail: false,
        }
    }

    fn span(&self, addr: u32, len: usize) -> Result<core::ops::Range<usize>, DriverError> {
        let start = addr as usize;
        let end = start.checked_add(len).ok_or(DriverError)?;
        if self.fail || end > N {
            return Err(DriverError);
        }
        Ok(start..end)
    }
}

impl<const N: usize> Default for MemFlash<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> NvmDriver for MemFlash<N> {
    fn init(&mut self) -> Result<(), DriverError> {
        self.inits += 1;
        if self.fail { Err(DriverError) } else { Ok(()) }
    }

    fn deinit(&mut self) -> Result<(), DriverError> {
        self.deinits += 1;
        if self.fail { Err(DriverError) } else { Ok(()) }
    }

    fn read(&mut self, addr: u32, out: &mut [u8]) -> Result<(), DriverError> {
        self.reads += 1;
        let span = self.span(addr, out.len())?;
        out.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError> {
        self.writes += 1;
        let span = self.span(addr, data.len())?;
        self.mem[span].copy_from_slice(data);
        self.last_write_addr = Some(addr);
        Ok(())
    }

    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError> {
        self.erases += 1;
        let span = self.span(addr, len)?;
        self.mem[span].fill(crate::mirror::ERASED_BYTE);
        Ok(())
    }
}

/// Driver whose primitives all fail; `fail_deinit` lets tests fail
/// only the shutdown path.
#[derive(Default)]
pub struct FailingDriver {
    pub fail_deinit: bool,
}

impl NvmDriver for FailingDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        if self.fail_deinit { Ok(()) } else { Err(DriverError) }
    }

    fn deinit(&mut self) -> Result<(), DriverError> {
        Err(DriverError)
    }

    fn read(&mut self, _addr: u32, _out: &mut [u8]) -> Result<(), DriverError> {
        Err(DriverError)
    }

    fn write(&mut self, _addr: u32, _data: &[u8]) -> Result<(), DriverError> {
        Err(DriverError)
    }

    fn erase(&mut self, _addr: u32, _len: usize) -> Result<(), DriverError> {
        Err(DriverError)
    }
}

/// Lock that always refuses acquisition.
pub struct DenyLock;

impl LockPolicy for DenyLock {
    fn try_with<R>(&mut self, _f: impl FnOnce() -> R) -> Option<R> {
        None
    }
}

/// Instrumented lock proving that no two critical sections overlap.
#[derive(Default)]
pub struct ProbeLock {
    pub entries: usize,
    pub overlapped: bool,
    active: bool,
}

impl LockPolicy for ProbeLock {
    fn try_with<R>(&mut self, f: impl FnOnce() -> R) -> Option<R> {
        if self.active {
            self.overlapped = true;
        }
        self.active = true;
        self.entries += 1;
        let r = f();
        self.active = false;
        Some(r)
    }
}
