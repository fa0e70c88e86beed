//! A `no_std`, no-alloc NVM region dispatcher with EEPROM emulation.
//!
//! This crate abstracts multiple non-volatile memory regions behind a
//! single byte-offset API, so upper layers read, write and erase
//! persistent data without knowing the storage technology underneath
//! (raw flash, byte-addressable EEPROM, or flash emulating EEPROM).
//!
//! # Features
//!
//! - **Zero heap allocation** - mirror capacity fixed at compile time
//! - **Range-validated routing** - per-call region and bounds checks
//!   before any driver is touched
//! - **EEPROM emulation** - a write-back RAM mirror gives block-erase
//!   flash byte-granular, erase-free semantics
//! - **Pluggable locking** - every data operation runs under a
//!   [`LockPolicy`]; a `critical-section` backed lock is provided
//!
//! # Architecture
//!
//! ```text
//! ┌────────┐    ┌──────────────┐  direct   ┌────────────┐
//! │ caller │───▶│  dispatcher   │──────────▶│  NvmDriver │
//! └────────┘    │  (validate,  │           └────────────┘
//!               │   lock)      │  emulated ┌────────────┐   sync
//!               │              │──────────▶│ RAM mirror │─────────▶ flash
//!               └──────────────┘           └────────────┘
//! ```
//!
//! Emulated regions live in one contiguous RAM buffer, packed in
//! region-table order. Writes and erases touch RAM only and stay
//! volatile until an explicit [`Nvm::sync`], which erases and
//! rewrites every emulated region's flash range. This write-back
//! discipline minimizes flash write-cycle wear at the cost of
//! durability until synced.
//!
//! # Example
//!
//! ```rust,no_run
//! use embedded_nvm::prelude::*;
//! # struct Spi;
//! # impl NvmDriver for Spi {
//! #     fn read(&mut self, _: u32, _: &mut [u8]) -> Result<(), DriverError> { Ok(()) }
//! #     fn write(&mut self, _: u32, _: &[u8]) -> Result<(), DriverError> { Ok(()) }
//! #     fn erase(&mut self, _: u32, _: usize) -> Result<(), DriverError> { Ok(()) }
//! # }
//!
//! static REGIONS: &[Region] = &[
//!     Region { name: "CFG", start_addr: 0x0000, size: 64, driver: 0, emulated: false },
//!     Region { name: "LOG", start_addr: 0x0040, size: 128, driver: 0, emulated: true },
//! ];
//!
//! let mut flash = Spi;
//! let mut drivers: [&mut dyn NvmDriver; 1] = [&mut flash];
//!
//! // 128 bytes of mirror capacity, up to 2 regions
//! let mut nvm: Nvm<'_, '_, CriticalSectionLock, 128, 2> =
//!     Nvm::new(REGIONS, &mut drivers, CriticalSectionLock);
//!
//! nvm.init()?;
//! nvm.write(1, 0, &[1, 2, 3, 4])?;   // RAM only
//! nvm.sync(1)?;                      // now on flash
//! # Ok::<(), embedded_nvm::NvmError>(())
//! ```

#![deny(unsafe_code)]
#![no_std]

pub mod dispatch;
pub mod driver;
pub mod error;
pub mod lock;
pub mod mirror;
pub mod region;

#[cfg(test)]
mod test_support;

pub use dispatch::Nvm;
pub use driver::{DriverError, NvmDriver};
pub use error::{ConfigError, NvmError};
pub use lock::{CriticalSectionLock, LockPolicy, NoLock};
pub use mirror::ERASED_BYTE;
pub use region::Region;

pub mod prelude {
    pub use crate::{
        CriticalSectionLock, DriverError, ERASED_BYTE, LockPolicy, NoLock, Nvm, NvmDriver,
        NvmError, Region,
    };
}
