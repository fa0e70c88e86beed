/// Failure reported by a driver primitive.
///
/// Drivers are external collaborators; the dispatcher only needs to
/// know that a primitive failed, not why. Diagnostics belong to the
/// driver's own logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverError;

impl core::fmt::Display for DriverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "device reported failure")
    }
}

/// Primitive operation set for one storage technology.
///
/// One implementation per technology (raw flash, byte-addressable
/// EEPROM, ...). All addresses are absolute device addresses; the
/// dispatcher applies region offsets before calling in.
///
/// `init` and `deinit` are optional and default to no-ops. `read`,
/// `write` and `erase` are mandatory.
pub trait NvmDriver {
    /// Brings the device up. Called once from dispatcher `init`.
    fn init(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Shuts the device down. Called once from dispatcher `deinit`.
    fn deinit(&mut self) -> Result<(), DriverError> {
        Ok(())
    }

    /// Reads `out.len()` bytes starting at `addr` into `out`.
    fn read(&mut self, addr: u32, out: &mut [u8]) -> Result<(), DriverError>;

    /// Writes `data` starting at `addr`.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), DriverError>;

    /// Erases `len` bytes starting at `addr` to the erased state (0xFF).
    fn erase(&mut self, addr: u32, len: usize) -> Result<(), DriverError>;
}
