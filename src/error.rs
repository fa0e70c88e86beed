/// Errors that can occur during NVM operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NvmError {
    /// Region or driver table rejected during `init`.
    Config(ConfigError),
    /// Operation attempted before a successful `init`.
    NotInitialized,
    /// `init` called on an already-initialized handle.
    AlreadyInitialized,
    /// Region id exceeds the region table.
    InvalidRegion,
    /// Address or length exceeds region bounds.
    OutOfBounds,
    /// Operation attempted with zero length.
    ZeroLength,
    /// Mutual-exclusion resource could not be acquired.
    LockContended,
    /// A driver primitive reported failure.
    Device,
}

/// Configuration defects detected once, during `init`.
///
/// All of these are fatal: `init` aborts and the handle stays
/// uninitialized. There is nothing to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Region table is empty.
    EmptyRegionTable,
    /// Region has an empty name.
    EmptyName,
    /// Region has zero size.
    ZeroSize,
    /// Region references a driver index outside the driver table.
    BadDriverIndex,
    /// Region table exceeds the `RN` pending-tracking capacity.
    TooManyRegions,
    /// Emulated regions need more mirror space than `CAP` provides.
    MirrorOverflow,
}

impl core::fmt::Display for NvmError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            NvmError::Config(e) => write!(f, "configuration rejected: {e}"),
            NvmError::NotInitialized => write!(f, "module not initialized"),
            NvmError::AlreadyInitialized => write!(f, "module already initialized"),
            NvmError::InvalidRegion => write!(f, "region id exceeds region table"),
            NvmError::OutOfBounds => write!(f, "address or length exceeds region bounds"),
            NvmError::ZeroLength => write!(f, "operation attempted with zero length"),
            NvmError::LockContended => write!(f, "mutual-exclusion resource not acquired"),
            NvmError::Device => write!(f, "driver primitive reported failure"),
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EmptyRegionTable => write!(f, "region table is empty"),
            ConfigError::EmptyName => write!(f, "region has an empty name"),
            ConfigError::ZeroSize => write!(f, "region has zero size"),
            ConfigError::BadDriverIndex => write!(f, "region references a missing driver"),
            ConfigError::TooManyRegions => write!(f, "region table exceeds tracking capacity"),
            ConfigError::MirrorOverflow => {
                write!(f, "mirror capacity too small for emulated regions")
            }
        }
    }
}

impl From<ConfigError> for NvmError {
    fn from(e: ConfigError) -> Self {
        NvmError::Config(e)
    }
}
