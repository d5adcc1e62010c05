//! Options controlling how documents are opened and written.
use serde::{Deserialize, Serialize};

/// Default ceiling for any size field read from the file.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 100_000;

/// Default container block granularity.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// Open/write configuration.
///
/// Missing fields take their defaults when deserialized:
///
/// ```
/// use worddoc::ole::doc::DocOptions;
///
/// let options: DocOptions = serde_json::from_str(r#"{ "block_size": 512 }"#).unwrap();
/// assert_eq!(options.block_size, 512);
/// assert_eq!(options.max_record_size, 100_000);
/// assert!(!options.recompress_properties);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocOptions {
    /// Hard allocation ceiling for declared record sizes
    pub max_record_size: usize,
    /// Every output stream is zero-padded to a multiple of this
    pub block_size: usize,
    /// Re-derive each run's grpprl from its effective properties on write
    pub recompress_properties: bool,
}

impl Default for DocOptions {
    fn default() -> Self {
        Self {
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            recompress_properties: false,
        }
    }
}

impl DocOptions {
    /// Fail with [`Error::AllocationLimitExceeded`](crate::common::Error::AllocationLimitExceeded)
    /// when `requested` is above the ceiling.
    pub fn check_allocation(&self, requested: usize) -> crate::common::Result<()> {
        if requested > self.max_record_size {
            return Err(crate::common::Error::AllocationLimitExceeded {
                requested,
                limit: self.max_record_size,
            });
        }
        Ok(())
    }
}
