//! Concrete storage adapters.
//!
//! | Adapter | Backend |
//! |---------|---------|
//! | [`LocalAdapter`] | Directory tree on local disk |
//! | [`InMemoryAdapter`] | Process-lifetime virtual tree |
//! | [`S3Adapter`] | S3-compatible object storage (feature `s3`) |

mod local;
mod memory;
#[cfg(feature = "s3")]
mod s3;

pub use local::LocalAdapter;
pub use memory::InMemoryAdapter;
#[cfg(feature = "s3")]
pub use s3::{BuildError, DELETE_BATCH_SIZE, DIRECTORY_MARKER, S3Adapter, S3Config};

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch, clamped to zero for earlier times.
pub(crate) fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
