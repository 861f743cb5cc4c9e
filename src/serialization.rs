//! Serialization of fitted state.
//!
//! Fitted stages, pipelines and estimators are persisted as plain parameter
//! structs (vectors, maps, scalars) encoded with bincode.

use std::error::Error;
use std::path::Path;

/// A parameter representation that can be serialized to and from bytes.
///
/// Implementors should contain only plain data, never derived lookup
/// structures that can be rebuilt on load.
pub trait SerializableParams: Sized {
    /// The error type returned during (de)serialization.
    type Error: Error + Send + Sync + 'static;

    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: serde::Serialize + for<'de> serde::Deserialize<'de>,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Write serializable parameters to `path`.
pub(crate) fn write_params<T: SerializableParams, P: AsRef<Path>>(
    params: &T,
    path: P,
) -> std::io::Result<()> {
    let bytes = params.to_bytes().map_err(std::io::Error::other)?;
    std::fs::write(path, bytes)
}

/// Read serializable parameters from `path`.
pub(crate) fn read_params<T: SerializableParams, P: AsRef<Path>>(
    path: P,
) -> Result<T, crate::error::PipelineError> {
    let bytes = std::fs::read(path)?;
    T::from_bytes(&bytes).map_err(|e| crate::error::PipelineError::Serialization(e.to_string()))
}
