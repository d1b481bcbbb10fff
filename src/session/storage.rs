use crate::error::SessionError;

/// Durable key/value backend for the session store.
pub trait SessionStorage: Send + Sync {
    /// Read a key, `None` when it was never written or has been removed.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Write a key, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}
