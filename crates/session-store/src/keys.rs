//! Storage key constants.

/// Keys of the persisted credential record.
pub struct StorageKeys;

impl StorageKeys {
    /// Raw bearer token
    pub const TOKEN: &'static str = "token";

    /// JSON-serialized user snapshot
    pub const USER: &'static str = "user";
}
