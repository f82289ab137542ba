use crate::Settings;

/// Side effects requested by `update`, executed by the owning controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Mirror the merged settings into durable storage.
    PersistSettings(Settings),
    /// Drop stored settings and the stored credential.
    ForgetPersisted,
}
