use std::sync::Arc;

use tokio::sync::watch;

use crate::settings::ValidationSettings;

/// Shared, on-demand view of the current settings.
///
/// Readers always see the most recently published value; nothing is cached
/// on the consumer side.
#[derive(Debug, Clone)]
pub struct SettingsHandle {
    tx: Arc<watch::Sender<ValidationSettings>>,
}

impl SettingsHandle {
    #[must_use]
    pub fn new(settings: ValidationSettings) -> Self {
        Self {
            tx: Arc::new(watch::Sender::new(settings)),
        }
    }

    /// Read a single value without cloning the whole settings struct.
    pub fn read<T>(&self, f: impl FnOnce(&ValidationSettings) -> T) -> T {
        f(&self.tx.borrow())
    }

    pub fn update(&self, settings: ValidationSettings) {
        tracing::debug!(?settings, "Validation settings updated");
        self.tx.send_replace(settings);
    }
}

impl Default for SettingsHandle {
    fn default() -> Self {
        Self::new(ValidationSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_visible_to_clones() {
        let handle = SettingsHandle::default();
        let reader = handle.clone();
        assert_eq!(reader.read(ValidationSettings::max_project_file_count), 1000);

        handle.update(ValidationSettings::default().with_max_project_file_count(0));
        assert_eq!(reader.read(ValidationSettings::max_project_file_count), 0);
    }
}
