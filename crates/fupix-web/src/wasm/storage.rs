#![forbid(unsafe_code)]

use fupix_core::theme::ThemeStorage;
use tracing::warn;
use web_sys::Storage;

/// `window.localStorage`, or nothing when storage is blocked.
pub(crate) struct LocalStorage {
    inner: Option<Storage>,
}

impl LocalStorage {
    pub(crate) fn open() -> Self {
        let inner = web_sys::window().and_then(|w| w.local_storage().ok().flatten());
        if inner.is_none() {
            warn!("localStorage unavailable; theme will not persist");
        }
        Self { inner }
    }
}

impl ThemeStorage for LocalStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn save(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.inner {
            if let Err(err) = storage.set_item(key, value) {
                warn!(?err, "localStorage write failed");
            }
        }
    }
}
