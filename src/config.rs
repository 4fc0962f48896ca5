//! Global configuration options.

use std::sync::{OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Global configuration options for the `dataset_io` crate.
///
/// Retrieve the global [`Config`] with [`global_config`] and modify it with [`global_config_mut`].
///
/// # String Conversion Configuration Options
///
/// ## Null Strings As Empty
///  > default: [`true`]
///
/// If enabled, a string element that a storage engine leaves unpopulated (a null pointer) is read as an empty string.
/// Otherwise the read fails with [`ConversionError::NullString`](crate::array::ConversionError::NullString).
///
/// ## Lossy UTF-8 Strings
///  > default: [`false`]
///
/// If enabled, invalid UTF-8 sequences in strings returned by a storage engine are replaced with `U+FFFD`.
/// Otherwise the read fails with [`ConversionError::InvalidUtf8`](crate::array::ConversionError::InvalidUtf8).
#[derive(Debug)]
pub struct Config {
    null_strings_as_empty: bool,
    lossy_utf8_strings: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            null_strings_as_empty: true,
            lossy_utf8_strings: false,
        }
    }
}

impl Config {
    /// Get the [null strings as empty](#null-strings-as-empty) configuration.
    #[must_use]
    pub fn null_strings_as_empty(&self) -> bool {
        self.null_strings_as_empty
    }

    /// Set the [null strings as empty](#null-strings-as-empty) configuration.
    pub fn set_null_strings_as_empty(&mut self, null_strings_as_empty: bool) {
        self.null_strings_as_empty = null_strings_as_empty;
    }

    /// Get the [lossy UTF-8 strings](#lossy-utf-8-strings) configuration.
    #[must_use]
    pub fn lossy_utf8_strings(&self) -> bool {
        self.lossy_utf8_strings
    }

    /// Set the [lossy UTF-8 strings](#lossy-utf-8-strings) configuration.
    pub fn set_lossy_utf8_strings(&mut self, lossy_utf8_strings: bool) {
        self.lossy_utf8_strings = lossy_utf8_strings;
    }
}

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

/// Returns a reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config() -> RwLockReadGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .read()
        .unwrap()
}

/// Returns a mutable reference to the global configuration.
///
/// # Panics
/// This function panics if the underlying lock has been poisoned and might panic if the global config is already held by the current thread.
pub fn global_config_mut() -> RwLockWriteGuard<'static, Config> {
    CONFIG
        .get_or_init(|| RwLock::new(Config::default()))
        .write()
        .unwrap()
}
