//! Blacklist management module
//!
//! Holds the set of common passwords the `notword` factor rejects.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

pub const BLACKLIST_PATH_ENV: &str = "PWD_BLACKLIST_PATH";
pub const DEFAULT_BLACKLIST_PATH: &str = "./assets/blacklist.txt";

static SHARED_BLACKLIST: OnceLock<Arc<Blacklist>> = OnceLock::new();

#[derive(Error, Debug)]
pub enum BlacklistError {
    #[error("Blacklist file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read blacklist file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Blacklist file is empty")]
    EmptyFile,
}

/// An immutable set of common passwords.
///
/// Membership is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    words: HashSet<String>,
}

impl Blacklist {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads a blacklist with one password per line.
    ///
    /// Empty lines are skipped; a trailing `\r` is stripped so that files
    /// with Windows line endings load the same passwords.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File does not exist
    /// - File cannot be read
    /// - File contains no passwords
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, BlacklistError> {
        let path = path.as_ref();

        if !path.exists() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blacklist loading FAILED: FileNotFound {}", path.display());
            return Err(BlacklistError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        let words: HashSet<String> = content
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();

        if words.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::error!("Blacklist loading FAILED: Empty file {}", path.display());
            return Err(BlacklistError::EmptyFile);
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Blacklist loaded: {} passwords from {:?}", words.len(), path);

        Ok(Self { words })
    }

    /// Loads the blacklist from [`get_blacklist_path`].
    pub fn from_env() -> Result<Self, BlacklistError> {
        Self::from_path(get_blacklist_path())
    }

    pub fn contains(&self, password: &str) -> bool {
        self.words.contains(password)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Returns the blacklist file path.
///
/// Priority:
/// 1. Environment variable `PWD_BLACKLIST_PATH`
/// 2. Default path `./assets/blacklist.txt`
pub fn get_blacklist_path() -> PathBuf {
    std::env::var(BLACKLIST_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BLACKLIST_PATH))
}

/// Loads the process-wide blacklist from [`get_blacklist_path`] on first call.
///
/// Later calls return the same snapshot without touching the file system.
/// The snapshot is never modified once loaded.
///
/// # Example
///
/// ```rust,ignore
/// unsafe { std::env::set_var("PWD_BLACKLIST_PATH", "/etc/myapp/blacklist.txt"); }
/// let blacklist = pwd_meter::init_blacklist()?;
/// let meter = pwd_meter::Meter::with_defaults(blacklist);
/// ```
pub fn init_blacklist() -> Result<Arc<Blacklist>, BlacklistError> {
    if let Some(shared) = SHARED_BLACKLIST.get() {
        return Ok(Arc::clone(shared));
    }
    let loaded = Arc::new(Blacklist::from_env()?);
    Ok(Arc::clone(SHARED_BLACKLIST.get_or_init(|| loaded)))
}

/// Returns the process-wide blacklist, if [`init_blacklist`] succeeded.
pub fn shared_blacklist() -> Option<Arc<Blacklist>> {
    SHARED_BLACKLIST.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::remove_var(key); }
    }

    fn setup_with_tempfile(passwords: &[&str]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        for pwd in passwords {
            writeln!(temp_file, "{}", pwd).expect("Failed to write");
        }
        temp_file
    }

    #[test]
    #[serial]
    fn test_get_blacklist_path_default() {
        remove_env(BLACKLIST_PATH_ENV);

        let path = get_blacklist_path();
        assert_eq!(path, PathBuf::from("./assets/blacklist.txt"));
    }

    #[test]
    #[serial]
    fn test_get_blacklist_path_from_env() {
        let custom_path = "/custom/path/blacklist.txt";
        set_env(BLACKLIST_PATH_ENV, custom_path);

        let path = get_blacklist_path();
        assert_eq!(path, PathBuf::from(custom_path));

        remove_env(BLACKLIST_PATH_ENV);
    }

    #[test]
    fn test_from_path_file_not_found() {
        let result = Blacklist::from_path("/nonexistent/path/blacklist.txt");
        match result {
            Err(BlacklistError::FileNotFound(_)) => {}
            _ => panic!("Expected FileNotFound error"),
        }
    }

    #[test]
    fn test_from_path_empty_file() {
        let temp_file = setup_with_tempfile(&["", ""]);
        let result = Blacklist::from_path(temp_file.path());
        assert!(matches!(result, Err(BlacklistError::EmptyFile)));
    }

    #[test]
    fn test_from_path_success() {
        let temp_file = setup_with_tempfile(&["password123", "qwerty", "", "qwerty"]);
        let blacklist = Blacklist::from_path(temp_file.path()).unwrap();
        assert_eq!(blacklist.len(), 2);
        assert!(blacklist.contains("qwerty"));
        assert!(!blacklist.contains(""));
    }

    #[test]
    fn test_from_path_strips_carriage_returns() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "letmein\r\ndragon\r\n").expect("Failed to write");
        let blacklist = Blacklist::from_path(temp_file.path()).unwrap();
        assert!(blacklist.contains("letmein"));
        assert!(blacklist.contains("dragon"));
    }

    #[test]
    fn test_contains_is_case_sensitive() {
        let blacklist = Blacklist::from_words(["testpassword"]);
        assert!(blacklist.contains("testpassword"));
        assert!(!blacklist.contains("TESTPASSWORD"));
        assert!(!blacklist.contains("testpassword "));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        let temp_file = setup_with_tempfile(&["common123"]);
        set_env(BLACKLIST_PATH_ENV, temp_file.path().to_str().unwrap());

        let blacklist = Blacklist::from_env().unwrap();
        assert!(blacklist.contains("common123"));
        assert!(!blacklist.contains("veryuncommonpassword987"));

        remove_env(BLACKLIST_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_init_blacklist_is_loaded_once() {
        let temp_file = setup_with_tempfile(&["hunter2"]);
        set_env(BLACKLIST_PATH_ENV, temp_file.path().to_str().unwrap());

        let first = init_blacklist().unwrap();
        remove_env(BLACKLIST_PATH_ENV);
        let second = init_blacklist().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.contains("hunter2"));
        assert!(shared_blacklist().is_some());
    }
}
