//! Log file location and timestamps.
use std::path::PathBuf;

/// Timestamp prefixed to every log file line.
pub(super) const LINE_TIME: &str = "%H:%M:%S";

/// Timestamp written in the log file header.
pub(super) const HEADER_TIME: &str = "%Y-%m-%d %H:%M:%S";

/// Log file for `command`: `$XDG_CACHE_HOME/project-settings/<command>.log`,
/// falling back to `~/.cache`.
///
/// Only computes the path; the directory is created by the file layer when
/// it actually opens the log.
pub(super) fn log_file_path(command: &str) -> PathBuf {
    let cache_home = std::env::var_os("XDG_CACHE_HOME").map_or_else(
        || {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map_or_else(|| PathBuf::from("."), PathBuf::from)
                .join(".cache")
        },
        PathBuf::from,
    );
    cache_home
        .join("project-settings")
        .join(format!("{command}.log"))
}

/// Current UTC time rendered with `format`.
pub(super) fn utc_now(format: &str) -> String {
    chrono::Utc::now().format(format).to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    #[allow(unsafe_code)]
    fn log_file_path_uses_xdg_cache_home_without_creating_it() {
        let _env_lock = crate::logging::TEST_ENV_MUTEX
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let tmp = tempfile::tempdir().unwrap();
        // SAFETY: Protected by TEST_ENV_MUTEX; restored before the lock is released.
        unsafe {
            std::env::set_var("XDG_CACHE_HOME", tmp.path());
        }
        let path = log_file_path("apply");
        unsafe {
            std::env::remove_var("XDG_CACHE_HOME");
        }
        assert_eq!(path, tmp.path().join("project-settings").join("apply.log"));
        assert!(!tmp.path().join("project-settings").exists());
    }

    #[test]
    fn line_time_is_hh_mm_ss() {
        let s = utc_now(LINE_TIME);
        assert_eq!(s.len(), 8);
        assert_eq!(&s[2..3], ":");
        assert_eq!(&s[5..6], ":");
    }

    #[test]
    fn header_time_has_date_and_time() {
        let s = utc_now(HEADER_TIME);
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
    }
}
