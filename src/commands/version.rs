//! Command: print version information.

/// Version string: `git describe` output when built from a checkout,
/// otherwise the package version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("PROJECT_SETTINGS_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("project-settings {}", version());
}
