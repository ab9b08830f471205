//! Console output gating for the CLI.

/// Output verbosity, derived from the global `--verbose`/`--quiet` flags.
///
/// Ordered: anything printable at `Normal` is also printable at `Verbose`,
/// and `Quiet` prints nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Suppress all output
    Quiet,
    /// Normal output level
    Normal,
    /// Verbose output with additional details
    Verbose,
}

impl LogLevel {
    /// Derive the level from the global flags; `--quiet` wins over
    /// `--verbose`.
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LogLevel::Quiet
        } else if verbose {
            LogLevel::Verbose
        } else {
            LogLevel::Normal
        }
    }

    /// Whether a message tagged `required` should be printed at this level
    pub fn allows(self, required: LogLevel) -> bool {
        self != LogLevel::Quiet && self >= required
    }
}

/// Print `msg` when the current level permits it
pub fn log(level: LogLevel, required: LogLevel, msg: &str) {
    if level.allows(required) {
        println!("{msg}");
    }
}
