//! FPU coprocessor scripts
//!
//! Parse a line-oriented script of bus transactions and coprocessor commands,
//! and run it against a [`SystemContext`](fpu_runtime::SystemContext).
//!
//! ## Example
//!
//! ```rust
//! use fpu_runtime::{QueueBus, SystemContext};
//! use fpu_script::{parse_script, run_script};
//!
//! let script = parse_script("write32 3 1.0\nread 3\n").unwrap();
//! let mut fpu = SystemContext::with_defaults(QueueBus::new());
//! let reports = run_script(&script, &mut fpu);
//! assert_eq!(reports.len(), 2);
//! ```

pub mod error;
pub mod lexer;
pub mod parser;
pub mod runner;

pub use error::{Result, ScriptError};
pub use parser::{parse_command, parse_script, Command, Script, ScriptLine};
pub use runner::{run_script, Report, ReportLine};

/// Read and parse a script file
pub fn parse_file(path: impl AsRef<std::path::Path>) -> Result<Script> {
    let source = std::fs::read_to_string(path)?;
    parse_script(&source)
}
