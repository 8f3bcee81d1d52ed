//! Script errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown command at line {line}: {name}")]
    UnknownCommand { line: usize, name: String },

    #[error("Unknown operation at line {line}: {name}")]
    UnknownOperation { line: usize, name: String },

    #[error("Unknown opcode kind at line {line}: {name}")]
    UnknownOpcodeKind { line: usize, name: String },

    #[error("Invalid value at line {line}: {message}")]
    InvalidValue { line: usize, message: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
