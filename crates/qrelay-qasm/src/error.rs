//! Error types for the QASM loader.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a QASM program.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The circuit file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested dialect token is not one of the supported versions.
    #[error("QASM version '{0}' is not supported (expected 2 or 3)")]
    UnsupportedDialect(String),

    /// The file header declares a different dialect than requested.
    #[error("Requested OpenQASM {requested} but the file declares OPENQASM {found}")]
    VersionMismatch { requested: String, found: String },

    /// Lexer error (invalid token).
    #[error("Lexer error at line {line}: {message}")]
    LexerError { line: usize, message: String },

    /// Unexpected token.
    #[error("Unexpected token at line {line}: expected {expected}, found {found}")]
    UnexpectedToken {
        line: usize,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input: {0}")]
    UnexpectedEof(String),

    /// Invalid version.
    #[error("Invalid OPENQASM version: {0}")]
    InvalidVersion(String),

    /// Undefined identifier.
    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),

    /// Duplicate declaration.
    #[error("Duplicate declaration: {0}")]
    DuplicateDeclaration(String),

    /// Unknown gate.
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// An opaque gate was applied; it has no definition to simulate.
    #[error("Opaque gate '{0}' has no definition")]
    OpaqueGate(String),

    /// Wrong number of qubit arguments.
    #[error("Gate '{gate}' expects {expected} qubits, got {got}")]
    WrongQubitCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Wrong number of parameters.
    #[error("Gate '{gate}' expects {expected} parameters, got {got}")]
    WrongParameterCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    /// Index out of bounds.
    #[error("Index {index} out of bounds for register '{register}' of size {size}")]
    IndexOutOfBounds {
        register: String,
        index: usize,
        size: usize,
    },

    /// Register arguments of a broadcast operation differ in size.
    #[error("Register arguments of '{operation}' have different sizes ({first} and {second})")]
    RegisterSizeMismatch {
        operation: String,
        first: usize,
        second: usize,
    },

    /// Invalid angle expression.
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),

    /// A construct that parses but cannot be lowered to a circuit.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    /// IR error during circuit construction.
    #[error("Circuit error: {0}")]
    CircuitError(#[from] qrelay_ir::IrError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
