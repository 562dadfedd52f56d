use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum KernelError {
    NotFound,
    StateConflict,
    LimitExceeded,
    Validation,
    AlreadyExists,
    Concurrency,
    Timeout,
    Internal,
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound => write!(f, "Requested entity was not found"),
            KernelError::StateConflict => write!(f, "Entity state does not allow this operation"),
            KernelError::LimitExceeded => write!(f, "Active lease limit exceeded"),
            KernelError::Validation => write!(f, "Invalid input"),
            KernelError::AlreadyExists => write!(f, "Entity already exists"),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
