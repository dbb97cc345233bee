use crate::{backends::Backend, constants::DEFAULT_MEMORY_LIMIT};

/// Host settings applied to every call of a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VMConfig {
    /// Upper bound, in bytes, for the memory of a single call. Expanding past it halts the call
    /// with `OutOfBounds`.
    pub memory_limit: usize,
    pub backend: Backend,
}

impl Default for VMConfig {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            backend: Backend::default(),
        }
    }
}

impl VMConfig {
    pub fn with_backend(self, backend: Backend) -> Self {
        Self { backend, ..self }
    }
}
