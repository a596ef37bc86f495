/// Default bound on how deep a single resolution may nest
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Settings shared by every resolution of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerConfig {
    /// How many arguments may be resolved inside each other before resolution is aborted
    ///
    /// Resolution itself has no cycle detection; a circular registration keeps nesting until
    /// it hits this bound and fails with [ResolveError::DepthExceeded](crate::errors::ResolveError::DepthExceeded).
    pub max_depth: usize,
}
impl Default for ContainerConfig {
    fn default() -> Self {
        ContainerConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContainerConfig {
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
