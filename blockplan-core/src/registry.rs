//! Numbering for auxiliary (cache) devices.
//!
//! The counter lives in an explicit registry passed to constructors instead
//! of a process-global, so tests can reset numbering deterministically and
//! two installs in one process cannot interleave ids.

/// Allocates monotonically increasing device ids.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    next_id: u64,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn reset(&mut self) {
        self.next_id = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Cache,
    Store,
}

/// A bcache-style caching device layered over a backing device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheDevice {
    id: u64,
    path: String,
    mode: CacheMode,
    backing: String,
}

impl CacheDevice {
    pub fn new(registry: &mut DeviceRegistry, mode: CacheMode, backing: impl Into<String>) -> Self {
        let id = registry.allocate();
        Self {
            id,
            path: format!("/dev/bcache{id}"),
            mode,
            backing: backing.into(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    pub fn backing(&self) -> &str {
        &self.backing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential_per_registry() {
        let mut registry = DeviceRegistry::new();
        let a = CacheDevice::new(&mut registry, CacheMode::Cache, "/dev/sdb");
        let b = CacheDevice::new(&mut registry, CacheMode::Store, "/dev/sdc");
        assert_eq!(a.id(), 0);
        assert_eq!(b.id(), 1);
        assert_eq!(a.path(), "/dev/bcache0");
        assert_eq!(b.path(), "/dev/bcache1");
    }

    #[test]
    fn reset_restarts_numbering() {
        let mut registry = DeviceRegistry::new();
        registry.allocate();
        registry.allocate();
        registry.reset();
        assert_eq!(registry.allocate(), 0);
    }

    #[test]
    fn registries_are_independent() {
        let mut first = DeviceRegistry::new();
        let mut second = DeviceRegistry::new();
        first.allocate();
        assert_eq!(second.allocate(), 0);
    }
}
