//! Space accounting over a partition set. Pure; no planner state involved.

use crate::actions::PartitionAction;

/// The first partition starts 1 MiB in, leaving room for alignment and
/// bootloader embedding.
pub const FIRST_PARTITION_OFFSET: u64 = 1 << 20;

/// Bytes consumed by the recorded partitions: sum of `offset + size`.
pub fn used_bytes<'a>(partitions: impl IntoIterator<Item = &'a PartitionAction>) -> u64 {
    partitions
        .into_iter()
        .map(|part| part.offset + part.size)
        .sum()
}

/// Bytes still unallocated, saturating at zero.
pub fn free_bytes(total: u64, used: u64) -> u64 {
    total.saturating_sub(used)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::DiskAction;

    fn parts(specs: &[(u64, u64, u64)]) -> Vec<PartitionAction> {
        let disk = DiskAction::new("sda", "m", "s", "gpt");
        specs
            .iter()
            .map(|&(num, offset, size)| PartitionAction::new(&disk, num, offset, size, None))
            .collect()
    }

    #[test]
    fn used_bytes_sums_offset_plus_size() {
        let parts = parts(&[(1, FIRST_PARTITION_OFFSET, 4096), (2, 0, 8192)]);
        assert_eq!(used_bytes(&parts), FIRST_PARTITION_OFFSET + 4096 + 8192);
    }

    #[test]
    fn used_bytes_of_empty_set_is_zero() {
        assert_eq!(used_bytes(&[]), 0);
    }

    #[test]
    fn free_bytes_saturates_at_zero() {
        assert_eq!(free_bytes(1024, 4096), 0);
        assert_eq!(free_bytes(4096, 1024), 3072);
    }
}
