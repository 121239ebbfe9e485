use crate::core::state::{Kilobytes, PartitionId, Process, ProcessId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionSpec {
    pub id: PartitionId,
    pub size: Kilobytes,
    pub start_address: Kilobytes,
}

#[derive(Debug, Clone)]
pub struct Partition {
    pub id: PartitionId,
    pub size: Kilobytes,
    pub start_address: Kilobytes,
    occupant: Option<ProcessId>,
    internal_fragmentation: Kilobytes,
}

impl Partition {
    pub fn new(id: PartitionId, size: Kilobytes, start_address: Kilobytes) -> Self {
        Self {
            id,
            size,
            start_address,
            occupant: None,
            internal_fragmentation: 0,
        }
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    pub fn occupant(&self) -> Option<ProcessId> {
        self.occupant
    }

    pub fn internal_fragmentation(&self) -> Kilobytes {
        self.internal_fragmentation
    }

    pub fn fits(&self, size: Kilobytes) -> bool {
        self.size >= size
    }

    // Caller guarantees the partition is free and large enough
    pub(crate) fn assign(&mut self, process: &mut Process) {
        debug_assert!(self.is_free(), "Partition {} already occupied", self.id);
        debug_assert!(
            self.fits(process.size),
            "Process {} does not fit partition {}",
            process.id,
            self.id
        );

        self.occupant = Some(process.id);
        self.internal_fragmentation = self.size - process.size;
        process.partition = Some(self.id);
    }

    /// Clear the occupant and return it.
    pub(crate) fn release(&mut self) -> Option<ProcessId> {
        self.internal_fragmentation = 0;
        self.occupant.take()
    }
}

/// The fixed partition layout, in configuration order. Order matters: it is
/// the tie-break order for best-fit.
#[derive(Debug, Clone, Default)]
pub struct PartitionTable {
    partitions: Vec<Partition>,
}

impl PartitionTable {
    pub fn new(specs: &[PartitionSpec]) -> Self {
        Self {
            partitions: specs
                .iter()
                .map(|s| Partition::new(s.id, s.size, s.start_address))
                .collect(),
        }
    }

    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    pub fn get(&self, id: PartitionId) -> Option<&Partition> {
        self.partitions.iter().find(|p| p.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: PartitionId) -> Option<&mut Partition> {
        self.partitions.iter_mut().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.partitions.iter().filter(|p| p.is_free()).count()
    }

    pub fn total_fragmentation(&self) -> Kilobytes {
        self.partitions
            .iter()
            .map(|p| p.internal_fragmentation)
            .sum()
    }

    /// The partition `process` lives in. Both sides of the reference must
    /// agree, otherwise the table is corrupt.
    pub fn holder_of(&self, process: &Process) -> Option<&Partition> {
        let partition = self.get(process.partition?);
        debug_assert!(
            partition.is_some_and(|p| p.occupant == Some(process.id)),
            "Process {} points at partition {:?} which does not hold it",
            process.id,
            process.partition
        );
        partition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionLayout;

    // 250K and 150K
    fn table() -> PartitionTable {
        PartitionTable::new(&PartitionLayout::Standard.partitions()[..2])
    }

    #[test]
    fn assign_tracks_fragmentation_and_back_reference() {
        let mut table = table();
        let mut p = Process::new(7, 120, 0, 3);

        table.get_mut(2).unwrap().assign(&mut p);

        let part = table.get(2).unwrap();
        assert_eq!(part.occupant(), Some(7));
        assert_eq!(part.internal_fragmentation(), 30);
        assert_eq!(p.partition, Some(2));
        assert_eq!(table.holder_of(&p).map(|h| h.id), Some(2));
        assert_eq!(table.free_count(), 1);
        assert_eq!(table.total_fragmentation(), 30);
    }

    #[test]
    fn release_resets_fragmentation() {
        let mut table = table();
        let mut p = Process::new(7, 120, 0, 3);
        table.get_mut(1).unwrap().assign(&mut p);

        assert_eq!(table.get_mut(1).unwrap().release(), Some(7));
        assert_eq!(table.get(1).unwrap().internal_fragmentation(), 0);
        assert_eq!(table.get_mut(1).unwrap().release(), None);
    }
}
