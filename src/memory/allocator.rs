//! Best-fit allocation over the fixed partition table.
//!
//! The allocator only touches `Process` and `Partition` fields. Queue
//! membership of an evicted process is the engine's business.

use log::debug;
use thiserror::Error;

use super::PartitionTable;
use crate::core::state::{Kilobytes, PartitionId, ProcessId, ProcessState, ProcessTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub partition: PartitionId,
    // Previous occupant swapped out to make room
    pub evicted: Option<ProcessId>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    #[error("no free partition can hold process {pid} ({size}K)")]
    NoFit {
        pid: ProcessId,
        size: Kilobytes,
    },
    #[error("process {pid} already occupies partition {partition}")]
    AlreadyPlaced {
        pid: ProcessId,
        partition: PartitionId,
    },
    #[error("partition {partition} ({capacity}K) is too small for process {pid} ({size}K)")]
    TooSmall {
        pid: ProcessId,
        size: Kilobytes,
        partition: PartitionId,
        capacity: Kilobytes,
    },
    #[error("unknown partition {0}")]
    UnknownPartition(PartitionId),
}

impl PartitionTable {
    /// Smallest free partition that still holds `size`. Ties go to the
    /// partition listed first.
    pub fn find_best_fit(&self, size: Kilobytes) -> Option<PartitionId> {
        let mut best: Option<(Kilobytes, PartitionId)> = None;
        for part in self.partitions() {
            if !part.is_free() || !part.fits(size) {
                continue;
            }
            let leftover = part.size - size;
            if best.is_none_or(|(min, _)| leftover < min) {
                best = Some((leftover, part.id));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Place `pid` in its best-fit partition and mark it Ready. On any error
    /// the process and the table are left untouched.
    pub fn allocate(
        &mut self,
        procs: &mut ProcessTable,
        pid: ProcessId,
    ) -> Result<Placement, AllocError> {
        let process = procs.process(pid);
        if let Some(partition) = process.partition {
            return Err(AllocError::AlreadyPlaced { pid, partition });
        }

        let size = process.size;
        let partition = self
            .find_best_fit(size)
            .ok_or(AllocError::NoFit { pid, size })?;
        self.place(procs, pid, partition)
    }

    /// Put `pid` into `partition`, swapping out whichever other process is
    /// there. The evicted process becomes Suspended and loses its partition.
    pub fn place(
        &mut self,
        procs: &mut ProcessTable,
        pid: ProcessId,
        partition: PartitionId,
    ) -> Result<Placement, AllocError> {
        let process = procs.process(pid);
        if let Some(current) = process.partition {
            return Err(AllocError::AlreadyPlaced {
                pid,
                partition: current,
            });
        }
        let size = process.size;

        let part = self
            .get_mut(partition)
            .ok_or(AllocError::UnknownPartition(partition))?;
        if !part.fits(size) {
            return Err(AllocError::TooSmall {
                pid,
                size,
                partition,
                capacity: part.size,
            });
        }

        let evicted = part.release();
        if let Some(victim) = evicted {
            let victim = procs.process_mut(victim);
            victim.partition = None;
            victim.set_state(ProcessState::Suspended);
            debug!("evicted process {} from partition {partition}", victim.id);
        }

        let process = procs.process_mut(pid);
        part.assign(process);
        process.set_state(ProcessState::Ready);
        debug!(
            "process {pid} ({size}K) placed in partition {partition}, {}K internal fragmentation",
            part.internal_fragmentation()
        );

        Ok(Placement { partition, evicted })
    }

    /// Release whatever partition `pid` holds. Freeing twice is a no-op.
    pub fn free(&mut self, procs: &mut ProcessTable, pid: ProcessId) -> Option<PartitionId> {
        let process = procs.process_mut(pid);
        let partition = process.partition.take()?;

        if let Some(part) = self.get_mut(partition) {
            let released = part.release();
            debug_assert_eq!(
                released,
                Some(pid),
                "Partition {partition} did not hold process {pid}"
            );
        }
        Some(partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionLayout;
    use crate::core::state::Process;
    use crate::memory::PartitionSpec;

    fn standard() -> PartitionTable {
        PartitionTable::new(&PartitionLayout::Standard.partitions())
    }

    fn spec(id: PartitionId, size: Kilobytes, start_address: Kilobytes) -> PartitionSpec {
        PartitionSpec {
            id,
            size,
            start_address,
        }
    }

    fn procs(specs: &[(ProcessId, Kilobytes)]) -> ProcessTable {
        let mut table = ProcessTable::new();
        for &(id, size) in specs {
            table.insert(Process::new(id, size, 0, 5)).unwrap();
        }
        table
    }

    #[test]
    fn best_fit_picks_smallest_leftover() {
        let table = standard();
        assert_eq!(table.find_best_fit(40), Some(3));
        assert_eq!(table.find_best_fit(50), Some(3));
        assert_eq!(table.find_best_fit(51), Some(2));
        assert_eq!(table.find_best_fit(200), Some(1));
        assert_eq!(table.find_best_fit(251), None);
    }

    #[test]
    fn best_fit_ties_go_to_first_listed() {
        let table = PartitionTable::new(&[spec(9, 100, 0), spec(4, 100, 100)]);
        assert_eq!(table.find_best_fit(60), Some(9));
    }

    #[test]
    fn best_fit_skips_occupied_partitions() {
        let mut table = standard();
        let mut procs = procs(&[(1, 30), (2, 30)]);

        assert_eq!(table.allocate(&mut procs, 1).unwrap().partition, 3);
        assert_eq!(table.find_best_fit(30), Some(2));
    }

    #[test]
    fn allocate_marks_ready_and_links_both_sides() {
        let mut table = standard();
        let mut procs = procs(&[(1, 120)]);

        let placement = table.allocate(&mut procs, 1).unwrap();

        assert_eq!(placement.partition, 2);
        assert_eq!(placement.evicted, None);
        let p = procs.process(1);
        assert_eq!(p.state, ProcessState::Ready);
        assert_eq!(p.partition, Some(2));
        assert_eq!(table.get(2).unwrap().internal_fragmentation(), 30);
    }

    #[test]
    fn allocate_without_fit_leaves_process_alone() {
        let mut table = standard();
        let mut procs = procs(&[(1, 300)]);

        assert_eq!(
            table.allocate(&mut procs, 1),
            Err(AllocError::NoFit { pid: 1, size: 300 })
        );
        assert_eq!(procs.process(1).state, ProcessState::New);
        assert_eq!(procs.process(1).partition, None);
        assert_eq!(table.free_count(), 3);
    }

    #[test]
    fn allocate_twice_is_rejected() {
        let mut table = standard();
        let mut procs = procs(&[(1, 40)]);
        table.allocate(&mut procs, 1).unwrap();

        let err = table.allocate(&mut procs, 1).unwrap_err();
        assert_eq!(err.to_string(), "process 1 already occupies partition 3");
        assert_eq!(table.get(3).unwrap().occupant(), Some(1));
        assert_eq!(table.free_count(), 2);
    }

    #[test]
    fn place_evicts_previous_occupant() {
        let mut table = standard();
        let mut procs = procs(&[(1, 40), (2, 45)]);
        table.allocate(&mut procs, 1).unwrap();

        let placement = table.place(&mut procs, 2, 3).unwrap();

        assert_eq!(placement.partition, 3);
        assert_eq!(placement.evicted, Some(1));
        assert_eq!(procs.process(1).state, ProcessState::Suspended);
        assert_eq!(procs.process(1).partition, None);
        assert_eq!(procs.process(2).partition, Some(3));
        assert_eq!(table.get(3).unwrap().internal_fragmentation(), 5);
    }

    #[test]
    fn place_rejects_small_or_unknown_partitions() {
        let mut table = standard();
        let mut procs = procs(&[(1, 100)]);

        let err = table.place(&mut procs, 1, 3).unwrap_err();
        assert_eq!(
            err.to_string(),
            "partition 3 (50K) is too small for process 1 (100K)"
        );
        assert_eq!(
            table.place(&mut procs, 1, 42),
            Err(AllocError::UnknownPartition(42))
        );
        assert_eq!(procs.process(1).partition, None);
    }

    #[test]
    fn free_is_idempotent() {
        let mut table = standard();
        let mut procs = procs(&[(1, 100)]);
        table.allocate(&mut procs, 1).unwrap();

        assert_eq!(table.free(&mut procs, 1), Some(2));
        assert_eq!(table.free(&mut procs, 1), None);
        assert!(table.get(2).unwrap().is_free());
        assert_eq!(table.get(2).unwrap().internal_fragmentation(), 0);
        assert_eq!(procs.process(1).partition, None);
    }
}
