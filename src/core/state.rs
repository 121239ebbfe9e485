use rustc_hash::FxHashMap;

use crate::error::SimError;
use crate::memory::PartitionTable;

pub type ProcessId = u32;
pub type PartitionId = u32;
pub type Ticks = u64;
pub type Kilobytes = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessState {
    New,
    Ready,
    Executing,
    Suspended,
    Terminated,
}

impl ProcessState {
    /// Whether `self -> to` is one of the transitions the engine performs.
    /// Staying in the same state is always allowed, except once terminated.
    pub fn can_become(self, to: ProcessState) -> bool {
        use ProcessState::*;
        match (self, to) {
            (Terminated, _) => false,
            (a, b) if a == b => true,
            (New, Ready | Suspended) => true,
            (Suspended, Ready) => true,
            (Ready, Executing | Suspended) => true,
            (Executing, Ready | Terminated | Suspended) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Process {
    pub id: ProcessId,
    pub size: Kilobytes,
    pub arrival_time: Ticks,
    pub burst_time: Ticks,
    pub state: ProcessState,
    pub remaining_time: Ticks,
    // Weak back-reference; the partition side owns the assignment
    pub partition: Option<PartitionId>,
    pub first_execution_time: Option<Ticks>,
    pub finish_time: Option<Ticks>,
    // Running tally until termination, then first_execution_time - arrival_time
    pub wait_time: Ticks,
    pub turnaround_time: Option<Ticks>,
}

impl Process {
    pub fn new(id: ProcessId, size: Kilobytes, arrival_time: Ticks, burst_time: Ticks) -> Self {
        Self {
            id,
            size,
            arrival_time,
            burst_time,
            state: ProcessState::New,
            remaining_time: burst_time,
            partition: None,
            first_execution_time: None,
            finish_time: None,
            wait_time: 0,
            turnaround_time: None,
        }
    }

    pub fn set_state(&mut self, to: ProcessState) {
        debug_assert!(
            self.state.can_become(to),
            "Process {} cannot go from {:?} to {:?}",
            self.id,
            self.state,
            to
        );
        self.state = to;
    }

    pub fn is_terminated(&self) -> bool {
        self.state == ProcessState::Terminated
    }

    /// Fix the final statistics once the last unit of work ran during the
    /// tick starting at `now`.
    pub fn finish(&mut self, now: Ticks) {
        debug_assert!(
            self.is_terminated(),
            "Process {} finished while {:?}",
            self.id,
            self.state
        );

        let finish_time = now + 1;
        let turnaround = finish_time - self.arrival_time;
        self.finish_time = Some(finish_time);
        self.turnaround_time = Some(turnaround);
        self.wait_time = match self.first_execution_time {
            Some(first) => first - self.arrival_time,
            None => turnaround.saturating_sub(self.burst_time),
        };
    }
}

/// Processes in load order, addressable by their external id.
#[derive(Debug, Default)]
pub struct ProcessTable {
    procs: Vec<Process>,
    index: FxHashMap<ProcessId, usize>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, process: Process) -> Result<(), SimError> {
        if self.index.contains_key(&process.id) {
            return Err(SimError::DuplicateProcess(process.id));
        }
        self.index.insert(process.id, self.procs.len());
        self.procs.push(process);
        Ok(())
    }

    pub fn get(&self, pid: ProcessId) -> Option<&Process> {
        self.index.get(&pid).map(|&idx| &self.procs[idx])
    }

    pub fn get_mut(&mut self, pid: ProcessId) -> Option<&mut Process> {
        self.index.get(&pid).map(|&idx| &mut self.procs[idx])
    }

    pub fn process(&self, pid: ProcessId) -> &Process {
        self.get(pid)
            .unwrap_or_else(|| panic!("Process {pid} missing from process table"))
    }

    pub fn process_mut(&mut self, pid: ProcessId) -> &mut Process {
        self.get_mut(pid)
            .unwrap_or_else(|| panic!("Process {pid} missing from process table"))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueKind {
    Arriving,
    Ready,
    Suspended,
    Terminated,
}

/// The engine's four process queues. Every membership change goes through
/// here so a process can never sit in two queues at once.
#[derive(Debug, Default)]
pub struct Queues {
    arriving: Vec<ProcessId>,
    ready: Vec<ProcessId>,
    suspended: Vec<ProcessId>,
    terminated: Vec<ProcessId>,
    membership: FxHashMap<ProcessId, QueueKind>,
}

impl Queues {
    pub fn new() -> Self {
        Self::default()
    }

    fn list(&self, kind: QueueKind) -> &Vec<ProcessId> {
        match kind {
            QueueKind::Arriving => &self.arriving,
            QueueKind::Ready => &self.ready,
            QueueKind::Suspended => &self.suspended,
            QueueKind::Terminated => &self.terminated,
        }
    }

    fn list_mut(&mut self, kind: QueueKind) -> &mut Vec<ProcessId> {
        match kind {
            QueueKind::Arriving => &mut self.arriving,
            QueueKind::Ready => &mut self.ready,
            QueueKind::Suspended => &mut self.suspended,
            QueueKind::Terminated => &mut self.terminated,
        }
    }

    pub fn get(&self, kind: QueueKind) -> &[ProcessId] {
        self.list(kind)
    }

    pub fn push(&mut self, kind: QueueKind, pid: ProcessId) {
        assert!(
            !self.membership.contains_key(&pid),
            "Process {pid} already present in {:?}",
            self.membership[&pid]
        );
        self.list_mut(kind).push(pid);
        self.membership.insert(pid, kind);
    }

    /// Remove `pid` from `kind`, keeping the order of the others.
    pub fn remove(&mut self, kind: QueueKind, pid: ProcessId) -> bool {
        if self.membership.get(&pid) != Some(&kind) {
            return false;
        }
        let list = self.list_mut(kind);
        let Some(pos) = list.iter().position(|&p| p == pid) else {
            debug_assert!(
                false,
                "Process {pid} missing from {kind:?} despite membership"
            );
            return false;
        };
        list.remove(pos);
        self.membership.remove(&pid);
        true
    }

    /// Move `pid` to the back of `to` from wherever it is. Returns the queue
    /// it left, if any.
    pub fn move_to(&mut self, pid: ProcessId, to: QueueKind) -> Option<QueueKind> {
        let from = self.kind_of(pid);
        if let Some(from) = from {
            self.remove(from, pid);
        }
        self.push(to, pid);
        from
    }

    pub fn kind_of(&self, pid: ProcessId) -> Option<QueueKind> {
        self.membership.get(&pid).copied()
    }

    pub fn contains(&self, kind: QueueKind, pid: ProcessId) -> bool {
        self.kind_of(pid) == Some(kind)
    }

    pub fn len(&self, kind: QueueKind) -> usize {
        self.list(kind).len()
    }

    pub fn membership(&self) -> impl Iterator<Item = (ProcessId, QueueKind)> + '_ {
        self.membership.iter().map(|(&pid, &kind)| (pid, kind))
    }
}

/// All state of one simulation run. Built on load, dropped with the run.
#[derive(Debug)]
pub struct SimCtx {
    pub now: Ticks,
    pub procs: ProcessTable,
    pub memory: PartitionTable,
    pub queues: Queues,
}

impl SimCtx {
    pub fn new(memory: PartitionTable) -> Self {
        Self {
            now: 0,
            procs: ProcessTable::new(),
            memory,
            queues: Queues::new(),
        }
    }

    pub fn advance_time(&mut self, delta: Ticks) {
        self.now = self.now.saturating_add(delta);
    }

    pub fn process(&self, pid: ProcessId) -> &Process {
        self.procs.process(pid)
    }

    pub fn process_mut(&mut self, pid: ProcessId) -> &mut Process {
        self.procs.process_mut(pid)
    }

    pub fn mark_suspended(&mut self, pid: ProcessId) {
        self.process_mut(pid).set_state(ProcessState::Suspended);
        self.queues.move_to(pid, QueueKind::Suspended);
    }

    pub fn all_terminated(&self) -> bool {
        self.queues.len(QueueKind::Terminated) == self.procs.len()
    }
}
