use super::state::{ProcessId, ProcessState, QueueKind, SimCtx};

#[derive(Debug, Default)]
pub struct Observer {
    step: u64,
}

impl Observer {
    pub fn new() -> Self {
        Self { step: 0 }
    }

    pub fn steps(&self) -> u64 {
        self.step
    }

    pub fn observe(&mut self, ctx: &SimCtx, current: Option<ProcessId>, degree: usize) {
        self.step += 1;

        let executing = ctx
            .procs
            .iter()
            .filter(|p| p.state == ProcessState::Executing)
            .count();
        debug_assert!(executing <= 1, "{executing} processes Executing at once");
        debug_assert_eq!(
            executing,
            usize::from(current.is_some()),
            "Executing count disagrees with cpu current {current:?}"
        );

        if let Some(pid) = current {
            let process = ctx.process(pid);
            debug_assert_eq!(
                process.state,
                ProcessState::Executing,
                "current process {pid} must be Executing"
            );
            debug_assert!(
                ctx.queues.kind_of(pid).is_none(),
                "Executing process {pid} must not appear in any queue"
            );
            debug_assert!(
                process.partition.is_some(),
                "Executing process {pid} has no partition"
            );
        }

        let queued = ctx.queues.membership().count();
        debug_assert_eq!(
            queued + usize::from(current.is_some()),
            ctx.procs.len(),
            "Every process must be queued or running exactly once"
        );

        for (pid, kind) in ctx.queues.membership() {
            debug_assert!(
                ctx.queues.get(kind).contains(&pid),
                "membership claims process {pid} in {kind:?}, but queue does not contain it"
            );
            let process = ctx.process(pid);
            let expected = match kind {
                QueueKind::Arriving => ProcessState::New,
                QueueKind::Ready => ProcessState::Ready,
                QueueKind::Suspended => ProcessState::Suspended,
                QueueKind::Terminated => ProcessState::Terminated,
            };
            debug_assert_eq!(
                process.state,
                expected,
                "process {pid} in {kind:?} has the wrong state"
            );
            match kind {
                QueueKind::Ready => {
                    debug_assert!(
                        ctx.memory.holder_of(process).is_some(),
                        "Ready process {pid} is not resident"
                    );
                }
                QueueKind::Terminated => {
                    debug_assert_eq!(
                        process.remaining_time,
                        0,
                        "Terminated process {pid} has work left"
                    );
                    debug_assert!(
                        process.partition.is_none(),
                        "Terminated process {pid} still holds memory"
                    );
                }
                QueueKind::Arriving | QueueKind::Suspended => {
                    debug_assert!(
                        process.partition.is_none(),
                        "Non-resident process {pid} holds a partition"
                    );
                }
            }
        }

        for part in ctx.memory.partitions() {
            let id = part.id;
            match part.occupant() {
                Some(pid) => {
                    let process = ctx.process(pid);
                    debug_assert_eq!(
                        process.partition,
                        Some(id),
                        "partition {id} holds process {pid}, which points elsewhere"
                    );
                    debug_assert_eq!(
                        part.internal_fragmentation(),
                        part.size - process.size,
                        "partition {id} fragmentation out of date"
                    );
                }
                None => {
                    debug_assert_eq!(
                        part.internal_fragmentation(),
                        0,
                        "free partition {id} reports fragmentation"
                    );
                }
            }
        }

        let resident = ctx.queues.len(QueueKind::Ready) + usize::from(current.is_some());
        debug_assert!(
            resident <= degree,
            "{resident} resident processes exceed degree {degree}"
        );
    }
}
