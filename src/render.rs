//! Plain-text tables for the terminal.

use std::fmt::Write;

use crate::core::{Kilobytes, ProcessId, Ticks};
use crate::sim::{Job, PartitionRow, QueueSnapshot, Report};

const WIDE: usize = 60;

fn rule(out: &mut String, ch: char, width: usize) {
    out.extend(std::iter::repeat_n(ch, width));
    out.push('\n');
}

fn banner(out: &mut String, title: &str, width: usize) {
    rule(out, '=', width);
    let _ = writeln!(out, "{title}");
    rule(out, '=', width);
}

fn id_list(ids: &[ProcessId]) -> String {
    if ids.is_empty() {
        return "---".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn job_table(jobs: &[Job]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<8} {:<8} {:<8}",
        "Id", "Size", "Arrival", "Burst"
    );
    for job in jobs {
        let size = format!("{}K", job.size);
        let _ = writeln!(
            out,
            "{:<6} {:<8} {:<8} {:<8}",
            job.id, size, job.arrival_time, job.burst_time
        );
    }
    out
}

pub fn time_header(now: Ticks) -> String {
    let mut out = String::new();
    banner(&mut out, &format!("TIME: {now}"), WIDE);
    out
}

pub fn memory_table(rows: &[PartitionRow], os_reserved_kb: Kilobytes) -> String {
    let mut out = String::new();
    banner(&mut out, "MEMORY LAYOUT", WIDE);
    let _ = writeln!(
        out,
        "{:<10} {:<8} {:<8} {:<10} {:<12}",
        "Partition", "Start", "Size", "Process", "Int. frag."
    );
    rule(&mut out, '-', WIDE);
    let os_size = format!("{os_reserved_kb}K");
    let _ = writeln!(
        out,
        "{:<10} {:<8} {:<8} {:<10} {:<12}",
        "OS", 0, os_size, "OS", "---"
    );
    for row in rows {
        let (occupant, frag) = match row.occupant {
            Some(pid) => (pid.to_string(), format!("{}K", row.internal_fragmentation)),
            None => ("free".to_string(), "---".to_string()),
        };
        let size = format!("{}K", row.size);
        let _ = writeln!(
            out,
            "{:<10} {:<8} {:<8} {:<10} {:<12}",
            row.id, row.start_address, size, occupant, frag
        );
    }
    rule(&mut out, '=', WIDE);
    out
}

pub fn queue_table(queues: &QueueSnapshot) -> String {
    let mut out = String::new();
    banner(&mut out, "PROCESS QUEUES", WIDE);
    let executing: Vec<ProcessId> = queues.executing.into_iter().collect();
    for (label, ids) in [
        ("Executing", executing.as_slice()),
        ("Ready", queues.ready.as_slice()),
        ("Suspended", queues.suspended.as_slice()),
        ("Not arrived", queues.arriving.as_slice()),
        ("Terminated", queues.terminated.as_slice()),
    ] {
        let _ = writeln!(out, "{label:<14} {}", id_list(ids));
    }
    rule(&mut out, '=', WIDE);
    out
}

pub fn report_table(report: &Report) -> String {
    const WIDTH: usize = 80;
    let mut out = String::new();
    banner(&mut out, "STATISTICS", WIDTH);
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:<10} {:<10} {:<12} {:<10}",
        "Process", "Arrival", "Burst", "Finish", "Turnaround", "Wait"
    );
    rule(&mut out, '-', WIDTH);

    let na = |v: Option<Ticks>| v.map_or_else(|| "N/A".to_string(), |t| t.to_string());
    for row in &report.rows {
        let _ = writeln!(
            out,
            "{:<10} {:<10} {:<10} {:<10} {:<12} {:<10}",
            row.id,
            row.arrival_time,
            row.burst_time,
            na(row.finish_time),
            na(row.turnaround_time),
            row.wait_time
        );
    }
    rule(&mut out, '-', WIDTH);
    let _ = writeln!(
        out,
        "{:<10} {:<10} {:<10} {:<10} {:<12.2} {:<10.2}",
        "Average", "---", "---", "---", report.avg_turnaround, report.avg_wait
    );
    rule(&mut out, '=', WIDTH);
    let _ = writeln!(
        out,
        "Throughput: {:.4} processes/tick ({} of {} terminated in {} ticks)",
        report.throughput,
        report.terminated,
        report.rows.len(),
        report.total_time
    );
    out
}
