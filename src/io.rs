//! Loading processes from a comma-separated text file.
//!
//! The first line is a header. Each following row is `id,size,arrival,burst`
//! with size in KB. Malformed rows are skipped with a warning rather than
//! failing the whole load.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};
use rustc_hash::FxHashSet;

use crate::error::LoadError;
use crate::sim::Job;

const FIELDS: usize = 4;

fn parse_row(line: &str) -> Option<Job> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != FIELDS {
        return None;
    }
    let job = Job {
        id: fields[0].parse().ok()?,
        size: fields[1].parse().ok()?,
        arrival_time: fields[2].parse().ok()?,
        burst_time: fields[3].parse().ok()?,
    };
    (job.size > 0 && job.burst_time > 0).then_some(job)
}

/// Read at most `max_processes` jobs from `path`, sorted by arrival time.
pub fn read_jobs(path: &Path, max_processes: usize) -> Result<Vec<Job>, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);
    read_jobs_from(reader, max_processes)
        .map_err(|err| match err {
            RowsError::Io(source) => io_err(source),
            RowsError::Empty => LoadError::Empty(path.to_path_buf()),
            RowsError::NoRows => LoadError::NoProcesses(path.to_path_buf()),
        })
        .inspect(|jobs| info!("loaded {} processes from {}", jobs.len(), path.display()))
}

enum RowsError {
    Io(std::io::Error),
    Empty,
    NoRows,
}

fn read_jobs_from(reader: impl BufRead, max_processes: usize) -> Result<Vec<Job>, RowsError> {
    let mut lines = reader.lines();
    // Header
    match lines.next() {
        None => return Err(RowsError::Empty),
        Some(line) => {
            line.map_err(RowsError::Io)?;
        }
    }

    let mut jobs: Vec<Job> = Vec::new();
    let mut seen = FxHashSet::default();
    for (index, line) in lines.enumerate() {
        // 1-based, counting the header
        let line_no = index + 2;
        let line = line.map_err(RowsError::Io)?;
        if line.trim().is_empty() {
            continue;
        }
        if jobs.len() >= max_processes {
            warn!("process limit of {max_processes} reached, ignoring the rest of the file");
            break;
        }
        match parse_row(&line) {
            Some(job) if !seen.insert(job.id) => {
                warn!("line {line_no}: duplicate id {}, skipped", job.id);
            }
            Some(job) => jobs.push(job),
            None => warn!("line {line_no}: malformed row `{line}` skipped"),
        }
    }

    if jobs.is_empty() {
        return Err(RowsError::NoRows);
    }
    jobs.sort_by_key(|job| job.arrival_time);
    Ok(jobs)
}
