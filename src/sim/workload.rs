use rand::prelude::*;

use super::job::Job;
use crate::core::{Kilobytes, ProcessId, Ticks};

/// Knobs for a synthetic workload: one Bernoulli trial per tick decides
/// whether a process arrives, a second one whether it is short or long.
#[derive(Debug, Clone)]
pub struct WorkloadParams {
    pub ticks: Ticks,
    pub p_arrival: f64,
    pub p_short: f64,
    pub short_ticks: Ticks,
    pub long_ticks: Ticks,
    pub min_size: Kilobytes,
    pub max_size: Kilobytes,
    pub max_jobs: usize,
    pub seed: u64,
}

impl Default for WorkloadParams {
    fn default() -> Self {
        Self {
            ticks: 40,
            p_arrival: 0.3,
            p_short: 0.4,
            short_ticks: 2,
            long_ticks: 8,
            min_size: 10,
            max_size: 250,
            max_jobs: 10,
            seed: 0,
        }
    }
}

pub fn bernoulli_jobs(params: &WorkloadParams) -> Vec<Job> {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut jobs = Vec::new();

    for t in 0..params.ticks {
        if jobs.len() >= params.max_jobs {
            break;
        }
        if rng.random::<f64>() < params.p_arrival {
            let burst_time = if rng.random::<f64>() < params.p_short {
                params.short_ticks
            } else {
                params.long_ticks
            };
            let size = rng.random_range(params.min_size..=params.max_size);

            jobs.push(Job {
                id: jobs.len() as ProcessId + 1,
                size,
                arrival_time: t,
                burst_time,
            });
        }
    }

    jobs
}
