/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::FlightPathCalculator;
use crate::types::{
    data_types::{CalculationGeneration, PlanIndex},
    flight_path::FlightPath,
    leg::LegDefinition,
};

const JOB_POLL_INTERVAL: Duration = Duration::from_millis(5);

pub(crate) struct CalculationJob {
    pub(crate) plan_index: PlanIndex,
    pub(crate) generation: CalculationGeneration,
    pub(crate) legs: Vec<LegDefinition>,
    pub(crate) active_lateral_leg: u32,
    pub(crate) start_leg: u32,
}

pub(crate) struct CalculationResult {
    pub(crate) plan_index: PlanIndex,
    pub(crate) generation: CalculationGeneration,
    pub(crate) flight_path: FlightPath,
}

/// Process-local reference to the calculation worker, held by every plan a planner owns.
#[derive(Clone)]
pub(crate) struct CalculatorHandle {
    jobs: Sender<CalculationJob>,
    next_generation: Arc<AtomicU64>,
    in_flight: Arc<AtomicUsize>,
}

impl CalculatorHandle {
    pub(crate) fn next_generation(&self) -> CalculationGeneration {
        CalculationGeneration::new(self.next_generation.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn submit(&self, job: CalculationJob) {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::SendError(job)) = self.jobs.send(job) {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            log::warn!(
                "calculation worker is gone, dropping calculation {} for plan {}",
                job.generation,
                job.plan_index
            );
        }
    }

    /// Number of submitted jobs whose results have not yet been handed back.
    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

/// Spawn the calculation worker thread, which runs `calculator` on submitted jobs and sends the
/// results back on the returned receiver.
///
/// Jobs that are queued behind a newer job for the same slot are skipped without being run.
pub(crate) fn start_calculation_worker<C: FlightPathCalculator>(
    mut calculator: C,
    shutdown_signal: Receiver<()>,
) -> (JoinHandle<()>, CalculatorHandle, Receiver<CalculationResult>) {
    let (to_worker, jobs) = mpsc::channel::<CalculationJob>();
    let (to_planner, results) = mpsc::channel();
    let in_flight = Arc::new(AtomicUsize::new(0));

    let handle = CalculatorHandle {
        jobs: to_worker,
        next_generation: Arc::new(AtomicU64::new(0)),
        in_flight: in_flight.clone(),
    };

    let worker = thread::spawn(move || loop {
        match shutdown_signal.try_recv() {
            Ok(()) => return,
            Err(TryRecvError::Empty) => (),
            Err(TryRecvError::Disconnected) => {
                panic!("Calculation worker thread disconnected from main thread")
            }
        }

        let first = match jobs.recv_timeout(JOB_POLL_INTERVAL) {
            Ok(job) => job,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };
        let mut pending = vec![first];
        pending.extend(jobs.try_iter());

        for (i, job) in pending.iter().enumerate() {
            let superseded = pending[i + 1..]
                .iter()
                .any(|later| later.plan_index == job.plan_index);
            if superseded {
                log::debug!(
                    "skipping calculation {} for plan {}, superseded in queue",
                    job.generation,
                    job.plan_index
                );
            } else {
                let flight_path =
                    calculator.calculate_flight_path(&job.legs, job.active_lateral_leg, job.start_leg);
                let _ = to_planner.send(CalculationResult {
                    plan_index: job.plan_index,
                    generation: job.generation,
                    flight_path,
                });
            }
            in_flight.fetch_sub(1, Ordering::SeqCst);
        }
    });

    (worker, handle, results)
}
