//! Bounded-time access to a device that may stall.
//!
//! Each device lives on its own thread and is driven through a one-slot job
//! queue. Callers wait for the answer with `recv_timeout`, so a wedged bus
//! costs at most one timeout per call instead of blocking the acquisition loop.
//!
//! A call that timed out before its job started is cancelled: the job is
//! dropped unrun when the device thread gets to it. While the device is stuck
//! and a job is already waiting, further calls give up with `Busy`. Each call,
//! queueing included, waits at most one timeout.

use super::SensorError;
use crossbeam_channel::{RecvTimeoutError, SendTimeoutError, Sender, bounded};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

type Job<D> = Box<dyn FnOnce(&mut D) + Send>;

pub struct DeviceWorker<D> {
    name: &'static str,
    timeout: Duration,
    jobs: Sender<Job<D>>,
}

impl<D: Send + 'static> DeviceWorker<D> {
    pub fn spawn(name: &'static str, device: D, timeout: Duration) -> io::Result<Self> {
        let (jobs, queue) = bounded::<Job<D>>(1);
        thread::Builder::new()
            .name(format!("dev-{name}"))
            .spawn(move || {
                let mut device = device;
                for job in queue {
                    job(&mut device);
                }
                log::debug!("{name} worker stopped");
            })?;
        Ok(Self {
            name,
            timeout,
            jobs,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run `op` on the device thread and wait at most the configured timeout.
    ///
    /// `op` never runs after this returned a timeout, unless it had already started.
    pub fn call<T, F>(&self, op: F) -> Result<T, SensorError>
    where
        T: Send + 'static,
        F: FnOnce(&mut D) -> Result<T, SensorError> + Send + 'static,
    {
        let (reply, answer) = bounded(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let job_cancelled = Arc::clone(&cancelled);

        let job: Job<D> = Box::new(move |device: &mut D| {
            if job_cancelled.load(Ordering::Acquire) {
                log::debug!("dropping a cancelled request");
                return;
            }
            let _ = reply.send(op(device));
        });
        let deadline = Instant::now() + self.timeout;
        match self.jobs.send_timeout(job, self.timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(SensorError::Busy(self.name)),
            Err(SendTimeoutError::Disconnected(_)) => {
                return Err(SensorError::Disconnected(self.name));
            }
        }

        match answer.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                cancelled.store(true, Ordering::Release);
                log::debug!("{} call timed out after {:?}", self.name, self.timeout);
                Err(SensorError::Timeout {
                    device: self.name,
                    after: self.timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(SensorError::Disconnected(self.name)),
        }
    }
}
