mod sampler;

pub use sampler::CpuSampler;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::EventError;
use crate::event::Emitter;

struct Shared {
    stop: AtomicBool,
    interval_ms: AtomicU64,
}

impl Shared {
    fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.load(Ordering::Relaxed))
    }
}

/// Background thread that samples the CPU and emits one `CpuStat` per tick.
///
/// Dropping the producer stops the thread and waits for it to exit.
pub struct CpuProducer {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl CpuProducer {
    pub fn spawn(emitter: Emitter, update_interval: Duration) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            stop: AtomicBool::new(false),
            interval_ms: AtomicU64::new(update_interval.as_millis() as u64),
        });

        let thread_shared = Arc::clone(&shared);
        let thread = thread::Builder::new()
            .name(format!("{}-sampler", emitter.channel()))
            .spawn(move || run(emitter, thread_shared))?;

        info!("Started CPU producer, interval {update_interval:?}");
        Ok(Self {
            shared,
            thread: Some(thread),
        })
    }

    pub fn update_interval(&self) -> Duration {
        self.shared.interval()
    }

    pub fn set_update_interval(&self, interval: Duration) {
        self.shared
            .interval_ms
            .store(interval.as_millis() as u64, Ordering::Relaxed);
        if let Some(thread) = &self.thread {
            thread.thread().unpark();
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for CpuProducer {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread.thread().unpark();
            if thread.join().is_err() {
                warn!("CPU producer thread panicked");
            }
        }
        info!("Stopped CPU producer");
    }
}

fn run(emitter: Emitter, shared: Arc<Shared>) {
    let mut sampler = CpuSampler::new(shared.interval());

    loop {
        // Woken early on shutdown or when the interval changes.
        thread::park_timeout(sampler.time_until_update());
        if shared.stop.load(Ordering::Acquire) {
            break;
        }

        sampler.set_update_interval(shared.interval());
        if !sampler.should_update() {
            continue;
        }
        sampler.refresh();

        match emitter.emit(&sampler.stat()) {
            Ok(()) => {}
            Err(EventError::Disconnected(channel)) => {
                debug!("Event bus for `{channel}` is gone, stopping sampler");
                break;
            }
            Err(err) => warn!("Could not emit CPU sample: {err}"),
        }
    }
}
