use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

pub(crate) type CancelHook<'a> = Option<&'a (dyn Fn() -> bool + Sync)>;

/// Bounds on a batch of independent jobs.
#[derive(Clone, Copy)]
pub(crate) struct ExecutionLimits<'a> {
    pub parallelism: usize,
    pub deadline: Option<(Instant, Duration)>,
    pub should_cancel: CancelHook<'a>,
}

impl<'a> ExecutionLimits<'a> {
    pub fn new(
        parallelism: usize,
        time_budget: Option<Duration>,
        should_cancel: CancelHook<'a>,
    ) -> Self {
        Self {
            parallelism: normalize_parallelism(Some(parallelism)),
            deadline: time_budget.map(|budget| (Instant::now() + budget, budget)),
            should_cancel,
        }
    }

    pub fn check(&self) -> Result<(), String> {
        if should_cancelled(self.should_cancel) {
            return Err("cancelled".to_string());
        }
        if let Some((deadline, budget)) = self.deadline {
            if Instant::now() >= deadline {
                return Err(format!(
                    "time budget of {} ms exceeded",
                    budget.as_millis()
                ));
            }
        }
        Ok(())
    }
}

enum WorkerMessage<T> {
    Entry { order_idx: usize, entry: T },
    Fatal(String),
}

pub(crate) fn normalize_parallelism(value: Option<usize>) -> usize {
    value.unwrap_or(1).max(1)
}

fn should_cancelled(should_cancel: CancelHook<'_>) -> bool {
    should_cancel.map(|f| f()).unwrap_or(false)
}

/// Runs `job(0..count)` and returns the results in index order. `on_entry`
/// sees each result as it completes, which is index order only when serial.
pub(crate) fn execute_indexed<T, F>(
    count: usize,
    limits: ExecutionLimits<'_>,
    job: &F,
    on_entry: &mut dyn FnMut(usize, &T),
) -> Result<Vec<T>, String>
where
    T: Send,
    F: Fn(usize) -> Result<T, String> + Sync,
{
    let mut executed = if limits.parallelism <= 1 || count <= 1 {
        execute_serial(count, limits, job, on_entry)?
    } else {
        execute_parallel(count, limits, job, on_entry)?
    };
    executed.sort_by_key(|(order_idx, _)| *order_idx);
    Ok(executed.into_iter().map(|(_, entry)| entry).collect())
}

fn execute_serial<T, F>(
    count: usize,
    limits: ExecutionLimits<'_>,
    job: &F,
    on_entry: &mut dyn FnMut(usize, &T),
) -> Result<Vec<(usize, T)>, String>
where
    F: Fn(usize) -> Result<T, String>,
{
    let mut out = Vec::with_capacity(count);
    for order_idx in 0..count {
        limits.check()?;
        let entry = job(order_idx)?;
        on_entry(order_idx, &entry);
        out.push((order_idx, entry));
    }
    Ok(out)
}

fn execute_parallel<T, F>(
    count: usize,
    limits: ExecutionLimits<'_>,
    job: &F,
    on_entry: &mut dyn FnMut(usize, &T),
) -> Result<Vec<(usize, T)>, String>
where
    T: Send,
    F: Fn(usize) -> Result<T, String> + Sync,
{
    let worker_count = limits.parallelism.max(1).min(count);
    let next_index = AtomicUsize::new(0);
    let cancelled = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<WorkerMessage<T>>();

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let tx = tx.clone();
            let next_index_ref = &next_index;
            let cancelled_ref = &cancelled;
            scope.spawn(move || loop {
                if cancelled_ref.load(Ordering::Relaxed) {
                    break;
                }
                if let Err(err) = limits.check() {
                    cancelled_ref.store(true, Ordering::Relaxed);
                    let _ = tx.send(WorkerMessage::Fatal(err));
                    break;
                }

                let order_idx = next_index_ref.fetch_add(1, Ordering::Relaxed);
                if order_idx >= count {
                    break;
                }

                match job(order_idx) {
                    Ok(entry) => {
                        if tx.send(WorkerMessage::Entry { order_idx, entry }).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        cancelled_ref.store(true, Ordering::Relaxed);
                        let _ = tx.send(WorkerMessage::Fatal(err));
                        break;
                    }
                }
            });
        }

        drop(tx);

        let mut entries: Vec<(usize, T)> = Vec::with_capacity(count);
        let mut fatal_error: Option<String> = None;
        while let Ok(message) = rx.recv() {
            match message {
                WorkerMessage::Entry { order_idx, entry } => {
                    if fatal_error.is_none() {
                        on_entry(order_idx, &entry);
                        entries.push((order_idx, entry));
                    }
                }
                WorkerMessage::Fatal(err) => {
                    if fatal_error.is_none() {
                        fatal_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = fatal_error {
            return Err(err);
        }
        if entries.len() != count {
            return Err(format!(
                "internal optimizer error: expected {} results, got {}",
                count,
                entries.len()
            ));
        }

        Ok(entries)
    })
}
