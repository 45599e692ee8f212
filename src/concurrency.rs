//! A hand-rolled parallel-for thread pool, mirroring the condvar-guarded
//! work-list design the tile-render loop is built around: `N` persistent
//! worker threads plus the calling thread, a shared mutex-guarded list of
//! in-flight `ParallelForLoop`-style chunks, and a one-time startup barrier.
//!
//! This is deliberately not a wrapper over a general-purpose work-stealing
//! crate: the tile-merge determinism the integrator depends on comes from
//! this simple chunked, in-order hand-off.

use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::JoinHandle;

thread_local! {
    static THREAD_INDEX: Cell<usize> = Cell::new(0);
}

/// The calling thread's worker index: `0` for whichever thread created the
/// pool (it participates in every `parallel_for`), `1..=n_workers` for the
/// pool's own spawned threads.
pub fn thread_index() -> usize {
    THREAD_INDEX.with(|c| c.get())
}

struct WorkItem {
    func: *const (dyn Fn(usize) + Send + Sync),
    max_index: usize,
    chunk_size: usize,
    next_index: AtomicUsize,
    active_workers: AtomicUsize,
}

// SAFETY: `func` is only ever dereferenced by `run_item` while
// `ParallelPool::parallel_for`'s own busy-wait (see below) has not yet
// observed `next_index >= max_index && active_workers == 0`. That busy-wait
// is exactly the condition under which `parallel_for` returns, unwinding
// the stack frame `func` borrows from - so no dereference of `func` can
// outlive the borrow it points at.
unsafe impl Send for WorkItem {}
unsafe impl Sync for WorkItem {}

struct Shared {
    work: Mutex<VecDeque<Arc<WorkItem>>>,
    work_ready: Condvar,
    shutdown: AtomicBool,
}

/// A persistent pool of OS worker threads cooperating with the calling
/// thread on `parallel_for`/`parallel_for_2d` calls.
pub struct ParallelPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    n_threads: usize,
}

impl ParallelPool {
    /// One worker per additional hardware thread; the pool's creator counts
    /// as the `N`-th.
    pub fn new() -> Self {
        let hw = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::with_threads(hw)
    }

    pub fn with_threads(n_threads: usize) -> Self {
        let shared = Arc::new(Shared {
            work: Mutex::new(VecDeque::new()),
            work_ready: Condvar::new(),
            shutdown: AtomicBool::new(false),
        });

        let n_workers = n_threads.saturating_sub(1);
        let barrier_state = Arc::new((Mutex::new(0usize), Condvar::new()));

        let mut workers = Vec::with_capacity(n_workers);
        for idx in 1..=n_workers {
            let shared = Arc::clone(&shared);
            let barrier_state = Arc::clone(&barrier_state);
            workers.push(std::thread::spawn(move || {
                THREAD_INDEX.with(|c| c.set(idx));
                {
                    let (lock, cvar) = &*barrier_state;
                    let mut arrived = lock.lock().unwrap();
                    *arrived += 1;
                    cvar.notify_all();
                }
                worker_loop(shared);
            }));
        }

        // One-use barrier: don't return until every worker has reported in.
        {
            let (lock, cvar) = &*barrier_state;
            let mut arrived = lock.lock().unwrap();
            while *arrived < n_workers {
                arrived = cvar.wait(arrived).unwrap();
            }
        }

        ParallelPool { shared, workers, n_threads }
    }

    pub fn n_threads(&self) -> usize {
        self.n_threads
    }

    /// Run `func(i)` for every `i` in `0..count`, blocking until every index
    /// has been processed exactly once. Degrades to a sequential loop when
    /// there are no worker threads or the work is smaller than one chunk.
    pub fn parallel_for<F>(&self, count: usize, chunk_size: usize, func: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        if count == 0 {
            return;
        }
        if self.workers.is_empty() || count < chunk_size {
            for i in 0..count {
                func(i);
            }
            return;
        }

        let func_ref: &(dyn Fn(usize) + Send + Sync) = &func;
        let func_ptr: *const (dyn Fn(usize) + Send + Sync) = func_ref;

        let item = Arc::new(WorkItem {
            func: func_ptr,
            max_index: count,
            chunk_size: chunk_size.max(1),
            next_index: AtomicUsize::new(0),
            active_workers: AtomicUsize::new(0),
        });

        {
            let mut work = self.shared.work.lock().unwrap();
            work.push_back(Arc::clone(&item));
        }
        self.shared.work_ready.notify_all();

        // The caller is worker "N+1": pull chunks until the list is dry.
        run_item(&item);

        // Wait for any chunks other workers grabbed concurrently.
        while item.next_index.load(Ordering::Acquire) < item.max_index
            || item.active_workers.load(Ordering::Acquire) > 0
        {
            std::thread::yield_now();
        }
    }

    /// Map a linear index to `(x, y)` via `n_x`, as the tile renderer uses
    /// to walk a 2D grid of tiles.
    pub fn parallel_for_2d<F>(&self, n_x: usize, n_y: usize, func: F)
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        self.parallel_for(n_x * n_y, 1, |i| func(i % n_x, i / n_x));
    }
}

impl Default for ParallelPool {
    fn default() -> Self {
        Self::new()
    }
}

fn run_item(item: &Arc<WorkItem>) {
    loop {
        let start = item.next_index.fetch_add(item.chunk_size, Ordering::AcqRel);
        if start >= item.max_index {
            break;
        }
        item.active_workers.fetch_add(1, Ordering::AcqRel);
        let end = (start + item.chunk_size).min(item.max_index);
        let f = unsafe { &*item.func };
        for i in start..end {
            f(i);
        }
        item.active_workers.fetch_sub(1, Ordering::AcqRel);
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        let next = {
            let mut work = shared.work.lock().unwrap();
            loop {
                if shared.shutdown.load(Ordering::Acquire) {
                    return;
                }
                match work.front() {
                    Some(front) if front.next_index.load(Ordering::Acquire) < front.max_index => {
                        break work.front().cloned();
                    }
                    Some(_) => {
                        work.pop_front();
                    }
                    None => {
                        work = shared.work_ready.wait(work).unwrap();
                    }
                }
            }
        };
        if let Some(item) = next {
            run_item(&item);
        }
    }
}

impl Drop for ParallelPool {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        self.shared.work_ready.notify_all();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn parallel_for_visits_every_index_once() {
        let pool = ParallelPool::with_threads(4);
        let n = 10_000;
        let hits: Vec<AtomicU32> = (0..n).map(|_| AtomicU32::new(0)).collect();
        pool.parallel_for(n, 17, |i| {
            hits[i].fetch_add(1, Ordering::Relaxed);
        });
        assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    }

    #[test]
    fn sequential_fallback_below_chunk_size() {
        let pool = ParallelPool::with_threads(1);
        let sum = std::sync::atomic::AtomicUsize::new(0);
        pool.parallel_for(8, 64, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), (0..8).sum());
    }

    #[test]
    fn parallel_for_2d_covers_grid() {
        let pool = ParallelPool::with_threads(4);
        let visited: Mutex<Vec<(usize, usize)>> = Mutex::new(Vec::new());
        pool.parallel_for_2d(5, 3, |x, y| {
            visited.lock().unwrap().push((x, y));
        });
        let mut v = visited.into_inner().unwrap();
        v.sort();
        let mut expected: Vec<(usize, usize)> =
            (0..3).flat_map(|y| (0..5).map(move |x| (x, y))).collect();
        expected.sort();
        assert_eq!(v, expected);
    }
}
