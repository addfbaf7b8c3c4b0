//! Fixed-size worker pool with whole-queue cancellation.
//!
//! Tasks run in FIFO order on plain OS threads. [`ThreadPool::clear_tasks`]
//! drops everything still queued and blocks until running tasks have noticed
//! the abort flag and returned, after which the pool accepts work again.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::{Condvar, Mutex};

use crate::error::{RenderError, RenderResult};

type Task = Box<dyn FnOnce() + Send + 'static>;

struct State {
    tasks: VecDeque<Task>,
    active: usize,
    stop: bool,
}

struct Shared {
    state: Mutex<State>,
    /// Signalled when tasks are queued or the pool stops
    task_available: Condvar,
    /// Signalled when the last active task finishes with nothing queued
    all_done: Condvar,
    abort: AtomicBool,
}

/// Cheap handle letting a running task poll for cancellation.
#[derive(Clone)]
pub struct AbortHandle {
    shared: Arc<Shared>,
}

impl AbortHandle {
    /// True while [`ThreadPool::clear_tasks`] is draining the pool.
    #[inline]
    pub fn should_abort(&self) -> bool {
        self.shared.abort.load(Ordering::Acquire)
    }
}

pub struct ThreadPool {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Start `num_threads` workers.
    pub fn new(num_threads: usize) -> RenderResult<Self> {
        if num_threads == 0 {
            return Err(RenderError::NoWorkers);
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                tasks: VecDeque::new(),
                active: 0,
                stop: false,
            }),
            task_available: Condvar::new(),
            all_done: Condvar::new(),
            abort: AtomicBool::new(false),
        });

        let mut pool = ThreadPool {
            shared,
            workers: Vec::with_capacity(num_threads),
        };

        for i in 0..num_threads {
            let shared = Arc::clone(&pool.shared);
            // On failure, dropping `pool` joins the workers started so far
            let handle = thread::Builder::new()
                .name(format!("lux-worker-{i}"))
                .spawn(move || worker_loop(&shared))
                .map_err(RenderError::ThreadSpawn)?;
            pool.workers.push(handle);
        }

        log::debug!("Thread pool started with {num_threads} workers");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a task and wake one idle worker.
    pub fn enqueue<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.state.lock().tasks.push_back(Box::new(task));
        self.shared.task_available.notify_one();
    }

    /// Tasks queued but not yet started.
    pub fn num_tasks(&self) -> usize {
        self.shared.state.lock().tasks.len()
    }

    /// Tasks currently running.
    pub fn active_tasks(&self) -> usize {
        self.shared.state.lock().active
    }

    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn should_abort(&self) -> bool {
        self.shared.abort.load(Ordering::Acquire)
    }

    /// Block until the queue is empty and no task is running.
    pub fn wait(&self) {
        let mut state = self.shared.state.lock();
        while !(state.tasks.is_empty() && state.active == 0) {
            self.shared.all_done.wait(&mut state);
        }
    }

    /// Discard queued tasks and wait for running ones to bail out.
    ///
    /// Running tasks are expected to poll [`AbortHandle::should_abort`] at
    /// convenient points. The abort flag is cleared before returning.
    pub fn clear_tasks(&self) {
        let discarded = {
            let mut state = self.shared.state.lock();
            // Set under the lock so no worker pops a task after seeing the flag
            self.shared.abort.store(true, Ordering::Release);
            std::mem::take(&mut state.tasks)
        };
        self.shared.task_available.notify_all();

        {
            let mut state = self.shared.state.lock();
            while state.active > 0 {
                self.shared.all_done.wait(&mut state);
            }
        }
        // A `wait` blocked on tasks that never started has nothing else to wake it
        self.shared.all_done.notify_all();

        self.shared.abort.store(false, Ordering::Release);

        if !discarded.is_empty() {
            log::debug!("Discarded {} queued tasks", discarded.len());
        }
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shared.state.lock().stop = true;
        self.shared.task_available.notify_all();

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                log::error!("Worker thread could not be joined");
                std::process::abort();
            }
        }
        log::debug!("Thread pool stopped");
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let task = {
            let mut state = shared.state.lock();
            while !state.stop && state.tasks.is_empty() {
                shared.task_available.wait(&mut state);
            }
            match state.tasks.pop_front() {
                Some(task) => {
                    state.active += 1;
                    task
                }
                // Stopping with nothing left to run
                None => return,
            }
        };

        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(task)) {
            let msg = payload
                .downcast_ref::<&str>()
                .copied()
                .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                .unwrap_or("unknown panic");
            log::error!("Render task panicked: {msg}");
        }

        let mut state = shared.state.lock();
        state.active -= 1;
        if state.active == 0 && state.tasks.is_empty() {
            shared.all_done.notify_all();
        }
    }
}
