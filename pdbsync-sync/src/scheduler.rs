//! Dependency-ordered concurrent task execution.
//!
//! Every task runs on its own tokio task as soon as all of its predecessors
//! have finished, successfully or not. Each task owns a single-use completion
//! signal (a `watch` channel): it fires when the task returns, and dropping
//! the sender (a panicking task) releases the waiters too.

use crate::error::{SyncError, SyncResult, TaskFailure};
use futures::FutureExt;
use futures::future::BoxFuture;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

type TaskFn<T> = Box<dyn FnOnce() -> BoxFuture<'static, SyncResult<T>> + Send>;

/// One scheduling unit.
pub struct Task<T> {
    name: String,
    depends_on: Vec<String>,
    run: TaskFn<T>,
}

impl<T> Task<T> {
    /// Creates a task that starts once every task in `depends_on` finished.
    pub fn new<F, Fut>(name: impl Into<String>, depends_on: &[&str], run: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = SyncResult<T>> + Send + 'static,
    {
        Self {
            name: name.into(),
            depends_on: depends_on.iter().map(|d| (*d).to_string()).collect(),
            run: Box::new(move || run().boxed()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn depends_on(&self) -> &[String] {
        &self.depends_on
    }
}

/// Outcome of a run in which every task succeeded.
#[derive(Debug)]
pub struct RunReport<T> {
    /// Task results in declaration order.
    pub results: Vec<(String, T)>,
    /// Task names in the order their functions returned.
    pub completion_order: Vec<String>,
}

impl<T> RunReport<T> {
    pub fn get(&self, task: &str) -> Option<&T> {
        self.results
            .iter()
            .find(|(name, _)| name == task)
            .map(|(_, value)| value)
    }
}

/// A set of tasks forming a directed acyclic graph.
pub struct Scheduler<T> {
    tasks: Vec<Task<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self { tasks: Vec::new() }
    }
}

impl<T: Send + 'static> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, task: Task<T>) -> &mut Self {
        self.tasks.push(task);
        self
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Checks the declaration and returns one valid sequential order.
    ///
    /// Fails on duplicate task names, on dependencies naming no task, and on
    /// cycles, in which case every task that can never start is listed.
    pub fn execution_order(&self) -> SyncResult<Vec<String>> {
        let mut index: HashMap<&str, usize> = HashMap::with_capacity(self.tasks.len());
        for (i, task) in self.tasks.iter().enumerate() {
            if index.insert(task.name.as_str(), i).is_some() {
                return Err(SyncError::DuplicateTask(task.name.clone()));
            }
        }

        // Kahn's algorithm over declaration order.
        let mut in_degree = vec![0usize; self.tasks.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.tasks.len()];
        for (i, task) in self.tasks.iter().enumerate() {
            for dep in &task.depends_on {
                let Some(&d) = index.get(dep.as_str()) else {
                    return Err(SyncError::UnknownDependency {
                        task: task.name.clone(),
                        dependency: dep.clone(),
                    });
                };
                dependents[d].push(i);
                in_degree[i] += 1;
            }
        }

        let mut queue: VecDeque<usize> = (0..self.tasks.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.tasks.len());
        while let Some(i) = queue.pop_front() {
            order.push(self.tasks[i].name.clone());
            for &j in &dependents[i] {
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }

        if order.len() != self.tasks.len() {
            let blocked = self
                .tasks
                .iter()
                .zip(&in_degree)
                .filter(|(_, deg)| **deg > 0)
                .map(|(task, _)| task.name.clone())
                .collect();
            return Err(SyncError::DependencyCycle(blocked));
        }
        Ok(order)
    }

    /// Runs every task once and waits for all of them.
    ///
    /// Nothing starts if the declaration is invalid. A failed or panicked
    /// task does not stop the others; its dependents still run after it.
    pub async fn run(self) -> SyncResult<RunReport<T>> {
        let order = self.execution_order()?;
        debug!(?order, "starting {} task(s)", order.len());

        let mut senders = Vec::with_capacity(self.tasks.len());
        let mut signals: HashMap<String, watch::Receiver<bool>> = HashMap::new();
        for task in &self.tasks {
            let (tx, rx) = watch::channel(false);
            senders.push(tx);
            signals.insert(task.name.clone(), rx);
        }

        let (finished_tx, mut finished_rx) = mpsc::unbounded_channel();
        let mut handles = Vec::with_capacity(self.tasks.len());
        for (task, done) in self.tasks.into_iter().zip(senders) {
            let Task {
                name,
                depends_on,
                run,
            } = task;
            let predecessors: Vec<_> = depends_on
                .iter()
                .filter_map(|dep| signals.get(dep).cloned())
                .collect();
            let finished = finished_tx.clone();
            let task_name = name.clone();

            let handle = tokio::spawn(async move {
                for mut predecessor in predecessors {
                    // A closed channel means the predecessor panicked.
                    let _ = predecessor.wait_for(|fired| *fired).await;
                }
                debug!(task = %task_name, "task started");
                let result = run().await;
                let _ = finished.send(task_name);
                done.send_replace(true);
                result
            });
            handles.push((name, handle));
        }
        drop(finished_tx);

        let mut results = Vec::with_capacity(handles.len());
        let mut failures = Vec::new();
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(value)) => results.push((name, value)),
                Ok(Err(e)) => {
                    warn!(task = %name, error = %e, "task failed");
                    failures.push(TaskFailure {
                        task: name,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    let reason = if e.is_panic() {
                        format!("panicked: {}", panic_message(e.into_panic()))
                    } else {
                        "cancelled".to_string()
                    };
                    warn!(task = %name, "task {reason}");
                    failures.push(TaskFailure { task: name, reason });
                }
            }
        }

        let mut completion_order = Vec::with_capacity(results.len());
        while let Ok(name) = finished_rx.try_recv() {
            completion_order.push(name);
        }

        if failures.is_empty() {
            Ok(RunReport {
                results,
                completion_order,
            })
        } else {
            Err(SyncError::TasksFailed(failures))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str, deps: &[&str]) -> Task<()> {
        Task::new(name, deps, || async { Ok(()) })
    }

    #[test]
    fn order_follows_declaration_among_ready_tasks() {
        let mut scheduler = Scheduler::new();
        scheduler
            .add(noop("b", &["a"]))
            .add(noop("a", &[]))
            .add(noop("c", &[]));
        assert_eq!(scheduler.execution_order().unwrap(), vec!["a", "c", "b"]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut scheduler = Scheduler::new();
        scheduler.add(noop("a", &["a"]));
        assert!(matches!(
            scheduler.execution_order(),
            Err(SyncError::DependencyCycle(names)) if names == vec!["a"]
        ));
    }

    #[test]
    fn panic_payloads_are_readable() {
        assert_eq!(panic_message(Box::new("boom")), "boom");
        assert_eq!(panic_message(Box::new(String::from("bang"))), "bang");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic payload");
    }
}
