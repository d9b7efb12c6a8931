//! Fan-out/fan-in over scoped threads with ordered fail-fast.

use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// What happened to one task of a group.
#[derive(Debug, PartialEq)]
pub enum TaskOutcome<R, E> {
    Done(R),
    Failed(E),
    /// Not started because an earlier task had already failed.
    Skipped,
    /// The task panicked; carries the panic message.
    Panicked(String),
}

/// Runs `task` once per item, each on its own scoped thread.
///
/// Outcomes are returned in item order. Once a task fails or panics, tasks
/// after it that have not started yet are skipped. Tasks before it always
/// run, so the first failure in item order is reported regardless of
/// scheduling.
pub fn run_all<T, R, E, F>(items: &[T], task: F) -> Vec<TaskOutcome<R, E>>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let first_failure = AtomicUsize::new(usize::MAX);
    let first_failure = &first_failure;
    let task = &task;

    thread::scope(|s| {
        let handles: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                s.spawn(move || {
                    if first_failure.load(Ordering::Acquire) < idx {
                        return TaskOutcome::Skipped;
                    }
                    match task(item) {
                        Ok(r) => TaskOutcome::Done(r),
                        Err(e) => {
                            first_failure.fetch_min(idx, Ordering::AcqRel);
                            TaskOutcome::Failed(e)
                        }
                    }
                })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(idx, h)| {
                h.join().unwrap_or_else(|payload| {
                    first_failure.fetch_min(idx, Ordering::AcqRel);
                    TaskOutcome::Panicked(panic_message(payload.as_ref()))
                })
            })
            .collect()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcomes_follow_item_order() {
        let items = [3_u32, 1, 2];
        let out = run_all(&items, |&x| Ok::<_, String>(x * 10));
        assert_eq!(
            out,
            vec![
                TaskOutcome::Done(30),
                TaskOutcome::Done(10),
                TaskOutcome::Done(20)
            ]
        );
    }

    #[test]
    fn failure_is_reported_in_place() {
        let items = [1_u32, 2, 3];
        let out = run_all(&items, |&x| if x == 2 { Err("boom") } else { Ok(x) });
        assert_eq!(out.len(), 3);
        assert_eq!(out[0], TaskOutcome::Done(1));
        assert_eq!(out[1], TaskOutcome::Failed("boom"));
        assert!(matches!(out[2], TaskOutcome::Done(3) | TaskOutcome::Skipped));
    }

    #[test]
    fn earliest_failure_always_runs() {
        let items: Vec<u32> = (0..16).collect();
        for _ in 0..20 {
            let out = run_all(&items, |&x| if x >= 3 { Err(x) } else { Ok(x) });
            assert_eq!(out[3], TaskOutcome::Failed(3));
            assert!(out[..3].iter().all(|o| matches!(o, TaskOutcome::Done(_))));
        }
    }

    #[test]
    fn panic_becomes_outcome() {
        let items = [0_u32];
        let out = run_all(&items, |_| -> Result<u32, String> { panic!("fit exploded") });
        assert_eq!(out, vec![TaskOutcome::Panicked("fit exploded".to_string())]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let items: [u32; 0] = [];
        let out = run_all(&items, |&x| Ok::<_, ()>(x));
        assert!(out.is_empty());
    }
}
