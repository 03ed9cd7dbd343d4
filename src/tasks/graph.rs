//! Task dependency graph utilities.

use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};

use super::Task;
use crate::error::TaskError;

/// Order tasks so every task runs after the tasks it depends on.
///
/// Uses Kahn's algorithm, always picking the ready task that appears first
/// in `tasks`, so independent tasks keep their listed order. Several tasks
/// may share a [`TypeId`] (one per enabled tool); a dependency on that type
/// waits for all of them. Dependencies on types absent from `tasks` are
/// ignored.
///
/// Returns indices into `tasks`.
///
/// # Errors
///
/// Returns [`TaskError::DependencyCycle`] naming the tasks that could not be
/// ordered.
pub fn execution_order(tasks: &[&dyn Task]) -> Result<Vec<usize>, TaskError> {
    let mut by_type: HashMap<TypeId, Vec<usize>> = HashMap::new();
    for (i, t) in tasks.iter().enumerate() {
        by_type.entry(t.task_id()).or_default().push(i);
    }

    let mut in_degree = vec![0usize; tasks.len()];
    let mut reverse_deps: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    for (i, t) in tasks.iter().enumerate() {
        for dep in t.dependencies() {
            for &dep_idx in by_type.get(dep).into_iter().flatten() {
                if let Some(rd) = reverse_deps.get_mut(dep_idx) {
                    rd.push(i);
                }
                if let Some(count) = in_degree.get_mut(i) {
                    *count += 1;
                }
            }
        }
    }

    let mut ready: BTreeSet<usize> = in_degree
        .iter()
        .enumerate()
        .filter_map(|(i, &d)| if d == 0 { Some(i) } else { None })
        .collect();
    let mut order = Vec::with_capacity(tasks.len());

    while let Some(idx) = ready.pop_first() {
        order.push(idx);
        if let Some(dependents) = reverse_deps.get(idx) {
            for &dep in dependents {
                if let Some(count) = in_degree.get_mut(dep) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(dep);
                    }
                }
            }
        }
    }

    if order.len() == tasks.len() {
        Ok(order)
    } else {
        let stuck = tasks
            .iter()
            .enumerate()
            .filter(|(i, _)| !order.contains(i))
            .map(|(_, t)| t.name())
            .collect::<Vec<_>>()
            .join(", ");
        Err(TaskError::DependencyCycle(stuck))
    }
}
