use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Serialize;

use super::domain::ApplicationId;
use crate::workflows::users::UserId;

/// A secretary and the number of applications already assigned to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SecretaryLoad {
    pub secretary_id: UserId,
    pub assigned: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub application_id: ApplicationId,
    pub secretary_id: UserId,
}

/// Greedily hand each application to the least-loaded secretary.
///
/// Applications are taken in the given order. Every assignment bumps the
/// receiving secretary's running load, so a secretary that starts behind
/// catches up before the others receive more. Equal loads go to the
/// secretary listed first in `loads`.
pub fn plan_assignments(loads: &[SecretaryLoad], applications: &[ApplicationId]) -> Vec<Assignment> {
    if loads.is_empty() {
        return Vec::new();
    }

    let mut heap: BinaryHeap<Reverse<(usize, usize)>> = loads
        .iter()
        .enumerate()
        .map(|(position, load)| Reverse((load.assigned, position)))
        .collect();

    let mut plan = Vec::with_capacity(applications.len());
    for &application_id in applications {
        let Some(Reverse((assigned, position))) = heap.pop() else {
            break;
        };
        plan.push(Assignment {
            application_id,
            secretary_id: loads[position].secretary_id,
        });
        heap.push(Reverse((assigned + 1, position)));
    }
    plan
}
