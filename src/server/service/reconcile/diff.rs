use std::collections::BTreeSet;

use crate::server::model::service::{MemberSnapshot, RoleDiff, RoleId, RoleTargets};

/// Computes the minimal change bringing a member in line with its targets.
///
/// Roles Bifrost does not track are kept untouched: `target = (actual - tracked) ∪ desired`.
/// The nickname is only part of the diff when a desired nickname differs from the actual one.
pub fn compute_diff(targets: &RoleTargets, actual: &MemberSnapshot) -> RoleDiff {
    let target: BTreeSet<RoleId> = actual
        .roles
        .difference(&targets.tracked)
        .chain(targets.desired.iter())
        .copied()
        .collect();

    let add = &target - &actual.roles;
    let remove = &actual.roles - &target;

    let nickname = match &targets.nickname {
        Some(desired) if actual.nickname.as_deref() != Some(desired.as_str()) => {
            Some(desired.clone())
        }
        _ => None,
    };

    RoleDiff {
        target,
        add,
        remove,
        nickname,
    }
}
