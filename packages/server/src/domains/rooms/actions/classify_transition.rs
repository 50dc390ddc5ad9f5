//! Classify a room write by its before/after status pair

use crate::domains::rooms::events::TransitionKind;
use crate::domains::rooms::models::{RoomSnapshot, RoomStatus};

/// Decide whether a single write is a notifiable transition.
///
/// Edge-triggered: `JoinRequested` only when the room was not `pendingJoin`
/// before the write and is `pendingJoin` after it. A missing `before` (room
/// creation) counts as "not pendingJoin". Rewrites that leave the room in
/// `pendingJoin` are `NoOp`. Deliverability (host token) is not considered.
pub fn classify_transition(before: Option<&RoomSnapshot>, after: &RoomSnapshot) -> TransitionKind {
    let was_pending = before.is_some_and(|room| room.status == RoomStatus::PendingJoin);
    let is_pending = after.status == RoomStatus::PendingJoin;

    if !was_pending && is_pending {
        TransitionKind::JoinRequested
    } else {
        TransitionKind::NoOp
    }
}
