// Event lifecycle rules
//
// Status changes are not validated against a transition graph: any status
// may follow any other. The only rule is which milestone timestamp a status
// change records, and it is recorded in the same update as the status.

use chrono::{DateTime, Utc};

use crate::event::{EventPatch, EventStatus};

/// Build the update payload for a status change
///
/// `Live` stamps `show_started_at`, `Closed` stamps `show_ended_at`; every
/// other status passes through with no extra stamping.
pub fn stamp(status: EventStatus, now: DateTime<Utc>) -> EventPatch {
    let mut patch = EventPatch {
        status: Some(status),
        ..Default::default()
    };
    match status {
        EventStatus::Live => patch.show_started_at = Some(now),
        EventStatus::Closed => patch.show_ended_at = Some(now),
        EventStatus::NotStarted | EventStatus::Preshow => {}
    }
    patch
}
