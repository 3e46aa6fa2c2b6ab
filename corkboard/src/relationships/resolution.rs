//! Deterministic resolution of an edge history to a single authoritative row
//!
//! The store enforces no uniqueness constraint on the unordered pair, so a
//! direction may hold several rows. The engine treats that set as a history
//! and resolves it with a fixed preference: `accepted` over `pending` over
//! `declined`, most recent `created_at` winning within a rank.

use crate::storage::models::{FriendRequest, RequestStatus};

/// How many rows per direction participate in resolution. Queries pass this
/// as their limit; older rows are never consulted.
pub const DIRECTION_HISTORY_LIMIT: usize = 10;

fn status_rank(status: RequestStatus) -> u8 {
    match status {
        RequestStatus::Accepted => 0,
        RequestStatus::Pending => 1,
        RequestStatus::Declined => 2,
    }
}

/// Resolve one direction's rows to its single authoritative row, or `None`
/// for an empty history. Insertion order of the input is irrelevant.
pub fn resolve(rows: &[FriendRequest]) -> Option<&FriendRequest> {
    rows.iter().min_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then(b.created_at.cmp(&a.created_at))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn row(id: &str, status: RequestStatus, age_secs: i64) -> FriendRequest {
        FriendRequest {
            id: id.to_string(),
            requester_id: "alice".to_string(),
            recipient_id: "bob".to_string(),
            status,
            created_at: Utc::now() - Duration::seconds(age_secs),
            responded_at: None,
            seen_at: None,
        }
    }

    #[test]
    fn empty_history_resolves_to_none() {
        assert!(resolve(&[]).is_none());
    }

    #[test]
    fn accepted_wins_regardless_of_order() {
        let mut rows = vec![
            row("declined-old", RequestStatus::Declined, 300),
            row("pending-new", RequestStatus::Pending, 10),
            row("accepted", RequestStatus::Accepted, 200),
            row("pending-old", RequestStatus::Pending, 250),
            row("declined-new", RequestStatus::Declined, 5),
        ];

        for rotation in 0..rows.len() {
            rows.rotate_left(rotation);
            let resolved = resolve(&rows).unwrap();
            assert_eq!(resolved.id, "accepted");
        }
    }

    #[test]
    fn pending_beats_declined() {
        let rows = vec![
            row("declined", RequestStatus::Declined, 5),
            row("pending", RequestStatus::Pending, 500),
        ];
        assert_eq!(resolve(&rows).unwrap().id, "pending");
    }

    #[test]
    fn newest_wins_within_a_rank() {
        let rows = vec![
            row("pending-old", RequestStatus::Pending, 300),
            row("pending-new", RequestStatus::Pending, 10),
            row("pending-mid", RequestStatus::Pending, 100),
        ];
        assert_eq!(resolve(&rows).unwrap().id, "pending-new");
    }
}
