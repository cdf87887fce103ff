use tracing::debug;
use uuid::Uuid;

use crate::models::AlumniRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub updated: usize,
    pub appended: usize,
}

/// Folds `incoming` into `existing`.
///
/// A record is the same person when either `digital_id` or `email` matches; the
/// first such record in the working collection is updated in place, otherwise
/// the incoming record is appended. Earlier incoming records are visible to
/// later ones, so two rows for one person collapse into a single entry.
/// An appended record whose `id` is already taken gets a fresh one.
pub fn merge(
    existing: Vec<AlumniRecord>,
    incoming: Vec<AlumniRecord>,
) -> (Vec<AlumniRecord>, MergeStats) {
    let mut working = existing;
    let mut stats = MergeStats::default();

    for mut record in incoming {
        let position = working
            .iter()
            .position(|a| a.digital_id == record.digital_id || a.email == record.email);

        match position {
            Some(index) => {
                debug!(digital_id = %record.digital_id, index, "updating existing alumnus");
                working[index].absorb(record);
                stats.updated += 1;
            }
            None => {
                if working.iter().any(|a| a.id == record.id) {
                    debug!(id = %record.id, digital_id = %record.digital_id, "id already taken, reassigning");
                    record.id = Uuid::new_v4().to_string();
                }
                debug!(digital_id = %record.digital_id, "appending new alumnus");
                working.push(record);
                stats.appended += 1;
            }
        }
    }

    (working, stats)
}
