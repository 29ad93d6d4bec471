use log::debug;
use ordered_float::OrderedFloat;
use rand::seq::SliceRandom;
use rand::RngCore;

/// A member of the splitting front during the niching selection.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PendingCandidate {
    /// The row index of the candidate in the combined fitness matrix.
    pub index: usize,
    /// The index of the reference direction the candidate is associated with.
    pub ref_idx: usize,
    /// The squared perpendicular distance to that reference direction.
    pub ref_dist: f64,
}

/// The niche-preservation selection of NSGA3 ("Algorithm 4" in the paper). Members of the
/// splitting front are moved one by one into the selected set, always serving the reference
/// direction with the smallest niche count first so that underrepresented directions catch up.
///
/// # Arguments
///
/// * `pending`: The members of the splitting front with their reference associations. Selected
///   members are swapped to the front of this vector.
/// * `niche_counts`: The niche count of every reference direction over the already accepted
///   fronts. Counts are incremented as members are selected.
/// * `missing`: The number of members to select.
/// * `rng`: The random number generator.
///
/// returns: `Vec<PendingCandidate>`. The selected members in swap order.
pub(crate) fn niche_select(
    pending: &mut Vec<PendingCandidate>,
    niche_counts: &mut [usize],
    missing: usize,
    rng: &mut dyn RngCore,
) -> Vec<PendingCandidate> {
    debug_assert!(missing <= pending.len());

    // the reference directions associated with at least one member of the splitting front
    let mut niche_references: Vec<usize> = pending.iter().map(|c| c.ref_idx).collect();
    niche_references.sort_unstable();
    niche_references.dedup();
    niche_references.sort_by_key(|r| niche_counts[*r]);

    // members before this position have been selected
    let mut selected_end = 0;

    while selected_end < missing {
        // the reference directions with the smallest niche count
        let min_count = niche_references
            .iter()
            .map(|r| niche_counts[*r])
            .min()
            .expect("the splitting front always covers the missing slots");
        let min_references: Vec<usize> = niche_references
            .iter()
            .filter(|r| niche_counts[**r] == min_count)
            .copied()
            .collect();
        let reference = *min_references.choose(rng).unwrap();

        let members: Vec<usize> = (selected_end..pending.len())
            .filter(|i| pending[*i].ref_idx == reference)
            .collect();

        if members.is_empty() {
            // no member of the splitting front serves this direction at this generation
            debug!("excluding reference direction {reference}, no pending member serves it");
            niche_references.retain(|r| *r != reference);
            continue;
        }

        let position = if min_count == 0 {
            // the direction has no candidate yet, prefer the member closest to it
            *members
                .iter()
                .min_by_key(|i| OrderedFloat(pending[**i].ref_dist))
                .unwrap()
        } else {
            *members.choose(rng).unwrap()
        };

        pending.swap(selected_end, position);
        niche_counts[reference] += 1;
        selected_end += 1;
    }

    pending[..selected_end].to_vec()
}
