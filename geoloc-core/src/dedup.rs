use crate::Location;

/// Returns the candidates with overlapping entries removed.
///
/// Order is preserved and the first occurrence of a duplicate wins. Each
/// candidate is checked against everything kept so far, which is fine for the
/// handful of results a geocoding query returns.
pub fn remove_overlapping<I>(candidates: I) -> Vec<Location>
where
    I: IntoIterator<Item = Location>,
{
    let mut unique: Vec<Location> = Vec::new();

    for candidate in candidates {
        if let Some(kept) = unique.iter().find(|kept| candidate.overlaps(kept)) {
            tracing::debug!(
                dropped = %candidate.display_name(true),
                kept = %kept.display_name(true),
                distance_km = candidate.distance_to(kept),
                "discarding overlapping location"
            );
            continue;
        }

        unique.push(candidate);
    }

    unique
}
