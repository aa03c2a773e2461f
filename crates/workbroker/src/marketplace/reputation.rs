use super::domain::{ActorId, Engagement, EngagementStatus};

/// Recomputes a provider's reputation as the arithmetic mean of the rating
/// across all of that provider's completed engagements that carry one. This
/// is a full recompute on every qualifying rating event, never an
/// incremental running average. Returns `None` when nothing qualifies.
pub fn recompute(provider: &ActorId, engagements: &[Engagement]) -> Option<f64> {
    let ratings: Vec<u8> = engagements
        .iter()
        .filter(|engagement| {
            engagement.provider == *provider
                && engagement.status == EngagementStatus::Completed
        })
        .filter_map(|engagement| engagement.rating)
        .collect();

    if ratings.is_empty() {
        return None;
    }

    let sum: u32 = ratings.iter().map(|rating| u32::from(*rating)).sum();
    Some(f64::from(sum) / ratings.len() as f64)
}
