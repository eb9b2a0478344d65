//! Bounded samples for scatter plots.

use rand::Rng;

use crate::config::{ROI_SCATTER_RANGE, SCATTER_SAMPLE_CAP};
use crate::models::CleanedMovie;

/// Uniform sample of at most `cap` rows, using the thread RNG.
pub fn sample_for_scatter<'a>(subset: &[&'a CleanedMovie], cap: usize) -> Vec<&'a CleanedMovie> {
    sample_with_rng(subset, cap, &mut rand::thread_rng())
}

/// Uniform sample without replacement of at most `cap` rows.
///
/// When the subset fits, it is returned whole. Sampled rows keep their
/// relative order from the subset.
pub fn sample_with_rng<'a, R>(
    subset: &[&'a CleanedMovie],
    cap: usize,
    rng: &mut R,
) -> Vec<&'a CleanedMovie>
where
    R: Rng + ?Sized,
{
    if subset.len() <= cap {
        return subset.to_vec();
    }

    let mut picked = rand::seq::index::sample(rng, subset.len(), cap).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| subset[i]).collect()
}

/// Rows with ROI inside [`ROI_SCATTER_RANGE`], sampled down to the
/// default cap. Extreme ROIs would flatten the budget/ROI chart.
pub fn roi_scatter_points<'a, R>(subset: &[&'a CleanedMovie], rng: &mut R) -> Vec<&'a CleanedMovie>
where
    R: Rng + ?Sized,
{
    let (low, high) = ROI_SCATTER_RANGE;
    let in_range: Vec<&CleanedMovie> = subset
        .iter()
        .copied()
        .filter(|m| low <= m.roi && m.roi <= high)
        .collect();
    sample_with_rng(&in_range, SCATTER_SAMPLE_CAP, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roi;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn rows(n: usize) -> Vec<CleanedMovie> {
        (0..n)
            .map(|i| CleanedMovie {
                title: format!("Movie {}", i),
                revenue: 5000.0 + i as f64,
                budget: 2000.0,
                roi: roi(5000.0 + i as f64, 2000.0),
                main_genre: "Drama".into(),
                release_year: 2000,
                runtime: 90.0,
                vote_average: 6.0,
            })
            .collect()
    }

    #[test]
    fn test_small_subset_returned_whole() {
        let data = rows(5);
        let refs: Vec<&CleanedMovie> = data.iter().collect();
        let sample = sample_for_scatter(&refs, 5);
        assert_eq!(sample, refs);
    }

    #[test]
    fn test_large_subset_capped_without_duplicates() {
        let data = rows(50);
        let refs: Vec<&CleanedMovie> = data.iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let sample = sample_with_rng(&refs, 10, &mut rng);

        assert_eq!(sample.len(), 10);
        let titles: HashSet<&str> = sample.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles.len(), 10);
    }

    #[test]
    fn test_seeded_sample_is_reproducible() {
        let data = rows(30);
        let refs: Vec<&CleanedMovie> = data.iter().collect();
        let a = sample_with_rng(&refs, 4, &mut StdRng::seed_from_u64(42));
        let b = sample_with_rng(&refs, 4, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_row_can_be_drawn() {
        let data = rows(6);
        let refs: Vec<&CleanedMovie> = data.iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for m in sample_with_rng(&refs, 2, &mut rng) {
                seen.insert(m.title.clone());
            }
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn test_roi_scatter_trims_outliers() {
        let mut data = rows(3);
        data[0].roi = 25.0;
        data[1].roi = -1.0;
        let refs: Vec<&CleanedMovie> = data.iter().collect();
        let points = roi_scatter_points(&refs, &mut StdRng::seed_from_u64(3));

        assert_eq!(points.len(), 2);
        assert!(points.iter().all(|m| m.roi <= 20.0));
    }
}
