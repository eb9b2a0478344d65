//! Reductions over a filtered subset.
//!
//! All functions take the subset as a slice of borrowed rows and never
//! fail: empty input yields "no data" (`None`) rather than NaN.

use std::collections::BTreeMap;

use crate::models::{CleanedMovie, GenreRoi, Kpis, RatingBucket};

/// Number of rating buckets, `[0,1)` through `[9,10)`.
pub const RATING_BUCKETS: usize = 10;

/// Running sums behind [`Kpis`].
///
/// Accumulators built over consecutive partitions can be merged; merging
/// in partition order reproduces the sums of a single pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KpiAccumulator {
    count: usize,
    revenue_sum: f64,
    budget_sum: f64,
    roi_sum: f64,
}

impl KpiAccumulator {
    pub fn push(&mut self, movie: &CleanedMovie) {
        self.count += 1;
        self.revenue_sum += movie.revenue;
        self.budget_sum += movie.budget;
        self.roi_sum += movie.roi;
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            count: self.count + other.count,
            revenue_sum: self.revenue_sum + other.revenue_sum,
            budget_sum: self.budget_sum + other.budget_sum,
            roi_sum: self.roi_sum + other.roi_sum,
        }
    }

    pub fn finish(&self) -> Kpis {
        if self.count == 0 {
            return Kpis {
                count: 0,
                total_revenue: None,
                mean_budget: None,
                mean_roi: None,
            };
        }

        let n = self.count as f64;
        Kpis {
            count: self.count,
            total_revenue: Some(self.revenue_sum),
            mean_budget: Some(self.budget_sum / n),
            mean_roi: Some(self.roi_sum / n),
        }
    }
}

impl<'a> FromIterator<&'a CleanedMovie> for KpiAccumulator {
    fn from_iter<I: IntoIterator<Item = &'a CleanedMovie>>(iter: I) -> Self {
        let mut acc = Self::default();
        for movie in iter {
            acc.push(movie);
        }
        acc
    }
}

/// Count, total revenue, mean budget and mean ROI.
pub fn aggregate(subset: &[&CleanedMovie]) -> Kpis {
    subset.iter().copied().collect::<KpiAccumulator>().finish()
}

/// Mean ROI per main genre, highest first; equal means sort by genre name.
pub fn mean_roi_by_genre(subset: &[&CleanedMovie]) -> Vec<GenreRoi> {
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for movie in subset {
        let entry = groups.entry(movie.main_genre.as_str()).or_insert((0.0, 0));
        entry.0 += movie.roi;
        entry.1 += 1;
    }

    let mut series: Vec<GenreRoi> = groups
        .into_iter()
        .map(|(genre, (sum, count))| GenreRoi {
            genre: genre.to_string(),
            mean_roi: sum / count as f64,
            count,
        })
        .collect();

    series.sort_by(|a, b| {
        b.mean_roi
            .total_cmp(&a.mean_roi)
            .then_with(|| a.genre.cmp(&b.genre))
    });
    series
}

/// Bucket index for a rating: `floor(vote)`, with 10 and above clamped
/// into the last bucket. Negative and NaN ratings have no bucket.
pub fn rating_bucket(vote_average: f64) -> Option<usize> {
    if vote_average.is_nan() || vote_average < 0.0 {
        return None;
    }
    Some((vote_average.floor() as usize).min(RATING_BUCKETS - 1))
}

/// Mean revenue per rating bucket. Always ten buckets in ascending order;
/// empty buckets carry `None`.
pub fn mean_revenue_by_rating_bucket(subset: &[&CleanedMovie]) -> Vec<RatingBucket> {
    let mut sums = [(0.0_f64, 0_usize); RATING_BUCKETS];
    for movie in subset {
        if let Some(idx) = rating_bucket(movie.vote_average) {
            sums[idx].0 += movie.revenue;
            sums[idx].1 += 1;
        }
    }

    sums.iter()
        .enumerate()
        .map(|(idx, &(sum, count))| RatingBucket {
            lower: idx as u8,
            upper: idx as u8 + 1,
            count,
            mean_revenue: (count > 0).then(|| sum / count as f64),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::roi;

    fn movie(genre: &str, budget: f64, revenue: f64, vote: f64) -> CleanedMovie {
        CleanedMovie {
            title: format!("{} {}", genre, budget),
            revenue,
            budget,
            roi: roi(revenue, budget),
            main_genre: genre.into(),
            release_year: 2015,
            runtime: 100.0,
            vote_average: vote,
        }
    }

    #[test]
    fn test_aggregate_empty_is_no_data() {
        let kpis = aggregate(&[]);
        assert_eq!(kpis.count, 0);
        assert_eq!(kpis.total_revenue, None);
        assert_eq!(kpis.mean_budget, None);
        assert_eq!(kpis.mean_roi, None);
        assert!(!kpis.has_data());
    }

    #[test]
    fn test_aggregate_values() {
        let a = movie("Action", 100.0, 300.0, 7.0);
        let b = movie("Drama", 200.0, 150.0, 6.0);
        let kpis = aggregate(&[&a, &b]);

        assert_eq!(kpis.count, 2);
        assert_eq!(kpis.total_revenue, Some(450.0));
        assert_eq!(kpis.mean_budget, Some(150.0));
        assert_eq!(kpis.mean_roi, Some((2.0 - 0.25) / 2.0));
    }

    #[test]
    fn test_partition_merge_matches_single_pass() {
        let rows: Vec<CleanedMovie> = (1..=8)
            .map(|i| movie("Action", 1000.0 * i as f64, 2500.0 * i as f64, 5.0))
            .collect();
        let refs: Vec<&CleanedMovie> = rows.iter().collect();

        let whole: KpiAccumulator = refs.iter().copied().collect();
        let merged = refs
            .chunks(3)
            .map(|chunk| chunk.iter().copied().collect::<KpiAccumulator>())
            .fold(KpiAccumulator::default(), KpiAccumulator::merge);

        assert_eq!(whole, merged);
        assert_eq!(whole.finish(), aggregate(&refs));
    }

    #[test]
    fn test_mean_roi_by_genre_order_and_ties() {
        let rows = [
            movie("Drama", 100.0, 200.0, 5.0),   // roi 1
            movie("Action", 100.0, 200.0, 5.0),  // roi 1
            movie("Horror", 100.0, 1100.0, 5.0), // roi 10
            movie("Action", 100.0, 400.0, 5.0),  // roi 3
            movie("Comedy", 100.0, 50.0, 5.0),   // roi -0.5
        ];
        let refs: Vec<&CleanedMovie> = rows.iter().collect();
        let series = mean_roi_by_genre(&refs);

        let order: Vec<&str> = series.iter().map(|g| g.genre.as_str()).collect();
        assert_eq!(order, vec!["Horror", "Action", "Drama", "Comedy"]);
        assert_eq!(series[1].mean_roi, 2.0);
        assert_eq!(series[1].count, 2);
    }

    #[test]
    fn test_mean_roi_tie_breaks_by_name() {
        let rows = [movie("Western", 100.0, 200.0, 5.0), movie("Animation", 100.0, 200.0, 5.0)];
        let refs: Vec<&CleanedMovie> = rows.iter().collect();
        let series = mean_roi_by_genre(&refs);
        assert_eq!(series[0].genre, "Animation");
        assert_eq!(series[1].genre, "Western");
    }

    #[test]
    fn test_rating_bucket_boundaries() {
        assert_eq!(rating_bucket(0.0), Some(0));
        assert_eq!(rating_bucket(0.99), Some(0));
        assert_eq!(rating_bucket(1.0), Some(1));
        assert_eq!(rating_bucket(9.99), Some(9));
        assert_eq!(rating_bucket(10.0), Some(9));
        assert_eq!(rating_bucket(12.0), Some(9));
        assert_eq!(rating_bucket(-0.1), None);
        assert_eq!(rating_bucket(f64::NAN), None);
    }

    #[test]
    fn test_revenue_by_rating_bucket() {
        let rows = [
            movie("A", 2000.0, 3000.0, 7.2),
            movie("B", 2000.0, 5000.0, 7.9),
            movie("C", 2000.0, 9000.0, 10.0),
        ];
        let refs: Vec<&CleanedMovie> = rows.iter().collect();
        let buckets = mean_revenue_by_rating_bucket(&refs);

        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[7].mean_revenue, Some(4000.0));
        assert_eq!(buckets[7].count, 2);
        assert_eq!(buckets[9].mean_revenue, Some(9000.0));
        assert_eq!(buckets[0].mean_revenue, None);
        assert_eq!(buckets[0].label(), "0-1");
        assert_eq!(buckets[9].label(), "9-10");
    }

    #[test]
    fn test_revenue_by_rating_bucket_empty() {
        let buckets = mean_revenue_by_rating_bucket(&[]);
        assert_eq!(buckets.len(), 10);
        assert!(buckets.iter().all(|b| b.mean_revenue.is_none() && b.count == 0));
    }
}
