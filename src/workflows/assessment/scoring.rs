use super::catalog::{AssessmentCatalog, Category};
use super::domain::{Rating, RatingSet, ScoreGroup, Scores};

/// Weighted aggregation of the recorded ratings into the three group scores
/// plus the overall score. Pure: identical inputs always produce identical
/// output.
///
/// Denominators only include categories that actually carry a rating, so a
/// partially completed assessment reports scores over the rated subset
/// rather than averaging zeros into the result. That is intentional: an
/// unrated category is "no data", not "worst possible".
pub fn compute_scores(catalog: &AssessmentCatalog, ratings: &RatingSet) -> Scores {
    Scores {
        readiness: group_score(catalog, ScoreGroup::Readiness, ratings),
        scalability: group_score(catalog, ScoreGroup::Scalability, ratings),
        operational: group_score(catalog, ScoreGroup::Operational, ratings),
        overall: weighted_score(catalog.categories().iter(), ratings),
    }
}

fn group_score(catalog: &AssessmentCatalog, group: ScoreGroup, ratings: &RatingSet) -> f64 {
    weighted_score(catalog.for_group(group).into_iter(), ratings)
}

fn weighted_score<'a>(
    categories: impl Iterator<Item = &'a Category>,
    ratings: &RatingSet,
) -> f64 {
    let mut earned = 0.0_f64;
    let mut weight = 0.0_f64;

    for category in categories {
        if let Some(rating) = ratings.get(&category.id) {
            let fraction = f64::from(rating.value()) / f64::from(Rating::MAX_VALUE);
            earned += fraction * f64::from(category.weight);
            weight += f64::from(category.weight);
        }
    }

    // No rated categories in scope means no signal, not NaN.
    if weight == 0.0 {
        return 0.0;
    }

    let score = 100.0 * earned / weight;
    debug_assert!(
        (0.0..=100.0).contains(&score),
        "weighted score {score} escaped [0, 100]"
    );
    score.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::super::catalog::Category;
    use super::super::domain::{CategoryId, Rating, RatingSet, ScoreGroup};
    use super::*;

    fn rate_all(rating: Rating) -> RatingSet {
        CategoryId::ordered()
            .into_iter()
            .map(|id| (id, rating))
            .collect()
    }

    #[test]
    fn all_excellent_scores_one_hundred_everywhere() {
        let catalog = AssessmentCatalog::standard();
        let scores = compute_scores(&catalog, &rate_all(Rating::Excellent));

        assert_eq!(scores.readiness, 100.0);
        assert_eq!(scores.scalability, 100.0);
        assert_eq!(scores.operational, 100.0);
        assert_eq!(scores.overall, 100.0);
    }

    #[test]
    fn all_unknown_scores_zero_everywhere() {
        let catalog = AssessmentCatalog::standard();
        let scores = compute_scores(&catalog, &rate_all(Rating::Unknown));

        assert_eq!(scores.readiness, 0.0);
        assert_eq!(scores.scalability, 0.0);
        assert_eq!(scores.operational, 0.0);
        assert_eq!(scores.overall, 0.0);
    }

    #[test]
    fn empty_rating_set_yields_zero_without_dividing_by_zero() {
        let catalog = AssessmentCatalog::standard();
        let scores = compute_scores(&catalog, &RatingSet::new());

        assert_eq!(scores.readiness, 0.0);
        assert_eq!(scores.scalability, 0.0);
        assert_eq!(scores.operational, 0.0);
        assert_eq!(scores.overall, 0.0);
        assert!(scores.overall.is_finite());
    }

    #[test]
    fn all_fair_lands_exactly_at_fifty() {
        let catalog = AssessmentCatalog::standard();
        let scores = compute_scores(&catalog, &rate_all(Rating::Fair));

        assert_eq!(scores.readiness, 50.0);
        assert_eq!(scores.scalability, 50.0);
        assert_eq!(scores.operational, 50.0);
        assert_eq!(scores.overall, 50.0);
    }

    #[test]
    fn unrated_categories_drop_out_of_the_denominator() {
        let catalog = AssessmentCatalog::standard();
        let mut ratings = RatingSet::new();
        // Only one readiness category rated: the readiness score reflects
        // that category alone, not an average over the whole group.
        ratings.insert(CategoryId::PowerInfrastructure, Rating::Excellent);

        let scores = compute_scores(&catalog, &ratings);
        assert_eq!(scores.readiness, 100.0);
        assert_eq!(scores.scalability, 0.0);
        assert_eq!(scores.operational, 0.0);
        assert_eq!(scores.overall, 100.0);
    }

    #[test]
    fn mixed_ratings_weight_by_category() {
        let catalog = AssessmentCatalog::standard();
        let mut ratings = RatingSet::new();
        ratings.insert(CategoryId::PowerInfrastructure, Rating::Excellent); // w=18
        ratings.insert(CategoryId::CoolingCapability, Rating::Fair); // w=15

        let scores = compute_scores(&catalog, &ratings);
        // (1.0*18 + 0.5*15) / 33 * 100
        let expected = 100.0 * (18.0 + 7.5) / 33.0;
        assert!((scores.readiness - expected).abs() < 1e-9);
        assert!((scores.overall - expected).abs() < 1e-9);
    }

    #[test]
    fn engine_does_not_assume_weights_sum_to_one_hundred() {
        let catalog = AssessmentCatalog::with_categories(vec![
            Category {
                id: CategoryId::PowerInfrastructure,
                name: "Power Infrastructure",
                weight: 7,
                group: ScoreGroup::Readiness,
                critical_criteria: &[],
                high_priority_criteria: &[],
            },
            Category {
                id: CategoryId::ExpansionCapacity,
                name: "Expansion Capacity",
                weight: 13,
                group: ScoreGroup::Scalability,
                critical_criteria: &[],
                high_priority_criteria: &[],
            },
        ]);

        let mut ratings = RatingSet::new();
        ratings.insert(CategoryId::PowerInfrastructure, Rating::Good);
        ratings.insert(CategoryId::ExpansionCapacity, Rating::Poor);

        let scores = compute_scores(&catalog, &ratings);
        assert_eq!(scores.readiness, 75.0);
        assert_eq!(scores.scalability, 25.0);
        let expected_overall = 100.0 * (0.75 * 7.0 + 0.25 * 13.0) / 20.0;
        assert!((scores.overall - expected_overall).abs() < 1e-9);
    }

    #[test]
    fn scores_stay_inside_unit_interval_for_every_rating_mix() {
        let catalog = AssessmentCatalog::standard();
        // Deterministic sweep over a spread of rating assignments.
        for seed in 0..=Rating::MAX_VALUE {
            let ratings: RatingSet = CategoryId::ordered()
                .into_iter()
                .enumerate()
                .map(|(index, id)| {
                    let value = ((index as u8) + seed) % (Rating::MAX_VALUE + 1);
                    (id, Rating::from_value(value).expect("value in range"))
                })
                .collect();

            let scores = compute_scores(&catalog, &ratings);
            for score in [
                scores.readiness,
                scores.scalability,
                scores.operational,
                scores.overall,
            ] {
                assert!((0.0..=100.0).contains(&score), "score {score} out of range");
            }
        }
    }

    #[test]
    fn computation_is_idempotent() {
        let catalog = AssessmentCatalog::standard();
        let mut ratings = RatingSet::new();
        ratings.insert(CategoryId::PowerInfrastructure, Rating::Good);
        ratings.insert(CategoryId::OperationsTeam, Rating::Poor);
        ratings.insert(CategoryId::UtilityPartnership, Rating::Excellent);

        let first = compute_scores(&catalog, &ratings);
        let second = compute_scores(&catalog, &ratings);
        assert_eq!(first, second);
        assert_eq!(first.overall.to_bits(), second.overall.to_bits());
    }
}
