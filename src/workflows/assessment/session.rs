use chrono::{DateTime, Utc};
use serde::Serialize;

use super::catalog::{AssessmentCatalog, Category};
use super::domain::{CategoryId, FacilityInfo, Rating, RatingSet, Scores, ValidationError};
use super::quadrant::Quadrant;
use super::scoring::compute_scores;

/// Where a session currently sits in the three-phase flow. The payload of
/// `Assessing` is the index into the catalog's ordered category list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum AssessmentPhase {
    Intro,
    Assessing { category_index: usize },
    Results,
}

/// Scores and quadrant computed at the assessing -> results transition.
/// Always derived from the session's own rating set, never read back from
/// the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome {
    pub scores: Scores,
    pub quadrant: Quadrant,
    pub completed_at: DateTime<Utc>,
}

/// Result of a forward step while assessing.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Moved(usize),
    Completed(AssessmentOutcome),
}

/// One interactive assessment session: the facility details captured on the
/// intro screen, the ratings recorded so far, and the phase the respondent
/// is in. All transitions are synchronous and side-effect free; persistence
/// is the caller's concern.
#[derive(Debug)]
pub struct AssessmentSession {
    catalog: AssessmentCatalog,
    facility: Option<FacilityInfo>,
    ratings: RatingSet,
    phase: AssessmentPhase,
    outcome: Option<AssessmentOutcome>,
    started_at: Option<DateTime<Utc>>,
}

impl AssessmentSession {
    pub fn new() -> Self {
        Self::with_catalog(AssessmentCatalog::standard())
    }

    pub fn with_catalog(catalog: AssessmentCatalog) -> Self {
        Self {
            catalog,
            facility: None,
            ratings: RatingSet::new(),
            phase: AssessmentPhase::Intro,
            outcome: None,
            started_at: None,
        }
    }

    pub fn phase(&self) -> AssessmentPhase {
        self.phase
    }

    pub fn facility(&self) -> Option<&FacilityInfo> {
        self.facility.as_ref()
    }

    pub fn ratings(&self) -> &RatingSet {
        &self.ratings
    }

    pub fn catalog(&self) -> &AssessmentCatalog {
        &self.catalog
    }

    pub fn outcome(&self) -> Option<&AssessmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Category under review, when assessing.
    pub fn current_category(&self) -> Option<&Category> {
        match self.phase {
            AssessmentPhase::Assessing { category_index } => self.catalog.by_index(category_index),
            _ => None,
        }
    }

    /// Whether the forward button is enabled: the current category must
    /// carry a rating. `Unknown` (0) counts as rated.
    pub fn can_advance(&self) -> bool {
        self.current_category()
            .map(|category| self.ratings.contains_key(&category.id))
            .unwrap_or(false)
    }

    /// Intro -> assessing. Validates the facility fields and moves to the
    /// first category. The caller persists the placeholder record.
    pub fn begin(&mut self, facility: FacilityInfo) -> Result<(), SessionError> {
        if !matches!(self.phase, AssessmentPhase::Intro) {
            return Err(SessionError::AlreadyStarted);
        }
        facility.validate()?;

        self.facility = Some(facility);
        self.started_at = Some(Utc::now());
        self.phase = AssessmentPhase::Assessing { category_index: 0 };
        Ok(())
    }

    /// Record (or overwrite) the rating for a category. Legal at any point
    /// while assessing, regardless of which category is on screen.
    pub fn rate(&mut self, category: CategoryId, rating: Rating) -> Result<(), SessionError> {
        self.require_assessing()?;
        if self.catalog.by_id(category).is_none() {
            return Err(SessionError::UnknownCategory(category));
        }
        self.ratings.insert(category, rating);
        Ok(())
    }

    /// Forward step. From the final category this is the assessing ->
    /// results transition: scores and quadrant are computed from the full
    /// rating set. Gated on the current category being rated either way.
    pub fn advance(&mut self) -> Result<StepOutcome, SessionError> {
        let category_index = self.require_assessing()?;
        let current = self
            .catalog
            .by_index(category_index)
            .ok_or(SessionError::NotStarted)?;
        if !self.ratings.contains_key(&current.id) {
            return Err(SessionError::CategoryUnrated(current.id));
        }

        if category_index + 1 >= self.catalog.len() {
            let outcome = self.complete();
            return Ok(StepOutcome::Completed(outcome));
        }

        let next = category_index + 1;
        self.phase = AssessmentPhase::Assessing {
            category_index: next,
        };
        Ok(StepOutcome::Moved(next))
    }

    /// Backward step, clamped at the first category.
    pub fn retreat(&mut self) -> Result<usize, SessionError> {
        let category_index = self.require_assessing()?;
        let previous = category_index.saturating_sub(1);
        self.phase = AssessmentPhase::Assessing {
            category_index: previous,
        };
        Ok(previous)
    }

    /// Quick-nav jump to any category, clamped into range. Permitted at any
    /// time while assessing, with no rating prerequisite.
    pub fn jump_to(&mut self, index: usize) -> Result<usize, SessionError> {
        self.require_assessing()?;
        let clamped = index.min(self.catalog.len().saturating_sub(1));
        self.phase = AssessmentPhase::Assessing {
            category_index: clamped,
        };
        Ok(clamped)
    }

    /// Results -> intro. Clears ratings, facility details, and the computed
    /// outcome. Never touches persistence.
    pub fn restart(&mut self) {
        self.facility = None;
        self.ratings.clear();
        self.outcome = None;
        self.started_at = None;
        self.phase = AssessmentPhase::Intro;
    }

    fn complete(&mut self) -> AssessmentOutcome {
        let scores = compute_scores(&self.catalog, &self.ratings);
        let outcome = AssessmentOutcome {
            scores,
            quadrant: Quadrant::classify(scores.readiness, scores.scalability),
            completed_at: Utc::now(),
        };
        self.outcome = Some(outcome.clone());
        self.phase = AssessmentPhase::Results;
        outcome
    }

    fn require_assessing(&self) -> Result<usize, SessionError> {
        match self.phase {
            AssessmentPhase::Assessing { category_index } => Ok(category_index),
            AssessmentPhase::Intro => Err(SessionError::NotStarted),
            AssessmentPhase::Results => Err(SessionError::AlreadyCompleted),
        }
    }
}

impl Default for AssessmentSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Illegal transitions and rejected intro submissions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("assessment already started")]
    AlreadyStarted,
    #[error("assessment has not been started")]
    NotStarted,
    #[error("assessment already completed")]
    AlreadyCompleted,
    #[error("category '{}' has no recorded rating", .0.label())]
    CategoryUnrated(CategoryId),
    #[error("category '{}' is not part of this assessment", .0.label())]
    UnknownCategory(CategoryId),
}
