use serde::{Deserialize, Serialize};

/// Four-way classification of an assessment outcome on the readiness x
/// scalability plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quadrant {
    PrimeCandidate,
    HighPotential,
    OptimizeFirst,
    Develop,
}

/// Both axes split at this score, inclusive on the high side.
pub const QUADRANT_THRESHOLD: f64 = 60.0;

impl Quadrant {
    /// Decision table from the readiness/scalability pair. Total over all
    /// real inputs and deterministic; the threshold comparison is `>=` so a
    /// score of exactly 60 lands on the high side.
    pub fn classify(readiness: f64, scalability: f64) -> Self {
        match (
            readiness >= QUADRANT_THRESHOLD,
            scalability >= QUADRANT_THRESHOLD,
        ) {
            (true, true) => Self::PrimeCandidate,
            (false, true) => Self::HighPotential,
            (true, false) => Self::OptimizeFirst,
            (false, false) => Self::Develop,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PrimeCandidate => "Prime Candidate",
            Self::HighPotential => "High Potential",
            Self::OptimizeFirst => "Optimize First",
            Self::Develop => "Develop",
        }
    }

    /// Palette token shared with the web tier and the PDF renderer.
    pub const fn color_token(self) -> &'static str {
        match self {
            Self::PrimeCandidate => "#16a34a",
            Self::HighPotential => "#2563eb",
            Self::OptimizeFirst => "#d97706",
            Self::Develop => "#dc2626",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::PrimeCandidate => {
                "Strong readiness and strong scalability. The facility can support \
                 AI infrastructure deployment today and grow with demand."
            }
            Self::HighPotential => {
                "Scalability fundamentals are in place but near-term readiness gaps \
                 remain. Targeted upgrades unlock deployment quickly."
            }
            Self::OptimizeFirst => {
                "The facility is deployable today but constrained for growth. \
                 Expansion planning should precede large commitments."
            }
            Self::Develop => {
                "Material gaps on both axes. A phased development program is needed \
                 before AI infrastructure workloads can be hosted."
            }
        }
    }

    pub const fn recommended_action(self) -> &'static str {
        match self {
            Self::PrimeCandidate => {
                "Engage our partnership team to scope a deployment timeline."
            }
            Self::HighPotential => {
                "Prioritize the highest-weight readiness gaps and re-assess within a quarter."
            }
            Self::OptimizeFirst => {
                "Develop an expansion roadmap covering power, land, and utility capacity."
            }
            Self::Develop => {
                "Start with a site development consultation to sequence foundational upgrades."
            }
        }
    }
}
