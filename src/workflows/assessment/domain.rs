use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Stable identifier for one of the nine evaluation dimensions.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    PowerInfrastructure,
    CoolingCapability,
    NetworkConnectivity,
    ExpansionCapacity,
    UtilityPartnership,
    SiteInfrastructure,
    OperationsTeam,
    ComplianceCertifications,
    FinancialReadiness,
}

impl CategoryId {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::PowerInfrastructure,
            Self::CoolingCapability,
            Self::NetworkConnectivity,
            Self::ExpansionCapacity,
            Self::UtilityPartnership,
            Self::SiteInfrastructure,
            Self::OperationsTeam,
            Self::ComplianceCertifications,
            Self::FinancialReadiness,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PowerInfrastructure => "Power Infrastructure",
            Self::CoolingCapability => "Cooling Capability",
            Self::NetworkConnectivity => "Network Connectivity",
            Self::ExpansionCapacity => "Expansion Capacity",
            Self::UtilityPartnership => "Utility Partnership",
            Self::SiteInfrastructure => "Site Infrastructure",
            Self::OperationsTeam => "Operations Team",
            Self::ComplianceCertifications => "Compliance & Certifications",
            Self::FinancialReadiness => "Financial Readiness",
        }
    }
}

/// Disjoint groupings the score aggregation runs over. Assignment is static
/// configuration on the catalog, not derived from ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreGroup {
    Readiness,
    Scalability,
    Operational,
}

impl ScoreGroup {
    pub const fn ordered() -> [Self; 3] {
        [Self::Readiness, Self::Scalability, Self::Operational]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Readiness => "Readiness",
            Self::Scalability => "Scalability",
            Self::Operational => "Operational",
        }
    }
}

/// Discrete 0-4 rating a respondent assigns to a category. A category with
/// no rating is absent from the map entirely, which is not the same thing
/// as `Unknown` (0): absent categories drop out of the weighted denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Unknown,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Rating {
    pub const MAX_VALUE: u8 = 4;

    pub const fn value(self) -> u8 {
        match self {
            Self::Unknown => 0,
            Self::Poor => 1,
            Self::Fair => 2,
            Self::Good => 3,
            Self::Excellent => 4,
        }
    }

    pub const fn from_value(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Unknown),
            1 => Some(Self::Poor),
            2 => Some(Self::Fair),
            3 => Some(Self::Good),
            4 => Some(Self::Excellent),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        }
    }
}

/// Ratings recorded so far, keyed by category.
pub type RatingSet = BTreeMap<CategoryId, Rating>;

/// Contact and siting details collected on the intro screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityInfo {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub contact_name: String,
    pub email: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub target_mw: Option<String>,
}

impl FacilityInfo {
    /// Gate for the intro -> assessing transition. Name, contact, and a
    /// syntactically plausible email are required; everything else is
    /// optional marketing context.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingFacilityName);
        }
        if self.contact_name.trim().is_empty() {
            return Err(ValidationError::MissingContactName);
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(ValidationError::MissingEmail);
        }
        if !is_valid_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        Ok(())
    }

    /// Canonical conflict key for upserts.
    pub fn email_key(&self) -> String {
        self.email.trim().to_ascii_lowercase()
    }
}

/// Minimal deliverability check: one `@`, a non-empty local part, and a
/// dotted domain with no embedded whitespace.
pub fn is_valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && tld.len() >= 2,
        None => false,
    }
}

/// Facility fields rejected before any state transition runs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("facility name is required")]
    MissingFacilityName,
    #[error("contact name is required")]
    MissingContactName,
    #[error("email address is required")]
    MissingEmail,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
}

/// Derived group and overall scores. Always recomputed from the rating set
/// that produced them; never persisted on their own.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub readiness: f64,
    pub scalability: f64,
    pub operational: f64,
    pub overall: f64,
}

impl Scores {
    pub const fn zero() -> Self {
        Self {
            readiness: 0.0,
            scalability: 0.0,
            operational: 0.0,
            overall: 0.0,
        }
    }

    /// Nearest-integer rounding for report and API display.
    pub fn rounded(&self) -> RoundedScores {
        RoundedScores {
            readiness: self.readiness.round() as u8,
            scalability: self.scalability.round() as u8,
            operational: self.operational.round() as u8,
            overall: self.overall.round() as u8,
        }
    }
}

/// Display form of [`Scores`]; each field fits 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundedScores {
    pub readiness: u8,
    pub scalability: u8,
    pub operational: u8,
    pub overall: u8,
}
