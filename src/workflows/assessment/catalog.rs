use super::domain::{CategoryId, ScoreGroup};

/// Static definition of one evaluation dimension: its weight in the
/// aggregate, the group it rolls up into, and the criteria text shown to
/// respondents while they rate it.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub weight: u32,
    pub group: ScoreGroup,
    pub critical_criteria: &'static [&'static str],
    pub high_priority_criteria: &'static [&'static str],
}

/// The fixed nine-category catalog driving an assessment. Reference weights
/// sum to 100, but nothing downstream is allowed to rely on that.
#[derive(Debug, Clone)]
pub struct AssessmentCatalog {
    categories: Vec<Category>,
}

impl AssessmentCatalog {
    pub fn standard() -> Self {
        Self {
            categories: standard_categories(),
        }
    }

    /// Catalog with arbitrary categories, used to exercise the scoring
    /// engine under non-reference weight tables.
    #[cfg(test)]
    pub(crate) fn with_categories(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn by_index(&self, index: usize) -> Option<&Category> {
        self.categories.get(index)
    }

    pub fn by_id(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn for_group(&self, group: ScoreGroup) -> Vec<&Category> {
        self.categories
            .iter()
            .filter(|category| category.group == group)
            .collect()
    }

    pub fn total_weight(&self) -> u32 {
        self.categories.iter().map(|category| category.weight).sum()
    }
}

fn standard_categories() -> Vec<Category> {
    vec![
        Category {
            id: CategoryId::PowerInfrastructure,
            name: "Power Infrastructure",
            weight: 18,
            group: ScoreGroup::Readiness,
            critical_criteria: &[
                "Committed utility feed of 10MW or more with documented delivery timeline",
                "N+1 redundancy on switchgear and distribution paths",
            ],
            high_priority_criteria: &[
                "On-site substation or dedicated utility interconnect",
                "Power usage effectiveness tracking at the circuit level",
            ],
        },
        Category {
            id: CategoryId::CoolingCapability,
            name: "Cooling Capability",
            weight: 15,
            group: ScoreGroup::Readiness,
            critical_criteria: &[
                "Liquid-cooling ready distribution (direct-to-chip or rear-door heat exchange)",
                "Heat rejection capacity matched to committed power envelope",
            ],
            high_priority_criteria: &[
                "Water availability and discharge permits in place",
                "Containment strategy for 80kW+ rack densities",
            ],
        },
        Category {
            id: CategoryId::NetworkConnectivity,
            name: "Network Connectivity",
            weight: 12,
            group: ScoreGroup::Readiness,
            critical_criteria: &[
                "Diverse fiber entrances from at least two carriers",
                "Sub-5ms latency path to a major peering exchange",
            ],
            high_priority_criteria: &[
                "Dark fiber availability for east-west cluster expansion",
                "400G-capable meet-me room infrastructure",
            ],
        },
        Category {
            id: CategoryId::ExpansionCapacity,
            name: "Expansion Capacity",
            weight: 12,
            group: ScoreGroup::Scalability,
            critical_criteria: &[
                "Contiguous land or shell space for at least 2x current footprint",
                "Zoning and entitlements covering the expansion envelope",
            ],
            high_priority_criteria: &[
                "Master plan with phased power and cooling buildout",
                "Construction partners pre-qualified for hyperscale delivery",
            ],
        },
        Category {
            id: CategoryId::UtilityPartnership,
            name: "Utility Partnership",
            weight: 10,
            group: ScoreGroup::Scalability,
            critical_criteria: &[
                "Executed letter of intent or tariff agreement for incremental load",
                "Utility queue position documented for future capacity requests",
            ],
            high_priority_criteria: &[
                "Access to renewable or carbon-matched generation",
                "Demand-response or curtailment programs negotiated",
            ],
        },
        Category {
            id: CategoryId::SiteInfrastructure,
            name: "Site Infrastructure",
            weight: 8,
            group: ScoreGroup::Scalability,
            critical_criteria: &[
                "Structural capacity for high-density rack loading",
                "Site access for oversized equipment delivery",
            ],
            high_priority_criteria: &[
                "On-site laydown space for phased construction",
                "Physical security perimeter meeting enterprise audit standards",
            ],
        },
        Category {
            id: CategoryId::OperationsTeam,
            name: "Operations Team",
            weight: 10,
            group: ScoreGroup::Operational,
            critical_criteria: &[
                "24x7 on-site critical facilities staffing",
                "Documented MOPs/SOPs for all maintenance activity",
            ],
            high_priority_criteria: &[
                "Staff certified on liquid-cooling plant operations",
                "Incident escalation tested within the last twelve months",
            ],
        },
        Category {
            id: CategoryId::ComplianceCertifications,
            name: "Compliance & Certifications",
            weight: 8,
            group: ScoreGroup::Operational,
            critical_criteria: &[
                "SOC 2 Type II attestation current within the last year",
                "Uptime Institute Tier III (or equivalent) design certification",
            ],
            high_priority_criteria: &[
                "ISO 27001 certification or active roadmap",
                "Customer audit program with documented remediation history",
            ],
        },
        Category {
            id: CategoryId::FinancialReadiness,
            name: "Financial Readiness",
            weight: 7,
            group: ScoreGroup::Operational,
            critical_criteria: &[
                "Capital committed for the next expansion phase",
                "Anchor tenant or offtake commitments supporting the buildout",
            ],
            high_priority_criteria: &[
                "Audited financials available for partner diligence",
                "Insurance coverage sized to replacement cost",
            ],
        },
    ]
}
