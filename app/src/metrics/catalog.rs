/// The six fixed reporting categories. Buckets are typed, never freeform
/// strings, so a typo cannot mint a seventh category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Plan,
    Code,
    Build,
    Test,
    DeployRelease,
    OperateMonitor,
}

/// Closed catalog of metric identifiers a repository can select. The wire
/// identifier is what the pipeline-generation UI stores in
/// `selected_metrics`; the label is what reports display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricId {
    RequirementsCompleteness,
    SprintVelocity,
    SecurityRequirementsCoverage,
    CyclomaticComplexity,
    CognitiveComplexity,
    CodeSmells,
    DuplicatedLinesDensity,
    ProgrammingLanguageImpact,
    CveVulnerabilities,
    SecretDetection,
    LicenseScan,
    UnusedLibraries,
    OutdatedPackages,
    TotalCoverage,
    TestSuccessDensity,
    SlaTimeBehavior,
    SlaResourceUtilization,
    SlaCapacity,
    PenetrationTesting,
    DeploymentTime,
    DeploymentFrequency,
    SecurityIncidents,
    Availability,
    Mttr,
    UserSatisfaction,
    DefectDensity,
}

impl MetricId {
    pub const ALL: [MetricId; 26] = [
        MetricId::RequirementsCompleteness,
        MetricId::SprintVelocity,
        MetricId::SecurityRequirementsCoverage,
        MetricId::CyclomaticComplexity,
        MetricId::CognitiveComplexity,
        MetricId::CodeSmells,
        MetricId::DuplicatedLinesDensity,
        MetricId::ProgrammingLanguageImpact,
        MetricId::CveVulnerabilities,
        MetricId::SecretDetection,
        MetricId::LicenseScan,
        MetricId::UnusedLibraries,
        MetricId::OutdatedPackages,
        MetricId::TotalCoverage,
        MetricId::TestSuccessDensity,
        MetricId::SlaTimeBehavior,
        MetricId::SlaResourceUtilization,
        MetricId::SlaCapacity,
        MetricId::PenetrationTesting,
        MetricId::DeploymentTime,
        MetricId::DeploymentFrequency,
        MetricId::SecurityIncidents,
        MetricId::Availability,
        MetricId::Mttr,
        MetricId::UserSatisfaction,
        MetricId::DefectDensity,
    ];

    /// Identifier stored in a repository's selection.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::RequirementsCompleteness => "Requirements Completeness",
            MetricId::SprintVelocity => "Estimated vs Completed Story Points",
            MetricId::SecurityRequirementsCoverage => "Security Requirements Coverage",
            MetricId::CyclomaticComplexity => "Cyclomatic Complexity",
            MetricId::CognitiveComplexity => "Cognitive Complexity",
            MetricId::CodeSmells => "Code Smells",
            MetricId::DuplicatedLinesDensity => "Duplicated Lines Density",
            MetricId::ProgrammingLanguageImpact => "Programming Language Impact",
            MetricId::CveVulnerabilities => "CVEs and CVSS",
            MetricId::SecretDetection => "Secret Detection",
            MetricId::LicenseScan => "License Scan",
            MetricId::UnusedLibraries => "Unused Libraries",
            MetricId::OutdatedPackages => "Outdated Packages",
            MetricId::TotalCoverage => "Total Coverage",
            MetricId::TestSuccessDensity => "Test Success Density",
            MetricId::SlaTimeBehavior => "SLA Time Behavior",
            MetricId::SlaResourceUtilization => "SLA Resource Utilization",
            MetricId::SlaCapacity => "SLA Capacity",
            MetricId::PenetrationTesting => "Penetration Testing",
            MetricId::DeploymentTime => "Deployment Time",
            MetricId::DeploymentFrequency => "Deployment Frequency",
            MetricId::SecurityIncidents => "Security Incidents",
            MetricId::Availability => "Availability",
            MetricId::Mttr => "MTTR",
            MetricId::UserSatisfaction => "User Satisfaction",
            MetricId::DefectDensity => "Defect Density",
        }
    }

    /// Display label for report entries. Usually the identifier itself; the
    /// exceptions keep the historical report wording.
    pub fn label(&self) -> &'static str {
        match self {
            MetricId::SprintVelocity => "Latest sprint velocity",
            MetricId::CveVulnerabilities => "CVE identifiers and CVSS scores",
            other => other.as_str(),
        }
    }

    pub fn category(&self) -> Category {
        match self {
            MetricId::RequirementsCompleteness
            | MetricId::SprintVelocity
            | MetricId::SecurityRequirementsCoverage => Category::Plan,
            MetricId::CyclomaticComplexity
            | MetricId::CognitiveComplexity
            | MetricId::CodeSmells
            | MetricId::DuplicatedLinesDensity
            | MetricId::ProgrammingLanguageImpact => Category::Code,
            MetricId::CveVulnerabilities
            | MetricId::SecretDetection
            | MetricId::LicenseScan
            | MetricId::UnusedLibraries
            | MetricId::OutdatedPackages => Category::Build,
            MetricId::TotalCoverage
            | MetricId::TestSuccessDensity
            | MetricId::SlaTimeBehavior
            | MetricId::SlaResourceUtilization
            | MetricId::SlaCapacity
            | MetricId::PenetrationTesting => Category::Test,
            MetricId::DeploymentTime | MetricId::DeploymentFrequency => Category::DeployRelease,
            MetricId::SecurityIncidents
            | MetricId::Availability
            | MetricId::Mttr
            | MetricId::UserSatisfaction
            | MetricId::DefectDensity => Category::OperateMonitor,
        }
    }

    pub fn parse(identifier: &str) -> Option<MetricId> {
        MetricId::ALL
            .iter()
            .copied()
            .find(|metric| metric.as_str() == identifier)
    }
}
