use std::{fmt, str::FromStr};

/// Closed set of upstream tools the submission endpoint understands. Every
/// identifier on the wire must resolve to one of these; anything else is
/// rejected up front instead of silently swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    SonarQube,
    Trivy,
    GitLeaks,
    Jest,
    JiraSprintPoints,
    JiraSecurityEpics,
    JiraSecurityIncidents,
    JiraDefectDensity,
    LanguageImpact,
    Depcheck,
    OutdatedPackages,
    Zap,
    DeploymentFrequency,
    DeploymentTime,
    Mttr,
}

impl Tool {
    pub const ALL: [Tool; 15] = [
        Tool::SonarQube,
        Tool::Trivy,
        Tool::GitLeaks,
        Tool::Jest,
        Tool::JiraSprintPoints,
        Tool::JiraSecurityEpics,
        Tool::JiraSecurityIncidents,
        Tool::JiraDefectDensity,
        Tool::LanguageImpact,
        Tool::Depcheck,
        Tool::OutdatedPackages,
        Tool::Zap,
        Tool::DeploymentFrequency,
        Tool::DeploymentTime,
        Tool::Mttr,
    ];

    /// Wire identifier, as the generated pipeline posts it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::SonarQube => "SonarQube",
            Tool::Trivy => "Trivy",
            Tool::GitLeaks => "GitLeaks",
            Tool::Jest => "Jest",
            Tool::JiraSprintPoints => "Jira-SprintPoints",
            Tool::JiraSecurityEpics => "Jira-Security-Epics",
            Tool::JiraSecurityIncidents => "Jira-Security-Incidents",
            Tool::JiraDefectDensity => "Jira-Defect-Density",
            Tool::LanguageImpact => "Language-Impact",
            Tool::Depcheck => "Depcheck",
            Tool::OutdatedPackages => "Outdated-Packages",
            Tool::Zap => "ZAP",
            Tool::DeploymentFrequency => "Deployment-Frequency",
            Tool::DeploymentTime => "Deployment-Time",
            Tool::Mttr => "MTTR",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown tool identifier: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for Tool {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_identifiers_round_trip() {
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>().unwrap(), tool);
        }
    }

    #[test]
    fn unknown_identifier_is_rejected() {
        assert!("Sonar".parse::<Tool>().is_err());
        assert!("".parse::<Tool>().is_err());
        assert!("zap".parse::<Tool>().is_err());
    }
}
