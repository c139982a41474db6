//! Job-title reference data for the resume-matching answer policy.

use crate::domain::JobTitle;
use crate::ports::{PortError, PortResult};

/// An ordered, read-only list of job titles and the skills that identify them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCatalog {
    titles: Vec<JobTitle>,
}

impl JobCatalog {
    pub fn new(titles: Vec<JobTitle>) -> Self {
        Self { titles }
    }

    /// Parses a JSON array of `{"title": .., "skills": [..]}` objects.
    pub fn from_json(json: &str) -> PortResult<Self> {
        let titles: Vec<JobTitle> = serde_json::from_str(json)
            .map_err(|e| PortError::InvalidInput(format!("Invalid job title data: {}", e)))?;

        if titles.iter().any(|t| t.title.trim().is_empty()) {
            return Err(PortError::InvalidInput(
                "Job title data contains an empty title".to_string(),
            ));
        }
        Ok(Self { titles })
    }

    pub fn titles(&self) -> &[JobTitle] {
        &self.titles
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    /// Renders the catalog as one `- Title: skill, skill` line per entry.
    pub fn to_prompt_list(&self) -> String {
        self.titles
            .iter()
            .map(|t| format!("- {}: {}", t.title, t.skills.join(", ")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
