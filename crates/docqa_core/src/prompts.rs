//! crates/docqa_core/src/prompts.rs
//!
//! Prompt templates and the policies that select between them.

use crate::catalog::JobCatalog;

const OPEN_ENDED_TEMPLATE: &str = r#"You are a helpful assistant answering questions about a document the user uploaded.

Use the CONTEXT below when it is relevant to the QUESTION. If the context does not
contain the answer, answer from your general knowledge instead.
Keep the answer brief: a few sentences at most.

CONTEXT:
---
{context}
---

QUESTION:
{question}

ANSWER:"#;

const JOB_TITLE_TEMPLATE: &str = r#"You are a career assistant that matches resumes to job titles.

Pick the ONE job title from the list below whose skills best match the RESUME CONTEXT.

JOB TITLES:
{job_titles}

Rules:
- Output exactly one job title, copied exactly as it appears in the list.
- Do not output anything else: no explanation, no punctuation, no quotes.

Examples:
RESUME CONTEXT: Built dashboards in Tableau, wrote SQL queries and Python scripts for reporting.
QUESTION: What job role is suitable for me?
ANSWER: {example_one}

RESUME CONTEXT: {example_two_skills}
QUESTION: Which job fits my profile?
ANSWER: {example_two}

RESUME CONTEXT:
---
{context}
---

QUESTION:
{question}

ANSWER:"#;

/// How the answer engine phrases the prompt and treats the model's output.
#[derive(Debug, Clone)]
pub enum PromptPolicy {
    /// Answer from the document when relevant, else from general knowledge.
    OpenEnded,
    /// Output exactly one title from `catalog`.
    JobTitle {
        catalog: JobCatalog,
        /// Run `clean_output` over the model's raw text.
        clean_output: bool,
    },
}

impl PromptPolicy {
    pub fn render(&self, context: &str, question: &str) -> String {
        match self {
            PromptPolicy::OpenEnded => OPEN_ENDED_TEMPLATE
                .replace("{question}", question)
                .replace("{context}", context),
            PromptPolicy::JobTitle { catalog, .. } => {
                let titles = catalog.titles();
                let example_one = titles
                    .iter()
                    .find(|t| t.title.eq_ignore_ascii_case("Data Analyst"))
                    .or_else(|| titles.first())
                    .map(|t| t.title.as_str())
                    .unwrap_or("Data Analyst");
                let (example_two, example_two_skills) = titles
                    .iter()
                    .find(|t| t.title != example_one)
                    .map(|t| (t.title.as_str(), format!("Experienced with {}.", t.skills.join(", "))))
                    .unwrap_or((example_one, "Python, SQL and Tableau reporting.".to_string()));

                // Fill the few-shot slots before inserting user text so that braces in the
                // resume cannot be mistaken for placeholders.
                JOB_TITLE_TEMPLATE
                    .replace("{job_titles}", &catalog.to_prompt_list())
                    .replace("{example_one}", example_one)
                    .replace("{example_two_skills}", &example_two_skills)
                    .replace("{example_two}", example_two)
                    .replace("{question}", question)
                    .replace("{context}", context)
            }
        }
    }

    /// The catalog to clean against, if this policy post-processes output.
    pub fn cleaning_catalog(&self) -> Option<&JobCatalog> {
        match self {
            PromptPolicy::JobTitle {
                catalog,
                clean_output: true,
            } => Some(catalog),
            _ => None,
        }
    }
}
