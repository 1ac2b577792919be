//! Prompt templates for the analysis tasks
//!
//! Templates use `{role}`, `{language}`, `{document}`, `{clause}` and
//! `{question}` placeholders. Substitution is a single pass over the
//! template, so placeholder-like text inside a document is never expanded.

use super::{AnalysisOptions, AnalysisTask};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(role|language|document|clause|question)\}").expect("placeholder pattern is valid")
});

const DEFAULT_ROLE: &str = "one of the parties";
const DEFAULT_LANGUAGE: &str = "English";

/// Immutable set of prompt templates, built once at start-up
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub summarize: String,
    pub identify_clauses: String,
    pub identify_parties: String,
    pub validate_document: String,
    pub explain_clause: String,
    pub answer_question: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self {
            summarize: "You summarize legal documents for the reader, whose role is: **{role}**.\n\
                Write the whole response in **{language}**.\n\
                Give a concise summary from the reader's perspective covering the key terms, \
                obligations and rights that affect them. Bold important terms with markdown \
                asterisks.\n\n\
                Document:\n{document}"
                .to_string(),
            identify_clauses: "Split the following legal document into its distinct clauses. \
                A clause is a self-contained paragraph or section, usually introduced by a \
                number, a letter or a capitalized title. Follow the document's own structure.\n\n\
                Document:\n{document}"
                .to_string(),
            identify_parties: "Identify the two primary parties of the following legal \
                agreement by role (for example Landlord and Tenant, Company and Employee, \
                Lender and Borrower). Give the roles in **{language}**.\n\n\
                Document:\n{document}"
                .to_string(),
            validate_document: "Decide whether the following text is a legal document. Legal \
                documents usually name their parties, contain numbered clauses, use formal \
                defined terms and carry signature or witness sections. Resumes, articles, \
                stories and ordinary letters are not legal documents. Set isLegalDoc \
                accordingly.\n\n\
                Document:\n{document}"
                .to_string(),
            explain_clause: "Explain a legal clause in plain language for the reader, whose \
                role is: **{role}**. Write the whole response in **{language}**.\n\
                Provide: a simple explanation of what the clause means for the reader; a risk \
                score (Low, Medium or High) for their obligations; negotiation suggestions. For \
                Medium or High risk suggest better wording or questions to ask. For Low risk \
                give one short sentence saying no change is likely needed.\n\n\
                Clause: {clause}"
                .to_string(),
            answer_question: "Answer a question about a legal document from the perspective \
                of the reader, whose role is: **{role}**.\n\n\
                Document:\n{document}\n\n\
                Question: {question}\n\n\
                Answer:"
                .to_string(),
        }
    }
}

impl PromptSet {
    /// Template used for a task
    pub fn template(&self, task: AnalysisTask) -> &str {
        match task {
            AnalysisTask::Summarize => &self.summarize,
            AnalysisTask::IdentifyClauses => &self.identify_clauses,
            AnalysisTask::IdentifyParties => &self.identify_parties,
            AnalysisTask::ValidateDocument => &self.validate_document,
            AnalysisTask::ExplainClause => &self.explain_clause,
            AnalysisTask::AnswerQuestion => &self.answer_question,
        }
    }

    /// Render the prompt for `task`.
    ///
    /// `text` fills both `{document}` and `{clause}`; the clause task receives
    /// the clause as its text.
    pub fn render(&self, task: AnalysisTask, text: &str, options: &AnalysisOptions) -> String {
        let role = non_blank(options.user_role.as_deref()).unwrap_or(DEFAULT_ROLE);
        let language = non_blank(options.language.as_deref()).unwrap_or(DEFAULT_LANGUAGE);
        let question = options.question.as_deref().unwrap_or_default();

        PLACEHOLDER
            .replace_all(self.template(task), |caps: &Captures| match &caps[1] {
                "role" => role.to_string(),
                "language" => language.to_string(),
                "question" => question.to_string(),
                _ => text.to_string(),
            })
            .into_owned()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
