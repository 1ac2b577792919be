//! Request-level operations combining extraction output with analysis

use crate::analysis::{
    AnalysisClient, Answer, ClauseExplanation, Parties, Summary,
};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::Serialize;

/// A document ready for role selection and clause-by-clause reading
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct ProcessedDocument {
    pub document_text: String,
    pub clauses: Vec<String>,
    pub parties: Parties,
}

fn require(value: &str, field: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput {
            field: field.to_string(),
            reason: message.to_string(),
        });
    }
    Ok(())
}

/// Blank roles and languages mean "not given"
fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Check that `document_text` is a legal document, then split it into
/// clauses and identify its parties concurrently.
pub async fn process_document(
    client: &AnalysisClient,
    document_text: String,
    language: Option<String>,
) -> Result<ProcessedDocument> {
    if document_text.trim().is_empty() {
        return Err(Error::EmptyDocument);
    }

    let validity = client.validate_document(&document_text).await?;
    if !validity.is_legal_doc {
        return Err(Error::NotLegalDocument);
    }

    let (clauses, parties) = tokio::try_join!(
        client.identify_clauses(&document_text),
        client.identify_parties(&document_text, optional(language)),
    )?;

    tracing::info!(
        clauses = clauses.clauses.len(),
        "Processed legal document"
    );

    Ok(ProcessedDocument {
        document_text,
        clauses: clauses.clauses,
        parties,
    })
}

/// Summarize a document from the reader's point of view
pub async fn summarize_document(
    client: &AnalysisClient,
    document_text: &str,
    user_role: Option<String>,
    language: Option<String>,
) -> Result<Summary> {
    if document_text.trim().is_empty() {
        return Err(Error::EmptyDocument);
    }

    Ok(client
        .summarize(document_text, optional(user_role), optional(language))
        .await?)
}

/// Explain a single clause in plain language
pub async fn explain_clause(
    client: &AnalysisClient,
    clause: &str,
    user_role: Option<String>,
    language: Option<String>,
) -> Result<ClauseExplanation> {
    require(clause, "clause", "Clause cannot be empty.")?;

    Ok(client
        .explain_clause(clause, optional(user_role), optional(language))
        .await?)
}

/// Answer a free-text question about a document
pub async fn ask_question(
    client: &AnalysisClient,
    document_content: &str,
    question: &str,
    user_role: Option<String>,
) -> Result<Answer> {
    require(
        document_content,
        "document_content",
        "Document content cannot be empty.",
    )?;
    require(question, "question", "Question cannot be empty.")?;

    Ok(client
        .answer_question(document_content, question, optional(user_role))
        .await?)
}
