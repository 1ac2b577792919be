//! Language-understanding boundary
//!
//! The analysis service is opaque: it receives a rendered prompt plus the
//! text and options it was built from, and answers with a JSON object. This
//! module owns the typed shapes of those answers so callers never touch raw
//! JSON.

mod http;
mod prompts;

pub use http::HttpAnalyzer;
pub use prompts::PromptSet;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by an analysis service
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Request could not be sent or completed
    #[error("analysis request failed: {reason}")]
    Request { reason: String },

    /// Service answered with a non-success status
    #[error("analysis service returned status {status}")]
    Status { status: u16 },

    /// Service answered with a body that does not match the task's shape
    #[error("invalid analysis response for {task}: {reason}")]
    InvalidResponse { task: &'static str, reason: String },
}

/// Kind of analysis requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTask {
    Summarize,
    IdentifyClauses,
    IdentifyParties,
    ValidateDocument,
    ExplainClause,
    AnswerQuestion,
}

impl AnalysisTask {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisTask::Summarize => "summarize",
            AnalysisTask::IdentifyClauses => "identify_clauses",
            AnalysisTask::IdentifyParties => "identify_parties",
            AnalysisTask::ValidateDocument => "validate_document",
            AnalysisTask::ExplainClause => "explain_clause",
            AnalysisTask::AnswerQuestion => "answer_question",
        }
    }
}

/// Optional hints that shape an analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// The reader's role in the document (e.g. "Tenant")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_role: Option<String>,
    /// Output language, English when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Question about the document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

/// One call to the analysis service
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRequest {
    pub task: AnalysisTask,
    /// Document text, or the clause for clause explanations
    pub text: String,
    pub options: AnalysisOptions,
    /// Fully rendered prompt
    pub prompt: String,
}

/// An external language-understanding capability
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(
        &self,
        request: &AnalysisRequest,
    ) -> Result<serde_json::Value, ServiceError>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClauseList {
    pub clauses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Parties {
    pub party_one: String,
    pub party_two: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Validity {
    pub is_legal_doc: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RiskScore {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClauseExplanation {
    pub explanation: String,
    pub risk_score: RiskScore,
    pub negotiation_suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Answer {
    pub answer: String,
}

/// Typed access to an [`Analyzer`] using a fixed [`PromptSet`]
#[derive(Clone)]
pub struct AnalysisClient {
    analyzer: Arc<dyn Analyzer>,
    prompts: Arc<PromptSet>,
}

impl AnalysisClient {
    pub fn new(analyzer: Arc<dyn Analyzer>, prompts: Arc<PromptSet>) -> Self {
        Self { analyzer, prompts }
    }

    async fn run<T: DeserializeOwned>(
        &self,
        task: AnalysisTask,
        text: &str,
        options: AnalysisOptions,
    ) -> Result<T, ServiceError> {
        let request = AnalysisRequest {
            task,
            text: text.to_string(),
            prompt: self.prompts.render(task, text, &options),
            options,
        };

        tracing::debug!(task = task.name(), text_len = text.len(), "Calling analysis service");
        let value = self.analyzer.analyze(&request).await?;

        serde_json::from_value(value).map_err(|e| ServiceError::InvalidResponse {
            task: task.name(),
            reason: e.to_string(),
        })
    }

    pub async fn summarize(
        &self,
        document: &str,
        user_role: Option<String>,
        language: Option<String>,
    ) -> Result<Summary, ServiceError> {
        let options = AnalysisOptions {
            user_role,
            language,
            ..AnalysisOptions::default()
        };
        self.run(AnalysisTask::Summarize, document, options).await
    }

    pub async fn identify_clauses(&self, document: &str) -> Result<ClauseList, ServiceError> {
        self.run(AnalysisTask::IdentifyClauses, document, AnalysisOptions::default())
            .await
    }

    pub async fn identify_parties(
        &self,
        document: &str,
        language: Option<String>,
    ) -> Result<Parties, ServiceError> {
        let options = AnalysisOptions {
            language,
            ..AnalysisOptions::default()
        };
        self.run(AnalysisTask::IdentifyParties, document, options).await
    }

    pub async fn validate_document(&self, document: &str) -> Result<Validity, ServiceError> {
        self.run(AnalysisTask::ValidateDocument, document, AnalysisOptions::default())
            .await
    }

    pub async fn explain_clause(
        &self,
        clause: &str,
        user_role: Option<String>,
        language: Option<String>,
    ) -> Result<ClauseExplanation, ServiceError> {
        let options = AnalysisOptions {
            user_role,
            language,
            ..AnalysisOptions::default()
        };
        self.run(AnalysisTask::ExplainClause, clause, options).await
    }

    pub async fn answer_question(
        &self,
        document: &str,
        question: &str,
        user_role: Option<String>,
    ) -> Result<Answer, ServiceError> {
        let options = AnalysisOptions {
            user_role,
            question: Some(question.to_string()),
            ..AnalysisOptions::default()
        };
        self.run(AnalysisTask::AnswerQuestion, document, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct Recording {
        response: serde_json::Value,
        seen: Mutex<Vec<AnalysisRequest>>,
    }

    #[async_trait]
    impl Analyzer for Recording {
        async fn analyze(
            &self,
            request: &AnalysisRequest,
        ) -> Result<serde_json::Value, ServiceError> {
            self.seen.lock().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn client(response: serde_json::Value) -> (AnalysisClient, Arc<Recording>) {
        let recording = Arc::new(Recording {
            response,
            seen: Mutex::new(Vec::new()),
        });
        let client = AnalysisClient::new(recording.clone(), Arc::new(PromptSet::default()));
        (client, recording)
    }

    #[tokio::test]
    async fn test_explain_clause_decodes_response() {
        let (client, recording) = client(json!({
            "explanation": "You pay rent monthly.",
            "riskScore": "Medium",
            "negotiationSuggestions": ["Ask for a grace period."]
        }));

        let result = client
            .explain_clause("Rent is due on the 1st.", Some("Tenant".into()), None)
            .await
            .unwrap();
        assert_eq!(result.risk_score, RiskScore::Medium);
        assert_eq!(result.negotiation_suggestions.len(), 1);

        let seen = recording.seen.lock();
        assert_eq!(seen[0].task, AnalysisTask::ExplainClause);
        assert_eq!(seen[0].text, "Rent is due on the 1st.");
        assert!(seen[0].prompt.contains("Tenant"));
        assert!(seen[0].prompt.contains("Rent is due on the 1st."));
    }

    #[tokio::test]
    async fn test_answer_question_passes_question() {
        let (client, recording) = client(json!({ "answer": "Thirty days." }));

        let answer = client
            .answer_question("Notice period is 30 days.", "How much notice?", None)
            .await
            .unwrap();
        assert_eq!(answer.answer, "Thirty days.");

        let seen = recording.seen.lock();
        assert_eq!(seen[0].options.question.as_deref(), Some("How much notice?"));
        assert!(seen[0].prompt.contains("How much notice?"));
    }

    #[tokio::test]
    async fn test_mismatched_response_is_invalid() {
        let (client, _) = client(json!({ "unexpected": true }));

        let err = client.identify_parties("doc", None).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidResponse {
                task: "identify_parties",
                ..
            }
        ));
    }

    #[test]
    fn test_request_serialization() {
        let request = AnalysisRequest {
            task: AnalysisTask::IdentifyClauses,
            text: "doc".to_string(),
            options: AnalysisOptions::default(),
            prompt: "p".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["task"], "identify_clauses");
        assert_eq!(value["options"], json!({}));
    }
}
