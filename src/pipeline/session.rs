//! Per-request session state.

use crate::llm::{Message, Role};
use crate::types::SessionId;
use serde::Serialize;
use serde_json::Value;
use time::OffsetDateTime;

/// Sentinel returned by [`ReportSession::finalize`] for a slot the
/// pipeline never wrote.
pub const NOTHING_GENERATED: &str = "Nothing was generated.";

/// Mutable state threaded through one report-generation session.
///
/// Owned by a single task for the duration of one pipeline run and
/// discarded once the final report is returned; nothing is persisted.
/// The message sequence is append-only.
#[derive(Debug)]
pub struct ReportSession {
    id: SessionId,
    started_at: OffsetDateTime,
    messages: Vec<Message>,
    revision: u32,
    plan: Option<String>,
    organized_query_result: Option<String>,
    final_report: Option<String>,
}

impl ReportSession {
    /// Start a session from prior conversation turns (human/ai only).
    #[must_use]
    pub fn new(initial: Vec<Message>) -> Self {
        Self {
            id: SessionId::new(),
            started_at: OffsetDateTime::now_utc(),
            messages: initial,
            revision: 1,
            plan: None,
            organized_query_result: None,
            final_report: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn started_at(&self) -> OffsetDateTime {
        self.started_at
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// 1-based index of the current QUERY iteration.
    #[must_use]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    #[must_use]
    pub fn plan(&self) -> Option<&str> {
        self.plan.as_deref()
    }

    pub(crate) fn set_plan(&mut self, text: String) {
        self.plan = Some(text);
    }

    /// Record the output of one synthesis call. The organized result also
    /// becomes the provisional final report; a later synthesis overwrites
    /// both (last successful synthesis wins).
    pub(crate) fn record_synthesis(&mut self, text: String) {
        self.organized_query_result = Some(text.clone());
        self.final_report = Some(text);
    }

    /// Collect every tool result accumulated so far, parsing each payload
    /// as JSON and falling back to the raw text when it is not structured.
    pub(crate) fn tool_records(&self) -> Vec<ToolRecord> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Tool)
            .map(|m| ToolRecord {
                tool_name: m.tool_name.clone().unwrap_or_default(),
                result: serde_json::from_str(&m.content)
                    .unwrap_or_else(|_| Value::String(m.content.clone())),
            })
            .collect()
    }

    /// Pure projection of the finished session. No model calls, no side
    /// effects; finalizing twice yields identical output.
    #[must_use]
    pub fn finalize(&self) -> ReportBundle {
        let slot = |value: &Option<String>| {
            value
                .clone()
                .unwrap_or_else(|| NOTHING_GENERATED.to_string())
        };
        ReportBundle {
            plan: slot(&self.plan),
            query_summary: slot(&self.organized_query_result),
            report: slot(&self.final_report),
        }
    }
}

/// One parsed tool result collected during QUERY-stage consolidation.
#[derive(Debug, Serialize)]
pub(crate) struct ToolRecord {
    pub tool_name: String,
    pub result: Value,
}

/// Deliverables of a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportBundle {
    pub plan: String,
    pub query_summary: String,
    pub report: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_starts_at_revision_one() {
        let session = ReportSession::new(vec![Message::human("hi")]);
        assert_eq!(session.revision(), 1);
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_finalize_uses_sentinel_for_missing_slots() {
        let session = ReportSession::new(Vec::new());
        let bundle = session.finalize();
        assert_eq!(bundle.plan, NOTHING_GENERATED);
        assert_eq!(bundle.query_summary, NOTHING_GENERATED);
        assert_eq!(bundle.report, NOTHING_GENERATED);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut session = ReportSession::new(Vec::new());
        session.set_plan("P".to_string());
        session.record_synthesis("R".to_string());
        assert_eq!(session.finalize(), session.finalize());
    }

    #[test]
    fn test_last_synthesis_wins() {
        let mut session = ReportSession::new(Vec::new());
        session.record_synthesis("first".to_string());
        session.record_synthesis("second".to_string());
        let bundle = session.finalize();
        assert_eq!(bundle.query_summary, "second");
        assert_eq!(bundle.report, "second");
    }

    #[test]
    fn test_tool_records_parse_json_with_raw_fallback() {
        let mut session = ReportSession::new(Vec::new());
        session.push(Message::tool_result(
            "a",
            "check_in_data_year",
            r#"{"employees": []}"#,
        ));
        session.push(Message::tool_result("b", "execute_select_or_show", "oops"));

        let records = session.tool_records();
        assert_eq!(records.len(), 2);
        assert!(records[0].result.is_object());
        assert_eq!(records[1].result, Value::String("oops".to_string()));
        assert_eq!(records[1].tool_name, "execute_select_or_show");
    }
}
