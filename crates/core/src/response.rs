use std::io::{self, Write};

use taxagent_model::{ChatResult, Citation, Trace};

/// The outcome of one [`Agent::run`](crate::Agent::run) call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunResponse {
    session_id: String,
    data: ChatResult,
}

impl RunResponse {
    #[inline]
    pub(crate) fn new(session_id: String, data: ChatResult) -> Self {
        Self { session_id, data }
    }

    /// Returns the id of the session the turn ran in.
    ///
    /// Passing it to the next `run` call continues the conversation.
    #[inline]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the final chat result of the turn.
    #[inline]
    pub fn data(&self) -> &ChatResult {
        &self.data
    }

    /// Returns the text of the agent's answer.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        self.data.text()
    }

    /// Returns the citations backing the answer.
    #[inline]
    pub fn citations(&self) -> &[Citation] {
        match &self.data.message {
            Some(message) => &message.content.citations,
            None => &[],
        }
    }

    /// Returns the execution traces of the final exchange.
    #[inline]
    pub fn traces(&self) -> &[Trace] {
        &self.data.traces
    }

    /// Writes the answer and its citations.
    pub fn pretty_print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        match self.text() {
            Some(text) => writeln!(out, "{text}")?,
            None => writeln!(out, "(no message)")?,
        }

        let citations = self.citations();
        if citations.is_empty() {
            return Ok(());
        }
        writeln!(out)?;
        writeln!(out, "Citations:")?;
        for (idx, citation) in citations.iter().enumerate() {
            let source = citation
                .source_location
                .as_ref()
                .and_then(|location| location.url.as_deref())
                .unwrap_or("unknown source");
            writeln!(out, "[{}] {source}", idx + 1)?;
            if let Some(text) = &citation.source_text {
                for line in text.lines() {
                    writeln!(out, "    {line}")?;
                }
            }
        }
        Ok(())
    }

    /// Writes every trace as indented JSON.
    pub fn pretty_print_traces<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for trace in self.traces() {
            let key = trace.key.as_deref().unwrap_or("-");
            writeln!(out, "--- {} ({key})", trace.trace_type)?;
            let details = serde_json::to_string_pretty(&trace.details)
                .map_err(io::Error::other)?;
            writeln!(out, "{details}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: serde_json::Value) -> RunResponse {
        RunResponse::new(
            "session:1".to_owned(),
            serde_json::from_value(value).unwrap(),
        )
    }

    #[test]
    fn test_pretty_print() {
        let response = response(json!({
            "message": {
                "role": "AGENT",
                "content": {
                    "text": "Refunds are allowed.",
                    "citations": [{
                        "sourceText": "Section 4\nRefunds",
                        "sourceLocation": {
                            "sourceLocationType": "OCI_OBJECT_STORAGE",
                            "url": "https://objectstorage/policy.pdf"
                        }
                    }]
                }
            }
        }));

        let mut out = vec![];
        response.pretty_print(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Refunds are allowed.\n\nCitations:\n\
             [1] https://objectstorage/policy.pdf\n    Section 4\n    Refunds\n"
        );
    }

    #[test]
    fn test_pretty_print_without_message() {
        let response = response(json!({}));
        assert_eq!(response.text(), None);
        assert!(response.citations().is_empty());

        let mut out = vec![];
        response.pretty_print(&mut out).unwrap();
        assert_eq!(out, b"(no message)\n");
    }

    #[test]
    fn test_pretty_print_traces() {
        let response = response(json!({
            "traces": [{
                "traceType": "TOOL_INVOCATION_TRACE",
                "key": "trace:1",
                "toolInvocation": { "name": "sql" }
            }]
        }));

        let mut out = vec![];
        response.pretty_print_traces(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("--- TOOL_INVOCATION_TRACE (trace:1)\n"));
        assert!(out.contains("\"toolInvocation\": {"));
        assert!(out.contains("\"name\": \"sql\""));
    }
}
