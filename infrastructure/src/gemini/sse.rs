//! Server-sent-event decoding for `streamGenerateContent?alt=sse`.
//!
//! Bytes arrive in arbitrary chunks; [`SseDecoder`] splits them into lines
//! and yields the payload of every complete `data:` line. Each payload is
//! one JSON [`GenerateContentResponse`], turned into a [`Fragment`] by
//! [`decode_payload`].

use super::error::from_api_error;
use super::protocol::GenerateContentResponse;
use muse_application::GatewayError;
use muse_domain::agent::value_objects::merge_citations;
use muse_domain::{Citation, Fragment};

/// Incremental line splitter for an SSE body.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Feed raw bytes; returns the `data:` payloads completed by them.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(payload) = data_payload(&line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Payload of a trailing line without a newline, if any.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        data_payload(&rest)
    }
}

fn data_payload(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let line = line.trim_end_matches(['\r', '\n']);
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        None
    } else {
        Some(data.to_string())
    }
}

/// Cumulative, URI-deduplicated citation list for one stream.
#[derive(Debug, Default)]
pub struct CitationAccumulator {
    all: Vec<Citation>,
}

impl CitationAccumulator {
    /// Merge `incoming`; returns the full list when something new arrived.
    pub fn absorb(&mut self, incoming: &[Citation]) -> Option<Vec<Citation>> {
        (merge_citations(&mut self.all, incoming) > 0).then(|| self.all.clone())
    }
}

/// Decode one `data:` payload into the fragment it carries.
///
/// Returns `Ok(None)` for chunks with neither text nor new citations.
pub fn decode_payload(
    payload: &str,
    citations: &mut CitationAccumulator,
) -> Result<Option<Fragment>, GatewayError> {
    let chunk: GenerateContentResponse = serde_json::from_str(payload)
        .map_err(|e| GatewayError::InvalidResponse(format!("Bad stream chunk: {}", e)))?;

    if let Some(error) = &chunk.error {
        return Err(from_api_error(error.code, error));
    }
    if let Some(reason) = chunk.block_reason() {
        return Err(GatewayError::RequestFailed(format!(
            "Response blocked: {}",
            reason
        )));
    }

    let text = chunk.text();
    let fragment = Fragment {
        text: (!text.is_empty()).then_some(text),
        citations: citations.absorb(&chunk.citations()),
    };
    Ok((!fragment.is_empty()).then_some(fragment))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payloads_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"a\"").is_empty());
        let payloads = decoder.push(b":1}\r\n\r\ndata: {\"b\":2}\n");
        assert_eq!(payloads, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        let mut decoder = SseDecoder::default();
        let payloads = decoder.push(b": keep-alive\nevent: message\ndata: [DONE]\ndata: {}\n");
        assert_eq!(payloads, vec!["{}"]);
    }

    #[test]
    fn test_multibyte_text_survives_chunk_boundary() {
        let line = "data: {\"t\":\"東京\"}\n".as_bytes();
        let (head, tail) = line.split_at(14);
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(head).is_empty());
        assert_eq!(decoder.push(tail), vec!["{\"t\":\"東京\"}"]);
    }

    #[test]
    fn test_trailing_line_without_newline() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: {\"x\":1}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("{\"x\":1}"));
    }

    #[test]
    fn test_decode_text_and_cumulative_citations() {
        let mut citations = CitationAccumulator::default();
        let first = r#"{"candidates":[{"content":{"parts":[{"text":"Tokyo "}]},
            "groundingMetadata":{"groundingChunks":[{"web":{"uri":"https://a.example","title":"A"}}]}}]}"#;
        let second = r#"{"candidates":[{"content":{"parts":[{"text":"is big"}]},
            "groundingMetadata":{"groundingChunks":[{"web":{"uri":"https://a.example","title":"A"}},
            {"web":{"uri":"https://b.example","title":"B"}}]}}]}"#;
        let third = r#"{"candidates":[{"groundingMetadata":{"groundingChunks":[
            {"web":{"uri":"https://b.example","title":"B"}}]}}]}"#;

        let f1 = decode_payload(first, &mut citations).unwrap().unwrap();
        assert_eq!(f1.text.as_deref(), Some("Tokyo "));
        assert_eq!(f1.citations.unwrap().len(), 1);

        let f2 = decode_payload(second, &mut citations).unwrap().unwrap();
        assert_eq!(f2.text.as_deref(), Some("is big"));
        let uris: Vec<_> = f2.citations.unwrap().into_iter().map(|c| c.uri).collect();
        assert_eq!(uris, ["https://a.example", "https://b.example"]);

        assert!(decode_payload(third, &mut citations).unwrap().is_none());
    }

    #[test]
    fn test_decode_errors() {
        let mut citations = CitationAccumulator::default();
        assert!(matches!(
            decode_payload("not json", &mut citations),
            Err(GatewayError::InvalidResponse(_))
        ));
        assert!(matches!(
            decode_payload(
                r#"{"error":{"code":429,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#,
                &mut citations
            ),
            Err(GatewayError::QuotaExceeded(_))
        ));
        assert!(matches!(
            decode_payload(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#, &mut citations),
            Err(GatewayError::RequestFailed(_))
        ));
    }
}
