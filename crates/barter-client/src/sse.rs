//! Incremental decoder for the event stream body.
//!
//! Accepts both framings the chat backend is known to use:
//!
//! - Server-sent events: `data:` lines accumulated until a blank line.
//!   Comments (`:keep-alive`) and the `event`, `id`, and `retry` fields are
//!   ignored.
//! - Newline-delimited JSON: a bare line starting with `{` is one payload.
//!
//! Bytes are buffered until a full line is available, so multi-byte UTF-8
//! characters split across network chunks decode correctly.

/// Longest line accepted before the partial line is discarded.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Turns raw body chunks into complete event payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: String,
}

impl SseDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every payload it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut payloads = Vec::new();
        let mut start = self.pending.len();
        self.pending.extend_from_slice(chunk);

        while let Some(offset) = self.pending[start..].iter().position(|&b| b == b'\n') {
            let end = start + offset;
            let line = String::from_utf8_lossy(&self.pending[..end]).into_owned();
            self.pending.drain(..=end);
            start = 0;

            if let Some(payload) = self.process_line(line.strip_suffix('\r').unwrap_or(&line)) {
                payloads.push(payload);
            }
        }

        if self.pending.len() > MAX_LINE_BYTES {
            tracing::warn!(bytes = self.pending.len(), "event stream line too long, discarding");
            self.pending.clear();
        }

        payloads
    }

    /// Flush whatever is left when the stream ends.
    pub fn finish(&mut self) -> Vec<String> {
        let mut payloads = Vec::new();

        if !self.pending.is_empty() {
            let line = String::from_utf8_lossy(&self.pending).into_owned();
            self.pending.clear();
            if let Some(payload) = self.process_line(line.trim_end_matches('\r')) {
                payloads.push(payload);
            }
        }

        if !self.data.is_empty() {
            payloads.push(std::mem::take(&mut self.data));
        }

        payloads
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return (!self.data.is_empty()).then(|| std::mem::take(&mut self.data));
        }

        if line.starts_with(':') {
            return None;
        }

        if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            if !self.data.is_empty() {
                self.data.push('\n');
            }
            self.data.push_str(value);
            return None;
        }

        if self.data.is_empty() && line.trim_start().starts_with('{') {
            return Some(line.to_string());
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_sse_frames() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b": hello\nevent: chat\ndata: {\"type\":\"heartbeat\"}\n\n");
        assert_eq!(payloads, vec![r#"{"type":"heartbeat"}"#]);
    }

    #[test]
    fn joins_multi_line_data() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: {\"type\":\ndata: \"connected\"}\n\n");
        assert_eq!(payloads, vec!["{\"type\":\n\"connected\"}"]);
    }

    #[test]
    fn decodes_newline_delimited_json() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"{\"type\":\"heartbeat\"}\r\n{\"type\":\"connected\"}\n");
        assert_eq!(payloads, vec![r#"{"type":"heartbeat"}"#, r#"{"type":"connected"}"#]);
    }

    #[test]
    fn waits_for_blank_line() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"heartbeat\"}\n").is_empty());
        assert_eq!(decoder.feed(b"\n").len(), 1);
    }

    #[test]
    fn handles_utf8_split_across_chunks() {
        let frame = "data: {\"type\":\"new_message\",\"room_id\":\"r\",\"message\":\"caf\u{e9} \u{1f6b2}\"}\n\n";
        let bytes = frame.as_bytes();
        // Split inside the 4-byte bicycle emoji
        let split = frame.find('\u{1f6b2}').unwrap() + 2;

        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(&bytes[..split]).is_empty());
        let payloads = decoder.feed(&bytes[split..]);

        assert_eq!(payloads.len(), 1);
        assert!(payloads[0].contains("caf\u{e9} \u{1f6b2}"));
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"type\":\"heartbeat\"}").is_empty());
        assert_eq!(decoder.finish(), vec![r#"{"type":"heartbeat"}"#]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn drops_oversized_lines() {
        let mut decoder = SseDecoder::new();
        let junk = vec![b'x'; MAX_LINE_BYTES + 1];
        assert!(decoder.feed(&junk).is_empty());
        assert_eq!(decoder.feed(b"\n{\"type\":\"heartbeat\"}\n"), vec![r#"{"type":"heartbeat"}"#]);
    }
}
