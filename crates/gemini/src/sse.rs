//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes are buffered until a blank line terminates an event; the `data:`
//! lines of each event are joined and returned. Other fields (`event:`,
//! `id:`, `retry:`) and comment lines are ignored.

use crate::error::GeminiError;

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// The previous byte was a CR, so an immediately following LF belongs
    /// to the same line terminator.
    after_cr: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the body. Returns the data payloads of every event
    /// completed by this chunk, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, GeminiError> {
        // CRLF, CR and LF all end a line; store each as a single LF.
        for &byte in chunk {
            let after_cr = std::mem::replace(&mut self.after_cr, false);
            match byte {
                b'\r' => {
                    self.buffer.push(b'\n');
                    self.after_cr = true;
                }
                b'\n' if after_cr => {}
                _ => self.buffer.push(byte),
            }
        }

        let mut events = Vec::new();
        while let Some(end) = find_event_end(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(data) = parse_event(&block[..end])? {
                events.push(data);
            }
        }
        Ok(events)
    }

    /// Flush a final event that was not followed by a blank line.
    pub fn finish(&mut self) -> Result<Option<String>, GeminiError> {
        let block = std::mem::take(&mut self.buffer);
        if block.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        parse_event(&block)
    }
}

fn find_event_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|pair| pair == b"\n\n")
}

fn parse_event(block: &[u8]) -> Result<Option<String>, GeminiError> {
    let text = std::str::from_utf8(block)
        .map_err(|e| GeminiError::Stream(format!("event is not valid UTF-8: {e}")))?;

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data.is_empty() {
        Ok(None)
    } else {
        Ok(Some(data.join("\n")))
    }
}
