//! Line-oriented parser for upstream Server-Sent-Events bodies.
//!
//! All three providers stream `data:` lines; they differ only in the JSON
//! carried on each line. `StreamParser` owns the byte buffering and hands each
//! data payload to a provider-specific decode function.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;

use super::error::LLMError;
use super::types::StreamEvent;

/// What a provider made of one `data:` payload.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum DataFrame {
    Token(String),
    Done,
    Error(String),
    Ignore,
}

pub(crate) type DecodeFn = fn(&str) -> DataFrame;

pub(crate) struct StreamParser<S> {
    inner: S,
    buffer: Vec<u8>,
    decode: DecodeFn,
    eof: bool,
    done: bool,
}

impl<S> StreamParser<S> {
    pub(crate) fn new(inner: S, decode: DecodeFn) -> Self {
        Self {
            inner,
            buffer: Vec::new(),
            decode,
            eof: false,
            done: false,
        }
    }

    /// Pop the next complete line from the buffer, if any.
    ///
    /// Splitting on the raw `\n` byte never cuts a multi-byte UTF-8 sequence.
    fn next_line(&mut self) -> Option<String> {
        let end = self.buffer.iter().position(|b| *b == b'\n')?;
        let raw: Vec<u8> = self.buffer.drain(..=end).collect();
        Some(String::from_utf8_lossy(&raw).trim().to_string())
    }
}

impl<S> Stream for StreamParser<S>
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Unpin,
{
    type Item = Result<StreamEvent, LLMError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.done {
            return Poll::Ready(None);
        }

        loop {
            if let Some(line) = self.next_line() {
                // Skip blank separators, `event:` names and `:` comments
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };

                match (self.decode)(data.trim_start()) {
                    DataFrame::Token(text) => {
                        return Poll::Ready(Some(Ok(StreamEvent::Token(text))));
                    }
                    DataFrame::Done => {
                        self.done = true;
                        return Poll::Ready(Some(Ok(StreamEvent::Done)));
                    }
                    DataFrame::Error(message) => {
                        self.done = true;
                        return Poll::Ready(Some(Err(LLMError::Stream(message))));
                    }
                    DataFrame::Ignore => continue,
                }
            }

            if self.eof {
                if !self.buffer.is_empty() {
                    // Unterminated last line
                    self.buffer.push(b'\n');
                    continue;
                }
                self.done = true;
                return Poll::Ready(Some(Ok(StreamEvent::Done)));
            }

            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    self.buffer.extend_from_slice(&bytes);
                }
                Poll::Ready(Some(Err(e))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(LLMError::Request(e))));
                }
                Poll::Ready(None) => {
                    self.eof = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
