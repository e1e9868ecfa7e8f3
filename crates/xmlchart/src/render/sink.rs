//! Response targets for streamed charts.
//!
//! A [`ResponseSink`] is the HTTP-response-like seam `stream_render` writes through: a content
//! type and headers first, then the encoded body, then `close`.

use std::io::{self, Write};

pub trait ResponseSink {
    fn set_content_type(&mut self, content_type: &str);

    fn set_header(&mut self, name: &str, value: &str);

    /// The body stream. Headers set after the first call may be ignored.
    fn output_stream(&mut self) -> io::Result<&mut dyn Write>;

    fn close(&mut self) -> io::Result<()>;
}

/// Collects a response in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponseBuffer {
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub closed: bool,
}

impl HttpResponseBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

impl ResponseSink for HttpResponseBuffer {
    fn set_content_type(&mut self, content_type: &str) {
        self.content_type = Some(content_type.to_string());
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        if self.closed {
            return Err(io::Error::other("response already closed"));
        }
        Ok(&mut self.body)
    }

    fn close(&mut self) -> io::Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Writes an HTTP-style header block (`Name: value` lines and a blank line) ahead of the body.
#[derive(Debug)]
pub struct HttpStreamSink<W: Write> {
    inner: W,
    headers: Vec<(String, String)>,
    committed: bool,
    closed: bool,
}

impl<W: Write> HttpStreamSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            headers: Vec::new(),
            committed: false,
            closed: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn commit(&mut self) -> io::Result<()> {
        if self.committed {
            return Ok(());
        }
        for (name, value) in &self.headers {
            write!(self.inner, "{name}: {value}\r\n")?;
        }
        self.inner.write_all(b"\r\n")?;
        self.committed = true;
        Ok(())
    }
}

impl<W: Write> ResponseSink for HttpStreamSink<W> {
    fn set_content_type(&mut self, content_type: &str) {
        self.set_header("Content-Type", content_type);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        if self.committed {
            tracing::debug!(name, "header set after the body started; ignored");
            return;
        }
        self.headers.push((name.to_string(), value.to_string()));
    }

    fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        if self.closed {
            return Err(io::Error::other("response already closed"));
        }
        self.commit()?;
        Ok(&mut self.inner)
    }

    fn close(&mut self) -> io::Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.commit()?;
        self.inner.flush()
    }
}

/// Closes the wrapped sink when dropped unless [`Closing::finish`] already did.
pub(crate) struct Closing<'a> {
    sink: &'a mut dyn ResponseSink,
    closed: bool,
}

impl<'a> Closing<'a> {
    pub(crate) fn new(sink: &'a mut dyn ResponseSink) -> Self {
        Self {
            sink,
            closed: false,
        }
    }

    pub(crate) fn set_content_type(&mut self, content_type: &str) {
        self.sink.set_content_type(content_type);
    }

    pub(crate) fn set_header(&mut self, name: &str, value: &str) {
        self.sink.set_header(name, value);
    }

    pub(crate) fn output_stream(&mut self) -> io::Result<&mut dyn Write> {
        self.sink.output_stream()
    }

    pub(crate) fn finish(mut self) -> io::Result<()> {
        self.closed = true;
        self.sink.close()
    }
}

impl Drop for Closing<'_> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.sink.close() {
            tracing::warn!(error = %err, "failed to close response");
        }
    }
}
