// Redacting writer plugged into the tracing fmt layer
use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use crate::redactor::PiiRedactor;

/// Wraps another `MakeWriter` and redacts every formatted log line before it
/// reaches the underlying sink.
#[derive(Clone)]
pub struct RedactingMakeWriter<M> {
    inner: M,
    redactor: Arc<PiiRedactor>,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M, redactor: PiiRedactor) -> Self {
        Self {
            inner,
            redactor: Arc::new(redactor),
        }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
            redactor: Arc::clone(&self.redactor),
        }
    }
}

pub struct RedactingWriter<W> {
    inner: W,
    redactor: Arc<PiiRedactor>,
}

impl<W: io::Write> io::Write for RedactingWriter<W> {
    // The fmt layer hands over one fully formatted event per call.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let redacted = self.redactor.redact(&text);
        self.inner.write_all(redacted.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redactor::RedactionConfig;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_redacts_line() {
        let capture = Capture::default();
        let sink = capture.clone();
        let make = RedactingMakeWriter::new(
            move || sink.clone(),
            PiiRedactor::new(RedactionConfig {
                hash_for_correlation: false,
                ..Default::default()
            }),
        );

        let line = b"patient contact jane@hospital.org\n";
        let written = make.make_writer().write(line).unwrap();

        assert_eq!(written, line.len());
        let out = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out, "patient contact j***@h***\n");
    }
}
