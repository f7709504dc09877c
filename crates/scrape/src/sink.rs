// ABOUTME: Output sinks that accept a finished batch of canonical products.
// ABOUTME: JsonSink writes one pretty JSON array; JsonLinesSink writes one record per line.

use std::io::Write;

use thiserror::Error;

use crate::model::CanonicalProduct;

/// Errors that can occur while storing products.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write products: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize products: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for the products of one search.
pub trait Sink {
    fn store(&mut self, products: &[CanonicalProduct]) -> Result<(), SinkError>;
}

/// Writes the whole batch as a single JSON array.
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
        }
    }

    /// Emit compact JSON instead of pretty-printed.
    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonSink<W> {
    fn store(&mut self, products: &[CanonicalProduct]) -> Result<(), SinkError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, products)?;
        } else {
            serde_json::to_writer(&mut self.writer, products)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes one compact JSON object per product per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for JsonLinesSink<W> {
    fn store(&mut self, products: &[CanonicalProduct]) -> Result<(), SinkError> {
        for product in products {
            serde_json::to_writer(&mut self.writer, product)?;
            writeln!(self.writer)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn products() -> Vec<CanonicalProduct> {
        let mut first = CanonicalProduct::empty("Amazon");
        first.product_name = Some("Acme Oxford".into());
        vec![first, CanonicalProduct::empty("Snapdeal")]
    }

    #[test]
    fn json_sink_writes_array() {
        let mut sink = JsonSink::new(Vec::new()).compact();
        sink.store(&products()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: Vec<CanonicalProduct> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, products());
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn json_sink_writes_empty_array() {
        let mut sink = JsonSink::new(Vec::new()).compact();
        sink.store(&[]).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "[]\n");
    }

    #[test]
    fn json_lines_sink_writes_one_record_per_line() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.store(&products()).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"platform\":\"Amazon\""));
        assert!(lines[1].contains("\"product_name\":null"));
    }

    #[test]
    fn io_errors_surface() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = JsonLinesSink::new(Broken)
            .store(&products())
            .expect_err("broken writer");
        assert!(err.to_string().contains("disk full"));
    }
}
