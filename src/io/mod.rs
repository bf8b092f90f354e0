//! Destinations for solver console output.
//!
//! Every solver owns a [`PrintTarget`].  Output goes to stdout by default
//! and can be redirected through the [`ConfigurablePrintTarget`] trait.

use std::fs::File;
use std::io::{sink, stdout, Error, ErrorKind, Result, Sink, Stdout, Write};

/// Where printed solver output is sent
pub enum PrintTarget {
    Stdout(Stdout),
    File(File),
    /// output is accumulated in memory, see [`ConfigurablePrintTarget::get_print_buffer`]
    Buffer(Vec<u8>),
    /// any user supplied writer
    Stream(Box<dyn Write + Send + Sync>),
    /// output is discarded
    Sink(Sink),
}

impl std::fmt::Debug for PrintTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PrintTarget::Stdout(_) => "Stdout",
            PrintTarget::File(_) => "File",
            PrintTarget::Buffer(_) => "Buffer",
            PrintTarget::Stream(_) => "Stream",
            PrintTarget::Sink(_) => "Sink",
        };
        write!(f, "PrintTarget::{}", name)
    }
}

impl Default for PrintTarget {
    fn default() -> Self {
        PrintTarget::Stdout(stdout())
    }
}

impl Write for PrintTarget {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.write(buf),
            PrintTarget::File(file) => file.write(buf),
            PrintTarget::Buffer(buffer) => {
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
            PrintTarget::Stream(stream) => stream.write(buf),
            PrintTarget::Sink(sink) => sink.write(buf),
        }
    }

    fn flush(&mut self) -> Result<()> {
        match self {
            PrintTarget::Stdout(stdout) => stdout.flush(),
            PrintTarget::File(file) => file.flush(),
            PrintTarget::Stream(stream) => stream.flush(),
            PrintTarget::Buffer(_) | PrintTarget::Sink(_) => Ok(()),
        }
    }
}

/// Redirection of printed output.  Implemented by [`PrintTarget`] and
/// by the solver, which forwards to the target it owns.
pub trait ConfigurablePrintTarget {
    /// redirect print output to stdout
    fn print_to_stdout(&mut self);
    /// redirect print output to a file
    fn print_to_file(&mut self, file: File);
    /// redirect print output to a stream
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>);
    /// redirect print output to an internal buffer
    fn print_to_buffer(&mut self);
    /// discard all print output
    fn print_to_sink(&mut self);
    /// get the contents of the internal print buffer
    fn get_print_buffer(&mut self) -> Result<String>;
}

impl ConfigurablePrintTarget for PrintTarget {
    fn print_to_stdout(&mut self) {
        *self = PrintTarget::Stdout(stdout());
    }

    fn print_to_file(&mut self, file: File) {
        *self = PrintTarget::File(file);
    }

    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        *self = PrintTarget::Stream(stream);
    }

    fn print_to_buffer(&mut self) {
        *self = PrintTarget::Buffer(Vec::new());
    }

    fn print_to_sink(&mut self) {
        *self = PrintTarget::Sink(sink());
    }

    fn get_print_buffer(&mut self) -> Result<String> {
        match self {
            PrintTarget::Buffer(buffer) => Ok(String::from_utf8_lossy(buffer).to_string()),
            _ => Err(Error::new(
                ErrorKind::Other,
                "Print buffering is not configured.",
            )),
        }
    }
}

#[test]
fn test_print_buffer() {
    let mut target = PrintTarget::default();
    assert!(target.get_print_buffer().is_err());

    target.print_to_buffer();
    write!(target, "hello {}", 42).unwrap();
    assert_eq!(target.get_print_buffer().unwrap(), "hello 42");

    target.print_to_sink();
    write!(target, "dropped").unwrap();
    assert!(target.get_print_buffer().is_err());
    assert_eq!(format!("{:?}", target), "PrintTarget::Sink");
}
