//! Where encoded bytes go to and come from.
//!
//! A [`Sink`] or [`Source`] names an endpoint without opening it. The facade opens it only once
//! the format is resolved and the conversion succeeded, and releases it before returning: files
//! and streams handed over by value are closed, borrowed streams are flushed and left open.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// The destination of a serialization.
pub enum Sink<'a> {
    /// An in-memory buffer, whose bytes are returned to the caller.
    Memory,
    /// A file, created or truncated once the encoding has succeeded.
    Path(PathBuf),
    /// A borrowed stream, flushed but left open.
    Writer {
        /// The stream.
        writer: &'a mut dyn Write,
        /// A file name to infer the format from.
        name: Option<PathBuf>,
    },
    /// A stream handed over to the serialization, flushed and closed.
    Owned {
        /// The stream.
        writer: Box<dyn Write + 'a>,
        /// A file name to infer the format from.
        name: Option<PathBuf>,
    },
}

impl<'a> Sink<'a> {
    /// An in-memory buffer.
    pub fn memory() -> Self {
        Sink::Memory
    }

    /// A file at `path`.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Sink::Path(path.into())
    }

    /// A borrowed stream.
    pub fn writer(writer: &'a mut dyn Write) -> Self {
        Sink::Writer { writer, name: None }
    }

    /// A stream to be closed once written.
    pub fn owned(writer: impl Write + 'a) -> Self {
        Sink::Owned { writer: Box::new(writer), name: None }
    }

    /// Attaches a file name to a stream, for format inference. Has no effect on other sinks.
    pub fn named(self, name: impl Into<PathBuf>) -> Self {
        match self {
            Sink::Writer { writer, .. } => Sink::Writer { writer, name: Some(name.into()) },
            Sink::Owned { writer, .. } => Sink::Owned { writer, name: Some(name.into()) },
            other => other,
        }
    }

    /// The file name of this sink, if it has one.
    pub fn name(&self) -> Option<&Path> {
        match *self {
            Sink::Memory => None,
            Sink::Path(ref path) => Some(path.as_path()),
            Sink::Writer { ref name, .. } | Sink::Owned { ref name, .. } => name.as_deref(),
        }
    }

    pub(crate) fn open(self) -> io::Result<OpenSink<'a>> {
        let target = match self {
            Sink::Memory => Target::Memory(Vec::with_capacity(128)),
            Sink::Path(path) => Target::File { path, buf: Vec::new() },
            Sink::Writer { writer, .. } => Target::Borrowed(writer),
            Sink::Owned { writer, .. } => Target::Owned(writer),
        };
        Ok(OpenSink { target })
    }
}

impl Default for Sink<'_> {
    fn default() -> Self {
        Sink::Memory
    }
}

impl From<PathBuf> for Sink<'_> {
    fn from(path: PathBuf) -> Self {
        Sink::Path(path)
    }
}

impl<'p> From<&'p Path> for Sink<'_> {
    fn from(path: &'p Path) -> Self {
        Sink::Path(path.to_path_buf())
    }
}

enum Target<'a> {
    Memory(Vec<u8>),
    // Encoded in memory and written on `finish`, so a failed encoding creates no file.
    File { path: PathBuf, buf: Vec<u8> },
    Borrowed(&'a mut dyn Write),
    Owned(Box<dyn Write + 'a>),
}

// An opened sink. Dropping it without `finish` releases it without reporting flush errors.
pub(crate) struct OpenSink<'a> {
    target: Target<'a>,
}

impl<'a> OpenSink<'a> {
    /// Whether the stream was opened by, or handed over to, the facade.
    pub(crate) fn owned(&self) -> bool {
        match self.target {
            Target::Borrowed(_) => false,
            _ => true,
        }
    }

    pub(crate) fn writer(&mut self) -> &mut dyn Write {
        match self.target {
            Target::Memory(ref mut buf) => buf,
            Target::File { ref mut buf, .. } => buf,
            Target::Borrowed(ref mut writer) => &mut **writer,
            Target::Owned(ref mut writer) => &mut **writer,
        }
    }

    // Flushes and releases the sink, returning the buffer of an in-memory sink.
    pub(crate) fn finish(self) -> io::Result<Option<Vec<u8>>> {
        match self.target {
            Target::Memory(buf) => Ok(Some(buf)),
            Target::File { path, buf } => {
                let mut file = File::create(path)?;
                file.write_all(&buf)?;
                file.flush()?;
                Ok(None)
            }
            Target::Borrowed(writer) => {
                writer.flush()?;
                Ok(None)
            }
            Target::Owned(mut writer) => {
                writer.flush()?;
                Ok(None)
            }
        }
    }
}

/// The origin of a deserialization.
pub enum Source<'a> {
    /// Encoded bytes held in memory. A body never names its format.
    Body(Cow<'a, [u8]>),
    /// A file, opened for reading.
    Path(PathBuf),
    /// A borrowed stream, left open.
    Reader {
        /// The stream.
        reader: &'a mut dyn Read,
        /// A file name to infer the format from.
        name: Option<PathBuf>,
    },
    /// A stream handed over to the deserialization, closed once read.
    Owned {
        /// The stream.
        reader: Box<dyn Read + 'a>,
        /// A file name to infer the format from.
        name: Option<PathBuf>,
    },
}

impl<'a> Source<'a> {
    /// Encoded bytes.
    pub fn body(body: impl Into<Cow<'a, [u8]>>) -> Self {
        Source::Body(body.into())
    }

    /// A file at `path`.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Source::Path(path.into())
    }

    /// A borrowed stream.
    pub fn reader(reader: &'a mut dyn Read) -> Self {
        Source::Reader { reader, name: None }
    }

    /// A stream to be closed once read.
    pub fn owned(reader: impl Read + 'a) -> Self {
        Source::Owned { reader: Box::new(reader), name: None }
    }

    /// Attaches a file name to a stream, for format inference. Has no effect on other sources.
    pub fn named(self, name: impl Into<PathBuf>) -> Self {
        match self {
            Source::Reader { reader, .. } => Source::Reader { reader, name: Some(name.into()) },
            Source::Owned { reader, .. } => Source::Owned { reader, name: Some(name.into()) },
            other => other,
        }
    }

    /// The file name of this source, if it has one.
    pub fn name(&self) -> Option<&Path> {
        match *self {
            Source::Body(_) => None,
            Source::Path(ref path) => Some(path.as_path()),
            Source::Reader { ref name, .. } | Source::Owned { ref name, .. } => name.as_deref(),
        }
    }

    pub(crate) fn open(self) -> io::Result<OpenSource<'a>> {
        let origin = match self {
            Source::Body(body) => Origin::Body(io::Cursor::new(body)),
            Source::Path(path) => Origin::File(BufReader::new(File::open(path)?)),
            Source::Reader { reader, .. } => Origin::Borrowed(reader),
            Source::Owned { reader, .. } => Origin::Owned(reader),
        };
        Ok(OpenSource { origin })
    }
}

impl<'a> From<&'a [u8]> for Source<'a> {
    fn from(body: &'a [u8]) -> Self {
        Source::Body(Cow::Borrowed(body))
    }
}

impl From<Vec<u8>> for Source<'_> {
    fn from(body: Vec<u8>) -> Self {
        Source::Body(Cow::Owned(body))
    }
}

impl From<PathBuf> for Source<'_> {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl<'p> From<&'p Path> for Source<'_> {
    fn from(path: &'p Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

enum Origin<'a> {
    Body(io::Cursor<Cow<'a, [u8]>>),
    File(BufReader<File>),
    Borrowed(&'a mut dyn Read),
    Owned(Box<dyn Read + 'a>),
}

// An opened source, released on drop.
pub(crate) struct OpenSource<'a> {
    origin: Origin<'a>,
}

impl<'a> OpenSource<'a> {
    /// Whether the stream was opened by, or handed over to, the facade.
    pub(crate) fn owned(&self) -> bool {
        match self.origin {
            Origin::Borrowed(_) => false,
            _ => true,
        }
    }

    pub(crate) fn reader(&mut self) -> &mut dyn Read {
        match self.origin {
            Origin::Body(ref mut cursor) => cursor,
            Origin::File(ref mut file) => file,
            Origin::Borrowed(ref mut reader) => &mut **reader,
            Origin::Owned(ref mut reader) => &mut **reader,
        }
    }
}
