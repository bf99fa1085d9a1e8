use crate::ast::Node;
use crate::error::{CompileError, Error, RenderError};
use crate::eval::Context;
use crate::lexer::Tokenizer;
use crate::options::Options;
use crate::parser::Parser;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io;
use tracing::{debug, trace};

/// A compiled template: parse once, render any number of times.
///
/// The node tree is never mutated after compilation, so one `Template`
/// can be shared by reference between threads and rendered concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Node,
    options: Options,
}

impl Template {
    pub fn compile(source: &str) -> Result<Self, CompileError> {
        Self::compile_with(source, Options::default())
    }

    pub fn compile_with(source: &str, options: Options) -> Result<Self, CompileError> {
        Self::compile_chars(source.chars(), options)
    }

    /// Reads the whole template from `reader`, then compiles it.
    pub fn from_reader(mut reader: impl io::Read, options: Options) -> Result<Self, Error> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Self::compile_with(&source, options)?)
    }

    fn compile_chars(chars: impl Iterator<Item = char>, options: Options) -> Result<Self, CompileError> {
        debug!(?options, "compiling template");
        let root = Parser::from_tokenizer(Tokenizer::from_chars(chars))
            .parse()
            .inspect_err(|e| debug!(error = %e, "template failed to compile"))?;
        Ok(Self { root, options })
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn options(&self) -> Options {
        self.options
    }

    /// Writes the output for `data` into `out`.
    pub fn render_to<W: fmt::Write>(&self, out: &mut W, data: &Value) -> Result<(), RenderError> {
        trace!("rendering template");
        let mut ctx = Context::new(data).with_iteration_metadata(self.options.iteration_metadata);
        self.root.write(out, &mut ctx)
    }

    pub fn render(&self, data: &Value) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render_to(&mut out, data)?;
        Ok(out)
    }

    /// Converts `data` with serde before rendering.
    pub fn render_serialize<T: Serialize + ?Sized>(&self, data: &T) -> Result<String, RenderError> {
        let value = serde_json::to_value(data)?;
        self.render(&value)
    }

    /// Streams the output into an `io::Write` sink.
    pub fn write_to<W: io::Write>(&self, writer: W, data: &Value) -> Result<(), RenderError> {
        let mut adapter = IoAdapter {
            inner: writer,
            error: None,
        };
        match self.render_to(&mut adapter, data) {
            Err(RenderError::Write(_)) => Err(adapter
                .error
                .take()
                .map_or(RenderError::Write(fmt::Error), RenderError::Io)),
            other => other,
        }
    }
}

/// Bridges `fmt::Write` onto `io::Write`, keeping the real io error.
struct IoAdapter<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W: io::Write> fmt::Write for IoAdapter<W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}
