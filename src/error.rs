//! Error types for compiling and rendering templates.
//!
//! Compile errors carry the span of the offending tag so callers can feed
//! them to miette together with the template source:
//!
//! ```ignore
//! let report = miette::Report::new(err).with_source_code(source.to_string());
//! ```

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result alias for the crate-level [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Any failure surfaced by the crate-root helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to read template: {0}")]
    Io(#[from] std::io::Error),
}

/// A template that could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    NotSupported(#[from] NotSupportedError),
}

impl CompileError {
    /// Location of the offending token in the template source.
    pub fn span(&self) -> SourceSpan {
        match self {
            CompileError::Format(e) => e.span(),
            CompileError::NotSupported(e) => e.span,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, CompileError::Format(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, CompileError::NotSupported(_))
    }
}

/// Malformed template text: broken delimiters or unbalanced blocks.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum FormatError {
    #[error("expression is not closed")]
    #[diagnostic(
        code(shimmybars::format::unclosed_expression),
        help("close the expression with as many `}}` as it was opened with")
    )]
    UnclosedExpression {
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("empty expression")]
    #[diagnostic(code(shimmybars::format::empty_expression))]
    EmptyExpression {
        #[label("nothing between the braces")]
        span: SourceSpan,
    },

    #[error("too many opening braces")]
    #[diagnostic(
        code(shimmybars::format::too_many_braces),
        help("use `{{{{` for escaped or `{{{{{{` for unescaped output")
    )]
    TooManyBraces {
        #[label("a fourth `{{` starts here")]
        span: SourceSpan,
    },

    #[error("unbalanced blocks")]
    #[diagnostic(code(shimmybars::format::unbalanced_blocks))]
    UnbalancedBlocks {
        #[label("no open block to close")]
        span: SourceSpan,
    },

    #[error("unmatched close tag: expected `{{{{/{expected}}}}}`, found `{{{{/{found}}}}}`")]
    #[diagnostic(code(shimmybars::format::unmatched_close_tag))]
    UnmatchedCloseTag {
        expected: String,
        found: String,
        #[label("closes the wrong block")]
        span: SourceSpan,
    },

    #[error("invalid else usage")]
    #[diagnostic(
        code(shimmybars::format::invalid_else),
        help("`{{{{else}}}}` is only allowed directly inside `if` or `unless`")
    )]
    InvalidElse {
        #[label("here")]
        span: SourceSpan,
    },

    #[error("there is an unclosed `{keyword}` block")]
    #[diagnostic(code(shimmybars::format::unclosed_block))]
    UnclosedBlock {
        keyword: String,
        #[label("opened here")]
        span: SourceSpan,
    },
}

impl FormatError {
    pub fn span(&self) -> SourceSpan {
        match self {
            FormatError::UnclosedExpression { span }
            | FormatError::EmptyExpression { span }
            | FormatError::TooManyBraces { span }
            | FormatError::UnbalancedBlocks { span }
            | FormatError::UnmatchedCloseTag { span, .. }
            | FormatError::InvalidElse { span }
            | FormatError::UnclosedBlock { span, .. } => *span,
        }
    }
}

/// A block keyword the engine does not know.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("unsupported block '{keyword}'")]
#[diagnostic(
    code(shimmybars::not_supported),
    help("supported blocks: if, unless, each, with")
)]
pub struct NotSupportedError {
    pub keyword: String,
    #[label("unknown block")]
    pub span: SourceSpan,
}

/// Failures while rendering a compiled template.
///
/// Bytes written to the sink before the failure stay written.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write template output")]
    Write(#[from] std::fmt::Error),

    #[error("failed to write template output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to convert render data: {0}")]
    Data(#[from] serde_json::Error),
}
