use crate::ast::*;
use crate::error::{CompileError, FormatError, NotSupportedError};
use crate::lexer::{Token, TokenKind, Tokenizer};
use miette::SourceSpan;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Root,
    If,
    Unless,
    Each,
    With,
}

impl BlockKind {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "if" => Some(BlockKind::If),
            "unless" => Some(BlockKind::Unless),
            "each" => Some(BlockKind::Each),
            "with" => Some(BlockKind::With),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            BlockKind::Root => "",
            BlockKind::If => "if",
            BlockKind::Unless => "unless",
            BlockKind::Each => "each",
            BlockKind::With => "with",
        }
    }
}

/// A block under construction; lives only until its close tag.
struct Block {
    kind: BlockKind,
    path: Path,
    span: SourceSpan,
    nodes: Vec<Node>,
    else_nodes: Vec<Node>,
    in_else: bool,
}

impl Block {
    fn new(kind: BlockKind, path: Path, span: SourceSpan) -> Self {
        Self {
            kind,
            path,
            span,
            nodes: Vec::new(),
            else_nodes: Vec::new(),
            in_else: false,
        }
    }

    fn push(&mut self, node: Node) {
        if self.in_else {
            self.else_nodes.push(node);
        } else {
            self.nodes.push(node);
        }
    }

    fn into_node(self) -> Node {
        let body = Box::new(Node::Container(self.nodes));
        let otherwise = Box::new(Node::Container(self.else_nodes));
        match self.kind {
            BlockKind::Root => *body,
            BlockKind::With => Node::With {
                path: self.path,
                body,
            },
            BlockKind::Each => Node::Each {
                path: self.path,
                body,
            },
            BlockKind::If => Node::If {
                path: self.path,
                then: body,
                otherwise,
            },
            BlockKind::Unless => Node::Unless {
                path: self.path,
                then: body,
                otherwise,
            },
        }
    }
}

pub struct Parser<I: Iterator<Item = char>> {
    lexer: Tokenizer<I>,
    root: Block,
    open: Vec<Block>,
}

impl<'a> Parser<std::str::Chars<'a>> {
    pub fn new(input: &'a str) -> Self {
        Self::from_tokenizer(Tokenizer::new(input))
    }
}

impl<I: Iterator<Item = char>> Parser<I> {
    pub fn from_tokenizer(lexer: Tokenizer<I>) -> Self {
        Self {
            lexer,
            root: Block::new(BlockKind::Root, Path::parse(""), (0, 0).into()),
            open: Vec::new(),
        }
    }

    fn active(&mut self) -> &mut Block {
        match self.open.last_mut() {
            Some(block) => block,
            None => &mut self.root,
        }
    }

    /// Consumes the whole token stream and returns the root container.
    pub fn parse(mut self) -> Result<Node, CompileError> {
        while let Some(token) = self.lexer.next_token()? {
            self.accept(token)?;
        }

        if let Some(block) = self.open.last() {
            return Err(FormatError::UnclosedBlock {
                keyword: block.kind.keyword().to_string(),
                span: block.span,
            }
            .into());
        }

        Ok(self.root.into_node())
    }

    fn accept(&mut self, token: Token) -> Result<(), CompileError> {
        let Token { kind, value, span } = token;

        if kind == TokenKind::Text {
            self.active().push(Node::Text(value));
            return Ok(());
        }

        if let Some(rest) = value.strip_prefix('#') {
            self.open_block(rest, span)
        } else if let Some(rest) = value.strip_prefix('/') {
            self.close_block(rest.trim(), span)
        } else if value == "else" {
            let block = self.active();
            match block.kind {
                BlockKind::If | BlockKind::Unless => {
                    block.in_else = true;
                    Ok(())
                }
                _ => Err(FormatError::InvalidElse { span }.into()),
            }
        } else {
            let path = Path::parse(&value);
            let node = match kind {
                TokenKind::UnescapedExpression => Node::UnescapedExpression(path),
                _ => Node::Expression(path),
            };
            self.active().push(node);
            Ok(())
        }
    }

    fn open_block(&mut self, tag: &str, span: SourceSpan) -> Result<(), CompileError> {
        let (keyword, expr) = match tag.find(char::is_whitespace) {
            Some(idx) => (&tag[..idx], &tag[idx..]),
            None => (tag, ""),
        };

        let kind = BlockKind::from_keyword(keyword).ok_or_else(|| NotSupportedError {
            keyword: keyword.to_string(),
            span,
        })?;

        trace!(block = keyword, path = expr.trim(), "opening block");
        self.open.push(Block::new(kind, Path::parse(expr), span));
        Ok(())
    }

    fn close_block(&mut self, name: &str, span: SourceSpan) -> Result<(), CompileError> {
        let Some(block) = self.open.pop() else {
            return Err(FormatError::UnbalancedBlocks { span }.into());
        };

        if block.kind.keyword() != name {
            return Err(FormatError::UnmatchedCloseTag {
                expected: block.kind.keyword().to_string(),
                found: name.to_string(),
                span,
            }
            .into());
        }

        trace!(block = name, "closing block");
        let node = block.into_node();
        self.active().push(node);
        Ok(())
    }
}
