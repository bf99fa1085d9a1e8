/// A dotted path such as `person.name`, parsed once at compile time.
///
/// No segments means the current frame's own value (`this`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    raw: String,
    segments: Vec<String>,
}

impl Path {
    pub fn parse(expr: &str) -> Self {
        let raw = expr.trim();
        let rest = match raw {
            "" | "this" | "." => "",
            _ => raw.strip_prefix("this.").unwrap_or(raw),
        };
        let segments = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('.').map(str::to_string).collect()
        };
        Self {
            raw: raw.to_string(),
            segments,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_this(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl From<&str> for Path {
    fn from(expr: &str) -> Self {
        Path::parse(expr)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Expression(Path),          // {{path}}
    UnescapedExpression(Path), // {{{path}}}
    Container(Vec<Node>),
    If {
        path: Path,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Unless {
        path: Path,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
    Each {
        path: Path,
        body: Box<Node>,
    },
    With {
        path: Path,
        body: Box<Node>,
    },
}

impl Node {
    /// The no-op branch.
    pub fn empty() -> Self {
        Node::Container(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_segments() {
        assert_eq!(Path::parse(" a.b.c ").segments(), ["a", "b", "c"]);
        assert_eq!(Path::parse("name").segments(), ["name"]);
        assert_eq!(Path::parse("this.name").segments(), ["name"]);
        assert_eq!(Path::parse("@index").segments(), ["@index"]);
    }

    #[test]
    fn this_paths() {
        for expr in ["", "  ", "this", " this ", "."] {
            assert!(Path::parse(expr).is_this(), "{expr:?}");
        }
        assert!(!Path::parse("thistle").is_this());
    }

    #[test]
    fn raw_text_is_trimmed() {
        assert_eq!(Path::parse("  a.b ").as_str(), "a.b");
    }
}
