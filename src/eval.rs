use crate::ast::*;
use crate::error::RenderError;
use crate::escape::escape_html;
use serde_json::Value;
use std::borrow::Cow;
use std::fmt::Write;

/// Falsy values are `null`, `false` and the empty string; everything
/// else, numeric zero included, is truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// The text written for a value, or `None` for null.
pub fn to_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s)),
        other => Some(Cow::Owned(other.to_string())),
    }
}

/// One member access: object key or array index.
fn member<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn lookup<'v>(value: &'v Value, segments: &[String]) -> Option<&'v Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| member(current, segment))
}

/// Synthetic values visible inside one `each` iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IterationMeta {
    pub index: usize,
    pub first: bool,
    pub last: bool,
}

impl IterationMeta {
    pub fn new(index: usize, len: usize) -> Self {
        Self {
            index,
            first: index == 0,
            last: index + 1 == len,
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "@index" => Some(Value::from(self.index)),
            "@first" => Some(Value::Bool(self.first)),
            "@last" => Some(Value::Bool(self.last)),
            _ => None,
        }
    }
}

struct Frame<'a> {
    value: Cow<'a, Value>,
    meta: Option<IterationMeta>,
}

/// Scope stack for one render. The outermost frame is the render data.
pub struct Context<'a> {
    frames: Vec<Frame<'a>>,
    iteration_metadata: bool,
}

impl<'a> Context<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self {
            frames: vec![Frame {
                value: Cow::Borrowed(data),
                meta: None,
            }],
            iteration_metadata: true,
        }
    }

    /// Turns `@index`/`@first`/`@last` on or off for `each` frames.
    pub fn with_iteration_metadata(mut self, enabled: bool) -> Self {
        self.iteration_metadata = enabled;
        self
    }

    pub fn push(&mut self, value: Cow<'a, Value>, meta: Option<IterationMeta>) {
        self.frames.push(Frame { value, meta });
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Runs `f` inside a new frame, popping it whatever `f` returns.
    pub fn scoped<T>(
        &mut self,
        value: Cow<'a, Value>,
        meta: Option<IterationMeta>,
        f: impl FnOnce(&mut Self) -> T,
    ) -> T {
        self.push(value, meta);
        let result = f(self);
        self.pop();
        result
    }

    /// Resolves `path` against the innermost frame only.
    ///
    /// Single-segment paths see the frame's iteration metadata before the
    /// bound value's members.
    pub fn get_value(&self, path: &Path) -> Option<Cow<'a, Value>> {
        let frame = self.frames.last()?;
        let segments = path.segments();

        if let [name] = segments {
            if let Some(meta) = frame.meta.as_ref().and_then(|m| m.get(name)) {
                return Some(Cow::Owned(meta));
            }
        }

        match &frame.value {
            Cow::Borrowed(value) => lookup(*value, segments).map(Cow::Borrowed),
            Cow::Owned(value) => lookup(value, segments).cloned().map(Cow::Owned),
        }
    }

    /// Resolves `path` to a sequence; anything else is empty.
    pub fn get_values(&self, path: &Path) -> Vec<Cow<'a, Value>> {
        match self.get_value(path) {
            Some(Cow::Borrowed(Value::Array(items))) => items.iter().map(Cow::Borrowed).collect(),
            Some(Cow::Owned(Value::Array(items))) => items.into_iter().map(Cow::Owned).collect(),
            _ => Vec::new(),
        }
    }
}

impl Node {
    /// Appends this node's output to `out`; the context depth is the same
    /// before and after, even on error.
    pub fn write(&self, out: &mut dyn Write, ctx: &mut Context<'_>) -> Result<(), RenderError> {
        match self {
            Node::Text(s) => out.write_str(s)?,
            Node::Expression(path) => {
                if let Some(value) = ctx.get_value(path) {
                    if let Some(text) = to_text(&value) {
                        out.write_str(&escape_html(&text))?;
                    }
                }
            }
            Node::UnescapedExpression(path) => {
                if let Some(value) = ctx.get_value(path) {
                    if let Some(text) = to_text(&value) {
                        out.write_str(&text)?;
                    }
                }
            }
            Node::Container(children) => {
                for child in children {
                    child.write(out, ctx)?;
                }
            }
            Node::If {
                path,
                then,
                otherwise,
            } => {
                if is_truthy(ctx.get_value(path).as_deref()) {
                    then.write(out, ctx)?;
                } else {
                    otherwise.write(out, ctx)?;
                }
            }
            Node::Unless {
                path,
                then,
                otherwise,
            } => {
                if is_truthy(ctx.get_value(path).as_deref()) {
                    otherwise.write(out, ctx)?;
                } else {
                    then.write(out, ctx)?;
                }
            }
            Node::With { path, body } => {
                if let Some(value) = ctx.get_value(path).filter(|v| !v.is_null()) {
                    ctx.scoped(value, None, |ctx| body.write(out, ctx))?;
                }
            }
            Node::Each { path, body } => {
                let items = ctx.get_values(path);
                let len = items.len();
                let with_meta = ctx.iteration_metadata;
                for (index, item) in items.into_iter().enumerate() {
                    let meta = with_meta.then(|| IterationMeta::new(index, len));
                    ctx.scoped(item, meta, |ctx| body.write(out, ctx))?;
                }
            }
        }
        Ok(())
    }
}
