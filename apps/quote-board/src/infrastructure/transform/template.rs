//! Transform description and its compiled form.
//!
//! The artifact is a JSON document with one entry per quoting side:
//!
//! ```json
//! { "bid": { "header": "<h4>bids</h4>", "row": "<p>{sym} {p} {q}</p>" },
//!   "ask": { "header": "<h4>asks</h4>", "row": "<p>{sym} {p} {q}</p>" } }
//! ```
//!
//! Row placeholders: `{sym}`, `{descr}`, `{p}`, `{q}`. `{{` and `}}` are
//! literal braces.

use quick_xml::escape::escape;
use serde::Deserialize;

use super::TransformError;
use crate::domain::instrument::{FeedDocument, Relation, Side, extract};

/// Raw artifact as authored.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSpec {
    /// Bid side rules.
    pub bid: SideSpec,
    /// Ask side rules.
    pub ask: SideSpec,
}

/// Rules for one side.
#[derive(Debug, Clone, Deserialize)]
pub struct SideSpec {
    /// Emitted once before the rows.
    #[serde(default)]
    pub header: String,
    /// Emitted once per tick.
    pub row: String,
    /// Emitted once after the rows.
    #[serde(default)]
    pub footer: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Symbol,
    Description,
    Price,
    Quantity,
}

impl Field {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "sym" => Some(Self::Symbol),
            "descr" => Some(Self::Description),
            "p" => Some(Self::Price),
            "q" => Some(Self::Quantity),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

#[derive(Debug, Clone)]
struct RowTemplate {
    segments: Vec<Segment>,
}

impl RowTemplate {
    fn compile(side: Side, source: &str) -> Result<Self, TransformError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(TransformError::UnclosedPlaceholder(side.as_str()));
                    }
                    let field = Field::parse(name.trim()).ok_or_else(|| {
                        TransformError::UnknownPlaceholder {
                            side: side.as_str(),
                            name: name.clone(),
                        }
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(field));
                }
                '}' => return Err(TransformError::UnmatchedBrace(side.as_str())),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    fn render_into(&self, out: &mut String, sym: &str, descr: &str, price: &str, quantity: &str) {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(Field::Symbol) => out.push_str(&escape(sym)),
                Segment::Field(Field::Description) => out.push_str(&escape(descr)),
                Segment::Field(Field::Price) => out.push_str(&escape(price)),
                Segment::Field(Field::Quantity) => out.push_str(&escape(quantity)),
            }
        }
    }
}

#[derive(Debug, Clone)]
struct SideTemplate {
    header: String,
    row: RowTemplate,
    footer: String,
}

impl SideTemplate {
    fn compile(side: Side, rules: SideSpec) -> Result<Self, TransformError> {
        Ok(Self {
            row: RowTemplate::compile(side, &rules.row)?,
            header: rules.header,
            footer: rules.footer,
        })
    }
}

/// A transform ready to apply to documents.
#[derive(Debug, Clone)]
pub struct CompiledTransform {
    bid: SideTemplate,
    ask: SideTemplate,
}

impl CompiledTransform {
    /// Parse and compile an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON or a malformed row template.
    pub fn compile(text: &str) -> Result<Self, TransformError> {
        let rules: TransformSpec = serde_json::from_str(text)?;
        Ok(Self {
            bid: SideTemplate::compile(Side::Bid, rules.bid)?,
            ask: SideTemplate::compile(Side::Ask, rules.ask)?,
        })
    }

    /// Produce the fragment for one side of a document.
    #[must_use]
    pub fn apply(&self, document: &FeedDocument, side: Side) -> String {
        let (template, relation) = match side {
            Side::Bid => (&self.bid, Relation::Bids),
            Side::Ask => (&self.ask, Relation::Asks),
        };

        let mut out = template.header.clone();
        for snippet in &document.snippets {
            let sym = snippet.symbol.as_deref().unwrap_or_default();
            let descr = snippet.description.as_deref().unwrap_or_default();
            for tick in extract(snippet, relation) {
                template
                    .row
                    .render_into(&mut out, sym, descr, tick.price(), tick.quantity());
            }
        }
        out.push_str(&template.footer);
        out
    }
}
