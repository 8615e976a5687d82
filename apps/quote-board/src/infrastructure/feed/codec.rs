//! Feed Document Codec
//!
//! Decodes one inbound text payload into a [`FeedDocument`]. The XML tree is
//! walked once; every `<instr>` at any depth becomes a snippet, in the order
//! its start tag appears.
//!
//! ```text
//! <document>
//!   <instr sym=".." descr="..">
//!     <quotes><b p=".." q=".."/>* <a p=".." q=".."/>*</quotes>
//!     <trades><t p=".." q=".."/>*</trades>
//!   </instr>*
//! </document>
//! ```

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use crate::domain::instrument::{FeedDocument, InstrumentSnippet, RawTick, Relation};

/// Codec errors. Any of these drops the whole message.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The XML reader rejected the payload.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// An attribute could not be read.
    #[error("attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// An attribute value holds an invalid escape.
    #[error("escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),

    /// Names or values are not UTF-8.
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// The payload has no root element.
    #[error("document has no root element")]
    Empty,

    /// The payload ended with open elements.
    #[error("document ended inside <{0}>")]
    Unterminated(String),

    /// Markup or text follows the root element.
    #[error("content after the root element")]
    TrailingContent,
}

/// XML codec for feed messages.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlCodec;

/// An instrument whose element is still open.
struct OpenInstrument {
    /// Depth of the `<instr>` element itself.
    depth: usize,
    /// Index into the snippet list.
    index: usize,
}

impl XmlCodec {
    /// Create a codec.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Decode one message.
    ///
    /// # Errors
    ///
    /// Returns an error when the payload is not a single well-formed XML
    /// document.
    pub fn decode(&self, text: &str) -> Result<FeedDocument, CodecError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut snippets: Vec<InstrumentSnippet> = Vec::new();
        let mut path: Vec<String> = Vec::new();
        let mut instruments: Vec<OpenInstrument> = Vec::new();
        let mut saw_root = false;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if saw_root && path.is_empty() {
                        return Err(CodecError::TrailingContent);
                    }
                    saw_root = true;
                    let name = element_name(&e)?;
                    Self::visit(&e, &name, &path, &mut snippets, &mut instruments)?;
                    path.push(name);
                }
                Event::Empty(e) => {
                    if saw_root && path.is_empty() {
                        return Err(CodecError::TrailingContent);
                    }
                    saw_root = true;
                    let name = element_name(&e)?;
                    Self::visit(&e, &name, &path, &mut snippets, &mut instruments)?;
                    // Self-closing: nothing stays open.
                    if instruments.last().is_some_and(|i| i.depth == path.len()) {
                        instruments.pop();
                    }
                }
                Event::End(_) => {
                    path.pop();
                    if instruments.last().is_some_and(|i| i.depth == path.len()) {
                        instruments.pop();
                    }
                }
                Event::Text(e) if saw_root && path.is_empty() => {
                    if e.iter().any(|b| !b.is_ascii_whitespace()) {
                        return Err(CodecError::TrailingContent);
                    }
                }
                Event::CData(_) | Event::GeneralRef(_) if saw_root && path.is_empty() => {
                    return Err(CodecError::TrailingContent);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = path.pop() {
            return Err(CodecError::Unterminated(open));
        }
        if !saw_root {
            return Err(CodecError::Empty);
        }

        Ok(FeedDocument::new(snippets))
    }

    /// Handle an element opening at depth `path.len()`.
    fn visit(
        e: &BytesStart<'_>,
        name: &str,
        path: &[String],
        snippets: &mut Vec<InstrumentSnippet>,
        instruments: &mut Vec<OpenInstrument>,
    ) -> Result<(), CodecError> {
        if name == "instr" {
            let mut snippet = InstrumentSnippet::default();
            for attr in e.attributes() {
                let attr = attr?;
                match attr.key.local_name().as_ref() {
                    b"sym" => snippet.symbol = Some(attr_value(&attr.value)?),
                    b"descr" => snippet.description = Some(attr_value(&attr.value)?),
                    _ => {}
                }
            }
            instruments.push(OpenInstrument {
                depth: path.len(),
                index: snippets.len(),
            });
            snippets.push(snippet);
            return Ok(());
        }

        let Some(relation) = tick_relation(name, path) else {
            return Ok(());
        };
        // The tick's grandparent must be the innermost open <instr>.
        let Some(open) = instruments.last() else {
            return Ok(());
        };
        if open.depth + 2 != path.len() {
            return Ok(());
        }

        let mut tick = RawTick::default();
        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.local_name().as_ref() {
                b"p" => tick.price = Some(attr_value(&attr.value)?),
                b"q" => tick.quantity = Some(attr_value(&attr.value)?),
                _ => {}
            }
        }

        let snippet = &mut snippets[open.index];
        match relation {
            Relation::Bids => snippet.bids.push(tick),
            Relation::Asks => snippet.asks.push(tick),
            Relation::Trades => snippet.trades.push(tick),
        }
        Ok(())
    }
}

/// Which relation a tick element belongs to, given its parent.
fn tick_relation(name: &str, path: &[String]) -> Option<Relation> {
    let parent = path.last()?.as_str();
    match (parent, name) {
        ("quotes", "b") => Some(Relation::Bids),
        ("quotes", "a") => Some(Relation::Asks),
        ("trades", "t") => Some(Relation::Trades),
        _ => None,
    }
}

fn element_name(e: &BytesStart<'_>) -> Result<String, CodecError> {
    Ok(std::str::from_utf8(e.local_name().as_ref())?.to_string())
}

fn attr_value(raw: &[u8]) -> Result<String, CodecError> {
    let value = std::str::from_utf8(raw)?;
    Ok(unescape(value)?.into_owned())
}
