// Namespace-agnostic XML access.
//
// The five message families (and their versions) declare different
// namespaces for structurally identical tags, so every lookup here matches
// on the local-name suffix only and ignores prefixes and namespace URIs.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("malformed XML: {0}")]
pub struct XmlError(String);

/// One parsed element: local name, attributes, text content, children in
/// document order.
#[derive(Debug, Clone, Default)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<XmlNode>,
}

/// Parse a whole document into a tree. Total over arbitrary input:
/// malformed, truncated, or multi-rooted text is an error, never a panic.
pub fn parse(xml: &str) -> Result<XmlNode, XmlError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(node_from(&e)?),
            Ok(Event::Empty(e)) => {
                let node = node_from(&e)?;
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::End(_)) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| XmlError("unbalanced end tag".to_string()))?;
                attach(node, &mut stack, &mut root)?;
            }
            Ok(Event::Text(t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t.unescape().map_err(|e| XmlError(e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(t)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(XmlError(e.to_string())),
        }
    }

    if !stack.is_empty() {
        return Err(XmlError("truncated document".to_string()));
    }
    root.ok_or_else(|| XmlError("no root element".to_string()))
}

fn node_from(e: &BytesStart<'_>) -> Result<XmlNode, XmlError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| XmlError(e.to_string()))?;
        let key = local_name(attr.key.as_ref());
        let value = attr
            .unescape_value()
            .map_err(|e| XmlError(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(XmlNode {
        name: local_name(e.name().as_ref()),
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

fn attach(
    node: XmlNode,
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
) -> Result<(), XmlError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
        Ok(())
    } else if root.is_none() {
        *root = Some(node);
        Ok(())
    } else {
        Err(XmlError("multiple root elements".to_string()))
    }
}

/// Strip any `prefix:` from a qualified tag or attribute name.
fn local_name(raw: &[u8]) -> String {
    let start = raw
        .iter()
        .rposition(|&b| b == b':')
        .map(|i| i + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&raw[start..]).into_owned()
}

impl XmlNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Trimmed text content. Empty or whitespace-only text normalizes to
    /// `None`.
    pub fn text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }

    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local)
            .map(|(_, v)| v.as_str())
    }

    /// First descendant with the given local name, document order. The
    /// search excludes the node itself; no match is a normal outcome.
    pub fn find_first(&self, local: &str) -> Option<&XmlNode> {
        for child in &self.children {
            if child.name == local {
                return Some(child);
            }
            if let Some(found) = child.find_first(local) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, document order.
    pub fn find_all(&self, local: &str) -> Vec<&XmlNode> {
        let mut out = Vec::new();
        self.collect_named(local, &mut out);
        out
    }

    fn collect_named<'a>(&'a self, local: &str, out: &mut Vec<&'a XmlNode>) {
        for child in &self.children {
            if child.name == local {
                out.push(child);
            }
            child.collect_named(local, out);
        }
    }

    /// Trimmed text of the first matching descendant.
    pub fn child_text(&self, local: &str) -> Option<String> {
        self.find_first(local)
            .and_then(|n| n.text())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_local_names_across_prefixes() {
        let doc = parse(
            r#"<Envelope xmlns="urn:swift:xsd:envelope">
                <head:AppHdr xmlns:head="urn:iso:std:iso:20022:tech:xsd:head.001.001.02">
                    <head:MsgDefIdr>pacs.008.001.08</head:MsgDefIdr>
                </head:AppHdr>
                <pacs:Document xmlns:pacs="urn:iso:std:iso:20022:tech:xsd:pacs.008.001.08">
                    <pacs:Dbtr><pacs:Nm>A Capone</pacs:Nm></pacs:Dbtr>
                </pacs:Document>
            </Envelope>"#,
        )
        .unwrap();

        assert_eq!(doc.child_text("MsgDefIdr").unwrap(), "pacs.008.001.08");
        assert_eq!(
            doc.find_first("Dbtr").unwrap().child_text("Nm").unwrap(),
            "A Capone"
        );
    }

    #[test]
    fn find_first_walks_in_document_order() {
        let doc = parse(
            "<Ntry><Amt Ccy=\"NOK\">2365000</Amt>\
             <NtryDtls><TxDtls><Amt Ccy=\"NOK\">100</Amt></TxDtls></NtryDtls></Ntry>",
        )
        .unwrap();

        let amt = doc.find_first("Amt").unwrap();
        assert_eq!(amt.text().unwrap(), "2365000");
        assert_eq!(amt.attribute("Ccy").unwrap(), "NOK");
        assert_eq!(doc.find_all("Amt").len(), 2);
    }

    #[test]
    fn search_excludes_the_parent_itself() {
        let doc = parse("<Dt><Dt>2021-06-03</Dt></Dt>").unwrap();
        // The outer container is the root; its lookup must reach the nested
        // element, not answer with itself.
        assert_eq!(doc.child_text("Dt").unwrap(), "2021-06-03");
    }

    #[test]
    fn whitespace_only_text_is_none() {
        let doc = parse("<Doc><Nm>   </Nm><Id>x</Id></Doc>").unwrap();
        assert!(doc.child_text("Nm").is_none());
        assert_eq!(doc.child_text("Id").unwrap(), "x");
    }

    #[test]
    fn malformed_input_is_an_error_not_a_panic() {
        assert!(parse("not xml at all").is_err());
        assert!(parse("<Open><Never>").is_err());
        assert!(parse("<A></B>").is_err());
        assert!(parse("").is_err());
    }
}
