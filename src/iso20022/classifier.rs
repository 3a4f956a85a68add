// Message-type detection from the business application header.

use super::xml;
use crate::models::MessageType;

/// Tag used in logs and pass summaries when no type could be derived.
pub const UNDETECTED: &str = "undetected";

/// Routing decision for one staging file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// One of the five imported message families.
    Supported(MessageType),
    /// A well-formed message definition identifier this service does not
    /// import (e.g. `pain.001`). Passed through, never an error.
    Unsupported(String),
    /// Unparseable XML, missing header, or a malformed identifier.
    Undetected,
}

/// Canonical two-segment type from `MsgDefIdr` anywhere in the document:
/// `pacs.008.001.08` -> `pacs.008`. Total over arbitrary byte streams -
/// anything unreadable maps to `None`, never an error.
pub fn canonical_type(xml_text: &str) -> Option<String> {
    let root = xml::parse(xml_text).ok()?;
    let identifier = if root.name() == "MsgDefIdr" {
        root.text().map(str::to_string)
    } else {
        root.child_text("MsgDefIdr")
    }?;

    let mut segments = identifier.split('.');
    let family = segments.next().filter(|s| !s.is_empty())?;
    let version = segments.next().filter(|s| !s.is_empty())?;
    Some(format!("{}.{}", family, version))
}

pub fn classify(xml_text: &str) -> Classification {
    match canonical_type(xml_text) {
        Some(tag) => match MessageType::from_tag(&tag) {
            Some(msg_type) => Classification::Supported(msg_type),
            None => Classification::Unsupported(tag),
        },
        None => Classification::Undetected,
    }
}
