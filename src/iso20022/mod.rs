// ISO 20022 Message Support Module
// Namespace-agnostic navigation, classification, and per-type extraction

pub mod xml; // Navigation primitives (must be first)
pub mod classifier;
pub mod common; // Shared field resolvers
pub mod pacs008; // FIToFICustomerCreditTransfer
pub mod pacs009; // FICreditTransfer (cover payment)
pub mod camt053; // BankToCustomerStatement
pub mod camt054; // BankToCustomerDebitCreditNotification
pub mod camt056; // FIToFIPaymentCancellationRequest

// Re-exports for convenience
pub use classifier::{canonical_type, classify, Classification, UNDETECTED};
pub use xml::{parse, XmlNode};

use crate::models::{ExtractedMessage, MessageType};

/// Run the extractor matching an already-classified message type.
/// Extraction is infallible: per-field problems accumulate in the returned
/// record's diagnostics instead of surfacing as errors.
pub fn extract(msg_type: MessageType, content: &str) -> ExtractedMessage {
    match msg_type {
        MessageType::Pacs008 => ExtractedMessage::Payment(pacs008::extract(content)),
        MessageType::Pacs009 => ExtractedMessage::Payment(pacs009::extract(content)),
        MessageType::Camt053 => ExtractedMessage::Statement(camt053::extract(content)),
        MessageType::Camt054 => ExtractedMessage::Notification(camt054::extract(content)),
        MessageType::Camt056 => ExtractedMessage::Cancellation(camt056::extract(content)),
    }
}
