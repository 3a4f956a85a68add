// Canonical extraction records - internal representation
// One fixed-shape record per supported ISO 20022 message family.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Canonical two-segment message type tags this service imports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Pacs008,
    Pacs009,
    Camt053,
    Camt054,
    Camt056,
}

impl MessageType {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "pacs.008" => Some(MessageType::Pacs008),
            "pacs.009" => Some(MessageType::Pacs009),
            "camt.053" => Some(MessageType::Camt053),
            "camt.054" => Some(MessageType::Camt054),
            "camt.056" => Some(MessageType::Camt056),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            MessageType::Pacs008 => "pacs.008",
            MessageType::Pacs009 => "pacs.009",
            MessageType::Camt053 => "camt.053",
            MessageType::Camt054 => "camt.054",
            MessageType::Camt056 => "camt.056",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// One classified staging file, about to become either a header row or a
/// quarantined artifact.
#[derive(Debug, Clone)]
pub struct RawMessage {
    pub file_name: String,
    pub content: String,
    pub msg_type: MessageType,
    pub received_at: DateTime<Utc>,
}

/// Per-field extraction problems, accumulated while the remaining fields are
/// still extracted. Serialized to a single text column only at the
/// persistence boundary.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    issues: Vec<FieldIssue>,
}

#[derive(Debug, Clone)]
pub struct FieldIssue {
    pub field: &'static str,
    pub detail: String,
}

impl Diagnostics {
    pub fn record(&mut self, field: &'static str, detail: impl Into<String>) {
        self.issues.push(FieldIssue {
            field,
            detail: detail.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Flatten to the text persisted in the header row's error column.
    pub fn to_text(&self) -> Option<String> {
        if self.issues.is_empty() {
            return None;
        }
        Some(
            self.issues
                .iter()
                .map(|i| format!("{}: {}", i.field, i.detail))
                .collect::<Vec<_>>()
                .join(" | "),
        )
    }
}

/// pacs.008 / pacs.009 projection. For pacs.008 the sender/receiver are
/// customer names; for pacs.009 they are the debtor/creditor bank BICs and
/// the real customers, when present, live in `underlying`.
#[derive(Debug, Clone, Default)]
pub struct PaymentInstruction {
    pub sender_name: Option<String>,
    pub receiver_name: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub value_date: Option<NaiveDate>,
    pub reference: Option<String>,
    pub remittance_info: Option<String>,
    pub sender_account: Option<String>,
    pub receiver_account: Option<String>,
    pub sender_bank: Option<String>,
    pub sender_bank_name: Option<String>,
    pub receiver_bank: Option<String>,
    pub receiver_bank_name: Option<String>,
    pub intermediary_bank: Option<String>,
    pub intermediary_bank_name: Option<String>,
    pub intermediary_bank_account: Option<String>,
    pub instructed_agent: Option<String>,
    pub instructed_agent_name: Option<String>,
    pub underlying: Option<UnderlyingCustomerTransfer>,
    pub diagnostics: Diagnostics,
}

impl PaymentInstruction {
    /// The record counts as an overall failure only when every key field is
    /// missing; anything less is a partial extraction with diagnostics.
    pub fn has_key_fields(&self) -> bool {
        self.sender_name.is_some()
            || self.receiver_name.is_some()
            || self.amount.is_some()
            || self.currency.is_some()
            || self.value_date.is_some()
    }
}

/// Real originator/beneficiary carried inside a pacs.009 cover payment.
#[derive(Debug, Clone, Default)]
pub struct UnderlyingCustomerTransfer {
    pub debtor_name: Option<String>,
    pub debtor_account: Option<String>,
    pub debtor_agent: Option<String>,
    pub creditor_name: Option<String>,
    pub creditor_account: Option<String>,
    pub creditor_agent: Option<String>,
}

/// camt.053 statement projection.
#[derive(Debug, Clone, Default)]
pub struct AccountStatement {
    pub message_id: Option<String>,
    pub statement_id: Option<String>,
    pub sequence_number: Option<i64>,
    pub account_id: Option<String>,
    pub account_currency: Option<String>,
    pub balances: Vec<Balance>,
    pub entries: Vec<StatementEntry>,
    pub diagnostics: Diagnostics,
}

/// A statement balance. Constructed only when type code, amount, indicator,
/// and date are all present.
#[derive(Debug, Clone)]
pub struct Balance {
    pub type_code: String,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub credit_debit: String,
    pub as_of_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct StatementEntry {
    pub entry_reference: Option<String>,
    pub servicer_reference: Option<String>,
    pub amount: Decimal,
    pub currency: Option<String>,
    pub credit_debit: String,
    pub status: String,
    pub booking_date: Option<NaiveDate>,
    pub value_date: Option<NaiveDate>,
    pub domain_code: Option<String>,
    pub family_code: Option<String>,
    pub sub_family_code: Option<String>,
    pub details: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionDetail {
    pub instruction_id: Option<String>,
    pub end_to_end_id: Option<String>,
    pub uetr: Option<Uuid>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub credit_debit: Option<String>,
    pub settlement_date: Option<NaiveDate>,
}

/// camt.054 projection. A single message may carry several notification
/// blocks; each is extracted independently.
#[derive(Debug, Clone, Default)]
pub struct NotificationReport {
    pub message_id: Option<String>,
    pub notifications: Vec<Notification>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Clone, Default)]
pub struct Notification {
    pub notification_id: Option<String>,
    pub account_id: Option<String>,
    pub account_currency: Option<String>,
    pub entries: Vec<StatementEntry>,
}

/// camt.056 payment-cancellation case.
#[derive(Debug, Clone, Default)]
pub struct CancellationCase {
    pub case_id: Option<String>,
    pub assigner_bic: Option<String>,
    pub original_message_id: Option<String>,
    pub original_message_name: Option<String>,
    pub original_instruction_id: Option<String>,
    pub original_end_to_end_id: Option<String>,
    pub original_transaction_id: Option<String>,
    pub original_uetr: Option<Uuid>,
    pub reason_code: Option<String>,
    pub reason_info: Option<String>,
    pub diagnostics: Diagnostics,
}

/// Tagged extraction result, one variant per persistence shape.
#[derive(Debug, Clone)]
pub enum ExtractedMessage {
    Payment(PaymentInstruction),
    Statement(AccountStatement),
    Notification(NotificationReport),
    Cancellation(CancellationCase),
}

impl ExtractedMessage {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            ExtractedMessage::Payment(p) => &p.diagnostics,
            ExtractedMessage::Statement(s) => &s.diagnostics,
            ExtractedMessage::Notification(n) => &n.diagnostics,
            ExtractedMessage::Cancellation(c) => &c.diagnostics,
        }
    }
}
