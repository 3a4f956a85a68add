// pacs.008 - FI to FI Customer Credit Transfer
// Direct customer transfer: debtor and creditor are person/company names.

use super::common;
use super::xml;
use crate::models::PaymentInstruction;

pub fn extract(content: &str) -> PaymentInstruction {
    let mut record = PaymentInstruction::default();

    let root = match xml::parse(content) {
        Ok(root) => root,
        Err(e) => {
            record
                .diagnostics
                .record("document", format!("XML parse error: {}", e));
            return record;
        }
    };

    record.sender_name = root.find_first("Dbtr").and_then(|d| d.child_text("Nm"));
    record.receiver_name = root.find_first("Cdtr").and_then(|c| c.child_text("Nm"));

    if let Some(amt_el) = root.find_first("IntrBkSttlmAmt") {
        let money = common::monetary_amount(amt_el, "amount", &mut record.diagnostics);
        record.amount = money.amount;
        record.currency = money.currency;
    }

    record.value_date = common::value_date(&root, &mut record.diagnostics);
    record.reference = common::reference_code(&root);
    record.remittance_info = root.child_text("Ustrd");

    record.sender_account = root.find_first("DbtrAcct").and_then(common::account_id);
    record.receiver_account = root.find_first("CdtrAcct").and_then(common::account_id);

    if let Some(agent) = root.find_first("DbtrAgt") {
        let institution = common::institution(agent);
        record.sender_bank = institution.bic;
        record.sender_bank_name = institution.name;
    }
    if let Some(agent) = root.find_first("CdtrAgt") {
        let institution = common::institution(agent);
        record.receiver_bank = institution.bic;
        record.receiver_bank_name = institution.name;
    }
    if let Some(agent) = root.find_first("InstgAgt") {
        let institution = common::institution(agent);
        record.intermediary_bank = institution.bic;
        record.intermediary_bank_name = institution.name;
        record.intermediary_bank_account = institution.member_id;
    }

    if !record.has_key_fields() {
        record
            .diagnostics
            .record("document", "no key fields extracted");
    }

    record
}
