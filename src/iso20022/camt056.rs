// camt.056 - FI to FI Payment Cancellation Request
// Case assignment plus the referenced original transaction. No collections.

use super::common;
use super::xml;
use crate::models::CancellationCase;

pub fn extract(content: &str) -> CancellationCase {
    let mut record = CancellationCase::default();

    let root = match xml::parse(content) {
        Ok(root) => root,
        Err(e) => {
            record
                .diagnostics
                .record("document", format!("XML parse error: {}", e));
            return record;
        }
    };

    // Some producers wrap the assignment as CaseAssgnmt instead of Assgnmt.
    let assignment = root
        .find_first("CaseAssgnmt")
        .or_else(|| root.find_first("Assgnmt"));

    if let Some(assignment) = assignment {
        record.case_id = assignment.child_text("Id");
        record.assigner_bic = assignment
            .find_first("Assgnr")
            .and_then(|a| a.find_first("Agt"))
            .and_then(|agt| common::institution(agt).bic);
    }

    if let Some(underlying) = root.find_first("Undrlyg") {
        if let Some(group) = underlying.find_first("OrgnlGrpInfAndSts") {
            record.original_message_id = group.child_text("OrgnlMsgId");
            record.original_message_name = group.child_text("OrgnlMsgNmId");
        }

        if let Some(tx) = underlying.find_first("TxInf") {
            record.original_instruction_id = tx.child_text("OrgnlInstrId");
            record.original_end_to_end_id = tx.child_text("OrgnlEndToEndId");
            record.original_transaction_id = tx.child_text("OrgnlTxId");

            if let Some(text) = tx.child_text("OrgnlUETR") {
                record.original_uetr =
                    common::validated_uetr(&text, "orgnl_uetr", &mut record.diagnostics);
            }

            if let Some(reason_info) = tx.find_first("CxlRsnInf") {
                record.reason_code = reason_info
                    .find_first("Rsn")
                    .and_then(|r| r.child_text("Cd"));
                record.reason_info = reason_info.child_text("AddtlInf");
            }
        }
    }

    record
}
