// camt.053 - Bank to Customer Statement
// One Stmt block: ordered balances, ordered entries, nested details.

use super::common;
use super::xml;
use crate::models::AccountStatement;

pub fn extract(content: &str) -> AccountStatement {
    let mut record = AccountStatement::default();

    let root = match xml::parse(content) {
        Ok(root) => root,
        Err(e) => {
            record
                .diagnostics
                .record("document", format!("XML parse error: {}", e));
            return record;
        }
    };

    record.message_id = root.child_text("MsgId");

    let stmt = match root.find_first("Stmt") {
        Some(stmt) => stmt,
        None => {
            record.diagnostics.record("statement", "no Stmt block found");
            return record;
        }
    };

    record.statement_id = stmt.child_text("Id");

    if let Some(text) = stmt.child_text("ElctrncSeqNb") {
        match text.parse::<i64>() {
            Ok(n) => record.sequence_number = Some(n),
            Err(_) => record
                .diagnostics
                .record("elctrnc_seq_nb", format!("bad sequence number: {}", text)),
        }
    }

    if let Some(acct) = stmt.find_first("Acct") {
        record.account_id = common::account_id(acct);
        record.account_currency = acct.child_text("Ccy");
    }

    // Partial balances are dropped, not flagged.
    record.balances = stmt
        .find_all("Bal")
        .into_iter()
        .filter_map(common::balance)
        .collect();

    let mut entries = Vec::new();
    for ntry in stmt.find_all("Ntry") {
        if let Some(entry) = common::statement_entry(ntry, &mut record.diagnostics) {
            entries.push(entry);
        }
    }
    record.entries = entries;

    record
}
