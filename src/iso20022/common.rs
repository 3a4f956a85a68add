// Shared field resolvers used by all five extractors.
//
// Extraction is best-effort per field: a resolver that cannot read a value
// returns None and, where the text was present but unusable, records a
// diagnostic on the record being built.

use super::xml::XmlNode;
use crate::models::{Balance, Diagnostics, StatementEntry, TransactionDetail};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

pub struct MonetaryAmount {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
}

/// Exact decimal from an amount element's text, currency from its `Ccy`
/// attribute. A parse failure yields a null amount plus a diagnostic.
pub fn monetary_amount(
    node: &XmlNode,
    field: &'static str,
    diagnostics: &mut Diagnostics,
) -> MonetaryAmount {
    let currency = node.attribute("Ccy").map(str::to_string);
    let amount = match node.text() {
        Some(text) => match text.parse::<Decimal>() {
            Ok(value) => Some(value),
            Err(_) => {
                diagnostics.record(field, format!("bad amount: {}", text));
                None
            }
        },
        None => None,
    };
    MonetaryAmount { amount, currency }
}

/// Account identifier: IBAN preferred, generic `Othr/Id` fallback.
pub fn account_id(node: &XmlNode) -> Option<String> {
    node.child_text("IBAN")
        .or_else(|| node.find_first("Othr").and_then(|o| o.child_text("Id")))
}

pub struct InstitutionRef {
    pub bic: Option<String>,
    pub name: Option<String>,
    pub member_id: Option<String>,
}

/// BIC, name, and clearing-system member id from an agent's `FinInstnId`.
pub fn institution(node: &XmlNode) -> InstitutionRef {
    match node.find_first("FinInstnId") {
        Some(fin) => InstitutionRef {
            bic: fin.child_text("BICFI"),
            name: fin.child_text("Nm"),
            member_id: fin
                .find_first("ClrSysMmbId")
                .and_then(|c| c.child_text("MmbId")),
        },
        None => InstitutionRef {
            bic: None,
            name: None,
            member_id: None,
        },
    }
}

/// ISO 8601 calendar date; failure is a recorded diagnostic, never an abort.
pub fn iso_date(
    text: &str,
    field: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            diagnostics.record(field, format!("bad date: {}", text));
            None
        }
    }
}

/// UETR values persist as canonical UUIDs or null, never as malformed text.
pub fn validated_uetr(
    text: &str,
    field: &'static str,
    diagnostics: &mut Diagnostics,
) -> Option<Uuid> {
    match Uuid::parse_str(text) {
        Ok(uetr) => Some(uetr),
        Err(_) => {
            diagnostics.record(field, format!("not a valid UUID: {}", text));
            None
        }
    }
}

/// Value date: explicit interbank settlement date, else the date part of the
/// message creation timestamp.
pub fn value_date(root: &XmlNode, diagnostics: &mut Diagnostics) -> Option<NaiveDate> {
    if let Some(text) = root.child_text("IntrBkSttlmDt") {
        return iso_date(&text, "dval", diagnostics);
    }
    let created = root.child_text("CreDtTm")?;
    let date_part: String = created.chars().take(10).collect();
    iso_date(&date_part, "dval", diagnostics)
}

/// Reference code: end-to-end id preferred, instruction id fallback.
pub fn reference_code(root: &XmlNode) -> Option<String> {
    root.child_text("EndToEndId")
        .or_else(|| root.child_text("InstrId"))
}

/// A balance is kept only when type code, amount, indicator, and date are
/// all present. Partial balances are dropped without a diagnostic.
pub fn balance(bal: &XmlNode) -> Option<Balance> {
    let type_code = bal.find_first("Tp").and_then(|tp| tp.child_text("Cd"))?;
    let amt_el = bal.find_first("Amt")?;
    let amount = amt_el.text()?.parse::<Decimal>().ok()?;
    let currency = amt_el.attribute("Ccy").map(str::to_string);
    let credit_debit = bal.child_text("CdtDbtInd")?;
    let as_of_date = bal
        .find_first("Dt")
        .and_then(|dt| dt.child_text("Dt"))
        .and_then(|text| NaiveDate::parse_from_str(&text, "%Y-%m-%d").ok())?;

    Some(Balance {
        type_code,
        amount,
        currency,
        credit_debit,
        as_of_date,
    })
}

/// Walk one `Ntry` element. Entries without an amount element are skipped
/// silently; an amount that fails decimal parsing skips the entry with a
/// diagnostic. Indicator and status fall back to `CRDT` / `BOOK`.
pub fn statement_entry(ntry: &XmlNode, diagnostics: &mut Diagnostics) -> Option<StatementEntry> {
    let amt_el = ntry.find_first("Amt")?;
    let currency = amt_el.attribute("Ccy").map(str::to_string);
    let amount = match amt_el.text() {
        Some(text) => match text.parse::<Decimal>() {
            Ok(value) => value,
            Err(_) => {
                diagnostics.record("entry", format!("skipped entry with bad amount: {}", text));
                return None;
            }
        },
        None => return None,
    };

    let credit_debit = ntry
        .child_text("CdtDbtInd")
        .unwrap_or_else(|| "CRDT".to_string());
    let status = ntry
        .find_first("Sts")
        .and_then(|sts| sts.child_text("Cd"))
        .unwrap_or_else(|| "BOOK".to_string());

    let booking_date = ntry
        .find_first("BookgDt")
        .and_then(|n| n.child_text("Dt"))
        .and_then(|text| iso_date(&text, "bookg_dt", diagnostics));
    let value_date = ntry
        .find_first("ValDt")
        .and_then(|n| n.child_text("Dt"))
        .and_then(|text| iso_date(&text, "val_dt", diagnostics));

    let (domain_code, family_code, sub_family_code) = bank_transaction_code(ntry);

    let details = ntry
        .find_first("NtryDtls")
        .map(|dtls| {
            dtls.find_all("TxDtls")
                .into_iter()
                .map(|tx| transaction_detail(tx, diagnostics))
                .collect()
        })
        .unwrap_or_default();

    Some(StatementEntry {
        entry_reference: ntry.child_text("NtryRef"),
        servicer_reference: ntry.child_text("AcctSvcrRef"),
        amount,
        currency,
        credit_debit,
        status,
        booking_date,
        value_date,
        domain_code,
        family_code,
        sub_family_code,
        details,
    })
}

fn bank_transaction_code(ntry: &XmlNode) -> (Option<String>, Option<String>, Option<String>) {
    let domain = match ntry.find_first("BkTxCd").and_then(|b| b.find_first("Domn")) {
        Some(domain) => domain,
        None => return (None, None, None),
    };
    let domain_code = domain.child_text("Cd");
    let family = domain.find_first("Fmly");
    let family_code = family.and_then(|f| f.child_text("Cd"));
    let sub_family_code = family.and_then(|f| f.child_text("SubFmlyCd"));
    (domain_code, family_code, sub_family_code)
}

/// Walk one `TxDtls` element. Every field is optional; UETR is accepted only
/// when it validates as a UUID.
pub fn transaction_detail(tx: &XmlNode, diagnostics: &mut Diagnostics) -> TransactionDetail {
    let mut detail = TransactionDetail::default();

    if let Some(refs) = tx.find_first("Refs") {
        detail.instruction_id = refs.child_text("InstrId");
        detail.end_to_end_id = refs.child_text("EndToEndId");
        if let Some(text) = refs.child_text("UETR") {
            detail.uetr = validated_uetr(&text, "uetr", diagnostics);
        }
    }

    if let Some(amt_el) = tx.find_first("Amt") {
        let money = monetary_amount(amt_el, "tx_amt", diagnostics);
        detail.amount = money.amount;
        detail.currency = money.currency;
    }

    detail.credit_debit = tx.child_text("CdtDbtInd");

    if let Some(related) = tx.find_first("RltdDts") {
        if let Some(text) = related.child_text("IntrBkSttlmDt") {
            detail.settlement_date = iso_date(&text, "intr_bk_sttlm_dt", diagnostics);
        }
    }

    detail
}
