// pacs.009 - Financial Institution Credit Transfer (cover payment)
// Outer parties are banks identified by BIC; the real originator and
// beneficiary travel in the UndrlygCstmrCdtTrf sub-block when present.

use super::common;
use super::xml::{self, XmlNode};
use crate::models::{PaymentInstruction, UnderlyingCustomerTransfer};

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

    // Bank-level participants: Dbtr/Cdtr are institutions here, so the
    // sender/receiver columns carry their BICs.
    record.sender_name = root
        .find_first("Dbtr")
        .and_then(|d| common::institution(d).bic);
    record.receiver_name = root
        .find_first("Cdtr")
        .and_then(|c| common::institution(c).bic);

    if let Some(agent) = root.find_first("DbtrAgt") {
        record.sender_bank = common::institution(agent).bic;
    }
    if let Some(agent) = root.find_first("CdtrAgt") {
        record.receiver_bank = common::institution(agent).bic;
    }
    if let Some(agent) = root.find_first("InstdAgt") {
        let institution = common::institution(agent);
        record.instructed_agent = institution.bic;
        record.instructed_agent_name = institution.name;
    }

    if let Some(amt_el) = root.find_first("IntrBkSttlmAmt") {
        let money = common::monetary_amount(amt_el, "amount", &mut record.diagnostics);
        record.amount = money.amount;
        record.currency = money.currency;
    }

    record.value_date = common::value_date(&root, &mut record.diagnostics);
    record.reference = common::reference_code(&root);

    if let Some(underlying) = root.find_first("UndrlygCstmrCdtTrf") {
        record.underlying = Some(underlying_transfer(underlying));
    }

    if !record.has_key_fields() {
        record
            .diagnostics
            .record("document", "no key fields extracted");
    }

    record
}

fn underlying_transfer(block: &XmlNode) -> UnderlyingCustomerTransfer {
    UnderlyingCustomerTransfer {
        debtor_name: block.find_first("Dbtr").and_then(|d| d.child_text("Nm")),
        debtor_account: block.find_first("DbtrAcct").and_then(common::account_id),
        debtor_agent: block
            .find_first("DbtrAgt")
            .and_then(|a| common::institution(a).bic),
        creditor_name: block.find_first("Cdtr").and_then(|c| c.child_text("Nm")),
        creditor_account: block.find_first("CdtrAcct").and_then(common::account_id),
        creditor_agent: block
            .find_first("CdtrAgt")
            .and_then(|a| common::institution(a).bic),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const PACS009: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Envelope xmlns="urn:swift:xsd:envelope">
  <head:AppHdr xmlns:head="urn:iso:std:iso:20022:tech:xsd:head.001.001.02">
    <head:BizMsgIdr>pacs9bizmsgidr01</head:BizMsgIdr>
    <head:MsgDefIdr>pacs.009.001.08</head:MsgDefIdr>
  </head:AppHdr>
  <pacs:Document xmlns:pacs="urn:iso:std:iso:20022:tech:xsd:pacs.009.001.08">
    <pacs:FICdtTrf>
      <pacs:GrpHdr>
        <pacs:MsgId>pacs9bizmsgidr01</pacs:MsgId>
        <pacs:CreDtTm>2022-10-20T09:15:00+00:00</pacs:CreDtTm>
        <pacs:NbOfTxs>1</pacs:NbOfTxs>
      </pacs:GrpHdr>
      <pacs:CdtTrfTxInf>
        <pacs:PmtId>
          <pacs:InstrId>pacs9bizmsgidr01</pacs:InstrId>
          <pacs:EndToEndId>pcs008bzmsgidr-1</pacs:EndToEndId>
          <pacs:UETR>7a562c67-ca16-48ba-b074-65581be6f001</pacs:UETR>
        </pacs:PmtId>
        <pacs:IntrBkSttlmAmt Ccy="RON">591636</pacs:IntrBkSttlmAmt>
        <pacs:IntrBkSttlmDt>2022-10-20</pacs:IntrBkSttlmDt>
        <pacs:InstgAgt><pacs:FinInstnId><pacs:BICFI>MYMBGB2LXXX</pacs:BICFI></pacs:FinInstnId></pacs:InstgAgt>
        <pacs:InstdAgt><pacs:FinInstnId><pacs:BICFI>INGBROBUXXX</pacs:BICFI></pacs:FinInstnId></pacs:InstdAgt>
        <pacs:Dbtr><pacs:FinInstnId><pacs:BICFI>MYMBGB2LXXX</pacs:BICFI></pacs:FinInstnId></pacs:Dbtr>
        <pacs:DbtrAgt><pacs:FinInstnId><pacs:BICFI>INGBROBUXXX</pacs:BICFI></pacs:FinInstnId></pacs:DbtrAgt>
        <pacs:CdtrAgt><pacs:FinInstnId><pacs:BICFI>RZBRROBUXXX</pacs:BICFI></pacs:FinInstnId></pacs:CdtrAgt>
        <pacs:Cdtr><pacs:FinInstnId><pacs:BICFI>GEBABEBBXXX</pacs:BICFI></pacs:FinInstnId></pacs:Cdtr>
        <pacs:UndrlygCstmrCdtTrf>
          <pacs:Dbtr><pacs:Nm>Debtor Co</pacs:Nm></pacs:Dbtr>
          <pacs:DbtrAcct><pacs:Id><pacs:Othr><pacs:Id>25698745</pacs:Id></pacs:Othr></pacs:Id></pacs:DbtrAcct>
          <pacs:DbtrAgt><pacs:FinInstnId><pacs:BICFI>MYMBGB2LXXX</pacs:BICFI></pacs:FinInstnId></pacs:DbtrAgt>
          <pacs:CdtrAgt><pacs:FinInstnId><pacs:BICFI>GEBABEBBXXX</pacs:BICFI></pacs:FinInstnId></pacs:CdtrAgt>
          <pacs:Cdtr><pacs:Nm>Ardent Finance</pacs:Nm></pacs:Cdtr>
          <pacs:CdtrAcct><pacs:Id><pacs:Othr><pacs:Id>65479512</pacs:Id></pacs:Othr></pacs:Id></pacs:CdtrAcct>
        </pacs:UndrlygCstmrCdtTrf>
      </pacs:CdtTrfTxInf>
    </pacs:FICdtTrf>
  </pacs:Document>
</Envelope>"#;

    #[test]
    fn outer_parties_resolve_to_bank_bics() {
        let record = extract(PACS009);

        assert_eq!(record.sender_name.as_deref(), Some("MYMBGB2LXXX"));
        assert_eq!(record.receiver_name.as_deref(), Some("GEBABEBBXXX"));
        assert_eq!(record.sender_bank.as_deref(), Some("INGBROBUXXX"));
        assert_eq!(record.receiver_bank.as_deref(), Some("RZBRROBUXXX"));
        assert_eq!(record.instructed_agent.as_deref(), Some("INGBROBUXXX"));
        assert_eq!(record.amount.unwrap(), Decimal::from(591636u64));
        assert_eq!(record.currency.as_deref(), Some("RON"));
        assert_eq!(record.reference.as_deref(), Some("pcs008bzmsgidr-1"));
    }

    #[test]
    fn underlying_block_recovers_real_customers() {
        let record = extract(PACS009);
        let underlying = record.underlying.unwrap();

        assert_eq!(underlying.debtor_name.as_deref(), Some("Debtor Co"));
        assert_eq!(underlying.debtor_account.as_deref(), Some("25698745"));
        assert_eq!(underlying.debtor_agent.as_deref(), Some("MYMBGB2LXXX"));
        assert_eq!(underlying.creditor_name.as_deref(), Some("Ardent Finance"));
        assert_eq!(underlying.creditor_account.as_deref(), Some("65479512"));
        assert_eq!(underlying.creditor_agent.as_deref(), Some("GEBABEBBXXX"));
    }

    #[test]
    fn message_without_underlying_block_stays_flat() {
        let xml = r#"<Document>
            <Dbtr><FinInstnId><BICFI>MYMBGB2LXXX</BICFI></FinInstnId></Dbtr>
            <IntrBkSttlmAmt Ccy="EUR">1000.00</IntrBkSttlmAmt>
            <IntrBkSttlmDt>2022-10-20</IntrBkSttlmDt>
        </Document>"#;

        let record = extract(xml);

        assert!(record.underlying.is_none());
        assert_eq!(record.sender_name.as_deref(), Some("MYMBGB2LXXX"));
        assert!(record.has_key_fields());
    }
}
