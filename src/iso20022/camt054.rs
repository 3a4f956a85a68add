// camt.054 - Bank to Customer Debit/Credit Notification
// Same entry/detail shape as camt.053, no balances, and a message may carry
// several Ntfctn blocks - each is extracted independently under its own id.

use super::common;
use super::xml;
use crate::models::{Notification, NotificationReport};

pub fn extract(content: &str) -> NotificationReport {
    let mut record = NotificationReport::default();

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

    for block in root.find_all("Ntfctn") {
        let mut notification = Notification {
            notification_id: block.child_text("Id"),
            ..Default::default()
        };

        if let Some(acct) = block.find_first("Acct") {
            notification.account_id = common::account_id(acct);
            notification.account_currency = acct.child_text("Ccy");
        }

        for ntry in block.find_all("Ntry") {
            if let Some(entry) = common::statement_entry(ntry, &mut record.diagnostics) {
                notification.entries.push(entry);
            }
        }

        record.notifications.push(notification);
    }

    if record.notifications.is_empty() {
        record
            .diagnostics
            .record("notification", "no Ntfctn blocks found");
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    const CAMT054: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Envelope xmlns="urn:swift:xsd:envelope">
  <head:AppHdr xmlns:head="urn:iso:std:iso:20022:tech:xsd:head.001.001.02">
    <head:BizMsgIdr>cmt054bizmsgidr-002</head:BizMsgIdr>
    <head:MsgDefIdr>camt.054.001.08</head:MsgDefIdr>
  </head:AppHdr>
  <camt:Document xmlns:camt="urn:iso:std:iso:20022:tech:xsd:camt.054.001.08">
    <camt:BkToCstmrDbtCdtNtfctn>
      <camt:GrpHdr>
        <camt:MsgId>cmt054bizmsgidr-002</camt:MsgId>
        <camt:CreDtTm>2022-10-20T11:30:00+02:00</camt:CreDtTm>
      </camt:GrpHdr>
      <camt:Ntfctn>
        <camt:Id>cmt054NtfctnId-001</camt:Id>
        <camt:Acct>
          <camt:Id><camt:Othr><camt:Id>9875687</camt:Id></camt:Othr></camt:Id>
          <camt:Ccy>RON</camt:Ccy>
        </camt:Acct>
        <camt:Ntry>
          <camt:NtryRef>cmt054NtryRef001</camt:NtryRef>
          <camt:Amt Ccy="RON">591636</camt:Amt>
          <camt:CdtDbtInd>CRDT</camt:CdtDbtInd>
          <camt:Sts><camt:Cd>BOOK</camt:Cd></camt:Sts>
          <camt:BkTxCd>
            <camt:Domn>
              <camt:Cd>PMNT</camt:Cd>
              <camt:Fmly><camt:Cd>RCDT</camt:Cd><camt:SubFmlyCd>XBCT</camt:SubFmlyCd></camt:Fmly>
            </camt:Domn>
          </camt:BkTxCd>
          <camt:NtryDtls>
            <camt:TxDtls>
              <camt:Refs>
                <camt:InstrId>pacs9bizmsgidr02</camt:InstrId>
                <camt:EndToEndId>pcs008bzmsgidr-1</camt:EndToEndId>
                <camt:UETR>7a562c67-ca16-48ba-b074-65581be6f001</camt:UETR>
              </camt:Refs>
              <camt:Amt Ccy="RON">591636</camt:Amt>
              <camt:CdtDbtInd>CRDT</camt:CdtDbtInd>
              <camt:RltdDts><camt:IntrBkSttlmDt>2022-10-20</camt:IntrBkSttlmDt></camt:RltdDts>
            </camt:TxDtls>
          </camt:NtryDtls>
        </camt:Ntry>
      </camt:Ntfctn>
    </camt:BkToCstmrDbtCdtNtfctn>
  </camt:Document>
</Envelope>"#;

    #[test]
    fn extracts_notification_entries_and_details() {
        let record = extract(CAMT054);

        assert_eq!(record.message_id.as_deref(), Some("cmt054bizmsgidr-002"));
        assert_eq!(record.notifications.len(), 1);

        let notification = &record.notifications[0];
        assert_eq!(
            notification.notification_id.as_deref(),
            Some("cmt054NtfctnId-001")
        );
        assert_eq!(notification.account_id.as_deref(), Some("9875687"));
        assert_eq!(notification.account_currency.as_deref(), Some("RON"));
        assert_eq!(notification.entries.len(), 1);

        let entry = &notification.entries[0];
        assert_eq!(entry.entry_reference.as_deref(), Some("cmt054NtryRef001"));
        assert_eq!(entry.amount, Decimal::from(591636u64));

        let detail = &entry.details[0];
        assert_eq!(detail.instruction_id.as_deref(), Some("pacs9bizmsgidr02"));
        assert_eq!(
            detail.settlement_date.unwrap().to_string(),
            "2022-10-20"
        );
    }

    #[test]
    fn each_notification_block_is_extracted_independently() {
        let xml = r#"<Document><BkToCstmrDbtCdtNtfctn>
            <GrpHdr><MsgId>m-1</MsgId></GrpHdr>
            <Ntfctn>
              <Id>N-1</Id>
              <Acct><Id><Othr><Id>111</Id></Othr></Id></Acct>
              <Ntry><Amt Ccy="EUR">10.00</Amt><CdtDbtInd>CRDT</CdtDbtInd></Ntry>
            </Ntfctn>
            <Ntfctn>
              <Id>N-2</Id>
              <Acct><Id><Othr><Id>222</Id></Othr></Id></Acct>
              <Ntry><Amt Ccy="EUR">20.00</Amt><CdtDbtInd>DBIT</CdtDbtInd></Ntry>
              <Ntry><Amt Ccy="EUR">not-a-number</Amt></Ntry>
            </Ntfctn>
        </BkToCstmrDbtCdtNtfctn></Document>"#;

        let record = extract(xml);

        assert_eq!(record.notifications.len(), 2);
        assert_eq!(record.notifications[0].notification_id.as_deref(), Some("N-1"));
        assert_eq!(record.notifications[0].entries.len(), 1);
        assert_eq!(record.notifications[1].notification_id.as_deref(), Some("N-2"));
        // The bad-amount entry is skipped, its sibling survives.
        assert_eq!(record.notifications[1].entries.len(), 1);
        assert_eq!(
            record.notifications[1].entries[0].credit_debit,
            "DBIT"
        );
        assert!(record.diagnostics.to_text().unwrap().contains("skipped entry"));
    }

    #[test]
    fn message_without_blocks_yields_diagnostic() {
        let record = extract("<Document><GrpHdr><MsgId>m-9</MsgId></GrpHdr></Document>");

        assert!(record.notifications.is_empty());
        assert!(record
            .diagnostics
            .to_text()
            .unwrap()
            .contains("no Ntfctn blocks"));
    }
}
