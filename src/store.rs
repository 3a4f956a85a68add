// Persistence writes for extracted messages.
//
// The schema is owned by the workflow collaborator; this module performs the
// required writes in parent-then-child order so foreign keys resolve. Each
// message commits in its own transaction: a later file's failure can never
// roll back an earlier file's rows.

use crate::errors::Result;
use crate::models::{
    CancellationCase, ExtractedMessage, MessageType, NotificationReport, PaymentInstruction,
    RawMessage, StatementEntry,
};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

/// Workflow state every freshly imported header row starts in.
const STATE_LOADED: &str = "LOADED";

#[derive(Clone)]
pub struct MessageStore {
    pool: PgPool,
}

impl MessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one extracted message: header row, workflow start-state link,
    /// and any nested balance/entry/detail rows, in a single transaction.
    pub async fn persist(&self, raw: &RawMessage, message: &ExtractedMessage) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let input_id = match message {
            ExtractedMessage::Payment(payment) => insert_payment(&mut tx, raw, payment).await?,
            ExtractedMessage::Statement(statement) => {
                let input_id = insert_statement_header(&mut tx, raw, statement).await?;
                for balance in &statement.balances {
                    insert_balance(&mut tx, input_id, balance).await?;
                }
                for entry in &statement.entries {
                    let entry_id = insert_statement_entry(&mut tx, input_id, entry).await?;
                    for detail in &entry.details {
                        insert_detail(&mut tx, "swift_entry_tx_dtls", entry_id, detail).await?;
                    }
                }
                input_id
            }
            ExtractedMessage::Notification(report) => {
                let input_id = insert_notification_header(&mut tx, raw, report).await?;
                for notification in &report.notifications {
                    for entry in &notification.entries {
                        let entry_id = insert_notification_entry(
                            &mut tx,
                            input_id,
                            notification.notification_id.as_deref(),
                            entry,
                        )
                        .await?;
                        for detail in &entry.details {
                            insert_detail(&mut tx, "swift_ntfctn_tx_dtls", entry_id, detail)
                                .await?;
                        }
                    }
                }
                input_id
            }
            ExtractedMessage::Cancellation(case) => insert_cancellation(&mut tx, raw, case).await?,
        };

        link_start_state(&mut tx, input_id, raw.msg_type).await?;

        tx.commit().await?;
        debug!(%input_id, msg_type = %raw.msg_type, "persisted message");

        Ok(input_id)
    }
}

async fn insert_payment(
    tx: &mut Transaction<'_, Postgres>,
    raw: &RawMessage,
    payment: &PaymentInstruction,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let underlying = payment.underlying.as_ref();

    sqlx::query(
        r#"
        INSERT INTO swift_input (
            id, file_name, state, content, imported, msg_type,
            snd_name, rcv_name, amount, currency_code, dval,
            code, message, snd_acc, rcv_acc,
            snd_bank, snd_bank_name, snd_mid_bank, snd_mid_bank_name, snd_mid_bank_acc,
            rcv_bank, rcv_bank_name, instd_agt, instd_agt_name,
            underlying_dbtr_name, underlying_dbtr_acc, underlying_dbtr_agt,
            underlying_cdtr_name, underlying_cdtr_acc, underlying_cdtr_agt,
            error
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29, $30, $31)
        "#,
    )
    .bind(id)
    .bind(&raw.file_name)
    .bind(STATE_LOADED)
    .bind(&raw.content)
    .bind(raw.received_at)
    .bind(raw.msg_type.as_tag())
    .bind(payment.sender_name.as_deref())
    .bind(payment.receiver_name.as_deref())
    .bind(payment.amount)
    .bind(payment.currency.as_deref())
    .bind(payment.value_date)
    .bind(payment.reference.as_deref())
    .bind(payment.remittance_info.as_deref())
    .bind(payment.sender_account.as_deref())
    .bind(payment.receiver_account.as_deref())
    .bind(payment.sender_bank.as_deref())
    .bind(payment.sender_bank_name.as_deref())
    .bind(payment.intermediary_bank.as_deref())
    .bind(payment.intermediary_bank_name.as_deref())
    .bind(payment.intermediary_bank_account.as_deref())
    .bind(payment.receiver_bank.as_deref())
    .bind(payment.receiver_bank_name.as_deref())
    .bind(payment.instructed_agent.as_deref())
    .bind(payment.instructed_agent_name.as_deref())
    .bind(underlying.and_then(|u| u.debtor_name.as_deref()))
    .bind(underlying.and_then(|u| u.debtor_account.as_deref()))
    .bind(underlying.and_then(|u| u.debtor_agent.as_deref()))
    .bind(underlying.and_then(|u| u.creditor_name.as_deref()))
    .bind(underlying.and_then(|u| u.creditor_account.as_deref()))
    .bind(underlying.and_then(|u| u.creditor_agent.as_deref()))
    .bind(payment.diagnostics.to_text())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_statement_header(
    tx: &mut Transaction<'_, Postgres>,
    raw: &RawMessage,
    statement: &crate::models::AccountStatement,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO swift_input (
            id, file_name, state, content, imported, msg_type,
            msg_id, stmt_id, elctrnc_seq_nb, acct_id, acct_ccy, error
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(id)
    .bind(&raw.file_name)
    .bind(STATE_LOADED)
    .bind(&raw.content)
    .bind(raw.received_at)
    .bind(raw.msg_type.as_tag())
    .bind(statement.message_id.as_deref())
    .bind(statement.statement_id.as_deref())
    .bind(statement.sequence_number)
    .bind(statement.account_id.as_deref())
    .bind(statement.account_currency.as_deref())
    .bind(statement.diagnostics.to_text())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_notification_header(
    tx: &mut Transaction<'_, Postgres>,
    raw: &RawMessage,
    report: &NotificationReport,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let first = report.notifications.first();

    sqlx::query(
        r#"
        INSERT INTO swift_input (
            id, file_name, state, content, imported, msg_type,
            msg_id, ntfctn_id, acct_id, acct_ccy, error
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(&raw.file_name)
    .bind(STATE_LOADED)
    .bind(&raw.content)
    .bind(raw.received_at)
    .bind(raw.msg_type.as_tag())
    .bind(report.message_id.as_deref())
    .bind(first.and_then(|n| n.notification_id.as_deref()))
    .bind(first.and_then(|n| n.account_id.as_deref()))
    .bind(first.and_then(|n| n.account_currency.as_deref()))
    .bind(report.diagnostics.to_text())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_cancellation(
    tx: &mut Transaction<'_, Postgres>,
    raw: &RawMessage,
    case: &CancellationCase,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO swift_input (
            id, file_name, state, content, imported, msg_type,
            case_id, case_assgnr, orgnl_msg_id, orgnl_msg_nm_id,
            orgnl_instr_id, orgnl_end_to_end_id, orgnl_tx_id, orgnl_uetr,
            cxl_rsn_cd, cxl_rsn_addtl_inf, error
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
        "#,
    )
    .bind(id)
    .bind(&raw.file_name)
    .bind(STATE_LOADED)
    .bind(&raw.content)
    .bind(raw.received_at)
    .bind(raw.msg_type.as_tag())
    .bind(case.case_id.as_deref())
    .bind(case.assigner_bic.as_deref())
    .bind(case.original_message_id.as_deref())
    .bind(case.original_message_name.as_deref())
    .bind(case.original_instruction_id.as_deref())
    .bind(case.original_end_to_end_id.as_deref())
    .bind(case.original_transaction_id.as_deref())
    .bind(case.original_uetr)
    .bind(case.reason_code.as_deref())
    .bind(case.reason_info.as_deref())
    .bind(case.diagnostics.to_text())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_balance(
    tx: &mut Transaction<'_, Postgres>,
    input_id: Uuid,
    balance: &crate::models::Balance,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO swift_stmt_bal (id, swift_input_id, tp_cd, amt, amt_ccy, cdt_dbt_ind, dt)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input_id)
    .bind(&balance.type_code)
    .bind(balance.amount)
    .bind(balance.currency.as_deref())
    .bind(&balance.credit_debit)
    .bind(balance.as_of_date)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_statement_entry(
    tx: &mut Transaction<'_, Postgres>,
    input_id: Uuid,
    entry: &StatementEntry,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO swift_stmt_ntry (
            id, swift_input_id, ntry_ref, acct_svcr_ref, amt, amt_ccy, cdt_dbt_ind,
            sts_cd, bookg_dt, val_dt, bk_tx_cd_domn_cd, bk_tx_cd_fmly_cd, bk_tx_cd_sub_fmly_cd
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind(id)
    .bind(input_id)
    .bind(entry.entry_reference.as_deref())
    .bind(entry.servicer_reference.as_deref())
    .bind(entry.amount)
    .bind(entry.currency.as_deref())
    .bind(&entry.credit_debit)
    .bind(&entry.status)
    .bind(entry.booking_date)
    .bind(entry.value_date)
    .bind(entry.domain_code.as_deref())
    .bind(entry.family_code.as_deref())
    .bind(entry.sub_family_code.as_deref())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_notification_entry(
    tx: &mut Transaction<'_, Postgres>,
    input_id: Uuid,
    notification_id: Option<&str>,
    entry: &StatementEntry,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO swift_ntfctn_ntry (
            id, swift_input_id, ntfctn_id, ntry_ref, acct_svcr_ref, amt, amt_ccy, cdt_dbt_ind,
            sts_cd, bookg_dt, val_dt, bk_tx_cd_domn_cd, bk_tx_cd_fmly_cd, bk_tx_cd_sub_fmly_cd
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(id)
    .bind(input_id)
    .bind(notification_id)
    .bind(entry.entry_reference.as_deref())
    .bind(entry.servicer_reference.as_deref())
    .bind(entry.amount)
    .bind(entry.currency.as_deref())
    .bind(&entry.credit_debit)
    .bind(&entry.status)
    .bind(entry.booking_date)
    .bind(entry.value_date)
    .bind(entry.domain_code.as_deref())
    .bind(entry.family_code.as_deref())
    .bind(entry.sub_family_code.as_deref())
    .execute(&mut **tx)
    .await?;

    Ok(id)
}

async fn insert_detail(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    entry_id: Uuid,
    detail: &crate::models::TransactionDetail,
) -> Result<()> {
    let sql = format!(
        r#"
        INSERT INTO {} (id, ntry_id, instr_id, end_to_end_id, uetr, amt, amt_ccy, cdt_dbt_ind, intr_bk_sttlm_dt)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
        table
    );

    sqlx::query(&sql)
        .bind(Uuid::new_v4())
        .bind(entry_id)
        .bind(detail.instruction_id.as_deref())
        .bind(detail.end_to_end_id.as_deref())
        .bind(detail.uetr)
        .bind(detail.amount)
        .bind(detail.currency.as_deref())
        .bind(detail.credit_debit.as_deref())
        .bind(detail.settlement_date)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

/// Bind the new header row to the configured start state for its type. The
/// workflow type/state catalogue is owned by the admin collaborator.
async fn link_start_state(
    tx: &mut Transaction<'_, Postgres>,
    input_id: Uuid,
    msg_type: MessageType,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO process (id, doc_id, state_id)
        SELECT $1, $2, ps.id
        FROM process_state ps
        JOIN process_type pt ON ps.type_id = pt.id
        WHERE pt.code = $3 AND ps.start = TRUE
        LIMIT 1
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input_id)
    .bind(msg_type.as_tag())
    .execute(&mut **tx)
    .await?;

    Ok(())
}
