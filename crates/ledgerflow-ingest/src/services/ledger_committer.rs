//! Ledger committer.
//!
//! Commits every aggregated group of a batch inside one shared transaction.
//! Per group: duplicate check, entity resolution (genesis), invoice insert,
//! additive balance increment, commission evaluation. A failure in any step
//! of any group rolls back the entire batch; per-group commits are forbidden
//! because a failure on group N must also undo groups 1..N-1.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use ledgerflow_db::models::{
    Colleague, Commission, CreateCommission, CreateInvoice, Invoice, Representative,
};

use crate::error::{CommitStep, IngestError};
use crate::models::{AggregatedGroup, BatchReport};
use crate::services::fingerprint;

/// Running per-batch counters, carried into error context on failure.
#[derive(Debug, Default)]
struct BatchProgress {
    groups_attempted: u32,
    invoices_created: u32,
    duplicates_skipped: u32,
    total_committed: Decimal,
}

/// Commit all groups of a batch in one transaction.
///
/// Returns the success report, or a fatal error after which nothing from
/// this call persists (the dropped transaction rolls back).
pub async fn commit_batch(
    pool: &PgPool,
    groups: &BTreeMap<String, AggregatedGroup>,
) -> Result<BatchReport, IngestError> {
    let batch_id = Uuid::new_v4();
    let mut progress = BatchProgress::default();

    tracing::info!(
        batch_id = %batch_id,
        groups = groups.len(),
        "Starting batch commit"
    );

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(batch_id = %batch_id, error = %e, "Failed to open batch transaction");
        IngestError::Database(e)
    })?;

    for (admin_username, group) in groups {
        progress.groups_attempted += 1;
        commit_group(&mut tx, batch_id, admin_username, group, &mut progress).await?;
    }

    tx.commit()
        .await
        .map_err(|e| fatal(CommitStep::BatchCommit, batch_id, &progress, e.into()))?;

    tracing::info!(
        batch_id = %batch_id,
        invoices_created = progress.invoices_created,
        duplicates_skipped = progress.duplicates_skipped,
        total_amount = %progress.total_committed,
        "Batch commit complete"
    );

    Ok(BatchReport::completed(
        progress.invoices_created,
        progress.duplicates_skipped,
        progress.total_committed,
    ))
}

/// Run the per-group state machine inside the shared transaction.
async fn commit_group(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    batch_id: Uuid,
    admin_username: &str,
    group: &AggregatedGroup,
    progress: &mut BatchProgress,
) -> Result<(), IngestError> {
    let hash = fingerprint::content_hash(&group.line_items);

    // Step 1: duplicate check. A repeated hash is a normal skip, not an error.
    let existing = Invoice::find_by_content_hash(&mut **tx, &hash)
        .await
        .map_err(|e| fatal(CommitStep::DuplicateCheck, batch_id, progress, e.into()))?;

    if let Some(existing) = existing {
        tracing::info!(
            batch_id = %batch_id,
            admin_username = %admin_username,
            invoice_id = %existing.id,
            "Duplicate group skipped"
        );
        progress.duplicates_skipped += 1;
        return Ok(());
    }

    // Step 2: entity resolution (genesis on first sight).
    let representative = match Representative::find_by_username(&mut **tx, admin_username)
        .await
        .map_err(|e| fatal(CommitStep::EntityResolution, batch_id, progress, e.into()))?
    {
        Some(representative) => representative,
        None => {
            let created = Representative::create(&mut **tx, admin_username)
                .await
                .map_err(|e| fatal(CommitStep::EntityResolution, batch_id, progress, e.into()))?;
            tracing::info!(
                batch_id = %batch_id,
                admin_username = %admin_username,
                representative_id = %created.id,
                "Provisioned new representative"
            );
            created
        }
    };

    // Step 3: immutable invoice with the line-item snapshot.
    let snapshot = serde_json::to_value(&group.line_items)
        .map_err(|e| fatal(CommitStep::InvoiceCreation, batch_id, progress, e.into()))?;

    let invoice = Invoice::create(
        &mut **tx,
        CreateInvoice {
            representative_id: representative.id,
            amount: group.total_due,
            line_items: snapshot,
            content_hash: hash,
            batch_id,
            is_manual: false,
        },
    )
    .await
    .map_err(|e| fatal(CommitStep::InvoiceCreation, batch_id, progress, e.into()))?;

    // Step 4: additive balance increment, performed by the database.
    Representative::increment_balance(&mut **tx, representative.id, group.total_due)
        .await
        .map_err(|e| fatal(CommitStep::BalanceUpdate, batch_id, progress, e.into()))?;

    // Step 5: commission, if a referring colleague exists. The rate is read
    // at this instant and frozen into the commission row.
    if let Some(colleague_id) = representative.colleague_id {
        let colleague = Colleague::find_by_id(&mut **tx, colleague_id)
            .await
            .map_err(|e| fatal(CommitStep::CommissionEvaluation, batch_id, progress, e.into()))?;

        match colleague {
            Some(colleague) => {
                let commission_amount = group.total_due * colleague.commission_rate;
                Commission::create(
                    &mut **tx,
                    CreateCommission {
                        colleague_id,
                        invoice_id: invoice.id,
                        amount: commission_amount,
                    },
                )
                .await
                .map_err(|e| {
                    fatal(CommitStep::CommissionEvaluation, batch_id, progress, e.into())
                })?;
            }
            None => {
                tracing::warn!(
                    batch_id = %batch_id,
                    admin_username = %admin_username,
                    colleague_id = %colleague_id,
                    "Referring colleague not found; invoice stands without commission"
                );
            }
        }
    }

    progress.invoices_created += 1;
    progress.total_committed += group.total_due;
    Ok(())
}

/// Build the fatal commit error with full diagnostic context, logged once.
fn fatal(
    step: CommitStep,
    batch_id: Uuid,
    progress: &BatchProgress,
    source: Box<dyn std::error::Error + Send + Sync>,
) -> IngestError {
    tracing::error!(
        batch_id = %batch_id,
        step = %step,
        groups_attempted = progress.groups_attempted,
        invoices_created = progress.invoices_created,
        total_committed = %progress.total_committed,
        error = %source,
        "Batch commit failed; rolling back entire batch"
    );

    IngestError::Commit {
        step,
        batch_id,
        groups_attempted: progress.groups_attempted,
        invoices_created: progress.invoices_created,
        total_committed: progress.total_committed,
        source,
    }
}
