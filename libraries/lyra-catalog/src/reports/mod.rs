use lyra_core::fields;
use lyra_core::types::{
    Collection, CreateReport, DocRef, Direction, FieldUpdate, Query, Report, ReportId,
    ReportResolution, ReportStatus, Value,
};
use lyra_core::{DocumentStore, Result};

use crate::resolver::Resolver;
use crate::shapes;

/// Every report, newest first, with target and users resolved
pub async fn fetch_all(store: &dyn DocumentStore) -> Result<Vec<Report>> {
    let query = Query::all().order_by("createdAt", Direction::Desc);
    let docs = store.fetch_many(Collection::Reports, &query).await?;
    Resolver::new(store)
        .resolve_all_as(&docs, &shapes::report())
        .await
}

/// File a pending report
pub async fn create(store: &dyn DocumentStore, report: CreateReport) -> Result<ReportId> {
    let target = DocRef::new(report.kind.target_collection(), report.target_id);
    let id = store
        .create_document(
            Collection::Reports,
            fields! {
                "type" => report.kind.as_str(),
                "target" => target,
                "targetUser" => report.target_user_id.doc_ref(),
                "reporterUser" => report.reporter_user_id.doc_ref(),
                "reason" => report.reason,
                "description" => report.description,
                "status" => ReportStatus::Pending.as_str(),
                "createdAt" => Value::ServerTimestamp,
                "resolvedAt" => Value::Null,
                "resolvedBy" => Value::Null,
                "action" => Value::Null,
                "notes" => Value::Null,
            },
        )
        .await?;

    tracing::info!(report = %id, kind = report.kind.as_str(), "Report filed");
    Ok(ReportId::new(id))
}

/// Record a moderator decision
pub async fn update_status(
    store: &dyn DocumentStore,
    id: &ReportId,
    resolution: ReportResolution,
) -> Result<()> {
    let updates = vec![
        (
            "status".to_string(),
            FieldUpdate::set(resolution.status.as_str()),
        ),
        (
            "action".to_string(),
            FieldUpdate::set(resolution.action.map(|a| a.as_str())),
        ),
        ("notes".to_string(), FieldUpdate::set(resolution.notes)),
        (
            "resolvedBy".to_string(),
            FieldUpdate::set(resolution.admin_id.doc_ref()),
        ),
        ("resolvedAt".to_string(), FieldUpdate::ServerTimestamp),
    ];
    store.update_document(&id.doc_ref(), updates).await?;

    tracing::info!(
        report = %id,
        status = resolution.status.as_str(),
        admin = %resolution.admin_id,
        "Report updated"
    );
    Ok(())
}
