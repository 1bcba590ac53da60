use crate::error::GatewayError;
use argonath_core::audit::{AuditEvent, AuditOperation, AuditOutcome, AuditSink};
use argonath_core::auth::{ensure_creator, AuthzError, Principal};
use argonath_core::config::{AppConfig, ExportConfig, OverwriteNamePolicy};
use argonath_core::model::{Classification, MindMapRecord, MindMapUpdate, NewMindMap};
use export::{
    build_standalone_html, build_static_bundle, decode_snapshot, decode_snapshot_value,
    encode_snapshot, fetch_templates, render_png, ImageOptions, TemplateSource,
};
use std::sync::Arc;
use storage::{GraphStore, MindMapBackend, RecordError, ReplaceReport};
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub name: String,
    pub classification: Classification,
    /// Existing record to overwrite; `None` saves a new record.
    pub overwrite_id: Option<String>,
}

impl SaveRequest {
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            classification,
            overwrite_id: None,
        }
    }

    pub fn overwriting(mut self, id: impl Into<String>) -> Self {
        self.overwrite_id = Some(id.into());
        self
    }
}

/// Saved-map and file-format boundary of the editor.
///
/// Remote calls never touch the graph store until they have fully succeeded,
/// so a failed load or import leaves the current map intact.
pub struct PersistenceGateway {
    backend: Arc<dyn MindMapBackend>,
    principal: Principal,
    overwrite_name: OverwriteNamePolicy,
    export: ExportConfig,
    audit_sink: Option<Arc<dyn AuditSink>>,
}

impl PersistenceGateway {
    pub fn new(backend: Arc<dyn MindMapBackend>, principal: Principal) -> Self {
        Self {
            backend,
            principal,
            overwrite_name: OverwriteNamePolicy::default(),
            export: ExportConfig::default(),
            audit_sink: None,
        }
    }

    pub fn from_config(
        backend: Arc<dyn MindMapBackend>,
        principal: Principal,
        config: &AppConfig,
    ) -> Self {
        Self::new(backend, principal)
            .with_overwrite_name(config.persistence.overwrite_name)
            .with_export_config(config.export.clone())
    }

    pub fn with_overwrite_name(mut self, policy: OverwriteNamePolicy) -> Self {
        self.overwrite_name = policy;
        self
    }

    pub fn with_export_config(mut self, export: ExportConfig) -> Self {
        self.export = export;
        self
    }

    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.audit_sink = Some(sink);
        self
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    pub fn export_config(&self) -> &ExportConfig {
        &self.export
    }

    /// All saved maps, newest first.
    pub async fn list_saved(&self) -> Result<Vec<MindMapRecord>, GatewayError> {
        let records = self.backend.list().await.map_err(|err| {
            error!("failed to list saved mind maps: {}", err);
            err
        })?;
        Ok(records)
    }

    pub async fn save(
        &self,
        store: &GraphStore,
        request: SaveRequest,
    ) -> Result<MindMapRecord, GatewayError> {
        if self.principal.subject.trim().is_empty() {
            return Err(AuthzError::Anonymous.into());
        }
        let data = serde_json::to_value(store.snapshot()).map_err(export::ExportError::from)?;
        let name = request.name.trim().to_string();

        let (operation, result) = match request.overwrite_id {
            Some(id) => {
                let name = match self.overwrite_name {
                    OverwriteNamePolicy::KeepExisting => None,
                    OverwriteNamePolicy::UseFormName if name.is_empty() => {
                        return Err(GatewayError::MissingName)
                    }
                    OverwriteNamePolicy::UseFormName => Some(name),
                };
                let update = MindMapUpdate {
                    data,
                    classification: request.classification,
                    name,
                };
                (
                    AuditOperation::Overwrite,
                    self.backend.update(&id, update).await,
                )
            }
            None => {
                if name.is_empty() {
                    return Err(GatewayError::MissingName);
                }
                let record = NewMindMap {
                    name,
                    classification: request.classification,
                    creator: self.principal.subject.clone(),
                    data,
                };
                (AuditOperation::Save, self.backend.insert(record).await)
            }
        };

        match result {
            Ok(record) => {
                info!(
                    record_id = %record.id,
                    classification = %record.classification,
                    nodes = store.nodes().len(),
                    edges = store.edges().len(),
                    "mind map saved"
                );
                self.emit_audit_event(
                    self.audit_event(operation, AuditOutcome::Succeeded)
                        .with_record_id(&record.id)
                        .with_classification(record.classification),
                );
                Ok(record)
            }
            Err(err) => {
                error!("failed to save mind map: {}", err);
                self.emit_audit_event(
                    self.audit_event(operation, AuditOutcome::Failed)
                        .with_metadata("error", err.to_string()),
                );
                Err(err.into())
            }
        }
    }

    /// Replaces the store with a saved map. Malformed `data` is reported and
    /// the store is left untouched.
    pub async fn load(
        &self,
        id: &str,
        store: &mut GraphStore,
    ) -> Result<MindMapRecord, GatewayError> {
        let record = match self.backend.get(id).await {
            Ok(record) => record,
            Err(err) => {
                error!(record_id = %id, "failed to load mind map: {}", err);
                self.emit_audit_event(
                    self.audit_event(AuditOperation::Load, AuditOutcome::Failed)
                        .with_record_id(id)
                        .with_metadata("error", err.to_string()),
                );
                return Err(err.into());
            }
        };

        let snapshot = match decode_snapshot_value(record.data.clone()) {
            Ok(snapshot) => snapshot,
            Err(source) => {
                warn!(record_id = %id, "saved mind map has unusable data: {}", source);
                self.emit_audit_event(
                    self.audit_event(AuditOperation::Load, AuditOutcome::Failed)
                        .with_record_id(id)
                        .with_metadata("error", source.to_string()),
                );
                return Err(GatewayError::MalformedRecord {
                    id: id.to_string(),
                    source,
                });
            }
        };

        store.replace_all(snapshot);
        info!(
            record_id = %id,
            nodes = store.nodes().len(),
            edges = store.edges().len(),
            "mind map loaded"
        );
        self.emit_audit_event(
            self.audit_event(AuditOperation::Load, AuditOutcome::Succeeded)
                .with_record_id(id)
                .with_classification(record.classification),
        );
        Ok(record)
    }

    /// Deletes a saved map. Only its creator may do so; the check runs here
    /// and again in the backend.
    pub async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let record = match self.backend.get(id).await {
            Ok(record) => record,
            Err(err) => {
                error!(record_id = %id, "failed to look up mind map for delete: {}", err);
                self.emit_audit_event(
                    self.audit_event(AuditOperation::Delete, AuditOutcome::Failed)
                        .with_record_id(id)
                        .with_metadata("error", err.to_string()),
                );
                return Err(err.into());
            }
        };
        if let Err(err) = ensure_creator(&self.principal, &record.creator) {
            warn!(record_id = %id, "delete denied: {}", err);
            self.emit_audit_event(
                self.audit_event(AuditOperation::Delete, AuditOutcome::Denied)
                    .with_record_id(id)
                    .with_metadata("error", err.to_string()),
            );
            return Err(err.into());
        }

        match self.backend.delete(id, &self.principal.subject).await {
            Ok(()) => {
                info!(record_id = %id, "mind map deleted");
                self.emit_audit_event(
                    self.audit_event(AuditOperation::Delete, AuditOutcome::Succeeded)
                        .with_record_id(id)
                        .with_classification(record.classification),
                );
                Ok(())
            }
            Err(err) => {
                let outcome = match err {
                    RecordError::Unauthorized(_) => AuditOutcome::Denied,
                    _ => AuditOutcome::Failed,
                };
                error!(record_id = %id, "failed to delete mind map: {}", err);
                self.emit_audit_event(
                    self.audit_event(AuditOperation::Delete, outcome)
                        .with_record_id(id)
                        .with_metadata("error", err.to_string()),
                );
                Err(err.into())
            }
        }
    }

    pub fn export_json(&self, store: &GraphStore) -> Result<Vec<u8>, GatewayError> {
        Ok(encode_snapshot(&store.snapshot())?)
    }

    /// Replaces the store with an exported file. Anything other than an object
    /// with `nodes` and `edges` arrays is rejected.
    pub fn import_json(
        &self,
        bytes: &[u8],
        store: &mut GraphStore,
    ) -> Result<ReplaceReport, GatewayError> {
        let snapshot = decode_snapshot(bytes).map_err(|err| {
            warn!("import rejected: {}", err);
            err
        })?;
        let report = store.replace_all(snapshot);
        info!(
            nodes = store.nodes().len(),
            edges = store.edges().len(),
            "mind map imported"
        );
        Ok(report)
    }

    pub fn export_image(&self, store: &GraphStore) -> Result<Vec<u8>, GatewayError> {
        Ok(render_png(
            &store.snapshot(),
            &ImageOptions::from(&self.export),
        )?)
    }

    /// Zip of the offline viewer with the current graph embedded.
    pub async fn export_static_site(
        &self,
        store: &GraphStore,
        templates: &dyn TemplateSource,
    ) -> Result<Vec<u8>, GatewayError> {
        let templates = fetch_templates(templates)
            .await
            .map_err(export::ExportError::from)?;
        Ok(build_static_bundle(
            &templates,
            &self.export.payload_placeholder,
            &store.snapshot(),
        )?)
    }

    /// Single self-contained HTML page of the offline viewer.
    pub async fn export_standalone_html(
        &self,
        store: &GraphStore,
        templates: &dyn TemplateSource,
    ) -> Result<String, GatewayError> {
        let templates = fetch_templates(templates)
            .await
            .map_err(export::ExportError::from)?;
        Ok(build_standalone_html(
            &templates,
            &self.export.payload_placeholder,
            &store.snapshot(),
        )?)
    }

    fn audit_event(&self, operation: AuditOperation, outcome: AuditOutcome) -> AuditEvent {
        AuditEvent::new(operation, outcome).with_actor(&self.principal.subject)
    }

    fn emit_audit_event(&self, event: AuditEvent) {
        if let Some(sink) = &self.audit_sink {
            if let Err(err) = sink.record(event) {
                warn!("failed to record audit event: {}", err);
            }
        }
    }
}
