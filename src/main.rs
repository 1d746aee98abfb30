//! # Resource Registry Demo
//!
//! Registers a JSON and an XML resource type, then walks a resource through
//! add, a rejected add, update and delete while a listener logs each event.
//!
//! ```bash
//! RUST_LOG=info cargo run
//! ```

use async_trait::async_trait;
use resource_registry::lifecycle::{ListenerError, ResourceListener};
use resource_registry::model::{FieldType, IndexFieldSpec, Resource, ResourceType};
use resource_registry::runtime::{setup_tracing, RegistryConfig, RegistrySystem};
use std::sync::Arc;
use tracing::{error, info, Instrument};

/// Logs every committed change.
struct AuditLog;

#[async_trait]
impl ResourceListener for AuditLog {
    async fn on_resource_added(&self, resource: &Resource) -> Result<(), ListenerError> {
        info!(id = %resource.id, resource_type = %resource.resource_type, "audit: added");
        Ok(())
    }

    async fn on_resource_updated(&self, previous: &Resource, current: &Resource) -> Result<(), ListenerError> {
        info!(
            id = %current.id,
            from_version = previous.version,
            to_version = current.version,
            "audit: updated"
        );
        Ok(())
    }

    async fn on_resource_deleted(&self, previous: &Resource) -> Result<(), ListenerError> {
        info!(id = %previous.id, "audit: deleted");
        Ok(())
    }
}

const NOTE_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="note">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="to" type="xs:string"/>
        <xs:element name="body" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = RegistryConfig::default().with_env_overrides()?;
    let system = RegistrySystem::builder(config)
        .resource_listener(Arc::new(AuditLog))
        .start()?;
    let service = &system.service;

    service
        .add_resource_type(ResourceType::new("doc", "json", r#"{"type":"object"}"#))
        .await?;
    service
        .add_resource_type(
            ResourceType::new("note", "xml", NOTE_XSD)
                .with_index_field(IndexFieldSpec::new("recipient", "note/to", FieldType::String)),
        )
        .await?;

    let span = tracing::info_span!("json_document");
    let doc = async {
        let added = service
            .add_resource(Resource::inline("doc", r#"{"title":"x"}"#))
            .await?;
        info!(id = %added.id, title = ?added.field_values("title"), "Document stored");

        if let Err(e) = service.add_resource(Resource::inline("doc", "not json")).await {
            info!(kind = e.kind(), error = %e, "Malformed document rejected");
        }

        let updated = service
            .update_resource(added.with_payload(r#"{"title":"y"}"#))
            .await?;
        info!(id = %updated.id, title = ?updated.field_values("title"), "Document updated");
        Ok::<_, resource_registry::error::RegistryError>(updated)
    }
    .instrument(span)
    .await?;

    let note = service
        .add_resource(Resource::inline(
            "note",
            "<note><to>Tove</to><body>Don't forget me</body></note>",
        ))
        .await?;
    info!(id = %note.id, recipient = ?note.field_values("recipient"), "Note stored");

    match service.add_resource(Resource::inline("note", "<note><to>Tove</to></note>")).await {
        Ok(_) => error!("Incomplete note was accepted"),
        Err(e) => info!(error = %e, "Incomplete note rejected"),
    }

    service.delete_resource(&doc.id).await?;
    info!(
        remaining = service.get_resources().await?.len(),
        "Document deleted"
    );

    system.shutdown().await?;
    info!("Demo completed successfully");
    Ok(())
}
