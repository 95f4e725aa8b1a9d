//! Write payloads for the resource tables.
//!
//! A payload is a JSON object whose keys must be writable columns of the
//! target table. Validation happens here so the persistence layer only ever
//! interpolates column names taken from the catalogue.

use serde_json::{Map, Value};
use thiserror::Error;

use super::resources::Resource;

/// Which statement a payload feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldsError {
    #[error("Tidak ada data untuk ditambahkan")]
    EmptyCreate,
    #[error("Tidak ada data untuk diperbarui")]
    EmptyUpdate,
    #[error("unknown field `{field}` for {resource}")]
    Unknown { resource: Resource, field: String },
}

/// Columns accepted for one write, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordFields {
    resource: Resource,
    values: Map<String, Value>,
}

impl RecordFields {
    pub fn for_create(resource: Resource, payload: Map<String, Value>) -> Result<Self, FieldsError> {
        Self::parse(resource, WriteKind::Create, payload)
    }

    pub fn for_update(resource: Resource, payload: Map<String, Value>) -> Result<Self, FieldsError> {
        Self::parse(resource, WriteKind::Update, payload)
    }

    fn parse(
        resource: Resource,
        kind: WriteKind,
        payload: Map<String, Value>,
    ) -> Result<Self, FieldsError> {
        if let Some(field) = payload
            .keys()
            .find(|field| !resource.accepts_column(kind, field))
        {
            return Err(FieldsError::Unknown {
                resource,
                field: field.clone(),
            });
        }
        if payload.is_empty() {
            return Err(match kind {
                WriteKind::Create => FieldsError::EmptyCreate,
                WriteKind::Update => FieldsError::EmptyUpdate,
            });
        }

        Ok(Self {
            resource,
            values: payload,
        })
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    /// Column names in a stable order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }
}

/// Outcome reported back to API clients after a plain CRUD call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEvent {
    Created,
    Updated,
    Deleted,
    Missing,
}

impl RecordEvent {
    pub fn message(self, resource: Resource) -> String {
        if resource == Resource::Prayers {
            return match self {
                RecordEvent::Created => "Doa berhasil ditambahkan",
                RecordEvent::Updated => "Doa berhasil diperbarui",
                RecordEvent::Deleted => "Doa berhasil dihapus",
                RecordEvent::Missing => "Doa tidak ditemukan",
            }
            .to_string();
        }

        let label = resource.entity_label();
        match self {
            RecordEvent::Created => format!("{label} added successfully"),
            RecordEvent::Updated => format!("{label} updated successfully"),
            RecordEvent::Deleted => format!("{label} deleted successfully"),
            RecordEvent::Missing => format!("{label} not found"),
        }
    }
}
