//! Content-change events pushed to WebSocket clients.
//!
//! Each dashboard mutation emits one event naming the resource that changed,
//! so clients can refetch the matching cached queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Resource family a cached query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Articles,
    Tags,
    Subjects,
    Employees,
    Users,
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentAction {
    Created,
    Updated,
    Deleted,
}

/// Event sent to connected clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
#[serde(rename_all = "snake_case")]
pub enum ContentEvent {
    ContentChanged(ContentChangedPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChangedPayload {
    pub resource: Resource,
    pub action: ContentAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
}

impl ContentEvent {
    pub fn changed(resource: Resource, action: ContentAction, id: Uuid) -> Self {
        ContentEvent::ContentChanged(ContentChangedPayload {
            resource,
            action,
            id: Some(id),
        })
    }

    /// Whole-collection change with no single id (e.g. cascades from a tag rename).
    pub fn collection(resource: Resource, action: ContentAction) -> Self {
        ContentEvent::ContentChanged(ContentChangedPayload {
            resource,
            action,
            id: None,
        })
    }

    pub fn created(resource: Resource, id: Uuid) -> Self {
        Self::changed(resource, ContentAction::Created, id)
    }

    pub fn updated(resource: Resource, id: Uuid) -> Self {
        Self::changed(resource, ContentAction::Updated, id)
    }

    pub fn deleted(resource: Resource, id: Uuid) -> Self {
        Self::changed(resource, ContentAction::Deleted, id)
    }
}

/// Wrapper that includes timestamp with every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentEventMessage {
    #[serde(flatten)]
    pub event: ContentEvent,
    pub timestamp: DateTime<Utc>,
}

impl ContentEventMessage {
    pub fn new(event: ContentEvent) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}
