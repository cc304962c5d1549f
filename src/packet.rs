//! Notification packet model and the fixed quickstart template.

use serde::{Deserialize, Serialize};

use crate::store::unix_now;

/// JSON-pointer paths sealed end-to-end before a packet leaves the service.
pub const ENCRYPTED_PATHS: [&str; 2] = ["/packetId", "/icon/value"];

/// A notification packet as the platform cloud expects it on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packet {
    pub packet_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
    pub title: String,
    pub actions: Vec<PacketAction>,
    pub body: String,
    pub template_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Icon {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

/// An action descriptor the user's device renders alongside the packet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub action_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<Icon>,
}

/// The example packet this quickstart broadcasts — an actionable text
/// notification with a reply action and a mark-as-read webhook action.
pub fn quickstart_packet() -> Packet {
    Packet {
        packet_id: "lumen-quickstart-ability".to_string(),
        timestamp: unix_now().to_string(),
        icon: Some(Icon {
            kind: "URL".to_string(),
            value: "https://via.placeholder.com/300".to_string(),
        }),
        title: "Lumen Quickstart".to_string(),
        actions: vec![
            PacketAction {
                kind: "system:reply".to_string(),
                action_id: "reply".to_string(),
                title: "Respond".to_string(),
                icon: None,
            },
            PacketAction {
                kind: "system:webhook".to_string(),
                action_id: "mark_as_read".to_string(),
                title: "Mark as Read".to_string(),
                icon: Some(Icon {
                    kind: "URL".to_string(),
                    value: "static:/system/icon/mark-as-read".to_string(),
                }),
            },
        ],
        body: "Test quickstart message".to_string(),
        template_id: "actionable_text".to_string(),
    }
}
