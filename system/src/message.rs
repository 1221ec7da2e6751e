use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{ConnectionId, RosterEntry};

/// One wire event, inbound or outbound, discriminated by the `type` field.
///
/// Drawing payloads are opaque to the server; they are stored and relayed
/// verbatim. Event kinds the server does not recognize deserialize into
/// `Unrecognized` so dispatch stays exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Envelope {
    Draw {
        data: Value,
    },
    Clear,
    Chat {
        text: String,
        /// Stamped by the server on outbound chat; anything a client sends
        /// here is discarded.
        #[serde(default)]
        user_name: String,
    },
    CanvasState {
        data: Vec<Value>,
    },
    UserJoined {
        client_id: ConnectionId,
        user_name: String,
    },
    UserLeft {
        client_id: ConnectionId,
        user_name: String,
    },
    UserList {
        users: Vec<RosterEntry>,
    },
    #[serde(other)]
    Unrecognized,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn it_deserializes_draw_with_opaque_payload() {
        let envelope: Envelope =
            serde_json::from_str(r##"{"type":"draw","data":{"x":1,"y":2,"color":"#000"}}"##)
                .expect("valid draw");
        assert_eq!(
            envelope,
            Envelope::Draw {
                data: json!({"x": 1, "y": 2, "color": "#000"})
            }
        );
    }

    #[test]
    fn it_deserializes_clear_without_fields() {
        let envelope: Envelope = serde_json::from_str(r#"{"type":"clear"}"#).expect("valid clear");
        assert_eq!(envelope, Envelope::Clear);
    }

    #[test]
    fn it_defaults_missing_chat_user_name() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"type":"chat","text":"hello"}"#).expect("valid chat");
        assert_eq!(
            envelope,
            Envelope::Chat {
                text: "hello".into(),
                user_name: String::new(),
            }
        );
    }

    #[test]
    fn it_maps_unknown_kind_to_unrecognized() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"type":"cursor_move","x":10,"y":20}"#).expect("tag present");
        assert_eq!(envelope, Envelope::Unrecognized);
    }

    #[test]
    fn it_serializes_outbound_kinds_with_wire_field_names() {
        let user_joined = Envelope::UserJoined {
            client_id: "c1".into(),
            user_name: "BouncyPenguin".into(),
        };
        assert_eq!(
            serde_json::to_value(&user_joined).expect("must serialize"),
            json!({"type": "user_joined", "client_id": "c1", "user_name": "BouncyPenguin"})
        );

        let user_list = Envelope::UserList {
            users: vec![RosterEntry {
                id: "c1".into(),
                name: "BouncyPenguin".into(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&user_list).expect("must serialize"),
            json!({"type": "user_list", "users": [{"id": "c1", "name": "BouncyPenguin"}]})
        );

        let canvas_state = Envelope::CanvasState {
            data: vec![json!({"x": 1})],
        };
        assert_eq!(
            serde_json::to_value(&canvas_state).expect("must serialize"),
            json!({"type": "canvas_state", "data": [{"x": 1}]})
        );
    }
}
