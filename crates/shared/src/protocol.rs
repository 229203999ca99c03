use serde::{Deserialize, Serialize};

use crate::domain::{Action, PlayerId};

/// Body a Farcaster client POSTs when a frame button is pressed. Every field
/// is optional: the frame still renders for a bare or malformed press, and
/// `trustedData` is accepted without signature verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrameSignaturePacket {
    pub untrusted_data: Option<UntrustedData>,
    pub trusted_data: Option<TrustedData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UntrustedData {
    pub fid: Option<i64>,
    pub url: Option<String>,
    pub message_hash: Option<String>,
    pub timestamp: Option<i64>,
    pub network: Option<i64>,
    pub button_index: Option<u8>,
    pub cast_id: Option<CastId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CastId {
    pub fid: Option<i64>,
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrustedData {
    pub message_bytes: Option<String>,
}

impl FrameSignaturePacket {
    /// The player row this press belongs to, keyed by fid.
    pub fn player(&self) -> PlayerId {
        self.untrusted_data
            .as_ref()
            .and_then(|data| data.fid)
            .map(PlayerId)
            .unwrap_or(PlayerId::ANONYMOUS)
    }

    pub fn action(&self) -> Option<Action> {
        self.untrusted_data
            .as_ref()
            .and_then(|data| data.button_index)
            .and_then(Action::from_button_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_press_payload() {
        let packet: FrameSignaturePacket = serde_json::from_str(
            r#"{
                "untrustedData": {
                    "fid": 482,
                    "buttonIndex": 4,
                    "castId": { "fid": 482, "hash": "0xabc" }
                },
                "trustedData": { "messageBytes": "d2b1..." }
            }"#,
        )
        .expect("packet");
        assert_eq!(packet.player(), PlayerId(482));
        assert_eq!(packet.action(), Some(Action::Right));
    }

    #[test]
    fn empty_body_falls_back_to_anonymous_player() {
        let packet: FrameSignaturePacket = serde_json::from_str("{}").expect("packet");
        assert_eq!(packet.player(), PlayerId::ANONYMOUS);
        assert_eq!(packet.action(), None);
    }

    #[test]
    fn out_of_range_button_index_maps_to_no_action() {
        let packet: FrameSignaturePacket =
            serde_json::from_str(r#"{ "untrustedData": { "buttonIndex": 9 } }"#).expect("packet");
        assert_eq!(packet.action(), None);
    }
}
