use serde::{Deserialize, Serialize};

use crate::{
    domain::{FoodId, MenuItem, PlaceId},
    error::BusinessError,
};

/// respCodes the backend uses for an invalidated session; both force a
/// logout regardless of the `ok` flag next to them.
pub const SESSION_EXPIRED_RESP_CODES: [&str; 2] = ["10006", "10007"];

/// The `ro` sub-structure every API result is wrapped in: business-level
/// success/failure independent of transport status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseObject {
    pub ok: bool,
    #[serde(rename = "respCode", default, skip_serializing_if = "Option::is_none")]
    pub resp_code: Option<String>,
    #[serde(rename = "respMsg", default, skip_serializing_if = "Option::is_none")]
    pub resp_msg: Option<String>,
}

impl ResponseObject {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            resp_code: None,
            resp_msg: None,
        }
    }

    pub fn rejected(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            resp_code: Some(code.into()),
            resp_msg: Some(message.into()),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        self.resp_code
            .as_deref()
            .is_some_and(|code| SESSION_EXPIRED_RESP_CODES.contains(&code))
    }

    /// Callers must branch here before trusting `data`. The session-expired
    /// check wins over `ok` so a half-formed envelope cannot mask a forced
    /// logout.
    pub fn to_result(&self) -> Result<(), BusinessError> {
        let code = || self.resp_code.clone().unwrap_or_default();
        let message = || self.resp_msg.clone().unwrap_or_default();

        if self.is_session_expired() {
            return Err(BusinessError::SessionExpired {
                code: code(),
                message: message(),
            });
        }
        if !self.ok {
            return Err(BusinessError::Rejected {
                code: code(),
                message: message(),
            });
        }
        Ok(())
    }
}

/// Outer response wrapper: the response object plus an optional payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub ro: ResponseObject,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyMenuPayload {
    pub food_list: Vec<MenuItem>,
    pub timestamp: i64,
    pub end_timestamp: i64,
}

/// Everything the order-creation screen (or the login flow resuming into
/// it) needs to continue an order started on the menu screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    pub food_id: FoodId,
    pub place_id: PlaceId,
    pub quantity: u32,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_envelope_parses_backend_shape() {
        let body = r#"{
            "ro": {"ok": true},
            "data": {
                "foodList": [{
                    "foodId": 42,
                    "foodName": "Braised beef rice",
                    "foodBrief": "with greens",
                    "price": 52.0,
                    "originPrice": 68.0,
                    "star": 4,
                    "extralImage": ["https://cdn.example.com/1.jpg"]
                }],
                "timestamp": 1700000000000,
                "endTimestamp": 1700003600000
            }
        }"#;

        let envelope: Envelope<DailyMenuPayload> = serde_json::from_str(body).expect("parse");
        assert!(envelope.ro.to_result().is_ok());
        let payload = envelope.data.expect("payload");
        assert_eq!(payload.food_list.len(), 1);
        assert_eq!(payload.food_list[0].name, "Braised beef rice");
        assert_eq!(payload.end_timestamp, 1_700_003_600_000);
    }

    #[test]
    fn empty_food_list_is_still_a_success() {
        let body = r#"{"ro":{"ok":true},"data":{"foodList":[],"timestamp":1700000000000,"endTimestamp":1700003600000}}"#;
        let envelope: Envelope<DailyMenuPayload> = serde_json::from_str(body).expect("parse");
        assert!(envelope.ro.to_result().is_ok());
        assert!(envelope.data.expect("payload").food_list.is_empty());
    }

    #[test]
    fn session_expired_code_wins_over_ok_flag() {
        let ro = ResponseObject {
            ok: true,
            resp_code: Some("10006".to_string()),
            resp_msg: Some("please sign in again".to_string()),
        };
        match ro.to_result() {
            Err(BusinessError::SessionExpired { code, message }) => {
                assert_eq!(code, "10006");
                assert_eq!(message, "please sign in again");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejection_without_distinguished_code_is_explicit() {
        let ro = ResponseObject::rejected("20001", "place closed today");
        assert!(matches!(
            ro.to_result(),
            Err(BusinessError::Rejected { .. })
        ));
    }
}
