use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{round_position, Color};

/// One player's persisted state, keyed by `user_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    pub user_id: i64,
    pub x: i16,
    pub y: i16,
    pub online: bool,
    pub notification: i64,
    pub color: Color,
}

/// The fields a client owns and pushes back on every poll.
///
/// Color is deliberately absent: it belongs to the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdate {
    pub user_id: i64,
    pub x: f64,
    pub y: f64,
    pub online: bool,
    pub notification: i64,
}

impl PlayerUpdate {
    /// Applies this update on top of the store-owned color, producing the
    /// record that gets persisted.
    pub fn into_record(&self, color: Color) -> PlayerRecord {
        PlayerRecord {
            user_id: self.user_id,
            x: round_position(self.x),
            y: round_position(self.y),
            online: self.online,
            notification: self.notification,
            color,
        }
    }
}

impl From<&PlayerRecord> for PlayerUpdate {
    fn from(value: &PlayerRecord) -> Self {
        Self {
            user_id: value.user_id,
            x: value.x as f64,
            y: value.y as f64,
            online: value.online,
            notification: value.notification,
        }
    }
}

impl Display for PlayerRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.online { "online" } else { "offline" };
        write!(
            f,
            "#{} ({}, {}) {} notification={} color={}",
            self.user_id, self.x, self.y, status, self.notification, self.color
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_record_rounds_and_keeps_color() {
        let update = PlayerUpdate {
            user_id: 7,
            x: 10.6,
            y: 19.4,
            online: false,
            notification: 3,
        };

        let record = update.into_record(Color::from("red"));

        assert_eq!(
            record,
            PlayerRecord {
                user_id: 7,
                x: 11,
                y: 19,
                online: false,
                notification: 3,
                color: Color::from("red"),
            }
        );
    }

    #[test]
    fn test_serializes_with_client_field_names() {
        let record = PlayerRecord {
            user_id: 3,
            x: -4,
            y: 9,
            online: true,
            notification: 1,
            color: Color::from("#00ff00"),
        };

        let json = serde_json::to_value(&record).expect("Failed to serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "userId": 3,
                "x": -4,
                "y": 9,
                "online": true,
                "notification": 1,
                "color": "#00ff00"
            })
        );
    }

    #[test]
    fn test_update_deserializes_fractional_positions() {
        let update: PlayerUpdate = serde_json::from_str(
            r#"{"userId": 12, "x": 3.25, "y": -0.75, "online": true, "notification": 0}"#,
        )
        .expect("Failed to deserialize");

        assert_eq!(update.user_id, 12);
        assert_eq!(update.x, 3.25);
        assert!(update.online);
    }
}
