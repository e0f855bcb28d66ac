use serde::{Deserialize, Serialize};

/// Message exchanged between the engine and an opponent backend.
///
/// Wire shape is `{"type":"play","cell":4}`. Unknown fields are ignored on
/// decode, so new kinds are added as new variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Play { cell: usize },
}

impl Notification {
    pub fn play(cell: usize) -> Self {
        Notification::Play { cell }
    }
}

/// One line of the stream transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireFrame {
    // Connecting side -> accepting side, first line only
    Hello { identifier: String },
    Notify(Notification),
}

impl WireFrame {
    pub fn encode(&self) -> serde_json::Result<String> {
        Ok(serde_json::to_string(self)? + "\n")
    }

    pub fn decode(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_wire_shape() {
        let json = serde_json::to_string(&Notification::play(4)).unwrap();
        assert_eq!(json, r#"{"type":"play","cell":4}"#);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let n: Notification =
            serde_json::from_str(r#"{"type":"play","cell":7,"kind":"future"}"#).unwrap();
        assert_eq!(n, Notification::play(7));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        assert!(serde_json::from_str::<Notification>(r#"{"type":"chat","text":"hi"}"#).is_err());
    }

    #[test]
    fn test_frame_is_one_line() {
        let frame = WireFrame::Hello {
            identifier: "ttt-1@127.0.0.1:4000".to_string(),
        };
        let line = frame.encode().unwrap();
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(WireFrame::decode(&line).unwrap(), frame);
    }
}
