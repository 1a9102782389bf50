use serde::Serialize;

/// A chat message: a plain-text fallback plus Block Kit layout blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Shown by surfaces that cannot render blocks (notifications, older clients).
    pub text: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Divider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl Block {
    pub fn header(text: impl Into<String>) -> Self {
        Block::Header {
            text: TextObject::PlainText {
                text: text.into(),
                emoji: true,
            },
        }
    }

    pub fn section(markdown: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::Mrkdwn {
                text: markdown.into(),
            },
        }
    }

    /// Layout kind as serialized in the `type` field.
    #[cfg(test)]
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Header { .. } => "header",
            Block::Section { .. } => "section",
            Block::Divider => "divider",
        }
    }

    #[cfg(test)]
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Header { text } | Block::Section { text } => Some(text.as_str()),
            Block::Divider => None,
        }
    }
}

#[cfg(test)]
impl TextObject {
    pub fn as_str(&self) -> &str {
        match self {
            TextObject::PlainText { text, .. } | TextObject::Mrkdwn { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_serialization() {
        let message = ChatMessage {
            text: "fallback".to_string(),
            blocks: vec![Block::header("Title"), Block::Divider, Block::section("*bold*")],
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "fallback",
                "blocks": [
                    { "type": "header", "text": { "type": "plain_text", "text": "Title", "emoji": true } },
                    { "type": "divider" },
                    { "type": "section", "text": { "type": "mrkdwn", "text": "*bold*" } }
                ]
            })
        );
    }

    #[test]
    fn test_block_accessors() {
        assert_eq!(Block::Divider.kind(), "divider");
        assert_eq!(Block::Divider.text(), None);
        assert_eq!(Block::section("hi").text(), Some("hi"));
        assert_eq!(Block::header("hi").kind(), "header");
    }
}
