use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

pub use super::schema;
pub use super::schema::{chats, messages, users};

/// Coarse polarity of a message. `Unknown` exists so an `UNKNOWN` label
/// arriving over the wire still deserializes; the local classifier never
/// produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "POSITIVE"),
            Self::Negative => write!(f, "NEGATIVE"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Severity tier derived from sentiment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyTier {
    Low,
    Normal,
    High,
}

impl UrgencyTier {
    pub fn score(&self) -> i32 {
        match self {
            Self::Low => 1,
            Self::Normal => 2,
            Self::High => 3,
        }
    }
}

impl std::fmt::Display for UrgencyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Normal => write!(f, "NORMAL"),
            Self::High => write!(f, "HIGH"),
        }
    }
}

/// Classification of a single message: sentiment plus the urgency signal
/// derived from it. Tier and score are a fixed function of sentiment, so
/// the only way to build one is [`Classification::from_sentiment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub sentiment: Sentiment,
    pub urgency_tier: UrgencyTier,
    pub urgency_score: i32,
    pub reaction_glyph: Option<String>,
}

impl Classification {
    pub fn from_sentiment(sentiment: Sentiment) -> Self {
        let urgency_tier = match sentiment {
            Sentiment::Negative => UrgencyTier::High,
            Sentiment::Positive => UrgencyTier::Low,
            Sentiment::Neutral | Sentiment::Unknown => UrgencyTier::Normal,
        };
        let reaction_glyph = match sentiment {
            Sentiment::Negative => Some("😢".to_string()),
            Sentiment::Positive => Some("😊".to_string()),
            Sentiment::Neutral | Sentiment::Unknown => None,
        };
        Self {
            sentiment,
            urgency_score: urgency_tier.score(),
            urgency_tier,
            reaction_glyph,
        }
    }

    pub fn neutral() -> Self {
        Self::from_sentiment(Sentiment::Neutral)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = users)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = chats)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub aggregate_sentiment: String,
    pub aggregate_urgency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chats)]
pub struct NewChat {
    pub title: String,
    pub description: Option<String>,
    pub aggregate_sentiment: String,
    pub aggregate_urgency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewChat {
    /// A freshly created chat starts with neutral aggregates; the pipeline
    /// overwrites them as messages arrive.
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            title: title.into(),
            description,
            aggregate_sentiment: Sentiment::Neutral.to_string(),
            aggregate_urgency: UrgencyTier::Normal.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable, Selectable)]
#[diesel(table_name = messages)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: i32,
    pub chat_id: i32,
    pub author_user_id: Option<i32>,
    pub content: String,
    pub status: String,
    pub sentiment: String,
    pub urgency_tier: String,
    pub urgency_score: i32,
    pub reaction_glyph: Option<String>,
    pub is_bot: bool,
    pub alert_triggered: bool,
    pub created_at: DateTime<Utc>,
}

/// Insertable message row. Classification is part of construction — a
/// message is never persisted unclassified and never patched afterwards.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub chat_id: i32,
    pub author_user_id: Option<i32>,
    pub content: String,
    pub status: String,
    pub sentiment: String,
    pub urgency_tier: String,
    pub urgency_score: i32,
    pub reaction_glyph: Option<String>,
    pub is_bot: bool,
    pub alert_triggered: bool,
    pub created_at: DateTime<Utc>,
}

impl NewMessage {
    /// A user message carries its classification and raises the alert flag
    /// when the urgency score reaches the severe threshold.
    pub fn from_user(
        chat_id: i32,
        author_user_id: i32,
        content: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            chat_id,
            author_user_id: Some(author_user_id),
            content: content.into(),
            status: "sent".to_string(),
            sentiment: classification.sentiment.to_string(),
            urgency_tier: classification.urgency_tier.to_string(),
            urgency_score: classification.urgency_score,
            reaction_glyph: classification.reaction_glyph,
            is_bot: false,
            alert_triggered: classification.urgency_score >= 3,
            created_at: Utc::now(),
        }
    }

    /// A bot message has no author, neutral classification fields and never
    /// triggers an alert.
    pub fn from_bot(chat_id: i32, content: impl Into<String>) -> Self {
        let classification = Classification::neutral();
        Self {
            chat_id,
            author_user_id: None,
            content: content.into(),
            status: "sent".to_string(),
            sentiment: classification.sentiment.to_string(),
            urgency_tier: classification.urgency_tier.to_string(),
            urgency_score: classification.urgency_score,
            reaction_glyph: None,
            is_bot: true,
            alert_triggered: false,
            created_at: Utc::now(),
        }
    }
}
