//! Family members and notification recipients
//!
//! Family data travels inside an event as two serialized JSON lists: the
//! family members and the selected children the event is for. Both are parsed
//! only when a reminder is dispatched.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A family member attached to an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

impl FamilyMember {
    pub fn family_role(&self) -> FamilyRole {
        FamilyRole::parse(&self.role)
    }
}

/// Role of a family member, parsed leniently from free text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FamilyRole {
    Father,
    Mother,
    Other(String),
}

impl FamilyRole {
    /// Accepts English and Spanish spellings used by existing clients.
    pub fn parse(raw: &str) -> Self {
        let normalized = raw.trim().to_lowercase();
        match normalized.as_str() {
            "father" | "papa" | "papá" | "dad" => Self::Father,
            "mother" | "mama" | "mamá" | "mom" => Self::Mother,
            _ => Self::Other(normalized),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Father => "father",
            Self::Mother => "mother",
            Self::Other(role) => role,
        }
    }
}

/// Who a message is addressed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientRole {
    /// The event's own contact.
    Primary,
    Family(FamilyRole),
}

/// A derived, per-dispatch recipient.
///
/// Empty contact fields are normalised to `None`, which suppresses the
/// corresponding channel for this recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: RecipientRole,
}

impl Recipient {
    pub fn primary(email: &str, phone: &str) -> Self {
        Self { name: None, email: non_empty(email), phone: non_empty(phone), role: RecipientRole::Primary }
    }

    pub fn from_member(member: &FamilyMember) -> Self {
        Self {
            name: non_empty(&member.name),
            email: non_empty(&member.email),
            phone: non_empty(&member.phone),
            role: RecipientRole::Family(member.family_role()),
        }
    }

    pub const fn is_family(&self) -> bool {
        matches!(self.role, RecipientRole::Family(_))
    }
}

/// Parse the serialized family member list of an event.
///
/// An empty string or a JSON `null` is an empty list.
///
/// # Errors
/// Returns the JSON error when the payload is present but malformed.
pub fn parse_family_members(raw: &str) -> Result<Vec<FamilyMember>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let members: Option<Vec<FamilyMember>> = serde_json::from_str(raw)?;
    Ok(members.unwrap_or_default())
}

/// Parse the serialized list of selected child identifiers.
///
/// Identifiers may be strings or numbers; both are returned as strings.
///
/// # Errors
/// Returns the JSON error when the payload is present but malformed.
pub fn parse_selected_children(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let values: Option<Vec<Value>> = serde_json::from_str(raw)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s),
            Value::Null => None,
            other => Some(other.to_string()),
        })
        .collect())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}
