use serde::{Deserialize, Deserializer};

use crate::error::Error;

/// Identifiers come back from the catalog either as strings or as bare JSON
/// numbers depending on how the sheet cell was typed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Text(String),
    Integer(i64),
    Decimal(f64),
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        match id {
            Identifier::Text(s) => s,
            Identifier::Integer(n) => n.to_string(),
            Identifier::Decimal(n) => n.to_string(),
        }
    }
}

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Identifier::deserialize(deserializer).map(String::from)
}

pub fn option_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Identifier>::deserialize(deserializer)?.map(String::from))
}

/// Validate an identifier typed by the user or taken from a route segment.
pub fn parse_identifier(s: &str) -> Result<String, Error> {
    let s = s.trim();
    if s.is_empty() {
        return Err(Error::EmptyIdentifier);
    }
    if s.contains('/') || s.contains(char::is_whitespace) {
        return Err(Error::InvalidIdentifier(s.to_string()));
    }

    Ok(s.to_string())
}
