//! Integer codes used for enums on the wire.
//!
//! Clients and the backend exchange `StressLevel` and `ContentType` as
//! 1-based integers. The mapping lives in explicit tables here so the
//! domain enums stay free of numbering concerns.

use crate::{ContentType, Error, StressLevel};

/// Wire codes for stress levels
pub const STRESS_LEVEL_CODES: [(StressLevel, u8); 4] = [
    (StressLevel::Low, 1),
    (StressLevel::Medium, 2),
    (StressLevel::High, 3),
    (StressLevel::Critical, 4),
];

/// Wire codes for content types
pub const CONTENT_TYPE_CODES: [(ContentType, u8); 3] = [
    (ContentType::Article, 1),
    (ContentType::Video, 2),
    (ContentType::Quiz, 3),
];

fn encode<T: PartialEq + Copy>(table: &[(T, u8)], value: T) -> u8 {
    table
        .iter()
        .find(|(variant, _)| *variant == value)
        .map(|(_, code)| *code)
        // every variant has a table row
        .unwrap_or_default()
}

fn decode<T: Copy>(table: &[(T, u8)], kind: &'static str, code: u8) -> Result<T, Error> {
    table
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(variant, _)| *variant)
        .ok_or(Error::UnknownWireCode { kind, code })
}

impl From<StressLevel> for u8 {
    fn from(level: StressLevel) -> u8 {
        encode(&STRESS_LEVEL_CODES, level)
    }
}

impl TryFrom<u8> for StressLevel {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        decode(&STRESS_LEVEL_CODES, "stress level", code)
    }
}

impl From<ContentType> for u8 {
    fn from(kind: ContentType) -> u8 {
        encode(&CONTENT_TYPE_CODES, kind)
    }
}

impl TryFrom<u8> for ContentType {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self, Error> {
        decode(&CONTENT_TYPE_CODES, "content type", code)
    }
}

/// Serde adapter that writes a stress level by lowercase name.
///
/// Used where humans edit the value (config files) instead of the integer code.
pub mod level_by_name {
    use crate::StressLevel;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(level: &StressLevel, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(level.name())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StressLevel, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}
