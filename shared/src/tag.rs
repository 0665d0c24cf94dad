/*!
Sensor tag lookup.

Every parameter group in a record starts with a one-byte tag naming the
sensor the following float belongs to. The mapping is fixed by the device
firmware and lives in a static table indexed by the tag byte.
*/

use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest tag value with an assigned name
pub const MAX_KNOWN_TAG: u8 = 0x2B;

/// Field names indexed by tag byte. Gaps are unassigned tags.
static FIELD_NAMES: [Option<&str>; MAX_KNOWN_TAG as usize + 1] = [
    Some("Reserved"), // 0x00
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    Some("Exhaled carbon dioxide content"), // 0x10
    Some("Exhaled oxygen content"),
    Some("Body temperature"),
    Some("Humidity of exhalation"),
    Some("Index of volatile organic compounds (TVOC) in exhalation"),
    Some("Atmosphere pressure"),
    Some("Outside temperature"),
    Some("Electrocardiogram readings"),
    Some("IMU ax"), // 0x18
    Some("IMU ay"),
    Some("IMU az"),
    Some("IMU gx"),
    Some("IMU gy"),
    Some("IMU gz"),
    Some("IMU mx"),
    Some("IMU my"),
    Some("IMU mz"), // 0x20
    Some("Photoplethysmogram red"),
    Some("Photoplethysmogram IR"),
    Some("Photoplethysmogram green"),
    Some("Blood oxygen level (SpO2)"),
    Some("Height"),
    Some("Heart rate"),
    Some("Steps"),
    Some("Battery charge"), // 0x28
    Some("Exhaled Volatile Organic Compound (TVOC) Index (external sensor)"),
    Some("Carbon dioxide content (external sensor)"),
    Some("Outside humidity"), // 0x2B
];

/// A parameter tag byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FieldTag(pub u8);

impl FieldTag {
    /// Human-readable field name, or `None` for an unassigned tag
    pub fn name(self) -> Option<&'static str> {
        field_name(self.0)
    }

    /// Check whether the tag has an assigned name
    pub fn is_known(self) -> bool {
        self.name().is_some()
    }
}

impl From<u8> for FieldTag {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for FieldTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X}", self.0)
    }
}

/// Look up the field name for a raw tag byte
pub fn field_name(tag: u8) -> Option<&'static str> {
    FIELD_NAMES.get(tag as usize).copied().flatten()
}

/// Iterate over every assigned (tag, name) pair in tag order
pub fn known_fields() -> impl Iterator<Item = (FieldTag, &'static str)> {
    FIELD_NAMES
        .iter()
        .enumerate()
        .filter_map(|(tag, name)| name.map(|name| (FieldTag(tag as u8), name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_tags() {
        assert_eq!(field_name(0x10), Some("Exhaled carbon dioxide content"));
        assert_eq!(field_name(0x26), Some("Heart rate"));
        assert_eq!(field_name(0x2B), Some("Outside humidity"));
        assert_eq!(field_name(0x00), Some("Reserved"));
    }

    #[test]
    fn test_unknown_tags() {
        assert_eq!(field_name(0x01), None);
        assert_eq!(field_name(0x0F), None);
        assert_eq!(field_name(0x2C), None);
        assert_eq!(field_name(0xFF), None);
        assert!(!FieldTag(0x99).is_known());
    }

    #[test]
    fn test_table_size() {
        // 28 sensor fields plus "Reserved"
        assert_eq!(known_fields().count(), 29);
        let names: std::collections::HashSet<_> = known_fields().map(|(_, name)| name).collect();
        assert_eq!(names.len(), 29);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldTag(0x0A).to_string(), "0A");
    }
}
