//! Field key normalization.
//!
//! Gateway payloads carry mixed-case field keys (`isOpen`, `DeviceType`);
//! discovery topics and unique ids use lowercase, underscore-separated keys.

/// Normalize a raw field key into a lowercase, underscore-separated entity key.
///
/// An underscore is inserted before every uppercase letter, the letter is
/// lowercased, and any leading underscore is stripped: `"DeviceType"` becomes
/// `"device_type"`, `"isOpen"` becomes `"is_open"`.
pub fn normalize_key(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    for c in raw.chars() {
        if c.is_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out.trim_start_matches('_').to_string()
}

/// Derive a human-readable display name from a normalized entity key.
///
/// Underscores become spaces and each word is capitalized: `"is_open"`
/// becomes `"Is Open"`.
pub fn display_name(entity_key: &str) -> String {
    entity_key
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("DeviceType"), "device_type");
        assert_eq!(normalize_key("isOpen"), "is_open");
        assert_eq!(normalize_key("plain"), "plain");
        assert_eq!(normalize_key("batteryLevelPercent"), "battery_level_percent");
    }

    #[test]
    fn test_leading_uppercase_has_no_leading_separator() {
        assert_eq!(normalize_key("Temperature"), "temperature");
        assert!(!normalize_key("Temperature").starts_with('_'));
    }

    #[test]
    fn test_normalized_keys_are_fixed_points() {
        for key in ["device_type", "is_open", "plain"] {
            assert_eq!(normalize_key(key), key);
        }
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("is_open"), "Is Open");
        assert_eq!(display_name("device_type"), "Device Type");
        assert_eq!(display_name("plain"), "Plain");
    }
}
