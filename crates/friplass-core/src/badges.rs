/// Known amenity badges and their display labels, in display order.
pub const BADGES: [(&str, &str); 10] = [
    ("strom", "Strøm"),
    ("vann", "Vann"),
    ("toalett", "Toalett"),
    ("dusj", "Dusj"),
    ("wifi", "Wi-Fi"),
    ("naer_sjo", "Nær sjø"),
    ("familievennlig", "Familievennlig"),
    ("rolig", "Rolig område"),
    ("enkel_adkomst", "Enkel adkomst"),
    ("hund_tillatt", "Hund tillatt"),
];

/// Display label for a badge key; unknown keys are shown as-is.
#[must_use]
pub fn badge_label(key: &str) -> &str {
    BADGES
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(key, |(_, label)| *label)
}
