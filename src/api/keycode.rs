//! Browser key codes <-> key names, as sent by the interactive-control service.

const NAMED: &[(u16, &str)] = &[
    (8, "backspace"),
    (9, "tab"),
    (13, "enter"),
    (16, "shift"),
    (17, "ctrl"),
    (18, "alt"),
    (27, "esc"),
    (32, "space"),
    (37, "left"),
    (38, "up"),
    (39, "right"),
    (40, "down"),
    (186, "semicolon"),
    (187, "equal"),
    (188, "comma"),
    (189, "minus"),
    (190, "period"),
    (191, "slash"),
    (192, "grave"),
    (219, "bracketleft"),
    (220, "backslash"),
    (221, "bracketright"),
    (222, "apostrophe"),
];

pub fn name_for(code: u16) -> Option<String> {
    match code {
        48..=57 | 65..=90 => char::from_u32(code as u32).map(|c| c.to_ascii_lowercase().to_string()),
        96..=105 => Some(format!("numpad {}", code - 96)),
        112..=123 => Some(format!("f{}", code - 111)),
        _ => NAMED
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| name.to_string()),
    }
}

pub fn code_for(name: &str) -> Option<u16> {
    let name = name.trim().to_lowercase();
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_alphanumeric() {
            return Some(c.to_ascii_uppercase() as u16);
        }
    }
    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
        if (1..=12).contains(&n) {
            return Some(111 + n);
        }
    }
    if let Some(n) = name.strip_prefix("numpad ").and_then(|n| n.parse::<u16>().ok()) {
        if n <= 9 {
            return Some(96 + n);
        }
    }
    NAMED.iter().find(|(_, n)| *n == name).map(|(c, _)| *c)
}
