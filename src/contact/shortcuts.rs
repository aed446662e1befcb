use super::payload::Field;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Focus(Field),
    Submit,
}

impl Shortcut {
    /// Maps a keydown to a form shortcut: `Alt+N/L/E/P/M` focus a field,
    /// `Ctrl+Enter` submits.
    pub fn from_key(key: &str, alt: bool, ctrl: bool) -> Option<Self> {
        if ctrl && key == "Enter" {
            return Some(Shortcut::Submit);
        }
        if !alt {
            return None;
        }
        let field = match key.to_ascii_lowercase().as_str() {
            "n" => Field::FirstName,
            "l" => Field::LastName,
            "e" => Field::Email,
            "p" => Field::Phone,
            "m" => Field::Message,
            _ => return None,
        };
        Some(Shortcut::Focus(field))
    }

    /// Hint rendered inside the field.
    pub fn hint(field: Field) -> Option<&'static str> {
        match field {
            Field::FirstName => Some("Alt + N"),
            Field::LastName => Some("Alt + L"),
            Field::Email => Some("Alt + E"),
            Field::Phone => Some("Alt + P"),
            Field::Message => Some("Alt + M"),
            _ => None,
        }
    }
}
