use std::collections::HashMap;

use crate::models::{
    ShortcutDeclaration,
    ShortcutError,
    ShortcutResult,
};
use crate::platform::{
    Modifier,
    Platform,
};

/// A modifier token as written in a pattern. `Mod` is resolved against the
/// platform at match time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierToken {
    Mod,
    Shift,
    Alt,
    Ctrl,
    Meta,
}

impl ModifierToken {
    pub fn resolve(&self, platform: Platform) -> Modifier {
        match self {
            ModifierToken::Mod => platform.command_modifier(),
            ModifierToken::Shift => Modifier::Shift,
            ModifierToken::Alt => Modifier::Alt,
            ModifierToken::Ctrl => Modifier::Control,
            ModifierToken::Meta => Modifier::Meta,
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "mod" => Some(ModifierToken::Mod),
            "shift" => Some(ModifierToken::Shift),
            "alt" | "option" | "opt" => Some(ModifierToken::Alt),
            "ctrl" | "control" => Some(ModifierToken::Ctrl),
            "meta" | "cmd" | "super" => Some(ModifierToken::Meta),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPattern {
    Simple(String),
    Combo {
        modifiers: Vec<ModifierToken>,
        key: String,
    },
    Chord {
        first: String,
        second: String,
    },
}

impl KeyPattern {
    /// The key that starts this chord, if it is one.
    pub fn chord_start(&self) -> Option<&str> {
        match self {
            KeyPattern::Chord { first, .. } => Some(first),
            _ => None,
        }
    }
}

pub struct ShortcutParser {
    key_aliases: HashMap<&'static str, &'static str>,
}

impl Default for ShortcutParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutParser {
    pub fn new() -> Self {
        let key_aliases = HashMap::from([
            ("plus", "+"),
            ("space", " "),
            ("spacebar", " "),
            ("esc", "escape"),
            ("return", "enter"),
            ("up", "arrowup"),
            ("down", "arrowdown"),
            ("left", "arrowleft"),
            ("right", "arrowright"),
            ("del", "delete"),
            ("comma", ","),
            ("slash", "/"),
            ("period", "."),
        ]);

        Self { key_aliases }
    }

    /// Lowercases a key name and maps aliases onto the names key events use.
    pub fn normalize_key(&self, key: &str) -> String {
        if key == " " {
            return key.to_string();
        }
        let lower = key.trim().to_lowercase();
        match self.key_aliases.get(lower.as_str()) {
            Some(alias) => (*alias).to_string(),
            None => lower,
        }
    }

    pub fn parse_key(&self, pattern: &str) -> ShortcutResult<KeyPattern> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(ShortcutError::InvalidShortcut(
                "Empty shortcut string".to_string(),
            ));
        }

        if pattern == "+" {
            return Ok(KeyPattern::Simple("+".to_string()));
        }

        let parts: Vec<&str> = pattern.split('+').map(|p| p.trim()).collect();
        let Some((key_part, modifier_parts)) = parts.split_last() else {
            return Err(ShortcutError::InvalidShortcut(pattern.to_string()));
        };

        if modifier_parts.is_empty() {
            return Ok(KeyPattern::Simple(self.normalize_key(key_part)));
        }

        let mut modifiers = Vec::with_capacity(modifier_parts.len());
        for part in modifier_parts {
            let token = ModifierToken::from_token(&part.to_lowercase()).ok_or_else(|| {
                ShortcutError::InvalidShortcut(format!("Unknown modifier: {}", part))
            })?;
            modifiers.push(token);
        }

        if key_part.is_empty() {
            return Err(ShortcutError::InvalidShortcut(format!(
                "No key specified: {}",
                pattern
            )));
        }
        if ModifierToken::from_token(&key_part.to_lowercase()).is_some() {
            return Err(ShortcutError::InvalidShortcut(format!(
                "Modifier used as key: {}",
                pattern
            )));
        }

        Ok(KeyPattern::Combo {
            modifiers,
            key: self.normalize_key(key_part),
        })
    }

    pub fn parse_chord(&self, pattern: &str) -> ShortcutResult<KeyPattern> {
        let parts: Vec<&str> = pattern.split('+').map(|p| p.trim()).collect();
        match parts.as_slice() {
            [first, second] if !first.is_empty() && !second.is_empty() => Ok(KeyPattern::Chord {
                first: self.normalize_key(first),
                second: self.normalize_key(second),
            }),
            _ => Err(ShortcutError::InvalidShortcut(format!(
                "Chord must have exactly two keys: {}",
                pattern
            ))),
        }
    }

    /// A chord pattern, when present, takes precedence over the key pattern.
    pub fn parse_declaration(&self, declaration: &ShortcutDeclaration) -> ShortcutResult<KeyPattern> {
        match &declaration.chord_pattern {
            Some(chord) => self.parse_chord(chord),
            None => self.parse_key(&declaration.key_pattern),
        }
    }

    pub fn validate_shortcut(&self, pattern: &str) -> bool {
        self.parse_key(pattern).is_ok()
    }

    pub fn format_label(&self, pattern: &KeyPattern, platform: Platform) -> String {
        match pattern {
            KeyPattern::Simple(key) => format_key_display(key),
            KeyPattern::Chord { first, second } => format!(
                "{} then {}",
                format_key_display(first),
                format_key_display(second)
            ),
            KeyPattern::Combo { modifiers, key } => {
                let resolved: Vec<Modifier> =
                    modifiers.iter().map(|m| m.resolve(platform)).collect();
                if platform.is_apple() {
                    let mut label: String = resolved.iter().map(|m| m.glyph()).collect();
                    label.push_str(&format_key_display(key));
                    label
                } else {
                    let mut parts: Vec<String> =
                        resolved.iter().map(|m| m.name().to_string()).collect();
                    parts.push(format_key_display(key));
                    parts.join("+")
                }
            }
        }
    }

    /// Parses and formats in one step; malformed patterns are shown as written.
    pub fn label_for(&self, key_pattern: &str, chord_pattern: Option<&str>, platform: Platform) -> String {
        let parsed = match chord_pattern {
            Some(chord) => self.parse_chord(chord),
            None => self.parse_key(key_pattern),
        };
        match parsed {
            Ok(pattern) => self.format_label(&pattern, platform),
            Err(_) => chord_pattern.unwrap_or(key_pattern).to_string(),
        }
    }
}

fn format_key_display(key: &str) -> String {
    match key {
        " " => "Space".to_string(),
        "arrowup" => "Up".to_string(),
        "arrowdown" => "Down".to_string(),
        "arrowleft" => "Left".to_string(),
        "arrowright" => "Right".to_string(),
        "pageup" => "PageUp".to_string(),
        "pagedown" => "PageDown".to_string(),
        "escape" => "Esc".to_string(),
        key if key.starts_with('f') && key.len() <= 3 && key.len() > 1 => key.to_uppercase(),
        _ => {
            let mut chars: Vec<char> = key.chars().collect();
            if let Some(first_char) = chars.first_mut() {
                *first_char = first_char.to_uppercase().next().unwrap_or(*first_char);
            }
            chars.into_iter().collect()
        }
    }
}
