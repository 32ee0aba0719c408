use serde::{
    Deserialize,
    Serialize,
};

use crate::models::KeyEvent;

pub const PLATFORM_ENV: &str = "SUITE_SHORTCUTS_PLATFORM";

const APPLE_TOKENS: [&str; 3] = ["mac", "ios", "ipados"];

const APPLE_PREFIXES: [&str; 8] = [
    "macintosh",
    "macintel",
    "macppc",
    "macos",
    "iphone",
    "ipad",
    "ipod",
    "darwin",
];

fn is_apple_token(token: &str) -> bool {
    APPLE_TOKENS.contains(&token)
        || APPLE_PREFIXES
            .iter()
            .any(|prefix| token.starts_with(prefix))
}

/// Returns true when the identifier names an Apple-style OS. The secondary
/// identifier is only consulted when the primary one is missing or blank.
///
/// Identifiers are split into alphanumeric words and each word is checked as
/// a whole, so `bios` or `emacs` never count as Apple.
pub fn is_apple_platform(primary: Option<&str>, secondary: Option<&str>) -> bool {
    let identifier = primary
        .filter(|id| !id.trim().is_empty())
        .or(secondary)
        .unwrap_or_default()
        .to_lowercase();

    identifier
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(is_apple_token)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    pub fn from_identifiers(primary: Option<&str>, secondary: Option<&str>) -> Self {
        if is_apple_platform(primary, secondary) {
            Self::Apple
        } else {
            Self::Other
        }
    }

    pub fn current() -> Self {
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        return Self::Apple;

        #[cfg(not(any(target_os = "macos", target_os = "ios")))]
        return Self::Other;
    }

    /// Honors the `SUITE_SHORTCUTS_PLATFORM` override, then the build target.
    pub fn detect() -> Self {
        match std::env::var(PLATFORM_ENV) {
            Ok(identifier) if !identifier.trim().is_empty() => {
                Self::from_identifiers(Some(identifier.as_str()), None)
            }
            _ => Self::current(),
        }
    }

    pub fn is_apple(&self) -> bool {
        matches!(self, Self::Apple)
    }

    /// The physical key behind the abstract `mod` token.
    pub fn command_modifier(&self) -> Modifier {
        match self {
            Self::Apple => Modifier::Meta,
            Self::Other => Modifier::Control,
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Meta,
    Control,
    Alt,
    Shift,
}

impl Modifier {
    pub fn is_held(&self, event: &KeyEvent) -> bool {
        match self {
            Modifier::Meta => event.meta,
            Modifier::Control => event.ctrl,
            Modifier::Alt => event.alt,
            Modifier::Shift => event.shift,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Modifier::Meta => "⌘",
            Modifier::Control => "⌃",
            Modifier::Alt => "⌥",
            Modifier::Shift => "⇧",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Meta => "Super",
            Modifier::Control => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
        }
    }
}
