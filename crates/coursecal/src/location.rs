//! Interpretation of free-text meeting locations.
//!
//! Location text comes in two historical shapes:
//! - new: `"UBC | Hennings Building (HENN) | Floor: 2 | Room: 200"`
//! - old: `"HENN - Room 200"`
//!
//! There is no version marker, so extraction tries the new-format tokens first
//! and falls back to splitting the old format on `-`.

use crate::address::AddressBook;
use regex::Regex;
use std::sync::LazyLock;

/// Address block for locations that can't be resolved.
pub const UNKNOWN_ADDRESS: &str = "Unknown Address";

/// Address block for online sections.
pub const ONLINE_ADDRESS: &str = "Online - Virtual Class\nCanada";

/// Display name for online sections.
pub const ONLINE_DISPLAY_NAME: &str = "💻 Online Class";

const CITY_LINE: &str = "Vancouver BC";
const COUNTRY_LINE: &str = "Canada";

static CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([A-Z0-9]+)\)").unwrap());
static ROOM_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Room:\s*([A-Za-z0-9\-]+)").unwrap());
static TRAILING_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([A-Z0-9]+\)\s*$").unwrap());

/// Human-facing rendering of one location string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationInfo {
    /// Multi-line postal text, or one of the sentinel blocks
    pub address_block: String,
    /// Building and room for event descriptions
    pub display_name: String,
}

/// Building code and room pulled out of a location string.
#[derive(Debug, Default, PartialEq, Eq)]
struct LocationTokens {
    code: Option<String>,
    room: Option<String>,
}

impl LocationTokens {
    /// Extracts the `(CODE)` and `Room: X` tokens of the new format.
    fn new_format(text: &str) -> Self {
        let code = CODE_REGEX
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_uppercase());
        let room = ROOM_REGEX
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());
        Self { code, room }
    }

    /// New-format extraction, falling back to `CODE - Room X` when no
    /// parenthesized code is present.
    fn with_fallback(text: &str) -> Self {
        let mut tokens = Self::new_format(text);
        if tokens.code.is_some() {
            return tokens;
        }

        let parts: Vec<&str> = text.split('-').collect();
        tokens.code = parts
            .first()
            .map(|code| code.trim().to_uppercase())
            .filter(|code| !code.is_empty());
        if parts.len() >= 2 && tokens.room.is_none() {
            tokens.room = parts
                .last()
                .map(|room| room.trim().replace("Room", "").trim().to_string())
                .filter(|room| !room.is_empty());
        }
        tokens
    }
}

fn is_online(text: &str) -> bool {
    text.to_lowercase().starts_with("online")
}

/// Resolves location text against the address table.
///
/// Both operations are pure: the same text always yields the same result.
#[derive(Debug, Clone, Copy)]
pub struct LocationInterpreter<'a> {
    book: &'a AddressBook,
}

impl<'a> LocationInterpreter<'a> {
    /// Creates an interpreter over a loaded address table.
    pub fn new(book: &'a AddressBook) -> Self {
        Self { book }
    }

    /// Computes both the address block and the display name.
    pub fn interpret(&self, location: &str) -> LocationInfo {
        LocationInfo {
            address_block: self.resolve_address(location),
            display_name: self.resolve_display_name(location),
        }
    }

    /// Returns the postal address block for a location.
    ///
    /// # Returns
    /// * `"<room>-<address>\nVancouver BC\nCanada"` for a known building with a room
    /// * `"<address>\nVancouver BC \nCanada"` for a known building without a room
    /// * [`ONLINE_ADDRESS`] for online sections
    /// * [`UNKNOWN_ADDRESS`] otherwise
    pub fn resolve_address(&self, location: &str) -> String {
        let loc = location.trim();
        if loc.is_empty() {
            return UNKNOWN_ADDRESS.to_string();
        }
        if is_online(loc) {
            return ONLINE_ADDRESS.to_string();
        }

        let tokens = LocationTokens::with_fallback(loc);
        let Some(entry) = tokens.code.as_deref().and_then(|code| self.book.resolve(code)) else {
            return UNKNOWN_ADDRESS.to_string();
        };

        match tokens.room {
            Some(room) => format!("{room}-{}\n{CITY_LINE}\n{COUNTRY_LINE}", entry.address),
            // Trailing space after the city line is part of the established output.
            None => format!("{}\n{CITY_LINE} \n{COUNTRY_LINE}", entry.address),
        }
    }

    /// Returns a readable building and room label for a location.
    ///
    /// Blank text is returned unchanged, and text that can't be resolved is
    /// returned trimmed.
    pub fn resolve_display_name(&self, location: &str) -> String {
        let loc = location.trim();
        if loc.is_empty() {
            return location.to_string();
        }
        if is_online(loc) {
            return ONLINE_DISPLAY_NAME.to_string();
        }

        let human_name = loc
            .split('|')
            .map(str::trim)
            .nth(1)
            .map(|piece| TRAILING_CODE_REGEX.replace(piece, "").trim().to_string());

        let LocationTokens { code, room } = LocationTokens::new_format(loc);

        if let Some((code, entry)) = code
            .as_deref()
            .and_then(|code| self.book.resolve(code).map(|entry| (code, entry)))
        {
            let name = human_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| entry.name.clone());
            return match room {
                Some(room) => format!("📍{name} ({code}) - Room {room}"),
                None => format!("📍{name} ({code})"),
            };
        }

        match (code, room) {
            (Some(code), Some(room)) => format!("📍{code} - Room {room}"),
            _ => loc.to_string(),
        }
    }
}
