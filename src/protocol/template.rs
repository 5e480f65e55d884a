//! Placeholder substitution for system instructions
//!
//! Plain text replacement only; unknown `{{...}}` tokens are left untouched.

use chrono::{Local, NaiveDateTime};

/// Replaced by the local timestamp (`YYYY-MM-DD HH:MM:SS`)
pub const CURRENT_TIME: &str = "{{current_time}}";
/// Replaced by the English weekday name
pub const DAY_OF_WEEK: &str = "{{day_of_week}}";
/// Replaced by the configured location
pub const LOCATION: &str = "{{location}}";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Substitute placeholders using the current local time
pub fn apply_template(content: &str, location: &str) -> String {
    apply_template_at(content, Local::now().naive_local(), location)
}

/// Substitute placeholders using a fixed clock value
pub fn apply_template_at(content: &str, now: NaiveDateTime, location: &str) -> String {
    if content.is_empty() {
        return String::new();
    }
    content
        .replace(CURRENT_TIME, &now.format(TIMESTAMP_FORMAT).to_string())
        .replace(DAY_OF_WEEK, &now.format("%A").to_string())
        .replace(LOCATION, location)
}

/// Instruction used when the batch was started without one
pub fn default_instruction(now: NaiveDateTime) -> String {
    format!(
        "You are Gemini. Current time: {}",
        now.format(TIMESTAMP_FORMAT)
    )
}

/// Final system content for one prompt: substituted instruction, or the
/// generated default when the substitution leaves nothing
pub fn resolve_system_content(instruction: Option<&str>, now: NaiveDateTime, location: &str) -> String {
    let content = apply_template_at(instruction.unwrap_or_default(), now, location);
    if content.trim().is_empty() {
        default_instruction(now)
    } else {
        content
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(9, 5, 3)
            .unwrap()
    }

    #[test]
    fn replaces_all_known_placeholders() {
        let out = apply_template_at(
            "Now {{current_time}} ({{day_of_week}}) in {{location}}; again {{location}}",
            fixed_now(),
            "Washington, DC",
        );
        assert_eq!(
            out,
            "Now 2026-10-16 09:05:03 (Friday) in Washington, DC; again Washington, DC"
        );
    }

    #[test]
    fn leaves_unknown_placeholders_alone() {
        let out = apply_template_at("Hi {{user}} {{ current_time }}", fixed_now(), "X");
        assert_eq!(out, "Hi {{user}} {{ current_time }}");
    }

    #[test]
    fn empty_instruction_stays_empty() {
        assert_eq!(apply_template_at("", fixed_now(), "X"), "");
    }

    #[test]
    fn missing_instruction_falls_back_to_default() {
        let expected = "You are Gemini. Current time: 2026-10-16 09:05:03";
        assert_eq!(resolve_system_content(None, fixed_now(), "X"), expected);
        assert_eq!(resolve_system_content(Some("   "), fixed_now(), "X"), expected);
    }

    #[test]
    fn present_instruction_is_substituted() {
        assert_eq!(
            resolve_system_content(Some("Today is {{day_of_week}}."), fixed_now(), "X"),
            "Today is Friday."
        );
    }
}
