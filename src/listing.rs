//! Admin listing — formats stored profiles into transport-sized chunks.

use crate::profile::Profile;

/// Maximum length of one outgoing Telegram message.
pub const MESSAGE_LIMIT: usize = 4096;

/// One human-readable record block for a profile.
pub fn format_profile(profile: &Profile) -> String {
    format!(
        "Telegram ID: {}\n\
         Name: {}\n\
         Gender: {}\n\
         Notification time: {}\n\
         Frequency: {}\n\
         --------------------\n",
        profile.identity,
        profile.display_name.as_deref().unwrap_or("not set"),
        profile.gender,
        profile.notification_time,
        profile.notification_frequency,
    )
}

/// Format the full listing, split into chunks of at most `limit` bytes.
///
/// Records are packed greedily so a chunk boundary never falls inside a
/// record unless a single record alone exceeds the limit.
pub fn format_listing(profiles: &[Profile], limit: usize) -> Vec<String> {
    if profiles.is_empty() {
        return vec!["No registered users.".to_string()];
    }

    let header = "👥 Registered users:\n\n".to_string();
    let records = profiles.iter().map(format_profile);
    chunk_records(std::iter::once(header).chain(records), limit)
}

/// Pack record strings into chunks of at most `limit` bytes, keeping each
/// record whole where possible.
fn chunk_records(records: impl Iterator<Item = String>, limit: usize) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for record in records {
        if !current.is_empty() && current.len() + record.len() > limit {
            chunks.push(std::mem::take(&mut current));
        }
        if record.len() > limit {
            // An oversized record has to be hard-split.
            for piece in split_text(&record, limit) {
                if !current.is_empty() && current.len() + piece.len() > limit {
                    chunks.push(std::mem::take(&mut current));
                }
                current.push_str(&piece);
            }
        } else {
            current.push_str(&record);
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Split text into pieces that fit `max_len`, preferring newline then
/// space boundaries.
pub fn split_text(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        // Clamp the window to a char boundary; a fixed byte offset can
        // land inside a multibyte character.
        let mut end = max_len;
        while !remaining.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // First char alone exceeds max_len; emit it whole.
            end = remaining
                .chars()
                .next()
                .map(char::len_utf8)
                .unwrap_or(remaining.len());
        }

        let window = &remaining[..end];
        let split_at = window
            .rfind('\n')
            .or_else(|| window.rfind(' '))
            .unwrap_or(end);
        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { end } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Gender, NotificationTime, UserId};

    fn sample(id: i64, name: Option<&str>) -> Profile {
        Profile {
            identity: UserId(id),
            display_name: name.map(String::from),
            gender: Gender::Male,
            notification_time: NotificationTime { hour: 7, minute: 0 },
            notification_frequency: "daily".into(),
        }
    }

    #[test]
    fn empty_listing() {
        assert_eq!(format_listing(&[], MESSAGE_LIMIT), vec!["No registered users."]);
    }

    #[test]
    fn record_shows_placeholder_for_missing_name() {
        let text = format_profile(&sample(1, None));
        assert!(text.contains("Name: not set"));
        assert!(text.contains("Telegram ID: 1"));
        assert!(text.contains("Notification time: 7:00"));
    }

    #[test]
    fn small_listing_is_one_chunk() {
        let profiles: Vec<Profile> = (1..=5).map(|id| sample(id, Some("user"))).collect();
        let chunks = format_listing(&profiles, MESSAGE_LIMIT);
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].starts_with("👥 Registered users:"));
    }

    #[test]
    fn chunks_respect_limit_and_record_boundaries() {
        let profiles: Vec<Profile> = (1..=200).map(|id| sample(id, Some("someone"))).collect();
        let chunks = format_listing(&profiles, MESSAGE_LIMIT);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= MESSAGE_LIMIT);
        }
        // No record is split across chunks: every chunk after the first
        // starts at a record boundary.
        for chunk in &chunks[1..] {
            assert!(chunk.starts_with("Telegram ID: "), "chunk starts mid-record");
        }
        // Every profile appears exactly once overall.
        let joined: String = chunks.concat();
        for id in 1..=200 {
            assert!(joined.contains(&format!("Telegram ID: {id}\n")));
        }
    }

    #[test]
    fn oversized_record_is_hard_split() {
        let mut profile = sample(1, Some("x"));
        profile.notification_frequency = "f".repeat(MESSAGE_LIMIT * 2);
        let chunks = format_listing(&[profile], MESSAGE_LIMIT);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= MESSAGE_LIMIT);
        }
    }

    #[test]
    fn split_text_short_passthrough() {
        assert_eq!(split_text("hello", 10), vec!["hello"]);
    }

    #[test]
    fn split_text_prefers_newlines() {
        let text = format!("{}\n{}", "a".repeat(2000), "b".repeat(3000));
        let chunks = split_text(&text, 4096);
        assert_eq!(chunks, vec!["a".repeat(2000), "b".repeat(3000)]);
    }

    #[test]
    fn split_text_hard_cut_without_boundaries() {
        let text = "a".repeat(5000);
        let chunks = split_text(&text, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4096);
        assert_eq!(chunks[1].len(), 904);
    }

    #[test]
    fn split_text_never_cuts_inside_a_multibyte_char() {
        // 2000 x '€' is 6000 bytes; a naive byte cut at 4096 would land
        // inside a character and panic.
        let text = "€".repeat(2000);
        let chunks = split_text(&text, 4096);
        assert!(chunks.len() >= 2);
        let mut total_chars = 0;
        for chunk in &chunks {
            assert!(chunk.len() <= 4096);
            assert!(chunk.chars().all(|c| c == '€'));
            total_chars += chunk.chars().count();
        }
        assert_eq!(total_chars, 2000);
    }

    #[test]
    fn listing_with_multibyte_frequency_stays_within_limit() {
        let mut profile = sample(1, Some("x"));
        profile.notification_frequency = "€".repeat(2000);
        let chunks = format_listing(&[profile], MESSAGE_LIMIT);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.len() <= MESSAGE_LIMIT);
        }
        let joined: String = chunks.concat();
        assert_eq!(joined.matches('€').count(), 2000);
    }
}
