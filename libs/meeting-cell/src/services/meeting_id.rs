// libs/meeting-cell/src/services/meeting_id.rs
use rand::Rng;

use shared_config::AppConfig;

use crate::models::MeetingId;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const GROUPS: usize = 3;
const GROUP_LEN: usize = 4;
const MEETING_PATH: &str = "/meeting/";

/// Produces meeting identifiers and the join links derived from them.
///
/// Identifiers are three dash separated groups of four lowercase
/// alphanumerics. Uniqueness rests on randomness alone; nothing checks
/// existing identifiers.
#[derive(Debug, Clone)]
pub struct MeetingIdGenerator {
    base_url: String,
}

impl MeetingIdGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.app_base_url.clone())
    }

    pub fn generate(&self) -> MeetingId {
        let mut rng = rand::thread_rng();

        let token = (0..GROUPS)
            .map(|_| {
                (0..GROUP_LEN)
                    .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("-");

        MeetingId::from_generated(token)
    }

    pub fn join_link(&self, meeting_id: &MeetingId) -> String {
        format!("{}{}{}", self.base_url, MEETING_PATH, meeting_id)
    }

    /// Inverse of [`join_link`](Self::join_link).
    pub fn parse_join_link(&self, link: &str) -> Option<MeetingId> {
        let prefix = format!("{}{}", self.base_url, MEETING_PATH);
        link.strip_prefix(&prefix)
            .and_then(|rest| MeetingId::parse(rest).ok())
    }
}
