// libs/meeting-cell/src/services/host_registry.rs
use std::collections::HashMap;
use std::sync::RwLock;

use tracing::debug;

use crate::models::MeetingId;

/// Who created a meeting. `user_id` is the booking owner's account id; entries
/// recorded by name alone leave it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEntry {
    pub host_name: String,
    pub user_id: Option<String>,
}

impl HostEntry {
    pub fn named(host_name: &str) -> Self {
        Self {
            host_name: host_name.to_string(),
            user_id: None,
        }
    }

    pub fn owned_by(user_id: &str, host_name: &str) -> Self {
        Self {
            host_name: host_name.to_string(),
            user_id: Some(user_id.to_string()),
        }
    }
}

/// Remembers who created each meeting so later joiners can be told apart
/// from the host. Memory only; contents are lost on restart.
pub trait HostRegistry: Send + Sync {
    fn set_host_entry(&self, meeting_id: &MeetingId, entry: HostEntry);

    fn get_host_entry(&self, meeting_id: &MeetingId) -> Option<HostEntry>;

    fn set_host(&self, meeting_id: &MeetingId, host_name: &str) {
        self.set_host_entry(meeting_id, HostEntry::named(host_name));
    }

    fn get_host(&self, meeting_id: &MeetingId) -> Option<String> {
        self.get_host_entry(meeting_id).map(|entry| entry.host_name)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryHostRegistry {
    hosts: RwLock<HashMap<MeetingId, HostEntry>>,
}

impl InMemoryHostRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

impl HostRegistry for InMemoryHostRegistry {
    // Last write wins.
    fn set_host_entry(&self, meeting_id: &MeetingId, entry: HostEntry) {
        debug!("Recording host for meeting {}", meeting_id);

        let mut hosts = self.hosts.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        hosts.insert(meeting_id.clone(), entry);
    }

    fn get_host_entry(&self, meeting_id: &MeetingId) -> Option<HostEntry> {
        let hosts = self.hosts.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        hosts.get(meeting_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    fn id(raw: &str) -> MeetingId {
        MeetingId::parse(raw).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let registry = InMemoryHostRegistry::new();
        registry.set_host(&id("m1"), "Alice");

        assert_eq!(registry.get_host(&id("m1")), Some("Alice".to_string()));
        assert_eq!(registry.get_host(&id("unknown")), None);
    }

    #[test]
    fn test_later_write_wins() {
        let registry = InMemoryHostRegistry::new();
        registry.set_host(&id("m1"), "Alice");
        registry.set_host(&id("m1"), "Bob");

        assert_eq!(registry.get_host(&id("m1")), Some("Bob".to_string()));
    }

    #[test]
    fn test_owner_is_kept_with_name() {
        let registry = InMemoryHostRegistry::new();
        registry.set_host_entry(&id("m1"), HostEntry::owned_by("user-1", "Jane Doe"));

        assert_eq!(registry.get_host(&id("m1")), Some("Jane Doe".to_string()));
        assert_eq!(
            registry.get_host_entry(&id("m1")).and_then(|entry| entry.user_id),
            Some("user-1".to_string())
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let registry: Arc<dyn HostRegistry> = Arc::new(InMemoryHostRegistry::new());

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.set_host(&id(&format!("m{}", n)), &format!("host-{}", n)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for n in 0..8 {
            assert_eq!(registry.get_host(&id(&format!("m{}", n))), Some(format!("host-{}", n)));
        }
    }
}
