//! Play queue
//!
//! Ordered pending-playback list shared in behavior by both engines: FIFO
//! insertion, identity-deduplicated add, explicit removal, pop-front advance.
//! The queue is never deduplicated against playback history; an item that
//! played and left the queue can be re-added freely.

use tern_common::events::QueueItemInfo;
use tern_common::model::{EntryRef, MediaDescriptor, MediaId};
use uuid::Uuid;

/// One pending item: a resolved descriptor plus the entry it came from
#[derive(Debug, Clone)]
pub struct QueueItem {
    /// Queue item UUID, stable while the item is queued or current
    pub item_id: Uuid,
    pub media: MediaDescriptor,
    pub entry: EntryRef,
}

impl QueueItem {
    pub fn new(media: MediaDescriptor, entry: EntryRef) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            media,
            entry,
        }
    }

    pub fn media_id(&self) -> MediaId {
        self.media.media_id()
    }

    pub fn info(&self) -> QueueItemInfo {
        QueueItemInfo {
            item_id: self.item_id,
            media: self.media.clone(),
            entry: self.entry.clone(),
        }
    }
}

/// Ordered pending-playback list
#[derive(Debug, Default)]
pub struct PlayQueue {
    items: Vec<QueueItem>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item unless its identity is already queued or is `current`
    ///
    /// Returns true if the item was added; a duplicate add is a no-op.
    pub fn push_back(&mut self, item: QueueItem, current: Option<&MediaId>) -> bool {
        let media_id = item.media_id();
        if current == Some(&media_id) || self.contains(&media_id) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an item by descriptor identity; no-op if absent
    pub fn remove(&mut self, media_id: &MediaId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.media_id() != *media_id);
        self.items.len() != before
    }

    /// Pop the head for auto-advance; None if the queue is empty
    pub fn advance(&mut self) -> Option<QueueItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn contains(&self, media_id: &MediaId) -> bool {
        self.items.iter().any(|item| item.media_id() == *media_id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    /// Snapshot of queue contents for the API and SSE
    pub fn infos(&self) -> Vec<QueueItemInfo> {
        self.items.iter().map(QueueItem::info).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_item(id: i64) -> QueueItem {
        QueueItem::new(
            MediaDescriptor::EnclosureAudio {
                enclosure_id: id,
                url: format!("https://cdn.example.com/{}.mp3", id),
                mime_type: "audio/mpeg".to_string(),
                duration_hint_seconds: None,
            },
            EntryRef {
                id,
                feed_id: 1,
                title: format!("Entry {}", id),
            },
        )
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PlayQueue::new();
        assert!(queue.push_back(test_item(1), None));
        assert!(queue.push_back(test_item(2), None));
        assert!(queue.push_back(test_item(3), None));
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.advance().unwrap().media_id(), MediaId::Enclosure(1));
        assert_eq!(queue.advance().unwrap().media_id(), MediaId::Enclosure(2));
        assert_eq!(queue.advance().unwrap().media_id(), MediaId::Enclosure(3));
        assert!(queue.advance().is_none());
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut queue = PlayQueue::new();
        assert!(queue.push_back(test_item(1), None));
        assert!(!queue.push_back(test_item(1), None));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_add_equal_to_current_is_noop() {
        let mut queue = PlayQueue::new();
        let current = MediaId::Enclosure(5);
        assert!(!queue.push_back(test_item(5), Some(&current)));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_remove_by_identity() {
        let mut queue = PlayQueue::new();
        queue.push_back(test_item(1), None);
        queue.push_back(test_item(2), None);

        assert!(queue.remove(&MediaId::Enclosure(1)));
        assert!(!queue.remove(&MediaId::Enclosure(1)));
        assert_eq!(queue.len(), 1);
        assert!(queue.contains(&MediaId::Enclosure(2)));
    }

    #[test]
    fn test_played_item_can_be_readded() {
        let mut queue = PlayQueue::new();
        queue.push_back(test_item(1), None);
        let played = queue.advance().unwrap();
        assert!(queue.push_back(test_item(1), None));
        assert_ne!(played.item_id, queue.items()[0].item_id);
    }

    #[test]
    fn test_clear() {
        let mut queue = PlayQueue::new();
        queue.push_back(test_item(1), None);
        queue.push_back(test_item(2), None);
        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }
}
