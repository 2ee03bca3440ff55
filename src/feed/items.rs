use crate::fetch::RemoteItem;
use crate::source::SourceKey;

/// A remote item accepted into the feed, stamped with where it came from.
///
/// `source_key` and `page` record provenance only. Identity is the item's
/// natural key — the payload fields — so the same logical item returned by
/// two sources (or two pages) is recognized as one item regardless of its
/// stamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub source_key: SourceKey,
    pub page: u32,
}

impl FeedItem {
    /// Stamp a freshly fetched item with its origin source and page.
    pub fn stamped(item: RemoteItem, source_key: SourceKey, page: u32) -> Self {
        Self {
            id: item.id,
            title: item.title,
            url: item.url,
            source_key,
            page,
        }
    }

    /// Natural-key equality: deep equality of the payload, ignoring the
    /// origin stamps. Two fetches may return the same logical item under
    /// different `(source_key, page)` wrappers; the feed must hold one.
    pub fn is_same_item(&self, other: &FeedItem) -> bool {
        self.id == other.id && self.title == other.title && self.url == other.url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, source: &str, page: u32) -> FeedItem {
        FeedItem {
            id,
            title: format!("Item {id}"),
            url: format!("https://example.com/{id}"),
            source_key: source.into(),
            page,
        }
    }

    #[test]
    fn same_payload_different_stamps_is_same_item() {
        let a = item(7, "dribbble", 1);
        let b = item(7, "search", 4);
        assert!(a.is_same_item(&b));
        assert_ne!(a, b); // structural equality still sees the stamps
    }

    #[test]
    fn same_id_different_payload_is_not_same_item() {
        let a = item(7, "dribbble", 1);
        let mut b = item(7, "dribbble", 1);
        b.url = "https://example.com/other".into();
        assert!(!a.is_same_item(&b));
    }
}
