//! Revocable handles over fetched payloads

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_HANDLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
struct HandleInner {
    id: u64,
    data: Vec<u8>,
    content_type: String,
    revoked: AtomicBool,
}

/// A revocable reference to a cached document payload
///
/// Clones share the same underlying payload and revocation state. Once the
/// cache revokes the handle, `bytes` returns `None` on every clone.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    inner: Arc<HandleInner>,
}

impl DocumentHandle {
    /// Create a handle over a payload, together with its revoke capability
    ///
    /// The revoker is the only way to invalidate the handle. The cache's
    /// entry owns it; it is consumed exactly once when the entry is removed.
    pub fn new(data: Vec<u8>, content_type: impl Into<String>) -> (Self, HandleRevoker) {
        let inner = Arc::new(HandleInner {
            id: NEXT_HANDLE_ID.fetch_add(1, Ordering::Relaxed),
            data,
            content_type: content_type.into(),
            revoked: AtomicBool::new(false),
        });

        let handle = Self {
            inner: Arc::clone(&inner),
        };
        (handle, HandleRevoker { inner })
    }

    /// Process-unique identifier of this handle
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// The payload, or `None` once the handle has been revoked
    pub fn bytes(&self) -> Option<&[u8]> {
        if self.is_revoked() {
            None
        } else {
            Some(&self.inner.data)
        }
    }

    /// Content type recorded when the payload was fetched
    pub fn content_type(&self) -> &str {
        &self.inner.content_type
    }

    /// Size of the payload in bytes
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    pub fn is_revoked(&self) -> bool {
        self.inner.revoked.load(Ordering::SeqCst)
    }
}

/// The revoke capability for one [`DocumentHandle`]
///
/// Deliberately not `Clone`: revocation consumes the capability, so a
/// handle cannot be revoked twice from safe code.
#[derive(Debug)]
pub struct HandleRevoker {
    inner: Arc<HandleInner>,
}

impl HandleRevoker {
    /// Invalidate the handle permanently
    pub fn revoke(self) {
        let was_revoked = self.inner.revoked.swap(true, Ordering::SeqCst);
        debug_assert!(!was_revoked, "document handle revoked twice");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_reads_payload() {
        let (handle, _revoker) = DocumentHandle::new(b"payload".to_vec(), "application/pdf");

        assert_eq!(handle.bytes(), Some(b"payload".as_slice()));
        assert_eq!(handle.content_type(), "application/pdf");
        assert_eq!(handle.len(), 7);
        assert!(!handle.is_revoked());
    }

    #[test]
    fn test_revocation_invalidates_all_clones() {
        let (handle, revoker) = DocumentHandle::new(b"data".to_vec(), "text/plain");
        let clone = handle.clone();

        revoker.revoke();

        assert!(handle.is_revoked());
        assert!(clone.is_revoked());
        assert_eq!(handle.bytes(), None);
        assert_eq!(clone.bytes(), None);
    }

    #[test]
    fn test_handles_have_distinct_ids() {
        let (a, _ra) = DocumentHandle::new(Vec::new(), "text/plain");
        let (b, _rb) = DocumentHandle::new(Vec::new(), "text/plain");

        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_empty_payload() {
        let (handle, _revoker) = DocumentHandle::new(Vec::new(), "text/plain");

        assert!(handle.is_empty());
        assert_eq!(handle.bytes(), Some(b"".as_slice()));
    }
}
