//! In-memory contact store.
//!
//! A single `RwLock`-guarded map. Every write holds the write lock for the
//! whole check-then-mutate sequence, which gives the same single-record
//! atomicity the PostgreSQL store gets from its unique indexes.

use ::async_trait::async_trait;
use chrono::Utc;
use rolodex_core::{
    Contact, ContactField, ContactId, ContactPatch, ContactSelector, EditLock, NewContact,
    SortOrder, StoreError, StoreResult, Timestamp,
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::{ContactStore, LockAttempt};

/// In-memory store used for development and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactStore {
    contacts: Arc<RwLock<HashMap<ContactId, Contact>>>,
}

impl InMemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored contacts.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ContactId, Contact>>> {
        self.contacts.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, HashMap<ContactId, Contact>>> {
        self.contacts.write().map_err(|_| StoreError::LockPoisoned)
    }
}

/// Reject `email`/`phone` values already used by a record other than
/// `exclude`.
fn ensure_unique(
    contacts: &HashMap<ContactId, Contact>,
    email: Option<&str>,
    phone: Option<&str>,
    exclude: Option<ContactId>,
) -> StoreResult<()> {
    for other in contacts.values() {
        if Some(other.id) == exclude {
            continue;
        }
        if let Some(email) = email {
            if other.email == email {
                return Err(StoreError::duplicate(ContactField::Email, email));
            }
        }
        if let Some(phone) = phone {
            if other.phone == phone {
                return Err(StoreError::duplicate(ContactField::Phone, phone));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl ContactStore for InMemoryContactStore {
    async fn insert(&self, new: NewContact) -> StoreResult<Contact> {
        let new = new.normalized();
        new.check()?;

        let mut contacts = self.write()?;
        ensure_unique(&contacts, Some(&new.email), Some(&new.phone), None)?;

        let contact = Contact::create(new, Utc::now());
        contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn get(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn update(&self, id: ContactId, patch: ContactPatch) -> StoreResult<Option<Contact>> {
        let patch = patch.normalized();
        patch.check()?;

        let mut contacts = self.write()?;
        if !contacts.contains_key(&id) {
            return Ok(None);
        }
        ensure_unique(&contacts, patch.email.as_deref(), patch.phone.as_deref(), Some(id))?;

        let Some(contact) = contacts.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(contact, Utc::now());
        Ok(Some(contact.clone()))
    }

    async fn try_lock(
        &self,
        id: ContactId,
        lock: EditLock,
        now: Timestamp,
    ) -> StoreResult<Option<LockAttempt>> {
        let mut contacts = self.write()?;
        let Some(contact) = contacts.get_mut(&id) else {
            return Ok(None);
        };
        if contact.is_locked_against(&lock.owner, now) {
            return Ok(Some(LockAttempt::Held(contact.clone())));
        }
        contact.apply_lock(Some(&lock), now);
        Ok(Some(LockAttempt::Acquired(contact.clone())))
    }

    async fn release_lock(&self, id: ContactId, owner: &str) -> StoreResult<Option<Contact>> {
        let mut contacts = self.write()?;
        Ok(contacts.get_mut(&id).map(|contact| {
            if contact.editing_by.as_deref() == Some(owner) {
                contact.apply_lock(None, Utc::now());
            }
            contact.clone()
        }))
    }

    async fn delete(&self, id: ContactId) -> StoreResult<Option<Contact>> {
        Ok(self.write()?.remove(&id))
    }

    async fn delete_many(&self, ids: &[ContactId]) -> StoreResult<u64> {
        let mut contacts = self.write()?;
        let removed = ids
            .iter()
            .filter(|id| contacts.remove(id).is_some())
            .count();
        Ok(removed as u64)
    }

    async fn find(
        &self,
        selector: &ContactSelector,
        sort: SortOrder,
        offset: u64,
        limit: u64,
    ) -> StoreResult<Vec<Contact>> {
        let contacts = self.read()?;
        let mut matching: Vec<&Contact> = contacts
            .values()
            .filter(|c| selector.matches(c))
            .collect();
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    async fn count(&self, selector: &ContactSelector) -> StoreResult<u64> {
        let contacts = self.read()?;
        Ok(contacts.values().filter(|c| selector.matches(c)).count() as u64)
    }

    async fn clear_expired_locks(&self, now: Timestamp) -> StoreResult<u64> {
        let mut contacts = self.write()?;
        let mut cleared = 0;
        for contact in contacts.values_mut() {
            let expired = contact
                .edit_lock()
                .map(|lock| !lock.is_live(now))
                .unwrap_or(false);
            if expired {
                contact.apply_lock(None, now);
                cleared += 1;
            }
        }
        if cleared > 0 {
            tracing::debug!(cleared, "Cleared expired edit locks");
        }
        Ok(cleared)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.read().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn new_contact(name: &str, email: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            company: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_timestamps() {
        let store = InMemoryContactStore::new();
        let contact = store
            .insert(new_contact("Jane", "Jane@Example.com", "5551234567"))
            .await
            .unwrap();

        assert_eq!(contact.email, "jane@example.com");
        assert_eq!(contact.created_at, contact.updated_at);
        assert!(!contact.is_editing);
        assert_eq!(store.get(contact.id).await.unwrap(), Some(contact));
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_email_and_phone() {
        let store = InMemoryContactStore::new();
        store
            .insert(new_contact("Jane", "jane@example.com", "5551234567"))
            .await
            .unwrap();

        let err = store
            .insert(new_contact("Other", "JANE@example.com", "5559999999"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: ContactField::Email, .. }));

        let err = store
            .insert(new_contact("Other", "other@example.com", "5551234567"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: ContactField::Phone, .. }));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_enforces_required_fields() {
        let store = InMemoryContactStore::new();
        let err = store
            .insert(new_contact("", "a@b.co", "5551234567"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::required(ContactField::Name));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_update_checks_uniqueness_against_others_only() {
        let store = InMemoryContactStore::new();
        let jane = store
            .insert(new_contact("Jane", "jane@example.com", "5551234567"))
            .await
            .unwrap();
        store
            .insert(new_contact("Bob", "bob@example.com", "5557654321"))
            .await
            .unwrap();

        let same_email = ContactPatch {
            email: Some("jane@example.com".to_string()),
            name: Some("Jane D.".to_string()),
            ..Default::default()
        };
        let updated = store.update(jane.id, same_email).await.unwrap().unwrap();
        assert_eq!(updated.name, "Jane D.");

        let steal_phone = ContactPatch {
            phone: Some("5557654321".to_string()),
            ..Default::default()
        };
        assert!(store.update(jane.id, steal_phone).await.is_err());
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let store = InMemoryContactStore::new();
        let patch = ContactPatch {
            name: Some("X".to_string()),
            ..Default::default()
        };
        assert_eq!(store.update(ContactId::now_v7(), patch).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_pages_in_sort_order() {
        let store = InMemoryContactStore::new();
        for i in 0..15 {
            store
                .insert(new_contact(
                    &format!("Contact {:02}", i),
                    &format!("c{}@example.com", i),
                    &format!("55500000{:02}", i),
                ))
                .await
                .unwrap();
        }

        let selector = ContactSelector::all();
        let second = store
            .find(&selector, SortOrder::default(), 10, 10)
            .await
            .unwrap();
        assert_eq!(second.len(), 5);
        assert_eq!(second[0].name, "Contact 10");
        assert_eq!(store.count(&selector).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn test_delete_many_counts_only_existing() {
        let store = InMemoryContactStore::new();
        let a = store
            .insert(new_contact("A", "a@example.com", "5550000001"))
            .await
            .unwrap();
        let b = store
            .insert(new_contact("B", "b@example.com", "5550000002"))
            .await
            .unwrap();

        let removed = store
            .delete_many(&[a.id, b.id, ContactId::now_v7()])
            .await
            .unwrap();
        assert_eq!(removed, 2);
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_clear_expired_locks_leaves_live_locks() {
        let store = InMemoryContactStore::new();
        let stale = store
            .insert(new_contact("A", "a@example.com", "5550000001"))
            .await
            .unwrap();
        let live = store
            .insert(new_contact("B", "b@example.com", "5550000002"))
            .await
            .unwrap();

        let now = Utc::now();
        let earlier = now - Duration::minutes(10);
        store
            .try_lock(stale.id, EditLock::new("alice", now - Duration::seconds(1)), earlier)
            .await
            .unwrap();
        store
            .try_lock(live.id, EditLock::new("bob", now + Duration::minutes(5)), earlier)
            .await
            .unwrap();

        assert_eq!(store.clear_expired_locks(now).await.unwrap(), 1);
        assert!(!store.get(stale.id).await.unwrap().unwrap().is_editing);
        assert!(store.get(live.id).await.unwrap().unwrap().is_editing);
    }

    #[tokio::test]
    async fn test_try_lock_refuses_other_owner_while_live() {
        let store = InMemoryContactStore::new();
        let jane = store
            .insert(new_contact("Jane", "jane@example.com", "5551234567"))
            .await
            .unwrap();
        let now = Utc::now();
        let until = now + Duration::minutes(10);

        let first = store
            .try_lock(jane.id, EditLock::new("alice", until), now)
            .await
            .unwrap();
        assert!(matches!(first, Some(LockAttempt::Acquired(_))));

        let second = store
            .try_lock(jane.id, EditLock::new("bob", until), now)
            .await
            .unwrap();
        let Some(LockAttempt::Held(held)) = second else {
            panic!("expected the lock to be held, got {:?}", second);
        };
        assert_eq!(held.editing_by.as_deref(), Some("alice"));

        // At expiry the old lock no longer blocks
        let third = store
            .try_lock(jane.id, EditLock::new("bob", until + Duration::minutes(10)), until)
            .await
            .unwrap();
        assert!(matches!(third, Some(LockAttempt::Acquired(ref c)) if c.editing_by.as_deref() == Some("bob")));

        assert_eq!(
            store
                .try_lock(ContactId::now_v7(), EditLock::new("bob", until), now)
                .await
                .unwrap(),
            None
        );
    }

    #[tokio::test]
    async fn test_release_lock_only_clears_for_holder() {
        let store = InMemoryContactStore::new();
        let jane = store
            .insert(new_contact("Jane", "jane@example.com", "5551234567"))
            .await
            .unwrap();
        let now = Utc::now();
        store
            .try_lock(jane.id, EditLock::new("alice", now + Duration::minutes(10)), now)
            .await
            .unwrap();

        let untouched = store.release_lock(jane.id, "bob").await.unwrap().unwrap();
        assert_eq!(untouched.editing_by.as_deref(), Some("alice"));

        let released = store.release_lock(jane.id, "alice").await.unwrap().unwrap();
        assert!(!released.is_editing);
        assert!(released.editing_until.is_none());
        assert_eq!(store.release_lock(ContactId::now_v7(), "alice").await.unwrap(), None);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_try_lock_has_one_winner() {
        let store = InMemoryContactStore::new();
        let jane = store
            .insert(new_contact("Jane", "jane@example.com", "5551234567"))
            .await
            .unwrap();
        let now = Utc::now();

        let handles: Vec<_> = (0..8)
            .map(|n| {
                let store = store.clone();
                tokio::spawn(async move {
                    let lock = EditLock::new(format!("user{}", n), now + Duration::minutes(10));
                    store.try_lock(jane.id, lock, now).await
                })
            })
            .collect();

        let mut winners = Vec::new();
        for handle in handles {
            if let Some(LockAttempt::Acquired(contact)) = handle.await.unwrap().unwrap() {
                winners.push(contact.editing_by);
            }
        }
        assert_eq!(winners.len(), 1);
        assert_eq!(store.get(jane.id).await.unwrap().unwrap().editing_by, winners[0]);
    }

    proptest! {
        #[test]
        fn prop_email_and_phone_stay_unique(
            ops in prop::collection::vec((0u8..4, 0u8..4, 0u8..4), 1..30)
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let store = InMemoryContactStore::new();
                let mut ids = Vec::new();
                for (kind, e, p) in ops {
                    let email = format!("user{}@example.com", e);
                    let phone = format!("555000000{}", p);
                    if kind == 0 && !ids.is_empty() {
                        let id = ids[(e as usize) % ids.len()];
                        let patch = ContactPatch {
                            email: Some(email),
                            phone: Some(phone),
                            ..Default::default()
                        };
                        let _ = store.update(id, patch).await;
                    } else if let Ok(c) = store.insert(new_contact("N", &email, &phone)).await {
                        ids.push(c.id);
                    }
                }

                let all = store
                    .find(&ContactSelector::all(), SortOrder::default(), 0, u64::MAX)
                    .await
                    .unwrap();
                let emails: HashSet<_> = all.iter().map(|c| c.email.clone()).collect();
                let phones: HashSet<_> = all.iter().map(|c| c.phone.clone()).collect();
                prop_assert_eq!(emails.len(), all.len());
                prop_assert_eq!(phones.len(), all.len());
                Ok(())
            })?;
        }
    }
}
