//! Rolodex Test Utilities
//!
//! Centralized test infrastructure for the Rolodex workspace:
//! - Proptest generators for contact payloads
//! - Test fixtures for common scenarios
//! - Workbook and multipart builders for upload tests
//! - Custom assertions for store results

// Re-export store types for convenience
pub use rolodex_storage::{ContactStore, InMemoryContactStore, LockAttempt, SharedStore};

// Re-export core types for convenience
pub use rolodex_core::{
    Contact, ContactField, ContactId, ContactPatch, EditLock, NewContact, StoreError, StoreResult,
    Timestamp,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating contact data.

    use super::*;
    use proptest::prelude::*;

    /// Generate a non-blank display name.
    pub fn arb_name() -> impl Strategy<Value = String> {
        "[A-Z][a-z]{1,11}( [A-Z][a-z]{1,11})?"
    }

    /// Generate a syntactically valid, lower-case email address.
    pub fn arb_email() -> impl Strategy<Value = String> {
        ("[a-z][a-z0-9]{0,9}", "[a-z]{2,8}", "(com|org|net|io)")
            .prop_map(|(local, domain, tld)| format!("{}@{}.{}", local, domain, tld))
    }

    /// Generate a phone number with 10 to 12 digits, sometimes formatted.
    pub fn arb_phone() -> impl Strategy<Value = String> {
        prop_oneof![
            "[0-9]{10,12}",
            ("[0-9]{3}", "[0-9]{3}", "[0-9]{4}")
                .prop_map(|(a, b, c)| format!("({}) {}-{}", a, b, c)),
        ]
    }

    /// Generate a phone number with fewer than 10 digits.
    pub fn arb_short_phone() -> impl Strategy<Value = String> {
        "[0-9]{1,9}"
    }

    /// Generate an optional company or address value.
    pub fn arb_optional_text() -> impl Strategy<Value = Option<String>> {
        prop::option::of("[A-Za-z0-9 ]{1,20}")
    }

    /// Generate a valid creation payload.
    pub fn arb_new_contact() -> impl Strategy<Value = NewContact> {
        (
            arb_name(),
            arb_email(),
            arb_phone(),
            arb_optional_text(),
            arb_optional_text(),
        )
            .prop_map(|(name, email, phone, company, address)| NewContact {
                name,
                email,
                phone,
                company,
                address,
            })
    }

    /// Generate a batch of payloads with pairwise distinct emails and phones.
    pub fn arb_distinct_contacts(max: usize) -> impl Strategy<Value = Vec<NewContact>> {
        prop::collection::vec(arb_new_contact(), 1..=max).prop_map(|contacts| {
            contacts
                .into_iter()
                .enumerate()
                .map(|(i, mut c)| {
                    c.email = format!("{}{}", i, c.email);
                    c.phone = format!("{:02}{}", i, c.phone);
                    c
                })
                .collect()
        })
    }

    /// Generate a sortable contact field.
    pub fn arb_sort_field() -> impl Strategy<Value = ContactField> {
        prop_oneof![
            Just(ContactField::Name),
            Just(ContactField::Email),
            Just(ContactField::Phone),
            Just(ContactField::Company),
            Just(ContactField::Address),
            Just(ContactField::CreatedAt),
            Just(ContactField::UpdatedAt),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built test fixtures for common testing scenarios.

    use super::*;

    /// A creation payload with only the required fields.
    pub fn new_contact(name: &str, email: &str, phone: &str) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: phone.to_string(),
            company: None,
            address: None,
        }
    }

    /// Jane Doe at Acme.
    pub fn jane() -> NewContact {
        NewContact {
            company: Some("Acme".to_string()),
            address: Some("1 Main St".to_string()),
            ..new_contact("Jane Doe", "jane@example.com", "5551234567")
        }
    }

    /// John Smith at Globex.
    pub fn john() -> NewContact {
        NewContact {
            company: Some("Globex".to_string()),
            ..new_contact("John Smith", "john@example.com", "5559876543")
        }
    }

    /// Alice Brown, no company.
    pub fn alice() -> NewContact {
        new_contact("Alice Brown", "alice@example.com", "5550001111")
    }

    /// An empty in-memory store.
    pub fn memory_store() -> InMemoryContactStore {
        InMemoryContactStore::new()
    }

    /// An in-memory store seeded with the given payloads, in order.
    pub async fn seeded_store(contacts: Vec<NewContact>) -> (InMemoryContactStore, Vec<Contact>) {
        let store = InMemoryContactStore::new();
        let mut created = Vec::with_capacity(contacts.len());
        for contact in contacts {
            created.push(store.insert(contact).await.expect("seed insert failed"));
        }
        (store, created)
    }
}

// ============================================================================
// SPREADSHEETS
// ============================================================================

pub mod workbook {
    //! Build upload workbooks and read downloaded ones back.

    use calamine::{open_workbook_auto_from_rs, Reader};
    use rust_xlsxwriter::Workbook;
    use std::io::Cursor;

    /// Headers used by the browser client's template.
    pub const CONTACT_HEADERS: [&str; 5] = ["Name", "Email", "Phone", "Company", "Address"];

    /// An .xlsx workbook with one sheet: `headers` then `rows`, all text.
    pub fn workbook_bytes(headers: &[&str], rows: &[Vec<&str>]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *header)
                .expect("write header");
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                sheet
                    .write_string(r as u32 + 1, col as u16, *value)
                    .expect("write cell");
            }
        }
        workbook.save_to_buffer().expect("save workbook")
    }

    /// A contact template workbook.
    pub fn contacts_workbook(rows: &[Vec<&str>]) -> Vec<u8> {
        workbook_bytes(&CONTACT_HEADERS, rows)
    }

    /// Name and cell text of the first sheet of a workbook.
    pub fn read_first_sheet(bytes: &[u8]) -> (String, Vec<Vec<String>>) {
        let mut workbook =
            open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).expect("open workbook");
        let name = workbook
            .sheet_names()
            .first()
            .cloned()
            .expect("workbook has a sheet");
        let range = workbook
            .worksheet_range_at(0)
            .expect("workbook has a sheet")
            .expect("readable sheet");
        let rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        (name, rows)
    }
}

// ============================================================================
// MULTIPART
// ============================================================================

pub mod multipart {
    //! Hand-built `multipart/form-data` bodies.

    pub const BOUNDARY: &str = "rolodex-test-boundary";

    /// Content-Type header value matching [`file_part`] bodies.
    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }

    /// A body with a single file part.
    pub fn file_part(field: &str, filename: &str, mime: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::with_capacity(bytes.len() + 256);
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", mime).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
        body
    }

    /// A body with a single text part and no file.
    pub fn text_part(field: &str, value: &str) -> Vec<u8> {
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"\r\n\r\n{v}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = field,
            v = value
        )
        .into_bytes()
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for store results.

    use super::*;

    /// Assert that a store result is a duplicate on `field`.
    #[track_caller]
    pub fn assert_duplicate<T: std::fmt::Debug>(result: &StoreResult<T>, field: ContactField) {
        match result {
            Err(StoreError::Duplicate { field: f, .. }) => {
                assert_eq!(*f, field, "Wrong field in Duplicate error");
            }
            other => panic!("Expected Duplicate on {:?}, got: {:?}", field, other),
        }
    }

    /// Assert that a store result is a contract violation on `field`.
    #[track_caller]
    pub fn assert_invalid<T: std::fmt::Debug>(result: &StoreResult<T>, field: ContactField) {
        match result {
            Err(StoreError::Invalid { field: f, .. }) => {
                assert_eq!(*f, field, "Wrong field in Invalid error");
            }
            other => panic!("Expected Invalid on {:?}, got: {:?}", field, other),
        }
    }

    /// Assert that the three lock fields are all unset.
    #[track_caller]
    pub fn assert_unlocked(contact: &Contact) {
        assert!(!contact.is_editing, "Expected no edit lock: {:?}", contact);
        assert!(contact.editing_by.is_none());
        assert!(contact.editing_until.is_none());
    }

    /// Assert that `owner` holds the edit lock.
    #[track_caller]
    pub fn assert_locked_by(contact: &Contact, owner: &str) {
        assert!(contact.is_editing, "Expected an edit lock: {:?}", contact);
        assert_eq!(contact.editing_by.as_deref(), Some(owner));
        assert!(contact.editing_until.is_some());
    }
}

// ============================================================================
// TESTS
// ============================================================================
