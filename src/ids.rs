//! Identifier formats.
//!
//! Stored documents get 24-character hex ids. Guests get hyphenated UUIDs.
//! The formats never overlap, so the shape of an owner id alone tells a guest
//! cart or order apart from one owned by a registered customer.

use rand::RngCore;
use uuid::Uuid;

pub fn new_document_id() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn new_guest_id() -> String {
    Uuid::new_v4().to_string()
}

/// True when `id` looks like a guest identity: five hyphen-separated hex
/// groups of 8-4-4-4-12 digits. Structural only; nothing is looked up.
pub fn is_guest_id(id: &str) -> bool {
    const GROUPS: [usize; 5] = [8, 4, 4, 4, 12];
    let parts: Vec<&str> = id.split('-').collect();
    parts.len() == GROUPS.len()
        && parts
            .iter()
            .zip(GROUPS)
            .all(|(part, len)| part.len() == len && part.chars().all(|c| c.is_ascii_hexdigit()))
}
