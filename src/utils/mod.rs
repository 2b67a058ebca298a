pub mod time;

/// Run identifier: UUIDv4 as 32 lowercase hex chars.
pub fn longid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
