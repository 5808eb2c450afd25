pub mod feedback;
pub mod queries;
pub mod store;
pub mod types;

/// Generate a prefixed, time-sortable id such as `mem_0190b1...`.
pub fn new_id(prefix: &str) -> String {
    format!("{prefix}_{}", uuid::Uuid::now_v7().simple())
}
