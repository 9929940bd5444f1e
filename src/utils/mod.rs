//! Id and clock helpers shared by the mutation paths.

use time::OffsetDateTime;
use uuid::Uuid;

/// Fresh opaque entity id. Random v4 so collisions are effectively impossible.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_utc()
}
