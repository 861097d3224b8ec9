mod group_record;
mod user_record;

pub use group_record::{GroupRecord, StoredGroup};
pub use user_record::{StoredUser, UserRecord};
