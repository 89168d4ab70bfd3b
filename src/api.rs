//! Service contracts the cursor and session are written against.

pub mod sessions;
pub mod statements;
