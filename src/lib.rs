/*!
Cursor over AWS Glue interactive sessions.

A [`Session`] provisions (or attaches to) a remote Spark context. Its
[`Cursor`]s submit statements, poll them until they finish and decode the rows
they print.

```no_run
use std::sync::Arc;
use glue_session_cursor::{GlueClient, GlueConfig, Session};

# async fn run() -> Result<(), glue_session_cursor::GlueError> {
let config = GlueConfig {
    role_arn: "arn:aws:iam::123456789012:role/GlueInteractiveSession".into(),
    ..Default::default()
};
let client = Arc::new(GlueClient::from_config(&config));
let mut session = Session::connect(client, config).await?;

let mut cursor = session.cursor()?;
cursor.execute("select 1 as one", None).await?;
for row in cursor.by_ref() {
    println!("{:?}", row?);
}
cursor.close()?;
session.close().await?;
# Ok(())
# }
```
*/

pub mod api;
pub mod api_client;
pub mod config;
pub mod cursor;
pub mod error;
pub mod lease;
pub mod models;
pub mod result;
pub mod session;
pub mod state;
pub mod statement;

#[cfg(test)]
mod testing;

pub use api_client::glue_client::GlueClient;
pub use config::GlueConfig;
pub use cursor::{AdapterResponse, Cursor};
pub use error::{DatabaseError, GlueError};
pub use result::{ColumnDescription, ResultEnvelope, Row};
pub use session::Session;
pub use state::{SessionStatus, StatementState};
pub use statement::Statement;
