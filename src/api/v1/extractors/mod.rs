mod auth_oracle;

pub use auth_oracle::{Authenticated, OracleExtractor};
