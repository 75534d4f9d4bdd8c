/*!
 * Auth oracle extractors
 *
 * Responsibility:
 * - Hand the request's bound auth oracle to handlers
 * - `Authenticated` additionally rejects anonymous callers
 */

mod core;

pub use core::{Authenticated, OracleExtractor};
