/*
 * Responsibility
 * - Public middleware entry points (auth oracle, HTTP cross-cutting layers)
 */
pub mod auth;
pub mod http;
