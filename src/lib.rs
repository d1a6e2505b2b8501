//! # crowdfund-client
//!
//! Client layer for the crowdfund points marketplace. The backend owns all
//! business rules (accounts, sessions, items, point balances, CSRF checks);
//! this crate owns the client side of that conversation.
//!
//! It contains the cookie jar and HTTP transport, the runtime config loader,
//! the session store with its redirect policy, and page controllers that the
//! `crowdfund` binary renders to a terminal.

pub mod config;
pub mod net;
pub mod pages;
pub mod routes;
pub mod shell;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;
