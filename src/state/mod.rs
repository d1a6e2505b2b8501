//! Client-side state.
//!
//! DESIGN
//! ======
//! One store per concern. Today that is only the session: who is signed in,
//! plus the operations that change it. Pages receive the store by reference
//! instead of reaching for ambient globals.

pub mod session;
