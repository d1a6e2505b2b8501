//! Network layer: cookie jar, transport seam, and the typed API client.
//!
//! DESIGN
//! ======
//! `ApiClient` never talks to `reqwest` directly. It builds an
//! [`transport::HttpRequest`] and hands it to an [`transport::HttpTransport`],
//! so the session store can be driven by a scripted transport in tests.
//! The [`cookies::CookieJar`] is shared between the transport (which feeds it
//! `Set-Cookie` headers) and the store (which reads `csrftoken` from it).

pub mod api;
pub mod cookies;
pub mod transport;
pub mod types;
