//! UI shell seam: navigation and blocking alerts.
//!
//! The session store and pages only ever talk to these traits. The terminal
//! shell prints; tests use a recording shell.

use std::sync::{Mutex, PoisonError};

use crate::routes::Route;

pub trait Navigator: Send + Sync {
    /// Move to `route`.
    fn navigate(&self, route: &Route);

    /// The route currently shown.
    fn current(&self) -> Route;
}

pub trait Notifier: Send + Sync {
    /// Show a blocking, user-visible message.
    fn alert(&self, message: &str);
}

/// Terminal implementation used by the `crowdfund` binary.
#[derive(Debug)]
pub struct TerminalShell {
    current: Mutex<Route>,
}

impl TerminalShell {
    #[must_use]
    pub fn new(initial: Route) -> Self {
        Self { current: Mutex::new(initial) }
    }
}

impl Navigator for TerminalShell {
    fn navigate(&self, route: &Route) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current != *route {
            println!("-> {route}");
        }
        *current = route.clone();
    }

    fn current(&self) -> Route {
        self.current.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Notifier for TerminalShell {
    fn alert(&self, message: &str) {
        eprintln!("! {message}");
    }
}
