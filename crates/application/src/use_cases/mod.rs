//! Use cases built on top of the session layer.

mod contacts;

pub use contacts::{CONTACTS_PATH, ConnectionReport, ContactsService};
