pub mod error;
pub mod note;
pub mod query_key;

pub use error::TransportError;
pub use note::{NewNote, Note, NotePage};
pub use query_key::{KeyPart, QueryKey};
