//! The four verbs the organization API uses.

use derive_more::Display;

/// Request method, limited to what the service routes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Method {
    /// Read a resource.
    #[display("GET")]
    Get,
    /// Join, lock, or add a member.
    #[display("POST")]
    Post,
    /// Change a member's role.
    #[display("PUT")]
    Put,
    /// Leave, unlock, or remove a member.
    #[display("DELETE")]
    Delete,
}

impl From<Method> for http::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}
