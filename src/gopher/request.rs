/// An inbound request on a listening server.
///
/// `local_host` and `local_port` name this server as clients should reach
/// it, so handlers can build links back to themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// The normalized selector, always starting with `/`
    pub selector: String,
    /// Host to put in self-referential items
    pub local_host: String,
    /// Port to put in self-referential items
    pub local_port: u16,
}

impl Request {
    pub fn new(selector: impl Into<String>, local_host: impl Into<String>, local_port: u16) -> Self {
        Self {
            selector: selector.into(),
            local_host: local_host.into(),
            local_port,
        }
    }

    /// Selector split at the first tab into path and search query.
    ///
    /// Index-search and CSO clients send `selector<TAB>query`.
    ///
    /// # Example
    ///
    /// ```
    /// # use burrow::gopher::request::Request;
    /// let req = Request::new("/search\trust", "localhost", 70);
    /// assert_eq!(req.path(), "/search");
    /// assert_eq!(req.query(), Some("rust"));
    /// ```
    pub fn path(&self) -> &str {
        self.selector
            .split_once('\t')
            .map(|(path, _)| path)
            .unwrap_or(&self.selector)
    }

    /// Search query following a tab in the selector, if any.
    pub fn query(&self) -> Option<&str> {
        self.selector.split_once('\t').map(|(_, query)| query)
    }
}
