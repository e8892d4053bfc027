//! Request context handed to post-processors

/// The client request a result tree is being built for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    base_href: String,
    filter: Option<String>,
    fields: Option<String>,
}

impl Request {
    /// `base_href` is the URI the request was made against; a trailing `/` is dropped.
    #[must_use]
    pub fn new(base_href: impl Into<String>) -> Self {
        let mut base_href = base_href.into();
        while base_href.len() > 1 && base_href.ends_with('/') {
            base_href.pop();
        }
        Self {
            base_href,
            filter: None,
            fields: None,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    #[must_use]
    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    #[must_use]
    pub fn base_href(&self) -> &str {
        &self.base_href
    }

    #[must_use]
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    #[must_use]
    pub fn fields(&self) -> Option<&str> {
        self.fields.as_deref()
    }
}
