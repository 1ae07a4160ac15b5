//! Email model built by `email/factory`.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Email {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub subject: String,
    pub msg_html: String,
}

impl Email {
    pub fn add_to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Minimal deliverability check: a recipient and a subject.
    pub fn is_sendable(&self) -> bool {
        !self.to.is_empty() && !self.subject.trim().is_empty()
    }
}
