//! Field validation for send requests.

use lettre::message::Mailbox;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{MimeMessageRequest, SimpleMessageRequest, UploadedFile};
use crate::error::ValidationErrors;

static RECIPIENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z0-9_\-\.])+@([A-Za-z0-9_\-\.])+\.([A-Za-z]{2,4})$")
        .expect("recipient pattern is valid")
});

/// Checks a request before any profile or transport work.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationErrors>;
}

fn check_common(errors: &mut ValidationErrors, to: &str, cc: &[String], subject: &str, text: &str) {
    let to = to.trim();
    if to.is_empty() {
        errors.add("to", "recipient address is required");
    } else if !RECIPIENT.is_match(to) {
        errors.add("to", "recipient address is malformed");
    }

    for (i, address) in cc.iter().enumerate() {
        if address.trim().parse::<Mailbox>().is_err() {
            errors.add(format!("cc[{i}]"), "carbon copy address is malformed");
        }
    }

    if subject.trim().is_empty() {
        errors.add("subject", "subject is required");
    }
    if text.trim().is_empty() {
        errors.add("text", "body is required");
    }
}

impl Validate for SimpleMessageRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_common(&mut errors, &self.to, &self.cc, &self.subject, &self.text);
        errors.into_result()
    }
}

impl Validate for MimeMessageRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        check_common(&mut errors, &self.to, &self.cc, &self.subject, &self.text);
        errors.into_result()
    }
}

impl Validate for UploadedFile {
    /// Empty uploads are skipped when attaching, so only a non-empty file
    /// needs a name.
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let named = matches!(self.filename.as_deref(), Some(n) if !n.trim().is_empty());
        if !self.is_empty() && !named {
            errors.add("file", "attachment file name is required");
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_request() {
        let request =
            SimpleMessageRequest::new("abc@qq.com", "232323", "cbd").cc("Team <team@example.com>");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn rejects_blank_and_malformed_fields() {
        let request = SimpleMessageRequest::new("not-an-address", "  ", "");
        let errors = request.validate().unwrap_err();

        assert!(errors.has("to"));
        assert!(errors.has("subject"));
        assert!(errors.has("text"));
    }

    #[test]
    fn rejects_missing_recipient() {
        let errors = MimeMessageRequest::new("", "s", "<p>b</p>")
            .validate()
            .unwrap_err();
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].message, "recipient address is required");
    }

    #[test]
    fn rejects_long_top_level_domain() {
        let errors = SimpleMessageRequest::new("a@example.museum", "s", "b")
            .validate()
            .unwrap_err();
        assert!(errors.has("to"));
    }

    #[test]
    fn rejects_bad_cc() {
        let errors = SimpleMessageRequest::new("a@example.com", "s", "b")
            .cc("nope")
            .validate()
            .unwrap_err();
        assert!(errors.has("cc[0]"));
    }

    #[test]
    fn upload_needs_a_name_unless_empty() {
        let unnamed = UploadedFile {
            filename: None,
            content_type: None,
            bytes: b"data".to_vec(),
        };
        assert!(unnamed.validate().is_err());

        let empty = UploadedFile {
            filename: None,
            content_type: None,
            bytes: Vec::new(),
        };
        assert!(empty.validate().is_ok());

        let named = UploadedFile::new("report.pdf", b"%PDF".to_vec());
        assert!(named.validate().is_ok());
    }
}
