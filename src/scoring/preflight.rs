//! Pre-flight Validator (Component H, §4.8): rejects obviously-invalid
//! requests before any remote call is attempted.

use crate::error::{Error, Result};

/// Validate a prompt template and credential before the engine sends any
/// request. Returns the specific [`Error`] variant naming the failure so
/// callers can build the documented fallback Scored Segments.
pub fn validate(prompt_template: &str, credential: &str, min_prompt_chars: usize) -> Result<()> {
    if prompt_template.trim().is_empty() {
        return Err(Error::PromptEmpty);
    }
    if prompt_template.len() < min_prompt_chars {
        return Err(Error::PromptTooShort {
            len: prompt_template.len(),
            min: min_prompt_chars,
        });
    }
    if credential.trim().is_empty() {
        return Err(Error::CredentialMissing);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_prompt_is_rejected() {
        let err = validate("   ", "key", 10).unwrap_err();
        assert!(matches!(err, Error::PromptEmpty));
    }

    #[test]
    fn short_prompt_is_rejected() {
        let err = validate("short", "key", 10).unwrap_err();
        assert!(matches!(err, Error::PromptTooShort { len: 5, min: 10 }));
    }

    #[test]
    fn missing_credential_is_rejected() {
        let err = validate("a sufficiently long prompt", "", 10).unwrap_err();
        assert!(matches!(err, Error::CredentialMissing));
    }

    #[test]
    fn valid_inputs_pass() {
        assert!(validate("a sufficiently long prompt", "key", 10).is_ok());
    }
}
