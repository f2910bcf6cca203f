//! One-time password acquisition

use dialoguer::Input;

use crate::error::{RegistryError, Result};

/// Source for the registry's one-time password
///
/// An empty value, fixed or typed, means the account has no second
/// factor and the publish runs without one.
#[derive(Debug, Clone)]
pub enum OtpProvider {
    /// Prompt on the terminal
    Interactive,
    /// Use a fixed value (from `--otp`)
    Fixed(String),
}

impl OtpProvider {
    /// Obtain the one-time password, if any
    ///
    /// Blocks indefinitely in the interactive case; there is no
    /// timeout on the prompt.
    pub fn obtain(&self) -> Result<Option<String>> {
        let value = match self {
            Self::Fixed(value) => value.clone(),
            Self::Interactive => Input::<String>::new()
                .with_prompt("npm one-time password (leave blank for none)")
                .allow_empty(true)
                .interact_text()
                .map_err(|e| RegistryError::PromptFailed(e.to_string()))?,
        };

        if value.is_empty() {
            Ok(None)
        } else {
            Ok(Some(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_value() {
        let otp = OtpProvider::Fixed("123456".to_string()).obtain().unwrap();
        assert_eq!(otp, Some("123456".to_string()));
    }

    #[test]
    fn test_fixed_empty_means_none() {
        let otp = OtpProvider::Fixed(String::new()).obtain().unwrap();
        assert_eq!(otp, None);
    }
}
