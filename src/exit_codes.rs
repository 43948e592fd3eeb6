//! Exit code standardization for costctl
//!
//! Provides consistent exit codes for different error types to enable
//! reliable programmatic error detection by scripts and CI jobs.
//!
//! ## Exit Code Convention
//!
//! - `0` = Success (a completed run, even if some instances were skipped)
//! - `1` = User error (invalid input, validation failure)
//! - `2` = System error (AWS API failure, network error)
//! - `3` = Configuration error (missing config, invalid credentials)

use crate::error::CostctlError;

/// Standard exit codes for costctl
pub mod codes {
    /// Success
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    /// User error (invalid input, validation failure)
    pub const USER_ERROR: i32 = 1;
    /// System error (AWS API failure, network error)
    pub const SYSTEM_ERROR: i32 = 2;
    /// Configuration error (missing config, invalid credentials)
    pub const CONFIG_ERROR: i32 = 3;
}

/// Map a CostctlError to an appropriate exit code
pub fn exit_code_for_error(error: &CostctlError) -> i32 {
    use CostctlError::*;
    match error {
        // Configuration and credential errors
        Config(_) => codes::CONFIG_ERROR,
        Credentials(_) => codes::CONFIG_ERROR,

        // User errors (invalid input, validation failures)
        Validation { .. } => codes::USER_ERROR,

        // System errors (cloud provider, network, I/O)
        Aws(_) => codes::SYSTEM_ERROR,
        Io(_) => codes::SYSTEM_ERROR,
        Json(_) => codes::SYSTEM_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_credential_errors_map_to_config_code() {
        let err = CostctlError::Credentials("no usable credentials".to_string());
        assert_eq!(exit_code_for_error(&err), codes::CONFIG_ERROR);

        let err = CostctlError::Config(ConfigError::ParseError("bad toml".to_string()));
        assert_eq!(exit_code_for_error(&err), codes::CONFIG_ERROR);
    }

    #[test]
    fn test_aws_errors_map_to_system_code() {
        let err = CostctlError::Aws("DescribeInstances failed".to_string());
        assert_eq!(exit_code_for_error(&err), codes::SYSTEM_ERROR);
    }

    #[test]
    fn test_validation_errors_map_to_user_code() {
        let err = CostctlError::Validation {
            field: "instance-type".to_string(),
            reason: "expected <family>.<size>".to_string(),
        };
        assert_eq!(exit_code_for_error(&err), codes::USER_ERROR);
    }
}
