//! Error mapping for the MCP server

use keel_core::KeelError;
use rmcp::ErrorData;

/// Converts a store error into an MCP error.
///
/// Lookups that miss and rejected input are the caller's problem and map to
/// `invalid_params`; everything else is an internal error.
pub fn to_mcp_error(message: &str, error: &KeelError) -> ErrorData {
    let text = format!("{message}: {error}");
    let caller_error = error.is_not_found()
        || error.is_validation()
        || matches!(
            error,
            KeelError::InvalidInput { .. } | KeelError::Serialization { .. }
        );
    if caller_error {
        ErrorData::invalid_params(text, None)
    } else {
        ErrorData::internal_error(text, None)
    }
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;

    use super::*;

    #[test]
    fn test_not_found_is_invalid_params() {
        let error = KeelError::PlanNotFound {
            tenant: "default".to_string(),
            id: 9,
        };
        let mapped = to_mcp_error("Failed to show plan", &error);
        assert_eq!(mapped.code, ErrorCode::INVALID_PARAMS);
        assert!(mapped.message.contains("Plan with ID 9 not found"));
    }

    #[test]
    fn test_storage_error_is_internal() {
        let error = KeelError::Configuration {
            message: "no data directory".to_string(),
        };
        let mapped = to_mcp_error("Failed to list plans", &error);
        assert_eq!(mapped.code, ErrorCode::INTERNAL_ERROR);
    }
}
