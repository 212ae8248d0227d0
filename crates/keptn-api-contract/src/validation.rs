//! Validation helpers for API contract types

use crate::error::ApiContractError;
use crate::types::*;
use validator::Validate;

/// Field order used when reporting sequence control failures
const SEQUENCE_CONTROL_FIELDS: [&[&str]; 3] = [
    &["project"],
    &["keptn_context", "keptnContext"],
    &["state"],
];

/// Validate sequence control parameters, reporting every missing field at once
pub fn validate_sequence_control_params(
    params: &SequenceControlParams,
) -> Result<(), ApiContractError> {
    let Err(errors) = params.validate() else {
        return Ok(());
    };

    let mut failures: Vec<(usize, String)> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, field_errors)| {
            let field = field.to_string();
            let rank = SEQUENCE_CONTROL_FIELDS
                .iter()
                .position(|names| names.contains(&field.as_str()))
                .unwrap_or(SEQUENCE_CONTROL_FIELDS.len());
            field_errors.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"));
                (rank, message)
            })
        })
        .collect();
    failures.sort();

    Err(ApiContractError::Validation {
        subject: "sequence control parameters".to_string(),
        reasons: failures
            .into_iter()
            .map(|(_, message)| message)
            .collect::<Vec<_>>()
            .join(","),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SequenceControlParams {
        SequenceControlParams {
            project: "sockshop".to_string(),
            keptn_context: "0e021d3b-a4a2-4f45-8e1d-2c0e59e35a9c".to_string(),
            stage: String::new(),
            state: SequenceState::ABORT.to_string(),
        }
    }

    #[test]
    fn test_validate_sequence_control_params_valid() {
        assert!(validate_sequence_control_params(&params()).is_ok());
    }

    #[test]
    fn test_validate_sequence_control_params_missing_project() {
        let request = SequenceControlParams {
            project: "".to_string(), // Invalid: empty project
            ..params()
        };

        let err = validate_sequence_control_params(&request).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to validate sequence control parameters: project parameter not set"
        );
    }

    #[test]
    fn test_validate_sequence_control_params_reports_all_fields() {
        let err = validate_sequence_control_params(&SequenceControlParams::default()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to validate sequence control parameters: project parameter not set,\
             keptn context parameter not set,sequence state parameter not set"
        );
    }
}
