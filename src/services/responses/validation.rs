use crate::errors::{ResponsesError, ResponsesResult, ValidationError, MIN_OUTPUT_TOKENS};
use crate::services::responses::{RequestParams, ResponseInputItem};

pub struct ResponseRequestValidator;

impl ResponseRequestValidator {
    /// Checks everything that can be decided locally before any network work.
    pub fn validate(params: &RequestParams) -> ResponsesResult<()> {
        if params.model.trim().is_empty() {
            return Err(ResponsesError::InvalidRequest(
                ValidationError::MissingRequiredField("model".to_string()),
            ));
        }

        if params.input.is_empty() {
            return Err(ResponsesError::InvalidRequest(ValidationError::EmptyInput));
        }

        if let Some(max_output_tokens) = params.max_output_tokens {
            if max_output_tokens < MIN_OUTPUT_TOKENS {
                return Err(ResponsesError::InvalidRequest(
                    ValidationError::TokenCapBelowMinimum {
                        value: max_output_tokens,
                        minimum: MIN_OUTPUT_TOKENS,
                    },
                ));
            }
        }

        if let Some(temperature) = params.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ResponsesError::InvalidRequest(ValidationError::ValueOutOfRange {
                    field: "temperature".to_string(),
                    min: "0.0".to_string(),
                    max: "2.0".to_string(),
                    value: temperature.to_string(),
                }));
            }
        }

        for (index, item) in params.input.iter().enumerate() {
            if let ResponseInputItem::Reasoning(reasoning) = item {
                if !reasoning.content.is_empty() {
                    return Err(ResponsesError::InvalidRequest(
                        ValidationError::ReasoningContentNotEmpty {
                            index,
                            count: reasoning.content.len(),
                        },
                    ));
                }
            }
        }

        Ok(())
    }
}
