use crate::controller::SubmissionState;

pub const LOADING_TEXT: &str = "Loading...";

/// Lines a front-end shows beneath the form for the given state.
pub fn render(state: &SubmissionState) -> Vec<String> {
    match state {
        SubmissionState::Idle => Vec::new(),
        SubmissionState::Validating | SubmissionState::Loading => vec![LOADING_TEXT.to_string()],
        SubmissionState::Failed(message) => vec![message.clone()],
        SubmissionState::Succeeded(result) => vec![
            format!(
                "Bankruptcy prediction: {}",
                if result.prediction { "Yes" } else { "No" }
            ),
            format!("Probability: {}", result.probability),
        ],
    }
}
