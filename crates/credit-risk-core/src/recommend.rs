//! Policy recommendation via a remote text-generation endpoint.
//!
//! The requester is modeled as an injected capability ([`Recommender`]) so
//! the analytics core and its tests never touch the network. The shipped
//! implementation talks to the Hugging Face router's OpenAI-compatible
//! chat-completions endpoint. Failures are best-effort by contract: callers
//! display them and keep their already-computed results.

use serde::{Deserialize, Serialize};

use crate::CreditRiskResult;

/// Portfolio-wide default used when the caller has no segment-level rate.
pub const DEFAULT_AVG_INTEREST_RATE: f64 = 8.5;

/// Metrics of the segment a recommendation is requested for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub segment: String,
    pub ecl: f64,
    pub pd: f64,
    pub lgd: f64,
    pub avg_interest_rate: f64,
}

impl RecommendationRequest {
    pub fn new(segment: impl Into<String>, ecl: f64, pd: f64, lgd: f64) -> Self {
        RecommendationRequest {
            segment: segment.into(),
            ecl,
            pd,
            lgd,
            avg_interest_rate: DEFAULT_AVG_INTEREST_RATE,
        }
    }

    pub fn with_avg_interest_rate(mut self, rate: f64) -> Self {
        self.avg_interest_rate = rate;
        self
    }
}

/// Anything that can turn segment metrics into prose.
pub trait Recommender {
    fn recommend(&self, request: &RecommendationRequest) -> CreditRiskResult<String>;
}

/// The prompt sent to the model.
pub fn build_prompt(request: &RecommendationRequest) -> String {
    format!(
        "You are a financial risk analyst at a digital bank.\n\
         Analyze the following loan segment:\n\n\
         Segment: {}\n\
         Expected Credit Loss (ECL): {:.2}\n\
         Probability of Default (PD): {:.2}%\n\
         Loss Given Default (LGD): {:.2}%\n\
         Average Interest Rate: {:.2}%\n\n\
         Based on these values, briefly recommend one of the following:\n\
         1. Increase interest rate to offset higher risk.\n\
         2. Reduce new loan disbursements to this segment.\n\
         3. Maintain current policy if risk is acceptable.\n\n\
         Provide reasoning in 2 concise sentences.",
        request.segment,
        request.ecl,
        request.pd * 100.0,
        request.lgd * 100.0,
        request.avg_interest_rate,
    )
}

#[cfg(feature = "recommend")]
pub use client::HfRouterClient;

#[cfg(feature = "recommend")]
mod client {
    use std::time::Duration;

    use super::{build_prompt, RecommendationRequest, Recommender};
    use crate::error::CreditRiskError;
    use crate::CreditRiskResult;

    const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/v1";
    const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3-8B-Instruct";
    const API_TOKEN_VAR: &str = "HUGGINGFACEHUB_API_TOKEN";
    const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

    /// Chat-completions client for the Hugging Face router.
    pub struct HfRouterClient {
        api_token: String,
        base_url: String,
        model: String,
        http: reqwest::blocking::Client,
    }

    impl HfRouterClient {
        pub fn new(api_token: impl Into<String>) -> CreditRiskResult<Self> {
            let http = reqwest::blocking::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .map_err(|e| CreditRiskError::RecommendationUnavailable(e.to_string()))?;
            Ok(HfRouterClient {
                api_token: api_token.into(),
                base_url: DEFAULT_BASE_URL.to_string(),
                model: DEFAULT_MODEL.to_string(),
                http,
            })
        }

        /// Read the API token from `HUGGINGFACEHUB_API_TOKEN`.
        pub fn from_env() -> CreditRiskResult<Self> {
            let token = std::env::var(API_TOKEN_VAR).map_err(|_| {
                CreditRiskError::RecommendationUnavailable(format!(
                    "environment variable {} is not set",
                    API_TOKEN_VAR
                ))
            })?;
            Self::new(token)
        }

        pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = base_url.into();
            self
        }

        pub fn with_model(mut self, model: impl Into<String>) -> Self {
            self.model = model.into();
            self
        }
    }

    impl Recommender for HfRouterClient {
        fn recommend(&self, request: &RecommendationRequest) -> CreditRiskResult<String> {
            let body = serde_json::json!({
                "model": self.model,
                "messages": [
                    {"role": "user", "content": build_prompt(request)}
                ],
                "temperature": 0.7,
                "max_tokens": 150,
            });

            let response = self
                .http
                .post(format!("{}/chat/completions", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_token))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .map_err(|e| {
                    CreditRiskError::RecommendationUnavailable(format!("request failed: {}", e))
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CreditRiskError::RecommendationUnavailable(format!(
                    "endpoint returned HTTP {}",
                    status
                )));
            }

            let parsed: serde_json::Value = response.json().map_err(|e| {
                CreditRiskError::RecommendationUnavailable(format!("malformed response: {}", e))
            })?;
            let content = parsed["choices"][0]["message"]["content"]
                .as_str()
                .ok_or_else(|| {
                    CreditRiskError::RecommendationUnavailable(
                        "no content in model response".to_string(),
                    )
                })?;

            let text = content.trim();
            if text.is_empty() {
                Ok("No recommendation generated.".to_string())
            } else {
                Ok(text.to_string())
            }
        }
    }
}
