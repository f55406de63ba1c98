use clap::Args;
use serde_json::{json, Value};

use credit_risk_core::recommend::{
    HfRouterClient, RecommendationRequest, Recommender, DEFAULT_AVG_INTEREST_RATE,
};

/// Arguments for requesting a policy recommendation
#[derive(Args)]
pub struct RecommendArgs {
    /// Segment label the metrics belong to
    #[arg(long)]
    pub segment: String,

    /// Expected Credit Loss of the segment
    #[arg(long)]
    pub ecl: f64,

    /// Probability of default, 0 to 1
    #[arg(long)]
    pub pd: f64,

    /// Loss given default, 0 to 1
    #[arg(long)]
    pub lgd: f64,

    /// Average interest rate of the segment, in percent
    #[arg(long, default_value_t = DEFAULT_AVG_INTEREST_RATE)]
    pub avg_interest: f64,

    /// Override the chat-completions base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Override the model id
    #[arg(long)]
    pub model: Option<String>,
}

pub fn run_recommend(args: RecommendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut client = HfRouterClient::from_env()?;
    if let Some(base_url) = args.base_url {
        client = client.with_base_url(base_url);
    }
    if let Some(model) = args.model {
        client = client.with_model(model);
    }

    let request = RecommendationRequest::new(args.segment.as_str(), args.ecl, args.pd, args.lgd)
        .with_avg_interest_rate(args.avg_interest);
    let recommendation = client.recommend(&request)?;

    Ok(json!({
        "result": {
            "segment": args.segment,
            "recommendation": recommendation,
        },
    }))
}
