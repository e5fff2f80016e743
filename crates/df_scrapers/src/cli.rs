use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use df_core::Config;

/// A duration written like `15s`, `2m` or `1h30m`. A trailing number
/// without a unit counts as seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanDuration(pub Duration);

fn seconds_per(unit: char) -> Option<u64> {
    match unit {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3600),
        'd' => Some(86_400),
        _ => None,
    }
}

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let input = s.trim();
        if input.is_empty() {
            return Err("Duration must include a number".to_string());
        }
        let too_large = || format!("Duration too large: {}", input);

        let mut rest = input;
        let mut total: u64 = 0;
        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(format!("Expected a number in duration at `{}`", rest));
            }
            let value: u64 = rest[..digits].parse().map_err(|_| too_large())?;
            rest = rest[digits..].trim_start();

            let mut chars = rest.chars();
            let scale = match chars.next() {
                None => 1,
                Some(unit) => {
                    let scale = seconds_per(unit)
                        .ok_or_else(|| format!("Invalid duration unit: {}", unit))?;
                    rest = chars.as_str().trim_start();
                    scale
                }
            };

            total = value
                .checked_mul(scale)
                .and_then(|seconds| total.checked_add(seconds))
                .ok_or_else(too_large)?;
        }

        Ok(HumanDuration(Duration::from_secs(total)))
    }
}

/// Run options. Each one, when given, overrides the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct ScraperArgs {
    /// Listing page to read announcements from
    #[arg(short = 'u', long)]
    pub url: Option<String>,

    /// Where to write the RSS document
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Maximum number of announcements to include
    #[arg(short = 'm', long)]
    pub max_items: Option<usize>,

    /// Extractor profile for the site's markup
    #[arg(long)]
    pub profile: Option<String>,

    /// Per-request timeout (e.g. 15s, 1m)
    #[arg(long)]
    pub timeout: Option<HumanDuration>,

    /// Wall-clock budget for the whole run (e.g. 5m)
    #[arg(long)]
    pub budget: Option<HumanDuration>,

    /// Detail pages fetched at the same time
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Extra attempts for failed requests
    #[arg(long)]
    pub retries: Option<u32>,

    #[arg(long)]
    pub user_agent: Option<String>,

    /// Feed title
    #[arg(long)]
    pub title: Option<String>,

    /// Feed description
    #[arg(long)]
    pub description: Option<String>,

    /// Feed language code (e.g. tr)
    #[arg(long)]
    pub language: Option<String>,
}

impl ScraperArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.url {
            config.listing_url = url.clone();
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if let Some(max_items) = self.max_items {
            config.max_items = max_items;
        }
        if let Some(profile) = &self.profile {
            config.profile = profile.clone();
        }
        if let Some(timeout) = self.timeout {
            config.request_timeout_secs = timeout.0.as_secs();
        }
        if let Some(budget) = self.budget {
            config.run_budget_secs = budget.0.as_secs();
        }
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        if let Some(title) = &self.title {
            config.feed.title = title.clone();
        }
        if let Some(description) = &self.description {
            config.feed.description = description.clone();
        }
        if let Some(language) = &self.language {
            config.feed.language = Some(language.clone());
        }
    }
}
