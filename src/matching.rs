use std::collections::HashSet;

use serde_json::Value;
use tracing::{info, warn};

use crate::ai::{extract_json_object, CompletionProvider};
use crate::entities::matches::{EmailStatus, ReviewStatus};
use crate::entities::{campaign, investor};
use crate::error::AppError;
use crate::storage::{MatchUpdate, NewMatch, Storage};

/// Upper bound on investors scored in one generation run.
pub const CANDIDATE_CAP: usize = 20;
/// Scores at or below this are discarded.
pub const SCORE_THRESHOLD: f64 = 50.0;

/// Pre-filter investors before any model call. An investor is a candidate
/// when some comma-separated token of its focus or stage appears in the
/// campaign description (case-insensitive). Without a description every
/// investor qualifies. Capped at CANDIDATE_CAP either way.
pub fn select_candidates(
    investors: Vec<investor::Model>,
    description: Option<&str>,
) -> Vec<investor::Model> {
    let description = description.map(str::trim).filter(|d| !d.is_empty());
    let Some(description) = description else {
        return investors.into_iter().take(CANDIDATE_CAP).collect();
    };
    let description = description.to_lowercase();

    investors
        .into_iter()
        .filter(|inv| {
            keyword_tokens(inv.focus.as_deref())
                .chain(keyword_tokens(inv.stage.as_deref()))
                .any(|token| description.contains(&token))
        })
        .take(CANDIDATE_CAP)
        .collect()
}

fn keyword_tokens(text: Option<&str>) -> impl Iterator<Item = String> + '_ {
    text.unwrap_or("")
        .split(',')
        .map(|token| token.trim().to_lowercase())
        .filter(|token| !token.is_empty())
}

/// Score every candidate investor for the campaign and persist the ones the
/// model rates above SCORE_THRESHOLD. Returns how many matches were created.
/// A failure on one candidate never aborts the rest of the run.
pub async fn generate_matches(
    storage: &dyn Storage,
    provider: &dyn CompletionProvider,
    campaign_id: i32,
) -> Result<usize, AppError> {
    let campaign = storage
        .campaign(campaign_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;

    let investors = storage.investors(None, None).await?;
    let candidates = select_candidates(investors, campaign.description.as_deref());

    // Investors matched in an earlier run are skipped, so re-generation
    // only ever adds new rows.
    let already_matched: HashSet<i32> = storage
        .matched_investor_ids(campaign_id)
        .await?
        .into_iter()
        .collect();

    let mut created = 0;
    for candidate in candidates {
        if already_matched.contains(&candidate.id) {
            continue;
        }

        let raw = match provider.complete_json(&score_prompt(&campaign, &candidate)).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Scoring failed for investor {}: {}", candidate.id, e);
                continue;
            }
        };

        let verdict = extract_json_object(&raw);
        let Some(score) = verdict.get("score").and_then(Value::as_f64) else {
            warn!("No usable score for investor {} in model reply", candidate.id);
            continue;
        };
        if score <= SCORE_THRESHOLD {
            continue;
        }

        let reason = verdict
            .get("reason")
            .and_then(Value::as_str)
            .map(str::to_string);
        let row = NewMatch {
            campaign_id,
            investor_id: candidate.id,
            match_score: Some(score.round() as i32),
            match_reason: reason,
            status: ReviewStatus::Pending,
            email_status: EmailStatus::NotSent,
        };
        match storage.create_match(row).await {
            Ok(_) => created += 1,
            Err(e) => warn!("Failed to persist match for investor {}: {}", candidate.id, e),
        }
    }

    info!("Generated {} matches for campaign {}", created, campaign_id);
    Ok(created)
}

/// Draft an outreach email for a match and store it on the row, replacing
/// any previous draft. Nothing is written when the model call fails.
pub async fn draft_email(
    storage: &dyn Storage,
    provider: &dyn CompletionProvider,
    match_id: i32,
) -> Result<String, AppError> {
    let record = storage
        .match_by_id(match_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
    let campaign = storage
        .campaign(record.campaign_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Campaign not found".to_string()))?;
    let investor = storage
        .investor(record.investor_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Investor not found".to_string()))?;

    let content = provider
        .complete_text(&email_prompt(&campaign, &investor))
        .await?;

    let update = MatchUpdate {
        email_content: Some(content.clone()),
        ..Default::default()
    };
    storage.update_match(match_id, update).await?;

    info!("Drafted outreach email for match {}", match_id);
    Ok(content)
}

fn score_prompt(campaign: &campaign::Model, investor: &investor::Model) -> String {
    format!(
        "You are rating how well an investor fits a fundraising campaign.\n\n\
         Campaign: {}\n\
         Campaign description: {}\n\n\
         Investor: {}\n\
         Investment focus: {}\n\
         Preferred stage: {}\n\
         Portfolio companies: {}\n\n\
         Rate the fit from 0 to 100 and give a short reason. \
         Format your response as a clean JSON object with these exact keys: \
         {{\"score\": 0-100, \"reason\": \"one or two sentences\"}} \
         Don't add any additional explanation or text before or after the JSON.",
        campaign.name,
        campaign.description.as_deref().unwrap_or("(none provided)"),
        investor.name,
        investor.focus.as_deref().unwrap_or("unspecified"),
        investor.stage.as_deref().unwrap_or("unspecified"),
        investor.portfolio.as_deref().unwrap_or("unspecified"),
    )
}

fn email_prompt(campaign: &campaign::Model, investor: &investor::Model) -> String {
    format!(
        "Write a short, personalized cold outreach email to an investor on behalf of a \
         founder running the \"{}\" fundraising campaign.\n\n\
         Campaign description: {}\n\n\
         Investor: {}\n\
         Investment focus: {}\n\
         Portfolio companies: {}\n\n\
         Keep it under 200 words, reference the investor's focus or portfolio where \
         relevant, and begin with a subject line in the form \"Subject: ...\".",
        campaign.name,
        campaign.description.as_deref().unwrap_or("(none provided)"),
        investor.name,
        investor.focus.as_deref().unwrap_or("unspecified"),
        investor.portfolio.as_deref().unwrap_or("unspecified"),
    )
}
