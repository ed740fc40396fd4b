use csv::ReaderBuilder;
use serde::Serialize;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::entities::investor::SocialLinks;
use crate::error::AppError;
use crate::storage::{NewInvestor, Storage};

// Header names as they appear in the investor research spreadsheet.
const COL_NAME: &str = "Investor Name";
const COL_FUND_TYPE: &str = "Fund Type";
const COL_WEBSITE: &str = "Website (if available)";
const COL_FOCUS: &str = "Fund Focus (Sectors)";
const COL_STAGE: &str = "Fund Stage";
const COL_PARTNER_NAME: &str = "Partner Name";
const COL_PARTNER_EMAIL: &str = "Partner Email";
const COL_PORTFOLIO: &str = "Portfolio Companies";
const COL_LOCATION: &str = "Location";
const COL_TWITTER: &str = "Twitter Link";
const COL_LINKEDIN: &str = "LinkedIn Link";
const COL_FACEBOOK: &str = "Facebook Link";
const COL_INVESTMENTS: &str = "Number of Investments";
const COL_EXITS: &str = "Number of Exits";
const COL_DESCRIPTION: &str = "Fund Description";
const COL_FOUNDING_YEAR: &str = "Founding Year";

/// One rejected CSV row and why it was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SkippedRow {
    /// 1-based line in the uploaded file; the header is line 1.
    pub line: u64,
    pub reason: String,
}

/// What an import run did.
#[derive(Debug, Serialize, ToSchema)]
pub struct ImportOutcome {
    /// Investors inserted.
    pub count: usize,
    /// Rows rejected during parsing.
    pub skipped: Vec<SkippedRow>,
}

#[derive(Debug)]
pub struct ParsedImport {
    pub investors: Vec<NewInvestor>,
    pub skipped: Vec<SkippedRow>,
}

/// Parse the investor spreadsheet. Unreadable rows and rows without a name
/// are collected in `skipped` instead of failing the whole file.
pub fn parse_investors_csv(data: &[u8]) -> Result<ParsedImport, AppError> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::ImportError(format!("Unreadable CSV header: {}", e)))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let name_col = column(COL_NAME);
    if name_col.is_none() {
        return Err(AppError::ImportError(format!(
            "CSV is missing the required \"{}\" column",
            COL_NAME
        )));
    }
    let fund_type_col = column(COL_FUND_TYPE);
    let website_col = column(COL_WEBSITE);
    let focus_col = column(COL_FOCUS);
    let stage_col = column(COL_STAGE);
    let partner_name_col = column(COL_PARTNER_NAME);
    let partner_email_col = column(COL_PARTNER_EMAIL);
    let portfolio_col = column(COL_PORTFOLIO);
    let location_col = column(COL_LOCATION);
    let twitter_col = column(COL_TWITTER);
    let linkedin_col = column(COL_LINKEDIN);
    let facebook_col = column(COL_FACEBOOK);
    let investments_col = column(COL_INVESTMENTS);
    let exits_col = column(COL_EXITS);
    let description_col = column(COL_DESCRIPTION);
    let founding_year_col = column(COL_FOUNDING_YEAR);

    let mut investors = Vec::new();
    let mut skipped = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        // Data rows start on line 2, right after the header.
        let fallback_line = idx as u64 + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(fallback_line);
                skipped.push(SkippedRow {
                    line,
                    reason: format!("Unparseable row: {}", e),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(fallback_line);

        let field = |col: Option<usize>| -> Option<String> {
            col.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let Some(name) = field(name_col) else {
            skipped.push(SkippedRow {
                line,
                reason: format!("Missing \"{}\"", COL_NAME),
            });
            continue;
        };

        let twitter = field(twitter_col);
        let linkedin = field(linkedin_col);
        let facebook = field(facebook_col);
        let social_links = if twitter.is_none() && linkedin.is_none() && facebook.is_none() {
            None
        } else {
            Some(SocialLinks {
                twitter,
                linkedin,
                facebook,
            })
        };

        investors.push(NewInvestor {
            name,
            fund_type: field(fund_type_col),
            website: field(website_col),
            focus: field(focus_col),
            stage: field(stage_col),
            partner_name: field(partner_name_col),
            partner_email: field(partner_email_col),
            portfolio: field(portfolio_col),
            location: field(location_col),
            social_links,
            investment_count: Some(parse_count(field(investments_col))),
            exit_count: Some(parse_count(field(exits_col))),
            description: field(description_col),
            founding_year: field(founding_year_col).and_then(|v| v.parse::<i32>().ok()),
        });
    }

    Ok(ParsedImport { investors, skipped })
}

// Non-numeric counts become 0 rather than dropping the row.
fn parse_count(value: Option<String>) -> i32 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

/// Parse and insert a CSV payload.
pub async fn import_csv(storage: &dyn Storage, data: &[u8]) -> Result<ImportOutcome, AppError> {
    let parsed = parse_investors_csv(data)?;
    let count = storage.create_investors(parsed.investors).await?;
    info!("Imported {} investors ({} rows skipped)", count, parsed.skipped.len());
    Ok(ImportOutcome {
        count,
        skipped: parsed.skipped,
    })
}

/// Seed the investor table from a CSV file, but only when the table is
/// still empty. Lets deployments ship a starter dataset without clobbering
/// real data on restart.
pub async fn seed_if_empty(storage: &dyn Storage, path: &str) -> Result<(), AppError> {
    let existing = storage.investors(None, None).await?;
    if !existing.is_empty() {
        info!("Investor table already populated; skipping seed");
        return Ok(());
    }

    let data = std::fs::read(path)
        .map_err(|e| AppError::ImportError(format!("Failed to read seed file {}: {}", path, e)))?;
    let outcome = import_csv(storage, &data).await?;
    info!("Seeded {} investors from {}", outcome.count, path);
    for row in &outcome.skipped {
        warn!("Seed row {} skipped: {}", row.line, row.reason);
    }
    Ok(())
}
