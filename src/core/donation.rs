//! Donation ledger queries.
//!
//! Rows are written only by [`crate::core::ledger`]; this module reads them back
//! for campaign pages, donor history and consistency audits.

use crate::{
    core::campaign,
    entities::{Donation, DonationColumn, donation},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Display name stored for donors who asked to stay anonymous.
pub const ANONYMOUS_DONOR_NAME: &str = "Nhà hảo tâm ẩn danh";

/// A donation as shown on a public campaign page.
///
/// Gateway references are never exposed, and `user_id` is blank for
/// anonymous donations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationView {
    pub id: String,
    pub campaign_id: String,
    pub user_id: String,
    pub fullname: String,
    pub amount: i64,
    pub is_anonymous: bool,
    pub donation_date: DateTimeUtc,
}

impl From<donation::Model> for DonationView {
    fn from(d: donation::Model) -> Self {
        let user_id = if d.is_anonymous { String::new() } else { d.user_id };
        Self {
            id: d.id,
            campaign_id: d.campaign_id,
            user_id,
            fullname: d.fullname,
            amount: d.amount,
            is_anonymous: d.is_anonymous,
            donation_date: d.donation_date,
        }
    }
}

/// One entry of a campaign's donor leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopDonor {
    /// Account id, `None` for anonymous and guest donations
    pub user_id: Option<String>,
    pub fullname: String,
    pub amount: i64,
}

/// Donations to a campaign, newest first, in their public form.
pub async fn list_for_campaign(
    db: &DatabaseConnection,
    campaign_id: &str,
) -> Result<Vec<DonationView>> {
    let rows = Donation::find()
        .filter(DonationColumn::CampaignId.eq(campaign_id))
        .order_by_desc(DonationColumn::DonationDate)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(DonationView::from).collect())
}

/// The `limit` largest donors of a campaign.
///
/// Donations of a signed-in, non-anonymous donor are summed per account under
/// the name of their latest donation. Anonymous and guest donations are never
/// grouped and rank on their own.
pub async fn top_donors(
    db: &DatabaseConnection,
    campaign_id: &str,
    limit: usize,
) -> Result<Vec<TopDonor>> {
    let rows = Donation::find()
        .filter(DonationColumn::CampaignId.eq(campaign_id))
        .order_by_asc(DonationColumn::DonationDate)
        .all(db)
        .await?;

    let mut per_account: HashMap<String, TopDonor> = HashMap::new();
    let mut unattributed = Vec::new();
    for d in rows {
        if d.is_anonymous || d.user_id.is_empty() {
            unattributed.push(TopDonor {
                user_id: None,
                fullname: d.fullname,
                amount: d.amount,
            });
            continue;
        }
        let entry = per_account
            .entry(d.user_id.clone())
            .or_insert_with(|| TopDonor {
                user_id: Some(d.user_id),
                fullname: String::new(),
                amount: 0,
            });
        entry.amount += d.amount;
        entry.fullname = d.fullname;
    }

    let mut ranked: Vec<TopDonor> = per_account.into_values().chain(unattributed).collect();
    ranked.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.fullname.cmp(&b.fullname)));
    ranked.truncate(limit);
    Ok(ranked)
}

/// Donation history of an account, newest first.
pub async fn list_for_user(db: &DatabaseConnection, user_id: &str) -> Result<Vec<donation::Model>> {
    if user_id.trim().is_empty() {
        return Ok(Vec::new());
    }
    Donation::find()
        .filter(DonationColumn::UserId.eq(user_id))
        .order_by_desc(DonationColumn::DonationDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sum and count of the donation rows of a campaign.
pub async fn total_for_campaign<C: ConnectionTrait>(db: &C, campaign_id: &str) -> Result<(i64, i64)> {
    let rows = Donation::find()
        .filter(DonationColumn::CampaignId.eq(campaign_id))
        .all(db)
        .await?;
    let sum = rows.iter().map(|d| d.amount).sum();
    Ok((sum, rows.len() as i64))
}

/// Stored aggregates of a campaign next to the totals recomputed from its donations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignAudit {
    pub campaign_id: String,
    pub raised: i64,
    pub donors: i64,
    pub donation_sum: i64,
    pub donation_count: i64,
}

impl CampaignAudit {
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.raised == self.donation_sum && self.donors == self.donation_count
    }
}

/// Recomputes a campaign's totals from the ledger.
pub async fn audit_campaign(db: &DatabaseConnection, campaign_id: &str) -> Result<CampaignAudit> {
    let campaign = campaign::get_campaign(db, campaign_id)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: campaign_id.to_string(),
        })?;
    let (donation_sum, donation_count) = total_for_campaign(db, campaign_id).await?;

    let audit = CampaignAudit {
        campaign_id: campaign.id,
        raised: campaign.raised,
        donors: campaign.donors,
        donation_sum,
        donation_count,
    };
    if !audit.is_consistent() {
        warn!(
            campaign_id,
            raised = audit.raised,
            donation_sum = audit.donation_sum,
            "Campaign aggregates drifted from donation ledger"
        );
    }
    Ok(audit)
}
