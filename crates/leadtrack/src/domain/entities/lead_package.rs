//! LeadPackage - A purchased batch of sales leads
//!
//! Pure domain entity without infrastructure dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

const MAX_NAME_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 100;

/// LeadPackage - One acquisition of leads from a marketing channel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LeadPackage {
    pub id: i32,
    pub name: String,
    pub source: String,
    /// Industry or grade level; dashboards group by it
    pub industry: Option<String>,
    pub region: Option<String>,
    pub total_leads: i32,
    pub valid_leads: i32,
    /// Fraction of dial attempts that connected (0-1)
    pub contact_rate: f64,
    /// Fraction of connected calls showing interest (0-1)
    pub interest_rate: f64,
    pub cost_per_lead: f64,
    pub total_cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Attributes supplied when registering a package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLeadPackage {
    pub name: String,
    pub source: String,
    pub industry: Option<String>,
    pub region: Option<String>,
    pub total_leads: i32,
    pub valid_leads: i32,
    pub cost_per_lead: f64,
}

/// Attribute edits; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeadPackageChanges {
    pub name: Option<String>,
    pub source: Option<String>,
    pub industry: Option<String>,
    pub region: Option<String>,
    pub total_leads: Option<i32>,
    pub valid_leads: Option<i32>,
    pub cost_per_lead: Option<f64>,
}

impl LeadPackageChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.source.is_none()
            && self.industry.is_none()
            && self.region.is_none()
            && self.total_leads.is_none()
            && self.valid_leads.is_none()
            && self.cost_per_lead.is_none()
    }
}

impl LeadPackage {
    /// Create an unsaved package (id 0) stamped with `now`
    pub fn new(draft: NewLeadPackage, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            name: draft.name,
            source: draft.source,
            industry: draft.industry,
            region: draft.region,
            total_leads: draft.total_leads,
            valid_leads: draft.valid_leads,
            contact_rate: 0.0,
            interest_rate: 0.0,
            cost_per_lead: draft.cost_per_lead,
            total_cost: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Dashboard grouping key
    pub fn level(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn apply(&mut self, changes: LeadPackageChanges, now: DateTime<Utc>) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(source) = changes.source {
            self.source = source;
        }
        if let Some(industry) = changes.industry {
            self.industry = Some(industry);
        }
        if let Some(region) = changes.region {
            self.region = Some(region);
        }
        if let Some(total) = changes.total_leads {
            self.total_leads = total;
        }
        if let Some(valid) = changes.valid_leads {
            self.valid_leads = valid;
        }
        if let Some(cost) = changes.cost_per_lead {
            self.cost_per_lead = cost;
        }
        self.updated_at = now;
    }

    /// Check the user-supplied attributes before a write
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() || self.name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::Validation(format!(
                "name must be 1-{} characters",
                MAX_NAME_LEN
            )));
        }
        if self.source.trim().is_empty() {
            return Err(DomainError::Validation("source is required".into()));
        }
        for (field, value) in [
            ("source", Some(self.source.as_str())),
            ("industry", self.industry.as_deref()),
            ("region", self.region.as_deref()),
        ] {
            if value.map_or(false, |v| v.chars().count() > MAX_LABEL_LEN) {
                return Err(DomainError::Validation(format!(
                    "{} is longer than {} characters",
                    field, MAX_LABEL_LEN
                )));
            }
        }
        if self.total_leads < 0 || self.valid_leads < 0 {
            return Err(DomainError::Validation("lead counts cannot be negative".into()));
        }
        if self.valid_leads > self.total_leads {
            return Err(DomainError::Validation(format!(
                "valid_leads ({}) exceeds total_leads ({})",
                self.valid_leads, self.total_leads
            )));
        }
        if !self.cost_per_lead.is_finite() || self.cost_per_lead < 0.0 {
            return Err(DomainError::Validation(format!(
                "cost_per_lead must be a non-negative number, got {}",
                self.cost_per_lead
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn draft() -> NewLeadPackage {
        NewLeadPackage {
            name: "October list".into(),
            source: "vendor_a".into(),
            industry: None,
            region: None,
            total_leads: 1000,
            valid_leads: 900,
            cost_per_lead: 2.5,
        }
    }

    #[test]
    fn test_new_package_is_valid() {
        assert!(LeadPackage::new(draft(), Utc::now()).validate().is_ok());
    }

    #[test]
    fn test_valid_leads_cannot_exceed_total() {
        let mut package = LeadPackage::new(draft(), Utc::now());
        package.valid_leads = 1001;
        assert!(matches!(package.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_blank_name_and_negative_cost_are_rejected() {
        let mut package = LeadPackage::new(draft(), Utc::now());
        package.name = "  ".into();
        assert!(package.validate().is_err());

        let mut package = LeadPackage::new(draft(), Utc::now());
        package.cost_per_lead = -1.0;
        assert!(package.validate().is_err());
    }

    #[test]
    fn test_apply_only_touches_given_fields() {
        let created = Utc::now();
        let mut package = LeadPackage::new(draft(), created);
        let later = created + Duration::minutes(5);

        package.apply(
            LeadPackageChanges {
                region: Some("north".into()),
                total_leads: Some(1200),
                ..Default::default()
            },
            later,
        );

        assert_eq!(package.name, "October list");
        assert_eq!(package.region.as_deref(), Some("north"));
        assert_eq!(package.total_leads, 1200);
        assert_eq!(package.valid_leads, 900);
        assert_eq!(package.created_at, created);
        assert_eq!(package.updated_at, later);
    }
}
