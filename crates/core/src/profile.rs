//! Business profile — the structured memory maintained per session.
//!
//! The profile has a fixed field set: seven optional scalars plus a
//! monotonically growing set of compliance concerns. Updates arrive either
//! from structured LLM extraction or from the profile endpoint, both as a
//! [`ProfileUpdate`], and are folded in by [`BusinessProfile::merge`].

use serde::{Deserialize, Serialize};

/// The structured business profile for one session.
///
/// All scalar fields start unset and `compliance_concerns` starts empty.
/// Only this fixed field set is ever present — unknown fields in incoming
/// updates are dropped at deserialization time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Type of business (e.g., sole proprietorship, LLC, corporation)
    pub business_type: Option<String>,

    /// Industry the business operates in
    pub industry: Option<String>,

    /// Annual revenue range (e.g., "under 20 lakhs", "above 1 crore")
    pub revenue_range: Option<String>,

    /// Current tax filing status or concerns
    pub tax_filing_status: Option<String>,

    /// Specific compliance concerns mentioned so far.
    /// Grows by de-duplicated union; entries are never removed by merging.
    pub compliance_concerns: Vec<String>,

    /// Last tax filing date, if mentioned
    pub last_filing_date: Option<String>,

    /// GST registration number, if mentioned
    pub gst_number: Option<String>,

    /// Business location, if mentioned
    pub location: Option<String>,
}

impl BusinessProfile {
    /// Fold a partial update into this profile.
    ///
    /// Scalars: a `None` or empty-string value is skipped; anything else
    /// overwrites unconditionally (last-write-wins, no confidence weighting).
    /// Concerns: appended only when not already present, preserving
    /// first-seen order.
    pub fn merge(&mut self, update: ProfileUpdate) {
        merge_scalar(&mut self.business_type, update.business_type);
        merge_scalar(&mut self.industry, update.industry);
        merge_scalar(&mut self.revenue_range, update.revenue_range);
        merge_scalar(&mut self.tax_filing_status, update.tax_filing_status);
        merge_scalar(&mut self.last_filing_date, update.last_filing_date);
        merge_scalar(&mut self.gst_number, update.gst_number);
        merge_scalar(&mut self.location, update.location);

        for concern in update.compliance_concerns {
            if !concern.is_empty() && !self.compliance_concerns.contains(&concern) {
                self.compliance_concerns.push(concern);
            }
        }
    }
}

fn merge_scalar(field: &mut Option<String>, value: Option<String>) {
    if let Some(v) = value {
        if !v.is_empty() {
            *field = Some(v);
        }
    }
}

/// A partial profile update.
///
/// Produced by structured extraction (where the model returns explicit
/// nulls for unmentioned fields) and by the profile-update endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub business_type: Option<String>,

    #[serde(default)]
    pub industry: Option<String>,

    #[serde(default)]
    pub revenue_range: Option<String>,

    #[serde(default)]
    pub tax_filing_status: Option<String>,

    #[serde(default)]
    pub compliance_concerns: Vec<String>,

    #[serde(default)]
    pub last_filing_date: Option<String>,

    #[serde(default)]
    pub gst_number: Option<String>,

    #[serde(default)]
    pub location: Option<String>,
}

impl ProfileUpdate {
    /// Whether this update carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.business_type.is_none()
            && self.industry.is_none()
            && self.revenue_range.is_none()
            && self.tax_filing_status.is_none()
            && self.compliance_concerns.is_empty()
            && self.last_filing_date.is_none()
            && self.gst_number.is_none()
            && self.location.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_overwrites_scalars_last_write_wins() {
        let mut profile = BusinessProfile {
            business_type: Some("sole proprietorship".into()),
            ..Default::default()
        };

        profile.merge(ProfileUpdate {
            business_type: Some("LLC".into()),
            industry: Some("textiles".into()),
            ..Default::default()
        });

        assert_eq!(profile.business_type.as_deref(), Some("LLC"));
        assert_eq!(profile.industry.as_deref(), Some("textiles"));
    }

    #[test]
    fn merge_skips_null_and_empty_scalars() {
        let mut profile = BusinessProfile {
            gst_number: Some("27AAPFU0939F1ZV".into()),
            location: Some("Pune".into()),
            ..Default::default()
        };

        profile.merge(ProfileUpdate {
            gst_number: Some(String::new()),
            location: None,
            ..Default::default()
        });

        assert_eq!(profile.gst_number.as_deref(), Some("27AAPFU0939F1ZV"));
        assert_eq!(profile.location.as_deref(), Some("Pune"));
    }

    #[test]
    fn concerns_grow_by_deduplicated_union() {
        let mut profile = BusinessProfile {
            compliance_concerns: vec!["late filing".into()],
            ..Default::default()
        };

        profile.merge(ProfileUpdate {
            compliance_concerns: vec!["late filing".into(), "GST mismatch".into()],
            ..Default::default()
        });

        assert_eq!(
            profile.compliance_concerns,
            vec!["late filing".to_string(), "GST mismatch".to_string()]
        );
    }

    #[test]
    fn concerns_are_never_removed() {
        let mut profile = BusinessProfile {
            compliance_concerns: vec!["ITC reconciliation".into()],
            ..Default::default()
        };

        profile.merge(ProfileUpdate::default());
        assert_eq!(profile.compliance_concerns, vec!["ITC reconciliation"]);
    }

    #[test]
    fn unknown_fields_are_dropped_on_deserialization() {
        let json = r#"{"business_type": "LLC", "favourite_colour": "teal"}"#;
        let update: ProfileUpdate = serde_json::from_str(json).unwrap();
        assert_eq!(update.business_type.as_deref(), Some("LLC"));

        let mut profile = BusinessProfile::default();
        profile.merge(update);
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("favourite_colour").is_none());
    }

    #[test]
    fn empty_update_detected() {
        assert!(ProfileUpdate::default().is_empty());
        let update = ProfileUpdate {
            location: Some("Mumbai".into()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn profile_serializes_all_fields_even_when_unset() {
        let profile = BusinessProfile::default();
        let value = serde_json::to_value(&profile).unwrap();
        for field in [
            "business_type",
            "industry",
            "revenue_range",
            "tax_filing_status",
            "compliance_concerns",
            "last_filing_date",
            "gst_number",
            "location",
        ] {
            assert!(value.get(field).is_some(), "missing field: {field}");
        }
    }
}
