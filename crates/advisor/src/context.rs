//! Context assembly — builds the enriched prompt for one chat turn.
//!
//! The enriched text always carries the literal user message and a rendering
//! of every profile field (placeholders for unset values, so the model sees
//! the full profile shape), plus a bounded prefix of the uploaded document
//! when one exists for the session.
//!
//! # Determinism
//!
//! Assembly is purely textual concatenation with fixed section headers:
//! identical (message, profile, document) inputs always produce identical
//! output. No randomness, no hidden state.

use gstmate_core::profile::BusinessProfile;

/// The context assembler. Stateless — create one and reuse it.
pub struct ContextAssembler {
    document_context_chars: usize,
}

impl ContextAssembler {
    /// Create an assembler carrying at most `document_context_chars` of
    /// document text per turn.
    pub fn new(document_context_chars: usize) -> Self {
        Self {
            document_context_chars,
        }
    }

    /// Build the enriched prompt for one turn.
    pub fn build(
        &self,
        user_message: &str,
        profile: &BusinessProfile,
        document_text: Option<&str>,
    ) -> String {
        let mut enriched = format!("User question: {user_message}\n\n");

        enriched.push_str("Business Profile Information:\n");
        enriched.push_str(&format!(
            "- Business Type: {}\n",
            scalar(&profile.business_type)
        ));
        enriched.push_str(&format!("- Industry: {}\n", scalar(&profile.industry)));
        enriched.push_str(&format!(
            "- Revenue Range: {}\n",
            scalar(&profile.revenue_range)
        ));
        enriched.push_str(&format!(
            "- Tax Filing Status: {}\n",
            scalar(&profile.tax_filing_status)
        ));
        enriched.push_str(&format!(
            "- Compliance Concerns: {}\n",
            concerns(&profile.compliance_concerns)
        ));
        enriched.push_str(&format!(
            "- Last Filing Date: {}\n",
            scalar(&profile.last_filing_date)
        ));
        enriched.push_str(&format!("- GST Number: {}\n", scalar(&profile.gst_number)));
        enriched.push_str(&format!("- Location: {}\n", scalar(&profile.location)));

        if let Some(text) = document_text {
            enriched.push_str(&format!(
                "\nRelevant document content: {}",
                char_prefix(text, self.document_context_chars)
            ));
        }

        enriched
    }
}

fn scalar(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("Unknown")
}

fn concerns(list: &[String]) -> String {
    if list.is_empty() {
        "None".into()
    } else {
        list.join(", ")
    }
}

/// The first `n` characters of `s` (not bytes — slicing could split a
/// multi-byte character).
pub fn char_prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
