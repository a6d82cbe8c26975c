//! Prompt assembly for the two deal narratives. Optional context lines are
//! omitted entirely rather than rendered empty.

use num_format::{Locale, ToFormattedString};

/// Structured deal context handed to the completion service.
#[derive(Debug, Clone, Default)]
pub struct DealContext {
    pub company: String,
    pub website: Option<String>,
    pub internal_contact: Option<String>,
    pub business_unit: Option<String>,
    pub deal_type: String,
    pub investment_size: Option<i32>,
    pub use_case: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub industry: Option<String>,
}

pub fn summary_prompt(ctx: &DealContext) -> String {
    let mut prompt = String::from(
        "Please generate a 3-5 sentence executive summary of this potential business deal:\n\n",
    );
    prompt.push_str(&format!("Company: {}\n", ctx.company));
    if let Some(website) = &ctx.website {
        prompt.push_str(&format!("Website: {website}\n"));
    }
    if let Some(unit) = &ctx.business_unit {
        prompt.push_str(&format!("Business Unit: {unit}\n"));
    }
    prompt.push_str(&format!("Deal Type: {}\n", ctx.deal_type));
    if let Some(size) = ctx.investment_size {
        prompt.push_str(&format!("Investment Size: ${}\n", format_usd(size)));
    }
    if let Some(use_case) = &ctx.use_case {
        prompt.push_str(&format!("Use Case: {use_case}\n"));
    }
    if !ctx.tags.is_empty() {
        prompt.push_str(&format!("Tags: {}\n", ctx.tags.join(", ")));
    }
    if let Some(notes) = &ctx.notes {
        prompt.push_str(&format!("Notes: {notes}\n"));
    }
    prompt.push_str(
        "\nThe summary should be concise, highlight strategic value, and be suitable for \
         executive leadership review.",
    );
    prompt
}

pub fn market_research_prompt(ctx: &DealContext) -> String {
    let mut prompt = format!(
        "Generate a comprehensive market research report for {}.\n\nCompany Details:\n",
        ctx.company
    );
    prompt.push_str(&format!("- Name: {}\n", ctx.company));
    if let Some(website) = &ctx.website {
        prompt.push_str(&format!("- Website: {website}\n"));
    }
    if let Some(unit) = &ctx.business_unit {
        prompt.push_str(&format!("- Our Business Unit: {unit}\n"));
    }
    prompt.push_str(&format!("- Deal Type: {}\n", ctx.deal_type));
    if let Some(use_case) = &ctx.use_case {
        prompt.push_str(&format!("- Use Case: {use_case}\n"));
    }
    if !ctx.tags.is_empty() {
        prompt.push_str(&format!("- Tags: {}\n", ctx.tags.join(", ")));
    }
    if let Some(industry) = &ctx.industry {
        prompt.push_str(&format!("- Industry: {industry}\n"));
    }
    prompt.push_str(
        "\nPlease structure your report with the following sections:\n\
         1. Executive Summary\n\
         2. Company Overview\n\
         3. Market Analysis\n\
         4. Competitive Landscape\n\
         5. Strategic Fit Assessment\n\
         6. Risk Analysis\n\
         7. Recommendation\n\n\
         For each section, provide detailed information that would be useful for our business \
         development team to evaluate this opportunity.",
    );
    prompt
}

fn format_usd(amount: i32) -> String {
    amount.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_ctx() -> DealContext {
        DealContext {
            company: "Acme Robotics".to_string(),
            website: Some("https://acme.example".to_string()),
            internal_contact: Some("Jordan Lee".to_string()),
            business_unit: Some("Industrial".to_string()),
            deal_type: "Strategic Investment".to_string(),
            investment_size: Some(1_500_000),
            use_case: Some("Warehouse automation".to_string()),
            notes: Some("Strong founding team, met at RoboExpo.".to_string()),
            tags: vec!["robotics".to_string(), "logistics".to_string()],
            industry: Some("Robotics".to_string()),
        }
    }

    #[test]
    fn summary_prompt_includes_all_supplied_fields() {
        let prompt = summary_prompt(&full_ctx());
        assert!(prompt.contains("Company: Acme Robotics"));
        assert!(prompt.contains("Website: https://acme.example"));
        assert!(prompt.contains("Business Unit: Industrial"));
        assert!(prompt.contains("Deal Type: Strategic Investment"));
        assert!(prompt.contains("Investment Size: $1,500,000"));
        assert!(prompt.contains("Use Case: Warehouse automation"));
        assert!(prompt.contains("Tags: robotics, logistics"));
        assert!(prompt.contains("Notes: Strong founding team"));
        assert!(prompt.contains("executive leadership review"));
    }

    #[test]
    fn summary_prompt_omits_absent_fields() {
        let ctx = DealContext {
            company: "Acme".to_string(),
            deal_type: "Vendor".to_string(),
            ..Default::default()
        };
        let prompt = summary_prompt(&ctx);
        assert!(!prompt.contains("Website:"));
        assert!(!prompt.contains("Investment Size:"));
        assert!(!prompt.contains("Tags:"));
        assert!(!prompt.contains("Notes:"));
    }

    #[test]
    fn market_research_prompt_names_all_seven_sections() {
        let prompt = market_research_prompt(&full_ctx());
        for section in [
            "1. Executive Summary",
            "2. Company Overview",
            "3. Market Analysis",
            "4. Competitive Landscape",
            "5. Strategic Fit Assessment",
            "6. Risk Analysis",
            "7. Recommendation",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
        assert!(prompt.contains("- Industry: Robotics"));
    }

    #[test]
    fn market_research_prompt_omits_industry_when_absent() {
        let mut ctx = full_ctx();
        ctx.industry = None;
        assert!(!market_research_prompt(&ctx).contains("- Industry:"));
    }

    #[test]
    fn usd_formatting_uses_thousands_separators() {
        assert_eq!(format_usd(1_000_000), "1,000,000");
        assert_eq!(format_usd(950), "950");
    }
}
