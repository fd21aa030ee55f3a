use crate::random::{pick, RandomSource};
use strum::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum ResponseCategory {
    Location,
    Profit,
    Trends,
    Partnership,
    Help,
    Default,
}

// Checked top to bottom; the first category with a matching keyword wins.
const PRIORITY: [(ResponseCategory, &[&str]); 5] = [
    (ResponseCategory::Location, &["location", "where"]),
    (ResponseCategory::Profit, &["profit", "money", "earn"]),
    (ResponseCategory::Trends, &["trend", "popular", "selling"]),
    (ResponseCategory::Partnership, &["partner", "team", "collaborate"]),
    (ResponseCategory::Help, &["help", "how", "start"]),
];

pub const DEFAULT_REPLIES: [&str; 5] = [
    "That's an interesting question! Let me help you explore the best opportunities for your street vendor business. What specific area would you like to focus on?",
    "I understand you're looking to grow your business. Tell me what you sell and where you set up, and I'll point you to the opportunities that fit.",
    "I understand you're looking to grow your business. Based on current market data, I can provide personalized recommendations. Tell me more about your current situation.",
    "Great question! As your AI business assistant, I have access to real-time market trends and location data. How can I help optimize your vendor strategy today?",
    "I'm analyzing the latest market trends for you. Street vending has great potential when you have the right location and products. What's your main interest - food, accessories, or services?",
];

/// Maps free text to a reply category by case-insensitive substring match.
pub fn classify(text: &str) -> ResponseCategory {
    let lowered = text.to_lowercase();
    PRIORITY
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(ResponseCategory::Default)
}

impl ResponseCategory {
    /// The canned reply for this category. `Default` has no single template;
    /// it draws from `DEFAULT_REPLIES`.
    pub fn template(self) -> Option<&'static str> {
        match self {
            ResponseCategory::Location => Some(
                "🗺️ I can help you find the best locations for your business! Use the location detector to get personalized recommendations based on foot traffic, competition, and local trends.",
            ),
            ResponseCategory::Profit => Some(
                "💰 Let's calculate your potential profits! The profit simulator can help you estimate earnings based on location, product type, and market conditions. Would you like me to open it for you?",
            ),
            ResponseCategory::Trends => Some(
                "📈 Based on current trends, here are hot opportunities:\n\n🏏 Sports merchandise (Cricket season)\n🌧️ Monsoon essentials (Umbrellas, hot drinks)\n🎉 Festival items (Traditional sweets)\n💚 Health products (Fresh juices)\n\nWhich category interests you most?",
            ),
            ResponseCategory::Partnership => Some(
                "🤝 Great idea! Partnerships can boost your business. I can help you find vendors who complement your offerings - like someone with a prime location looking for a product supplier, or vice versa. What resources do you have to offer?",
            ),
            ResponseCategory::Help => Some(
                "🚀 I'm here to help you succeed! I can assist with:\n\n📍 Finding optimal locations\n💡 Identifying trending products\n📊 Calculating profit potential\n🤝 Finding business partners\n📋 Creating business plans\n\nWhat would you like to explore first?",
            ),
            ResponseCategory::Default => None,
        }
    }
}

pub fn reply_for(text: &str, rng: &dyn RandomSource) -> String {
    let category = classify(text);
    match category.template() {
        Some(template) => template.to_string(),
        None => pick(rng, &DEFAULT_REPLIES)
            .copied()
            .unwrap_or(DEFAULT_REPLIES[0])
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedIndex;

    #[test]
    fn each_category_matches_its_keywords() {
        assert_eq!(classify("Where should I set up?"), ResponseCategory::Location);
        assert_eq!(classify("how much money can I make"), ResponseCategory::Profit);
        assert_eq!(classify("what's popular now"), ResponseCategory::Trends);
        assert_eq!(classify("I want to collaborate"), ResponseCategory::Partnership);
        assert_eq!(classify("HELP"), ResponseCategory::Help);
        assert_eq!(classify("namaste"), ResponseCategory::Default);
    }

    #[test]
    fn earlier_category_wins_on_overlap() {
        assert_eq!(classify("help me with a trend"), ResponseCategory::Trends);
        assert_eq!(classify("which location earns more profit"), ResponseCategory::Location);
        assert_eq!(classify("partner up to earn"), ResponseCategory::Profit);
        assert_eq!(classify("how do teams start"), ResponseCategory::Partnership);
    }

    #[test]
    fn matching_is_substring_based() {
        // "earnings" contains "earn", "trending" contains "trend"
        assert_eq!(classify("My EARNINGS dropped"), ResponseCategory::Profit);
        assert_eq!(classify("what is trending"), ResponseCategory::Trends);
    }

    #[test]
    fn default_reply_comes_from_pool() {
        assert_eq!(reply_for("hello there", &FixedIndex(3)), DEFAULT_REPLIES[3]);
        assert_eq!(reply_for("hello there", &FixedIndex(0)), DEFAULT_REPLIES[0]);
    }

    #[test]
    fn category_reply_ignores_randomness() {
        let a = reply_for("show me trends", &FixedIndex(0));
        let b = reply_for("show me trends", &FixedIndex(4));
        assert_eq!(a, b);
        assert!(a.starts_with("📈 Based on current trends"));
    }

    #[test]
    fn only_default_lacks_a_template() {
        for (category, _) in PRIORITY {
            assert!(category.template().is_some(), "{} has a template", category);
        }
        assert!(ResponseCategory::Default.template().is_none());
    }
}
