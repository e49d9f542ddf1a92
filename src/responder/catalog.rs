//! Canned reply text per response category.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Which canned reply a message resolved to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ResponseCategory {
    Greeting,
    Features,
    Pricing,
    Waitlist,
    Launch,
    Competitors,
    Thanks,
    About,
    /// Nothing matched.
    Default,
}

/// Reply text for every category, with the product name filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCatalog {
    product_name: String,
    greeting: String,
    features: String,
    pricing: String,
    waitlist: String,
    launch: String,
    competitors: String,
    thanks: String,
    about: String,
    default: String,
}

impl ResponseCatalog {
    pub fn for_product(product_name: impl Into<String>) -> Self {
        let name = product_name.into();
        Self {
            greeting: format!(
                "Hello! How can I help you today? I'm {name}, your friendly AI assistant."
            ),
            features: format!(
                "{name} comes with several powerful features:\n\n\
                 1. Natural language processing for human-like conversations\n\
                 2. Advanced knowledge across various domains\n\
                 3. Creative content generation capabilities\n\
                 4. Personalized responses based on conversation history\n\
                 5. Quick and accurate information retrieval\n\n\
                 Which feature would you like to learn more about?"
            ),
            pricing: "We offer several flexible pricing tiers:\n\n\
                 • Free tier: Basic access with limited monthly usage\n\
                 • Pro ($29/month): Increased usage limits and additional features\n\
                 • Team ($79/month): Collaboration tools and admin controls\n\
                 • Enterprise: Custom pricing based on your organization's needs\n\n\
                 Join our waitlist to get notified about early access and special launch discounts!"
                .to_string(),
            waitlist: format!(
                "Great! To join our waitlist, click the 'Join Waitlist' button in the sidebar. \
                 You'll be among the first to experience {name} when it launches, and we'll \
                 send you exclusive updates and offers."
            ),
            launch: "We're planning to launch in Q1 2023. Join our waitlist to get notified \
                 as soon as we're ready!"
                .to_string(),
            competitors: format!(
                "While there are several AI assistants in the market, {name} stands out with \
                 its intuitive design, powerful capabilities, and focus on user privacy. We've \
                 built it from the ground up to be more accessible and effective than alternatives."
            ),
            thanks: format!(
                "You're welcome! Is there anything else you'd like to know about {name}?"
            ),
            about: format!(
                "{name} is a next-generation AI assistant designed to help you with a wide range \
                 of tasks.\n\n\
                 Our mission is to make artificial intelligence accessible, helpful, and safe for \
                 everyone. Whether you need information, creative content, or problem-solving \
                 assistance, {name} is here to help.\n\n\
                 We prioritize:\n\
                 • Accuracy and reliability\n\
                 • User privacy and data security\n\
                 • Continuous learning and improvement\n\
                 • Ethical AI development\n\n\
                 Feel free to ask me anything else about {name}!"
            ),
            default: format!(
                "I'm not sure I understand. Could you clarify what you'd like to know about {name}?"
            ),
            product_name: name,
        }
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn text(&self, category: ResponseCategory) -> &str {
        match category {
            ResponseCategory::Greeting => &self.greeting,
            ResponseCategory::Features => &self.features,
            ResponseCategory::Pricing => &self.pricing,
            ResponseCategory::Waitlist => &self.waitlist,
            ResponseCategory::Launch => &self.launch,
            ResponseCategory::Competitors => &self.competitors,
            ResponseCategory::Thanks => &self.thanks,
            ResponseCategory::About => &self.about,
            ResponseCategory::Default => &self.default,
        }
    }
}

impl Default for ResponseCatalog {
    fn default() -> Self {
        Self::for_product("Jaat-AI")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use strum::IntoEnumIterator;

    #[test]
    fn every_category_has_distinct_text() {
        let catalog = ResponseCatalog::default();
        let texts: HashSet<_> = ResponseCategory::iter().map(|c| catalog.text(c)).collect();
        assert_eq!(texts.len(), ResponseCategory::iter().count());
    }

    #[test]
    fn product_name_is_interpolated() {
        let catalog = ResponseCatalog::for_product("Acme");
        assert!(catalog.text(ResponseCategory::Greeting).contains("I'm Acme"));
        assert!(catalog.text(ResponseCategory::Default).ends_with("about Acme?"));
        assert!(!catalog.text(ResponseCategory::About).contains("Jaat-AI"));
    }

    #[test]
    fn category_names_are_snake_case() {
        assert_eq!(ResponseCategory::Competitors.to_string(), "competitors");
        assert_eq!(
            "waitlist".parse::<ResponseCategory>().unwrap(),
            ResponseCategory::Waitlist
        );
    }
}
