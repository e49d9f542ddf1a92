//! Keyword-based reply selection.
//!
//! Replies come from a fixed, ordered rule table. Each rule lists keywords
//! for one [`ResponseCategory`]; the first rule with a keyword in the
//! message wins and unmatched messages get [`ResponseCategory::Default`].
//! Rule order is part of the contract: "hello, thanks" is a greeting because
//! the greeting rule is checked before the thanks rule.

pub mod catalog;

pub use catalog::{ResponseCatalog, ResponseCategory};

use regex::RegexSet;

use crate::error::ChatError;

/// One row of the rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordRule {
    pub category: ResponseCategory,
    pub keywords: &'static [&'static str],
}

/// Canonical rule order, checked top to bottom.
pub const DEFAULT_RULES: &[KeywordRule] = &[
    KeywordRule {
        category: ResponseCategory::Greeting,
        keywords: &["hello", "hi", "hey"],
    },
    KeywordRule {
        category: ResponseCategory::Features,
        keywords: &["feature", "what can", "capabilities", "do"],
    },
    KeywordRule {
        category: ResponseCategory::Pricing,
        keywords: &["price", "cost", "pricing", "subscription"],
    },
    KeywordRule {
        category: ResponseCategory::Waitlist,
        keywords: &["waitlist", "sign up", "join", "register"],
    },
    KeywordRule {
        category: ResponseCategory::Launch,
        keywords: &["launch", "release", "when", "available"],
    },
    KeywordRule {
        category: ResponseCategory::Competitors,
        keywords: &["competitor", "alternative", "similar", "chatgpt"],
    },
    KeywordRule {
        category: ResponseCategory::Thanks,
        keywords: &["thank"],
    },
    KeywordRule {
        category: ResponseCategory::About,
        keywords: &["about", "who", "what is", "purpose"],
    },
];

/// Stateless classifier from message text to a canned reply.
///
/// Input is lowercased, and a keyword matches only where a word starts, so
/// "do" matches "do you" and "doing" but not "random".
///
/// # Example
/// ```
/// use jaat_chat::responder::{ResponseCategory, ResponseSelector};
///
/// let selector = ResponseSelector::new()?;
/// assert_eq!(selector.select_category("Hello!"), ResponseCategory::Greeting);
/// assert_eq!(selector.select_category("hello, thanks"), ResponseCategory::Greeting);
/// # Ok::<(), jaat_chat::error::ChatError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    patterns: RegexSet,
    categories: Vec<ResponseCategory>,
    catalog: ResponseCatalog,
}

impl ResponseSelector {
    /// Selector over [`DEFAULT_RULES`] and the default catalog.
    pub fn new() -> Result<Self, ChatError> {
        Self::with_rules(DEFAULT_RULES, ResponseCatalog::default())
    }

    pub fn with_catalog(catalog: ResponseCatalog) -> Result<Self, ChatError> {
        Self::with_rules(DEFAULT_RULES, catalog)
    }

    /// Build a selector from a custom rule table, checked in slice order.
    pub fn with_rules(rules: &[KeywordRule], catalog: ResponseCatalog) -> Result<Self, ChatError> {
        let mut patterns = Vec::with_capacity(rules.len());
        for rule in rules {
            if rule.keywords.is_empty() {
                return Err(ChatError::InvalidArgument(format!(
                    "rule for '{}' has no keywords",
                    rule.category
                )));
            }
            let alternatives = rule
                .keywords
                .iter()
                .map(|keyword| regex::escape(&keyword.to_lowercase()))
                .collect::<Vec<_>>()
                .join("|");
            patterns.push(format!(r"\b(?:{alternatives})"));
        }

        let patterns = RegexSet::new(&patterns)
            .map_err(|err| ChatError::Configuration(format!("invalid keyword rules: {err}")))?;

        Ok(Self {
            patterns,
            categories: rules.iter().map(|rule| rule.category).collect(),
            catalog,
        })
    }

    /// Category of the first rule matching `text`.
    pub fn select_category(&self, text: &str) -> ResponseCategory {
        let lowered = text.to_lowercase();
        self.patterns
            .matches(&lowered)
            .iter()
            .next()
            .and_then(|index| self.categories.get(index).copied())
            .unwrap_or(ResponseCategory::Default)
    }

    /// Reply text for `text`.
    pub fn select_response(&self, text: &str) -> &str {
        self.catalog.text(self.select_category(text))
    }

    pub fn catalog(&self) -> &ResponseCatalog {
        &self.catalog
    }
}
