//! Product records and the shopping-list business rules

use super::strip_code_fence;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// One recommended product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product name
    pub product_name: String,
    /// Brand
    #[serde(default)]
    pub brand: String,
    /// Category label
    pub category: String,
    /// Customer rating, 0.0 to 5.0
    pub rating: f64,
    /// Price as quoted by the vendor
    #[serde(default)]
    pub price: String,
    /// Selling vendor
    #[serde(default)]
    pub vendor: String,
    /// Absolute http(s) link to the product page
    #[serde(default)]
    pub purchase_link: String,
    /// Short description
    #[serde(default)]
    pub description: String,
}

/// Why a record failed [`ProductPolicy`]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyViolation {
    /// Empty product name
    #[error("product name is empty")]
    MissingName,

    /// Rating outside 0..=5
    #[error("rating {0} is outside 0.0-5.0")]
    RatingOutOfRange(f64),

    /// Rating below the minimum
    #[error("rating {rating} is below {min}")]
    RatingTooLow {
        /// Record rating
        rating: f64,
        /// Required minimum
        min: f64,
    },

    /// Vendor not on the allow-list
    #[error("vendor '{0}' is not an allowed retailer")]
    VendorNotAllowed(String),

    /// Link missing, relative or not http(s)
    #[error("purchase link '{0}' is not an absolute http(s) URL")]
    InvalidLink(String),
}

/// Business rules for product recommendations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductPolicy {
    /// Lowest acceptable rating
    pub min_rating: f64,
    /// Retailers records may come from
    pub allowed_vendors: Vec<String>,
    /// Records expected in each category
    pub expected_per_category: usize,
}

impl Default for ProductPolicy {
    fn default() -> Self {
        Self {
            min_rating: 4.0,
            allowed_vendors: ["Amazon", "Walmart", "Target", "Carter's", "Buy Buy Baby"]
                .into_iter()
                .map(String::from)
                .collect(),
            expected_per_category: 5,
        }
    }
}

/// Reduce a vendor name or domain to a comparable token
///
/// `"https://www.Amazon.com/dp/1"`, `"amazon.com"` and `"Amazon"` all become
/// `"amazon"`; `"Carter's"` becomes `"carters"`.
pub(crate) fn normalize_vendor(vendor: &str) -> String {
    let lower = vendor.trim().to_lowercase();
    let host = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let host = host.split('/').next().unwrap_or(host);
    let host = host.strip_prefix("www.").unwrap_or(host);
    let host = host.strip_suffix(".com").unwrap_or(host);
    host.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

impl ProductPolicy {
    /// Check one record
    pub fn check(&self, record: &ProductRecord) -> std::result::Result<(), PolicyViolation> {
        if record.product_name.trim().is_empty() {
            return Err(PolicyViolation::MissingName);
        }
        if !(0.0..=5.0).contains(&record.rating) {
            return Err(PolicyViolation::RatingOutOfRange(record.rating));
        }
        if record.rating < self.min_rating {
            return Err(PolicyViolation::RatingTooLow {
                rating: record.rating,
                min: self.min_rating,
            });
        }
        if !self.vendor_allowed(&record.vendor) {
            return Err(PolicyViolation::VendorNotAllowed(record.vendor.clone()));
        }
        match url::Url::parse(record.purchase_link.trim()) {
            Ok(link) if matches!(link.scheme(), "http" | "https") && link.has_host() => Ok(()),
            _ => Err(PolicyViolation::InvalidLink(record.purchase_link.clone())),
        }
    }

    /// Whether `vendor` is on the allow-list
    #[must_use]
    pub fn vendor_allowed(&self, vendor: &str) -> bool {
        let wanted = normalize_vendor(vendor);
        !wanted.is_empty()
            && self
                .allowed_vendors
                .iter()
                .any(|allowed| normalize_vendor(allowed) == wanted)
    }

    /// Validate the policy itself
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=5.0).contains(&self.min_rating) {
            return Err(Error::Configuration(format!(
                "orchestrator.products.min_rating must be within 0.0-5.0, got {}",
                self.min_rating
            )));
        }
        if self.allowed_vendors.is_empty() {
            return Err(Error::Configuration(
                "orchestrator.products.allowed_vendors must not be empty".to_string(),
            ));
        }
        if self.expected_per_category == 0 {
            return Err(Error::Configuration(
                "orchestrator.products.expected_per_category must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Product records for one shopping list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCollection {
    /// Category display order
    pub categories: Vec<String>,
    /// Records as returned by the agent
    pub records: Vec<ProductRecord>,
}

impl ProductCollection {
    /// Parse agent output: a JSON array of records, optionally fenced
    pub fn parse(output_key: &str, text: &str, categories: &[String]) -> Result<Self> {
        let records: Vec<ProductRecord> = serde_json::from_str(strip_code_fence(text))
            .map_err(|e| Error::schema(output_key, format!("expected a JSON array of products: {e}")))?;
        if records.is_empty() {
            return Err(Error::schema(output_key, "no products returned"));
        }
        debug!(output_key, count = records.len(), "Parsed product records");
        Ok(Self {
            categories: categories.to_vec(),
            records,
        })
    }

    /// Every record that breaks `policy`, by index
    pub fn violations(&self, policy: &ProductPolicy) -> Vec<(usize, PolicyViolation)> {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(i, record)| policy.check(record).err().map(|v| (i, v)))
            .collect()
    }

    /// Drop records that break `policy`; returns how many were dropped
    pub fn retain_valid(&mut self, policy: &ProductPolicy) -> usize {
        let before = self.records.len();
        self.records.retain(|record| match policy.check(record) {
            Ok(()) => true,
            Err(violation) => {
                debug!(product = %record.product_name, %violation, "Dropping product");
                false
            }
        });
        before - self.records.len()
    }

    /// Records grouped by category
    ///
    /// Known categories come first in display order, then any category the
    /// agent invented, in order of first appearance. Empty groups are omitted.
    pub fn by_category(&self) -> Vec<(&str, Vec<&ProductRecord>)> {
        let mut groups: Vec<(&str, Vec<&ProductRecord>)> = self
            .categories
            .iter()
            .map(|c| (c.as_str(), Vec::new()))
            .collect();

        for record in &self.records {
            let category = record.category.trim();
            match groups
                .iter_mut()
                .find(|(name, _)| name.eq_ignore_ascii_case(category))
            {
                Some((_, members)) => members.push(record),
                None => groups.push((category, vec![record])),
            }
        }

        groups.retain(|(_, members)| !members.is_empty());
        groups
    }

    /// Log categories holding fewer records than `policy` expects
    pub fn warn_shortfall(&self, output_key: &str, policy: &ProductPolicy) {
        let groups = self.by_category();
        for category in &self.categories {
            let count = groups
                .iter()
                .find(|(name, _)| *name == category.as_str())
                .map_or(0, |(_, members)| members.len());
            if count < policy.expected_per_category {
                warn!(
                    output_key,
                    category = %category,
                    count,
                    expected = policy.expected_per_category,
                    "Category is short of products"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, category: &str, rating: f64, vendor: &str) -> ProductRecord {
        ProductRecord {
            product_name: name.to_string(),
            brand: "Acme".to_string(),
            category: category.to_string(),
            rating,
            price: "$10.00".to_string(),
            vendor: vendor.to_string(),
            purchase_link: "https://www.amazon.com/dp/B000".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = ProductPolicy::default();
        assert_eq!(policy.min_rating, 4.0);
        assert_eq!(policy.expected_per_category, 5);
        assert_eq!(policy.allowed_vendors.len(), 5);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_normalize_vendor() {
        assert_eq!(normalize_vendor("https://www.Amazon.com/dp/1"), "amazon");
        assert_eq!(normalize_vendor("amazon.com"), "amazon");
        assert_eq!(normalize_vendor("Carter's"), "carters");
        assert_eq!(normalize_vendor("buybuybaby.com"), "buybuybaby");
        assert_eq!(normalize_vendor("Buy Buy Baby"), "buybuybaby");
    }

    #[test]
    fn test_vendor_allow_list() {
        let policy = ProductPolicy::default();
        for vendor in ["Amazon", "walmart.com", "TARGET", "carters.com", "Buy Buy Baby"] {
            assert!(policy.vendor_allowed(vendor), "{vendor}");
        }
        for vendor in ["eBay", "Etsy", "", "amazon.co.uk"] {
            assert!(!policy.vendor_allowed(vendor), "{vendor}");
        }
    }

    #[test]
    fn test_rating_below_minimum_rejected() {
        let policy = ProductPolicy::default();
        assert_eq!(
            policy.check(&record("Stroller", "Strollers and car seats", 3.9, "Amazon")),
            Err(PolicyViolation::RatingTooLow {
                rating: 3.9,
                min: 4.0
            })
        );
        assert!(policy
            .check(&record("Stroller", "Strollers and car seats", 4.0, "Amazon"))
            .is_ok());
        assert_eq!(
            policy.check(&record("Stroller", "x", 7.0, "Amazon")),
            Err(PolicyViolation::RatingOutOfRange(7.0))
        );
    }

    #[test]
    fn test_foreign_vendor_rejected() {
        let policy = ProductPolicy::default();
        assert_eq!(
            policy.check(&record("Crib", "Nursery", 4.8, "eBay")),
            Err(PolicyViolation::VendorNotAllowed("eBay".to_string()))
        );
    }

    #[test]
    fn test_link_must_be_absolute_http() {
        let policy = ProductPolicy::default();
        for link in ["/dp/B000", "ftp://amazon.com/x", "", "amazon.com/dp/1"] {
            let mut r = record("Crib", "Nursery", 4.8, "Amazon");
            r.purchase_link = link.to_string();
            assert!(
                matches!(policy.check(&r), Err(PolicyViolation::InvalidLink(_))),
                "{link}"
            );
        }
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = r#"```json
[{"product_name": "UPPAbaby Vista", "brand": "UPPAbaby", "category": "Strollers and car seats",
  "rating": 4.8, "price": "$999.99", "vendor": "Target",
  "purchase_link": "https://www.target.com/p/vista"}]
```"#;
        let collection =
            ProductCollection::parse("newborn_products", text, &["Strollers and car seats".into()])
                .unwrap();
        assert_eq!(collection.records.len(), 1);
        assert_eq!(collection.records[0].brand, "UPPAbaby");
        assert!(collection.records[0].description.is_empty());
    }

    #[test]
    fn test_parse_rejects_prose_and_empty() {
        let err = ProductCollection::parse("newborn_products", "Here are some strollers!", &[])
            .unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SchemaViolation);

        let err = ProductCollection::parse("newborn_products", "[]", &[]).unwrap_err();
        assert!(err.to_string().contains("no products"));
    }

    #[test]
    fn test_violations_and_retain_valid() {
        let mut collection = ProductCollection {
            categories: vec!["Feeding".into()],
            records: vec![
                record("Bottle", "Feeding", 4.6, "Amazon"),
                record("Cheap bottle", "Feeding", 3.1, "Amazon"),
                record("Import bottle", "Feeding", 4.9, "AliExpress"),
            ],
        };
        let policy = ProductPolicy::default();

        let violations = collection.violations(&policy);
        assert_eq!(
            violations.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
            vec![1, 2]
        );

        assert_eq!(collection.retain_valid(&policy), 2);
        assert_eq!(collection.records.len(), 1);
        assert_eq!(collection.records[0].product_name, "Bottle");
    }

    #[test]
    fn test_by_category_orders_known_then_unknown() {
        let collection = ProductCollection {
            categories: vec!["Feeding".into(), "Diapering".into(), "Nursing".into()],
            records: vec![
                record("Gadget", "Gadgets", 4.5, "Amazon"),
                record("Wipes", "Diapering", 4.5, "Amazon"),
                record("Bottle", "feeding", 4.5, "Amazon"),
                record("Diapers", "Diapering", 4.5, "Amazon"),
            ],
        };

        let groups = collection.by_category();
        let summary: Vec<(&str, usize)> = groups.iter().map(|(c, r)| (*c, r.len())).collect();
        assert_eq!(summary, vec![("Feeding", 1), ("Diapering", 2), ("Gadgets", 1)]);
    }
}
