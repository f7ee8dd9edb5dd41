//! Built-in agent catalog

use super::config::{AgentDefinition, ArtifactShape, ModelSettings};
use crate::artifacts::ProductPolicy;
use crate::error::{Error, Result};
use crate::routing::Intent;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Newborn product researcher
pub const NEWBORN_PRODUCTS: &str = "newborn_product_research_agent";
/// Product researcher for the mother
pub const NEWMOM_PRODUCTS: &str = "newmom_product_research_agent";
/// Parental education researcher
pub const PARENTAL_EDUCATION: &str = "parental_education_research_agent";
/// Behavioral support consultant
pub const BEHAVIORAL: &str = "behavioral_support_consultant";

const SEARCH_TOOL: &str = "web_search";

/// A product category and the items researched under it
///
/// The item phrases feed both the agent instruction and the routing
/// vocabulary, so a category the agent covers is also one the router
/// recognises.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProductCategory {
    pub name: &'static str,
    pub items: &'static [&'static str],
}

const fn category(name: &'static str, items: &'static [&'static str]) -> ProductCategory {
    ProductCategory { name, items }
}

pub(crate) const NEWBORN_CATEGORIES: &[ProductCategory] = &[
    category("Activity and gear", &["activity mats", "play gyms", "interactive toys"]),
    category("Baby clothing", &["bodysuits", "onesies", "sleepers"]),
    category("Diapering", &["diapers", "wipes", "diaper cream", "changing pads"]),
    category("Feeding", &["bottles", "nipples", "sterilizers", "bibs"]),
    category("Health and baby care", &["thermometers", "nail clippers", "baby wash"]),
    category(
        "Nursery Bedding and essentials",
        &["crib sheets", "cribs", "bassinets", "blankets"],
    ),
    category("Nursing", &["nursing pillows", "breast pumps", "nursing pads"]),
    category("Strollers and car seats", &["strollers", "car seats", "travel systems"]),
    category("OTC medicines", &["fever reducers", "cough medicine", "cold remedies"]),
];

pub(crate) const NEWMOM_CATEGORIES: &[ProductCategory] = &[
    category(
        "Comfort",
        &["maternity pants", "stretchy tops", "supportive shoes", "pregnancy pillows", "maternity pillows"],
    ),
    category("Support", &["maternity bras", "sleep bras"]),
    category("Health", &["prenatal vitamins", "stretch mark cream", "skincare"]),
    category("Recovery", &["maternity pads", "postpartum underwear", "peri bottles"]),
    category("Soothing", &["witch hazel pads", "cooling pads", "sitz bath kits"]),
    category("Nursing", &["nursing bras", "nursing tanks", "breast pads", "nipple balm"]),
    category(
        "Support (postpartum)",
        &["nursing pillows", "belly bands", "compression garments"],
    ),
    category("Hydration/Nutrition", &["water bottles", "healthy snacks", "freezer meals"]),
];

const EDUCATION_SECTIONS: &[(&str, &str)] = &[
    ("Classes", "childbirth preparation (Lamaze, Hypnobirthing), infant CPR, newborn care"),
    ("Reading", "safe sleep, breastfeeding and formula feeding, development milestones"),
    ("Support Groups", "local and online parenting groups"),
    ("Experts", "choosing an obstetrician or midwife and a pediatrician early"),
    ("Apps", "pregnancy tracking, contraction timing, growth and milestone tracking"),
];

const BEHAVIORAL_SECTIONS: &[(&str, &str)] = &[
    (
        "During Pregnancy",
        "fatigue, nausea and mood swings; body aches and ligament pain; \
         frequent urination, poor sleep and shortness of breath",
    ),
    (
        "After Pregnancy",
        "sleep deprivation, feeding struggles, inconsolable crying, \
         postpartum depression and anxiety, relationship and identity changes",
    ),
];

fn bullet_list(items: &[(&str, &str)]) -> String {
    items
        .iter()
        .map(|(name, hint)| format!("- {name}: {hint}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn category_list(categories: &[ProductCategory]) -> String {
    categories
        .iter()
        .map(|c| format!("- {}: {}", c.name, c.items.join(", ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn labels(items: &[(&str, &str)]) -> Vec<String> {
    items.iter().map(|(name, _)| (*name).to_string()).collect()
}

fn category_labels(categories: &[ProductCategory]) -> Vec<String> {
    categories.iter().map(|c| c.name.to_string()).collect()
}

fn product_instruction(audience: &str, categories: &[ProductCategory], policy: &ProductPolicy) -> String {
    format!(
        "You research products for {audience}.\n\
         \n\
         Find the top {per_category} best-selling, well-reviewed products in each category:\n\
         {categories}\n\
         \n\
         Selection rules:\n\
         - Rating at least {min_rating:.1} out of 5.0\n\
         - Sold by one of: {vendors}\n\
         - Real products with real reviews, good value, commonly recommended\n\
         \n\
         Use the web_search tool to confirm availability and prices.\n\
         \n\
         Return ONLY a JSON array, no other text, where each element is:\n\
         {{\"product_name\": \"...\", \"brand\": \"...\", \"category\": \"<one of the categories above>\", \
         \"rating\": 4.5, \"price\": \"$29.99\", \"vendor\": \"amazon.com\", \
         \"purchase_link\": \"https://...\", \"description\": \"...\"}}",
        per_category = policy.expected_per_category,
        categories = category_list(categories),
        min_rating = policy.min_rating,
        vendors = policy.allowed_vendors.join(", "),
    )
}

fn markdown_instruction(mission: &str, sections: &[(&str, &str)]) -> String {
    format!(
        "{mission}\n\
         \n\
         Cover at least these sections, each as a `##` heading:\n\
         {sections}\n\
         \n\
         Prefer reliable, well-rated sources and use the web_search tool to find them. \
         Under each section give a short summary and a link to every resource. \
         Answer in markdown only.",
        sections = bullet_list(sections),
    )
}

/// The set of specialist agents known to the orchestrator
#[derive(Debug, Clone)]
pub struct AgentCatalog {
    agents: Vec<Arc<AgentDefinition>>,
}

impl AgentCatalog {
    /// Build a catalog; agent names and output keys must be unique
    pub fn new(definitions: Vec<AgentDefinition>) -> Result<Self> {
        let mut names = HashSet::new();
        let mut keys = HashSet::new();
        for def in &definitions {
            if !names.insert(def.name.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate agent name '{}'",
                    def.name
                )));
            }
            if !keys.insert(def.output_key.as_str()) {
                return Err(Error::Configuration(format!(
                    "duplicate output key '{}'",
                    def.output_key
                )));
            }
            def.model
                .retry
                .validate()
                .map_err(|e| Error::Configuration(format!("agent {}: {e}", def.name)))?;
            debug!(agent = %def.name, output_key = %def.output_key, "Catalog entry");
        }

        Ok(Self {
            agents: definitions.into_iter().map(Arc::new).collect(),
        })
    }

    /// The four built-in MaBaba specialists
    pub fn builtin(model: &ModelSettings, policy: &ProductPolicy) -> Result<Self> {
        let newborn = AgentDefinition::new(
            NEWBORN_PRODUCTS,
            "newborn_products",
            Intent::NewbornProducts,
            ArtifactShape::products(category_labels(NEWBORN_CATEGORIES)),
        )
        .with_title("Newborn Shopping List")
        .with_description("Finds top-rated newborn products from trusted retailers")
        .with_instruction(product_instruction(
            "a newborn baby",
            NEWBORN_CATEGORIES,
            policy,
        ));

        let newmom = AgentDefinition::new(
            NEWMOM_PRODUCTS,
            "newmom_products",
            Intent::MotherProducts,
            ArtifactShape::products(category_labels(NEWMOM_CATEGORIES)),
        )
        .with_title("Shopping List for Mom")
        .with_description("Finds products for the mother during and after pregnancy")
        .with_instruction(product_instruction(
            "an expecting or new mother, during pregnancy and the fourth trimester",
            NEWMOM_CATEGORIES,
            policy,
        ));

        let education = AgentDefinition::new(
            PARENTAL_EDUCATION,
            "parental_education",
            Intent::ParentalEducation,
            ArtifactShape::markdown(labels(EDUCATION_SECTIONS)),
        )
        .with_title("Parental Education Resources")
        .with_description("Finds classes, reading, groups, experts and apps for new parents")
        .with_instruction(markdown_instruction(
            "You find practical, reliable educational resources for expecting parents.",
            EDUCATION_SECTIONS,
        ));

        let behavioral = AgentDefinition::new(
            BEHAVIORAL,
            "behavioral_support_strategy",
            Intent::BehavioralSupport,
            ArtifactShape::markdown(labels(BEHAVIORAL_SECTIONS)),
        )
        .with_title("Coping Strategies")
        .with_description("Coping strategies for everyday challenges during pregnancy and the first year")
        .with_instruction(markdown_instruction(
            "You help parents cope with the everyday challenges of pregnancy and the \
             baby's first year, with practical strategies and where to get help.",
            BEHAVIORAL_SECTIONS,
        ));

        Self::new(
            [newborn, newmom, education, behavioral]
                .into_iter()
                .map(|def| def.with_tool(SEARCH_TOOL).with_model(model.clone()))
                .collect(),
        )
    }

    /// Look up an agent by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<AgentDefinition>> {
        self.agents.iter().find(|a| a.name == name).cloned()
    }

    /// Agents selected by `intent`, in catalog order
    pub fn for_intent(&self, intent: Intent) -> impl Iterator<Item = &Arc<AgentDefinition>> {
        self.agents.iter().filter(move |a| a.intent == intent)
    }

    /// All agents in catalog order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<AgentDefinition>> {
        self.agents.iter()
    }

    /// Number of agents
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
