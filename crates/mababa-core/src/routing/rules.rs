//! Keyword rules for deterministic intent routing
//!
//! Item names select a shopping intent on their own. The item vocabulary is
//! built from the agent catalog's product categories plus a few extra
//! spellings. Generic purchase words ("buy", "products") select one with or
//! without a subject, defaulting to the newborn list when no mother subject
//! is named. Request wording ("recommend", "need") only counts as buying
//! when a baby or mother subject is named and nothing else was asked.

use super::Intent;
use crate::agents::{NEWBORN_CATEGORIES, NEWMOM_CATEGORIES};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Case-insensitive whole-word alternation over `words`
fn word_set(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b(?:{})\b", words.join("|")))
        .expect("routing rules are compile-time constants")
}

static IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"what(?:'s| is) your name",
        r"who are you",
        r"your name",
        r"introduce yourself",
        r"who am i (?:talking|speaking) to",
    ])
});

/// Who a matched item is bought for
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Audience {
    Newborn,
    Mother,
    /// Listed for both, e.g. nursing pillows
    Either,
}

impl Audience {
    fn merge(self, other: Audience) -> Audience {
        if self == other {
            self
        } else {
            Audience::Either
        }
    }
}

/// Spellings the catalog phrases miss
const NEWBORN_EXTRAS: &[&str] = &[
    r"car ?seats?",
    r"play ?mats?",
    r"swaddles?",
    r"pacifiers?",
    r"baby cloth(?:es|ing)",
    r"baby monitors?",
    r"high ?chairs?",
    r"baby bottles?",
    r"bottle sterilizers?",
    r"baby carriers?",
    r"baby gear",
    r"infant tylenol",
    r"gripe water",
    r"cough syrup",
];

const MOTHER_EXTRAS: &[&str] = &[
    r"maternity (?:clothes|clothing|tops?|leggings|dress(?:es)?)",
    r"nursing tops?",
    r"postpartum (?:pads?|kit|essentials)",
    r"mesh (?:panties|underwear)",
    r"sitz bath",
    r"witch hazel",
    r"nipple cream",
    r"stretch mark (?:oil|lotion)",
    r"compression leggings",
];

/// Whole-word pattern for a catalog phrase, tolerating the singular
fn phrase_pattern(phrase: &str) -> String {
    let lower = phrase.to_lowercase();
    let stem = lower.strip_suffix('s').unwrap_or(&lower);
    format!(r"{}(?:s|es)?", regex::escape(stem).replace(' ', r"\s+"))
}

/// Item names from the agent catalog plus extra spellings
struct ItemVocabulary {
    pattern: Regex,
    audiences: Vec<Audience>,
}

impl ItemVocabulary {
    fn build() -> Self {
        let mut entries: Vec<(String, Audience)> = Vec::new();
        let mut add = |pattern: String, audience: Audience| {
            match entries.iter_mut().find(|(p, _)| *p == pattern) {
                Some((_, existing)) => *existing = existing.merge(audience),
                None => entries.push((pattern, audience)),
            }
        };

        for (categories, audience) in [
            (NEWBORN_CATEGORIES, Audience::Newborn),
            (NEWMOM_CATEGORIES, Audience::Mother),
        ] {
            for item in categories.iter().flat_map(|c| c.items) {
                add(phrase_pattern(item), audience);
            }
        }
        for extra in NEWBORN_EXTRAS {
            add((*extra).to_string(), Audience::Newborn);
        }
        for extra in MOTHER_EXTRAS {
            add((*extra).to_string(), Audience::Mother);
        }

        // Longest first, so "nipple balm" wins over "nipples" at the same position
        entries.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        let alternation = entries
            .iter()
            .map(|(p, _)| format!("({p})"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
            .expect("item vocabulary is built from constants");

        Self {
            pattern,
            audiences: entries.into_iter().map(|(_, a)| a).collect(),
        }
    }

    /// Audiences of every item named in `request`
    fn audiences_in(&self, request: &str) -> BTreeSet<Audience> {
        self.pattern
            .captures_iter(request)
            .filter_map(|caps| {
                (1..caps.len())
                    .find(|&i| caps.get(i).is_some())
                    .map(|i| self.audiences[i - 1])
            })
            .collect()
    }
}

static ITEMS: LazyLock<ItemVocabulary> = LazyLock::new(ItemVocabulary::build);

static PURCHASE: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"buy(?:ing)?",
        r"purchas(?:e|ing)",
        r"shop(?:ping)?",
        r"products?",
        r"items",
        r"essentials",
        r"registry",
        r"gear",
        r"where to get",
        r"what to get",
    ])
});

/// Ordinary request wording; a buying signal only next to a subject
static REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"recommend(?:ation)?s?",
        r"suggest(?:ion)?s?",
        r"need",
        r"get",
        r"best",
        r"good",
        r"looking for",
        r"find",
    ])
});

static BABY_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[r"bab(?:y|ies|y's)", r"newborns?", r"infants?", r"little one"])
});

static MOTHER_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"moms?",
        r"mommy",
        r"mothers?",
        r"mama",
        r"myself",
        r"for me",
        r"my wife",
        r"my partner",
        r"pregnant",
        r"pregnancy",
        r"postpartum",
        r"maternity",
        r"fourth trimester",
    ])
});

static BEHAVIORAL: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"sleepless",
        r"sleep depriv(?:ation|ed)",
        r"can'?t sleep",
        r"cannot sleep",
        r"not sleeping",
        r"trouble sleeping",
        r"exhaust(?:ed|ion)",
        r"fatigue",
        r"morning sickness",
        r"nausea",
        r"mood swings?",
        r"cop(?:e|ing)",
        r"deal(?:ing)? with",
        r"stress(?:ed|ful)?",
        r"anxi(?:ous|ety)",
        r"depress(?:ion|ed)",
        r"baby blues",
        r"overwhelmed",
        r"struggl(?:e|es|ing)",
        r"burn(?:ed|t)? ?out",
        r"crying",
        r"colic",
        r"reflux",
        r"latch(?:ing)?",
        r"mental health",
        r"body aches?",
        r"ligament pain",
        r"shortness of breath",
        r"relationship",
        r"loss of identity",
        r"behaviou?r(?:al)?",
        r"strateg(?:y|ies)",
        r"emotional",
    ])
});

static EDUCATION: LazyLock<Regex> = LazyLock::new(|| {
    word_set(&[
        r"class(?:es)?",
        r"courses?",
        r"lamaze",
        r"hypnobirthing",
        r"cpr",
        r"books?",
        r"reading",
        r"read about",
        r"articles?",
        r"learn(?:ing)?",
        r"educat(?:e|ion|ional)",
        r"resources?",
        r"support groups?",
        r"parenting groups?",
        r"apps?",
        r"pediatricians?",
        r"midwi(?:fe|ves)",
        r"obstetricians?",
        r"ob-?gyn",
        r"doulas?",
        r"websites?",
        r"milestones?",
        r"childbirth preparation",
    ])
});

/// Intents expressed by `request`
pub(crate) fn match_intents(request: &str) -> BTreeSet<Intent> {
    let mut intents = BTreeSet::new();

    if IDENTITY.is_match(request) {
        intents.insert(Intent::Identity);
    }

    let behavioral = BEHAVIORAL.is_match(request);
    let education = EDUCATION.is_match(request);
    let baby_subject = BABY_SUBJECT.is_match(request);
    let mother_subject = MOTHER_SUBJECT.is_match(request);
    let purchase = PURCHASE.is_match(request)
        || (REQUEST.is_match(request)
            && (baby_subject || mother_subject)
            && !behavioral
            && !education);

    let items = ITEMS.audiences_in(request);
    let mut newborn_item = items.contains(&Audience::Newborn);
    let mut mother_item = items.contains(&Audience::Mother);
    if items.contains(&Audience::Either) {
        if mother_subject {
            mother_item = true;
        }
        if baby_subject || !mother_subject {
            newborn_item = true;
        }
    }

    if newborn_item || (purchase && (baby_subject || !(mother_subject || mother_item))) {
        intents.insert(Intent::NewbornProducts);
    }
    // A mother subject next to a baby item is context, not a second shopping list
    if mother_item || (purchase && mother_subject && !newborn_item) {
        intents.insert(Intent::MotherProducts);
    }
    if behavioral {
        intents.insert(Intent::BehavioralSupport);
    }
    if education {
        intents.insert(Intent::ParentalEducation);
    }

    intents
}
