//! Attribute parsing for item damage, resistance and bonus text.
//!
//! Scanning turns free text into [`Mention`]s (a raw token plus a number);
//! accumulation resolves tokens through [`AttributeKey::from_token`] and adds
//! the values into an [`ItemV2`]. The two halves are independent so each can
//! be exercised on its own.

use crate::models::{Element, ItemV2, OldItemRecord, Skill, Stat};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref DAMAGE_RE: Regex = Regex::new(r"([0-9]+)\s*([a-zA-Z]*)").unwrap();
    static ref RESISTANCE_RE: Regex = Regex::new(r"([a-zA-Z]+)\s*([+\-][0-9]+)%").unwrap();
    static ref BONUS_RE: Regex = Regex::new(r"([a-zA-Z\s]+)\s*\+([0-9]+)").unwrap();
}

/// A token/value pair found in free text, e.g. `("fire", 5)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub token: String,
    pub value: i64,
}

impl Mention {
    fn new(token: &str, value: i64) -> Self {
        Self {
            token: token.to_string(),
            value,
        }
    }
}

/// Target of a wiki attribute name in the V2 schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKey {
    Element(Element),
    Skill(Skill),
    Stat(Stat),
    HealingIncrease,
    LifeDrain,
    ManaDrain,
}

impl AttributeKey {
    /// Resolve a wiki attribute name (English, or the Portuguese `velocidade`).
    ///
    /// Matching is case-insensitive; unknown names yield `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        let key = match token.to_lowercase().as_str() {
            "physical" => Self::Element(Element::Physical),
            "fire" => Self::Element(Element::Fire),
            "earth" => Self::Element(Element::Earth),
            "energy" => Self::Element(Element::Energy),
            "ice" => Self::Element(Element::Ice),
            "holy" => Self::Element(Element::Holy),
            "death" => Self::Element(Element::Death),
            "healing" => Self::HealingIncrease,
            "sword fighting" => Self::Skill(Skill::SwordFighting),
            "axe fighting" => Self::Skill(Skill::AxeFighting),
            "club fighting" => Self::Skill(Skill::ClubFighting),
            "distance fighting" => Self::Skill(Skill::DistanceFighting),
            "fist fighting" => Self::Skill(Skill::FistFighting),
            "shielding" => Self::Skill(Skill::Shielding),
            "magic level" => Self::Stat(Stat::MagicLevel),
            "speed" | "velocidade" => Self::Stat(Stat::Speed),
            "life drain" => Self::LifeDrain,
            "mana drain" => Self::ManaDrain,
            _ => return None,
        };
        Some(key)
    }

    fn element(self) -> Option<Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Every `<digits>[<letters>]` occurrence, e.g. `"10 physical, 5 fire"`.
///
/// Bare numbers produce an empty token.
pub fn scan_damage(text: &str) -> Vec<Mention> {
    DAMAGE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let value = caps[1].parse().ok()?;
            Some(Mention::new(&caps[2], value))
        })
        .collect()
}

/// Every `<letters><sign><digits>%` occurrence, e.g. `"fire +15%, energy -5%"`.
pub fn scan_resistances(text: &str) -> Vec<Mention> {
    RESISTANCE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let value = caps[2].parse().ok()?;
            Some(Mention::new(&caps[1], value))
        })
        .collect()
}

/// One `<label> +<digits>` per comma-separated clause, label trimmed and lower-cased.
pub fn scan_bonuses(text: &str) -> Vec<Mention> {
    text.split(',')
        .filter_map(|clause| {
            let caps = BONUS_RE.captures(clause)?;
            let value = caps[2].parse().ok()?;
            Some(Mention::new(&caps[1].trim().to_lowercase(), value))
        })
        .collect()
}

fn add(slot: &mut i64, value: i64) {
    *slot = slot.saturating_add(value);
}

/// Add damage mentions to `item`; untagged and `physical` values go to `fisico`.
pub fn apply_damage(item: &mut ItemV2, mentions: &[Mention]) {
    let dano = &mut item.atributos.dano;
    for mention in mentions {
        let element = if mention.token.is_empty() {
            Some(Element::Physical)
        } else {
            AttributeKey::from_token(&mention.token).and_then(AttributeKey::element)
        };
        if let Some(element) = element {
            add(dano.get_mut(element), mention.value);
        }
    }
}

/// Add resistance mentions to the `percent` of each element.
pub fn apply_resistances(item: &mut ItemV2, mentions: &[Mention]) {
    let resistencias = &mut item.atributos.resistencias;
    for mention in mentions {
        if let Some(element) = AttributeKey::from_token(&mention.token).and_then(AttributeKey::element) {
            add(&mut resistencias.get_mut(element).percent, mention.value);
        }
    }
}

/// Add bonus mentions to skills or stats. Other bonus kinds are dropped.
pub fn apply_bonuses(item: &mut ItemV2, mentions: &[Mention]) {
    let bonus = &mut item.atributos.bonus;
    for mention in mentions {
        match AttributeKey::from_token(&mention.token) {
            Some(AttributeKey::Skill(skill)) => add(bonus.skills.get_mut(skill), mention.value),
            Some(AttributeKey::Stat(stat)) => add(bonus.stats.get_mut(stat), mention.value),
            _ => {}
        }
    }
}

/// Parse the attack, elemental damage, protection and bonus texts of `record`
/// into `item`, adding to whatever values it already holds.
pub fn parse_attributes<'a>(record: &OldItemRecord, item: &'a mut ItemV2) -> &'a mut ItemV2 {
    for text in [&record.atq, &record.dano_elemental].into_iter().flatten() {
        apply_damage(item, &scan_damage(text));
    }

    if let Some(text) = &record.protecao {
        apply_resistances(item, &scan_resistances(text));
    }

    if let Some(text) = &record.bonus {
        apply_bonuses(item, &scan_bonuses(text));
    }

    item
}
