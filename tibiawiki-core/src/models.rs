//! Data models for TibiaWiki item and task data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Flat row scraped from a wiki table: column label -> text (or null).
pub type RawRow = serde_json::Map<String, Value>;

/// Vocation sentinel meaning "usable by every vocation".
pub const ALL_VOCATIONS: &str = "Todas";

/// Item row in the old, flat schema (one per table row of an item page).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OldItemRecord {
    #[serde(rename = "Nome", default, deserialize_with = "lenient_text")]
    pub nome: Option<String>,
    #[serde(rename = "Imagem_URL", default, deserialize_with = "lenient_text")]
    pub imagem_url: Option<String>,
    #[serde(rename = "Lvl", default, deserialize_with = "lenient_text")]
    pub lvl: Option<String>,
    #[serde(rename = "Peso", default, deserialize_with = "lenient_text")]
    pub peso: Option<String>,
    #[serde(rename = "Arm", default, deserialize_with = "lenient_text")]
    pub arm: Option<String>,
    #[serde(rename = "Def", default, deserialize_with = "lenient_text")]
    pub def: Option<String>,
    #[serde(rename = "Slots", default, deserialize_with = "lenient_text")]
    pub slots: Option<String>,
    #[serde(rename = "Voc", default, deserialize_with = "lenient_text")]
    pub voc: Option<String>,
    #[serde(rename = "Atq", default, deserialize_with = "lenient_text")]
    pub atq: Option<String>,
    #[serde(rename = "Bônus", default, deserialize_with = "lenient_text")]
    pub bonus: Option<String>,
    #[serde(rename = "Proteção", default, deserialize_with = "lenient_text")]
    pub protecao: Option<String>,
    #[serde(rename = "Dano_Elemental", default, deserialize_with = "lenient_text")]
    pub dano_elemental: Option<String>,
}

/// Accept any JSON scalar as text; null becomes `None`.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

/// The seven damage/resistance categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    Physical,
    Earth,
    Fire,
    Ice,
    Energy,
    Holy,
    Death,
}

/// Fighting skills an item can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Skill {
    AxeFighting,
    ClubFighting,
    SwordFighting,
    DistanceFighting,
    FistFighting,
    Shielding,
}

/// Character stats an item can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    MagicLevel,
    Speed,
}

/// Per-element integer values, used for damage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementValues {
    pub fisico: i64,
    pub terra: i64,
    pub fogo: i64,
    pub gelo: i64,
    pub energia: i64,
    pub sagrado: i64,
    pub morte: i64,
}

impl ElementValues {
    pub fn get_mut(&mut self, element: Element) -> &mut i64 {
        match element {
            Element::Physical => &mut self.fisico,
            Element::Earth => &mut self.terra,
            Element::Fire => &mut self.fogo,
            Element::Ice => &mut self.gelo,
            Element::Energy => &mut self.energia,
            Element::Holy => &mut self.sagrado,
            Element::Death => &mut self.morte,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistance {
    pub flat: i64,
    pub percent: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resistances {
    pub fisico: Resistance,
    pub terra: Resistance,
    pub fogo: Resistance,
    pub gelo: Resistance,
    pub energia: Resistance,
    pub sagrado: Resistance,
    pub morte: Resistance,
}

impl Resistances {
    pub fn get_mut(&mut self, element: Element) -> &mut Resistance {
        match element {
            Element::Physical => &mut self.fisico,
            Element::Earth => &mut self.terra,
            Element::Fire => &mut self.fogo,
            Element::Ice => &mut self.gelo,
            Element::Energy => &mut self.energia,
            Element::Holy => &mut self.sagrado,
            Element::Death => &mut self.morte,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillBonuses {
    pub axe_fighting: i64,
    pub club_fighting: i64,
    pub sword_fighting: i64,
    pub distance_fighting: i64,
    pub fist_fighting: i64,
    pub shielding: i64,
}

impl SkillBonuses {
    pub fn get_mut(&mut self, skill: Skill) -> &mut i64 {
        match skill {
            Skill::AxeFighting => &mut self.axe_fighting,
            Skill::ClubFighting => &mut self.club_fighting,
            Skill::SwordFighting => &mut self.sword_fighting,
            Skill::DistanceFighting => &mut self.distance_fighting,
            Skill::FistFighting => &mut self.fist_fighting,
            Skill::Shielding => &mut self.shielding,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBonuses {
    pub magic_level: i64,
    pub velocidade: i64,
}

impl StatBonuses {
    pub fn get_mut(&mut self, stat: Stat) -> &mut i64 {
        match stat {
            Stat::MagicLevel => &mut self.magic_level,
            Stat::Speed => &mut self.velocidade,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialEffects {
    pub life_drain: i64,
    pub mana_drain: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bonus {
    pub aumento_cura: i64,
    pub skills: SkillBonuses,
    pub stats: StatBonuses,
    pub efeitos_especiais: SpecialEffects,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub armadura: i64,
    pub defesa: i64,
    pub slots: i64,
    pub dano: ElementValues,
    pub resistencias: Resistances,
    pub bonus: Bonus,
}

/// Raw source strings kept alongside the parsed attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalText {
    pub atq: Option<String>,
    pub bonus: Option<String>,
    pub protecao: Option<String>,
    pub dano_elemental: Option<String>,
}

/// Item in the nested V2 schema. Field order is the serialized key order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemV2 {
    pub id: Option<u64>,
    pub nome: Option<String>,
    pub nome_arquivo_origem: Option<String>,
    pub imagem_url: Option<String>,
    pub tipo: Option<String>,
    pub level_minimo: i64,
    pub vocacoes: Vec<String>,
    pub peso: f64,
    pub atributos: Attributes,
    pub texto_original: OriginalText,
}

impl ItemV2 {
    /// Zero-valued item every transformation starts from.
    pub fn template() -> Self {
        Self {
            id: None,
            nome: None,
            nome_arquivo_origem: None,
            imagem_url: None,
            tipo: None,
            level_minimo: 0,
            vocacoes: vec![ALL_VOCATIONS.to_string()],
            peso: 0.0,
            atributos: Attributes::default(),
            texto_original: OriginalText::default(),
        }
    }
}

impl Default for ItemV2 {
    fn default() -> Self {
        Self::template()
    }
}

/// Task from a task room page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub room_name: String,
    pub task_number: i64,
    pub task_name: String,
    pub amount: i64,
    pub creatures: String,
    pub rewards: TaskRewards,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRewards {
    pub primary: Vec<String>,
    pub secondary: Vec<String>,
}
