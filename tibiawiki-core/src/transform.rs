//! Old flat item records to the nested V2 schema.

use crate::attributes::parse_attributes;
use crate::models::{ALL_VOCATIONS, ItemV2, OldItemRecord, OriginalText};

/// Parse an integer field, falling back to 0.
///
/// Whole floats such as `20.0` (how some pages export numbers) count as
/// integers; anything with a fractional part does not.
pub fn coerce_int(value: Option<&str>) -> i64 {
    value.and_then(|v| parse_whole(v.trim())).unwrap_or(0)
}

fn parse_whole(text: &str) -> Option<i64> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(n);
    }
    let v = text.parse::<f64>().ok()?;
    (v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then(|| v as i64)
}

/// Parse a float field, falling back to 0.0. Non-finite values count as invalid.
pub fn coerce_float(value: Option<&str>) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Split a vocation field like `"knight and paladin"` into names.
///
/// Absent or `"Todas"` means every vocation. Empty parts are kept.
pub fn parse_vocations(value: Option<&str>) -> Vec<String> {
    match value {
        None | Some(ALL_VOCATIONS) => vec![ALL_VOCATIONS.to_string()],
        Some(voc) => voc
            .replace(" and ", ",")
            .split(',')
            .map(|part| part.trim().to_string())
            .collect(),
    }
}

/// Convert one old record into a V2 item. The id is left unset.
pub fn transform_item(record: &OldItemRecord, tipo: &str, file_name: &str) -> ItemV2 {
    let mut item = ItemV2::template();

    item.nome = record.nome.clone();
    item.nome_arquivo_origem = Some(file_name.to_string());
    item.imagem_url = record.imagem_url.clone();
    item.tipo = Some(tipo.to_string());

    item.level_minimo = coerce_int(record.lvl.as_deref());
    item.peso = coerce_float(record.peso.as_deref());
    item.atributos.armadura = coerce_int(record.arm.as_deref());
    item.atributos.defesa = coerce_int(record.def.as_deref());
    item.atributos.slots = coerce_int(record.slots.as_deref());

    item.vocacoes = parse_vocations(record.voc.as_deref());

    item.texto_original = OriginalText {
        atq: record.atq.clone(),
        bonus: record.bonus.clone(),
        protecao: record.protecao.clone(),
        dano_elemental: record.dano_elemental.clone(),
    };

    parse_attributes(record, &mut item);

    item
}
