//! services/scheduling.rs
//! Normalización de teléfonos y generación del horario aleatorio de llamada.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::Rng;

/// Huso horario de Japón (+09:00, sin horario de verano).
pub fn jst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).expect("offset +09:00 válido")
}

pub fn now_jst() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&jst())
}

/// Franjas horarias con nombre: (inicio, fin) inclusive, a nivel de minuto.
const TIME_SLOTS: [(&str, (u32, u32), (u32, u32)); 3] = [
    ("朝", (9, 0), (11, 59)),
    ("昼", (12, 0), (17, 59)),
    ("晩", (18, 0), (20, 59)),
];

/// Devuelve los límites (inicio, fin) de una franja con nombre.
pub fn slot_bounds(time_slot: &str) -> Option<(NaiveTime, NaiveTime)> {
    TIME_SLOTS.iter().find(|(name, _, _)| *name == time_slot).map(
        |(_, (sh, sm), (eh, em))| {
            (
                NaiveTime::from_hms_opt(*sh, *sm, 0).expect("hora de inicio válida"),
                NaiveTime::from_hms_opt(*eh, *em, 59).expect("hora de fin válida"),
            )
        },
    )
}

/// Normaliza un teléfono japonés a E.164.
/// Ej: "090-1234-5678" -> "+819012345678".
pub fn normalize_phone_number(phone: &str) -> String {
    let cleaned: String = phone
        .chars()
        .filter(|c| !matches!(c, '-' | ' ' | '(' | ')'))
        .collect();

    if let Some(rest) = cleaned.strip_prefix('0') {
        format!("+81{}", rest)
    } else if cleaned.starts_with('+') {
        cleaned
    } else {
        format!("+81{}", cleaned)
    }
}

fn parse_preferred_date(preferred_date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(preferred_date, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(preferred_date, "%Y/%m/%d"))
        .with_context(|| format!("Fecha inválida: {}", preferred_date))
}

fn to_jst_datetime(date: NaiveDate, time: NaiveTime) -> Result<DateTime<FixedOffset>> {
    jst()
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or_else(|| anyhow!("No se pudo construir el datetime en JST"))
}

/// Calcula el horario de llamada a partir de la fecha deseada y la franja.
/// - "HH:MM" se respeta tal cual;
/// - "朝"/"昼"/"晩" producen un instante uniforme dentro de la franja
///   (granularidad de segundos).
pub fn generate_random_datetime<R: Rng>(
    preferred_date: &str,
    time_slot: &str,
    rng: &mut R,
) -> Result<DateTime<FixedOffset>> {
    let date = parse_preferred_date(preferred_date)?;

    // Hora exacta "HH:MM"
    if time_slot.contains(':') {
        let time = NaiveTime::parse_from_str(time_slot, "%H:%M")
            .with_context(|| format!("Formato de hora inválido: {}", time_slot))?;
        return to_jst_datetime(date, time);
    }

    let (start, end) = slot_bounds(time_slot).ok_or_else(|| {
        anyhow!(
            "Franja horaria inválida: {}. Usa '朝', '昼', '晩' o 'HH:MM'",
            time_slot
        )
    })?;

    use chrono::Timelike;
    let start_secs = start.num_seconds_from_midnight();
    let end_secs = end.num_seconds_from_midnight();
    let random_secs = rng.gen_range(start_secs..=end_secs);

    let time = NaiveTime::from_num_seconds_from_midnight_opt(random_secs, 0)
        .ok_or_else(|| anyhow!("Segundos fuera de rango: {}", random_secs))?;
    to_jst_datetime(date, time)
}
