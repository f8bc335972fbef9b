use calamine::Data;
use chrono::{NaiveTime, Timelike};

/// Convierte un `Data` de calamine a String (versión genérica para celdas)
pub fn cell_to_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if (f.floor() - f).abs() < f64::EPSILON {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Empty => String::new(),
        Data::Error(_) => String::new(),
        Data::DateTime(s) => s.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

/// Coerción numérica de una celda. Devuelve `None` si no es numérica
/// (equivalente a `to_numeric(errors='coerce')`: nada de NaN río abajo).
pub fn cell_to_f64(c: &Data) -> Option<f64> {
    match c {
        Data::Float(f) => Some(*f),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

/// Lee una hora de celda como minutos desde medianoche. Acepta texto
/// "HH:MM", valores serial de Excel (fracción de día) y fechas ISO.
pub fn cell_to_minutos(c: &Data) -> Option<i32> {
    match c {
        Data::String(s) => hora_a_minutos(s),
        Data::DateTime(dt) => {
            let f = dt.as_f64();
            let fraccion = f - f.floor();
            Some((fraccion * 1440.0).round() as i32)
        }
        Data::DateTimeIso(s) => {
            // "2024-01-01T08:30:00" o "08:30:00"
            let hora = s.rsplit('T').next().unwrap_or(s);
            hora_a_minutos(hora)
        }
        Data::Float(f) if *f > 0.0 && *f < 1.0 => Some((f * 1440.0).round() as i32),
        _ => None,
    }
}

/// Convierte "HH:MM" (o "HH:MM:SS") a minutos desde medianoche.
pub fn hora_a_minutos(hora: &str) -> Option<i32> {
    let limpio = hora.trim();
    for formato in ["%H:%M", "%H:%M:%S"] {
        if let Ok(t) = NaiveTime::parse_from_str(limpio, formato) {
            return Some(t.hour() as i32 * 60 + t.minute() as i32);
        }
    }
    None
}

/// Inverso de `hora_a_minutos`, para presentación.
pub fn minutos_a_hora(minutos: i32) -> String {
    format!("{:02}:{:02}", minutos / 60, minutos % 60)
}

/// Normaliza encabezados eliminando espacios y pasando a minúsculas.
pub fn normalize_header(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect()
}

/// Convierte letras de columna (ej: "AB") a índice 1-based (A=1)
pub fn column_letters_to_index(s: &str) -> usize {
    let mut acc = 0usize;
    for ch in s.chars() {
        if ch.is_ascii_alphabetic() {
            acc = acc * 26 + ((ch.to_ascii_uppercase() as u8 - b'A') as usize + 1);
        }
    }
    acc
}
