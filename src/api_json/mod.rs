use serde::{Deserialize, Serialize};

use crate::algorithm::LIMITE_OPCIONES;
use crate::models::{Jornada, Sede, SeleccionHorario};

/// Parámetros de entrada para la generación de combinaciones de horario
///
/// # Estructura del JSON esperado:
/// ```json
/// {
///   "materias": ["Circuitos", "Estática"],
///   "oferta": ["OfertaMecatronica.xlsx"],
///   "jornada": "manana",
///   "jornada_inicio": null,
///   "jornada_fin": null,
///   "sede": "todas",
///   "limite": 5
/// }
/// ```
///
/// # Campos:
/// - `materias`: Asignaturas seleccionadas, en orden (requerido, no vacío)
/// - `oferta`: Workbooks de oferta ya subidos, se concatenan en orden
/// - `jornada`: "manana" | "noche" | "mixta" | "personalizada"
/// - `jornada_inicio`/`jornada_fin`: minutos desde medianoche, solo para
///   jornada "personalizada"
/// - `sede`: "todas" | "sur" | "crisanto_luque" (opcional, default todas)
/// - `limite`: máximo de opciones a devolver (opcional, default 5)
#[derive(Debug, Serialize, Deserialize)]
pub struct ParametrosHorario {
    pub materias: Vec<String>,
    pub oferta: Vec<String>,
    pub jornada: String,
    #[serde(default)]
    pub jornada_inicio: Option<i32>,
    #[serde(default)]
    pub jornada_fin: Option<i32>,
    #[serde(default)]
    pub sede: Option<String>,
    #[serde(default)]
    pub limite: Option<usize>,
}

impl ParametrosHorario {
    /// Traduce los parámetros serializados a la selección tipada que
    /// consume el pipeline. Valores desconocidos son errores descriptivos.
    pub fn resolver(&self) -> Result<SeleccionHorario, Box<dyn std::error::Error>> {
        Ok(SeleccionHorario {
            materias: self.materias.clone(),
            jornada: resolver_jornada(&self.jornada, self.jornada_inicio, self.jornada_fin)?,
            sede: resolver_sede(self.sede.as_deref())?,
            limite: self.limite.unwrap_or(LIMITE_OPCIONES),
        })
    }
}

pub fn parse_params(json_str: &str) -> Result<ParametrosHorario, serde_json::Error> {
    serde_json::from_str::<ParametrosHorario>(json_str)
}

pub fn resolver_jornada(
    nombre: &str,
    inicio: Option<i32>,
    fin: Option<i32>,
) -> Result<Jornada, Box<dyn std::error::Error>> {
    match nombre.trim().to_lowercase().as_str() {
        "manana" | "mañana" => Ok(Jornada::Manana),
        "noche" => Ok(Jornada::Noche),
        "mixta" => Ok(Jornada::Mixta),
        "personalizada" => match (inicio, fin) {
            (Some(i), Some(f)) if i <= f => Ok(Jornada::Personalizada { inicio: i, fin: f }),
            (Some(i), Some(f)) => {
                Err(format!("jornada personalizada inválida: {} > {}", i, f).into())
            }
            _ => Err("jornada 'personalizada' requiere jornada_inicio y jornada_fin".into()),
        },
        otro => Err(format!("jornada desconocida: '{}'", otro).into()),
    }
}

pub fn resolver_sede(sede: Option<&str>) -> Result<Sede, Box<dyn std::error::Error>> {
    match sede.map(|s| s.trim().to_lowercase()).as_deref() {
        None | Some("") | Some("todas") => Ok(Sede::Todas),
        Some("sur") => Ok(Sede::Sur),
        Some("crisanto_luque") | Some("crisanto luque") => Ok(Sede::CrisantoLuque),
        Some(otro) => Err(format!("sede desconocida: '{}'", otro).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_completo() {
        let json_data = r#"
        {
            "materias": ["Circuitos", "Estática"],
            "oferta": ["OfertaMecatronica.xlsx"],
            "jornada": "manana",
            "sede": "sur",
            "limite": 3
        }
        "#;

        let params = parse_params(json_data).expect("Debe parsear JSON completo");
        assert_eq!(params.materias, vec!["Circuitos", "Estática"]);
        assert_eq!(params.oferta, vec!["OfertaMecatronica.xlsx"]);
        assert_eq!(params.limite, Some(3));

        let seleccion = params.resolver().expect("Debe resolver selección");
        assert_eq!(seleccion.jornada, Jornada::Manana);
        assert_eq!(seleccion.sede, Sede::Sur);
        assert_eq!(seleccion.limite, 3);
    }

    #[test]
    fn test_parse_json_minimo() {
        // Campos opcionales ausentes (backward compatible)
        let json_data = r#"
        {
            "materias": ["Circuitos"],
            "oferta": ["Oferta.xlsx"],
            "jornada": "mixta"
        }
        "#;

        let params = parse_params(json_data).expect("Debe parsear JSON mínimo");
        assert!(params.sede.is_none());
        assert!(params.limite.is_none());

        let seleccion = params.resolver().unwrap();
        assert_eq!(seleccion.jornada, Jornada::Mixta);
        assert_eq!(seleccion.sede, Sede::Todas);
        assert_eq!(seleccion.limite, LIMITE_OPCIONES);
    }

    #[test]
    fn test_resolver_jornada_personalizada() {
        let j = resolver_jornada("personalizada", Some(480), Some(720)).unwrap();
        assert_eq!(j.limites(), (480, 720));

        assert!(resolver_jornada("personalizada", Some(720), Some(480)).is_err());
        assert!(resolver_jornada("personalizada", None, Some(480)).is_err());
        assert!(resolver_jornada("madrugada", None, None).is_err());
    }

    #[test]
    fn test_resolver_jornada_presets() {
        assert_eq!(resolver_jornada("manana", None, None).unwrap().limites(), (360, 840));
        assert_eq!(resolver_jornada("Mañana", None, None).unwrap().limites(), (360, 840));
        assert_eq!(resolver_jornada("noche", None, None).unwrap().limites(), (1080, 1320));
        assert_eq!(resolver_jornada("mixta", None, None).unwrap().limites(), (360, 1320));
    }

    #[test]
    fn test_resolver_sede() {
        assert_eq!(resolver_sede(None).unwrap(), Sede::Todas);
        assert_eq!(resolver_sede(Some("todas")).unwrap(), Sede::Todas);
        assert_eq!(resolver_sede(Some("SUR")).unwrap(), Sede::Sur);
        assert_eq!(resolver_sede(Some("crisanto_luque")).unwrap(), Sede::CrisantoLuque);
        assert!(resolver_sede(Some("chapinero")).is_err());
    }
}
