// Estructuras de datos principales

use serde::Serialize;

/// Días canónicos de la semana en que hay clases (no hay oferta dominical).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dia {
    Lunes,
    Martes,
    Miercoles,
    Jueves,
    Viernes,
    Sabado,
}

impl Dia {
    pub const TODOS: [Dia; 6] = [
        Dia::Lunes,
        Dia::Martes,
        Dia::Miercoles,
        Dia::Jueves,
        Dia::Viernes,
        Dia::Sabado,
    ];

    /// Mapea la abreviatura de columna del workbook ('Lun', 'Mar', ...) al día.
    pub fn desde_abreviatura(abrev: &str) -> Option<Dia> {
        match abrev.trim().to_lowercase().as_str() {
            "lun" => Some(Dia::Lunes),
            "mar" => Some(Dia::Martes),
            "mier" => Some(Dia::Miercoles),
            "jue" => Some(Dia::Jueves),
            "vier" => Some(Dia::Viernes),
            "sab" => Some(Dia::Sabado),
            _ => None,
        }
    }

    pub fn nombre(&self) -> &'static str {
        match self {
            Dia::Lunes => "Lunes",
            Dia::Martes => "Martes",
            Dia::Miercoles => "Miércoles",
            Dia::Jueves => "Jueves",
            Dia::Viernes => "Viernes",
            Dia::Sabado => "Sábado",
        }
    }

    /// Posición 0..6 del día, usada como columna del calendario.
    pub fn indice(&self) -> usize {
        match self {
            Dia::Lunes => 0,
            Dia::Martes => 1,
            Dia::Miercoles => 2,
            Dia::Jueves => 3,
            Dia::Viernes => 4,
            Dia::Sabado => 5,
        }
    }
}

/// Una ocurrencia (día, minuto inicio, minuto fin) de una sección.
/// Invariante: `inicio < fin`, ambos en minutos desde medianoche (0-1439).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BloqueHorario {
    pub dia: Dia,
    pub inicio: i32,
    pub fin: i32,
}

/// Registro normalizado de la oferta: una fila por (sección, día activo),
/// tal como sale de la expansión ancho→largo del workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilaOferta {
    pub asignatura: String,
    pub numero_clase: i32,
    pub dia: Dia,
    pub inicio: i32,
    pub fin: i32,
    pub salon: String,
    pub campus: String,
    /// `None` cuando la celda no es numérica (ocupación desconocida).
    pub inscritos: Option<f64>,
    pub cupos: Option<f64>,
}

/// Una sección ofertada de una asignatura: sus bloques semanales más los
/// metadatos de cupo. Se construye una vez agrupando filas por
/// (asignatura, numero_clase) y no se muta después.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seccion {
    pub asignatura: String,
    pub numero_clase: i32,
    pub bloques: Vec<BloqueHorario>,
    pub salon: String,
    pub campus: String,
    pub inscritos: Option<f64>,
    pub cupos: Option<f64>,
}

impl Seccion {
    /// Porcentaje de ocupación (0-100). `None` cuando falta alguno de los
    /// conteos o los cupos son cero: ocupación desconocida, nunca NaN.
    pub fn ocupacion(&self) -> Option<f64> {
        match (self.inscritos, self.cupos) {
            (Some(i), Some(c)) if c > 0.0 => Some(100.0 * i / c),
            _ => None,
        }
    }

    /// Cupos agotados. Con cupos en cero la sección no admite a nadie; con
    /// conteos desconocidos no se puede afirmar que esté llena.
    pub fn esta_llena(&self) -> bool {
        match (self.inscritos, self.cupos) {
            (_, Some(c)) if c <= 0.0 => true,
            (Some(i), Some(c)) => i >= c,
            _ => false,
        }
    }
}

/// Una elección de exactamente una sección por asignatura seleccionada,
/// en el orden de la selección. Invariante: sin solapamientos por pares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Combinacion {
    pub secciones: Vec<Seccion>,
}

/// Ventana horaria permitida: cada bloque debe empezar Y terminar dentro
/// de los límites (ambos inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Jornada {
    Manana,
    Noche,
    Mixta,
    Personalizada { inicio: i32, fin: i32 },
}

impl Jornada {
    /// Límites en minutos desde medianoche.
    pub fn limites(&self) -> (i32, i32) {
        match *self {
            Jornada::Manana => (360, 840),
            Jornada::Noche => (1080, 1320),
            Jornada::Mixta => (360, 1320),
            Jornada::Personalizada { inicio, fin } => (inicio, fin),
        }
    }
}

/// Filtro de sede, aplicado como predicado puro sobre el salón.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Sede {
    Todas,
    Sur,
    CrisantoLuque,
}

impl Sede {
    pub fn admite(&self, salon: &str) -> bool {
        match self {
            Sede::Todas => true,
            Sede::Sur => salon.trim().to_uppercase().starts_with("SUR"),
            Sede::CrisantoLuque => salon.to_uppercase().contains("SLUQ"),
        }
    }
}

/// Selección explícita con la que se invoca el pipeline (sin estado ambiente).
#[derive(Debug, Clone)]
pub struct SeleccionHorario {
    pub materias: Vec<String>,
    pub jornada: Jornada,
    pub sede: Sede,
    pub limite: usize,
}

/// Desenlace de la búsqueda, distinguible por el llamador:
/// opciones encontradas, producto cruzado no vacío pero nada pasó los
/// filtros de jornada, o producto cruzado vacío.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultadoHorarios {
    Opciones(Vec<Combinacion>),
    SinCoincidenciaJornada,
    SinCandidatos,
}

/// Resultado del pipeline: desenlace más las materias con secciones llenas
/// detectadas durante el filtrado (aviso para el usuario).
#[derive(Debug, Clone, PartialEq)]
pub struct BusquedaHorarios {
    pub resultado: ResultadoHorarios,
    pub materias_llenas: Vec<String>,
}
