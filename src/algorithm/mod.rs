// Módulo de alto nivel del generador de combinaciones de horario.
pub mod combinaciones;
pub mod conflicto;
pub mod horario;

// Reexportar la API que consumen el servidor y los tests de integración.
pub use combinaciones::{
    combinacion_en_jornada, combinaciones_validas, filtrar_por_jornada, limitar, LIMITE_OPCIONES,
};
pub use conflicto::{bloques_se_solapan, secciones_se_solapan};
pub use horario::{agrupar_secciones, generar_horarios};
