// horario.rs - Orquestador del pipeline de generación de horarios
//
// PHASE 1: agrupar filas normalizadas en secciones
// PHASE 2: filtrar candidatas (materias seleccionadas, sede, cupos llenos)
// PHASE 3: enumerar combinaciones sin choques (producto cruzado)
// PHASE 4: filtrar por jornada y limitar opciones

use std::collections::HashMap;
use std::error::Error;

use crate::algorithm::combinaciones::{combinaciones_validas, filtrar_por_jornada, limitar};
use crate::models::{
    BloqueHorario, BusquedaHorarios, FilaOferta, ResultadoHorarios, Seccion, SeleccionHorario,
};

/// Agrupa las filas normalizadas por (asignatura, numero_clase) preservando
/// el orden de primera aparición. Los metadatos salen de la primera fila del
/// grupo; cada fila aporta un bloque.
///
/// Una sección se reúne como máximo una vez por día: un día repetido dentro
/// del mismo grupo es un error de construcción con contexto.
pub fn agrupar_secciones(filas: &[FilaOferta]) -> Result<Vec<Seccion>, Box<dyn Error>> {
    let mut secciones: Vec<Seccion> = Vec::new();
    let mut indice: HashMap<(String, i32), usize> = HashMap::new();

    for fila in filas {
        let clave = (fila.asignatura.clone(), fila.numero_clase);
        let bloque = BloqueHorario {
            dia: fila.dia,
            inicio: fila.inicio,
            fin: fila.fin,
        };
        match indice.get(&clave) {
            Some(&ix) => {
                let seccion = &mut secciones[ix];
                if seccion.bloques.iter().any(|b| b.dia == fila.dia) {
                    return Err(format!(
                        "'{}' clase {}: día {} repetido en la oferta",
                        fila.asignatura,
                        fila.numero_clase,
                        fila.dia.nombre()
                    )
                    .into());
                }
                seccion.bloques.push(bloque);
            }
            None => {
                indice.insert(clave, secciones.len());
                secciones.push(Seccion {
                    asignatura: fila.asignatura.clone(),
                    numero_clase: fila.numero_clase,
                    bloques: vec![bloque],
                    salon: fila.salon.clone(),
                    campus: fila.campus.clone(),
                    inscritos: fila.inscritos,
                    cupos: fila.cupos,
                });
            }
        }
    }

    Ok(secciones)
}

/// Ejecuta el pipeline completo sobre filas ya normalizadas y una selección
/// explícita. Los tres desenlaces vacíos son estados reportados, nunca Err.
pub fn generar_horarios(
    filas: &[FilaOferta],
    seleccion: &SeleccionHorario,
) -> Result<BusquedaHorarios, Box<dyn Error>> {
    // =========================================================================
    // PHASE 1: agrupar filas en secciones
    // =========================================================================
    eprintln!("📋 PHASE 1: agrupar secciones");
    let secciones = agrupar_secciones(filas)?;
    eprintln!("   ✓ secciones construidas: {} (de {} filas)", secciones.len(), filas.len());

    // =========================================================================
    // PHASE 2: filtrar candidatas
    // =========================================================================
    eprintln!("📋 PHASE 2: filtrar candidatas");

    // Aviso de materias con secciones llenas (sobre la selección, sin filtrar
    // por sede, igual que la advertencia original).
    let mut materias_llenas: Vec<String> = Vec::new();
    for materia in &seleccion.materias {
        let alguna_llena = secciones
            .iter()
            .any(|s| s.asignatura == *materia && s.esta_llena());
        if alguna_llena && !materias_llenas.contains(materia) {
            materias_llenas.push(materia.clone());
        }
    }
    if !materias_llenas.is_empty() {
        eprintln!("   ⚠️  materias con secciones llenas: {}", materias_llenas.join(", "));
    }

    let disponibles: Vec<&Seccion> = secciones
        .iter()
        .filter(|s| {
            if !seleccion.materias.contains(&s.asignatura) {
                return false;
            }
            if s.esta_llena() {
                eprintln!("   ⊘ Excluyendo '{}' clase {} (llena)", s.asignatura, s.numero_clase);
                return false;
            }
            if !seleccion.sede.admite(&s.salon) {
                eprintln!(
                    "   ⊘ Excluyendo '{}' clase {} (salón {} fuera de sede)",
                    s.asignatura, s.numero_clase, s.salon
                );
                return false;
            }
            true
        })
        .collect();
    eprintln!("   ✓ candidatas: {} secciones", disponibles.len());

    // Candidatas por materia, en orden de selección; dentro de cada materia
    // por número de clase ascendente (orden del groupby original).
    let mut opciones_por_materia: Vec<Vec<Seccion>> = Vec::new();
    for materia in &seleccion.materias {
        let mut opciones: Vec<Seccion> = disponibles
            .iter()
            .filter(|s| s.asignatura == *materia)
            .map(|s| (*s).clone())
            .collect();
        opciones.sort_by_key(|s| s.numero_clase);
        if opciones.is_empty() {
            eprintln!("   ⚠️  '{}' sin secciones elegibles", materia);
        }
        opciones_por_materia.push(opciones);
    }

    let producto_vacio = seleccion.materias.is_empty()
        || opciones_por_materia.iter().any(|ops| ops.is_empty());
    if producto_vacio {
        eprintln!("✅ Pipeline completado: producto cruzado vacío (sin candidatas)");
        return Ok(BusquedaHorarios {
            resultado: ResultadoHorarios::SinCandidatos,
            materias_llenas,
        });
    }

    // =========================================================================
    // PHASE 3: enumerar combinaciones sin choques
    // =========================================================================
    eprintln!("📋 PHASE 3: enumerar combinaciones");
    let combinaciones = combinaciones_validas(&opciones_por_materia);
    eprintln!("   ✓ combinaciones sin choques: {}", combinaciones.len());

    // =========================================================================
    // PHASE 4: jornada + límite
    // =========================================================================
    eprintln!("📋 PHASE 4: filtro de jornada y límite");
    let filtradas = filtrar_por_jornada(combinaciones, &seleccion.jornada);
    eprintln!("   ✓ combinaciones dentro de la jornada: {}", filtradas.len());

    let opciones = limitar(filtradas, seleccion.limite);

    if opciones.is_empty() {
        eprintln!("✅ Pipeline completado: sin coincidencias de jornada");
        return Ok(BusquedaHorarios {
            resultado: ResultadoHorarios::SinCoincidenciaJornada,
            materias_llenas,
        });
    }

    eprintln!("✅ Pipeline completado: {} opciones (máximo {})", opciones.len(), seleccion.limite);
    Ok(BusquedaHorarios {
        resultado: ResultadoHorarios::Opciones(opciones),
        materias_llenas,
    })
}
