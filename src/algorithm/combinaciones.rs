// Enumeración del producto cruzado, filtro de jornada y tope de opciones.
use crate::algorithm::conflicto::secciones_se_solapan;
use crate::models::{Combinacion, Jornada, Seccion};

/// Máximo de opciones entregadas a la capa de presentación.
pub const LIMITE_OPCIONES: usize = 5;

/// Umbral de aviso para productos cruzados grandes. No trunca ni falla:
/// la enumeración completa sigue siendo el contrato.
const PRODUCTO_AVISO: usize = 100_000;

/// Genera todas las combinaciones válidas: una sección por materia (en el
/// orden de `opciones_por_materia`, la última materia varía más rápido) y
/// cero choques entre todos los pares C(n,2) de secciones elegidas.
///
/// Si la selección está vacía o alguna materia no tiene candidatas, el
/// producto cruzado es vacío y se devuelve una lista vacía (no es error).
pub fn combinaciones_validas(opciones_por_materia: &[Vec<Seccion>]) -> Vec<Combinacion> {
    if opciones_por_materia.is_empty() || opciones_por_materia.iter().any(|ops| ops.is_empty()) {
        return Vec::new();
    }

    let producto: usize = opciones_por_materia.iter().map(|ops| ops.len()).product();
    if producto > PRODUCTO_AVISO {
        eprintln!("⚠️  [combinaciones] producto cruzado grande: {} tuplas", producto);
    }

    let n = opciones_por_materia.len();
    let mut indices = vec![0usize; n];
    let mut resultado: Vec<Combinacion> = Vec::new();

    loop {
        let tupla: Vec<&Seccion> = indices
            .iter()
            .enumerate()
            .map(|(materia, &ix)| &opciones_por_materia[materia][ix])
            .collect();

        // Probar todos los pares, no solo los adyacentes; cortar al primer choque.
        let mut solapamiento = false;
        'pares: for i in 0..n {
            for j in (i + 1)..n {
                if secciones_se_solapan(tupla[i], tupla[j]) {
                    solapamiento = true;
                    break 'pares;
                }
            }
        }

        if !solapamiento {
            resultado.push(Combinacion {
                secciones: tupla.into_iter().cloned().collect(),
            });
        }

        // Avanzar el odómetro de índices; al agotarse, terminamos.
        let mut pos = n;
        loop {
            if pos == 0 {
                return resultado;
            }
            pos -= 1;
            indices[pos] += 1;
            if indices[pos] < opciones_por_materia[pos].len() {
                break;
            }
            indices[pos] = 0;
        }
    }
}

/// True si cada bloque de cada sección empieza Y termina dentro de
/// `[inicio_lim, fin_lim]`, ambos extremos inclusive. Un bloque que
/// cruza el límite excluye la combinación completa (no se recorta).
pub fn combinacion_en_jornada(comb: &Combinacion, inicio_lim: i32, fin_lim: i32) -> bool {
    comb.secciones.iter().all(|seccion| {
        seccion.bloques.iter().all(|b| {
            inicio_lim <= b.inicio && b.inicio <= fin_lim && inicio_lim <= b.fin && b.fin <= fin_lim
        })
    })
}

/// Filtra las combinaciones a las que caben en la jornada, preservando orden.
pub fn filtrar_por_jornada(combinaciones: Vec<Combinacion>, jornada: &Jornada) -> Vec<Combinacion> {
    let (inicio_lim, fin_lim) = jornada.limites();
    combinaciones
        .into_iter()
        .filter(|c| combinacion_en_jornada(c, inicio_lim, fin_lim))
        .collect()
}

/// Trunca a las primeras `limite` combinaciones en el orden existente.
/// Sin reordenar ni deduplicar.
pub fn limitar(mut combinaciones: Vec<Combinacion>, limite: usize) -> Vec<Combinacion> {
    combinaciones.truncate(limite);
    combinaciones
}
