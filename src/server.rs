use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use futures_util::TryStreamExt;
use serde_json::json;
use std::error::Error;
use std::fs::create_dir_all;
use std::path::Path;

use crate::algorithm::generar_horarios;
use crate::api_json::ParametrosHorario;
use crate::excel::{leer_ofertas_excel, minutos_a_hora};
use crate::grafico::dibujar_calendario;
use crate::models::{BusquedaHorarios, Combinacion, FilaOferta, ResultadoHorarios};

/// Directorio protegido donde se guardan las ofertas subidas.
pub const DIR_OFERTAS: &str = "data/ofertas";

/// Resuelve el nombre de un workbook subido a su ruta en `DIR_OFERTAS`.
/// Rechaza separadores de ruta; acepta una ruta directa ya existente para
/// facilitar usos fuera del servidor.
fn resolver_oferta(nombre: &str) -> Result<String, Box<dyn Error>> {
    if nombre.contains('/') || nombre.contains('\\') || nombre.contains("..") {
        if Path::new(nombre).exists() && !nombre.contains("..") {
            return Ok(nombre.to_string());
        }
        return Err(format!("nombre de oferta inválido: '{}'", nombre).into());
    }
    let candidata = format!("{}/{}", DIR_OFERTAS, nombre);
    if Path::new(&candidata).exists() {
        Ok(candidata)
    } else if Path::new(nombre).exists() {
        Ok(nombre.to_string())
    } else {
        Err(format!("no existe la oferta '{}'", nombre).into())
    }
}

fn cargar_filas(ofertas: &[String]) -> Result<Vec<FilaOferta>, Box<dyn Error>> {
    let mut rutas: Vec<String> = Vec::new();
    for nombre in ofertas {
        rutas.push(resolver_oferta(nombre)?);
    }
    leer_ofertas_excel(&rutas)
}

fn combinacion_json(comb: &Combinacion) -> serde_json::Value {
    let secciones: Vec<serde_json::Value> = comb
        .secciones
        .iter()
        .map(|s| {
            let bloques: Vec<serde_json::Value> = s
                .bloques
                .iter()
                .map(|b| {
                    json!({
                        "dia": b.dia.nombre(),
                        "inicio": b.inicio,
                        "fin": b.fin,
                        "hora_ini": minutos_a_hora(b.inicio),
                        "hora_fin": minutos_a_hora(b.fin),
                    })
                })
                .collect();
            json!({
                "asignatura": s.asignatura,
                "numero_clase": s.numero_clase,
                "salon": s.salon,
                "campus": s.campus,
                "ocupacion_pct": s.ocupacion(),
                "bloques": bloques,
            })
        })
        .collect();
    json!({ "secciones": secciones })
}

/// Ejecuta el pipeline para unos parámetros ya parseados y arma la
/// respuesta JSON con el desenlace de tres vías.
fn respuesta_generar(params: &ParametrosHorario) -> HttpResponse {
    if params.materias.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Selecciona al menos una materia."}));
    }
    if params.oferta.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({"error": "oferta es requerida (lista de workbooks subidos)"}));
    }

    let seleccion = match params.resolver() {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("parámetros inválidos: {}", e)}))
        }
    };

    let filas = match cargar_filas(&params.oferta) {
        Ok(f) => f,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("no se pudo leer la oferta: {}", e)}))
        }
    };

    let busqueda: BusquedaHorarios = match generar_horarios(&filas, &seleccion) {
        Ok(b) => b,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("fallo el pipeline: {}", e)}))
        }
    };

    let (estado, mensaje, opciones) = match &busqueda.resultado {
        ResultadoHorarios::Opciones(opciones) => (
            "opciones",
            serde_json::Value::Null,
            opciones.iter().map(combinacion_json).collect::<Vec<_>>(),
        ),
        ResultadoHorarios::SinCoincidenciaJornada => (
            "sin_coincidencia_jornada",
            json!("No hay combinaciones que cumplan los filtros de jornada."),
            Vec::new(),
        ),
        ResultadoHorarios::SinCandidatos => (
            "sin_candidatos",
            json!("No hay clases disponibles para esta combinación."),
            Vec::new(),
        ),
    };

    HttpResponse::Ok().json(json!({
        "estado": estado,
        "mensaje": mensaje,
        "materias_llenas": busqueda.materias_llenas,
        "opciones": opciones,
    }))
}

/// POST /horarios/generar con body JSON `ParametrosHorario`.
async fn generar_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let body_value = body.into_inner();
    let json_str = match serde_json::to_string(&body_value) {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("invalid JSON body: {}", e)}))
        }
    };

    let params = match crate::api_json::parse_params(&json_str) {
        Ok(p) => p,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("failed to parse input: {}", e)}))
        }
    };

    respuesta_generar(&params)
}

fn params_desde_query(qm: &std::collections::HashMap<String, String>) -> ParametrosHorario {
    // Helper para convertir 'a,b,c' -> Vec<String>
    let split_list = |s_opt: Option<&String>| -> Vec<String> {
        match s_opt {
            Some(s) if !s.trim().is_empty() => s
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    };

    ParametrosHorario {
        materias: split_list(qm.get("materias")),
        oferta: split_list(qm.get("oferta")),
        jornada: qm.get("jornada").cloned().unwrap_or_else(|| "mixta".to_string()),
        jornada_inicio: qm.get("jornada_inicio").and_then(|s| s.parse().ok()),
        jornada_fin: qm.get("jornada_fin").and_then(|s| s.parse().ok()),
        sede: qm.get("sede").cloned(),
        limite: qm.get("limite").and_then(|s| s.parse().ok()),
    }
}

/// GET /horarios/generar: versión ligera con listas separadas por comas.
async fn generar_get_handler(
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let params = params_desde_query(&query.into_inner());
    respuesta_generar(&params)
}

/// GET /horarios/grafico: calendario SVG de la opción `opcion` (1-based).
async fn grafico_handler(
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let qm = query.into_inner();
    let opcion = qm.get("opcion").and_then(|s| s.parse::<usize>().ok()).unwrap_or(1);
    if opcion == 0 {
        return HttpResponse::BadRequest().json(json!({"error": "opcion es 1-based"}));
    }
    let params = params_desde_query(&qm);

    if params.materias.is_empty() {
        return HttpResponse::BadRequest()
            .json(json!({"error": "Selecciona al menos una materia."}));
    }
    let seleccion = match params.resolver() {
        Ok(s) => s,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("parámetros inválidos: {}", e)}))
        }
    };
    let filas = match cargar_filas(&params.oferta) {
        Ok(f) => f,
        Err(e) => {
            return HttpResponse::BadRequest()
                .json(json!({"error": format!("no se pudo leer la oferta: {}", e)}))
        }
    };
    let busqueda = match generar_horarios(&filas, &seleccion) {
        Ok(b) => b,
        Err(e) => {
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("fallo el pipeline: {}", e)}))
        }
    };

    let opciones = match busqueda.resultado {
        ResultadoHorarios::Opciones(opciones) => opciones,
        _ => {
            return HttpResponse::NotFound()
                .json(json!({"error": "no hay opciones para graficar"}))
        }
    };
    let combinacion = match opciones.get(opcion - 1) {
        Some(c) => c,
        None => {
            return HttpResponse::NotFound().json(json!({
                "error": format!("opcion {} fuera de rango (hay {})", opcion, opciones.len())
            }))
        }
    };

    match dibujar_calendario(combinacion) {
        Ok(svg) => HttpResponse::Ok().content_type("image/svg+xml").body(svg),
        Err(e) => HttpResponse::InternalServerError()
            .json(json!({"error": format!("no se pudo dibujar el calendario: {}", e)})),
    }
}

/// GET /oferta/materias?oferta=a.xlsx,b.xlsx
/// Asignaturas distintas de las ofertas indicadas, ordenadas.
async fn materias_handler(
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let qm = query.into_inner();
    let ofertas: Vec<String> = match qm.get("oferta") {
        Some(s) if !s.trim().is_empty() => s
            .split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        _ => {
            return HttpResponse::BadRequest()
                .json(json!({"error": "oferta query parameter is required"}))
        }
    };

    match cargar_filas(&ofertas) {
        Ok(filas) => {
            let materias: std::collections::BTreeSet<String> =
                filas.into_iter().map(|f| f.asignatura).collect();
            let materias: Vec<String> = materias.into_iter().collect();
            HttpResponse::Ok().json(json!({"materias": materias}))
        }
        Err(e) => HttpResponse::BadRequest()
            .json(json!({"error": format!("no se pudo leer la oferta: {}", e)})),
    }
}

/// POST /oferta/upload
/// Sube uno o más workbooks .xlsx (multipart) a `DIR_OFERTAS`.
async fn subir_oferta_handler(mut payload: Multipart) -> impl Responder {
    if let Err(e) = create_dir_all(DIR_OFERTAS) {
        return HttpResponse::InternalServerError()
            .json(json!({"error": format!("failed to create data dir: {}", e)}));
    }

    let mut guardados: Vec<String> = Vec::new();
    loop {
        let mut field = match payload.try_next().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return HttpResponse::BadRequest()
                    .json(json!({"error": format!("multipart inválido: {}", e)}))
            }
        };

        let nombre = field
            .content_disposition()
            .get_filename()
            .map(|s| s.to_string())
            .unwrap_or_default();

        let mut datos: Vec<u8> = Vec::new();
        loop {
            match field.try_next().await {
                Ok(Some(chunk)) => datos.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(e) => {
                    return HttpResponse::BadRequest()
                        .json(json!({"error": format!("fallo leyendo el archivo: {}", e)}))
                }
            }
        }

        let nombre_sano: String = nombre
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
            .collect();
        if !nombre_sano.to_lowercase().ends_with(".xlsx") {
            return HttpResponse::BadRequest()
                .json(json!({"error": "solo se aceptan archivos .xlsx"}));
        }

        let ruta = format!("{}/{}", DIR_OFERTAS, nombre_sano);
        if let Err(e) = std::fs::write(&ruta, &datos) {
            return HttpResponse::InternalServerError()
                .json(json!({"error": format!("failed to write file: {}", e)}));
        }
        eprintln!("   ✓ oferta subida: {} ({} bytes)", nombre_sano, datos.len());
        guardados.push(nombre_sano);
    }

    HttpResponse::Ok().json(json!({"status": "ok", "archivos": guardados}))
}

async fn help_handler() -> impl Responder {
    // Ejemplo de ParametrosHorario para POST /horarios/generar
    let example = ParametrosHorario {
        materias: vec!["Circuitos".to_string(), "Estática".to_string()],
        oferta: vec!["OfertaMecatronica.xlsx".to_string()],
        jornada: "manana".to_string(),
        jornada_inicio: None,
        jornada_fin: None,
        sede: Some("todas".to_string()),
        limite: Some(5),
    };

    let help = json!({
        "description": "API para generar combinaciones de horario sin choques. POST /horarios/generar acepta un JSON (ver 'example'); GET acepta listas separadas por comas en query. Suba primero las ofertas con POST /oferta/upload.",
        "post_example": example,
        "get_example_query": "/horarios/generar?materias=Circuitos,Est%C3%A1tica&oferta=OfertaMecatronica.xlsx&jornada=manana&sede=todas",
        "jornadas": ["manana (6:00-14:00)", "noche (18:00-22:00)", "mixta (6:00-22:00)", "personalizada (jornada_inicio/jornada_fin en minutos)"],
        "sedes": ["todas", "sur", "crisanto_luque"],
        "estados": ["opciones", "sin_coincidencia_jornada", "sin_candidatos"],
        "grafico": "/horarios/grafico acepta los mismos parámetros más opcion=N (1-based) y devuelve SVG",
    });

    HttpResponse::Ok().json(help)
}

pub async fn run_server(bind_addr: &str) -> std::io::Result<()> {
    HttpServer::new(|| {
        App::new()
            .wrap(Cors::permissive())
            .route("/oferta/upload", web::post().to(subir_oferta_handler))
            .route("/oferta/materias", web::get().to(materias_handler))
            .route("/horarios/generar", web::post().to(generar_handler))
            .route("/horarios/generar", web::get().to(generar_get_handler))
            .route("/horarios/grafico", web::get().to(grafico_handler))
            .route("/help", web::get().to(help_handler))
    })
    .workers(num_cpus::get())
    .bind(bind_addr)?
    .run()
    .await
}
