use std::error::Error;
use std::io::Read;

use calamine::{open_workbook_auto, Data, Reader as CalamineReader};
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::excel::io::{
    cell_to_f64, cell_to_minutos, cell_to_string, column_letters_to_index, normalize_header,
};
use crate::models::{Dia, FilaOferta};

static CELDA_VACIA: Data = Data::Empty;

/// Posiciones de las columnas de la oferta dentro de la hoja.
struct ColumnasOferta {
    asignatura: usize,
    numero_clase: usize,
    hora_ini: usize,
    hora_fin: usize,
    salon: Option<usize>,
    campus: Option<usize>,
    inscritos: Option<usize>,
    cupos: Option<usize>,
    /// (índice de columna, día) por cada columna de bandera 'Lun'..'Sab'.
    dias: Vec<(usize, Dia)>,
}

/// Lee una oferta académica y la expande a una fila por (sección, día
/// activo). Intenta primero con calamine; si el workbook no se deja leer,
/// recorre el zip directamente (mismo esquema de dos niveles que la
/// lectura de ofertas original).
pub fn leer_oferta_excel(ruta: &str) -> Result<Vec<FilaOferta>, Box<dyn Error>> {
    // Intentar primero con calamine (más rápido si funciona)
    if let Ok(mut workbook) = open_workbook_auto(ruta) {
        let sheet_names = workbook.sheet_names().to_owned();
        for sheet in sheet_names.iter() {
            if let Ok(range) = workbook.worksheet_range(sheet) {
                let crudas: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
                if let Some(filas) = parsear_hoja(&crudas)? {
                    if !filas.is_empty() {
                        eprintln!(
                            "   ✓ oferta '{}': {} filas normalizadas (hoja '{}')",
                            ruta,
                            filas.len(),
                            sheet
                        );
                        return Ok(filas);
                    }
                }
            }
        }
    }

    // Fallback: recorrer el workbook como zip y parsear el XML a mano
    eprintln!(
        "⚠️  calamine no devolvió datos para '{}', intentando lectura vía zip",
        ruta
    );
    let crudas = leer_hoja_cruda(ruta)?;
    let datos: Vec<Vec<Data>> = crudas
        .into_iter()
        .map(|fila| fila.into_iter().map(Data::String).collect())
        .collect();
    match parsear_hoja(&datos)? {
        Some(filas) if !filas.is_empty() => {
            eprintln!("   ✓ oferta '{}': {} filas normalizadas (vía zip)", ruta, filas.len());
            Ok(filas)
        }
        _ => Err(format!("no se pudo leer una oferta válida de '{}'", ruta).into()),
    }
}

/// Lee varias ofertas y concatena sus filas en el orden de los archivos,
/// igual que la concatenación de workbooks subidos de la app original.
pub fn leer_ofertas_excel(rutas: &[String]) -> Result<Vec<FilaOferta>, Box<dyn Error>> {
    let mut filas = Vec::new();
    for ruta in rutas {
        filas.extend(leer_oferta_excel(ruta)?);
    }
    Ok(filas)
}

/// Busca la fila de encabezado (la que contiene 'Asignatura', que en los
/// workbooks reales no es la primera) y normaliza las filas siguientes.
/// Devuelve `None` si la hoja no tiene encabezado reconocible.
fn parsear_hoja(crudas: &[Vec<Data>]) -> Result<Option<Vec<FilaOferta>>, Box<dyn Error>> {
    let encabezado_ix = crudas.iter().take(10).position(|fila| {
        fila.iter()
            .any(|c| normalize_header(&cell_to_string(c)) == "asignatura")
    });
    let encabezado_ix = match encabezado_ix {
        Some(ix) => ix,
        None => return Ok(None),
    };

    let columnas = detectar_columnas(&crudas[encabezado_ix])?;
    let mut filas: Vec<FilaOferta> = Vec::new();

    for (offset, fila) in crudas[encabezado_ix + 1..].iter().enumerate() {
        // número de fila 1-based dentro de la hoja, para mensajes de error
        let numero_fila = encabezado_ix + offset + 2;

        let celda = |ix: usize| fila.get(ix).unwrap_or(&CELDA_VACIA);
        let asignatura = cell_to_string(celda(columnas.asignatura));
        if asignatura.is_empty() {
            continue;
        }

        let numero_clase = match cell_to_f64(celda(columnas.numero_clase)) {
            Some(n) => n.round() as i32,
            None => {
                return Err(format!(
                    "fila {}: 'Nº Clase' no numérico para '{}'",
                    numero_fila, asignatura
                )
                .into())
            }
        };
        let inicio = cell_to_minutos(celda(columnas.hora_ini)).ok_or_else(|| {
            format!("fila {}: falta 'Hora Ini' para '{}'", numero_fila, asignatura)
        })?;
        let fin = cell_to_minutos(celda(columnas.hora_fin)).ok_or_else(|| {
            format!("fila {}: falta 'Hora Fin' para '{}'", numero_fila, asignatura)
        })?;
        if inicio >= fin {
            return Err(format!(
                "fila {}: rango horario inválido para '{}' ({} >= {})",
                numero_fila, asignatura, inicio, fin
            )
            .into());
        }

        let salon = columnas.salon.map(|ix| cell_to_string(celda(ix))).unwrap_or_default();
        let campus = columnas.campus.map(|ix| cell_to_string(celda(ix))).unwrap_or_default();
        let inscritos = columnas.inscritos.and_then(|ix| cell_to_f64(celda(ix)));
        let cupos = columnas.cupos.and_then(|ix| cell_to_f64(celda(ix)));

        // Expansión ancho→largo: una fila por día marcado con 'Y'.
        for &(dia_ix, dia) in &columnas.dias {
            let marca = cell_to_string(celda(dia_ix));
            if !marca.eq_ignore_ascii_case("Y") {
                continue;
            }
            filas.push(FilaOferta {
                asignatura: asignatura.clone(),
                numero_clase,
                dia,
                inicio,
                fin,
                salon: salon.clone(),
                campus: campus.clone(),
                inscritos,
                cupos,
            });
        }
    }

    Ok(Some(filas))
}

/// Resuelve los índices de columna por nombre de encabezado. Las columnas
/// obligatorias ausentes son un error con el nombre de la columna.
fn detectar_columnas(encabezado: &[Data]) -> Result<ColumnasOferta, Box<dyn Error>> {
    let mut asignatura = None;
    let mut numero_clase = None;
    let mut hora_ini = None;
    let mut hora_fin = None;
    let mut salon = None;
    let mut campus = None;
    let mut inscritos = None;
    let mut cupos = None;
    let mut dias: Vec<(usize, Dia)> = Vec::new();

    for (ix, celda) in encabezado.iter().enumerate() {
        let h = normalize_header(&cell_to_string(celda));
        if h.is_empty() {
            continue;
        }
        if h == "asignatura" {
            asignatura = Some(ix);
        } else if h.contains("clase") {
            numero_clase = Some(ix);
        } else if h.contains("hora") && h.contains("ini") {
            hora_ini = Some(ix);
        } else if h.contains("hora") && h.contains("fin") {
            hora_fin = Some(ix);
        } else if h.contains("salon") || h.contains("salón") {
            salon = Some(ix);
        } else if h.contains("campus") {
            campus = Some(ix);
        } else if h.contains("inscritos") {
            inscritos = Some(ix);
        } else if h.contains("cupos") {
            cupos = Some(ix);
        } else if let Some(dia) = Dia::desde_abreviatura(&h) {
            dias.push((ix, dia));
        }
    }

    let requerida = |col: Option<usize>, nombre: &str| -> Result<usize, Box<dyn Error>> {
        col.ok_or_else(|| format!("columna '{}' ausente en la oferta", nombre).into())
    };

    let columnas = ColumnasOferta {
        asignatura: requerida(asignatura, "Asignatura")?,
        numero_clase: requerida(numero_clase, "Nº Clase")?,
        hora_ini: requerida(hora_ini, "Hora Ini")?,
        hora_fin: requerida(hora_fin, "Hora Fin")?,
        salon,
        campus,
        inscritos,
        cupos,
        dias,
    };
    if columnas.dias.is_empty() {
        return Err("columnas de día ('Lun'..'Sab') ausentes en la oferta".into());
    }
    Ok(columnas)
}

/// Lee la primera hoja no vacía del workbook recorriendo el zip a mano.
fn leer_hoja_cruda(ruta: &str) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let archivo = std::fs::File::open(ruta)?;
    let mut archive = zip::ZipArchive::new(archivo)?;

    let mut compartidas: Vec<String> = Vec::new();
    if let Ok(mut f) = archive.by_name("xl/sharedStrings.xml") {
        let mut xml = String::new();
        f.read_to_string(&mut xml)?;
        compartidas = extraer_cadenas_compartidas(&xml)?;
    }

    let mut nombres: Vec<String> = archive
        .file_names()
        .filter(|n| n.starts_with("xl/worksheets/sheet") && n.ends_with(".xml"))
        .map(|n| n.to_string())
        .collect();
    nombres.sort();

    for nombre in nombres {
        let mut xml = String::new();
        archive.by_name(&nombre)?.read_to_string(&mut xml)?;
        let filas = parsear_hoja_xml(&xml, &compartidas)?;
        if !filas.is_empty() {
            return Ok(filas);
        }
    }
    Ok(Vec::new())
}

/// Extrae los textos `<si><t>..</t></si>` de xl/sharedStrings.xml.
fn extraer_cadenas_compartidas(xml: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut cadenas: Vec<String> = Vec::new();
    let mut actual = String::new();
    let mut en_texto = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => actual.clear(),
                b"t" => en_texto = true,
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if en_texto {
                    actual.push_str(&t.unescape()?);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"t" => en_texto = false,
                b"si" => cadenas.push(actual.clone()),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("sharedStrings.xml inválido: {}", e).into()),
            _ => {}
        }
    }
    Ok(cadenas)
}

fn colocar_celda(fila: &mut Vec<String>, col: usize, valor: String) {
    while fila.len() < col {
        fila.push(String::new());
    }
    if fila.len() == col {
        fila.push(valor);
    } else {
        fila[col] = valor;
    }
}

/// Parsea una hoja `xl/worksheets/sheetN.xml` a una matriz de strings,
/// resolviendo referencias a cadenas compartidas (`t="s"`).
fn parsear_hoja_xml(xml: &str, compartidas: &[String]) -> Result<Vec<Vec<String>>, Box<dyn Error>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut filas: Vec<Vec<String>> = Vec::new();
    let mut fila_actual: Vec<String> = Vec::new();
    let mut celda_col: usize = 0;
    let mut celda_tipo: Option<String> = None;
    let mut celda_valor = String::new();
    let mut en_valor = false;
    let mut en_texto = false;

    let atributos_celda = |e: &quick_xml::events::BytesStart<'_>, fallback: usize| {
        let mut col = fallback;
        let mut tipo = None;
        for attr in e.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => {
                    let referencia = String::from_utf8_lossy(&attr.value).to_string();
                    let letras: String = referencia
                        .chars()
                        .take_while(|c| c.is_ascii_alphabetic())
                        .collect();
                    let ix = column_letters_to_index(&letras);
                    if ix > 0 {
                        col = ix - 1;
                    }
                }
                b"t" => tipo = Some(String::from_utf8_lossy(&attr.value).to_string()),
                _ => {}
            }
        }
        (col, tipo)
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"row" => fila_actual = Vec::new(),
                b"c" => {
                    let (col, tipo) = atributos_celda(&e, fila_actual.len());
                    celda_col = col;
                    celda_tipo = tipo;
                    celda_valor.clear();
                }
                b"v" => en_valor = true,
                b"t" => en_texto = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"c" => {
                    let (col, _) = atributos_celda(&e, fila_actual.len());
                    colocar_celda(&mut fila_actual, col, String::new());
                }
                b"row" => filas.push(Vec::new()),
                _ => {}
            },
            Ok(Event::Text(t)) => {
                if en_valor || en_texto {
                    celda_valor.push_str(&t.unescape()?);
                }
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"v" => en_valor = false,
                b"t" => en_texto = false,
                b"c" => {
                    let valor = match celda_tipo.as_deref() {
                        Some("s") => celda_valor
                            .trim()
                            .parse::<usize>()
                            .ok()
                            .and_then(|ix| compartidas.get(ix).cloned())
                            .unwrap_or_default(),
                        _ => celda_valor.clone(),
                    };
                    colocar_celda(&mut fila_actual, celda_col, valor);
                }
                b"row" => filas.push(std::mem::take(&mut fila_actual)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(format!("XML de hoja inválido: {}", e).into()),
            _ => {}
        }
    }
    Ok(filas)
}
