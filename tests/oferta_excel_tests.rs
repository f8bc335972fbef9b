use std::io::Write;

use horagen::algorithm::generar_horarios;
use horagen::excel::leer_oferta_excel;
use horagen::models::{Dia, Jornada, ResultadoHorarios, Sede, SeleccionHorario};

/// Celda de texto inline para el XML de hoja.
fn celda_texto(referencia: &str, texto: &str) -> String {
    format!(
        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
        referencia, texto
    )
}

fn celda_numero(referencia: &str, valor: &str) -> String {
    format!(r#"<c r="{}"><v>{}</v></c>"#, referencia, valor)
}

/// Escribe un workbook mínimo (solo la hoja, sin workbook.xml) que obliga
/// a `leer_oferta_excel` a usar la lectura vía zip. Un archivo por test
/// para que puedan correr en paralelo.
fn escribir_oferta_de_prueba(nombre: &str) -> String {
    let encabezado: String = [
        ("A3", "Asignatura"),
        ("B3", "Nº Clase"),
        ("C3", "Hora Ini"),
        ("D3", "Hora Fin"),
        ("E3", "Salon"),
        ("F3", "Campus"),
        ("G3", "Total Inscritos"),
        ("H3", "Total Cupos"),
        ("I3", "Lun"),
        ("J3", "Mar"),
        ("K3", "Mier"),
        ("L3", "Jue"),
        ("M3", "Vier"),
        ("N3", "Sab"),
    ]
    .iter()
    .map(|&(r, t)| celda_texto(r, t))
    .collect();

    let fila_circuitos: String = [
        celda_texto("A4", "Circuitos"),
        celda_numero("B4", "1"),
        celda_texto("C4", "08:00"),
        celda_texto("D4", "10:00"),
        celda_texto("E4", "SUR-101"),
        celda_texto("F4", "Sur"),
        celda_numero("G4", "15"),
        celda_numero("H4", "30"),
        celda_texto("I4", "Y"),
        celda_texto("K4", "Y"),
    ]
    .concat();

    let fila_estatica: String = [
        celda_texto("A5", "Estática"),
        celda_numero("B5", "1"),
        celda_texto("C5", "10:00"),
        celda_texto("D5", "11:00"),
        celda_texto("E5", "SUR-202"),
        celda_texto("F5", "Sur"),
        celda_numero("G5", "10"),
        celda_numero("H5", "40"),
        celda_texto("I5", "Y"),
    ]
    .concat();

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>Oferta de prueba</t></is></c></row><row r="3">{}</row><row r="4">{}</row><row r="5">{}</row></sheetData></worksheet>"#,
        encabezado, fila_circuitos, fila_estatica
    );

    let ruta = std::env::temp_dir().join(nombre);
    let archivo = std::fs::File::create(&ruta).unwrap();
    let mut writer = zip::ZipWriter::new(archivo);
    writer
        .start_file("xl/worksheets/sheet1.xml", zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap();
    ruta.to_string_lossy().to_string()
}

#[test]
fn test_lectura_via_zip_y_expansion() {
    let ruta = escribir_oferta_de_prueba("horagen_oferta_lectura.xlsx");
    let filas = leer_oferta_excel(&ruta).unwrap();

    // Circuitos activo Lun y Mier, Estática solo Lun
    assert_eq!(filas.len(), 3);
    assert_eq!(filas[0].asignatura, "Circuitos");
    assert_eq!(filas[0].dia, Dia::Lunes);
    assert_eq!(filas[0].inicio, 480);
    assert_eq!(filas[0].fin, 600);
    assert_eq!(filas[1].dia, Dia::Miercoles);
    assert_eq!(filas[2].asignatura, "Estática");
    assert_eq!(filas[2].inscritos, Some(10.0));
    assert_eq!(filas[2].cupos, Some(40.0));
}

#[test]
fn test_flujo_completo_desde_workbook() {
    let ruta = escribir_oferta_de_prueba("horagen_oferta_flujo.xlsx");
    let filas = leer_oferta_excel(&ruta).unwrap();

    let seleccion = SeleccionHorario {
        materias: vec!["Circuitos".to_string(), "Estática".to_string()],
        jornada: Jornada::Manana,
        sede: Sede::Sur,
        limite: 5,
    };
    let busqueda = generar_horarios(&filas, &seleccion).unwrap();

    match busqueda.resultado {
        ResultadoHorarios::Opciones(opciones) => {
            // Circuitos termina 10:00 justo cuando empieza Estática
            assert_eq!(opciones.len(), 1);
            assert_eq!(opciones[0].secciones[0].asignatura, "Circuitos");
            assert_eq!(opciones[0].secciones[0].bloques.len(), 2);
            assert_eq!(opciones[0].secciones[1].asignatura, "Estática");
        }
        otro => panic!("se esperaban opciones, hubo {:?}", otro),
    }
}

#[test]
fn test_archivo_inexistente_es_error() {
    assert!(leer_oferta_excel("/no/existe/oferta.xlsx").is_err());
}
