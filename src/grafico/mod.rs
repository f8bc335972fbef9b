// Render del calendario semanal de una combinación como SVG.
use std::error::Error;

use plotters::prelude::*;

use crate::models::{Combinacion, Dia};

const VERDE: RGBColor = RGBColor(76, 175, 80);
const AMARILLO: RGBColor = RGBColor(255, 215, 0);
const ROJO: RGBColor = RGBColor(244, 67, 54);
const GRIS: RGBColor = RGBColor(158, 158, 158);

/// Color del bloque según el % de ocupación: verde < 50, amarillo ≤ 90,
/// rojo > 90, gris cuando la ocupación es desconocida.
pub fn color_por_ocupacion(pct: Option<f64>) -> RGBColor {
    match pct {
        Some(p) if p < 50.0 => VERDE,
        Some(p) if p <= 90.0 => AMARILLO,
        Some(_) => ROJO,
        None => GRIS,
    }
}

/// Dibuja el horario de una combinación: días en X, minutos del día en Y
/// (ventana 6:00-22:00), un rectángulo por bloque con la etiqueta de la
/// asignatura y su número de clase.
pub fn dibujar_calendario(comb: &Combinacion) -> Result<String, Box<dyn Error>> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (1000, 700)).into_drawing_area();
        root.fill(&WHITE)?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Horario personalizado", ("sans-serif", 24))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(56)
            .build_cartesian_2d(0.0f64..6.0f64, 360.0f64..1320.0f64)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(7)
            .x_label_formatter(&|x| {
                let ix = x.round() as usize;
                Dia::TODOS
                    .get(ix)
                    .map(|d| d.nombre().to_string())
                    .unwrap_or_default()
            })
            .y_labels(17)
            .y_label_formatter(&|y| format!("{:02}:00", (*y as i32) / 60))
            .x_desc("Día")
            .y_desc("Hora")
            .draw()?;

        for seccion in &comb.secciones {
            let color = color_por_ocupacion(seccion.ocupacion());
            for bloque in &seccion.bloques {
                let x = bloque.dia.indice() as f64;
                let (y0, y1) = (bloque.inicio as f64, bloque.fin as f64);
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x + 0.05, y0), (x + 0.95, y1)],
                    color.mix(0.8).filled(),
                )))?;
                chart.draw_series(std::iter::once(Rectangle::new(
                    [(x + 0.05, y0), (x + 0.95, y1)],
                    BLACK.stroke_width(1),
                )))?;
                let etiqueta =
                    format!("{} - Clase {}", seccion.asignatura, seccion.numero_clase);
                chart.draw_series(std::iter::once(Text::new(
                    etiqueta,
                    (x + 0.1, (y0 + y1) / 2.0),
                    ("sans-serif", 13).into_font(),
                )))?;
            }
        }

        root.present()?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BloqueHorario, Seccion};

    #[test]
    fn test_color_por_ocupacion() {
        assert_eq!(color_por_ocupacion(Some(0.0)), VERDE);
        assert_eq!(color_por_ocupacion(Some(49.9)), VERDE);
        assert_eq!(color_por_ocupacion(Some(50.0)), AMARILLO);
        assert_eq!(color_por_ocupacion(Some(90.0)), AMARILLO);
        assert_eq!(color_por_ocupacion(Some(91.0)), ROJO);
        assert_eq!(color_por_ocupacion(None), GRIS);
    }

    #[test]
    fn test_dibujar_calendario_produce_svg() {
        let comb = Combinacion {
            secciones: vec![Seccion {
                asignatura: "Circuitos".to_string(),
                numero_clase: 1,
                bloques: vec![BloqueHorario {
                    dia: Dia::Lunes,
                    inicio: 480,
                    fin: 600,
                }],
                salon: "SUR-101".to_string(),
                campus: "Sur".to_string(),
                inscritos: Some(10.0),
                cupos: Some(30.0),
            }],
        };
        let svg = dibujar_calendario(&comb).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("rect"));
    }
}
