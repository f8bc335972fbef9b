// Detección de solapamientos entre bloques y secciones.
use crate::models::{BloqueHorario, Seccion};

/// True si ambos bloques caen el mismo día y sus rangos se intersectan
/// estrictamente: `max(inicio) < min(fin)`. Tocar extremos (una clase
/// termina justo cuando empieza la otra) no cuenta como choque.
pub fn bloques_se_solapan(b1: &BloqueHorario, b2: &BloqueHorario) -> bool {
    if b1.dia != b2.dia {
        return false;
    }
    std::cmp::max(b1.inicio, b2.inicio) < std::cmp::min(b1.fin, b2.fin)
}

/// True si cualquier bloque de `s1` choca con cualquier bloque de `s2`.
pub fn secciones_se_solapan(s1: &Seccion, s2: &Seccion) -> bool {
    s1.bloques
        .iter()
        .any(|b1| s2.bloques.iter().any(|b2| bloques_se_solapan(b1, b2)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Dia;

    fn bloque(dia: Dia, inicio: i32, fin: i32) -> BloqueHorario {
        BloqueHorario { dia, inicio, fin }
    }

    #[test]
    fn test_bloques_mismo_dia_se_solapan() {
        // 08:00-10:00 y 09:00-11:00 chocan
        let b1 = bloque(Dia::Lunes, 480, 600);
        let b2 = bloque(Dia::Lunes, 540, 660);
        assert!(bloques_se_solapan(&b1, &b2));
        assert!(bloques_se_solapan(&b2, &b1));
    }

    #[test]
    fn test_bloques_extremos_tocandose_no_chocan() {
        // 08:00-09:00 y 09:00-10:00 no chocan (límite)
        let b1 = bloque(Dia::Lunes, 480, 540);
        let b2 = bloque(Dia::Lunes, 540, 600);
        assert!(!bloques_se_solapan(&b1, &b2));
    }

    #[test]
    fn test_bloques_dias_distintos_no_chocan() {
        let b1 = bloque(Dia::Lunes, 480, 600);
        let b2 = bloque(Dia::Martes, 480, 600);
        assert!(!bloques_se_solapan(&b1, &b2));
    }
}
