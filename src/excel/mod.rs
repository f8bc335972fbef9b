// Lectura y normalización de workbooks de oferta académica.
pub mod io;
pub mod oferta;

pub use io::{hora_a_minutos, minutos_a_hora};
pub use oferta::{leer_oferta_excel, leer_ofertas_excel};
