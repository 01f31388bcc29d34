mod csv;
mod geojson;
mod tabular;

pub use csv::write_csv;
pub use geojson::{read_geojson, write_geojson, write_geojson_bytes};
pub use tabular::read_points;
