//! Export vers GeoJSON avec geozero (streaming)

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;

use terra_overlap::{Feature, FeatureCollection};

/// Exporte une collection dans un fichier GeoJSON; renvoie le nombre de features
pub fn export_to_geojson(collection: &FeatureCollection, output_path: &Path) -> Result<usize> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let written = write_collection(&mut writer, collection)?;
    writer.flush()?;

    Ok(written)
}

/// Écrit une FeatureCollection complète
pub fn write_collection<W: Write>(writer: &mut W, collection: &FeatureCollection) -> Result<usize> {
    // Header FeatureCollection
    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    for (i, feature) in collection.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write_feature(writer, feature)?;
    }

    // Footer
    write!(writer, "]}}")?;

    Ok(collection.len())
}

/// Écrit une feature en GeoJSON
fn write_feature<W: Write>(writer: &mut W, feature: &Feature) -> Result<()> {
    write!(writer, r#"{{"type":"Feature","#)?;

    if let Some(id) = &feature.id {
        write!(writer, r#""id":"#)?;
        serde_json::to_writer(&mut *writer, id)?;
        write!(writer, ",")?;
    }

    // Geometry via geozero
    write!(writer, r#""geometry":"#)?;
    match &feature.geometry {
        Some(geometry) => {
            let mut geom_buf = Vec::new();
            let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
            geometry.process_geom(&mut geom_writer)?;
            writer.write_all(&geom_buf)?;
        }
        None => write!(writer, "null")?,
    }

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, &feature.properties)?;
    write!(writer, "}}")?;

    Ok(())
}
